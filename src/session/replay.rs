use anyhow::Result;
use tracing::{debug, warn};

use crate::editor::{EditorController, Outcome};
use crate::input::EditorEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub applied: usize,
    pub rejected: usize,
    pub cells_painted: usize,
    pub frames: usize,
}

/// Feed scripted events through the controller without a terminal.
///
/// `on_frame` is called after every `every` events and once more after the
/// last event, so the final state always gets a frame. Rejected events (e.g. a
/// pointer outside the display) are counted and skipped.
pub fn replay(
    editor: &mut EditorController,
    events: &[EditorEvent],
    every: usize,
    mut on_frame: impl FnMut(&EditorController) -> Result<()>,
) -> Result<ReplayStats> {
    let every = every.max(1);
    let mut stats = ReplayStats::default();
    let mut since_frame = 0;

    for (i, event) in events.iter().enumerate() {
        match editor.handle(*event) {
            Ok(outcome) => {
                stats.applied += 1;
                if let Outcome::Painted(n) = outcome {
                    stats.cells_painted += n;
                }
            }
            Err(e) => {
                warn!(event = i, "skipping event: {}", e);
                stats.rejected += 1;
            }
        }

        since_frame += 1;
        if since_frame == every {
            on_frame(editor)?;
            stats.frames += 1;
            since_frame = 0;
        }
    }

    if since_frame > 0 || stats.frames == 0 {
        on_frame(editor)?;
        stats.frames += 1;
    }

    debug!(?stats, "replay finished");
    Ok(stats)
}
