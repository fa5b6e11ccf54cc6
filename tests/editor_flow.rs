use std::sync::Arc;

use pixart::editor::{brush, fill};
use pixart::input::{Action, EditorEvent, InputSource, ScriptReader};
use pixart::renderer::{Canvas, Palette, Renderer};
use pixart::session;
use pixart::store::{ArtworkStore, Completion, DirStore, PersistenceClient};
use pixart::{EditorController, EditorState, PixelBuffer};

#[test]
fn stamp_then_fill_on_small_grid() {
    let mut buffer = PixelBuffer::new(4, 0).unwrap();

    let stamped = brush::stamp(&mut buffer, 1, 1, 1, 3).unwrap();
    assert_eq!(stamped, 4);
    for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        assert_eq!(buffer.get(x, y), Ok(3), "cell ({}, {})", x, y);
    }
    assert_eq!(buffer.get(2, 1), Ok(0));

    let filled = fill::flood_fill(&mut buffer, 3, 3, 5).unwrap();
    assert_eq!(filled, 12);
    let expected: Vec<u8> = vec![
        3, 3, 5, 5, //
        3, 3, 5, 5, //
        5, 5, 5, 5, //
        5, 5, 5, 5,
    ];
    assert_eq!(buffer.cells(), expected.as_slice());
}

#[test]
fn controller_drives_the_same_example() {
    let buffer = PixelBuffer::new(4, 0).unwrap();
    let mut editor = EditorController::new(buffer, EditorState::new(1, 3), 500.0);

    editor
        .handle(EditorEvent::PointerMove { x: 130.0, y: 130.0, primary: false })
        .unwrap();
    editor.handle(EditorEvent::PointerPress).unwrap();

    editor
        .handle(EditorEvent::PointerMove { x: 499.0, y: 499.0, primary: false })
        .unwrap();
    editor.handle(EditorEvent::key(Action::CycleColorUp)).unwrap();
    editor.handle(EditorEvent::key(Action::CycleColorUp)).unwrap();
    editor.handle(EditorEvent::key(Action::Fill)).unwrap();

    assert_eq!(editor.state().color_index, 5);
    assert_eq!(editor.buffer().get(0, 0), Ok(3));
    assert_eq!(editor.buffer().get(1, 1), Ok(3));
    assert_eq!(editor.buffer().get(3, 0), Ok(5));

    let mut canvas = Canvas::new(8, 8);
    Renderer::new(Palette::default(), [255, 255, 255])
        .render_frame(&editor, &mut canvas)
        .unwrap();
    let green = Palette::default().color_at(3).unwrap();
    assert_eq!(canvas.get_pixel(0, 0), Some(green));
}

#[tokio::test]
async fn scripted_session_is_saved_and_reloaded() {
    let script = r#"{"version":1,"display_size":128}
{"type":"move","x":10.0,"y":10.0}
{"type":"key","action":"increase_brush"}
{"type":"press"}
{"type":"move","x":200.0,"y":10.0,"primary":true}
{"type":"move","x":100.0,"y":100.0}
{"type":"key","action":"cycle_color_up"}
{"type":"key","action":"fill"}
"#;
    let mut reader = ScriptReader::from_reader(script.as_bytes()).unwrap();
    let events = reader.read_events().unwrap();

    let buffer = PixelBuffer::new(128, 0).unwrap();
    let mut editor = EditorController::new(buffer, EditorState::new(2, 4), reader.metadata().display_size);
    let stats = session::replay(&mut editor, &events, 100, |_| Ok(())).unwrap();
    assert_eq!(stats.rejected, 1);
    assert_eq!(editor.buffer().get(10, 10), Ok(4));
    assert_eq!(editor.buffer().get(100, 100), Ok(5));

    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn ArtworkStore> = Arc::new(DirStore::new(dir.path(), 128));
    let mut client = PersistenceClient::new(Arc::clone(&store), tokio::runtime::Handle::current(), 128);

    client.save(editor.buffer());
    let id = match client.next_completion().await {
        Some(Completion::Saved { id, .. }) => id,
        other => panic!("unexpected completion: {:?}", other),
    };

    let listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].uuid, id);

    client.load(&id);
    match client.next_completion().await {
        Some(Completion::Loaded { buffer, .. }) => assert_eq!(&buffer, editor.buffer()),
        other => panic!("unexpected completion: {:?}", other),
    }
}
