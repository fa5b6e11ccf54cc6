use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use super::{new_id, ArtworkRecord, ArtworkStore};
use crate::editor::PixelBuffer;
use crate::error::StoreError;

/// Result of a finished save or load request
#[derive(Debug)]
pub enum Completion {
    Saved { seq: u64, id: String },
    Loaded { seq: u64, id: String, buffer: PixelBuffer },
    Failed { seq: u64, error: StoreError },
}

impl Completion {
    pub fn seq(&self) -> u64 {
        match self {
            Completion::Saved { seq, .. } | Completion::Loaded { seq, .. } | Completion::Failed { seq, .. } => *seq,
        }
    }
}

enum Reply {
    Save(Result<String, StoreError>),
    Load(String, Result<PixelBuffer, StoreError>),
}

/// Runs store calls as background tasks so the editor loop never waits on I/O.
///
/// Every request carries a sequence number. A load that finishes after a newer
/// load was requested is dropped instead of overwriting the newer result.
pub struct PersistenceClient {
    store: Arc<dyn ArtworkStore>,
    runtime: Handle,
    grid_size: usize,
    tx: UnboundedSender<(u64, Reply)>,
    rx: UnboundedReceiver<(u64, Reply)>,
    next_seq: u64,
    latest_load: Option<u64>,
    in_flight: usize,
}

impl PersistenceClient {
    pub fn new(store: Arc<dyn ArtworkStore>, runtime: Handle, grid_size: usize) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            store,
            runtime,
            grid_size,
            tx,
            rx,
            next_seq: 0,
            latest_load: None,
            in_flight: 0,
        }
    }

    /// Number of requests whose completion has not been received yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    fn issue(&mut self) -> u64 {
        self.next_seq += 1;
        self.in_flight += 1;
        self.next_seq
    }

    /// Snapshot `buffer` and store it under a fresh id. The buffer is only read.
    pub fn save(&mut self, buffer: &PixelBuffer) -> u64 {
        let seq = self.issue();
        let pixels = buffer.to_record();
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();

        self.runtime.spawn(async move {
            let result = match new_id() {
                Ok(uuid) => store.create(ArtworkRecord { uuid, pixels }).await,
                Err(e) => Err(e),
            };
            let _ = tx.send((seq, Reply::Save(result)));
        });

        debug!(seq, "save requested");
        seq
    }

    /// Fetch artwork `id`; supersedes any load still in flight
    pub fn load(&mut self, id: &str) -> u64 {
        let seq = self.issue();
        self.latest_load = Some(seq);
        let id = id.to_string();
        let size = self.grid_size;
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();

        self.runtime.spawn(async move {
            let result = store.get(&id).await.and_then(|record| {
                record.to_buffer(size).map_err(|e| StoreError::MalformedRecord {
                    id: id.clone(),
                    reason: e.to_string(),
                })
            });
            let _ = tx.send((seq, Reply::Load(id, result)));
        });

        debug!(seq, "load requested");
        seq
    }

    /// Drain finished requests without waiting
    pub fn poll(&mut self) -> Vec<Completion> {
        let mut done = Vec::new();
        while let Ok((seq, reply)) = self.rx.try_recv() {
            if let Some(completion) = self.accept(seq, reply) {
                done.push(completion);
            }
        }
        done
    }

    /// Wait for the next accepted completion; None when nothing is in flight
    pub async fn next_completion(&mut self) -> Option<Completion> {
        while self.in_flight > 0 {
            let (seq, reply) = self.rx.recv().await?;
            if let Some(completion) = self.accept(seq, reply) {
                return Some(completion);
            }
        }
        None
    }

    fn accept(&mut self, seq: u64, reply: Reply) -> Option<Completion> {
        self.in_flight = self.in_flight.saturating_sub(1);

        match reply {
            Reply::Save(Ok(id)) => {
                info!(seq, id = %id, "artwork saved");
                Some(Completion::Saved { seq, id })
            }
            Reply::Load(id, _) if self.latest_load != Some(seq) => {
                debug!(seq, id = %id, latest = ?self.latest_load, "discarding stale load");
                None
            }
            Reply::Load(id, Ok(buffer)) => {
                info!(seq, id = %id, "artwork loaded");
                Some(Completion::Loaded { seq, id, buffer })
            }
            Reply::Save(Err(error)) | Reply::Load(_, Err(error)) => {
                warn!(seq, "persistence request failed: {}", error);
                Some(Completion::Failed { seq, error })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DirStore;

    fn client(dir: &std::path::Path) -> PersistenceClient {
        let store: Arc<dyn ArtworkStore> = Arc::new(DirStore::new(dir, 4));
        PersistenceClient::new(store, Handle::current(), 4)
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = client(dir.path());

        let mut buffer = PixelBuffer::new(4, 0).unwrap();
        buffer.set(1, 2, 9).unwrap();
        let seq = client.save(&buffer);

        let id = match client.next_completion().await {
            Some(Completion::Saved { seq: done, id }) => {
                assert_eq!(done, seq);
                id
            }
            other => panic!("unexpected completion: {:?}", other),
        };

        client.load(&id);
        match client.next_completion().await {
            Some(Completion::Loaded { buffer: loaded, .. }) => assert_eq!(loaded, buffer),
            other => panic!("unexpected completion: {:?}", other),
        }
        assert_eq!(client.in_flight(), 0);
        assert!(client.next_completion().await.is_none());
    }

    #[tokio::test]
    async fn stale_load_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::new(dir.path(), 4);
        let first = ArtworkRecord::from_buffer(new_id().unwrap(), &PixelBuffer::new(4, 1).unwrap());
        let second = ArtworkRecord::from_buffer(new_id().unwrap(), &PixelBuffer::new(4, 2).unwrap());
        store.create(first.clone()).await.unwrap();
        store.create(second.clone()).await.unwrap();

        let mut client = client(dir.path());
        client.load(&first.uuid);
        let newest = client.load(&second.uuid);

        let mut accepted = Vec::new();
        while let Some(completion) = client.next_completion().await {
            accepted.push(completion);
        }

        assert_eq!(accepted.len(), 1);
        match &accepted[0] {
            Completion::Loaded { seq, id, buffer } => {
                assert_eq!(*seq, newest);
                assert_eq!(id, &second.uuid);
                assert_eq!(buffer.get(0, 0), Ok(2));
            }
            other => panic!("unexpected completion: {:?}", other),
        }
    }

    #[tokio::test]
    async fn failed_load_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = client(dir.path());
        let missing = new_id().unwrap();
        client.load(&missing);

        match client.next_completion().await {
            Some(Completion::Failed { error: StoreError::NotFound(id), .. }) => assert_eq!(id, missing),
            other => panic!("unexpected completion: {:?}", other),
        }
    }

    #[tokio::test]
    async fn poll_never_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = client(dir.path());
        assert!(client.poll().is_empty());
        client.save(&PixelBuffer::new(4, 0).unwrap());
        // The save may or may not have finished; either way poll returns immediately
        let drained = client.poll();
        assert!(drained.len() <= 1);
    }
}
