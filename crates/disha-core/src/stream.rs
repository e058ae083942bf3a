// ── Reactive entity streams ──
//
// Subscription types for consuming cache changes from the DataStore.

use std::sync::Arc;

use tokio::sync::watch;

/// A subscription to one cached collection.
///
/// Each call to [`changed()`](Self::changed) waits for the next write to the
/// collection and yields the snapshot it produced.
pub struct EntityStream<T: Clone + Send + Sync + 'static> {
    receiver: watch::Receiver<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> EntityStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<Arc<Vec<Arc<T>>>>) -> Self {
        Self { receiver }
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<Vec<Arc<T>>>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio::sync::watch;
    use tokio_test::{assert_pending, assert_ready, task};

    use super::*;

    fn snapshot(values: &[u32]) -> Arc<Vec<Arc<u32>>> {
        Arc::new(values.iter().copied().map(Arc::new).collect())
    }

    #[test]
    fn changed_waits_for_a_new_snapshot() {
        let (tx, rx) = watch::channel(snapshot(&[1]));
        let mut stream = EntityStream::new(rx);
        {
            let mut changed = task::spawn(stream.changed());
            assert_pending!(changed.poll());
            tx.send(snapshot(&[1, 2])).unwrap();
            assert!(changed.is_woken());
            let snap = assert_ready!(changed.poll()).unwrap();
            assert_eq!(snap.len(), 2);
        }
        let mut again = task::spawn(stream.changed());
        assert_pending!(again.poll());
    }

    #[test]
    fn changed_ends_when_the_store_is_dropped() {
        let (tx, rx) = watch::channel(snapshot(&[]));
        let mut stream = EntityStream::new(rx);
        drop(tx);
        let mut changed = task::spawn(stream.changed());
        assert!(assert_ready!(changed.poll()).is_none());
    }
}
