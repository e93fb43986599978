use std::sync::{Arc, Mutex, MutexGuard};

/// Single-slot mailbox shared between a producer and a consumer thread.
///
/// Posting replaces any value not yet taken, so the consumer only ever sees
/// the latest one.
#[derive(Debug)]
pub struct FrameSlot<T> {
    inner: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for FrameSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for FrameSlot<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }
}

impl<T> FrameSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        // A panic while holding the lock cannot leave an `Option` half written.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store `value`. Returns `true` if an untaken value was dropped.
    pub fn post(&self, value: T) -> bool {
        self.lock().replace(value).is_some()
    }

    /// Take the latest value, if any, without waiting.
    pub fn take(&self) -> Option<T> {
        self.lock().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_wins() {
        let slot = FrameSlot::new();
        assert_eq!(slot.take(), None);
        assert!(!slot.post(1));
        assert!(slot.post(2));
        assert!(slot.post(3));
        assert_eq!(slot.take(), Some(3));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn shared_between_threads() {
        let slot = FrameSlot::new();
        let producer = {
            let slot = slot.clone();
            std::thread::spawn(move || {
                for i in 0..100 {
                    slot.post(i);
                }
            })
        };
        producer.join().unwrap();
        assert_eq!(slot.take(), Some(99));
    }
}
