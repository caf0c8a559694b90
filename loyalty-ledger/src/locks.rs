use std::collections::HashSet;

use parking_lot::{Condvar, Mutex};

/// Registry of wallet names currently held by an in-flight mutation.
///
/// Holding a [`WalletGuard`] for a name excludes every other holder of the
/// same name; different names never wait on each other's guards.
#[derive(Debug, Default)]
pub(crate) struct WalletLocks {
    busy: Mutex<HashSet<String>>,
    released: Condvar,
}

impl WalletLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Block until `name` is free, then claim it.
    pub(crate) fn lock(&self, name: &str) -> WalletGuard<'_> {
        let mut busy = self.busy.lock();
        while busy.contains(name) {
            self.released.wait(&mut busy);
        }
        busy.insert(name.to_string());
        WalletGuard {
            locks: self,
            name: name.to_string(),
        }
    }
}

/// Claim on a single wallet name, released on drop.
#[derive(Debug)]
pub(crate) struct WalletGuard<'a> {
    locks: &'a WalletLocks,
    name: String,
}

impl Drop for WalletGuard<'_> {
    fn drop(&mut self) {
        let mut busy = self.locks.busy.lock();
        busy.remove(&self.name);
        drop(busy);
        self.locks.released.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn held(locks: &WalletLocks) -> usize {
        locks.busy.lock().len()
    }

    #[test]
    fn guards_release_on_drop() {
        let locks = WalletLocks::new();
        {
            let _alice = locks.lock("alice");
            let _bob = locks.lock("bob");
            assert_eq!(held(&locks), 2);
            assert!(locks.busy.lock().contains("alice"));
        }
        assert_eq!(held(&locks), 0);
    }

    #[test]
    fn same_name_is_exclusive() {
        let locks = Arc::new(WalletLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                thread::spawn(move || {
                    let _guard = locks.lock("alice");
                    assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                    thread::sleep(Duration::from_millis(2));
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(held(&locks), 0);
    }
}
