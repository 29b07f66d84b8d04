//! Per-session serialization
//!
//! A chat cycle reads history, waits on the model, then appends two turns.
//! Holding the session's lock across the whole cycle keeps concurrent requests
//! for one session from interleaving; different sessions never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Lock table keyed by session id. Entries live as long as the table.
#[derive(Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `session_id`; released when the guard drops
    pub async fn acquire(&self, session_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_same_session_waits() {
        let locks = SessionLocks::new();
        let guard = locks.acquire("s1").await;

        let blocked = timeout(Duration::from_millis(50), locks.acquire("s1")).await;
        assert!(blocked.is_err(), "second acquire should wait for the first guard");

        drop(guard);
        let reacquired = timeout(Duration::from_millis(50), locks.acquire("s1")).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn test_different_sessions_do_not_contend() {
        let locks = SessionLocks::new();
        let _a = locks.acquire("a").await;
        let b = timeout(Duration::from_millis(50), locks.acquire("b")).await;
        assert!(b.is_ok());
    }
}
