//! Token store capability and the in-memory implementation.
//!
//! The vault persists tokens exclusively through the narrow [`TokenStore`]
//! capability — no component holds a direct connection or long-lived
//! transaction. The contract's load-bearing operation is [`consume`]:
//! it must flip the `used` flag in a single atomic conditional write, never
//! as a separate read followed by a write, because two concurrent redeemers
//! observing the same unused state would otherwise both succeed.
//!
//! [`consume`]: TokenStore::consume

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::token::StoredToken;

/// Outcome of the atomic consume operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// This caller won: the `used` flag flipped false to true.
    Consumed,
    /// The flag was already set when the conditional write ran.
    AlreadyUsed,
    /// No live entry exists under this key.
    Missing,
}

/// Store-side failures: connectivity and data integrity.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("store backend unavailable: {0}")]
    Unavailable(String),
    /// A stored value could not be decoded.
    #[error("stored value could not be decoded: {0}")]
    Corrupt(String),
}

/// TTL-scoped key-value capability the vault persists tokens through.
///
/// Implementations over an external store must map [`consume`] onto the
/// backend's native compare-and-set; a backend without true atomic
/// conditional update needs optimistic-concurrency versioning or a lock
/// around the consume step before it can carry the single-use guarantee.
///
/// [`consume`]: TokenStore::consume
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persists a token under `key`, evicted automatically after `ttl`.
    async fn put(&self, key: &str, token: &StoredToken, ttl: Duration) -> Result<(), StoreError>;

    /// Fetches the token under `key`, or `None` if absent or evicted.
    async fn get(&self, key: &str) -> Result<Option<StoredToken>, StoreError>;

    /// Removes the entry under `key`; `true` if one existed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Atomically flips the stored token's `used` flag from false to true.
    ///
    /// Exactly one caller among any number of concurrent callers observes
    /// [`ConsumeOutcome::Consumed`] for a given live entry.
    async fn consume(&self, key: &str) -> Result<ConsumeOutcome, StoreError>;
}

#[derive(Debug)]
struct Entry {
    token: StoredToken,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Sharded in-memory [`TokenStore`] with lazy TTL eviction.
///
/// Expired entries are dropped on access rather than by a sweeper. The
/// consume step holds the shard guard across the read and the flag flip,
/// so it is a true single atomic operation per key.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: DashMap<String, Entry>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, including not-yet-evicted
    /// expired ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn put(&self, key: &str, token: &StoredToken, ttl: Duration) -> Result<(), StoreError> {
        self.entries.insert(
            key.to_owned(),
            Entry {
                token: token.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StoredToken>, StoreError> {
        match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.token.clone())),
            Some(_) => {}
        }
        // Guard dropped above; evict the expired entry.
        self.entries.remove(key);
        Ok(None)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.remove(key).is_some())
    }

    async fn consume(&self, key: &str) -> Result<ConsumeOutcome, StoreError> {
        let Some(mut entry) = self.entries.get_mut(key) else {
            return Ok(ConsumeOutcome::Missing);
        };
        if entry.is_expired() {
            drop(entry);
            self.entries.remove(key);
            return Ok(ConsumeOutcome::Missing);
        }
        if entry.token.used {
            return Ok(ConsumeOutcome::AlreadyUsed);
        }
        entry.token.used = true;
        Ok(ConsumeOutcome::Consumed)
    }
}
