use super::ExpirySweep;
use crate::application_port::AuthError;
use crate::domain_port::TokenBlacklist;
use dashmap::DashMap;
use std::time::{Duration, Instant};

pub struct MemoryTokenBlacklist {
    entries: DashMap<String, Instant>,
}

impl MemoryTokenBlacklist {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl Default for MemoryTokenBlacklist {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TokenBlacklist for MemoryTokenBlacklist {
    async fn add(&self, jti: &str, remaining: Duration) -> Result<(), AuthError> {
        if remaining.is_zero() {
            return Ok(());
        }
        self.entries
            .insert(jti.to_string(), Instant::now() + remaining);
        Ok(())
    }

    async fn is_blacklisted(&self, jti: &str) -> Result<bool, AuthError> {
        if let Some(entry) = self.entries.get(jti) {
            if *entry.value() > Instant::now() {
                return Ok(true);
            }
            drop(entry);
            self.entries.remove(jti);
        }
        Ok(false)
    }
}

impl ExpirySweep for MemoryTokenBlacklist {
    fn sweep(&self) {
        let now = Instant::now();
        self.entries.retain(|_, expires_at| *expires_at > now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn zero_remaining_writes_nothing() {
        let blacklist = MemoryTokenBlacklist::new();
        blacklist.add("jti-1", Duration::ZERO).await.unwrap();
        assert!(!blacklist.is_blacklisted("jti-1").await.unwrap());
    }

    #[tokio::test]
    async fn entry_lives_for_its_remaining_lifetime_only() {
        let blacklist = MemoryTokenBlacklist::new();
        blacklist.add("jti-1", Duration::from_millis(20)).await.unwrap();
        assert!(blacklist.is_blacklisted("jti-1").await.unwrap());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(!blacklist.is_blacklisted("jti-1").await.unwrap());
    }
}
