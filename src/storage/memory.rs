//! In-memory storage implementation.
//!
//! Holds exchanges in a `Vec`. Used by the self-test and for ephemeral runs
//! where nothing should touch disk.

use crate::core::Exchange;
use crate::error::{Result, StorageError};
use crate::storage::schema::CURRENT_SCHEMA_VERSION;
use crate::storage::traits::{Storage, StorageStats};
use std::collections::{BTreeMap, BTreeSet};

/// Volatile storage backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    initialized: bool,
    exchanges: Vec<Exchange>,
    failures: usize,
    next_id: i64,
}

impl MemoryStorage {
    /// Creates an empty, uninitialized store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_init(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(StorageError::NotInitialized.into())
        }
    }
}

impl Storage for MemoryStorage {
    fn init(&mut self) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn is_initialized(&self) -> Result<bool> {
        Ok(self.initialized)
    }

    fn reset(&mut self) -> Result<()> {
        self.ensure_init()?;
        self.exchanges.clear();
        self.failures = 0;
        Ok(())
    }

    fn add_exchange(&mut self, exchange: &Exchange) -> Result<i64> {
        self.ensure_init()?;
        self.next_id += 1;
        let mut stored = exchange.clone();
        stored.id = Some(self.next_id);
        self.exchanges.push(stored);
        Ok(self.next_id)
    }

    fn get_exchange(&self, id: i64) -> Result<Option<Exchange>> {
        self.ensure_init()?;
        Ok(self.exchanges.iter().find(|e| e.id == Some(id)).cloned())
    }

    fn list_exchanges(&self, session: Option<&str>, limit: Option<usize>) -> Result<Vec<Exchange>> {
        self.ensure_init()?;
        let matching: Vec<&Exchange> = self
            .exchanges
            .iter()
            .filter(|e| session.is_none_or(|s| e.session_id == s))
            .collect();
        let skip = limit.map_or(0, |l| matching.len().saturating_sub(l));
        Ok(matching.into_iter().skip(skip).cloned().collect())
    }

    fn exchange_count(&self) -> Result<usize> {
        self.ensure_init()?;
        Ok(self.exchanges.len())
    }

    fn intent_distribution(&self) -> Result<BTreeMap<String, usize>> {
        self.ensure_init()?;
        let mut distribution = BTreeMap::new();
        for exchange in &self.exchanges {
            *distribution.entry(exchange.intent.clone()).or_insert(0) += 1;
        }
        Ok(distribution)
    }

    fn source_distribution(&self) -> Result<BTreeMap<String, usize>> {
        self.ensure_init()?;
        let mut distribution = BTreeMap::new();
        for exchange in &self.exchanges {
            *distribution.entry(exchange.source.as_str().to_string()).or_insert(0) += 1;
        }
        Ok(distribution)
    }

    #[allow(clippy::cast_precision_loss)]
    fn average_response_time(&self) -> Result<f64> {
        self.ensure_init()?;
        if self.exchanges.is_empty() {
            return Ok(0.0);
        }
        let total: f64 = self.exchanges.iter().map(|e| e.response_time).sum();
        Ok(total / self.exchanges.len() as f64)
    }

    fn clear_session(&mut self, session: &str) -> Result<usize> {
        self.ensure_init()?;
        let before = self.exchanges.len();
        self.exchanges.retain(|e| e.session_id != session);
        Ok(before - self.exchanges.len())
    }

    fn record_failure(&mut self) -> Result<()> {
        self.ensure_init()?;
        self.failures += 1;
        Ok(())
    }

    fn failure_count(&self) -> Result<usize> {
        self.ensure_init()?;
        Ok(self.failures)
    }

    fn stats(&self) -> Result<StorageStats> {
        self.ensure_init()?;
        let sessions: BTreeSet<&str> = self.exchanges.iter().map(|e| e.session_id.as_str()).collect();
        Ok(StorageStats {
            exchange_count: self.exchanges.len(),
            session_count: sessions.len(),
            failure_count: self.failures,
            schema_version: CURRENT_SCHEMA_VERSION,
            db_size: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Reply, ReplySource};

    fn exchange(session: &str, input: &str) -> Exchange {
        let reply = Reply::new("ok", "greeting", 1.0, ReplySource::Keyword).with_response_time(0.5);
        Exchange::from_reply(Some(session), input, &reply)
    }

    #[test]
    fn test_requires_init() {
        let mut storage = MemoryStorage::new();
        assert!(!storage.is_initialized().unwrap());
        assert!(matches!(
            storage.add_exchange(&exchange("a", "hi")),
            Err(crate::Error::Storage(StorageError::NotInitialized))
        ));
        storage.init().unwrap();
        assert!(storage.add_exchange(&exchange("a", "hi")).is_ok());
    }

    #[test]
    fn test_ids_and_listing() {
        let mut storage = MemoryStorage::new();
        storage.init().unwrap();
        let first = storage.add_exchange(&exchange("a", "one")).unwrap();
        let second = storage.add_exchange(&exchange("b", "two")).unwrap();
        storage.add_exchange(&exchange("a", "three")).unwrap();
        assert!(second > first);

        assert_eq!(storage.get_exchange(second).unwrap().unwrap().user_input, "two");
        let a: Vec<_> = storage
            .list_exchanges(Some("a"), None)
            .unwrap()
            .into_iter()
            .map(|e| e.user_input)
            .collect();
        assert_eq!(a, vec!["one", "three"]);
        assert_eq!(storage.recent_exchanges(1).unwrap()[0].user_input, "three");
    }

    #[test]
    fn test_aggregates_and_reset() {
        let mut storage = MemoryStorage::new();
        storage.init().unwrap();
        storage.add_exchange(&exchange("a", "one")).unwrap();
        storage.add_exchange(&exchange("b", "two")).unwrap();
        storage.record_failure().unwrap();

        assert!((storage.average_response_time().unwrap() - 0.5).abs() < f64::EPSILON);
        assert_eq!(storage.intent_distribution().unwrap()["greeting"], 2);
        assert_eq!(storage.source_distribution().unwrap()["keyword"], 2);
        assert_eq!(storage.stats().unwrap().session_count, 2);
        assert_eq!(storage.clear_session("a").unwrap(), 1);

        storage.reset().unwrap();
        assert_eq!(storage.exchange_count().unwrap(), 0);
        assert_eq!(storage.failure_count().unwrap(), 0);
    }
}
