//! In-memory session store.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::record::SessionCookieRecord;
use crate::store::SessionStore;

/// A session store backed by a process-local map.
///
/// Used by tests and by deployments that keep session records server-side
/// behind a single opaque browser cookie.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, SessionCookieRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with records.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = SessionCookieRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, session_id: &str) -> StoreResult<SessionCookieRecord> {
        self.records
            .read()
            .get(session_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn find_by_login_name(
        &self,
        login_name: &str,
        organization: Option<&str>,
    ) -> StoreResult<SessionCookieRecord> {
        self.records
            .read()
            .values()
            .filter(|r| r.login_name == login_name)
            .filter(|r| match organization {
                Some(org) => r.organization.as_deref() == Some(org),
                None => true,
            })
            .max_by_key(|r| r.change_date)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn most_recent(&self) -> StoreResult<SessionCookieRecord> {
        self.records
            .read()
            .values()
            .max_by_key(|r| r.change_date)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn all(&self) -> Vec<SessionCookieRecord> {
        self.records.read().values().cloned().collect()
    }

    fn insert(&self, record: SessionCookieRecord) {
        self.records.write().insert(record.id.clone(), record);
    }

    fn update(&self, record: SessionCookieRecord) -> StoreResult<()> {
        let mut records = self.records.write();
        if !records.contains_key(&record.id) {
            return Err(StoreError::NotFound);
        }
        records.insert(record.id.clone(), record);
        Ok(())
    }

    fn remove(&self, session_id: &str) {
        self.records.write().remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, login_name: &str, changed_secs: i64) -> SessionCookieRecord {
        SessionCookieRecord::new(id, format!("token-{id}"), login_name, Utc.timestamp_opt(0, 0).unwrap())
            .with_change_date(Utc.timestamp_opt(changed_secs, 0).unwrap())
    }

    #[test]
    fn get_returns_not_found_for_missing_id() {
        let store = MemoryStore::new();
        assert!(matches!(store.get("missing"), Err(StoreError::NotFound)));
    }

    #[test]
    fn insert_then_get_round_trips() {
        let store = MemoryStore::new();
        let rec = record("s1", "alice@example.com", 10);
        store.insert(rec.clone());
        assert_eq!(store.get("s1").unwrap(), rec);
    }

    #[test]
    fn insert_overwrites_same_id() {
        let store = MemoryStore::new();
        store.insert(record("s1", "alice@example.com", 10));
        store.insert(record("s1", "alice@example.com", 20));
        assert_eq!(
            store.get("s1").unwrap().change_date,
            Utc.timestamp_opt(20, 0).unwrap()
        );
    }

    #[test]
    fn find_by_login_name_prefers_most_recent() {
        let store = MemoryStore::with_records([
            record("s1", "alice@example.com", 10),
            record("s2", "alice@example.com", 30),
            record("s3", "bob@example.com", 50),
        ]);

        let found = store.find_by_login_name("alice@example.com", None).unwrap();
        assert_eq!(found.id, "s2");
    }

    #[test]
    fn find_by_login_name_respects_organization() {
        let store = MemoryStore::new();
        store.insert(record("s1", "alice@example.com", 10).with_organization("org-a"));
        store.insert(record("s2", "alice@example.com", 20).with_organization("org-b"));

        let found = store
            .find_by_login_name("alice@example.com", Some("org-a"))
            .unwrap();
        assert_eq!(found.id, "s1");

        assert!(store
            .find_by_login_name("alice@example.com", Some("org-c"))
            .is_err());
    }

    #[test]
    fn most_recent_across_all_records() {
        let store = MemoryStore::with_records([
            record("s1", "alice@example.com", 10),
            record("s2", "bob@example.com", 40),
        ]);
        assert_eq!(store.most_recent().unwrap().id, "s2");
    }

    #[test]
    fn update_requires_existing_record() {
        let store = MemoryStore::new();
        assert!(store.update(record("s1", "alice@example.com", 10)).is_err());

        store.insert(record("s1", "alice@example.com", 10));
        assert!(store.update(record("s1", "alice@example.com", 20)).is_ok());
    }

    #[test]
    fn remove_is_idempotent() {
        let store = MemoryStore::new();
        store.insert(record("s1", "alice@example.com", 10));
        store.remove("s1");
        store.remove("s1");
        assert!(store.get("s1").is_err());
    }
}
