//! Session store trait.

use crate::error::StoreResult;
use crate::record::SessionCookieRecord;

/// Access to the client-held session records.
///
/// The store may hold multiple concurrent records (multi-account browser
/// state). Reads are pure; mutations are atomic per record id with
/// last-writer-wins semantics. No cross-record transactions exist.
pub trait SessionStore: Send + Sync {
    /// Looks up a record by session id.
    ///
    /// ## Errors
    ///
    /// Returns [`StoreError::NotFound`] if the store holds no matching
    /// record.
    ///
    /// [`StoreError::NotFound`]: crate::StoreError::NotFound
    fn get(&self, session_id: &str) -> StoreResult<SessionCookieRecord>;

    /// Looks up the most recently changed record for a login name,
    /// optionally constrained to an organization.
    ///
    /// ## Errors
    ///
    /// Returns [`StoreError::NotFound`] if no record matches.
    ///
    /// [`StoreError::NotFound`]: crate::StoreError::NotFound
    fn find_by_login_name(
        &self,
        login_name: &str,
        organization: Option<&str>,
    ) -> StoreResult<SessionCookieRecord>;

    /// Returns the most recently changed record.
    ///
    /// ## Errors
    ///
    /// Returns [`StoreError::NotFound`] if the store is empty.
    ///
    /// [`StoreError::NotFound`]: crate::StoreError::NotFound
    fn most_recent(&self) -> StoreResult<SessionCookieRecord>;

    /// Returns every record, in unspecified order.
    fn all(&self) -> Vec<SessionCookieRecord>;

    /// Inserts a record, replacing any existing record with the same id.
    fn insert(&self, record: SessionCookieRecord);

    /// Updates an existing record.
    ///
    /// ## Errors
    ///
    /// Returns [`StoreError::NotFound`] if no record with the id exists.
    ///
    /// [`StoreError::NotFound`]: crate::StoreError::NotFound
    fn update(&self, record: SessionCookieRecord) -> StoreResult<()>;

    /// Removes the record with the given id. Removing an absent record
    /// is a no-op.
    fn remove(&self, session_id: &str);
}
