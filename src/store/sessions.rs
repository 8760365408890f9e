//! Bearer-token sessions
//!
//! Login and registration mint opaque UUID tokens; every authenticated
//! request resolves its token here. Expired rows count as absent and are
//! swept opportunistically.

use super::error::StoreResult;
use super::types::User;
use super::Store;
use chrono::{Duration, Utc};
use rusqlite::{params, OptionalExtension};

impl Store {
    /// Mint a session token for a user
    pub fn create_session(&self, user_id: i64, ttl_hours: i64) -> StoreResult<String> {
        let token = uuid::Uuid::new_v4().to_string();
        let expires_at = (Utc::now() + Duration::hours(ttl_hours)).timestamp();

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3)",
            params![token, user_id, expires_at],
        )?;

        Ok(token)
    }

    /// Resolve a token to its user. Missing and expired tokens both yield None.
    pub fn resolve_session(&self, token: &str) -> StoreResult<Option<User>> {
        let now = Utc::now().timestamp();

        let conn = self.lock()?;
        let row: Option<(i64, i64)> = conn
            .query_row(
                "SELECT user_id, expires_at FROM sessions WHERE token = ?1",
                [token],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (user_id, expires_at) = match row {
            Some(r) => r,
            None => return Ok(None),
        };

        if expires_at <= now {
            conn.execute("DELETE FROM sessions WHERE token = ?1", [token])?;
            return Ok(None);
        }

        drop(conn);
        Ok(Some(self.get_user(user_id)?))
    }

    /// Invalidate a token (logout). Unknown tokens are fine.
    pub fn delete_session(&self, token: &str) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM sessions WHERE token = ?1", [token])?;
        Ok(())
    }

    /// Remove all expired sessions; returns how many were swept
    pub fn prune_sessions(&self) -> StoreResult<usize> {
        let now = Utc::now().timestamp();
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", [now])?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::users::NewUser;
    use crate::store::Role;
    use tempfile::tempdir;

    fn store_with_user() -> (Store, i64, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let user = store
            .create_user(NewUser {
                name: "Test".to_string(),
                email: "t@example.com".to_string(),
                password: "password1".to_string(),
                role: Role::Admin,
            })
            .unwrap();
        (store, user.id, dir)
    }

    #[test]
    fn test_session_roundtrip() {
        let (store, user_id, _dir) = store_with_user();

        let token = store.create_session(user_id, 24).unwrap();
        let user = store.resolve_session(&token).unwrap().unwrap();
        assert_eq!(user.id, user_id);

        store.delete_session(&token).unwrap();
        assert!(store.resolve_session(&token).unwrap().is_none());
    }

    #[test]
    fn test_unknown_token_resolves_to_none() {
        let (store, _user_id, _dir) = store_with_user();
        assert!(store.resolve_session("not-a-token").unwrap().is_none());
    }

    #[test]
    fn test_expired_token_resolves_to_none() {
        let (store, user_id, _dir) = store_with_user();

        // Zero TTL expires immediately
        let token = store.create_session(user_id, 0).unwrap();
        assert!(store.resolve_session(&token).unwrap().is_none());
    }

    #[test]
    fn test_prune_sweeps_expired_only() {
        let (store, user_id, _dir) = store_with_user();

        let expired = store.create_session(user_id, 0).unwrap();
        let live = store.create_session(user_id, 24).unwrap();

        let removed = store.prune_sessions().unwrap();
        assert_eq!(removed, 1);
        assert!(store.resolve_session(&expired).unwrap().is_none());
        assert!(store.resolve_session(&live).unwrap().is_some());
    }
}
