//! The client registry: which username belongs to which connection.
//!
//! # Concurrency note
//!
//! `ClientRegistry` is NOT thread-safe by itself — it uses a plain
//! `HashMap`. The server owns exactly one registry behind a mutex, and
//! every mutation happens while holding that lock. Because
//! [`register`](ClientRegistry::register) checks and inserts in one call,
//! two logins racing for the same name can never both succeed.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::Instant;

use gladius_protocol::PlayerId;

use crate::{validate_username, SessionError};

/// What the registry knows about one logged-in client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEntry {
    /// The connection that owns the username.
    pub player_id: PlayerId,
    /// When the login completed.
    pub connected_at: Instant,
}

/// Maps usernames to the connection currently using them.
///
/// ## Lifecycle
///
/// ```text
/// check() ──→ register() ──→ ... ──→ remove()
///   │             │
///   ▼             ▼
/// validation   DuplicateConnection
///  error       (lost a race)
/// ```
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, ClientEntry>,
}

impl ClientRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no connected client uses `username`.
    pub fn is_available(&self, username: &str) -> bool {
        !self.clients.contains_key(username)
    }

    /// Runs the full login validation: username shape, then availability.
    ///
    /// # Errors
    /// Any of the validation variants of [`SessionError`].
    pub fn check(&self, username: &str) -> Result<(), SessionError> {
        validate_username(username)?;
        if !self.is_available(username) {
            return Err(SessionError::UsernameUnavailable(
                username.to_string(),
            ));
        }
        Ok(())
    }

    /// Claims `username` for `player_id`.
    ///
    /// This is a single test-and-set: if the name is already taken the
    /// existing entry is left untouched.
    ///
    /// # Errors
    /// Returns [`SessionError::DuplicateConnection`] if the username is
    /// already registered.
    pub fn register(
        &mut self,
        username: &str,
        player_id: PlayerId,
    ) -> Result<&ClientEntry, SessionError> {
        match self.clients.entry(username.to_string()) {
            Entry::Occupied(_) => {
                Err(SessionError::DuplicateConnection(username.to_string()))
            }
            Entry::Vacant(slot) => {
                tracing::info!(username, %player_id, "client registered");
                Ok(slot.insert(ClientEntry {
                    player_id,
                    connected_at: Instant::now(),
                }))
            }
        }
    }

    /// Releases `username` if it is still held by `player_id`.
    ///
    /// Removing an absent entry, or one that now belongs to a different
    /// connection, is a no-op. Returns `true` if an entry was removed.
    pub fn remove(&mut self, username: &str, player_id: PlayerId) -> bool {
        match self.clients.get(username) {
            Some(entry) if entry.player_id == player_id => {
                self.clients.remove(username);
                tracing::info!(username, %player_id, "client unregistered");
                true
            }
            _ => false,
        }
    }

    /// Returns the number of connected clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns `true` if nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Naming convention: `test_{function}_{scenario}_{expected}`.

    use super::*;

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    // =====================================================================
    // check()
    // =====================================================================

    #[test]
    fn test_check_free_valid_name_passes() {
        let registry = ClientRegistry::new();
        assert!(registry.check("bob").is_ok());
    }

    #[test]
    fn test_check_taken_name_is_unavailable() {
        let mut registry = ClientRegistry::new();
        registry.register("bob", pid(1)).unwrap();

        let result = registry.check("bob");

        assert!(matches!(
            result,
            Err(SessionError::UsernameUnavailable(ref name)) if name == "bob"
        ));
    }

    #[test]
    fn test_check_shape_errors_come_before_availability() {
        let registry = ClientRegistry::new();
        assert_eq!(registry.check(""), Err(SessionError::UsernameRequired));
        assert_eq!(
            registry.check("b o b"),
            Err(SessionError::UsernameNotAlphanumeric)
        );
    }

    #[test]
    fn test_check_is_case_sensitive() {
        let mut registry = ClientRegistry::new();
        registry.register("bob", pid(1)).unwrap();
        assert!(registry.check("Bob").is_ok());
    }

    // =====================================================================
    // register()
    // =====================================================================

    #[test]
    fn test_register_new_name_returns_entry() {
        let mut registry = ClientRegistry::new();

        let entry = registry.register("bob", pid(1)).expect("should succeed");

        assert_eq!(entry.player_id, pid(1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_taken_name_returns_duplicate_and_keeps_owner() {
        let mut registry = ClientRegistry::new();
        registry.register("bob", pid(1)).unwrap();

        let result = registry.register("bob", pid(2));

        assert!(matches!(result, Err(SessionError::DuplicateConnection(_))));
        assert!(!registry.remove("bob", pid(2)));
        assert!(registry.remove("bob", pid(1)), "first owner keeps the name");
    }

    // =====================================================================
    // remove()
    // =====================================================================

    #[test]
    fn test_remove_owner_frees_name() {
        let mut registry = ClientRegistry::new();
        registry.register("bob", pid(1)).unwrap();

        assert!(registry.remove("bob", pid(1)));

        assert!(registry.is_available("bob"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_absent_name_is_noop() {
        let mut registry = ClientRegistry::new();
        assert!(!registry.remove("ghost", pid(1)));
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let mut registry = ClientRegistry::new();
        registry.register("bob", pid(1)).unwrap();

        assert!(registry.remove("bob", pid(1)));
        assert!(!registry.remove("bob", pid(1)));
    }

    #[test]
    fn test_remove_by_other_connection_keeps_entry() {
        // A connection that lost the registration race must not evict
        // the winner when it tears down.
        let mut registry = ClientRegistry::new();
        registry.register("bob", pid(1)).unwrap();

        assert!(!registry.remove("bob", pid(2)));

        assert!(!registry.is_available("bob"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_name_can_be_reused_after_remove() {
        let mut registry = ClientRegistry::new();
        registry.register("bob", pid(1)).unwrap();
        registry.remove("bob", pid(1));

        let entry = registry.register("bob", pid(2)).expect("free again");

        assert_eq!(entry.player_id, pid(2));
    }
}
