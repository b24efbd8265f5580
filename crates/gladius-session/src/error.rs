//! Error types for the session layer.

/// Errors that can occur while logging a client in.
///
/// The first three are validation failures: their `Display` text is
/// exactly what the client is shown. `DuplicateConnection` means the
/// username looked free but another connection registered it first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The username is empty or only whitespace.
    #[error("Username is required")]
    UsernameRequired,

    /// The username contains something other than ASCII letters, digits
    /// or underscores.
    #[error("Usernames must be alphanumeric")]
    UsernameNotAlphanumeric,

    /// Another connected client already uses this username.
    #[error("Username is not available")]
    UsernameUnavailable(String),

    /// Registration lost a race against a concurrent login with the same
    /// username.
    #[error("username {0} was registered by another connection")]
    DuplicateConnection(String),
}

impl SessionError {
    /// The reason sent back in a failed login response.
    pub fn client_message(&self) -> String {
        match self {
            Self::DuplicateConnection(_) => "Error connecting.".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_validation_uses_display_text() {
        assert_eq!(
            SessionError::UsernameUnavailable("bob".into()).client_message(),
            "Username is not available"
        );
        assert_eq!(
            SessionError::UsernameRequired.client_message(),
            "Username is required"
        );
    }

    #[test]
    fn test_client_message_duplicate_is_generic() {
        let err = SessionError::DuplicateConnection("bob".into());
        assert_eq!(err.client_message(), "Error connecting.");
    }
}
