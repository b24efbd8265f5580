//! Username rules.

use crate::SessionError;

/// Checks the shape of a username, without looking at who is connected.
///
/// Rules, checked in order:
/// - not empty after trimming whitespace
/// - only ASCII letters, digits and `_` (no surrounding whitespace either)
pub fn validate_username(username: &str) -> Result<(), SessionError> {
    if username.trim().is_empty() {
        return Err(SessionError::UsernameRequired);
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(SessionError::UsernameNotAlphanumeric);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_accepts_word_characters() {
        assert!(validate_username("bob").is_ok());
        assert!(validate_username("Bob_42").is_ok());
        assert!(validate_username("7").is_ok());
    }

    #[test]
    fn test_validate_username_empty_is_required() {
        assert_eq!(validate_username(""), Err(SessionError::UsernameRequired));
        assert_eq!(
            validate_username("   "),
            Err(SessionError::UsernameRequired)
        );
    }

    #[test]
    fn test_validate_username_rejects_punctuation_and_spaces() {
        for name in ["bob!", "bo b", " bob", "bob-1", "bøb"] {
            assert_eq!(
                validate_username(name),
                Err(SessionError::UsernameNotAlphanumeric),
                "{name:?} should be rejected"
            );
        }
    }
}
