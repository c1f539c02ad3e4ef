//! Email validation

use once_cell::sync::Lazy;
use regex::Regex;

pub const INVALID_EMAIL_MESSAGE: &str = "Invalid email address";

// Something, an @, something, a dot, something. No whitespace anywhere.
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").unwrap());

/// Validates the loose `user@host.tld` shape
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(INVALID_EMAIL_MESSAGE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("user+tag@example.co.uk"));
        // Loose on purpose: anything non-blank around @ and a dot
        assert!(is_valid_email("a@@b.c"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("abc"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("@b.com"));
    }

    #[test]
    fn test_validate_email_message() {
        assert_eq!(validate_email("abc"), Err("Invalid email address".to_string()));
        assert_eq!(validate_email("a@b.com"), Ok(()));
    }
}
