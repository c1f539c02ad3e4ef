//! Password validation

pub const PASSWORD_MIN_LENGTH: usize = 8;

pub const WEAK_PASSWORD_MESSAGE: &str =
    "Password must be at least 8 characters and contain a number";

/// At least eight characters on a single line, one of them an ASCII digit
pub fn is_valid_password(password: &str) -> bool {
    let single_line = !password
        .chars()
        .any(|c| matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}'));

    single_line
        && password.chars().count() >= PASSWORD_MIN_LENGTH
        && password.chars().any(|c| c.is_ascii_digit())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if is_valid_password(password) {
        Ok(())
    } else {
        Err(WEAK_PASSWORD_MESSAGE.to_string())
    }
}
