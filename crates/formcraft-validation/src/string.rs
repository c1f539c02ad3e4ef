//! String length validators
//!
//! Lengths are counted in characters, not bytes.

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn validate_min_length(s: &str, min: usize) -> Result<(), String> {
    if char_len(s) >= min {
        Ok(())
    } else {
        Err(format!("Minimum length is {}", min))
    }
}

pub fn validate_max_length(s: &str, max: usize) -> Result<(), String> {
    if char_len(s) <= max {
        Ok(())
    } else {
        Err(format!("Maximum length is {}", max))
    }
}
