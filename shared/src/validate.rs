// Display name rules, enforced at the client boundary before registration is
// sent and again on the server before a record is created.

pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameError {
    TooShort,
    TooLong,
    InvalidCharacters,
}

impl std::fmt::Display for NameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameError::TooShort => write!(f, "name must be at least {MIN_NAME_LEN} characters"),
            NameError::TooLong => write!(f, "name must be at most {MAX_NAME_LEN} characters"),
            NameError::InvalidCharacters => write!(f, "name contains unsupported characters"),
        }
    }
}

impl std::error::Error for NameError {}

/// Validates a display name, returning the trimmed value on success.
pub fn validate_name(value: &str) -> Result<String, NameError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();

    if len < MIN_NAME_LEN {
        return Err(NameError::TooShort);
    }
    if len > MAX_NAME_LEN {
        return Err(NameError::TooLong);
    }

    // Keep names readable in logs and chat; same charset on both sides.
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-'))
    {
        return Err(NameError::InvalidCharacters);
    }

    Ok(trimmed.to_string())
}
