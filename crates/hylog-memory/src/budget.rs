use thiserror::Error;

pub const KB: u64 = 1024;
pub const MB: u64 = 1024 * KB;
pub const GB: u64 = 1024 * MB;
pub const TB: u64 = 1024 * GB;

/// Errors produced by [`parse_byte_size`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ByteSizeError {
    #[error("byte size is empty")]
    Empty,
    #[error("invalid byte size number `{0}`")]
    InvalidNumber(String),
    #[error("unknown byte size suffix `{0}`")]
    UnknownSuffix(String),
    #[error("byte size `{0}` overflows u64")]
    Overflow(String),
}

/// Parse a human-friendly byte size such as `512`, `64KiB`, `8 MB` or `2g`.
///
/// All suffixes are binary multiples (`1K == 1024`). Suffix matching is
/// case-insensitive and whitespace between number and suffix is allowed.
pub fn parse_byte_size(input: &str) -> Result<u64, ByteSizeError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ByteSizeError::Empty);
    }

    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, suffix) = trimmed.split_at(split);
    if digits.is_empty() {
        return Err(ByteSizeError::InvalidNumber(trimmed.to_owned()));
    }

    let value = digits
        .parse::<u64>()
        .map_err(|_| ByteSizeError::Overflow(trimmed.to_owned()))?;

    let multiplier = match suffix.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => KB,
        "m" | "mb" | "mib" => MB,
        "g" | "gb" | "gib" => GB,
        "t" | "tb" | "tib" => TB,
        _ => return Err(ByteSizeError::UnknownSuffix(suffix.trim().to_owned())),
    };

    value
        .checked_mul(multiplier)
        .ok_or_else(|| ByteSizeError::Overflow(trimmed.to_owned()))
}
