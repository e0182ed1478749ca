use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by password hashing and verification.
///
/// None of these are transient: callers should reject the operation rather
/// than retry it.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("Invalid cost {cost}: must be between {min} and {max}")]
    InvalidCost { cost: u32, min: u32, max: u32 },

    #[error("Malformed hash: {0}")]
    MalformedHash(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Hashing backend error: {0}")]
    Backend(#[from] bcrypt::BcryptError),
}

impl HashError {
    /// Whether the stored hash itself is corrupt or in a foreign format,
    /// as opposed to the password simply not matching.
    pub fn is_malformed(&self) -> bool {
        matches!(self, HashError::MalformedHash(_))
    }
}

/// Result type for hashing operations
pub type HashResult<T> = Result<T, HashError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_malformed_hash_is_malformed() {
        assert!(HashError::MalformedHash("bad prefix".into()).is_malformed());
        assert!(!HashError::Encoding("empty".into()).is_malformed());
        assert!(!HashError::InvalidCost {
            cost: 3,
            min: 4,
            max: 31
        }
        .is_malformed());
    }

    #[test]
    fn test_invalid_cost_message() {
        let err = HashError::InvalidCost {
            cost: 40,
            min: 4,
            max: 31,
        };
        assert_eq!(err.to_string(), "Invalid cost 40: must be between 4 and 31");
    }
}
