//! Seed-data hashes
//!
//! Produces a hash for a migration script and checks it against the password
//! before handing it out.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{info, warn};

use crate::crypto::{HashVersion, Password, PasswordHasher};
use crate::error::HashResult;

/// How a [`SeedHash`] is rendered for output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// The bare hash string
    #[default]
    Plain,
    /// A single-quoted SQL string literal
    Sql,
    /// A JSON object with hash metadata
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Sql => write!(f, "sql"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "sql" => Ok(Self::Sql),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown format '{}', expected plain, sql or json",
                other
            )),
        }
    }
}

/// A freshly generated hash together with its self-check result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedHash {
    pub hash: String,
    pub cost: u32,
    pub version: HashVersion,
    /// Whether the new hash verified against the password it was made from
    pub verified: bool,
}

impl SeedHash {
    pub fn generate(hasher: &PasswordHasher, password: &Password) -> HashResult<Self> {
        let hash = hasher.hash(password)?;
        let verified = hasher.verify(password, &hash)?;

        if verified {
            info!(
                cost = hasher.cost(),
                version = %hasher.version(),
                "Seed hash generated and verified"
            );
        } else {
            warn!(
                cost = hasher.cost(),
                version = %hasher.version(),
                "Generated hash failed to verify"
            );
        }

        Ok(Self {
            hash,
            cost: hasher.cost(),
            version: hasher.version(),
            verified,
        })
    }

    pub fn render(&self, format: OutputFormat) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Plain => Ok(self.hash.clone()),
            OutputFormat::Sql => Ok(format!("'{}'", self.hash)),
            OutputFormat::Json => serde_json::to_string_pretty(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Password123!";

    fn generate() -> SeedHash {
        let hasher = PasswordHasher::new(4).unwrap();
        SeedHash::generate(&hasher, &Password::from(SAMPLE)).unwrap()
    }

    #[test]
    fn test_generate_self_checks() {
        let seed = generate();
        assert!(seed.verified);
        assert_eq!(seed.cost, 4);
        assert_eq!(seed.version, HashVersion::TwoB);
        assert!(seed.hash.starts_with("$2b$04$"));
    }

    #[test]
    fn test_generate_rejects_empty_password() {
        let hasher = PasswordHasher::new(4).unwrap();
        let err = SeedHash::generate(&hasher, &Password::from("")).unwrap_err();
        assert!(matches!(err, crate::error::HashError::Encoding(_)));
    }

    #[test]
    fn test_render_formats() {
        let seed = generate();

        assert_eq!(seed.render(OutputFormat::Plain).unwrap(), seed.hash);
        assert_eq!(
            seed.render(OutputFormat::Sql).unwrap(),
            format!("'{}'", seed.hash)
        );

        let json: serde_json::Value =
            serde_json::from_str(&seed.render(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["hash"], seed.hash.as_str());
        assert_eq!(json["cost"], 4);
        assert_eq!(json["version"], "2b");
        assert_eq!(json["verified"], true);
    }

    #[test]
    fn test_renderings_never_contain_plaintext() {
        let seed = generate();
        for format in [OutputFormat::Plain, OutputFormat::Sql, OutputFormat::Json] {
            assert!(!seed.render(format).unwrap().contains(SAMPLE));
        }
        assert!(!format!("{:?}", seed).contains(SAMPLE));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("SQL".parse::<OutputFormat>().unwrap(), OutputFormat::Sql);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
