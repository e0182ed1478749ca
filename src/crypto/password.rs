//! bcrypt password hashing and verification

use std::fmt;
use std::io::{self, BufRead};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::HashingConfig;
use crate::error::{HashError, HashResult};

/// Lowest cost bcrypt accepts.
pub const MIN_COST: u32 = 4;
/// Highest cost bcrypt accepts.
pub const MAX_COST: u32 = 31;
/// Cost used for seed data unless configured otherwise.
pub const DEFAULT_COST: u32 = 10;

/// bcrypt only reads the first 72 bytes of a password.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Length of an encoded hash: `$2b$10$` followed by salt and digest.
const HASH_LEN: usize = 60;
/// 22 salt characters followed by 31 digest characters.
const SALT_AND_DIGEST_LEN: usize = 53;

/// bcrypt prefix written into the encoded hash.
///
/// All variants share the same algorithm and verify identically. `2x`
/// (the legacy buggy variant) is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashVersion {
    #[serde(rename = "2a")]
    TwoA,
    #[default]
    #[serde(rename = "2b")]
    TwoB,
    #[serde(rename = "2y")]
    TwoY,
}

impl HashVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TwoA => "2a",
            Self::TwoB => "2b",
            Self::TwoY => "2y",
        }
    }
}

impl fmt::Display for HashVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2a" => Ok(Self::TwoA),
            "2b" => Ok(Self::TwoB),
            "2y" => Ok(Self::TwoY),
            other => Err(format!("unsupported bcrypt variant '{}'", other)),
        }
    }
}

impl From<HashVersion> for bcrypt::Version {
    fn from(version: HashVersion) -> Self {
        match version {
            HashVersion::TwoA => bcrypt::Version::TwoA,
            HashVersion::TwoB => bcrypt::Version::TwoB,
            HashVersion::TwoY => bcrypt::Version::TwoY,
        }
    }
}

/// Plaintext password bytes.
///
/// `Debug` never shows the content, so a password can sit inside structs that
/// get logged without leaking.
#[derive(Clone)]
pub struct Password(Vec<u8>);

impl Password {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Read a single line, dropping the trailing `\n` or `\r\n`.
    pub fn read_line<R: BufRead>(mut reader: R) -> io::Result<Self> {
        let mut line = Vec::new();
        reader.read_until(b'\n', &mut line)?;
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        Ok(Self(line))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

impl AsRef<[u8]> for Password {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

/// Variant and cost read back from an encoded hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashInfo {
    pub version: HashVersion,
    pub cost: u32,
}

/// Hashes and verifies passwords with bcrypt at a fixed cost.
///
/// Holds no mutable state; one instance can be shared freely across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
    version: HashVersion,
}

impl PasswordHasher {
    /// Create a hasher emitting `$2b$` hashes at the given cost.
    pub fn new(cost: u32) -> HashResult<Self> {
        validate_cost(cost)?;
        Ok(Self {
            cost,
            version: HashVersion::default(),
        })
    }

    pub fn with_version(mut self, version: HashVersion) -> Self {
        self.version = version;
        self
    }

    pub fn from_config(config: &HashingConfig) -> HashResult<Self> {
        Ok(Self::new(config.cost)?.with_version(config.version))
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn version(&self) -> HashVersion {
        self.version
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: impl AsRef<[u8]>) -> HashResult<String> {
        let password = password.as_ref();
        validate_password(password)?;

        let parts = bcrypt::hash_with_result(password, self.cost)?;
        debug!(cost = self.cost, version = %self.version, "Password hashed");

        Ok(parts.format_for_version(self.version.into()))
    }

    /// Check a password against a stored hash.
    ///
    /// The stored hash's own cost and salt are used, so hashes produced at any
    /// cost verify regardless of this hasher's settings.
    pub fn verify(&self, password: impl AsRef<[u8]>, hash: &str) -> HashResult<bool> {
        verify_password(password, hash)
    }

    /// Whether a stored hash was produced at a different cost than this hasher's.
    pub fn needs_rehash(&self, hash: &str) -> HashResult<bool> {
        Ok(parse_hash(hash)?.cost != self.cost)
    }
}

/// Hash a password using bcrypt
pub fn hash_password(password: impl AsRef<[u8]>, cost: u32) -> HashResult<String> {
    PasswordHasher::new(cost)?.hash(password)
}

/// Verify a password against a hash
///
/// Returns `Ok(false)` for a wrong password and `Err(MalformedHash)` when the
/// hash cannot be parsed; the two are never conflated. Passwords longer than
/// [`MAX_PASSWORD_BYTES`] never match, since bcrypt would only compare their
/// first 72 bytes and [`PasswordHasher::hash`] refuses to produce such hashes.
pub fn verify_password(password: impl AsRef<[u8]>, hash: &str) -> HashResult<bool> {
    let info = parse_hash(hash)?;
    let password = password.as_ref();

    if password.len() > MAX_PASSWORD_BYTES {
        debug!(cost = info.cost, version = %info.version, "Password too long, not verified");
        return Ok(false);
    }

    // Comparison inside bcrypt::verify is constant-time.
    let matched = bcrypt::verify(password, hash)
        .map_err(|e| HashError::MalformedHash(e.to_string()))?;
    debug!(cost = info.cost, version = %info.version, matched, "Password verified");

    Ok(matched)
}

/// Structurally validate an encoded hash and read its variant and cost.
pub fn parse_hash(hash: &str) -> HashResult<HashInfo> {
    let malformed = |reason: &str| HashError::MalformedHash(reason.to_string());

    if hash.len() != HASH_LEN {
        return Err(HashError::MalformedHash(format!(
            "expected {} characters, got {}",
            HASH_LEN,
            hash.len()
        )));
    }

    let mut fields = hash.split('$');
    let (Some(""), Some(prefix), Some(cost), Some(body), None) = (
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
    ) else {
        return Err(malformed("expected $<variant>$<cost>$<salt><digest>"));
    };

    let version = prefix.parse::<HashVersion>().map_err(|e| malformed(e.as_str()))?;

    if cost.len() != 2 || !cost.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed("cost must be two decimal digits"));
    }
    let cost: u32 = cost.parse().map_err(|_| malformed("cost is not a number"))?;
    if !(MIN_COST..=MAX_COST).contains(&cost) {
        return Err(HashError::MalformedHash(format!(
            "cost {} outside {}..={}",
            cost, MIN_COST, MAX_COST
        )));
    }

    if body.len() != SALT_AND_DIGEST_LEN || !body.bytes().all(is_bcrypt_base64) {
        return Err(malformed("salt and digest must be 53 bcrypt base64 characters"));
    }

    Ok(HashInfo { version, cost })
}

fn is_bcrypt_base64(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'.' || b == b'/'
}

fn validate_cost(cost: u32) -> HashResult<()> {
    if (MIN_COST..=MAX_COST).contains(&cost) {
        Ok(())
    } else {
        Err(HashError::InvalidCost {
            cost,
            min: MIN_COST,
            max: MAX_COST,
        })
    }
}

fn validate_password(password: &[u8]) -> HashResult<()> {
    if password.is_empty() {
        return Err(HashError::Encoding("password is empty".to_string()));
    }
    if password.contains(&0) {
        return Err(HashError::Encoding(
            "password contains a NUL byte".to_string(),
        ));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(HashError::Encoding(format!(
            "password is {} bytes, bcrypt reads at most {}",
            password.len(),
            MAX_PASSWORD_BYTES
        )));
    }
    Ok(())
}
