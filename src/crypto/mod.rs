//! Password hashing

pub mod password;

pub use password::{
    hash_password, parse_hash, verify_password, HashInfo, HashVersion, Password, PasswordHasher,
    DEFAULT_COST, MAX_COST, MAX_PASSWORD_BYTES, MIN_COST,
};
