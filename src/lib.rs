//! # seed-hasher
//!
//! bcrypt password hashing for database seed and migration data.
//!
//! - **crypto**: [`PasswordHasher`], hashing and constant-time verification
//! - **seed**: generate a self-checked hash and render it for a migration
//! - **config**: TOML configuration (`~/.config/seed-hasher/config.toml`)
//! - **telemetry**: tracing subscriber setup
//!
//! ```no_run
//! use seed_hasher::{verify_password, PasswordHasher};
//!
//! let hasher = PasswordHasher::new(10)?;
//! let hash = hasher.hash("Password123!")?;
//! assert!(verify_password("Password123!", &hash)?);
//! # Ok::<(), seed_hasher::HashError>(())
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod seed;
pub mod telemetry;

pub use config::{default_config_path, AppConfig, HashingConfig, LoggingConfig, CONFIG_ENV};
pub use crypto::{
    hash_password, parse_hash, verify_password, HashInfo, HashVersion, Password, PasswordHasher,
};
pub use error::{ConfigError, HashError, HashResult};
pub use seed::{OutputFormat, SeedHash};
pub use telemetry::init_tracing;
