//! seed-hasher CLI
//!
//! Hashes and checks bcrypt passwords for seed and migration data. The
//! password is read from stdin (or an environment variable) and is never
//! printed or logged.
//!
//! ```sh
//! # Hash with the configured cost, ready to paste into SQL
//! echo 'Password123!' | seed-hasher hash --format sql
//!
//! # Override cost and variant
//! seed-hasher hash --cost 12 --variant 2a --password-env ADMIN_PASSWORD
//!
//! # Check a stored hash (exit 0 = match, 1 = mismatch, 2 = error)
//! echo 'Password123!' | seed-hasher verify --hash '$2a$10$...'
//!
//! # Validate config without hashing anything
//! seed-hasher check
//! ```

use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{debug, error, info};

use seed_hasher::{
    default_config_path, init_tracing, parse_hash, verify_password, AppConfig, ConfigError,
    HashVersion, OutputFormat, Password, PasswordHasher, SeedHash,
};

/// bcrypt password hashing for database seed data.
#[derive(Parser, Debug)]
#[command(
    name = "seed-hasher",
    version,
    about = "Generate and verify bcrypt password hashes for seed data",
    long_about = "Generate and verify bcrypt password hashes for seed data.\n\n\
                  Default config: ~/.config/seed-hasher/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, env = "SEED_HASHER_CONFIG")]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hash a password and check the result before printing it.
    Hash {
        /// bcrypt cost factor (4-31). Defaults to the configured cost.
        #[arg(long)]
        cost: Option<u32>,

        /// Hash prefix to emit (2a, 2b, 2y). Defaults to the configured variant.
        #[arg(long)]
        variant: Option<HashVersion>,

        /// Output format: plain, sql or json.
        #[arg(short, long, default_value = "plain")]
        format: OutputFormat,

        #[command(flatten)]
        source: PasswordSource,
    },

    /// Check a password against a stored hash.
    Verify {
        /// The stored bcrypt hash.
        #[arg(long)]
        hash: String,

        #[command(flatten)]
        source: PasswordSource,
    },

    /// Validate the configuration and print the effective settings.
    Check,
}

#[derive(Args, Debug)]
struct PasswordSource {
    /// Read the password from this environment variable instead of stdin.
    #[arg(long, value_name = "VAR")]
    password_env: Option<String>,
}

impl PasswordSource {
    fn read(&self) -> Result<Password, Box<dyn Error>> {
        match &self.password_env {
            Some(var) => {
                let value = std::env::var(var)
                    .map_err(|e| format!("cannot read password from ${}: {}", var, e))?;
                Ok(Password::from(value))
            }
            None => Ok(Password::read_line(io::stdin().lock())?),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let explicit_path = cli.config.is_some();
    let loaded = AppConfig::load(&config_path);

    let mut config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => AppConfig::default(),
    };
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config.logging);

    match loaded {
        Ok(_) => info!("Configuration loaded from {}", config_path.display()),
        Err(ConfigError::Io { ref source, .. })
            if !explicit_path && source.kind() == io::ErrorKind::NotFound =>
        {
            debug!("No config at {}, using defaults", config_path.display());
        }
        Err(e) => {
            error!("{}", e);
            if explicit_path || cli.command.is_check() {
                return ExitCode::from(2);
            }
            error!("Using default configuration.");
        }
    }

    match run(cli.command, &config, &config_path) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{}", e);
            ExitCode::from(2)
        }
    }
}

impl Command {
    fn is_check(&self) -> bool {
        matches!(self, Command::Check)
    }
}

/// Run a command, returning the process exit code.
fn run(command: Command, config: &AppConfig, config_path: &Path) -> Result<u8, Box<dyn Error>> {
    match command {
        Command::Hash {
            cost,
            variant,
            format,
            source,
        } => {
            let mut hashing = config.hashing.clone();
            if let Some(cost) = cost {
                info!("CLI override: cost = {}", cost);
                hashing.cost = cost;
            }
            if let Some(variant) = variant {
                info!("CLI override: variant = {}", variant);
                hashing.version = variant;
            }

            let hasher = PasswordHasher::from_config(&hashing)?;
            let password = source.read()?;
            let seed = SeedHash::generate(&hasher, &password)?;

            println!("{}", seed.render(format)?);
            Ok(if seed.verified { 0 } else { 1 })
        }

        Command::Verify { hash, source } => {
            let info = parse_hash(&hash)?;
            let password = source.read()?;

            if verify_password(&password, &hash)? {
                info!(cost = info.cost, version = %info.version, "Password matches");
                println!("valid");
                Ok(0)
            } else {
                info!(cost = info.cost, version = %info.version, "Password does not match");
                println!("invalid");
                Ok(1)
            }
        }

        Command::Check => {
            config.validate()?;
            println!("Configuration is valid");
            println!("   Config file : {}", config_path.display());
            println!("   Cost        : {}", config.hashing.cost);
            println!("   Variant     : {}", config.hashing.version);
            println!("   Log level   : {}", config.logging.level);
            println!("   Log format  : {}", config.logging.format);
            Ok(0)
        }
    }
}
