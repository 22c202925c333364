//! sca: chunked password file encryption
//!
//! Commands:
//!   encrypt <file>  - write <file>.enc next to the source
//!   decrypt <file>  - turn name.ext.enc back into "name [decrypted].ext"
//!   config show     - display current configuration
//!
//! The password comes from SCA_PASSWORD or an interactive prompt.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use sca_core::config::ScaConfig;
use sca_core::types::{MSG_BAD_SELECTION, MSG_LOADING};
use sca_core::{describe_progress, Direction};
use sca_engine::{FileCipherEngine, ProgressSink};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "sca",
    version,
    about = "Encrypt and decrypt files with a password",
    long_about = "sca: encrypt and decrypt files of any size with a password, 100 MB at a time"
)]
struct Cli {
    /// Path to config.toml
    #[arg(
        long,
        short = 'c',
        env = "SCA_CONFIG",
        default_value = "~/.config/sca/config.toml"
    )]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides [log] level
    #[arg(long, env = "SCA_LOG")]
    log: Option<String>,

    /// Log format; overrides [log] format
    #[arg(long, env = "SCA_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt a file to <FILE>.enc
    Encrypt {
        /// File to encrypt
        file: PathBuf,
    },

    /// Decrypt a .enc file next to itself
    Decrypt {
        /// Encrypted file (must end in .enc)
        file: PathBuf,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

#[derive(Clone, Debug, ValueEnum, PartialEq)]
enum LogFormat {
    Json,
    Text,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config_path = expand_tilde(&cli.config);
    let config = load_config(&config_path).await?;
    config.validate().context("invalid configuration")?;

    let directives = log_directives(
        cli.log.as_deref(),
        &config.log.level,
        std::env::var("RUST_LOG").ok(),
    );
    let format = match cli.log_format.clone() {
        Some(format) => format,
        None => <LogFormat as ValueEnum>::from_str(&config.log.format, true)
            .map_err(|e| anyhow::anyhow!("config [log] format: {e}"))?,
    };
    init_logging(&directives, &format);

    debug!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        "sca starting"
    );

    match cli.command {
        Commands::Encrypt { file } => cmd_transform(&config, &file, Direction::Encrypt).await,
        Commands::Decrypt { file } => cmd_transform(&config, &file, Direction::Decrypt).await,
        Commands::Config {
            action: ConfigAction::Show,
        } => {
            cmd_config_show(&config, &config_path)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn load_config(path: &Path) -> Result<ScaConfig> {
    if path.exists() {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading config: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config: {}", path.display()))
    } else {
        Ok(ScaConfig::default())
    }
}

/// Filter directives in priority order: `--log`/`SCA_LOG`, then `RUST_LOG`,
/// then `[log] level` from the config file.
fn log_directives(cli_level: Option<&str>, config_level: &str, rust_log: Option<String>) -> String {
    match (cli_level, rust_log) {
        (Some(level), _) => level.to_string(),
        (None, Some(env)) if !env.trim().is_empty() => env,
        (None, _) => config_level.to_string(),
    }
}

fn init_logging(directives: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries status lines; logs go to stderr
    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Expand `~` in path to the user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    match s.strip_prefix("~/") {
        Some(rest) => {
            let home = std::env::var("HOME").unwrap_or_default();
            PathBuf::from(home).join(rest)
        }
        None => path.to_path_buf(),
    }
}

// ── Progress display ──────────────────────────────────────────────────────────

fn make_progress_bar(total: u64, prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template("{prefix:.bold} {msg}\n[{bar:40.cyan/blue}] {percent}%")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    pb.set_style(style);
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Shows engine progress on a terminal progress bar.
///
/// Status lines are printed to stdout even when the bar is hidden, so they
/// still show up when output is piped.
struct TerminalSink {
    pb: ProgressBar,
}

impl ProgressSink for TerminalSink {
    fn on_progress(&self, bytes_processed: u64, total_bytes: u64) {
        self.pb.set_length(total_bytes);
        self.pb.set_position(bytes_processed);
        self.pb
            .set_message(describe_progress(bytes_processed, total_bytes));
    }

    fn on_message(&self, text: &str) {
        self.pb.suspend(|| println!("{text}"));
    }
}

// ── `sca encrypt` / `sca decrypt` ────────────────────────────────────────────

/// What a file chooser would have allowed: an existing regular file, and a
/// `.enc` one when decrypting.
fn check_selection(file: &Path, direction: Direction) -> Result<u64> {
    let metadata = std::fs::metadata(file)
        .with_context(|| format!("cannot read {}", file.display()))?;
    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", file.display());
    }
    if direction == Direction::Decrypt && !sca_crypto::has_enc_suffix(file) {
        anyhow::bail!(
            "{} is not an encrypted file (expected a {} suffix)",
            file.display(),
            sca_crypto::ENC_SUFFIX
        );
    }
    Ok(metadata.len())
}

fn read_password() -> Result<SecretString> {
    if let Ok(password) = std::env::var("SCA_PASSWORD") {
        return Ok(SecretString::from(password));
    }
    let password = rpassword::prompt_password("Password: ").context("reading password")?;
    Ok(SecretString::from(password))
}

async fn cmd_transform(config: &ScaConfig, file: &Path, direction: Direction) -> Result<ExitCode> {
    let total = match check_selection(file, direction) {
        Ok(total) => total,
        Err(e) => {
            println!("{MSG_BAD_SELECTION}");
            eprintln!("{e:#}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let password = read_password()?;

    let pb = make_progress_bar(total, &direction.to_string());
    let sink = Arc::new(TerminalSink { pb: pb.clone() });
    sink.on_message(MSG_LOADING);

    let mut engine = FileCipherEngine::new(config.engine.clone());
    let result = engine.run(Some(&password), file, direction, sink).await;
    pb.finish_and_clear();

    match result {
        Ok(report) => {
            info!(
                destination = %report.destination.display(),
                bytes = report.bytes_processed,
                skipped = report.skipped_chunks,
                "{direction} finished"
            );
            println!("{}", report.destination.display());
            Ok(ExitCode::SUCCESS)
        }
        // the sink has already shown the status line
        Err(e) => {
            debug!(error = %e, "{direction} failed");
            Ok(ExitCode::FAILURE)
        }
    }
}

// ── `sca config show` ────────────────────────────────────────────────────────

fn cmd_config_show(config: &ScaConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!(
            "# Configuration: defaults (no file at {})",
            config_path.display()
        );
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_encrypt() {
        let cli = Cli::try_parse_from(["sca", "encrypt", "report.txt"]).unwrap();
        match cli.command {
            Commands::Encrypt { file } => assert_eq!(file, PathBuf::from("report.txt")),
            other => panic!("expected Encrypt, got: {other:?}"),
        }
    }

    #[test]
    fn test_parse_log_overrides() {
        let cli = Cli::try_parse_from([
            "sca",
            "--log",
            "debug",
            "--log-format",
            "json",
            "decrypt",
            "a.txt.enc",
        ])
        .unwrap();
        assert_eq!(cli.log.as_deref(), Some("debug"));
        assert_eq!(cli.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn test_log_flag_overrides_rust_log() {
        let directives = log_directives(Some("debug"), "warn", Some("trace".into()));
        assert_eq!(directives, "debug");
    }

    #[test]
    fn test_rust_log_overrides_config_level() {
        assert_eq!(log_directives(None, "warn", Some("sca_engine=info".into())), "sca_engine=info");
        assert_eq!(log_directives(None, "error", Some("  ".into())), "error");
        assert_eq!(log_directives(None, "error", None), "error");
    }

    #[test]
    fn test_expand_tilde() {
        let home = std::env::var("HOME").unwrap_or_default();
        assert_eq!(
            expand_tilde(Path::new("~/.config/sca/config.toml")),
            PathBuf::from(home).join(".config/sca/config.toml")
        );
        assert_eq!(
            expand_tilde(Path::new("/etc/sca.toml")),
            PathBuf::from("/etc/sca.toml")
        );
    }

    #[test]
    fn test_check_selection() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("notes.txt");
        let encrypted = dir.path().join("notes.txt.enc");
        std::fs::write(&plain, b"hello").unwrap();
        std::fs::write(&encrypted, [0u8; 16]).unwrap();

        assert_eq!(check_selection(&plain, Direction::Encrypt).unwrap(), 5);
        assert_eq!(check_selection(&encrypted, Direction::Decrypt).unwrap(), 16);
        assert!(check_selection(&plain, Direction::Decrypt).is_err());
        assert!(check_selection(dir.path(), Direction::Encrypt).is_err());
        assert!(check_selection(&dir.path().join("missing"), Direction::Encrypt).is_err());
    }

    #[tokio::test]
    async fn test_load_config_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("nope.toml")).await.unwrap();
        assert_eq!(config.engine.max_plain_chunk, 100_000_000);
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[engine]\nmax_plain_chunk = 4096\n").unwrap();
        let config = load_config(&path).await.unwrap();
        assert_eq!(config.engine.max_plain_chunk, 4096);
    }
}
