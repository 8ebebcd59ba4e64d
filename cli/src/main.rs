//! bulkcrypt - bulk encrypt or decrypt a directory tree.
//!
//! Without a subcommand an interactive menu is started. With `encrypt` or
//! `decrypt` a single run is performed and the exit code reports the outcome.

mod menu;
mod report;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use bulkcrypt_core::constants::DEFAULT_CHUNK_SIZE;
use bulkcrypt_core::crypto::{Algorithm, Mode};
use bulkcrypt_core::stream::{run_job, EngineConfig, Job, ParallelismProfile};

use crate::menu::Menu;
use crate::report::{print_summary, CliObserver};

/// Every file succeeded.
const EXIT_OK: u8 = 0;
/// The run finished but at least one file failed.
const EXIT_FILE_FAILURES: u8 = 1;
/// The run could not start.
const EXIT_FATAL: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "bulkcrypt", version, about = "Bulk encrypt or decrypt files with a block cipher")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Bytes read from each input per chunk
    #[arg(long, global = true, value_name = "BYTES", env = "BULKCRYPT_CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Maximum worker threads (defaults to the CPU count)
    #[arg(long, global = true, value_name = "N", env = "BULKCRYPT_WORKERS")]
    workers: Option<usize>,

    /// Print the run telemetry as JSON after the summary
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encrypt a file or every file under a directory
    Encrypt(TransformArgs),
    /// Decrypt a file or every file under a directory
    Decrypt(TransformArgs),
}

#[derive(Args, Debug)]
struct TransformArgs {
    /// File or directory to process
    path: PathBuf,

    /// aes-128, aes-192, aes-256, des, 3des (or the menu number)
    #[arg(short, long)]
    algorithm: Algorithm,

    #[command(flatten)]
    key: KeyArgs,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct KeyArgs {
    /// Key as literal text; its UTF-8 bytes are used as-is
    #[arg(long)]
    key: Option<String>,

    /// Key as hex-encoded bytes
    #[arg(long = "key-hex", value_name = "HEX")]
    key_hex: Option<String>,
}

impl KeyArgs {
    fn to_bytes(&self) -> Result<Vec<u8>> {
        match (&self.key, &self.key_hex) {
            (Some(text), _) => Ok(text.as_bytes().to_vec()),
            (None, Some(h)) => hex::decode(h.trim()).context("--key-hex is not valid hex"),
            (None, None) => anyhow::bail!("a key is required (--key or --key-hex)"),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(cli.verbose) {
        eprintln!("Warning: {e:#}");
    }

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    let config = engine_config(cli).context("Invalid configuration")?;

    match &cli.command {
        None => {
            let stdin = io::stdin();
            Menu::new(stdin.lock(), io::stdout(), config, cli.json).run()?;
            Ok(EXIT_OK)
        }
        Some(Command::Encrypt(args)) => run_once(Mode::Encrypt, args, &config, cli.json, &mut io::stdout()),
        Some(Command::Decrypt(args)) => run_once(Mode::Decrypt, args, &config, cli.json, &mut io::stdout()),
    }
}

fn engine_config(cli: &Cli) -> Result<EngineConfig> {
    let profile = match cli.workers {
        Some(n) => ParallelismProfile { max_workers: n },
        None => ParallelismProfile::dynamic(),
    };
    let config = EngineConfig::new(cli.chunk_size, profile);
    config.validate()?;
    Ok(config)
}

/// One non-interactive run. Returns the process exit code; fatal setup
/// errors come back as `Err`.
fn run_once<W: Write>(mode: Mode, args: &TransformArgs, config: &EngineConfig, json: bool, out: &mut W) -> Result<u8> {
    let key = args.key.to_bytes()?;
    let job = Job::from_root(mode, args.algorithm, &key, &args.path)
        .with_context(|| format!("cannot prepare job for {}", args.path.display()))?;

    let report = run_job(&job, config, &mut CliObserver::new(&mut *out))?;
    print_summary(out, &report, json)?;

    Ok(if report.has_failures() { EXIT_FILE_FAILURES } else { EXIT_OK })
}

fn setup_logging(verbose: bool) -> Result<()> {
    let default = if verbose {
        "bulkcrypt=debug,warn"
    } else {
        "bulkcrypt=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_names(true)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to install log subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(path: PathBuf, algorithm: Algorithm, key: &str) -> TransformArgs {
        TransformArgs {
            path,
            algorithm,
            key: KeyArgs { key: Some(key.to_string()), key_hex: None },
        }
    }

    fn config() -> EngineConfig {
        EngineConfig::new(512, ParallelismProfile::new(2))
    }

    #[test]
    fn test_cli_parses_subcommand_and_globals() {
        let cli = Cli::try_parse_from([
            "bulkcrypt", "encrypt", "/tmp/x", "--algorithm", "aes-256", "--key-hex", "00ff", "--chunk-size", "4096",
            "--json",
        ])
        .expect("valid arguments");
        assert_eq!(cli.chunk_size, 4096);
        assert!(cli.json);
        match cli.command {
            Some(Command::Encrypt(a)) => {
                assert_eq!(a.algorithm, Algorithm::Aes256);
                assert_eq!(a.key.to_bytes().unwrap(), vec![0x00, 0xff]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_both_key_forms() {
        let res = Cli::try_parse_from([
            "bulkcrypt", "decrypt", "/tmp/x", "-a", "des", "--key", "8bytekey", "--key-hex", "00",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_algorithm() {
        let res = Cli::try_parse_from(["bulkcrypt", "encrypt", "/tmp/x", "-a", "rc4", "--key", "k"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_cli_without_subcommand_is_menu() {
        let cli = Cli::try_parse_from(["bulkcrypt"]).expect("no arguments is valid");
        assert!(cli.command.is_none());
        assert_eq!(cli.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_engine_config_rejects_zero_workers() {
        let cli = Cli::try_parse_from(["bulkcrypt", "--workers", "0"]).expect("parses");
        assert!(engine_config(&cli).is_err());
    }

    #[test]
    fn test_run_once_round_trip_and_exit_codes() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("test.txt"), "hello").expect("Failed to write file");

        let mut out = Vec::new();
        let code = run_once(Mode::Encrypt, &args(dir.path().to_path_buf(), Algorithm::Aes128, "0123456789abcdef"), &config(), true, &mut out)
            .expect("encrypt run");
        assert_eq!(code, EXIT_OK);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("* Thread 0: test.txt -> Encryption_"));
        assert!(text.contains("\"files_ok\": 1"));

        // Decrypting the plaintext file itself fails for that file only.
        let mut out = Vec::new();
        let code = run_once(Mode::Decrypt, &args(dir.path().join("test.txt"), Algorithm::Aes128, "0123456789abcdef"), &config(), false, &mut out)
            .expect("decrypt run");
        assert_eq!(code, EXIT_FILE_FAILURES);
        assert!(String::from_utf8(out).unwrap().contains("encryption/decryption failed"));
    }

    #[test]
    fn test_run_once_rejects_bad_key_length() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("test.txt"), "hello").expect("Failed to write file");

        let mut out = Vec::new();
        let res = run_once(Mode::Encrypt, &args(dir.path().to_path_buf(), Algorithm::Aes256, "too short"), &config(), false, &mut out);
        assert!(res.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
