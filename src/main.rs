// tinyfaas - command-line client for the tinyFaaS control plane
// Main entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;

use tinyfaas_client::config::{load_config, load_config_from, ClientConfig};
use tinyfaas_client::errors::{user_hint, FaasError};
use tinyfaas_client::FaasClient;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "tinyfaas")]
#[command(about = "Client for the tinyFaaS control plane", version)]
struct Args {
    /// Control-plane host (overrides config and TINYFAAS_HOST)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Control-plane management port
    #[arg(long, global = true)]
    port: Option<String>,

    /// Port deployed functions are invoked on (default: 8000)
    #[arg(long = "invoke-port", global = true)]
    invoke_port: Option<u16>,

    /// Root directory for relative function paths
    #[arg(long = "base-path", global = true)]
    base_path: Option<PathBuf>,

    /// Config file to read instead of ~/.tinyfaas/config.toml
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Package a local directory and deploy it
    Upload {
        /// Function name
        name: String,
        /// Source directory (relative to --base-path unless --full-path)
        path: String,
        /// Runtime environment, e.g. nodejs or python3
        #[arg(value_name = "ENV")]
        runtime: String,
        /// Number of function threads
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        threads: u32,
        /// Treat PATH as absolute
        #[arg(long = "full-path")]
        full_path: bool,
        /// Environment variable for the function, repeatable
        #[arg(short = 'e', long = "env", value_name = "KEY=VALUE", value_parser = parse_env_var)]
        envs: Vec<String>,
    },
    /// Deploy a function from a zip archive at a URL
    UploadUrl {
        /// Function name
        name: String,
        /// URL of the zip archive
        url: String,
        /// Folder inside the archive holding the function
        subfolder: String,
        /// Runtime environment
        #[arg(value_name = "ENV")]
        runtime: String,
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        threads: u32,
        #[arg(short = 'e', long = "env", value_name = "KEY=VALUE", value_parser = parse_env_var)]
        envs: Vec<String>,
    },
    /// Delete a deployed function
    Delete {
        name: String,
    },
    /// List deployed functions
    List,
    /// Delete every deployed function
    Wipe,
    /// Show execution logs
    Logs,
    /// Call a deployed function
    Invoke {
        name: String,
        /// Request body
        #[arg(long, conflicts_with = "data_file")]
        data: Option<String>,
        /// Read the request body from a file
        #[arg(long = "data-file")]
        data_file: Option<PathBuf>,
    },
}

fn parse_env_var(value: &str) -> std::result::Result<String, String> {
    match value.split_once('=') {
        Some((key, _)) if !key.is_empty() => Ok(value.to_string()),
        _ => Err(format!("expected KEY=VALUE, got '{}'", value)),
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let args = Args::parse();

    if let Err(err) = run(args).await {
        eprintln!("\x1b[1;31mError:\x1b[0m {:#}", err);
        if let Some(hint) = err.downcast_ref::<FaasError>().and_then(user_hint) {
            eprintln!("\n{}", hint);
        }
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = resolve_config(&args)?;
    let client = FaasClient::new(config)?;

    match args.command {
        Command::Upload {
            name,
            path,
            runtime,
            threads,
            full_path,
            envs,
        } => {
            let body = client
                .upload_local(&name, &path, &runtime, threads, full_path, &envs)
                .await?;
            println!("{}", body);
        }
        Command::UploadUrl {
            name,
            url,
            subfolder,
            runtime,
            threads,
            envs,
        } => {
            let body = client
                .upload_from_url(&name, &subfolder, &runtime, threads, &url, &envs)
                .await?;
            println!("{}", body);
        }
        Command::Delete { name } => {
            client.delete(&name).await?;
            println!("Deleted '{}'", name);
        }
        Command::List => println!("{}", client.list_functions().await?),
        Command::Wipe => {
            client.wipe_all().await?;
            println!("Wiped all functions");
        }
        Command::Logs => println!("{}", client.fetch_logs().await?),
        Command::Invoke {
            name,
            data,
            data_file,
        } => {
            let payload = read_payload(data, data_file)?;
            let body = client.invoke(&name, payload).await?;
            // raw bytes: function responses need not be text
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(&body)
                .context("Failed to write response to stdout")?;
            stdout.flush().context("Failed to write response to stdout")?;
        }
    }

    Ok(())
}

/// Config file and environment first, then command-line flags on top
fn resolve_config(args: &Args) -> Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => load_config_from(path, |key| std::env::var(key).ok())?,
        None => load_config()?,
    };

    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = &args.port {
        config.port = port.clone();
    }
    if let Some(port) = args.invoke_port {
        config.invoke_port = port;
    }
    if let Some(base_path) = &args.base_path {
        config.base_path = base_path.clone();
    }

    Ok(config)
}

/// --data, --data-file, piped stdin, or an empty body
fn read_payload(data: Option<String>, data_file: Option<PathBuf>) -> Result<Vec<u8>> {
    if let Some(data) = data {
        return Ok(data.into_bytes());
    }
    if let Some(path) = data_file {
        return std::fs::read(&path)
            .with_context(|| format!("Failed to read payload from {}", path.display()));
    }

    let mut payload = Vec::new();
    if !io::stdin().is_terminal() {
        io::stdin()
            .read_to_end(&mut payload)
            .context("Failed to read payload from stdin")?;
    }
    Ok(payload)
}

/// Initialize tracing on stderr, leaving stdout for response bodies
///
/// Default: INFO level, overridden by RUST_LOG. TINYFAAS_DEBUG=1 switches
/// the default to DEBUG.
fn init_tracing() {
    let show_debug = std::env::var("TINYFAAS_DEBUG")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false);
    let default_level = if show_debug { "debug" } else { "info" };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    // Bridge log crate → tracing (for dependencies using log crate)
    tracing_log::LogTracer::init().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upload_with_envs() {
        let args = Args::try_parse_from([
            "tinyfaas", "--host", "faas.local", "upload", "sieve", "fns/sieve", "nodejs",
            "--threads", "2", "-e", "A=1", "--env", "B=two",
        ])
        .unwrap();

        assert_eq!(args.host.as_deref(), Some("faas.local"));
        match args.command {
            Command::Upload {
                name,
                path,
                runtime,
                threads,
                full_path,
                envs,
            } => {
                assert_eq!(name, "sieve");
                assert_eq!(path, "fns/sieve");
                assert_eq!(runtime, "nodejs");
                assert_eq!(threads, 2);
                assert!(!full_path);
                assert_eq!(envs, vec!["A=1", "B=two"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_zero_threads_rejected() {
        let result = Args::try_parse_from(["tinyfaas", "upload", "f", "p", "nodejs", "--threads", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_env_var_needs_key() {
        assert!(parse_env_var("KEY=").is_ok());
        assert!(parse_env_var("=value").is_err());
        assert!(parse_env_var("novalue").is_err());
    }

    #[test]
    fn test_invoke_data_conflicts_with_file() {
        let result = Args::try_parse_from([
            "tinyfaas", "invoke", "echo", "--data", "x", "--data-file", "/tmp/x",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "host = \"from-file\"\nport = 9999\n").unwrap();

        let args = Args::try_parse_from([
            "tinyfaas", "--config", path.to_str().unwrap(), "--port", "8080", "list",
        ])
        .unwrap();
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.port, "8080");
        // host comes from the file unless TINYFAAS_HOST is set in the test environment
        if std::env::var("TINYFAAS_HOST").is_err() {
            assert_eq!(config.host, "from-file");
        }
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");

        let args = Args::try_parse_from([
            "tinyfaas", "--config", missing.to_str().unwrap(), "list",
        ])
        .unwrap();
        let err = resolve_config(&args).unwrap_err();
        assert!(format!("{:#}", err).contains("missing.toml"));
    }

    #[test]
    fn test_read_payload_prefers_data() {
        let payload = read_payload(Some("hello".to_string()), None).unwrap();
        assert_eq!(payload, b"hello");
    }
}
