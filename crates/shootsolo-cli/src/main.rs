//! ShootSolo CLI: query free space and push recordings into the desktop gallery.
//!
//! Reads `~/.config/shootsolo/config.toml` unless `--config` points elsewhere.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use shootsolo_config::Config;
use shootsolo_engine::platform::default_data_dir;
use shootsolo_engine::{
    Bridge, ErrorCode, GalleryError, LocalMediaIndex, ScanRegistrar, StandardDirectories,
};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "shootsolo-cli", about = "ShootSolo storage and gallery tools")]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the free bytes available to the app
    Storage {
        /// Directory whose filesystem is measured
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Copy a recording into the gallery and register it
    ///
    /// Empty files are refused by the desktop index, so saving one always
    /// fails with FAILED after every candidate folder was tried.
    Save {
        /// Recording to save
        path: String,
    },
    /// Write a config file holding the current settings
    InitConfig {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

/// A failure the bridge reported with a channel error code
struct CodedError {
    code: ErrorCode,
    message: String,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {e}");
            process::exit(1);
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(Ok(())) => {}
        Ok(Err(coded)) => {
            eprintln!("Error [{}]: {}", coded.code, coded.message);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<std::result::Result<(), CodedError>> {
    let config_path = cli.config.unwrap_or_else(Config::config_path);
    log::info!("Config path: {}", config_path.display());

    match cli.command {
        Commands::InitConfig { force } => {
            if config_path.exists() && !force {
                bail!(
                    "{} already exists (use --force to replace it)",
                    config_path.display()
                );
            }
            let config = Config::load_or_default(&config_path)?;
            config.save_to_path(&config_path)?;
            println!("Wrote {}", config_path.display());
            Ok(Ok(()))
        }
        Commands::Storage { data_dir } => {
            let config = Config::load_or_default(&config_path)?;
            let data_dir = resolve_data_dir(data_dir, &config)?;
            let bridge = desktop_bridge(&config, data_dir);

            match bridge.storage().available_bytes().await {
                Ok(bytes) => {
                    println!("{bytes}");
                    Ok(Ok(()))
                }
                Err(e) => Ok(Err(CodedError {
                    code: e.code(),
                    message: e.to_string(),
                })),
            }
        }
        Commands::Save { path } => {
            let config = Config::load_or_default(&config_path)?;
            let data_dir = resolve_data_dir(None, &config)?;
            let bridge = desktop_bridge(&config, data_dir);

            match bridge.gallery().save(&path).await {
                Ok(saved) => {
                    println!("{}", saved.confirmation());
                    println!("Handle: {}", saved.handle);
                    Ok(Ok(()))
                }
                Err(e) => {
                    let mut message = e.to_string();
                    if let GalleryError::Failed { attempts } = &e {
                        for attempt in attempts {
                            message.push_str(&format!("\n  {attempt}"));
                        }
                    }
                    Ok(Err(CodedError {
                        code: e.code(),
                        message,
                    }))
                }
            }
        }
    }
}

/// Flag, then config file, then the platform default. Created if missing.
fn resolve_data_dir(flag: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    let data_dir = match flag.or_else(|| config.data_dir.clone()) {
        Some(dir) => dir,
        None => default_data_dir().context("Could not determine a data directory")?,
    };
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;
    Ok(data_dir)
}

fn desktop_bridge(config: &Config, data_dir: PathBuf) -> Bridge {
    let registrar = Arc::new(ScanRegistrar::new(Arc::new(LocalMediaIndex)));
    Bridge::compose(config, data_dir, registrar, StandardDirectories)
}
