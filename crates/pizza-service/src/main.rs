//! Main entry point for the PizzaBahn ordering assistant.
//!
//! Serves the chat API when `[api]` is enabled; otherwise runs a console
//! conversation on stdin/stdout, which is handy with the scripted reply
//! backend.

use clap::Parser;
use pizza_config::Config;
use pizza_core::AssistantEngine;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

mod apis;
mod factory_registry;
mod server;

/// Command-line arguments for the assistant service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started PizzaBahn assistant");

	let config = Config::from_file(&args.config)?;
	tracing::info!(
		"Loaded configuration [{}] from {}",
		config.assistant.name,
		args.config.display()
	);

	let engine = Arc::new(factory_registry::build_assistant_from_config(config.clone())?);
	engine.initialize().await?;
	let maintenance = engine.spawn_maintenance();

	match config.api.filter(|api| api.enabled) {
		Some(api_config) => {
			tokio::select! {
				result = server::start_server(api_config, Arc::clone(&engine)) => {
					tracing::info!("API server finished");
					result?;
				}
				_ = tokio::signal::ctrl_c() => {
					tracing::info!("Received interrupt");
				}
			}
		},
		None => {
			tracing::info!("API disabled, starting console conversation");
			run_console(&engine).await?;
		},
	}

	maintenance.abort();
	engine.shutdown().await?;
	tracing::info!("Stopped PizzaBahn assistant");
	Ok(())
}

/// Reads customer messages line by line until EOF.
async fn run_console(engine: &AssistantEngine) -> Result<(), Box<dyn std::error::Error>> {
	let session_id = uuid::Uuid::new_v4().to_string();
	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	let mut stdout = tokio::io::stdout();

	stdout.write_all(b"> ").await?;
	stdout.flush().await?;
	while let Some(line) = lines.next_line().await? {
		if !line.trim().is_empty() {
			let reply = engine.process_message(&session_id, &line).await?;
			stdout.write_all(format!("{}\n\n", reply.text).as_bytes()).await?;
		}
		stdout.write_all(b"> ").await?;
		stdout.flush().await?;
	}
	Ok(())
}
