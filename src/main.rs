// execdemo/src/main.rs
//
// Copyright (c) 2025 Arcella Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use execdemo::command::Command;
use execdemo::config::{self, ExecConfig};
use execdemo::log;
use execdemo::package::{self, PackageLayout};
use execdemo::render;
use execdemo::result::{ExecResult, ResultSlot};
use execdemo::submitter::CommandSubmitter;

/// execdemo: submit commands to the /exec demo backend
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (default: <base>/config/execdemo.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Overrides `client.endpoint`
    #[arg(long, global = true, value_name = "URL")]
    endpoint: Option<String>,

    /// Print the raw JSON result instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute raw SQL text
    Query {
        /// Query text
        text: String,
    },
    /// Insert or update a product
    Product {
        #[arg(long, default_value = "")]
        sku: String,
        #[arg(long, default_value = "")]
        desc: String,
        #[arg(long, default_value = "")]
        price: String,
    },
    /// Insert a customer
    Customer {
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Place an order
    Order {
        #[arg(long, default_value = "")]
        cid: String,
        #[arg(long, default_value = "")]
        sku: String,
    },
    /// List the configured sample queries
    Samples,
    /// Submit a sample query by its index
    Sample {
        index: usize,
    },
    /// Package the web UI build (package.json, build/, package/)
    Package {
        /// Project root (default: `package.root` from config)
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,
    },
}

async fn submit_and_print(config: &ExecConfig, command: Command, json: bool) -> anyhow::Result<ExitCode> {
    let submitter = CommandSubmitter::from_config(&config.client)?;
    let slot = ResultSlot::new();

    submitter.submit_into(&command, &slot).await;
    let result = slot
        .get()
        .await
        .unwrap_or_else(|| ExecResult::error("no result recorded"));

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render::render_text(&result));
    }

    Ok(if result.is_error() { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

async fn handle_command(config: &ExecConfig, cmd: Commands, json: bool) -> anyhow::Result<ExitCode> {
    match cmd {
        Commands::Query { text } => submit_and_print(config, Command::query(text), json).await,
        Commands::Product { sku, desc, price } => {
            submit_and_print(config, Command::Product { sku, desc, price }, json).await
        }
        Commands::Customer { name } => submit_and_print(config, Command::Customer { name }, json).await,
        Commands::Order { cid, sku } => submit_and_print(config, Command::Order { cid, sku }, json).await,
        Commands::Samples => {
            for (i, sample) in config.client.samples.iter().enumerate() {
                println!("{}: {}", i, sample);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Sample { index } => {
            let sample = config
                .client
                .samples
                .get(index)
                .with_context(|| {
                    format!("no sample #{} ({} configured)", index, config.client.samples.len())
                })?
                .clone();
            submit_and_print(config, Command::query(sample), json).await
        }
        Commands::Package { root } => {
            let root = root.unwrap_or_else(|| config.package.root.clone());
            let layout = PackageLayout::from_root(&root);
            let report = package::run(&layout).await?;
            println!(
                "Packaged {} file(s), manifest written to {}",
                report.files_copied,
                report.manifest_path.display()
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // 1. Load configuration
    let (mut config, warnings) = config::load(cli.config.as_deref()).await?;
    if let Some(endpoint) = cli.endpoint {
        config.client.endpoint = endpoint;
    }

    // 2. Initialize logging, then report what happened before it existed
    let log_guard = log::init(&config.log)?;
    for warning in &warnings {
        match warning {
            config::ConfigLoadWarning::DefaultsUsed { .. } => tracing::debug!("{}", warning),
            _ => tracing::warn!("{}", warning),
        }
    }
    tracing::debug!("Starting up (v{})", env!("CARGO_PKG_VERSION"));

    let code = handle_command(&config, cli.command, cli.json).await;

    drop(log_guard);
    code
}
