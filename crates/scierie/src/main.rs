//! `scierie` - CLI for the sawmill management server
//!
//! Runs the HTTP API and offers a few maintenance commands.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;

use scierie::api::{build_router, AppState};
use scierie::cli::{Cli, Command, ConfigCommand, ProfitCommand, ServeCommand};
use scierie::{init_logging, Config, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(config, serve_cmd).await,
        Command::Profit(profit_cmd) => handle_profit(&config, &profit_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

async fn handle_serve(mut config: Config, cmd: ServeCommand) -> anyhow::Result<()> {
    if let Some(listen) = cmd.listen {
        config.server.listen = listen;
    }
    let addr: SocketAddr = config
        .server
        .listen
        .parse()
        .with_context(|| format!("invalid listen address: {}", config.server.listen))?;

    if config.uses_default_secret() {
        tracing::warn!("auth.jwt_secret is the built-in default; set SCIERIE_AUTH__JWT_SECRET");
    }

    let db_path = config.database_path();
    let storage = Storage::open(&db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;
    tracing::info!(path = %db_path.display(), "database ready");

    let require_auth = config.server.require_auth;
    let router = build_router(AppState::new(storage, config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, require_auth, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

fn handle_profit(config: &Config, cmd: &ProfitCommand) -> anyhow::Result<()> {
    let storage = Storage::open(config.database_path())?;
    let summary = storage.recompute_profit()?;
    let currency = &config.company.currency;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Bénéfice");
        println!("--------");
        println!(
            "Production:    {} {currency}",
            scierie::pdf::format_amount(summary.total_production)
        );
        println!(
            "Charges:       {} {currency}",
            scierie::pdf::format_amount(summary.total_charges)
        );
        println!(
            "Dépenses:      {} {currency}",
            scierie::pdf::format_amount(summary.total_depenses)
        );
        println!(
            "Bénéfice net:  {} {currency}",
            scierie::pdf::format_amount(summary.benefice_net)
        );
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Listen:             {}", config.server.listen);
                println!("  Require auth:       {}", config.server.require_auth);
                println!("  Secure cookies:     {}", config.server.secure_cookies);
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Auth]");
                println!(
                    "  JWT secret:         {}",
                    if config.uses_default_secret() {
                        "default"
                    } else {
                        "custom"
                    }
                );
                println!("  Token TTL (days):   {}", config.auth.token_ttl_days);
                println!();
                println!("[Company]");
                println!("  Name:               {}", config.company.name);
                println!("  Currency:           {}", config.company.currency);
                println!(
                    "  Payment mode:       {}",
                    config.company.default_payment_mode
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::check_file(&path)
                .with_context(|| format!("invalid configuration {}", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
