//! `quizbot` entry point.
//!
//! Parses CLI arguments, opens the question catalog, then serves the webhook
//! or runs one of the catalog maintenance commands.

mod chat;
mod cli;
mod config;
mod http;
mod seed;
mod state;
mod twiml;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use quiz_core::model::SenderId;
use services::Clock;
use storage::repository::Storage;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match cli.verbose {
            0 => "warn",
            1 => "info,quizbot=debug,services=debug,storage=debug",
            _ => "trace",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = config::load_config(&cli.config).await;
    if let Some(url) = cli.db {
        config.database.url = url;
    }

    let storage = Storage::sqlite(&config.database.url)
        .await
        .with_context(|| format!("failed to open catalog at {}", config.database.url))?;
    let state = AppState::from_storage(&storage, Clock::default());

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);

            let idle_timeout = config.session.idle_timeout_secs;
            if idle_timeout > 0 {
                state::spawn_idle_sweeper(
                    state.engine.clone(),
                    Duration::from_secs(idle_timeout),
                    Duration::from_secs(config.session.sweep_interval_secs.max(1)),
                );
            }

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            tracing::info!(%addr, "quizbot listening");

            axum::serve(listener, http::build_router(state))
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            tracing::info!("server stopped");
        }

        Commands::Chat { sender } => {
            let sender = SenderId::new(sender)?;
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            chat::run_chat(&state.engine, &sender, stdin, tokio::io::stdout()).await?;
        }

        Commands::Seed { file } => {
            let ids = seed::seed_from_file(&state.questions, &file).await?;
            println!("Added {} question(s).", ids.len());
        }

        Commands::List => {
            let questions = state.questions.list_questions().await?;
            if questions.is_empty() {
                println!("No questions.");
            }
            for q in &questions {
                println!("[{}] ({}) {}", q.id(), q.kind(), q.text());
                for (i, option) in q.options().iter().enumerate() {
                    println!("     {}. {option}", i + 1);
                }
                println!("     answer: {}", q.correct_answer());
            }
        }

        Commands::Delete { id } => {
            state.questions.delete_question(id).await?;
            println!("Deleted question {id}.");
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
