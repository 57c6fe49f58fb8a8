//! `vertex-watch`: tail one or more Vertex event streams from the terminal.
//!
//! Streams requested more than once share a single connection through the
//! registry, which makes this binary a convenient live check of the
//! deduplication behavior against a real server.

use anyhow::Result;
use api::auth::{login, Credentials};
use colored::*;
use log::*;
use service::config::Config;
use service::logging::Logger;
use service::AppState;
use sse::event::ERROR_EVENT;
use sse::{Registry, StaticToken};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::new();
    Logger::init_logger(&config);

    let http_client = Arc::new(reqwest::Client::new());
    let app_state = AppState::new(config.clone(), &http_client);

    let token = resolve_token(&app_state).await?;
    match &token {
        Some(_) => println!("{} Session established", "✓".green()),
        None => println!(
            "{} No token or credentials given; connecting anonymously",
            "→".blue()
        ),
    }

    let registry = Registry::new(
        config.api_base_url.clone(),
        Arc::new(StaticToken::new(token)),
    );

    let mut subscriptions = Vec::new();
    for path in &config.streams {
        let connection_id = registry.subscribe(path)?;

        for event_name in &config.events {
            let stream_label = path.clone();
            registry.add_event_handler(
                &connection_id,
                event_name,
                Arc::new(move |event| {
                    let payload = event
                        .json()
                        .map(|value| value.to_string())
                        .unwrap_or_else(|_| event.data.clone());
                    println!(
                        "{} {} {} {}",
                        "←".cyan(),
                        stream_label.bold(),
                        event.event_type.yellow(),
                        payload
                    );
                }),
            )?;
        }

        let stream_label = path.clone();
        registry.add_event_handler(
            &connection_id,
            ERROR_EVENT,
            Arc::new(move |event| {
                warn!("Stream {} reported: {}", stream_label, event.data);
            }),
        )?;

        subscriptions.push(connection_id);
        println!("{} Watching {path}", "✓".green());
    }

    info!(
        "{} watcher(s) across {} shared connection(s)",
        subscriptions.len(),
        registry.len()
    );

    tokio::signal::ctrl_c().await?;
    println!("\n{} Shutting down", "→".blue());

    for connection_id in &subscriptions {
        registry.unsubscribe(connection_id)?;
    }
    registry.shutdown();

    Ok(())
}

/// Prefer an explicit token; fall back to logging in with credentials.
async fn resolve_token(state: &AppState) -> Result<Option<String>> {
    if let Some(token) = state.config.token() {
        return Ok(Some(token));
    }

    let Some(raw) = state.config.credentials() else {
        return Ok(None);
    };

    let credentials = Credentials::parse(&raw)?;
    println!("{} Authenticating {}...", "→".blue(), credentials.username);
    let auth = login(
        state.http_client_ref(),
        &state.config.api_base_url,
        &credentials,
    )
    .await?;

    Ok(Some(auth.token))
}
