//! fetch_memo - line-oriented front end for the request coordinator
//!
//! Reads one request per stdin line and prints the response body:
//!
//! ```text
//! <group> <path> [key=value ...]
//! :stats
//! :count <group>
//! ```

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fetch_memo::{
    spawn_cleanup_task, Config, FetchError, HttpTransport, MemoryCache, RequestCoordinator,
    RequestDescriptor,
};

/// One parsed input line.
#[derive(Debug, PartialEq)]
enum Command {
    Fetch(RequestDescriptor),
    Stats,
    Count(String),
    Blank,
}

/// Parses a line. `api_key`, when set, is appended as the last parameter.
fn parse_line(line: &str, api_key: Option<&str>) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Ok(Command::Blank);
    };

    match first {
        ":stats" => return Ok(Command::Stats),
        ":count" => {
            let group = words.next().ok_or("usage: :count <group>")?;
            return Ok(Command::Count(group.to_string()));
        }
        _ => {}
    }

    let path = words.next().ok_or("usage: <group> <path> [key=value ...]")?;
    let mut descriptor = RequestDescriptor::new(first, path);
    for word in words {
        let (key, value) = word
            .split_once('=')
            .ok_or_else(|| format!("parameter '{}' is not key=value", word))?;
        descriptor = descriptor.param(key, value);
    }
    if let Some(key) = api_key {
        descriptor = descriptor.param("api_key", key);
    }
    Ok(Command::Fetch(descriptor))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fetch_memo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: base_url={}, default_ttl={:?}, cache_only={}, max_entries={}",
        config.base_url, config.default_ttl, config.cache_only, config.max_entries
    );

    let transport = HttpTransport::from_config(&config).context("building HTTP client")?;
    let cache = MemoryCache::from_config(&config);
    let coordinator = RequestCoordinator::from_config(&config, Arc::new(transport));
    coordinator.remember(None, Arc::new(cache.clone()));

    let cleanup_handle = spawn_cleanup_task(cache.clone(), config.cleanup_interval);

    tokio::select! {
        result = run(&coordinator, &cache, config.api_key.as_deref()) => result?,
        _ = signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
    }

    cleanup_handle.abort();
    info!(
        "Done after {} transport requests",
        coordinator.total_request_count()
    );
    Ok(())
}

async fn run(
    coordinator: &RequestCoordinator,
    cache: &MemoryCache,
    api_key: Option<&str>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let command = match parse_line(&line, api_key) {
            Ok(command) => command,
            Err(message) => {
                warn!("{}", message);
                continue;
            }
        };

        match command {
            Command::Blank => {}
            Command::Stats => {
                let stats = serde_json::to_string(&cache.stats().await)?;
                stdout.write_all(stats.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
            }
            Command::Count(group) => {
                let count = coordinator.request_count(&group);
                stdout.write_all(format!("{}\n", count).as_bytes()).await?;
            }
            Command::Fetch(descriptor) => match coordinator.fetch(&descriptor).await {
                Ok(body) => {
                    stdout.write_all(&body).await?;
                    stdout.write_all(b"\n").await?;
                }
                Err(FetchError::Client(failure)) | Err(FetchError::Server(failure)) => {
                    error!(status = failure.status, "{}", failure.reason());
                }
                Err(err) => error!("{}", err),
            },
        }
        stdout.flush().await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fetch_line() {
        let command = parse_line("champion na/v1.2/champion freeToPlay=true", Some("key")).unwrap();
        let expected = RequestDescriptor::new("champion", "na/v1.2/champion")
            .param("freeToPlay", "true")
            .param("api_key", "key");
        assert_eq!(command, Command::Fetch(expected));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_line("   ", None).unwrap(), Command::Blank);
        assert_eq!(parse_line(":stats", None).unwrap(), Command::Stats);
        assert_eq!(
            parse_line(":count summoner", None).unwrap(),
            Command::Count("summoner".to_string())
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_line("summoner", None).is_err());
        assert!(parse_line(":count", None).is_err());
        assert!(parse_line("summoner na/x novalue", None).is_err());
    }
}
