use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use search_coalescer::{CoalescerConfig, HttpFetcher, Renderer, SearchCoalescer, SharedQuery};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Type-ahead tag search: every stdin line replaces the search text.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, env = "SEARCH_SERVER_URL", default_value = "http://127.0.0.1:8080")]
    server_url: String,
    #[arg(long, default_value_t = 300)]
    debounce_ms: u64,
    /// Per-request timeout; 0 waits forever.
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,
}

impl Args {
    fn coalescer_config(&self) -> CoalescerConfig {
        CoalescerConfig::default()
            .with_debounce(Duration::from_millis(self.debounce_ms))
            .with_request_timeout((self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms)))
    }
}

#[derive(Default)]
struct StdoutRenderer {
    rendered: AtomicU64,
}

#[async_trait]
impl Renderer for StdoutRenderer {
    async fn render(&self, content: String) {
        let n = self.rendered.fetch_add(1, Ordering::Relaxed) + 1;
        println!("--- results #{n} ---");
        println!("{content}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let fetcher = HttpFetcher::new(&args.server_url)
        .with_context(|| format!("invalid server url '{}'", args.server_url))?;
    info!(endpoint = %fetcher.endpoint(), debounce_ms = args.debounce_ms, "search client ready");

    let query = SharedQuery::default();
    let coalescer = SearchCoalescer::spawn(
        args.coalescer_config(),
        Arc::new(query.clone()),
        Arc::new(fetcher),
        Arc::new(StdoutRenderer::default()),
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        query.set(line).await;
        coalescer.notify_changed();
    }

    coalescer.wait_until_idle().await;
    let status = coalescer.status();
    info!(
        dispatches = status.dispatches,
        renders = status.renders,
        failures = status.failures,
        "input closed; search settled"
    );
    coalescer.shutdown().await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_edit_page_timing() {
        let args = Args::try_parse_from(["search_cli"]).expect("args");
        let config = args.coalescer_config();
        assert_eq!(config.debounce, Duration::from_millis(300));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn zero_timeout_disables_request_timeout() {
        let args = Args::try_parse_from([
            "search_cli",
            "--server-url",
            "http://localhost:9000",
            "--debounce-ms",
            "100",
            "--timeout-ms",
            "0",
        ])
        .expect("args");
        let config = args.coalescer_config();
        assert_eq!(args.server_url, "http://localhost:9000");
        assert_eq!(config.debounce, Duration::from_millis(100));
        assert_eq!(config.request_timeout, None);
    }
}
