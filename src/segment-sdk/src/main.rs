//! Segment SDK — replays segmentation updates through the host bridge.
//!
//! Registers host callbacks for the requested categories, feeds a JSON file
//! of segmentation updates through the registry and prints every event the
//! host would receive as one JSON line on stdout.

use anyhow::Context;
use clap::Parser;
use segment_sdk_core::{SdkConfig, SegmentationData};
use segment_sdk_mobile::{SegmentationBridge, SegmentationDataEvent};
use segment_sdk_segmentation::SegmentationCallbackRegistry;
use serde::Deserialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "segment-sdk")]
#[command(about = "Replay segmentation updates through registered host callbacks")]
#[command(version)]
struct Cli {
    /// Category to register a host callback for (repeatable)
    #[arg(long = "category", required = true)]
    categories: Vec<String>,

    /// Deliver already-known data to callbacks at registration time
    #[arg(long, default_value_t = false)]
    include_first_load: bool,

    /// JSON file holding a list of `{ "category", "segments" }` updates
    #[arg(long)]
    updates: Option<PathBuf>,

    /// Replay the updates before registering callbacks
    #[arg(long, default_value_t = false)]
    register_late: bool,

    /// Host event channel capacity (overrides config)
    #[arg(long, env = "SEGMENT_SDK__BRIDGE__EVENT_BUFFER_SIZE")]
    event_buffer_size: Option<usize>,

    /// Emit logs as JSON (overrides config)
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

#[derive(Debug, Deserialize)]
struct SegmentationUpdate {
    category: String,
    segments: SegmentationData,
}

fn init_tracing(config: &SdkConfig, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.filter.as_str().into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json || config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_updates(path: Option<&PathBuf>) -> anyhow::Result<Vec<SegmentationUpdate>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading updates from {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing updates in {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_result = SdkConfig::load();
    let mut config = config_result.as_ref().cloned().unwrap_or_default();
    if let Some(size) = cli.event_buffer_size {
        config.bridge.event_buffer_size = size;
    }
    // One dispatch notifies at most one callback per category.
    config.bridge.event_buffer_size = config.bridge.event_buffer_size.max(cli.categories.len());

    init_tracing(&config, cli.json_logs);
    if let Err(e) = config_result {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    let updates = read_updates(cli.updates.as_ref())?;
    info!(
        categories = ?cli.categories,
        updates = updates.len(),
        event_buffer_size = config.bridge.event_buffer_size,
        "Segment SDK starting"
    );

    let registry = Arc::new(SegmentationCallbackRegistry::new());
    let (bridge, mut events) = SegmentationBridge::new(registry.clone(), &config.bridge);

    let stdout = std::io::stdout();
    let delivered = replay(&bridge, &mut events, &cli, updates, &mut stdout.lock()).await?;

    info!(
        delivered,
        remaining_callbacks = registry.len(),
        "Segment SDK finished"
    );
    Ok(())
}

/// Register the requested callbacks, dispatch `updates` and write every host
/// event as a JSON line to `out`. The channel is drained after each bridge
/// call so no event is lost to a full buffer. Returns the events written.
async fn replay<W: Write>(
    bridge: &SegmentationBridge,
    events: &mut mpsc::Receiver<SegmentationDataEvent>,
    cli: &Cli,
    updates: Vec<SegmentationUpdate>,
    out: &mut W,
) -> anyhow::Result<usize> {
    let mut delivered = 0;
    let mut callback_ids = Vec::new();

    if !cli.register_late {
        callback_ids = register_all(bridge, cli).await?;
        delivered += drain(events, out)?;
    }
    for update in updates {
        bridge
            .dispatch_segmentation_data(&update.category, update.segments)
            .await?;
        delivered += drain(events, out)?;
    }
    if cli.register_late {
        callback_ids = register_all(bridge, cli).await?;
        delivered += drain(events, out)?;
    }

    for id in &callback_ids {
        bridge.unregister_segmentation_data_callback(id).await?;
    }
    Ok(delivered)
}

fn drain<W: Write>(
    events: &mut mpsc::Receiver<SegmentationDataEvent>,
    out: &mut W,
) -> anyhow::Result<usize> {
    let mut written = 0;
    while let Ok(event) = events.try_recv() {
        writeln!(out, "{}", serde_json::to_string(&event)?)?;
        written += 1;
    }
    Ok(written)
}

async fn register_all(bridge: &SegmentationBridge, cli: &Cli) -> anyhow::Result<Vec<String>> {
    let mut ids = Vec::with_capacity(cli.categories.len());
    for category in &cli.categories {
        let id = bridge
            .register_segmentation_data_callback(category, cli.include_first_load)
            .await?;
        ids.push(id);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use segment_sdk_core::config::BridgeConfig;
    use segment_sdk_core::Segment;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("segment-sdk").chain(args.iter().copied()))
    }

    fn updates(category: &str, count: usize) -> Vec<SegmentationUpdate> {
        (0..count)
            .map(|i| SegmentationUpdate {
                category: category.to_string(),
                segments: SegmentationData::new(vec![Segment::new(i.to_string(), "seg")]),
            })
            .collect()
    }

    fn bridge(buffer: usize) -> (SegmentationBridge, mpsc::Receiver<SegmentationDataEvent>) {
        SegmentationBridge::new(
            Arc::new(SegmentationCallbackRegistry::new()),
            &BridgeConfig {
                event_buffer_size: buffer,
            },
        )
    }

    #[tokio::test]
    async fn test_replay_writes_every_event_beyond_buffer_size() {
        let (bridge, mut events) = bridge(4);
        let cli = cli(&["--category", "discovery"]);
        let mut out = Vec::new();

        let delivered = replay(&bridge, &mut events, &cli, updates("discovery", 300), &mut out)
            .await
            .unwrap();

        assert_eq!(delivered, 300);
        let lines: Vec<&str> = std::str::from_utf8(&out).unwrap().lines().collect();
        assert_eq!(lines.len(), 300);
        let last: SegmentationDataEvent = serde_json::from_str(lines[299]).unwrap();
        assert_eq!(last.data.segments[0].id, "299");
        assert!(bridge.registry().is_empty());
    }

    #[tokio::test]
    async fn test_replay_with_late_first_load_gets_latest_only() {
        let (bridge, mut events) = bridge(2);
        let cli = cli(&[
            "--category",
            "discovery",
            "--category",
            "content",
            "--include-first-load",
            "--register-late",
        ]);
        let mut out = Vec::new();

        let delivered = replay(&bridge, &mut events, &cli, updates("discovery", 5), &mut out)
            .await
            .unwrap();

        assert_eq!(delivered, 1);
        let event: SegmentationDataEvent =
            serde_json::from_str(std::str::from_utf8(&out).unwrap().trim()).unwrap();
        assert_eq!(event.data.segments[0].id, "4");
    }
}
