use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use scrollfx_core::effects::ScrollTo;
use scrollfx_core::{AppConfig, Ticker, Viewport};
use tokio::sync::{mpsc, watch};
use tracing::info;

/// Extra time after the scroll so trailing scrub and snap frames settle
const SETTLE_MS: u64 = 500;

pub async fn run(
    config: &AppConfig,
    path: &Path,
    to: Option<f64>,
    duration_ms: f64,
    fps: Option<u32>,
) -> Result<()> {
    let mut runtime = super::load_runtime(config, path)?;

    let (_, viewport) = runtime.page.viewport_size();
    let (_, document) = runtime.page.document_size();
    let destination = to.unwrap_or((document - viewport).max(0.0));
    runtime.engine.scroll_to(
        ScrollTo::offset(destination).duration(duration_ms),
        &mut runtime.page,
    )?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (report_tx, mut report_rx) = mpsc::unbounded_channel();

    let run_for = Duration::from_millis(duration_ms.max(0.0) as u64 + SETTLE_MS);
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(run_for) => {}
            _ = tokio::signal::ctrl_c() => info!("Interrupted"),
        }
        let _ = shutdown_tx.send(true);
    });

    println!(
        "Playing `{}`: scrolling to {:.0} over {:.0}ms\n",
        runtime.name, destination, duration_ms
    );

    let mut ticker =
        Ticker::new(fps.unwrap_or(config.engine.frame_rate)).with_report_sender(report_tx);
    let frames = ticker
        .run(&mut runtime.engine, &mut runtime.page, shutdown_rx)
        .await;

    let mut faults = 0;
    while let Ok(report) = report_rx.try_recv() {
        for event in &report.events {
            let name = event
                .label
                .clone()
                .unwrap_or_else(|| runtime.trigger_name(event.trigger));
            println!(
                "  {:>8.1}ms  y={:>7.1}  {} {}",
                report.sample.timestamp_ms, report.sample.scroll_y, name, event.kind
            );
        }
        for fault in &report.faults {
            faults += 1;
            println!("  ! {}", fault);
        }
    }

    println!("\n{} frames, {} faults", frames, faults);
    for trigger in runtime.snapshot() {
        println!("  {:<24} {:.3}", trigger.name, trigger.progress);
    }
    Ok(())
}
