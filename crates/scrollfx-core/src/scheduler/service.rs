use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::engine::ScrollEngine;
use crate::frame::FrameReport;
use crate::host::Host;

use super::{FrameScheduler, FrameToken};

/// Real-time frame driver backed by a tokio interval
pub struct Ticker {
    period: Duration,
    pending: Option<FrameToken>,
    next: u64,
    report_tx: Option<mpsc::UnboundedSender<FrameReport>>,
}

impl Ticker {
    /// Create a ticker firing `frame_rate` times per second
    pub fn new(frame_rate: u32) -> Self {
        let frame_rate = frame_rate.max(1);
        Self {
            period: Duration::from_secs_f64(1.0 / f64::from(frame_rate)),
            pending: None,
            next: 0,
            report_tx: None,
        }
    }

    /// Forward every frame report to a channel
    pub fn with_report_sender(mut self, tx: mpsc::UnboundedSender<FrameReport>) -> Self {
        self.report_tx = Some(tx);
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    fn send_report(&self, report: FrameReport) {
        if let Some(ref tx) = self.report_tx {
            if tx.send(report).is_err() {
                warn!("Failed to send frame report: receiver dropped");
            }
        }
    }

    /// Drive `engine` until shutdown or until the engine is stopped.
    ///
    /// Returns the number of frames run.
    pub async fn run(
        &mut self,
        engine: &mut ScrollEngine,
        host: &mut dyn Host,
        mut shutdown: watch::Receiver<bool>,
    ) -> u64 {
        info!("Ticker started: {:?} per frame", self.period);

        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let origin = Instant::now();
        let mut frames = 0;

        engine.start(self);

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Ticker received shutdown signal");
                        break;
                    }
                }

                _ = interval.tick() => {
                    let Some(token) = self.pending.take() else {
                        debug!("No frame requested, ticker idle");
                        break;
                    };
                    let timestamp = origin.elapsed().as_secs_f64() * 1000.0;
                    if let Some(report) = engine.on_frame(token, timestamp, &mut *host, self) {
                        frames += 1;
                        self.send_report(report);
                    }
                    if !engine.is_running() {
                        break;
                    }
                }
            }
        }

        engine.stop(self);
        info!("Ticker stopped after {} frames", frames);
        frames
    }
}

impl FrameScheduler for Ticker {
    fn schedule(&mut self) -> FrameToken {
        self.next += 1;
        let token = FrameToken(self.next);
        self.pending = Some(token);
        token
    }

    fn cancel(&mut self, token: FrameToken) {
        if self.pending == Some(token) {
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::config::EngineConfig;
    use crate::host::Viewport;
    use crate::page::Page;
    use crate::trigger::TriggerOptions;

    #[tokio::test(start_paused = true)]
    async fn test_ticker_runs_until_shutdown() {
        let mut page = Page::new(800.0, 600.0).with_document_size(800.0, 3000.0);
        let mut engine = ScrollEngine::new(EngineConfig::default());
        let updates = Rc::new(Cell::new(0));
        let seen = updates.clone();
        engine
            .create_trigger(
                TriggerOptions::scroll(0.0, 1000.0).on_update(move |_, _| {
                    seen.set(seen.get() + 1);
                    Ok(())
                }),
                &page,
            )
            .unwrap();
        page.set_scroll_offset(0.0, 500.0);

        let (tx, rx) = watch::channel(false);
        let (report_tx, mut report_rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let _ = tx.send(true);
        });

        let mut ticker = Ticker::new(60).with_report_sender(report_tx);
        let frames = ticker.run(&mut engine, &mut page, rx).await;

        assert!((5..=8).contains(&frames), "ran {} frames", frames);
        assert_eq!(updates.get(), frames);
        assert!(!engine.is_running());

        let mut reports = 0;
        while report_rx.try_recv().is_ok() {
            reports += 1;
        }
        assert_eq!(reports, frames);
    }

    #[test]
    fn test_period_from_frame_rate() {
        assert_eq!(Ticker::new(60).period().as_micros(), 16_666);
        assert_eq!(Ticker::new(1).period(), Duration::from_secs(1));
        assert_eq!(Ticker::new(0).period(), Duration::from_secs(1));
    }
}
