//! Broadcast loop: periodic force-refresh and delivery of subscribed topics.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use livepath_core::traits::sink::OutputSink;
use livepath_realtime::channel::table::SubscriptionTable;
use livepath_service::refresh::Refresher;

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    /// Waiting for the next tick.
    Idle,
    /// Refreshing and delivering the current tick's topics.
    Broadcasting,
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Active topics at the start of the tick.
    pub topics: usize,
    /// Topics whose value was handed to the sink.
    pub delivered: usize,
    /// Topics skipped because their refresh failed.
    pub failed: usize,
}

/// Periodically re-publishes every subscribed topic.
///
/// Topics within a tick are refreshed concurrently and independently: one
/// failing or slow producer only affects its own topic. A tick that runs
/// past the interval delays the next one instead of overlapping it.
pub struct BroadcastLoop {
    channels: Arc<SubscriptionTable>,
    refresher: Refresher,
    sink: Arc<dyn OutputSink>,
    interval: Duration,
    state: watch::Sender<LoopState>,
}

impl std::fmt::Debug for BroadcastLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastLoop")
            .field("interval", &self.interval)
            .field("state", &self.state())
            .finish()
    }
}

impl BroadcastLoop {
    /// Create a loop ticking every `interval`.
    pub fn new(
        channels: Arc<SubscriptionTable>,
        refresher: Refresher,
        sink: Arc<dyn OutputSink>,
        interval: Duration,
    ) -> Self {
        let (state, _) = watch::channel(LoopState::Idle);
        Self {
            channels,
            refresher,
            sink,
            interval: interval.max(Duration::from_millis(1)),
            state,
        }
    }

    /// Current state.
    pub fn state(&self) -> LoopState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<LoopState> {
        self.state.subscribe()
    }

    /// Run until the cancel signal is received. The first tick fires one
    /// interval after start.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(interval_ms = self.interval.as_millis() as u64, "Broadcast loop started");

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.state.send_replace(LoopState::Broadcasting);
                    let outcome = tokio::select! {
                        report = self.tick_once() => Some(report),
                        _ = wait_for_cancel(&mut cancel) => None,
                    };
                    self.state.send_replace(LoopState::Idle);

                    match outcome {
                        Some(report) if report.topics > 0 => {
                            debug!(
                                topics = report.topics,
                                delivered = report.delivered,
                                failed = report.failed,
                                "Broadcast tick complete"
                            );
                        }
                        Some(_) => {}
                        None => break,
                    }
                }
            }
        }

        self.state.send_replace(LoopState::Idle);
        info!("Broadcast loop stopped");
    }

    /// Run one tick: snapshot active topics, force-refresh each concurrently,
    /// and deliver every successful result to the sink.
    pub async fn tick_once(&self) -> TickReport {
        let topics = self.channels.active_topics();
        let mut report = TickReport {
            topics: topics.len(),
            ..TickReport::default()
        };

        let mut tasks = JoinSet::new();
        for topic in topics {
            let refresher = self.refresher.clone();
            let sink = Arc::clone(&self.sink);
            tasks.spawn(async move {
                match refresher.resolve(&topic, true).await {
                    Ok(payload) => {
                        sink.deliver(&topic, payload).await;
                        Ok(())
                    }
                    Err(e) => Err((topic, e)),
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err((topic, e))) => {
                    report.failed += 1;
                    warn!(topic = %topic, error = %e, "Refresh failed, skipping delivery");
                }
                Err(e) => {
                    report.failed += 1;
                    error!(error = %e, "Broadcast task panicked");
                }
            }
        }

        report
    }
}

/// Resolves once the cancel flag is set or its sender is gone.
async fn wait_for_cancel(cancel: &mut watch::Receiver<bool>) {
    let _ = cancel.wait_for(|stop| *stop).await;
}
