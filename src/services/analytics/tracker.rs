//! Analytics Tracker
//!
//! Aggregates formatting events in memory. Events are sent over a bounded
//! async channel with `try_send` so recording never blocks the formatting
//! path; a background task folds them into per-tool and per-format counters.
//! When the channel is full the event is dropped and counted.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use result_formatting_core::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::FormattingAnalytics;
use crate::models::config::AnalyticsConfig;

/// Channel capacity between recorders and the aggregation task.
pub const CHANNEL_CAPACITY: usize = 1024;
/// Number of most recent errors kept in the snapshot.
pub const MAX_RECENT_ERRORS: usize = 100;
/// How often errors older than the retention period are pruned.
const PRUNE_INTERVAL_SECS: u64 = 3600;

/// Message type for the tracker channel
#[derive(Debug)]
pub enum TrackerMessage {
    Formatted {
        tool_id: String,
        format: String,
        processing_time_ms: f64,
        quality_score: f64,
    },
    Error(ErrorEvent),
    CacheHit { tool_id: String },
    CacheMiss,
    Interaction {
        tool_id: String,
        format: String,
        action: String,
    },
    /// Reply with the current aggregate
    Snapshot(oneshot::Sender<AnalyticsSnapshot>),
    /// Stop the aggregation task
    Shutdown,
}

/// A recorded failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
    pub tool_id: String,
    /// `CoreError::kind()` of the failure
    pub kind: String,
    pub message: String,
    pub context: String,
    pub at: DateTime<Utc>,
}

/// Per-tool counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUsage {
    pub formatted: u64,
    pub errors: u64,
    pub cache_hits: u64,
    pub interactions: u64,
}

/// Aggregated analytics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub total_formatted: u64,
    pub total_errors: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub avg_processing_time_ms: f64,
    pub avg_quality_score: f64,
    pub by_tool: BTreeMap<String, ToolUsage>,
    pub by_format: BTreeMap<String, u64>,
    pub recent_errors: Vec<ErrorEvent>,
    /// Events lost because the channel was full or closed
    pub dropped_events: u64,
}

#[derive(Default)]
struct Aggregate {
    snapshot: AnalyticsSnapshot,
    total_processing_ms: f64,
    total_quality: f64,
    recent_errors: VecDeque<ErrorEvent>,
}

impl Aggregate {
    fn apply(&mut self, msg: TrackerMessage, track_interactions: bool) {
        let snap = &mut self.snapshot;
        match msg {
            TrackerMessage::Formatted {
                tool_id,
                format,
                processing_time_ms,
                quality_score,
            } => {
                snap.total_formatted += 1;
                snap.by_tool.entry(tool_id).or_default().formatted += 1;
                *snap.by_format.entry(format).or_default() += 1;
                self.total_processing_ms += processing_time_ms;
                self.total_quality += quality_score;
                let n = snap.total_formatted as f64;
                snap.avg_processing_time_ms = self.total_processing_ms / n;
                snap.avg_quality_score = self.total_quality / n;
            }
            TrackerMessage::Error(event) => {
                snap.total_errors += 1;
                snap.by_tool.entry(event.tool_id.clone()).or_default().errors += 1;
                self.recent_errors.push_back(event);
                while self.recent_errors.len() > MAX_RECENT_ERRORS {
                    self.recent_errors.pop_front();
                }
            }
            TrackerMessage::CacheHit { tool_id } => {
                snap.cache_hits += 1;
                snap.by_tool.entry(tool_id).or_default().cache_hits += 1;
            }
            TrackerMessage::CacheMiss => {
                snap.cache_misses += 1;
            }
            TrackerMessage::Interaction { tool_id, .. } if track_interactions => {
                snap.by_tool.entry(tool_id).or_default().interactions += 1;
            }
            TrackerMessage::Interaction { .. } => {}
            TrackerMessage::Snapshot(_) | TrackerMessage::Shutdown => {}
        }
    }

    fn prune(&mut self, retention_days: u32) {
        let cutoff = Utc::now() - ChronoDuration::days(i64::from(retention_days));
        let before = self.recent_errors.len();
        self.recent_errors.retain(|e| e.at >= cutoff);
        let pruned = before - self.recent_errors.len();
        if pruned > 0 {
            debug!(pruned, "Pruned expired error events");
        }
    }

    fn snapshot(&self, dropped: u64) -> AnalyticsSnapshot {
        let mut snap = self.snapshot.clone();
        snap.recent_errors = self.recent_errors.iter().cloned().collect();
        snap.dropped_events = dropped;
        snap
    }
}

/// Channel-backed analytics aggregator.
pub struct AnalyticsTracker {
    sender: mpsc::Sender<TrackerMessage>,
    dropped: std::sync::Arc<AtomicU64>,
    closed: AtomicBool,
    config: AnalyticsConfig,
}

impl AnalyticsTracker {
    /// Create a tracker and spawn its aggregation task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: AnalyticsConfig) -> Self {
        let (sender, receiver) = mpsc::channel::<TrackerMessage>(CHANNEL_CAPACITY);
        let dropped = std::sync::Arc::new(AtomicU64::new(0));

        let task_config = config.clone();
        let task_dropped = dropped.clone();
        tokio::spawn(async move {
            Self::process_messages(receiver, task_config, task_dropped).await;
        });

        Self {
            sender,
            dropped,
            closed: AtomicBool::new(false),
            config,
        }
    }

    /// Background task that folds events into the aggregate
    async fn process_messages(
        mut receiver: mpsc::Receiver<TrackerMessage>,
        config: AnalyticsConfig,
        dropped: std::sync::Arc<AtomicU64>,
    ) {
        let mut aggregate = Aggregate::default();
        let mut prune_interval =
            tokio::time::interval(tokio::time::Duration::from_secs(PRUNE_INTERVAL_SECS));

        loop {
            tokio::select! {
                msg = receiver.recv() => {
                    match msg {
                        Some(TrackerMessage::Snapshot(reply)) => {
                            let _ = reply.send(aggregate.snapshot(dropped.load(Ordering::Relaxed)));
                        }
                        Some(TrackerMessage::Shutdown) | None => {
                            debug!(
                                formatted = aggregate.snapshot.total_formatted,
                                "Analytics tracker stopped"
                            );
                            break;
                        }
                        Some(msg) => aggregate.apply(msg, config.track_user_interactions),
                    }
                }
                _ = prune_interval.tick() => {
                    aggregate.prune(config.retention_period_days);
                }
            }
        }
    }

    fn send(&self, msg: TrackerMessage) {
        if !self.config.enabled || self.closed.load(Ordering::Relaxed) {
            return;
        }
        if let Err(e) = self.sender.try_send(msg) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            if matches!(e, mpsc::error::TrySendError::Full(_)) {
                warn!("Analytics channel full, dropping event");
            }
        }
    }

    /// Current aggregate, including every event recorded before this call.
    pub async fn snapshot(&self) -> CoreResult<AnalyticsSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(TrackerMessage::Snapshot(tx))
            .await
            .map_err(|_| CoreError::internal("analytics tracker is not running"))?;
        rx.await
            .map_err(|_| CoreError::internal("analytics tracker stopped before replying"))
    }

    pub fn is_running(&self) -> bool {
        !self.sender.is_closed() && !self.closed.load(Ordering::Relaxed)
    }
}

impl FormattingAnalytics for AnalyticsTracker {
    fn record_formatting(&self, tool_id: &str, format: &str, processing_time_ms: f64, quality_score: f64) {
        self.send(TrackerMessage::Formatted {
            tool_id: tool_id.to_string(),
            format: format.to_string(),
            processing_time_ms,
            quality_score,
        });
    }

    fn record_error(&self, tool_id: &str, error: &CoreError, context: &str) {
        self.send(TrackerMessage::Error(ErrorEvent {
            tool_id: tool_id.to_string(),
            kind: error.kind().to_string(),
            message: error.to_string(),
            context: context.to_string(),
            at: Utc::now(),
        }));
    }

    fn record_cache_hit(&self, tool_id: &str) {
        self.send(TrackerMessage::CacheHit {
            tool_id: tool_id.to_string(),
        });
    }

    fn record_cache_miss(&self) {
        self.send(TrackerMessage::CacheMiss);
    }

    fn record_interaction(&self, tool_id: &str, format: &str, action: &str) {
        if !self.config.track_user_interactions {
            return;
        }
        self.send(TrackerMessage::Interaction {
            tool_id: tool_id.to_string(),
            format: format.to_string(),
            action: action.to_string(),
        });
    }

    fn shutdown(&self) {
        if self.closed.swap(true, Ordering::Relaxed) {
            return;
        }
        if self.sender.try_send(TrackerMessage::Shutdown).is_err() {
            warn!("Failed to deliver analytics shutdown message");
        }
    }
}
