//! Engine Statistics
//!
//! Lock-free counters describing how requests were answered. Safe to update
//! from concurrent request tasks.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::types::{AnalysisSource, FallbackReason};

/// Thread-safe request counters
#[derive(Debug)]
pub struct EngineStats {
    start_time: Instant,
    requests: AtomicU64,
    backend_results: AtomicU64,
    fallback_results: AtomicU64,
    overload_signals: AtomicU64,
    empty_replies: AtomicU64,
    /// Total backend latency in milliseconds
    total_latency_ms: AtomicU64,
}

/// Point-in-time copy of [`EngineStats`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub uptime_secs: u64,
    pub requests: u64,
    pub backend_results: u64,
    pub fallback_results: u64,
    pub overload_signals: u64,
    pub empty_replies: u64,
    pub avg_backend_latency_ms: f64,
}

impl EngineStats {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            requests: AtomicU64::new(0),
            backend_results: AtomicU64::new(0),
            fallback_results: AtomicU64::new(0),
            overload_signals: AtomicU64::new(0),
            empty_replies: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
        }
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_latency(&self, latency_ms: u64) {
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
    }

    /// Count an answered request by where its result came from
    pub fn record_source(&self, source: &AnalysisSource) {
        match source {
            AnalysisSource::Backend { .. } => {
                self.backend_results.fetch_add(1, Ordering::Relaxed);
            }
            AnalysisSource::Fallback { reason } => {
                self.fallback_results.fetch_add(1, Ordering::Relaxed);
                match reason {
                    FallbackReason::Overloaded => {
                        self.overload_signals.fetch_add(1, Ordering::Relaxed);
                    }
                    FallbackReason::EmptyReply => {
                        self.empty_replies.fetch_add(1, Ordering::Relaxed);
                    }
                    _ => {}
                }
            }
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let backend_results = self.backend_results.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        let avg_backend_latency_ms = if backend_results > 0 {
            total_latency as f64 / backend_results as f64
        } else {
            0.0
        };

        StatsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            requests: self.requests.load(Ordering::Relaxed),
            backend_results,
            fallback_results: self.fallback_results.load(Ordering::Relaxed),
            overload_signals: self.overload_signals.load(Ordering::Relaxed),
            empty_replies: self.empty_replies.load(Ordering::Relaxed),
            avg_backend_latency_ms,
        }
    }
}

impl Default for EngineStats {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsSnapshot {
    /// Format snapshot for display
    pub fn display(&self) -> String {
        format!(
            "Requests: {} (backend: {}, fallback: {})\n\
             Overload signals: {}\n\
             Empty replies: {}\n\
             Avg backend latency: {:.0}ms",
            self.requests,
            self.backend_results,
            self.fallback_results,
            self.overload_signals,
            self.empty_replies,
            self.avg_backend_latency_ms
        )
    }
}
