//! Admission control for outbound inference calls
//!
//! Two gates guard every call: a counting semaphore caps simultaneous
//! in-flight calls at K, and a sliding-log rate window admits at most R calls
//! in any W-second interval. One `AdmissionGates` instance is shared by every
//! task of a run.

use crate::bridge::InferenceError;
use codescope_core::config::LimitSettings;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// Wake-up horizon when `oldest + window` is not representable.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Rolling window admitting at most `limit` calls per `window`.
#[derive(Debug)]
pub struct RateWindow {
    limit: usize,
    window: Duration,
    admitted: Mutex<VecDeque<Instant>>,
}

impl RateWindow {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit: limit.max(1),
            window,
            admitted: Mutex::new(VecDeque::new()),
        }
    }

    /// Wait until the window has room, then record an admission.
    pub async fn acquire(&self) {
        loop {
            let wake_at = {
                let mut admitted = self.admitted.lock().await;
                let now = Instant::now();
                while let Some(&oldest) = admitted.front() {
                    if now.duration_since(oldest) >= self.window {
                        admitted.pop_front();
                    } else {
                        break;
                    }
                }

                if admitted.len() < self.limit {
                    admitted.push_back(now);
                    return;
                }

                match admitted.front() {
                    Some(&oldest) => oldest
                        .checked_add(self.window)
                        .unwrap_or_else(|| now + FAR_FUTURE),
                    None => now,
                }
            };

            tracing::debug!("Rate window full, waiting {:?}", wake_at.saturating_duration_since(Instant::now()));
            tokio::time::sleep_until(wake_at).await;
        }
    }
}

#[derive(Debug, Default)]
struct GateStats {
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    admitted: AtomicUsize,
}

/// Concurrency and rate gates shared by every inference call of a run.
#[derive(Debug)]
pub struct AdmissionGates {
    semaphore: Arc<Semaphore>,
    window: RateWindow,
    stats: Arc<GateStats>,
}

impl AdmissionGates {
    pub fn new(max_concurrent: usize, calls_per_window: usize, window: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.clamp(1, Semaphore::MAX_PERMITS))),
            window: RateWindow::new(calls_per_window, window),
            stats: Arc::new(GateStats::default()),
        }
    }

    pub fn from_limits(limits: &LimitSettings) -> Self {
        Self::new(limits.max_concurrent_calls, limits.calls_per_window, limits.window())
    }

    /// Take a concurrency slot, then pass the rate window.
    ///
    /// The slot is held by the returned guard and released when it drops,
    /// whether the call succeeded or not.
    pub async fn admit(&self) -> Result<Admission, InferenceError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| InferenceError::AdmissionClosed)?;

        self.window.acquire().await;

        let in_flight = self.stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.peak_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        self.stats.admitted.fetch_add(1, Ordering::SeqCst);

        Ok(Admission {
            _permit: permit,
            stats: self.stats.clone(),
        })
    }

    /// Refuse all further admissions; waiting callers get `AdmissionClosed`.
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn in_flight(&self) -> usize {
        self.stats.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous admitted calls seen so far.
    pub fn peak_in_flight(&self) -> usize {
        self.stats.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Total calls admitted so far.
    pub fn admitted(&self) -> usize {
        self.stats.admitted.load(Ordering::SeqCst)
    }
}

/// Proof of admission for one call.
#[derive(Debug)]
pub struct Admission {
    _permit: OwnedSemaphorePermit,
    stats: Arc<GateStats>,
}

impl Drop for Admission {
    fn drop(&mut self) {
        self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
