//! Request admission control.
//!
//! A process-wide sliding-window throttle: each call drops timestamps older
//! than the window, rejects when the remaining count has reached the limit,
//! and otherwise records the current instant and accepts. The window is
//! global, not per-client; rejected requests are never queued.
//!
//! The controller is an injected, explicitly owned instance with its state
//! behind a mutex, so it is safe to share across a multi-threaded runtime.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Configuration for the admission controller.
#[derive(Debug, Clone)]
pub struct AdmissionConfig {
    /// Maximum requests accepted per window.
    pub limit: usize,
    /// Length of the sliding window.
    pub window: Duration,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            limit: 60,
            window: Duration::from_secs(60),
        }
    }
}

/// Sliding-window admission controller.
#[derive(Debug)]
pub struct AdmissionController {
    config: AdmissionConfig,
    timestamps: Mutex<VecDeque<Instant>>,
}

impl AdmissionController {
    /// Create a controller with the given configuration.
    pub fn new(config: AdmissionConfig) -> Self {
        Self {
            timestamps: Mutex::new(VecDeque::new()),
            config,
        }
    }

    /// Decide whether the current request is admitted.
    ///
    /// Truncates the window to the trailing `config.window`, then either
    /// rejects (count at limit) or records the request and accepts.
    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    /// Number of requests currently inside the window.
    pub fn in_window(&self) -> usize {
        let now = Instant::now();
        let mut timestamps = self.timestamps.lock();
        Self::truncate(&mut timestamps, now, self.config.window);
        timestamps.len()
    }

    fn allow_at(&self, now: Instant) -> bool {
        let mut timestamps = self.timestamps.lock();
        Self::truncate(&mut timestamps, now, self.config.window);

        if timestamps.len() >= self.config.limit {
            return false;
        }

        timestamps.push_back(now);
        true
    }

    fn truncate(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(&front) = timestamps.front() {
            if now.duration_since(front) >= window {
                timestamps.pop_front();
            } else {
                break;
            }
        }
    }
}

impl Default for AdmissionController {
    fn default() -> Self {
        Self::new(AdmissionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_up_to_limit() {
        let controller = AdmissionController::new(AdmissionConfig {
            limit: 3,
            window: Duration::from_secs(60),
        });

        assert!(controller.allow());
        assert!(controller.allow());
        assert!(controller.allow());
        assert!(!controller.allow());
    }

    #[test]
    fn test_sixty_first_request_rejected() {
        let controller = AdmissionController::default();
        let now = Instant::now();

        for _ in 0..60 {
            assert!(controller.allow_at(now));
        }
        assert!(!controller.allow_at(now));
    }

    #[test]
    fn test_window_slides() {
        let controller = AdmissionController::new(AdmissionConfig {
            limit: 2,
            window: Duration::from_secs(60),
        });

        let start = Instant::now();
        assert!(controller.allow_at(start));
        assert!(controller.allow_at(start));
        assert!(!controller.allow_at(start + Duration::from_secs(30)));

        // First two fall out of the window after 60s.
        assert!(controller.allow_at(start + Duration::from_secs(60)));
    }

    #[test]
    fn test_rejected_request_not_recorded() {
        let controller = AdmissionController::new(AdmissionConfig {
            limit: 1,
            window: Duration::from_secs(60),
        });

        let start = Instant::now();
        assert!(controller.allow_at(start));
        assert!(!controller.allow_at(start + Duration::from_secs(1)));
        assert!(!controller.allow_at(start + Duration::from_secs(2)));

        // Only the admitted request occupies the window, so it frees exactly
        // one slot when it expires.
        assert!(controller.allow_at(start + Duration::from_secs(61)));
    }

    #[test]
    fn test_in_window_counts_admitted() {
        let controller = AdmissionController::default();
        assert_eq!(controller.in_window(), 0);
        controller.allow();
        controller.allow();
        assert_eq!(controller.in_window(), 2);
    }
}
