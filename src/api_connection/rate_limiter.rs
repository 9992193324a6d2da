use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
}

/// Sliding-window limiter keyed by caller (an IP address, a user id, ...).
///
/// Each key keeps the timestamps of its accepted requests; anything older
/// than the window is dropped before counting.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    request_logs: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            request_logs: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Reports whether `key` could make a request now, without recording one.
    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    /// Records a request for `key` if it fits in the window.
    pub fn increment(&self, key: &str) -> RateDecision {
        self.increment_at(key, Instant::now())
    }

    pub(crate) fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let mut logs = self
            .request_logs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let count = match logs.get_mut(key) {
            Some(log) => {
                self.evict_expired(log, now);
                let count = log.len() as u32;
                if count == 0 {
                    logs.remove(key);
                }
                count
            }
            None => 0,
        };

        if count >= self.max_requests {
            return RateDecision {
                allowed: false,
                remaining: 0,
            };
        }
        RateDecision {
            allowed: true,
            remaining: self.max_requests - count,
        }
    }

    pub(crate) fn increment_at(&self, key: &str, now: Instant) -> RateDecision {
        let mut logs = self
            .request_logs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !logs.contains_key(key) {
            // callers whose whole window has lapsed are dropped before a new one is tracked
            logs.retain(|_, log| {
                self.evict_expired(log, now);
                !log.is_empty()
            });
        }
        let log = logs.entry(key.to_string()).or_default();
        self.evict_expired(log, now);

        if log.len() as u32 >= self.max_requests {
            tracing::debug!(key, limit = self.max_requests, "rate limit reached");
            return RateDecision {
                allowed: false,
                remaining: 0,
            };
        }

        log.push_back(now);
        RateDecision {
            allowed: true,
            remaining: self.max_requests - log.len() as u32,
        }
    }

    /// Number of callers with requests still inside the window.
    pub fn tracked_callers(&self) -> usize {
        self.request_logs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn evict_expired(&self, log: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = log.front() {
            if now.saturating_duration_since(oldest) > self.window {
                log.pop_front();
            } else {
                break;
            }
        }
    }
}
