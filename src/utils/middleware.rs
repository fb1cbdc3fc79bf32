use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};
use tracing::{warn, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    count: u64,
    window_start: Instant,
}

/// Expired windows are swept once every this many checks.
const SWEEP_EVERY: u64 = 256;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Fixed-window request counter keyed by client IP.
#[derive(Debug)]
pub struct RateLimiter {
    requests_per_window: u64,
    window_duration: Duration,
    entries: DashMap<String, RateLimitEntry>,
    checks: AtomicU64,
}

impl RateLimiter {
    pub fn new(requests_per_window: u64, window_duration: Duration) -> Self {
        Self {
            requests_per_window,
            window_duration,
            entries: DashMap::new(),
            checks: AtomicU64::new(0),
        }
    }

    pub fn per_second(requests_per_second: u64) -> Self {
        Self::new(requests_per_second, Duration::from_secs(1))
    }

    pub fn check_rate_limit(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        // The shard guard must be released before sweeping.
        let allowed = {
            let mut entry = self
                .entries
                .entry(key.to_string())
                .or_insert(RateLimitEntry { count: 0, window_start: now });

            if now.duration_since(entry.window_start) >= self.window_duration {
                entry.count = 0;
                entry.window_start = now;
            }

            if entry.count >= self.requests_per_window {
                false
            } else {
                entry.count += 1;
                true
            }
        };

        if self.checks.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1 {
            self.evict_expired(now);
        }
        allowed
    }

    fn evict_expired(&self, now: Instant) {
        self.entries
            .retain(|_, entry| now.duration_since(entry.window_start) < self.window_duration);
    }
}

pub async fn rate_limiter_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if !limiter.check_rate_limit(&ip) {
        warn!(action = "rate_limit_exceeded", ip = %ip);
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    Ok(next.run(request).await)
}

/// Tags the request span with a fresh id and echoes it back in `x-request-id`.
pub async fn request_id_middleware(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("request", request_id = %request_id, method = %req.method(), uri = %req.uri());

    let mut response = next.run(req).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_blocks_after_budget_within_window() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.check_at("10.0.0.1", now));
        assert!(limiter.check_at("10.0.0.1", now));
        assert!(!limiter.check_at("10.0.0.1", now));
        assert!(limiter.check_at("10.0.0.2", now));
    }

    #[test]
    fn limiter_resets_on_new_window() {
        let limiter = RateLimiter::new(1, Duration::from_millis(10));
        let start = Instant::now();
        assert!(limiter.check_at("ip", start));
        assert!(!limiter.check_at("ip", start));
        assert!(limiter.check_at("ip", start + Duration::from_millis(20)));
    }

    #[test]
    fn expired_windows_are_evicted() {
        let limiter = RateLimiter::new(5, Duration::from_millis(10));
        let start = Instant::now();
        assert!(limiter.check_at("10.0.0.1", start));
        assert!(limiter.check_at("10.0.0.2", start));

        let later = start + Duration::from_millis(50);
        assert!(limiter.check_at("10.0.0.3", later));
        limiter.evict_expired(later);

        assert_eq!(limiter.entries.len(), 1);
        assert!(limiter.entries.contains_key("10.0.0.3"));
    }

    #[test]
    fn sweep_runs_on_its_own_cadence() {
        let limiter = RateLimiter::new(u64::MAX, Duration::from_millis(10));
        let start = Instant::now();
        assert!(limiter.check_at("stale", start));

        let later = start + Duration::from_millis(50);
        for _ in 0..SWEEP_EVERY {
            assert!(limiter.check_at("fresh", later));
        }

        assert!(!limiter.entries.contains_key("stale"));
        assert!(limiter.entries.contains_key("fresh"));
    }
}
