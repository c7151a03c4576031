//! # Per-Caller Rate Limiting
//!
//! Fixed-window limiter keyed by the authenticated caller. Runs inside the
//! auth middleware, so every request that reaches it carries a
//! [`CallerIdentity`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use parking_lot::Mutex;

use crate::auth::CallerIdentity;
use crate::error::{ErrorBody, ErrorDetail};

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u64,
    /// Window duration in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 1000,
            window_secs: 60,
        }
    }
}

#[derive(Debug, Clone)]
struct BucketState {
    count: u64,
    window_start: Instant,
}

/// Shared rate limiter state.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Arc<Mutex<HashMap<String, BucketState>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Count a request against `key`. Returns `false` once the window is spent.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let window = Duration::from_secs(self.config.window_secs);
        let mut buckets = self.buckets.lock();

        // Sweep expired buckets once the map grows large.
        if buckets.len() > 10_000 {
            buckets.retain(|_, b| now.duration_since(b.window_start) < window);
        }

        let bucket = buckets.entry(key.to_string()).or_insert(BucketState {
            count: 0,
            window_start: now,
        });

        if now.duration_since(bucket.window_start) >= window {
            bucket.count = 0;
            bucket.window_start = now;
        }

        if bucket.count >= self.config.max_requests {
            false
        } else {
            bucket.count += 1;
            true
        }
    }
}

/// Bucket key for a caller: the role, plus the student id for student tokens.
fn caller_key(caller: Option<&CallerIdentity>) -> String {
    match caller {
        Some(CallerIdentity {
            role,
            student_id: Some(id),
        }) => format!("{}:{}", role.as_str(), id.0),
        Some(caller) => caller.role.as_str().to_string(),
        None => "anonymous".to_string(),
    }
}

/// Middleware that enforces per-caller rate limits.
pub async fn rate_limit_middleware(request: Request, next: Next) -> Response {
    let limiter = request.extensions().get::<RateLimiter>().cloned();

    if let Some(limiter) = limiter {
        let key = caller_key(request.extensions().get::<CallerIdentity>());
        if !limiter.check(&key) {
            tracing::warn!(caller = %key, "rate limit exceeded");
            let body = ErrorBody {
                error: ErrorDetail {
                    code: "RATE_LIMITED".to_string(),
                    message: "rate limit exceeded".to_string(),
                    details: None,
                },
            };
            return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use hallbridge_core::StudentId;

    fn limiter(max: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests: max,
            window_secs: 60,
        })
    }

    #[test]
    fn allows_up_to_limit_then_blocks() {
        let rl = limiter(3);
        let now = Instant::now();
        assert!(rl.check_at("staff", now));
        assert!(rl.check_at("staff", now));
        assert!(rl.check_at("staff", now));
        assert!(!rl.check_at("staff", now));
        assert!(rl.check_at("admin", now), "buckets are per key");
    }

    #[test]
    fn window_resets() {
        let rl = limiter(1);
        let start = Instant::now();
        assert!(rl.check_at("admin", start));
        assert!(!rl.check_at("admin", start + Duration::from_secs(59)));
        assert!(rl.check_at("admin", start + Duration::from_secs(60)));
    }

    #[test]
    fn students_get_their_own_bucket() {
        let a = CallerIdentity {
            role: Role::Student,
            student_id: Some(StudentId::new()),
        };
        let b = CallerIdentity {
            role: Role::Student,
            student_id: Some(StudentId::new()),
        };
        assert_ne!(caller_key(Some(&a)), caller_key(Some(&b)));
        assert_eq!(caller_key(Some(&CallerIdentity::admin())), "admin");
        assert_eq!(caller_key(None), "anonymous");
    }
}
