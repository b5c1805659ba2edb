use sha2::{Digest, Sha256};

/// Derive a public token: `hex(sha256("{user}:{url}:{unix_nanos}"))`.
///
/// Uniqueness is probabilistic; two derivations for the same user and URL
/// only collide if they observe the same nanosecond timestamp.
pub fn derive_token(user_id: i64, original_url: &str, unix_nanos: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}:{}", user_id, original_url, unix_nanos).as_bytes());
    hex::encode(hasher.finalize())
}

/// Current time in nanoseconds since the Unix epoch.
pub fn now_nanos() -> i64 {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| chrono::Utc::now().timestamp_micros().saturating_mul(1_000))
}
