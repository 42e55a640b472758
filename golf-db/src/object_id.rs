use std::time::{SystemTime, UNIX_EPOCH};

/// Generate a 24-character hex object id: 4 bytes of seconds since the epoch
/// followed by 8 random bytes.
pub fn generate(now: i64) -> String {
  format!("{:08x}{:016x}", now as u32, rand::random::<u64>())
}

pub fn now() -> i64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|elapsed| elapsed.as_secs() as i64)
    .unwrap_or_default()
}
