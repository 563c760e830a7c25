//! Identifier generation for new users

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Produces a fresh, globally unique user id on every call
pub type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Random v4 UUIDs in hyphenated form
pub fn uuid_generator() -> IdGenerator {
    Arc::new(|| Uuid::new_v4().to_string())
}

/// `{prefix}-1`, `{prefix}-2`, ... for deterministic tests
pub fn sequential_generator(prefix: impl Into<String>) -> IdGenerator {
    let prefix = prefix.into();
    let counter = AtomicU64::new(0);
    Arc::new(move || format!("{}-{}", prefix, counter.fetch_add(1, Ordering::Relaxed) + 1))
}
