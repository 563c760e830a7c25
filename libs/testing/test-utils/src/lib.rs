//! Shared test utilities for domain testing
//!
//! - `TestMongo`: MongoDB container with automatic cleanup (feature: "mongo")
//! - `TestDataBuilder`: deterministic user data (always available)
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { workspace = true, features = ["mongo"] }
//! ```
//!
//! ```rust,ignore
//! use test_utils::{TestDataBuilder, TestMongo};
//!
//! #[tokio::test]
//! async fn my_mongo_test() {
//!     let mongo = TestMongo::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_mongo_test");
//!
//!     let email = builder.email("primary");
//! }
//! ```

#[cfg(feature = "mongo")]
mod mongo;

#[cfg(feature = "mongo")]
pub use mongo::TestMongo;

/// Deterministic user data derived from a seed
///
/// Tests that share a container use different seeds, so their records never
/// collide.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from a hash of the test name
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_user");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Identifier that a deterministic id generator can hand out
    pub fn user_id(&self, suffix: &str) -> String {
        format!("user-{:016x}-{}", self.seed, suffix)
    }

    /// "Test User <seed> <suffix>"
    pub fn name(&self, suffix: &str) -> String {
        format!("Test User {} {}", self.seed, suffix)
    }

    /// Mixed-case address, so normalization is exercised
    pub fn email(&self, suffix: &str) -> String {
        format!("Test.{}.{}@Example.COM", suffix, self.seed)
    }

    /// Non-negative phone number derived from the seed
    pub fn phone_number(&self) -> i64 {
        i64::try_from(self.seed % 10_000_000_000).unwrap_or(0)
    }
}
