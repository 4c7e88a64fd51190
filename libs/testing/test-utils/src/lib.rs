//! Shared test utilities for domain testing
//!
//! This crate provides reusable test infrastructure for domain crates:
//! - `TestChroma`: Chroma server container with automatic cleanup (feature: "chroma")
//! - `TestDataBuilder`: Deterministic test data generation (always available)
//!
//! # Features
//!
//! - `chroma` (default): Enables Chroma test infrastructure
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::{TestChroma, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_chroma_test() {
//!     let chroma = TestChroma::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!
//!     let collection = builder.name("collection", "main");
//!     let ids = builder.ids("doc", 3);
//! }
//! ```

#[cfg(feature = "chroma")]
mod chroma;

#[cfg(feature = "chroma")]
pub use chroma::TestChroma;

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_add_documents");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Generate a unique name for testing
    ///
    /// Names stay within Chroma's collection naming rules (3-63 characters,
    /// alphanumeric with dashes).
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(42);
    /// assert_eq!(builder.name("collection", "main"), "test-collection-42-main");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// `count` distinct item ids sharing `prefix`
    pub fn ids(&self, prefix: &str, count: usize) -> Vec<String> {
        (0..count)
            .map(|i| format!("{}-{:x}-{}", prefix, self.seed, i))
            .collect()
    }
}
