//! Shared test utilities for domain testing
//!
//! - `TestDatabase`: PostgreSQL container with the workspace migrations applied (feature: "postgres")
//! - `TestDataBuilder`: deterministic names and ids derived from the test name
//! - `factories`: fake users for seeding
//! - `assertions`: helpers for error bodies and options
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_postgres_test");
//!     let name = builder.name("product", "main");
//! }
//! ```

pub mod factories;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

pub use factories::{DEFAULT_PASSWORD_HASH, FakeUser, Role, UserFactory};

/// Builder for test data with deterministic randomization
///
/// The same test name always yields the same data, so failures reproduce.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from a hash of the test name.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_product");
    /// assert_eq!(builder.seed(), TestDataBuilder::from_test_name("test_create_product").seed());
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        Self::new(seed_from_name(name))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Caller id as sent in the `x-user-id` header.
    pub fn user_id(&self) -> String {
        (self.seed % 1_000_000).to_string()
    }

    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let name = TestDataBuilder::new(7).name("product", "main");
    /// assert_eq!(name, "test-product-7-main");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// A user factory sharing this builder's seed.
    pub fn users(&self) -> UserFactory {
        UserFactory::new(self.seed)
    }
}

pub(crate) fn seed_from_name(name: &str) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    hasher.finish()
}

/// Test assertion helpers
pub mod assertions {
    use serde_json::Value;

    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert a validation error body names exactly `fields` in its details.
    pub fn assert_validation_fields(body: &Value, fields: &[&str]) {
        assert_eq!(body["error"], "VALIDATION_ERROR", "unexpected error body: {}", body);

        let details = body["details"]
            .as_object()
            .unwrap_or_else(|| panic!("expected details object, got {}", body));
        let mut actual: Vec<&str> = details.keys().map(String::as_str).collect();
        actual.sort_unstable();
        let mut expected = fields.to_vec();
        expected.sort_unstable();

        assert_eq!(actual, expected, "validation fields mismatch in {}", body);
    }

    /// Assert that `field` carries `message` among its validation messages.
    pub fn assert_field_message(body: &Value, field: &str, message: &str) {
        let messages = body["details"][field]
            .as_array()
            .unwrap_or_else(|| panic!("no messages for field '{}' in {}", field, body));
        assert!(
            messages.iter().any(|m| m == message),
            "field '{}' lacks message '{}': {:?}",
            field,
            message,
            messages
        );
    }
}
