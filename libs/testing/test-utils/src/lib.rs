//! Shared test utilities for the POS domain crates
//!
//! Provides `TestDataBuilder`, a deterministic generator for ids, names,
//! and customer contact details. Seeding from the test name keeps test
//! data reproducible across runs while staying unique per test.
//!
//! ```
//! use test_utils::TestDataBuilder;
//!
//! let builder = TestDataBuilder::from_test_name("test_checkout");
//! let product_id = builder.id(0);
//! let name = builder.name("product");
//! ```

use uuid::Uuid;

/// Deterministic test data generation, seeded per test
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Derive the seed from the test name hash
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Deterministic UUID for the given index
    ///
    /// Distinct indexes yield distinct ids; the same (seed, index) pair
    /// always yields the same id.
    pub fn id(&self, index: u64) -> Uuid {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&self.seed.to_le_bytes());
        bytes[8..].copy_from_slice(&index.to_le_bytes());
        Uuid::from_bytes(bytes)
    }

    /// Unique name with the builder's seed baked in
    pub fn name(&self, prefix: &str) -> String {
        format!("{}_{:016x}", prefix, self.seed)
    }

    /// Customer name for delivery tests
    pub fn customer_name(&self) -> String {
        self.name("customer")
    }

    /// Phone number for delivery tests
    pub fn phone(&self) -> String {
        format!("+94{:09}", self.seed % 1_000_000_000)
    }

    /// Street address for delivery tests
    pub fn address(&self) -> String {
        format!("{} Main Street", self.seed % 1000)
    }
}
