//! Basket Fixtures

use serde::Deserialize;

/// Wrapper for a basket in YAML
#[derive(Debug, Deserialize)]
pub struct BasketFixture {
    /// Product codes in scan order
    pub items: Vec<String>,
}
