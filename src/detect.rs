//! Ingredient detection from a pantry photo.
//!
//! Only a simulated detector ships; the trait is the seam a real vision model
//! plugs into.

/// Turns an uploaded image into pantry item names.
pub trait ImageToItems: Send + Sync {
    fn detect(&self, image: &[u8]) -> Vec<String>;
}

/// Returns the same staples for every image.
#[derive(Debug, Clone)]
pub struct SimulatedDetector {
    items: Vec<String>,
}

pub const SIMULATED_ITEMS: &[&str] = &[
    "Tomatoes",
    "Onions",
    "Garlic",
    "Rice",
    "Black Beans",
    "Chicken Breast",
    "Bell Peppers",
    "Cheese",
];

impl SimulatedDetector {
    #[must_use]
    pub fn new(items: Vec<String>) -> Self {
        Self { items }
    }
}

impl Default for SimulatedDetector {
    fn default() -> Self {
        Self::new(SIMULATED_ITEMS.iter().map(|s| (*s).to_string()).collect())
    }
}

impl ImageToItems for SimulatedDetector {
    fn detect(&self, image: &[u8]) -> Vec<String> {
        tracing::debug!(bytes = image.len(), "simulated detection");
        self.items.clone()
    }
}
