//! Models managed by the CLI

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use evoke_core::Record;

/// Name used for the car model in configuration and store paths
pub const CAR: &str = "car";

/// A car in the catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    /// Generated when missing, so imported files may leave it out
    #[serde(default = "new_id")]
    pub id: String,
    pub model: String,
    pub year: u16,
}

impl Car {
    /// Create a car with a fresh ID
    pub fn new(model: impl Into<String>, year: u16) -> Self {
        Self {
            id: new_id(),
            model: model.into(),
            year,
        }
    }
}

impl Record for Car {
    fn id(&self) -> String {
        self.id.clone()
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}
