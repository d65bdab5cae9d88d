use serde::{Deserialize, Serialize};

pub const ADDED_MESSAGE: &str = "Data added successfully.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub records: usize,
}
