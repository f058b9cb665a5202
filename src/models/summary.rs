use serde::{Deserialize, Serialize};

/// Figures shown on the landing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    pub total_students: u64,
}
