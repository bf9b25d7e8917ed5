//! Profile entity - buyer preferences, one per user

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, sqlx::FromRow)]
pub struct Profile {
    pub user_id: i64,
    pub mobile_number: Option<String>,
    pub preferred_location: Option<String>,
    /// Minor currency units, same scale as `Property::price`
    pub budget: Option<i64>,
}
