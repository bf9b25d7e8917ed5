//! Query DTOs - query string parameters

use crate::entities::PropertyType;
use serde::{Deserialize, Serialize};

/// `/properties?type=House`
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PropertyListQuery {
    #[serde(rename = "type", default)]
    pub property_type: Option<String>,
}

impl PropertyListQuery {
    /// Unknown values are ignored rather than rejected
    pub fn type_filter(&self) -> Option<PropertyType> {
        match self.property_type.as_deref() {
            Some("House") => Some(PropertyType::House),
            Some("Land") => Some(PropertyType::Land),
            _ => None,
        }
    }
}
