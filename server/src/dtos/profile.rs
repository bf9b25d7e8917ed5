//! Profile DTOs - settings page payloads

use super::user::{MOBILE_NUMBER, UserDTO};
use crate::entities::Profile;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Keeps an explicit `null` apart from an absent field: `Some(None)` vs `None`
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProfileDTO {
    pub mobile_number: Option<String>,
    pub preferred_location: Option<String>,
    /// Integer minor currency units
    pub budget: Option<i64>,
}

impl From<Profile> for ProfileDTO {
    fn from(value: Profile) -> Self {
        Self {
            mobile_number: value.mobile_number,
            preferred_location: value.preferred_location,
            budget: value.budget,
        }
    }
}

/// Replaces the editable profile fields (None clears the field)
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UpdateProfileDTO {
    pub mobile_number: Option<String>,
    pub preferred_location: Option<String>,
    pub budget: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SettingsDTO {
    pub user: UserDTO,
    pub profile: ProfileDTO,
    /// Ids of the wishlisted properties
    pub wishlist: Vec<i64>,
}

/// Settings form: account names/email plus the buyer preferences
#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct UpdateSettingsDTO {
    #[validate(length(min = 1, max = 150))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(regex(path = *MOBILE_NUMBER, message = "Invalid mobile number"))]
    pub mobile_number: Option<String>,
    #[validate(length(max = 255))]
    pub preferred_location: Option<String>,
    /// Integer minor currency units. `null` clears the budget, an absent field keeps it.
    #[serde(default, deserialize_with = "explicit_null")]
    #[validate(range(min = 0, message = "Budget cannot be negative"))]
    pub budget: Option<Option<i64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_budget_differs_from_missing_budget() {
        let absent: UpdateSettingsDTO = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.budget, None);

        let cleared: UpdateSettingsDTO = serde_json::from_str(r#"{"budget": null}"#).unwrap();
        assert_eq!(cleared.budget, Some(None));

        let set: UpdateSettingsDTO = serde_json::from_str(r#"{"budget": 2500000}"#).unwrap();
        assert_eq!(set.budget, Some(Some(2_500_000)));
    }

    #[test]
    fn negative_budget_is_rejected() {
        let negative: UpdateSettingsDTO = serde_json::from_str(r#"{"budget": -1}"#).unwrap();
        assert!(negative.validate().is_err());

        let cleared: UpdateSettingsDTO = serde_json::from_str(r#"{"budget": null}"#).unwrap();
        assert!(cleared.validate().is_ok());
    }
}
