//! Enumerations shared by the entities

use serde::{Deserialize, Serialize};

// ********************* USEFUL ENUMERATIONS **********************//

/// Account kind chosen at registration. Drives the seller-only route guard.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountRole {
    Seller,
    Buyer,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    House,
    Land,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    ForSale,
    ForRent,
}
