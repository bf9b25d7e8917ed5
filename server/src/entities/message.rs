//! Message entity - a directed message between two users

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Message {
    pub message_id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    // set when the message is an inquiry about a listing
    pub property_id: Option<i64>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    // threading link, not used by the inbox aggregation
    pub parent_message_id: Option<i64>,
}

impl Message {
    /// The other participant relative to `user_id`.
    /// A self-addressed row yields `user_id` itself.
    pub fn counterpart_of(&self, user_id: i64) -> i64 {
        if self.sender_id == user_id {
            self.recipient_id
        } else {
            self.sender_id
        }
    }

    pub fn involves(&self, user_id: i64) -> bool {
        self.sender_id == user_id || self.recipient_id == user_id
    }
}
