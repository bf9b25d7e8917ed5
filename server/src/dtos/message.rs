//! Message DTOs - inbox, threads and new messages

use super::user::UserDTO;
use crate::entities::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageDTO {
    pub id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub property_id: Option<i64>,
    pub body: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}

impl From<Message> for MessageDTO {
    fn from(value: Message) -> Self {
        Self {
            id: value.message_id,
            sender_id: value.sender_id,
            recipient_id: value.recipient_id,
            property_id: value.property_id,
            body: value.body,
            timestamp: value.created_at,
            is_read: value.is_read,
        }
    }
}

/// DTO used by the repository to insert a message (without message_id)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateMessageDTO {
    pub sender_id: i64,
    pub recipient_id: i64,
    pub property_id: Option<i64>,

    #[validate(length(min = 1, max = 5000, message = "Message body must be between 1 and 5000 characters"))]
    pub body: String,

    pub created_at: DateTime<Utc>,
    pub parent_message_id: Option<i64>,
}

/// Body of a send request (property inquiry or thread reply)
#[derive(Serialize, Deserialize, Debug)]
pub struct SendMessageDTO {
    #[serde(default)]
    pub body: String,
}

/// One inbox row: the latest message exchanged with a counterpart
#[derive(Serialize, Deserialize, Debug)]
pub struct ConversationSummaryDTO {
    pub counterpart_id: i64,
    pub counterpart: Option<UserDTO>,
    pub last_message: MessageDTO,
    /// The latest message is addressed to the viewer and still unread
    pub unread: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ThreadDTO {
    pub other_user: UserDTO,
    pub messages: Vec<MessageDTO>,
}
