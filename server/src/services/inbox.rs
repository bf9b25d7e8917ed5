//! Inbox services - conversation list, threads and sending messages

use crate::core::{AppError, AppState};
use crate::dtos::{ConversationSummaryDTO, CreateMessageDTO, MessageDTO, SendMessageDTO, ThreadDTO, UserDTO};
use crate::entities::{Message, User};
use crate::repositories::{Create, Read, ReadMany};
use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};
use chrono::Utc;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Latest message exchanged between the viewer and one counterpart
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSummary {
    pub counterpart_id: i64,
    pub latest: Message,
}

/// Ordering key of a message inside the store: timestamp, then id for equal timestamps
fn recency(message: &Message) -> (chrono::DateTime<Utc>, i64) {
    (message.created_at, message.message_id)
}

/// Groups the messages involving `user_id` by counterpart and keeps the most recent one per
/// group. The result is ordered by that message, most recent conversation first.
///
/// Messages not involving `user_id` are ignored. A self-addressed message forms its own
/// conversation with `user_id` as counterpart.
pub fn aggregate_conversations<I>(user_id: i64, messages: I) -> Vec<ConversationSummary>
where
    I: IntoIterator<Item = Message>,
{
    let mut latest: HashMap<i64, Message> = HashMap::new();

    for message in messages.into_iter().filter(|m| m.involves(user_id)) {
        match latest.entry(message.counterpart_of(user_id)) {
            Entry::Vacant(slot) => {
                slot.insert(message);
            }
            Entry::Occupied(mut slot) => {
                if recency(&message) > recency(slot.get()) {
                    slot.insert(message);
                }
            }
        }
    }

    let mut summaries: Vec<ConversationSummary> = latest
        .into_iter()
        .map(|(counterpart_id, latest)| ConversationSummary {
            counterpart_id,
            latest,
        })
        .collect();
    summaries.sort_by(|a, b| recency(&b.latest).cmp(&recency(&a.latest)));
    summaries
}

/// Common send path of property inquiries and thread replies.
/// Self-addressed and blank messages are rejected before anything is written.
#[instrument(skip(state, body), fields(sender_id = %sender_id, recipient_id = %recipient_id))]
pub async fn send_message(
    state: &AppState,
    sender_id: i64,
    recipient_id: i64,
    property_id: Option<i64>,
    body: &str,
) -> Result<Message, AppError> {
    if sender_id == recipient_id {
        warn!("Attempt to send a message to oneself");
        return Err(AppError::bad_request("You cannot send a message to yourself."));
    }

    let body = body.trim();
    if body.is_empty() {
        warn!("Attempt to send an empty message");
        return Err(AppError::bad_request("You cannot send an empty message."));
    }

    let new_message = CreateMessageDTO {
        sender_id,
        recipient_id,
        property_id,
        body: body.to_string(),
        created_at: Utc::now(),
        parent_message_id: None,
    };
    new_message.validate()?;

    let message = state.msg.create(&new_message).await?;
    info!("Message {} sent", message.message_id);
    Ok(message)
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<ConversationSummaryDTO>>, AppError> {
    debug!("Building inbox");
    // 1. Load every message the user sent or received (single query)
    // 2. Keep the latest message per counterpart, most recent conversation first
    // 3. Load all counterparts with one query and index them by id
    // 4. Build the summaries, flagging unread incoming messages
    let messages = state.msg.find_many_involving(&current_user.user_id).await?;
    let summaries = aggregate_conversations(current_user.user_id, messages);

    let counterpart_ids: Vec<i64> = summaries.iter().map(|s| s.counterpart_id).collect();
    let counterparts: HashMap<i64, User> = state
        .user
        .read_many(&counterpart_ids)
        .await?
        .into_iter()
        .map(|u| (u.user_id, u))
        .collect();

    let inbox: Vec<ConversationSummaryDTO> = summaries
        .into_iter()
        .map(|summary| ConversationSummaryDTO {
            counterpart_id: summary.counterpart_id,
            counterpart: counterparts
                .get(&summary.counterpart_id)
                .cloned()
                .map(UserDTO::from),
            unread: summary.latest.recipient_id == current_user.user_id && !summary.latest.is_read,
            last_message: MessageDTO::from(summary.latest),
        })
        .collect();

    info!("Inbox has {} conversations", inbox.len());
    Ok(Json(inbox))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, other_id = %other_id))]
pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(other_id): Path<i64>,
) -> Result<Json<ThreadDTO>, AppError> {
    debug!("Opening conversation");
    // 1. The other user must exist, otherwise NOT_FOUND
    // 2. Mark incoming messages read and load the thread in one transaction
    let other_user = state.user.read(&other_id).await?.ok_or_else(|| {
        warn!("Conversation requested with unknown user");
        AppError::not_found("User not found")
    })?;

    let thread = state.msg.open_thread(&current_user.user_id, &other_id).await?;

    info!("Conversation has {} messages", thread.len());
    Ok(Json(ThreadDTO {
        other_user: other_user.into(),
        messages: thread.into_iter().map(MessageDTO::from).collect(),
    }))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, other_id = %other_id))]
pub async fn reply_in_conversation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(other_id): Path<i64>,
    Json(body): Json<SendMessageDTO>,
) -> Result<(StatusCode, Json<MessageDTO>), AppError> {
    debug!("Replying in conversation");
    if state.user.read(&other_id).await?.is_none() {
        warn!("Reply addressed to unknown user");
        return Err(AppError::not_found("User not found"));
    }

    let message = send_message(&state, current_user.user_id, other_id, None, &body.body).await?;
    Ok((StatusCode::CREATED, Json(MessageDTO::from(message))))
}
