//! MessageRepository - the message store

use super::{Create, Read, RepoResult};
use crate::dtos::CreateMessageDTO;
use crate::entities::Message;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

const MESSAGE_COLUMNS: &str =
    "message_id, sender_id, recipient_id, property_id, body, created_at, is_read, parent_message_id";

pub struct MessageRepository {
    connection_pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Every message the user sent or received, oldest first
    pub async fn find_many_involving(&self, user_id: &i64) -> RepoResult<Vec<Message>> {
        sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS} FROM messages
            WHERE sender_id = ? OR recipient_id = ?
            ORDER BY created_at ASC, message_id ASC
            "#
        ))
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Both directions of the exchange between two users, oldest first
    pub async fn find_thread(&self, user_id: &i64, other_id: &i64) -> RepoResult<Vec<Message>> {
        let mut conn = self.connection_pool.acquire().await?;
        Self::select_thread(&mut *conn, *user_id, *other_id).await
    }

    /// Marks as read every unread message `other_id` sent to `viewer_id`, then returns the
    /// thread. Both steps share one transaction, so the thread is never seen half-updated.
    pub async fn open_thread(&self, viewer_id: &i64, other_id: &i64) -> RepoResult<Vec<Message>> {
        let mut tx = self.connection_pool.begin().await?;

        let marked = Self::mark_thread_read(&mut *tx, *viewer_id, *other_id).await?;
        let thread = Self::select_thread(&mut *tx, *viewer_id, *other_id).await?;
        tx.commit().await?;

        debug!("Opened thread {} <-> {}, {} marked read", viewer_id, other_id, marked);
        Ok(thread)
    }

    /// One batch update: every unread message `other_id` sent to `viewer_id`.
    /// Returns how many rows flipped.
    async fn mark_thread_read(
        conn: &mut SqliteConnection,
        viewer_id: i64,
        other_id: i64,
    ) -> RepoResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages SET is_read = 1
            WHERE recipient_id = ? AND sender_id = ? AND is_read = 0
            "#,
        )
        .bind(viewer_id)
        .bind(other_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn select_thread(
        conn: &mut SqliteConnection,
        user_id: i64,
        other_id: i64,
    ) -> RepoResult<Vec<Message>> {
        sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS} FROM messages
            WHERE (sender_id = ? AND recipient_id = ?)
               OR (sender_id = ? AND recipient_id = ?)
            ORDER BY created_at ASC, message_id ASC
            "#
        ))
        .bind(user_id)
        .bind(other_id)
        .bind(other_id)
        .bind(user_id)
        .fetch_all(conn)
        .await
    }
}

impl Create<Message, CreateMessageDTO> for MessageRepository {
    async fn create(&self, data: &CreateMessageDTO) -> RepoResult<Message> {
        let result = sqlx::query(
            r#"
            INSERT INTO messages (sender_id, recipient_id, property_id, body, created_at, is_read, parent_message_id)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(data.sender_id)
        .bind(data.recipient_id)
        .bind(data.property_id)
        .bind(&data.body)
        .bind(data.created_at)
        .bind(data.parent_message_id)
        .execute(&self.connection_pool)
        .await?;

        Ok(Message {
            message_id: result.last_insert_rowid(),
            sender_id: data.sender_id,
            recipient_id: data.recipient_id,
            property_id: data.property_id,
            body: data.body.clone(),
            created_at: data.created_at,
            is_read: false,
            parent_message_id: data.parent_message_id,
        })
    }
}

impl Read<Message, i64> for MessageRepository {
    async fn read(&self, id: &i64) -> RepoResult<Option<Message>> {
        sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE message_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}
