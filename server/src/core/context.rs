//! Request Context - per-request identity and flash messages
//!
//! Installed by the authentication middlewares and consumed by the handlers.
//! It lives exactly as long as the request: nothing is carried across requests.

use crate::entities::User;
use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One-shot message for the user, returned alongside the payload
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub current_user: Option<User>,
    flashes: Vec<Flash>,
}

/// Payload plus the flash messages raised while producing it
#[derive(Serialize, Debug)]
pub struct Page<T: Serialize> {
    pub data: T,
    pub messages: Vec<Flash>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: User) -> Self {
        Self {
            current_user: Some(user),
            flashes: Vec::new(),
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.current_user.as_ref().map(|u| u.user_id)
    }

    pub fn flash(&mut self, level: FlashLevel, text: impl Into<String>) {
        self.flashes.push(Flash {
            level,
            text: text.into(),
        });
    }

    pub fn flashes(&self) -> &[Flash] {
        &self.flashes
    }

    /// Consumes the context, draining its flashes into the response
    pub fn into_page<T: Serialize>(self, data: T) -> Page<T> {
        Page {
            data,
            messages: self.flashes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::AccountRole;
    use chrono::Utc;

    #[test]
    fn flashes_are_drained_into_the_page() {
        let mut ctx = RequestContext::anonymous();
        assert_eq!(ctx.user_id(), None);
        ctx.flash(FlashLevel::Warning, "nothing matched");
        ctx.flash(FlashLevel::Info, "hello");
        assert_eq!(ctx.flashes().len(), 2);

        let page = ctx.into_page(42);
        assert_eq!(page.data, 42);
        assert_eq!(page.messages[0].level, FlashLevel::Warning);
        assert_eq!(page.messages[1].text, "hello");
    }

    #[test]
    fn authenticated_context_exposes_the_user() {
        let seller = User {
            user_id: 7,
            email: "s@example.com".to_string(),
            password: String::new(),
            first_name: "S".to_string(),
            last_name: "K".to_string(),
            role: AccountRole::Seller,
            created_at: Utc::now(),
        };
        let ctx = RequestContext::authenticated(seller);
        assert_eq!(ctx.user_id(), Some(7));
        assert!(ctx.flashes().is_empty());
    }
}
