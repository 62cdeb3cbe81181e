//! Notice-message event shape and the notification category catalog.

use serde::{Deserialize, Serialize};

/// Fixed catalog of notification categories.
///
/// The catalog is owned by the host application that publishes notice
/// messages; this service only matches category names against the configured
/// allowlists and renders labels in the settings form schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum NotificationType {
    Download,
    Organize,
    Subscribe,
    SiteMessage,
    MediaServer,
    Manual,
    Plugin,
    Other,
}

impl NotificationType {
    /// Catalog name, used in allowlist configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Download => "Download",
            NotificationType::Organize => "Organize",
            NotificationType::Subscribe => "Subscribe",
            NotificationType::SiteMessage => "SiteMessage",
            NotificationType::MediaServer => "MediaServer",
            NotificationType::Manual => "Manual",
            NotificationType::Plugin => "Plugin",
            NotificationType::Other => "Other",
        }
    }

    /// Human-readable label, used in the settings form schema.
    pub fn label(&self) -> &'static str {
        match self {
            NotificationType::Download => "Resource download",
            NotificationType::Organize => "Library organize",
            NotificationType::Subscribe => "Subscription",
            NotificationType::SiteMessage => "Site message",
            NotificationType::MediaServer => "Media server",
            NotificationType::Manual => "Manual action",
            NotificationType::Plugin => "Plugin",
            NotificationType::Other => "Other",
        }
    }

    /// All catalog entries, in display order.
    pub fn all() -> &'static [NotificationType] {
        &[
            NotificationType::Download,
            NotificationType::Organize,
            NotificationType::Subscribe,
            NotificationType::SiteMessage,
            NotificationType::MediaServer,
            NotificationType::Manual,
            NotificationType::Plugin,
            NotificationType::Other,
        ]
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A notice-message event as published on the bus.
///
/// Consumed exactly once per router per publish. At least one of `title` and
/// `text` must be non-empty for a router to process the event.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NoticeMessage {
    /// Notification category; `None` when the publisher did not classify it.
    pub msg_type: Option<NotificationType>,

    /// Message title.
    pub title: Option<String>,

    /// Message body text.
    pub text: Option<String>,

    /// Username to address; absence means broadcast.
    pub username: Option<String>,

    /// Target channel; events carrying a channel are handled elsewhere and
    /// skipped by these routers.
    pub channel: Option<String>,

    /// Bypass the message-type allowlist (manual test triggers).
    #[serde(default)]
    pub force_send: bool,

    /// Short summary (WxPusher); falls back to the title when absent.
    pub summary: Option<String>,

    /// Per-event content-type override (WxPusher).
    pub content_type: Option<i32>,

    /// Per-event recipient text override (WxPusher legacy format).
    pub uids: Option<String>,

    /// Per-event topic text override (WxPusher).
    pub topic_ids: Option<String>,
}

impl NoticeMessage {
    /// Create an event with only a title and body.
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Set the notification category.
    pub fn with_type(mut self, msg_type: NotificationType) -> Self {
        self.msg_type = Some(msg_type);
        self
    }

    /// Address the event to a specific username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Mark the event as a forced send, bypassing the type allowlist.
    pub fn forced(mut self) -> Self {
        self.force_send = true;
        self
    }

    /// A forced test message, as manufactured by the on-demand trigger.
    pub fn test_message() -> Self {
        Self {
            msg_type: Some(NotificationType::SiteMessage),
            title: Some("Test message".to_string()),
            text: Some("This is a test message verifying that push forwarding works.".to_string()),
            summary: Some("Test message".to_string()),
            force_send: true,
            ..Default::default()
        }
    }

    /// True when both title and text are empty or absent.
    pub fn is_empty_content(&self) -> bool {
        self.title.as_deref().unwrap_or("").is_empty()
            && self.text.as_deref().unwrap_or("").is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_round_trip() {
        for t in NotificationType::all() {
            assert!(!t.as_str().is_empty());
            assert!(!t.label().is_empty());
        }
        assert_eq!(NotificationType::all().len(), 8);
    }

    #[test]
    fn test_empty_content_detection() {
        assert!(NoticeMessage::default().is_empty_content());
        assert!(
            NoticeMessage {
                title: Some(String::new()),
                text: None,
                ..Default::default()
            }
            .is_empty_content()
        );
        assert!(!NoticeMessage::new("T", "").is_empty_content());
        assert!(!NoticeMessage::new("", "B").is_empty_content());
    }

    #[test]
    fn test_test_message_is_forced() {
        let event = NoticeMessage::test_message();
        assert!(event.force_send);
        assert!(event.username.is_none());
        assert!(!event.is_empty_content());
    }
}
