//! Push Notification Module
//!
//! Renders push payloads into the notification the platform surfaces, and
//! resolves notification action clicks to navigation targets. Also hosts
//! the background-sync tag handling.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Title of every notification this application surfaces.
pub const NOTIFICATION_TITLE: &str = "Unindo Destinos";

/// Sync tag registered for deferred message writes.
pub const SYNC_MESSAGES_TAG: &str = "sync-messages";

const DEFAULT_BODY: &str = "Você tem novidades nos seus destinos!";
const DEFAULT_ICON: &str = "/icons/icon-192x192.png";
const DEFAULT_BADGE: &str = "/icons/icon-192x192.png";

// == Notification ==
/// A notification ready to be surfaced, with its action buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub actions: Vec<NotificationAction>,
}

/// One actionable button on a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// Optional JSON shape of a push payload. Anything that fails to parse is
/// treated as plain text and becomes the body verbatim.
#[derive(Debug, Default, Deserialize)]
struct PushPayload {
    body: Option<String>,
    icon: Option<String>,
}

// == Rendering ==
/// Builds the notification for a raw push payload (JSON or plain text).
pub fn notification_from_payload(raw: &[u8]) -> Notification {
    let text = String::from_utf8_lossy(raw);
    let payload: PushPayload = serde_json::from_str(&text).unwrap_or_else(|_| {
        let trimmed = text.trim();
        PushPayload {
            body: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            icon: None,
        }
    });

    Notification {
        title: NOTIFICATION_TITLE.to_string(),
        body: payload.body.unwrap_or_else(|| DEFAULT_BODY.to_string()),
        icon: payload.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
        badge: DEFAULT_BADGE.to_string(),
        actions: vec![
            NotificationAction {
                action: "explore".to_string(),
                title: "Explorar".to_string(),
            },
            NotificationAction {
                action: "close".to_string(),
                title: "Fechar".to_string(),
            },
        ],
    }
}

/// Resolves a clicked notification action to the URL to open, if any.
/// `explore` opens the app root; `close` (and anything unknown) dismisses.
pub fn click_target(action: &str) -> Option<&'static str> {
    match action {
        "explore" => Some("/"),
        _ => None,
    }
}

// == Background Sync ==
/// Handles a background-sync wakeup. Returns whether the tag is known.
///
/// TODO: replay queued message writes here once the offline write queue
/// exists; today the tag is only acknowledged.
pub fn handle_sync(tag: &str) -> bool {
    if tag == SYNC_MESSAGES_TAG {
        info!(tag, "background sync triggered");
        true
    } else {
        info!(tag, "ignoring unknown sync tag");
        false
    }
}
