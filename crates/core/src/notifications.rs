//! Notification center.
//!
//! Notifications live in the visitor's session for the lifetime of that
//! session only. The center keeps them newest first and drops the oldest
//! entries once [`NotificationCenter::CAPACITY`] is reached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::NotificationId;

/// Severity of a notification, used for its icon and colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// A single notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Create an unread notification stamped with the current time.
    #[must_use]
    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: NotificationId::generate(),
            title: title.into(),
            message: message.into(),
            severity,
            read: false,
            created_at: Utc::now(),
        }
    }
}

/// Bounded, newest-first list of notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationCenter {
    items: Vec<Notification>,
}

impl NotificationCenter {
    /// Maximum number of notifications kept.
    pub const CAPACITY: usize = 50;

    /// Create an empty center.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a notification at the top and return its ID.
    pub fn push(&mut self, notification: Notification) -> NotificationId {
        let id = notification.id;
        self.items.insert(0, notification);
        self.items.truncate(Self::CAPACITY);
        id
    }

    /// Convenience wrapper around [`Notification::new`] + [`Self::push`].
    pub fn notify(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
    ) -> NotificationId {
        self.push(Notification::new(title, message, severity))
    }

    /// All notifications, newest first.
    #[must_use]
    pub fn list(&self) -> &[Notification] {
        &self.items
    }

    /// Number of notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no notifications.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of unread notifications.
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    /// Mark one notification as read. Returns `false` if the id is unknown.
    pub fn mark_read(&mut self, id: NotificationId) -> bool {
        self.items
            .iter_mut()
            .find(|n| n.id == id)
            .map(|n| n.read = true)
            .is_some()
    }

    /// Mark everything as read and return how many changed.
    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for notification in self.items.iter_mut().filter(|n| !n.read) {
            notification.read = true;
            changed += 1;
        }
        changed
    }

    /// Remove one notification. Returns `false` if the id is unknown.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    /// Remove all notifications.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first() {
        let mut center = NotificationCenter::new();
        center.notify("first", "", Severity::Info);
        center.notify("second", "", Severity::Success);

        let titles: Vec<_> = center.list().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut center = NotificationCenter::new();
        for i in 0..(NotificationCenter::CAPACITY + 5) {
            center.notify(format!("n{i}"), "", Severity::Info);
        }
        assert_eq!(center.len(), NotificationCenter::CAPACITY);
        assert_eq!(center.list().first().unwrap().title, "n54");
        assert_eq!(center.list().last().unwrap().title, "n5");
    }

    #[test]
    fn test_mark_read_and_unread_count() {
        let mut center = NotificationCenter::new();
        let a = center.notify("a", "", Severity::Warning);
        center.notify("b", "", Severity::Error);
        assert_eq!(center.unread_count(), 2);

        assert!(center.mark_read(a));
        assert_eq!(center.unread_count(), 1);
        assert!(!center.mark_read(NotificationId::generate()));

        assert_eq!(center.mark_all_read(), 1);
        assert_eq!(center.unread_count(), 0);
        assert_eq!(center.mark_all_read(), 0);
    }

    #[test]
    fn test_dismiss() {
        let mut center = NotificationCenter::new();
        let a = center.notify("a", "", Severity::Info);
        assert!(center.dismiss(a));
        assert!(!center.dismiss(a));
        assert!(center.is_empty());
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let mut center = NotificationCenter::new();
        center.notify("Deploy finished", "siteflow.dev is live", Severity::Success);

        let json = serde_json::to_value(&center).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["severity"], "success");
        assert_eq!(json[0]["read"], false);
        assert!(json[0]["createdAt"].is_string());

        let back: NotificationCenter = serde_json::from_value(json).unwrap();
        assert_eq!(back, center);
    }
}
