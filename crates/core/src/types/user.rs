//! Dashboard user record.

use serde::{Deserialize, Serialize};

use super::{Email, Role, UserId};

/// A dashboard user as returned by the external auth service.
///
/// The gateway never owns or mutates users. The record is stored in the
/// visitor's session at login and read back on every dashboard render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    /// Avatar image URL, if the user uploaded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    /// Up to two initials used when there is no avatar.
    ///
    /// Falls back to the first letter of the email's local part for users
    /// without a usable name.
    #[must_use]
    pub fn initials(&self) -> String {
        let initials: String = self
            .name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .filter(|c| c.is_alphanumeric())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect();

        if initials.is_empty() {
            self.email
                .local_part()
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_default()
        } else {
            initials
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(name: &str, email: &str) -> User {
        User {
            id: UserId::new(1),
            name: name.to_string(),
            email: Email::parse(email).unwrap(),
            role: Role::Developer,
            avatar: None,
        }
    }

    #[test]
    fn test_initials() {
        assert_eq!(user("Ada Lovelace", "ada@x.io").initials(), "AL");
        assert_eq!(user("grace brewster hopper", "g@x.io").initials(), "GB");
        assert_eq!(user("Linus", "l@x.io").initials(), "L");
        assert_eq!(user("  ", "zoe@x.io").initials(), "Z");
    }

    #[test]
    fn test_deserialize_from_auth_service() {
        let json = r#"{"id": 12, "name": "Sam", "email": "sam@client.com", "role": "customer"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::Customer);
        assert_eq!(user.avatar, None);
    }
}
