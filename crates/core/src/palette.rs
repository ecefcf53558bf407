//! Command palette.
//!
//! The palette offers the role's visible navigation entries plus a handful
//! of shell actions. Search is a case-insensitive substring match over the
//! label and keywords, with label prefix matches ranked first.

use serde::Serialize;

use crate::{Role, navigation};

/// What happens when a command is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandAction {
    Navigate { target: &'static str },
    ToggleTheme,
    ToggleSidebar,
    MarkAllNotificationsRead,
    Logout,
}

/// A palette entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    pub id: String,
    pub label: &'static str,
    /// Group heading shown in the palette.
    pub section: &'static str,
    #[serde(skip)]
    pub keywords: &'static [&'static str],
    pub action: CommandAction,
}

const ACTIONS: &[(&str, &str, &[&str], CommandAction)] = &[
    (
        "action.toggle-theme",
        "Toggle theme",
        &["dark", "light", "appearance"],
        CommandAction::ToggleTheme,
    ),
    (
        "action.toggle-sidebar",
        "Toggle sidebar",
        &["collapse", "expand", "menu"],
        CommandAction::ToggleSidebar,
    ),
    (
        "action.read-notifications",
        "Mark all notifications as read",
        &["inbox", "clear", "alerts"],
        CommandAction::MarkAllNotificationsRead,
    ),
    (
        "action.logout",
        "Log out",
        &["sign out", "exit"],
        CommandAction::Logout,
    ),
];

/// All commands available to `role`.
#[must_use]
pub fn commands_for(role: Role) -> Vec<Command> {
    let navigation = navigation::navigation_for(role).into_iter().map(|item| Command {
        id: format!("nav.{}", item.id),
        label: item.label,
        section: "Navigation",
        keywords: &[],
        action: CommandAction::Navigate {
            target: item.target,
        },
    });

    let actions = ACTIONS.iter().map(|(id, label, keywords, action)| Command {
        id: (*id).to_string(),
        label: *label,
        section: "Actions",
        keywords: *keywords,
        action: *action,
    });

    if role.is_known() {
        navigation.chain(actions).collect()
    } else {
        Vec::new()
    }
}

/// Filter and rank `commands` for `query`.
///
/// An empty query returns every command. Otherwise commands whose label
/// starts with the query come first, followed by other label or keyword
/// matches. Ties keep their original order.
#[must_use]
pub fn search<'a>(commands: &'a [Command], query: &str) -> Vec<&'a Command> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return commands.iter().collect();
    }

    let mut ranked: Vec<(u8, &Command)> = commands
        .iter()
        .filter_map(|command| {
            let label = command.label.to_lowercase();
            if label.starts_with(&query) {
                Some((0, command))
            } else if label.contains(&query)
                || command.keywords.iter().any(|k| k.contains(query.as_str()))
            {
                Some((1, command))
            } else {
                None
            }
        })
        .collect();

    // sort_by_key is stable
    ranked.sort_by_key(|(rank, _)| *rank);
    ranked.into_iter().map(|(_, command)| command).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(found: &[&Command]) -> Vec<&'static str> {
        found.iter().map(|c| c.label).collect()
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let commands = commands_for(Role::Developer);
        assert_eq!(search(&commands, "  ").len(), commands.len());
    }

    #[test]
    fn test_customer_cannot_jump_to_staff_pages() {
        let commands = commands_for(Role::Customer);
        assert!(search(&commands, "analytics").is_empty());
    }

    #[test]
    fn test_prefix_matches_rank_first() {
        let commands = commands_for(Role::Admin);
        let found = search(&commands, "se");
        // "Search Console" and "Settings" start with "se"; "Users" only contains it.
        assert_eq!(labels(&found)[..2], ["Search Console", "Settings"]);
        assert!(labels(&found).contains(&"Users"));
    }

    #[test]
    fn test_keyword_match() {
        let commands = commands_for(Role::Customer);
        let found = search(&commands, "DARK");
        assert_eq!(labels(&found), vec!["Toggle theme"]);
    }

    #[test]
    fn test_unknown_role_has_no_commands() {
        assert!(commands_for(Role::Unknown).is_empty());
    }

    #[test]
    fn test_navigate_action_serialization() {
        let commands = commands_for(Role::Customer);
        let json = serde_json::to_value(&commands[0]).unwrap_or_default();
        assert_eq!(json["action"]["type"], "navigate");
        assert_eq!(json["action"]["target"], "/dashboard");
    }
}
