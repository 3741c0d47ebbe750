//! Listing projection
//!
//! Maps a plugin snapshot to the set of actions an operator may currently
//! dispatch against it. Pure computation; the HTTP layer serializes the
//! result into listing rows.

use crate::db::models::PluginRecord;
use serde::Serialize;

/// Actions an operator can dispatch against a plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Enable,
    Disable,
    Install,
    Uninstall,
}

/// A single projected action, ready for dispatch by the admin UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleAction {
    pub action: ActionKind,
    /// Target alias, the only identifier mutating endpoints accept
    pub alias: String,
    /// Desired enabled value; present for Enable/Disable only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_status: Option<bool>,
    /// Whether the UI must ask for confirmation before dispatching
    pub confirm: bool,
}

impl ModuleAction {
    fn new(action: ActionKind, alias: &str, target_status: Option<bool>) -> Self {
        Self {
            action,
            alias: alias.to_string(),
            target_status,
            // Every lifecycle action requires explicit operator confirmation
            confirm: true,
        }
    }
}

/// Compute the legal actions for a plugin snapshot
///
/// Ordering is fixed: exactly one of Enable/Disable first, then Install,
/// then Uninstall. Install/Uninstall are only offered while the plugin is
/// enabled; the installed flag alone never exposes them.
pub fn available_actions(record: &PluginRecord) -> Vec<ModuleAction> {
    let mut actions = Vec::with_capacity(2);

    if record.enabled {
        actions.push(ModuleAction::new(
            ActionKind::Disable,
            &record.alias,
            Some(false),
        ));
    } else {
        actions.push(ModuleAction::new(
            ActionKind::Enable,
            &record.alias,
            Some(true),
        ));
    }

    if record.enabled && !record.installed {
        actions.push(ModuleAction::new(ActionKind::Install, &record.alias, None));
    }

    if record.enabled && record.installed {
        actions.push(ModuleAction::new(
            ActionKind::Uninstall,
            &record.alias,
            None,
        ));
    }

    actions
}
