//! Host UI capabilities.
//!
//! The indicator never draws anything itself. Whatever hosts it (a desktop
//! panel, a terminal) implements [`Shell`] and the indicator drives it.

mod terminal;

pub use terminal::TerminalShell;

use crate::config::Credentials;

/// Title shown on notifications and at the top of the menu.
pub const INDICATOR_TITLE: &str = "ZenTasks";

/// Actions the indicator registers in the host menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Count the issues assigned to the configured user.
    SyncWithJira,
    /// Open the credential form.
    ConfigureJira,
}

impl MenuAction {
    /// All actions in menu order.
    pub const ALL: [MenuAction; 2] = [MenuAction::SyncWithJira, MenuAction::ConfigureJira];

    /// Menu label for this action.
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::SyncWithJira => "Sync with Jira",
            MenuAction::ConfigureJira => "Configure Jira",
        }
    }
}

/// What a host must provide to run the indicator.
pub trait Shell {
    /// Show a transient user-facing notification.
    fn show_notification(&mut self, title: &str, body: &str);

    /// Show the credential form pre-filled with `initial`.
    ///
    /// Returns the submitted values, or `None` if the user cancelled.
    /// Values are not validated by the shell.
    fn open_config_form(&mut self, initial: Option<&Credentials>) -> Option<Credentials>;

    /// Register a menu entry that triggers `action`.
    fn add_menu_action(&mut self, label: &str, action: MenuAction);

    /// Update the non-interactive status line in the menu.
    fn set_status(&mut self, status: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_labels() {
        assert_eq!(MenuAction::SyncWithJira.label(), "Sync with Jira");
        assert_eq!(MenuAction::ConfigureJira.label(), "Configure Jira");
    }

    #[test]
    fn test_menu_order() {
        assert_eq!(MenuAction::ALL[0], MenuAction::SyncWithJira);
        assert_eq!(MenuAction::ALL.len(), 2);
    }
}
