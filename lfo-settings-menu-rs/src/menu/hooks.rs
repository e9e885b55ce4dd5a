use crate::settings_tree::{IntSetting, NodeId};

/// How the menu was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuExit {
    /// Through a [`SaveAndExit`](crate::Action::SaveAndExit) action.
    Saved,
    /// Through a [`Cancel`](crate::Action::Cancel) action.
    Cancelled,
}

/// Application callbacks invoked by the [`MenuNavigator`](super::MenuNavigator).
///
/// Every method has an empty default, so implementors only override what
/// they need. `()` implements the trait with no behaviour at all.
pub trait MenuHooks {
    /// A setting's stored value changed (commit or reset to default).
    fn setting_changed(&mut self, _node: NodeId, _setting: &IntSetting<'_>) {}

    /// Persist the current settings. Only called when something changed.
    fn save(&mut self) {}

    /// Revert settings to the last persisted state. Only called when
    /// something changed.
    fn load(&mut self) {}

    /// The menu has just been hidden and the encoder handed back.
    fn hidden(&mut self, _exit: MenuExit) {}

    /// A [`Custom`](crate::Action::Custom) action was tapped.
    fn action(&mut self, _node: NodeId, _tag: u8) {}
}

impl MenuHooks for () {}
