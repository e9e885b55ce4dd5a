use core::fmt;

/// Errors that can occur while building or editing a [`SettingsTree`](super::SettingsTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TreeError {
    /// Every slot in the arena is occupied.
    Full,
    /// The handle does not refer to a live node (never issued, or destroyed).
    InvalidNode,
    /// Children can only be added to a menu.
    NotAMenu,
    /// The root cannot be destroyed or given siblings.
    RootNode,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TreeError::Full => write!(f, "settings tree is full"),
            TreeError::InvalidNode => write!(f, "stale or unknown node handle"),
            TreeError::NotAMenu => write!(f, "parent node is not a menu"),
            TreeError::RootNode => write!(f, "operation not allowed on the root"),
        }
    }
}
