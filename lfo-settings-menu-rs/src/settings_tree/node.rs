use core::fmt::Write;
use core::sync::atomic::{AtomicI32, Ordering};

use heapless::String;

/// Capacity of a rendered [`Description`].
pub const DESCRIPTION_LEN: usize = 24;

/// Short right-hand text shown next to a node's name.
pub type Description = String<DESCRIPTION_LEN>;

/// Stable handle to a node in a [`SettingsTree`](super::SettingsTree).
///
/// The generation changes every time a slot is reused, so a handle to a
/// destroyed node never aliases its replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeId {
    pub(crate) index: u16,
    pub(crate) generation: u16,
}

impl NodeId {
    /// Arena slot this handle points at.
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

// ── Settings ─────────────────────────────────────────────────────────────

/// Bounded integer stored in a caller-owned variable.
///
/// The menu writes through the reference; the rest of the firmware (audio
/// tick, persistence) reads the same [`AtomicI32`] directly.
#[derive(Debug, Clone, Copy)]
pub struct IntSetting<'a> {
    value: &'a AtomicI32,
    minimum: i32,
    maximum: i32,
    default: i32,
}

impl<'a> IntSetting<'a> {
    /// `maximum` below `minimum` is raised to `minimum`; `default` is clamped.
    pub fn new(value: &'a AtomicI32, minimum: i32, maximum: i32, default: i32) -> Self {
        let maximum = maximum.max(minimum);
        Self {
            value,
            minimum,
            maximum,
            default: default.clamp(minimum, maximum),
        }
    }

    pub fn value(&self) -> i32 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn minimum(&self) -> i32 {
        self.minimum
    }

    pub fn maximum(&self) -> i32 {
        self.maximum
    }

    pub fn default_value(&self) -> i32 {
        self.default
    }

    /// Clamp `value` into `[minimum, maximum]`.
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.minimum, self.maximum)
    }

    /// Store `value`, clamped. Returns `false` iff the stored value was
    /// already equal to the clamped value.
    pub fn set_value(&self, value: i32) -> bool {
        let value = self.clamp(value);
        if self.value() == value {
            return false;
        }
        self.value.store(value, Ordering::Relaxed);
        true
    }

    /// Equivalent to `set_value(default)`.
    pub fn reset(&self) -> bool {
        self.set_value(self.default)
    }
}

/// [`IntSetting`] over `0..labels.len()`, shown by label.
#[derive(Debug, Clone, Copy)]
pub struct ChoiceSetting<'a> {
    setting: IntSetting<'a>,
    labels: &'a [&'a str],
}

impl<'a> ChoiceSetting<'a> {
    pub fn new(value: &'a AtomicI32, labels: &'a [&'a str], default: i32) -> Self {
        let maximum = labels.len() as i32 - 1;
        Self {
            setting: IntSetting::new(value, 0, maximum, default),
            labels,
        }
    }

    /// The underlying bounded integer.
    pub fn setting(&self) -> &IntSetting<'a> {
        &self.setting
    }

    pub fn labels(&self) -> &'a [&'a str] {
        self.labels
    }

    /// Label for `index`, if it is a valid choice.
    pub fn label(&self, index: i32) -> Option<&'a str> {
        usize::try_from(index).ok().and_then(|i| self.labels.get(i).copied())
    }

    pub fn value(&self) -> i32 {
        self.setting.value()
    }

    pub fn maximum(&self) -> i32 {
        self.setting.maximum()
    }
}

// ── Actions ──────────────────────────────────────────────────────────────

/// What a menu row does when tapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Leave the current menu for its parent.
    Back,
    /// Persist (if dirty) and hide the menu.
    SaveAndExit,
    /// Revert (if dirty) and hide the menu.
    Cancel,
    /// Reset every setting in the tree to its default.
    ResetToDefaults,
    /// Reset only the settings below the menu holding this action.
    ResetMenuToDefaults,
    /// Application-defined; delivered to the hooks with its tag.
    Custom(u8),
}

impl Action {
    /// Label used when the action is added without an explicit name.
    pub fn default_name(&self) -> &'static str {
        match self {
            Action::Back => "Back",
            Action::SaveAndExit => "Save & Exit",
            Action::Cancel => "Cancel",
            Action::ResetToDefaults => "Defaults",
            Action::ResetMenuToDefaults => "Reset",
            Action::Custom(_) => "",
        }
    }
}

// ── Nodes ────────────────────────────────────────────────────────────────

/// Kind-specific payload of a node.
#[derive(Debug, Clone, Copy)]
pub enum NodeKind<'a> {
    Action(Action),
    Menu,
    Int(IntSetting<'a>),
    Choice(ChoiceSetting<'a>),
}

impl<'a> NodeKind<'a> {
    /// The bounded integer behind an `Int` or `Choice` node.
    pub fn setting(&self) -> Option<&IntSetting<'a>> {
        match self {
            NodeKind::Int(setting) => Some(setting),
            NodeKind::Choice(choice) => Some(choice.setting()),
            NodeKind::Action(_) | NodeKind::Menu => None,
        }
    }

    pub fn is_menu(&self) -> bool {
        matches!(self, NodeKind::Menu)
    }

    /// Right-hand text: `...` for menus, nothing for actions, the number for
    /// ints, the current label for choices.
    pub fn description(&self) -> Description {
        let mut text = Description::new();
        match self {
            NodeKind::Menu => push_truncated(&mut text, "..."),
            NodeKind::Action(_) => {}
            NodeKind::Int(setting) => {
                // An i32 always fits.
                let _ = write!(text, "{}", setting.value());
            }
            NodeKind::Choice(choice) => {
                push_truncated(&mut text, choice.label(choice.value()).unwrap_or("?"));
            }
        }
        text
    }
}

/// One entry of the tree with its links.
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    pub(crate) name: &'a str,
    pub(crate) kind: NodeKind<'a>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) previous: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
}

impl<'a> Node<'a> {
    pub(crate) fn new(name: &'a str, kind: NodeKind<'a>) -> Self {
        Self {
            name,
            kind,
            parent: None,
            previous: None,
            next: None,
            first_child: None,
        }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn kind(&self) -> &NodeKind<'a> {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn previous_sibling(&self) -> Option<NodeId> {
        self.previous
    }

    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }
}

/// Append as much of `text` as fits, never splitting a character.
pub(crate) fn push_truncated<const N: usize>(out: &mut String<N>, text: &str) {
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_value_reports_change_only_when_clamped_value_differs() {
        let store = AtomicI32::new(5);
        let setting = IntSetting::new(&store, 0, 10, 5);

        assert!(!setting.set_value(5));
        assert!(setting.set_value(12));
        assert_eq!(setting.value(), 10);
        assert!(!setting.set_value(99));
        assert!(setting.set_value(-3));
        assert_eq!(store.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn reset_is_set_default() {
        let store = AtomicI32::new(9);
        let setting = IntSetting::new(&store, 0, 10, 5);
        assert!(setting.reset());
        assert_eq!(setting.value(), 5);
        assert!(!setting.reset());
    }

    #[test]
    fn inverted_range_and_default_are_normalised() {
        let store = AtomicI32::new(0);
        let setting = IntSetting::new(&store, 4, 1, 100);
        assert_eq!(setting.maximum(), 4);
        assert_eq!(setting.default_value(), 4);
    }

    #[test]
    fn choice_range_follows_labels() {
        let store = AtomicI32::new(1);
        let labels = ["Sine", "Triangle", "Square"];
        let choice = ChoiceSetting::new(&store, &labels, 0);
        assert_eq!(choice.setting().minimum(), 0);
        assert_eq!(choice.maximum(), 2);
        assert_eq!(choice.label(1), Some("Triangle"));
        assert_eq!(choice.label(3), None);
        assert_eq!(choice.label(-1), None);
    }

    #[test]
    fn descriptions_per_kind() {
        let int_store = AtomicI32::new(-42);
        let choice_store = AtomicI32::new(1);
        let labels = ["Off", "On"];

        assert_eq!(NodeKind::Menu.description().as_str(), "...");
        assert_eq!(NodeKind::Action(Action::Back).description().as_str(), "");
        let int = NodeKind::Int(IntSetting::new(&int_store, -100, 100, 0));
        assert_eq!(int.description().as_str(), "-42");
        let choice = NodeKind::Choice(ChoiceSetting::new(&choice_store, &labels, 0));
        assert_eq!(choice.description().as_str(), "On");
    }

    #[test]
    fn long_labels_are_truncated() {
        let store = AtomicI32::new(0);
        let labels = ["A label much longer than any OLED row"];
        let choice = NodeKind::Choice(ChoiceSetting::new(&store, &labels, 0));
        assert_eq!(choice.description().len(), DESCRIPTION_LEN);
    }

    #[test]
    fn built_in_action_names() {
        assert_eq!(Action::Back.default_name(), "Back");
        assert_eq!(Action::SaveAndExit.default_name(), "Save & Exit");
        assert_eq!(Action::Cancel.default_name(), "Cancel");
        assert_eq!(Action::ResetToDefaults.default_name(), "Defaults");
        assert_eq!(Action::ResetMenuToDefaults.default_name(), "Reset");
    }
}
