use core::fmt::Write;

use heapless::String;
use lfo_input::{Counter, Rotary};

use super::display::{Align, MenuDisplay};
use super::hooks::{MenuExit, MenuHooks};
use crate::settings_tree::{push_truncated, Action, ChoiceSetting, NodeId, NodeKind, SettingsTree};

/// Font height requested from the display, in pixels.
pub const FONT_HEIGHT: i32 = 16;

/// Left margin of item names; room for the `>` marker.
pub const INSET: i32 = 10;

const ROW_LEN: usize = 32;

type Row = String<ROW_LEN>;

/// Where the navigator is in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuState {
    /// Nothing drawn; the encoder belongs to the application.
    Hidden,
    /// Turning moves the selection through a menu's children.
    BrowsingMenu,
    /// Turning moves through a choice's labels plus a trailing "Back" row.
    BrowsingChoice,
    /// Turning changes a tentative value for the selected int setting.
    EditingInt,
}

/// Encoder-driven menu state machine over a [`SettingsTree`].
///
/// The navigator borrows the tree for its whole life and owns the display.
/// The encoder and the application hooks are lent per call, so the
/// application keeps using the encoder while the menu is hidden.
///
/// # Interaction
///
/// - Turning moves the `>` selection, or changes the value being edited.
/// - Tapping a menu or choice enters it; tapping an int setting starts
///   editing it; tapping an action performs it.
/// - While editing an int the new value is shown as `< 8 >` and only stored
///   on the next tap.
/// - On a choice screen, tapping a label stores it, tapping the trailing
///   "Back" row leaves without storing.
///
/// # Example
///
/// ```ignore
/// let mut menu = MenuNavigator::new(&TREE, oled);
///
/// // UI tick:
/// if rotary.update(now_ms)? {
///     if menu.is_visible() {
///         menu.update(&mut rotary, &mut hooks);
///     } else if rotary.take_tap() {
///         menu.show(&mut rotary);
///     }
/// }
/// ```
pub struct MenuNavigator<'t, 'a, D, const N: usize> {
    tree: &'t SettingsTree<'a, N>,
    display: D,
    context: Option<NodeId>,
    selected: Option<NodeId>,
    editing: bool,
    pending: i32,
    scroll: i32,
    visible_lines: i32,
    saved_rotary: Counter,
    dirty: bool,
}

impl<'t, 'a, D, const N: usize> MenuNavigator<'t, 'a, D, N>
where
    D: MenuDisplay,
{
    /// Create a hidden navigator. Requests [`FONT_HEIGHT`] from the display
    /// and sizes the viewport to whatever font height it grants.
    pub fn new(tree: &'t SettingsTree<'a, N>, mut display: D) -> Self {
        display.request_font_height(FONT_HEIGHT);
        let visible_lines = (display.height() / display.font_height().max(1)).max(1);
        Self {
            tree,
            display,
            context: None,
            selected: None,
            editing: false,
            pending: 0,
            scroll: 0,
            visible_lines,
            saved_rotary: Counter::new(),
            dirty: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> MenuState {
        let Some(kind) = self.context.and_then(|context| self.tree.kind(context)) else {
            return MenuState::Hidden;
        };
        match kind {
            NodeKind::Choice(_) => MenuState::BrowsingChoice,
            _ if self.editing => MenuState::EditingInt,
            _ => MenuState::BrowsingMenu,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.context.is_some()
    }

    /// Whether any setting changed since the menu was last shown.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The menu or choice being browsed.
    pub fn context(&self) -> Option<NodeId> {
        self.context
    }

    /// The highlighted row, or the setting being edited.
    pub fn selected_item(&self) -> Option<NodeId> {
        self.selected
    }

    /// The uncommitted value of the int setting being edited.
    pub fn pending_value(&self) -> Option<i32> {
        (self.state() == MenuState::EditingInt).then_some(self.pending)
    }

    /// Index of the first visible row.
    pub fn scroll_offset(&self) -> i32 {
        self.scroll
    }

    pub fn visible_lines(&self) -> i32 {
        self.visible_lines
    }

    pub fn tree(&self) -> &'t SettingsTree<'a, N> {
        self.tree
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    // ── Showing and hiding ───────────────────────────────────────────

    /// Open the menu at the root (saving the encoder's state first), or
    /// redraw it if already open.
    ///
    /// A root without children cannot be browsed; the call is then a no-op.
    pub fn show(&mut self, rotary: &mut impl Rotary) {
        if self.context.is_none() {
            let root = self.tree.root();
            if self.tree.count_children(root) == 0 {
                #[cfg(feature = "defmt")]
                defmt::warn!("settings menu has no entries, not showing");
                return;
            }
            self.saved_rotary = rotary.save_state();
            self.dirty = false;
            self.set_context(root, rotary);
        }
        self.render(rotary.counter());
    }

    /// Close the menu without saving or loading, blank the display and
    /// give the encoder back exactly as [`show`](Self::show) found it.
    pub fn hide(&mut self, rotary: &mut impl Rotary) {
        if self.context.is_none() {
            return;
        }
        self.context = None;
        self.selected = None;
        self.editing = false;
        self.scroll = 0;
        self.dirty = false;
        self.display.clear();
        self.display.show();
        rotary.clear_events();
        rotary.restore_state(self.saved_rotary);
    }

    /// Process the encoder once per UI tick.
    ///
    /// A hidden menu is shown instead, and any pending tap is swallowed so it
    /// does not also act on the first row.
    pub fn update(&mut self, rotary: &mut impl Rotary, hooks: &mut impl MenuHooks) {
        if self.context.is_none() {
            self.show(rotary);
            rotary.clear_events();
            return;
        }
        self.apply_turn(rotary.counter());
        if rotary.take_tap() {
            self.apply_tap(rotary, hooks);
        }
        if self.context.is_some() {
            self.render(rotary.counter());
        }
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Leave the current edit, or the current menu for its parent.
    ///
    /// No-op at the root.
    pub fn navigate_back(&mut self, rotary: &mut impl Rotary) {
        let Some(context) = self.context else {
            return;
        };
        if self.editing {
            if let Some(item) = self.selected {
                self.navigate_to_item(item, rotary);
            }
        } else if self.tree.parent(context).is_some() {
            self.navigate_to_item(context, rotary);
        } else {
            #[cfg(feature = "defmt")]
            defmt::debug!("back ignored at the top level");
        }
    }

    /// Browse the menu containing `item` with `item` highlighted. The root
    /// itself is browsed from its first child.
    ///
    /// Ignored while hidden or for a stale handle.
    pub fn navigate_to_item(&mut self, item: NodeId, rotary: &mut impl Rotary) {
        let tree = self.tree;
        if self.context.is_none() || !tree.contains(item) {
            #[cfg(feature = "defmt")]
            defmt::warn!("navigate_to_item ignored");
            return;
        }
        self.editing = false;

        let Some(parent) = tree.parent(item) else {
            self.set_context(item, rotary);
            return;
        };
        if self.context != Some(parent) {
            self.set_context(parent, rotary);
        }
        let position = tree.position(item) as i32;
        rotary.set_counter_range(0, tree.count_children(parent) as i32 - 1, false);
        rotary.reset_counter(position);
        self.selected = Some(item);
        self.scroll_to(position);
    }

    /// Browse the root menu from its first child.
    pub fn navigate_to_start(&mut self, rotary: &mut impl Rotary) {
        let root = self.tree.root();
        self.navigate_to_item(root, rotary);
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Save if anything changed, hide, then report [`MenuExit::Saved`].
    pub fn save_and_exit(&mut self, rotary: &mut impl Rotary, hooks: &mut impl MenuHooks) {
        if self.context.is_none() {
            return;
        }
        if self.dirty {
            hooks.save();
        }
        self.hide(rotary);
        #[cfg(feature = "defmt")]
        defmt::debug!("settings menu closed (saved)");
        hooks.hidden(MenuExit::Saved);
    }

    /// Revert if anything changed, hide, then report [`MenuExit::Cancelled`].
    pub fn cancel(&mut self, rotary: &mut impl Rotary, hooks: &mut impl MenuHooks) {
        if self.context.is_none() {
            return;
        }
        if self.dirty {
            hooks.load();
        }
        self.hide(rotary);
        #[cfg(feature = "defmt")]
        defmt::debug!("settings menu closed (cancelled)");
        hooks.hidden(MenuExit::Cancelled);
    }

    /// Reset every setting in the tree to its default.
    pub fn reset_to_defaults(&mut self, hooks: &mut impl MenuHooks) {
        let root = self.tree.root();
        self.reset_from(root, hooks);
    }

    fn reset_from(&mut self, scope: NodeId, hooks: &mut impl MenuHooks) {
        let mut changed = false;
        self.tree.reset_subtree(scope, &mut |id, setting| {
            changed = true;
            hooks.setting_changed(id, setting);
        });
        if changed {
            self.dirty = true;
        }
    }

    fn perform(
        &mut self,
        item: NodeId,
        action: Action,
        rotary: &mut impl Rotary,
        hooks: &mut impl MenuHooks,
    ) {
        match action {
            Action::Back => self.navigate_back(rotary),
            Action::SaveAndExit => self.save_and_exit(rotary, hooks),
            Action::Cancel => self.cancel(rotary, hooks),
            Action::ResetToDefaults => self.reset_to_defaults(hooks),
            Action::ResetMenuToDefaults => {
                let scope = self.tree.parent(item).unwrap_or(self.tree.root());
                self.reset_from(scope, hooks);
            }
            Action::Custom(tag) => hooks.action(item, tag),
        }
    }

    // ── Event handling ───────────────────────────────────────────────

    fn apply_turn(&mut self, counter: i32) {
        let tree = self.tree;
        match self.state() {
            MenuState::BrowsingMenu => {
                let item = self.context.and_then(|context| {
                    usize::try_from(counter).ok().and_then(|position| tree.child(context, position))
                });
                if let Some(item) = item {
                    self.selected = Some(item);
                    self.scroll_to(counter);
                }
            }
            MenuState::EditingInt => {
                if let Some(setting) = self.selected.and_then(|item| tree.setting(item)) {
                    self.pending = setting.clamp(counter);
                }
            }
            MenuState::BrowsingChoice => self.scroll_to(counter),
            MenuState::Hidden => {}
        }
    }

    fn apply_tap(&mut self, rotary: &mut impl Rotary, hooks: &mut impl MenuHooks) {
        match self.state() {
            MenuState::EditingInt => {
                if let Some(item) = self.selected {
                    self.commit(item, self.pending, hooks);
                }
                self.navigate_back(rotary);
            }
            MenuState::BrowsingChoice => {
                let counter = rotary.counter();
                if let Some(choice) = self.context {
                    let on_label = self
                        .tree
                        .setting(choice)
                        .is_some_and(|setting| counter <= setting.maximum());
                    if on_label {
                        self.commit(choice, counter, hooks);
                    }
                }
                self.navigate_back(rotary);
            }
            MenuState::BrowsingMenu => self.apply_menu_tap(rotary, hooks),
            MenuState::Hidden => {}
        }
    }

    fn apply_menu_tap(&mut self, rotary: &mut impl Rotary, hooks: &mut impl MenuHooks) {
        let tree = self.tree;
        let Some(item) = self.selected else {
            return;
        };
        let Some(&kind) = tree.kind(item) else {
            return;
        };
        match kind {
            NodeKind::Menu | NodeKind::Choice(_) => self.set_context(item, rotary),
            NodeKind::Int(setting) => {
                rotary.set_counter_range(setting.minimum(), setting.maximum(), false);
                rotary.reset_counter(setting.value());
                self.pending = setting.value();
                self.editing = true;
            }
            NodeKind::Action(action) => self.perform(item, action, rotary, hooks),
        }
    }

    fn commit(&mut self, item: NodeId, value: i32, hooks: &mut impl MenuHooks) {
        if let Some(setting) = self.tree.setting(item) {
            if setting.set_value(value) {
                self.dirty = true;
                hooks.setting_changed(item, setting);
            }
        }
    }

    /// Enter `context`, pointing the encoder at its rows.
    fn set_context(&mut self, context: NodeId, rotary: &mut impl Rotary) {
        let tree = self.tree;
        match tree.kind(context) {
            Some(NodeKind::Menu) => {
                let count = tree.count_children(context) as i32;
                if count == 0 {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("cannot browse an empty menu");
                    return;
                }
                rotary.set_counter_range(0, count - 1, false);
                rotary.reset_counter(0);
                self.editing = false;
                self.selected = tree.first_child(context);
                self.scroll = 0;
            }
            Some(NodeKind::Choice(choice)) => {
                // One row past the last label for "Back".
                rotary.set_counter_range(0, choice.maximum() + 1, false);
                rotary.reset_counter(choice.value());
                self.editing = true;
                self.selected = Some(context);
                self.scroll = 0;
                self.scroll_to(choice.value());
            }
            _ => {
                #[cfg(feature = "defmt")]
                defmt::warn!("only menus and choices can be browsed");
                return;
            }
        }
        self.context = Some(context);
    }

    /// Scroll the minimum amount that makes row `position` visible.
    fn scroll_to(&mut self, position: i32) {
        if position >= self.scroll + self.visible_lines {
            self.scroll = position - self.visible_lines + 1;
        } else if position < self.scroll {
            self.scroll = position;
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&mut self, counter: i32) {
        let Some(context) = self.context else {
            return;
        };
        let tree = self.tree;
        self.display.clear();
        match tree.kind(context) {
            Some(NodeKind::Menu) => self.draw_menu(context),
            Some(NodeKind::Choice(choice)) => self.draw_choice(context, choice, counter),
            _ => {}
        }
        self.display.show();
    }

    fn draw_menu(&mut self, menu: NodeId) {
        let tree = self.tree;
        let font = self.display.font_height();
        let width = self.display.width();

        let mut item = usize::try_from(self.scroll)
            .ok()
            .and_then(|first| tree.child(menu, first));
        for row in 0..self.visible_lines {
            let Some(id) = item else {
                break;
            };
            let y = row * font;
            let highlighted = self.selected == Some(id);

            if highlighted && !self.editing {
                self.display.draw_string(0, y, ">", Align::Left);
            }
            self.display.draw_string(INSET, y, tree.name(id).unwrap_or(""), Align::Left);
            if highlighted && self.editing {
                let mut live = Row::new();
                let _ = write!(live, "< {} >", self.pending);
                self.display.draw_string(width, y, &live, Align::Right);
            } else {
                self.display.draw_string(width, y, &tree.description(id), Align::Right);
            }
            item = tree.next_sibling(id);
        }
    }

    fn draw_choice(&mut self, choice_id: NodeId, choice: &ChoiceSetting<'_>, counter: i32) {
        let font = self.display.font_height();
        let width = self.display.width();
        let name = self.tree.name(choice_id).unwrap_or("");
        self.display.draw_string(INSET, 0, name, Align::Left);

        let back_row = choice.maximum() + 1;
        let mut index = self.scroll;
        for row in 0..self.visible_lines {
            if index > back_row {
                break;
            }
            let y = row * font;
            let mut text = Row::new();
            if index < back_row {
                push_truncated(&mut text, choice.label(index).unwrap_or("?"));
                push_truncated(&mut text, if index == choice.value() { " [x]" } else { " [ ]" });
            } else {
                push_truncated(&mut text, "Back");
            }
            self.display.draw_string(width - INSET, y, &text, Align::Right);
            if index == counter {
                self.display.draw_string(width, y, "<", Align::Right);
            }
            index += 1;
        }
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::settings_tree::IntSetting;
    use core::sync::atomic::{AtomicI32, Ordering};
    use std::string::{String as StdString, ToString};
    use std::vec::Vec;

    // ── Fakes ────────────────────────────────────────────────────────

    type Draw = (i32, i32, StdString, Align);

    struct FakeDisplay {
        width: i32,
        height: i32,
        font: i32,
        current: Vec<Draw>,
        frames: Vec<Vec<Draw>>,
    }

    impl FakeDisplay {
        fn new(width: i32, height: i32) -> Self {
            Self {
                width,
                height,
                font: 8,
                current: Vec::new(),
                frames: Vec::new(),
            }
        }

        fn last_frame(&self) -> &[Draw] {
            self.frames.last().map(Vec::as_slice).unwrap_or(&[])
        }

        fn drew(&self, x: i32, y: i32, text: &str, align: Align) -> bool {
            self.last_frame()
                .iter()
                .any(|d| *d == (x, y, text.to_string(), align))
        }
    }

    impl MenuDisplay for FakeDisplay {
        fn clear(&mut self) {
            self.current.clear();
        }

        fn show(&mut self) {
            self.frames.push(self.current.clone());
        }

        fn width(&self) -> i32 {
            self.width
        }

        fn height(&self) -> i32 {
            self.height
        }

        fn request_font_height(&mut self, height: i32) {
            self.font = height;
        }

        fn font_height(&self) -> i32 {
            self.font
        }

        fn draw_string(&mut self, x: i32, y: i32, text: &str, align: Align) {
            self.current.push((x, y, text.to_string(), align));
        }
    }

    struct FakeRotary {
        counter: Counter,
        tap: bool,
    }

    impl FakeRotary {
        fn new() -> Self {
            Self {
                counter: Counter::new(),
                tap: false,
            }
        }

        fn turn(&mut self, detents: i32) {
            self.counter.apply(detents);
        }

        fn tap(&mut self) {
            self.tap = true;
        }

        fn range(&self) -> (i32, i32) {
            (self.counter.minimum(), self.counter.maximum())
        }
    }

    impl Rotary for FakeRotary {
        fn counter(&self) -> i32 {
            self.counter.value()
        }

        fn save_state(&self) -> Counter {
            self.counter
        }

        fn restore_state(&mut self, state: Counter) {
            self.counter = state;
        }

        fn set_counter_range(&mut self, minimum: i32, maximum: i32, wrap: bool) {
            self.counter.set_range(minimum, maximum, wrap);
        }

        fn reset_counter(&mut self, value: i32) {
            self.counter.reset(value);
        }

        fn take_tap(&mut self) -> bool {
            core::mem::take(&mut self.tap)
        }

        fn clear_events(&mut self) {
            self.tap = false;
        }
    }

    #[derive(Default)]
    struct RecordingHooks {
        changes: Vec<(NodeId, i32)>,
        saves: usize,
        loads: usize,
        exits: Vec<MenuExit>,
        actions: Vec<(NodeId, u8)>,
    }

    impl MenuHooks for RecordingHooks {
        fn setting_changed(&mut self, node: NodeId, setting: &IntSetting<'_>) {
            self.changes.push((node, setting.value()));
        }

        fn save(&mut self) {
            self.saves += 1;
        }

        fn load(&mut self) {
            self.loads += 1;
        }

        fn hidden(&mut self, exit: MenuExit) {
            self.exits.push(exit);
        }

        fn action(&mut self, node: NodeId, tag: u8) {
            self.actions.push((node, tag));
        }
    }

    // ── Fixtures ─────────────────────────────────────────────────────

    const MODE_LABELS: &[&str] = &["Sine", "Triangle"];

    struct Basic {
        level: NodeId,
        mode: NodeId,
        back: NodeId,
    }

    /// Root: Level [0, 10] default 5, Mode (2 labels) default 0, Back.
    fn basic_tree<'a>(level: &'a AtomicI32, mode: &'a AtomicI32) -> (SettingsTree<'a, 8>, Basic) {
        let mut tree = SettingsTree::new("Settings");
        let root = tree.root();
        let ids = Basic {
            level: tree.add_int(root, "Level", IntSetting::new(level, 0, 10, 5)).unwrap(),
            mode: tree
                .add_choice(root, "Mode", ChoiceSetting::new(mode, MODE_LABELS, 0))
                .unwrap(),
            back: tree.add_action(root, Action::Back).unwrap(),
        };
        (tree, ids)
    }

    struct Nested {
        gain: NodeId,
        sub: NodeId,
        depth: NodeId,
        sub_defaults: NodeId,
        sub_back: NodeId,
    }

    /// Root: Gain, Sub [Depth, Reset, Back], Defaults, Save & Exit, Cancel.
    fn nested_tree<'a>(gain: &'a AtomicI32, depth: &'a AtomicI32) -> (SettingsTree<'a, 16>, Nested) {
        let mut tree = SettingsTree::new("Settings");
        let root = tree.root();
        let gain_id = tree.add_int(root, "Gain", IntSetting::new(gain, 0, 100, 50)).unwrap();
        let sub = tree.add_menu(root, "Sub").unwrap();
        let depth_id = tree.add_int(sub, "Depth", IntSetting::new(depth, 0, 10, 1)).unwrap();
        let sub_defaults = tree.add_action(sub, Action::ResetMenuToDefaults).unwrap();
        let sub_back = tree.add_action(sub, Action::Back).unwrap();
        tree.add_action(root, Action::ResetToDefaults).unwrap();
        tree.add_action(root, Action::SaveAndExit).unwrap();
        tree.add_action(root, Action::Cancel).unwrap();
        let ids = Nested {
            gain: gain_id,
            sub,
            depth: depth_id,
            sub_defaults,
            sub_back,
        };
        (tree, ids)
    }

    /// Move the selection to `position` and tap it.
    fn tap_row<D: MenuDisplay, const N: usize>(
        menu: &mut MenuNavigator<'_, '_, D, N>,
        rotary: &mut FakeRotary,
        hooks: &mut RecordingHooks,
        position: i32,
    ) {
        rotary.reset_counter(position);
        menu.update(rotary, hooks);
        rotary.tap();
        menu.update(rotary, hooks);
    }

    // ── Showing ──────────────────────────────────────────────────────

    #[test]
    fn show_selects_first_child_and_scopes_encoder() {
        let (level, mode) = (AtomicI32::new(5), AtomicI32::new(0));
        let (tree, ids) = basic_tree(&level, &mode);
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 64));
        let mut rotary = FakeRotary::new();

        assert_eq!(menu.state(), MenuState::Hidden);
        assert_eq!(menu.visible_lines(), 4);
        menu.show(&mut rotary);

        assert_eq!(menu.state(), MenuState::BrowsingMenu);
        assert_eq!(menu.context(), Some(tree.root()));
        assert_eq!(menu.selected_item(), Some(ids.level));
        assert_eq!(rotary.range(), (0, 2));
        assert_eq!(rotary.counter(), 0);
        assert!(!rotary.counter.wraps());
    }

    #[test]
    fn show_renders_menu_rows() {
        let (level, mode) = (AtomicI32::new(5), AtomicI32::new(0));
        let (tree, _) = basic_tree(&level, &mode);
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 64));
        menu.show(&mut FakeRotary::new());

        let display = menu.display();
        assert_eq!(display.frames.len(), 1);
        assert!(display.drew(0, 0, ">", Align::Left));
        assert!(display.drew(INSET, 0, "Level", Align::Left));
        assert!(display.drew(128, 0, "5", Align::Right));
        assert!(display.drew(INSET, 16, "Mode", Align::Left));
        assert!(display.drew(128, 16, "Sine", Align::Right));
        assert!(display.drew(INSET, 32, "Back", Align::Left));
        assert!(!display.drew(0, 16, ">", Align::Left));
    }

    #[test]
    fn empty_root_cannot_be_shown() {
        let tree: SettingsTree<'_, 4> = SettingsTree::new("Empty");
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 64));
        let mut rotary = FakeRotary::new();
        rotary.set_counter_range(0, 9, true);
        rotary.reset_counter(4);

        menu.show(&mut rotary);
        assert!(!menu.is_visible());
        assert_eq!(rotary.counter(), 4);
        assert_eq!(rotary.range(), (0, 9));
    }

    #[test]
    fn update_while_hidden_shows_and_swallows_tap() {
        let (level, mode) = (AtomicI32::new(5), AtomicI32::new(0));
        let (tree, _) = basic_tree(&level, &mode);
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 64));
        let mut rotary = FakeRotary::new();
        let mut hooks = RecordingHooks::default();

        rotary.tap();
        menu.update(&mut rotary, &mut hooks);
        assert_eq!(menu.state(), MenuState::BrowsingMenu);
        assert!(!rotary.tap);
        assert!(menu.pending_value().is_none());
    }

    // ── Int editing ──────────────────────────────────────────────────

    #[test]
    fn int_edit_end_to_end() {
        let (level, mode) = (AtomicI32::new(5), AtomicI32::new(0));
        let (tree, ids) = basic_tree(&level, &mode);
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 64));
        let mut rotary = FakeRotary::new();
        let mut hooks = RecordingHooks::default();
        menu.show(&mut rotary);

        // Turning past the last row saturates on it.
        rotary.turn(5);
        menu.update(&mut rotary, &mut hooks);
        assert_eq!(menu.selected_item(), Some(ids.back));
        rotary.turn(-5);
        menu.update(&mut rotary, &mut hooks);
        assert_eq!(menu.selected_item(), Some(ids.level));

        rotary.tap();
        menu.update(&mut rotary, &mut hooks);
        assert_eq!(menu.state(), MenuState::EditingInt);
        assert_eq!(rotary.range(), (0, 10));
        assert_eq!(rotary.counter(), 5);

        rotary.turn(3);
        menu.update(&mut rotary, &mut hooks);
        assert_eq!(menu.pending_value(), Some(8));
        assert_eq!(level.load(Ordering::Relaxed), 5);
        assert!(hooks.changes.is_empty());
        assert!(menu.display().drew(128, 0, "< 8 >", Align::Right));
        assert!(!menu.display().drew(0, 0, ">", Align::Left));

        rotary.tap();
        menu.update(&mut rotary, &mut hooks);
        assert_eq!(level.load(Ordering::Relaxed), 8);
        assert_eq!(hooks.changes, [(ids.level, 8)]);
        assert_eq!(menu.state(), MenuState::BrowsingMenu);
        assert!(menu.is_dirty());
        assert_eq!(menu.selected_item(), Some(ids.level));
        assert_eq!(rotary.range(), (0, 2));
        assert_eq!(rotary.counter(), 0);
    }

    #[test]
    fn unchanged_int_edit_fires_nothing() {
        let (level, mode) = (AtomicI32::new(5), AtomicI32::new(0));
        let (tree, _) = basic_tree(&level, &mode);
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 64));
        let mut rotary = FakeRotary::new();
        let mut hooks = RecordingHooks::default();
        menu.show(&mut rotary);

        tap_row(&mut menu, &mut rotary, &mut hooks, 0);
        rotary.turn(2);
        menu.update(&mut rotary, &mut hooks);
        rotary.turn(-2);
        rotary.tap();
        menu.update(&mut rotary, &mut hooks);

        assert!(hooks.changes.is_empty());
        assert!(!menu.is_dirty());
    }

    // ── Choice browsing ──────────────────────────────────────────────

    #[test]
    fn choice_tap_on_label_commits_and_returns() {
        let (level, mode) = (AtomicI32::new(5), AtomicI32::new(0));
        let (tree, ids) = basic_tree(&level, &mode);
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 64));
        let mut rotary = FakeRotary::new();
        let mut hooks = RecordingHooks::default();
        menu.show(&mut rotary);

        tap_row(&mut menu, &mut rotary, &mut hooks, 1);
        assert_eq!(menu.state(), MenuState::BrowsingChoice);
        assert_eq!(menu.context(), Some(ids.mode));
        assert_eq!(rotary.range(), (0, 2));
        assert_eq!(rotary.counter(), 0);

        rotary.turn(1);
        menu.update(&mut rotary, &mut hooks);
        rotary.tap();
        menu.update(&mut rotary, &mut hooks);

        assert_eq!(mode.load(Ordering::Relaxed), 1);
        assert_eq!(hooks.changes, [(ids.mode, 1)]);
        assert_eq!(menu.state(), MenuState::BrowsingMenu);
        assert_eq!(menu.context(), Some(tree.root()));
        assert_eq!(menu.selected_item(), Some(ids.mode));
        assert_eq!(rotary.counter(), 1);
        assert_eq!(rotary.range(), (0, 2));
    }

    #[test]
    fn choice_back_row_leaves_without_commit() {
        let (level, mode) = (AtomicI32::new(5), AtomicI32::new(0));
        let (tree, ids) = basic_tree(&level, &mode);
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 64));
        let mut rotary = FakeRotary::new();
        let mut hooks = RecordingHooks::default();
        menu.show(&mut rotary);

        tap_row(&mut menu, &mut rotary, &mut hooks, 1);
        rotary.turn(2);
        rotary.tap();
        menu.update(&mut rotary, &mut hooks);

        assert_eq!(mode.load(Ordering::Relaxed), 0);
        assert!(hooks.changes.is_empty());
        assert!(!menu.is_dirty());
        assert_eq!(menu.selected_item(), Some(ids.mode));
    }

    #[test]
    fn choice_screen_marks_value_and_cursor() {
        let (level, mode) = (AtomicI32::new(5), AtomicI32::new(0));
        let (tree, _) = basic_tree(&level, &mode);
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 64));
        let mut rotary = FakeRotary::new();
        let mut hooks = RecordingHooks::default();
        menu.show(&mut rotary);
        tap_row(&mut menu, &mut rotary, &mut hooks, 1);

        rotary.turn(1);
        menu.update(&mut rotary, &mut hooks);

        let display = menu.display();
        let right = 128 - INSET;
        assert!(display.drew(INSET, 0, "Mode", Align::Left));
        assert!(display.drew(right, 0, "Sine [x]", Align::Right));
        assert!(display.drew(right, 16, "Triangle [ ]", Align::Right));
        assert!(display.drew(right, 32, "Back", Align::Right));
        assert!(display.drew(128, 16, "<", Align::Right));
        assert!(!display.drew(128, 0, "<", Align::Right));
    }

    // ── Submenus and actions ─────────────────────────────────────────

    #[test]
    fn back_action_returns_to_parent_with_submenu_highlighted() {
        let (gain, depth) = (AtomicI32::new(50), AtomicI32::new(1));
        let (tree, ids) = nested_tree(&gain, &depth);
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 64));
        let mut rotary = FakeRotary::new();
        let mut hooks = RecordingHooks::default();
        menu.show(&mut rotary);

        tap_row(&mut menu, &mut rotary, &mut hooks, 1);
        assert_eq!(menu.context(), Some(ids.sub));
        assert_eq!(menu.selected_item(), Some(ids.depth));
        assert_eq!(rotary.range(), (0, 2));

        tap_row(&mut menu, &mut rotary, &mut hooks, 2);
        assert_eq!(menu.context(), Some(tree.root()));
        assert_eq!(menu.selected_item(), Some(ids.sub));
        assert_eq!(rotary.counter(), 1);
        assert_eq!(rotary.range(), (0, 4));
        let _ = ids.sub_back;
    }

    #[test]
    fn back_at_root_is_ignored() {
        let (level, mode) = (AtomicI32::new(5), AtomicI32::new(0));
        let (tree, ids) = basic_tree(&level, &mode);
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 64));
        let mut rotary = FakeRotary::new();
        let mut hooks = RecordingHooks::default();
        menu.show(&mut rotary);

        tap_row(&mut menu, &mut rotary, &mut hooks, 2);
        assert_eq!(menu.state(), MenuState::BrowsingMenu);
        assert_eq!(menu.selected_item(), Some(ids.back));
    }

    #[test]
    fn submenu_defaults_reset_only_that_menu() {
        let (gain, depth) = (AtomicI32::new(80), AtomicI32::new(7));
        let (tree, ids) = nested_tree(&gain, &depth);
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 64));
        let mut rotary = FakeRotary::new();
        let mut hooks = RecordingHooks::default();
        menu.show(&mut rotary);

        tap_row(&mut menu, &mut rotary, &mut hooks, 1);
        tap_row(&mut menu, &mut rotary, &mut hooks, 1);

        assert_eq!(hooks.changes, [(ids.depth, 1)]);
        assert_eq!(gain.load(Ordering::Relaxed), 80);
        assert!(menu.is_dirty());
        assert_eq!(menu.context(), Some(ids.sub));
        assert_eq!(menu.selected_item(), Some(ids.sub_defaults));
    }

    #[test]
    fn defaults_inside_submenu_reset_whole_tree() {
        let (gain, depth) = (AtomicI32::new(80), AtomicI32::new(7));
        let mut tree: SettingsTree<'_, 8> = SettingsTree::new("Settings");
        let root = tree.root();
        let gain_id = tree.add_int(root, "Gain", IntSetting::new(&gain, 0, 100, 50)).unwrap();
        let sub = tree.add_menu(root, "Sub").unwrap();
        let depth_id = tree.add_int(sub, "Depth", IntSetting::new(&depth, 0, 10, 1)).unwrap();
        tree.add_action(sub, Action::ResetToDefaults).unwrap();
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 64));
        let mut rotary = FakeRotary::new();
        let mut hooks = RecordingHooks::default();
        menu.show(&mut rotary);

        tap_row(&mut menu, &mut rotary, &mut hooks, 1);
        tap_row(&mut menu, &mut rotary, &mut hooks, 1);

        assert_eq!(hooks.changes, [(gain_id, 50), (depth_id, 1)]);
        assert_eq!(gain.load(Ordering::Relaxed), 50);
        assert!(menu.is_dirty());
        assert_eq!(menu.context(), Some(sub));
    }

    #[test]
    fn root_defaults_reset_whole_tree() {
        let (gain, depth) = (AtomicI32::new(80), AtomicI32::new(7));
        let (tree, ids) = nested_tree(&gain, &depth);
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 64));
        let mut rotary = FakeRotary::new();
        let mut hooks = RecordingHooks::default();
        menu.show(&mut rotary);

        tap_row(&mut menu, &mut rotary, &mut hooks, 2);
        assert_eq!(hooks.changes, [(ids.gain, 50), (ids.depth, 1)]);

        // Nothing left to reset the second time.
        menu.reset_to_defaults(&mut hooks);
        assert_eq!(hooks.changes.len(), 2);
    }

    #[test]
    fn custom_action_is_delivered_with_tag() {
        let mut tree: SettingsTree<'_, 4> = SettingsTree::new("Settings");
        let root = tree.root();
        let tune = tree.add_named_action(root, "Tune", Action::Custom(7)).unwrap();
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 64));
        let mut rotary = FakeRotary::new();
        let mut hooks = RecordingHooks::default();
        menu.show(&mut rotary);

        tap_row(&mut menu, &mut rotary, &mut hooks, 0);
        assert_eq!(hooks.actions, [(tune, 7)]);
        assert!(menu.is_visible());
    }

    // ── Leaving ──────────────────────────────────────────────────────

    #[test]
    fn save_and_exit_saves_when_dirty_and_restores_encoder() {
        let (gain, depth) = (AtomicI32::new(50), AtomicI32::new(1));
        let (tree, _) = nested_tree(&gain, &depth);
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 64));
        let mut rotary = FakeRotary::new();
        let mut hooks = RecordingHooks::default();
        rotary.set_counter_range(0, 127, false);
        rotary.reset_counter(42);
        let before = rotary.save_state();
        menu.show(&mut rotary);

        tap_row(&mut menu, &mut rotary, &mut hooks, 0);
        rotary.turn(1);
        rotary.tap();
        menu.update(&mut rotary, &mut hooks);
        assert!(menu.is_dirty());

        tap_row(&mut menu, &mut rotary, &mut hooks, 3);
        assert_eq!(hooks.saves, 1);
        assert_eq!(hooks.exits, [MenuExit::Saved]);
        assert_eq!(menu.state(), MenuState::Hidden);
        assert!(!menu.is_dirty());
        assert_eq!(rotary.save_state(), before);
        assert!(menu.display().last_frame().is_empty());
    }

    #[test]
    fn save_and_exit_skips_save_when_clean() {
        let (gain, depth) = (AtomicI32::new(50), AtomicI32::new(1));
        let (tree, _) = nested_tree(&gain, &depth);
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 64));
        let mut rotary = FakeRotary::new();
        let mut hooks = RecordingHooks::default();
        menu.show(&mut rotary);

        tap_row(&mut menu, &mut rotary, &mut hooks, 3);
        assert_eq!(hooks.saves, 0);
        assert_eq!(hooks.exits, [MenuExit::Saved]);
    }

    #[test]
    fn cancel_loads_when_dirty() {
        let (gain, depth) = (AtomicI32::new(80), AtomicI32::new(1));
        let (tree, _) = nested_tree(&gain, &depth);
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 64));
        let mut rotary = FakeRotary::new();
        let mut hooks = RecordingHooks::default();
        menu.show(&mut rotary);

        menu.reset_to_defaults(&mut hooks);
        tap_row(&mut menu, &mut rotary, &mut hooks, 4);
        assert_eq!(hooks.loads, 1);
        assert_eq!(hooks.saves, 0);
        assert_eq!(hooks.exits, [MenuExit::Cancelled]);
        assert!(!menu.is_visible());
    }

    #[test]
    fn leaving_while_hidden_is_ignored() {
        let (level, mode) = (AtomicI32::new(5), AtomicI32::new(0));
        let (tree, _) = basic_tree(&level, &mode);
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 64));
        let mut rotary = FakeRotary::new();
        let mut hooks = RecordingHooks::default();

        menu.cancel(&mut rotary, &mut hooks);
        menu.save_and_exit(&mut rotary, &mut hooks);
        assert!(hooks.exits.is_empty());
    }

    // ── Scrolling and direct navigation ──────────────────────────────

    #[test]
    fn viewport_scrolls_minimally() {
        let mut tree: SettingsTree<'_, 8> = SettingsTree::new("Settings");
        let root = tree.root();
        for (tag, name) in ["One", "Two", "Three", "Four"].into_iter().enumerate() {
            tree.add_named_action(root, name, Action::Custom(tag as u8)).unwrap();
        }
        // 32 px at 16 px per line: two rows.
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 32));
        let mut rotary = FakeRotary::new();
        let mut hooks = RecordingHooks::default();
        menu.show(&mut rotary);
        assert_eq!(menu.visible_lines(), 2);

        rotary.turn(3);
        menu.update(&mut rotary, &mut hooks);
        assert_eq!(menu.scroll_offset(), 2);
        assert!(menu.display().drew(INSET, 0, "Three", Align::Left));
        assert!(menu.display().drew(0, 16, ">", Align::Left));

        rotary.turn(-1);
        menu.update(&mut rotary, &mut hooks);
        assert_eq!(menu.scroll_offset(), 2);

        rotary.turn(-2);
        menu.update(&mut rotary, &mut hooks);
        assert_eq!(menu.scroll_offset(), 0);
    }

    #[test]
    fn navigate_to_item_and_start() {
        let (gain, depth) = (AtomicI32::new(50), AtomicI32::new(1));
        let (tree, ids) = nested_tree(&gain, &depth);
        let mut menu = MenuNavigator::new(&tree, FakeDisplay::new(128, 64));
        let mut rotary = FakeRotary::new();
        menu.show(&mut rotary);

        menu.navigate_to_item(ids.sub_back, &mut rotary);
        assert_eq!(menu.context(), Some(ids.sub));
        assert_eq!(menu.selected_item(), Some(ids.sub_back));
        assert_eq!(rotary.counter(), 2);

        menu.navigate_to_start(&mut rotary);
        assert_eq!(menu.context(), Some(tree.root()));
        assert_eq!(menu.selected_item(), Some(ids.gain));
        assert_eq!(rotary.counter(), 0);
    }
}
