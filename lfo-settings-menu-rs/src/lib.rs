//! Settings tree and encoder-driven menu for a small monochrome display.
//!
//! This crate provides [`SettingsTree`], a fixed-capacity arena of menus,
//! bounded integer settings, multiple-choice settings and actions, and
//! [`MenuNavigator`], which lets a single push-button encoder browse and edit
//! that tree on any [`MenuDisplay`].
//!
//! # Quick Start
//!
//! ```ignore
//! use core::sync::atomic::AtomicI32;
//! use lfo_settings_menu::{Action, IntSetting, MenuNavigator, SettingsTree};
//!
//! static SPREAD: AtomicI32 = AtomicI32::new(120);
//!
//! let mut tree: SettingsTree<'static, 16> = SettingsTree::new("Settings");
//! let root = tree.root();
//! tree.add_int(root, "Spread", IntSetting::new(&SPREAD, 0, 360, 120))?;
//! tree.add_action(root, Action::SaveAndExit)?;
//!
//! let mut menu = MenuNavigator::new(&tree, oled);
//! menu.show(&mut rotary);
//! // Each UI tick:
//! menu.update(&mut rotary, &mut hooks);
//! ```
//!
//! # Crate Features
//!
//! - **`defmt`**: [`defmt::Format`] on public types and navigation warnings.

#![no_std]

pub mod menu;
pub mod settings_tree;

// ── Re-exports for convenience ───────────────────────────────────────────

pub use lfo_input::{Counter, Rotary};
pub use menu::{
    Align, MenuDisplay, MenuExit, MenuHooks, MenuNavigator, MenuState, FONT_HEIGHT, INSET,
};
pub use settings_tree::{
    Action, ChoiceSetting, Description, IntSetting, Node, NodeId, NodeKind, SettingsTree,
    TreeError, DESCRIPTION_LEN,
};
