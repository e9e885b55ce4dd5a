//! Encoder-driven menu over a [`SettingsTree`](crate::SettingsTree).
//!
//! [`MenuNavigator`] maps turns and taps from any [`Rotary`](lfo_input::Rotary)
//! onto tree navigation and value editing, renders through a
//! [`MenuDisplay`], and reports changes, saves and exits through
//! [`MenuHooks`].

mod display;
mod hooks;
mod navigator;

pub use display::{Align, MenuDisplay};
pub use hooks::{MenuExit, MenuHooks};
pub use navigator::{MenuNavigator, MenuState, FONT_HEIGHT, INSET};
