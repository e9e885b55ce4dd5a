//! Hierarchical configuration model: menus, integer settings, multiple-choice
//! settings and actions.
//!
//! # Architecture
//!
//! Nodes live in a fixed-capacity arena ([`SettingsTree`]) and link to each
//! other by generational [`NodeId`] handles: a parent, a doubly linked
//! sibling list and a first child. Removing a node relinks its neighbours and
//! bumps the slot's generation, so stale handles are detected rather than
//! silently pointing at a new node.
//!
//! ```text
//! Settings (root menu)
//! ├── LFO ...            Menu
//! │   ├── Spread    120  Int
//! │   ├── Interp    On   Choice
//! │   └── Back           Action
//! ├── Defaults           Action
//! └── Save & Exit        Action
//! ```
//!
//! # Setting storage
//!
//! [`IntSetting`] and [`ChoiceSetting`] do not own their value. They borrow
//! a caller-owned [`AtomicI32`](core::sync::atomic::AtomicI32), so the audio
//! path can read settings with plain word-sized loads while the menu edits
//! them.
//!
//! The tree is built once at start-up and is `no_std`, allocation free.

mod error;
mod node;
mod tree;

pub use error::TreeError;
pub use node::{
    Action, ChoiceSetting, Description, IntSetting, Node, NodeId, NodeKind, DESCRIPTION_LEN,
};
pub use tree::{Children, SettingsTree};

pub(crate) use node::push_truncated;
