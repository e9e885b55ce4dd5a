use heapless::Vec;

use super::error::TreeError;
use super::node::{Action, ChoiceSetting, Description, IntSetting, Node, NodeId, NodeKind};

/// One arena slot. `node` is `None` while the slot is free.
#[derive(Debug, Clone, Copy)]
struct Slot<'a> {
    generation: u16,
    node: Option<Node<'a>>,
}

/// Fixed-capacity tree of menus, settings and actions.
///
/// Nodes live in an arena of `N` slots and refer to each other by
/// [`NodeId`]. Slot 0 is always the root [`NodeKind::Menu`].
///
/// # Example
///
/// ```
/// use core::sync::atomic::AtomicI32;
/// use lfo_settings_menu::{Action, IntSetting, SettingsTree};
///
/// static DEPTH: AtomicI32 = AtomicI32::new(64);
///
/// let mut tree: SettingsTree<'static, 8> = SettingsTree::new("Settings");
/// let root = tree.root();
/// let output = tree.add_menu(root, "Output").unwrap();
/// tree.add_int(output, "Depth", IntSetting::new(&DEPTH, 0, 127, 64)).unwrap();
/// tree.add_action(output, Action::Back).unwrap();
///
/// assert_eq!(tree.count_children(output), 2);
/// assert_eq!(tree.description(output).as_str(), "...");
/// ```
pub struct SettingsTree<'a, const N: usize> {
    slots: Vec<Slot<'a>, N>,
}

impl<'a, const N: usize> SettingsTree<'a, N> {
    const HAS_ROOM_FOR_ROOT: () = assert!(N > 0, "a settings tree needs at least one slot");

    /// Create a tree holding only the root menu.
    pub fn new(root_name: &'a str) -> Self {
        let () = Self::HAS_ROOM_FOR_ROOT;
        let mut slots = Vec::new();
        // Capacity is at least one, so the root always fits.
        let _ = slots.push(Slot {
            generation: 0,
            node: Some(Node::new(root_name, NodeKind::Menu)),
        });
        Self { slots }
    }

    pub fn root(&self) -> NodeId {
        NodeId {
            index: 0,
            generation: 0,
        }
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    /// Always `false`: the root cannot be removed.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn capacity(&self) -> usize {
        N
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<'a>> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<'a>> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn node(&self, id: NodeId) -> Result<&Node<'a>, TreeError> {
        self.get(id).ok_or(TreeError::InvalidNode)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<'a>, TreeError> {
        self.get_mut(id).ok_or(TreeError::InvalidNode)
    }

    // ── Building ─────────────────────────────────────────────────────

    /// Append a node as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// - [`TreeError::InvalidNode`] if `parent` is stale.
    /// - [`TreeError::NotAMenu`] if `parent` is not a menu.
    /// - [`TreeError::Full`] if every slot is in use.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: &'a str,
        kind: NodeKind<'a>,
    ) -> Result<NodeId, TreeError> {
        if !self.node(parent)?.kind.is_menu() {
            return Err(TreeError::NotAMenu);
        }
        match self.last_child(parent) {
            Some(tail) => self.insert_after(tail, name, kind),
            None => {
                let id = self.allocate(Node::new(name, kind))?;
                self.node_mut(id)?.parent = Some(parent);
                self.node_mut(parent)?.first_child = Some(id);
                Ok(id)
            }
        }
    }

    pub fn add_menu(&mut self, parent: NodeId, name: &'a str) -> Result<NodeId, TreeError> {
        self.add_child(parent, name, NodeKind::Menu)
    }

    pub fn add_int(
        &mut self,
        parent: NodeId,
        name: &'a str,
        setting: IntSetting<'a>,
    ) -> Result<NodeId, TreeError> {
        self.add_child(parent, name, NodeKind::Int(setting))
    }

    pub fn add_choice(
        &mut self,
        parent: NodeId,
        name: &'a str,
        choice: ChoiceSetting<'a>,
    ) -> Result<NodeId, TreeError> {
        self.add_child(parent, name, NodeKind::Choice(choice))
    }

    /// Add an action labelled with its [`Action::default_name`].
    pub fn add_action(&mut self, parent: NodeId, action: Action) -> Result<NodeId, TreeError> {
        self.add_child(parent, action.default_name(), NodeKind::Action(action))
    }

    pub fn add_named_action(
        &mut self,
        parent: NodeId,
        name: &'a str,
        action: Action,
    ) -> Result<NodeId, TreeError> {
        self.add_child(parent, name, NodeKind::Action(action))
    }

    /// Insert a new node directly after `sibling`, under the same parent.
    ///
    /// # Errors
    ///
    /// [`TreeError::RootNode`] if `sibling` is the root, otherwise as
    /// [`add_child`](Self::add_child).
    pub fn insert_after(
        &mut self,
        sibling: NodeId,
        name: &'a str,
        kind: NodeKind<'a>,
    ) -> Result<NodeId, TreeError> {
        let anchor = *self.node(sibling)?;
        let parent = anchor.parent.ok_or(TreeError::RootNode)?;

        let id = self.allocate(Node {
            parent: Some(parent),
            previous: Some(sibling),
            next: anchor.next,
            ..Node::new(name, kind)
        })?;
        if let Some(next) = anchor.next {
            self.node_mut(next)?.previous = Some(id);
        }
        self.node_mut(sibling)?.next = Some(id);
        Ok(id)
    }

    /// Remove `id` and its whole subtree, relinking its neighbours.
    ///
    /// # Errors
    ///
    /// [`TreeError::RootNode`] for the root, [`TreeError::InvalidNode`] for a
    /// stale handle.
    pub fn destroy(&mut self, id: NodeId) -> Result<(), TreeError> {
        let node = *self.node(id)?;
        let parent = node.parent.ok_or(TreeError::RootNode)?;

        while let Some(child) = self.first_child(id) {
            self.destroy(child)?;
        }

        match node.previous {
            Some(previous) => self.node_mut(previous)?.next = node.next,
            None => self.node_mut(parent)?.first_child = node.next,
        }
        if let Some(next) = node.next {
            self.node_mut(next)?.previous = node.previous;
        }

        let slot = &mut self.slots[id.index()];
        slot.node = None;
        slot.generation = slot.generation.wrapping_add(1);
        Ok(())
    }

    fn allocate(&mut self, node: Node<'a>) -> Result<NodeId, TreeError> {
        if let Some(index) = self.slots.iter().position(|slot| slot.node.is_none()) {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            return Ok(NodeId {
                index: index as u16,
                generation: slot.generation,
            });
        }
        let index = self.slots.len();
        if index > u16::MAX as usize {
            return Err(TreeError::Full);
        }
        self.slots
            .push(Slot {
                generation: 0,
                node: Some(node),
            })
            .map_err(|_| TreeError::Full)?;
        Ok(NodeId {
            index: index as u16,
            generation: 0,
        })
    }

    // ── Traversal ────────────────────────────────────────────────────

    pub fn name(&self, id: NodeId) -> Option<&'a str> {
        self.get(id).map(Node::name)
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind<'a>> {
        self.get(id).map(Node::kind)
    }

    /// Right-hand text for `id`; empty for a stale handle.
    pub fn description(&self, id: NodeId) -> Description {
        self.get(id).map(|node| node.kind.description()).unwrap_or_default()
    }

    /// The bounded integer behind an `Int` or `Choice` node.
    pub fn setting(&self, id: NodeId) -> Option<&IntSetting<'a>> {
        self.get(id).and_then(|node| node.kind.setting())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.first_child)
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.first_child(id).and_then(|first| self.tail(first))
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.next)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.previous)
    }

    /// First node of the sibling list containing `id`.
    pub fn head(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.get(id).map(|_| id)?;
        while let Some(previous) = self.previous_sibling(current) {
            current = previous;
        }
        Some(current)
    }

    /// Last node of the sibling list containing `id`.
    pub fn tail(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.get(id).map(|_| id)?;
        while let Some(next) = self.next_sibling(current) {
            current = next;
        }
        Some(current)
    }

    /// Child of `parent` at `position`, or `None` past the end.
    pub fn child(&self, parent: NodeId, position: usize) -> Option<NodeId> {
        self.children(parent).nth(position)
    }

    pub fn count_children(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// Size of the sibling list containing `id`, `id` included. 0 for a stale handle.
    pub fn count_siblings(&self, id: NodeId) -> usize {
        self.head(id).map_or(0, |head| self.siblings_from(head).count())
    }

    /// Index of `id` within its sibling list.
    pub fn position(&self, id: NodeId) -> usize {
        let mut position = 0;
        let mut current = id;
        while let Some(previous) = self.previous_sibling(current) {
            current = previous;
            position += 1;
        }
        position
    }

    /// Direct children of `id`, in order.
    pub fn children(&self, id: NodeId) -> Children<'_, 'a, N> {
        Children {
            tree: self,
            next: self.first_child(id),
        }
    }

    fn siblings_from(&self, first: NodeId) -> Children<'_, 'a, N> {
        Children {
            tree: self,
            next: Some(first),
        }
    }

    /// Reset every setting in the subtree rooted at `id`, calling
    /// `on_change` for each one whose value actually moved.
    pub fn reset_subtree(&self, id: NodeId, on_change: &mut dyn FnMut(NodeId, &IntSetting<'a>)) {
        let Some(node) = self.get(id) else {
            return;
        };
        match node.kind.setting() {
            Some(setting) => {
                if setting.reset() {
                    on_change(id, setting);
                }
            }
            None => {
                for child in self.children(id) {
                    self.reset_subtree(child, on_change);
                }
            }
        }
    }
}

/// Iterator over a sibling list.
pub struct Children<'t, 'a, const N: usize> {
    tree: &'t SettingsTree<'a, N>,
    next: Option<NodeId>,
}

impl<const N: usize> Iterator for Children<'_, '_, N> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.next_sibling(current);
        Some(current)
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────────
