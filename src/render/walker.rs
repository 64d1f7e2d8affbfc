//! Table-driven tree walker.
//!
//! A [`Profile`] pairs a node table (kind → handler) with a mark table
//! (kind → text transform). The [`Renderer`] walks a node sequence,
//! dispatching each container to its handler and folding each text leaf
//! through its marks. Handlers render their children by calling
//! [`Renderer::next`], which reuses the same profile and context.
//!
//! The context type `C` is per-render state owned by the [`Renderer`]. A
//! fresh context is created for every top-level call, so a profile can be
//! shared between threads while each render keeps its own state.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{Element, MarkType, Node, NodeType, Text};

/// Renders one container node. Children are rendered through the renderer.
pub type NodeRenderer<C> = Arc<dyn Fn(&Element, &mut Renderer<'_, C>) -> String + Send + Sync>;

/// Transforms the already-rendered text of a marked leaf.
pub type MarkRenderer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Node kind → handler.
pub struct NodeTable<C> {
    handlers: HashMap<NodeType, NodeRenderer<C>>,
}

impl<C> NodeTable<C> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Install a handler, replacing any previous one for this kind.
    pub fn insert<F>(&mut self, kind: NodeType, handler: F)
    where
        F: Fn(&Element, &mut Renderer<'_, C>) -> String + Send + Sync + 'static,
    {
        self.handlers.insert(kind, Arc::new(handler));
    }

    /// Handler for a kind.
    pub fn get(&self, kind: &NodeType) -> Option<&NodeRenderer<C>> {
        self.handlers.get(kind)
    }

    pub fn contains(&self, kind: &NodeType) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Merge `overrides` into this table. Entries in `overrides` win.
    pub fn merge(&mut self, overrides: NodeTable<C>) {
        self.handlers.extend(overrides.handlers);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<C> Default for NodeTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for NodeTable<C> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

/// Mark kind → text transform.
#[derive(Clone, Default)]
pub struct MarkTable {
    renderers: HashMap<MarkType, MarkRenderer>,
}

impl MarkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a mark renderer, replacing any previous one for this kind.
    pub fn insert<F>(&mut self, kind: MarkType, renderer: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.renderers.insert(kind, Arc::new(renderer));
    }

    pub fn get(&self, kind: &MarkType) -> Option<&MarkRenderer> {
        self.renderers.get(kind)
    }

    /// Merge `overrides` into this table. Entries in `overrides` win.
    pub fn merge(&mut self, overrides: MarkTable) {
        self.renderers.extend(overrides.renderers);
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

/// A complete output dialect: node table plus mark table.
pub struct Profile<C> {
    pub nodes: NodeTable<C>,
    pub marks: MarkTable,
}

impl<C> Profile<C> {
    /// Create a profile from its two tables.
    pub fn new(nodes: NodeTable<C>, marks: MarkTable) -> Self {
        Self { nodes, marks }
    }

    /// Create a profile with no handlers; everything renders empty except
    /// unmarked text.
    pub fn empty() -> Self {
        Self::new(NodeTable::new(), MarkTable::new())
    }

    /// Override the handler for one node kind.
    pub fn with_node<F>(mut self, kind: NodeType, handler: F) -> Self
    where
        F: Fn(&Element, &mut Renderer<'_, C>) -> String + Send + Sync + 'static,
    {
        self.nodes.insert(kind, handler);
        self
    }

    /// Override the renderer for one mark kind.
    pub fn with_mark<F>(mut self, kind: MarkType, renderer: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.marks.insert(kind, renderer);
        self
    }

    /// Merge a partial profile over this one, per kind, override wins.
    pub fn merge(mut self, overrides: Profile<C>) -> Self {
        self.nodes.merge(overrides.nodes);
        self.marks.merge(overrides.marks);
        self
    }

    /// Render a node sequence with a fresh context.
    pub fn render(&self, nodes: &[Node], context: C) -> String {
        Renderer::new(self, context).next(nodes)
    }

    /// Render a single root node with a fresh context.
    pub fn render_node(&self, node: &Node, context: C) -> String {
        self.render(std::slice::from_ref(node), context)
    }
}

impl<C> Clone for Profile<C> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            marks: self.marks.clone(),
        }
    }
}

/// One in-flight render: the active profile and its call-scoped context.
pub struct Renderer<'p, C> {
    profile: &'p Profile<C>,
    /// Mutable state shared by handlers during this render only
    pub context: C,
}

impl<'p, C> Renderer<'p, C> {
    pub fn new(profile: &'p Profile<C>, context: C) -> Self {
        Self { profile, context }
    }

    /// Render a child sequence and concatenate the results in order.
    pub fn next(&mut self, nodes: &[Node]) -> String {
        let mut output = String::new();
        for node in nodes {
            output.push_str(&self.render_node(node));
        }
        output
    }

    /// Render one node. Kinds without a handler render to nothing.
    pub fn render_node(&mut self, node: &Node) -> String {
        match node {
            Node::Text(text) => self.render_text(text),
            Node::Element(element) => {
                let profile = self.profile;
                match profile.nodes.get(&element.node_type) {
                    Some(handler) => handler(element, self),
                    None => String::new(),
                }
            }
        }
    }

    /// Fold a text value through its marks, in order. Marks without a
    /// renderer pass the text through.
    pub fn render_text(&self, text: &Text) -> String {
        text.marks
            .iter()
            .fold(text.value.clone(), |value, mark| {
                match self.profile.marks.get(&mark.mark_type) {
                    Some(renderer) => renderer(&value),
                    None => value,
                }
            })
    }

    /// The profile driving this render.
    pub fn profile(&self) -> &'p Profile<C> {
        self.profile
    }

    /// Finish the render and hand back the context.
    pub fn into_context(self) -> C {
        self.context
    }
}
