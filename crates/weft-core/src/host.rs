//! The render-target seam: node creation and mutation primitives.
//!
//! [`HostTree`] is the only way the engine touches the output tree. Nodes
//! are created during the complete phase and attached plus decorated during
//! commit; nothing in the engine removes or re-parents a node it has
//! already attached.

use std::fmt;

use indexmap::IndexMap;

use crate::collections::map::HashMap;
use crate::element::EventHandler;

/// Handle into the host's own tree structure.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    MissingNode { id: NodeId },
    InvalidTag { tag: String },
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::MissingNode { id } => write!(f, "host node {id} missing"),
            HostError::InvalidTag { tag } => write!(f, "invalid host tag {tag:?}"),
        }
    }
}

impl std::error::Error for HostError {}

/// Primitives a render target exposes to the engine.
pub trait HostTree {
    /// Creates a detached node for `tag` and returns its handle.
    fn create_node(&mut self, tag: &str) -> Result<NodeId, HostError>;

    /// Appends `child` as the last child of `parent`.
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError>;

    /// Replaces the node's text content.
    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), HostError>;

    /// Sets a named attribute on the node.
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), HostError>;

    /// Registers `handler` for `event` on the node.
    fn add_listener(
        &mut self,
        node: NodeId,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), HostError>;

    /// Sets one css-style property on the node.
    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), HostError>;
}

/// One node of the in-memory host tree.
#[derive(Default)]
pub struct MemoryNode {
    tag: String,
    attributes: IndexMap<String, String>,
    styles: IndexMap<String, String>,
    text: Option<String>,
    listeners: HashMap<String, Vec<EventHandler>>,
    children: Vec<NodeId>,
}

impl MemoryNode {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Number of handlers registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map_or(0, Vec::len)
    }
}

impl fmt::Debug for MemoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryNode")
            .field("tag", &self.tag)
            .field("attributes", &self.attributes)
            .field("styles", &self.styles)
            .field("text", &self.text)
            .field("children", &self.children)
            .finish()
    }
}

/// In-memory [`HostTree`] used by tests, benches and the demo binary.
#[derive(Default)]
pub struct MemoryHost {
    nodes: Vec<MemoryNode>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: NodeId) -> Option<&MemoryNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut MemoryNode, HostError> {
        self.nodes.get_mut(id).ok_or(HostError::MissingNode { id })
    }

    /// Invokes every handler registered for `event` on `node`.
    pub fn fire(&self, node: NodeId, event: &str) -> Result<(), HostError> {
        let node = self.node(node).ok_or(HostError::MissingNode { id: node })?;
        let handlers: Vec<EventHandler> = node
            .listeners
            .get(event)
            .map(|handlers| handlers.to_vec())
            .unwrap_or_default();
        for handler in handlers {
            handler();
        }
        Ok(())
    }

    /// Renders an indented snapshot of the subtree under `root`.
    pub fn dump_tree(&self, root: Option<NodeId>) -> String {
        let mut output = String::new();
        if let Some(root_id) = root {
            self.dump_node(&mut output, root_id, 0);
        } else {
            output.push_str("(no root)\n");
        }
        output
    }

    fn dump_node(&self, output: &mut String, id: NodeId, depth: usize) {
        let indent = "  ".repeat(depth);
        if let Some(node) = self.nodes.get(id) {
            output.push_str(&format!("{}[{}] <{}>", indent, id, node.tag));
            for (name, value) in &node.attributes {
                output.push_str(&format!(" {name}={value}"));
            }
            if let Some(text) = &node.text {
                output.push_str(&format!(" {text:?}"));
            }
            output.push('\n');
            for child_id in &node.children {
                self.dump_node(output, *child_id, depth + 1);
            }
        } else {
            output.push_str(&format!("{}[{}] (missing)\n", indent, id));
        }
    }
}

fn valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl HostTree for MemoryHost {
    fn create_node(&mut self, tag: &str) -> Result<NodeId, HostError> {
        if !valid_tag(tag) {
            return Err(HostError::InvalidTag {
                tag: tag.to_owned(),
            });
        }
        let id = self.nodes.len();
        self.nodes.push(MemoryNode {
            tag: tag.to_owned(),
            ..MemoryNode::default()
        });
        Ok(id)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        if child >= self.nodes.len() {
            return Err(HostError::MissingNode { id: child });
        }
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), HostError> {
        self.node_mut(node)?.text = Some(text.to_owned());
        Ok(())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), HostError> {
        self.node_mut(node)?
            .attributes
            .insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    fn add_listener(
        &mut self,
        node: NodeId,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), HostError> {
        self.node_mut(node)?
            .listeners
            .entry(event.to_owned())
            .or_default()
            .push(handler);
        Ok(())
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), HostError> {
        self.node_mut(node)?
            .styles
            .insert(property.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn creates_and_links_nodes() {
        let mut host = MemoryHost::new();
        let root = host.create_node("root").expect("root");
        let child = host.create_node("div").expect("child");
        host.append_child(root, child).expect("append");
        assert_eq!(host.node(root).unwrap().children(), &[child]);
        assert_eq!(host.node(child).unwrap().tag(), "div");
    }

    #[test]
    fn rejects_invalid_tags() {
        let mut host = MemoryHost::new();
        let err = host.create_node("").unwrap_err();
        assert!(matches!(err, HostError::InvalidTag { .. }));
        let err = host.create_node("no spaces").unwrap_err();
        assert!(matches!(err, HostError::InvalidTag { .. }));
    }

    #[test]
    fn missing_nodes_surface_as_errors() {
        let mut host = MemoryHost::new();
        let err = host.set_text_content(7, "x").unwrap_err();
        assert_eq!(err, HostError::MissingNode { id: 7 });
        let root = host.create_node("root").unwrap();
        let err = host.append_child(root, 9).unwrap_err();
        assert_eq!(err, HostError::MissingNode { id: 9 });
    }

    #[test]
    fn fires_registered_listeners() {
        let mut host = MemoryHost::new();
        let node = host.create_node("button").unwrap();
        let hits = Rc::new(Cell::new(0));
        let hits_in_handler = hits.clone();
        host.add_listener(node, "click", Rc::new(move || {
            hits_in_handler.set(hits_in_handler.get() + 1);
        }))
        .unwrap();
        host.fire(node, "click").unwrap();
        host.fire(node, "click").unwrap();
        assert_eq!(hits.get(), 2);
        assert_eq!(host.node(node).unwrap().listener_count("click"), 1);
        assert_eq!(host.node(node).unwrap().listener_count("keydown"), 0);
    }

    #[test]
    fn dump_tree_renders_nested_structure() {
        let mut host = MemoryHost::new();
        let root = host.create_node("root").unwrap();
        let div = host.create_node("div").unwrap();
        host.set_attribute(div, "id", "a").unwrap();
        host.append_child(root, div).unwrap();
        let span = host.create_node("span").unwrap();
        host.set_text_content(span, "hi").unwrap();
        host.append_child(div, span).unwrap();

        let dump = host.dump_tree(Some(root));
        assert!(dump.contains("<root>"));
        assert!(dump.contains("  [1] <div> id=a"));
        assert!(dump.contains("    [2] <span> \"hi\""));
    }
}
