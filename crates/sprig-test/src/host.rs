//! In-memory host tree
//!
//! Arena-backed implementation of the host-mutation interface with:
//! - A log of every mutation received
//! - Failure injection per operation kind
//! - Markup serialisation and structural snapshots
//! - Event dispatch to installed listeners

use std::collections::BTreeMap;
use std::fmt;

use sprig_core::{
    is_property, AttrValue, ComponentError, Element, ElementType, EventHandler, HostError,
    HostEvent, HostTree, NodeKind, NODE_VALUE,
};

/// Handle to a node in a [`MemoryHost`]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(pub usize);

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostNodeKind {
    Element(String),
    Text(String),
}

#[derive(Clone, Debug)]
pub struct HostNode {
    pub kind: HostNodeKind,
    pub attrs: BTreeMap<String, String>,
    pub listeners: Vec<(String, EventHandler)>,
    pub parent: Option<NodeRef>,
    pub children: Vec<NodeRef>,
}

impl HostNode {
    fn new(kind: HostNodeKind) -> Self {
        HostNode {
            kind,
            attrs: BTreeMap::new(),
            listeners: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Kind of host operation, for failure injection and log filtering
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostOpKind {
    Create,
    SetAttribute,
    ClearAttribute,
    AddListener,
    RemoveListener,
    AppendChild,
    RemoveChild,
}

/// One logged host mutation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostOp {
    Create { node: NodeRef, kind: HostNodeKind },
    SetAttribute { node: NodeRef, name: String, value: String },
    ClearAttribute { node: NodeRef, name: String },
    AddListener { node: NodeRef, event: String },
    RemoveListener { node: NodeRef, event: String },
    AppendChild { parent: NodeRef, child: NodeRef },
    RemoveChild { parent: NodeRef, child: NodeRef },
}

impl HostOp {
    pub fn kind(&self) -> HostOpKind {
        match self {
            HostOp::Create { .. } => HostOpKind::Create,
            HostOp::SetAttribute { .. } => HostOpKind::SetAttribute,
            HostOp::ClearAttribute { .. } => HostOpKind::ClearAttribute,
            HostOp::AddListener { .. } => HostOpKind::AddListener,
            HostOp::RemoveListener { .. } => HostOpKind::RemoveListener,
            HostOp::AppendChild { .. } => HostOpKind::AppendChild,
            HostOp::RemoveChild { .. } => HostOpKind::RemoveChild,
        }
    }

    /// Does this op change the shape of the tree (create/insert/remove)?
    pub fn is_structural(&self) -> bool {
        matches!(
            self.kind(),
            HostOpKind::Create | HostOpKind::AppendChild | HostOpKind::RemoveChild
        )
    }
}

/// Structural view of a host subtree, comparable against element trees
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum HostSnapshot {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        listeners: Vec<String>,
        children: Vec<HostSnapshot>,
    },
    Text(String),
}

impl HostSnapshot {
    /// Project an element tree onto the host shape it should produce
    ///
    /// Components are expanded by calling them, so the result is what a
    /// fully committed render of `element` looks like.
    pub fn project(element: &Element) -> Result<Vec<HostSnapshot>, ComponentError> {
        match element.ty() {
            ElementType::Text => Ok(vec![HostSnapshot::Text(
                element.attrs().get(NODE_VALUE).map(AttrValue::to_host_string).unwrap_or_default(),
            )]),
            ElementType::Component(component) => {
                let mut out = Vec::new();
                for child in component.render(element.props())? {
                    out.extend(HostSnapshot::project(&child)?);
                }
                Ok(out)
            }
            ElementType::Host(tag) => {
                let attrs = element
                    .attrs()
                    .iter()
                    .filter(|(name, _)| is_property(name))
                    .map(|(name, value)| (name.clone(), value.to_host_string()))
                    .collect();
                let mut listeners: Vec<String> = element
                    .attrs()
                    .iter()
                    .filter(|(_, value)| value.is_handler())
                    .filter_map(|(name, _)| sprig_core::event_name(name))
                    .collect();
                listeners.sort();
                let mut children = Vec::new();
                for child in element.children() {
                    children.extend(HostSnapshot::project(child)?);
                }
                Ok(vec![HostSnapshot::Element {
                    tag: tag.clone(),
                    attrs,
                    listeners,
                    children,
                }])
            }
        }
    }

    /// Same tree with every child list sorted; equal canonical forms mean
    /// equal content regardless of sibling order
    pub fn canonical(&self) -> HostSnapshot {
        match self {
            HostSnapshot::Text(t) => HostSnapshot::Text(t.clone()),
            HostSnapshot::Element {
                tag,
                attrs,
                listeners,
                children,
            } => {
                let mut children: Vec<_> = children.iter().map(|c| c.canonical()).collect();
                children.sort();
                HostSnapshot::Element {
                    tag: tag.clone(),
                    attrs: attrs.clone(),
                    listeners: listeners.clone(),
                    children,
                }
            }
        }
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        match self {
            HostSnapshot::Text(t) => out.push_str(t),
            HostSnapshot::Element {
                tag,
                attrs,
                children,
                ..
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push_str(&format!(" {name}=\"{value}\""));
                }
                out.push('>');
                for child in children {
                    child.write_markup(out);
                }
                out.push_str(&format!("</{tag}>"));
            }
        }
    }
}

/// Markup of a list of sibling snapshots
pub fn markup_of(nodes: &[HostSnapshot]) -> String {
    nodes.iter().map(HostSnapshot::to_markup).collect()
}

/// In-memory host tree
#[derive(Debug)]
pub struct MemoryHost {
    nodes: Vec<HostNode>,
    log: Vec<HostOp>,
    fail_on: Option<HostOpKind>,
}

impl MemoryHost {
    /// Host with a single `root` container at [`MemoryHost::container`]
    pub fn new() -> Self {
        MemoryHost {
            nodes: vec![HostNode::new(HostNodeKind::Element("root".into()))],
            log: Vec::new(),
            fail_on: None,
        }
    }

    pub fn container(&self) -> NodeRef {
        NodeRef(0)
    }

    /// Add another detached container, outside the mutation log
    pub fn create_container(&mut self, tag: &str) -> NodeRef {
        self.nodes.push(HostNode::new(HostNodeKind::Element(tag.into())));
        NodeRef(self.nodes.len() - 1)
    }

    /// Make every subsequent operation of `kind` fail
    pub fn fail_on(&mut self, kind: HostOpKind) {
        self.fail_on = Some(kind);
    }

    pub fn clear_failure(&mut self) {
        self.fail_on = None;
    }

    pub fn log(&self) -> &[HostOp] {
        &self.log
    }

    /// Drain the mutation log
    pub fn take_log(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.log)
    }

    pub fn count(&self, kind: HostOpKind) -> usize {
        self.log.iter().filter(|op| op.kind() == kind).count()
    }

    pub fn node(&self, node: NodeRef) -> Option<&HostNode> {
        self.nodes.get(node.0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn children(&self, node: NodeRef) -> &[NodeRef] {
        self.node(node).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    pub fn attribute(&self, node: NodeRef, name: &str) -> Option<&str> {
        self.node(node)?.attrs.get(name).map(String::as_str)
    }

    pub fn text(&self, node: NodeRef) -> Option<&str> {
        match &self.node(node)?.kind {
            HostNodeKind::Text(t) => Some(t),
            HostNodeKind::Element(_) => None,
        }
    }

    pub fn snapshot(&self, node: NodeRef) -> Option<HostSnapshot> {
        let n = self.node(node)?;
        Some(match &n.kind {
            HostNodeKind::Text(t) => HostSnapshot::Text(t.clone()),
            HostNodeKind::Element(tag) => {
                let mut listeners: Vec<String> =
                    n.listeners.iter().map(|(event, _)| event.clone()).collect();
                listeners.sort();
                HostSnapshot::Element {
                    tag: tag.clone(),
                    attrs: n.attrs.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
                    listeners,
                    children: self.child_snapshots(node),
                }
            }
        })
    }

    pub fn child_snapshots(&self, node: NodeRef) -> Vec<HostSnapshot> {
        self.children(node)
            .iter()
            .filter_map(|c| self.snapshot(*c))
            .collect()
    }

    /// Serialise a subtree, e.g. `<div id="x"><h1>Hello</h1></div>`
    pub fn to_markup(&self, node: NodeRef) -> String {
        self.snapshot(node).map(|s| s.to_markup()).unwrap_or_default()
    }

    /// Serialise a node's children only
    pub fn inner_markup(&self, node: NodeRef) -> String {
        markup_of(&self.child_snapshots(node))
    }

    /// Run the listeners installed for `event` on `node`
    ///
    /// Returns the number of listeners called.
    pub fn dispatch(&self, node: NodeRef, event: &HostEvent) -> usize {
        let Some(n) = self.node(node) else {
            return 0;
        };
        let mut called = 0;
        for (name, handler) in &n.listeners {
            if *name == event.name {
                handler.call(event);
                called += 1;
            }
        }
        called
    }

    fn check(&self, kind: HostOpKind, operation: &'static str) -> Result<(), HostError> {
        if self.fail_on == Some(kind) {
            return Err(HostError::new(operation, "failure injected"));
        }
        Ok(())
    }

    fn get_mut(
        &mut self,
        node: NodeRef,
        operation: &'static str,
    ) -> Result<&mut HostNode, HostError> {
        self.nodes
            .get_mut(node.0)
            .ok_or_else(|| HostError::new(operation, format!("unknown node {node:?}")))
    }

    fn detach(&mut self, child: NodeRef) {
        let parent = self.nodes.get(child.0).and_then(|n| n.parent);
        if let Some(parent) = parent {
            if let Some(p) = self.nodes.get_mut(parent.0) {
                p.children.retain(|c| *c != child);
            }
        }
        if let Some(c) = self.nodes.get_mut(child.0) {
            c.parent = None;
        }
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostTree for MemoryHost {
    type Node = NodeRef;

    fn create_node(
        &mut self,
        kind: NodeKind<'_>,
        text: Option<&str>,
    ) -> Result<NodeRef, HostError> {
        self.check(HostOpKind::Create, "create_node")?;
        let kind = match kind {
            NodeKind::Element(tag) => HostNodeKind::Element(tag.to_string()),
            NodeKind::Text => HostNodeKind::Text(text.unwrap_or_default().to_string()),
        };
        self.nodes.push(HostNode::new(kind.clone()));
        let node = NodeRef(self.nodes.len() - 1);
        self.log.push(HostOp::Create { node, kind });
        Ok(node)
    }

    fn set_attribute(
        &mut self,
        node: &NodeRef,
        name: &str,
        value: &AttrValue,
    ) -> Result<(), HostError> {
        self.check(HostOpKind::SetAttribute, "set_attribute")?;
        let value = value.to_host_string();
        let n = self.get_mut(*node, "set_attribute")?;
        match &mut n.kind {
            HostNodeKind::Text(t) if name == NODE_VALUE => *t = value.clone(),
            _ => {
                n.attrs.insert(name.to_string(), value.clone());
            }
        }
        self.log.push(HostOp::SetAttribute {
            node: *node,
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    fn clear_attribute(&mut self, node: &NodeRef, name: &str) -> Result<(), HostError> {
        self.check(HostOpKind::ClearAttribute, "clear_attribute")?;
        let n = self.get_mut(*node, "clear_attribute")?;
        match &mut n.kind {
            HostNodeKind::Text(t) if name == NODE_VALUE => t.clear(),
            _ => {
                n.attrs.remove(name);
            }
        }
        self.log.push(HostOp::ClearAttribute {
            node: *node,
            name: name.to_string(),
        });
        Ok(())
    }

    fn add_listener(
        &mut self,
        node: &NodeRef,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        self.check(HostOpKind::AddListener, "add_listener")?;
        let n = self.get_mut(*node, "add_listener")?;
        n.listeners.push((event.to_string(), handler.clone()));
        self.log.push(HostOp::AddListener {
            node: *node,
            event: event.to_string(),
        });
        Ok(())
    }

    fn remove_listener(
        &mut self,
        node: &NodeRef,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        self.check(HostOpKind::RemoveListener, "remove_listener")?;
        let n = self.get_mut(*node, "remove_listener")?;
        // Unknown listeners are ignored, like a DOM removeEventListener
        if let Some(pos) = n
            .listeners
            .iter()
            .position(|(name, h)| name == event && h.ptr_eq(handler))
        {
            n.listeners.remove(pos);
        }
        self.log.push(HostOp::RemoveListener {
            node: *node,
            event: event.to_string(),
        });
        Ok(())
    }

    fn append_child(&mut self, parent: &NodeRef, child: &NodeRef) -> Result<(), HostError> {
        self.check(HostOpKind::AppendChild, "append_child")?;
        if parent == child {
            return Err(HostError::new("append_child", "node appended to itself"));
        }
        if let HostNodeKind::Text(_) = self.get_mut(*parent, "append_child")?.kind {
            return Err(HostError::new("append_child", "text nodes have no children"));
        }
        self.get_mut(*child, "append_child")?;

        // Appending an attached node moves it
        self.detach(*child);
        self.get_mut(*parent, "append_child")?.children.push(*child);
        self.get_mut(*child, "append_child")?.parent = Some(*parent);
        self.log.push(HostOp::AppendChild {
            parent: *parent,
            child: *child,
        });
        Ok(())
    }

    fn remove_child(&mut self, parent: &NodeRef, child: &NodeRef) -> Result<(), HostError> {
        self.check(HostOpKind::RemoveChild, "remove_child")?;
        let p = self.get_mut(*parent, "remove_child")?;
        let pos = p.children.iter().position(|c| c == child).ok_or_else(|| {
            HostError::new("remove_child", format!("{child:?} is not a child of {parent:?}"))
        })?;
        p.children.remove(pos);
        self.get_mut(*child, "remove_child")?.parent = None;
        self.log.push(HostOp::RemoveChild {
            parent: *parent,
            child: *child,
        });
        Ok(())
    }
}
