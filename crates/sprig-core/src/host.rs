//! Host-mutation interface
//!
//! The engine never touches the host tree directly. Everything it does to
//! the host goes through this trait: node creation while fibers are being
//! evaluated, and attribute/listener/structure mutations at commit.

use std::fmt::Debug;

use crate::{AttrValue, EventHandler, HostError};

/// What kind of node to create
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind<'a> {
    Element(&'a str),
    Text,
}

/// External mutable tree the engine reconciles into
pub trait HostTree {
    /// Handle to a host node; cloned into every fiber that maps to it
    type Node: Clone + Debug;

    /// Allocate a detached node; text nodes receive their initial content
    fn create_node(&mut self, kind: NodeKind<'_>, text: Option<&str>)
        -> Result<Self::Node, HostError>;

    fn set_attribute(
        &mut self,
        node: &Self::Node,
        name: &str,
        value: &AttrValue,
    ) -> Result<(), HostError>;

    /// Reset a plain attribute to empty
    fn clear_attribute(&mut self, node: &Self::Node, name: &str) -> Result<(), HostError>;

    fn add_listener(
        &mut self,
        node: &Self::Node,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError>;

    fn remove_listener(
        &mut self,
        node: &Self::Node,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError>;

    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;

    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;
}
