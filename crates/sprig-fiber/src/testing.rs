//! Minimal recording host for unit tests

use std::collections::BTreeMap;

use sprig_core::{AttrValue, EventHandler, HostError, HostTree, NodeKind};

/// Host whose nodes are integers and whose mutations are logged as strings
#[derive(Debug, Default)]
pub struct LogHost {
    next: u32,
    pub log: Vec<String>,
    pub children: BTreeMap<u32, Vec<u32>>,
    pub fail_on: Option<&'static str>,
}

impl LogHost {
    pub fn new() -> Self {
        // Node zero is the container
        LogHost {
            next: 1,
            ..Default::default()
        }
    }

    fn check(&self, op: &'static str) -> Result<(), HostError> {
        match self.fail_on {
            Some(f) if f == op => Err(HostError::new(op, "injected")),
            _ => Ok(()),
        }
    }

    pub fn kids(&self, node: u32) -> Vec<u32> {
        self.children.get(&node).cloned().unwrap_or_default()
    }
}

impl HostTree for LogHost {
    type Node = u32;

    fn create_node(&mut self, kind: NodeKind<'_>, text: Option<&str>) -> Result<u32, HostError> {
        self.check("create_node")?;
        let id = self.next;
        self.next += 1;
        match kind {
            NodeKind::Element(tag) => self.log.push(format!("create {id} <{tag}>")),
            NodeKind::Text => self.log.push(format!("create {id} {:?}", text.unwrap_or(""))),
        }
        Ok(id)
    }

    fn set_attribute(
        &mut self,
        node: &u32,
        name: &str,
        value: &AttrValue,
    ) -> Result<(), HostError> {
        self.check("set_attribute")?;
        self.log.push(format!("set {node} {name}={}", value.to_host_string()));
        Ok(())
    }

    fn clear_attribute(&mut self, node: &u32, name: &str) -> Result<(), HostError> {
        self.check("clear_attribute")?;
        self.log.push(format!("clear {node} {name}"));
        Ok(())
    }

    fn add_listener(&mut self, node: &u32, event: &str, _: &EventHandler) -> Result<(), HostError> {
        self.log.push(format!("listen {node} {event}"));
        Ok(())
    }

    fn remove_listener(
        &mut self,
        node: &u32,
        event: &str,
        _: &EventHandler,
    ) -> Result<(), HostError> {
        self.log.push(format!("unlisten {node} {event}"));
        Ok(())
    }

    fn append_child(&mut self, parent: &u32, child: &u32) -> Result<(), HostError> {
        self.check("append_child")?;
        self.log.push(format!("append {parent} {child}"));
        self.children.entry(*parent).or_default().push(*child);
        Ok(())
    }

    fn remove_child(&mut self, parent: &u32, child: &u32) -> Result<(), HostError> {
        self.check("remove_child")?;
        self.log.push(format!("remove {parent} {child}"));
        let kids = self.children.entry(*parent).or_default();
        match kids.iter().position(|c| c == child) {
            Some(pos) => {
                kids.remove(pos);
                Ok(())
            }
            None => Err(HostError::new(
                "remove_child",
                format!("{child} is not a child of {parent}"),
            )),
        }
    }
}
