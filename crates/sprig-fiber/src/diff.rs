//! Attribute diff
//!
//! Computes the host mutations turning one attribute map into another.
//! Operations come out in a fixed order: stale listeners are removed,
//! vanished attributes cleared, changed attributes set, new listeners
//! installed.

use sprig_core::{
    event_name, is_event, is_property, AttrValue, Attributes, EventHandler, HostError, HostTree,
};

/// One host mutation produced by the diff
#[derive(Clone, Debug, PartialEq)]
pub enum AttrOp<'a> {
    RemoveListener {
        event: String,
        handler: &'a EventHandler,
    },
    ClearAttribute {
        name: &'a str,
    },
    SetAttribute {
        name: &'a str,
        value: &'a AttrValue,
    },
    AddListener {
        event: String,
        handler: &'a EventHandler,
    },
}

fn handlers(attrs: &Attributes) -> impl Iterator<Item = (&str, &EventHandler)> {
    attrs
        .iter()
        .filter(|(name, _)| is_event(name))
        .filter_map(|(name, value)| value.as_handler().map(|h| (name.as_str(), h)))
}

fn properties(attrs: &Attributes) -> impl Iterator<Item = (&str, &AttrValue)> {
    attrs
        .iter()
        .filter(|(name, _)| is_property(name))
        .map(|(name, value)| (name.as_str(), value))
}

/// Diff two attribute maps for one node
pub fn diff_attributes<'a>(old: &'a Attributes, new: &'a Attributes) -> Vec<AttrOp<'a>> {
    let mut ops = Vec::new();

    // Listeners that vanished or changed identity
    for (name, handler) in handlers(old) {
        let keep = new.get(name).and_then(|v| v.as_handler()) == Some(handler);
        if !keep {
            if let Some(event) = event_name(name) {
                ops.push(AttrOp::RemoveListener { event, handler });
            }
        }
    }

    // Plain attributes gone from the new map
    for (name, _) in properties(old) {
        if !new.contains_key(name) {
            ops.push(AttrOp::ClearAttribute { name });
        }
    }

    // Plain attributes new or changed
    for (name, value) in properties(new) {
        if old.get(name) != Some(value) {
            ops.push(AttrOp::SetAttribute { name, value });
        }
    }

    // Listeners new or changed
    for (name, handler) in handlers(new) {
        let unchanged = old.get(name).and_then(|v| v.as_handler()) == Some(handler);
        if !unchanged {
            if let Some(event) = event_name(name) {
                ops.push(AttrOp::AddListener { event, handler });
            }
        }
    }

    ops
}

/// Apply a list of attribute operations to one host node
pub fn apply_ops<H: HostTree>(
    host: &mut H,
    node: &H::Node,
    ops: &[AttrOp<'_>],
) -> Result<usize, HostError> {
    for op in ops {
        match op {
            AttrOp::RemoveListener { event, handler } => {
                host.remove_listener(node, event, handler)?
            }
            AttrOp::ClearAttribute { name } => host.clear_attribute(node, name)?,
            AttrOp::SetAttribute { name, value } => host.set_attribute(node, name, value)?,
            AttrOp::AddListener { event, handler } => host.add_listener(node, event, handler)?,
        }
    }
    Ok(ops.len())
}

/// Diff and apply in one go; returns the number of host mutations
pub fn apply_attribute_diff<H: HostTree>(
    host: &mut H,
    node: &H::Node,
    old: &Attributes,
    new: &Attributes,
) -> Result<usize, HostError> {
    let ops = diff_attributes(old, new);
    apply_ops(host, node, &ops)
}
