//! Sprig Core - Fundamental types and primitives
//!
//! This crate defines the core types used throughout sprig:
//! - Identifiers (FiberId, Generation)
//! - Element descriptors and the element builder
//! - Attribute values, event handlers and function components
//! - Effect tags
//! - The host-mutation interface
//! - Error types

pub mod attr;
pub mod component;
pub mod effect;
pub mod element;
pub mod error;
pub mod host;
pub mod id;

pub use attr::*;
pub use component::*;
pub use effect::*;
pub use element::*;
pub use error::*;
pub use host::*;
pub use id::*;
