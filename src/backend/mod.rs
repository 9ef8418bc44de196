//! Built-in carrier backends.
//!
//! The core is format-agnostic; these two [`DynamicOps`] implementations
//! cover the common cases and exercise the plug-in contract, including
//! cross-backend conversion:
//!
//! - [`json::JsonOps`] over [`serde_json::Value`].
//! - [`node::NodeOps`] over the crate's own ordered tree, [`node::Node`].
//!
//! [`DynamicOps`]: crate::ops::DynamicOps

pub mod json;
pub mod node;

pub use self::{
    json::JsonOps,
    node::{
        Node,
        NodeOps,
    },
};
