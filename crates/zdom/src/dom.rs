//! Arena-backed XML document model
//!
//! Every entity lives in a [`Document`] arena and is addressed by a
//! [`NodeId`]. Elements own their children; the parent link is a
//! back-reference used for navigation and for validating moves.

pub mod document;
pub mod element;
pub mod name;
pub mod node;
pub mod render;
pub mod save;

pub use document::Document;
pub use name::{clean_name, is_valid_name};
pub use node::{ContentMode, ElementData, NodeData, NodeId, NodeKind};
pub use render::{Subtree, DECLARATION, MAX_SERIALIZE_DEPTH};
pub use save::{FileTarget, Target, DEFAULT_EXTENSION};
