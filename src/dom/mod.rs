//! Headless document model.
//!
//! The controllers in [`crate::ui`] never talk to a browser directly. They
//! read and write this small element tree (attributes, classes, focus,
//! scroll position) and schedule their deferred work on a virtual clock,
//! so every state machine can be driven and inspected natively.

pub mod document;
pub mod event;
pub mod scheduler;
pub mod selector;

pub use document::{Document, Element, Height, ScrollBlock, ScrollRequest, Style, Viewport};
pub use event::{Key, KeyEvent};
pub use indextree::NodeId;
pub use scheduler::{Scheduler, TimerId};
pub use selector::Selector;
