//! Bistro UI Library
//!
//! Interactive behaviour of a restaurant landing page, modelled as native
//! state machines over a headless document: navigation overlay with
//! accordion submenus, reservation dialog with validation and prefill,
//! sticky bottom bar and header, custom selects and a testimonial carousel.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod dom;
pub mod ui;
