//! Authors and books REST API.
//!
//! Modules plug into the bookapi kernel; `Application` wires them to the
//! database, cache and HTTP stack.

pub mod bootstrap;
pub mod fixtures;
pub mod modules;
pub mod validation;

pub use bootstrap::Application;
