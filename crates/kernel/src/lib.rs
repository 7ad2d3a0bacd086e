//! Core traits, settings and module registry for bookapi.

pub mod context;
pub mod module;
pub mod registry;
pub mod settings;

pub use context::AppContext;
pub use module::{InitCtx, Migration, Module};
pub use registry::ModuleRegistry;
