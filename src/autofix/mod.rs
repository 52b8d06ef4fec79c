//! Iterative auto-fix: issues become tasks, tasks become patches, patches
//! produce a new article that is scored again.

pub mod builder;
pub mod engine;
pub mod patch;
pub mod resolver;

pub use builder::FixTaskBuilder;
pub use engine::AutoFixEngine;
pub use patch::{PatchApplier, PatchError};
pub use resolver::{FixResolver, ResolveError};
