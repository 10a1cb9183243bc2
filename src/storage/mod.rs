//! Text-native storage layer.
//!
//! Records are plain markdown files with a `---` header block; there is no
//! index and no database. Every mutation is a whole-file rewrite.
//!
//! # Submodules
//!
//! - [`frontmatter`] - Header block codec
//! - [`sections`] - Scoped edits of named body sections
//! - [`template`] - Content of a freshly opened record
//! - [`file`] - Atomic writes and directory scans
//! - [`store`] - Record operations (open, get, update, close, attempt, link)
//! - [`query`] - Read-only list, search and stats
//! - [`memory`] - Namespaced key-value store

pub mod file;
pub mod frontmatter;
pub mod memory;
pub mod query;
pub mod sections;
pub mod store;
pub mod template;

pub use frontmatter::{FieldValue, Frontmatter};
pub use memory::{MemoryStore, Namespace};
pub use query::{Listing, Skipped, Stats};
pub use store::{
    Attempted, BugRecord, BugStore, Closed, Linked, Opened, UpdateFields, Updated,
};
