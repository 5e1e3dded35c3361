//! docsite-core
//!
//! Document model, markdown parsing, source enumeration and the ordered
//! navigation tree. The full-text engine lives in `docsite-text` behind the
//! `traits::DocumentSearch` seam.

pub mod config;
pub mod error;
pub mod order;
pub mod parser;
pub mod sources;
pub mod traits;
pub mod tree;
pub mod types;

pub use error::{Error, Result};
pub use order::OrderTables;
pub use parser::{parse_file, parse_source};
pub use sources::{SourceFile, SourceTree};
pub use tree::build_tree;
