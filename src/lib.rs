//! A lazy, path-addressable JSON document engine.
//!
//! A [`Document`] tokenizes its source once, builds a skeleton element tree
//! that records *where* each container member's value starts without
//! parsing it, and only materializes a subtree the first time a path
//! actually reaches it. `get`/`set` operate on dotted/bracketed paths
//! (`"a.b[0].c"`); `dump` re-serializes the whole document, reusing the
//! original source text for anything that was never touched and
//! regenerating only what `set` changed.

pub mod arena;
pub mod cache;
pub mod document;
pub mod element;
pub mod error;
pub mod materializer;
pub mod parser;
pub mod path;
pub mod position;
pub mod resolver;
pub mod serializer;
pub mod tokenizer;
pub mod value;

pub use document::Document;
pub use element::{ElementId, ElementType, Materialized};
pub use error::{DocumentError, PathSyntaxError, TokenizeError};
pub use tokenizer::tokenize;
pub use value::Value;
