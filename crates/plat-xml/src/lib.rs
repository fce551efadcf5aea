//! Streaming XML input for plat.
//!
//! Documents are parsed on a background pipeline:
//!
//! ```text
//!  byte source ──chunks──▶ StreamingParser ──buffers──▶ caller
//!  (producer thread)        (parser thread)          (Reader::read)
//! ```
//!
//! The producer thread pulls fixed-size chunks from any [`std::io::Read`]
//! source; the parser thread tokenizes them incrementally and writes
//! entities into arena [`Buffer`](plat_arena::Buffer)s, handing each
//! one over once it crosses a size or entity-count threshold. Both
//! channel directions end with an empty-payload marker, so an empty
//! chunk means end of input and an empty buffer means end of output.
//!
//! Root element metadata is published exactly once through a
//! [`HeaderCell`], before the first buffer. A parse failure fulfills
//! the cell with the error instead, so a consumer waiting on either
//! the header or the buffer stream always learns the outcome.
//!
//! [`Reader`] packages the whole pipeline behind a blocking pull
//! interface and is the usual entry point.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod config;
pub mod error;
pub mod header;
pub mod parser;
pub mod reader;

mod tokenizer;

// Public re-exports for the primary API surface.
pub use cell::HeaderCell;
pub use config::{ParserConfig, ReaderConfig};
pub use error::{ParseError, ReadError};
pub use header::Header;
pub use parser::StreamingParser;
pub use reader::Reader;
