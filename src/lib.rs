//! Converts tabular spreadsheet data and a small line-oriented markup
//! language into paginated, typeset PDF documents.
//!
//! The pipeline has three layers: a [TextCursor] scans the input, the
//! [markup] interpreter turns directives into layout commands, and the
//! [LayoutEngine] paginates wrapped, aligned text through a [PageSink]
//! (the production sink writes a PDF via [pdf_writer], embedding a single
//! TTF/OTF [Font] that also serves as the engine's [FontMetrics]).

mod cursor;
pub use cursor::*;

mod document;
pub use document::*;

mod engine;
pub use engine::*;

mod error;
pub use error::*;

mod font;
pub use font::*;

mod info;
pub use info::*;

mod margins;
pub use margins::*;

/// Line-oriented markup interpretation
pub mod markup;

mod metrics;
pub use metrics::*;

/// Pre-defined page sizes and name lookup for `page-` directives
pub mod pagesize;

mod page;
pub use page::*;

mod rect;
pub use rect::*;

pub(crate) mod refs;

/// Spreadsheet dumping, through the layout engine or as plain text
pub mod sheet;

mod sink;
pub use sink::*;

mod units;
pub use units::*;

/// Re-export PDF-writer functionality, mostly for custom [pdf_writer::Content] generation
pub use pdf_writer;
