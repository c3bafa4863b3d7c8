//! Result Formatting Built-ins
//!
//! Concrete formatters and processors shipped with the engine:
//! - `TextFormatter` - universal `text` fallback, accepts every result
//! - `TableFormatter` - arrays of homogeneous objects
//! - `ListFormatter`, `CardFormatter`, `CodeFormatter` - other structured output
//! - `HighlightLimitProcessor`, `CompactTextProcessor` - post-processing
//!
//! Hosts can register their own plugins alongside (or instead of) these.

use std::sync::Arc;

use result_formatting_core::{Formatter, Processor};

pub mod processors;
pub mod structured;
pub mod summary;
pub mod table;
pub mod text;

pub use processors::{CompactTextProcessor, HighlightLimitProcessor};
pub use structured::{CardFormatter, CodeFormatter, ListFormatter};
pub use table::TableFormatter;
pub use text::{render_text, TextFormatter};

/// The built-in formatter set.
pub fn default_formatters() -> Vec<Arc<dyn Formatter>> {
    vec![
        Arc::new(TextFormatter),
        Arc::new(TableFormatter),
        Arc::new(ListFormatter),
        Arc::new(CardFormatter),
        Arc::new(CodeFormatter),
    ]
}

/// The built-in processor set.
pub fn default_processors() -> Vec<Arc<dyn Processor>> {
    vec![
        Arc::new(HighlightLimitProcessor::default()),
        Arc::new(CompactTextProcessor::default()),
    ]
}
