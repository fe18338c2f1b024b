//! Serial input processing
//!
//! Bytes from the transport go through the [`LineFramer`], each completed
//! line through the [`EntryParser`], and accepted samples into the plot
//! store.

pub mod framer;
pub mod parser;
pub mod separator;

pub use framer::LineFramer;
pub use parser::{tokenize, EntryParser, LineOutcome, PairOutcome, RawPair, Tokens};
pub use separator::{BaudRatePicker, LineSeparator, SeparatorPicker, STANDARD_SEPARATORS};
