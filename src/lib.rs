//! Extract `Translator.trans(...)` message keys from JavaScript and JSX
//! sources into a message catalogue.
//!
//! Files are parsed with swc; files the parser rejects are scanned with a
//! regex approximation of the same call grammar instead.

pub mod catalogue;
pub mod commands;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fallback;
pub mod files;
pub mod logging;
pub mod recorder;

pub use catalogue::{Catalogue, MessageCatalogue, Metadata};
pub use config::ExtractorConfig;
pub use error::{ExtractError, ParseError};
pub use extractor::{ExtractionSummary, FileExtraction, JsExtractor, Strategy};
pub use recorder::{MessageRecord, MessageRecorder};
