use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::catalogue::Catalogue;

/// Runs of `/` or `\`, collapsed to a single `/` in recorded sources.
static SEPARATOR_RUN_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_separator_run_regex() -> &'static Regex {
    SEPARATOR_RUN_REGEX.get_or_init(|| {
        Regex::new(r"[\\/]+").expect("SEPARATOR_RUN_REGEX pattern is invalid - this is a bug")
    })
}

/// One translator call site found in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageRecord {
    pub message: String,
    pub domain: String,
    pub file: PathBuf,
    /// 1-based line of the message argument, when known
    pub line: Option<usize>,
}

/// Writes message records into a catalogue.
#[derive(Debug, Clone, Default)]
pub struct MessageRecorder {
    prefix: String,
}

impl MessageRecorder {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Register the message and append its source location.
    ///
    /// Sources are never deduplicated: recording the same call site twice
    /// yields two identical entries.
    pub fn record<C: Catalogue + ?Sized>(&self, catalogue: &mut C, record: &MessageRecord) {
        let MessageRecord {
            message,
            domain,
            file,
            line,
        } = record;

        catalogue.set(message, format!("{}{}", self.prefix, message), domain);

        let mut metadata = catalogue
            .get_metadata(message, domain)
            .cloned()
            .unwrap_or_default();
        metadata.sources.push(source_location(file, *line));
        catalogue.set_metadata(message, metadata, domain);
    }
}

/// `path` with forward slashes only, suffixed with `:line` when known.
pub fn source_location(path: &Path, line: Option<usize>) -> String {
    let normalized = normalize_path(&path.to_string_lossy());
    match line {
        Some(line) => format!("{}:{}", normalized, line),
        None => normalized,
    }
}

pub fn normalize_path(path: &str) -> String {
    get_separator_run_regex().replace_all(path, "/").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::MessageCatalogue;

    fn record(message: &str, domain: &str, file: &str, line: Option<usize>) -> MessageRecord {
        MessageRecord {
            message: message.to_string(),
            domain: domain.to_string(),
            file: PathBuf::from(file),
            line,
        }
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(r"C:\project\\src\app.js"), "C:/project/src/app.js");
        assert_eq!(normalize_path("src//components///Button.jsx"), "src/components/Button.jsx");
        assert_eq!(normalize_path(r"mixed/\path"), "mixed/path");
    }

    #[test]
    fn test_source_location_with_line() {
        assert_eq!(source_location(Path::new("a/b.js"), Some(12)), "a/b.js:12");
        assert_eq!(source_location(Path::new("a/b.js"), None), "a/b.js");
    }

    #[test]
    fn test_record_sets_prefixed_value() {
        let mut catalogue = MessageCatalogue::new("en");
        let recorder = MessageRecorder::new("__");
        recorder.record(&mut catalogue, &record("title", "messages", "a.js", Some(1)));

        assert_eq!(catalogue.all("messages")["title"], "__title");
    }

    #[test]
    fn test_record_appends_sources_without_dedup() {
        let mut catalogue = MessageCatalogue::new("en");
        let recorder = MessageRecorder::default();
        let call = record("title", "messages", r"src\\app.js", Some(3));
        recorder.record(&mut catalogue, &call);
        recorder.record(&mut catalogue, &call);
        recorder.record(&mut catalogue, &record("title", "messages", "src/other.js", None));

        let metadata = catalogue.get_metadata("title", "messages").unwrap();
        assert_eq!(
            metadata.sources,
            vec!["src/app.js:3", "src/app.js:3", "src/other.js"]
        );
    }

    #[test]
    fn test_record_preserves_existing_metadata() {
        let mut catalogue = MessageCatalogue::new("en");
        let mut metadata = crate::catalogue::Metadata::default();
        metadata
            .extra
            .insert("notes".to_string(), serde_json::json!(["reviewed"]));
        catalogue.set("title", "title".to_string(), "messages");
        catalogue.set_metadata("title", metadata, "messages");

        MessageRecorder::default()
            .record(&mut catalogue, &record("title", "messages", "a.js", Some(2)));

        let metadata = catalogue.get_metadata("title", "messages").unwrap();
        assert_eq!(metadata.sources, vec!["a.js:2"]);
        assert_eq!(metadata.extra["notes"], serde_json::json!(["reviewed"]));
    }
}
