use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Metadata attached to a catalogue message.
///
/// `sources` lists every call site the message was found at, in recording
/// order. Entries the extractor does not know about are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Storage the extractor writes messages into.
///
/// The extractor only writes default values and metadata; it never reads
/// translated values back.
pub trait Catalogue {
    /// Insert or overwrite the value of `key` in `domain`.
    fn set(&mut self, key: &str, value: String, domain: &str);

    fn has(&self, key: &str, domain: &str) -> bool;

    fn get_metadata(&self, key: &str, domain: &str) -> Option<&Metadata>;

    fn set_metadata(&mut self, key: &str, metadata: Metadata, domain: &str);

    /// Every key/value pair of `domain`.
    fn all(&self, domain: &str) -> BTreeMap<String, String>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogueEntry {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// In-memory catalogue for one locale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageCatalogue {
    locale: String,
    domains: BTreeMap<String, BTreeMap<String, CatalogueEntry>>,
}

impl MessageCatalogue {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            domains: BTreeMap::new(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Domains holding at least one message.
    pub fn domains(&self) -> Vec<&str> {
        self.domains
            .iter()
            .filter(|(_, messages)| !messages.is_empty())
            .map(|(domain, _)| domain.as_str())
            .collect()
    }

    pub fn entry(&self, key: &str, domain: &str) -> Option<&CatalogueEntry> {
        self.domains.get(domain).and_then(|messages| messages.get(key))
    }

    /// Number of messages across all domains.
    pub fn len(&self) -> usize {
        self.domains.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Catalogue for MessageCatalogue {
    fn set(&mut self, key: &str, value: String, domain: &str) {
        self.domains
            .entry(domain.to_string())
            .or_default()
            .entry(key.to_string())
            .or_default()
            .value = value;
    }

    fn has(&self, key: &str, domain: &str) -> bool {
        self.entry(key, domain).is_some()
    }

    fn get_metadata(&self, key: &str, domain: &str) -> Option<&Metadata> {
        self.entry(key, domain).and_then(|entry| entry.metadata.as_ref())
    }

    fn set_metadata(&mut self, key: &str, metadata: Metadata, domain: &str) {
        self.domains
            .entry(domain.to_string())
            .or_default()
            .entry(key.to_string())
            .or_default()
            .metadata = Some(metadata);
    }

    fn all(&self, domain: &str) -> BTreeMap<String, String> {
        self.domains
            .get(domain)
            .map(|messages| {
                messages
                    .iter()
                    .map(|(key, entry)| (key.clone(), entry.value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_has_per_domain() {
        let mut catalogue = MessageCatalogue::new("en");
        catalogue.set("name", "name".to_string(), "person");

        assert!(catalogue.has("name", "person"));
        assert!(!catalogue.has("name", "messages"));
        assert_eq!(catalogue.domains(), vec!["person"]);
        assert_eq!(catalogue.len(), 1);
    }

    #[test]
    fn test_set_keeps_metadata() {
        let mut catalogue = MessageCatalogue::new("en");
        catalogue.set("title", "title".to_string(), "messages");
        catalogue.set_metadata(
            "title",
            Metadata {
                sources: vec!["a.js:1".to_string()],
                ..Default::default()
            },
            "messages",
        );
        catalogue.set("title", "__title".to_string(), "messages");

        assert_eq!(
            catalogue.get_metadata("title", "messages").unwrap().sources,
            vec!["a.js:1"]
        );
        assert_eq!(catalogue.all("messages")["title"], "__title");
    }

    #[test]
    fn test_all_unknown_domain_is_empty() {
        let catalogue = MessageCatalogue::new("en");
        assert!(catalogue.all("missing").is_empty());
        assert!(catalogue.is_empty());
    }

    #[test]
    fn test_serialize_shape() {
        let mut catalogue = MessageCatalogue::new("fr");
        catalogue.set("hello", "hello".to_string(), "messages");
        let json = serde_json::to_value(&catalogue).unwrap();
        assert_eq!(json["locale"], "fr");
        assert_eq!(json["domains"]["messages"]["hello"]["value"], "hello");
        assert!(json["domains"]["messages"]["hello"].get("metadata").is_none());
    }
}
