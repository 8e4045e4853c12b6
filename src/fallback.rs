use regex::{Captures, Regex};
use std::borrow::Cow;
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

use crate::config::ExtractorConfig;
use crate::error::Result;
use crate::recorder::MessageRecord;

/// Quoted string bodies: anything but the quote or a backslash, or an escape.
const SINGLE_QUOTED: &str = r"(?:[^'\\]|\\.)+";
const DOUBLE_QUOTED: &str = r#"(?:[^"\\]|\\.)+"#;

/// Regex approximation of the translator call grammar, used on files the
/// parser rejects.
///
/// Matches `Object.method('message')` and
/// `Object.method('message'[, 5], params, 'domain')`. The params argument is
/// matched as a run of non-`)` characters, so params containing a closing
/// parenthesis hide the call. Two-argument calls (message and params with no
/// domain) are not matched either.
#[derive(Debug, Clone)]
pub struct FallbackExtractor {
    pattern: Regex,
    default_domain: String,
}

impl FallbackExtractor {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        let pattern = Regex::new(&build_pattern(
            &config.translator_objects,
            &config.translator_methods,
        ))?;
        Ok(Self {
            pattern,
            default_domain: config.default_domain.clone(),
        })
    }

    /// Every call site found in `source`, in source order. Lines are not
    /// tracked on this path.
    pub fn extract(&self, source: &str, file: &Path) -> Vec<MessageRecord> {
        self.pattern
            .captures_iter(source)
            .filter_map(|caps| {
                let message = quoted_group(&caps, "message_single", "message_double")?;
                let domain = quoted_group(&caps, "domain_single", "domain_double")
                    .unwrap_or_else(|| self.default_domain.clone());
                Some(MessageRecord {
                    message,
                    domain,
                    file: file.to_path_buf(),
                    line: None,
                })
            })
            .collect()
    }
}

fn build_pattern(objects: &[String], methods: &[String]) -> String {
    let alternation = |names: &[String]| {
        names
            .iter()
            .filter(|name| !name.is_empty())
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|")
    };
    let quoted = |single: &str, double: &str| {
        format!(
            r#"(?:'(?P<{}>{})'|"(?P<{}>{})")"#,
            single, SINGLE_QUOTED, double, DOUBLE_QUOTED
        )
    };

    format!(
        concat!(
            r"(?s)",
            r"(?P<object>{objects})",
            r"\.",
            r"(?P<method>{methods})",
            r"\(",
            "{message}",
            r"(?:",
            r"(?:\s*,\s*\d+)?", // count argument of transChoice
            r"\s*,\s*",
            r"[^)]+", // params, assumed free of `)`
            r"\s*,\s*",
            "{domain}",
            r")?",
            r"\)",
        ),
        objects = alternation(objects),
        methods = alternation(methods),
        message = quoted("message_single", "message_double"),
        domain = quoted("domain_single", "domain_double"),
    )
}

fn quoted_group(caps: &Captures<'_>, single: &str, double: &str) -> Option<String> {
    caps.name(single)
        .or_else(|| caps.name(double))
        .map(|m| unescape(m.as_str()).into_owned())
}

/// Decode backslash escapes so keys match the parser's decoded literals.
fn unescape(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') if !chars.peek().is_some_and(|c| c.is_ascii_digit()) => out.push('\0'),
            Some('x') => match hex_escape(&mut chars, 2) {
                Some(decoded) => out.push(decoded),
                None => out.push('x'),
            },
            Some('u') => match unicode_escape(&mut chars) {
                Some(decoded) => out.push(decoded),
                None => out.push('u'),
            },
            // Line continuation
            Some('\r') => {
                chars.next_if_eq(&'\n');
            }
            Some('\n' | '\u{2028}' | '\u{2029}') => {}
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

/// Exactly `len` hex digits. Nothing is consumed when they are missing.
fn hex_escape(chars: &mut Peekable<Chars<'_>>, len: usize) -> Option<char> {
    let value = hex_value(chars.clone().take(len).collect(), len)?;
    chars.nth(len - 1);
    Some(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER))
}

/// `\uXXXX` or `\u{X...}`, after the `u`. A high surrogate followed by a
/// low surrogate escape decodes to one character.
fn unicode_escape(chars: &mut Peekable<Chars<'_>>) -> Option<char> {
    if chars.peek() == Some(&'{') {
        let body: String = chars.clone().skip(1).take_while(|c| *c != '}').collect();
        let closed = chars.clone().nth(body.len() + 1) == Some('}');
        if !closed || body.is_empty() || body.len() > 6 {
            return None;
        }
        let value = hex_value(body.clone(), body.len())?;
        let decoded = char::from_u32(value)?;
        chars.nth(body.len() + 1);
        return Some(decoded);
    }

    let high = hex_value(chars.clone().take(4).collect(), 4)?;
    chars.nth(3);

    if (0xD800..0xDC00).contains(&high) {
        let mut lookahead = chars.clone();
        if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
            if let Some(low) = hex_value(lookahead.take(4).collect(), 4) {
                if (0xDC00..0xE000).contains(&low) {
                    chars.nth(5);
                    let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(combined);
                }
            }
        }
    }
    Some(char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER))
}

fn hex_value(digits: String, len: usize) -> Option<u32> {
    if digits.len() != len || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(&digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Vec<(String, String)> {
        FallbackExtractor::new(&ExtractorConfig::default())
            .unwrap()
            .extract(source, Path::new("broken.js"))
            .into_iter()
            .map(|record| (record.message, record.domain))
            .collect()
    }

    fn pair(message: &str, domain: &str) -> (String, String) {
        (message.to_string(), domain.to_string())
    }

    #[test]
    fn test_single_argument_uses_default_domain() {
        assert_eq!(extract("Translator.trans('hello')"), vec![pair("hello", "messages")]);
        assert_eq!(extract(r#"Translator.trans("hello")"#), vec![pair("hello", "messages")]);
    }

    #[test]
    fn test_domain_argument() {
        let source = concat!(
            "Translator.trans('name', {}, 'person');\n",
            "Translator.trans(\"birthday\", {}, \"person\");",
        );
        assert_eq!(
            extract(source),
            vec![pair("name", "person"), pair("birthday", "person")]
        );
    }

    #[test]
    fn test_trans_choice_count_argument() {
        let source = "Translator.transChoice('apples', 5, { count: 5 }, 'fruit')";
        assert_eq!(extract(source), vec![pair("apples", "fruit")]);
    }

    #[test]
    fn test_params_with_parenthesis_hide_the_call() {
        let source = "Translator.trans('total', { sum: add(1, 2) }, 'cart')";
        assert!(extract(source).is_empty());
    }

    #[test]
    fn test_two_arguments_without_domain_do_not_match() {
        assert!(extract("Translator.trans('hello', { name: 'x' })").is_empty());
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(
            extract(r"Translator.trans('it\'s here')"),
            vec![pair("it's here", "messages")]
        );
        assert_eq!(
            extract(r#"Translator.trans("say \"hi\"", {}, "chat")"#),
            vec![pair("say \"hi\"", "chat")]
        );
    }

    #[test]
    fn test_unknown_method_is_ignored() {
        assert!(extract("Translator.translate('hello')").is_empty());
        assert!(extract("Translator.trans(key)").is_empty());
        assert!(extract("Translator.trans('')").is_empty());
    }

    #[test]
    fn test_custom_names_are_escaped() {
        let config = ExtractorConfig {
            translator_objects: vec!["$t".to_string()],
            translator_methods: vec!["get".to_string()],
            ..Default::default()
        };
        let fallback = FallbackExtractor::new(&config).unwrap();
        let records = fallback.extract(
            "$t.get('greeting'); Translator.trans('other')",
            Path::new("a.js"),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "greeting");
        assert_eq!(records[0].line, None);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("plain"), "plain");
        assert_eq!(unescape(r"line\nbreak"), "line\nbreak");
        assert_eq!(unescape(r"back\\slash"), r"back\slash");
    }

    #[test]
    fn test_unescape_code_points() {
        assert_eq!(unescape(r"caf\u00e9"), "café");
        assert_eq!(unescape(r"x\x41"), "xA");
        assert_eq!(unescape(r"\u{1F600}!"), "\u{1F600}!");
        assert_eq!(unescape(r"\ud83d\ude00"), "\u{1F600}");
        assert_eq!(unescape(r"a\0b"), "a\0b");
        assert_eq!(unescape(r"\b\f\v"), "\u{8}\u{c}\u{b}");
    }

    #[test]
    fn test_unescape_line_continuation() {
        assert_eq!(unescape("one \\\ntwo"), "one two");
        assert_eq!(unescape("one \\\r\ntwo"), "one two");
    }

    #[test]
    fn test_unescape_malformed_hex_keeps_letter() {
        assert_eq!(unescape(r"\xZZ"), "xZZ");
        assert_eq!(unescape(r"\u12"), "u12");
    }
}
