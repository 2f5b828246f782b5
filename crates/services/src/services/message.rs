use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

lazy_static! {
    // One level of JSON only: skips framing such as `data:` prefixes without a
    // full JSON-aware scan. Nested objects are not reconstructed.
    static ref LEVEL_ONE_JSON_REGEX: Regex = Regex::new(r"\{[^{}]*\}").unwrap();
}

/// Chat payload extracted from a raw line. Missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParsedMessage {
    pub room: String,
    pub nick: String,
    pub body: String,
}

#[derive(Debug)]
pub enum Extraction<'a> {
    /// Nothing brace-delimited on the line.
    NoCandidate,
    Parsed(ParsedMessage),
    /// A candidate was found but is not a valid message object.
    Malformed {
        candidate: &'a str,
        error: serde_json::Error,
    },
}

/// First `{...}` span without inner braces.
pub fn find_candidate(line: &str) -> Option<&str> {
    LEVEL_ONE_JSON_REGEX.find(line).map(|m| m.as_str())
}

pub fn extract_message(line: &str) -> Extraction<'_> {
    let Some(candidate) = find_candidate(line) else {
        return Extraction::NoCandidate;
    };

    match serde_json::from_str::<ParsedMessage>(candidate) {
        Ok(message) => Extraction::Parsed(message),
        Err(error) => Extraction::Malformed { candidate, error },
    }
}

/// Words are whatever sits between single spaces. Punctuation, other whitespace
/// and empty tokens are kept as-is.
pub fn split_words(body: &str) -> Vec<&str> {
    body.split(' ').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_payload_behind_framing() {
        let line = r##"data: {"room":"#yulayabgu","nick":"scropion77","body":"kap gel başkan"} trailing"##;

        let Extraction::Parsed(message) = extract_message(line) else {
            panic!("expected a parsed message");
        };
        assert_eq!(
            message,
            ParsedMessage {
                room: "#yulayabgu".to_string(),
                nick: "scropion77".to_string(),
                body: "kap gel başkan".to_string(),
            }
        );
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let Extraction::Parsed(message) = extract_message(r##"{"room":"#r1","extra":1}"##) else {
            panic!("expected a parsed message");
        };
        assert_eq!(message.room, "#r1");
        assert_eq!(message.nick, "");
        assert_eq!(message.body, "");
    }

    #[test]
    fn plain_chatter_is_not_a_candidate() {
        assert!(matches!(
            extract_message("just chatter"),
            Extraction::NoCandidate
        ));
        assert!(matches!(extract_message(""), Extraction::NoCandidate));
        assert!(matches!(
            extract_message("unbalanced { brace"),
            Extraction::NoCandidate
        ));
    }

    #[test]
    fn invalid_json_candidate_is_malformed() {
        let Extraction::Malformed { candidate, .. } = extract_message("garbage {not json}") else {
            panic!("expected a malformed candidate");
        };
        assert_eq!(candidate, "{not json}");
    }

    #[test]
    fn wrongly_typed_field_is_malformed() {
        assert!(matches!(
            extract_message(r#"{"room":42,"nick":"a","body":"b"}"#),
            Extraction::Malformed { .. }
        ));
        assert!(matches!(
            extract_message(r#"{"room":null}"#),
            Extraction::Malformed { .. }
        ));
    }

    #[test]
    fn nested_object_matches_innermost_span() {
        // Heuristic single-level match: only the inner object is considered.
        let line = r##"{"room":"#r","meta":{"nick":"inner"}}"##;
        assert_eq!(find_candidate(line), Some(r#"{"nick":"inner"}"#));
    }

    #[test]
    fn first_candidate_wins() {
        let line = r#"{"nick":"first"} {"nick":"second"}"#;
        let Extraction::Parsed(message) = extract_message(line) else {
            panic!("expected a parsed message");
        };
        assert_eq!(message.nick, "first");
    }

    #[test]
    fn splits_on_single_spaces_only() {
        assert_eq!(split_words("rgb rgb rgb"), vec!["rgb", "rgb", "rgb"]);
        assert_eq!(split_words("a  b"), vec!["a", "", "b"]);
        assert_eq!(split_words("tab\tkept, comma!"), vec!["tab\tkept,", "comma!"]);
        assert_eq!(split_words("ㅋㅋㅋㅋㅋㅋㅋ"), vec!["ㅋㅋㅋㅋㅋㅋㅋ"]);
    }

    #[test]
    fn empty_body_yields_one_empty_token() {
        assert_eq!(split_words(""), vec![""]);
    }
}
