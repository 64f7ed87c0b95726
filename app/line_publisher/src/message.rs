const KEY_DELIMITER: char = '-';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub key: Option<String>,
    pub value: String,
}

impl Message {
    /// Parses `KEY-VALUE` or `VALUE`. Only the first `-` separates the key,
    /// later ones stay in the value. Key and value keep their whitespace, a
    /// value-only line is trimmed.
    pub fn parse(line: &str) -> Self {
        match line.split_once(KEY_DELIMITER) {
            Some((key, value)) => Message {
                key: Some(key.to_owned()),
                value: value.to_owned(),
            },
            None => Message {
                key: None,
                value: line.trim().to_owned(),
            },
        }
    }
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(key: Option<&str>, value: &str) -> Message {
        Message {
            key: key.map(str::to_owned),
            value: value.to_owned(),
        }
    }

    #[test]
    fn parse_key_value() {
        assert_eq!(Message::parse("a-1"), message(Some("a"), "1"));
        assert_eq!(Message::parse("order-created"), message(Some("order"), "created"));
    }

    #[test]
    fn parse_keeps_whitespace_around_delimiter() {
        assert_eq!(Message::parse(" a-1 "), message(Some(" a"), "1 "));
        assert_eq!(Message::parse("a-1  "), message(Some("a"), "1  "));
        assert_eq!(Message::parse("key - value"), message(Some("key "), " value"));
    }

    #[test]
    fn parse_value_only() {
        assert_eq!(Message::parse("justvalue"), message(None, "justvalue"));
        assert_eq!(Message::parse("  padded value\t"), message(None, "padded value"));
    }

    #[test]
    fn parse_keeps_remaining_delimiters_in_value() {
        assert_eq!(Message::parse("a-1-2"), message(Some("a"), "1-2"));
        assert_eq!(Message::parse("-value"), message(Some(""), "value"));
        assert_eq!(Message::parse("key-"), message(Some("key"), ""));
    }

    #[test]
    fn blank_lines() {
        assert!(is_blank(""));
        assert!(is_blank("   \t"));
        assert!(!is_blank(" x "));
    }
}
