//! Splits raw script text into whitespace-delimited tokens.

/// Whitespace tokenizer.
///
/// No quoting or escaping happens here: quoted text is reassembled by the
/// parser, which rejoins tokens with single spaces.
pub struct Tokenizer;

impl Tokenizer {
    /// Tokenizes `src`. Empty or blank input yields no tokens.
    #[must_use]
    pub fn tokenize(src: &str) -> Vec<String> {
        src.split_whitespace().map(str::to_owned).collect()
    }
}

/// Human description of a token for error messages.
pub(crate) fn describe(tok: Option<&str>) -> String {
    match tok {
        Some(t) => format!("'{}'", t),
        None => "end of input".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_any_whitespace() {
        let toks = Tokenizer::tokenize("@chapter  intro\t(\n  Bob \"Hi.\"\r\n)");
        assert_eq!(toks, vec!["@chapter", "intro", "(", "Bob", "\"Hi.\"", ")"]);
    }

    #[test]
    fn empty_input() {
        assert!(Tokenizer::tokenize("").is_empty());
        assert!(Tokenizer::tokenize(" \n\t ").is_empty());
    }

    #[test]
    fn describe_tokens() {
        assert_eq!(describe(Some("@foo")), "'@foo'");
        assert_eq!(describe(None), "end of input");
    }
}
