use std::borrow::Cow;
use std::fmt;

#[derive(Debug, Clone)]
pub(crate) struct Regex {
    backend: fancy_regex::Regex,
}

impl Regex {
    pub(crate) fn find_all(&self, input: &str) -> Result<Vec<Match>, RegexError> {
        let mut out = Vec::new();
        for matched in self.backend.find_iter(input) {
            let matched = matched.map_err(RegexError::from)?;
            if matched.start() == matched.end() {
                continue;
            }
            out.push(Match::from_backend(matched));
        }
        Ok(out)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RegexBuilder {
    pattern: String,
    case_insensitive: bool,
}

impl RegexBuilder {
    pub(crate) fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            case_insensitive: false,
        }
    }

    pub(crate) fn case_insensitive(&mut self, enabled: bool) -> &mut Self {
        self.case_insensitive = enabled;
        self
    }

    pub(crate) fn build(&self) -> Result<Regex, RegexError> {
        let mut builder = fancy_regex::RegexBuilder::new(&self.pattern);
        builder.case_insensitive(self.case_insensitive);
        let backend = builder.build().map_err(RegexError::from)?;
        Ok(Regex { backend })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Match {
    start: usize,
    end: usize,
    text: String,
}

impl Match {
    fn from_backend(matched: fancy_regex::Match<'_>) -> Self {
        Self {
            start: matched.start(),
            end: matched.end(),
            text: matched.as_str().to_string(),
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub(crate) fn start(&self) -> usize {
        self.start
    }

    pub(crate) fn end(&self) -> usize {
        self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RegexError {
    message: String,
}

impl fmt::Display for RegexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RegexError {}

impl From<fancy_regex::Error> for RegexError {
    fn from(value: fancy_regex::Error) -> Self {
        Self {
            message: value.to_string(),
        }
    }
}

impl From<RegexError> for crate::Error {
    fn from(value: RegexError) -> Self {
        crate::Error::Dom(format!("regex: {value}"))
    }
}

/// Escapes `value` so it matches literally.
pub(crate) fn escape(value: &str) -> Cow<'_, str> {
    let mut out = String::with_capacity(value.len());
    let mut changed = false;

    for ch in value.chars() {
        if is_regex_meta(ch) {
            out.push('\\');
            changed = true;
        }
        out.push(ch);
    }

    if changed {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(value)
    }
}

fn is_regex_meta(ch: char) -> bool {
    matches!(
        ch,
        '\\' | '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '^' | '$'
    )
}
