use std::fmt;

use serde::Serialize;

/// Document text with structural units joined by newlines and the whole trimmed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedText(String);

impl NormalizedText {
    /// Join per-unit text (pages, records) in structural order.
    pub fn from_units<I, S>(units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = String::new();
        for unit in units {
            out.push_str(unit.as_ref());
            out.push('\n');
        }
        Self(out.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whitespace-separated tokens joined with `+`.
    ///
    /// This is the exact request-body format expected by the scoring endpoint.
    pub fn plus_encoded(&self) -> PlusEncodedText {
        PlusEncodedText::encode(&self.0)
    }
}

impl From<String> for NormalizedText {
    fn from(text: String) -> Self {
        Self::from_units([text])
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tokens of a text, split on runs of whitespace and joined with `+`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PlusEncodedText(String);

impl PlusEncodedText {
    pub const SEPARATOR: char = '+';

    pub fn encode(text: &str) -> Self {
        let mut out = String::with_capacity(text.len());
        for token in text.split_whitespace() {
            if !out.is_empty() {
                out.push(Self::SEPARATOR);
            }
            out.push_str(token);
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(Self::SEPARATOR).filter(|t| !t.is_empty())
    }

    /// Shortened form for log lines.
    pub fn sample(&self, max_chars: usize) -> String {
        let mut sample: String = self.0.chars().take(max_chars).collect();
        if self.0.chars().nth(max_chars).is_some() {
            sample.push('…');
        }
        sample
    }
}

impl fmt::Display for PlusEncodedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
