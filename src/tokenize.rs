//! Text normalization into lowercase terms.
//!
//! A character survives tokenization if it is an ASCII letter or digit, or
//! falls inside one of the tokenizer's accepted [`ScriptRange`]s. Everything
//! else (punctuation, symbols, scripts that were not configured) becomes a
//! separator. There is no stemming and no stop-word list.

/// An inclusive range of Unicode scalar values accepted as term characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptRange {
    start: u32,
    end: u32,
}

impl ScriptRange {
    /// CJK Unified Ideographs.
    pub const CJK: ScriptRange = ScriptRange {
        start: 0x4E00,
        end: 0x9FFF,
    };

    /// Returns `None` for an empty or out-of-Unicode range.
    pub fn new(start: u32, end: u32) -> Option<Self> {
        if start > end || end > char::MAX as u32 {
            return None;
        }
        Some(Self { start, end })
    }

    pub fn contains(&self, c: char) -> bool {
        (self.start..=self.end).contains(&(c as u32))
    }
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    extra: Vec<ScriptRange>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(vec![ScriptRange::CJK])
    }
}

impl Tokenizer {
    pub fn new(extra: Vec<ScriptRange>) -> Self {
        Self { extra }
    }

    fn is_term_char(&self, c: char) -> bool {
        c.is_ascii_alphanumeric() || self.extra.iter().any(|r| r.contains(c))
    }

    /// Lowercases `text` and splits it into terms.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized: String = text
            .to_lowercase()
            .chars()
            .map(|c| {
                if self.is_term_char(c) || c.is_whitespace() {
                    c
                } else {
                    ' '
                }
            })
            .collect();

        normalized
            .split_whitespace()
            .map(|t| t.to_string())
            .collect()
    }
}
