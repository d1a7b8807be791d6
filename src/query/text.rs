use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Lowercases `value` and strips its diacritics (`"Café Ñandú"` becomes `"cafe nandu"`).
pub fn fold(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// A free-text query, folded once and matched as a substring.
#[derive(Debug, Clone, PartialEq)]
pub struct TextQuery {
    raw: String,
    folded: String,
}

impl TextQuery {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_owned(),
            folded: fold(raw.trim()),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }

    pub fn matches(&self, haystack: &str) -> bool {
        fold(haystack).contains(&self.folded)
    }

    pub fn matches_any<'a>(&self, mut haystacks: impl Iterator<Item = &'a str>) -> bool {
        self.is_empty() || haystacks.any(|h| self.matches(h))
    }
}
