//! Location fragment codec
//!
//! Fragments take the form `#/<index>` or `#/<identifier>`. Navigation
//! affordances write `#/<prefix><index>`, which resolves through the
//! identifier path.

use std::fmt;

/// A parsed location fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Numeric target, including the empty fragment (index 0)
    Index(usize),
    /// Identifier that satisfies the identifier grammar
    Named(String),
    /// Non-numeric text that is not a valid identifier
    Malformed(String),
}

impl Fragment {
    pub fn parse(hash: &str) -> Self {
        // The first path segment after `#/` decides between index and name.
        let rest: String = hash.chars().skip(2).collect();
        let token = rest.split('/').next().unwrap_or("");
        let name: String = hash.chars().filter(|c| *c != '#' && *c != '/').collect();

        match parse_leading_int(token) {
            None if !name.is_empty() => {
                if is_valid_identifier(&name) {
                    Fragment::Named(name)
                } else {
                    Fragment::Malformed(name)
                }
            }
            parsed => {
                let index = parsed.unwrap_or(0).max(0);
                Fragment::Index(usize::try_from(index).unwrap_or(usize::MAX))
            }
        }
    }

    /// Fragment written by navigation affordances
    pub fn for_index(prefix: &str, index: usize) -> Self {
        if prefix.is_empty() {
            Fragment::Index(index)
        } else {
            Fragment::parse(&format!("#/{prefix}{index}"))
        }
    }

    pub fn for_id(id: &str) -> Self {
        Fragment::parse(&format!("#/{id}"))
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Index(index) => write!(f, "#/{index}"),
            Fragment::Named(name) | Fragment::Malformed(name) => write!(f, "#/{name}"),
        }
    }
}

/// Integer prefix of `text`, the way a lenient integer parser reads it:
/// leading whitespace, an optional sign, then at least one digit.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    // Saturate rather than fail on absurdly long digit runs
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// `^[a-zA-Z][\w:.-]*$`
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '-'))
}

/// The host's current location fragment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationBar {
    hash: String,
}

impl LocationBar {
    pub fn new(hash: impl Into<String>) -> Self {
        Self { hash: normalize(hash.into()) }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Replace the fragment. Returns true when it changed, which is when a
    /// fragment-change notification fires.
    pub fn set_hash(&mut self, hash: impl Into<String>) -> bool {
        let hash = normalize(hash.into());
        if hash == self.hash {
            return false;
        }
        self.hash = hash;
        true
    }

    pub fn fragment(&self) -> Fragment {
        Fragment::parse(&self.hash)
    }
}

fn normalize(hash: String) -> String {
    if hash.is_empty() || hash.starts_with('#') {
        hash
    } else {
        format!("#{hash}")
    }
}
