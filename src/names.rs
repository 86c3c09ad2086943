//! Comparable name parts for roster and payroll rows.

const SUFFIXES: &[&str] = &["JR", "SR", "II", "III", "IV", "V"];

/// Cleaned name parts plus the two join keys derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub first: String,
    pub middle_initial: String,
    pub last: String,
}

/// Collapse whitespace to single spaces and drop periods and commas.
pub fn clean(raw: &str) -> String {
    raw.split_whitespace()
        .map(|t| t.replace(['.', ','], ""))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clean a last name and drop a trailing generational suffix.
pub fn strip_suffix(raw: &str) -> String {
    let cleaned = clean(raw);
    let mut tokens: Vec<&str> = cleaned.split(' ').filter(|t| !t.is_empty()).collect();
    if tokens.len() > 1 {
        if let Some(last) = tokens.last() {
            if SUFFIXES.contains(&last.to_uppercase().as_str()) {
                tokens.pop();
            }
        }
    }
    tokens.join(" ")
}

fn key_part(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '\'' && *c != '-')
        .flat_map(char::to_uppercase)
        .collect()
}

fn initial(raw: &str) -> String {
    raw.trim()
        .chars()
        .find(|c| c.is_alphanumeric())
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

impl ParsedName {
    /// Roster side: first name and middle initial arrive as separate fields.
    pub fn from_roster(first: &str, middle: &str, last: &str) -> Self {
        Self {
            first: clean(first),
            middle_initial: initial(middle),
            last: strip_suffix(last),
        }
    }

    /// Payroll side: the first-name field may carry a middle initial.
    ///
    /// `"Jane A."` splits into first `Jane`, initial `A`; `"Mary Ann"` stays a
    /// two-word first name with no initial.
    pub fn from_transaction(first_field: &str, last: &str) -> Self {
        let tokens: Vec<&str> = first_field.split_whitespace().collect();
        let (first, middle_initial) = match tokens.as_slice() {
            [first, second, ..] if is_initial_token(second) => (clean(first), initial(second)),
            _ => (clean(first_field), String::new()),
        };
        Self {
            first,
            middle_initial,
            last: strip_suffix(last),
        }
    }

    pub fn has_middle_initial(&self) -> bool {
        !self.middle_initial.is_empty()
    }

    /// `LAST|FIRST`
    pub fn loose_key(&self) -> String {
        format!("{}|{}", key_part(&self.last), key_part(&self.first))
    }

    /// `LAST|FIRST|MI`; only meaningful when both sides carry an initial.
    pub fn strict_key(&self) -> String {
        format!("{}|{}", self.loose_key(), key_part(&self.middle_initial))
    }
}

/// A single letter, optionally followed by a period.
fn is_initial_token(token: &str) -> bool {
    let token = token.strip_suffix('.').unwrap_or(token);
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_collapses_and_strips_punctuation() {
        assert_eq!(clean("  Mary   Ann. "), "Mary Ann");
        assert_eq!(clean("Doe,"), "Doe");
        assert_eq!(clean(" . "), "");
    }

    #[test]
    fn test_suffix_stripped() {
        assert_eq!(strip_suffix("Doe Jr"), "Doe");
        assert_eq!(strip_suffix("Doe, Jr."), "Doe");
        assert_eq!(strip_suffix("King III"), "King");
        assert_eq!(strip_suffix("Doe sr"), "Doe");
        // a lone suffix-looking surname is kept
        assert_eq!(strip_suffix("V"), "V");
        assert_eq!(strip_suffix("Van Der Berg"), "Van Der Berg");
    }

    #[test]
    fn test_transaction_middle_initial_extracted() {
        let n = ParsedName::from_transaction("Jane A.", "Doe");
        assert_eq!(n.first, "Jane");
        assert_eq!(n.middle_initial, "A");
        assert_eq!(n.strict_key(), "DOE|JANE|A");
    }

    #[test]
    fn test_transaction_compound_first_name() {
        let n = ParsedName::from_transaction("Mary Ann", "Brown");
        assert_eq!(n.first, "Mary Ann");
        assert!(!n.has_middle_initial());
        assert_eq!(n.loose_key(), "BROWN|MARYANN");
    }

    #[test]
    fn test_roster_initial_reduced() {
        let n = ParsedName::from_roster("Jane", "anne", "Doe");
        assert_eq!(n.middle_initial, "A");
        let n = ParsedName::from_roster("John", "  ", "Smith");
        assert!(!n.has_middle_initial());
        assert_eq!(n.strict_key(), "SMITH|JOHN|");
    }

    #[test]
    fn test_keys_ignore_case_apostrophes_and_hyphens() {
        let roster = ParsedName::from_roster("Mary-Kate", "", "O'Neil");
        let txn = ParsedName::from_transaction("MARYKATE", "oneil");
        assert_eq!(roster.loose_key(), txn.loose_key());
    }

    #[test]
    fn test_suffix_keys_identically() {
        let a = ParsedName::from_transaction("Alex", "Doe Jr");
        let b = ParsedName::from_roster("Alex", "", "Doe");
        assert_eq!(a.loose_key(), b.loose_key());
    }
}
