//! Text metrics computed for each accepted article
//!
//! Both functions are pure and operate on the string exactly as given.

use regex::Regex;
use std::sync::OnceLock;

/// Dollar-prefixed amounts, or bare amounts followed by "dollars"/"USD"
const MONEY_PATTERN: &str =
    r"(?i)(\$\d{1,3}(,\d{3})*(\.\d{1,2})?)|(\d{1,3}(,\d{3})*(\.\d{1,2})?\s?(dollars|usd))";

/// Count case-insensitive, non-overlapping occurrences of `phrase`
///
/// Scanning resumes after each match, so `"aa"` occurs twice in `"AAAA"`
/// and once in `"aaa"`. An empty phrase never matches.
///
/// # Examples
///
/// ```
/// use newsharvest::analytics::count_occurrences;
///
/// assert_eq!(count_occurrences("Election day: the ELECTION", "election"), 2);
/// assert_eq!(count_occurrences("AAAA", "aa"), 2);
/// ```
pub fn count_occurrences(haystack: &str, phrase: &str) -> u32 {
    if phrase.is_empty() {
        return 0;
    }

    let haystack = haystack.to_lowercase();
    let phrase = phrase.to_lowercase();

    haystack.matches(phrase.as_str()).count() as u32
}

/// Check whether `text` mentions a monetary amount
///
/// Matches `$11.1`, `$111,111.11`, `11 dollars`, `11 USD` and similar forms,
/// case-insensitively, anywhere in the text.
pub fn contains_money(text: &str) -> bool {
    static MONEY_RE: OnceLock<Regex> = OnceLock::new();

    let re = MONEY_RE.get_or_init(|| Regex::new(MONEY_PATTERN).expect("Invalid regex pattern"));

    re.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_is_case_insensitive() {
        assert_eq!(count_occurrences("Election ELECTION election", "eLeCtIoN"), 3);
    }

    #[test]
    fn test_count_is_non_overlapping() {
        assert_eq!(count_occurrences("AAAA", "aa"), 2);
        assert_eq!(count_occurrences("aaa", "aa"), 1);
    }

    #[test]
    fn test_count_no_match() {
        assert_eq!(count_occurrences("nothing relevant", "budget"), 0);
        assert_eq!(count_occurrences("", "budget"), 0);
    }

    #[test]
    fn test_count_empty_phrase() {
        assert_eq!(count_occurrences("anything", ""), 0);
    }

    #[test]
    fn test_count_multiword_phrase() {
        let text = "The climate change summit discussed Climate Change policy";
        assert_eq!(count_occurrences(text, "climate change"), 2);
    }

    #[test]
    fn test_money_dollar_sign() {
        assert!(contains_money("$1,234.50"));
        assert!(contains_money("It cost $11.1 total"));
        assert!(contains_money("a $111,111.11 grant"));
        assert!(contains_money("$5"));
    }

    #[test]
    fn test_money_suffix_tokens() {
        assert!(contains_money("1234 dollars"));
        assert!(contains_money("1,234 USD"));
        assert!(contains_money("raised 20usd"));
        assert!(contains_money("about 11 Dollars"));
        assert!(contains_money("fees of 3.5 usd"));
    }

    #[test]
    fn test_money_absent() {
        assert!(!contains_money("no price here"));
        assert!(!contains_money("in 2024 the city grew"));
        assert!(!contains_money("dollars are mentioned without a number"));
        assert!(!contains_money(""));
    }
}
