//! Sender filter.

/// Decides which senders get an automatic reply.
///
/// - Empty pattern or `*` → every sender matches
/// - Anything else → case-sensitive substring of the decoded `From` text
///
/// The substring test is intentionally loose: `a@x` matches
/// `"Alice <a@x.com>"` as well as `"ba@xyz.org"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderFilter {
    pattern: String,
}

impl SenderFilter {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// Whether this filter lets every sender through.
    pub fn matches_all(&self) -> bool {
        self.pattern.is_empty() || self.pattern == "*"
    }

    pub fn matches(&self, sender: &str) -> bool {
        self.matches_all() || sender.contains(&self.pattern)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_matches_everything() {
        let filter = SenderFilter::new("");
        assert!(filter.matches("anyone@example.com"));
        assert!(filter.matches(""));
    }

    #[test]
    fn wildcard_matches_everything() {
        let filter = SenderFilter::new("*");
        assert!(filter.matches_all());
        assert!(filter.matches("test@other.org"));
    }

    #[test]
    fn substring_match() {
        let filter = SenderFilter::new("a@x");
        assert!(filter.matches("a@x.com"));
        assert!(filter.matches("Alice <a@x.com>"));
        assert!(filter.matches("ba@xyz.org"));
        assert!(!filter.matches("b@y.com"));
    }

    #[test]
    fn match_is_case_sensitive() {
        let filter = SenderFilter::new("Alice");
        assert!(filter.matches("Alice <a@x.com>"));
        assert!(!filter.matches("alice <a@x.com>"));
    }

    #[test]
    fn star_inside_pattern_is_literal() {
        let filter = SenderFilter::new("*@x.com");
        assert!(!filter.matches_all());
        assert!(!filter.matches("a@x.com"));
    }
}
