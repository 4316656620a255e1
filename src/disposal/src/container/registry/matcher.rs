use crate::key::QualifierSet;

/// The qualifier rules deciding whether a disposer applies to an instance.
#[cfg_attr(test, mockall::automock)]
pub trait QualifierMatcher: Send + Sync + 'static {
    /// Returns true if an instance qualified by `available` satisfies a
    /// disposer requiring `required`.
    fn matches(&self, required: &QualifierSet, available: &QualifierSet) -> bool;
}

/// Requires every qualifier of the disposer to be present on the instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubsetMatcher;

impl QualifierMatcher for SubsetMatcher {
    fn matches(&self, required: &QualifierSet, available: &QualifierSet) -> bool {
        required.is_subset(available)
    }
}

#[cfg(test)]
mod tests {
    use crate::key::DefaultQualifier;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Color {
        Blue,
        Red,
    }

    #[test]
    fn subset_matcher_requires_every_disposer_qualifier() {
        let matcher = SubsetMatcher;
        let blue = QualifierSet::of(Color::Blue);
        let blue_audit = QualifierSet::of(Color::Blue).with("audit");

        assert!(matcher.matches(&blue, &blue));
        assert!(matcher.matches(&blue, &blue_audit));
        assert!(!matcher.matches(&blue_audit, &blue));
        assert!(!matcher.matches(&blue, &QualifierSet::of(Color::Red)));
    }

    #[test]
    fn default_only_matches_default() {
        let matcher = SubsetMatcher;
        let default = QualifierSet::default_set();
        assert!(matcher.matches(&default, &QualifierSet::of(DefaultQualifier).with("audit")));
        assert!(!matcher.matches(&default, &QualifierSet::of(Color::Blue)));
    }
}
