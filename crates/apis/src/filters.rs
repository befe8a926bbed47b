//! Predicate combinators for narrowing lists of resources and git refs.
//!
//! [`Filter`] is implemented by closures, so ad-hoc predicates compose with the
//! named ones through [`FilterExt`]:
//!
//! ```
//! use apis::filters::{Filter, FilterExt, RefFilter};
//!
//! let release = RefFilter::including(["release/*"]);
//! let not_rc = (|name: &str| name.ends_with("-rc")).not();
//! let filter = release.and(not_rc);
//! assert!(filter.matches("release/1.0"));
//! assert!(!filter.matches("release/1.0-rc"));
//! ```

/// Prefix git uses for tag references.
pub const TAG_REF_PREFIX: &str = "refs/tags/";

/// Prefix git uses for branch references.
pub const BRANCH_REF_PREFIX: &str = "refs/heads/";

// ---------------------------------------------------------------------------
// Core trait and combinators
// ---------------------------------------------------------------------------

/// A predicate over `T`.
pub trait Filter<T: ?Sized> {
    /// Returns `true` when `item` passes the filter.
    fn matches(&self, item: &T) -> bool;
}

impl<T: ?Sized, F> Filter<T> for F
where
    F: Fn(&T) -> bool,
{
    fn matches(&self, item: &T) -> bool {
        self(item)
    }
}

/// Passes items accepted by both filters.
#[derive(Debug, Clone)]
pub struct And<A, B>(A, B);

impl<T: ?Sized, A: Filter<T>, B: Filter<T>> Filter<T> for And<A, B> {
    fn matches(&self, item: &T) -> bool {
        self.0.matches(item) && self.1.matches(item)
    }
}

/// Passes items accepted by either filter.
#[derive(Debug, Clone)]
pub struct Or<A, B>(A, B);

impl<T: ?Sized, A: Filter<T>, B: Filter<T>> Filter<T> for Or<A, B> {
    fn matches(&self, item: &T) -> bool {
        self.0.matches(item) || self.1.matches(item)
    }
}

/// Inverts a filter.
#[derive(Debug, Clone)]
pub struct Not<A>(A);

impl<T: ?Sized, A: Filter<T>> Filter<T> for Not<A> {
    fn matches(&self, item: &T) -> bool {
        !self.0.matches(item)
    }
}

/// Combinator methods for filters.
///
/// Implemented for every sized type; the combined value is only a [`Filter`]
/// when its parts are.
pub trait FilterExt: Sized {
    /// Both `self` and `other` must pass.
    fn and<B>(self, other: B) -> And<Self, B> {
        And(self, other)
    }

    /// Either `self` or `other` must pass.
    fn or<B>(self, other: B) -> Or<Self, B> {
        Or(self, other)
    }

    /// Passes what `self` rejects.
    fn not(self) -> Not<Self> {
        Not(self)
    }
}

impl<F> FilterExt for F {}

/// Passes items accepted by every filter in a list. An empty list passes
/// everything.
pub struct AllOf<'a, T: ?Sized>(Vec<Box<dyn Filter<T> + Send + Sync + 'a>>);

impl<T: ?Sized> Filter<T> for AllOf<'_, T> {
    fn matches(&self, item: &T) -> bool {
        self.0.iter().all(|f| f.matches(item))
    }
}

/// Passes items accepted by at least one filter in a list. An empty list
/// passes nothing.
pub struct AnyOf<'a, T: ?Sized>(Vec<Box<dyn Filter<T> + Send + Sync + 'a>>);

impl<T: ?Sized> Filter<T> for AnyOf<'_, T> {
    fn matches(&self, item: &T) -> bool {
        self.0.iter().any(|f| f.matches(item))
    }
}

/// Builds an [`AllOf`] filter.
pub fn all_of<'a, T: ?Sized>(filters: Vec<Box<dyn Filter<T> + Send + Sync + 'a>>) -> AllOf<'a, T> {
    AllOf(filters)
}

/// Builds an [`AnyOf`] filter.
pub fn any_of<'a, T: ?Sized>(filters: Vec<Box<dyn Filter<T> + Send + Sync + 'a>>) -> AnyOf<'a, T> {
    AnyOf(filters)
}

/// Keeps the items accepted by `filter`, preserving order.
pub fn filter_items<T, F: Filter<T> + ?Sized>(items: Vec<T>, filter: &F) -> Vec<T> {
    items.into_iter().filter(|item| filter.matches(item)).collect()
}

// ---------------------------------------------------------------------------
// Ref patterns
// ---------------------------------------------------------------------------

/// A branch or tag name pattern.
///
/// `*` matches any run of characters (including `/`); every other character
/// matches itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefPattern(String);

impl RefPattern {
    /// Creates a pattern.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    /// Returns the pattern text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if `name` matches the pattern.
    pub fn matches_name(&self, name: &str) -> bool {
        glob_match(&self.0, name)
    }
}

impl Filter<str> for RefPattern {
    fn matches(&self, item: &str) -> bool {
        self.matches_name(item)
    }
}

fn glob_match(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    // split always yields at least one element
    let first = parts.next().unwrap_or_default();
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };

    let middle: Vec<&str> = parts.collect();
    let Some((last, middle)) = middle.split_last() else {
        // no `*` in the pattern
        return rest.is_empty();
    };

    for part in middle {
        match rest.find(part) {
            Some(index) => rest = &rest[index + part.len()..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}

/// Include/exclude filter over branch or tag names.
///
/// A name passes when the include list is empty or one of its patterns
/// matches, and none of the exclude patterns match. `refs/heads/` and
/// `refs/tags/` prefixes are stripped before matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefFilter {
    /// Patterns a name must match (any of).
    pub include: Vec<RefPattern>,
    /// Patterns a name must not match.
    pub exclude: Vec<RefPattern>,
}

impl RefFilter {
    /// Filter passing names that match any of `patterns`.
    pub fn including<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: patterns.into_iter().map(RefPattern::new).collect(),
            exclude: Vec::new(),
        }
    }

    /// Adds exclusion patterns.
    pub fn excluding<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude
            .extend(patterns.into_iter().map(RefPattern::new));
        self
    }
}

impl Filter<str> for RefFilter {
    fn matches(&self, item: &str) -> bool {
        let name = short_ref_name(item);
        let included =
            self.include.is_empty() || self.include.iter().any(|p| p.matches_name(name));
        included && !self.exclude.iter().any(|p| p.matches_name(name))
    }
}

/// Strips `refs/heads/` or `refs/tags/` from a full ref name.
pub fn short_ref_name(reference: &str) -> &str {
    reference
        .strip_prefix(BRANCH_REF_PREFIX)
        .or_else(|| reference.strip_prefix(TAG_REF_PREFIX))
        .unwrap_or(reference)
}

// ---------------------------------------------------------------------------
// Tag prefix matching
// ---------------------------------------------------------------------------

/// Returns the longest non-empty prefix in `prefixes` that `tag` starts with.
///
/// A leading `refs/tags/` on `tag` is ignored. Returns `None` when no prefix
/// matches (including when `prefixes` is empty).
pub fn match_tag_prefix<'a, S: AsRef<str>>(tag: &str, prefixes: &'a [S]) -> Option<&'a str> {
    let tag = tag.strip_prefix(TAG_REF_PREFIX).unwrap_or(tag);
    prefixes
        .iter()
        .map(AsRef::as_ref)
        .filter(|prefix| !prefix.is_empty() && tag.starts_with(prefix))
        .max_by_key(|prefix| prefix.len())
}

/// Passes tags starting with one of the configured prefixes.
///
/// With no prefixes configured every tag passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPrefixFilter {
    prefixes: Vec<String>,
}

impl TagPrefixFilter {
    /// Creates a filter; empty prefixes are ignored.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    /// The configured prefixes.
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl Filter<str> for TagPrefixFilter {
    fn matches(&self, item: &str) -> bool {
        self.prefixes.is_empty() || match_tag_prefix(item, &self.prefixes).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GitBranch, GitBranchSpec, ObjectMeta};

    #[test]
    fn glob_patterns() {
        let cases = [
            ("main", "main", true),
            ("main", "mainline", false),
            ("release/*", "release/1.0", true),
            ("release/*", "release", false),
            ("*", "", true),
            ("*-rc", "v1.0-rc", true),
            ("v*.*", "v1.2", true),
            ("v*.*", "v12", false),
            ("a*b*c", "abc", true),
            ("a*b*c", "acb", false),
            ("feat*/*", "feature/login", true),
            ("*ab", "ab", true),
            ("a*a", "a", false),
        ];
        for (pattern, name, expected) in cases {
            assert_eq!(
                RefPattern::new(pattern).matches_name(name),
                expected,
                "pattern {pattern:?} against {name:?}"
            );
        }
    }

    #[test]
    fn ref_filter_applies_include_then_exclude() {
        let filter = RefFilter::including(["release/*", "main"]).excluding(["*-rc"]);
        assert!(filter.matches("main"));
        assert!(filter.matches("refs/heads/release/2.0"));
        assert!(!filter.matches("release/2.0-rc"));
        assert!(!filter.matches("develop"));

        let everything = RefFilter::default();
        assert!(everything.matches("anything"));
    }

    #[test]
    fn combinators_compose() {
        let even = |n: &u32| n % 2 == 0;
        let big = |n: &u32| *n > 10;

        assert!(even.and(big).matches(&12));
        assert!(!even.and(big).matches(&4));
        assert!(even.or(big).matches(&11));
        assert!(even.not().matches(&3));

        let items = filter_items(vec![1, 2, 12, 13, 14], &even.and(big.not()));
        assert_eq!(items, vec![2]);
    }

    #[test]
    fn ref_filters_compose_with_closures() {
        let release = RefFilter::including(["release/*"]);
        let not_rc = (|name: &str| name.ends_with("-rc")).not();
        let filter = release.and(not_rc);
        assert!(filter.matches("release/1.0"));
        assert!(!filter.matches("release/1.0-rc"));
        assert!(!filter.matches("main"));
    }

    #[test]
    fn all_of_and_any_of_handle_empty_lists() {
        let none: AllOf<'_, u32> = all_of(Vec::new());
        assert!(none.matches(&1));
        let none: AnyOf<'_, u32> = any_of(Vec::new());
        assert!(!none.matches(&1));

        let filters: Vec<Box<dyn Filter<u32> + Send + Sync>> =
            vec![Box::new(|n: &u32| *n > 1), Box::new(|n: &u32| *n < 5)];
        assert!(all_of(filters).matches(&3));
    }

    #[test]
    fn filters_work_over_resources() {
        let branches: Vec<GitBranch> = ["main", "release/1.0", "feature/x"]
            .into_iter()
            .map(|name| GitBranch {
                metadata: ObjectMeta::named(name),
                spec: GitBranchSpec {
                    name: name.into(),
                    ..GitBranchSpec::default()
                },
            })
            .collect();

        let release = RefFilter::including(["release/*"]);
        let by_name = |b: &GitBranch| release.matches(b.spec.name.as_str());
        let kept = filter_items(branches, &by_name);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].spec.name, "release/1.0");
    }

    #[test]
    fn tag_prefix_prefers_the_longest_match() {
        let prefixes = ["v", "v1.", "release-"];
        assert_eq!(match_tag_prefix("v1.2.0", &prefixes), Some("v1."));
        assert_eq!(match_tag_prefix("refs/tags/v2.0", &prefixes), Some("v"));
        assert_eq!(match_tag_prefix("release-7", &prefixes), Some("release-"));
        assert_eq!(match_tag_prefix("nightly", &prefixes), None);
        assert_eq!(match_tag_prefix::<&str>("v1", &[]), None);
        assert_eq!(match_tag_prefix("v1", &[""]), None);
    }

    #[test]
    fn tag_prefix_filter_without_prefixes_passes_everything() {
        assert!(TagPrefixFilter::default().matches("anything"));
        assert!(TagPrefixFilter::new([""]).matches("anything"));

        let filter = TagPrefixFilter::new(["v"]);
        assert!(filter.matches("refs/tags/v1.0"));
        assert!(!filter.matches("nightly"));
    }
}
