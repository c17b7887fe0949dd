//! Path normalization and segment matching.
//!
//! Patterns are compiled once at registration time into a list of literal and
//! parameter segments. Matching is a single left-to-right pass with no
//! backtracking: both sides are split on `/`, empty segments are discarded, the
//! segment counts must agree, literals must be byte-equal and parameters bind
//! whatever single segment sits in their position.

use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Path separator used by patterns and request paths.
pub const SEPARATOR: char = '/';

/// Prefix that turns a pattern segment into a named parameter (`/orders/:id`).
pub const PARAM_MARKER: char = ':';

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Bound path parameters, in pattern order.
///
/// Names come from the compiled pattern and are shared with it, values are
/// per-request data taken from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Collapse runs of `/` into one and strip a single trailing `/`.
///
/// The root path `/` is left alone, so `"/"`, `"//"` and `"///"` all normalize
/// to `"/"`. The same function is applied to registered patterns and incoming
/// request paths so both sides compare consistently.
///
/// ```
/// use dishpatch::router::normalize_path;
///
/// assert_eq!(normalize_path("/a//b/"), "/a/b");
/// assert_eq!(normalize_path("/users/"), "/users");
/// assert_eq!(normalize_path("//"), "/");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut previous_was_separator = false;
    for ch in path.chars() {
        if ch == SEPARATOR {
            if previous_was_separator {
                continue;
            }
            previous_was_separator = true;
        } else {
            previous_was_separator = false;
        }
        out.push(ch);
    }
    if out.len() > 1 && out.ends_with(SEPARATOR) {
        out.pop();
    }
    out
}

/// Split a path into its non-empty segments.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty())
}

/// One compiled segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the request segment byte for byte.
    Literal(String),
    /// Binds the request segment under this name.
    Param(Arc<str>),
}

/// A normalized route pattern such as `/orders/:id/status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: SmallVec<[Segment; 8]>,
}

impl PathPattern {
    /// Normalize and compile a pattern. Patterns are always rooted: `orders`
    /// becomes `/orders` and the empty pattern becomes `/`.
    ///
    /// A segment consisting of the marker alone (`:`) has no name to bind and
    /// is kept as a literal.
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        let mut raw = normalize_path(pattern);
        if !raw.starts_with(SEPARATOR) {
            raw.insert(0, SEPARATOR);
        }
        let segments = segments(&raw)
            .map(|segment| match segment.strip_prefix(PARAM_MARKER) {
                Some(name) if !name.is_empty() => Segment::Param(Arc::from(name)),
                _ => Segment::Literal(segment.to_string()),
            })
            .collect();
        Self { raw, segments }
    }

    /// The normalized pattern text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of the parameters in this pattern, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_ref()),
            Segment::Literal(_) => None,
        })
    }

    /// Prepend a mount prefix, re-normalizing the joined path.
    ///
    /// Mounting `/` under `/users` yields `/users`, not `/users/`.
    #[must_use]
    pub fn prefixed(&self, prefix: &str) -> Self {
        let mut joined = String::with_capacity(prefix.len() + self.raw.len() + 1);
        joined.push_str(prefix);
        joined.push(SEPARATOR);
        joined.push_str(&self.raw);
        Self::parse(&joined)
    }

    /// Match a candidate path against this pattern.
    ///
    /// Returns the bound parameters on success, an empty [`ParamVec`] for
    /// patterns without parameters, and `None` on any mismatch.
    #[must_use]
    pub fn match_path(&self, candidate: &str) -> Option<ParamVec> {
        let mut params = ParamVec::new();
        let mut pattern_segments = self.segments.iter();
        for value in segments(candidate) {
            match pattern_segments.next()? {
                Segment::Literal(literal) => {
                    if literal.as_bytes() != value.as_bytes() {
                        return None;
                    }
                }
                Segment::Param(name) => params.push((Arc::clone(name), value.to_string())),
            }
        }
        if pattern_segments.next().is_some() {
            return None;
        }
        Some(params)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Match `candidate` against the textual `pattern`.
///
/// Convenience wrapper over [`PathPattern::parse`] + [`PathPattern::match_path`];
/// the router compiles patterns once instead of calling this per request.
#[must_use]
pub fn match_path(pattern: &str, candidate: &str) -> Option<ParamVec> {
    PathPattern::parse(pattern).match_path(candidate)
}

/// Look up a bound parameter by name. The last binding wins on duplicate names.
#[must_use]
pub fn param<'a>(params: &'a ParamVec, name: &str) -> Option<&'a str> {
    params
        .iter()
        .rfind(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v.as_str())
}
