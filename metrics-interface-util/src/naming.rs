use std::fmt;

/// Separator between the segments of a hierarchical metric name.
pub const SEPARATOR: char = '.';

/// Namespace assigned to metric names that have no separator.
pub const DEFAULT_NAMESPACE: &str = "default";

/// A metric name split into a namespace and a leaf name.
///
/// Backends such as OpenTelemetry group instruments under a named meter, while callers identify
/// a metric by a single dotted name. The split happens at the *last* separator: everything before
/// it is the namespace, everything after it is the leaf name. A name without any separator lands
/// in [`DEFAULT_NAMESPACE`].
///
/// ```rust
/// use metrics_interface_util::MetricName;
///
/// let name = MetricName::parse("foo.bar.has_total");
/// assert_eq!(name.namespace(), "foo.bar");
/// assert_eq!(name.leaf(), "has_total");
///
/// let name = MetricName::parse("has_total");
/// assert_eq!(name.namespace(), "default");
/// assert_eq!(name.leaf(), "has_total");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MetricName {
    namespace: String,
    leaf: String,
    implicit_namespace: bool,
}

impl MetricName {
    /// Splits a full metric name into its namespace and leaf name.
    pub fn parse(full_name: &str) -> Self {
        match full_name.rfind(SEPARATOR) {
            Some(i) => Self {
                namespace: full_name[..i].to_string(),
                leaf: full_name[i + SEPARATOR.len_utf8()..].to_string(),
                implicit_namespace: false,
            },
            None => Self {
                namespace: DEFAULT_NAMESPACE.to_string(),
                leaf: full_name.to_string(),
                implicit_namespace: true,
            },
        }
    }

    /// Gets the namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Gets the leaf name.
    pub fn leaf(&self) -> &str {
        &self.leaf
    }

    /// Returns `true` if the namespace was not part of the full name.
    pub fn has_implicit_namespace(&self) -> bool {
        self.implicit_namespace
    }

    /// Rebuilds the full name this was parsed from.
    pub fn full_name(&self) -> String {
        self.to_string()
    }

    /// Consumes this name, returning the namespace and the leaf name.
    pub fn into_parts(self) -> (String, String) {
        (self.namespace, self.leaf)
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.implicit_namespace {
            f.write_str(&self.leaf)
        } else {
            write!(f, "{}{}{}", self.namespace, SEPARATOR, self.leaf)
        }
    }
}

impl From<&str> for MetricName {
    fn from(full_name: &str) -> Self {
        Self::parse(full_name)
    }
}
