use std::time::Duration;

/// Default sliding window length for summary quantile estimation.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(10 * 60);

/// Default number of buckets used to rotate the sliding window.
pub const DEFAULT_AGE_BUCKETS: u32 = 5;

/// Default sample buffer capacity.
pub const DEFAULT_BUF_CAP: u32 = 500;

/// Configuration for a summary.
///
/// Backends are free to ignore any of these settings. In particular, backends without a native
/// summary primitive record summaries as plain histograms and drop the quantile objectives.
#[derive(Clone, Debug, PartialEq)]
pub struct SummaryOpts {
    /// Quantile objectives, as `(quantile, allowed absolute error)` pairs.
    pub objectives: Vec<(f64, f64)>,

    /// How long an observation stays relevant to the quantiles.
    pub max_age: Duration,

    /// Number of buckets the `max_age` window is divided into.
    pub age_buckets: u32,

    /// Capacity of the sample buffer used before observations are merged.
    pub buf_cap: u32,
}

impl SummaryOpts {
    /// Creates a `SummaryOpts` with the given quantile objectives and default windowing.
    pub fn with_objectives<I>(objectives: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        Self { objectives: objectives.into_iter().collect(), ..Self::default() }
    }
}

impl Default for SummaryOpts {
    fn default() -> Self {
        Self {
            objectives: Vec::new(),
            max_age: DEFAULT_MAX_AGE,
            age_buckets: DEFAULT_AGE_BUCKETS,
            buf_cap: DEFAULT_BUF_CAP,
        }
    }
}
