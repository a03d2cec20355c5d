use std::{fmt, sync::Arc};

/// A counter handler.
pub trait CounterFn {
    /// Increments the counter by one.
    fn inc(&self) {
        self.add(1.0)
    }

    /// Increments the counter by the given amount.
    ///
    /// Callers of the [`Counter`] handle never reach this with a negative or NaN amount.
    fn add(&self, value: f64);
}

/// A gauge handler.
pub trait GaugeFn {
    /// Sets the gauge to the given amount.
    fn set(&self, value: f64);

    /// Increments the gauge by one.
    fn inc(&self) {
        self.add(1.0)
    }

    /// Decrements the gauge by one.
    fn dec(&self) {
        self.sub(1.0)
    }

    /// Increments the gauge by the given amount.
    fn add(&self, value: f64);

    /// Decrements the gauge by the given amount.
    fn sub(&self, value: f64);
}

/// A histogram handler.
pub trait HistogramFn {
    /// Records a value into the histogram.
    fn observe(&self, value: f64);
}

/// A summary handler.
pub trait SummaryFn {
    /// Records a value into the summary.
    fn observe(&self, value: f64);
}

/// A counter.
#[derive(Clone)]
pub struct Counter {
    inner: Option<Arc<dyn CounterFn + Send + Sync>>,
}

/// A gauge.
#[derive(Clone)]
pub struct Gauge {
    inner: Option<Arc<dyn GaugeFn + Send + Sync>>,
}

/// A histogram.
#[derive(Clone)]
pub struct Histogram {
    inner: Option<Arc<dyn HistogramFn + Send + Sync>>,
}

/// A summary.
#[derive(Clone)]
pub struct Summary {
    inner: Option<Arc<dyn SummaryFn + Send + Sync>>,
}

impl Counter {
    /// Creates a no-op `Counter` which does nothing.
    ///
    /// Suitable when a handle must be provided that does nothing i.e. a creator whose backend
    /// rejected the instrument.
    pub fn noop() -> Self {
        Self { inner: None }
    }

    /// Creates a `Counter` based on a shared handler.
    pub fn from_arc<F: CounterFn + Send + Sync + 'static>(a: Arc<F>) -> Self {
        Self { inner: Some(a) }
    }

    /// Returns `true` if this counter discards everything recorded into it.
    pub fn is_noop(&self) -> bool {
        self.inner.is_none()
    }

    /// Increments the counter by one.
    pub fn inc(&self) {
        if let Some(ref inner) = self.inner {
            inner.inc()
        }
    }

    /// Increments the counter by the given amount.
    ///
    /// Counters are monotonic: negative and NaN amounts are dropped here and never reach the
    /// handler.
    pub fn add(&self, value: f64) {
        if !(value >= 0.0) {
            return;
        }

        if let Some(ref inner) = self.inner {
            inner.add(value)
        }
    }
}

impl Gauge {
    /// Creates a no-op `Gauge` which does nothing.
    ///
    /// Suitable when a handle must be provided that does nothing i.e. a creator whose backend
    /// rejected the instrument.
    pub fn noop() -> Self {
        Self { inner: None }
    }

    /// Creates a `Gauge` based on a shared handler.
    pub fn from_arc<F: GaugeFn + Send + Sync + 'static>(a: Arc<F>) -> Self {
        Self { inner: Some(a) }
    }

    /// Returns `true` if this gauge discards everything recorded into it.
    pub fn is_noop(&self) -> bool {
        self.inner.is_none()
    }

    /// Sets the gauge.
    pub fn set(&self, value: f64) {
        if let Some(ref inner) = self.inner {
            inner.set(value)
        }
    }

    /// Increments the gauge by one.
    pub fn inc(&self) {
        if let Some(ref inner) = self.inner {
            inner.inc()
        }
    }

    /// Decrements the gauge by one.
    pub fn dec(&self) {
        if let Some(ref inner) = self.inner {
            inner.dec()
        }
    }

    /// Increments the gauge.
    pub fn add(&self, value: f64) {
        if let Some(ref inner) = self.inner {
            inner.add(value)
        }
    }

    /// Decrements the gauge.
    pub fn sub(&self, value: f64) {
        if let Some(ref inner) = self.inner {
            inner.sub(value)
        }
    }
}

impl Histogram {
    /// Creates a no-op `Histogram` which does nothing.
    ///
    /// Suitable when a handle must be provided that does nothing i.e. a creator whose backend
    /// rejected the instrument.
    pub fn noop() -> Self {
        Self { inner: None }
    }

    /// Creates a `Histogram` based on a shared handler.
    pub fn from_arc<F: HistogramFn + Send + Sync + 'static>(a: Arc<F>) -> Self {
        Self { inner: Some(a) }
    }

    /// Returns `true` if this histogram discards everything recorded into it.
    pub fn is_noop(&self) -> bool {
        self.inner.is_none()
    }

    /// Records a value in the histogram.
    pub fn observe(&self, value: f64) {
        if let Some(ref inner) = self.inner {
            inner.observe(value)
        }
    }
}

impl Summary {
    /// Creates a no-op `Summary` which does nothing.
    pub fn noop() -> Self {
        Self { inner: None }
    }

    /// Creates a `Summary` based on a shared handler.
    pub fn from_arc<F: SummaryFn + Send + Sync + 'static>(a: Arc<F>) -> Self {
        Self { inner: Some(a) }
    }

    /// Returns `true` if this summary discards everything recorded into it.
    pub fn is_noop(&self) -> bool {
        self.inner.is_none()
    }

    /// Records a value in the summary.
    pub fn observe(&self, value: f64) {
        if let Some(ref inner) = self.inner {
            inner.observe(value)
        }
    }
}

macro_rules! impl_debug {
    ($($ty:ident),+) => {
        $(
            impl fmt::Debug for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($ty)).field("noop", &self.is_noop()).finish()
                }
            }
        )+
    };
}

impl_debug!(Counter, Gauge, Histogram, Summary);
