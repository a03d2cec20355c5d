use std::{any::Any, fmt, sync::Arc};

use metrics_interface::{Counter, Histogram};

use crate::{GaugeCells, MetricName};

/// The kind of instrument a backend is asked to build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstrumentKind {
    /// A monotonic counter.
    Counter,
    /// An observable gauge.
    Gauge,
    /// A histogram.
    Histogram,
    /// A summary. Backends build summaries as histograms.
    Summary,
}

impl InstrumentKind {
    /// Gets the lowercase name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentKind::Counter => "counter",
            InstrumentKind::Gauge => "gauge",
            InstrumentKind::Histogram => "histogram",
            InstrumentKind::Summary => "summary",
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors a backend may return while building an instrument or registering a gauge callback.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    /// The instrument name is not accepted by the backend.
    #[error("invalid instrument name `{name}`: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The histogram bucket boundaries are not accepted by the backend.
    #[error("invalid histogram boundaries {boundaries:?}: {reason}")]
    InvalidBoundaries {
        /// The rejected boundaries.
        boundaries: Vec<f64>,
        /// Why they were rejected.
        reason: &'static str,
    },

    /// The name is already registered as an instrument of another kind.
    #[error("`{name}` is already registered as a {existing}")]
    Conflict {
        /// The full metric name.
        name: String,
        /// The kind it was first registered as.
        existing: InstrumentKind,
    },

    /// The gauge callback could not be registered.
    #[error("failed to register gauge callback: {0}")]
    Callback(String),
}

/// Receives the value reported by a gauge callback during a collection cycle.
pub trait Observer {
    /// Reports the current value of the observed gauge.
    fn observe(&self, value: f64);
}

/// A callback invoked by a backend on each of its collection cycles.
///
/// Callbacks run on whatever thread the backend collects on, concurrently with writers, and must
/// not block.
pub type GaugeCallback = Box<dyn Fn(&dyn Observer) + Send + Sync>;

/// Keeps a gauge callback registered for as long as it is alive.
///
/// Dropping a `Registration` lets the backend release the callback, which backends may or may not
/// act upon.
pub struct Registration {
    _guard: Box<dyn Any + Send + Sync>,
}

impl Registration {
    /// Creates a `Registration` that holds on to `guard` until dropped.
    pub fn new<G: Any + Send + Sync>(guard: G) -> Self {
        Self { _guard: Box::new(guard) }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration").finish_non_exhaustive()
    }
}

/// An observable gauge that was declared but has no callback yet.
pub trait PendingGauge: Send {
    /// Registers the callback that reports this gauge's value on each collection cycle.
    fn register_callback(self: Box<Self>, callback: GaugeCallback)
        -> Result<Registration, BackendError>;
}

/// The native instrument constructors of a metrics backend.
///
/// Construction may fail for any backend-specific reason. Callers are expected to recover from
/// failures themselves; see [`BackendCreator`](crate::BackendCreator).
///
/// Gauges are only supported as observable instruments: the backend pulls their value through a
/// callback during its own collection cycle, so building one is a two-step process of declaring
/// it with [`observable_gauge`](Backend::observable_gauge) and then attaching a callback to the
/// returned [`PendingGauge`]. A backend builds each gauge name once: it keeps one cell per name in
/// its [`GaugeCells`], and every gauge handle built for that name writes into that cell.
pub trait Backend: Send + Sync {
    /// Builds a counter.
    fn counter(&self, name: &MetricName, description: &str) -> Result<Counter, BackendError>;

    /// Builds a histogram, using `boundaries` as explicit bucket boundaries unless empty.
    fn histogram(
        &self,
        name: &MetricName,
        description: &str,
        boundaries: &[f64],
    ) -> Result<Histogram, BackendError>;

    /// Declares an observable gauge.
    fn observable_gauge(
        &self,
        name: &MetricName,
        description: &str,
    ) -> Result<Box<dyn PendingGauge>, BackendError>;

    /// Gets the gauge cells of this backend.
    fn gauge_cells(&self) -> &GaugeCells;
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn counter(&self, name: &MetricName, description: &str) -> Result<Counter, BackendError> {
        (**self).counter(name, description)
    }

    fn histogram(
        &self,
        name: &MetricName,
        description: &str,
        boundaries: &[f64],
    ) -> Result<Histogram, BackendError> {
        (**self).histogram(name, description, boundaries)
    }

    fn observable_gauge(
        &self,
        name: &MetricName,
        description: &str,
    ) -> Result<Box<dyn PendingGauge>, BackendError> {
        (**self).observable_gauge(name, description)
    }

    fn gauge_cells(&self) -> &GaugeCells {
        (**self).gauge_cells()
    }
}
