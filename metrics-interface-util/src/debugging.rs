//! An in-process backend for debugging and testing.
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Weak,
};

use indexmap::IndexMap;
use metrics_interface::{atomics::AtomicGauge, Counter, CounterFn, Histogram, HistogramFn};
use ordered_float::OrderedFloat;
use parking_lot::Mutex;

use crate::{
    Backend, BackendError, GaugeCallback, GaugeCells, InstrumentKind, MetricName, Observer,
    PendingGauge, Registration,
};

type Callbacks = Vec<(u64, Arc<GaugeCallback>)>;
type Registry = Arc<Mutex<IndexMap<MetricName, Entry>>>;

/// A point-in-time value for a metric exposing raw values.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DebugValue {
    /// Counter.
    Counter(OrderedFloat<f64>),
    /// Gauge, as last reported by its callbacks.
    Gauge(OrderedFloat<f64>),
    /// Histogram, as every observation in recording order.
    Histogram(Vec<OrderedFloat<f64>>),
}

/// A collection of point-in-time metric values.
#[derive(Debug, Default)]
pub struct Snapshot(Vec<(MetricName, String, DebugValue)>);

impl Snapshot {
    /// Gets the value of the metric with the given full name, if present.
    pub fn get(&self, full_name: &str) -> Option<&DebugValue> {
        let name = MetricName::parse(full_name);
        self.0.iter().find(|(n, _, _)| *n == name).map(|(_, _, value)| value)
    }

    /// Returns the number of metrics in this snapshot.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if this snapshot holds no metrics.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts this snapshot to a vector of `(name, description, value)`, in registration order.
    pub fn into_vec(self) -> Vec<(MetricName, String, DebugValue)> {
        self.0
    }
}

struct Entry {
    description: String,
    storage: Storage,
}

enum Storage {
    Counter(Arc<AtomicGauge>),
    Gauge(Callbacks),
    Histogram(Arc<Mutex<Vec<f64>>>),
}

impl Storage {
    fn kind(&self) -> InstrumentKind {
        match self {
            Storage::Counter(_) => InstrumentKind::Counter,
            Storage::Gauge(_) => InstrumentKind::Gauge,
            Storage::Histogram(_) => InstrumentKind::Histogram,
        }
    }
}

/// Captures point-in-time snapshots of [`DebuggingBackend`].
///
/// Taking a snapshot is a collection cycle: every live gauge callback is invoked to read the
/// gauge's current value.
#[derive(Clone)]
pub struct Snapshotter {
    registry: Registry,
}

impl Snapshotter {
    /// Takes a snapshot of the backend.
    pub fn snapshot(&self) -> Snapshot {
        enum Pending {
            Ready(DebugValue),
            Observe(Vec<Arc<GaugeCallback>>),
        }

        // Gauge callbacks run outside of the registry lock.
        let pending: Vec<_> = {
            let registry = self.registry.lock();
            registry
                .iter()
                .map(|(name, entry)| {
                    let pending = match &entry.storage {
                        Storage::Counter(total) => {
                            Pending::Ready(DebugValue::Counter(total.get().into()))
                        }
                        Storage::Histogram(values) => Pending::Ready(DebugValue::Histogram(
                            values.lock().iter().copied().map(OrderedFloat).collect(),
                        )),
                        Storage::Gauge(callbacks) => Pending::Observe(
                            callbacks.iter().map(|(_, cb)| Arc::clone(cb)).collect(),
                        ),
                    };
                    (name.clone(), entry.description.clone(), pending)
                })
                .collect()
        };

        let mut snapshot = Vec::with_capacity(pending.len());
        for (name, description, pending) in pending {
            let value = match pending {
                Pending::Ready(value) => value,
                Pending::Observe(callbacks) => {
                    let last = LastValue::default();
                    let observer: &dyn Observer = &last;
                    for callback in callbacks {
                        (*callback)(observer);
                    }
                    match last.0.into_inner() {
                        Some(value) => DebugValue::Gauge(value.into()),
                        None => continue,
                    }
                }
            };
            snapshot.push((name, description, value));
        }

        Snapshot(snapshot)
    }
}

#[derive(Default)]
struct LastValue(Mutex<Option<f64>>);

impl Observer for LastValue {
    fn observe(&self, value: f64) {
        *self.0.lock() = Some(value);
    }
}

/// A simplistic backend that keeps every recorded value in memory.
///
/// Callers can take snapshots of the metrics at any given time and get access to the raw values.
/// Metrics are identified by their resolved name: building the same name twice with the same
/// kind shares the underlying storage, while building it with another kind fails with
/// [`BackendError::Conflict`].
///
/// Gauges are reported for as long as the backend or one of their handles is alive.
#[derive(Clone, Default)]
pub struct DebuggingBackend {
    registry: Registry,
    gauges: Arc<GaugeCells>,
    next_id: Arc<AtomicU64>,
}

impl DebuggingBackend {
    /// Creates a new `DebuggingBackend`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a `Snapshotter` attached to this backend.
    pub fn snapshotter(&self) -> Snapshotter {
        Snapshotter { registry: Arc::clone(&self.registry) }
    }

    fn get_or_insert<F, T>(
        &self,
        name: &MetricName,
        description: &str,
        kind: InstrumentKind,
        init: impl FnOnce() -> Storage,
        f: F,
    ) -> Result<T, BackendError>
    where
        F: FnOnce(&mut Storage) -> T,
    {
        let mut registry = self.registry.lock();
        let entry = registry
            .entry(name.clone())
            .or_insert_with(|| Entry { description: description.to_string(), storage: init() });

        let existing = entry.storage.kind();
        if existing != kind {
            return Err(BackendError::Conflict { name: name.full_name(), existing });
        }

        Ok(f(&mut entry.storage))
    }
}

impl Backend for DebuggingBackend {
    fn counter(&self, name: &MetricName, description: &str) -> Result<Counter, BackendError> {
        let total = self.get_or_insert(
            name,
            description,
            InstrumentKind::Counter,
            || Storage::Counter(Arc::default()),
            |storage| match storage {
                Storage::Counter(total) => Arc::clone(total),
                _ => unreachable!("kind checked"),
            },
        )?;

        Ok(Counter::from_arc(Arc::new(DebugCounter(total))))
    }

    fn histogram(
        &self,
        name: &MetricName,
        description: &str,
        _boundaries: &[f64],
    ) -> Result<Histogram, BackendError> {
        let values = self.get_or_insert(
            name,
            description,
            InstrumentKind::Histogram,
            || Storage::Histogram(Arc::default()),
            |storage| match storage {
                Storage::Histogram(values) => Arc::clone(values),
                _ => unreachable!("kind checked"),
            },
        )?;

        Ok(Histogram::from_arc(Arc::new(DebugHistogram(values))))
    }

    fn observable_gauge(
        &self,
        name: &MetricName,
        description: &str,
    ) -> Result<Box<dyn PendingGauge>, BackendError> {
        self.get_or_insert(
            name,
            description,
            InstrumentKind::Gauge,
            || Storage::Gauge(Vec::new()),
            |_| (),
        )?;

        Ok(Box::new(DebugPendingGauge {
            registry: Arc::downgrade(&self.registry),
            next_id: Arc::clone(&self.next_id),
            name: name.clone(),
        }))
    }

    fn gauge_cells(&self) -> &GaugeCells {
        &self.gauges
    }
}

struct DebugCounter(Arc<AtomicGauge>);

impl CounterFn for DebugCounter {
    fn add(&self, value: f64) {
        self.0.add(value);
    }
}

struct DebugHistogram(Arc<Mutex<Vec<f64>>>);

impl HistogramFn for DebugHistogram {
    fn observe(&self, value: f64) {
        self.0.lock().push(value);
    }
}

struct DebugPendingGauge {
    registry: Weak<Mutex<IndexMap<MetricName, Entry>>>,
    next_id: Arc<AtomicU64>,
    name: MetricName,
}

impl PendingGauge for DebugPendingGauge {
    fn register_callback(
        self: Box<Self>,
        callback: GaugeCallback,
    ) -> Result<Registration, BackendError> {
        let registry = self
            .registry
            .upgrade()
            .ok_or_else(|| BackendError::Callback("backend was dropped".to_string()))?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        match registry.lock().get_mut(&self.name).map(|entry| &mut entry.storage) {
            Some(Storage::Gauge(callbacks)) => callbacks.push((id, Arc::new(callback))),
            _ => return Err(BackendError::Callback(format!("`{}` is not a gauge", self.name))),
        }

        Ok(Registration::new(Unregister { registry: self.registry, name: self.name, id }))
    }
}

struct Unregister {
    registry: Weak<Mutex<IndexMap<MetricName, Entry>>>,
    name: MetricName,
    id: u64,
}

impl Drop for Unregister {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };

        if let Some(Storage::Gauge(callbacks)) =
            registry.lock().get_mut(&self.name).map(|entry| &mut entry.storage)
        {
            callbacks.retain(|(id, _)| *id != self.id);
        };
    }
}
