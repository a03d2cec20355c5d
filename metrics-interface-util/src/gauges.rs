use std::{collections::HashMap, fmt, sync::Arc};

use metrics_interface::{atomics::AtomicGauge, Gauge, GaugeFn};
use parking_lot::Mutex;

use crate::{BackendError, MetricName, Observer, PendingGauge, Registration};

/// The gauge cells of a backend, one per metric name.
///
/// The first gauge built for a name declares it with the backend and registers a single callback
/// reporting a fresh [`AtomicGauge`]. Every later gauge built for that name writes into the same
/// cell. Cells and their callback registrations live as long as the `GaugeCells` or the last
/// handle over them, whichever is dropped last.
#[derive(Default)]
pub struct GaugeCells {
    cells: Mutex<HashMap<MetricName, Arc<ObservedGauge>>>,
}

impl GaugeCells {
    /// Creates an empty `GaugeCells`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a handle over the cell of `name`.
    ///
    /// If `name` has no cell yet, `declare` is called to declare the gauge with the backend and
    /// the callback reading the new cell is registered on the result. Nothing is kept when either
    /// step fails, so a later call tries again.
    pub fn get_or_register<F>(&self, name: &MetricName, declare: F) -> Result<Gauge, BackendError>
    where
        F: FnOnce() -> Result<Box<dyn PendingGauge>, BackendError>,
    {
        let mut cells = self.cells.lock();
        if let Some(gauge) = cells.get(name) {
            return Ok(Gauge::from_arc(Arc::clone(gauge)));
        }

        let pending = declare()?;
        let cell = Arc::new(AtomicGauge::new());
        let reader = Arc::clone(&cell);
        let registration = pending.register_callback(Box::new(move |observer: &dyn Observer| {
            observer.observe(reader.get());
        }))?;

        let gauge = Arc::new(ObservedGauge { cell, _registration: registration });
        cells.insert(name.clone(), Arc::clone(&gauge));
        Ok(Gauge::from_arc(gauge))
    }

    /// Returns the number of registered gauges.
    pub fn len(&self) -> usize {
        self.cells.lock().len()
    }

    /// Returns `true` if no gauge was registered yet.
    pub fn is_empty(&self) -> bool {
        self.cells.lock().is_empty()
    }
}

impl fmt::Debug for GaugeCells {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GaugeCells").field("len", &self.len()).finish()
    }
}

/// The writer side of an observable gauge.
struct ObservedGauge {
    cell: Arc<AtomicGauge>,
    _registration: Registration,
}

impl GaugeFn for ObservedGauge {
    fn set(&self, value: f64) {
        self.cell.set(value)
    }

    fn inc(&self) {
        self.cell.inc()
    }

    fn dec(&self) {
        self.cell.dec()
    }

    fn add(&self, value: f64) {
        self.cell.add(value)
    }

    fn sub(&self, value: f64) {
        self.cell.sub(value)
    }
}
