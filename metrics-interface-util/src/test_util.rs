use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};

use metrics_interface::{
    atomics::AtomicGauge, Counter, CounterFn, Creator, Gauge, GaugeFn, Histogram, HistogramFn,
    Summary, SummaryFn, SummaryOpts,
};
use mockall::mock;
use tracing::{
    field::{Field, Visit},
    Event, Level, Subscriber,
};
use tracing_subscriber::{
    layer::{Context, SubscriberExt},
    Layer,
};

use crate::{
    Backend, BackendError, GaugeCallback, GaugeCells, MetricName, Observer, PendingGauge,
    Registration,
};

mock! {
    pub BasicCreator {}

    impl Creator for BasicCreator {
        fn counter(&self) -> Counter;
        fn gauge(&self) -> Gauge;
        fn histogram(&self, buckets: &[f64]) -> Histogram;
        fn summary(&self, opts: &SummaryOpts) -> Summary;
    }
}

mock! {
    pub CounterHandler {}

    impl CounterFn for CounterHandler {
        fn inc(&self);
        fn add(&self, value: f64);
    }
}

mock! {
    pub GaugeHandler {}

    impl GaugeFn for GaugeHandler {
        fn set(&self, value: f64);
        fn inc(&self);
        fn dec(&self);
        fn add(&self, value: f64);
        fn sub(&self, value: f64);
    }
}

mock! {
    pub HistogramHandler {}

    impl HistogramFn for HistogramHandler {
        fn observe(&self, value: f64);
    }
}

mock! {
    pub SummaryHandler {}

    impl SummaryFn for SummaryHandler {
        fn observe(&self, value: f64);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Counter(String, String, String),
    Histogram(String, String, String, Vec<f64>),
    Gauge(String, String, String),
}

type Callbacks = Arc<Mutex<Vec<(u64, Arc<GaugeCallback>)>>>;

/// A backend recording every construction request, optionally failing them.
#[derive(Default)]
pub struct ScriptedBackend {
    calls: Mutex<Vec<Call>>,
    counter_total: Arc<AtomicGauge>,
    observations: Arc<Mutex<Vec<f64>>>,
    callbacks: Callbacks,
    next_id: Arc<AtomicU64>,
    gauges: GaugeCells,
    fail_instruments: bool,
    fail_callbacks: bool,
}

impl ScriptedBackend {
    pub fn failing() -> Self {
        Self { fail_instruments: true, ..Self::default() }
    }

    pub fn failing_callbacks() -> Self {
        Self { fail_callbacks: true, ..Self::default() }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn counter_total(&self) -> f64 {
        self.counter_total.get()
    }

    pub fn observations(&self) -> Vec<f64> {
        self.observations.lock().unwrap().clone()
    }

    pub fn live_registrations(&self) -> usize {
        self.callbacks.lock().unwrap().len()
    }

    /// Runs a collection cycle, returning what each live gauge callback reported.
    pub fn collect(&self) -> Vec<f64> {
        let callbacks: Vec<_> =
            self.callbacks.lock().unwrap().iter().map(|(_, cb)| Arc::clone(cb)).collect();

        let collected = Collected::default();
        let observer: &dyn Observer = &collected;
        for callback in callbacks {
            (*callback)(observer);
        }
        collected.0.into_inner().unwrap()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn rejection(name: &MetricName) -> BackendError {
        BackendError::InvalidName { name: name.full_name(), reason: "rejected by test backend" }
    }
}

#[derive(Default)]
struct Collected(Mutex<Vec<f64>>);

impl Observer for Collected {
    fn observe(&self, value: f64) {
        self.0.lock().unwrap().push(value);
    }
}

struct SumCounter(Arc<AtomicGauge>);

impl CounterFn for SumCounter {
    fn add(&self, value: f64) {
        self.0.add(value);
    }
}

struct VecHistogram(Arc<Mutex<Vec<f64>>>);

impl HistogramFn for VecHistogram {
    fn observe(&self, value: f64) {
        self.0.lock().unwrap().push(value);
    }
}

struct ScriptedPendingGauge {
    callbacks: Callbacks,
    next_id: Arc<AtomicU64>,
    fail: bool,
}

impl PendingGauge for ScriptedPendingGauge {
    fn register_callback(
        self: Box<Self>,
        callback: GaugeCallback,
    ) -> Result<Registration, BackendError> {
        if self.fail {
            return Err(BackendError::Callback("rejected by test backend".into()));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.callbacks.lock().unwrap().push((id, Arc::new(callback)));
        Ok(Registration::new(Unregister { id, callbacks: self.callbacks }))
    }
}

struct Unregister {
    id: u64,
    callbacks: Callbacks,
}

impl Drop for Unregister {
    fn drop(&mut self) {
        self.callbacks.lock().unwrap().retain(|(id, _)| *id != self.id);
    }
}

impl Backend for ScriptedBackend {
    fn counter(&self, name: &MetricName, description: &str) -> Result<Counter, BackendError> {
        self.record(Call::Counter(
            name.namespace().into(),
            name.leaf().into(),
            description.into(),
        ));
        if self.fail_instruments {
            return Err(Self::rejection(name));
        }
        Ok(Counter::from_arc(Arc::new(SumCounter(Arc::clone(&self.counter_total)))))
    }

    fn histogram(
        &self,
        name: &MetricName,
        description: &str,
        boundaries: &[f64],
    ) -> Result<Histogram, BackendError> {
        self.record(Call::Histogram(
            name.namespace().into(),
            name.leaf().into(),
            description.into(),
            boundaries.to_vec(),
        ));
        if self.fail_instruments {
            return Err(Self::rejection(name));
        }
        Ok(Histogram::from_arc(Arc::new(VecHistogram(Arc::clone(&self.observations)))))
    }

    fn observable_gauge(
        &self,
        name: &MetricName,
        description: &str,
    ) -> Result<Box<dyn PendingGauge>, BackendError> {
        self.record(Call::Gauge(name.namespace().into(), name.leaf().into(), description.into()));
        if self.fail_instruments {
            return Err(Self::rejection(name));
        }
        Ok(Box::new(ScriptedPendingGauge {
            callbacks: Arc::clone(&self.callbacks),
            next_id: Arc::clone(&self.next_id),
            fail: self.fail_callbacks,
        }))
    }

    fn gauge_cells(&self) -> &GaugeCells {
        &self.gauges
    }
}

struct WarnRecorder(Arc<Mutex<Vec<String>>>);

impl<S: Subscriber> Layer<S> for WarnRecorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            let mut kind = KindField::default();
            event.record(&mut kind);
            self.0.lock().unwrap().push(kind.0.unwrap_or_default());
        }
    }
}

#[derive(Default)]
struct KindField(Option<String>);

impl Visit for KindField {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "kind" {
            self.0 = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "kind" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

/// Runs `f`, collecting the `kind` field of every warning it logs on the current thread.
pub fn capture_warning_kinds<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    let kinds = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(WarnRecorder(Arc::clone(&kinds)));
    let result = tracing::subscriber::with_default(subscriber, f);
    let kinds = kinds.lock().unwrap().clone();
    (result, kinds)
}

/// Runs `f`, counting the warnings it logs on the current thread.
pub fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, usize) {
    let (result, kinds) = capture_warning_kinds(f);
    (result, kinds.len())
}
