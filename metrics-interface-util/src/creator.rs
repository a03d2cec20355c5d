use std::sync::Arc;

use metrics_interface::{
    Counter, Creator, CreatorFactory, Gauge, Histogram, Noop, Summary, SummaryFn, SummaryOpts,
};
use tracing::warn;

use crate::{Backend, BackendError, InstrumentKind, MetricName};

/// A [`Creator`] building instruments with a [`Backend`].
///
/// The full metric name is split into a namespace and a leaf name once, at construction. Every
/// instrument is then built from the backend using that pair and the help text.
///
/// Backend failures never reach the caller: they are logged as warnings and the corresponding
/// [`Noop`] instrument is returned instead.
///
/// Gauges are backed by the cell the backend keeps for their name in its
/// [`GaugeCells`](crate::GaugeCells). The handle returned to the caller writes into that cell, and
/// the callback registered with the backend reads that very same cell whenever the backend
/// collects.
pub struct BackendCreator<B> {
    backend: B,
    name: MetricName,
    description: String,
}

impl<B: Backend> BackendCreator<B> {
    /// Creates a new `BackendCreator` for the given metric.
    pub fn new(backend: B, full_name: &str, description: &str) -> Self {
        Self { backend, name: MetricName::parse(full_name), description: description.to_string() }
    }

    /// Gets the resolved metric name.
    pub fn name(&self) -> &MetricName {
        &self.name
    }

    /// Gets the help text.
    pub fn description(&self) -> &str {
        &self.description
    }

    fn warn_fallback(&self, kind: InstrumentKind, error: &BackendError) {
        warn!(
            namespace = self.name.namespace(),
            instrument = self.name.leaf(),
            kind = kind.as_str(),
            %error,
            "Failed to create instrument, falling back to no-op."
        );
    }
}

impl<B: Backend> Creator for BackendCreator<B> {
    fn counter(&self) -> Counter {
        self.backend.counter(&self.name, &self.description).unwrap_or_else(|e| {
            self.warn_fallback(InstrumentKind::Counter, &e);
            Noop.counter()
        })
    }

    fn gauge(&self) -> Gauge {
        let declare = || self.backend.observable_gauge(&self.name, &self.description);
        self.backend.gauge_cells().get_or_register(&self.name, declare).unwrap_or_else(|e| {
            self.warn_fallback(InstrumentKind::Gauge, &e);
            Noop.gauge()
        })
    }

    fn histogram(&self, buckets: &[f64]) -> Histogram {
        self.backend.histogram(&self.name, &self.description, buckets).unwrap_or_else(|e| {
            self.warn_fallback(InstrumentKind::Histogram, &e);
            Noop.histogram(buckets)
        })
    }

    fn summary(&self, opts: &SummaryOpts) -> Summary {
        // No native summary: quantile objectives are dropped and observations go to a plain
        // histogram with backend-chosen buckets.
        match self.backend.histogram(&self.name, &self.description, &[]) {
            Ok(histogram) => Summary::from_arc(Arc::new(HistogramSummary(histogram))),
            Err(e) => {
                self.warn_fallback(InstrumentKind::Summary, &e);
                Noop.summary(opts)
            }
        }
    }
}

/// Returns a [`CreatorFactory`] that builds a [`BackendCreator`] over `backend` for each metric.
pub fn creator_factory<B>(backend: Arc<B>) -> CreatorFactory
where
    B: Backend + 'static,
{
    Arc::new(move |name: &str, help: &str| -> Box<dyn Creator> {
        Box::new(BackendCreator::new(Arc::clone(&backend), name, help))
    })
}

struct HistogramSummary(Histogram);

impl SummaryFn for HistogramSummary {
    fn observe(&self, value: f64) {
        self.0.observe(value)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use metrics_interface::{Creator, SummaryOpts};

    use super::{creator_factory, BackendCreator};
    use crate::test_util::{capture_warning_kinds, capture_warnings, Call, ScriptedBackend};

    #[test]
    fn resolves_name_once() {
        let backend = Arc::new(ScriptedBackend::default());
        let creator = BackendCreator::new(Arc::clone(&backend), "foo.bar.has_total", "help");

        assert_eq!(creator.name().namespace(), "foo.bar");
        assert_eq!(creator.name().leaf(), "has_total");
        assert_eq!(creator.description(), "help");

        let _ = creator.counter();
        let _ = creator.histogram(&[1.0]);
        assert_eq!(
            backend.calls(),
            vec![
                Call::Counter("foo.bar".into(), "has_total".into(), "help".into()),
                Call::Histogram("foo.bar".into(), "has_total".into(), "help".into(), vec![1.0]),
            ]
        );
    }

    #[test]
    fn counter_and_histogram_reach_backend() {
        let backend = Arc::new(ScriptedBackend::default());
        let creator = BackendCreator::new(Arc::clone(&backend), "app.requests", "Requests.");

        let counter = creator.counter();
        counter.inc();
        counter.add(2.5);
        assert_eq!(backend.counter_total(), 3.5);

        creator.histogram(&[]).observe(0.25);
        assert_eq!(backend.observations(), vec![0.25]);
    }

    #[test]
    fn summary_is_a_histogram_without_buckets() {
        let backend = Arc::new(ScriptedBackend::default());
        let creator = BackendCreator::new(Arc::clone(&backend), "app.latency", "Latency.");

        let opts = SummaryOpts::with_objectives([(0.5, 0.05), (0.99, 0.001)]);
        let summary = creator.summary(&opts);
        assert!(!summary.is_noop());
        summary.observe(12.0);
        summary.observe(13.0);

        assert_eq!(backend.observations(), vec![12.0, 13.0]);
        assert_eq!(
            backend.calls(),
            vec![Call::Histogram("app".into(), "latency".into(), "Latency.".into(), vec![])]
        );
    }

    #[test]
    fn gauge_writer_and_callback_share_cell() {
        let backend = Arc::new(ScriptedBackend::default());
        let creator = BackendCreator::new(Arc::clone(&backend), "app.queue_depth", "Depth.");

        let gauge = creator.gauge();
        assert!(!gauge.is_noop());
        assert_eq!(backend.collect(), vec![0.0]);

        gauge.set(3.5);
        assert_eq!(backend.collect(), vec![3.5]);

        gauge.inc();
        gauge.add(2.0);
        gauge.sub(0.5);
        gauge.dec();
        assert_eq!(backend.collect(), vec![5.0]);
    }

    #[test]
    fn repeated_gauges_share_one_cell() {
        let backend = Arc::new(ScriptedBackend::default());
        let factory = creator_factory(Arc::clone(&backend));

        let first = factory("app.pool", "Pool.").gauge();
        let second = factory("app.pool", "Pool.").gauge();
        first.set(5.0);
        assert_eq!(backend.collect(), vec![5.0]);

        second.add(1.0);
        assert_eq!(backend.collect(), vec![6.0]);
        assert_eq!(backend.live_registrations(), 1);
        assert_eq!(
            backend.calls(),
            vec![Call::Gauge("app".into(), "pool".into(), "Pool.".into())]
        );
    }

    #[test]
    fn gauge_cell_outlives_its_handles() {
        let backend = Arc::new(ScriptedBackend::default());
        let creator = BackendCreator::new(Arc::clone(&backend), "app.sessions", "Sessions.");

        let gauge = creator.gauge();
        gauge.set(4.0);
        drop(gauge);
        assert_eq!(backend.live_registrations(), 1);
        assert_eq!(backend.collect(), vec![4.0]);

        creator.gauge().inc();
        assert_eq!(backend.collect(), vec![5.0]);
    }

    #[test]
    fn construction_failures_fall_back_to_noop() {
        let backend = Arc::new(ScriptedBackend::failing());
        let creator = BackendCreator::new(Arc::clone(&backend), "app.broken", "Broken.");

        let (handles, kinds) = capture_warning_kinds(|| {
            (
                creator.counter(),
                creator.gauge(),
                creator.histogram(&[1.0, 2.0]),
                creator.summary(&SummaryOpts::default()),
            )
        });
        let (counter, gauge, histogram, summary) = handles;

        assert!(counter.is_noop());
        assert!(gauge.is_noop());
        assert!(histogram.is_noop());
        assert!(summary.is_noop());
        assert_eq!(kinds, ["counter", "gauge", "histogram", "summary"]);

        // The fallbacks are fully usable.
        counter.inc();
        counter.add(1.0);
        gauge.set(f64::NAN);
        gauge.inc();
        histogram.observe(f64::INFINITY);
        summary.observe(1.0);
        assert_eq!(backend.counter_total(), 0.0);
        assert!(backend.observations().is_empty());
    }

    #[test]
    fn callback_registration_failure_discards_gauge() {
        let backend = Arc::new(ScriptedBackend::failing_callbacks());
        let creator = BackendCreator::new(Arc::clone(&backend), "app.temperature", "Temp.");

        let (gauge, warnings) = capture_warnings(|| creator.gauge());
        assert!(gauge.is_noop());
        assert_eq!(warnings, 1);
        assert_eq!(backend.live_registrations(), 0);
        assert!(backend.collect().is_empty());

        gauge.set(21.0);
    }

    #[test]
    fn factory_builds_one_creator_per_metric() {
        let backend = Arc::new(ScriptedBackend::default());
        let factory = creator_factory(Arc::clone(&backend));

        factory("a.first", "1").counter().inc();
        factory("second", "2").counter().add(2.0);

        assert_eq!(
            backend.calls(),
            vec![
                Call::Counter("a".into(), "first".into(), "1".into()),
                Call::Counter("default".into(), "second".into(), "2".into()),
            ]
        );
        assert_eq!(backend.counter_total(), 3.0);
    }
}
