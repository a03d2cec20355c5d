//! OpenTelemetry instrument wrappers for metrics-interface traits.

use std::sync::Arc;

use metrics_interface::{CounterFn, HistogramFn};
use metrics_interface_util::{BackendError, GaugeCallback, Observer, PendingGauge, Registration};
use opentelemetry::metrics::{AsyncInstrument, Counter, Histogram, Meter};
use opentelemetry::KeyValue;

pub struct OtelCounter {
    counter: Counter<f64>,
    attributes: Arc<[KeyValue]>,
}

impl OtelCounter {
    pub fn new(counter: Counter<f64>, attributes: Arc<[KeyValue]>) -> Self {
        Self { counter, attributes }
    }
}

impl CounterFn for OtelCounter {
    fn add(&self, value: f64) {
        self.counter.add(value, &self.attributes);
    }
}

pub struct OtelHistogram {
    histogram: Histogram<f64>,
    attributes: Arc<[KeyValue]>,
}

impl OtelHistogram {
    pub fn new(histogram: Histogram<f64>, attributes: Arc<[KeyValue]>) -> Self {
        Self { histogram, attributes }
    }
}

impl HistogramFn for OtelHistogram {
    fn observe(&self, value: f64) {
        self.histogram.record(value, &self.attributes);
    }
}

/// An observable gauge whose callback is attached when it gets built.
///
/// OpenTelemetry takes the callback as part of the instrument declaration, so declaring the gauge
/// only captures what is needed to build it later.
pub struct OtelPendingGauge {
    meter: Meter,
    name: String,
    description: String,
    attributes: Arc<[KeyValue]>,
}

impl OtelPendingGauge {
    pub fn new(
        meter: Meter,
        name: String,
        description: String,
        attributes: Arc<[KeyValue]>,
    ) -> Self {
        Self { meter, name, description, attributes }
    }
}

impl PendingGauge for OtelPendingGauge {
    fn register_callback(
        self: Box<Self>,
        callback: GaugeCallback,
    ) -> Result<Registration, BackendError> {
        let attributes = self.attributes;
        let gauge = self
            .meter
            .f64_observable_gauge(self.name)
            .with_description(self.description)
            .with_callback(move |instrument| {
                let observer = OtelObserver { instrument, attributes: &attributes[..] };
                callback(&observer as &dyn Observer);
            })
            .build();

        Ok(Registration::new(gauge))
    }
}

struct OtelObserver<'a> {
    instrument: &'a dyn AsyncInstrument<f64>,
    attributes: &'a [KeyValue],
}

impl Observer for OtelObserver<'_> {
    fn observe(&self, value: f64) {
        self.instrument.observe(value, self.attributes);
    }
}
