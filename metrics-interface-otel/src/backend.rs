use std::sync::Arc;

use metrics_interface::{Counter, CreatorFactory, Histogram};
use metrics_interface_util::{
    creator_factory, Backend, BackendError, GaugeCells, InstrumentKind, MetricName, PendingGauge,
};
use opentelemetry::metrics::{Meter, MeterProvider};
use opentelemetry::{global, InstrumentationScope, KeyValue};
use tracing::debug;

use crate::instruments::{OtelCounter, OtelHistogram, OtelPendingGauge};
use crate::validation::{validate_boundaries, validate_name};

enum Provider {
    /// Whatever provider is installed globally at the time a meter is needed.
    Global,
    Custom(Arc<dyn MeterProvider + Send + Sync>),
}

/// A [`Backend`] building OpenTelemetry instruments.
///
/// Each metric namespace maps to one meter, named after the namespace, and each leaf name to an
/// instrument of that meter. Counters become synchronous `f64` counters, histograms and summaries
/// become `f64` histograms, and gauges become observable `f64` gauges whose callback reads the
/// value held by the gauge handle.
///
/// Meters of a custom provider are created lazily and cached. Meters of the global provider are
/// looked up again for every instrument, so instruments built after the global provider is
/// replaced go to the new one.
///
/// The backend remembers the kind every name was first built as, and rejects building it again as
/// another kind. Each gauge name is declared once: every gauge handle built for it writes into the
/// cell reported by that one observable gauge.
pub struct OtelBackend {
    provider: Provider,
    attributes: Arc<[KeyValue]>,
    meters: scc::HashMap<String, Meter>,
    kinds: scc::HashMap<(String, String), InstrumentKind>,
    gauges: GaugeCells,
}

impl OtelBackend {
    /// Creates an `OtelBackend` using the global meter provider.
    pub fn global() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for configuring an `OtelBackend`.
    pub fn builder() -> OtelBackendBuilder {
        OtelBackendBuilder::default()
    }

    /// Returns a [`CreatorFactory`] building creators over this backend.
    pub fn into_factory(self) -> CreatorFactory {
        creator_factory(Arc::new(self))
    }

    fn meter(&self, namespace: &str) -> Meter {
        let scope = || InstrumentationScope::builder(namespace.to_string()).build();
        match &self.provider {
            Provider::Global => global::meter_with_scope(scope()),
            Provider::Custom(provider) => self
                .meters
                .entry(namespace.to_string())
                .or_insert_with(|| {
                    debug!(namespace, "Creating OpenTelemetry meter.");
                    provider.meter_with_scope(scope())
                })
                .get()
                .clone(),
        }
    }

    fn claim(&self, name: &MetricName, kind: InstrumentKind) -> Result<(), BackendError> {
        validate_name(name.leaf())?;

        let key = (name.namespace().to_string(), name.leaf().to_string());
        let existing = *self.kinds.entry(key).or_insert(kind).get();
        if existing != kind {
            return Err(BackendError::Conflict { name: name.full_name(), existing });
        }

        Ok(())
    }
}

impl Backend for OtelBackend {
    fn counter(&self, name: &MetricName, description: &str) -> Result<Counter, BackendError> {
        self.claim(name, InstrumentKind::Counter)?;

        let counter = self
            .meter(name.namespace())
            .f64_counter(name.leaf().to_string())
            .with_description(description.to_string())
            .build();
        Ok(Counter::from_arc(Arc::new(OtelCounter::new(counter, Arc::clone(&self.attributes)))))
    }

    fn histogram(
        &self,
        name: &MetricName,
        description: &str,
        boundaries: &[f64],
    ) -> Result<Histogram, BackendError> {
        validate_boundaries(boundaries)?;
        self.claim(name, InstrumentKind::Histogram)?;

        let meter = self.meter(name.namespace());
        let builder =
            meter.f64_histogram(name.leaf().to_string()).with_description(description.to_string());
        let builder = if boundaries.is_empty() {
            builder
        } else {
            builder.with_boundaries(boundaries.to_vec())
        };

        let histogram = OtelHistogram::new(builder.build(), Arc::clone(&self.attributes));
        Ok(Histogram::from_arc(Arc::new(histogram)))
    }

    fn observable_gauge(
        &self,
        name: &MetricName,
        description: &str,
    ) -> Result<Box<dyn PendingGauge>, BackendError> {
        self.claim(name, InstrumentKind::Gauge)?;

        Ok(Box::new(OtelPendingGauge::new(
            self.meter(name.namespace()),
            name.leaf().to_string(),
            description.to_string(),
            Arc::clone(&self.attributes),
        )))
    }

    fn gauge_cells(&self) -> &GaugeCells {
        &self.gauges
    }
}

/// Builder for [`OtelBackend`].
#[derive(Default)]
pub struct OtelBackendBuilder {
    provider: Option<Arc<dyn MeterProvider + Send + Sync>>,
    attributes: Vec<KeyValue>,
}

impl OtelBackendBuilder {
    /// Sets the meter provider to build instruments from.
    ///
    /// Defaults to the global meter provider, looked up whenever an instrument is built.
    pub fn with_meter_provider<P>(mut self, provider: P) -> Self
    where
        P: MeterProvider + Send + Sync + 'static,
    {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Adds an attribute attached to every measurement.
    pub fn with_attribute(mut self, attribute: KeyValue) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Adds attributes attached to every measurement.
    pub fn with_attributes<I>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = KeyValue>,
    {
        self.attributes.extend(attributes);
        self
    }

    /// Builds the `OtelBackend`.
    pub fn build(self) -> OtelBackend {
        OtelBackend {
            provider: self.provider.map_or(Provider::Global, Provider::Custom),
            attributes: self.attributes.into(),
            meters: scc::HashMap::new(),
            kinds: scc::HashMap::new(),
            gauges: GaugeCells::new(),
        }
    }
}
