//! An OpenTelemetry backend for `metrics-interface`.
//!
//! Metric names are dotted paths. The part before the last `.` names the OpenTelemetry meter and
//! the part after it names the instrument: `foo.bar.has_total` becomes the `has_total`
//! instrument of the `foo.bar` meter. Names without a `.` go to the `default` meter.
//!
//! Gauges are recorded into an atomic cell and reported through an observable gauge callback on
//! each collection. Summaries are recorded as histograms. Instruments OpenTelemetry would reject
//! are replaced by no-ops and a warning is logged through `tracing`.
//!
//! ```rust,no_run
//! use opentelemetry_sdk::metrics::SdkMeterProvider;
//!
//! let provider = SdkMeterProvider::default();
//! opentelemetry::global::set_meter_provider(provider);
//!
//! metrics_interface_otel::inject().expect("failed to inject metrics implementation");
//!
//! let creator = metrics_interface::new("my_app.requests", "Requests served.");
//! creator.counter().inc();
//! ```
#![cfg_attr(docsrs, feature(doc_cfg), deny(rustdoc::broken_intra_doc_links))]
#![deny(missing_docs)]

mod backend;
pub use self::backend::{OtelBackend, OtelBackendBuilder};

mod instruments;
mod validation;

use std::{
    iter,
    sync::{Arc, OnceLock},
};

use metrics_interface::{inject_impl, Creator, CreatorFactory, InjectError};
use metrics_interface_util::{creator_factory, split, BackendCreator};

/// Gets the backend shared by every creator built over the global meter provider.
fn global_backend() -> Arc<OtelBackend> {
    static BACKEND: OnceLock<Arc<OtelBackend>> = OnceLock::new();
    Arc::clone(BACKEND.get_or_init(|| Arc::new(OtelBackend::global())))
}

/// Creates the [`Creator`] for a metric, backed by the global meter provider.
///
/// Every creator built this way, by [`factory`], or by the injected implementation, shares one
/// [`OtelBackend`]: gauges built for the same name write into the same cell.
///
/// This matches the [`CreatorFactory`] signature, so it can be used wherever a factory is
/// expected.
pub fn new_creator(name: &str, help: &str) -> Box<dyn Creator> {
    Box::new(BackendCreator::new(global_backend(), name, help))
}

/// Installs OpenTelemetry, through the global meter provider, as the process-wide metrics
/// implementation.
///
/// Install the meter provider with [`opentelemetry::global::set_meter_provider`] before building
/// instruments: instruments built earlier are bound to the no-op provider for good.
///
/// # Errors
///
/// Fails if an implementation was already injected.
pub fn inject() -> Result<(), InjectError> {
    inject_impl(creator_factory(global_backend()))
}

/// Installs OpenTelemetry alongside other implementations as the process-wide metrics
/// implementation.
///
/// Every metric is mirrored to OpenTelemetry first, then to each of `others` in order. The meter
/// provider must be installed first, as with [`inject`].
///
/// # Errors
///
/// Fails if an implementation was already injected.
pub fn inject_split<I>(others: I) -> Result<(), InjectError>
where
    I: IntoIterator<Item = CreatorFactory>,
{
    let otel = creator_factory(global_backend());
    inject_impl(split(iter::once(otel).chain(others)))
}

/// Returns [`new_creator`] as a [`CreatorFactory`].
pub fn factory() -> CreatorFactory {
    Arc::new(new_creator)
}
