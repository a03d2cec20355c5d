//! A backend-agnostic metrics instrumentation interface.
//!
//! Application and library code records counters, gauges, histograms and summaries through the
//! types in this crate, while the backend that actually receives the values is chosen once, at
//! startup, by injecting an implementation.
//!
//! # Instruments
//!
//! - [`Counter`]: a monotonically increasing value. Supports [`inc`](Counter::inc) and
//!   [`add`](Counter::add).
//! - [`Gauge`]: an arbitrary value. Supports [`set`](Gauge::set), [`inc`](Gauge::inc),
//!   [`dec`](Gauge::dec), [`add`](Gauge::add) and [`sub`](Gauge::sub).
//! - [`Histogram`] and [`Summary`]: a stream of observations. Support `observe`.
//!
//! Each instrument is a cheap handle over a shared handler (one of [`CounterFn`], [`GaugeFn`],
//! [`HistogramFn`] or [`SummaryFn`]), or over nothing at all when the instrument is a no-op.
//! Recording never fails and never blocks.
//!
//! # Creators
//!
//! A [`Creator`] produces the instruments of one metric, identified by its full name and help
//! text. Backends provide a [`CreatorFactory`], and applications install one with
//! [`inject_impl`]. Until that happens, [`new`] hands out [`Noop`] creators, so libraries can be
//! instrumented unconditionally.
//!
//! ```rust
//! let creator = metrics_interface::new("http.server.requests_total", "Requests served.");
//! creator.counter().inc();
//! creator.gauge().set(12.0);
//! creator.histogram(&[0.1, 0.5, 1.0]).observe(0.27);
//! ```
#![cfg_attr(docsrs, feature(doc_cfg), deny(rustdoc::broken_intra_doc_links))]
#![deny(missing_docs)]

pub mod atomics;

mod creator;
pub use self::creator::*;

mod handles;
pub use self::handles::*;

mod inject;
pub use self::inject::*;

mod noop;
pub use self::noop::Noop;

mod summary;
pub use self::summary::*;
