//! Helper types for building and composing `metrics-interface` backends.
//!
//! - [`MetricName`] splits a dotted metric name into the namespace and leaf name that backends
//!   grouping instruments under named meters expect.
//! - [`Backend`] describes the native, fallible instrument constructors of a metrics backend, and
//!   [`BackendCreator`] turns any backend into an infallible [`Creator`](metrics_interface::Creator).
//! - [`Split`] mirrors every instrument to several creators, and [`split`] does the same at the
//!   factory level so a multi-backend setup can be injected process-wide.
//! - [`DebuggingBackend`] keeps everything in memory and exposes snapshots, which is mostly
//!   useful in tests.
#![cfg_attr(docsrs, feature(doc_cfg), deny(rustdoc::broken_intra_doc_links))]
#![deny(missing_docs)]

mod backend;
pub use self::backend::*;

mod creator;
pub use self::creator::{creator_factory, BackendCreator};

#[cfg(feature = "debugging")]
#[cfg_attr(docsrs, doc(cfg(feature = "debugging")))]
pub mod debugging;
#[cfg(feature = "debugging")]
pub use self::debugging::DebuggingBackend;

mod gauges;
pub use self::gauges::GaugeCells;

mod naming;
pub use self::naming::{MetricName, DEFAULT_NAMESPACE, SEPARATOR};

mod split;
pub use self::split::{split, Split, SplitBuilder};

#[cfg(test)]
mod test_util;
