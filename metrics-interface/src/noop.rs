use crate::{
    Counter, CounterFn, Creator, Gauge, GaugeFn, Histogram, HistogramFn, Summary, SummaryFn,
    SummaryOpts,
};

/// A no-op instrument and creator.
///
/// Every recording method discards its input, and every creator method hands back a no-op
/// handle, so chains of fallbacks always end here. Used as the default implementation when none
/// has been injected yet, and by creators whose backend refused to build an instrument.
#[derive(Clone, Copy, Debug, Default)]
pub struct Noop;

impl Creator for Noop {
    fn counter(&self) -> Counter {
        Counter::noop()
    }

    fn gauge(&self) -> Gauge {
        Gauge::noop()
    }

    fn histogram(&self, _buckets: &[f64]) -> Histogram {
        Histogram::noop()
    }

    fn summary(&self, _opts: &SummaryOpts) -> Summary {
        Summary::noop()
    }
}

impl CounterFn for Noop {
    fn inc(&self) {}
    fn add(&self, _value: f64) {}
}

impl GaugeFn for Noop {
    fn set(&self, _value: f64) {}
    fn inc(&self) {}
    fn dec(&self) {}
    fn add(&self, _value: f64) {}
    fn sub(&self, _value: f64) {}
}

impl HistogramFn for Noop {
    fn observe(&self, _value: f64) {}
}

impl SummaryFn for Noop {
    fn observe(&self, _value: f64) {}
}
