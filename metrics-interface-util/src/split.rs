use std::sync::Arc;

use metrics_interface::{
    Counter, CounterFn, Creator, CreatorFactory, Gauge, GaugeFn, Histogram, HistogramFn, Summary,
    SummaryFn, SummaryOpts,
};

/// Mirrors every instrument to multiple creators.
///
/// Each instrument built by a `Split` is itself built from one instrument per wrapped creator,
/// and forwards every recorded value to all of them, in the order the creators were added. A
/// `Split` with no creators builds instruments that record nowhere.
///
/// Splits nest: a wrapped creator may itself be a `Split`.
pub struct Split {
    creators: Vec<Box<dyn Creator>>,
}

impl Split {
    /// Creates a new `Split` over the given creators.
    pub fn new(creators: Vec<Box<dyn Creator>>) -> Self {
        Self { creators }
    }

    /// Returns the number of wrapped creators.
    pub fn len(&self) -> usize {
        self.creators.len()
    }

    /// Returns `true` if no creators are wrapped.
    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }
}

impl Creator for Split {
    fn counter(&self) -> Counter {
        let counters = self.creators.iter().map(|c| c.counter()).collect();
        Counter::from_arc(Arc::new(SplitCounter { counters }))
    }

    fn gauge(&self) -> Gauge {
        let gauges = self.creators.iter().map(|c| c.gauge()).collect();
        Gauge::from_arc(Arc::new(SplitGauge { gauges }))
    }

    fn histogram(&self, buckets: &[f64]) -> Histogram {
        let histograms = self.creators.iter().map(|c| c.histogram(buckets)).collect();
        Histogram::from_arc(Arc::new(SplitHistogram { histograms }))
    }

    fn summary(&self, opts: &SummaryOpts) -> Summary {
        let summaries = self.creators.iter().map(|c| c.summary(opts)).collect();
        Summary::from_arc(Arc::new(SplitSummary { summaries }))
    }
}

/// A builder for [`Split`].
#[derive(Default)]
pub struct SplitBuilder {
    creators: Vec<Box<dyn Creator>>,
}

impl SplitBuilder {
    /// Adds a creator to the split list.
    pub fn add_creator<C>(mut self, creator: C) -> SplitBuilder
    where
        C: Creator + 'static,
    {
        self.creators.push(Box::new(creator));
        self
    }

    /// Builds the `Split`.
    pub fn build(self) -> Split {
        Split::new(self.creators)
    }
}

/// Combines several factories into one whose creators are [`Split`]s over each of them.
///
/// The resulting factory can be injected process-wide to mirror every metric across several
/// backends.
pub fn split<I>(factories: I) -> CreatorFactory
where
    I: IntoIterator<Item = CreatorFactory>,
{
    let factories: Vec<CreatorFactory> = factories.into_iter().collect();
    Arc::new(move |name: &str, help: &str| -> Box<dyn Creator> {
        Box::new(Split::new(factories.iter().map(|factory| factory(name, help)).collect()))
    })
}

struct SplitCounter {
    counters: Vec<Counter>,
}

impl CounterFn for SplitCounter {
    fn inc(&self) {
        for counter in &self.counters {
            counter.inc();
        }
    }

    fn add(&self, value: f64) {
        for counter in &self.counters {
            counter.add(value);
        }
    }
}

struct SplitGauge {
    gauges: Vec<Gauge>,
}

impl GaugeFn for SplitGauge {
    fn set(&self, value: f64) {
        for gauge in &self.gauges {
            gauge.set(value);
        }
    }

    fn inc(&self) {
        for gauge in &self.gauges {
            gauge.inc();
        }
    }

    fn dec(&self) {
        for gauge in &self.gauges {
            gauge.dec();
        }
    }

    fn add(&self, value: f64) {
        for gauge in &self.gauges {
            gauge.add(value);
        }
    }

    fn sub(&self, value: f64) {
        for gauge in &self.gauges {
            gauge.sub(value);
        }
    }
}

struct SplitHistogram {
    histograms: Vec<Histogram>,
}

impl HistogramFn for SplitHistogram {
    fn observe(&self, value: f64) {
        for histogram in &self.histograms {
            histogram.observe(value);
        }
    }
}

struct SplitSummary {
    summaries: Vec<Summary>,
}

impl SummaryFn for SplitSummary {
    fn observe(&self, value: f64) {
        for summary in &self.summaries {
            summary.observe(value);
        }
    }
}
