use std::sync::Arc;

use crate::{Counter, Gauge, Histogram, Summary, SummaryOpts};

/// A factory for the instruments of a single metric.
///
/// A `Creator` is bound to one fully-qualified metric name and its help text. Each call to one of
/// its methods builds an instrument of the corresponding kind for that metric. Implementations
/// must never fail: when an instrument cannot be built, a no-op handle is returned instead.
pub trait Creator: Send + Sync {
    /// Creates a counter.
    fn counter(&self) -> Counter;

    /// Creates a gauge.
    fn gauge(&self) -> Gauge;

    /// Creates a histogram.
    ///
    /// `buckets` are upper bounds hints; backends that pick their own bucketing may ignore them.
    fn histogram(&self, buckets: &[f64]) -> Histogram;

    /// Creates a summary.
    fn summary(&self, opts: &SummaryOpts) -> Summary;
}

/// Builds the [`Creator`] for a metric given its full name and help text.
///
/// This is the shape of implementation that gets installed process-wide with
/// [`inject_impl`](crate::inject_impl).
pub type CreatorFactory = Arc<dyn Fn(&str, &str) -> Box<dyn Creator> + Send + Sync>;

// Blanket implementations.
macro_rules! impl_creator {
    ($inner_ty:ident, $ptr_ty:ty) => {
        impl<$inner_ty> $crate::Creator for $ptr_ty
        where
            $inner_ty: $crate::Creator + ?Sized,
        {
            fn counter(&self) -> $crate::Counter {
                std::ops::Deref::deref(self).counter()
            }

            fn gauge(&self) -> $crate::Gauge {
                std::ops::Deref::deref(self).gauge()
            }

            fn histogram(&self, buckets: &[f64]) -> $crate::Histogram {
                std::ops::Deref::deref(self).histogram(buckets)
            }

            fn summary(&self, opts: &$crate::SummaryOpts) -> $crate::Summary {
                std::ops::Deref::deref(self).summary(opts)
            }
        }
    };
}

impl_creator!(T, &T);
impl_creator!(T, std::boxed::Box<T>);
impl_creator!(T, std::sync::Arc<T>);

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::Creator;
    use crate::Noop;

    #[test]
    fn blanket_implementations() {
        fn is_creator<T: Creator>(_creator: T) {}

        let local = Noop;

        is_creator(Noop);
        is_creator(Arc::new(Noop));
        is_creator(Box::new(Noop));
        is_creator(&local);
        is_creator(Box::new(Noop) as Box<dyn Creator>);
    }
}
