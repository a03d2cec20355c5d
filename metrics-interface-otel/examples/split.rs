use std::sync::Arc;
use std::time::Duration;

use metrics_interface_util::{creator_factory, DebuggingBackend};
use opentelemetry_sdk::metrics::{InMemoryMetricExporter, PeriodicReader, SdkMeterProvider};

fn main() {
    tracing_subscriber::fmt::init();

    let exporter = InMemoryMetricExporter::default();
    let reader =
        PeriodicReader::builder(exporter.clone()).with_interval(Duration::from_secs(60)).build();
    let provider = SdkMeterProvider::builder().with_reader(reader).build();
    opentelemetry::global::set_meter_provider(provider.clone());

    let debugging = Arc::new(DebuggingBackend::new());
    let snapshotter = debugging.snapshotter();
    metrics_interface_otel::inject_split([creator_factory(debugging)])
        .expect("failed to inject metrics implementation");

    let requests = metrics_interface::new("demo.http.requests_total", "Requests served.");
    let inflight = metrics_interface::new("demo.http.inflight", "Requests in flight.");
    let latency = metrics_interface::new("demo.http.latency_seconds", "Request latency.");
    // Rejected by OpenTelemetry: the leaf must start with a letter. Logs a warning.
    let broken = metrics_interface::new("demo.2xx", "Successful responses.");

    let counter = requests.counter();
    let gauge = inflight.gauge();
    let histogram = latency.histogram(&[0.005, 0.05, 0.5, 5.0]);
    let broken = broken.counter();

    for i in 0..10u32 {
        gauge.inc();
        counter.inc();
        histogram.observe(f64::from(i) * 0.01);
        broken.inc();
        gauge.dec();
    }
    gauge.set(2.0);

    provider.force_flush().expect("failed to flush metrics");

    for resource_metrics in exporter.get_finished_metrics().expect("failed to read metrics") {
        for scope in resource_metrics.scope_metrics() {
            for metric in scope.metrics() {
                println!("otel: {}/{}", scope.scope().name(), metric.name());
            }
        }
    }

    for (name, description, value) in snapshotter.snapshot().into_vec() {
        println!("debugging: {name} ({description}) = {value:?}");
    }
}
