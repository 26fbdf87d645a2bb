use crate::configuration::Settings;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::{Config, Tracer};
use opentelemetry_sdk::Resource;
use tracing::Subscriber;
use tracing_log::LogTracer;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

/// Name reported to the trace collector; debug builds of the server are kept apart.
fn service_name(configuration: &Settings) -> String {
    if configuration.debug {
        "notebox_debug".to_owned()
    } else {
        "notebox".to_owned()
    }
}

/// An OTLP tracer, if `otlpendpoint` is configured.
pub fn get_otlp_tracer(configuration: &Settings) -> Option<Tracer> {
    let end_point = configuration.otlpendpoint.as_ref()?;
    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(end_point);
    let resource = Resource::new(vec![KeyValue::new(
        "service.name",
        service_name(configuration),
    )]);
    let provider = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(Config::default().with_resource(resource))
        .install_batch(opentelemetry_sdk::runtime::TokioCurrentThread)
        .expect("Failed to create an opentelemetry_otlp tracer");
    opentelemetry::global::set_tracer_provider(provider.clone());
    Some(provider.tracer(env!("CARGO_PKG_NAME")))
}

/// `RUST_LOG` wins over `loglevel`, which wins over the debug default.
pub fn get_subscriber(
    configuration: &Settings,
) -> impl Subscriber + Send + Sync + for<'span> LookupSpan<'span> {
    let level = match (&configuration.loglevel, configuration.debug) {
        (Some(level), _) => level.as_str(),
        (None, true) => "debug",
        (None, false) => "info",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    Registry::default().with(env_filter)
}

pub fn init_tracing(subscriber: impl Subscriber + Send + Sync + for<'span> LookupSpan<'span>) {
    LogTracer::init().expect("Failed to init LogTracer");
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set the default tracing subscriber");
}
