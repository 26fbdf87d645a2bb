use notebox_web::configuration::CONFIGURATION;
use notebox_web::startup::run;
use notebox_web::telemetry::{get_otlp_tracer, get_subscriber, init_tracing};
use std::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber(&CONFIGURATION).with(tracing_subscriber::fmt::layer());
    match get_otlp_tracer(&CONFIGURATION) {
        Some(tracer) => {
            init_tracing(subscriber.with(tracing_opentelemetry::layer().with_tracer(tracer)))
        }
        None => init_tracing(subscriber),
    }

    let address = format!("{}:{}", CONFIGURATION.host, CONFIGURATION.port);
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Listening on http://{}", address);
    run(listener, CONFIGURATION.get_note_store(), &CONFIGURATION)?.await
}
