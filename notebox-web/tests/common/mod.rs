use lazy_static::lazy_static;
use notebox::NoteStore;
use notebox_web::configuration::{Settings, CONFIGURATION};
use notebox_web::startup::run;
use notebox_web::telemetry::{get_subscriber, init_tracing};
use std::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;

lazy_static! {
    static ref TRACING: () = {
        let subscriber = get_subscriber(&*CONFIGURATION)
            .with(tracing_subscriber::fmt::Layer::default().with_test_writer());
        init_tracing(subscriber);
    };
}

pub struct TestApp {
    pub address: String,
}

pub async fn spawn_app() -> TestApp {
    // Every app gets its own empty in-memory store
    spawn_app_with(CONFIGURATION.get_note_store(), &CONFIGURATION).await
}

pub async fn spawn_app_with(store: NoteStore, settings: &Settings) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    // We retrieve the port assigned to us by the OS
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);
    lazy_static::initialize(&TRACING);

    let server = run(listener, store, settings).expect("Failed to bind address");
    let _ = tokio::spawn(server);
    TestApp { address }
}

/// Client that leaves redirects for the test to inspect.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build client")
}
