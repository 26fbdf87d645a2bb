use crate::configuration::Settings;
use crate::routes::*;
use actix_files::Files;
use actix_web::dev::Server;
use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::web::Data;
use actix_web::{web, App, HttpServer};
use notebox::NoteStore;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub fn run(
    listener: TcpListener,
    note_store: NoteStore,
    settings: &Settings,
) -> Result<Server, std::io::Error> {
    let ns: Data<NoteStore> = Data::new(note_store);
    let image_limit = Data::new(MaxImageBytes(settings.maximagebytes));
    let debug = settings.debug;
    let static_dir = settings.staticdir.clone();
    let max_image_bytes = settings.maximagebytes;
    // Base64 inflates images by a third, plus room for the text fields
    let max_form_bytes = max_image_bytes / 3 * 4 + 1024 * 1024;
    let server = HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::new(TrailingSlash::Trim))
            .wrap(TracingLogger::default())
            .app_data(web::PayloadConfig::new(max_image_bytes))
            .app_data(web::JsonConfig::default().limit(max_form_bytes))
            .app_data(web::FormConfig::default().limit(max_form_bytes))
            .service(web::scope("/api/v1").configure(api_v1_config))
            .configure(index_config)
            .configure(notes_config)
            .configure(|cfg| {
                if !debug {
                    cfg.service(Files::new("/static", static_dir.clone()));
                }
            })
            .app_data(ns.clone())
            .app_data(image_limit.clone())
    })
    .listen(listener)?
    .run();
    Ok(server)
}
