use super::{image_error_handler, notestore_error_handler, parse_image, with_store, MaxImageBytes};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use notebox::errors::ImageError;
use notebox::{DataUrl, NoteDraft, NoteID, NoteStore};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct NotePostData {
    title: String,
    text: String,
    #[serde(default)]
    image: Option<String>,
}

impl NotePostData {
    /// A missing or empty `image` means no image.
    fn into_draft(self, limit: MaxImageBytes) -> Result<NoteDraft, ImageError> {
        let image = self
            .image
            .filter(|url| !url.is_empty())
            .map(|url| parse_image(&url, limit))
            .transpose()?;
        Ok(NoteDraft::new(self.title, self.text).with_image(image))
    }
}

#[get("/notes")]
#[instrument(skip(store))]
async fn list_notes(store: web::Data<NoteStore>) -> impl Responder {
    match with_store(store, |s| Ok(s.load())).await {
        Ok(notes) => HttpResponse::Ok().json(notes),
        Err(e) => notestore_error_handler(&e),
    }
}

#[delete("/notes")]
#[instrument(skip(store))]
async fn reset_notes(store: web::Data<NoteStore>) -> impl Responder {
    match with_store(store, |s| s.reset()).await {
        Ok(_) => HttpResponse::Ok().finish(),
        Err(e) => notestore_error_handler(&e),
    }
}

#[post("/note")]
#[instrument(skip(store, limit, note))]
async fn new_note(
    store: web::Data<NoteStore>,
    limit: web::Data<MaxImageBytes>,
    note: web::Json<NotePostData>,
) -> impl Responder {
    let draft = match note.into_inner().into_draft(*limit.get_ref()) {
        Ok(draft) => draft,
        Err(e) => return image_error_handler(&e),
    };
    match with_store(store, move |s| s.insert(draft)).await {
        Ok(note) => HttpResponse::Ok().json(note),
        Err(e) => notestore_error_handler(&e),
    }
}

#[get("/note/{note_id}")]
#[instrument(
    skip(store, params),
    fields(
        note_id = %params.0
    )
)]
async fn get_note(store: web::Data<NoteStore>, params: web::Path<(String,)>) -> impl Responder {
    let (note_id,) = params.into_inner();
    let id = NoteID::from(note_id);
    match with_store(store, move |s| s.get(&id)).await {
        Ok(note) => HttpResponse::Ok().json(note),
        Err(e) => notestore_error_handler(&e),
    }
}

#[put("/note/{note_id}")]
#[instrument(
    skip(store, limit, params, note),
    fields(
        note_id = %params.0
    )
)]
async fn update_note(
    store: web::Data<NoteStore>,
    limit: web::Data<MaxImageBytes>,
    params: web::Path<(String,)>,
    note: web::Json<NotePostData>,
) -> impl Responder {
    let (note_id,) = params.into_inner();
    let id = NoteID::from(note_id);
    let draft = match note.into_inner().into_draft(*limit.get_ref()) {
        Ok(draft) => draft,
        Err(e) => return image_error_handler(&e),
    };
    match with_store(store, move |s| s.update_by_id(&id, draft)).await {
        Ok(note) => HttpResponse::Ok().json(note),
        Err(e) => notestore_error_handler(&e),
    }
}

#[delete("/note/{note_id}")]
#[instrument(
    skip(store, params),
    fields(
        note_id = %params.0
    )
)]
async fn delete_note(store: web::Data<NoteStore>, params: web::Path<(String,)>) -> impl Responder {
    let (note_id,) = params.into_inner();
    let id = NoteID::from(note_id);
    match with_store(store, move |s| s.delete_by_id(&id)).await {
        Ok(note) => HttpResponse::Ok().json(note),
        Err(e) => notestore_error_handler(&e),
    }
}

#[put("/notes/{index}")]
#[instrument(
    skip(store, limit, params, note),
    fields(
        index = %params.0
    )
)]
async fn update_note_at(
    store: web::Data<NoteStore>,
    limit: web::Data<MaxImageBytes>,
    params: web::Path<(usize,)>,
    note: web::Json<NotePostData>,
) -> impl Responder {
    let (index,) = params.into_inner();
    let draft = match note.into_inner().into_draft(*limit.get_ref()) {
        Ok(draft) => draft,
        Err(e) => return image_error_handler(&e),
    };
    match with_store(store, move |s| s.update(index, draft)).await {
        Ok(note) => HttpResponse::Ok().json(note),
        Err(e) => notestore_error_handler(&e),
    }
}

#[delete("/notes/{index}")]
#[instrument(
    skip(store, params),
    fields(
        index = %params.0
    )
)]
async fn delete_note_at(store: web::Data<NoteStore>, params: web::Path<(usize,)>) -> impl Responder {
    let (index,) = params.into_inner();
    match with_store(store, move |s| s.delete(index)).await {
        Ok(note) => HttpResponse::Ok().json(note),
        Err(e) => notestore_error_handler(&e),
    }
}

/// Embed an uploaded image, sent as the raw request body, as a data URL.
#[post("/image")]
#[instrument(skip(body), fields(size = body.len()))]
async fn convert_image(body: web::Bytes) -> impl Responder {
    match DataUrl::from_bytes(&body) {
        Ok(url) => HttpResponse::Ok().json(json!({ "image": url })),
        Err(e) => HttpResponse::BadRequest().body(e.to_string()),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(list_notes)
        .service(reset_notes)
        .service(new_note)
        .service(get_note)
        .service(update_note)
        .service(delete_note)
        .service(update_note_at)
        .service(delete_note_at)
        .service(convert_image);
}
