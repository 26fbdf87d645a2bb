use super::{image_error_handler, notestore_error_handler, parse_image, with_store, MaxImageBytes};
use crate::templates::{delete_page, edit_page, notes_page, SITE_TITLE};
use actix_web::http::header::{ContentType, LOCATION};
use actix_web::http::StatusCode;
use actix_web::{get, post, web, HttpResponse, Responder};
use notebox::errors::{ImageError, NoteStoreError};
use notebox::render::{render_notes, ExpandedNote, NoteCard};
use notebox::{EditSession, NoteID, NoteStore};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
struct NoteForm {
    title: String,
    text: String,
    #[serde(default)]
    image: String,
    removeimage: Option<String>,
}

impl NoteForm {
    /// Apply the submitted fields to `session`.
    ///
    /// An empty image field keeps whatever image the session already has. A
    /// rejected image comes back with the session holding the submitted title
    /// and text, so the form can be shown again as typed.
    fn apply(
        self,
        session: EditSession,
        limit: MaxImageBytes,
    ) -> Result<EditSession, (EditSession, ImageError)> {
        let session = session.with_title(self.title).with_text(self.text);
        if self.removeimage.is_some() {
            return Ok(session.clear_image());
        }
        if self.image.is_empty() {
            return Ok(session);
        }
        match parse_image(&self.image, limit) {
            Ok(url) => Ok(session.attach_image(url)),
            Err(e) => Err((session, e)),
        }
    }
}

fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(body)
}

fn redirect_to_index() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, "/"))
        .finish()
}

fn status_of(e: &NoteStoreError) -> StatusCode {
    notestore_error_handler(e).status()
}

fn image_notice(e: &ImageError) -> (String, StatusCode) {
    (
        format!("Error uploading image: {}", e),
        image_error_handler(e).status(),
    )
}

/// The note list, re-rendered in full from the store.
async fn index_page(
    store: web::Data<NoteStore>,
    compose: &EditSession,
    notice: Option<&str>,
    status: StatusCode,
) -> HttpResponse {
    let res = with_store(store, |s| Ok(render_notes(&s.load(), s.sanitizer()))).await;
    match res {
        Ok(cards) => html(status, notes_page(&cards, compose, notice)),
        Err(e) => notestore_error_handler(&e),
    }
}

#[get("/")]
#[instrument(skip(store))]
async fn index(store: web::Data<NoteStore>) -> impl Responder {
    index_page(store, &EditSession::compose(), None, StatusCode::OK).await
}

#[post("/note")]
#[instrument(skip(store, limit, form))]
async fn add_note(
    store: web::Data<NoteStore>,
    limit: web::Data<MaxImageBytes>,
    form: web::Form<NoteForm>,
) -> impl Responder {
    let session = match form.into_inner().apply(EditSession::compose(), *limit.get_ref()) {
        Ok(session) => session,
        Err((session, e)) => {
            let (notice, status) = image_notice(&e);
            return index_page(store, &session, Some(&notice), status).await;
        }
    };
    let committing = session.clone();
    let res = with_store(store.clone(), move |s| committing.commit(s)).await;
    match res {
        Ok(_) => redirect_to_index(),
        Err(e) => index_page(store, &session, Some(&e.to_string()), status_of(&e)).await,
    }
}

#[get("/note/{note_id}")]
#[instrument(
    skip(store, params),
    fields(
        note_id = %params.0
    )
)]
async fn expand_note(store: web::Data<NoteStore>, params: web::Path<(String,)>) -> impl Responder {
    let (note_id,) = params.into_inner();
    let id = NoteID::from(note_id);
    let res = with_store(store, move |s| {
        s.get(&id)
            .map(|note| ExpandedNote::new(&note, s.sanitizer()))
    })
    .await;
    match res {
        Ok(expanded) => html(StatusCode::OK, expanded.to_html(SITE_TITLE)),
        Err(e) => notestore_error_handler(&e),
    }
}

#[get("/note/{note_id}/edit")]
#[instrument(
    skip(store, params),
    fields(
        note_id = %params.0
    )
)]
async fn edit_note(store: web::Data<NoteStore>, params: web::Path<(String,)>) -> impl Responder {
    let (note_id,) = params.into_inner();
    let id = NoteID::from(note_id);
    match with_store(store, move |s| EditSession::open(s, &id)).await {
        Ok(session) => html(StatusCode::OK, edit_page(&session, None)),
        Err(e) => notestore_error_handler(&e),
    }
}

#[post("/note/{note_id}/edit")]
#[instrument(
    skip(store, limit, params, form),
    fields(
        note_id = %params.0
    )
)]
async fn save_edited_note(
    store: web::Data<NoteStore>,
    limit: web::Data<MaxImageBytes>,
    params: web::Path<(String,)>,
    form: web::Form<NoteForm>,
) -> impl Responder {
    let (note_id,) = params.into_inner();
    let id = NoteID::from(note_id);
    let opened = match with_store(store.clone(), move |s| EditSession::open(s, &id)).await {
        Ok(session) => session,
        Err(e) => return notestore_error_handler(&e),
    };
    let session = match form.into_inner().apply(opened, *limit.get_ref()) {
        Ok(session) => session,
        Err((session, e)) => {
            let (notice, status) = image_notice(&e);
            return html(status, edit_page(&session, Some(&notice)));
        }
    };
    let committing = session.clone();
    match with_store(store, move |s| committing.commit(s)).await {
        Ok(_) => redirect_to_index(),
        Err(e) => html(status_of(&e), edit_page(&session, Some(&e.to_string()))),
    }
}

#[get("/note/{note_id}/delete")]
#[instrument(
    skip(store, params),
    fields(
        note_id = %params.0
    )
)]
async fn confirm_delete(store: web::Data<NoteStore>, params: web::Path<(String,)>) -> impl Responder {
    let (note_id,) = params.into_inner();
    let id = NoteID::from(note_id);
    let res = with_store(store, move |s| {
        let position = s.position(&id)?;
        let note = s.get(&id)?;
        Ok(NoteCard::new(position, &note, s.sanitizer()))
    })
    .await;
    match res {
        Ok(card) => html(StatusCode::OK, delete_page(&card)),
        Err(e) => notestore_error_handler(&e),
    }
}

#[post("/note/{note_id}/delete")]
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
        Ok(_) => redirect_to_index(),
        Err(e) => notestore_error_handler(&e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(add_note)
        .service(expand_note)
        .service(edit_note)
        .service(save_edited_note)
        .service(confirm_delete)
        .service(delete_note);
}
