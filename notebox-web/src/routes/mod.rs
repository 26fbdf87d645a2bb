use actix_web::{web, HttpResponse};
use notebox::errors::{ImageError, NoteStoreError, StorageError};
use notebox::{DataUrl, NoteStore};

mod api_v1;
mod index;
mod notes;

pub use api_v1::config as api_v1_config;
pub use index::config as index_config;
pub use notes::config as notes_config;

/// Largest image, in decoded bytes, a note may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxImageBytes(pub usize);

/// Validate an image submitted as a data URL, size included.
pub(crate) fn parse_image(url: &str, limit: MaxImageBytes) -> Result<DataUrl, ImageError> {
    let image = DataUrl::parse(url)?;
    image.check_size(limit.0)?;
    Ok(image)
}

pub(crate) fn image_error_handler(e: &ImageError) -> HttpResponse {
    match e {
        ImageError::TooLarge { .. } => HttpResponse::PayloadTooLarge().body(e.to_string()),
        _ => HttpResponse::BadRequest().body(e.to_string()),
    }
}

pub(crate) fn notestore_error_handler(e: &NoteStoreError) -> HttpResponse {
    match e {
        NoteStoreError::Validation(_) => HttpResponse::BadRequest().body(e.to_string()),
        NoteStoreError::IndexOutOfBounds { .. } => HttpResponse::NotFound().body(e.to_string()),
        NoteStoreError::NoteNotExist(_) => HttpResponse::NotFound().body(e.to_string()),
        NoteStoreError::Corrupted(_, _) => {
            error!("Note store is corrupted {:?}", e);
            HttpResponse::Conflict().body(e.to_string())
        }
        NoteStoreError::Storage(StorageError::QuotaExceeded { .. }) => {
            warn!("Note store is full {:?}", e);
            HttpResponse::InsufficientStorage().body("storage quota exceeded, the note was not saved")
        }
        NoteStoreError::Storage(_) => {
            error!("Note store internal error {:?}", e);
            HttpResponse::ServiceUnavailable().body("storage unavailable, the note was not saved")
        }
        NoteStoreError::SerdeError(_) => {
            error!("Note store internal error {:?}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Run a note store operation off the async workers.
pub(crate) async fn with_store<F, R>(
    store: web::Data<NoteStore>,
    op: F,
) -> Result<R, NoteStoreError>
where
    F: FnOnce(&NoteStore) -> Result<R, NoteStoreError> + Send + 'static,
    R: Send + 'static,
{
    match web::block(move || op(store.get_ref())).await {
        Ok(res) => res,
        Err(e) => {
            error!("Note store task failed {:?}", e);
            Err(NoteStoreError::Storage(StorageError::Unavailable(
                "note store task failed".to_owned(),
            )))
        }
    }
}
