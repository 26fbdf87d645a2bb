use crate::errors::NoteStoreError;
use crate::{NoteDraft, NoteStore};

pub fn populate_test_data(store: &NoteStore) -> Result<(), NoteStoreError> {
    store.insert(NoteDraft::new(
        "<p>Welcome</p>",
        "<p>Notes are kept in <strong>local storage</strong>. Use <em>Edit</em> to change one.</p>",
    ))?;
    store.insert(NoteDraft::new(
        "<p>Shopping list</p>",
        "<ol><li>eggs</li><li>flour</li><li>milk</li></ol>",
    ))?;
    Ok(())
}
