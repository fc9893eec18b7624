//! The planner's own save slot in `localStorage`.

use web_sys::Storage;

use super::{js_err, window};
use crate::config::SAVE_DATA_KEY;
use crate::error::ImportError;
use crate::importer::SaveStore;
use crate::save::SaveDocument;

pub struct LocalSaveStore {
    storage: Storage,
}

impl LocalSaveStore {
    pub fn open() -> Result<Self, ImportError> {
        let storage = window()?
            .local_storage()
            .ok()
            .flatten()
            .ok_or(ImportError::Unsupported("localStorage"))?;
        Ok(Self { storage })
    }
}

impl SaveStore for LocalSaveStore {
    async fn load(&self) -> Result<SaveDocument, ImportError> {
        let json = self
            .storage
            .get_item(SAVE_DATA_KEY)
            .map_err(js_err("localStorage.getItem"))?
            .ok_or(ImportError::MissingSave)?;
        SaveDocument::from_json(&json)
    }

    async fn store(&self, doc: &SaveDocument) -> Result<(), ImportError> {
        let json = doc.to_json()?;
        self.storage
            .set_item(SAVE_DATA_KEY, &json)
            .map_err(js_err("localStorage.setItem"))
    }
}
