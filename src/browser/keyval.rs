//! Tiny IndexedDB key-value store (`keyval-store` / `keyval`), the same layout
//! idb-keyval uses, so values written by earlier versions of the importer are
//! still found.

use js_sys::{Function, Promise};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, IdbDatabase, IdbRequest, IdbTransaction, IdbTransactionMode};

use super::{js_err, window};
use crate::config::{DIR_HANDLE_KEY, FILE_VERSION_KEY, KEYVAL_DB, KEYVAL_STORE};
use crate::error::ImportError;
use crate::importer::VersionStore;
use crate::version::snapshot_version;

pub struct Keyval {
    db: IdbDatabase,
}

/// Await an `IDBRequest`: resolves with `request.result`, rejects with `request.error`.
async fn request_result(request: &IdbRequest) -> Result<JsValue, JsValue> {
    let promise = Promise::new(&mut |resolve: Function, reject: Function| {
        let req = request.clone();
        let on_success = Closure::once_into_js(move |_: Event| {
            let result = req.result().unwrap_or(JsValue::UNDEFINED);
            let _ = resolve.call1(&JsValue::UNDEFINED, &result);
        });
        let req = request.clone();
        let on_error = Closure::once_into_js(move |_: Event| {
            let error = req
                .error()
                .ok()
                .flatten()
                .map(JsValue::from)
                .unwrap_or(JsValue::UNDEFINED);
            let _ = reject.call1(&JsValue::UNDEFINED, &error);
        });
        request.set_onsuccess(Some(on_success.unchecked_ref()));
        request.set_onerror(Some(on_error.unchecked_ref()));
    });
    JsFuture::from(promise).await
}

/// Await a transaction's `complete` (or `error`/`abort`).
async fn transaction_done(tx: &IdbTransaction) -> Result<JsValue, JsValue> {
    let promise = Promise::new(&mut |resolve: Function, reject: Function| {
        let on_complete = Closure::once_into_js(move |_: Event| {
            let _ = resolve.call0(&JsValue::UNDEFINED);
        });
        // A failed request fires `error` and then `abort`, so each needs its own closure.
        let on_error = {
            let reject = reject.clone();
            Closure::once_into_js(move |event: Event| {
                let _ = reject.call1(&JsValue::UNDEFINED, &event);
            })
        };
        let on_abort = Closure::once_into_js(move |event: Event| {
            let _ = reject.call1(&JsValue::UNDEFINED, &event);
        });
        tx.set_oncomplete(Some(on_complete.unchecked_ref()));
        tx.set_onerror(Some(on_error.unchecked_ref()));
        tx.set_onabort(Some(on_abort.unchecked_ref()));
    });
    JsFuture::from(promise).await
}

impl Keyval {
    pub async fn open() -> Result<Self, ImportError> {
        let factory = window()?
            .indexed_db()
            .map_err(js_err("indexedDB"))?
            .ok_or(ImportError::Unsupported("IndexedDB"))?;
        let request = factory.open(KEYVAL_DB).map_err(js_err("indexedDB.open"))?;

        let upgrading = request.clone();
        let on_upgrade = Closure::once_into_js(move |_: Event| {
            if let Ok(db) = upgrading.result() {
                let db: IdbDatabase = db.unchecked_into();
                if let Err(e) = db.create_object_store(KEYVAL_STORE) {
                    log::warn!("BA import: could not create object store: {e:?}");
                }
            }
        });
        request.set_onupgradeneeded(Some(on_upgrade.unchecked_ref()));

        let db = request_result(&request)
            .await
            .map_err(js_err("indexedDB.open"))?;
        Ok(Self {
            db: db.unchecked_into(),
        })
    }

    pub async fn get(&self, key: &str) -> Result<Option<JsValue>, ImportError> {
        let tx = self
            .db
            .transaction_with_str_and_mode(KEYVAL_STORE, IdbTransactionMode::Readonly)
            .map_err(js_err("IDBDatabase.transaction"))?;
        let store = tx
            .object_store(KEYVAL_STORE)
            .map_err(js_err("IDBTransaction.objectStore"))?;
        let request = store
            .get(&JsValue::from_str(key))
            .map_err(js_err("IDBObjectStore.get"))?;
        let value = request_result(&request)
            .await
            .map_err(js_err("IDBObjectStore.get"))?;
        Ok((!value.is_undefined()).then_some(value))
    }

    pub async fn set(&self, key: &str, value: &JsValue) -> Result<(), ImportError> {
        let tx = self
            .db
            .transaction_with_str_and_mode(KEYVAL_STORE, IdbTransactionMode::Readwrite)
            .map_err(js_err("IDBDatabase.transaction"))?;
        let store = tx
            .object_store(KEYVAL_STORE)
            .map_err(js_err("IDBTransaction.objectStore"))?;
        store
            .put_with_key(value, &JsValue::from_str(key))
            .map_err(js_err("IDBObjectStore.put"))?;
        transaction_done(&tx)
            .await
            .map_err(js_err("IDBObjectStore.put"))?;
        Ok(())
    }

    /// The `FileSystemDirectoryHandle` remembered from the last directory pick.
    pub async fn dir_handle(&self) -> Result<Option<JsValue>, ImportError> {
        self.get(DIR_HANDLE_KEY).await
    }

    pub async fn set_dir_handle(&self, handle: &JsValue) -> Result<(), ImportError> {
        self.set(DIR_HANDLE_KEY, handle).await
    }
}

impl VersionStore for Keyval {
    async fn last_version(&self) -> Result<Option<String>, ImportError> {
        let stored = self.get(FILE_VERSION_KEY).await?.and_then(|v| v.as_string());
        // 旧版は "<key>.json" のままファイル名を保存していた。
        Ok(stored.map(|v| snapshot_version(&v).unwrap_or(v)))
    }

    async fn commit_version(&self, version: &str) -> Result<(), ImportError> {
        self.set(FILE_VERSION_KEY, &JsValue::from_str(version)).await
    }
}
