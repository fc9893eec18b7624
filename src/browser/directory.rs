//! File System Access API: directory picker, permissions, listing and reading.
//!
//! The handle methods used here (`showDirectoryPicker`, `queryPermission`,
//! `requestPermission`, `entries`) are called dynamically through `Reflect`
//! because not every browser ships them.

use js_sys::{Array, Function, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{DomException, File};

use super::{js_err, window};
use crate::error::ImportError;
use crate::version::snapshot_version;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Prompt,
    Denied,
}

impl Permission {
    fn parse(state: &str) -> Self {
        match state {
            "granted" => Permission::Granted,
            "prompt" => Permission::Prompt,
            _ => Permission::Denied,
        }
    }
}

fn get(target: &JsValue, name: &'static str) -> Result<JsValue, ImportError> {
    Reflect::get(target, &JsValue::from_str(name)).map_err(js_err(name))
}

/// Call a zero-argument method that returns a promise and await it.
async fn call_async(target: &JsValue, name: &'static str) -> Result<JsValue, JsValue> {
    let method: Function = Reflect::get(target, &JsValue::from_str(name))?.dyn_into()?;
    let promise: Promise = method.call0(target)?.dyn_into()?;
    JsFuture::from(promise).await
}

/// Ask the user for the snapshot directory.
pub async fn pick() -> Result<JsValue, ImportError> {
    let window: JsValue = window()?.into();
    if get(&window, "showDirectoryPicker")?.is_undefined() {
        return Err(ImportError::Unsupported("showDirectoryPicker"));
    }
    call_async(&window, "showDirectoryPicker").await.map_err(|e| {
        let aborted = e
            .dyn_ref::<DomException>()
            .is_some_and(|d| d.name() == "AbortError");
        if aborted {
            ImportError::Cancelled
        } else {
            js_err("showDirectoryPicker")(e)
        }
    })
}

pub async fn query_permission(dir: &JsValue) -> Result<Permission, ImportError> {
    let state = call_async(dir, "queryPermission")
        .await
        .map_err(js_err("queryPermission"))?;
    Ok(Permission::parse(&state.as_string().unwrap_or_default()))
}

/// Must run inside a user gesture.
pub async fn request_permission(dir: &JsValue) -> Result<Permission, ImportError> {
    let state = call_async(dir, "requestPermission")
        .await
        .map_err(js_err("requestPermission"))?;
    Ok(Permission::parse(&state.as_string().unwrap_or_default()))
}

/// `(version key, file handle)` for every snapshot file in `dir`, in
/// enumeration order. Other entries are dropped here.
pub async fn snapshot_files(dir: &JsValue) -> Result<Vec<(String, JsValue)>, ImportError> {
    let entries: Function = get(dir, "entries")?
        .dyn_into()
        .map_err(|_| ImportError::Unsupported("FileSystemDirectoryHandle.entries"))?;
    let iter = entries.call0(dir).map_err(js_err("entries"))?;
    let next: Function = get(&iter, "next")?
        .dyn_into()
        .map_err(js_err("entries().next"))?;

    let mut files = Vec::new();
    loop {
        let step: Promise = next
            .call0(&iter)
            .and_then(|p| p.dyn_into())
            .map_err(js_err("entries().next"))?;
        let step = JsFuture::from(step)
            .await
            .map_err(js_err("entries().next"))?;
        if get(&step, "done")?.is_truthy() {
            break;
        }
        let pair: Array = get(&step, "value")?
            .dyn_into()
            .map_err(js_err("entries().next"))?;
        let name = pair.get(0).as_string().unwrap_or_default();
        if let Some(version) = snapshot_version(&name) {
            files.push((version, pair.get(1)));
        }
    }
    log::debug!("BA import: {} snapshot file(s) found", files.len());
    Ok(files)
}

/// Full text of a `FileSystemFileHandle`.
pub async fn read_text(file: &JsValue) -> Result<String, ImportError> {
    let file: File = call_async(file, "getFile")
        .await
        .and_then(|f| f.dyn_into())
        .map_err(js_err("getFile"))?;
    let text = JsFuture::from(file.text())
        .await
        .map_err(js_err("File.text"))?;
    text.as_string()
        .ok_or_else(|| ImportError::storage("File.text", "result is not a string"))
}
