//! Buttons injected into the planner page.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Element;

use super::{js_err, window};
use crate::error::ImportError;

pub struct ButtonSpec {
    pub label: &'static str,
    pub class: &'static str,
    pub style: &'static str,
    pub data_id: &'static str,
}

/// Run `f` once the page has finished loading (immediately if it already has).
pub fn when_ready(f: impl FnOnce() + 'static) -> Result<(), ImportError> {
    let window = window()?;
    let document = window.document().ok_or(ImportError::Unsupported("document"))?;
    if document.ready_state() == "complete" {
        f();
        return Ok(());
    }
    let on_load = Closure::once_into_js(f);
    window
        .add_event_listener_with_callback("load", on_load.unchecked_ref())
        .map_err(js_err("addEventListener"))
}

fn find(selector: &str) -> Result<Option<Element>, ImportError> {
    let document = window()?
        .document()
        .ok_or(ImportError::Unsupported("document"))?;
    document
        .query_selector(selector)
        .map_err(js_err("querySelector"))
}

/// Insert a button right after `anchor`. `on_click` gets the button itself so
/// it can disable or remove it. Does nothing if the button is already there.
pub fn insert_button_after(
    anchor: &str,
    spec: &ButtonSpec,
    mut on_click: impl FnMut(&Element) + 'static,
) -> Result<Element, ImportError> {
    if let Some(existing) = find(&format!(r#"button[data-id="{}"]"#, spec.data_id))? {
        return Ok(existing);
    }
    let anchor = find(anchor)?
        .ok_or_else(|| ImportError::storage("querySelector", format!("{anchor} not found")))?;
    let document = window()?
        .document()
        .ok_or(ImportError::Unsupported("document"))?;

    let button = document
        .create_element("button")
        .map_err(js_err("createElement"))?;
    button.set_inner_html(spec.label);
    for (name, value) in [
        ("class", spec.class),
        ("style", spec.style),
        ("data-id", spec.data_id),
    ] {
        button
            .set_attribute(name, value)
            .map_err(js_err("setAttribute"))?;
    }

    let target = button.clone();
    let handler = Closure::<dyn FnMut()>::new(move || on_click(&target));
    button
        .add_event_listener_with_callback("click", handler.as_ref().unchecked_ref())
        .map_err(js_err("addEventListener"))?;
    // Lives as long as the page.
    handler.forget();

    anchor
        .insert_adjacent_element("afterend", &button)
        .map_err(js_err("insertAdjacentElement"))?;
    Ok(button)
}

pub fn set_disabled(button: &Element, disabled: bool) {
    let result = if disabled {
        button.set_attribute("disabled", "")
    } else {
        button.remove_attribute("disabled")
    };
    if let Err(e) = result {
        log::warn!("BA import: could not toggle button: {e:?}");
    }
}

pub fn alert(message: &str) {
    if let Some(w) = web_sys::window() {
        let _ = w.alert_with_message(message);
    }
}

/// Reload so the planner re-reads its save from localStorage.
pub fn reload() {
    if let Some(w) = web_sys::window() {
        if let Err(e) = w.location().reload() {
            log::warn!("BA import: reload failed: {e:?}");
        }
    }
}
