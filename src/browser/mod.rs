//! Browser side of the importer: wires the core pipeline to the planner page.
//!
//! Two entry points:
//! - [`load_from_source`]: page load / permission grant. Re-reads the remembered
//!   directory and imports only if its newest snapshot is newer than the last one.
//! - [`start_import`]: the "Import BA" button. Lets the user pick a directory,
//!   remembers it, and imports its newest snapshot unconditionally.
//!
//! Only one pipeline runs at a time; the import button is disabled meanwhile.

mod directory;
mod keyval;
mod local_storage;
mod ui;

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::config::dom;
use crate::error::ImportError;
use crate::importer::{ImportPolicy, Importer, Outcome};
use crate::snapshot::Snapshot;
use crate::version::select_latest;
use directory::Permission;
use keyval::Keyval;
use local_storage::LocalSaveStore;
use ui::ButtonSpec;

const IMPORT_BUTTON: ButtonSpec = ButtonSpec {
    label: dom::IMPORT_LABEL,
    class: dom::IMPORT_CLASS,
    style: dom::IMPORT_STYLE,
    data_id: dom::IMPORT_DATA_ID,
};

const PERMISSION_BUTTON: ButtonSpec = ButtonSpec {
    label: dom::PERMISSION_LABEL,
    class: dom::PERMISSION_CLASS,
    style: dom::PERMISSION_STYLE,
    data_id: dom::PERMISSION_DATA_ID,
};

pub(crate) fn window() -> Result<web_sys::Window, ImportError> {
    web_sys::window().ok_or(ImportError::Unsupported("window"))
}

/// Convert a JS exception into a storage error tagged with the failing call.
pub(crate) fn js_err(context: &'static str) -> impl Fn(JsValue) -> ImportError {
    move |e| ImportError::storage(context, format!("{e:?}"))
}

/// Who started a pipeline. Only user-started runs get an alert on failure.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Automatic,
    User,
}

/// Page-lifetime state shared by the button handlers.
#[derive(Default)]
struct App {
    busy: Cell<bool>,
    import_button: RefCell<Option<Element>>,
}

impl App {
    fn begin(&self) -> bool {
        if self.busy.replace(true) {
            return false;
        }
        if let Some(button) = self.import_button.borrow().as_ref() {
            ui::set_disabled(button, true);
        }
        true
    }

    fn end(&self) {
        self.busy.set(false);
        if let Some(button) = self.import_button.borrow().as_ref() {
            ui::set_disabled(button, false);
        }
    }

    /// Run one pipeline to completion unless another one is in flight.
    async fn run<F>(&self, trigger: Trigger, pipeline: F)
    where
        F: Future<Output = Result<Option<Outcome>, ImportError>>,
    {
        if !self.begin() {
            log::info!("BA import: an import is already running; ignoring trigger");
            return;
        }
        let result = pipeline.await;
        self.end();
        report(trigger, result);
    }

    fn spawn_load(self: &Rc<Self>, trigger: Trigger) {
        let app = Rc::clone(self);
        spawn_local(async move {
            app.run(trigger, load_from_source(&app)).await;
        });
    }

    fn mount_import_button(self: &Rc<Self>) {
        let app = Rc::clone(self);
        let mounted = ui::insert_button_after(dom::IMPORT_ANCHOR, &IMPORT_BUTTON, move |_| {
            let app = Rc::clone(&app);
            spawn_local(async move {
                app.run(Trigger::User, start_import()).await;
            });
        });
        match mounted {
            Ok(button) => *self.import_button.borrow_mut() = Some(button),
            Err(e) => log::warn!("BA import: could not add import button: {e}"),
        }
    }

    /// Show "Get permission"; on grant, remove it and retry the automatic load.
    fn mount_permission_button(self: &Rc<Self>, dir: JsValue) {
        let app = Rc::clone(self);
        let mounted = ui::insert_button_after(
            dom::PERMISSION_ANCHOR,
            &PERMISSION_BUTTON,
            move |button| {
                let app = Rc::clone(&app);
                let dir = dir.clone();
                let button = button.clone();
                spawn_local(async move {
                    match directory::request_permission(&dir).await {
                        Ok(Permission::Granted) => {
                            ui::alert("Success!");
                            button.remove();
                            app.run(Trigger::User, load_from_source(&app)).await;
                        }
                        Ok(_) => ui::alert("Failed!"),
                        Err(e) => {
                            log::warn!("BA import: {e}");
                            ui::alert("Failed!");
                        }
                    }
                });
            },
        );
        if let Err(e) = mounted {
            log::warn!("BA import: could not add permission button: {e}");
        }
    }
}

fn report(trigger: Trigger, result: Result<Option<Outcome>, ImportError>) {
    match result {
        Ok(Some(Outcome::Committed { .. })) => {
            log::info!("BA import: reloading planner");
            ui::reload();
        }
        // The importer already logged why it skipped.
        Ok(Some(Outcome::Skipped(_))) | Ok(None) => {}
        Err(e) if e.is_quiet() => log::info!("BA import: {e}"),
        Err(e) => {
            log::error!("BA import: {e}");
            if trigger == Trigger::User {
                ui::alert(&format!("Import failed: {e}"));
            }
        }
    }
}

/// Install the import button and run the automatic import once the page is ready.
pub fn install() {
    let app = Rc::new(App::default());
    let ready = ui::when_ready(move || {
        app.mount_import_button();
        app.spawn_load(Trigger::Automatic);
    });
    if let Err(e) = ready {
        log::error!("BA import: {e}");
    }
}

/// Newest snapshot in `dir` → decode → import with `policy`.
async fn import_latest(
    keyval: &Keyval,
    dir: &JsValue,
    policy: ImportPolicy,
) -> Result<Outcome, ImportError> {
    let files = directory::snapshot_files(dir).await?;
    let latest = select_latest(files).ok_or(ImportError::NoCandidate)?;
    log::info!("BA import: newest snapshot is {}", latest.version);

    let text = directory::read_text(&latest.payload).await?;
    let snapshot = Snapshot::from_json(&text)?;
    if snapshot.is_empty() {
        log::warn!("BA import: {} has no students, items or equipments", latest.version);
    }
    let saves = LocalSaveStore::open()?;
    Importer::new(keyval, &saves)
        .import(&latest.version, &snapshot, policy)
        .await
}

/// Automatic path: remembered directory, import only when newer.
async fn load_from_source(app: &Rc<App>) -> Result<Option<Outcome>, ImportError> {
    let keyval = Keyval::open().await?;
    let Some(dir) = keyval.dir_handle().await? else {
        log::info!("BA import: no snapshot directory chosen yet");
        return Ok(None);
    };
    match directory::query_permission(&dir).await? {
        Permission::Granted => import_latest(&keyval, &dir, ImportPolicy::IfNewer)
            .await
            .map(Some),
        Permission::Prompt => {
            app.mount_permission_button(dir);
            Err(ImportError::PermissionPending)
        }
        Permission::Denied => Err(ImportError::PermissionDenied),
    }
}

/// Explicit path: the user picks a directory, which is remembered for later loads.
async fn start_import() -> Result<Option<Outcome>, ImportError> {
    let dir = directory::pick().await?;
    let keyval = Keyval::open().await?;
    keyval.set_dir_handle(&dir).await?;
    import_latest(&keyval, &dir, ImportPolicy::Always)
        .await
        .map(Some)
}
