//! Compile-time configuration: storage keys, IndexedDB names and the planner page's DOM hooks.

/// localStorage のキー。プランナー本体がセーブデータを置いている場所。
#[cfg(target_arch = "wasm32")]
pub const SAVE_DATA_KEY: &str = "save-data";

/// IndexedDB database / object store used for the import's own state.
#[cfg(target_arch = "wasm32")]
pub const KEYVAL_DB: &str = "keyval-store";
#[cfg(target_arch = "wasm32")]
pub const KEYVAL_STORE: &str = "keyval";

/// Key holding the `FileSystemDirectoryHandle` of the last picked snapshot directory.
#[cfg(target_arch = "wasm32")]
pub const DIR_HANDLE_KEY: &str = "dirHandle";

/// Key holding the version key of the last committed snapshot.
#[cfg(target_arch = "wasm32")]
pub const FILE_VERSION_KEY: &str = "file_version";

/// Snapshot files are `<digits>_<digits>.json`.
pub const SNAPSHOT_SUFFIX: &str = ".json";

#[cfg(target_arch = "wasm32")]
pub mod dom {
    /// The planner's own "Import" button; ours goes right after it.
    pub const IMPORT_ANCHOR: &str = r#"button[data-id="saving-importbutton"]"#;
    pub const IMPORT_LABEL: &str = "Import BA";
    pub const IMPORT_CLASS: &str = "transfer-modal-button display-string";
    pub const IMPORT_STYLE: &str = "left: 115px; top: 70px; background-color: #3399ff;";
    pub const IMPORT_DATA_ID: &str = "saving-import";

    /// The character list's sort button; the permission button goes after it.
    pub const PERMISSION_ANCHOR: &str = r#"button[data-id="button-sort"]"#;
    pub const PERMISSION_LABEL: &str = "Get permission";
    pub const PERMISSION_CLASS: &str = "charEditorButton display-string";
    pub const PERMISSION_STYLE: &str = "background-color: #3399ff;";
    pub const PERMISSION_DATA_ID: &str = "get-permission";
}
