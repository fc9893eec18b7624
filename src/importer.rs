//! Import orchestration: version gate → merge engines → persist.
//!
//! Persistence goes through two injected stores so the pipeline can run
//! against IndexedDB/localStorage in the browser and against in-memory fakes
//! in tests. The save document is always written before the version key: a
//! failed document write must not advance the key, or the next run would
//! wrongly skip the snapshot.

use crate::error::ImportError;
use crate::merge::{self, StudentMerge};
use crate::save::SaveDocument;
use crate::snapshot::Snapshot;
use crate::version::is_newer;

/// Durable slot for the last committed version key.
pub trait VersionStore {
    async fn last_version(&self) -> Result<Option<String>, ImportError>;
    async fn commit_version(&self, version: &str) -> Result<(), ImportError>;
}

/// Durable slot for the planner's save document.
pub trait SaveStore {
    async fn load(&self) -> Result<SaveDocument, ImportError>;
    async fn store(&self, doc: &SaveDocument) -> Result<(), ImportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPolicy {
    /// Only import when the candidate is strictly newer than the committed key.
    IfNewer,
    /// Import regardless of the committed key (explicit user request).
    Always,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub students: StudentMerge,
    pub items: usize,
    pub equipments: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotNewer { last: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Committed {
        version: String,
        summary: ImportSummary,
    },
    Skipped(SkipReason),
}

/// Run every engine whose section is present, in students → items →
/// equipments order. The inventory is rebuilt from scratch whenever either
/// inventory section is present.
pub fn apply_snapshot(doc: &mut SaveDocument, snapshot: &Snapshot) -> ImportSummary {
    let mut summary = ImportSummary::default();

    if let Some(students) = &snapshot.students {
        summary.students = merge::merge_students(doc, students);
    }
    if snapshot.has_inventory() {
        doc.owned_materials.clear();
    }
    if let Some(items) = &snapshot.items {
        summary.items = merge::merge_items(doc, items);
    }
    if let Some(equipments) = &snapshot.equipments {
        summary.equipments = merge::merge_equipment(doc, equipments);
    }
    summary
}

/// The version gate shared by [`try_import`] and [`Importer::import`].
fn gate(candidate: &str, last: Option<&str>) -> Option<SkipReason> {
    (!is_newer(candidate, last)).then(|| SkipReason::NotNewer {
        last: last.unwrap_or_default().to_string(),
    })
}

/// Version gate plus merge, without persistence. `doc` is only touched when
/// the outcome is `Committed`.
pub fn try_import(
    doc: &mut SaveDocument,
    candidate: &str,
    last: Option<&str>,
    snapshot: &Snapshot,
) -> Outcome {
    if let Some(reason) = gate(candidate, last) {
        return Outcome::Skipped(reason);
    }
    let summary = apply_snapshot(doc, snapshot);
    Outcome::Committed {
        version: candidate.to_string(),
        summary,
    }
}

pub struct Importer<'a, V, S> {
    versions: &'a V,
    saves: &'a S,
}

impl<'a, V: VersionStore, S: SaveStore> Importer<'a, V, S> {
    pub fn new(versions: &'a V, saves: &'a S) -> Self {
        Self { versions, saves }
    }

    pub async fn import(
        &self,
        candidate: &str,
        snapshot: &Snapshot,
        policy: ImportPolicy,
    ) -> Result<Outcome, ImportError> {
        let last = match policy {
            ImportPolicy::IfNewer => self.versions.last_version().await?,
            ImportPolicy::Always => None,
        };
        // Gate before loading: a stale snapshot never reads the save, so a
        // missing or unreadable document cannot turn a skip into an error.
        if let Some(reason) = gate(candidate, last.as_deref()) {
            log::info!(
                "BA import: already up to date (candidate={candidate}, last={})",
                last.as_deref().unwrap_or_default()
            );
            return Ok(Outcome::Skipped(reason));
        }

        // The gate has passed, so `try_import` always commits here.
        let mut doc = self.saves.load().await?;
        let outcome = try_import(&mut doc, candidate, last.as_deref(), snapshot);
        if let Outcome::Committed { summary, .. } = &outcome {
            self.saves.store(&doc).await?;
            self.versions.commit_version(candidate).await?;
            log::info!(
                "BA import: committed {candidate} (students +{} ~{}, items {}, equipments {})",
                summary.students.added,
                summary.students.updated,
                summary.items,
                summary.equipments
            );
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// In-memory stand-in for both browser stores. Records the write order.
    #[derive(Default)]
    struct MemoryStore {
        version: RefCell<Option<String>>,
        save: RefCell<Option<String>>,
        fail_save_write: Cell<bool>,
        writes: RefCell<Vec<&'static str>>,
    }

    impl MemoryStore {
        fn with_save(json: &str) -> Self {
            let store = Self::default();
            *store.save.borrow_mut() = Some(json.to_string());
            store
        }

        fn doc(&self) -> SaveDocument {
            SaveDocument::from_json(self.save.borrow().as_deref().unwrap()).unwrap()
        }
    }

    impl VersionStore for MemoryStore {
        async fn last_version(&self) -> Result<Option<String>, ImportError> {
            Ok(self.version.borrow().clone())
        }

        async fn commit_version(&self, version: &str) -> Result<(), ImportError> {
            self.writes.borrow_mut().push("version");
            *self.version.borrow_mut() = Some(version.to_string());
            Ok(())
        }
    }

    impl SaveStore for MemoryStore {
        async fn load(&self) -> Result<SaveDocument, ImportError> {
            match self.save.borrow().as_deref() {
                Some(json) => SaveDocument::from_json(json),
                None => Err(ImportError::MissingSave),
            }
        }

        async fn store(&self, doc: &SaveDocument) -> Result<(), ImportError> {
            if self.fail_save_write.get() {
                return Err(ImportError::storage("localStorage.setItem", "QuotaExceededError"));
            }
            self.writes.borrow_mut().push("save");
            *self.save.borrow_mut() = Some(doc.to_json()?);
            Ok(())
        }
    }

    const SAVE: &str = r#"{
        "characters": [{"id": "10000", "current": {"level": 1}, "target": {"level": 90},
                        "eleph": {"owned": 0}, "enabled": true}],
        "owned_materials": {"Credit": 5, "T1_Hat": 3},
        "server": "Global"
    }"#;

    fn snapshot(json: &str) -> Snapshot {
        Snapshot::from_json(json).unwrap()
    }

    fn run(
        store: &MemoryStore,
        candidate: &str,
        snap: &Snapshot,
        policy: ImportPolicy,
    ) -> Result<Outcome, ImportError> {
        pollster::block_on(Importer::new(store, store).import(candidate, snap, policy))
    }

    #[test]
    fn first_import_commits_document_then_version() {
        let store = MemoryStore::with_save(SAVE);
        let snap = snapshot(r#"{"students": {"10000": {"level": 50, "eleph": 7}}}"#);

        let outcome = run(&store, "20240101_000000", &snap, ImportPolicy::IfNewer).unwrap();

        assert!(matches!(outcome, Outcome::Committed { ref version, .. } if version == "20240101_000000"));
        assert_eq!(*store.writes.borrow(), ["save", "version"]);
        assert_eq!(store.version.borrow().as_deref(), Some("20240101_000000"));
        let doc = store.doc();
        assert_eq!(doc.characters[0].current.level, 50);
        assert_eq!(doc.characters[0].target["level"], 90);
        assert_eq!(doc.characters[0].eleph.owned, 7);
        // 生徒だけのスナップショットでは素材は残る
        assert_eq!(doc.material("T1_Hat"), 3);
        assert_eq!(doc.extra["server"], "Global");
    }

    #[test]
    fn second_import_of_same_key_is_skipped() {
        let store = MemoryStore::with_save(SAVE);
        let snap = snapshot(r#"{"items": {"10": 5}}"#);

        run(&store, "20240101_000000", &snap, ImportPolicy::IfNewer).unwrap();
        let saved = store.save.borrow().clone();
        let outcome = run(&store, "20240101_000000", &snap, ImportPolicy::IfNewer).unwrap();

        assert_eq!(
            outcome,
            Outcome::Skipped(SkipReason::NotNewer { last: "20240101_000000".into() })
        );
        assert_eq!(*store.save.borrow(), saved);
        assert_eq!(store.writes.borrow().len(), 2);
    }

    #[test]
    fn older_candidate_is_skipped_without_touching_storage() {
        let store = MemoryStore::with_save(SAVE);
        *store.version.borrow_mut() = Some("20240101_000000".into());

        let outcome = run(&store, "20231231_235959", &snapshot("{}"), ImportPolicy::IfNewer).unwrap();

        assert!(matches!(outcome, Outcome::Skipped(_)));
        assert!(store.writes.borrow().is_empty());
    }

    #[test]
    fn skip_does_not_need_a_save_document() {
        let store = MemoryStore::default();
        *store.version.borrow_mut() = Some("2_0".into());
        let outcome = run(&store, "1_0", &snapshot("{}"), ImportPolicy::IfNewer).unwrap();
        assert!(matches!(outcome, Outcome::Skipped(_)));
    }

    #[test]
    fn stale_snapshot_with_unreadable_save_is_still_a_skip() {
        let store = MemoryStore::with_save("not json");
        *store.version.borrow_mut() = Some("2_0".into());
        let snap = snapshot(r#"{"items": {}}"#);

        let outcome = run(&store, "1_0", &snap, ImportPolicy::IfNewer).unwrap();

        let mut doc = SaveDocument::default();
        assert_eq!(outcome, try_import(&mut doc, "1_0", Some("2_0"), &snap));
        assert_eq!(
            outcome,
            Outcome::Skipped(SkipReason::NotNewer { last: "2_0".into() })
        );
        assert!(store.writes.borrow().is_empty());
    }

    #[test]
    fn students_only_import_writes_untouched_values_back_verbatim() {
        let store = MemoryStore::with_save(
            r#"{"characters": [{"id": "1", "current": {"level": 10},
                                "target": {"level": "90", "bond": null},
                                "eleph": {"owned": 0, "unlocked": null}, "enabled": null}],
                "owned_materials": {"XP_1": "12", "Credit": 1.5}}"#,
        );
        let snap = snapshot(r#"{"students": {"1": {"level": 20, "eleph": 4}}}"#);

        run(&store, "1_0", &snap, ImportPolicy::IfNewer).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(store.save.borrow().as_deref().unwrap()).unwrap();
        let character = &saved["characters"][0];
        assert_eq!(character["current"]["level"], 20);
        assert_eq!(character["target"], serde_json::json!({"level": "90", "bond": null}));
        assert_eq!(character["eleph"], serde_json::json!({"owned": 4, "unlocked": null}));
        assert_eq!(
            saved["owned_materials"],
            serde_json::json!({"XP_1": "12", "Credit": 1.5})
        );
    }

    #[test]
    fn always_policy_reimports_same_key() {
        let store = MemoryStore::with_save(SAVE);
        *store.version.borrow_mut() = Some("20240101_000000".into());

        let outcome = run(
            &store,
            "20240101_000000",
            &snapshot(r#"{"items": {"11": 1}}"#),
            ImportPolicy::Always,
        )
        .unwrap();

        assert!(matches!(outcome, Outcome::Committed { .. }));
        assert_eq!(store.doc().material("Xp"), 500);
    }

    #[test]
    fn failed_document_write_keeps_old_version() {
        let store = MemoryStore::with_save(SAVE);
        *store.version.borrow_mut() = Some("1_0".into());
        store.fail_save_write.set(true);

        let err = run(&store, "2_0", &snapshot(r#"{"items": {}}"#), ImportPolicy::IfNewer).unwrap_err();

        assert!(matches!(err, ImportError::Storage { .. }));
        assert_eq!(store.version.borrow().as_deref(), Some("1_0"));
        assert!(store.writes.borrow().is_empty());
    }

    #[test]
    fn missing_save_aborts_before_any_write() {
        let store = MemoryStore::default();
        let err = run(&store, "1_0", &snapshot("{}"), ImportPolicy::IfNewer).unwrap_err();
        assert!(matches!(err, ImportError::MissingSave));
        assert!(store.version.borrow().is_none());
    }

    #[test]
    fn inventory_sections_rebuild_materials() {
        let mut doc = SaveDocument::from_json(SAVE).unwrap();
        let summary = apply_snapshot(
            &mut doc,
            &snapshot(
                r#"{"items": {"10": 5, "11": 2},
                    "equipments": {"a": {"Category": "Exp", "Rarity": "SR", "num": 3}}}"#,
            ),
        );

        assert_eq!(summary.items, 2);
        assert_eq!(summary.equipments, 1);
        let ids: Vec<&str> = doc.owned_materials.keys().map(String::as_str).collect();
        // items → equipments の書き込み順
        assert_eq!(ids, ["XP_1", "XP_2", "Xp", "GXP_3", "GearXp"]);
        assert_eq!(doc.material("Xp"), 1250);
        assert_eq!(doc.material("GearXp"), 4320);
    }

    #[test]
    fn equipment_only_snapshot_still_clears_items() {
        let mut doc = SaveDocument::from_json(SAVE).unwrap();
        apply_snapshot(
            &mut doc,
            &snapshot(r#"{"equipments": {"1": {"Category": "Hat", "tier": 2, "num": 6}}}"#),
        );
        assert_eq!(doc.material("Credit"), 0);
        assert_eq!(doc.material("T1_Hat"), 0);
        assert_eq!(doc.material("T2_Hat"), 6);
        assert_eq!(doc.owned_materials.len(), 2);
    }

    #[test]
    fn empty_snapshot_changes_nothing_but_commits() {
        let mut doc = SaveDocument::from_json(SAVE).unwrap();
        let before = doc.clone();
        let outcome = try_import(&mut doc, "1_0", None, &snapshot("{}"));
        assert!(matches!(outcome, Outcome::Committed { .. }));
        assert_eq!(doc, before);
    }

    #[test]
    fn pure_try_import_leaves_document_alone_when_not_newer() {
        let mut doc = SaveDocument::from_json(SAVE).unwrap();
        let before = doc.clone();
        let outcome = try_import(&mut doc, "1_0", Some("1_0"), &snapshot(r#"{"items": {}}"#));
        assert!(matches!(outcome, Outcome::Skipped(_)));
        assert_eq!(doc, before);
    }
}
