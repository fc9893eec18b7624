//! 生徒データのマージ (upsert)。
//!
//! - 既存の生徒: `current` を丸ごと置き換え、`eleph.owned` だけ更新する。
//!   `target` と他の eleph 設定には触れない (読んだ JSON のまま残る)。
//! - 新規の生徒: `current` と `target` を同じ値で作り、末尾に追加する。
//!
//! 生徒が削除されることはない。

use std::collections::HashMap;

use crate::save::{Character, Eleph, SaveDocument};
use crate::snapshot::RawStudent;

/// What a student merge did, for the import summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StudentMerge {
    pub added: usize,
    pub updated: usize,
}

pub fn merge_students(doc: &mut SaveDocument, students: &[(String, RawStudent)]) -> StudentMerge {
    let mut index: HashMap<String, usize> = doc
        .characters
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.clone(), i))
        .collect();
    let mut merge = StudentMerge::default();

    for (id, raw) in students {
        let progress = raw.progress();
        match index.get(id) {
            Some(&i) => {
                let character = &mut doc.characters[i];
                character.current = progress;
                character.eleph.owned = raw.eleph;
                merge.updated += 1;
            }
            None => {
                index.insert(id.clone(), doc.characters.len());
                doc.characters.push(Character {
                    id: id.clone(),
                    name: raw.name.clone(),
                    target: progress.to_value(),
                    current: progress,
                    eleph: Eleph {
                        owned: raw.eleph,
                        ..Eleph::default()
                    },
                    enabled: true,
                    extra: Default::default(),
                });
                merge.added += 1;
            }
        }
    }

    log::debug!(
        "BA import: students merged (added={}, updated={})",
        merge.added,
        merge.updated
    );
    merge
}
