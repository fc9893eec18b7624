//! プランナーのセーブデータ (`localStorage["save-data"]`) のモデル。
//!
//! インポートが触るのは `characters` と `owned_materials` だけ。それ以外の
//! フィールドはプランナー側の持ち物なので `extra` にそのまま保持し、
//! 書き戻す (`extra` 内の順序は保たれる)。
//!
//! 読み込みは寛容に: 型の合わない値で読み込み全体を失敗させない。
//! インポートが書き換える値 (`current`, `eleph.owned`) だけを
//! [`coerce`](crate::coerce) で正規化し、`target`・eleph の設定・素材の数量は
//! 読んだ JSON の値のまま書き戻す。

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::coerce;
use crate::error::ImportError;

/// material id → owned quantity, in the planner's key order. Values stay raw
/// JSON; readers coerce with [`coerce::int`].
pub type Materials = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveDocument {
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default, deserialize_with = "de_materials")]
    pub owned_materials: Materials,
    /// Planner-owned members the import never touches.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Character {
    #[serde(default, deserialize_with = "coerce::de_label")]
    pub id: String,
    #[serde(
        default,
        deserialize_with = "coerce::de_opt_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(default)]
    pub current: Progress,
    /// Goal state. Written once when the character is created, otherwise
    /// carried through exactly as read.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub target: Value,
    #[serde(default)]
    pub eleph: Eleph,
    #[serde(default = "enabled_by_default", deserialize_with = "coerce::de_bool")]
    pub enabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn enabled_by_default() -> bool {
    true
}

/// 育成状況。インポートが書き込む `current` の形で、新規生徒の `target` もこれから作る。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default, deserialize_with = "coerce::de_count")]
    pub level: u32,
    #[serde(default, deserialize_with = "coerce::de_count")]
    pub bond: u32,
    #[serde(default, deserialize_with = "coerce::de_count")]
    pub star: u32,
    #[serde(default, deserialize_with = "coerce::de_count")]
    pub ue: u32,
    #[serde(default, deserialize_with = "coerce::de_count")]
    pub ue_level: u32,
    #[serde(default, deserialize_with = "coerce::de_count")]
    pub ex: u32,
    #[serde(default, deserialize_with = "coerce::de_count")]
    pub basic: u32,
    #[serde(default, deserialize_with = "coerce::de_count")]
    pub passive: u32,
    #[serde(default, deserialize_with = "coerce::de_count")]
    pub sub: u32,
    #[serde(default, deserialize_with = "coerce::de_count")]
    pub gear1: u32,
    #[serde(default, deserialize_with = "coerce::de_count")]
    pub gear2: u32,
    #[serde(default, deserialize_with = "coerce::de_count")]
    pub gear3: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Progress {
    /// JSON form used as a new character's `target`.
    pub fn to_value(&self) -> Value {
        // Plain counters and a string-keyed map: serialisation cannot fail.
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// 生徒ごとの神名文字 (eleph) の計画情報。インポートが書き換えるのは `owned` のみで、
/// それ以外の設定 (`unlocked`, `cost`, …) は読んだ値のまま `settings` に残る。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eleph {
    #[serde(default, deserialize_with = "coerce::de_count")]
    pub owned: u32,
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl Default for Eleph {
    /// Planning defaults for a freshly imported character.
    fn default() -> Self {
        let settings = [
            ("unlocked", Value::from(true)),
            ("cost", Value::from(1)),
            ("purchasable", Value::from(0)),
            ("farm_nodes", Value::from(0)),
            ("node_refresh", Value::from(false)),
            ("use_eligma", Value::from(false)),
            ("use_shop", Value::from(false)),
        ];
        Self {
            owned: 0,
            settings: settings
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        }
    }
}

/// A missing or non-object `owned_materials` reads as an empty inventory.
fn de_materials<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Materials, D::Error> {
    Value::deserialize(deserializer).map(|v| match v {
        Value::Object(map) => map,
        _ => Map::new(),
    })
}

impl SaveDocument {
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ImportError> {
        Ok(serde_json::to_string(self)?)
    }

    #[cfg(test)]
    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    #[cfg(test)]
    pub fn material(&self, id: &str) -> i64 {
        self.owned_materials.get(id).map_or(0, coerce::int)
    }
}
