//! Decoded snapshot files (`data/<YYYYmmdd_HHMMSS>.json` written by the exporter).
//!
//! Each top-level section is optional and independently triggers its merge
//! engine. Sections are kept as ordered `(key, record)` lists so new characters
//! are appended in file order.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::coerce;
use crate::error::ImportError;
use crate::save::Progress;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub students: Option<Vec<(String, RawStudent)>>,
    pub items: Option<Vec<(String, Value)>>,
    pub equipments: Option<Vec<(String, RawEquipment)>>,
}

/// Wire shape: sections are plain JSON objects.
#[derive(Deserialize)]
struct SnapshotWire {
    students: Option<Map<String, Value>>,
    items: Option<Map<String, Value>>,
    equipments: Option<Map<String, Value>>,
}

/// One student record as the exporter writes it. Field names are the exporter's.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawStudent {
    #[serde(deserialize_with = "coerce::de_count")]
    pub level: u32,
    #[serde(deserialize_with = "coerce::de_count")]
    pub bond: u32,
    #[serde(deserialize_with = "coerce::de_count")]
    pub star: u32,
    #[serde(deserialize_with = "coerce::de_count")]
    pub ue: u32,
    #[serde(deserialize_with = "coerce::de_count")]
    pub ue_level: u32,
    #[serde(rename = "EX", deserialize_with = "coerce::de_count")]
    pub ex: u32,
    #[serde(rename = "BS", deserialize_with = "coerce::de_count")]
    pub basic: u32,
    #[serde(rename = "ES", deserialize_with = "coerce::de_count")]
    pub passive: u32,
    #[serde(rename = "SS", deserialize_with = "coerce::de_count")]
    pub sub: u32,
    #[serde(rename = "gear_1", deserialize_with = "coerce::de_count")]
    pub gear1: u32,
    #[serde(rename = "gear_2", deserialize_with = "coerce::de_count")]
    pub gear2: u32,
    #[serde(rename = "gear_3", deserialize_with = "coerce::de_count")]
    pub gear3: u32,
    #[serde(deserialize_with = "coerce::de_count")]
    pub eleph: u32,
    #[serde(deserialize_with = "coerce::de_opt_label")]
    pub name: Option<String>,
}

impl RawStudent {
    /// Map the exporter's field names onto the planner's progress snapshot.
    pub fn progress(&self) -> Progress {
        Progress {
            level: self.level,
            bond: self.bond,
            star: self.star,
            ue: self.ue,
            ue_level: self.ue_level,
            ex: self.ex,
            basic: self.basic,
            passive: self.passive,
            sub: self.sub,
            gear1: self.gear1,
            gear2: self.gear2,
            gear3: self.gear3,
            extra: Map::new(),
        }
    }
}

/// One stack of equipment materials.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawEquipment {
    #[serde(rename = "Category", deserialize_with = "coerce::de_label")]
    pub category: String,
    #[serde(rename = "Rarity", deserialize_with = "coerce::de_label")]
    pub rarity: String,
    #[serde(deserialize_with = "coerce::de_count")]
    pub tier: u32,
    #[serde(deserialize_with = "coerce::de_int")]
    pub num: i64,
}

/// A record that is not an object decodes as all defaults, like a missing record.
fn records<T>(section: Map<String, Value>) -> Vec<(String, T)>
where
    T: for<'de> Deserialize<'de> + Default,
{
    section
        .into_iter()
        .map(|(key, value)| {
            let record = serde_json::from_value(value).unwrap_or_default();
            (key, record)
        })
        .collect()
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        let wire: SnapshotWire = serde_json::from_str(json)?;
        Ok(Self {
            students: wire.students.map(records),
            items: wire.items.map(|m| m.into_iter().collect()),
            equipments: wire.equipments.map(records),
        })
    }

    pub fn has_inventory(&self) -> bool {
        self.items.is_some() || self.equipments.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_none() && !self.has_inventory()
    }
}
