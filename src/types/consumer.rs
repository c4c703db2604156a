//! Rows produced by the hot-water topology query and the cleaned consumer table
//! derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One match of the topology pattern: a boiler, a terminal unit it ultimately
/// feeds, the equipment directly upstream of that unit, and a zone the unit serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyRow {
    /// IRI of the boiler.
    pub boiler: String,
    /// IRI of the terminal unit.
    pub t_unit: String,
    /// Most specific class of the terminal unit.
    pub equip_type: String,
    /// Subtype marker left over from the specificity filter. Always dropped by cleanup.
    pub subtype: Option<String>,
    /// Equipment feeding the terminal unit directly. Equal to `boiler` for direct consumers.
    pub mid_equip: String,
    /// Zone served by the terminal unit.
    pub room_space: String,
}

impl TopologyRow {
    /// A consumer is direct when the equipment right upstream of it is the boiler itself.
    pub fn is_direct(&self) -> bool {
        self.mid_equip == self.boiler
    }
}

/// How a terminal unit receives hot water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsumerType {
    /// Fed straight from a boiler.
    Direct,
    /// Fed through intermediate equipment.
    Indirect,
}

impl ConsumerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsumerType::Direct => "direct",
            ConsumerType::Indirect => "indirect",
        }
    }
}

impl fmt::Display for ConsumerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hot-water consumer after cleanup. Each terminal unit appears in exactly one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerRecord {
    pub boiler: String,
    pub mid_equip: String,
    pub t_unit: String,
    pub equip_type: String,
    pub room_space: String,
    pub consumer_type: ConsumerType,
}

impl ConsumerRecord {
    pub(crate) fn from_row(row: TopologyRow, consumer_type: ConsumerType) -> Self {
        Self {
            boiler: row.boiler,
            mid_equip: row.mid_equip,
            t_unit: row.t_unit,
            equip_type: row.equip_type,
            room_space: row.room_space,
            consumer_type,
        }
    }
}
