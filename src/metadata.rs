//! Cleanup of the raw topology rows into one classified record per terminal unit.

use crate::types::consumer::{ConsumerRecord, ConsumerType, TopologyRow};
use log::info;
use std::collections::HashSet;

/// Classifies every terminal unit as a direct or indirect hot-water consumer.
///
/// Rows where the upstream equipment is the boiler itself are direct. A unit that
/// shows up in any direct row is removed from the indirect set, so direct always
/// wins. Direct records come first, and each terminal unit is kept only once (its
/// first row).
pub fn clean_consumers(rows: Vec<TopologyRow>) -> Vec<ConsumerRecord> {
    let (direct, indirect): (Vec<_>, Vec<_>) = rows.into_iter().partition(TopologyRow::is_direct);

    let direct_units: HashSet<String> = direct.iter().map(|row| row.t_unit.clone()).collect();

    let labelled = direct
        .into_iter()
        .map(|row| (row, ConsumerType::Direct))
        .chain(
            indirect
                .into_iter()
                .filter(|row| !direct_units.contains(&row.t_unit))
                .map(|row| (row, ConsumerType::Indirect)),
        );

    let mut seen = HashSet::new();
    let consumers: Vec<ConsumerRecord> = labelled
        .filter(|(row, _)| seen.insert(row.t_unit.clone()))
        .map(|(row, consumer_type)| ConsumerRecord::from_row(row, consumer_type))
        .collect();

    info!(
        "Cleaned consumer table: {} direct, {} indirect",
        consumers
            .iter()
            .filter(|c| c.consumer_type == ConsumerType::Direct)
            .count(),
        consumers
            .iter()
            .filter(|c| c.consumer_type == ConsumerType::Indirect)
            .count()
    );
    consumers
}

/// Distinct values in first-seen order.
fn unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

pub fn unique_boilers(consumers: &[ConsumerRecord]) -> Vec<String> {
    unique(consumers.iter().map(|c| c.boiler.as_str()))
}

pub fn unique_terminal_units(consumers: &[ConsumerRecord]) -> Vec<String> {
    unique(consumers.iter().map(|c| c.t_unit.as_str()))
}

/// Zones are read from the raw topology so that a terminal unit serving several
/// zones contributes all of them.
pub fn unique_zones(rows: &[TopologyRow]) -> Vec<String> {
    unique(rows.iter().map(|r| r.room_space.as_str()))
}
