use crate::archive::client::{ArchiveClient, TagRecord};
use crate::archive::error::ArchiveError;
use crate::types::path_entry::PathEntry;
use log::{info, warn};
use std::collections::HashSet;

/// Flat uuid -> path table of every stream of one archive source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathTable {
    entries: Vec<PathEntry>,
}

impl PathTable {
    /// Builds the table from tag records, keeping the first record per uuid.
    /// Records without a path, or whose path does not decompose into the five
    /// expected components, are skipped.
    pub fn from_tags(tags: &[TagRecord]) -> Self {
        let mut seen = HashSet::new();
        let mut skipped = 0usize;
        let mut entries = Vec::with_capacity(tags.len());

        for tag in tags {
            if !seen.insert(tag.uuid.as_str()) {
                continue;
            }
            match tag.path.as_deref().and_then(|p| PathEntry::parse(&tag.uuid, p)) {
                Some(entry) => entries.push(entry),
                None => {
                    skipped += 1;
                    warn!(
                        "Skipping stream {} with unusable path {:?}",
                        tag.uuid, tag.path
                    );
                }
            }
        }

        if skipped > 0 {
            warn!("{} of {} streams had no usable path", skipped, tags.len());
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_uuid(&self, uuid: &str) -> bool {
        self.entries.iter().any(|e| e.uuid == uuid)
    }

    /// Entries whose device instance is in `instances`, in table order.
    pub fn for_instances(&self, instances: &HashSet<&str>) -> Vec<&PathEntry> {
        self.entries
            .iter()
            .filter(|e| instances.contains(e.device_instance.as_str()))
            .collect()
    }
}

/// `Metadata/SourceName = '<source>'`
pub fn source_name_predicate(source_name: &str) -> String {
    format!(
        "Metadata/SourceName = '{}'",
        source_name.replace('\'', "\\'")
    )
}

/// Downloads the tags of one archive source and turns them into a path table.
pub async fn fetch_path_table(
    client: &impl ArchiveClient,
    source_name: &str,
) -> Result<PathTable, ArchiveError> {
    let tags = client.tags(&source_name_predicate(source_name)).await?;
    let table = PathTable::from_tags(&tags);
    info!(
        "Path table for source '{}' has {} streams",
        source_name,
        table.len()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(uuid: &str, path: Option<&str>) -> TagRecord {
        TagRecord {
            uuid: uuid.into(),
            path: path.map(str::to_string),
        }
    }

    #[test]
    fn test_from_tags_skips_unusable_paths() {
        let tags = vec![
            tag("u1", Some("/FS4/bms/3000112/bms2/VAV-1 POS")),
            tag("u2", None),
            tag("u3", Some("/FS4/bms/3000113")),
            tag("u1", Some("/FS4/bms/9/bms2/duplicate")),
            tag("u4", Some("/FS4/bms/3000113/bms2/VAV-1 CMD")),
        ];

        let table = PathTable::from_tags(&tags);

        assert_eq!(table.len(), 2);
        assert_eq!(table.entries()[0].uuid, "u1");
        assert_eq!(table.entries()[0].device_instance, "3000112");
        assert_eq!(table.entries()[1].point_name, "VAV-1 CMD");
        assert!(!table.contains_uuid("u3"));
    }

    #[test]
    fn test_for_instances_filters_in_table_order() {
        let table = PathTable::from_tags(&[
            tag("u1", Some("/FS4/bms/1/bms2/a")),
            tag("u2", Some("/FS4/bms/2/bms2/b")),
            tag("u3", Some("/FS4/bms/1/bms2/c")),
        ]);

        let wanted: HashSet<&str> = ["1"].into_iter().collect();
        let uuids: Vec<&str> = table
            .for_instances(&wanted)
            .iter()
            .map(|e| e.uuid.as_str())
            .collect();
        assert_eq!(uuids, vec!["u1", "u3"]);
    }

    #[test]
    fn test_source_name_predicate() {
        assert_eq!(
            source_name_predicate("Field Study 4"),
            "Metadata/SourceName = 'Field Study 4'"
        );
    }
}
