//! Ordered snapshot of the collection handed over by the data source.

use super::file_record::FileRecord;
use super::identifiers::FileId;
use std::collections::HashMap;
use std::ops::Range;

/// Ordered file records plus an id → index lookup.
///
/// # Invariants
/// - `index[records[i].id] == i` for every `i`
/// - Ids are unique; a later duplicate replaces the earlier record in place
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<FileRecord>,
    index: HashMap<FileId, usize>,
}

impl Catalog {
    /// Build a catalog from records in display order.
    pub fn new(records: impl IntoIterator<Item = FileRecord>) -> Self {
        let mut catalog = Self::default();
        for record in records {
            match catalog.index.get(&record.id) {
                Some(&existing) => catalog.records[existing] = record,
                None => {
                    catalog.index.insert(record.id, catalog.records.len());
                    catalog.records.push(record);
                }
            }
        }
        catalog
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by id.
    pub fn get(&self, id: FileId) -> Option<&FileRecord> {
        self.index.get(&id).map(|&i| &self.records[i])
    }

    /// Record at a display index.
    pub fn at(&self, index: usize) -> Option<&FileRecord> {
        self.records.get(index)
    }

    /// Display index of an id.
    pub fn index_of(&self, id: FileId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// All ids in display order.
    pub fn ids(&self) -> Vec<FileId> {
        self.records.iter().map(|r| r.id).collect()
    }

    /// Records in a display-index range, clamped to the catalog length.
    pub fn slice(&self, range: Range<usize>) -> &[FileRecord] {
        let end = range.end.min(self.records.len());
        let start = range.start.min(end);
        &self.records[start..end]
    }

    /// Iterate records in display order.
    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_of(ids: &[u64]) -> Catalog {
        Catalog::new(ids.iter().map(|&i| FileRecord::new(FileId::new(i), "image/jpeg")))
    }

    #[test]
    fn index_of_matches_position() {
        let catalog = catalog_of(&[10, 20, 30]);
        assert_eq!(catalog.index_of(FileId::new(20)), Some(1));
        assert_eq!(catalog.index_of(FileId::new(99)), None);
        assert_eq!(catalog.at(2).map(|r| r.id), Some(FileId::new(30)));
    }

    #[test]
    fn duplicate_id_replaces_in_place() {
        let catalog = Catalog::new(vec![
            FileRecord::new(FileId::new(1), "image/jpeg"),
            FileRecord::new(FileId::new(2), "image/jpeg"),
            FileRecord::new(FileId::new(1), "video/mp4"),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.ids(), vec![FileId::new(1), FileId::new(2)]);
        assert!(catalog.get(FileId::new(1)).is_some_and(|r| r.is_video()));
    }

    #[test]
    fn slice_clamps_out_of_range() {
        let catalog = catalog_of(&[1, 2, 3]);
        assert_eq!(catalog.slice(1..10).len(), 2);
        assert!(catalog.slice(5..9).is_empty());
    }
}
