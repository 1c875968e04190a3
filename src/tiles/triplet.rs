//! The bracketing (prev, current, next) ids around the overlay focus.

use super::tile::TilePosition;
use crate::model::FileId;

/// Previous/current/next ids drawn from a navigation order.
///
/// `prev`/`next` are `None` at the boundaries; there is no wraparound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triplet {
    pub prev: Option<FileId>,
    pub current: FileId,
    pub next: Option<FileId>,
}

impl Triplet {
    /// Triplet around `order[index]`, or `None` if `index` is out of range.
    pub fn around(order: &[FileId], index: usize) -> Option<Self> {
        let current = *order.get(index)?;
        Some(Self {
            prev: index.checked_sub(1).map(|i| order[i]),
            current,
            next: order.get(index + 1).copied(),
        })
    }

    /// Ids in left-to-right presentation order (1 to 3 of them).
    pub fn ids(&self) -> impl Iterator<Item = FileId> {
        self.prev
            .into_iter()
            .chain(std::iter::once(self.current))
            .chain(self.next)
    }

    /// Number of tiles in the triplet.
    pub fn len(&self) -> usize {
        1 + usize::from(self.prev.is_some()) + usize::from(self.next.is_some())
    }

    /// Always false; a triplet has a current id.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Target position for `id`, if it belongs to the triplet.
    pub fn position_of(&self, id: FileId) -> Option<TilePosition> {
        if id == self.current {
            Some(TilePosition::Current)
        } else if self.prev == Some(id) {
            Some(TilePosition::Prev)
        } else if self.next == Some(id) {
            Some(TilePosition::Next)
        } else {
            None
        }
    }

    pub fn contains(&self, id: FileId) -> bool {
        self.position_of(id).is_some()
    }
}
