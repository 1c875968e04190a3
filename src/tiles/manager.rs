//! TileManager - pool of tiles, display order, lazy activation, positions.
//!
//! The manager is the only owner of [`Tile`] values. Every presentation
//! change is mirrored to the [`RenderSurface`] as it happens.
//!
//! # Display order
//!
//! The display order is a slot vector. Inserting past the current end
//! leaves `None` holes; removal compacts the vector while keeping the
//! survivors' relative order.

use super::surface::RenderSurface;
use super::tile::{MediaSurface, ResourceState, Tile, TilePosition};
use super::triplet::Triplet;
use crate::geometry::TileBox;
use crate::model::{FileId, FileRecord};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Options for [`TileManager::render_files`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Destroy every current tile before rendering.
    pub clear: bool,
    /// Ids rendered with the selection highlight.
    pub selected_ids: HashSet<FileId>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            clear: true,
            selected_ids: HashSet::new(),
        }
    }
}

/// Outcome reported by the surface when an image load completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed,
}

/// Owner of every materialized tile.
#[derive(Debug)]
pub struct TileManager<S: RenderSurface> {
    tiles: HashMap<FileId, Tile>,
    order: Vec<Option<FileId>>,
    surface: S,
}

impl<S: RenderSurface> TileManager<S> {
    /// Empty manager rendering onto `surface`.
    pub fn new(surface: S) -> Self {
        Self {
            tiles: HashMap::new(),
            order: Vec::new(),
            surface,
        }
    }

    // ===== Queries =====

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tile(&self, id: FileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    pub fn contains(&self, id: FileId) -> bool {
        self.tiles.contains_key(&id)
    }

    /// Raw slot vector, holes included.
    pub fn slots(&self) -> &[Option<FileId>] {
        &self.order
    }

    /// Ids in display order, holes skipped.
    pub fn display_order(&self) -> Vec<FileId> {
        self.order.iter().flatten().copied().collect()
    }

    /// Slot index of `id`.
    pub fn display_index(&self, id: FileId) -> Option<usize> {
        self.order.iter().position(|slot| *slot == Some(id))
    }

    /// Tiles in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.order
            .iter()
            .flatten()
            .filter_map(|id| self.tiles.get(id))
    }

    /// Ids currently at `position`, in display order.
    pub fn ids_with_position(&self, position: TilePosition) -> Vec<FileId> {
        self.iter()
            .filter(|t| t.position == position)
            .map(|t| t.file_id())
            .collect()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    // ===== Creation / removal =====

    /// Create or update the tile for `file` at display slot `index`.
    ///
    /// Idempotent: a tracked id is updated in place and moved to `index`.
    /// A new id is attached to the surface immediately.
    pub fn create_tile(&mut self, file: &FileRecord, index: usize) -> &Tile {
        let id = file.id;
        if let Some(tile) = self.tiles.get_mut(&id) {
            tile.file = file.clone();
            if let Some(current) = self.order.iter().position(|slot| *slot == Some(id)) {
                if current != index {
                    self.order.remove(current);
                    place_in_slots(&mut self.order, index, id);
                }
            } else {
                place_in_slots(&mut self.order, index, id);
            }
        } else {
            let handle = self.surface.create_handle(file);
            self.tiles.insert(id, Tile::new(file.clone(), handle, false));
            place_in_slots(&mut self.order, index, id);
            self.surface.attach_batch(&[handle]);
        }
        &self.tiles[&id]
    }

    /// Insert several tiles by slot index, attaching new ones in one batch.
    ///
    /// Entries are applied in iteration order, so ascending indices give the
    /// expected final slots. Tracked ids are updated and moved like
    /// [`Self::create_tile`]. Returns the number of newly created tiles.
    pub fn insert_batch<'a>(
        &mut self,
        entries: impl IntoIterator<Item = (usize, &'a FileRecord)>,
        selected: &HashSet<FileId>,
    ) -> usize {
        let mut fresh = Vec::new();
        for (index, file) in entries {
            if self.tiles.contains_key(&file.id) {
                self.create_tile(file, index);
                continue;
            }
            let handle = self.surface.create_handle(file);
            let tile = Tile::new(file.clone(), handle, selected.contains(&file.id));
            self.tiles.insert(file.id, tile);
            place_in_slots(&mut self.order, index, file.id);
            fresh.push(handle);
        }
        if !fresh.is_empty() {
            self.surface.attach_batch(&fresh);
        }
        fresh.len()
    }

    /// Render a list of files, attaching all new tiles in one bulk operation.
    ///
    /// With `clear` set, every existing tile is destroyed first. Without it,
    /// tracked ids are refreshed where they stand and new ids are appended.
    pub fn render_files(&mut self, files: &[FileRecord], options: &RenderOptions) -> usize {
        if options.clear {
            self.clear();
        }

        let mut next_slot = self.order.len();
        let mut fresh = Vec::with_capacity(files.len());
        for file in files {
            if let Some(tile) = self.tiles.get_mut(&file.id) {
                tile.file = file.clone();
                tile.selected = options.selected_ids.contains(&file.id);
                continue;
            }
            let handle = self.surface.create_handle(file);
            let tile = Tile::new(file.clone(), handle, options.selected_ids.contains(&file.id));
            self.tiles.insert(file.id, tile);
            place_in_slots(&mut self.order, next_slot, file.id);
            next_slot += 1;
            fresh.push(handle);
        }

        if !fresh.is_empty() {
            self.surface.attach_batch(&fresh);
        }
        debug!(rendered = fresh.len(), total = self.tiles.len(), "Rendered files");
        fresh.len()
    }

    /// Destroy one tile. Returns `false` if the id is not tracked.
    pub fn remove_tile(&mut self, id: FileId) -> bool {
        self.remove_tiles(&[id]) == 1
    }

    /// Destroy several tiles with a single compaction pass over the order.
    ///
    /// Returns the number of tiles actually removed.
    pub fn remove_tiles(&mut self, ids: &[FileId]) -> usize {
        let mut removed = HashSet::with_capacity(ids.len());
        for id in ids {
            if let Some(tile) = self.tiles.remove(id) {
                self.surface.destroy_handle(tile.handle);
                removed.insert(*id);
            }
        }
        if !removed.is_empty() {
            self.order
                .retain(|slot| !matches!(slot, Some(id) if removed.contains(id)));
        }
        removed.len()
    }

    /// Destroy every tile.
    pub fn clear(&mut self) {
        for tile in self.tiles.values() {
            self.surface.destroy_handle(tile.handle);
        }
        self.tiles.clear();
        self.order.clear();
    }

    // ===== Selection =====

    /// Resynchronize selection highlights. Returns how many tiles changed.
    pub fn sync_selection(&mut self, selected: &HashSet<FileId>) -> usize {
        let mut changed = 0;
        for tile in self.tiles.values_mut() {
            let want = selected.contains(&tile.file.id);
            if tile.selected != want {
                tile.selected = want;
                changed += 1;
            }
        }
        changed
    }

    // ===== Lazy activation =====

    /// Request the real image for every pending tile among `ids`.
    ///
    /// A tile is only ever requested once; later calls skip it whatever its
    /// state. Returns the number of new requests.
    pub fn activate(&mut self, ids: impl IntoIterator<Item = FileId>) -> usize {
        let mut requested = 0;
        for id in ids {
            let Some(tile) = self.tiles.get_mut(&id) else {
                continue;
            };
            if tile.resource != ResourceState::Pending {
                continue;
            }
            tile.resource = ResourceState::Requested;
            self.surface.request_image(tile.handle, &tile.file);
            requested += 1;
        }
        requested
    }

    /// Completion callback for an image request.
    ///
    /// Failures fall back to the placeholder without retry. Returns `false`
    /// if the tile is gone or was not waiting on a load.
    pub fn resource_loaded(&mut self, id: FileId, outcome: LoadOutcome) -> bool {
        let Some(tile) = self.tiles.get_mut(&id) else {
            return false;
        };
        if tile.resource != ResourceState::Requested {
            return false;
        }
        match outcome {
            LoadOutcome::Loaded => tile.resource = ResourceState::Loaded,
            LoadOutcome::Failed => {
                debug!(file_id = %id, "Image load failed, showing placeholder");
                tile.resource = ResourceState::Placeholder;
                self.surface.show_placeholder(tile.handle);
            }
        }
        true
    }

    // ===== Positions =====

    /// Assign PREV/CURRENT/NEXT around `current_id`.
    ///
    /// The triplet is drawn from `navigable_ids` when given, else from the
    /// display order. Tiles outside the new triplet go to GRID, or to HIDDEN
    /// when they are not navigable; tiles inside it are retargeted straight
    /// from wherever they are, so a tile that was NEXT moves directly to
    /// CURRENT. Tiles already at their target get no move.
    ///
    /// Returns `None` (and changes nothing) if `current_id` is absent from
    /// the order or has no tile.
    pub fn setup_viewport(
        &mut self,
        current_id: FileId,
        navigable_ids: Option<&[FileId]>,
    ) -> Option<Triplet> {
        let owned;
        let order: &[FileId] = match navigable_ids {
            Some(ids) => ids,
            None => {
                owned = self.display_order();
                owned.as_slice()
            }
        };

        let Some(index) = order.iter().position(|id| *id == current_id) else {
            warn!(file_id = %current_id, "setup_viewport: file not in navigation order");
            return None;
        };
        if !self.tiles.contains_key(&current_id) {
            warn!(file_id = %current_id, "setup_viewport: file has no tile");
            return None;
        }
        let triplet = Triplet::around(order, index)?;
        let navigable: Option<HashSet<FileId>> =
            navigable_ids.map(|ids| ids.iter().copied().collect());

        for id in self.order.iter().flatten() {
            let Some(tile) = self.tiles.get_mut(id) else {
                continue;
            };
            let outside = match &navigable {
                Some(set) if !set.contains(id) => TilePosition::Hidden,
                _ => TilePosition::Grid,
            };
            let target = triplet.position_of(*id).unwrap_or(outside);
            if tile.position != target {
                let from = tile.position;
                tile.position = target;
                tile.animation_from = Some(from);
                self.surface.move_tile(tile.handle, from, target);
            }
        }

        Some(triplet)
    }

    /// Move a single tile. Returns `false` if the id is not tracked.
    pub fn set_position(&mut self, id: FileId, position: TilePosition) -> bool {
        let Some(tile) = self.tiles.get_mut(&id) else {
            return false;
        };
        if tile.position != position {
            let from = tile.position;
            tile.position = position;
            tile.animation_from = Some(from);
            self.surface.move_tile(tile.handle, from, position);
        }
        true
    }

    /// Apply or clear a manual overlay box.
    pub fn set_layout(&mut self, id: FileId, layout: Option<TileBox>) -> bool {
        let Some(tile) = self.tiles.get_mut(&id) else {
            return false;
        };
        if tile.layout != layout {
            tile.layout = layout;
            self.surface.place_tile(tile.handle, layout);
        }
        true
    }

    /// Toggle the overlay-active marker on one tile.
    pub fn set_overlay_active(&mut self, id: FileId, active: bool) -> bool {
        let Some(tile) = self.tiles.get_mut(&id) else {
            return false;
        };
        if tile.overlay_active != active {
            tile.overlay_active = active;
            self.surface.set_overlay_marker(Some(tile.handle), active);
        }
        true
    }

    /// Toggle the overlay-active marker on the render surface itself.
    pub fn set_surface_overlay(&mut self, active: bool) {
        self.surface.set_overlay_marker(None, active);
    }

    /// Swap a tile's media surface.
    pub fn swap_media(&mut self, id: FileId, media: MediaSurface) -> bool {
        let Some(tile) = self.tiles.get_mut(&id) else {
            return false;
        };
        if tile.media != media {
            tile.media = media;
            self.surface.swap_media(tile.handle, media);
        }
        true
    }

    /// Return every tile to plain grid presentation.
    ///
    /// Clears positions, manual boxes, overlay markers, and media surfaces
    /// on all tiles, including ones that only picked up a box from a layout
    /// pass. Returns the number of tiles that changed.
    pub fn reset_all_to_grid(&mut self) -> usize {
        let mut touched = 0;
        for tile in self.tiles.values_mut() {
            let mut changed = false;
            if tile.media.is_video() {
                tile.media = MediaSurface::Image;
                self.surface.swap_media(tile.handle, MediaSurface::Image);
                changed = true;
            }
            if tile.layout.take().is_some() {
                self.surface.place_tile(tile.handle, None);
                changed = true;
            }
            if tile.overlay_active {
                tile.overlay_active = false;
                self.surface.set_overlay_marker(Some(tile.handle), false);
                changed = true;
            }
            if tile.position != TilePosition::Grid {
                let from = tile.position;
                tile.position = TilePosition::Grid;
                tile.animation_from = Some(from);
                self.surface.move_tile(tile.handle, from, TilePosition::Grid);
                changed = true;
            }
            if changed {
                touched += 1;
            }
        }
        touched
    }
}

/// Put `id` at slot `index`, filling a hole or shifting later slots right.
fn place_in_slots(order: &mut Vec<Option<FileId>>, index: usize, id: FileId) {
    if index >= order.len() {
        order.resize(index, None);
        order.push(Some(id));
    } else if order[index].is_none() {
        order[index] = Some(id);
    } else {
        order.insert(index, Some(id));
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
