//! The Grid Store: per-layer 2D arrays of tile references.
//!
//! [`TileGrid`] holds one layer, [`GridStore`] every layer of a stage at a
//! fixed size. Coordinates outside the grid are programmer errors and panic,
//! like slice indexing; callers that handle user input check
//! [`GridStore::contains`] first.

use std::collections::BTreeMap;

use crate::error::Error;
use crate::geom::{Point, Range};
use crate::layer::LayerId;
use crate::tile::TileRef;

// ---------------------------------------------------------------------------
// TileGrid
// ---------------------------------------------------------------------------

/// One layer's cells, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    cells: Vec<Option<TileRef>>,
    size: Point,
}

impl TileGrid {
    /// Create an empty grid of `size` (columns, rows).
    pub fn new(size: Point) -> Self {
        let len = Range::sized(size).len();
        Self {
            cells: vec![None; len],
            size,
        }
    }

    /// Parse a grid from its wire form: a list of rows, each a list of tile
    /// reference strings with `""` for an empty cell.
    pub fn from_rows(layer: LayerId, rows: &[Vec<String>], size: Point) -> Result<Self, Error> {
        let shape_error = |found: Point| Error::GridShape {
            layer,
            expected: size,
            found,
        };
        if rows.len() != size.y as usize {
            let width = rows.first().map_or(0, Vec::len) as i32;
            return Err(shape_error(Point::new(width, rows.len() as i32)));
        }
        let mut grid = Self::new(size);
        for (y, row) in rows.iter().enumerate() {
            if row.len() != size.x as usize {
                return Err(shape_error(Point::new(row.len() as i32, rows.len() as i32)));
            }
            for (x, s) in row.iter().enumerate() {
                if !s.is_empty() {
                    grid.cells[y * size.x as usize + x] = Some(s.parse()?);
                }
            }
        }
        Ok(grid)
    }

    /// The wire form of the grid. Empty cells become `""`.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        self.cells
            .chunks(self.size.x.max(1) as usize)
            .map(|row| {
                row.iter()
                    .map(|cell| cell.as_ref().map(TileRef::to_string).unwrap_or_default())
                    .collect()
            })
            .collect()
    }

    #[inline]
    pub fn size(&self) -> Point {
        self.size
    }

    #[inline]
    pub fn bounds(&self) -> Range {
        Range::sized(self.size)
    }

    #[track_caller]
    fn index(&self, p: Point) -> usize {
        assert!(
            self.bounds().contains(p),
            "cell {p} outside grid of size {}",
            self.size
        );
        p.y as usize * self.size.x as usize + p.x as usize
    }

    /// The tile at `p`, if any.
    ///
    /// # Panics
    ///
    /// Panics if `p` is outside the grid.
    #[track_caller]
    pub fn get(&self, p: Point) -> Option<&TileRef> {
        self.cells[self.index(p)].as_ref()
    }

    /// Store `tile` at `p`. Returns `false` and leaves the grid untouched
    /// when the cell already holds an equal reference.
    ///
    /// # Panics
    ///
    /// Panics if `p` is outside the grid.
    #[track_caller]
    pub fn set(&mut self, p: Point, tile: TileRef) -> bool {
        let i = self.index(p);
        if self.cells[i].as_ref() == Some(&tile) {
            return false;
        }
        self.cells[i] = Some(tile);
        true
    }

    /// Store `tile` at `p` unconditionally.
    #[track_caller]
    pub fn overwrite(&mut self, p: Point, tile: TileRef) {
        let i = self.index(p);
        self.cells[i] = Some(tile);
    }

    /// Empty the cell at `p`, returning what it held.
    #[track_caller]
    pub fn clear(&mut self, p: Point) -> Option<TileRef> {
        let i = self.index(p);
        self.cells[i].take()
    }

    /// Non-empty cells in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (Point, &TileRef)> + '_ {
        self.bounds()
            .iter()
            .zip(&self.cells)
            .filter_map(|(p, cell)| cell.as_ref().map(|t| (p, t)))
    }

    /// Number of non-empty cells.
    pub fn count(&self) -> usize {
        self.cells.iter().flatten().count()
    }
}

// ---------------------------------------------------------------------------
// GridStore
// ---------------------------------------------------------------------------

/// Every layer of a stage, all sharing one size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridStore {
    size: Point,
    layers: BTreeMap<LayerId, TileGrid>,
}

impl GridStore {
    /// Create a store with an empty grid for each of `layers`.
    pub fn new(size: Point, layers: impl IntoIterator<Item = LayerId>) -> Self {
        Self {
            size,
            layers: layers.into_iter().map(|id| (id, TileGrid::new(size))).collect(),
        }
    }

    #[inline]
    pub fn size(&self) -> Point {
        self.size
    }

    /// Whether `p` is a valid cell coordinate.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        Range::sized(self.size).contains(p)
    }

    #[inline]
    pub fn has_layer(&self, layer: LayerId) -> bool {
        self.layers.contains_key(&layer)
    }

    /// Layer ids in stacking order.
    pub fn layer_ids(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.layers.keys().copied()
    }

    /// The grid of `layer`.
    ///
    /// # Panics
    ///
    /// Panics if the store has no such layer.
    #[track_caller]
    pub fn layer(&self, layer: LayerId) -> &TileGrid {
        match self.layers.get(&layer) {
            Some(grid) => grid,
            None => panic!("no grid for {layer}"),
        }
    }

    #[track_caller]
    fn layer_mut(&mut self, layer: LayerId) -> &mut TileGrid {
        match self.layers.get_mut(&layer) {
            Some(grid) => grid,
            None => panic!("no grid for {layer}"),
        }
    }

    /// The tile on `layer` at `p`.
    ///
    /// # Panics
    ///
    /// Panics on an unknown layer or a coordinate outside the grid.
    #[track_caller]
    pub fn get(&self, layer: LayerId, p: Point) -> Option<&TileRef> {
        self.layer(layer).get(p)
    }

    /// Idempotent store; see [`TileGrid::set`].
    #[track_caller]
    pub fn set(&mut self, layer: LayerId, p: Point, tile: TileRef) -> bool {
        self.layer_mut(layer).set(p, tile)
    }

    /// Forced store, used when the resolved image changed even though the
    /// reference did not.
    #[track_caller]
    pub fn overwrite(&mut self, layer: LayerId, p: Point, tile: TileRef) {
        self.layer_mut(layer).overwrite(p, tile);
    }

    #[track_caller]
    pub fn clear(&mut self, layer: LayerId, p: Point) -> Option<TileRef> {
        self.layer_mut(layer).clear(p)
    }

    /// Replace a layer wholesale. The grid must match the store size.
    pub fn set_layer(&mut self, layer: LayerId, grid: TileGrid) -> Result<(), Error> {
        if !self.has_layer(layer) {
            return Err(Error::UnknownLayer(layer.to_string()));
        }
        if grid.size() != self.size {
            return Err(Error::GridShape {
                layer,
                expected: self.size,
                found: grid.size(),
            });
        }
        self.layers.insert(layer, grid);
        Ok(())
    }

    /// Replace every layer present in `rows`, returning the ids that were
    /// loaded. Nothing is replaced unless every layer parses.
    pub fn load_rows(&mut self, rows: &BTreeMap<LayerId, Vec<Vec<String>>>) -> Result<Vec<LayerId>, Error> {
        let mut parsed = Vec::with_capacity(rows.len());
        for (&layer, layer_rows) in rows {
            if !self.has_layer(layer) {
                return Err(Error::UnknownLayer(layer.to_string()));
            }
            parsed.push((layer, TileGrid::from_rows(layer, layer_rows, self.size)?));
        }
        let ids = parsed.iter().map(|(id, _)| *id).collect();
        for (layer, grid) in parsed {
            self.layers.insert(layer, grid);
        }
        Ok(ids)
    }

    /// Wire form of `layer`.
    #[track_caller]
    pub fn rows(&self, layer: LayerId) -> Vec<Vec<String>> {
        self.layer(layer).to_rows()
    }

    /// Wire form of each of `layers`, keyed by layer.
    pub fn rows_of(&self, layers: &[LayerId]) -> BTreeMap<LayerId, Vec<Vec<String>>> {
        layers.iter().map(|&id| (id, self.rows(id))).collect()
    }

    /// The highest-stacked layer among `layers` with a tile at `p`.
    #[track_caller]
    pub fn top_layer_at(&self, layers: &[LayerId], p: Point) -> Option<LayerId> {
        layers
            .iter()
            .rev()
            .copied()
            .find(|&id| self.get(id, p).is_some())
    }

    /// The first tile of `category` on `layer` within `area`, scanning
    /// row-major.
    pub fn find_first(&self, layer: LayerId, area: Range, category: &str) -> Option<&TileRef> {
        let grid = self.layer(layer);
        area.intersect(grid.bounds())
            .iter()
            .filter_map(|p| grid.get(p))
            .find(|tile| tile.is_variant_of(category))
    }

    /// Rewrite the variant of every `category` tile on `layers` to
    /// `variant`. Other cells are untouched. Returns how many cells changed.
    pub fn rewrite_variant(&mut self, layers: &[LayerId], category: &str, variant: u8) -> usize {
        let mut changed = 0;
        for &id in layers {
            let grid = self.layer_mut(id);
            for cell in grid.cells.iter_mut().flatten() {
                if cell.is_variant_of(category) && cell.variant() != Some(variant) {
                    *cell = cell.with_variant(variant);
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Set every cell of `area` on `layer` to `tile` (or empty it).
    pub fn fill_area(&mut self, layer: LayerId, area: Range, tile: Option<&TileRef>) {
        let grid = self.layer_mut(layer);
        for p in area.intersect(grid.bounds()) {
            let i = grid.index(p);
            grid.cells[i] = tile.cloned();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(s: &str) -> TileRef {
        s.parse().unwrap()
    }

    fn store() -> GridStore {
        GridStore::new(Point::new(4, 3), [LayerId(1), LayerId(2), LayerId(3)])
    }

    #[test]
    fn set_then_get() {
        let mut s = store();
        let p = Point::new(2, 1);
        assert!(s.set(LayerId(2), p, tile("layer2/tree/00")));
        assert_eq!(s.get(LayerId(2), p), Some(&tile("layer2/tree/00")));
        assert_eq!(s.get(LayerId(1), p), None);
    }

    #[test]
    fn set_is_idempotent() {
        let mut s = store();
        let p = Point::new(0, 0);
        assert!(s.set(LayerId(1), p, tile("layer1/block/00/field/00")));
        assert!(!s.set(LayerId(1), p, tile("layer1/block/00/field/00")));
        assert!(s.set(LayerId(1), p, tile("layer1/block/01/field/00")));
    }

    #[test]
    fn clear_returns_previous() {
        let mut s = store();
        let p = Point::new(3, 2);
        s.set(LayerId(3), p, tile("layer3/door/00"));
        assert_eq!(s.clear(LayerId(3), p), Some(tile("layer3/door/00")));
        assert_eq!(s.get(LayerId(3), p), None);
        assert_eq!(s.clear(LayerId(3), p), None);
    }

    #[test]
    #[should_panic]
    fn out_of_range_access_panics() {
        store().get(LayerId(1), Point::new(4, 0));
    }

    #[test]
    #[should_panic]
    fn unknown_layer_panics() {
        store().get(LayerId(7), Point::ZERO);
    }

    #[test]
    fn rows_round_trip() {
        let rows = vec![
            vec!["".into(), "layer1/block/00/field/00".into(), "".into(), "".into()],
            vec!["".into(); 4],
            vec!["layer1/block/00/wall/01".into(), "".into(), "".into(), "".into()],
        ];
        let grid = TileGrid::from_rows(LayerId(1), &rows, Point::new(4, 3)).unwrap();
        assert_eq!(grid.count(), 2);
        assert_eq!(grid.to_rows(), rows);
    }

    #[test]
    fn load_rows_checks_shape() {
        let mut s = store();
        let mut rows = BTreeMap::new();
        rows.insert(LayerId(1), vec![vec![String::new(); 4]; 2]);
        let err = s.load_rows(&rows).unwrap_err();
        assert!(matches!(err, Error::GridShape { layer: LayerId(1), .. }));

        let mut rows = BTreeMap::new();
        rows.insert(LayerId(1), vec![vec![String::new(); 4]; 3]);
        rows.insert(LayerId(2), vec![vec!["oops".to_string(); 4]; 3]);
        assert!(matches!(s.load_rows(&rows), Err(Error::MalformedTile(_))));
    }

    #[test]
    fn load_rows_rejects_unknown_layer() {
        let mut s = store();
        let mut rows = BTreeMap::new();
        rows.insert(LayerId(6), vec![vec![String::new(); 4]; 3]);
        assert!(matches!(s.load_rows(&rows), Err(Error::UnknownLayer(_))));
    }

    #[test]
    fn top_layer_searches_downward() {
        let mut s = store();
        let p = Point::new(1, 1);
        let stage = [LayerId(1), LayerId(2), LayerId(3)];
        assert_eq!(s.top_layer_at(&stage, p), None);
        s.set(LayerId(1), p, tile("layer1/block/00/field/00"));
        s.set(LayerId(2), p, tile("layer2/tree/00"));
        assert_eq!(s.top_layer_at(&stage, p), Some(LayerId(2)));
    }

    #[test]
    fn rewrite_variant_only_touches_category() {
        let mut s = store();
        s.set(LayerId(1), Point::new(0, 0), tile("layer1/block/00/field/00"));
        s.set(LayerId(3), Point::new(1, 0), tile("layer3/block/00/pillar/00"));
        s.set(LayerId(2), Point::new(2, 0), tile("layer2/item/00/key"));
        let n = s.rewrite_variant(&[LayerId(1), LayerId(2), LayerId(3)], "block", 4);
        assert_eq!(n, 2);
        assert_eq!(s.get(LayerId(1), Point::new(0, 0)), Some(&tile("layer1/block/04/field/00")));
        assert_eq!(s.get(LayerId(3), Point::new(1, 0)), Some(&tile("layer3/block/04/pillar/00")));
        assert_eq!(s.get(LayerId(2), Point::new(2, 0)), Some(&tile("layer2/item/00/key")));
    }

    #[test]
    fn find_first_scans_row_major() {
        let mut s = store();
        s.set(LayerId(1), Point::new(3, 0), tile("layer1/block/02/field/00"));
        s.set(LayerId(1), Point::new(1, 1), tile("layer1/block/03/field/00"));
        let area = Range::new(1, 0, 3, 3);
        assert_eq!(s.find_first(LayerId(1), area, "block"), Some(&tile("layer1/block/03/field/00")));
    }

    #[test]
    fn fill_area_sets_and_clears() {
        let mut s = store();
        let area = Range::new(1, 1, 3, 3);
        s.fill_area(LayerId(2), area, Some(&tile("layer2/tree/00")));
        assert_eq!(s.layer(LayerId(2)).count(), 4);
        s.fill_area(LayerId(2), area, None);
        assert_eq!(s.layer(LayerId(2)).count(), 0);
    }
}
