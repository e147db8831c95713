//! Editor configuration.

use serde::Deserialize;

use tilestage_core::{LayerGroups, LayerId, Millis, Point, Range, TileRef};
use tilestage_render::{ImagePath, RendererConfig};

/// Static parameters of the editor. Every field has a default, so a partial
/// JSON document is a valid configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Grid columns.
    pub cols: i32,
    /// Grid rows.
    pub rows: i32,
    /// Tile edge in pixels.
    pub tile_size: u32,
    pub layers: LayerGroups,
    /// Prefix of every tile image path.
    pub image_root: String,
    /// Multipliers applied to the metadata `timeout` base.
    pub debounce_factor: u64,
    pub confirm_factor: u64,
    pub notice_factor: u64,
    /// Cells written by the fill command.
    pub fill_area: Range,
    /// Layer and cells scanned for the stage's current block.
    pub block_layer: LayerId,
    pub block_scan: Range,
    /// Block assumed when the scan finds none. Its variant is replaced to
    /// build the block menu icon.
    pub default_block: TileRef,
    /// Stage loaded at start-up.
    pub start_stage: u32,
    /// Content keys of the metadata payload.
    pub meta_files: Vec<String>,
    /// Content key of the menu payload.
    pub menu_file: String,
    /// Content key of a fresh stage.
    pub new_stage_file: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let (cols, rows) = (16, 14);
        Self {
            cols,
            rows,
            tile_size: 32,
            layers: LayerGroups::default(),
            image_root: "/static/image/sprite".into(),
            debounce_factor: 2,
            confirm_factor: 20,
            notice_factor: 20,
            fill_area: Range::new(2, 1, cols - 3, rows - 1),
            block_layer: LayerId(1),
            block_scan: Range::new(1, 0, cols - 2, rows),
            default_block: TileRef::new(LayerId(1), "block", Some(0), ["field", "00"]),
            start_stage: 1,
            meta_files: ["sprite", "position", "debug"]
                .iter()
                .map(|f| format!("meta/make/{f}"))
                .collect(),
            menu_file: "menu/make".into(),
            new_stage_file: "stage/new".into(),
        }
    }
}

impl EditorConfig {
    /// Grid size in cells.
    pub fn size(&self) -> Point {
        Point::new(self.cols, self.rows)
    }

    pub fn renderer_config(&self) -> RendererConfig {
        RendererConfig {
            tile_size: self.tile_size,
            extent: self.size(),
        }
    }

    /// Content keys of the menu plus stage `stage`.
    pub fn game_files(&self, stage: u32) -> Vec<String> {
        vec![self.menu_file.clone(), format!("stage/{stage:03}")]
    }

    /// Image path of `tile` in graphic set `cg`.
    pub fn image_path(&self, cg: u8, tile: &TileRef) -> ImagePath {
        ImagePath::for_tile(&self.image_root, cg, tile)
    }

    /// Window in which repeated cycling or navigation triggers are dropped.
    pub fn debounce(&self, base: Millis) -> Millis {
        base.times(self.debounce_factor)
    }

    /// Window in which a repeated navigation confirms discarding changes.
    pub fn confirm_window(&self, base: Millis) -> Millis {
        base.times(self.confirm_factor)
    }

    /// Lifetime of an on-screen notice.
    pub fn notice_window(&self, base: Millis) -> Millis {
        base.times(self.notice_factor)
    }

    /// The block menu icon for variant `block`.
    pub fn block_icon(&self, block: u8) -> TileRef {
        self.default_block.with_variant(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.size(), Point::new(16, 14));
        assert_eq!(config.fill_area, Range::new(2, 1, 13, 13));
        assert_eq!(config.block_scan, Range::new(1, 0, 14, 14));
        assert_eq!(config.game_files(1), ["menu/make", "stage/001"]);
        assert_eq!(config.meta_files[0], "meta/make/sprite");
        assert_eq!(config.debounce(Millis(100)), Millis(200));
        assert_eq!(config.confirm_window(Millis(100)), Millis(2000));
        assert_eq!(config.block_icon(3).to_string(), "layer1/block/03/field/00");
    }

    #[test]
    fn image_paths_use_two_digit_cg() {
        let config = EditorConfig::default();
        let tile: TileRef = "layer2/tree/00".parse().unwrap();
        assert_eq!(
            config.image_path(1, &tile).as_str(),
            "/static/image/sprite/01/layer2/tree/00.png"
        );
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{ "tile_size": 16, "image_root": "/sprites" }"#).unwrap();
        assert_eq!(config.tile_size, 16);
        assert_eq!(config.cols, 16);
        assert_eq!(config.layers, LayerGroups::default());
    }
}
