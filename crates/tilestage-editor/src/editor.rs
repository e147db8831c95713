//! The editor state machine.
//!
//! Clicks and press-holds are resolved against the named regions of the
//! metadata in a fixed priority order per mode; the first match wins.
//!
//! | mode     | click                                   | press-hold                          |
//! |----------|-----------------------------------------|-------------------------------------|
//! | painting | paint area: inspect / select / place    | paint area: remove                  |
//! |          | `item`: open item box                   | `item`: clear held item             |
//! |          |                                         | `fill`: fill                        |
//! |          | `block` / `cg`: cycle +1                | `block` / `cg`: cycle −1            |
//! |          |                                         | `new`, `save`                       |
//! |          | `stage`: next stage                     | `stage`: previous stage             |
//! | picking  | item box: select                        | `fill`, then item box: select       |
//! |          | paint area, `item`: close               | paint area: close; `item`: clear    |
//! |          | `block` / `cg` / `stage` as above       | `block` / `cg` / `stage` as above   |
//! |          | menu area: close                        | menu area: close                    |

use tilestage_core::{
    Error, GridStore, LayerId, MetaRegistry, ModMask, Msg, Point, Range, Region, Request, TileRef,
};
use tilestage_render::{Batch, Color, DrawCommand, DrawJob, DrawQueue, ImagePath};

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::state::{EditorState, Mode, Notice};

// Region names.
pub(crate) const PAINT_AREA: &str = "stage";
pub(crate) const ITEMBOX_AREA: &str = "itembox";
pub(crate) const MENU_AREA: &str = "menu";
pub(crate) const ITEM: &str = "item";
pub(crate) const BLOCK: &str = "block";
pub(crate) const CG: &str = "cg";
pub(crate) const STAGE: &str = "stage";
pub(crate) const FILL: &str = "fill";
pub(crate) const NEW: &str = "new";
pub(crate) const SAVE: &str = "save";

/// A caption the host draws on the menu layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    pub at: Point,
    pub text: String,
}

/// The stage editor.
#[derive(Debug)]
pub struct Editor {
    pub(crate) config: EditorConfig,
    pub(crate) meta: MetaRegistry,
    pub(crate) store: GridStore,
    pub(crate) state: EditorState,
    pub(crate) draws: DrawQueue,
}

impl Editor {
    /// A new editor showing the load screen.
    pub fn new(config: EditorConfig, meta: MetaRegistry) -> Self {
        let store = GridStore::new(config.size(), config.layers.all.iter().copied());
        let state = EditorState::new(&config.layers, config.start_stage);
        let mut draws = DrawQueue::new();
        draws.push(DrawCommand::Fill {
            layer: config.layers.screen,
            area: Range::sized(config.size()),
            color: Color::BLANK,
        });
        Self {
            config,
            meta,
            store,
            state,
            draws,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn meta(&self) -> &MetaRegistry {
        &self.meta
    }

    pub fn store(&self) -> &GridStore {
        &self.store
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Put back a state previously obtained from [`Editor::state`].
    pub fn restore(&mut self, state: EditorState) {
        self.state = state;
    }

    /// Draw commands queued since the last [`Editor::take_draws`].
    pub fn draws(&self) -> &DrawQueue {
        &self.draws
    }

    pub fn take_draws(&mut self) -> DrawQueue {
        self.draws.take()
    }

    /// Whether the stage layers differ from the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.state
            .tracker
            .is_dirty(&self.store, &self.config.layers.stage)
    }

    /// The request that loads the metadata registry.
    pub fn meta_request(&self) -> Request {
        Request::ReadMeta {
            cg: self.state.cg,
            file: self.config.meta_files.clone(),
        }
    }

    /// The request that loads the menu and the current stage.
    pub fn game_request(&self) -> Request {
        Request::ReadGame {
            cg: self.state.cg,
            file: self.config.game_files(self.state.stage),
        }
    }

    /// Handle one message. Returns the request to send to the content
    /// collaborator, if the message triggered one.
    ///
    /// Errors are contract violations by the content source; the editor
    /// does not recover from them.
    pub fn update(&mut self, msg: Msg) -> Result<Option<Request>, EditorError> {
        if let Some(at) = msg.time() {
            self.state.now = self.state.now.max(at);
            self.expire_notice();
        }
        let request = match msg {
            Msg::Click { pos, modifiers, .. } if self.accepts("click", pos) => {
                self.click(pos, modifiers)?
            }
            Msg::PressHold { pos, .. } if self.accepts("press-hold", pos) => self.press_hold(pos)?,
            Msg::Reply(reply) => {
                self.apply_reply(reply)?;
                None
            }
            _ => None,
        };
        Ok(request)
    }

    fn accepts(&self, kind: &str, pos: Point) -> bool {
        if !self.store.contains(pos) {
            log::debug!("{kind} at {pos} is outside the grid");
            return false;
        }
        if self.meta.mouse_debug() {
            log::info!(
                "{kind} at {pos} on {}",
                self.state.active_layer(&self.config.layers)
            );
        }
        true
    }

    fn click(&mut self, pos: Point, modifiers: ModMask) -> Result<Option<Request>, Error> {
        if self.state.is_picking() {
            if self.meta.in_area(ITEMBOX_AREA, pos) {
                self.select_from_box(pos)?;
            } else if self.meta.in_area(PAINT_AREA, pos) || self.meta.at_hotspot(ITEM, pos) {
                self.close_item_box();
            } else if self.meta.at_hotspot(BLOCK, pos) {
                self.cycle_block(1)?;
            } else if self.meta.at_hotspot(CG, pos) {
                self.cycle_cg(1)?;
            } else if self.meta.at_hotspot(STAGE, pos) {
                return Ok(self.navigate(1));
            } else if self.meta.in_area(MENU_AREA, pos) {
                self.close_item_box();
            }
            return Ok(None);
        }

        if self.meta.in_area(PAINT_AREA, pos) {
            if modifiers.contains(ModMask::ALT) {
                self.inspect(pos)?;
            } else if modifiers.contains(ModMask::SHIFT) {
                self.select_layer_at(pos);
            } else {
                self.place(pos)?;
            }
        } else if self.meta.at_hotspot(ITEM, pos) {
            self.open_item_box();
        } else if self.meta.at_hotspot(BLOCK, pos) {
            self.cycle_block(1)?;
        } else if self.meta.at_hotspot(CG, pos) {
            self.cycle_cg(1)?;
        } else if self.meta.at_hotspot(STAGE, pos) {
            return Ok(self.navigate(1));
        }
        Ok(None)
    }

    fn press_hold(&mut self, pos: Point) -> Result<Option<Request>, Error> {
        if self.state.is_picking() {
            if self.meta.at_hotspot(FILL, pos) {
                self.fill()?;
            } else if self.meta.in_area(ITEMBOX_AREA, pos) {
                self.select_from_box(pos)?;
            } else if self.meta.in_area(PAINT_AREA, pos) {
                self.close_item_box();
            } else if self.meta.at_hotspot(ITEM, pos) {
                self.drop_held();
                self.close_item_box();
            } else if self.meta.at_hotspot(BLOCK, pos) {
                self.cycle_block(-1)?;
            } else if self.meta.at_hotspot(CG, pos) {
                self.cycle_cg(-1)?;
            } else if self.meta.at_hotspot(STAGE, pos) {
                return Ok(self.navigate(-1));
            } else if self.meta.in_area(MENU_AREA, pos) {
                self.close_item_box();
            }
            return Ok(None);
        }

        if self.meta.in_area(PAINT_AREA, pos) {
            self.remove(pos)?;
        } else if self.meta.at_hotspot(ITEM, pos) {
            self.drop_held();
        } else if self.meta.at_hotspot(FILL, pos) {
            self.fill()?;
        } else if self.meta.at_hotspot(BLOCK, pos) {
            self.cycle_block(-1)?;
        } else if self.meta.at_hotspot(CG, pos) {
            self.cycle_cg(-1)?;
        } else if self.meta.at_hotspot(NEW, pos) {
            return Ok(self.new_stage());
        } else if self.meta.at_hotspot(SAVE, pos) {
            return Ok(self.save());
        } else if self.meta.at_hotspot(STAGE, pos) {
            return Ok(self.navigate(-1));
        }
        Ok(None)
    }

    // -----------------------------------------------------------------------
    // Painting
    // -----------------------------------------------------------------------

    /// Pick up the topmost stage tile at `pos`.
    fn inspect(&mut self, pos: Point) -> Result<(), Error> {
        match self.store.top_layer_at(&self.config.layers.stage, pos) {
            Some(layer) => {
                let tile = self.store.get(layer, pos).cloned();
                self.set_slot(tile.clone())?;
                self.state.held = tile;
                self.state.mode = Mode::Painting(layer);
            }
            None => self.drop_held(),
        }
        Ok(())
    }

    /// Jump to the layer holding content at `pos`.
    fn select_layer_at(&mut self, pos: Point) {
        if let Some(layer) = self.store.top_layer_at(&self.config.layers.stage, pos) {
            self.state.mode = Mode::Painting(layer);
        }
    }

    /// Paint the held tile at `pos`, rotating it when the cell already
    /// holds it.
    fn place(&mut self, pos: Point) -> Result<(), Error> {
        let Some(held) = self.state.held.clone() else {
            return Ok(());
        };
        let layer = held.layer();
        if !self.config.layers.is_stage(layer) {
            log::warn!("held tile {held} is not on a stage layer");
            return Ok(());
        }
        let tile = if self.store.get(layer, pos) == Some(&held) {
            self.meta.rotate_target(&held)?.cloned().unwrap_or(held)
        } else {
            held
        };
        self.put_tile(layer, pos, tile.clone())?;
        if self.config.layers.is_stage(tile.layer()) {
            self.state.mode = Mode::Painting(tile.layer());
        } else {
            self.state.mode = Mode::Painting(layer);
        }
        self.state.held = Some(tile);
        Ok(())
    }

    /// Clear the topmost tile at `pos`.
    fn remove(&mut self, pos: Point) -> Result<(), Error> {
        let layer = self
            .store
            .top_layer_at(&self.config.layers.stage, pos)
            .unwrap_or(self.state.painting_layer());
        self.state.mode = Mode::Painting(layer);
        self.store.clear(layer, pos);
        self.draws.push(DrawCommand::Clear {
            layer,
            area: cell(pos),
        });
        self.reset_rotation()
    }

    /// A held tile that is the rotation of the slot tile goes back to the
    /// slot tile.
    fn reset_rotation(&mut self) -> Result<(), Error> {
        let (Some(held), Some(p)) = (&self.state.held, self.spot(ITEM)) else {
            return Ok(());
        };
        let Some(slot) = self.store.get(self.config.layers.menu, p) else {
            return Ok(());
        };
        if self.meta.rotate_target(slot)? == Some(held) {
            self.state.held = Some(slot.clone());
        }
        Ok(())
    }

    /// Fill the configured area of the held tile's layer, or clear the
    /// current layer's area when nothing is held.
    fn fill(&mut self) -> Result<(), Error> {
        let held = self.state.held.clone();
        let layer = held
            .as_ref()
            .map_or(self.state.painting_layer(), TileRef::layer);
        if !self.config.layers.is_stage(layer) {
            log::warn!("cannot fill {layer}");
            return Ok(());
        }
        if let Some(tile) = &held {
            self.meta.render_ref(tile)?;
        }
        self.store.fill_area(layer, self.config.fill_area, held.as_ref());
        self.queue_batch(&[layer], None, false)
    }

    // -----------------------------------------------------------------------
    // Item box
    // -----------------------------------------------------------------------

    fn open_item_box(&mut self) {
        if let Mode::Painting(layer) = self.state.mode {
            self.state.previous = layer;
        }
        self.state.mode = Mode::Picking;
        self.draws
            .push(DrawCommand::Show(self.config.layers.system().to_vec()));
    }

    fn close_item_box(&mut self) {
        self.state.mode = Mode::Painting(self.state.previous);
        self.draws
            .push(DrawCommand::Hide(self.config.layers.system().to_vec()));
    }

    /// Hold the item box tile at `pos` and return to painting on its layer.
    fn select_from_box(&mut self, pos: Point) -> Result<(), Error> {
        let Some(tile) = self.store.get(self.config.layers.item_box, pos).cloned() else {
            return Ok(());
        };
        let layer = tile.layer();
        if !self.config.layers.is_stage(layer) {
            log::warn!("item box tile {tile} is not on a stage layer");
            return Ok(());
        }
        self.set_slot(Some(tile.clone()))?;
        self.state.held = Some(tile);
        self.state.previous = layer;
        self.close_item_box();
        Ok(())
    }

    /// Show `tile` in the held-item slot, or blank the slot.
    pub(crate) fn set_slot(&mut self, tile: Option<TileRef>) -> Result<(), Error> {
        match (tile, self.spot(ITEM)) {
            (Some(tile), Some(p)) => self.put_tile(self.config.layers.menu, p, tile),
            (None, _) => {
                self.blank_slot();
                Ok(())
            }
            (Some(_), None) => Ok(()),
        }
    }

    fn blank_slot(&mut self) {
        if let Some(p) = self.spot(ITEM) {
            self.store.clear(self.config.layers.menu, p);
            self.blank_cell(p);
        }
    }

    fn drop_held(&mut self) {
        self.state.held = None;
        self.blank_slot();
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    /// Store `tile` and queue its draw. Unchanged cells are skipped unless
    /// the graphic set just changed.
    pub(crate) fn put_tile(&mut self, layer: LayerId, p: Point, tile: TileRef) -> Result<(), Error> {
        let image = self.image_for(layer, &tile)?;
        let written = if self.state.cg != self.state.prev_cg {
            self.store.overwrite(layer, p, tile);
            true
        } else {
            self.store.set(layer, p, tile)
        };
        if written {
            self.draws.push(DrawCommand::Tile(DrawJob {
                layer,
                at: p,
                image,
            }));
        }
        Ok(())
    }

    /// The image drawn for `tile` on `layer`. Stage tiles use their alpha
    /// substitute and must be registered.
    fn image_for(&self, layer: LayerId, tile: &TileRef) -> Result<ImagePath, Error> {
        let shown = if self.config.layers.is_stage(layer) {
            self.meta.render_ref(tile)?
        } else {
            tile
        };
        Ok(self.config.image_path(self.state.cg, shown))
    }

    /// Queue a buffered redraw of `layers`, optionally limited to `area`.
    pub(crate) fn queue_batch(
        &mut self,
        layers: &[LayerId],
        area: Option<Range>,
        render_only: bool,
    ) -> Result<(), Error> {
        let mut jobs = Vec::new();
        for &layer in layers {
            for (p, tile) in self.store.layer(layer).tiles() {
                if area.is_none_or(|a| a.contains(p)) {
                    jobs.push(DrawJob {
                        layer,
                        at: p,
                        image: self.image_for(layer, tile)?,
                    });
                }
            }
        }
        self.draws.push(DrawCommand::Batch(Batch {
            layers: layers.to_vec(),
            jobs,
            area,
            render_only,
        }));
        Ok(())
    }

    pub(crate) fn blank_cell(&mut self, p: Point) {
        self.draws.push(DrawCommand::Fill {
            layer: self.config.layers.menu,
            area: cell(p),
            color: Color::BLANK,
        });
    }

    /// A hotspot cell, if the metadata defines one inside the grid.
    pub(crate) fn spot(&self, name: &str) -> Option<Point> {
        let p = self.meta.hotspot(name).ok()?.origin();
        if self.store.contains(p) {
            Some(p)
        } else {
            log::warn!("hotspot `{name}` at {p} is outside the grid");
            None
        }
    }

    // -----------------------------------------------------------------------
    // Text view
    // -----------------------------------------------------------------------

    /// Captions beside every hotspot, plus the stage number on the stage
    /// hotspot.
    pub fn labels(&self) -> Vec<Label> {
        let mut labels: Vec<Label> = self
            .meta
            .hotspots()
            .map(|(name, p)| Label {
                at: p.shift(1, 0),
                text: caption(name),
            })
            .collect();
        if let Some(p) = self.spot(STAGE) {
            labels.push(Label {
                at: p,
                text: self.stage_label(),
            });
        }
        labels
    }

    /// The stage number, zero padded, or `new`.
    pub fn stage_label(&self) -> String {
        match self.state.stage {
            0 => "new".to_string(),
            n => format!("{n:03}"),
        }
    }

    /// The notice currently on screen.
    pub fn notice(&self) -> Option<&Notice> {
        self.state.notice.as_ref()
    }
}

pub(crate) fn cell(p: Point) -> Range {
    Region::Point(p).to_range()
}

/// `cg` reads better as `CG`; longer names are capitalized.
fn caption(name: &str) -> String {
    if name.chars().count() > 2 {
        let mut chars = name.chars();
        chars
            .next()
            .map(|c| c.to_uppercase().chain(chars).collect())
            .unwrap_or_default()
    } else {
        name.to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captions() {
        assert_eq!(caption("cg"), "CG");
        assert_eq!(caption("save"), "Save");
        assert_eq!(caption(""), "");
    }

    #[test]
    fn new_editor_shows_load_screen() {
        let editor = Editor::new(EditorConfig::default(), MetaRegistry::default());
        let cmds: Vec<&DrawCommand> = editor.draws().iter().collect();
        assert_eq!(
            cmds,
            [&DrawCommand::Fill {
                layer: LayerId(8),
                area: Range::new(0, 0, 16, 14),
                color: Color::BLANK,
            }]
        );
        assert_eq!(editor.stage_label(), "001");
    }
}
