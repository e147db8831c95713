//! Menu commands, notices and collaborator replies.

use tilestage_core::{Error, GridStore, LayerId, LayerRows, Range, Region, Reply, Request, TileRef, VariantKind};
use tilestage_render::{Color, DrawCommand};

use crate::editor::{BLOCK, CG, Editor, FILL, ITEM, ITEMBOX_AREA, NEW, SAVE, STAGE};
use crate::state::Notice;

/// Tile category cycled by the block command.
const BLOCK_CATEGORY: &str = "block";

/// `current + step` wrapped into `0..=last`.
fn cycle(current: u8, step: i32, last: u8) -> u8 {
    let n = (i32::from(current) + step).rem_euclid(i32::from(last) + 1);
    u8::try_from(n).unwrap_or(0)
}

/// The menu icon `layer0/{name}/00`.
fn icon(name: &str) -> TileRef {
    TileRef::new(LayerId(0), name, Some(0), std::iter::empty::<String>())
}

impl Editor {
    /// Whether a cycling or navigation trigger falls in the debounce window.
    /// Arms the window otherwise.
    fn debounced(&mut self, what: &str) -> bool {
        let now = self.state.now;
        let window = self.config.debounce(self.meta.timeout());
        if self.state.loading.try_arm(now, window) {
            log::debug!("{what} dropped: still loading");
            true
        } else {
            false
        }
    }

    /// Step the block variant and rewrite every block tile to it.
    pub(crate) fn cycle_block(&mut self, step: i32) -> Result<(), Error> {
        if self.debounced("block cycle") {
            return Ok(());
        }
        let block = cycle(
            self.state.block,
            step,
            self.meta.last_variant(VariantKind::Block),
        );
        self.state.block = block;
        self.put_block_icon()?;

        let make = self.config.layers.make();
        let changed = self.store.rewrite_variant(&make, BLOCK_CATEGORY, block);
        log::debug!("block {block:02}: {changed} cells rewritten");
        let stage = self.config.layers.stage.clone();
        self.queue_batch(&stage, None, false)?;

        self.update_held_block(block)?;
        self.refresh_item_box(block)
    }

    /// Step the graphic set and redraw everything in it.
    pub(crate) fn cycle_cg(&mut self, step: i32) -> Result<(), Error> {
        if self.debounced("cg cycle") {
            return Ok(());
        }
        let cg = cycle(self.state.cg, step, self.meta.last_variant(VariantKind::Cg));
        self.state.prev_cg = self.state.cg;
        self.state.cg = cg;

        let stage = self.config.layers.stage.clone();
        self.queue_batch(&stage, None, false)?;
        let item_box = self.config.layers.item_box;
        let render_only = !self.state.is_picking();
        self.queue_batch(&[item_box], None, render_only)?;

        // Forced redraws while cg != prev_cg.
        let menu = self.config.layers.menu;
        if let Some(p) = self.spot(CG) {
            self.put_tile(menu, p, icon(CG))?;
        }
        self.put_block_icon()?;
        if let Some(held) = self.state.held.clone() {
            self.set_slot(Some(held))?;
        }
        self.state.prev_cg = cg;
        Ok(())
    }

    /// Request the neighbouring stage, asking for a second trigger first
    /// when there are unsaved changes.
    pub(crate) fn navigate(&mut self, step: i32) -> Option<Request> {
        let now = self.state.now;
        if self.is_dirty() && !self.state.confirm.is_set(now) {
            self.show_notice(STAGE, "Tap Again");
            let window = self.config.confirm_window(self.meta.timeout());
            self.state.confirm.arm(now, window);
            return None;
        }
        if self.debounced("stage navigation") {
            return None;
        }
        self.state.confirm.clear();
        self.dismiss_notice();
        Some(Request::NextStage {
            cg: self.state.cg,
            stage: self.state.stage,
            next: step,
        })
    }

    /// Start an unsaved stage from the template.
    pub(crate) fn new_stage(&mut self) -> Option<Request> {
        if self.state.stage == 0 && !self.is_dirty() {
            log::debug!("already on a fresh stage");
            return None;
        }
        self.state.stage = 0;
        Some(Request::NewStage {
            cg: self.state.cg,
            file: vec![self.config.new_stage_file.clone()],
        })
    }

    /// Persist the stage layers.
    pub(crate) fn save(&mut self) -> Option<Request> {
        if self.meta.is_demo() {
            self.show_notice(SAVE, "Demo mode");
            return None;
        }
        if !self.is_dirty() {
            self.show_notice(SAVE, "No\nChanges");
            return None;
        }
        Some(Request::SaveStage {
            content: "stage".into(),
            cg: self.state.cg,
            stage: self.state.stage,
            blocks: self.store.rows_of(&self.config.layers.stage),
        })
    }

    fn put_block_icon(&mut self) -> Result<(), Error> {
        let Some(p) = self.spot(BLOCK) else {
            return Ok(());
        };
        let menu = self.config.layers.menu;
        let icon = self.config.block_icon(self.state.block);
        self.put_tile(menu, p, icon)
    }

    /// A held block follows the current block variant.
    fn update_held_block(&mut self, block: u8) -> Result<(), Error> {
        let Some(p) = self.spot(ITEM) else {
            return Ok(());
        };
        let slot = self.store.get(self.config.layers.menu, p).cloned();
        if let Some(tile) = slot.filter(|t| t.is_variant_of(BLOCK_CATEGORY)) {
            let tile = tile.with_variant(block);
            self.blank_cell(p);
            self.state.held = Some(tile.clone());
            self.set_slot(Some(tile))?;
        }
        Ok(())
    }

    /// Rewrite and redraw the item box. It is only made visible while
    /// picking.
    fn refresh_item_box(&mut self, block: u8) -> Result<(), Error> {
        let item_box = self.config.layers.item_box;
        self.store.rewrite_variant(&[item_box], BLOCK_CATEGORY, block);
        let area = self.meta.area(ITEMBOX_AREA).ok().map(Region::to_range);
        let render_only = !self.state.is_picking();
        self.queue_batch(&[item_box], area, render_only)
    }

    /// The current block: the first block tile in the scan area, or the
    /// configured default.
    fn scan_block(&self) -> u8 {
        self.store
            .find_first(self.config.block_layer, self.config.block_scan, BLOCK_CATEGORY)
            .and_then(TileRef::variant)
            .or(self.config.default_block.variant())
            .unwrap_or(0)
    }

    // -----------------------------------------------------------------------
    // Notices
    // -----------------------------------------------------------------------

    /// Show `text` in the two cells below the hotspot `anchor`.
    pub(crate) fn show_notice(&mut self, anchor: &str, text: &str) {
        let Some(p) = self.spot(anchor) else {
            return;
        };
        self.dismiss_notice();
        let area = Range::new(p.x, p.y + 1, p.x + 2, p.y + 2);
        self.draws.push(DrawCommand::Clear {
            layer: self.config.layers.menu,
            area,
        });
        let expires = self.state.now + self.config.notice_window(self.meta.timeout());
        log::debug!("notice {text:?} until {expires}");
        self.state.notice = Some(Notice {
            area,
            text: text.to_string(),
            expires,
        });
    }

    pub(crate) fn dismiss_notice(&mut self) {
        if let Some(notice) = self.state.notice.take() {
            self.draws.push(DrawCommand::Clear {
                layer: self.config.layers.menu,
                area: notice.area,
            });
        }
    }

    pub(crate) fn expire_notice(&mut self) {
        if self
            .state
            .notice
            .as_ref()
            .is_some_and(|n| n.expires <= self.state.now)
        {
            self.dismiss_notice();
        }
    }

    // -----------------------------------------------------------------------
    // Replies
    // -----------------------------------------------------------------------

    pub(crate) fn apply_reply(&mut self, reply: Reply) -> Result<(), Error> {
        match reply {
            Reply::Meta(meta) => {
                self.meta = *meta;
                Ok(())
            }
            Reply::Game(rows) => self.load_game(&rows),
            Reply::Stage(rows) => self.load_stage(&rows, 0),
            Reply::Navigated { stage, layers } => self.load_stage(&layers, stage),
            Reply::Saved { stage } => {
                self.saved(stage);
                Ok(())
            }
        }
    }

    /// Replace the whole store with the menu and stage payload.
    fn load_game(&mut self, rows: &LayerRows) -> Result<(), Error> {
        let mut store = GridStore::new(
            self.config.size(),
            self.config.layers.all.iter().copied(),
        );
        let loaded = store.load_rows(rows)?;
        self.store = store;
        log::info!("game loaded: {} layers", loaded.len());

        let stage = self.config.layers.stage.clone();
        self.state.tracker.mark_saved(&self.store, &stage);
        self.queue_batch(&loaded, None, false)?;
        self.menu_context()?;
        self.system_context();
        self.draws
            .push(DrawCommand::Hide(self.config.layers.system().to_vec()));
        self.draws.push(DrawCommand::Clear {
            layer: self.config.layers.screen,
            area: Range::sized(self.config.size()),
        });
        Ok(())
    }

    /// Icons and blank slots for every menu hotspot.
    fn menu_context(&mut self) -> Result<(), Error> {
        let menu = self.config.layers.menu;
        let spots: Vec<(String, _)> = self
            .meta
            .hotspots()
            .map(|(name, p)| (name.to_string(), p))
            .collect();
        for (name, p) in spots {
            if !self.store.contains(p) {
                log::warn!("hotspot `{name}` at {p} is outside the grid");
                continue;
            }
            match name.as_str() {
                ITEM => {
                    self.state.held = None;
                    self.store.clear(menu, p);
                    self.blank_cell(p);
                }
                STAGE => self.blank_cell(p),
                BLOCK => {
                    self.state.block = self.scan_block();
                    self.put_block_icon()?;
                }
                FILL | CG | NEW | SAVE => self.put_tile(menu, p, icon(&name))?,
                _ => {}
            }
        }
        Ok(())
    }

    /// The dimming fill behind the item box.
    fn system_context(&mut self) {
        let Ok(Region::Area { start, end }) = self.meta.area(ITEMBOX_AREA) else {
            return;
        };
        let width = self.config.cols - (end.x - start.x + 1);
        let height = self.config.rows - (end.y - 1);
        self.draws.push(DrawCommand::Fill {
            layer: self.config.layers.fill,
            area: Range::new(start.x, 0, start.x + width, height),
            color: Color::SYSTEM,
        });
    }

    /// Merge the payload of stage `number` into the stage layers. The stage
    /// number only changes once the payload is fully applied.
    fn load_stage(&mut self, rows: &LayerRows, number: u32) -> Result<(), Error> {
        let loaded = self.store.load_rows(rows)?;
        let previous = self.state.block;
        self.state.block = self.scan_block();
        let stage = self.config.layers.stage.clone();
        if number == 0 && self.state.block != previous {
            // A fresh stage starts in the block already chosen.
            self.state.block = previous;
            self.store.rewrite_variant(&stage, BLOCK_CATEGORY, previous);
        }

        self.queue_batch(&loaded, None, true)?;
        self.put_block_icon()?;
        self.draws.push(DrawCommand::Show(stage.clone()));
        if number != 0 && self.state.block != previous {
            self.update_held_block(self.state.block)?;
            self.refresh_item_box(self.state.block)?;
        }
        if let Some(p) = self.spot(STAGE) {
            self.blank_cell(p);
        }
        self.state.stage = number;
        self.state.tracker.mark_saved(&self.store, &stage);
        log::info!("stage {} loaded", self.stage_label());
        Ok(())
    }

    fn saved(&mut self, stage: u32) {
        self.show_notice(SAVE, &format!("Saved {stage:03}!!"));
        self.state.stage = stage;
        self.state
            .tracker
            .mark_saved(&self.store, &self.config.layers.stage);
        log::info!("stage {stage:03} saved");
        if let Some(p) = self.spot(STAGE) {
            self.blank_cell(p);
        }
    }
}
