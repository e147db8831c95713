//! The explicit editor state.

use tilestage_core::{ChangeTracker, ExpiringFlag, LayerGroups, LayerId, Millis, Range, TileRef};

/// What clicks on the paint area do.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Placing and removing tiles on a stage layer.
    Painting(LayerId),
    /// The item box overlay is open.
    Picking,
}

/// A transient message drawn by the host in the menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Cells the text occupies.
    pub area: Range,
    pub text: String,
    pub expires: Millis,
}

/// Session state of the editor. Snapshots taken with
/// [`Editor::state`](crate::Editor::state) can be put back with
/// [`Editor::restore`](crate::Editor::restore).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorState {
    pub mode: Mode,
    /// Stage layer restored when the item box closes.
    pub previous: LayerId,
    /// Tile placed by clicks on the paint area.
    pub held: Option<TileRef>,
    /// Current block variant.
    pub block: u8,
    /// Current graphic set and the one before the last cycle.
    pub cg: u8,
    pub prev_cg: u8,
    /// Current stage number; `0` is an unsaved new stage.
    pub stage: u32,
    pub tracker: ChangeTracker,
    /// Debounce for cycling and navigation.
    pub loading: ExpiringFlag,
    /// Armed by the first navigation away from unsaved changes.
    pub confirm: ExpiringFlag,
    pub notice: Option<Notice>,
    /// Latest time seen in a message.
    pub now: Millis,
}

impl EditorState {
    pub fn new(groups: &LayerGroups, stage: u32) -> Self {
        let first = groups.stage.first().copied().unwrap_or(LayerId(1));
        Self {
            mode: Mode::Painting(first),
            previous: first,
            held: None,
            block: 0,
            cg: 0,
            prev_cg: 0,
            stage,
            tracker: ChangeTracker::default(),
            loading: ExpiringFlag::default(),
            confirm: ExpiringFlag::default(),
            notice: None,
            now: Millis::default(),
        }
    }

    /// The layer interactions currently address.
    pub fn active_layer(&self, groups: &LayerGroups) -> LayerId {
        match self.mode {
            Mode::Painting(layer) => layer,
            Mode::Picking => groups.item_box,
        }
    }

    /// The stage layer painting resumes on.
    pub fn painting_layer(&self) -> LayerId {
        match self.mode {
            Mode::Painting(layer) => layer,
            Mode::Picking => self.previous,
        }
    }

    #[inline]
    pub fn is_picking(&self) -> bool {
        self.mode == Mode::Picking
    }
}
