//! **tilestage-editor**: the interactive stage editor.
//!
//! [`Editor`] is a synchronous state machine: it receives [`Msg`]s (clicks,
//! press-holds, ticks and collaborator replies), mutates the grid store and
//! its [`EditorState`], queues draw commands, and returns the
//! [`Request`] to send to the content collaborator, if any. [`App`] wires an
//! editor to a [`Renderer`] and a [`ContentService`].
//!
//! [`Msg`]: tilestage_core::Msg
//! [`Request`]: tilestage_core::Request
//! [`Renderer`]: tilestage_render::Renderer

pub mod app;
pub mod config;
pub mod editor;
pub mod error;
mod menu;
pub mod state;

pub use app::{App, ContentService, ServiceError};
pub use config::EditorConfig;
pub use editor::{Editor, Label};
pub use error::EditorError;
pub use state::{EditorState, Mode, Notice};
