//! The application loop: [`ContentService`], [`App`].

use std::future::Future;

use thiserror::Error;

use tilestage_core::{Envelope, Error, MetaRegistry, Msg, Reply, Request};
use tilestage_render::{DrainReport, ImageSource, Renderer, Surface, SurfaceProvider};

use crate::config::EditorConfig;
use crate::editor::Editor;
use crate::error::EditorError;

// ---------------------------------------------------------------------------
// ContentService
// ---------------------------------------------------------------------------

/// A request the content collaborator could not answer.
#[derive(Debug, Error)]
#[error("content service: {0}")]
pub struct ServiceError(pub String);

/// The content collaborator: answers [`Request`]s with JSON envelopes.
pub trait ContentService {
    fn call(&mut self, request: &Request) -> impl Future<Output = Result<Envelope, ServiceError>>;
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// An [`Editor`] wired to a [`Renderer`] and a [`ContentService`].
///
/// Requests are performed one at a time; the reply is fed back to the
/// editor before its draw queue is drained.
pub struct App<S, I, C>
where
    S: Surface,
    I: ImageSource<Image = S::Image>,
    C: ContentService,
{
    editor: Editor,
    renderer: Renderer<S, I>,
    service: C,
}

impl<S, I, C> App<S, I, C>
where
    S: Surface,
    I: ImageSource<Image = S::Image>,
    C: ContentService,
{
    /// Bind every configured layer and start on the load screen.
    pub fn new<P>(
        config: EditorConfig,
        source: I,
        provider: &mut P,
        service: C,
    ) -> Result<Self, EditorError>
    where
        P: SurfaceProvider<Surface = S>,
    {
        let renderer = Renderer::bind(
            config.renderer_config(),
            source,
            provider,
            &config.layers.all,
        )?;
        Ok(Self {
            editor: Editor::new(config, MetaRegistry::default()),
            renderer,
            service,
        })
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn renderer(&self) -> &Renderer<S, I> {
        &self.renderer
    }

    pub fn service(&self) -> &C {
        &self.service
    }

    /// Load the metadata, then the menu and start stage. A collaborator
    /// failure is logged and leaves the load screen up.
    pub async fn start(&mut self) -> Result<DrainReport, EditorError> {
        let meta = self.editor.meta_request();
        if self.perform(&meta).await? {
            let game = self.editor.game_request();
            self.perform(&game).await?;
        }
        Ok(self.flush().await)
    }

    /// Feed `msg` to the editor, answer the request it returns, and draw.
    pub async fn dispatch(&mut self, msg: Msg) -> Result<DrainReport, EditorError> {
        if let Some(request) = self.editor.update(msg)? {
            self.perform(&request).await?;
        }
        Ok(self.flush().await)
    }

    /// Execute every queued draw command.
    pub async fn flush(&mut self) -> DrainReport {
        let mut draws = self.editor.take_draws();
        self.renderer.drain(&mut draws).await
    }

    /// Send `request` and apply its reply. Returns whether the reply was
    /// applied.
    ///
    /// A failed call or an error envelope is logged and the request
    /// abandoned. A reply that breaks the data contract is an error.
    async fn perform(&mut self, request: &Request) -> Result<bool, EditorError> {
        log::debug!("request {}", request.method());
        let envelope = match self.service.call(request).await {
            Ok(envelope) => envelope,
            Err(err) => {
                log::error!("{} failed: {err}", request.method());
                return Ok(false);
            }
        };
        let reply = match Reply::decode(request, envelope) {
            Ok(reply) => reply,
            Err(err @ (Error::Service(_) | Error::MissingData)) => {
                log::error!("{} failed: {err}", request.method());
                return Ok(false);
            }
            Err(err) => return Err(err.into()),
        };
        self.editor.update(Msg::Reply(reply))?;
        Ok(true)
    }
}
