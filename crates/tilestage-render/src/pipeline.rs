//! The draw pipeline: [`DrawCommand`]s queued by the editor and executed in
//! order by the [`Renderer`].
//!
//! A [`Batch`] redraws whole layers without tearing:
//!
//! 1. the render buffer of every layer is cleared;
//! 2. each job is loaded and painted onto its buffer, strictly one after
//!    another in queue order;
//! 3. the buffers are shown and the live layers hidden;
//! 4. each live layer is cleared and receives its buffer in one copy;
//! 5. the live layers are shown again and the buffers hidden.
//!
//! Steps 3 and 5 are skipped for render-only batches, which leave
//! visibility alone. If any job fails the batch stops after step 2: the
//! partially painted buffers stay hidden and the live layers keep their
//! previous content until a later batch on the same layers succeeds.

use std::collections::{BTreeMap, VecDeque};

use tilestage_core::{LayerId, Point, Range};

use crate::cache::ImageCache;
use crate::error::RenderError;
use crate::source::{ImagePath, ImageSource};
use crate::surface::{Color, PixelRect, Surface, SurfaceProvider};

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// One tile image destined for a grid cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawJob {
    pub layer: LayerId,
    pub at: Point,
    pub image: ImagePath,
}

/// A buffered redraw of one or more layers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Batch {
    pub layers: Vec<LayerId>,
    /// Jobs in enumeration order: layer by layer, row-major within a layer.
    pub jobs: Vec<DrawJob>,
    /// Restrict the refresh to these cells. `None` refreshes whole layers.
    pub area: Option<Range>,
    /// Compose and commit without touching visibility.
    pub render_only: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawCommand {
    /// Clear one cell of the live layer and draw a tile into it.
    Tile(DrawJob),
    /// Clear cells of the live layer.
    Clear { layer: LayerId, area: Range },
    /// Paint cells of the live layer with a colour.
    Fill {
        layer: LayerId,
        area: Range,
        color: Color,
    },
    Batch(Batch),
    /// Show the live layers (hiding their buffers).
    Show(Vec<LayerId>),
    /// Hide the live layers.
    Hide(Vec<LayerId>),
}

/// First-in first-out queue of pending draw commands.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DrawQueue {
    commands: VecDeque<DrawCommand>,
}

impl DrawQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: DrawCommand) {
        self.commands.push_back(cmd);
    }

    pub fn pop(&mut self) -> Option<DrawCommand> {
        self.commands.pop_front()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> + '_ {
        self.commands.iter()
    }

    /// Move every pending command out, leaving the queue empty.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Extend<DrawCommand> for DrawQueue {
    fn extend<T: IntoIterator<Item = DrawCommand>>(&mut self, iter: T) {
        self.commands.extend(iter);
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Pixel geometry shared by every surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RendererConfig {
    /// Edge of one square tile in pixels.
    pub tile_size: u32,
    /// Grid size in cells.
    pub extent: Point,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            tile_size: 32,
            extent: Point::new(16, 14),
        }
    }
}

impl RendererConfig {
    /// Surface size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let full = self.full();
        (full.width, full.height)
    }

    fn full(&self) -> PixelRect {
        PixelRect::area(Range::sized(self.extent), self.tile_size)
    }

    fn rect(&self, area: Option<Range>) -> PixelRect {
        match area {
            Some(r) => PixelRect::area(r.intersect(Range::sized(self.extent)), self.tile_size),
            None => self.full(),
        }
    }
}

/// What a [`Renderer::drain`] did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub executed: usize,
    pub failed: usize,
}

struct LayerPair<S> {
    live: S,
    buffer: S,
}

/// Executes draw commands against a bound set of surfaces.
pub struct Renderer<S, I>
where
    S: Surface,
    I: ImageSource<Image = S::Image>,
{
    config: RendererConfig,
    source: I,
    cache: ImageCache<S::Image>,
    layers: BTreeMap<LayerId, LayerPair<S>>,
}

impl<S, I> Renderer<S, I>
where
    S: Surface,
    I: ImageSource<Image = S::Image>,
{
    /// Bind `layers` to the surfaces supplied by `provider`. Each layer
    /// needs its `layerN` surface and its `renderN` buffer; buffers start
    /// hidden.
    pub fn bind<P>(
        config: RendererConfig,
        source: I,
        provider: &mut P,
        layers: &[LayerId],
    ) -> Result<Self, RenderError>
    where
        P: SurfaceProvider<Surface = S>,
    {
        let mut bound = BTreeMap::new();
        for &id in layers {
            let fetch = |provider: &mut P, name: String| {
                provider
                    .surface(&name)
                    .ok_or(RenderError::MissingSurface(name))
            };
            let live = fetch(provider, id.surface_name())?;
            let mut buffer = fetch(provider, id.buffer_name())?;
            buffer.set_visible(false);
            bound.insert(id, LayerPair { live, buffer });
        }
        Ok(Self {
            config,
            source,
            cache: ImageCache::new(),
            layers: bound,
        })
    }

    #[inline]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn cache(&self) -> &ImageCache<S::Image> {
        &self.cache
    }

    pub fn source(&self) -> &I {
        &self.source
    }

    /// Bound layers in stacking order.
    pub fn layers(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.layers.keys().copied()
    }

    /// The visible surface of `layer`.
    pub fn surface(&self, layer: LayerId) -> Option<&S> {
        self.layers.get(&layer).map(|pair| &pair.live)
    }

    /// The render buffer of `layer`.
    pub fn buffer(&self, layer: LayerId) -> Option<&S> {
        self.layers.get(&layer).map(|pair| &pair.buffer)
    }

    fn pair(&mut self, layer: LayerId) -> Result<&mut LayerPair<S>, RenderError> {
        self.layers
            .get_mut(&layer)
            .ok_or(RenderError::UnboundLayer(layer))
    }

    /// Draw one tile: load it, then clear its cell and paint it.
    pub async fn draw_tile(&mut self, job: &DrawJob) -> Result<(), RenderError> {
        self.pair(job.layer)?;
        let image = self.cache.get(&self.source, &job.image).await?;
        let rect = PixelRect::cell(job.at, self.config.tile_size);
        let live = &mut self.pair(job.layer)?.live;
        live.clear(rect);
        live.draw_image(&image, rect);
        Ok(())
    }

    /// Run a buffered batch redraw.
    pub async fn draw_batch(&mut self, batch: &Batch) -> Result<(), RenderError> {
        let rect = self.config.rect(batch.area);
        for &id in &batch.layers {
            self.pair(id)?.buffer.clear(rect);
        }
        for job in &batch.jobs {
            self.pair(job.layer)?;
            let image = self.cache.get(&self.source, &job.image).await?;
            let cell = PixelRect::cell(job.at, self.config.tile_size);
            self.pair(job.layer)?.buffer.draw_image(&image, cell);
        }
        if !batch.render_only {
            for &id in &batch.layers {
                let pair = self.pair(id)?;
                pair.buffer.set_visible(true);
                pair.live.set_visible(false);
            }
        }
        for &id in &batch.layers {
            let LayerPair { live, buffer } = self.pair(id)?;
            live.clear(rect);
            live.copy_from(buffer, rect);
        }
        if !batch.render_only {
            self.show(&batch.layers)?;
        }
        Ok(())
    }

    fn show(&mut self, layers: &[LayerId]) -> Result<(), RenderError> {
        for &id in layers {
            let pair = self.pair(id)?;
            pair.live.set_visible(true);
            pair.buffer.set_visible(false);
        }
        Ok(())
    }

    /// Execute a single command.
    pub async fn execute(&mut self, cmd: &DrawCommand) -> Result<(), RenderError> {
        let tile_size = self.config.tile_size;
        match cmd {
            DrawCommand::Tile(job) => self.draw_tile(job).await,
            DrawCommand::Clear { layer, area } => {
                self.pair(*layer)?.live.clear(PixelRect::area(*area, tile_size));
                Ok(())
            }
            DrawCommand::Fill { layer, area, color } => {
                self.pair(*layer)?
                    .live
                    .fill(PixelRect::area(*area, tile_size), *color);
                Ok(())
            }
            DrawCommand::Batch(batch) => self.draw_batch(batch).await,
            DrawCommand::Show(layers) => self.show(layers),
            DrawCommand::Hide(layers) => {
                for &id in layers {
                    self.pair(id)?.live.set_visible(false);
                }
                Ok(())
            }
        }
    }

    /// Execute every queued command in order. Failures are logged and
    /// counted, never retried; later commands still run.
    pub async fn drain(&mut self, queue: &mut DrawQueue) -> DrainReport {
        let mut report = DrainReport::default();
        while let Some(cmd) = queue.pop() {
            match self.execute(&cmd).await {
                Ok(()) => report.executed += 1,
                Err(err) => {
                    log::error!("draw command failed: {err}");
                    report.failed += 1;
                }
            }
        }
        report
    }
}
