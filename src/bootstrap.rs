use crate::browser;
use crate::config::ShellConfig;
use crate::engine::{self, Engine, RobboEngine};
use crate::input;
use crate::level_store::{KeyValueStore, LevelStore, MemoryStore};
use crate::palette::{self, PixelBuffer};
use crate::render_loop::{CanvasSurface, RenderLoop, Surface, TextDisplay};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use web_sys::HtmlImageElement;

/// Everything startup needs from the page
///
/// `run` owns the order, a Host only performs the individual steps.
#[async_trait(?Send)]
pub trait Host {
    type Image;
    type Engine: Engine;
    type Store: KeyValueStore;

    async fn load_image(&self, source: &str) -> Result<Self::Image>;
    async fn settle(&self, delay: Duration) -> Result<()>;
    fn extract_palette(&self, image: &Self::Image) -> Result<PixelBuffer>;
    fn level_store(&self) -> Result<LevelStore<Self::Store>>;
    /// Draws once, attaches keyboard routing, then starts the render loop
    fn launch(&self, engine: Self::Engine, levels: LevelStore<Self::Store>) -> Result<()>;
}

/// Startup sequence
///
/// ┌──────────────┐   ┌────────┐   ┌─────────┐   ┌────────────┐   ┌──────────────┐   ┌────────┐
/// │ load image   ├──►│ settle ├──►│ palette ├──►│ read level ├──►│ construct    ├──►│ launch │
/// │ (async)      │   │ (timer)│   │         │   │            │   │ engine       │   │        │
/// └──────────────┘   └────────┘   └─────────┘   └────────────┘   └──────────────┘   └────────┘
/// Any error stops here: no fallback palette, no retry.
pub async fn run<H: Host>(host: &H, config: &ShellConfig) -> Result<()> {
    let image = host
        .load_image(&config.image_path)
        .await
        .with_context(|| format!("Failed to load tile image from : {}", config.image_path))?;

    // TODO: find out whether the canvas or the decoder actually needs this
    // pause, then drop settle_delay_ms
    host.settle(config.settle_delay()).await?;

    let palette = host
        .extract_palette(&image)
        .context("Failed to extract palette")?;
    let levels = host.level_store()?;
    let starting_level = levels.read();
    log!(
        "Starting at level {} with a {}x{} palette",
        starting_level,
        palette.width(),
        palette.height()
    );

    let engine = <H::Engine as Engine>::construct(palette, starting_level)
        .context("Failed to construct engine")?;
    host.launch(engine, levels)
}

/// First draw, then keyboard routing, then the frame loop
/// - the loop only starts once everything before it worked, a failed
/// startup leaves nothing running
pub fn go_live<E, S, K, D>(
    mut render_loop: RenderLoop<E, S, K, D>,
    attach_input: impl FnOnce() -> Result<()>,
    start: impl FnOnce(RenderLoop<E, S, K, D>),
) -> Result<()>
where
    E: Engine,
    S: Surface<Context = E::Context>,
    K: KeyValueStore,
    D: TextDisplay,
{
    render_loop.frame().context("First draw failed")?;
    attach_input().context("Failed to attach keyboard input")?;
    start(render_loop);
    Ok(())
}

/// Host backed by the real page: DOM canvases, localStorage, rAF
pub struct BrowserHost {
    config: ShellConfig,
}

impl BrowserHost {
    pub fn new(config: ShellConfig) -> Self {
        BrowserHost { config }
    }
}

#[async_trait(?Send)]
impl Host for BrowserHost {
    type Image = HtmlImageElement;
    type Engine = RobboEngine;
    type Store = Box<dyn KeyValueStore>;

    async fn load_image(&self, source: &str) -> Result<HtmlImageElement> {
        engine::load_image(source).await
    }

    async fn settle(&self, delay: Duration) -> Result<()> {
        browser::sleep(delay).await
    }

    fn extract_palette(&self, image: &HtmlImageElement) -> Result<PixelBuffer> {
        let surface = browser::canvas_or_detached(&self.config.offscreen_canvas_id)?;
        palette::extract(image, &surface)
    }

    fn level_store(&self) -> Result<LevelStore<Box<dyn KeyValueStore>>> {
        let store: Box<dyn KeyValueStore> = match browser::local_storage() {
            Ok(storage) => Box::new(storage),
            Err(err) => {
                warn!("{:#}, progress will not survive a reload", err);
                Box::new(MemoryStore::default())
            }
        };
        Ok(LevelStore::new(store, self.config.level_key.as_str()))
    }

    fn launch(
        &self,
        engine: RobboEngine,
        levels: LevelStore<Box<dyn KeyValueStore>>,
    ) -> Result<()> {
        let engine = Rc::new(RefCell::new(engine));
        let surface = CanvasSurface::new(browser::canvas(&self.config.canvas_id)?);
        let inventory = browser::element(&self.config.inventory_id)?;

        let render_loop = RenderLoop::new(engine.clone(), surface, levels, inventory)?;
        go_live(
            render_loop,
            || input::attach(engine),
            |render_loop| render_loop.start(),
        )
    }
}
