use crate::browser;
use crate::engine::{Engine, SurfaceDimensions};
use crate::level_store::{KeyValueStore, LevelStore};
use anyhow::Result;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement};

/// Pixel surface the engine draws into
pub trait Surface {
    type Context;

    fn dimensions(&self) -> SurfaceDimensions;
    fn resize(&mut self, dimensions: SurfaceDimensions);
    /// A fresh drawing context, valid until the next `resize`
    fn acquire_context(&self) -> Result<Self::Context>;
}

/// Where the inventory line ends up
pub trait TextDisplay {
    fn set_text(&mut self, text: &str);
}

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        CanvasSurface { canvas }
    }
}

impl Surface for CanvasSurface {
    type Context = CanvasRenderingContext2d;

    fn dimensions(&self) -> SurfaceDimensions {
        SurfaceDimensions {
            width: self.canvas.width(),
            height: self.canvas.height(),
        }
    }

    fn resize(&mut self, dimensions: SurfaceDimensions) {
        self.canvas.set_width(dimensions.width);
        self.canvas.set_height(dimensions.height);
    }

    fn acquire_context(&self) -> Result<CanvasRenderingContext2d> {
        browser::context_of(&self.canvas)
    }
}

impl TextDisplay for Element {
    fn set_text(&mut self, text: &str) {
        self.set_text_content(Some(text));
    }
}

/// Per frame driver of the engine
///
/// ┌────────────────────── frame() ───────────────────────┐
/// │ 1. surface size != engine size → resize + new context│
/// │ 2. engine level != stored level → store it           │
/// │ 3. engine.draw(context)                              │
/// │ 4. inventory text ← engine.get_inventory()           │
/// └──────────────────────────────────────────────────────┘
/// `start()` then repeats frame() once per display refresh, for as long as
/// the page lives. Resize has to come before draw, the engine must never see
/// a context from before the surface changed size.
pub struct RenderLoop<E, S, K, D>
where
    E: Engine,
    S: Surface<Context = E::Context>,
    K: KeyValueStore,
    D: TextDisplay,
{
    engine: Rc<RefCell<E>>,
    surface: S,
    context: E::Context,
    /// surface size `context` was acquired at
    context_size: SurfaceDimensions,
    levels: LevelStore<K>,
    inventory: D,
}

impl<E, S, K, D> RenderLoop<E, S, K, D>
where
    E: Engine,
    S: Surface<Context = E::Context>,
    K: KeyValueStore,
    D: TextDisplay,
{
    pub fn new(
        engine: Rc<RefCell<E>>,
        surface: S,
        levels: LevelStore<K>,
        inventory: D,
    ) -> Result<Self> {
        let context = surface.acquire_context()?;
        let context_size = surface.dimensions();
        Ok(RenderLoop {
            engine,
            surface,
            context,
            context_size,
            levels,
            inventory,
        })
    }

    pub fn frame(&mut self) -> Result<()> {
        let mut engine = self.engine.borrow_mut();

        let wanted = engine.size();
        if self.surface.dimensions() != wanted {
            log!("Resizing surface to {}x{}", wanted.width, wanted.height);
            self.surface.resize(wanted);
        }
        // also retries a context that failed to arrive after an earlier resize
        let size = self.surface.dimensions();
        if self.context_size != size {
            self.context = self.surface.acquire_context()?;
            self.context_size = size;
        }

        let level = engine.current_level();
        match self.levels.sync(level) {
            Ok(true) => log!("Saved level {} under '{}'", level, self.levels.key()),
            Ok(false) => {}
            // the store is a mirror, a failed write must not stop drawing
            Err(err) => error!("Could not save level {} : {:#}", level, err),
        }

        engine.draw(&self.context);
        self.inventory.set_text(&engine.get_inventory());
        Ok(())
    }
}

impl<E, S, K, D> RenderLoop<E, S, K, D>
where
    E: Engine + 'static,
    S: Surface<Context = E::Context> + 'static,
    K: KeyValueStore + 'static,
    D: TextDisplay + 'static,
{
    /// Runs `frame()` on every animation frame from now on
    /// - a failed frame is logged and the next one still runs
    /// - there is no stop, the task lives until the page goes away
    pub fn start(mut self) {
        browser::spawn_local(async move {
            loop {
                if let Err(err) = browser::next_animation_frame().await {
                    error!("Render loop stopped : {:#}", err);
                    return;
                }
                if let Err(err) = self.frame() {
                    error!("Frame failed : {:#}", err);
                }
            }
        });
    }
}
