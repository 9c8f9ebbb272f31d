use crate::browser;
use crate::palette::PixelBuffer;
use anyhow::{anyhow, Error, Result};
// ELI5: web assembly is a single threaded environment, so Rc RefCell > Mutex
use futures::channel::oneshot::channel;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, HtmlImageElement, ImageData, KeyboardEvent};

pub type LevelIndex = u32;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceDimensions {
    pub width: u32,
    pub height: u32,
}

/// The simulation engine as seen by the shell
///
/// World state, puzzle rules and drawing all live behind this trait; the shell
/// only sizes the surface, mirrors the level and forwards keys.
///
/// ┌───────────── Engine ──────────────┐
/// │ construct(palette, level)         │ ← bootstrap, once
/// │ width() / height()                │ ← render loop, resize check
/// │ current_level()                   │ ← render loop, level mirror
/// │ draw(context)                     │ ← render loop
/// │ get_inventory()                   │ ← render loop
/// │ on_keyboard_event(event, down)    │ ← input router
/// └───────────────────────────────────┘
pub trait Engine {
    /// Drawing context `draw` renders into
    type Context;
    /// Keyboard event handed through untouched
    type Event;

    fn construct(palette: PixelBuffer, starting_level: LevelIndex) -> Result<Self>
    where
        Self: Sized;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn current_level(&self) -> LevelIndex;
    fn draw(&mut self, context: &Self::Context);
    fn get_inventory(&self) -> String;
    /// `true` when the engine consumed the event
    fn on_keyboard_event(&mut self, event: &Self::Event, is_key_down: bool) -> bool;

    fn size(&self) -> SurfaceDimensions {
        SurfaceDimensions {
            width: self.width(),
            height: self.height(),
        }
    }
}

// ==================== Robbo ====================
#[wasm_bindgen(module = "rust-robbo")]
extern "C" {
    pub type Universe;

    #[wasm_bindgen(static_method_of = Universe, js_name = new, catch)]
    fn create(image_data: &ImageData, current_level: u32) -> Result<Universe, JsValue>;

    #[wasm_bindgen(method)]
    fn width(this: &Universe) -> u32;

    #[wasm_bindgen(method)]
    fn height(this: &Universe) -> u32;

    #[wasm_bindgen(method)]
    fn current_level(this: &Universe) -> u32;

    #[wasm_bindgen(method)]
    fn draw(this: &Universe, context: &CanvasRenderingContext2d);

    #[wasm_bindgen(method)]
    fn get_inventory(this: &Universe) -> String;

    #[wasm_bindgen(method)]
    fn on_keyboard_event(this: &Universe, event: &KeyboardEvent, is_key_down: bool) -> bool;
}

/// Robbo puzzle engine, imported from the `rust-robbo` package
pub struct RobboEngine {
    universe: Universe,
}

impl Engine for RobboEngine {
    type Context = CanvasRenderingContext2d;
    type Event = KeyboardEvent;

    fn construct(palette: PixelBuffer, starting_level: LevelIndex) -> Result<Self> {
        let image_data = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(palette.as_bytes()),
            palette.width(),
            palette.height(),
        )
        .map_err(|err| anyhow!("Could not wrap palette as ImageData : {:#?}", err))?;
        let universe = Universe::create(&image_data, starting_level)
            .map_err(|err| anyhow!("Universe rejected level {} : {:#?}", starting_level, err))?;
        Ok(RobboEngine { universe })
    }

    fn width(&self) -> u32 {
        self.universe.width()
    }

    fn height(&self) -> u32 {
        self.universe.height()
    }

    fn current_level(&self) -> LevelIndex {
        self.universe.current_level()
    }

    fn draw(&mut self, context: &CanvasRenderingContext2d) {
        self.universe.draw(context);
    }

    fn get_inventory(&self) -> String {
        self.universe.get_inventory()
    }

    fn on_keyboard_event(&mut self, event: &KeyboardEvent, is_key_down: bool) -> bool {
        self.universe.on_keyboard_event(event, is_key_down)
    }
}

// ==================== Resources ====================
/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - decoded and ready to draw
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::new_image()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback = Closure::once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let owned_source = source.to_string();
    let error_callback = Closure::once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!(
                "Error loading image '{}' : {:#?}",
                owned_source,
                err
            )));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // ?? - Result<Result<(), Error>, oneshot::Canceled>
    // - first ? : channel result
    // - second ? : image load result
    rx.await??;

    // only one of the two fired, drop both handlers before their closures go
    image.set_onload(None);
    image.set_onerror(None);
    drop(success_callback);
    drop(error_callback);

    Ok(image)
}
