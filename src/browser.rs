use anyhow::{anyhow, Result};
use futures::channel::oneshot::channel;
use std::future::Future;
use std::time::Duration;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

#[rustfmt::skip]
use web_sys::{
    Document,
    Element,
    Window,
    CanvasRenderingContext2d,
    HtmlCanvasElement,
    HtmlImageElement,
    Storage,
};

// ==================== Logging ====================
// format!() style console logging, usable from every module after
// `#[macro_use] mod browser;` in lib.rs
macro_rules! log {
    ($($t:tt)*) => {
        $crate::browser::console($crate::browser::Level::Info, &format!($($t)*))
    }
}

macro_rules! warn {
    ($($t:tt)*) => {
        $crate::browser::console($crate::browser::Level::Warn, &format!($($t)*))
    }
}

macro_rules! error {
    ($($t:tt)*) => {
        $crate::browser::console($crate::browser::Level::Error, &format!($($t)*))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// Writes one line to the browser console
/// - native builds (host side unit tests) have no console, they go to stderr
pub fn console(level: Level, message: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        let message = wasm_bindgen::JsValue::from_str(message);
        match level {
            Level::Info => web_sys::console::log_1(&message),
            Level::Warn => web_sys::console::warn_1(&message),
            Level::Error => web_sys::console::error_1(&message),
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("[{:?}] {}", level, message);
}

// ==================== Constants ====================
mod html {
    pub const CANVAS_TAG: &str = "canvas";
    pub const CONTEXT_2D: &str = "2d";
}

// ==================== DOM ====================
pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| anyhow!("Window not found"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| anyhow!("No Document Found"))
}

pub fn element(id: &str) -> Result<Element> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("No Element found with ID : '{}'", id))
}

pub fn canvas(id: &str) -> Result<HtmlCanvasElement> {
    element(id)?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|element| anyhow!("Error converting {:#?} to HtmlCanvasElement", element))
}

/// Canvas with the given ID, or a fresh detached canvas when the page has none
/// - only usable for off-screen work, a detached canvas is never displayed
pub fn canvas_or_detached(id: &str) -> Result<HtmlCanvasElement> {
    let document = document()?;
    let element = match document.get_element_by_id(id) {
        Some(element) => element,
        None => document
            .create_element(html::CANVAS_TAG)
            .map_err(|err| anyhow!("Could not create canvas element : {:#?}", err))?,
    };
    element
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|element| anyhow!("Error converting {:#?} to HtmlCanvasElement", element))
}

/// 2d context of a canvas
/// - a canvas hands out a new context after its width/height changed, so
/// callers fetch it again after every resize
pub fn context_of(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
    canvas
        .get_context(html::CONTEXT_2D)
        // Result<Option<Object>, JsValue> -> Result<Object>
        .map_err(|js_value| anyhow!("Error getting context : {:#?}", js_value))?
        .ok_or_else(|| anyhow!("No 2d context found"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|element| {
            anyhow!(
                "Error converting {:#?} to CanvasRenderingContext2d",
                element
            )
        })
}

pub fn new_image() -> Result<HtmlImageElement> {
    HtmlImageElement::new()
        .map_err(|err| anyhow!("Could not create image element : {:#?}", err))
}

pub fn local_storage() -> Result<Storage> {
    window()?
        .local_storage()
        .map_err(|err| anyhow!("Error accessing localStorage : {:#?}", err))?
        .ok_or_else(|| anyhow!("localStorage is not available"))
}

// ==================== Tasks & Timers ====================
pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

/// Resolves once `delay` has passed (setTimeout)
pub async fn sleep(delay: Duration) -> Result<()> {
    let (tx, rx) = channel::<()>();
    // once_into_js frees the closure after its single call
    let callback = Closure::once_into_js(move || {
        let _ = tx.send(());
    });
    window()?
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            delay.as_millis().min(i32::MAX as u128) as i32,
        )
        .map_err(|err| anyhow!("Could not set timeout : {:#?}", err))?;

    rx.await
        .map_err(|_| anyhow!("Timeout callback dropped before firing"))
}

/// Resolves on the next display refresh with the frame timestamp
/// (requestAnimationFrame)
/// - every call schedules exactly one callback
pub async fn next_animation_frame() -> Result<f64> {
    let (tx, rx) = channel::<f64>();
    let callback = Closure::once_into_js(move |timestamp: f64| {
        let _ = tx.send(timestamp);
    });
    window()?
        .request_animation_frame(callback.unchecked_ref())
        .map_err(|err| anyhow!("Cannot request animation frame : {:#?}", err))?;

    rx.await
        .map_err(|_| anyhow!("Animation frame callback dropped before firing"))
}

pub fn closure_wrap<T: wasm_bindgen::closure::WasmClosure + ?Sized>(data: Box<T>) -> Closure<T> {
    Closure::wrap(data)
}
