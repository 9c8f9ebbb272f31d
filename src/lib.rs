// ==================== Imports ====================
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

#[macro_use]
pub mod browser;
pub mod bootstrap;
pub mod config;
pub mod engine;
pub mod input;
pub mod level_store;
pub mod palette;
pub mod render_loop;
#[cfg(test)]
mod testing;

use bootstrap::BrowserHost;
use config::ShellConfig;

// ==================== Main Functions ====================
/// Main entry for Webassembly module, default page layout
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    start(JsValue::UNDEFINED)
}

/// Starts the shell with options from JS
/// - parses the config right away, bad options throw here
/// - everything after (image, engine, loop) runs on a local task and only
/// reports failures to the console
#[wasm_bindgen]
pub fn start(config: JsValue) -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();

    let config = ShellConfig::from_js(config)
        .map_err(|err| JsValue::from_str(&format!("{:#}", err)))?;
    log!("Starting Robbo with {:?}", config);

    browser::spawn_local(async move {
        let host = BrowserHost::new(config.clone());
        if let Err(err) = bootstrap::run(&host, &config).await {
            error!("Robbo failed to start : {:#}", err);
        }
    });

    Ok(())
}
