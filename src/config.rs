use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wasm_bindgen::JsValue;

/// Startup options, every field optional on the JS side
///
/// ```js
/// start({ imagePath: "data/skins/original/icons32.png", settleDelayMs: 0 })
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShellConfig {
    /// tile image handed to the engine as its palette
    pub image_path: String,
    pub canvas_id: String,
    /// scratch canvas for palette extraction, created detached if missing
    pub offscreen_canvas_id: String,
    pub inventory_id: String,
    /// storage key of the persisted level
    pub level_key: String,
    /// pause between image load and engine construction
    pub settle_delay_ms: u32,
}

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig {
            image_path: "data/skins/original/icons32.png".to_string(),
            canvas_id: "robbo-canvas".to_string(),
            offscreen_canvas_id: "offscreen-canvas".to_string(),
            inventory_id: "inventory".to_string(),
            level_key: "current_level".to_string(),
            settle_delay_ms: 100,
        }
    }
}

impl ShellConfig {
    /// `undefined` and `null` give the defaults
    pub fn from_js(value: JsValue) -> Result<Self> {
        if value.is_undefined() || value.is_null() {
            return Ok(ShellConfig::default());
        }
        serde_wasm_bindgen::from_value(value)
            .map_err(|err| anyhow!("Invalid shell config : {}", err))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms.into())
    }
}
