//! Config Command
//!
//! Board configuration is owned by the host page.

use board_sync::BoardConfig;
use wasm_bindgen::prelude::*;

use super::{invoke, js_error};

/// Fetch and validate the board configuration. The host may answer with a
/// JSON string or a plain object.
pub async fn load_config() -> Result<BoardConfig, String> {
    let result = invoke("board_config", JsValue::NULL).await.map_err(js_error)?;
    let raw = match result.as_string() {
        Some(raw) => raw,
        None => js_sys::JSON::stringify(&result)
            .map_err(js_error)?
            .as_string()
            .ok_or_else(|| "board_config: empty response".to_string())?,
    };
    BoardConfig::from_json(&raw).map_err(|e| e.to_string())
}
