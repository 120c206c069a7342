//! Host Command Wrappers
//!
//! Frontend bindings to the host bridge, organized by domain.

mod board;
mod config;

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["window", "__TAURI__", "core"])]
    async fn invoke(cmd: &str, args: JsValue) -> Result<JsValue, JsValue>;
}

pub use board::BridgeClient;
pub use config::load_config;

// ========================
// Helpers
// ========================

/// Serialize as plain JSON objects, not JS Maps
fn to_js<A: Serialize>(args: &A) -> Result<JsValue, String> {
    args.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| e.to_string())
}

/// Best-effort message from a rejected promise
fn js_error(value: JsValue) -> String {
    if let Some(message) = value.as_string() {
        return message;
    }
    js_sys::JSON::stringify(&value)
        .ok()
        .and_then(|s| s.as_string())
        .unwrap_or_else(|| "host call failed".to_string())
}

async fn call<A, R>(cmd: &str, args: &A) -> Result<R, String>
where
    A: Serialize,
    R: DeserializeOwned,
{
    let result = invoke(cmd, to_js(args)?).await.map_err(js_error)?;
    serde_wasm_bindgen::from_value(result).map_err(|e| format!("{cmd}: bad response: {e}"))
}

async fn call_unit<A: Serialize>(cmd: &str, args: &A) -> Result<(), String> {
    invoke(cmd, to_js(args)?).await.map_err(js_error)?;
    Ok(())
}
