//! Framework-neutral WASM <-> JavaScript bridge for the journey view.

use journey_core::{ExclusionRule, JourneyConfig, JourneyError};
use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsJourneyConfig {
    #[serde(default)]
    rules: Option<Vec<ExclusionRule>>,
}

impl From<JsJourneyConfig> for JourneyConfig {
    fn from(cfg: JsJourneyConfig) -> Self {
        let mut base = JourneyConfig::default();
        if let Some(rules) = cfg.rules {
            base.rules = rules;
        }
        base
    }
}

/// Assembles the journey timeline from a portal API document.
///
/// `config.rules`, when given, replaces the built-in visibility rules.
#[wasm_bindgen]
pub fn assemble_journey(document: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let document_value = from_value::<serde_json::Value>(document)
        .map_err(|err| JsValue::from_str(&format!("Could not read document JSON: {err}")))?;

    let cfg = match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsJourneyConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Could not read config: {err}")))?;
            JourneyConfig::from(cfg)
        }
        _ => JourneyConfig::default(),
    };

    let snapshot = journey_api::assemble_document_value(&document_value, &cfg)
        .map_err(|err| JsValue::from_str(&format_journey_error(err)))?;

    to_value(&snapshot)
        .map_err(|err| JsValue::from_str(&format!("Could not serialize snapshot: {err}")))
}

fn format_journey_error(err: JourneyError) -> String {
    format!("Journey error: {err}")
}
