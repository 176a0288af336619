//! Browser entry points. Settings go in and plans come out as JSON, leaving drawing to the page.

use wasm_bindgen::prelude::*;

use crate::arrange::Arranger;
use crate::icons::{icon_urls, ColorMode};
use crate::session::{fresh_seed, BoardSettings, GenerateError, Generator};
use crate::topology::BoardTopology;

fn js_error(message: &str) -> JsValue {
    js_sys::Error::new(message).into()
}

fn generate_error(e: GenerateError) -> JsValue {
    js_error(&e.user_message())
}

fn parse_settings(settings_json: &str) -> Result<BoardSettings, JsValue> {
    serde_json::from_str(settings_json).map_err(|e| js_error(&format!("bad settings: {e}")))
}

/// Plan a board and return it as JSON.
#[wasm_bindgen(js_name = planBoard)]
pub fn plan_board_json(settings_json: &str, seed: u32) -> Result<String, JsValue> {
    let settings = parse_settings(settings_json)?;
    let plan = Generator::builtin()
        .and_then(|generator| generator.plan(&settings, seed))
        .map_err(generate_error)?;

    serde_json::to_string(&plan).map_err(|e| js_error(&e.to_string()))
}

/// Arrange the filtered words without any geometry.
#[wasm_bindgen(js_name = arrangeWords)]
pub fn arrange_words_json(settings_json: &str, seed: u32) -> Result<String, JsValue> {
    let settings = parse_settings(settings_json)?
        .validate()
        .map_err(|e| js_error(&e.to_string()))?;
    let generator = Generator::builtin().map_err(generate_error)?;

    let pool = generator.bank().select(&settings.bank_filter());
    let topology = BoardTopology::classic();
    let arrangement = Arranger::new(&topology, Default::default()).arrange(&pool, seed);

    serde_json::to_string(&arrangement).map_err(|e| js_error(&e.to_string()))
}

/// Candidate icon URLs for a code-point sequence, best first.
#[wasm_bindgen(js_name = iconUrls)]
pub fn icon_urls_js(hex: &str, bw: bool) -> js_sys::Array {
    let mode = if bw { ColorMode::Bw } else { ColorMode::Color };
    icon_urls(hex, mode).into_iter().map(JsValue::from).collect()
}

/// A random seed for a new board.
#[wasm_bindgen(js_name = freshSeed)]
pub fn fresh_seed_js() -> u32 {
    fresh_seed()
}
