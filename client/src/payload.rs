use js_sys::Reflect;
use wasm_bindgen::JsValue;

use clickmap_shared::{CountedElement, HeatmapPayload, PayloadElement};

use crate::app::{DATA_GLOBAL, DATA_SCRIPT_ID};
use crate::store::{js_error_text, register_element};

/// Read heatmap data from the host page.
///
/// A `<script type="application/json">` tag takes precedence over the window global.
/// `Ok(None)` means the host has not provided anything yet.
pub(crate) fn read_host_payload() -> Result<Option<HeatmapPayload>, String> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    if let Some(script) = document.get_element_by_id(DATA_SCRIPT_ID) {
        let raw = script.text_content().unwrap_or_default();
        return HeatmapPayload::from_json(&raw).map(Some);
    }

    let value = Reflect::get(&window, &JsValue::from_str(DATA_GLOBAL))
        .map_err(|e| js_error_text(&e))?;
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value(value)
        .map(Some)
        .map_err(|e| format!("invalid heatmap payload in window.{DATA_GLOBAL}: {e}"))
}

/// Attach each payload entry to a live node, in payload order.
///
/// Entries whose selector matches nothing are dropped.
pub(crate) fn resolve_elements(elements: Vec<PayloadElement>) -> Vec<CountedElement> {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return Vec::new();
    };
    let mut counted = Vec::with_capacity(elements.len());
    for entry in elements {
        match document.query_selector(&entry.selector) {
            Ok(Some(node)) => counted.push(CountedElement::new(
                register_element(node),
                entry.count,
                entry.action_step,
            )),
            Ok(None) => {
                web_sys::console::warn_1(
                    &format!("clickmap: no element matches {:?}", entry.selector).into(),
                );
            }
            Err(e) => {
                web_sys::console::warn_1(
                    &format!(
                        "clickmap: bad selector {:?}: {}",
                        entry.selector,
                        js_error_text(&e)
                    )
                    .into(),
                );
            }
        }
    }
    counted
}
