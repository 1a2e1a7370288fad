use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use std::cell::RefCell;

use crate::payload::{read_host_payload, resolve_elements};
use crate::stats_panel::StatsPanel;
use crate::store::{
    ClickCount, CountedElements, HeatmapEnabled, HeatmapLoading, clear_registry,
    provide_heatmap_store,
};

pub(crate) const TOOLBAR_HOST_ID: &str = "clickmap-toolbar";
pub(crate) const POPUP_ROOT_ID: &str = "clickmap-popups";
pub(crate) const DATA_SCRIPT_ID: &str = "clickmap-data";
pub(crate) const DATA_GLOBAL: &str = "__clickmap";
/// Fired by the host on `window` after it replaces the heatmap data.
pub(crate) const DATA_EVENT: &str = "clickmap:data";
pub(crate) const CONFIG_ATTRIBUTE: &str = "data-config";

const DEFAULT_HIGHLIGHT_COLOR: &str = "#f5c542";

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub(crate) struct ToolbarConfig {
    pub start_enabled: bool,
    pub highlight_color: String,
}

impl Default for ToolbarConfig {
    fn default() -> Self {
        Self {
            start_enabled: true,
            highlight_color: DEFAULT_HIGHLIGHT_COLOR.to_string(),
        }
    }
}

impl ToolbarConfig {
    pub(crate) fn parse(raw: &str) -> Result<Self, String> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(raw).map_err(|e| format!("invalid toolbar config: {e}"))
    }

    /// Config from the host element's attribute. Bad JSON falls back to defaults.
    pub(crate) fn from_host(host: &web_sys::Element) -> Self {
        let Some(raw) = host.get_attribute(CONFIG_ATTRIBUTE) else {
            return Self::default();
        };
        Self::parse(&raw).unwrap_or_else(|e| {
            web_sys::console::warn_1(&format!("clickmap: {e}").into());
            Self::default()
        })
    }
}

struct DataEventBinding {
    window: web_sys::Window,
    _handler: Closure<dyn Fn(web_sys::Event)>,
}

thread_local! {
    static DATA_EVENT_BINDING: RefCell<Option<DataEventBinding>> = const { RefCell::new(None) };
}

const TOOLBAR_CSS: &str = r#"
:host { all: initial; }
.clickmap-toolbar {
    position: fixed; right: 16px; bottom: 16px; z-index: 2147483000;
    width: 320px; max-height: 70vh; display: flex; flex-direction: column;
    background: #13161f; color: #e2e0d8; border: 1px solid #282c3e; border-radius: 8px;
    box-shadow: 0 8px 28px rgba(0,0,0,0.45);
    font-family: 'Inter', system-ui, sans-serif; font-size: 13px;
}
.clickmap-header {
    display: flex; align-items: center; justify-content: space-between;
    padding: 10px 12px; border-bottom: 1px solid #282c3e;
}
.clickmap-title { font-weight: 600; letter-spacing: 0.06em; text-transform: uppercase; font-size: 11px; color: #9a9590; }
.clickmap-toggle {
    background: #1a1d2a; color: #5a5860; border: 1px solid #282c3e; border-radius: 999px;
    padding: 3px 10px; font-size: 11px; cursor: pointer;
}
.clickmap-toggle.on { background: #f5c542; border-color: #f5c542; color: #13161f; }
.clickmap-stats { overflow-y: auto; padding: 10px 12px; }
.clickmap-stats-filter { margin-bottom: 10px; }
.clickmap-stats-summary { margin-bottom: 8px; color: #9a9590; }
.clickmap-stats-list { list-style: none; padding: 0; margin: 0; }
.clickmap-row {
    display: flex; align-items: center; gap: 8px; padding: 5px 6px;
    border-radius: 4px; cursor: pointer;
}
.clickmap-row:hover, .clickmap-row.highlighted { background: #232738; }
.clickmap-row.selected { box-shadow: inset 2px 0 0 #f5c542; }
.clickmap-row-rank { text-align: right; flex-shrink: 0; color: #4a4e6a; font-family: 'JetBrains Mono', monospace; }
.clickmap-row-content { flex: 1; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }
.clickmap-row-tag { font-family: 'JetBrains Mono', monospace; background: #1a1d2a; padding: 0 4px; border-radius: 3px; }
.clickmap-row-count { color: #f5c542; font-family: 'JetBrains Mono', monospace; white-space: nowrap; }
.clickmap-date-button {
    display: inline-flex; gap: 6px; align-items: center; cursor: pointer;
    background: #1a1d2a; color: #e2e0d8; border: 1px solid #282c3e; border-radius: 4px; padding: 4px 10px;
}
#clickmap-popups { position: fixed; inset: 0; pointer-events: none; z-index: 2147483001; }
.clickmap-popup {
    list-style: none; margin: 0; padding: 4px; min-width: 200px;
    background: #13161f; border: 1px solid #282c3e; border-radius: 6px; box-shadow: 0 6px 20px rgba(0,0,0,0.5);
}
.clickmap-popup-item { display: flex; justify-content: space-between; gap: 12px; padding: 5px 8px; border-radius: 4px; cursor: pointer; }
.clickmap-popup-item:hover, .clickmap-popup-item.active { background: #232738; }
.clickmap-popup-hint { color: #5a5860; font-size: 11px; }
"#;

/// Pull the host's current payload into the store on the next frame.
fn load_heatmap(
    counted_elements: RwSignal<Vec<clickmap_shared::CountedElement>>,
    click_count: RwSignal<u64>,
    enabled: RwSignal<bool>,
    loading: RwSignal<bool>,
) {
    loading.set(true);
    request_animation_frame(move || {
        clear_registry();
        match read_host_payload() {
            Ok(Some(payload)) => {
                let total = payload.total_clicks();
                let counted = resolve_elements(payload.elements);
                web_sys::console::info_1(
                    &format!("clickmap: loaded {} elements / {total} clicks", counted.len()).into(),
                );
                counted_elements.set(counted);
                click_count.set(total);
            }
            Ok(None) => {
                counted_elements.set(Vec::new());
                click_count.set(0);
            }
            Err(e) => {
                web_sys::console::warn_1(&format!("clickmap: {e}").into());
                counted_elements.set(Vec::new());
                click_count.set(0);
                enabled.set(false);
            }
        }
        loading.set(false);
    });
}

#[component]
pub fn App(config: ToolbarConfig) -> impl IntoView {
    provide_heatmap_store(config.start_enabled, config.highlight_color);
    let CountedElements(counted_elements) = expect_context();
    let ClickCount(click_count) = expect_context();
    let HeatmapEnabled(enabled) = expect_context();
    let HeatmapLoading(loading) = expect_context();

    load_heatmap(counted_elements, click_count, enabled, loading);

    // Reload whenever the host announces fresh data.
    Effect::new(move || {
        let Some(window) = web_sys::window() else {
            return;
        };

        DATA_EVENT_BINDING.with(|slot| {
            if let Some(old) = slot.borrow_mut().take() {
                let _ = old.window.remove_event_listener_with_callback(
                    DATA_EVENT,
                    old._handler.as_ref().unchecked_ref(),
                );
            }
        });

        let handler = Closure::<dyn Fn(web_sys::Event)>::new(move |_: web_sys::Event| {
            load_heatmap(counted_elements, click_count, enabled, loading);
        });

        if window
            .add_event_listener_with_callback(DATA_EVENT, handler.as_ref().unchecked_ref())
            .is_ok()
        {
            DATA_EVENT_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(DataEventBinding {
                    window: window.clone(),
                    _handler: handler,
                });
            });
        }
    });

    view! {
        <style>{TOOLBAR_CSS}</style>
        <div class="clickmap-toolbar">
            <div class="clickmap-header">
                <span class="clickmap-title">"Heatmap"</span>
                <button
                    class="clickmap-toggle"
                    class:on=move || enabled.get()
                    title=move || if enabled.get() { "Hide heatmap" } else { "Show heatmap" }
                    on:click=move |_| enabled.update(|on| *on = !*on)
                >
                    {move || if enabled.get() { "On" } else { "Off" }}
                </button>
            </div>
            <StatsPanel />
        </div>
        <div id=POPUP_ROOT_ID />
    }
}

#[cfg(test)]
mod tests {
    use super::ToolbarConfig;

    #[test]
    fn empty_config_uses_defaults() {
        assert_eq!(ToolbarConfig::parse("").unwrap(), ToolbarConfig::default());
        assert_eq!(ToolbarConfig::parse("  ").unwrap(), ToolbarConfig::default());
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config = ToolbarConfig::parse(r#"{"start_enabled": false}"#).unwrap();
        assert!(!config.start_enabled);
        assert_eq!(config.highlight_color, "#f5c542");
    }

    #[test]
    fn rejects_malformed_config() {
        let err = ToolbarConfig::parse("{start_enabled}").unwrap_err();
        assert!(err.starts_with("invalid toolbar config"));
    }
}
