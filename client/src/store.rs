use leptos::prelude::*;
use wasm_bindgen::{JsCast, JsValue};

use std::cell::RefCell;
use std::collections::HashMap;

use clickmap_shared::date_range::{DEFAULT_DATE_RANGE_LABEL, option_for_label_or_default};
use clickmap_shared::{CountedElement, ElementRef, HeatmapFilter};

/// Event fired on `window` when the date filter changes, so the host can refetch.
pub(crate) const FILTER_EVENT: &str = "clickmap:filter";

/// Newtype wrappers so each piece of heatmap state gets a distinct context type.
#[derive(Clone, Copy)]
pub(crate) struct CountedElements(pub RwSignal<Vec<CountedElement>>);
#[derive(Clone, Copy)]
pub(crate) struct ClickCount(pub RwSignal<u64>);
#[derive(Clone, Copy)]
pub(crate) struct HeatmapEnabled(pub RwSignal<bool>);
#[derive(Clone, Copy)]
pub(crate) struct HeatmapLoading(pub RwSignal<bool>);
#[derive(Clone, Copy)]
pub(crate) struct HeatmapFilterState(pub RwSignal<HeatmapFilter>);
#[derive(Clone, Copy)]
pub(crate) struct HighlightedElement(pub RwSignal<Option<ElementRef>>);
#[derive(Clone, Copy)]
pub(crate) struct SelectedElement(pub RwSignal<Option<ElementRef>>);

/// Dispatchers owned by the store. Views call these and never write state directly.
#[derive(Clone, Copy)]
pub(crate) struct HeatmapActions {
    pub set_highlight_element: Callback<Option<ElementRef>>,
    pub set_selected_element: Callback<ElementRef>,
    pub set_heatmap_filter: Callback<HeatmapFilter>,
}

/// The two element actions a ranked row can trigger.
pub(crate) trait ElementDispatcher {
    fn highlight_element(&self, element: Option<ElementRef>);
    fn select_element(&self, element: ElementRef);
}

impl ElementDispatcher for HeatmapActions {
    fn highlight_element(&self, element: Option<ElementRef>) {
        self.set_highlight_element.run(element);
    }

    fn select_element(&self, element: ElementRef) {
        self.set_selected_element.run(element);
    }
}

/// Create the heatmap state, put it in context, and wire the DOM side of the actions.
pub(crate) fn provide_heatmap_store(start_enabled: bool, highlight_color: String) -> HeatmapActions {
    let counted_elements = RwSignal::new(Vec::<CountedElement>::new());
    let click_count = RwSignal::new(0_u64);
    let enabled = RwSignal::new(start_enabled);
    let loading = RwSignal::new(false);
    let filter = RwSignal::new(HeatmapFilter::from_option(option_for_label_or_default(
        DEFAULT_DATE_RANGE_LABEL,
    )));
    let highlighted = RwSignal::new(None::<ElementRef>);
    let selected = RwSignal::new(None::<ElementRef>);

    provide_context(CountedElements(counted_elements));
    provide_context(ClickCount(click_count));
    provide_context(HeatmapEnabled(enabled));
    provide_context(HeatmapLoading(loading));
    provide_context(HeatmapFilterState(filter));
    provide_context(HighlightedElement(highlighted));
    provide_context(SelectedElement(selected));

    let actions = HeatmapActions {
        set_highlight_element: Callback::new(move |element| highlighted.set(element)),
        set_selected_element: Callback::new(move |element| selected.set(Some(element))),
        set_heatmap_filter: Callback::new(move |next: HeatmapFilter| {
            if let Err(e) = announce_filter(&next) {
                web_sys::console::warn_1(&format!("clickmap: filter event failed: {e}").into());
            }
            filter.set(next);
        }),
    };
    provide_context(actions);

    // Hiding the heatmap drops any hover highlight.
    Effect::new(move || {
        if !enabled.get() {
            highlighted.set(None);
        }
    });

    Effect::new(move |prev: Option<Option<ElementRef>>| {
        let current = highlighted.get();
        if let Some(Some(old)) = prev
            && Some(old) != current
        {
            clear_highlight(old);
        }
        if let Some(element) = current {
            apply_highlight(element, &highlight_color);
        }
        current
    });

    Effect::new(move || {
        let Some(element) = selected.get() else {
            return;
        };
        web_sys::console::info_1(&format!("clickmap: selected element #{}", element.0).into());
        scroll_to(element);
    });

    actions
}

fn announce_filter(filter: &HeatmapFilter) -> Result<(), String> {
    let window = web_sys::window().ok_or("no window")?;
    let detail = serde_wasm_bindgen::to_value(filter).map_err(|e| format!("serialize: {e}"))?;
    let init = web_sys::CustomEventInit::new();
    init.set_detail(&detail);
    let event = web_sys::CustomEvent::new_with_event_init_dict(FILTER_EVENT, &init)
        .map_err(|e| js_error_text(&e))?;
    window
        .dispatch_event(&event)
        .map(|_| ())
        .map_err(|e| js_error_text(&e))
}

struct RegisteredElement {
    node: web_sys::Element,
    saved_outline: Option<String>,
}

#[derive(Default)]
struct ElementRegistry {
    next_id: u32,
    nodes: HashMap<ElementRef, RegisteredElement>,
}

thread_local! {
    static ELEMENT_REGISTRY: RefCell<ElementRegistry> = RefCell::new(ElementRegistry::default());
}

/// Hand out a handle for a live page node.
pub(crate) fn register_element(node: web_sys::Element) -> ElementRef {
    ELEMENT_REGISTRY.with(|registry| {
        let mut registry = registry.borrow_mut();
        let handle = ElementRef(registry.next_id);
        registry.next_id = registry.next_id.wrapping_add(1);
        registry.nodes.insert(
            handle,
            RegisteredElement {
                node,
                saved_outline: None,
            },
        );
        handle
    })
}

/// Forget every handle, restoring outlines on anything still highlighted.
pub(crate) fn clear_registry() {
    ELEMENT_REGISTRY.with(|registry| {
        let mut registry = registry.borrow_mut();
        for entry in registry.nodes.values_mut() {
            restore_outline(entry);
        }
        registry.nodes.clear();
    });
}

fn node_style(node: &web_sys::Element) -> Option<web_sys::CssStyleDeclaration> {
    node.dyn_ref::<web_sys::HtmlElement>().map(|el| el.style())
}

fn apply_highlight(element: ElementRef, color: &str) {
    ELEMENT_REGISTRY.with(|registry| {
        let mut registry = registry.borrow_mut();
        let Some(entry) = registry.nodes.get_mut(&element) else {
            return;
        };
        let Some(style) = node_style(&entry.node) else {
            return;
        };
        if entry.saved_outline.is_none() {
            entry.saved_outline = Some(style.get_property_value("outline").unwrap_or_default());
        }
        style
            .set_property("outline", &format!("2px solid {color}"))
            .ok();
    });
}

fn restore_outline(entry: &mut RegisteredElement) {
    let Some(saved) = entry.saved_outline.take() else {
        return;
    };
    let Some(style) = node_style(&entry.node) else {
        return;
    };
    if saved.is_empty() {
        style.remove_property("outline").ok();
    } else {
        style.set_property("outline", &saved).ok();
    }
}

fn clear_highlight(element: ElementRef) {
    ELEMENT_REGISTRY.with(|registry| {
        if let Some(entry) = registry.borrow_mut().nodes.get_mut(&element) {
            restore_outline(entry);
        }
    });
}

fn scroll_to(element: ElementRef) {
    ELEMENT_REGISTRY.with(|registry| {
        let registry = registry.borrow();
        let Some(entry) = registry.nodes.get(&element) else {
            return;
        };
        let opts = web_sys::ScrollIntoViewOptions::new();
        opts.set_behavior(web_sys::ScrollBehavior::Smooth);
        opts.set_block(web_sys::ScrollLogicalPosition::Center);
        entry
            .node
            .scroll_into_view_with_scroll_into_view_options(&opts);
    });
}

pub(crate) fn js_error_text(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
