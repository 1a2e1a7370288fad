mod app;
mod date_filter;
mod payload;
mod popup;
mod stats_panel;
mod store;

use leptos::mount::mount_to;
use leptos::prelude::*;
use std::any::Any;
use std::cell::RefCell;
use wasm_bindgen::JsCast;

use crate::app::{App, TOOLBAR_HOST_ID, ToolbarConfig};
use crate::store::js_error_text;

thread_local! {
    static APP_MOUNT_HANDLE: RefCell<Option<Box<dyn Any>>> = RefCell::new(None);
}

/// Host element for the toolbar, created on `body` if the page did not provide one.
fn toolbar_host(document: &web_sys::Document) -> Result<web_sys::Element, String> {
    if let Some(host) = document.get_element_by_id(TOOLBAR_HOST_ID) {
        return Ok(host);
    }
    let body = document.body().ok_or("document has no body")?;
    let host = document
        .create_element("div")
        .map_err(|e| js_error_text(&e))?;
    host.set_id(TOOLBAR_HOST_ID);
    body.append_child(&host).map_err(|e| js_error_text(&e))?;
    Ok(host)
}

/// Container inside the host's shadow root that the app mounts into.
fn shadow_mount_target(
    document: &web_sys::Document,
    host: &web_sys::Element,
) -> Result<web_sys::HtmlElement, String> {
    let shadow = match host.shadow_root() {
        Some(shadow) => shadow,
        None => host
            .attach_shadow(&web_sys::ShadowRootInit::new(web_sys::ShadowRootMode::Open))
            .map_err(|e| format!("attach_shadow failed: {}", js_error_text(&e)))?,
    };
    let container = document
        .create_element("div")
        .map_err(|e| js_error_text(&e))?;
    shadow
        .append_child(&container)
        .map_err(|e| js_error_text(&e))?;
    container
        .dyn_into::<web_sys::HtmlElement>()
        .map_err(|_| "mount container is not an HtmlElement".to_string())
}

fn main() {
    console_error_panic_hook::set_once();
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    let (host, target) =
        match toolbar_host(&document).and_then(|host| {
            let target = shadow_mount_target(&document, &host)?;
            Ok((host, target))
        }) {
            Ok(mounted) => mounted,
            Err(e) => {
                web_sys::console::warn_1(&format!("clickmap: cannot mount toolbar: {e}").into());
                return;
            }
        };
    let config = ToolbarConfig::from_host(&host);

    APP_MOUNT_HANDLE.with(move |slot| {
        // Drop any previous mount so its effects stop touching the store.
        let _old = slot.borrow_mut().take();
        let handle = mount_to(target, move || view! { <App config=config /> });
        *slot.borrow_mut() = Some(Box::new(handle));
    });
}
