use crate::app::{POPUP_ROOT_ID, TOOLBAR_HOST_ID};

/// Overlay root inside the toolbar's shadow root. Popups are portalled here.
pub(crate) fn toolbar_popup_container() -> Option<web_sys::Element> {
    let document = web_sys::window()?.document()?;
    let host = document.get_element_by_id(TOOLBAR_HOST_ID)?;
    host.shadow_root()?.get_element_by_id(POPUP_ROOT_ID)
}

/// Where a popup should go when the resolver comes up empty.
pub(crate) fn fallback_container() -> Option<web_sys::Element> {
    web_sys::window()?.document()?.body().map(Into::into)
}
