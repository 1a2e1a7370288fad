use chrono::{DateTime, Utc};
use leptos::portal::Portal;
use leptos::prelude::*;
use wasm_bindgen::JsValue;

use clickmap_shared::HeatmapFilter;
use clickmap_shared::date_range::{
    DATE_RANGE_OPTIONS, DateRangeOption, option_for_filter, option_for_label_or_default,
    resolve_date_from, resolve_date_to,
};

use crate::popup::fallback_container;
use crate::store::{HeatmapActions, HeatmapFilterState, js_error_text};

pub(crate) const DATE_FROM_PARAM: &str = "date_from";
pub(crate) const DATE_TO_PARAM: &str = "date_to";
const POPUP_GAP_PX: f64 = 4.0;

fn now_utc() -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(js_sys::Date::now() as i64)
}

const HINT_FORMAT: &str = "%b %-d, %H:%M";

/// Short note under a menu entry saying which span the range covers.
fn option_hint(option: &DateRangeOption, now: DateTime<Utc>) -> String {
    let (Ok(from), Ok(to)) = (
        resolve_date_from(option.date_from, now),
        resolve_date_to(option.date_to, now),
    ) else {
        return String::new();
    };
    match (from, to) {
        (Some(from), Some(to)) => format!(
            "{} to {}",
            from.format(HINT_FORMAT),
            to.format(HINT_FORMAT)
        ),
        (Some(from), None) => format!("since {}", from.format(HINT_FORMAT)),
        (None, Some(to)) => format!("before {}", to.format(HINT_FORMAT)),
        (None, None) => "no lower bound".to_string(),
    }
}

fn set_or_delete(params: &web_sys::UrlSearchParams, name: &str, value: Option<&str>) {
    match value {
        Some(value) => params.set(name, value),
        None => params.delete(name),
    }
}

fn url_with_range(href: &str, option: &DateRangeOption) -> Result<String, String> {
    let url = web_sys::Url::new(href).map_err(|e| js_error_text(&e))?;
    let params = url.search_params();
    set_or_delete(&params, DATE_FROM_PARAM, option.date_from);
    set_or_delete(&params, DATE_TO_PARAM, option.date_to);
    Ok(url.href())
}

// Only reachable with `update_path` on.
fn write_range_to_url(option: &DateRangeOption) -> Result<(), String> {
    let window = web_sys::window().ok_or("no window")?;
    let href = window.location().href().map_err(|e| js_error_text(&e))?;
    let next = url_with_range(&href, option)?;
    window
        .history()
        .map_err(|e| js_error_text(&e))?
        .replace_state_with_url(&JsValue::NULL, "", Some(&next))
        .map_err(|e| js_error_text(&e))
}

/// Date range picker. The chosen range goes to the store's heatmap filter.
#[component]
pub fn DateFilter(
    /// Label of the initially selected range when the store holds no known range.
    #[prop(into)]
    default_value: String,
    /// Opt-in: mirror the choice into the page URL's `date_from`/`date_to` query
    /// parameters. The stats panel leaves this off.
    update_path: bool,
    /// Resolves the element the popup is portalled into.
    get_popup_container: fn() -> Option<web_sys::Element>,
) -> impl IntoView {
    let actions: HeatmapActions = expect_context();
    let HeatmapFilterState(filter) = expect_context();
    // Re-showing the panel keeps whatever range the store already holds.
    let initial = filter
        .with_untracked(|f| option_for_filter(f).copied())
        .unwrap_or_else(|| *option_for_label_or_default(&default_value));
    let current = RwSignal::new(initial);
    let open = RwSignal::new(false);
    let anchor = RwSignal::new((0.0_f64, 0.0_f64));
    let button_ref = NodeRef::<leptos::html::Button>::new();

    let toggle = move |_| {
        if !open.get_untracked()
            && let Some(button) = button_ref.get_untracked()
        {
            let rect = button.get_bounding_client_rect();
            anchor.set((rect.bottom() + POPUP_GAP_PX, rect.left()));
        }
        open.update(|is_open| *is_open = !*is_open);
    };

    let choose = move |option: DateRangeOption| {
        current.set(option);
        open.set(false);
        actions
            .set_heatmap_filter
            .run(HeatmapFilter::from_option(&option));
        if update_path && let Err(e) = write_range_to_url(&option) {
            web_sys::console::warn_1(&format!("clickmap: could not update URL: {e}").into());
        }
    };

    view! {
        <div class="clickmap-date-filter">
            <button node_ref=button_ref class="clickmap-date-button" on:click=toggle>
                <span>{move || current.get().label}</span>
                <span class="clickmap-caret">{"\u{25BE}"}</span>
            </button>
            {move || {
                if !open.get() {
                    return None;
                }
                let mount = get_popup_container().or_else(fallback_container)?;
                let (top, left) = anchor.get_untracked();
                let now = now_utc();
                Some(view! {
                    <Portal mount=mount>
                        <div
                            class="clickmap-popup-backdrop"
                            style="position: fixed; inset: 0; pointer-events: auto;"
                            on:click=move |_| open.set(false)
                        />
                        <ul
                            class="clickmap-popup"
                            style=format!("position: fixed; top: {top}px; left: {left}px; pointer-events: auto;")
                        >
                            {DATE_RANGE_OPTIONS
                                .iter()
                                .copied()
                                .map(|option| {
                                    let hint = now
                                        .map(|now| option_hint(&option, now))
                                        .unwrap_or_default();
                                    view! {
                                        <li
                                            class="clickmap-popup-item"
                                            class:active=move || current.get() == option
                                            on:click=move |_| choose(option)
                                        >
                                            <span>{option.label}</span>
                                            <span class="clickmap-popup-hint">{hint}</span>
                                        </li>
                                    }
                                })
                                .collect_view()}
                        </ul>
                    </Portal>
                })
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 9, 5, 0).unwrap()
    }

    #[test]
    fn hint_for_relative_days() {
        let option = option_for_label_or_default("Last 7 days");
        assert_eq!(option_hint(option, now()), "since May 3, 09:05");
    }

    #[test]
    fn hint_for_today_starts_at_midnight() {
        let option = option_for_label_or_default("Today");
        assert_eq!(option_hint(option, now()), "since May 10, 00:00");
    }

    #[test]
    fn hint_for_yesterday_is_a_closed_range() {
        let option = option_for_label_or_default("Yesterday");
        assert_eq!(option_hint(option, now()), "May 9, 00:00 to May 10, 00:00");
    }

    #[test]
    fn yesterday_hint_differs_from_last_24_hours() {
        let yesterday = option_for_label_or_default("Yesterday");
        let last_day = option_for_label_or_default("Last 24 hours");
        assert_eq!(option_hint(last_day, now()), "since May 9, 09:05");
        assert_ne!(option_hint(yesterday, now()), option_hint(last_day, now()));
    }

    #[test]
    fn hint_for_all_time() {
        let option = option_for_label_or_default("All time");
        assert_eq!(option_hint(option, now()), "no lower bound");
    }

    #[test]
    fn hint_is_empty_for_unparseable_range() {
        let option = DateRangeOption {
            label: "Broken",
            date_from: Some("soon"),
            date_to: None,
        };
        assert_eq!(option_hint(&option, now()), "");
    }
}
