use leptos::prelude::*;

use clickmap_shared::date_range::DEFAULT_DATE_RANGE_LABEL;
use clickmap_shared::{CountedElement, ElementRef, RowLabel};

use crate::date_filter::DateFilter;
use crate::popup::toolbar_popup_container;
use crate::store::{
    ClickCount, CountedElements, ElementDispatcher, HeatmapActions, HeatmapEnabled,
    HeatmapLoading, HighlightedElement, SelectedElement,
};

pub(crate) const RANK_DIGIT_WIDTH_PX: u32 = 12;
pub(crate) const RANK_PADDING_PX: u32 = 6;

pub(crate) fn panel_visible(enabled: bool, loading: bool) -> bool {
    enabled && !loading
}

pub(crate) fn summary_line(elements: usize, clicks: u64) -> String {
    format!("Found: {elements} elements / {clicks} clicks!")
}

/// Width of the rank column: one digit slot per decimal digit of the row count.
/// An empty list is sized as one digit.
pub(crate) fn rank_label_width(rows: usize) -> u32 {
    let digits = rows.checked_ilog10().map_or(1, |d| d + 1);
    digits * RANK_DIGIT_WIDTH_PX + RANK_PADDING_PX
}

/// Pair each element with its 1-based rank, keeping the given order.
pub(crate) fn ranked_rows(elements: &[CountedElement]) -> Vec<(usize, CountedElement)> {
    elements
        .iter()
        .cloned()
        .enumerate()
        .map(|(idx, entry)| (idx + 1, entry))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RowEvent {
    Click,
    Enter,
    Leave,
}

pub(crate) fn dispatch_row_event(
    dispatcher: &impl ElementDispatcher,
    event: RowEvent,
    element: ElementRef,
) {
    match event {
        RowEvent::Click => dispatcher.select_element(element),
        RowEvent::Enter => dispatcher.highlight_element(Some(element)),
        RowEvent::Leave => dispatcher.highlight_element(None),
    }
}

/// Date filter, summary, and ranked element list for the click heatmap.
#[component]
pub fn StatsPanel() -> impl IntoView {
    let CountedElements(counted_elements) = expect_context();
    let ClickCount(click_count) = expect_context();
    let HeatmapEnabled(enabled) = expect_context();
    let HeatmapLoading(loading) = expect_context();

    let visible = Memo::new(move |_| panel_visible(enabled.get(), loading.get()));
    let element_total = Memo::new(move |_| counted_elements.with(Vec::len));
    let label_width = Memo::new(move |_| rank_label_width(element_total.get()));

    view! {
        <div class="clickmap-stats">
            <Show when=move || visible.get()>
                <div class="clickmap-stats-filter">
                    <DateFilter
                        default_value=DEFAULT_DATE_RANGE_LABEL
                        update_path=false
                        get_popup_container=toolbar_popup_container
                    />
                </div>
                <div class="clickmap-stats-summary">
                    {move || summary_line(element_total.get(), click_count.get())}
                </div>
                <ul class="clickmap-stats-list">
                    <For
                        each=move || counted_elements.with(|elements| ranked_rows(elements))
                        key=|item| item.clone()
                        children=move |(rank, entry)| {
                            view! { <StatsRow rank=rank entry=entry label_width=label_width /> }
                        }
                    />
                </ul>
            </Show>
        </div>
    }
}

#[component]
fn StatsRow(rank: usize, entry: CountedElement, label_width: Memo<u32>) -> impl IntoView {
    let actions: HeatmapActions = expect_context();
    let HighlightedElement(highlighted) = expect_context();
    let SelectedElement(selected) = expect_context();
    let element = entry.element;

    let label = entry.row_label();
    let text = label.display_text();
    let content = match label {
        RowLabel::Tag(_) => view! { <code class="clickmap-row-tag">{text}</code> }.into_any(),
        RowLabel::Text(_) | RowLabel::Fallback => {
            view! { <span class="clickmap-row-text">{text}</span> }.into_any()
        }
    };

    view! {
        <li
            class="clickmap-row"
            class:highlighted=move || highlighted.get() == Some(element)
            class:selected=move || selected.get() == Some(element)
            on:click=move |_| dispatch_row_event(&actions, RowEvent::Click, element)
            on:mouseenter=move |_| dispatch_row_event(&actions, RowEvent::Enter, element)
            on:mouseleave=move |_| dispatch_row_event(&actions, RowEvent::Leave, element)
        >
            <span
                class="clickmap-row-rank"
                style:width=move || format!("{}px", label_width.get())
            >
                {rank}
            </span>
            <span class="clickmap-row-content">{content}</span>
            <span class="clickmap-row-count">{entry.clicks_text()}</span>
        </li>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
    }

    impl ElementDispatcher for Recorder {
        fn highlight_element(&self, element: Option<ElementRef>) {
            self.calls
                .borrow_mut()
                .push(format!("highlight {:?}", element.map(|e| e.0)));
        }

        fn select_element(&self, element: ElementRef) {
            self.calls.borrow_mut().push(format!("select {}", element.0));
        }
    }

    #[test]
    fn hidden_unless_enabled_and_loaded() {
        assert!(!panel_visible(false, false));
        assert!(!panel_visible(false, true));
        assert!(!panel_visible(true, true));
        assert!(panel_visible(true, false));
    }

    #[test]
    fn summary_line_format() {
        assert_eq!(summary_line(3, 40), "Found: 3 elements / 40 clicks!");
        assert_eq!(summary_line(0, 0), "Found: 0 elements / 0 clicks!");
    }

    #[test]
    fn rank_width_tracks_digit_count() {
        assert_eq!(rank_label_width(1), 18);
        assert_eq!(rank_label_width(9), 18);
        assert_eq!(rank_label_width(10), 30);
        assert_eq!(rank_label_width(99), 30);
        assert_eq!(rank_label_width(100), 42);
        assert_eq!(rank_label_width(1000), 54);
    }

    #[test]
    fn rank_width_for_empty_list_is_one_digit() {
        assert_eq!(rank_label_width(0), 18);
    }

    #[test]
    fn rows_are_ranked_from_one_in_order() {
        let elements: Vec<_> = [40, 12, 12, 3]
            .into_iter()
            .enumerate()
            .map(|(i, count)| CountedElement::new(ElementRef(i as u32 + 10), count, None))
            .collect();
        let rows = ranked_rows(&elements);
        let ranks: Vec<_> = rows.iter().map(|(rank, _)| *rank).collect();
        assert_eq!(ranks, [1, 2, 3, 4]);
        let handles: Vec<_> = rows.iter().map(|(_, entry)| entry.element.0).collect();
        assert_eq!(handles, [10, 11, 12, 13]);
        assert_ne!(rows[0].0, 0);
    }

    #[test]
    fn no_rows_for_empty_list() {
        assert!(ranked_rows(&[]).is_empty());
    }

    #[test]
    fn click_selects_once() {
        let recorder = Recorder::default();
        dispatch_row_event(&recorder, RowEvent::Click, ElementRef(7));
        assert_eq!(*recorder.calls.borrow(), ["select 7"]);
    }

    #[test]
    fn hover_highlights_then_clears() {
        let recorder = Recorder::default();
        dispatch_row_event(&recorder, RowEvent::Enter, ElementRef(3));
        dispatch_row_event(&recorder, RowEvent::Leave, ElementRef(3));
        assert_eq!(
            *recorder.calls.borrow(),
            ["highlight Some(3)", "highlight None"]
        );
    }
}
