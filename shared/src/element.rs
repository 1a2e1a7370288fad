use serde::{Deserialize, Serialize};

/// Opaque handle to a page element. The client keeps the handle -> DOM node mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementRef(pub u32);

/// Matched action metadata for an element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
}

/// An element paired with its aggregated click count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountedElement {
    pub element: ElementRef,
    pub count: u64,
    pub action_step: Option<ActionStep>,
}

/// What a ranked row shows as its main content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowLabel {
    Text(String),
    /// Rendered as inline code, `<tag>`.
    Tag(String),
    Fallback,
}

impl RowLabel {
    pub const FALLBACK_TEXT: &'static str = "Element";

    /// Plain-text form of the label, as it reads on screen.
    pub fn display_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Tag(tag) => format!("<{tag}>"),
            Self::Fallback => Self::FALLBACK_TEXT.to_string(),
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

impl ActionStep {
    pub fn row_label(&self) -> RowLabel {
        if let Some(text) = non_empty(self.text.as_ref()) {
            return RowLabel::Text(text.to_string());
        }
        if let Some(tag) = non_empty(self.tag_name.as_ref()) {
            return RowLabel::Tag(tag.to_string());
        }
        RowLabel::Fallback
    }
}

impl CountedElement {
    pub fn new(element: ElementRef, count: u64, action_step: Option<ActionStep>) -> Self {
        Self {
            element,
            count,
            action_step,
        }
    }

    pub fn row_label(&self) -> RowLabel {
        self.action_step
            .as_ref()
            .map_or(RowLabel::Fallback, ActionStep::row_label)
    }

    pub fn clicks_text(&self) -> String {
        format!("{} clicks", self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(text: Option<&str>, tag_name: Option<&str>) -> Option<ActionStep> {
        Some(ActionStep {
            text: text.map(str::to_string),
            tag_name: tag_name.map(str::to_string),
        })
    }

    #[test]
    fn text_wins_over_tag() {
        let el = CountedElement::new(ElementRef(1), 3, step(Some("Buy now"), Some("button")));
        assert_eq!(el.row_label(), RowLabel::Text("Buy now".into()));
        assert_eq!(el.row_label().display_text(), "Buy now");
    }

    #[test]
    fn tag_only_renders_as_tag() {
        let el = CountedElement::new(ElementRef(1), 3, step(None, Some("button")));
        assert_eq!(el.row_label(), RowLabel::Tag("button".into()));
        assert_eq!(el.row_label().display_text(), "<button>");
    }

    #[test]
    fn missing_step_falls_back() {
        let el = CountedElement::new(ElementRef(1), 3, None);
        assert_eq!(el.row_label(), RowLabel::Fallback);
        assert_eq!(el.row_label().display_text(), "Element");
    }

    #[test]
    fn empty_step_falls_back() {
        let el = CountedElement::new(ElementRef(1), 3, step(None, None));
        assert_eq!(el.row_label(), RowLabel::Fallback);
    }

    #[test]
    fn empty_strings_are_treated_as_absent() {
        let el = CountedElement::new(ElementRef(1), 3, step(Some(""), Some("a")));
        assert_eq!(el.row_label(), RowLabel::Tag("a".into()));
        let el = CountedElement::new(ElementRef(1), 3, step(Some(""), Some("")));
        assert_eq!(el.row_label(), RowLabel::Fallback);
    }

    #[test]
    fn clicks_text_uses_count() {
        let el = CountedElement::new(ElementRef(9), 42, None);
        assert_eq!(el.clicks_text(), "42 clicks");
    }

    #[test]
    fn action_step_deserializes_with_missing_fields() {
        let parsed: ActionStep = serde_json::from_str(r#"{"tag_name":"a"}"#).expect("parse");
        assert_eq!(parsed.text, None);
        assert_eq!(parsed.tag_name.as_deref(), Some("a"));
    }
}
