use serde::{Deserialize, Serialize};

use crate::element::ActionStep;

/// One counted element as the host page describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadElement {
    pub selector: String,
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_step: Option<ActionStep>,
}

/// Heatmap data embedded by the host page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapPayload {
    #[serde(default)]
    pub elements: Vec<PayloadElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_count: Option<u64>,
}

impl HeatmapPayload {
    pub fn from_json(raw: &str) -> Result<Self, String> {
        serde_json::from_str(raw).map_err(|e| format!("invalid heatmap payload: {e}"))
    }

    /// Total clicks reported by the host, or the sum of element counts when absent.
    pub fn total_clicks(&self) -> u64 {
        self.click_count
            .unwrap_or_else(|| self.elements.iter().map(|el| el.count).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_in_order() {
        let payload = HeatmapPayload::from_json(
            r##"{
                "elements": [
                    {"selector": "#buy", "count": 12, "action_step": {"text": "Buy now"}},
                    {"selector": "nav a", "count": 4, "action_step": {"tag_name": "a"}},
                    {"selector": ".footer", "count": 1}
                ],
                "click_count": 40
            }"##,
        )
        .expect("payload should parse");
        let selectors: Vec<_> = payload.elements.iter().map(|e| e.selector.as_str()).collect();
        assert_eq!(selectors, ["#buy", "nav a", ".footer"]);
        assert_eq!(payload.elements[2].action_step, None);
        assert_eq!(payload.total_clicks(), 40);
    }

    #[test]
    fn click_count_defaults_to_sum() {
        let payload = HeatmapPayload::from_json(
            r#"{"elements": [{"selector": "a", "count": 2}, {"selector": "b", "count": 5}]}"#,
        )
        .expect("payload should parse");
        assert_eq!(payload.total_clicks(), 7);
    }

    #[test]
    fn empty_object_is_empty_payload() {
        let payload = HeatmapPayload::from_json("{}").expect("payload should parse");
        assert!(payload.elements.is_empty());
        assert_eq!(payload.total_clicks(), 0);
    }

    #[test]
    fn rejects_negative_counts() {
        let err = HeatmapPayload::from_json(r#"{"elements": [{"selector": "a", "count": -1}]}"#)
            .expect_err("negative count should fail");
        assert!(err.starts_with("invalid heatmap payload"));
    }
}
