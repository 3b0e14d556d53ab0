use regex::Regex;
use tokenlens_scanner::{UnboundElement, UnboundKind};
use tokenlens_store::{IgnoreLists, IgnoreValueKind, IgnoredValue};

/// Removes unbound elements the user has suppressed, either by node id or
/// by value pattern. Pure: the lists are fetched once by the caller.
pub struct IgnoreFilter {
    hex: Regex,
}

impl IgnoreFilter {
    pub fn new() -> Self {
        Self {
            hex: Regex::new(r"#[0-9A-Fa-f]{6}").expect("hex pattern compiles"),
        }
    }

    pub fn apply(&self, lists: &IgnoreLists, elements: Vec<UnboundElement>) -> Vec<UnboundElement> {
        elements
            .into_iter()
            .filter(|element| !self.is_ignored(lists, element))
            .collect()
    }

    fn is_ignored(&self, lists: &IgnoreLists, element: &UnboundElement) -> bool {
        if lists.ids.iter().any(|id| id == &element.id) {
            return true;
        }
        lists
            .values
            .iter()
            .any(|entry| self.matches_value(entry, element))
    }

    fn matches_value(&self, entry: &IgnoredValue, element: &UnboundElement) -> bool {
        match entry.value_type {
            // A text suppression covers both text flag kinds; the value is
            // irrelevant since the flag is about the absent style itself.
            IgnoreValueKind::TextNoStyle => matches!(
                element.kind,
                UnboundKind::TextNoStyle | UnboundKind::TextPartialStyle
            ),
            IgnoreValueKind::Fill => {
                element.kind == UnboundKind::FillNoVariable
                    && self.hex_matches(element, &entry.value)
            }
            IgnoreValueKind::Stroke => {
                element.kind == UnboundKind::StrokeNoVariable
                    && self.hex_matches(element, &entry.value)
            }
        }
    }

    fn hex_matches(&self, element: &UnboundElement, value: &str) -> bool {
        let Some(details) = element.details.as_deref() else {
            return false;
        };
        self.hex
            .find(details)
            .is_some_and(|found| found.as_str().eq_ignore_ascii_case(value))
    }
}

impl Default for IgnoreFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(id: &str, kind: UnboundKind, details: Option<&str>) -> UnboundElement {
        UnboundElement {
            id: id.to_string(),
            name: format!("Node {id}"),
            kind,
            details: details.map(str::to_string),
        }
    }

    fn value(value_type: IgnoreValueKind, value: &str) -> IgnoredValue {
        IgnoredValue {
            value_type,
            value: value.to_string(),
        }
    }

    #[test]
    fn by_id_suppression_hides_every_flag_of_that_node() {
        let lists = IgnoreLists {
            ids: vec!["1:1".to_string()],
            values: Vec::new(),
        };
        let kept = IgnoreFilter::new().apply(
            &lists,
            vec![
                element("1:1", UnboundKind::FillNoVariable, Some("#FF0000")),
                element("1:1", UnboundKind::StrokeNoVariable, Some("#00FF00")),
                element("1:2", UnboundKind::FillNoVariable, Some("#FF0000")),
            ],
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "1:2");
    }

    #[test]
    fn fill_suppression_is_kind_and_value_specific() {
        let lists = IgnoreLists {
            ids: Vec::new(),
            values: vec![value(IgnoreValueKind::Fill, "#FF0000")],
        };
        let kept = IgnoreFilter::new().apply(
            &lists,
            vec![
                element("1:1", UnboundKind::FillNoVariable, Some("#FF0000")),
                element("1:2", UnboundKind::FillNoVariable, Some("#ff0000")),
                element("1:3", UnboundKind::StrokeNoVariable, Some("#FF0000")),
                element("1:4", UnboundKind::FillNoVariable, Some("#00FF00")),
            ],
        );
        let kept_ids: Vec<&str> = kept.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(kept_ids, vec!["1:3", "1:4"]);
    }

    #[test]
    fn text_suppression_covers_both_text_kinds() {
        let lists = IgnoreLists {
            ids: Vec::new(),
            values: vec![value(IgnoreValueKind::TextNoStyle, "")],
        };
        let kept = IgnoreFilter::new().apply(
            &lists,
            vec![
                element("1:1", UnboundKind::TextNoStyle, Some("Lorem")),
                element("1:2", UnboundKind::TextPartialStyle, Some("#333333")),
                element("1:3", UnboundKind::FillNoVariable, Some("#333333")),
            ],
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "1:3");
    }

    #[test]
    fn elements_without_details_never_match_value_suppressions() {
        let lists = IgnoreLists {
            ids: Vec::new(),
            values: vec![value(IgnoreValueKind::Fill, "#FF0000")],
        };
        let kept = IgnoreFilter::new().apply(
            &lists,
            vec![element("1:1", UnboundKind::FillNoVariable, None)],
        );
        assert_eq!(kept.len(), 1);
    }
}
