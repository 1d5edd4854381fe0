use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Supported question types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Single line of free text.
    #[serde(alias = "Singlelinetext")]
    Singlelinetext,
    /// Multi line free text.
    #[serde(alias = "Textarea")]
    Textarea,
    /// Exactly one choice, shown as radio buttons.
    #[serde(alias = "RadioButton")]
    Radiobutton,
    /// Any number of choices.
    #[serde(alias = "Checkbox")]
    Checkbox,
    /// Exactly one choice from a select with a leading blank entry.
    #[serde(alias = "Dropdown")]
    Dropdown,
}

impl QuestionType {
    pub fn is_free_text(&self) -> bool {
        matches!(self, QuestionType::Singlelinetext | QuestionType::Textarea)
    }
}

/// Constraint applied to free-text answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct Constraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_len: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_len: Option<usize>,
}

/// Sub-option offered once a choice with options is picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChoiceOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pk: Option<i64>,
    pub text: String,
}

/// One selectable answer of a choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChoiceSpec {
    pub pk: i64,
    pub text: String,
    /// Prompt for the free-text `extra_info` answer; empty means none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_info_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
}

impl ChoiceSpec {
    pub fn accepts_extra_info(&self) -> bool {
        self.extra_info_text
            .as_deref()
            .is_some_and(|text| !text.is_empty())
    }

    pub fn accepts_extra_options(&self) -> bool {
        !self.options.is_empty()
    }
}

/// Serialized question as stored on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionSpec {
    pub field_id: String,
    pub question_text: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ChoiceSpec>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Constraint>,
    /// Pre-`dropdown` documents flagged select questions this way.
    #[serde(default, skip_serializing)]
    pub is_dropdown: bool,
}

impl QuestionSpec {
    /// Moves a legacy `is_dropdown` flag onto the question type.
    pub fn upgrade_legacy(&mut self) {
        if self.is_dropdown {
            self.kind = QuestionType::Dropdown;
            self.is_dropdown = false;
        }
    }

    pub fn choice(&self, pk: &str) -> Option<&ChoiceSpec> {
        self.choices
            .iter()
            .rev()
            .find(|choice| choice.pk.to_string() == pk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_dropdown_flag_becomes_type() {
        let mut question: QuestionSpec = serde_json::from_value(json!({
            "field_id": "question_4",
            "question_text": "Where?",
            "type": "radiobutton",
            "is_dropdown": true,
            "choices": [{ "pk": 1, "text": "Home" }]
        }))
        .expect("deserialize");
        question.upgrade_legacy();
        assert_eq!(question.kind, QuestionType::Dropdown);
        let value = serde_json::to_value(&question).expect("serialize");
        assert!(value.get("is_dropdown").is_none());
        assert_eq!(value["type"], "dropdown");
    }

    #[test]
    fn accepts_capitalized_type_tags() {
        let question: QuestionSpec = serde_json::from_value(json!({
            "field_id": "question_1",
            "question_text": "Name?",
            "type": "Singlelinetext"
        }))
        .expect("deserialize");
        assert!(question.kind.is_free_text());
    }

    #[test]
    fn choice_lookup_prefers_last_duplicate() {
        let question: QuestionSpec = serde_json::from_value(json!({
            "field_id": "question_2",
            "question_text": "Color?",
            "type": "checkbox",
            "choices": [
                { "pk": 3, "text": "Red" },
                { "pk": 3, "text": "Crimson" }
            ]
        }))
        .expect("deserialize");
        assert_eq!(question.choice("3").map(|c| c.text.as_str()), Some("Crimson"));
        assert!(question.choice("4").is_none());
    }
}
