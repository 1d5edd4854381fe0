use serde_json::{Map, Value};

use crate::steps::Step;

pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";
pub const CURRENT_STEP_FIELD: &str = "wizard_current_step";
pub const GOTO_STEP_FIELD: &str = "wizard_goto_step";
pub const FORM_PK_FIELD: &str = "form_pk";
pub const EXTRA_INFO_FIELD: &str = "extra_info";
pub const EXTRA_OPTIONS_FIELD: &str = "extra_options";

/// Wizard bookkeeping keys posted alongside the answers.
pub const METADATA_FIELDS: [&str; 4] = [
    CSRF_FIELD,
    CURRENT_STEP_FIELD,
    GOTO_STEP_FIELD,
    FORM_PK_FIELD,
];

/// Page-level keys carrying the sub-answer of the picked choice.
pub const CONDITIONAL_FIELDS: [&str; 2] = [EXTRA_INFO_FIELD, EXTRA_OPTIONS_FIELD];

/// Named navigation buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GotoStep {
    Back,
    Next,
    Review,
}

impl GotoStep {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Back" => Some(GotoStep::Back),
            "Next" => Some(GotoStep::Next),
            "Review" => Some(GotoStep::Review),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GotoStep::Back => "Back",
            GotoStep::Next => "Next",
            GotoStep::Review => "Review",
        }
    }
}

/// Raw key-value payload of one step submission, in posted order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardPost {
    data: Map<String, Value>,
}

impl WizardPost {
    /// Accepts a JSON object; anything else is an empty post.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(data) => Self { data },
            _ => Self::default(),
        }
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    pub fn current_step(&self) -> Option<Step> {
        self.data.get(CURRENT_STEP_FIELD).map(Step::from_value)
    }

    pub fn goto_step(&self) -> Option<GotoStep> {
        self.data
            .get(GOTO_STEP_FIELD)
            .and_then(Value::as_str)
            .and_then(GotoStep::from_label)
    }

    pub fn form_pk(&self) -> Option<u64> {
        match self.data.get(FORM_PK_FIELD)? {
            Value::Number(number) => number.as_u64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

pub fn is_metadata(key: &str) -> bool {
    METADATA_FIELDS.contains(&key)
}

pub fn is_conditional(key: &str) -> bool {
    CONDITIONAL_FIELDS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_navigation_fields() {
        let post = WizardPost::from_value(json!({
            "csrfmiddlewaretoken": "abc",
            "wizard_current_step": "2",
            "wizard_goto_step": "Back",
            "form_pk": "7"
        }));
        assert_eq!(post.current_step(), Some(Step::Index(2)));
        assert_eq!(post.goto_step(), Some(GotoStep::Back));
        assert_eq!(post.form_pk(), Some(7));
    }

    #[test]
    fn unknown_goto_label_is_ignored() {
        let post = WizardPost::from_value(json!({ "wizard_goto_step": "Sideways" }));
        assert_eq!(post.goto_step(), None);
        assert_eq!(post.form_pk(), None);
    }
}
