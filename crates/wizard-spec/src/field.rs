use serde::Serialize;
use serde_json::Value;

use crate::spec::question::{Constraint, QuestionSpec, QuestionType};
use crate::validate::{FieldError, enforce_constraint};

/// Value/label pair offered by a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChoice {
    pub value: String,
    pub label: String,
}

pub const BLANK_CHOICE_LABEL: &str = "---------";

/// Field strategy selected from the question type.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text {
        multiline: bool,
        constraint: Option<Constraint>,
    },
    SingleChoice {
        choices: Vec<FieldChoice>,
    },
    MultipleChoice {
        choices: Vec<FieldChoice>,
    },
    /// Single select whose first entry is the blank choice.
    Select {
        choices: Vec<FieldChoice>,
    },
}

/// Runtime field derived from one serialized question.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub label: String,
    pub required: bool,
    pub kind: FieldKind,
}

impl Field {
    pub fn from_question(question: &QuestionSpec) -> Self {
        let kind = match question.kind {
            QuestionType::Singlelinetext | QuestionType::Textarea => FieldKind::Text {
                multiline: question.kind == QuestionType::Textarea,
                constraint: question.constraint.clone(),
            },
            QuestionType::Radiobutton => FieldKind::SingleChoice {
                choices: question_choices(question),
            },
            QuestionType::Checkbox => FieldKind::MultipleChoice {
                choices: question_choices(question),
            },
            QuestionType::Dropdown => {
                let mut choices = vec![FieldChoice {
                    value: String::new(),
                    label: BLANK_CHOICE_LABEL.into(),
                }];
                choices.extend(question_choices(question));
                FieldKind::Select { choices }
            }
        };
        Self {
            name: question.field_id.clone(),
            label: question.question_text.clone(),
            required: question.required,
            kind,
        }
    }

    pub fn choices(&self) -> &[FieldChoice] {
        match &self.kind {
            FieldKind::Text { .. } => &[],
            FieldKind::SingleChoice { choices }
            | FieldKind::MultipleChoice { choices }
            | FieldKind::Select { choices } => choices,
        }
    }

    /// Validates and normalizes the posted value for this field.
    pub fn clean(&self, value: Option<&Value>) -> Result<Value, FieldError> {
        match &self.kind {
            FieldKind::Text { constraint, .. } => {
                let text = self.scalar(value)?;
                let text = text.trim().to_string();
                if text.is_empty() {
                    return self.empty(Value::String(text));
                }
                if let Some(constraint) = constraint
                    && let Some(error) = enforce_constraint(&self.name, &text, constraint)
                {
                    return Err(error);
                }
                Ok(Value::String(text))
            }
            FieldKind::SingleChoice { choices } | FieldKind::Select { choices } => {
                let picked = self.scalar(value)?;
                if picked.is_empty() {
                    return self.empty(Value::String(picked));
                }
                self.ensure_choice(choices, &picked)?;
                Ok(Value::String(picked))
            }
            FieldKind::MultipleChoice { choices } => {
                let picked = self.list(value)?;
                if picked.is_empty() {
                    return self.empty(Value::Array(Vec::new()));
                }
                for item in &picked {
                    self.ensure_choice(choices, item)?;
                }
                Ok(Value::Array(picked.into_iter().map(Value::String).collect()))
            }
        }
    }

    fn empty(&self, blank: Value) -> Result<Value, FieldError> {
        if self.required {
            Err(FieldError::new(&self.name, "This field is required.", "required"))
        } else {
            Ok(blank)
        }
    }

    fn scalar(&self, value: Option<&Value>) -> Result<String, FieldError> {
        let value = match value {
            None => return Ok(String::new()),
            Some(Value::Array(items)) => match items.last() {
                Some(last) => last,
                None => return Ok(String::new()),
            },
            Some(value) => value,
        };
        value_text(value).ok_or_else(|| self.type_mismatch())
    }

    fn list(&self, value: Option<&Value>) -> Result<Vec<String>, FieldError> {
        match value {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| value_text(item).ok_or_else(|| self.type_mismatch()))
                .filter(|item| !matches!(item, Ok(text) if text.is_empty()))
                .collect(),
            Some(value) => {
                let text = value_text(value).ok_or_else(|| self.type_mismatch())?;
                if text.is_empty() {
                    Ok(Vec::new())
                } else {
                    Ok(vec![text])
                }
            }
        }
    }

    fn ensure_choice(&self, choices: &[FieldChoice], picked: &str) -> Result<(), FieldError> {
        if choices.iter().any(|choice| choice.value == picked) {
            Ok(())
        } else {
            Err(FieldError::new(
                &self.name,
                &format!("Select a valid choice. {picked} is not one of the available choices."),
                "invalid_choice",
            ))
        }
    }

    fn type_mismatch(&self) -> FieldError {
        FieldError::new(&self.name, "type mismatch", "type_mismatch")
    }
}

fn question_choices(question: &QuestionSpec) -> Vec<FieldChoice> {
    question
        .choices
        .iter()
        .map(|choice| FieldChoice {
            value: choice.pk.to_string(),
            label: choice.text.clone(),
        })
        .collect()
}

/// Text form of a posted scalar, `None` for arrays and objects.
pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}
