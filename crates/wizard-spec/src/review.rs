use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::LookupError;
use crate::field::value_text;
use crate::form::Form;
use crate::post::{EXTRA_INFO_FIELD, EXTRA_OPTIONS_FIELD, is_conditional, is_metadata};
use crate::spec::question::{ChoiceSpec, QuestionSpec, QuestionType};

/// One answered question, rendered as `{question: [answers...]}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEntry {
    pub question: String,
    pub answers: Vec<String>,
}

impl Serialize for ReviewEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.question, &self.answers)?;
        map.end()
    }
}

/// Human-readable answers of a whole wizard run, in answer order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Review {
    entries: Vec<ReviewEntry>,
    skipped: usize,
}

impl Review {
    pub fn entries(&self) -> &[ReviewEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of stored answers dropped because they no longer resolve.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(self)
    }
}

impl Serialize for Review {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

/// Maps raw per-page answer records back to question text and choice labels.
///
/// `records[i]` is read against `forms[i]`. Answers whose question or choice
/// is gone from the live schema are logged and left out of the review.
pub fn format_answers(records: &[Map<String, Value>], forms: &[Form]) -> Review {
    let mut review = Review::default();
    for (index, record) in records.iter().enumerate() {
        match forms.get(index) {
            Some(form) => format_page(&mut review, record, form.serialized()),
            None => {
                warn!(index, "answers stored for a page that no longer exists");
                review.skipped += 1;
            }
        }
    }
    review
}

fn format_page(review: &mut Review, record: &Map<String, Value>, questions: &[QuestionSpec]) {
    let answers: Map<String, Value> = record
        .iter()
        .filter(|(key, _)| !is_metadata(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    for (key, value) in &answers {
        if is_conditional(key) {
            continue;
        }
        match answer_entry(key, value, &answers, questions) {
            Ok(Some(entry)) => review.entries.push(entry),
            Ok(None) => {}
            Err(error) => {
                warn!(%error, "skipping stored answer");
                review.skipped += 1;
            }
        }
    }
}

fn answer_entry(
    key: &str,
    value: &Value,
    answers: &Map<String, Value>,
    questions: &[QuestionSpec],
) -> Result<Option<ReviewEntry>, LookupError> {
    let question = find_question(key, questions)?;

    if question.kind.is_free_text() {
        let text = scalar_text(value);
        if text.is_empty() {
            return Ok(None);
        }
        return Ok(Some(ReviewEntry {
            question: question.question_text.clone(),
            answers: vec![text],
        }));
    }

    // Blank leading entry of a select.
    if question.kind == QuestionType::Dropdown
        && !value.is_array()
        && scalar_text(value).is_empty()
    {
        return Ok(None);
    }

    let labels = answer_list(value)
        .iter()
        .map(|item| choice_text(answers, item, question))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(ReviewEntry {
        question: question.question_text.clone(),
        answers: labels,
    }))
}

fn find_question<'q>(
    key: &str,
    questions: &'q [QuestionSpec],
) -> Result<&'q QuestionSpec, LookupError> {
    questions
        .iter()
        .rev()
        .find(|question| question.field_id == key)
        .ok_or_else(|| LookupError::Question {
            field_id: key.to_string(),
            available: questions
                .iter()
                .map(|question| question.field_id.clone())
                .collect(),
        })
}

fn choice_text(
    answers: &Map<String, Value>,
    picked: &str,
    question: &QuestionSpec,
) -> Result<String, LookupError> {
    let choice = question
        .choice(picked)
        .ok_or_else(|| LookupError::Choice {
            pk: picked.to_string(),
            field_id: question.field_id.clone(),
            available: question.choices.iter().map(|choice| choice.pk).collect(),
        })?;

    let mut text = choice.text.clone();
    if choice.accepts_extra_info()
        && let Some(extra_info) = non_empty(answers.get(EXTRA_INFO_FIELD))
    {
        text.push_str(": ");
        text.push_str(&extra_info);
    }
    if choice.accepts_extra_options()
        && let Some(raw) = non_empty(answers.get(EXTRA_OPTIONS_FIELD))
    {
        text.push_str(": ");
        text.push_str(option_text(choice, &raw)?);
    }
    Ok(text)
}

fn option_text<'c>(choice: &'c ChoiceSpec, raw: &str) -> Result<&'c str, LookupError> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .and_then(|index| choice.options.get(index))
        .map(|option| option.text.as_str())
        .ok_or_else(|| LookupError::Option {
            raw: raw.to_string(),
            choice_pk: choice.pk,
        })
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items.last().map(scalar_text).unwrap_or_default(),
        other => value_text(other).unwrap_or_else(|| other.to_string()),
    }
}

fn answer_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(scalar_text).collect(),
        other => vec![scalar_text(other)],
    }
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    value.map(scalar_text).filter(|text| !text.is_empty())
}
