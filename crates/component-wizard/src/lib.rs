use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::debug;

use wizard_spec::{
    DEFAULT_SITE_ID, Form, FormManager, GotoStep, SiteId, StaticSchemaSource, Step, StepUrls,
    Steps, Storage, WizardError, WizardPost,
};

const DEFAULT_PAGES: &str = include_str!("../../wizard-spec/tests/fixtures/pages.json");

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("failed to parse request: {0}")]
    RequestParse(#[source] serde_json::Error),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
    #[error("form {0} is not part of the wizard")]
    UnknownForm(u64),
    #[error(transparent)]
    Wizard(#[from] WizardError),
}

/// Host configuration; every field falls back to a built-in default.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct WizardConfig {
    #[serde(default)]
    pub pages_json: Option<String>,
    #[serde(default)]
    pub site_id: Option<SiteId>,
    #[serde(default)]
    pub step_url: Option<String>,
}

struct Wizard {
    source: StaticSchemaSource,
    site_id: SiteId,
    urls: StepUrls,
}

impl Wizard {
    fn forms(&self, answers: &Value) -> Vec<Form> {
        FormManager::forms_for_site(&self.source, self.site_id, answers)
    }
}

fn load_wizard(config_json: &str) -> Result<Wizard, ComponentError> {
    let config: WizardConfig = if config_json.trim().is_empty() {
        WizardConfig::default()
    } else {
        serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)?
    };

    let pages_json = config.pages_json.as_deref().unwrap_or(DEFAULT_PAGES);
    let source = StaticSchemaSource::from_json(pages_json)?;
    let urls = match config.step_url.as_deref() {
        Some(template) => StepUrls::new(template)?,
        None => StepUrls::default(),
    };

    Ok(Wizard {
        source,
        site_id: config.site_id.unwrap_or(DEFAULT_SITE_ID),
        urls,
    })
}

fn parse_session(session_json: &str) -> Map<String, Value> {
    serde_json::from_str::<Value>(session_json)
        .ok()
        .and_then(|value| value.as_object().cloned())
        .unwrap_or_default()
}

fn parse_answers(answers_json: &str) -> Value {
    serde_json::from_str(answers_json).unwrap_or_else(|_| Value::Object(Map::new()))
}

fn parse_post(post_json: &str) -> Result<WizardPost, ComponentError> {
    let value: Value = serde_json::from_str(post_json).map_err(ComponentError::RequestParse)?;
    Ok(WizardPost::from_value(value))
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn form_summary(form: &Form) -> Value {
    json!({
        "pk": form.pk,
        "manager_index": form.manager_index,
        "questions": form.serialized(),
    })
}

fn form_errors(form: &Form) -> Result<Value, ComponentError> {
    serde_json::to_value(form.errors()).map_err(ComponentError::JsonEncode)
}

/// Serialized question lists of every page on the configured site.
pub fn describe(config_json: &str) -> String {
    respond(load_wizard(config_json).and_then(|wizard| {
        let serialized = FormManager::serialized_forms(&wizard.source, wizard.site_id);
        serde_json::to_value(serialized).map_err(ComponentError::JsonEncode)
    }))
}

/// Per-page validity of one answer payload.
pub fn validate_forms(config_json: &str, answers_json: &str) -> String {
    respond(load_wizard(config_json).and_then(|wizard| {
        let answers = parse_answers(answers_json);
        let forms = wizard.forms(&answers);
        let reports = forms
            .iter()
            .map(|form| {
                Ok(json!({
                    "pk": form.pk,
                    "manager_index": form.manager_index,
                    "valid": form.is_valid(),
                    "errors": form_errors(form)?,
                }))
            })
            .collect::<Result<Vec<_>, ComponentError>>()?;
        Ok(Value::Array(reports))
    }))
}

/// Resolves the step shown by a page view and stores it in the session.
pub fn get_step(config_json: &str, session_json: &str, step_param: Option<&str>) -> String {
    respond(load_wizard(config_json).and_then(|wizard| {
        let forms = wizard.forms(&Value::Null);
        let mut session = parse_session(session_json);
        let requested = step_param.map(Step::parse);

        let (step, url, overflowed, redirect, form) = {
            let mut steps = Steps::new(&forms, &mut session, &wizard.urls)?;
            let candidate = requested.unwrap_or_else(|| steps.raw_current());
            let overflowed = steps.overflowed(candidate);
            let redirect = if overflowed {
                Some(steps.last_url()?)
            } else {
                None
            };
            let step = steps.set_from_get(requested);
            let form = steps.current_form().map(form_summary);
            (step, steps.url(step)?, overflowed, redirect, form)
        };

        let review = if step.is_done() {
            let review = Storage::new(&mut session).cleaned_form_data(&forms);
            Some(serde_json::to_value(review).map_err(ComponentError::JsonEncode)?)
        } else {
            None
        };

        Ok(json!({
            "step": step.to_value(),
            "url": url,
            "overflowed": overflowed,
            "redirect": redirect,
            "finished": step.is_done(),
            "form": form,
            "review": review,
            "session": session,
        }))
    }))
}

/// Stores a step submission and navigates.
///
/// Moving forward from an invalid page is refused and nothing is stored.
pub fn post_step(config_json: &str, session_json: &str, post_json: &str) -> String {
    respond(load_wizard(config_json).and_then(|wizard| {
        let post = parse_post(post_json)?;
        let forms = wizard.forms(&Value::Object(post.data().clone()));
        let mut session = parse_session(session_json);

        let pk = post.form_pk().ok_or(WizardError::MissingFormPk)?;
        let form = forms
            .iter()
            .find(|form| form.pk == pk)
            .ok_or(ComponentError::UnknownForm(pk))?;
        let valid = form.is_valid();
        let errors = form_errors(form)?;

        if !valid && post.goto_step() != Some(GotoStep::Back) {
            debug!(pk, "refusing to leave an invalid page");
            let current = Steps::new(&forms, &mut session, &wizard.urls)?.current();
            return Ok(json!({
                "status": "error",
                "step": current.to_value(),
                "finished": false,
                "valid": false,
                "errors": errors,
                "session": session,
            }));
        }

        Storage::new(&mut session).set_form_data(&post)?;
        let (step, url, finished) = {
            let mut steps = Steps::new(&forms, &mut session, &wizard.urls)?;
            let step = steps.set_from_post(&post);
            (step, steps.url(step)?, steps.finished(step, &post))
        };

        let review = if finished {
            let review = Storage::new(&mut session).cleaned_form_data(&forms);
            Some(serde_json::to_value(review).map_err(ComponentError::JsonEncode)?)
        } else {
            None
        };

        Ok(json!({
            "status": if finished { "complete" } else { "need_input" },
            "step": step.to_value(),
            "url": url,
            "finished": finished,
            "valid": valid,
            "errors": errors,
            "review": review,
            "session": session,
        }))
    }))
}

/// Human-readable review of every answer stored in the session.
pub fn review(config_json: &str, session_json: &str) -> String {
    respond(load_wizard(config_json).and_then(|wizard| {
        let forms = wizard.forms(&Value::Null);
        let mut session = parse_session(session_json);
        let review = Storage::new(&mut session).cleaned_form_data(&forms);
        Ok(json!({
            "answers": serde_json::to_value(&review).map_err(ComponentError::JsonEncode)?,
            "skipped": review.skipped(),
        }))
    }))
}
