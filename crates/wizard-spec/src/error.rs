use thiserror::Error;

/// Errors surfaced by the wizard runtime.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("wizard has no pages")]
    EmptyWizard,
    #[error("posted data is missing form_pk")]
    MissingFormPk,
    #[error("invalid step url template: {0}")]
    Template(#[from] handlebars::TemplateError),
    #[error("failed to render step url: {0}")]
    Render(#[from] handlebars::RenderError),
    #[error("invalid page schema: {0}")]
    Schema(#[from] serde_json::Error),
    #[error("failed to read page schema: {0}")]
    Io(#[from] std::io::Error),
}

/// Stored answers that no longer resolve against the live schema.
///
/// These happen when pages are edited after a user answered them; the review
/// formatter logs and skips the affected entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("field_id={field_id} not found in {available:?}")]
    Question {
        field_id: String,
        available: Vec<String>,
    },
    #[error("choices(pk={pk}) not found in {available:?} for {field_id}")]
    Choice {
        pk: String,
        field_id: String,
        available: Vec<i64>,
    },
    #[error("extra_options={raw} is not an option index of choice {choice_pk}")]
    Option { raw: String, choice_pk: i64 },
}
