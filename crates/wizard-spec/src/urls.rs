use handlebars::Handlebars;
use serde_json::json;
use tracing::warn;

use crate::error::WizardError;
use crate::steps::Step;

pub const DEFAULT_STEP_URL: &str = "/wizard/step/{{step}}/";

const TEMPLATE_NAME: &str = "step_url";

/// Builds navigable references for step values.
#[derive(Debug, Clone)]
pub struct StepUrls {
    registry: Handlebars<'static>,
}

impl StepUrls {
    pub fn new(template: &str) -> Result<Self, WizardError> {
        Ok(Self {
            registry: build_registry(template)?,
        })
    }

    pub fn url(&self, step: Step) -> Result<String, WizardError> {
        let data = json!({ "step": step.to_value() });
        Ok(self.registry.render(TEMPLATE_NAME, &data)?)
    }
}

impl Default for StepUrls {
    fn default() -> Self {
        match build_registry(DEFAULT_STEP_URL) {
            Ok(registry) => Self { registry },
            Err(error) => {
                warn!(%error, "default step url template rejected");
                Self {
                    registry: Handlebars::new(),
                }
            }
        }
    }
}

fn build_registry(template: &str) -> Result<Handlebars<'static>, WizardError> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_escape_fn(handlebars::no_escape);
    registry.register_template_string(TEMPLATE_NAME, template)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_index_and_done() {
        let urls = StepUrls::default();
        assert_eq!(urls.url(Step::Index(3)).unwrap(), "/wizard/step/3/");
        assert_eq!(urls.url(Step::Done).unwrap(), "/wizard/step/done/");
    }

    #[test]
    fn custom_template_is_not_html_escaped() {
        let urls = StepUrls::new("/reports/new/{{step}}/?site=1&lang=en").unwrap();
        assert_eq!(
            urls.url(Step::Index(0)).unwrap(),
            "/reports/new/0/?site=1&lang=en"
        );
    }

    #[test]
    fn default_matches_explicit_default_template() {
        let explicit = StepUrls::new(DEFAULT_STEP_URL).unwrap();
        let default = StepUrls::default();
        for step in [Step::Index(0), Step::Index(4), Step::Done] {
            assert_eq!(default.url(step).unwrap(), explicit.url(step).unwrap());
        }
    }

    #[test]
    fn unknown_template_variable_fails_to_render() {
        let urls = StepUrls::new("/wizard/{{page}}/").unwrap();
        assert!(matches!(
            urls.url(Step::Index(1)),
            Err(WizardError::Render(_))
        ));
    }

    #[test]
    fn invalid_template_is_rejected() {
        assert!(matches!(
            StepUrls::new("/wizard/{{#if}}"),
            Err(WizardError::Template(_))
        ));
    }
}
