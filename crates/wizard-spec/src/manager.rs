use serde_json::Value;

use crate::form::{Form, FormFactory};
use crate::source::SchemaSource;
use crate::spec::page::{PageSpec, SiteId};
use crate::spec::question::QuestionSpec;

/// Materializes the wizard's form list from page definitions.
pub struct FormManager;

impl FormManager {
    /// Builds and validates one form per page, in page order.
    pub fn build_forms(pages: &[PageSpec], answers: &Value) -> Vec<Form> {
        pages
            .iter()
            .enumerate()
            .map(|(index, page)| {
                let mut form = FormFactory::for_page(page)
                    .bind(answers)
                    .with_manager_index(index);
                form.full_clean();
                form
            })
            .collect()
    }

    /// Same as [`FormManager::build_forms`] with the site's pages.
    pub fn forms_for_site(
        source: &dyn SchemaSource,
        site_id: SiteId,
        answers: &Value,
    ) -> Vec<Form> {
        Self::build_forms(&source.wizard_set(site_id), answers)
    }

    pub fn serialized_forms(source: &dyn SchemaSource, site_id: SiteId) -> Vec<Vec<QuestionSpec>> {
        Self::forms_for_site(source, site_id, &Value::Null)
            .iter()
            .map(|form| form.serialized().to_vec())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSchemaSource;
    use serde_json::json;

    fn source() -> StaticSchemaSource {
        StaticSchemaSource::from_json(
            r#"[
                { "pk": 21, "position": 1, "questions": [
                    { "field_id": "question_2", "question_text": "Age?", "type": "singlelinetext" }
                ] },
                { "pk": 20, "position": 0, "questions": [
                    { "field_id": "question_1", "question_text": "Name?", "type": "singlelinetext", "required": true }
                ] },
                { "pk": 22, "position": 2, "sites": [3], "questions": [] }
            ]"#,
        )
        .expect("pages")
    }

    #[test]
    fn forms_follow_page_order_with_manager_index() {
        let forms = FormManager::forms_for_site(&source(), 1, &json!({}));
        let pks: Vec<u64> = forms.iter().map(|form| form.pk).collect();
        assert_eq!(pks, vec![20, 21]);
        for (position, form) in forms.iter().enumerate() {
            assert_eq!(form.manager_index, position);
        }
    }

    #[test]
    fn every_form_is_validated_eagerly() {
        let forms = FormManager::forms_for_site(&source(), 1, &json!({}));
        assert!(!forms[0].is_valid());
        assert!(forms[1].is_valid());
    }

    #[test]
    fn serialized_forms_expose_question_lists() {
        let serialized = FormManager::serialized_forms(&source(), 1);
        assert_eq!(serialized.len(), 2);
        assert_eq!(serialized[0][0].field_id, "question_1");
    }
}
