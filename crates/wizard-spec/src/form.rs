use serde_json::{Map, Value};

use crate::field::Field;
use crate::spec::page::PageSpec;
use crate::spec::question::QuestionSpec;
use crate::validate::FieldError;

/// Field set computed for one page; binds answer payloads into [`Form`]s.
#[derive(Debug, Clone)]
pub struct FormFactory {
    page: PageSpec,
    fields: Vec<Field>,
}

impl FormFactory {
    pub fn for_page(page: &PageSpec) -> Self {
        let fields = page.questions.iter().map(Field::from_question).collect();
        Self {
            page: page.clone(),
            fields,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Binds the answers without validating them; call [`Form::full_clean`].
    pub fn bind(&self, answers: &Value) -> Form {
        Form {
            pk: self.page.pk,
            manager_index: 0,
            page: self.page.clone(),
            fields: self.fields.clone(),
            data: answers.as_object().cloned().unwrap_or_default(),
            errors: Vec::new(),
            cleaned_data: Map::new(),
            cleaned: false,
        }
    }
}

/// One page bound to an answer payload.
#[derive(Debug, Clone)]
pub struct Form {
    /// Primary key of the page, used to key stored answers.
    pub pk: u64,
    /// Position of the form in the wizard's form list.
    pub manager_index: usize,
    page: PageSpec,
    fields: Vec<Field>,
    data: Map<String, Value>,
    errors: Vec<FieldError>,
    cleaned_data: Map<String, Value>,
    cleaned: bool,
}

impl Form {
    pub fn with_manager_index(mut self, manager_index: usize) -> Self {
        self.manager_index = manager_index;
        self
    }

    /// Validates every field, collecting errors instead of stopping at the first.
    pub fn full_clean(&mut self) {
        self.errors.clear();
        self.cleaned_data.clear();
        for field in &self.fields {
            match field.clean(self.data.get(&field.name)) {
                Ok(value) => {
                    self.cleaned_data.insert(field.name.clone(), value);
                }
                Err(error) => self.errors.push(error),
            }
        }
        self.cleaned = true;
    }

    /// True once cleaned without errors.
    pub fn is_valid(&self) -> bool {
        self.cleaned && self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn field_errors<'a>(&'a self, field_id: &'a str) -> impl Iterator<Item = &'a FieldError> {
        self.errors
            .iter()
            .filter(move |error| error.field_id == field_id)
    }

    pub fn cleaned_data(&self) -> &Map<String, Value> {
        &self.cleaned_data
    }

    pub fn serialized(&self) -> &[QuestionSpec] {
        self.page.serialized_questions()
    }
}
