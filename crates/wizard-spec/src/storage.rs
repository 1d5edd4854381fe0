use serde_json::{Map, Value};
use tracing::debug;

use crate::error::WizardError;
use crate::form::Form;
use crate::post::WizardPost;
use crate::review::{Review, format_answers};
use crate::session::{SessionStore, form_key};

/// Reads and writes per-page answer records in the session.
pub struct Storage<'a, S: SessionStore + ?Sized> {
    session: &'a mut S,
}

impl<'a, S: SessionStore + ?Sized> Storage<'a, S> {
    pub fn new(session: &'a mut S) -> Self {
        Self { session }
    }

    /// One record per form, in form order; empty when nothing was stored.
    pub fn form_data(&self, forms: &[Form]) -> Vec<Map<String, Value>> {
        forms.iter().map(|form| self.data_from_pk(form.pk)).collect()
    }

    pub fn data_from_pk(&self, pk: u64) -> Map<String, Value> {
        match self.session.get(&form_key(pk)) {
            Some(Value::Object(record)) => record,
            _ => Map::new(),
        }
    }

    /// Stored record of the posted page updated with the posted keys.
    pub fn post_data(&self, post: &WizardPost) -> Result<Map<String, Value>, WizardError> {
        let pk = post.form_pk().ok_or(WizardError::MissingFormPk)?;
        let mut data = self.data_from_pk(pk);
        for (key, value) in post.data() {
            data.insert(key.clone(), value.clone());
        }
        Ok(data)
    }

    pub fn set_form_data(&mut self, post: &WizardPost) -> Result<(), WizardError> {
        let pk = post.form_pk().ok_or(WizardError::MissingFormPk)?;
        let data = self.post_data(post)?;
        debug!(pk, keys = data.len(), "storing page answers");
        self.session.set(&form_key(pk), Value::Object(data));
        Ok(())
    }

    /// Review of every stored answer against the current forms.
    pub fn cleaned_form_data(&self, forms: &[Form]) -> Review {
        format_answers(&self.form_data(forms), forms)
    }
}
