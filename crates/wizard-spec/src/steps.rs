use std::fmt;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::WizardError;
use crate::form::Form;
use crate::post::{GotoStep, WizardPost};
use crate::session::{CURRENT_STEP_KEY, SessionStore};
use crate::urls::StepUrls;

/// Position of the user in the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Index(usize),
    /// Terminal state reached after the last page.
    Done,
}

impl Step {
    pub const DONE_NAME: &'static str = "done";

    /// Coerces a stored or posted value; negative or unparsable input reads as the first step.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(text) => Self::parse(text),
            Value::Number(number) => match number.as_u64() {
                Some(index) => Step::Index(index as usize),
                None => {
                    warn!(step = %number, "step is not a non-negative integer");
                    Step::Index(0)
                }
            },
            other => {
                warn!(step = %other, "step has an unexpected shape");
                Step::Index(0)
            }
        }
    }

    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw == Self::DONE_NAME {
            return Step::Done;
        }
        match raw.parse::<usize>() {
            Ok(index) => Step::Index(index),
            Err(_) => {
                warn!(step = raw, "step is not a non-negative integer");
                Step::Index(0)
            }
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Step::Index(index) => Value::from(*index),
            Step::Done => Value::String(Self::DONE_NAME.into()),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Step::Done)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Index(index) => write!(f, "{index}"),
            Step::Done => f.write_str(Self::DONE_NAME),
        }
    }
}

/// Step navigation over a form list, persisted in the session.
pub struct Steps<'a, S: SessionStore + ?Sized> {
    forms: &'a [Form],
    session: &'a mut S,
    urls: &'a StepUrls,
}

impl<'a, S: SessionStore + ?Sized> Steps<'a, S> {
    pub fn new(
        forms: &'a [Form],
        session: &'a mut S,
        urls: &'a StepUrls,
    ) -> Result<Self, WizardError> {
        if forms.is_empty() {
            return Err(WizardError::EmptyWizard);
        }
        Ok(Self {
            forms,
            session,
            urls,
        })
    }

    pub fn step_count(&self) -> usize {
        self.forms.len()
    }

    pub fn first(&self) -> usize {
        0
    }

    pub fn last(&self) -> usize {
        self.forms
            .last()
            .map(|form| form.manager_index)
            .unwrap_or_default()
    }

    /// Stored step before overflow clamping.
    pub fn raw_current(&self) -> Step {
        self.session
            .get(CURRENT_STEP_KEY)
            .map(|value| Step::from_value(&value))
            .unwrap_or(Step::Index(self.first()))
    }

    pub fn current(&self) -> Step {
        self.clamp(self.raw_current())
    }

    pub fn current_form(&self) -> Option<&'a Form> {
        match self.current() {
            Step::Index(index) => self.forms.get(index),
            Step::Done => None,
        }
    }

    pub fn next(&self) -> Option<Step> {
        self.adjust(1)
    }

    pub fn prev(&self) -> Option<Step> {
        self.adjust(-1)
    }

    pub fn next_is_done(&self) -> bool {
        self.next() == Some(Step::Done)
    }

    pub fn current_is_done(&self) -> bool {
        self.current().is_done()
    }

    /// Step `delta` away from the current one, `None` when that leaves the wizard.
    pub fn adjust(&self, delta: isize) -> Option<Step> {
        let current = match self.current() {
            Step::Index(index) => index,
            Step::Done => self.step_count(),
        };
        let key = current.checked_add_signed(delta)?;
        if key == self.first() {
            Some(Step::Index(self.first()))
        } else if key < self.step_count() {
            Some(Step::Index(self.forms[key].manager_index))
        } else if key == self.step_count() {
            Some(Step::Done)
        } else {
            None
        }
    }

    pub fn overflowed(&self, step: Step) -> bool {
        match step {
            Step::Index(index) => index > self.last(),
            Step::Done => false,
        }
    }

    pub fn finished(&self, step: Step, post: &WizardPost) -> bool {
        post.goto_step() == Some(GotoStep::Review) || step.is_done()
    }

    /// Persists the step requested by a page view, or the current one.
    pub fn set_from_get(&mut self, step_param: Option<Step>) -> Step {
        let step = self.clamp(step_param.unwrap_or_else(|| self.current()));
        self.persist(step);
        step
    }

    /// Persists the step chosen by a submission.
    ///
    /// `Back`/`Next` move at most one page from the stored step. When that move
    /// would leave the wizard the stored step is kept.
    pub fn set_from_post(&mut self, post: &WizardPost) -> Step {
        let mut step = post.current_step().unwrap_or_else(|| self.current());
        let delta = match post.goto_step() {
            Some(GotoStep::Back) => Some(-1),
            Some(GotoStep::Next) => Some(1),
            Some(GotoStep::Review) | None => None,
        };
        if let Some(delta) = delta {
            match self.adjust(delta) {
                Some(adjusted) => step = adjusted,
                None => {
                    let current = self.current();
                    warn!(%current, delta, "navigation outside the wizard ignored");
                    return self.current();
                }
            }
        }
        let step = self.clamp(step);
        self.persist(step);
        step
    }

    pub fn url(&self, step: Step) -> Result<String, WizardError> {
        self.urls.url(step)
    }

    pub fn current_url(&self) -> Result<String, WizardError> {
        self.url(self.current())
    }

    pub fn last_url(&self) -> Result<String, WizardError> {
        self.url(Step::Index(self.last()))
    }

    pub fn done_url(&self) -> Result<String, WizardError> {
        self.url(Step::Done)
    }

    fn clamp(&self, step: Step) -> Step {
        match step {
            Step::Index(index) if index > self.last() => Step::Index(self.last()),
            other => other,
        }
    }

    fn persist(&mut self, step: Step) {
        debug!(%step, "storing current step");
        self.session.set(CURRENT_STEP_KEY, step.to_value());
    }
}
