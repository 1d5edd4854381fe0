#![allow(missing_docs)]

pub mod error;
pub mod field;
pub mod form;
pub mod manager;
pub mod post;
pub mod review;
pub mod session;
pub mod source;
pub mod spec;
pub mod steps;
pub mod storage;
pub mod urls;
pub mod validate;

pub use error::{LookupError, WizardError};
pub use field::{Field, FieldChoice, FieldKind};
pub use form::{Form, FormFactory};
pub use manager::FormManager;
pub use post::{GotoStep, WizardPost};
pub use review::{Review, ReviewEntry, format_answers};
pub use session::{CURRENT_STEP_KEY, SessionStore, form_key};
pub use source::{SchemaSource, StaticSchemaSource};
pub use spec::{
    ChoiceOption, ChoiceSpec, Constraint, DEFAULT_SITE_ID, PageSpec, QuestionSpec, QuestionType,
    SiteId,
};
pub use steps::{Step, Steps};
pub use storage::Storage;
pub use urls::{DEFAULT_STEP_URL, StepUrls};
pub use validate::{FieldError, ValidationResult, validate_page};
