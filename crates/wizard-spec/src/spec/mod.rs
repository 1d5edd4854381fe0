pub mod page;
pub mod question;

pub use page::{DEFAULT_SITE_ID, PageSpec, SiteId};
pub use question::{ChoiceOption, ChoiceSpec, Constraint, QuestionSpec, QuestionType};
