use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::question::QuestionSpec;

/// Identifier of the site a page is published on.
pub type SiteId = u64;

/// Site used when the caller does not select one.
pub const DEFAULT_SITE_ID: SiteId = 1;

/// A single wizard page with its ordered questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PageSpec {
    pub pk: u64,
    #[serde(default)]
    pub position: u32,
    #[serde(default = "default_sites")]
    pub sites: Vec<SiteId>,
    #[serde(default)]
    pub questions: Vec<QuestionSpec>,
}

fn default_sites() -> Vec<SiteId> {
    vec![DEFAULT_SITE_ID]
}

impl PageSpec {
    pub fn is_on_site(&self, site_id: SiteId) -> bool {
        self.sites.contains(&site_id)
    }

    /// Plain-data question list used for lookups and re-construction.
    pub fn serialized_questions(&self) -> &[QuestionSpec] {
        &self.questions
    }

    pub fn upgrade_legacy(&mut self) {
        for question in &mut self.questions {
            question.upgrade_legacy();
        }
    }
}
