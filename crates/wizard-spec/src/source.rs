use std::fs;
use std::path::Path;

use crate::error::WizardError;
use crate::spec::page::{PageSpec, SiteId};

/// Supplies the ordered page list for a site.
pub trait SchemaSource {
    /// Pages published on `site_id`, ordered by position.
    fn wizard_set(&self, site_id: SiteId) -> Vec<PageSpec>;
}

/// Page definitions held in memory, typically loaded from a JSON document.
#[derive(Debug, Clone, Default)]
pub struct StaticSchemaSource {
    pages: Vec<PageSpec>,
}

impl StaticSchemaSource {
    pub fn new(mut pages: Vec<PageSpec>) -> Self {
        for page in &mut pages {
            page.upgrade_legacy();
        }
        Self { pages }
    }

    /// Parses a JSON array of pages.
    pub fn from_json(json: &str) -> Result<Self, WizardError> {
        let pages: Vec<PageSpec> = serde_json::from_str(json)?;
        Ok(Self::new(pages))
    }

    pub fn from_path(path: &Path) -> Result<Self, WizardError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn on_site(&self, site_id: SiteId) -> impl Iterator<Item = &PageSpec> {
        self.pages.iter().filter(move |page| page.is_on_site(site_id))
    }
}

impl SchemaSource for StaticSchemaSource {
    fn wizard_set(&self, site_id: SiteId) -> Vec<PageSpec> {
        let mut pages: Vec<PageSpec> = self.on_site(site_id).cloned().collect();
        pages.sort_by_key(|page| page.position);
        pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGES: &str = r#"[
        { "pk": 10, "position": 2, "sites": [1], "questions": [] },
        { "pk": 11, "position": 0, "sites": [1, 2], "questions": [] },
        { "pk": 12, "position": 1, "sites": [2], "questions": [] },
        { "pk": 13, "position": 1, "questions": [] }
    ]"#;

    #[test]
    fn wizard_set_filters_site_and_orders_by_position() {
        let source = StaticSchemaSource::from_json(PAGES).expect("pages");
        let pks: Vec<u64> = source.wizard_set(1).iter().map(|page| page.pk).collect();
        assert_eq!(pks, vec![11, 13, 10]);
        let pks: Vec<u64> = source.wizard_set(2).iter().map(|page| page.pk).collect();
        assert_eq!(pks, vec![11, 12]);
    }

    #[test]
    fn equal_positions_keep_document_order() {
        let source = StaticSchemaSource::from_json(
            r#"[
                { "pk": 5, "position": 1, "questions": [] },
                { "pk": 6, "position": 1, "questions": [] },
                { "pk": 7, "position": 0, "questions": [] }
            ]"#,
        )
        .expect("pages");
        let pks: Vec<u64> = source.wizard_set(1).iter().map(|page| page.pk).collect();
        assert_eq!(pks, vec![7, 5, 6]);
    }

    #[test]
    fn unknown_site_yields_no_pages() {
        let source = StaticSchemaSource::from_json(PAGES).expect("pages");
        assert!(source.wizard_set(99).is_empty());
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(matches!(
            StaticSchemaSource::from_json(r#"{"pk": 1}"#),
            Err(WizardError::Schema(_))
        ));
    }
}
