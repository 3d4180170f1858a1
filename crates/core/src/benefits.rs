use crate::lexicon::BenefitTable;
use crate::models::RawPosting;
use crate::text::{contains_any, fold_fields};
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct BenefitsExtractor {
    table: BenefitTable,
}

impl BenefitsExtractor {
    pub fn new(table: BenefitTable) -> Self {
        Self { table }
    }

    pub fn extract(&self, posting: &RawPosting) -> BTreeSet<String> {
        let text = fold_fields(&[&posting.description, &posting.salary_raw]);
        self.extract_text(&text)
    }

    pub fn extract_text(&self, folded: &str) -> BTreeSet<String> {
        self.table
            .benefits
            .iter()
            .filter(|entry| contains_any(folded, &entry.keywords))
            .map(|entry| entry.tag.clone())
            .collect()
    }
}
