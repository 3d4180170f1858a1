use crate::lexicon::ContractKeywords;
use crate::models::{ContractType, RawPosting};
use crate::text::{contains_any, fold_fields};

#[derive(Debug, Clone)]
pub struct ContractClassifier {
    keywords: ContractKeywords,
}

impl ContractClassifier {
    pub fn new(keywords: ContractKeywords) -> Self {
        Self { keywords }
    }

    /// A recognized category set upstream wins; otherwise the text decides.
    pub fn classify(&self, posting: &RawPosting) -> ContractType {
        if let Some(preset) = posting
            .contract_type
            .as_deref()
            .and_then(ContractType::from_preset)
        {
            return preset;
        }

        let text = fold_fields(&[&posting.title, &posting.description, &posting.salary_raw]);
        self.classify_text(&text)
    }

    /// Short-term keywords are checked first and win over permanent ones.
    pub fn classify_text(&self, folded: &str) -> ContractType {
        if contains_any(folded, &self.keywords.short_term) {
            ContractType::Temporal
        } else if contains_any(folded, &self.keywords.permanent) {
            ContractType::Permanent
        } else {
            ContractType::Unspecified
        }
    }
}
