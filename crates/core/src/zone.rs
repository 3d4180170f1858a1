use crate::lexicon::ZoneTable;
use crate::models::{RawPosting, Zone};
use crate::text::{contains_any, fold_fields};

#[derive(Debug, Clone)]
pub struct ZoneCategorizer {
    table: ZoneTable,
}

impl ZoneCategorizer {
    pub fn new(table: ZoneTable) -> Self {
        Self { table }
    }

    pub fn categorize(&self, posting: &RawPosting) -> Zone {
        let text = fold_fields(&[&posting.location, &posting.title, &posting.description]);
        self.categorize_text(&text)
    }

    /// Maps already case-folded text to exactly one zone.
    ///
    /// The first municipality in table order wins; then the regional bucket,
    /// the broader region and finally `Zone::Unspecified`.
    pub fn categorize_text(&self, folded: &str) -> Zone {
        if let Some(entry) = self
            .table
            .municipalities
            .iter()
            .find(|entry| contains_any(folded, &entry.variants))
        {
            return Zone::Municipality(entry.name.clone());
        }

        if contains_any(folded, &self.table.region_keywords) {
            Zone::RegionGeneral
        } else if contains_any(folded, &self.table.broader_region_keywords) {
            Zone::BroaderRegion
        } else {
            Zone::Unspecified
        }
    }
}
