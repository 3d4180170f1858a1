use crate::models::{ContractType, Posting};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Aggregate figures over an enriched dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct DatasetSummary {
    pub total_jobs: usize,
    pub zones: usize,
    pub companies: usize,
    pub sources: usize,
    pub permanent: usize,
    pub temporal: usize,
    pub avg_salary: Option<f64>,
    pub by_zone: Vec<LabelCount>,
    pub by_contract: Vec<LabelCount>,
    pub by_source: Vec<LabelCount>,
}

impl DatasetSummary {
    pub fn from_postings(postings: &[Posting]) -> Self {
        let mut zones = BTreeMap::<String, usize>::new();
        let mut contracts = BTreeMap::<String, usize>::new();
        let mut sources = BTreeMap::<String, usize>::new();
        let mut companies = HashSet::new();
        let mut salary_total = 0.0;
        let mut salary_count = 0usize;

        for posting in postings {
            *zones.entry(posting.zone.label().to_string()).or_default() += 1;
            *contracts
                .entry(posting.contract_type.label().to_string())
                .or_default() += 1;
            if !posting.source.is_empty() {
                *sources.entry(posting.source.clone()).or_default() += 1;
            }
            companies.insert(posting.company.as_str());

            if let Some(bounds) = posting.salary {
                salary_total += bounds.midpoint();
                salary_count += 1;
            }
        }

        let count_of = |kind: ContractType| {
            postings
                .iter()
                .filter(|posting| posting.contract_type == kind)
                .count()
        };

        Self {
            total_jobs: postings.len(),
            zones: zones.len(),
            companies: companies.len(),
            sources: sources.len(),
            permanent: count_of(ContractType::Permanent),
            temporal: count_of(ContractType::Temporal),
            avg_salary: (salary_count > 0).then(|| salary_total / salary_count as f64),
            by_zone: ranked(zones),
            by_contract: ranked(contracts),
            by_source: ranked(sources),
        }
    }
}

// Count descending, then label ascending.
fn ranked(counts: BTreeMap<String, usize>) -> Vec<LabelCount> {
    let mut ranked: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect();
    ranked.sort_by(|left, right| right.count.cmp(&left.count).then_with(|| left.label.cmp(&right.label)));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawPosting;
    use crate::pipeline::EnrichmentPipeline;

    #[test]
    fn empty_dataset_has_zero_summary() {
        let summary = DatasetSummary::from_postings(&[]);
        assert_eq!(summary, DatasetSummary::default());
        assert_eq!(summary.avg_salary, None);
    }

    #[test]
    fn summary_counts_and_ranks_labels() -> Result<(), Box<dyn std::error::Error>> {
        let pipeline = EnrichmentPipeline::with_defaults()?;
        let report = pipeline.run(vec![
            RawPosting::new("Cajero", "Banco X", "Apartadó")
                .with_salary("$1.500.000")
                .with_description("tiempo completo")
                .with_source("elempleo.com"),
            RawPosting::new("Asesor", "Banco X", "Apartadó")
                .with_salary("$2.000.000 a $3.000.000")
                .with_source("elempleo.com"),
            RawPosting::new("Aprendiz SENA", "Finca", "Turbo").with_source("computrabajo"),
        ]);

        let summary = DatasetSummary::from_postings(&report.postings);
        assert_eq!(summary.total_jobs, 3);
        assert_eq!(summary.zones, 2);
        assert_eq!(summary.companies, 2);
        assert_eq!(summary.sources, 2);
        assert_eq!(summary.permanent, 1);
        assert_eq!(summary.temporal, 1);
        assert_eq!(summary.avg_salary, Some(2_000_000.0));
        assert_eq!(
            summary.by_zone[0],
            LabelCount {
                label: "Apartadó".to_string(),
                count: 2
            }
        );
        assert_eq!(summary.by_source[1].label, "computrabajo");
        Ok(())
    }
}
