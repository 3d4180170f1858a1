use crate::benefits::BenefitsExtractor;
use crate::contract::ContractClassifier;
use crate::dedup::{deduplicate, DedupKey};
use crate::error::PipelineError;
use crate::lexicon::Lexicon;
use crate::models::{Posting, RawPosting, DEFAULT_CURRENCY};
use crate::relevance::{RelevanceAssessment, RelevanceScorer, RelevanceThresholds};
use crate::salary::{PlausibleBand, SalaryParser};
use crate::zone::ZoneCategorizer;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub salary_band: PlausibleBand,
    pub currency: String,
    pub relevance: RelevanceThresholds,
    /// Enrich records on the rayon pool. Output order is the same either way.
    pub parallel: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            salary_band: PlausibleBand::default(),
            currency: DEFAULT_CURRENCY.to_string(),
            relevance: RelevanceThresholds::default(),
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub input_count: usize,
    pub duplicates_dropped: usize,
    pub postings: Vec<Posting>,
}

/// One enriched posting together with the relevance rule trace that scored it.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentExplanation {
    pub posting: Posting,
    pub relevance: RelevanceAssessment,
}

#[derive(Debug, Clone)]
pub struct EnrichmentPipeline {
    salary: SalaryParser,
    zones: ZoneCategorizer,
    contracts: ContractClassifier,
    benefits: BenefitsExtractor,
    relevance: RelevanceScorer,
    currency: String,
    parallel: bool,
}

impl EnrichmentPipeline {
    pub fn new(lexicon: Lexicon, options: PipelineOptions) -> Result<Self, PipelineError> {
        lexicon.validate()?;
        if options.currency.trim().is_empty() {
            return Err(PipelineError::InvalidOptions(
                "currency tag is empty".to_string(),
            ));
        }

        let Lexicon {
            zones,
            contracts,
            benefits,
            relevance,
        } = lexicon;

        Ok(Self {
            salary: SalaryParser::new(options.salary_band)?,
            zones: ZoneCategorizer::new(zones),
            contracts: ContractClassifier::new(contracts),
            benefits: BenefitsExtractor::new(benefits),
            relevance: RelevanceScorer::new(relevance, options.relevance),
            currency: options.currency,
            parallel: options.parallel,
        })
    }

    pub fn with_defaults() -> Result<Self, PipelineError> {
        Self::new(Lexicon::uraba(), PipelineOptions::default())
    }

    pub fn enrich(&self, raw: RawPosting) -> Posting {
        self.enrich_explained(raw, Utc::now()).posting
    }

    pub fn explain(&self, raw: RawPosting) -> EnrichmentExplanation {
        self.enrich_explained(raw, Utc::now())
    }

    /// Enriches every record, then drops duplicates once the whole batch is done.
    pub fn run(&self, raw: Vec<RawPosting>) -> PipelineReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let input_count = raw.len();
        info!(%run_id, input_count, parallel = self.parallel, "starting enrichment pipeline");

        let enriched: Vec<Posting> = if self.parallel {
            raw.into_par_iter()
                .map(|record| self.enrich_explained(record, started_at).posting)
                .collect()
        } else {
            raw.into_iter()
                .map(|record| self.enrich_explained(record, started_at).posting)
                .collect()
        };

        let (postings, duplicates_dropped) = deduplicate(enriched);
        let finished_at = Utc::now();
        info!(
            %run_id,
            output_count = postings.len(),
            duplicates_dropped,
            "enrichment pipeline complete"
        );

        PipelineReport {
            run_id,
            started_at,
            finished_at,
            input_count,
            duplicates_dropped,
            postings,
        }
    }

    // Salary, zone, contract and benefits read only the raw record; relevance
    // also needs the zone computed before it.
    fn enrich_explained(&self, raw: RawPosting, captured_at: DateTime<Utc>) -> EnrichmentExplanation {
        let salary = self.salary.parse(&raw.salary_raw);
        let zone = self.zones.categorize(&raw);
        let contract_type = self.contracts.classify(&raw);
        let benefits = self.benefits.extract(&raw);
        let relevance = self.relevance.score(&raw, &zone);

        debug!(
            title = %raw.title,
            zone = %zone,
            contract = %contract_type,
            benefits = benefits.len(),
            relevance = relevance.score,
            "posting enriched"
        );

        let posting = Posting {
            posting_id: DedupKey::of_raw(&raw).fingerprint(),
            title: raw.title,
            company: raw.company,
            location: raw.location,
            zone,
            salary_raw: raw.salary_raw,
            salary,
            salary_currency: self.currency.clone(),
            contract_type,
            benefits,
            description: raw.description,
            url: raw.url,
            source: raw.source,
            date_posted: raw.date_posted,
            relevance_score: relevance.score,
            scraped_at: captured_at,
        };

        EnrichmentExplanation { posting, relevance }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContractType, Zone};

    fn pipeline() -> EnrichmentPipeline {
        EnrichmentPipeline::with_defaults().expect("builtin lexicon is valid")
    }

    fn sequential() -> EnrichmentPipeline {
        let options = PipelineOptions {
            parallel: false,
            ..PipelineOptions::default()
        };
        EnrichmentPipeline::new(Lexicon::uraba(), options).expect("builtin lexicon is valid")
    }

    #[test]
    fn cashier_in_apartado_is_fully_enriched() {
        let raw = RawPosting::new("Cajero", "Banco X", "Apartadó, Antioquia")
            .with_salary("$1.423.500")
            .with_description("tiempo completo");

        let posting = pipeline().enrich(raw);
        assert_eq!(posting.zone, Zone::Municipality("Apartadó".to_string()));
        assert_eq!(posting.contract_type, ContractType::Permanent);
        assert!(!posting.is_temporal());
        assert_eq!(posting.salary_min(), Some(1_423_500.0));
        assert_eq!(posting.salary_max(), Some(1_423_500.0));
        assert_eq!(posting.salary_currency, "COP");
        assert!(posting.relevance_score >= 0.9);
        assert_eq!(posting.posting_id.len(), 64);
    }

    #[test]
    fn unparsable_fields_degrade_to_defaults() {
        let raw = RawPosting::new("Vendedor", "Tienda", "Sede principal").with_salary("a convenir");
        let posting = pipeline().enrich(raw);
        assert_eq!(posting.salary, None);
        assert_eq!(posting.zone, Zone::Unspecified);
        assert_eq!(posting.contract_type, ContractType::Unspecified);
        assert!(posting.benefits.is_empty());
        assert_eq!(posting.relevance_score, 0.3);
    }

    #[test]
    fn preset_contract_survives_and_the_rest_still_runs() {
        let raw = RawPosting::new("Psicólogo(a)", "Institución Universitaria", "Apartadó, Antioquia")
            .with_salary("$1.590.584")
            .with_description("Contrato fijo")
            .with_contract_type("temporal");

        let posting = pipeline().enrich(raw);
        assert_eq!(posting.contract_type, ContractType::Temporal);
        assert!(posting.is_temporal());
        assert_eq!(posting.salary_min(), Some(1_590_584.0));
        assert_eq!(posting.zone, Zone::Municipality("Apartadó".to_string()));
    }

    #[test]
    fn batch_run_deduplicates_after_enrichment() {
        let batch = vec![
            RawPosting::new("Cajero", "Banco X", "Turbo").with_source("elempleo.com"),
            RawPosting::new("Auxiliar", "Finca", "Carepa").with_source("computrabajo"),
            RawPosting::new(" cajero", "BANCO X", "turbo ")
                .with_source("indeed")
                .with_salary("$2.000.000"),
        ];

        let report = pipeline().run(batch);
        assert_eq!(report.input_count, 3);
        assert_eq!(report.duplicates_dropped, 1);
        let sources: Vec<&str> = report.postings.iter().map(|item| item.source.as_str()).collect();
        assert_eq!(sources, vec!["elempleo.com", "computrabajo"]);
        assert_eq!(report.postings[0].salary, None);
        assert!(report.finished_at >= report.started_at);
    }

    #[test]
    fn parallel_and_sequential_runs_agree() {
        let batch: Vec<RawPosting> = (0..64)
            .map(|index| {
                RawPosting::new(format!("Cargo {index}"), "Empresa", "Chigorodó")
                    .with_salary((1_000 + index * 50).to_string())
            })
            .collect();

        let parallel = pipeline().run(batch.clone());
        let serial = sequential().run(batch);
        let titles = |report: &PipelineReport| {
            report
                .postings
                .iter()
                .map(|item| (item.title.clone(), item.salary_min()))
                .collect::<Vec<_>>()
        };
        assert_eq!(titles(&parallel), titles(&serial));
        assert_eq!(parallel.postings[0].title, "Cargo 0");
    }

    #[test]
    fn empty_input_yields_empty_report() {
        let report = pipeline().run(Vec::new());
        assert_eq!(report.input_count, 0);
        assert!(report.postings.is_empty());
    }

    #[test]
    fn explanation_carries_the_rule_trace() {
        let raw = RawPosting::new("Operario", "Finca", "Zona bananera de Urabá");
        let explanation = pipeline().explain(raw);
        assert_eq!(explanation.posting.zone, Zone::RegionGeneral);
        assert_eq!(explanation.relevance.trace.len(), 5);
        assert_eq!(explanation.posting.relevance_score, 1.0);
    }

    #[test]
    fn invalid_lexicon_is_rejected_at_construction() {
        let mut lexicon = Lexicon::uraba();
        lexicon.zones.municipalities[0].variants.clear();
        assert!(matches!(
            EnrichmentPipeline::new(lexicon, PipelineOptions::default()),
            Err(PipelineError::InvalidLexicon(_))
        ));
    }
}
