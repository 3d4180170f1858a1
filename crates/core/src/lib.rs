pub mod benefits;
pub mod contract;
pub mod dataset;
pub mod dedup;
pub mod error;
pub mod lexicon;
pub mod models;
pub mod pipeline;
pub mod relevance;
pub mod salary;
pub mod summary;
pub mod text;
pub mod zone;

pub use benefits::BenefitsExtractor;
pub use contract::ContractClassifier;
pub use dataset::{
    discover_json_files, load_raw_postings_best_effort, read_postings, read_raw_postings,
    write_postings, IngestionReport, SkippedFile, SkippedRecord,
};
pub use dedup::{deduplicate, DedupKey};
pub use error::{DatasetError, PipelineError};
pub use lexicon::{
    BenefitEntry, BenefitTable, ContractKeywords, Lexicon, MunicipalityEntry, RelevanceKeywords,
    ZoneTable,
};
pub use models::{
    ContractType, Posting, PostingRecord, RawPosting, SalaryBounds, Zone, DEFAULT_CURRENCY,
};
pub use pipeline::{EnrichmentExplanation, EnrichmentPipeline, PipelineOptions, PipelineReport};
pub use relevance::{
    RelevanceAssessment, RelevanceRule, RelevanceScorer, RelevanceSignals, RelevanceThresholds,
    RuleOutcome, RULE_ORDER,
};
pub use salary::{PlausibleBand, SalaryParser};
pub use summary::{DatasetSummary, LabelCount};
pub use zone::ZoneCategorizer;
