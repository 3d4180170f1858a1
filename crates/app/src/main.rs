use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uraba_jobs_core::{
    load_raw_postings_best_effort, read_postings, write_postings, DatasetSummary,
    EnrichmentPipeline, Lexicon, PipelineOptions, PlausibleBand, RawPosting,
};

#[derive(Parser)]
#[command(name = "uraba-jobs", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON lexicon replacing the built-in Urabá keyword tables
    #[arg(long, env = "URABA_LEXICON")]
    lexicon: Option<PathBuf>,

    /// Lowest monthly salary (COP) treated as plausible
    #[arg(long, env = "URABA_MIN_SALARY", default_value_t = 1_000_000.0)]
    min_salary: f64,

    /// Highest monthly salary (COP) treated as plausible
    #[arg(long, env = "URABA_MAX_SALARY", default_value_t = 50_000_000.0)]
    max_salary: f64,

    /// Enrich records on the current thread only
    #[arg(long, default_value_t = false)]
    sequential: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Enrich raw postings and write the deduplicated dataset.
    Enrich {
        /// JSON file, or folder searched recursively for JSON files.
        #[arg(long)]
        input: PathBuf,
        /// Where to write the enriched dataset.
        #[arg(long, default_value = "jobs.json")]
        output: PathBuf,
        /// Number of zones listed in the summary.
        #[arg(long, default_value = "10")]
        top_zones: usize,
    },
    /// Print statistics for an enriched dataset.
    Summary {
        /// Enriched dataset written by `enrich`.
        #[arg(long, default_value = "jobs.json")]
        input: PathBuf,
        /// Number of zones listed in the summary.
        #[arg(long, default_value = "10")]
        top_zones: usize,
    },
    /// Enrich a single posting and explain its relevance score.
    Score {
        #[arg(long)]
        title: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        location: String,
        #[arg(long, default_value = "")]
        salary: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Contract category already known upstream (temporal, permanente).
        #[arg(long)]
        contract_type: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "uraba-jobs boot"
    );

    match cli.command {
        Command::Enrich {
            ref input,
            ref output,
            top_zones,
        } => {
            let pipeline = build_pipeline(&cli)?;
            let ingestion = load_raw_postings_best_effort(input)
                .with_context(|| format!("loading raw postings from {}", input.display()))?;

            if !ingestion.skipped_files.is_empty() {
                warn!(
                    "skipped_files={} for input={}",
                    ingestion.skipped_files.len(),
                    input.display()
                );
                for skipped in &ingestion.skipped_files {
                    warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped file");
                }
            }
            for skipped in &ingestion.skipped_records {
                warn!(
                    path = %skipped.path.display(),
                    index = skipped.index,
                    reason = %skipped.reason,
                    "skipped record"
                );
            }

            if ingestion.postings.is_empty() {
                warn!("no raw postings were loaded; the dataset will be empty");
            }

            let report = pipeline.run(ingestion.postings);
            write_postings(output, &report.postings)
                .with_context(|| format!("writing dataset to {}", output.display()))?;

            println!("run_id: {}", report.run_id);
            println!(
                "{} raw postings -> {} enriched ({} duplicates dropped, {} files and {} records skipped)",
                report.input_count,
                report.postings.len(),
                report.duplicates_dropped,
                ingestion.skipped_files.len(),
                ingestion.skipped_records.len()
            );
            println!("dataset: {}", output.display());
            print_summary(&DatasetSummary::from_postings(&report.postings), top_zones);
        }
        Command::Summary {
            ref input,
            top_zones,
        } => {
            let postings = read_postings(input)
                .with_context(|| format!("reading dataset from {}", input.display()))?;
            print_summary(&DatasetSummary::from_postings(&postings), top_zones);
        }
        Command::Score {
            ref title,
            ref company,
            ref location,
            ref salary,
            ref description,
            ref contract_type,
        } => {
            let pipeline = build_pipeline(&cli)?;
            let mut raw = RawPosting::new(title.as_str(), company.as_str(), location.as_str())
                .with_salary(salary.as_str())
                .with_description(description.as_str());
            raw.contract_type = contract_type.clone();

            let explanation = pipeline.explain(raw);
            let posting = &explanation.posting;

            println!("zone: {}", posting.zone);
            match posting.salary {
                Some(bounds) => println!(
                    "salary: {:.0} - {:.0} {}",
                    bounds.min(),
                    bounds.max(),
                    posting.salary_currency
                ),
                None => println!("salary: none"),
            }
            println!(
                "contract: {} (temporal={})",
                posting.contract_type,
                posting.is_temporal()
            );
            let benefits: Vec<&str> = posting.benefits.iter().map(String::as_str).collect();
            println!("benefits: [{}]", benefits.join(", "));

            let signals = explanation.relevance.signals;
            println!(
                "signals: strong={} medium={} negative={} zone_in_region={}",
                signals.strong_hits,
                signals.medium_hits,
                signals.negative_hits,
                signals.zone_in_region
            );
            for step in &explanation.relevance.trace {
                println!(
                    "explain: rule={} before={:.2} after={:.2}",
                    step.rule, step.before, step.after
                );
            }
            println!("relevance: {:.2}", posting.relevance_score);
        }
    }

    Ok(())
}

fn build_pipeline(cli: &Cli) -> anyhow::Result<EnrichmentPipeline> {
    let lexicon = match &cli.lexicon {
        Some(path) => Lexicon::from_path(path)
            .with_context(|| format!("loading lexicon from {}", path.display()))?,
        None => Lexicon::uraba(),
    };

    let options = PipelineOptions {
        salary_band: PlausibleBand {
            min: cli.min_salary,
            max: cli.max_salary,
        },
        parallel: !cli.sequential,
        ..PipelineOptions::default()
    };

    Ok(EnrichmentPipeline::new(lexicon, options)?)
}

fn print_summary(summary: &DatasetSummary, top_zones: usize) {
    println!("total jobs: {}", summary.total_jobs);
    println!(
        "zones={} companies={} sources={} permanent={} temporal={}",
        summary.zones, summary.companies, summary.sources, summary.permanent, summary.temporal
    );
    match summary.avg_salary {
        Some(average) => println!("average salary: {average:.0} COP"),
        None => println!("average salary: n/a"),
    }

    if !summary.by_zone.is_empty() {
        println!("jobs by zone:");
        for entry in summary.by_zone.iter().take(top_zones) {
            println!("  {:<25} {:>4}", entry.label, entry.count);
        }
    }

    if !summary.by_contract.is_empty() {
        println!("jobs by contract type:");
        for entry in &summary.by_contract {
            println!("  {:<25} {:>4}", entry.label, entry.count);
        }
    }

    if !summary.by_source.is_empty() {
        println!("jobs by source:");
        for entry in &summary.by_source {
            println!("  {:<25} {:>4}", entry.label, entry.count);
        }
    }
}
