use crate::error::DatasetError;
use crate::models::{Posting, PostingRecord, RawPosting};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

pub fn discover_json_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_json = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

pub struct SkippedRecord {
    pub path: PathBuf,
    pub index: usize,
    pub reason: String,
}

pub struct IngestionReport {
    pub postings: Vec<RawPosting>,
    pub skipped_files: Vec<SkippedFile>,
    pub skipped_records: Vec<SkippedRecord>,
}

/// Reads one JSON array of raw postings. Any record with a blank title,
/// company or location fails the whole file.
pub fn read_raw_postings(path: &Path) -> Result<Vec<RawPosting>, DatasetError> {
    let postings: Vec<RawPosting> = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    for (index, posting) in postings.iter().enumerate() {
        if let Some(field) = posting.missing_required_field() {
            return Err(DatasetError::MissingField { index, field });
        }
    }
    Ok(postings)
}

/// Loads raw postings from a single file or, for a folder, from every
/// `*.json` file below it.
///
/// Folder loading is best-effort: unreadable files and records missing a
/// required field are reported instead of failing the batch.
pub fn load_raw_postings_best_effort(input: &Path) -> Result<IngestionReport, DatasetError> {
    let files = if input.is_dir() {
        discover_json_files(input)
    } else if input.is_file() {
        vec![input.to_path_buf()]
    } else {
        return Err(DatasetError::InvalidArgument(format!(
            "input path does not exist: {}",
            input.display()
        )));
    };

    if files.is_empty() {
        return Err(DatasetError::InvalidArgument(format!(
            "no json files found in {}",
            input.display()
        )));
    }

    let mut postings = Vec::new();
    let mut skipped_files = Vec::new();
    let mut skipped_records = Vec::new();

    for path in files {
        let parsed = File::open(&path)
            .map_err(DatasetError::from)
            .and_then(|file| {
                serde_json::from_reader::<_, Vec<RawPosting>>(BufReader::new(file))
                    .map_err(DatasetError::from)
            });

        let batch = match parsed {
            Ok(batch) => batch,
            Err(error) => {
                warn!(path = %path.display(), reason = %error, "skipped input file");
                skipped_files.push(SkippedFile {
                    path,
                    reason: error.to_string(),
                });
                continue;
            }
        };

        let total = batch.len();
        for (index, posting) in batch.into_iter().enumerate() {
            match posting.missing_required_field() {
                None => postings.push(posting),
                Some(field) => {
                    let reason = DatasetError::MissingField { index, field }.to_string();
                    warn!(path = %path.display(), index, %reason, "skipped raw posting");
                    skipped_records.push(SkippedRecord {
                        path: path.clone(),
                        index,
                        reason,
                    });
                }
            }
        }
        info!(path = %path.display(), records = total, "loaded input file");
    }

    Ok(IngestionReport {
        postings,
        skipped_files,
        skipped_records,
    })
}

/// Writes the enriched dataset as a pretty-printed JSON array of flat records.
pub fn write_postings(path: &Path, postings: &[Posting]) -> Result<(), DatasetError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let records: Vec<PostingRecord> = postings.iter().cloned().map(PostingRecord::from).collect();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn read_postings(path: &Path) -> Result<Vec<Posting>, DatasetError> {
    let records: Vec<PostingRecord> = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    Ok(records.into_iter().map(Posting::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::EnrichmentPipeline;
    use std::fs;
    use tempfile::tempdir;

    const TWO_POSTINGS: &str = r#"[
        {"title": "Cajero", "company": "Banco X", "location": "Turbo", "salary": "$1.500.000"},
        {"title": "Auxiliar", "company": "Finca", "location": "Carepa", "source": "comfama"}
    ]"#;

    #[test]
    fn discover_json_files_is_recursive() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let nested = dir.path().join("computrabajo");
        fs::create_dir(&nested)?;
        fs::write(dir.path().join("a.json"), "[]")?;
        fs::write(nested.join("b.JSON"), "[]")?;
        fs::write(nested.join("notes.txt"), "ignored")?;

        let files = discover_json_files(dir.path());
        assert_eq!(files.len(), 2);
        Ok(())
    }

    #[test]
    fn salary_alias_is_accepted() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("elempleo.json");
        fs::write(&path, TWO_POSTINGS)?;

        let postings = read_raw_postings(&path)?;
        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].salary_raw, "$1.500.000");
        assert_eq!(postings[1].source, "comfama");
        Ok(())
    }

    #[test]
    fn strict_read_rejects_blank_required_fields() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"[{"title": "Cajero", "company": "", "location": "Turbo"}]"#)?;

        assert!(matches!(
            read_raw_postings(&path),
            Err(DatasetError::MissingField { index: 0, field: "company" })
        ));
        Ok(())
    }

    #[test]
    fn missing_input_is_an_invalid_argument() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let result = load_raw_postings_best_effort(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(DatasetError::InvalidArgument(_))));

        let empty = load_raw_postings_best_effort(dir.path());
        assert!(matches!(empty, Err(DatasetError::InvalidArgument(_))));
        Ok(())
    }

    #[test]
    fn best_effort_skips_broken_files_and_records() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("a_good.json"), TWO_POSTINGS)?;
        fs::write(dir.path().join("b_broken.json"), "{not json")?;
        fs::write(
            dir.path().join("c_partial.json"),
            r#"[{"title": " ", "company": "X", "location": "Turbo"},
                {"title": "Mensajero", "company": "X", "location": "Necoclí"}]"#,
        )?;

        let report = load_raw_postings_best_effort(dir.path())?;
        assert_eq!(report.postings.len(), 3);
        assert_eq!(report.skipped_files.len(), 1);
        assert_eq!(
            report.skipped_files[0]
                .path
                .file_name()
                .and_then(|name| name.to_str()),
            Some("b_broken.json")
        );
        assert_eq!(report.skipped_records.len(), 1);
        assert_eq!(report.skipped_records[0].index, 0);
        Ok(())
    }

    #[test]
    fn written_dataset_reads_back() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let input = dir.path().join("raw.json");
        fs::write(&input, TWO_POSTINGS)?;

        let pipeline = EnrichmentPipeline::with_defaults()?;
        let report = pipeline.run(read_raw_postings(&input)?);
        let output = dir.path().join("out").join("jobs.json");
        write_postings(&output, &report.postings)?;

        let text = fs::read_to_string(&output)?;
        assert!(text.contains("\"salary_min\": 1500000.0"));
        assert!(text.contains("\"salary_max\": null"));

        let restored = read_postings(&output)?;
        assert_eq!(restored, report.postings);
        Ok(())
    }
}
