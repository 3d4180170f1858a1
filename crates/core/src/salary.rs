use crate::error::PipelineError;
use crate::models::SalaryBounds;
use regex::Regex;
use serde::{Deserialize, Serialize};

const DIGIT_RUN_REGEX: &str = r"\d+(?:[.,]\d+)*";

/// Range of monthly salaries (COP) considered believable.
///
/// The lower bound sits just under the legal minimum wage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlausibleBand {
    pub min: f64,
    pub max: f64,
}

impl Default for PlausibleBand {
    fn default() -> Self {
        Self {
            min: 1_000_000.0,
            max: 50_000_000.0,
        }
    }
}

impl PlausibleBand {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone)]
pub struct SalaryParser {
    band: PlausibleBand,
    digit_run: Regex,
}

impl SalaryParser {
    pub fn new(band: PlausibleBand) -> Result<Self, PipelineError> {
        if !band.min.is_finite() || !band.max.is_finite() || band.min > band.max {
            return Err(PipelineError::InvalidOptions(format!(
                "plausible salary band {}..{} is not a valid range",
                band.min, band.max
            )));
        }

        Ok(Self {
            band,
            digit_run: Regex::new(DIGIT_RUN_REGEX)?,
        })
    }

    /// Extracts the salary range from free text, or `None` when no number is present.
    ///
    /// Numbers outside the plausible band are dropped unless that would drop all
    /// of them, in which case every candidate is kept.
    pub fn parse(&self, raw: &str) -> Option<SalaryBounds> {
        let mut candidates = self.candidates(raw);
        if candidates.is_empty() {
            return None;
        }

        let plausible: Vec<f64> = candidates
            .iter()
            .copied()
            .filter(|value| self.band.contains(*value))
            .collect();

        let survivors = if plausible.is_empty() {
            candidates.sort_by(f64::total_cmp);
            candidates
        } else {
            plausible
        };

        let min = survivors.iter().copied().min_by(f64::total_cmp)?;
        let max = survivors.iter().copied().max_by(f64::total_cmp)?;
        Some(SalaryBounds::new(min, max))
    }

    /// Every digit run in the text, normalized and magnitude-corrected.
    pub fn candidates(&self, raw: &str) -> Vec<f64> {
        self.digit_run
            .find_iter(raw)
            .filter_map(|found| normalize_number(found.as_str()))
            .map(correct_magnitude)
            .filter(|value| value.is_finite())
            .collect()
    }
}

/// Turns a digit run with `.`/`,` separators into a number.
///
/// With both separators present the last one is the decimal marker, unless
/// that character repeats, in which case every separator groups thousands. A lone
/// separator kind is a thousands separator when it repeats or is followed by
/// exactly three digits, and a decimal marker otherwise.
pub fn normalize_number(token: &str) -> Option<f64> {
    let dots = token.matches('.').count();
    let commas = token.matches(',').count();

    let decimal_marker = match (dots, commas) {
        (0, 0) => None,
        (_, 0) => lone_separator_decimal(token, '.', dots),
        (0, _) => lone_separator_decimal(token, ',', commas),
        _ => token
            .rfind(['.', ','])
            .and_then(|index| token[index..].chars().next())
            .filter(|marker| token.matches(*marker).count() == 1),
    };

    let mut normalized = String::with_capacity(token.len());
    for character in token.chars() {
        if character.is_ascii_digit() {
            normalized.push(character);
        } else if Some(character) == decimal_marker {
            normalized.push('.');
        }
    }

    normalized.parse::<f64>().ok()
}

fn lone_separator_decimal(token: &str, separator: char, occurrences: usize) -> Option<char> {
    if occurrences > 1 {
        return None;
    }

    let digits_after = token
        .rfind(separator)
        .map(|index| token[index + separator.len_utf8()..].len())
        .unwrap_or_default();

    if digits_after == 3 {
        None
    } else {
        Some(separator)
    }
}

/// Scales abbreviated amounts: `< 100` reads as millions, `< 10 000` as thousands.
pub fn correct_magnitude(value: f64) -> f64 {
    let scaled = if value < 100.0 {
        value * 1_000_000.0
    } else if value < 10_000.0 {
        value * 1_000.0
    } else {
        value
    };
    scaled.round()
}
