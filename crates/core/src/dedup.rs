use crate::models::{Posting, RawPosting};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tracing::info;

/// Case-folded, trimmed (title, company, location) triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub title: String,
    pub company: String,
    pub location: String,
}

impl DedupKey {
    pub fn new(title: &str, company: &str, location: &str) -> Self {
        Self {
            title: title.trim().to_lowercase(),
            company: company.trim().to_lowercase(),
            location: location.trim().to_lowercase(),
        }
    }

    pub fn of_raw(posting: &RawPosting) -> Self {
        Self::new(&posting.title, &posting.company, &posting.location)
    }

    pub fn of_posting(posting: &Posting) -> Self {
        Self::new(&posting.title, &posting.company, &posting.location)
    }

    /// Stable hex digest of the key, used as the posting id.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for part in [&self.title, &self.company, &self.location] {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Keeps the first posting for every key, in input order.
pub fn deduplicate(postings: Vec<Posting>) -> (Vec<Posting>, usize) {
    let before = postings.len();
    let mut seen = HashSet::with_capacity(before);
    let mut unique = Vec::with_capacity(before);

    for posting in postings {
        if seen.insert(DedupKey::of_posting(&posting)) {
            unique.push(posting);
        }
    }

    let dropped = before - unique.len();
    info!(before, after = unique.len(), dropped, "deduplication finished");
    (unique, dropped)
}
