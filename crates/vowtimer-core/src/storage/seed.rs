//! Built-in subjects, quotes and poems.
//!
//! The data ships inside the binary as TOML. Seeding is idempotent: rows that
//! already exist (subjects by name, quotes by text, poems by source and line
//! reference) are skipped.

use serde::{Deserialize, Serialize};

use super::{NewPoem, Store};
use crate::error::Result;

const SEED_TOML: &str = include_str!("seed.toml");

#[derive(Debug, Deserialize)]
struct SeedSubject {
    name: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct SeedQuote {
    text: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    subjects: Vec<String>,
}

/// Parsed seed document.
#[derive(Debug, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    subjects: Vec<SeedSubject>,
    #[serde(default)]
    quotes: Vec<SeedQuote>,
    #[serde(default)]
    poems: Vec<NewPoem>,
}

impl SeedData {
    /// The document embedded at build time.
    pub fn builtin() -> Result<Self> {
        Self::parse(SEED_TOML)
    }

    pub fn parse(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

/// How many rows a seed run inserted versus skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub subjects_added: usize,
    pub quotes_added: usize,
    pub poems_added: usize,
    pub skipped: usize,
}

impl SeedSummary {
    pub fn added(&self) -> usize {
        self.subjects_added + self.quotes_added + self.poems_added
    }
}

/// Insert the built-in data set.
pub fn seed(store: &dyn Store) -> Result<SeedSummary> {
    seed_with(store, &SeedData::builtin()?)
}

pub fn seed_with(store: &dyn Store, data: &SeedData) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for s in &data.subjects {
        let (_, created) = store.add_subject_if_missing(&s.name, &s.icon)?;
        tally(&mut summary.subjects_added, &mut summary.skipped, created);
    }

    for q in &data.quotes {
        let (_, created) = store.add_quote_if_missing(&q.text, &q.source, &q.subjects)?;
        tally(&mut summary.quotes_added, &mut summary.skipped, created);
    }

    for p in &data.poems {
        let (_, created) = store.add_poem_if_missing(p)?;
        tally(&mut summary.poems_added, &mut summary.skipped, created);
    }

    tracing::info!(
        subjects = summary.subjects_added,
        quotes = summary.quotes_added,
        poems = summary.poems_added,
        skipped = summary.skipped,
        "seed complete"
    );
    Ok(summary)
}

fn tally(added: &mut usize, skipped: &mut usize, created: bool) {
    if created {
        *added += 1;
    } else {
        *skipped += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    #[test]
    fn builtin_document_parses() {
        let data = SeedData::builtin().unwrap();
        assert_eq!(data.subjects.len(), 5);
        assert!(data.quotes.iter().any(|q| q.subjects.is_empty()));
        assert!(data
            .poems
            .iter()
            .any(|p| p.source == "Beowulf" && p.line_ref == "lines 572-573"));
    }

    #[test]
    fn seeding_twice_adds_nothing_the_second_time() {
        let db = Database::open_in_memory().unwrap();
        let first = seed(&db).unwrap();
        assert_eq!(first.subjects_added, 5);
        assert_eq!(first.skipped, 0);

        let second = seed(&db).unwrap();
        assert_eq!(second.added(), 0);
        assert_eq!(second.skipped, first.added());

        assert_eq!(db.list_subjects().unwrap().len(), 5);
        assert_eq!(db.count_quotes().unwrap() as usize, first.quotes_added);
        assert_eq!(db.count_poems().unwrap() as usize, first.poems_added);
    }

    #[test]
    fn seed_keeps_existing_user_rows() {
        let db = Database::open_in_memory().unwrap();
        db.add_subject("Music", "🎸").unwrap();
        let data = SeedData::parse(
            r#"
            [[subjects]]
            name = "Music"
            icon = "🎵"

            [[quotes]]
            text = "Practice."
            subjects = ["Music"]
            "#,
        )
        .unwrap();

        let summary = seed_with(&db, &data).unwrap();
        assert_eq!(summary.subjects_added, 0);
        assert_eq!(summary.quotes_added, 1);
        assert_eq!(db.list_subjects().unwrap()[0].icon, "🎸");
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(SeedData::parse("[[subjects]]\nname = 3\n").is_err());
    }
}
