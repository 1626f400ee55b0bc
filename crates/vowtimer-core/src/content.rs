//! Motivational content shown beside the countdown.
//!
//! A session displays either quotes or Old English poems. Lookups never fail
//! from the caller's point of view: an empty table or a store error yields the
//! built-in fallback.

use serde::{Deserialize, Serialize};

use crate::storage::{Poem, Quote, Store};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Quotes,
    Poems,
}

impl DisplayMode {
    pub fn toggle(self) -> Self {
        match self {
            DisplayMode::Quotes => DisplayMode::Poems,
            DisplayMode::Poems => DisplayMode::Quotes,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DisplayMode::Quotes => "Quotes",
            DisplayMode::Poems => "Old English Poems",
        }
    }
}

/// One piece of content ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Content {
    Quote {
        text: String,
        source: String,
    },
    Poem {
        old_english: String,
        modern_english: String,
        source: String,
        line_ref: String,
    },
}

impl Content {
    pub fn fallback(mode: DisplayMode) -> Self {
        match mode {
            DisplayMode::Quotes => Content::Quote {
                text: "Focus on your task.".into(),
                source: String::new(),
            },
            DisplayMode::Poems => Content::Poem {
                old_english: "Wyrd oft nereð\nunfǽgne eorl, þonne his ellen déah".into(),
                modern_english: "Fate often saves\nan undoomed man, when his courage holds".into(),
                source: "Beowulf".into(),
                line_ref: "lines 572-573".into(),
            },
        }
    }

    /// `"— Source"` or `"— Source, lines"`, empty when there is no source.
    pub fn attribution(&self) -> String {
        match self {
            Content::Quote { source, .. } if source.is_empty() => String::new(),
            Content::Quote { source, .. } => format!("— {source}"),
            Content::Poem {
                source, line_ref, ..
            } if line_ref.is_empty() => format!("— {source}"),
            Content::Poem {
                source, line_ref, ..
            } => format!("— {source}, {line_ref}"),
        }
    }
}

impl From<Quote> for Content {
    fn from(q: Quote) -> Self {
        Content::Quote {
            text: q.text,
            source: q.source,
        }
    }
}

impl From<Poem> for Content {
    fn from(p: Poem) -> Self {
        Content::Poem {
            old_english: p.old_english,
            modern_english: p.modern_english,
            source: p.source,
            line_ref: p.line_ref,
        }
    }
}

/// Pick random content for `mode`, scoped to `subject` for quotes.
pub fn load_content(store: &dyn Store, mode: DisplayMode, subject: Option<&str>) -> Content {
    let found = match mode {
        DisplayMode::Quotes => store.random_quote_for(subject).map(|q| q.map(Content::from)),
        DisplayMode::Poems => store.random_poem().map(|p| p.map(Content::from)),
    };
    match found {
        Ok(Some(content)) => content,
        Ok(None) => {
            tracing::debug!(?mode, "no stored content, using fallback");
            Content::fallback(mode)
        }
        Err(e) => {
            tracing::warn!(?mode, error = %e, "content lookup failed, using fallback");
            Content::fallback(mode)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Database, NewPoem};

    #[test]
    fn toggle_flips_between_modes() {
        assert_eq!(DisplayMode::Quotes.toggle(), DisplayMode::Poems);
        assert_eq!(DisplayMode::Poems.toggle(), DisplayMode::Quotes);
        assert_eq!(DisplayMode::default(), DisplayMode::Quotes);
    }

    #[test]
    fn empty_store_falls_back() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(
            load_content(&db, DisplayMode::Quotes, Some("Music")),
            Content::fallback(DisplayMode::Quotes)
        );
        assert_eq!(
            load_content(&db, DisplayMode::Poems, None),
            Content::fallback(DisplayMode::Poems)
        );
    }

    #[test]
    fn subject_quote_is_preferred_over_fallback() {
        let db = Database::open_in_memory().unwrap();
        db.add_quote("Play slowly first.", "", &["Music".to_string()])
            .unwrap();
        match load_content(&db, DisplayMode::Quotes, Some("Music")) {
            Content::Quote { text, .. } => assert_eq!(text, "Play slowly first."),
            other => panic!("expected quote, got {other:?}"),
        }
        // Tagged for another subject only: fallback.
        assert_eq!(
            load_content(&db, DisplayMode::Quotes, Some("Reading")),
            Content::fallback(DisplayMode::Quotes)
        );
    }

    #[test]
    fn stored_poem_is_returned() {
        let db = Database::open_in_memory().unwrap();
        db.add_poem(&NewPoem {
            old_english: "Hwæt!".into(),
            modern_english: "Listen!".into(),
            source: "Beowulf".into(),
            line_ref: "line 1".into(),
        })
        .unwrap();
        let content = load_content(&db, DisplayMode::Poems, None);
        assert_eq!(content.attribution(), "— Beowulf, line 1");
    }

    #[test]
    fn attribution_is_empty_without_source() {
        assert_eq!(Content::fallback(DisplayMode::Quotes).attribution(), "");
        assert_eq!(
            Content::fallback(DisplayMode::Poems).attribution(),
            "— Beowulf, lines 572-573"
        );
    }
}
