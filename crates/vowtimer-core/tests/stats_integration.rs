//! Integration tests for stats aggregation over a seeded, file-backed store.

use chrono::{Duration, Local, NaiveDate, TimeZone, Utc};
use vowtimer_core::storage::seed::seed;
use vowtimer_core::storage::{NewSession, SessionStatus};
use vowtimer_core::{load_content, Content, Database, DisplayMode, SessionStats, Store};

fn noon(day: NaiveDate) -> chrono::DateTime<Utc> {
    Local
        .from_local_datetime(&day.and_hms_opt(12, 0, 0).unwrap())
        .single()
        .unwrap()
        .with_timezone(&Utc)
}

fn record(db: &Database, subject: &str, status: SessionStatus, day: NaiveDate) {
    let end = noon(day);
    db.create_session(&NewSession {
        subject_id: 1,
        subject_name: subject.to_string(),
        duration_min: 25,
        status,
        started_at: end - Duration::minutes(25),
        completed_at: end,
    })
    .unwrap();
}

#[test]
fn test_streaks_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vow.db");
    let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

    {
        let db = Database::open(&path).unwrap();
        // Old five-day run, then a two-day run ending yesterday.
        for offset in 20..25 {
            record(&db, "GoLang", SessionStatus::Completed, today - Duration::days(offset));
        }
        record(&db, "React", SessionStatus::Completed, today - Duration::days(2));
        record(&db, "React", SessionStatus::Completed, today - Duration::days(1));
        record(&db, "React", SessionStatus::Completed, today - Duration::days(1));
        record(&db, "Music", SessionStatus::Abandoned, today);
    }

    let db = Database::open(&path).unwrap();
    let stats = SessionStats::collect(&db, today).unwrap();
    assert_eq!(stats.current_streak, 2);
    assert_eq!(stats.longest_streak, 5);
    assert_eq!(stats.total_sessions, 9);
    assert_eq!(stats.abandoned_sessions, 1);
    assert_eq!(stats.total_minutes, 8 * 25);
    assert_eq!(stats.by_subject[0], ("GoLang".to_string(), 5));
    assert_eq!(stats.by_subject[1], ("React".to_string(), 3));
}

#[test]
fn test_stats_serialize_for_cli() {
    let db = Database::open_in_memory().unwrap();
    let today = Local::now().date_naive();
    record(&db, "Reading", SessionStatus::Completed, today);

    let stats = SessionStats::collect(&db, today).unwrap();
    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["completed_sessions"], 1);
    assert_eq!(json["current_streak"], 1);
    assert_eq!(json["by_subject"][0][0], "Reading");
}

#[test]
fn test_seeded_content_respects_subject_tags() {
    let db = Database::open_in_memory().unwrap();
    seed(&db).unwrap();

    let general: Vec<String> = db
        .list_quotes()
        .unwrap()
        .into_iter()
        .filter(|q| q.is_general())
        .map(|q| q.text)
        .collect();

    for _ in 0..30 {
        let quote = db.random_quote_for(Some("Writing")).unwrap().unwrap();
        assert!(quote.applies_to("Writing"), "got {:?}", quote.subjects);

        match load_content(&db, DisplayMode::Quotes, Some("Unknown")) {
            Content::Quote { text, .. } => assert!(general.contains(&text)),
            other => panic!("expected quote, got {other:?}"),
        }
    }

    assert!(matches!(
        load_content(&db, DisplayMode::Poems, None),
        Content::Poem { .. }
    ));
}
