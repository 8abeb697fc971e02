use academic_period::{
    FilterColumns, FilterMode, FixedClock, InMemoryPeriodStore, Intent, Period, PeriodManager,
    ReadRepairPolicy, Record, Semester,
};
use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seeded_manager(today: NaiveDate) -> PeriodManager<InMemoryPeriodStore> {
    let store = Arc::new(InMemoryPeriodStore::new(vec![
        Period::new("P0", "2024/2025", Semester::Second, date(2025, 1, 1), date(2025, 6, 30)),
        Period::new("P1", "2025/2026", Semester::First, date(2025, 7, 1), date(2025, 12, 31))
            .with_active(true),
        Period::new("P2", "2025/2026", Semester::Second, date(2026, 1, 1), date(2026, 6, 30)),
    ]));
    PeriodManager::with_options(
        store,
        Arc::new(FixedClock(today)),
        ReadRepairPolicy::Persist,
        FilterColumns {
            period_id: "semester_id".to_string(),
            year: "academic_year".to_string(),
            semester: "semester".to_string(),
        },
    )
}

fn grades() -> Vec<Record> {
    vec![
        Record::default()
            .with("student", "s1")
            .with("semester_id", "P0")
            .with("academic_year", "2024/2025")
            .with("semester", 2),
        Record::default()
            .with("student", "s1")
            .with("semester_id", "P1")
            .with("academic_year", "2025/2026")
            .with("semester", 1),
        Record::default()
            .with("student", "s2")
            .with("semester_id", "P2")
            .with("academic_year", "2025/2026")
            .with("semester", 2),
    ]
}

fn period_ids(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.data.get("semester_id").and_then(|v| v.as_str()))
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_input_path_scopes_to_active_period() -> Result<()> {
    let manager = seeded_manager(date(2025, 10, 1));

    let context = manager.context().resolve_context(&Intent::Input).await?;
    let period_id = context.period_id.clone().expect("active period");
    assert!(manager.context().validate_for_input(&period_id).await?.valid);

    let filter = manager
        .filters()
        .for_context(&context, FilterMode::Strict)
        .expect("strict filter");
    assert_eq!(period_ids(&filter.apply(grades())), vec!["P1"]);
    Ok(())
}

#[tokio::test]
async fn test_view_path_can_read_history_with_legacy_columns() -> Result<()> {
    let manager = seeded_manager(date(2025, 10, 1));

    let context = manager
        .context()
        .resolve_context(&Intent::view_period("P0"))
        .await?;
    assert!(!context.can_input);

    let filter = manager
        .filters()
        .for_context(&context, FilterMode::Legacy)
        .expect("legacy filter");
    assert_eq!(period_ids(&filter.apply(grades())), vec!["P0"]);
    Ok(())
}

#[tokio::test]
async fn test_year_view_covers_both_semesters() -> Result<()> {
    let manager = seeded_manager(date(2025, 10, 1));

    let context = manager.context().resolve_context(&Intent::view()).await?;
    let periods = manager.context().year_periods(&context.year).await?;
    let filter = manager.filters().by_year_all_periods(&periods);

    assert_eq!(period_ids(&filter.apply(grades())), vec!["P1", "P2"]);
    assert_eq!(filter.to_query_pairs()[0], ("semester_id".to_string(), "in.(P1,P2)".to_string()));
    Ok(())
}

#[test]
fn test_calendar_fallback_has_no_strict_filter() {
    let store = Arc::new(InMemoryPeriodStore::default());
    let manager = PeriodManager::with_options(
        store,
        Arc::new(FixedClock(date(2026, 8, 20))),
        ReadRepairPolicy::Persist,
        FilterColumns::default(),
    );

    let context = tokio_test::block_on(manager.context().resolve_context(&Intent::view())).unwrap();

    assert!(context.can_view);
    assert!(!context.can_input);
    assert_eq!(context.year, "2026/2027");
    assert!(manager
        .filters()
        .for_context(&context, FilterMode::Strict)
        .is_none());
    let legacy = manager
        .filters()
        .for_context(&context, FilterMode::Legacy)
        .unwrap();
    assert_eq!(legacy.to_query_pairs()[0].1, "eq.2026/2027");
}
