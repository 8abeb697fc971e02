use academic_period::core::repair::AutoRepair;
use academic_period::core::resolver::ActiveResolver;
use academic_period::core::transition::TransitionManager;
use academic_period::core::validator::ConsistencyValidator;
use academic_period::domain::model::{IssueKind, WarningKind};
use academic_period::{
    ContextSource, FixedClock, InMemoryPeriodStore, Intent, OutcomeCode, Period, PeriodError,
    PeriodManager, PeriodStore, ReadRepairPolicy, Semester,
};
use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn p1(active: bool) -> Period {
    Period::new("P1", "2025/2026", Semester::First, date(2025, 7, 1), date(2025, 12, 31))
        .with_active(active)
}

fn p2(active: bool) -> Period {
    Period::new("P2", "2025/2026", Semester::Second, date(2026, 1, 1), date(2026, 6, 30))
        .with_active(active)
}

fn manager(store: Arc<InMemoryPeriodStore>, today: NaiveDate) -> PeriodManager<InMemoryPeriodStore> {
    PeriodManager::with_options(
        store,
        Arc::new(FixedClock(today)),
        ReadRepairPolicy::Persist,
        Default::default(),
    )
}

#[tokio::test]
async fn scenario_a_resolve_returns_single_active() -> Result<()> {
    let store = Arc::new(InMemoryPeriodStore::new(vec![p1(true), p2(false)]));

    let active = ActiveResolver::new(store).resolve().await?;

    assert_eq!(active.id.as_str(), "P1");
    Ok(())
}

#[tokio::test]
async fn scenario_b_repair_keeps_latest_start() -> Result<()> {
    let store = Arc::new(InMemoryPeriodStore::new(vec![p1(true), p2(true)]));

    let outcome = AutoRepair::new(store.clone()).repair().await?;

    assert_eq!(outcome.fixes_applied, 1);
    assert_eq!(outcome.fixes[0].period_id.as_str(), "P1");
    assert!(!store.find_by_id(&"P1".into()).await?.unwrap().is_active);
    assert!(store.find_by_id(&"P2".into()).await?.unwrap().is_active);
    Ok(())
}

#[tokio::test]
async fn scenario_c_set_active_period_switches() -> Result<()> {
    let store = Arc::new(InMemoryPeriodStore::new(vec![p1(true), p2(false)]));

    let outcome = TransitionManager::new(store.clone())
        .set_active_period(&"P2".into())
        .await?;

    assert!(outcome.success);
    assert!(!store.find_by_id(&"P1".into()).await?.unwrap().is_active);
    assert!(store.find_by_id(&"P2".into()).await?.unwrap().is_active);

    let resolved = ActiveResolver::new(store).resolve().await?;
    assert_eq!(resolved.id.as_str(), "P2");
    Ok(())
}

#[tokio::test]
async fn scenario_d_transition_without_target_fails() -> Result<()> {
    let store = Arc::new(InMemoryPeriodStore::new(vec![p1(true), p2(false)]));

    let outcome = TransitionManager::new(store.clone())
        .transition_to_new_year("2026/2027", Semester::First)
        .await?;

    assert!(!outcome.success);
    assert_eq!(outcome.code, Some(OutcomeCode::TransitionTargetMissing));
    // 沒有建立任何學期，啟用狀態不變
    assert_eq!(store.snapshot().await.len(), 2);
    assert!(store.find_by_id(&"P1".into()).await?.unwrap().is_active);
    Ok(())
}

#[tokio::test]
async fn scenario_e_incomplete_year_is_a_warning() -> Result<()> {
    let store = Arc::new(InMemoryPeriodStore::new(vec![p1(true)]));

    let report = ConsistencyValidator::new(store).validate().await?;

    assert!(report.is_healthy);
    assert!(report.issues.is_empty());
    assert!(report.has_warning(WarningKind::IncompleteYear));
    Ok(())
}

#[tokio::test]
async fn repair_leaves_min_one_active_and_matches_resolver() -> Result<()> {
    let states = vec![
        vec![p1(false), p2(false)],
        vec![p1(true), p2(false)],
        vec![p1(false), p2(true)],
        vec![p1(true), p2(true)],
    ];

    for periods in states {
        let before = periods.iter().filter(|p| p.is_active).count();
        let store = Arc::new(InMemoryPeriodStore::new(periods));
        let pick = ActiveResolver::new(store.clone()).resolve_optional().await?;

        let repair = AutoRepair::new(store.clone());
        repair.repair().await?;

        assert_eq!(store.active_count().await, before.min(1));
        let survivor = store.find_active().await?.into_iter().next();
        assert_eq!(survivor.map(|p| p.id), pick.map(|p| p.id));
        assert_eq!(repair.repair().await?.fixes_applied, 0);
    }
    Ok(())
}

#[tokio::test]
async fn input_context_never_allows_writes_without_active() -> Result<()> {
    let store = Arc::new(InMemoryPeriodStore::new(vec![p1(false), p2(false)]));
    let manager = manager(store, date(2025, 9, 1));

    assert!(matches!(
        manager.resolver().resolve().await,
        Err(PeriodError::NoActivePeriod)
    ));
    let context = manager.context().resolve_context(&Intent::Input).await?;
    assert!(!context.can_input);
    assert_eq!(context.source, ContextSource::CalendarFallback);
    assert_eq!(context.year, "2025/2026");
    assert_eq!(context.semester_number, Semester::First);
    Ok(())
}

#[tokio::test]
async fn validate_for_input_gates_writes() -> Result<()> {
    let store = Arc::new(InMemoryPeriodStore::new(vec![p1(true), p2(false)]));

    // P2 的日期區間包含今天，但它不是啟用學期
    let spring = manager(store.clone(), date(2026, 3, 1));
    let inactive = spring.context().validate_for_input(&"P2".into()).await?;
    assert_eq!(inactive.code, Some(OutcomeCode::SemesterNotActive));

    let ended = spring.context().validate_for_input(&"P1".into()).await?;
    assert_eq!(ended.code, Some(OutcomeCode::SemesterEnded));

    let summer = manager(store.clone(), date(2025, 6, 15));
    let not_started = summer.context().validate_for_input(&"P1".into()).await?;
    assert_eq!(not_started.code, Some(OutcomeCode::SemesterNotStarted));

    let autumn = manager(store, date(2025, 11, 11));
    assert!(autumn.context().validate_for_input(&"P1".into()).await?.valid);
    Ok(())
}

#[tokio::test]
async fn reading_heals_multiple_active_then_diagnosis_is_clean() -> Result<()> {
    let store = Arc::new(InMemoryPeriodStore::new(vec![p1(true), p2(true)]));
    let manager = manager(store.clone(), date(2026, 2, 1));

    let before = manager.diagnose(false).await?;
    assert!(before.before.has_issue(IssueKind::MultipleActive));

    let context = manager.context().resolve_context(&Intent::view()).await?;
    assert_eq!(context.period_id, Some("P2".into()));

    let after = manager.diagnose(false).await?;
    assert!(after.before.is_healthy);
    Ok(())
}

#[tokio::test]
async fn concurrent_readers_agree_on_the_active_period() -> Result<()> {
    let store = Arc::new(InMemoryPeriodStore::new(vec![p1(true), p2(true)]));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let resolver = ActiveResolver::new(store.clone());
        handles.push(tokio::spawn(async move { resolver.resolve().await }));
    }

    for handle in handles {
        let period = handle.await??;
        assert_eq!(period.id.as_str(), "P2");
    }
    // 解析不寫入
    assert_eq!(store.active_count().await, 2);
    Ok(())
}
