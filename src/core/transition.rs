use crate::core::calendar::next_year_label;
use crate::core::resolver::{select_active, ActiveResolver};
use crate::domain::model::{OutcomeCode, Period, PeriodId, Semester, TransitionOutcome};
use crate::domain::ports::PeriodStore;
use crate::utils::error::Result;
use std::sync::Arc;

/// 負責切換啟用學期。
///
/// 停用與啟用是兩次獨立的寫入，中間沒有交易；若停用後啟用失敗，儲存區會處於
/// 「零筆啟用」狀態，這時回傳 `TransitionPartialFailure` 交由呼叫端重試。
pub struct TransitionManager<S: PeriodStore + ?Sized> {
    store: Arc<S>,
    resolver: ActiveResolver<S>,
}

impl<S: PeriodStore + ?Sized> TransitionManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            resolver: ActiveResolver::new(store.clone()),
            store,
        }
    }

    pub async fn set_active_period(&self, target_id: &PeriodId) -> Result<TransitionOutcome> {
        let target = match self.store.find_by_id(target_id).await? {
            Some(period) => period,
            None => {
                tracing::warn!("Activation requested for unknown period {}", target_id);
                return Ok(TransitionOutcome::failed(
                    OutcomeCode::PeriodNotFound,
                    format!("Period {} does not exist", target_id),
                ));
            }
        };

        let actives = self.store.find_active().await?;
        let previous_active = select_active(&actives).cloned();

        // 目標本身也先停用，讓重複呼叫的結果與先前狀態無關
        for (disabled, period) in actives.iter().enumerate() {
            if let Err(e) = self.store.set_active_flag(&period.id, false).await {
                tracing::error!(
                    "🚨 Failed to deactivate {} after disabling {} of {} period(s): {}",
                    period.label(),
                    disabled,
                    actives.len(),
                    e
                );
                return Err(e);
            }
            tracing::info!("Deactivated {} ({})", period.label(), period.id);
        }

        if let Err(e) = self.store.set_active_flag(&target.id, true).await {
            tracing::error!(
                "🚨 Disabled {} period(s) but failed to activate {}: {}. NO PERIOD IS ACTIVE",
                actives.len(),
                target.label(),
                e
            );
            let mut outcome = TransitionOutcome::failed(
                OutcomeCode::TransitionPartialFailure,
                format!(
                    "Deactivated {} period(s) but could not activate {}: {}. No period is active now",
                    actives.len(),
                    target.label(),
                    e
                ),
            )
            .with_suggestion(format!(
                "Retry activating {} or escalate to an administrator",
                target.id
            ));
            outcome.previous_active = previous_active;
            return Ok(outcome);
        }

        let activated = Period {
            is_active: true,
            ..target
        };
        tracing::info!(
            "✅ Active period is now {} (previously {})",
            activated.label(),
            previous_active
                .as_ref()
                .map(Period::label)
                .unwrap_or_else(|| "none".to_string())
        );

        Ok(TransitionOutcome::succeeded(
            format!("{} is now the active period", activated.label()),
            activated,
            previous_active,
        ))
    }

    /// 跨學年切換；本模組從不建立學期，目標必須事先存在
    pub async fn transition_to_new_year(
        &self,
        new_year: &str,
        starting_semester: Semester,
    ) -> Result<TransitionOutcome> {
        let current = match self.resolver.resolve_optional().await? {
            Some(period) => period,
            None => {
                return Ok(TransitionOutcome::failed(
                    OutcomeCode::NoActiveYear,
                    "No active period; cannot determine the year being left",
                ));
            }
        };

        let target = match self
            .store
            .find_by_year_and_semester(new_year, starting_semester)
            .await?
        {
            Some(period) => period,
            None => {
                tracing::warn!(
                    "Transition target {} semester {} does not exist",
                    new_year,
                    starting_semester
                );
                return Ok(missing_target(new_year, starting_semester));
            }
        };

        let mut outcome = self.set_active_period(&target.id).await?;
        if outcome.success && current.year != new_year {
            outcome.archive_recommendation = Some(format!(
                "Year {} is no longer active; consider archiving its records",
                current.year
            ));
        }
        Ok(outcome)
    }

    /// 第 1 學期 -> 同學年第 2 學期；第 2 學期 -> 下一學年第 1 學期
    pub async fn advance_semester(&self) -> Result<TransitionOutcome> {
        let current = match self.resolver.resolve_optional().await? {
            Some(period) => period,
            None => {
                return Ok(TransitionOutcome::failed(
                    OutcomeCode::NoActiveYear,
                    "No active period to advance from",
                ));
            }
        };

        match current.semester_number {
            Semester::First => {
                match self
                    .store
                    .find_by_year_and_semester(&current.year, Semester::Second)
                    .await?
                {
                    Some(next) => self.set_active_period(&next.id).await,
                    None => Ok(missing_target(&current.year, Semester::Second)),
                }
            }
            Semester::Second => match next_year_label(&current.year) {
                Some(next_year) => {
                    self.transition_to_new_year(&next_year, Semester::First)
                        .await
                }
                None => Ok(TransitionOutcome::failed(
                    OutcomeCode::TransitionTargetMissing,
                    format!(
                        "Cannot derive the year after '{}'; use an explicit transition",
                        current.year
                    ),
                )),
            },
        }
    }
}

fn missing_target(year: &str, semester: Semester) -> TransitionOutcome {
    TransitionOutcome::failed(
        OutcomeCode::TransitionTargetMissing,
        format!("No period exists for {} semester {}", year, semester),
    )
    .with_suggestion(format!(
        "Create the period {} semester {} first, then retry the transition",
        year, semester
    ))
}
