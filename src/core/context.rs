use crate::core::calendar::{fallback_semester, fallback_year};
use crate::core::repair::AutoRepair;
use crate::core::resolver::select_active;
use crate::domain::model::{
    ContextSource, InputValidation, Intent, OutcomeCode, Period, PeriodContext, PeriodId,
};
use crate::domain::ports::{Clock, PeriodStore};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 讀取時發現多筆啟用學期的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadRepairPolicy {
    /// 停用其餘學期並寫回儲存區
    #[default]
    Persist,
    /// 舊行為：只記錄警告並使用裁決結果，不寫回
    WarnOnly,
}

/// 所有成績、出缺席、報表呼叫端共用的學期範圍決策
pub struct ContextSelector<S: PeriodStore + ?Sized> {
    store: Arc<S>,
    repair: AutoRepair<S>,
    clock: Arc<dyn Clock>,
    policy: ReadRepairPolicy,
}

impl<S: PeriodStore + ?Sized> ContextSelector<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, policy: ReadRepairPolicy) -> Self {
        Self {
            repair: AutoRepair::new(store.clone()),
            store,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> ReadRepairPolicy {
        self.policy
    }

    pub async fn resolve_context(&self, intent: &Intent) -> Result<PeriodContext> {
        match intent {
            // 寫入一律使用啟用學期，忽略使用者選擇
            Intent::Input => match self.current_active().await? {
                Some(active) => Ok(period_context(&active, ContextSource::Active, true)),
                None => {
                    tracing::warn!("No active period; input is disabled until one is activated");
                    Ok(self.fallback_context())
                }
            },
            Intent::View {
                selected: Some(selected_id),
            } => match self.store.find_by_id(selected_id).await? {
                Some(selected) => {
                    let can_input = self
                        .current_active()
                        .await?
                        .is_some_and(|active| active.id == selected.id);
                    Ok(period_context(
                        &selected,
                        ContextSource::UserSelected,
                        can_input,
                    ))
                }
                None => {
                    tracing::warn!(
                        "Selected period {} does not exist; falling back to the default view",
                        selected_id
                    );
                    self.default_view().await
                }
            },
            Intent::View { selected: None } => self.default_view().await,
        }
    }

    /// 所有寫入路徑在保存帶有學期 id 的資料前都必須通過這道檢查
    pub async fn validate_for_input(&self, period_id: &PeriodId) -> Result<InputValidation> {
        let period = match self.store.find_by_id(period_id).await? {
            Some(period) => period,
            None => {
                return Ok(InputValidation::rejected(
                    OutcomeCode::SemesterNotFound,
                    format!("Period {} does not exist", period_id),
                ));
            }
        };

        // 只接受裁決後的唯一啟用學期；多筆啟用時落敗者同樣拒絕
        let active = self.current_active().await?;
        if active.as_ref().map(|a| &a.id) != Some(&period.id) {
            let hint = match &active {
                Some(active) => format!("switch to the active period {}", active.label()),
                None => "no period is active at the moment".to_string(),
            };
            return Ok(InputValidation::rejected(
                OutcomeCode::SemesterNotActive,
                format!("{} is not the active period; {}", period.label(), hint),
            ));
        }

        let today = self.clock.today();
        if today < period.start_date {
            return Ok(InputValidation::rejected(
                OutcomeCode::SemesterNotStarted,
                format!("{} starts on {}", period.label(), period.start_date),
            ));
        }
        if today > period.end_date {
            return Ok(InputValidation::rejected(
                OutcomeCode::SemesterEnded,
                format!("{} ended on {}", period.label(), period.end_date),
            ));
        }

        Ok(InputValidation::accepted(format!(
            "{} is open for input",
            period.label()
        )))
    }

    /// 同一學年的所有學期，依學期排序
    pub async fn year_periods(&self, year: &str) -> Result<Vec<Period>> {
        let mut periods = self.store.find_by_year(year).await?;
        periods.sort_by_key(|p| (p.semester_number, p.start_date));
        Ok(periods)
    }

    async fn default_view(&self) -> Result<PeriodContext> {
        match self.current_active().await? {
            Some(active) => Ok(period_context(&active, ContextSource::Active, true)),
            None => Ok(self.fallback_context()),
        }
    }

    async fn current_active(&self) -> Result<Option<Period>> {
        let actives = self.store.find_active().await?;
        if actives.len() > 1 && self.policy == ReadRepairPolicy::Persist {
            let outcome = self.repair.apply(actives).await?;
            return Ok(outcome.kept);
        }
        Ok(select_active(&actives).cloned())
    }

    fn fallback_context(&self) -> PeriodContext {
        let today = self.clock.today();
        PeriodContext {
            period_id: None,
            semester_number: fallback_semester(today),
            year: fallback_year(today),
            can_input: false,
            can_view: true,
            source: ContextSource::CalendarFallback,
        }
    }
}

fn period_context(period: &Period, source: ContextSource, can_input: bool) -> PeriodContext {
    PeriodContext {
        period_id: Some(period.id.clone()),
        semester_number: period.semester_number,
        year: period.year.clone(),
        can_input,
        can_view: true,
        source,
    }
}
