use crate::domain::model::Period;
use crate::domain::ports::PeriodStore;
use crate::utils::error::{PeriodError, Result};
use std::sync::Arc;

/// 多筆啟用時的裁決規則：start_date 最晚者勝出，同日再比 id。
/// 全系統（解析、修復）共用這一個規則。
pub fn pick_canonical(actives: &[Period]) -> Option<&Period> {
    actives
        .iter()
        .max_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.id.cmp(&b.id)))
}

/// 回傳目前啟用的學期；不做任何寫入
pub struct ActiveResolver<S: PeriodStore + ?Sized> {
    store: Arc<S>,
}

impl<S: PeriodStore + ?Sized> ActiveResolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self) -> Result<Period> {
        self.resolve_optional()
            .await?
            .ok_or(PeriodError::NoActivePeriod)
    }

    /// 與 `resolve` 相同，但沒有啟用學期時回傳 None 而非錯誤
    pub async fn resolve_optional(&self) -> Result<Option<Period>> {
        let actives = self.store.find_active().await?;
        Ok(select_active(&actives).cloned())
    }
}

/// 套用裁決規則；多筆啟用時只記錄警告，不修復
pub(crate) fn select_active(actives: &[Period]) -> Option<&Period> {
    let picked = pick_canonical(actives);
    if actives.len() > 1 {
        if let Some(period) = picked {
            tracing::warn!(
                "⚠️ {} periods are active; using {} (latest start date) until repaired",
                actives.len(),
                period.label()
            );
        }
    }
    picked
}
