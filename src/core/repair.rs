use crate::core::resolver::pick_canonical;
use crate::domain::model::{Period, RepairFix, RepairOutcome};
use crate::domain::ports::PeriodStore;
use crate::utils::error::Result;
use std::sync::Arc;

/// 把「多筆啟用」收斂回一筆並寫回儲存區。
///
/// 這是讀取時偵測、寫入修復的調和函式，不是鎖：兩次呼叫之間的並行寫入者仍可能
/// 再次製造異常，下一次修復會再收斂。重複執行是冪等的。
pub struct AutoRepair<S: PeriodStore + ?Sized> {
    store: Arc<S>,
}

impl<S: PeriodStore + ?Sized> AutoRepair<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn repair(&self) -> Result<RepairOutcome> {
        let actives = self.store.find_active().await?;
        self.apply(actives).await
    }

    pub(crate) async fn apply(&self, actives: Vec<Period>) -> Result<RepairOutcome> {
        if actives.len() <= 1 {
            return Ok(RepairOutcome::noop(actives.into_iter().next()));
        }

        let keep = match pick_canonical(&actives) {
            Some(period) => period.clone(),
            None => return Ok(RepairOutcome::noop(None)),
        };

        tracing::warn!(
            "🔧 Repairing {} active periods, keeping {}",
            actives.len(),
            keep.label()
        );

        let mut fixes = Vec::new();
        for period in actives.iter().filter(|p| p.id != keep.id) {
            self.store.set_active_flag(&period.id, false).await?;
            tracing::info!("🔧 Deactivated {} ({})", period.label(), period.id);
            fixes.push(RepairFix {
                period_id: period.id.clone(),
                label: period.label(),
                reason: format!(
                    "{} was also active; {} starts later and stays active",
                    period.label(),
                    keep.label()
                ),
            });
        }

        Ok(RepairOutcome {
            fixes_applied: fixes.len(),
            fixes,
            kept: Some(keep),
        })
    }
}
