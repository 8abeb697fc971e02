use crate::core::context::{ContextSelector, ReadRepairPolicy};
use crate::core::filter::{FilterBuilder, FilterColumns};
use crate::core::repair::AutoRepair;
use crate::core::resolver::ActiveResolver;
use crate::core::transition::TransitionManager;
use crate::core::validator::ConsistencyValidator;
use crate::domain::model::DiagnosticReport;
use crate::domain::ports::{Clock, PeriodStore, SystemClock};
use crate::utils::error::Result;
use std::sync::Arc;

/// 以單一共享儲存區組裝所有學期服務，注入給各個讀寫呼叫端
pub struct PeriodManager<S: PeriodStore + ?Sized> {
    store: Arc<S>,
    validator: ConsistencyValidator<S>,
    resolver: ActiveResolver<S>,
    repair: AutoRepair<S>,
    transitions: TransitionManager<S>,
    context: ContextSelector<S>,
    filters: FilterBuilder,
}

impl<S: PeriodStore + ?Sized> PeriodManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_options(
            store,
            Arc::new(SystemClock),
            ReadRepairPolicy::default(),
            FilterColumns::default(),
        )
    }

    pub fn with_options(
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        policy: ReadRepairPolicy,
        columns: FilterColumns,
    ) -> Self {
        Self {
            validator: ConsistencyValidator::new(store.clone()),
            resolver: ActiveResolver::new(store.clone()),
            repair: AutoRepair::new(store.clone()),
            transitions: TransitionManager::new(store.clone()),
            context: ContextSelector::new(store.clone(), clock, policy),
            filters: FilterBuilder::new(columns),
            store,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn validator(&self) -> &ConsistencyValidator<S> {
        &self.validator
    }

    pub fn resolver(&self) -> &ActiveResolver<S> {
        &self.resolver
    }

    pub fn repair(&self) -> &AutoRepair<S> {
        &self.repair
    }

    pub fn transitions(&self) -> &TransitionManager<S> {
        &self.transitions
    }

    pub fn context(&self) -> &ContextSelector<S> {
        &self.context
    }

    pub fn filters(&self) -> &FilterBuilder {
        &self.filters
    }

    /// 管理介面的診斷面板：檢查、（選擇性）修復、再檢查
    pub async fn diagnose(&self, apply_repair: bool) -> Result<DiagnosticReport> {
        let before = self.validator.validate().await?;
        if !apply_repair {
            return Ok(DiagnosticReport {
                before,
                repair: None,
                after: None,
            });
        }

        let repair = self.repair.repair().await?;
        tracing::info!("🔧 Repair pass applied {} fix(es)", repair.fixes_applied);
        let after = self.validator.validate().await?;

        Ok(DiagnosticReport {
            before,
            repair: Some(repair),
            after: Some(after),
        })
    }
}
