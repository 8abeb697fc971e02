use crate::domain::model::{Period, PeriodId};
use crate::domain::ports::PeriodStore;
use crate::utils::error::{PeriodError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 以記憶體保存的學期集合，供測試與 `backend = "memory"` 使用
#[derive(Debug, Clone, Default)]
pub struct InMemoryPeriodStore {
    periods: Arc<RwLock<Vec<Period>>>,
}

impl InMemoryPeriodStore {
    pub fn new(periods: Vec<Period>) -> Self {
        Self {
            periods: Arc::new(RwLock::new(periods)),
        }
    }

    /// 從 JSON 陣列載入初始資料
    pub fn from_json(content: &str) -> Result<Self> {
        let periods: Vec<Period> = serde_json::from_str(content)?;
        Ok(Self::new(periods))
    }

    pub async fn from_seed_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json(&content)
    }

    pub async fn snapshot(&self) -> Vec<Period> {
        self.periods.read().await.clone()
    }

    pub async fn active_count(&self) -> usize {
        self.periods
            .read()
            .await
            .iter()
            .filter(|period| period.is_active)
            .count()
    }
}

#[async_trait]
impl PeriodStore for InMemoryPeriodStore {
    async fn find_active(&self) -> Result<Vec<Period>> {
        let periods = self.periods.read().await;
        Ok(periods.iter().filter(|p| p.is_active).cloned().collect())
    }

    async fn find_by_year(&self, year: &str) -> Result<Vec<Period>> {
        let periods = self.periods.read().await;
        Ok(periods.iter().filter(|p| p.year == year).cloned().collect())
    }

    async fn find_by_id(&self, id: &PeriodId) -> Result<Option<Period>> {
        let periods = self.periods.read().await;
        Ok(periods.iter().find(|p| &p.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Period>> {
        let mut periods = self.periods.read().await.clone();
        periods.sort_by_key(|p| p.start_date);
        Ok(periods)
    }

    async fn set_active_flag(&self, id: &PeriodId, active: bool) -> Result<()> {
        let mut periods = self.periods.write().await;
        let period = periods
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| PeriodError::store(format!("period {} does not exist", id)))?;
        period.is_active = active;
        Ok(())
    }
}
