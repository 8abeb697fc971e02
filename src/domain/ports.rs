use crate::domain::model::{Period, PeriodId, Semester};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// 遠端學期集合的存取介面。每次呼叫都是獨立的往返，兩次寫入之間沒有交易保證。
#[async_trait]
pub trait PeriodStore: Send + Sync {
    async fn find_active(&self) -> Result<Vec<Period>>;

    async fn find_by_year(&self, year: &str) -> Result<Vec<Period>>;

    async fn find_by_id(&self, id: &PeriodId) -> Result<Option<Period>>;

    /// 依 start_date 遞增排序
    async fn find_all(&self) -> Result<Vec<Period>>;

    async fn set_active_flag(&self, id: &PeriodId, active: bool) -> Result<()>;

    async fn find_by_year_and_semester(
        &self,
        year: &str,
        semester: Semester,
    ) -> Result<Option<Period>> {
        let periods = self.find_by_year(year).await?;
        Ok(periods
            .into_iter()
            .find(|period| period.semester_number == semester))
    }
}

/// 「今天」的來源，測試時可固定日期
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub trait ConfigProvider: Send + Sync {
    fn store_endpoint(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn table_name(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
}
