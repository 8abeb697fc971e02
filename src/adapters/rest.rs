use crate::core::filter::QueryFilter;
use crate::domain::model::{Period, PeriodId, Semester};
use crate::domain::ports::{ConfigProvider, PeriodStore};
use crate::utils::error::{PeriodError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;

/// PostgREST 風格的遠端學期資料表。
///
/// 每個方法都是一次獨立的 HTTP 往返；失敗不重試，直接回傳給呼叫端。
pub struct RestPeriodStore {
    client: Client,
    table_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RowId {
    Text(String),
    Number(i64),
}

#[derive(Debug, Deserialize)]
struct PeriodRow {
    id: RowId,
    year: String,
    semester: i64,
    is_active: bool,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl TryFrom<PeriodRow> for Period {
    type Error = PeriodError;

    fn try_from(row: PeriodRow) -> Result<Self> {
        let id = match row.id {
            RowId::Text(text) => text,
            RowId::Number(number) => number.to_string(),
        };
        let semester = u8::try_from(row.semester)
            .map_err(|_| format!("semester must be 1 or 2, got {}", row.semester))
            .and_then(Semester::try_from)
            .map_err(|reason| PeriodError::MalformedRecord {
                id: id.clone(),
                reason,
            })?;

        Ok(Period {
            id: PeriodId::new(id),
            year: row.year,
            semester_number: semester,
            is_active: row.is_active,
            start_date: row.start_date,
            end_date: row.end_date,
        })
    }
}

impl RestPeriodStore {
    pub fn new(
        endpoint: &str,
        table: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            table_url: format!("{}/rest/v1/{}", endpoint.trim_end_matches('/'), table),
            api_key,
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(
            config.store_endpoint(),
            config.table_name(),
            config.api_key().map(str::to_string),
            Duration::from_secs(config.timeout_seconds()),
        )
    }

    pub fn table_url(&self) -> &str {
        &self.table_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    async fn select(&self, filter: QueryFilter, ordered: bool) -> Result<Vec<Period>> {
        let mut query = vec![("select".to_string(), "*".to_string())];
        query.extend(filter.to_query_pairs());
        if ordered {
            query.push(("order".to_string(), "start_date.asc".to_string()));
        }

        tracing::debug!("GET {} {:?}", self.table_url, query);
        let response = self
            .authorize(self.client.get(&self.table_url).query(&query))
            .send()
            .await?
            .error_for_status()?;

        let rows: Vec<PeriodRow> = response.json().await?;
        rows.into_iter().map(Period::try_from).collect()
    }
}

#[async_trait]
impl PeriodStore for RestPeriodStore {
    async fn find_active(&self) -> Result<Vec<Period>> {
        self.select(QueryFilter::new().eq("is_active", true), false)
            .await
    }

    async fn find_by_year(&self, year: &str) -> Result<Vec<Period>> {
        self.select(QueryFilter::new().eq("year", year), false).await
    }

    async fn find_by_id(&self, id: &PeriodId) -> Result<Option<Period>> {
        let periods = self
            .select(QueryFilter::new().eq("id", id.as_str()), false)
            .await?;
        Ok(periods.into_iter().next())
    }

    async fn find_all(&self) -> Result<Vec<Period>> {
        self.select(QueryFilter::new(), true).await
    }

    async fn set_active_flag(&self, id: &PeriodId, active: bool) -> Result<()> {
        let query = QueryFilter::new().eq("id", id.as_str()).to_query_pairs();

        tracing::debug!("PATCH {} {:?} is_active={}", self.table_url, query, active);
        self.authorize(self.client.patch(&self.table_url).query(&query))
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({ "is_active": active }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
