//! Query scoping predicates for downstream reads.
//!
//! Building a filter never touches the store. The resulting [`QueryFilter`] can be
//! rendered to PostgREST query pairs or evaluated in-process against a [`Record`].

use crate::domain::model::{Period, PeriodContext, PeriodId, Record, Semester};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    Eq { column: String, value: Value },
    In { column: String, values: Vec<Value> },
}

impl Predicate {
    pub fn column(&self) -> &str {
        match self {
            Predicate::Eq { column, .. } | Predicate::In { column, .. } => column,
        }
    }

    fn render(&self) -> (String, String) {
        match self {
            Predicate::Eq { column, value } => (column.clone(), format!("eq.{}", scalar(value))),
            Predicate::In { column, values } => {
                let list: Vec<String> = values.iter().map(|v| quote_list_item(&scalar(v))).collect();
                (column.clone(), format!("in.({})", list.join(",")))
            }
        }
    }

    /// 以文字形式比較，與 PostgREST 的行為一致（1 與 "1" 視為相等）
    fn matches(&self, record: &Record) -> bool {
        let Some(actual) = record.data.get(self.column()) else {
            return false;
        };
        let actual = scalar(actual);
        match self {
            Predicate::Eq { value, .. } => actual == scalar(value),
            Predicate::In { values, .. } => values.iter().any(|v| actual == scalar(v)),
        }
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn quote_list_item(item: &str) -> String {
    if item
        .chars()
        .any(|c| matches!(c, ',' | '(' | ')' | '"' | '\\') || c.is_whitespace())
    {
        format!("\"{}\"", item.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        item.to_string()
    }
}

/// 多個條件以 AND 結合
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryFilter {
    predicates: Vec<Predicate>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Eq {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn is_in<V: Into<Value>>(mut self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.predicates.push(Predicate::In {
            column: column.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.predicates.iter().map(Predicate::render).collect()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }

    pub fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

/// 下游資料表中承載學期資訊的欄位名稱
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterColumns {
    pub period_id: String,
    pub year: String,
    pub semester: String,
}

impl Default for FilterColumns {
    fn default() -> Self {
        Self {
            period_id: "period_id".to_string(),
            year: "year".to_string(),
            semester: "semester".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// 以學期 id 比對，唯一在不變量下保證一致的模式
    Strict,
    /// 只有 year / semester 兩個舊欄位的資料表
    Legacy,
}

#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    columns: FilterColumns,
}

impl FilterBuilder {
    pub fn new(columns: FilterColumns) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &FilterColumns {
        &self.columns
    }

    pub fn by_period_id(&self, id: &PeriodId) -> QueryFilter {
        QueryFilter::new().eq(&self.columns.period_id, id.as_str())
    }

    pub fn by_year_and_semester_number(&self, year: &str, semester: Semester) -> QueryFilter {
        QueryFilter::new()
            .eq(&self.columns.year, year)
            .eq(&self.columns.semester, semester.number())
    }

    pub fn by_year_all_periods(&self, periods: &[Period]) -> QueryFilter {
        QueryFilter::new().is_in(
            &self.columns.period_id,
            periods.iter().map(|p| p.id.as_str()),
        )
    }

    /// 日曆後備的情境沒有學期 id，嚴格模式下回傳 None
    pub fn for_context(&self, context: &PeriodContext, mode: FilterMode) -> Option<QueryFilter> {
        match mode {
            FilterMode::Strict => context.period_id.as_ref().map(|id| self.by_period_id(id)),
            FilterMode::Legacy => Some(
                self.by_year_and_semester_number(&context.year, context.semester_number),
            ),
        }
    }
}
