use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 學期紀錄的不透明識別碼
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodId(String);

impl PeriodId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeriodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeriodId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PeriodId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Semester {
    First,
    Second,
}

impl Semester {
    pub fn number(self) -> u8 {
        match self {
            Semester::First => 1,
            Semester::Second => 2,
        }
    }
}

impl TryFrom<u8> for Semester {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Semester::First),
            2 => Ok(Semester::Second),
            other => Err(format!("semester must be 1 or 2, got {}", other)),
        }
    }
}

impl From<Semester> for u8 {
    fn from(value: Semester) -> Self {
        value.number()
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// 一個學年 + 學期，附帶啟用旗標與有效日期區間
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub id: PeriodId,
    pub year: String,
    pub semester_number: Semester,
    pub is_active: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Period {
    pub fn new(
        id: impl Into<PeriodId>,
        year: impl Into<String>,
        semester_number: Semester,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            year: year.into(),
            semester_number,
            is_active: false,
            start_date,
            end_date,
        }
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// 日期是否落在 [start_date, end_date] 之內（含端點）
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn label(&self) -> String {
        format!("{} semester {}", self.year, self.semester_number)
    }
}

/// 呼叫端意圖：檢視歷史資料或寫入新資料
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    View { selected: Option<PeriodId> },
    Input,
}

impl Intent {
    pub fn view() -> Self {
        Intent::View { selected: None }
    }

    pub fn view_period(id: impl Into<PeriodId>) -> Self {
        Intent::View {
            selected: Some(id.into()),
        }
    }
}

/// 結構化結果代碼，呼叫端依此分支而非捕捉錯誤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeCode {
    NoActivePeriod,
    NoActiveYear,
    MultipleActivePeriod,
    PeriodNotFound,
    TransitionTargetMissing,
    TransitionPartialFailure,
    SemesterNotFound,
    SemesterNotActive,
    SemesterNotStarted,
    SemesterEnded,
}

impl fmt::Display for OutcomeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    MultipleActive,
    NoActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningKind {
    DateOverlap,
    IncompleteYear,
    DuplicateSemester,
    InvalidDateRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyIssue {
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    pub message: String,
    pub period_ids: Vec<PeriodId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyWarning {
    pub kind: WarningKind,
    pub message: String,
    pub period_ids: Vec<PeriodId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyReport {
    pub is_healthy: bool,
    pub issues: Vec<ConsistencyIssue>,
    pub warnings: Vec<ConsistencyWarning>,
}

impl ConsistencyReport {
    pub fn has_issue(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|issue| issue.kind == kind)
    }

    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|warning| warning.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairFix {
    pub period_id: PeriodId,
    pub label: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairOutcome {
    pub fixes_applied: usize,
    pub fixes: Vec<RepairFix>,
    pub kept: Option<Period>,
}

impl RepairOutcome {
    pub fn noop(kept: Option<Period>) -> Self {
        Self {
            fixes_applied: 0,
            fixes: Vec::new(),
            kept,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOutcome {
    pub success: bool,
    pub message: String,
    pub code: Option<OutcomeCode>,
    pub data: Option<Period>,
    pub previous_active: Option<Period>,
    pub archive_recommendation: Option<String>,
    pub suggestion: Option<String>,
}

impl TransitionOutcome {
    pub fn succeeded(message: impl Into<String>, data: Period, previous_active: Option<Period>) -> Self {
        Self {
            success: true,
            message: message.into(),
            code: None,
            data: Some(data),
            previous_active,
            archive_recommendation: None,
            suggestion: None,
        }
    }

    pub fn failed(code: OutcomeCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            code: Some(code),
            data: None,
            previous_active: None,
            archive_recommendation: None,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextSource {
    Active,
    UserSelected,
    CalendarFallback,
}

/// 一次讀寫操作應使用的學期範圍
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodContext {
    /// 日曆推算的後備值沒有對應的學期紀錄
    pub period_id: Option<PeriodId>,
    pub semester_number: Semester,
    pub year: String,
    pub can_input: bool,
    pub can_view: bool,
    pub source: ContextSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputValidation {
    pub valid: bool,
    pub message: String,
    pub code: Option<OutcomeCode>,
}

impl InputValidation {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            valid: true,
            message: message.into(),
            code: None,
        }
    }

    pub fn rejected(code: OutcomeCode, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
            code: Some(code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub before: ConsistencyReport,
    pub repair: Option<RepairOutcome>,
    pub after: Option<ConsistencyReport>,
}

/// 下游資料列（成績、出缺席等），用於在行程內套用篩選條件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}
