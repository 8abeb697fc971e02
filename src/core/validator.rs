use crate::domain::model::{
    ConsistencyIssue, ConsistencyReport, ConsistencyWarning, IssueKind, IssueSeverity, Period,
    PeriodId, WarningKind,
};
use crate::domain::ports::PeriodStore;
use crate::utils::error::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// 唯讀掃描所有學期並回報不變量違規；永不寫入
pub struct ConsistencyValidator<S: PeriodStore + ?Sized> {
    store: Arc<S>,
}

impl<S: PeriodStore + ?Sized> ConsistencyValidator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn validate(&self) -> Result<ConsistencyReport> {
        let actives = self.store.find_active().await?;
        let mut all = self.store.find_all().await?;
        all.sort_by_key(|p| p.start_date);

        let issues = active_issues(&actives);
        let mut warnings = Vec::new();
        warnings.extend(date_range_warnings(&all));
        warnings.extend(overlap_warnings(&all));
        warnings.extend(year_warnings(&all));

        let report = ConsistencyReport {
            is_healthy: issues.is_empty(),
            issues,
            warnings,
        };

        if report.is_healthy {
            tracing::debug!(
                "Consistency check passed ({} periods, {} warnings)",
                all.len(),
                report.warnings.len()
            );
        } else {
            tracing::warn!(
                "⚠️ Consistency check found {} critical issue(s)",
                report.issues.len()
            );
        }

        Ok(report)
    }
}

fn ids(periods: &[&Period]) -> Vec<PeriodId> {
    periods.iter().map(|p| p.id.clone()).collect()
}

fn active_issues(actives: &[Period]) -> Vec<ConsistencyIssue> {
    match actives.len() {
        0 => vec![ConsistencyIssue {
            kind: IssueKind::NoActive,
            severity: IssueSeverity::Critical,
            message: "No period is marked active".to_string(),
            period_ids: Vec::new(),
        }],
        1 => Vec::new(),
        n => {
            let labels: Vec<String> = actives.iter().map(Period::label).collect();
            vec![ConsistencyIssue {
                kind: IssueKind::MultipleActive,
                severity: IssueSeverity::Critical,
                message: format!("{} periods are marked active: {}", n, labels.join(", ")),
                period_ids: actives.iter().map(|p| p.id.clone()).collect(),
            }]
        }
    }
}

fn date_range_warnings(sorted: &[Period]) -> Vec<ConsistencyWarning> {
    sorted
        .iter()
        .filter(|p| p.start_date > p.end_date)
        .map(|p| ConsistencyWarning {
            kind: WarningKind::InvalidDateRange,
            message: format!(
                "{} starts on {} after it ends on {}",
                p.label(),
                p.start_date,
                p.end_date
            ),
            period_ids: vec![p.id.clone()],
        })
        .collect()
}

/// 只比較依 start_date 排序後相鄰的兩筆
fn overlap_warnings(sorted: &[Period]) -> Vec<ConsistencyWarning> {
    sorted
        .windows(2)
        .filter(|pair| pair[0].end_date > pair[1].start_date)
        .map(|pair| {
            let (prev, next) = (&pair[0], &pair[1]);
            ConsistencyWarning {
                kind: WarningKind::DateOverlap,
                message: format!(
                    "{} ends on {} after {} starts on {}",
                    prev.label(),
                    prev.end_date,
                    next.label(),
                    next.start_date
                ),
                period_ids: ids(&[prev, next]),
            }
        })
        .collect()
}

fn year_warnings(periods: &[Period]) -> Vec<ConsistencyWarning> {
    let mut by_year: BTreeMap<&str, Vec<&Period>> = BTreeMap::new();
    for period in periods {
        by_year.entry(period.year.as_str()).or_default().push(period);
    }

    let mut warnings = Vec::new();
    for (year, members) in by_year {
        let semesters: BTreeSet<_> = members.iter().map(|p| p.semester_number).collect();

        if semesters.len() < 2 {
            warnings.push(ConsistencyWarning {
                kind: WarningKind::IncompleteYear,
                message: format!(
                    "Year {} has {} of 2 semesters configured",
                    year,
                    semesters.len()
                ),
                period_ids: ids(&members),
            });
        }

        for semester in &semesters {
            let duplicates: Vec<&Period> = members
                .iter()
                .copied()
                .filter(|p| p.semester_number == *semester)
                .collect();
            if duplicates.len() > 1 {
                warnings.push(ConsistencyWarning {
                    kind: WarningKind::DuplicateSemester,
                    message: format!(
                        "Year {} semester {} is defined {} times",
                        year,
                        semester,
                        duplicates.len()
                    ),
                    period_ids: ids(&duplicates),
                });
            }
        }
    }
    warnings
}
