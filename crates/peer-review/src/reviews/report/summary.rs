use super::super::domain::{Dimension, Employee, EmployeeId, ReviewPeriod};
use super::super::repository::ReviewRecord;
use super::super::scoring::round_to_hundredths;
use super::views::{DimensionAverages, PeriodSummary, SummaryEntry};
use std::cmp::Ordering;
use std::collections::HashMap;

pub const ALL_DEPARTMENTS: &str = "All departments";

#[derive(Debug, Default, Clone)]
struct ReviewTally {
    count: usize,
    final_total: f64,
    dimension_totals: [f64; 5],
}

impl ReviewTally {
    fn add(&mut self, record: &ReviewRecord) {
        self.count += 1;
        self.final_total += record.final_score.value();
        for (total, dimension) in self.dimension_totals.iter_mut().zip(Dimension::ordered()) {
            *total += record.scores.get(dimension);
        }
    }

    fn average(&self, total: f64) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        round_to_hundredths(total / self.count as f64)
    }

    fn dimension_averages(&self) -> DimensionAverages {
        let [job_performance, additional_achievements, compliance, teamwork, diligence] =
            self.dimension_totals.map(|total| self.average(total));
        DimensionAverages {
            job_performance,
            additional_achievements,
            compliance,
            teamwork,
            diligence,
        }
    }
}

/// Group submitted reviews of `period` by reviewee and average them.
///
/// Only reviewees present in `employees` are reported, so callers pass the
/// active (and optionally department-filtered) roster.
pub fn summarize(
    period: ReviewPeriod,
    department: Option<&str>,
    records: &[ReviewRecord],
    employees: &[Employee],
) -> PeriodSummary {
    let roster: HashMap<&EmployeeId, &Employee> = employees
        .iter()
        .filter(|employee| department.map_or(true, |dept| employee.department == dept))
        .map(|employee| (&employee.id, employee))
        .collect();

    let mut tallies: HashMap<&EmployeeId, ReviewTally> = HashMap::new();
    for record in records {
        if record.period != period || !record.is_submitted() {
            continue;
        }
        if !roster.contains_key(&record.reviewee) {
            continue;
        }
        tallies.entry(&record.reviewee).or_default().add(record);
    }

    let mut entries: Vec<SummaryEntry> = tallies
        .into_iter()
        .filter_map(|(reviewee, tally)| {
            roster.get(reviewee).map(|employee| SummaryEntry {
                employee_id: employee.id.clone(),
                employee_name: employee.name.clone(),
                employee_code: employee.employee_code.clone(),
                department: employee.department.clone(),
                review_count: tally.count,
                average_score: tally.average(tally.final_total),
                dimension_averages: tally.dimension_averages(),
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.average_score
            .partial_cmp(&a.average_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.employee_code.cmp(&b.employee_code))
    });

    PeriodSummary {
        period,
        department: department.unwrap_or(ALL_DEPARTMENTS).to_string(),
        count: entries.len(),
        entries,
    }
}
