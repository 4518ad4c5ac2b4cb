use super::views::PeriodSummary;

const HEADER: [&str; 10] = [
    "employee_name",
    "employee_code",
    "department",
    "review_count",
    "avg_job_performance",
    "avg_additional_achievements",
    "avg_compliance",
    "avg_teamwork",
    "avg_diligence",
    "average_score",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV export: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to finalize CSV export: {0}")]
    Flush(String),
}

/// Rendered export ready to be served or written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub body: Vec<u8>,
}

pub fn export_csv(summary: &PeriodSummary, department: Option<&str>) -> Result<CsvExport, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for entry in &summary.entries {
        let averages = entry.dimension_averages;
        writer.write_record([
            entry.employee_name.clone(),
            entry.employee_code.clone(),
            entry.department.clone(),
            entry.review_count.to_string(),
            format!("{:.2}", averages.job_performance),
            format!("{:.2}", averages.additional_achievements),
            format!("{:.2}", averages.compliance),
            format!("{:.2}", averages.teamwork),
            format!("{:.2}", averages.diligence),
            format!("{:.2}", entry.average_score),
        ])?;
    }

    let body = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.error().to_string()))?;

    Ok(CsvExport {
        file_name: export_file_name(summary, department),
        body,
    })
}

fn export_file_name(summary: &PeriodSummary, department: Option<&str>) -> String {
    let slug = department
        .map(slugify)
        .filter(|slug| !slug.is_empty())
        .unwrap_or_else(|| "all".to_string());
    format!(
        "peer-review-{}-q{}-{}.csv",
        summary.period.year, summary.period.quarter, slug
    )
}

fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify(" Research & Development "), "research-development");
        assert_eq!(slugify("QA/Ops"), "qa-ops");
    }
}
