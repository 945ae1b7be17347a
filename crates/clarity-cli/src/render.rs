//! Plain-text rendering of findings, history and trends.

use clarity_common::InterpretedFinding;

use crate::history::{HistoryEntry, TrendPoint};

pub fn findings_table(findings: &[InterpretedFinding]) -> String {
    let name_width = findings
        .iter()
        .map(|f| f.display_name.len())
        .max()
        .unwrap_or(0)
        .max("Biomarker".len());

    let mut out = format!("{:<name_width$}  {:<18}  {:<10}  {}\n", "Biomarker", "Value", "Status", "Explanation");
    for f in findings {
        let value = format!("{} {}", f.value, f.unit);
        out.push_str(&format!(
            "{:<name_width$}  {:<18}  {:<10}  {}\n",
            f.display_name,
            value.trim_end(),
            f.status.label(),
            f.explanation
        ));
    }
    out
}

pub fn history_list(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No reports in history.\n".to_string();
    }
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| format!("{:>2}. {}  {}\n", i + 1, e.date.format("%Y-%m-%d %H:%M:%S"), e.summary()))
        .collect()
}

/// Full findings table for one stored report.
pub fn history_entry(entry: &HistoryEntry) -> String {
    format!("Report from {}\n\n{}", entry.date.format("%Y-%m-%d %H:%M:%S"), findings_table(&entry.results))
}

pub fn trend_table(biomarker_key: &str, points: &[TrendPoint]) -> String {
    if points.is_empty() {
        return format!("No history recorded for '{biomarker_key}'.\n");
    }
    points
        .iter()
        .map(|p| format!("{}  {} {}  ({})\n", p.timestamp.format("%Y-%m-%d"), p.value, p.unit, p.status))
        .collect()
}
