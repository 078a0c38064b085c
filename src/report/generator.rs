use crate::domain::{DateLabel, HistoryArchive, Task};
use crate::persistence::atomic_write;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Default report location: `<dir>/report-YYYY-MM-DD.md`
pub fn default_report_path(dir: &Path, today: NaiveDate) -> PathBuf {
    dir.join(format!("report-{}.md", today.format("%Y-%m-%d")))
}

fn render_task(task: &Task) -> String {
    match task.completed_at {
        Some(done_at) => format!("- [x] {} (completed {})\n", task.text, done_at.format("%H:%M")),
        None => format!("- [x] {}\n", task.text),
    }
}

/// Render the history as Markdown, either every day or just `date`
pub fn render_report(history: &HistoryArchive, date: Option<&DateLabel>) -> Result<String> {
    let dates = match date {
        Some(date) => {
            if !history.contains(date) {
                anyhow::bail!("No history for {}", date);
            }
            vec![date.clone()]
        }
        None => history.sorted_dates(),
    };

    let total: usize = dates
        .iter()
        .filter_map(|d| history.get(d))
        .map(<[Task]>::len)
        .sum();

    let mut report = String::new();
    match date {
        Some(date) => report.push_str(&format!("# Daily Report - {}\n\n", date)),
        None => report.push_str("# History Report\n\n"),
    }

    report.push_str("## Summary\n\n");
    report.push_str(&format!("- **Days:** {}\n", dates.len()));
    report.push_str(&format!("- **Completed Tasks:** {}\n\n", total));

    for day in &dates {
        let tasks = history.get(day).unwrap_or_default();
        report.push_str(&format!("## {}\n\n", day));
        for task in tasks {
            report.push_str(&render_task(task));
        }
        report.push('\n');
    }

    Ok(report)
}

/// Write the report to `output`, returning the path written
pub fn generate_report(
    history: &HistoryArchive,
    date: Option<&DateLabel>,
    output: &Path,
) -> Result<PathBuf> {
    let report = render_report(history, date)?;
    atomic_write(output, &report)
        .with_context(|| format!("Failed to write report: {}", output.display()))?;
    Ok(output.to_path_buf())
}
