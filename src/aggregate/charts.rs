use futures_util::future::join;
use serde::{Deserialize, Serialize};

use crate::api::{decode, SharedBackend};
use crate::logging::log_fetch_failed;
use crate::model::{opt_text, text};

pub const TASK_PROGRESS_PATH: &str = "task/task_details/boq_items/work_program";
pub const PROGRESS_BY_DATE_PATH: &str = "daily_progress_monitoring/progress_by_date";

const LABEL_MAX: usize = 20;

/// Planned against actual completion of one task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskProgressRow {
    #[serde(deserialize_with = "text")]
    pub task_name: String,
    #[serde(deserialize_with = "opt_text")]
    pub planned_progress: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub actual_progress: Option<String>,
}

/// Summed daily progress for one date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateProgressRow {
    #[serde(deserialize_with = "text")]
    pub date: String,
    #[serde(deserialize_with = "opt_text")]
    pub total_progress: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: &'static str,
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartOptions {
    pub begin_at_zero: bool,
    pub step_size: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self { begin_at_zero: true, step_size: 10.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
}

/// Chart-ready series: one label per point, one dataset per series.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: &'static str,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub options: ChartOptions,
}

impl Chart {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Highest value across datasets, rounded up to the next axis step.
    pub fn axis_max(&self) -> f64 {
        let max = self
            .datasets
            .iter()
            .flat_map(|d| d.data.iter().copied())
            .fold(0.0_f64, f64::max);
        let step = self.options.step_size.max(1.0);
        ((max / step).ceil() * step).max(step)
    }
}

fn number(v: &Option<String>) -> f64 {
    v.as_deref().and_then(|s| s.trim().parse().ok()).unwrap_or(0.0)
}

/// Task names longer than 20 characters are cut and marked with `...`.
pub fn short_label(name: &str) -> String {
    if name.chars().count() > LABEL_MAX {
        let cut: String = name.chars().take(LABEL_MAX).collect();
        format!("{}...", cut)
    } else {
        name.to_string()
    }
}

pub fn task_progress_chart(rows: &[TaskProgressRow]) -> Chart {
    Chart {
        title: "Task Progress",
        kind: ChartKind::Bar,
        labels: rows.iter().map(|r| short_label(&r.task_name)).collect(),
        datasets: vec![
            Dataset { label: "Planned (%)", data: rows.iter().map(|r| number(&r.planned_progress)).collect() },
            Dataset { label: "Actual (%)", data: rows.iter().map(|r| number(&r.actual_progress)).collect() },
        ],
        options: ChartOptions::default(),
    }
}

pub fn daily_progress_chart(rows: &[DateProgressRow]) -> Chart {
    Chart {
        title: "Daily Progress",
        kind: ChartKind::Line,
        labels: rows.iter().map(|r| r.date.clone()).collect(),
        datasets: vec![Dataset {
            label: "Total Daily Progress (%)",
            data: rows.iter().map(|r| number(&r.total_progress)).collect(),
        }],
        options: ChartOptions::default(),
    }
}

/// Both dashboard charts. A chart whose series failed to load is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressCharts {
    pub tasks: Chart,
    pub daily: Chart,
}

impl ProgressCharts {
    /// Fetch both series concurrently; neither blocks the other.
    pub async fn load(backend: &SharedBackend) -> Self {
        let (tasks, daily) = join(backend.get(TASK_PROGRESS_PATH), backend.get(PROGRESS_BY_DATE_PATH)).await;

        let task_rows: Vec<TaskProgressRow> = match tasks.and_then(|v| decode(TASK_PROGRESS_PATH, v)) {
            Ok(rows) => rows,
            Err(e) => {
                log_fetch_failed(TASK_PROGRESS_PATH, &e);
                Vec::new()
            }
        };
        let date_rows: Vec<DateProgressRow> = match daily.and_then(|v| decode(PROGRESS_BY_DATE_PATH, v)) {
            Ok(rows) => rows,
            Err(e) => {
                log_fetch_failed(PROGRESS_BY_DATE_PATH, &e);
                Vec::new()
            }
        };

        Self {
            tasks: task_progress_chart(&task_rows),
            daily: daily_progress_chart(&date_rows),
        }
    }
}

/// Horizontal text bars, one line per label and dataset.
pub fn render_text(chart: &Chart, width: usize) -> String {
    let mut out = format!("{}\n", chart.title);
    if chart.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }
    let label_w = chart.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let series_w = chart.datasets.iter().map(|d| d.label.len()).max().unwrap_or(0);
    let axis = chart.axis_max();
    for (i, label) in chart.labels.iter().enumerate() {
        for d in &chart.datasets {
            let v = d.data.get(i).copied().unwrap_or(0.0);
            let filled = ((v.max(0.0) / axis) * width as f64).round() as usize;
            out.push_str(&format!(
                "  {:<lw$}  {:<sw$}  {:<w$} {}\n",
                label,
                d.label,
                "#".repeat(filled.min(width)),
                v,
                lw = label_w,
                sw = series_w,
                w = width
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryBackend;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn long_task_names_are_cut() {
        assert_eq!(short_label("Excavate footing"), "Excavate footing");
        assert_eq!(short_label("Install reinforcement for slab"), "Install reinforcemen...");
    }

    #[test]
    fn missing_values_plot_as_zero() {
        let rows: Vec<TaskProgressRow> = serde_json::from_value(json!([
            {"task_name": "Pour slab", "planned_progress": "60", "actual_progress": null},
            {"task_name": "Formwork", "planned_progress": 25.5, "actual_progress": 10}
        ]))
        .unwrap();
        let chart = task_progress_chart(&rows);
        assert_eq!(chart.datasets[0].data, vec![60.0, 25.5]);
        assert_eq!(chart.datasets[1].data, vec![0.0, 10.0]);
        assert_eq!(chart.axis_max(), 60.0);
    }

    #[tokio::test]
    async fn failed_series_leaves_only_its_chart_empty() {
        let mem = Arc::new(
            MemoryBackend::new()
                .with_route(TASK_PROGRESS_PATH, json!([{"task_name": "Formwork", "planned_progress": 50, "actual_progress": 30}]))
                .with_route(PROGRESS_BY_DATE_PATH, json!([{"date": "2025-01-10", "total_progress": 12}])),
        );
        mem.fail_next("GET", PROGRESS_BY_DATE_PATH, "Network Error");
        let backend: SharedBackend = mem;
        let charts = ProgressCharts::load(&backend).await;
        assert_eq!(charts.tasks.labels, vec!["Formwork"]);
        assert!(charts.daily.is_empty());
        assert!(render_text(&charts.daily, 20).contains("(no data)"));
    }

    #[test]
    fn text_bars_scale_to_axis() {
        let chart = daily_progress_chart(&[
            DateProgressRow { date: "2025-01-10".into(), total_progress: Some("10".into()) },
            DateProgressRow { date: "2025-01-11".into(), total_progress: Some("20".into()) },
        ]);
        let out = render_text(&chart, 10);
        assert!(out.contains("##########"));
        assert!(out.lines().nth(1).unwrap().contains("#####"));
    }
}
