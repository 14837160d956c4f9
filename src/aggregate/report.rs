//! Project progress report: server-joined rows, filtered locally.
//!
//! Filters never touch the fetched rows. The visible set is re-derived from
//! the last fetch whenever the search text or a date bound changes, so
//! clearing every filter gives back exactly what was fetched.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::api::{decode, HttpBackend, SharedBackend};
use crate::export::pdf::{write_pdf, TableDocument};
use crate::logging::{log, log_fetch_failed, obj, v_num, v_str, Domain, Level};
use crate::model::{opt_text, text};
use crate::state::Config;
use crate::view::Table;

pub const REPORT_PATH: &str = "report";
pub const REPORT_TITLE: &str = "Project Progress Report";
pub const HEADERS: [&str; 6] = ["Project", "Work", "Task", "Planned (%)", "Actual (%)", "Date"];
pub const NO_DATA: &str = "No data available";
pub const LOADING: &str = "Loading...";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportRow {
    #[serde(deserialize_with = "text")]
    pub project_name: String,
    #[serde(deserialize_with = "text")]
    pub work_name: String,
    #[serde(deserialize_with = "text")]
    pub task_name: String,
    #[serde(deserialize_with = "opt_text")]
    pub percentage: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub actual_progress: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub date: Option<String>,
}

impl ReportRow {
    /// Calendar date of the row, from the leading `YYYY-MM-DD`.
    pub fn day(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_day)
    }

    pub fn cells(&self) -> Vec<String> {
        vec![
            self.project_name.clone(),
            self.work_name.clone(),
            self.task_name.clone(),
            or_zero(&self.percentage),
            or_zero(&self.actual_progress),
            match (self.day(), self.date.as_deref()) {
                (Some(d), _) => short_date(d),
                (None, Some(raw)) if !raw.trim().is_empty() => raw.to_string(),
                _ => "N/A".to_string(),
            },
        ]
    }
}

fn or_zero(v: &Option<String>) -> String {
    match v.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => "0".to_string(),
    }
}

fn value(v: &Option<String>) -> f64 {
    v.as_deref().and_then(|s| s.trim().parse().ok()).unwrap_or(0.0)
}

fn parse_day(s: &str) -> Option<NaiveDate> {
    let head = s.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Short numeric date, month first: `1/10/2025`.
pub fn short_date(d: NaiveDate) -> String {
    d.format("%-m/%-d/%Y").to_string()
}

/// Mean planned and actual percentage of a row set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Averages {
    pub planned: f64,
    pub actual: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Csv,
    Excel,
}

impl ExportKind {
    pub fn path(&self) -> &'static str {
        match self {
            ExportKind::Csv => "progress/csv",
            ExportKind::Excel => "progress/excel",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ExportKind::Csv => "progress_report.csv",
            ExportKind::Excel => "progress_report.xlsx",
        }
    }
}

/// Download location of a server-generated report.
pub fn export_url(cfg: &Config, kind: ExportKind) -> Result<Url> {
    cfg.reports_url(kind.path())
}

/// Save a server-generated report to `dest`, returning the byte count.
pub async fn download(http: &HttpBackend, kind: ExportKind, dest: &Path) -> Result<u64> {
    let url = export_url(http.config(), kind)?;
    let bytes = http.download(url.clone(), dest).await?;
    log(
        Level::Info,
        Domain::Export,
        "download",
        obj(&[
            ("url", v_str(url.as_str())),
            ("path", v_str(&dest.display().to_string())),
            ("bytes", v_num(bytes as f64)),
        ]),
    );
    Ok(bytes)
}

pub async fn fetch(backend: &SharedBackend) -> Result<Vec<ReportRow>> {
    decode(REPORT_PATH, backend.get(REPORT_PATH).await?)
}

pub struct ReportView {
    rows: Vec<ReportRow>,
    filtered: Vec<ReportRow>,
    search: String,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    loading: bool,
}

impl Default for ReportView {
    fn default() -> Self {
        Self::from_rows(Vec::new())
    }
}

impl ReportView {
    pub fn from_rows(rows: Vec<ReportRow>) -> Self {
        let mut view = Self {
            filtered: rows.clone(),
            rows,
            search: String::new(),
            start: None,
            end: None,
            loading: false,
        };
        view.recompute();
        view
    }

    /// Fetch and install the report rows.
    pub async fn load(&mut self, backend: &SharedBackend) {
        self.begin_load();
        let res = fetch(backend).await;
        self.apply(res);
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// Install a fetch result. A failure is logged and keeps the rows held so far.
    pub fn apply(&mut self, res: Result<Vec<ReportRow>>) {
        self.loading = false;
        match res {
            Ok(rows) => self.rows = rows,
            Err(e) => log_fetch_failed(REPORT_PATH, &e),
        }
        self.recompute();
    }

    /// Text shown in place of an empty table.
    pub fn empty_message(&self) -> &'static str {
        if self.loading {
            LOADING
        } else {
            NO_DATA
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn filtered(&self) -> &[ReportRow] {
        &self.filtered
    }

    pub fn set_search(&mut self, q: &str) {
        self.search = q.to_string();
        self.recompute();
    }

    /// Inclusive lower bound; empty text clears it.
    pub fn set_start(&mut self, date: &str) -> Result<()> {
        self.start = parse_bound(date)?;
        self.recompute();
        Ok(())
    }

    /// Inclusive upper bound; empty text clears it.
    pub fn set_end(&mut self, date: &str) -> Result<()> {
        self.end = parse_bound(date)?;
        self.recompute();
        Ok(())
    }

    pub fn clear_filters(&mut self) {
        self.search.clear();
        self.start = None;
        self.end = None;
        self.recompute();
    }

    fn matches(&self, row: &ReportRow, q: &str) -> bool {
        if !q.is_empty() && !row.task_name.to_lowercase().contains(q) {
            return false;
        }
        if self.start.is_none() && self.end.is_none() {
            return true;
        }
        match row.day() {
            Some(d) => self.start.map_or(true, |s| d >= s) && self.end.map_or(true, |e| d <= e),
            None => false,
        }
    }

    fn recompute(&mut self) {
        let q = self.search.to_lowercase();
        self.filtered = self.rows.iter().filter(|r| self.matches(r, &q)).cloned().collect();
        log(
            Level::Debug,
            Domain::Report,
            "filter",
            obj(&[
                ("search", v_str(&self.search)),
                ("start", self.start.map(|d| v_str(&d.to_string())).unwrap_or_default()),
                ("end", self.end.map(|d| v_str(&d.to_string())).unwrap_or_default()),
                ("rows", v_num(self.rows.len() as f64)),
                ("visible", v_num(self.filtered.len() as f64)),
            ]),
        );
    }

    /// Averages over the visible rows; missing values count as 0.
    pub fn averages(&self) -> Option<Averages> {
        if self.filtered.is_empty() {
            return None;
        }
        let n = self.filtered.len() as f64;
        Some(Averages {
            planned: self.filtered.iter().map(|r| value(&r.percentage)).sum::<f64>() / n,
            actual: self.filtered.iter().map(|r| value(&r.actual_progress)).sum::<f64>() / n,
        })
    }

    pub fn table(&self) -> Table {
        let mut t = Table::new(&HEADERS);
        for row in &self.filtered {
            t.push(row.cells());
        }
        t.footer = self.averages().map(|a| {
            vec![
                "Average".to_string(),
                String::new(),
                String::new(),
                format!("{:.2}", a.planned),
                format!("{:.2}", a.actual),
                String::new(),
            ]
        });
        t
    }

    /// Snapshot of the visible rows as a PDF table.
    pub fn export_pdf(&self, path: &Path) -> Result<()> {
        let doc = TableDocument {
            title: REPORT_TITLE.to_string(),
            head: HEADERS.iter().map(|h| h.to_string()).collect(),
            body: self.filtered.iter().map(ReportRow::cells).collect(),
        };
        write_pdf(&doc, path)?;
        log(
            Level::Info,
            Domain::Export,
            "pdf",
            obj(&[
                ("path", v_str(&path.display().to_string())),
                ("rows", v_num(doc.body.len() as f64)),
            ]),
        );
        Ok(())
    }
}

fn parse_bound(date: &str) -> Result<Option<NaiveDate>> {
    let d = date.trim();
    if d.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(d, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| anyhow!("invalid date {:?}, expected YYYY-MM-DD", date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryBackend;
    use serde_json::json;
    use std::sync::Arc;

    fn sample() -> Vec<ReportRow> {
        serde_json::from_value(json!([
            {"project_name": "Depot", "work_name": "Substructure", "task_name": "Excavate footing",
             "percentage": "40", "actual_progress": "35", "date": "2025-01-10"},
            {"project_name": "Depot", "work_name": "Superstructure", "task_name": "Pour slab",
             "percentage": null, "actual_progress": null, "date": "2025-01-12"}
        ]))
        .unwrap()
    }

    #[test]
    fn missing_values_display_zero() {
        let view = ReportView::from_rows(sample());
        let t = view.table();
        assert_eq!(t.rows[1][3], "0");
        assert_eq!(t.rows[1][4], "0");
        assert_eq!(t.rows[0][5], "1/10/2025");
    }

    #[test]
    fn search_is_case_insensitive() {
        let mut view = ReportView::from_rows(sample());
        view.set_search("excav");
        assert_eq!(view.filtered().len(), 1);
        assert_eq!(view.filtered()[0].task_name, "Excavate footing");
        view.set_search("SLAB");
        assert_eq!(view.filtered()[0].task_name, "Pour slab");
    }

    #[test]
    fn start_date_is_inclusive_lower_bound() {
        let mut view = ReportView::from_rows(sample());
        view.set_start("2025-01-11").unwrap();
        assert_eq!(view.filtered().len(), 1);
        assert_eq!(view.filtered()[0].task_name, "Pour slab");
        view.set_start("2025-01-10").unwrap();
        assert_eq!(view.filtered().len(), 2);
    }

    #[test]
    fn end_date_is_inclusive_upper_bound() {
        let mut view = ReportView::from_rows(sample());
        view.set_end("2025-01-10").unwrap();
        assert_eq!(view.filtered().len(), 1);
        assert_eq!(view.filtered()[0].task_name, "Excavate footing");
    }

    #[test]
    fn filters_intersect_and_clear() {
        let mut view = ReportView::from_rows(sample());
        view.set_search("excav");
        view.set_start("2025-01-11").unwrap();
        assert!(view.filtered().is_empty());
        assert!(view.table().render(NO_DATA).contains(NO_DATA));
        view.clear_filters();
        assert_eq!(view.filtered(), view.rows());
    }

    #[test]
    fn undated_rows_drop_out_only_under_a_date_bound() {
        let mut rows = sample();
        rows.push(ReportRow { task_name: "Survey".into(), ..Default::default() });
        let mut view = ReportView::from_rows(rows);
        assert_eq!(view.filtered().len(), 3);
        assert_eq!(view.table().rows[2][5], "N/A");
        view.set_end("2030-01-01").unwrap();
        assert_eq!(view.filtered().len(), 2);
    }

    #[test]
    fn timestamp_dates_use_their_day() {
        let view = ReportView::from_rows(vec![ReportRow {
            date: Some("2025-01-10T00:00:00.000Z".into()),
            ..Default::default()
        }]);
        assert_eq!(view.filtered()[0].day(), NaiveDate::from_ymd_opt(2025, 1, 10));
    }

    #[test]
    fn bad_bound_is_rejected_and_kept() {
        let mut view = ReportView::from_rows(sample());
        view.set_start("2025-01-11").unwrap();
        assert!(view.set_start("11/01/2025").is_err());
        assert_eq!(view.filtered().len(), 1);
    }

    #[test]
    fn averages_footer_follows_filter() {
        let mut view = ReportView::from_rows(sample());
        let a = view.averages().unwrap();
        assert_eq!(a.planned, 20.0);
        assert_eq!(a.actual, 17.5);
        assert_eq!(view.table().footer.unwrap()[4], "17.50");
        view.set_search("nothing");
        assert!(view.averages().is_none());
        assert!(view.table().footer.is_none());
    }

    #[test]
    fn export_urls() {
        let cfg = Config::default();
        assert_eq!(
            export_url(&cfg, ExportKind::Csv).unwrap().as_str(),
            "http://localhost:3000/api/reports/progress/csv"
        );
        assert!(export_url(&cfg, ExportKind::Excel).unwrap().as_str().ends_with("/progress/excel"));
    }

    #[tokio::test]
    async fn loading_flag_spans_the_fetch() {
        let backend: SharedBackend = Arc::new(MemoryBackend::new().with_route(
            REPORT_PATH,
            json!([{"task_name": "Pour slab", "date": "2025-01-12"}]),
        ));
        let mut view = ReportView::default();
        assert!(!view.is_loading());
        view.begin_load();
        assert!(view.is_loading());
        assert_eq!(view.empty_message(), LOADING);
        assert!(view.table().render(view.empty_message()).contains("Loading..."));

        view.apply(fetch(&backend).await);
        assert!(!view.is_loading());
        assert_eq!(view.empty_message(), NO_DATA);
        assert_eq!(view.filtered().len(), 1);
    }

    #[tokio::test]
    async fn failed_load_leaves_report_empty() {
        let mem = Arc::new(MemoryBackend::new().with_route(REPORT_PATH, json!([])));
        mem.fail_next("GET", REPORT_PATH, "Network Error");
        let backend: SharedBackend = mem;
        let mut view = ReportView::default();
        view.load(&backend).await;
        assert!(view.rows().is_empty());
        assert!(!view.is_loading());
    }
}
