//! Read-only views assembled from server-side joins.

pub mod charts;
pub mod report;

pub use charts::{render_text, Chart, ProgressCharts};
pub use report::{download, export_url, ExportKind, ReportRow, ReportView};
