//! `cerp` console for the construction planning backend.
//!
//! Usage:
//!   cerp <resource> list
//!   cerp <resource> add --field=value ...
//!   cerp <resource> edit <id> --field=value ...
//!   cerp <resource> delete <id> [--yes]
//!   cerp dashboard
//!   cerp report [--search=S] [--from=YYYY-MM-DD] [--to=YYYY-MM-DD]
//!               [--pdf=path] [--csv=path] [--excel=path]
//!
//! Resources: work-programs, tasks, task-details, progress
//!
//! Alerts go to stderr, tables to stdout. A mutation that ends in a failure
//! alert exits with status 1.

use anyhow::{anyhow, bail, Result};
use chrono::Local;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use cerp_console::aggregate::report::{self, ExportKind, ReportView};
use cerp_console::aggregate::{render_text, ProgressCharts};
use cerp_console::api::{HttpBackend, SharedBackend};
use cerp_console::logging::{log, obj, v_str, Domain, Level};
use cerp_console::model::{Draft, Entity};
use cerp_console::state::Config;
use cerp_console::view::{Page, ProgressPage, TaskDetailPage, TaskPage, WorkProgramPage};

const USAGE: &str = "usage: cerp <work-programs|tasks|task-details|progress> <list|add|edit <id>|delete <id>> [--field=value ...] [--yes]
       cerp dashboard
       cerp report [--search=S] [--from=YYYY-MM-DD] [--to=YYYY-MM-DD] [--pdf=path] [--csv=path] [--excel=path]";

const STAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";
const BAR_WIDTH: usize = 40;

#[derive(Debug, Default)]
struct Args {
    positional: Vec<String>,
    fields: Vec<(String, String)>,
    yes: bool,
}

impl Args {
    fn parse(raw: impl Iterator<Item = String>) -> Result<Self> {
        let mut args = Args::default();
        for arg in raw {
            if arg == "--yes" || arg == "-y" {
                args.yes = true;
            } else if let Some(flag) = arg.strip_prefix("--") {
                let (k, v) = flag
                    .split_once('=')
                    .ok_or_else(|| anyhow!("expected --field=value, got {}", arg))?;
                args.fields.push((k.to_string(), v.to_string()));
            } else {
                args.positional.push(arg);
            }
        }
        Ok(args)
    }

    fn flag(&self, name: &str) -> Option<&str> {
        self.fields.iter().rev().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    fn has(&self, name: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == name)
    }
}

fn stamp() -> String {
    Local::now().format(STAMP_FORMAT).to_string()
}

fn ask(prompt: &str) -> bool {
    eprint!("{} [y/N] ", prompt);
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    if std::io::stdin().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

fn parse_id(raw: Option<&String>) -> Result<i64> {
    let raw = raw.ok_or_else(|| anyhow!("missing id\n{}", USAGE))?;
    raw.parse().map_err(|_| anyhow!("invalid id {:?}", raw))
}

/// Print and drain pending alerts; true when any of them reports a failure.
fn flush_alerts<P: Page>(page: &mut P) -> bool {
    let mut failed = false;
    for alert in page.view_mut().take_alerts() {
        eprintln!("alert: {}", alert.message);
        failed |= alert.is_failure();
    }
    failed
}

fn print_page<P: Page>(page: &P) {
    println!("{}", P::TITLE);
    print!("{}", page.table().render(page.view().empty_message()));
}

async fn resource<P>(mut page: P, args: &Args) -> Result<i32>
where
    P: Page,
    P::Entity: Entity<Id = i64>,
{
    let cmd = args.positional.get(1).map(String::as_str).unwrap_or("list");
    page.mount().await;

    let ok = match cmd {
        "list" => {
            print_page(&page);
            return Ok(0);
        }
        "add" => {
            page.view_mut().add();
            for (k, v) in &args.fields {
                page.set_field(k, v)?;
            }
            let now = stamp();
            for f in ["created_at", "updated_at"] {
                if page.view().buffer().get(f).is_some_and(|v| v.trim().is_empty()) {
                    page.set_field(f, &now)?;
                }
            }
            page.view_mut().submit().await
        }
        "edit" => {
            let id = parse_id(args.positional.get(2))?;
            if !page.view_mut().edit(id) {
                bail!("no {} with id {}", <P::Entity as Entity>::LABEL, id);
            }
            for (k, v) in &args.fields {
                page.set_field(k, v)?;
            }
            if !args.has("updated_at") {
                page.set_field("updated_at", &stamp())?;
            }
            page.view_mut().submit().await
        }
        "delete" => {
            let id = parse_id(args.positional.get(2))?;
            if args.yes {
                let mut yes = |_: &str| true;
                page.view_mut().delete(id, &mut yes).await
            } else {
                let mut confirm = ask;
                page.view_mut().delete(id, &mut confirm).await
            }
        }
        other => bail!("unknown command {:?}\n{}", other, USAGE),
    };

    let failed = flush_alerts(&mut page);
    if ok {
        print_page(&page);
    }
    Ok(if failed { 1 } else { 0 })
}

async fn dashboard(backend: &SharedBackend) -> Result<i32> {
    let charts = ProgressCharts::load(backend).await;
    print!("{}", render_text(&charts.tasks, BAR_WIDTH));
    println!();
    print!("{}", render_text(&charts.daily, BAR_WIDTH));
    Ok(0)
}

fn export_dest(cfg: &Config, value: &str, kind: ExportKind) -> PathBuf {
    if value.is_empty() {
        PathBuf::from(&cfg.export_dir).join(kind.file_name())
    } else {
        PathBuf::from(value)
    }
}

async fn report_cmd(http: &HttpBackend, backend: &SharedBackend, args: &Args) -> Result<i32> {
    let mut view = ReportView::default();
    view.begin_load();
    eprintln!("{}", view.empty_message());
    view.apply(report::fetch(backend).await);
    if let Some(q) = args.flag("search") {
        view.set_search(q);
    }
    if let Some(from) = args.flag("from") {
        view.set_start(from)?;
    }
    if let Some(to) = args.flag("to") {
        view.set_end(to)?;
    }

    println!("{}", report::REPORT_TITLE);
    print!("{}", view.table().render(view.empty_message()));

    if let Some(p) = args.flag("pdf") {
        let path = if p.is_empty() {
            PathBuf::from(&http.config().export_dir).join("progress_report.pdf")
        } else {
            PathBuf::from(p)
        };
        view.export_pdf(&path)?;
        eprintln!("wrote {}", path.display());
    }
    for (flag, kind) in [("csv", ExportKind::Csv), ("excel", ExportKind::Excel)] {
        if let Some(v) = args.flag(flag) {
            let dest = export_dest(http.config(), v, kind);
            let bytes = report::download(http, kind, &dest).await?;
            eprintln!("wrote {} ({} bytes)", dest.display(), bytes);
        }
    }
    Ok(0)
}

async fn run(args: Args) -> Result<i32> {
    let cfg = Config::from_env();
    let http = Arc::new(HttpBackend::new(cfg)?);
    let backend: SharedBackend = http.clone();

    let target = args
        .positional
        .first()
        .ok_or_else(|| anyhow!("{}", USAGE))?
        .clone();
    log(
        Level::Debug,
        Domain::System,
        "command",
        obj(&[("target", v_str(&target)), ("api", v_str(http.config().api_base.as_str()))]),
    );

    match target.as_str() {
        "work-programs" => resource(WorkProgramPage::new(backend), &args).await,
        "tasks" => resource(TaskPage::new(backend), &args).await,
        "task-details" => resource(TaskDetailPage::new(backend), &args).await,
        "progress" => resource(ProgressPage::new(backend), &args).await,
        "dashboard" => dashboard(&backend).await,
        "report" => report_cmd(&http, &backend, &args).await,
        other => bail!("unknown resource {:?}\n{}", other, USAGE),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse(std::env::args().skip(1))?;
    let code = run(args).await?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(v: &[&str]) -> Args {
        Args::parse(v.iter().map(|s| s.to_string())).unwrap()
    }

    #[test]
    fn flags_and_positionals_split() {
        let a = parse(&["tasks", "edit", "4", "--task_name=Pour slab", "--yes"]);
        assert_eq!(a.positional, vec!["tasks", "edit", "4"]);
        assert_eq!(a.flag("task_name"), Some("Pour slab"));
        assert!(a.yes);
    }

    #[test]
    fn later_flag_wins() {
        let a = parse(&["report", "--search=a", "--search=b"]);
        assert_eq!(a.flag("search"), Some("b"));
        assert!(a.has("search"));
    }

    #[test]
    fn bare_flag_is_rejected() {
        assert!(Args::parse(["--pdf".to_string()].into_iter()).is_err());
    }
}
