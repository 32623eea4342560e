use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use admin_client::HttpTransport;
use admin_core::{BatchReport, Console, NoticeLevel, Transport};
use admin_model::display::value_text;
use admin_model::{FilterOp, OrderOp};
use admin_widgets::{ControlEvent, FilterKind};

use crate::cli::{ActionArgs, CreateArgs, EditArgs, ListArgs, QueryArgs, RowArgs};
use crate::config::Settings;
use crate::summary::{objects_table, page_table, record_table};

/// Open a console against the configured backend and load its metadata.
pub async fn connect(settings: &Settings) -> Result<Console<HttpTransport>> {
    let transport =
        HttpTransport::new(&settings.client_config()).context("build HTTP client")?;
    let mut console = Console::new(transport, settings.console_options());
    console.load().await.context("load admin metadata")?;
    info!(
        site = %console.site().title(),
        objects = console.objects().len(),
        "connected"
    );
    Ok(console)
}

pub fn run_objects<T: Transport>(console: &Console<T>) {
    let title = console.site().title();
    if !title.trim_matches([' ', '|']).is_empty() {
        println!("{title}");
    }
    println!("{}", objects_table(console.objects()));
}

pub async fn run_list<T: Transport>(console: &mut Console<T>, args: &ListArgs) -> Result<()> {
    open_page(console, &args.query).await?;
    if args.json {
        let records: Vec<_> = console.query().rows().iter().map(|row| &row.data).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    print_page(console)?;
    Ok(())
}

pub async fn run_show<T: Transport>(console: &mut Console<T>, args: &RowArgs) -> Result<()> {
    open_page(console, &args.query).await?;
    let index = row_index(console, args.row)?;
    let object = console
        .active()
        .ok_or_else(|| anyhow!("no object is open"))?;
    let labels: Vec<String> = object.shows().map(|field| field.label.clone()).collect();
    let cells = console
        .render_row(index)
        .ok_or_else(|| anyhow!("no row {} on this page", args.row))?;
    let pairs: Vec<(String, String)> = labels
        .into_iter()
        .zip(cells.iter().map(admin_widgets::Element::text_content))
        .collect();
    println!("{}", record_table(&pairs));
    Ok(())
}

pub async fn run_create<T: Transport>(console: &mut Console<T>, args: &CreateArgs) -> Result<()> {
    debug!(object = %args.object, "create");
    console.switch_object(&args.object).await?;
    console.open_create()?;
    console.load_foreign_options().await?;
    apply_assignments(console, &args.set)?;
    let saved = console.save(true).await;
    print_notice(console);
    saved?;
    Ok(())
}

pub async fn run_edit<T: Transport>(console: &mut Console<T>, args: &EditArgs) -> Result<()> {
    debug!(object = %args.row.query.object, row = args.row.row, "edit");
    open_page(console, &args.row.query).await?;
    let index = row_index(console, args.row.row)?;
    console.open_edit(index)?;
    console.load_foreign_options().await?;
    apply_assignments(console, &args.set)?;
    if !console.edit().is_some_and(admin_core::EditSession::is_dirty) {
        println!("Nothing changed.");
        return Ok(());
    }
    let saved = console.save(true).await;
    print_notice(console);
    saved?;
    Ok(())
}

pub async fn run_action<T: Transport>(
    console: &mut Console<T>,
    args: &ActionArgs,
    download_dir: &Path,
) -> Result<()> {
    open_page(console, &args.query).await?;
    if args.all {
        console.select_result();
    } else {
        for &row in &args.rows {
            let index = row_index(console, row)?;
            console.toggle_row(index);
        }
    }
    console.confirm_action(&args.action)?;
    execute(console, download_dir).await
}

pub async fn run_delete<T: Transport>(
    console: &mut Console<T>,
    args: &RowArgs,
    download_dir: &Path,
) -> Result<()> {
    open_page(console, &args.query).await?;
    let index = row_index(console, args.row)?;
    console.open_edit(index)?;
    console.confirm_delete_one()?;
    execute(console, download_dir).await
}

pub fn run_config(settings: &Settings, path: &Path, init: bool) -> Result<()> {
    if init {
        settings.save_to(path)?;
        println!("Wrote {}", path.display());
    } else {
        println!("# {}", path.display());
    }
    print!("{}", settings.to_toml()?);
    Ok(())
}

/// Switch to the object and bring the query to the requested page.
async fn open_page<T: Transport>(console: &mut Console<T>, args: &QueryArgs) -> Result<()> {
    console.switch_object(&args.object).await?;
    if let Some(keyword) = &args.keyword {
        console.search(keyword).await?;
    }
    for order in &args.order {
        let (field, wanted) = parse_order(order);
        apply_order(console, field, wanted).await?;
    }
    if !args.filter.is_empty() {
        console.load_filter_options().await?;
        for expr in &args.filter {
            apply_filter(console, expr).await?;
        }
    }
    for page in 1..args.page {
        if !console.next_page().await? {
            debug!(page, "last page reached");
            break;
        }
    }
    Ok(())
}

/// `-name` sorts descending, anything else ascending.
pub fn parse_order(spec: &str) -> (&str, OrderOp) {
    match spec.strip_prefix('-') {
        Some(field) => (field, OrderOp::Desc),
        None => (spec.strip_prefix('+').unwrap_or(spec), OrderOp::Asc),
    }
}

async fn apply_order<T: Transport>(
    console: &mut Console<T>,
    field: &str,
    wanted: OrderOp,
) -> Result<()> {
    // Cycling through every state once is enough to land on any of them.
    for _ in 0..3 {
        if console.query().order_op(field) == Some(wanted) {
            return Ok(());
        }
        if console.toggle_order(field).await?.is_none() {
            bail!("{field} is not orderable");
        }
    }
    Ok(())
}

/// A filter expression split into field, operator and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpr<'a> {
    pub field: &'a str,
    /// `None` for a plain `=`; `~` maps to `like`.
    pub op: Option<FilterOp>,
    pub value: &'a str,
}

pub fn parse_filter(expr: &str) -> Result<FilterExpr<'_>> {
    let start = expr
        .find(['=', '<', '>', '!', '~'])
        .ok_or_else(|| anyhow!("filter {expr:?} has no operator"))?;
    let rest = &expr[start..];
    let len = rest
        .find(|c: char| !matches!(c, '=' | '<' | '>' | '!' | '~'))
        .unwrap_or(rest.len());
    let (op_text, value) = rest.split_at(len);
    let op = match op_text {
        "=" => None,
        "~" => Some(FilterOp::Like),
        other => Some(other.parse::<FilterOp>().map_err(|err| anyhow!(err))?),
    };
    let field = expr[..start].trim();
    if field.is_empty() {
        bail!("filter {expr:?} has no field");
    }
    Ok(FilterExpr {
        field,
        op,
        value: value.trim(),
    })
}

async fn apply_filter<T: Transport>(console: &mut Console<T>, expr: &str) -> Result<()> {
    let parsed = parse_filter(expr)?;
    let control = console
        .filter_controls()
        .iter()
        .find(|control| control.field == parsed.field || control.name == parsed.field)
        .ok_or_else(|| anyhow!("{} is not filterable", parsed.field))?;
    let field = control.field.clone();
    let kind = control.kind;
    match kind {
        FilterKind::Text | FilterKind::Number => {
            let op = parsed.op.unwrap_or(FilterOp::Equal);
            console.enter_filter(&field, Some(op), parsed.value).await?;
        }
        _ => {
            let mut picked = Vec::new();
            for wanted in parsed.value.split(',').map(str::trim) {
                let index = control
                    .options
                    .iter()
                    .position(|option| {
                        option.label.eq_ignore_ascii_case(wanted)
                            || value_text(&option.value) == wanted
                    })
                    .ok_or_else(|| {
                        let known: Vec<&str> =
                            control.options.iter().map(|option| option.label.as_str()).collect();
                        anyhow!("{wanted:?} is not an option of {field}; try {}", known.join(", "))
                    })?;
                picked.push(index);
            }
            console.select_filter(&field, &picked).await?;
        }
    }
    Ok(())
}

/// Apply `name=value` pairs to the open form.
fn apply_assignments<T: Transport>(console: &mut Console<T>, assignments: &[String]) -> Result<()> {
    for assignment in assignments {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("expected NAME=VALUE, got {assignment:?}"))?;
        console.edit_event(name.trim(), ControlEvent::Changed(value.to_string()))?;
    }
    let errors: Vec<String> = console
        .edit()
        .map(|session| {
            session
                .fields()
                .iter()
                .filter_map(|snapshot| {
                    let error = snapshot.edit.control.error.as_ref()?;
                    Some(format!("{}: {error}", snapshot.field.label))
                })
                .collect()
        })
        .unwrap_or_default();
    if !errors.is_empty() {
        bail!("invalid values: {}", errors.join("; "));
    }
    Ok(())
}

async fn execute<T: Transport>(console: &mut Console<T>, download_dir: &Path) -> Result<()> {
    let label = console
        .pending()
        .map(|pending| pending.action.label.clone())
        .unwrap_or_default();
    let bar = progress_bar(&label);
    let result = console
        .execute_confirmed(|step| {
            bar.set_length(step.total as u64);
            bar.set_position(step.current.saturating_sub(1) as u64);
            bar.set_message(format!("{label} {step}"));
        })
        .await;
    bar.finish_and_clear();
    print_notice(console);
    let report = result?;
    save_downloads(&report, download_dir)?;
    Ok(())
}

fn progress_bar(label: &str) -> ProgressBar {
    let bar = ProgressBar::new(1);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar.set_message(label.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Write every download of `report` into `dir`. Returns the written paths.
pub fn save_downloads(report: &BatchReport, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for download in report.downloads() {
        let name = Path::new(&download.filename)
            .file_name()
            .map_or_else(|| PathBuf::from("download"), PathBuf::from);
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create download directory {}", dir.display()))?;
        let path = dir.join(name);
        std::fs::write(&path, &download.bytes)
            .with_context(|| format!("write {}", path.display()))?;
        println!("Saved {}", path.display());
        written.push(path);
    }
    Ok(written)
}

fn row_index<T: Transport>(console: &Console<T>, row: usize) -> Result<usize> {
    let count = console.query().count();
    match row.checked_sub(1) {
        Some(index) if index < count => Ok(index),
        _ => bail!("no row {row} on this page ({count} rows)"),
    }
}

fn print_page<T: Transport>(console: &Console<T>) -> Result<()> {
    let object = console
        .active()
        .ok_or_else(|| anyhow!("no object is open"))?;
    let query = console.query();
    let rows: Vec<Vec<String>> = (0..query.count())
        .filter_map(|index| console.render_row(index))
        .map(|cells| cells.iter().map(admin_widgets::Element::text_content).collect())
        .collect();
    let first = query.first_index();
    let name = if object.plural_name.is_empty() {
        &object.name
    } else {
        &object.plural_name
    };
    if rows.is_empty() {
        println!("{name}: no records");
        return Ok(());
    }
    println!(
        "{name}: {}-{} of {}",
        first,
        first + rows.len() - 1,
        query.total()
    );
    println!("{}", page_table(object, &rows, first));
    Ok(())
}

fn print_notice<T: Transport>(console: &mut Console<T>) {
    if let Some(notice) = console.notice() {
        match notice.level {
            NoticeLevel::Error => eprintln!("{}", notice.text),
            NoticeLevel::Info | NoticeLevel::Pending => println!("{}", notice.text),
        }
    }
}
