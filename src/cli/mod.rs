//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `lapdash overview` — summary, brand table and distribution charts
//! - `lapdash competitive --brand B` — brand vs. competitors
//! - `lapdash trend [--brand] [--ram] [--days]` — price prediction
//! - `lapdash sentiment --brand B` — review sentiment and rating
//! - `lapdash clusters` — market segmentation
//! - `lapdash brands` / `lapdash rams [--brand]` — filter options
//! - `lapdash health` — backend reachability, config and request log
//! - `lapdash config show|init|set|reset` — configuration management

pub mod render;

use anyhow::{Result, bail};
use colored::Colorize;
use serde::Serialize;

use crate::config::{self, schema::DashConfig};
use crate::panels::trend::TrendRequest;
use crate::panels::{
    ClusteringPanel, CompetitivePanel, OverviewPanel, PanelUpdate, SentimentPanel, Session,
    TrendPanel,
};
use crate::view::chart::Datum;
use crate::view::dropdown::FilterDropdowns;

use render::Layout;

/// Output format for analytics commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

/// Everything a command needs from the resolved configuration.
pub struct Context {
    pub session: Session,
    pub layout: Layout,
}

impl Context {
    pub fn from_config(config: &DashConfig) -> Self {
        Self {
            session: Session::from_config(config),
            layout: Layout {
                top_n: config.display.top_n.max(1),
                bar_width: config.display.bar_width.max(4),
            },
        }
    }
}

/// Turn a blocking alert into a failed command.
fn check(update: PanelUpdate) -> Result<()> {
    match update {
        PanelUpdate::Failed(alert) => bail!("{alert}"),
        PanelUpdate::Rendered | PanelUpdate::Stale => Ok(()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Quote a CSV field when it needs it.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// lapdash overview
// ---------------------------------------------------------------------------

/// Run the overview analysis, reporting progress as requests settle.
pub fn run_overview(ctx: &Context, format: OutputFormat) -> Result<()> {
    let mut panel = OverviewPanel::new();
    let interactive = format == OutputFormat::Table;

    panel.run(&ctx.session, |p| {
        if interactive {
            eprintln!(
                "  {} {:>3}% {}",
                render::bar(f64::from(p.progress.percent()) / 100.0, 20).blue(),
                p.progress.percent(),
                p.status.dimmed()
            );
        }
    });

    match format {
        OutputFormat::Json => print_json(&panel)?,
        OutputFormat::Csv => {
            println!("brand,product_count,avg_price,total_sales,market_share");
            for row in &panel.brand_rows {
                println!(
                    "{},{},{},{},{}",
                    csv_field(&row.brand),
                    row.product_count,
                    csv_field(&row.avg_price),
                    csv_field(&row.total_sales),
                    row.market_share
                );
            }
        }
        OutputFormat::Table => {
            println!();
            render::overview(&panel, ctx.layout);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// lapdash competitive
// ---------------------------------------------------------------------------

pub fn run_competitive(ctx: &Context, brand: &str, format: OutputFormat) -> Result<()> {
    let mut panel = CompetitivePanel::new();
    check(panel.run(&ctx.session, brand))?;
    let Some(view) = panel.view() else {
        return Ok(());
    };

    match format {
        OutputFormat::Json => print_json(view)?,
        OutputFormat::Csv => {
            println!("brand,product_count,avg_price,price_diff,total_sales,sales_diff");
            for c in &view.competitors {
                println!(
                    "{},{},{},{},{},{}",
                    csv_field(&c.brand),
                    c.product_count,
                    csv_field(&c.avg_price),
                    c.price_diff.text,
                    csv_field(&c.total_sales),
                    c.sales_diff.text
                );
            }
        }
        OutputFormat::Table => render::competitive(view, ctx.layout),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// lapdash trend
// ---------------------------------------------------------------------------

pub fn run_trend(ctx: &Context, request: &TrendRequest, format: OutputFormat) -> Result<()> {
    let mut panel = TrendPanel::new();
    check(panel.run(&ctx.session, request))?;
    let Some(view) = panel.view() else {
        return Ok(());
    };

    match format {
        OutputFormat::Json => print_json(&panel)?,
        OutputFormat::Csv => {
            println!("date,historical,predicted,upper,lower");
            if let Some(chart) = panel.chart.chart() {
                let cell = |ds: usize, row: usize| -> String {
                    chart
                        .datasets()
                        .get(ds)
                        .and_then(|d| d.data.get(row))
                        .and_then(Datum::magnitude)
                        .map(|v| v.to_string())
                        .unwrap_or_default()
                };
                for (row, date) in chart.labels().iter().enumerate() {
                    println!(
                        "{},{},{},{},{}",
                        csv_field(date),
                        cell(0, row),
                        cell(1, row),
                        cell(2, row),
                        cell(3, row)
                    );
                }
            }
        }
        OutputFormat::Table => render::trend(view, &panel.chart, ctx.layout),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// lapdash sentiment
// ---------------------------------------------------------------------------

pub fn run_sentiment(ctx: &Context, brand: &str, format: OutputFormat) -> Result<()> {
    let mut panel = SentimentPanel::new();
    check(panel.run(&ctx.session, brand))?;
    let Some(view) = panel.view() else {
        return Ok(());
    };

    match format {
        OutputFormat::Json => print_json(view)?,
        OutputFormat::Csv => {
            println!("bucket,percent");
            for b in &view.bars {
                println!("{},{}", b.label, b.text);
            }
        }
        OutputFormat::Table => render::sentiment(view, ctx.layout),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// lapdash clusters
// ---------------------------------------------------------------------------

pub fn run_clusters(ctx: &Context, format: OutputFormat) -> Result<()> {
    let mut panel = ClusteringPanel::new();
    check(panel.run(&ctx.session))?;
    let Some(view) = panel.view() else {
        return Ok(());
    };

    match format {
        OutputFormat::Json => print_json(&panel)?,
        OutputFormat::Csv => {
            println!("cluster,segment,summary,avg_price,avg_sales,avg_ram,popularity");
            for card in &view.cards {
                println!(
                    "{},{},{},{},{},{},{}",
                    csv_field(&card.title),
                    csv_field(&card.segment),
                    csv_field(&card.summary),
                    csv_field(&card.avg_price),
                    card.avg_sales,
                    card.avg_ram,
                    csv_field(&card.popularity)
                );
            }
        }
        OutputFormat::Table => render::clustering(view, &panel.chart, ctx.layout),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// lapdash brands | rams
// ---------------------------------------------------------------------------

fn print_options(title: &str, options: &[String], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(options)?,
        OutputFormat::Csv => {
            for o in options {
                println!("{}", csv_field(o));
            }
        }
        OutputFormat::Table => {
            render::heading(title);
            if options.is_empty() {
                println!("  {}", "no options available".yellow());
            }
            for o in options {
                println!("  {o}");
            }
        }
    }
    Ok(())
}

pub fn run_brands(ctx: &Context, format: OutputFormat) -> Result<()> {
    let dropdowns = FilterDropdowns::load(ctx.session.client());
    print_options("品牌", &dropdowns.competitive_brand.options, format)
}

/// RAM options, narrowed to one brand's combinations when `brand` is set.
pub fn run_rams(ctx: &Context, brand: Option<&str>, format: OutputFormat) -> Result<()> {
    let mut dropdowns = FilterDropdowns::load(ctx.session.client());
    let title = match brand {
        Some(brand) => {
            dropdowns.select_trend_brand(brand);
            format!("内存 · {brand}")
        }
        None => "内存".to_string(),
    };
    print_options(&title, &dropdowns.trend_ram.options, format)
}

// ---------------------------------------------------------------------------
// lapdash health
// ---------------------------------------------------------------------------

/// Check backend reachability, config files and the request log.
pub fn run_health(ctx: &Context) -> Result<()> {
    println!("{}", "lapdash Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let client = ctx.session.client();
    let backend_ok = client.is_healthy();
    print_health_item(
        "Backend",
        backend_ok,
        &if backend_ok {
            format!("reachable at {}", client.base_url())
        } else {
            format!("not reachable at {} (is the backend running?)", client.base_url())
        },
    );

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.lapdash/config.toml found"
        } else {
            "not found (run `lapdash config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".lapdash.toml found"
        } else {
            "none (optional)"
        },
    );

    let log = ctx.session.request_log();
    match log.path() {
        Some(path) if path.exists() => {
            let summary = log.summarize();
            print_health_item(
                "Request log",
                summary.failed == 0,
                &format!(
                    "{} requests, {} failed, {} stale, avg {:.0}ms",
                    summary.total, summary.failed, summary.stale, summary.avg_latency_ms
                ),
            );
            if let Some(last) = summary.last_failure {
                println!("    {} {}", "last failure:".dimmed(), last.dimmed());
            }
        }
        Some(_) => print_health_item("Request log", true, "no log file yet"),
        None => print_health_item("Request log", true, "disabled"),
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// lapdash config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective lapdash Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    for (exists, name) in [
        (global_exists, "~/.lapdash/config.toml"),
        (project_exists, ".lapdash.toml"),
    ] {
        if exists {
            println!("  {} {}", "✓".green(), name.dimmed());
        } else {
            println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
        }
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "LAPDASH_* environment variables".dimmed()
    );

    Ok(())
}

/// Initialize a default config file at `~/.lapdash/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::Alert;

    #[test]
    fn output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_str_opt(Some("table")), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
    }

    #[test]
    fn csv_field_quotes_when_needed() {
        assert_eq!(csv_field("Lenovo"), "Lenovo");
        assert_eq!(csv_field("1,234"), "\"1,234\"");
        assert_eq!(csv_field("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn failed_update_becomes_error() {
        let err = check(PanelUpdate::Failed(Alert::new("请选择品牌"))).unwrap_err();
        assert_eq!(err.to_string(), "请选择品牌");
        assert!(check(PanelUpdate::Rendered).is_ok());
    }
}
