use anyhow::{bail, Context, Result};
use kpi_client::{
    domain::Metric,
    query::{comparison, load_daily_kpis, range_summary, yearly_totals},
};
use kpi_etl::{config::AppConfig, observability};
use std::env;
use time::{macros::format_description, Date};

fn parse_day(s: &str) -> Result<Date> {
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        bail!("usage: kpi_summary <category> <metric> [start] [end] [compare_category]");
    }
    let category = &args[1];
    let metric: Metric = args[2].parse()?;

    // Reads the file the ETL wrote; KPI_ETL_CONFIG selects a non-default output.
    let cfg = AppConfig::load()?;
    let table = load_daily_kpis(&cfg.output.path)?;

    let (start, end) = match (args.get(3), args.get(4)) {
        (Some(start), Some(end)) => (parse_day(start)?, parse_day(end)?),
        (Some(_), None) => bail!("an end date is required when a start date is given"),
        _ => match table.default_range() {
            Some(range) => range,
            None => bail!("{} has no rows", cfg.output.path.display()),
        },
    };

    let summary = range_summary(&table, category, metric, start, end)?;
    let yearly = yearly_totals(&table, category, metric)?;
    let compared = match args.get(5) {
        Some(other) => Some(comparison(&table, category, other, metric, start, end)?),
        None => None,
    };

    let report = serde_json::json!({
        "summary": summary,
        "yearly_totals": yearly,
        "comparison": compared,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
