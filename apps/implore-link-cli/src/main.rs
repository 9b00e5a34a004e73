//! implore-link - Linked-selection report for a catalogue
//!
//! Loads a catalogue, applies brushes given on the command line and prints
//! what every linked view would show: the selection, the shared color
//! legend and the ranked table.

mod load;

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use implore_link::{
    EntityId, Legend, LinkConfig, LinkEngine, MissingMode, SelectionSyncQueue, TableSort, Value,
};

#[derive(Parser, Debug)]
#[command(name = "implore-link", version, about = "Linked-selection report for a catalogue")]
struct Args {
    /// Catalogue file (JSON array of objects)
    #[arg(short, long)]
    data: PathBuf,

    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Range brush, `attr=low:high` (repeatable)
    #[arg(short, long = "range", value_parser = load::parse_range)]
    ranges: Vec<(String, f64, f64)>,

    /// Click the missing-value toggle of an attribute (repeatable). Each
    /// click advances none -> require value -> require missing -> none.
    /// Ranges are applied first and already require a value, so one click
    /// on a ranged attribute keeps only records without a value.
    #[arg(short, long = "missing")]
    missing: Vec<String>,

    /// Attribute to color by
    #[arg(long)]
    color_by: Option<String>,

    /// Attribute to order the table by
    #[arg(short, long)]
    sort: Option<String>,

    /// Sort ascending instead of descending
    #[arg(long, requires = "sort")]
    ascending: bool,

    /// Maximum number of table rows
    #[arg(short, long)]
    limit: Option<usize>,

    /// Print a JSON report
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    records: usize,
    visible: usize,
    selected: Vec<EntityId>,
    filters: Vec<FilterReport<'a>>,
    legend: Option<Legend>,
    rows: Vec<Row<'a>>,
    sync_pending: Option<usize>,
}

#[derive(Serialize)]
struct FilterReport<'a> {
    attribute: &'a str,
    range: Option<(f64, f64)>,
    missing_mode: MissingMode,
}

#[derive(Serialize)]
struct Row<'a> {
    id: EntityId,
    color: String,
    attributes: &'a BTreeMap<String, Value>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => LinkConfig::load(path)?,
        None => LinkConfig::default(),
    };
    let store = load::load_catalogue(&args.data)?;

    let sync_enabled = config.sync.enabled;
    let queue = SelectionSyncQueue::new(config.sync.max_pending);
    let mut engine = LinkEngine::new(config, store)?;
    if sync_enabled {
        engine.set_publisher(Box::new(queue.clone()));
    }

    apply_brushes(&mut engine, &args.ranges, &args.missing);
    if let Some(attribute) = &args.color_by {
        engine.set_color_attribute(attribute.as_str());
    }

    let mut ids = match &args.sort {
        Some(column) => {
            let sort = TableSort {
                column: column.clone(),
                ascending: args.ascending,
            };
            engine.sorted_selection(&sort)
        }
        None => engine.selection().to_vec(),
    };
    if let Some(limit) = args.limit {
        ids.truncate(limit);
    }

    let rows: Vec<Row> = ids
        .iter()
        .filter_map(|&id| engine.store().get(id))
        .map(|record| Row {
            id: record.id,
            color: engine.color_of(record.id).to_hex(),
            attributes: &record.attributes,
        })
        .collect();

    let report = Report {
        records: engine.store().len(),
        visible: engine.selection().visible(),
        selected: engine.selection().to_vec(),
        filters: engine
            .filters()
            .active()
            .map(|(attribute, filter)| FilterReport {
                attribute,
                range: filter.range,
                missing_mode: filter.missing_mode,
            })
            .collect(),
        legend: engine.legend(),
        rows,
        sync_pending: sync_enabled.then(|| queue.pending_count()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report, args.sort.as_deref());
    }

    Ok(())
}

/// Apply command-line brushes: every range first, then the toggle clicks
fn apply_brushes(engine: &mut LinkEngine, ranges: &[(String, f64, f64)], missing: &[String]) {
    for (attribute, low, high) in ranges {
        if !engine.set_range(attribute, *low, *high) {
            tracing::warn!(attribute = %attribute, "Range ignored: not a numeric attribute");
        }
    }
    for attribute in missing {
        if engine.cycle_missing_mode(attribute).is_none() {
            tracing::warn!(attribute = %attribute, "Missing toggle ignored: unknown attribute");
        }
    }
}

fn print_text(report: &Report, sort: Option<&str>) {
    println!(
        "Selected {} of {} records",
        report.selected.len(),
        report.visible
    );

    for filter in &report.filters {
        let range = filter
            .range
            .map(|(low, high)| format!("{}..{}", Value::Number(low), Value::Number(high)))
            .unwrap_or_else(|| "any".to_string());
        println!(
            "  {:<20} range {:<16} missing {:?}",
            filter.attribute, range, filter.missing_mode
        );
    }

    if let Some(legend) = &report.legend {
        println!();
        println!("Color by {} ({:?})", legend.attribute, legend.kind);
        for entry in &legend.entries {
            println!("  {}  {}", entry.color, entry.label);
        }
        println!("  {}  no data", legend.no_data);
    }

    if !report.rows.is_empty() {
        println!();
        for row in &report.rows {
            let value = sort
                .and_then(|column| row.attributes.get(column))
                .map(|v| v.to_string())
                .unwrap_or_default();
            println!("  {:>8}  {}  {}", row.id, row.color, value);
        }
    }

    if let Some(pending) = report.sync_pending {
        println!();
        println!("{} selection update(s) queued for sync", pending);
    }
}
