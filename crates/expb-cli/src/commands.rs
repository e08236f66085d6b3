use std::path::Path;

use anyhow::{Context, Result, anyhow};
use comfy_table::{Cell, CellAlignment, Color, Table};
use serde_json::json;
use tracing::{info, info_span, trace};

use expb_cli::check::{CheckReport, check_project};
use expb_cli::logging::redact_value;
use expb_export::{Project, resolve_participant};
use expb_ingest::read_dataset;
use expb_map::{PresetLibrary, StoreOptions, extract_order};
use expb_model::{ColumnMappingEntry, Dataset};
use expb_schema::{DirectorySource, SchemaRegistry};

use crate::cli::{BindingArgs, CheckArgs, OrderArgs, ResolveArgs, SchemaArgs};
use crate::summary::{
    align_column, apply_table_style, dim_cell, header_cell, print_check_report, print_order,
};

fn load_registry(args: &SchemaArgs) -> SchemaRegistry {
    match &args.metadata_dir {
        Some(dir) => SchemaRegistry::load_all(&DirectorySource::new(dir)),
        None => SchemaRegistry::builtin(),
    }
}

fn store_options(args: &BindingArgs) -> StoreOptions {
    StoreOptions {
        strict_types: !args.lenient,
        ..StoreOptions::default()
    }
}

fn load_project(path: &Path) -> Result<Project> {
    Project::load(path).with_context(|| format!("load project {}", path.display()))
}

fn load_data(path: &Path) -> Result<Dataset> {
    read_dataset(path).with_context(|| format!("load participant data {}", path.display()))
}

pub fn run_components(args: &SchemaArgs) -> Result<()> {
    let registry = load_registry(args);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Component"),
        header_cell("Version"),
        header_cell("Parameters"),
        header_cell("Data fields"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for (name, schema) in registry.schemas() {
        table.add_row(vec![
            Cell::new(name),
            schema
                .version
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
            Cell::new(schema.parameters.len()),
            Cell::new(schema.data_fields.join(", ")),
        ]);
    }
    println!("{table}");

    let errors: Vec<(&str, &str)> = registry.errors().collect();
    if !errors.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![header_cell("Component"), header_cell("Load error")]);
        apply_table_style(&mut table);
        for (name, error) in errors {
            table.add_row(vec![
                Cell::new(name),
                Cell::new(error).fg(Color::Red),
            ]);
        }
        println!("{table}");
    }
    Ok(())
}

pub fn run_params(component_type: &str, args: &SchemaArgs) -> Result<()> {
    let registry = load_registry(args);
    if let Some(error) = registry.error(component_type) {
        return Err(anyhow!("metadata for {component_type} failed to load: {error}"));
    }
    let schema = registry
        .schema(component_type)
        .ok_or_else(|| anyhow!("unknown component type: {component_type}"))?;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Parameter"),
        header_cell("Type"),
        header_cell("Default"),
    ]);
    apply_table_style(&mut table);
    for spec in &schema.parameters {
        table.add_row(vec![
            Cell::new(&spec.key),
            Cell::new(spec.value_type),
            Cell::new(spec.default_value.to_string()),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_presets() -> Result<()> {
    let presets = PresetLibrary::builtin();
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Preset"),
        header_cell("Points"),
        header_cell("Value"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for preset in presets.iter() {
        let points = preset.value().as_array().map_or(0, Vec::len);
        table.add_row(vec![
            Cell::new(preset.label()),
            Cell::new(points),
            Cell::new(preset.value().to_string()),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Prints the runtime configuration for one participant as JSON.
pub fn run_resolve(args: &ResolveArgs) -> Result<()> {
    let project = load_project(&args.project)?;
    let span = info_span!("resolve", project = %project.name, row = args.row);
    let _guard = span.enter();

    let registry = load_registry(&args.binding.schema);
    let store = project
        .to_store(registry, store_options(&args.binding))
        .context("build mapping store")?;
    let dataset = load_data(&args.data)?;
    if let Some(row) = dataset.row(args.row) {
        for (_, component) in store.components() {
            for (key, entry) in component.mapping().iter() {
                if let ColumnMappingEntry::Csv(column) = entry {
                    let raw = row
                        .get(column)
                        .and_then(|cell| cell.as_text())
                        .unwrap_or_default();
                    trace!(key, column = %column, value = redact_value(&raw), "csv cell read");
                }
            }
        }
    }
    let trials = resolve_participant(&project, &store, &dataset, args.row)?;
    let order = match &project.order_columns {
        Some(columns) => Some(extract_order(&dataset, columns).context("extract order")?),
        None => None,
    };
    info!(trials = trials.len(), "participant resolved");

    let output = json!({
        "project": project.name,
        "row": args.row,
        "trials": trials,
        "order": order,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn run_order(args: &OrderArgs) -> Result<()> {
    let dataset = load_data(&args.data)?;
    let order = extract_order(&dataset, &args.columns)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&order)?);
    } else {
        print_order(&order);
    }
    Ok(())
}

pub fn run_check(args: &CheckArgs) -> Result<CheckReport> {
    let project = load_project(&args.project)?;
    let registry = load_registry(&args.binding.schema);
    let dataset = args.data.as_deref().map(load_data).transpose()?;
    let report = check_project(
        &project,
        &registry,
        dataset.as_ref(),
        !args.binding.lenient,
    );
    info!(
        errors = report.error_count(),
        warnings = report.warning_count(),
        "project checked"
    );
    print_check_report(&report);
    Ok(report)
}

