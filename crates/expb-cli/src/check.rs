//! Project checks run by `expb check`.

use std::collections::BTreeMap;

use serde::Serialize;

use expb_export::{BranchAction, Project, Trial, TrialComponent};
use expb_ingest::{ColumnHint, build_column_hints};
use expb_map::{OrderError, extract_order, validate_entry};
use expb_model::{ColumnMappingEntry, ComponentId, Dataset, ParameterSpec, TrialId};
use expb_schema::SchemaRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckIssue {
    pub severity: Severity,
    pub trial: Option<TrialId>,
    pub component: Option<ComponentId>,
    pub key: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    pub issues: Vec<CheckIssue>,
}

impl CheckReport {
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    fn push(&mut self, severity: Severity, scope: Scope<'_>, message: impl Into<String>) {
        self.issues.push(CheckIssue {
            severity,
            trial: scope.trial.cloned(),
            component: scope.component.cloned(),
            key: scope.key.map(str::to_string),
            message: message.into(),
        });
    }
}

#[derive(Clone, Copy, Default)]
struct Scope<'a> {
    trial: Option<&'a TrialId>,
    component: Option<&'a ComponentId>,
    key: Option<&'a str>,
}

/// Checks bindings against the registry and, when given, participant data.
///
/// With `strict` unset a literal of the wrong shape is a warning.
pub fn check_project(
    project: &Project,
    registry: &SchemaRegistry,
    dataset: Option<&Dataset>,
    strict: bool,
) -> CheckReport {
    let mut report = CheckReport::default();
    if let Err(error) = project.check_ids() {
        report.push(Severity::Error, Scope::default(), error.to_string());
    }
    let hints = dataset.map(build_column_hints).unwrap_or_default();
    for trial in &project.trials {
        for component in &trial.components {
            check_component(&mut report, registry, trial, component, dataset, &hints, strict);
        }
        check_branches(&mut report, project, trial);
    }
    if let (Some(columns), Some(dataset)) = (&project.order_columns, dataset) {
        check_order(&mut report, dataset, columns);
    }
    report.issues.sort_by_key(|issue| issue.severity);
    report
}

fn check_component(
    report: &mut CheckReport,
    registry: &SchemaRegistry,
    trial: &Trial,
    component: &TrialComponent,
    dataset: Option<&Dataset>,
    hints: &BTreeMap<String, ColumnHint>,
    strict: bool,
) {
    let scope = Scope {
        trial: Some(&trial.id),
        component: Some(&component.id),
        key: None,
    };
    let component_type = component.component_type.as_str();
    if let Some(error) = registry.error(component_type) {
        report.push(
            Severity::Error,
            scope,
            format!("metadata for {component_type} failed to load: {error}; config not checked"),
        );
        return;
    }
    if registry.schema(component_type).is_none() {
        report.push(
            Severity::Warning,
            scope,
            format!("unknown component type {component_type}; config not checked"),
        );
        return;
    }

    for (key, value) in &component.config {
        let scope = Scope {
            key: Some(key.as_str()),
            ..scope
        };
        let Some(spec) = registry.parameter(component_type, key) else {
            report.push(
                Severity::Error,
                scope,
                format!("{component_type} does not declare this parameter"),
            );
            continue;
        };
        let entry = value.clone().into_entry();
        if let Err(error) = validate_entry(spec, &entry) {
            let severity = if strict {
                Severity::Error
            } else {
                Severity::Warning
            };
            report.push(severity, scope, error.to_string());
        }
        if let (ColumnMappingEntry::Csv(column), Some(dataset)) = (&entry, dataset) {
            check_column(report, scope, spec, column, dataset, hints);
        }
    }
}

fn check_column(
    report: &mut CheckReport,
    scope: Scope<'_>,
    spec: &ParameterSpec,
    column: &str,
    dataset: &Dataset,
    hints: &BTreeMap<String, ColumnHint>,
) {
    if !dataset.has_column(column) {
        report.push(
            Severity::Error,
            scope,
            format!("column {column:?} is not in the data"),
        );
        return;
    }
    let Some(hint) = hints.get(column) else {
        return;
    };
    if spec.value_type.is_numeric() && (!hint.is_numeric || hint.null_ratio > 0.0) {
        report.push(
            Severity::Warning,
            scope,
            format!("column {column:?} has non-numeric or empty cells; those rows resolve to NaN"),
        );
    }
}

fn check_branches(report: &mut CheckReport, project: &Project, trial: &Trial) {
    let position = |id: &TrialId| project.trials.iter().position(|t| &t.id == id);
    let scope = Scope {
        trial: Some(&trial.id),
        ..Scope::default()
    };
    for rule in &trial.branches {
        let (target, forward_only) = match &rule.action {
            BranchAction::SkipTo(target) => (target, true),
            BranchAction::JumpTo(target) => (target, false),
            BranchAction::End => continue,
        };
        match (position(target), position(&trial.id)) {
            (None, _) => report.push(
                Severity::Error,
                scope,
                format!("branch target {target} is not a trial of this project"),
            ),
            (Some(to), Some(from)) if forward_only && to <= from => report.push(
                Severity::Error,
                scope,
                format!("skip target {target} does not come after this trial; use a jump"),
            ),
            _ => {}
        }
    }
}

fn check_order(report: &mut CheckReport, dataset: &Dataset, columns: &[String]) {
    match extract_order(dataset, columns) {
        Err(OrderError::ColumnNotFound(column)) => report.push(
            Severity::Error,
            Scope::default(),
            format!("order column {column:?} is not in the data"),
        ),
        Ok(order) => {
            for column in order.columns.iter().filter(|c| c.dropped > 0) {
                report.push(
                    Severity::Warning,
                    Scope::default(),
                    format!(
                        "order column {:?} has {} rows without a numeric position",
                        column.column, column.dropped
                    ),
                );
            }
            if !order.is_aligned() {
                report.push(
                    Severity::Warning,
                    Scope::default(),
                    "order columns yield sequences of different lengths",
                );
            }
        }
    }
}
