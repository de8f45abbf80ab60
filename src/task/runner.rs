//! Task execution

use std::io::Write;

use anyhow::{Context, Result};

use super::{Settings, Task, TaskError};
use crate::domain::{DomainName, Failure};
use crate::render::Printer;
use crate::resolver::{Lookup, Resolver};
use crate::storage::read_names;

/// Runs one task: read lists, resolve, render, write
pub fn run_task(task: &Task, settings: &Settings, lookup: &dyn Lookup) -> Result<()> {
    let names = read_names(&task.files)?;

    if names.has_unparsed() {
        if settings.fail {
            return Err(TaskError::InvalidNames(names.unparsed_names().clone()).into());
        }
        for (file, tokens) in names.unparsed_names() {
            tracing::warn!(
                file = %file.display(),
                names = %tokens.join(", "),
                "skipping invalid names"
            );
        }
    }

    let names = names.into_names();
    tracing::debug!(count = names.len(), mode = %task.mode, "resolving names");

    let results = Resolver::new(lookup)
        .with_mode(task.mode)
        .with_timeout(settings.lookup_timeout)
        .resolve(&names)?;

    let failed: Vec<(DomainName, Failure)> = results
        .iter()
        .filter_map(|result| result.failure.map(|failure| (result.name.clone(), failure)))
        .collect();

    if !failed.is_empty() {
        if settings.fail {
            return Err(TaskError::FailedLookups(failed).into());
        }
        for (name, failure) in &failed {
            tracing::warn!(name = %name, reason = %failure, "lookup failed");
        }
    }

    let mut sink = task.output.open()?;
    Printer::new(task.format)
        .with_template(task.template.clone())
        .with_entries(&results)
        .with_output(&mut sink)
        .print()
        .with_context(|| format!("Failed to write output to {}", task.output))?;
    sink.flush()
        .with_context(|| format!("Failed to write output to {}", task.output))?;

    tracing::info!(
        output = %task.output,
        format = %task.format,
        names = results.len(),
        failed = failed.len(),
        "task finished"
    );

    Ok(())
}

/// Runs every task in order, stopping at the first failure
pub fn run_tasks(tasks: &[Task], settings: &Settings, lookup: &dyn Lookup) -> Result<()> {
    for (index, task) in tasks.iter().enumerate() {
        run_task(task, settings, lookup).with_context(|| format!("Task #{} failed", index + 1))?;
    }
    Ok(())
}
