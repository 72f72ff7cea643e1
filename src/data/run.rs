use crate::core::{Catalog, Scheduler};
use crate::data::deserialize;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result};
use std::fs::File;
use std::io::BufReader;
use tracing::debug;

/// Report of running a directory of catalogs.
#[derive(Debug, Deserialize, Serialize)]
pub struct Report {
    scheduler: String,
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Create a new report.
    fn new(scheduler: String) -> Self {
        let entries = Vec::new();
        Self { scheduler, entries }
    }

    /// Get the scheduler name.
    #[must_use]
    pub fn scheduler_name(&self) -> &str {
        &self.scheduler
    }

    /// Get the entries.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Scheduler: {}", self.scheduler)?;
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        writeln!(f, "-------------------")
    }
}

/// Report of running a single catalog.
#[non_exhaustive]
#[derive(Debug, Deserialize, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub fitness: i64,
    pub lessons: usize,
    pub required: usize,
    pub dropped: usize,
    pub time: f64,
}

impl Display for ReportEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "{}: {} with {}/{} lessons ({} dropped) in {:.2} sec",
            self.name, self.fitness, self.lessons, self.required, self.dropped, self.time
        )
    }
}

/// Run all catalogs in the `samples` directory.
/// Print the report to stdout.
///
/// # Errors
/// - If a file cannot be read.
/// - If no samples are found.
pub fn samples(solver: &mut dyn Scheduler) -> anyhow::Result<Report> {
    run("samples", solver).and_then(|report| {
        if report.entries.is_empty() {
            Err(anyhow!("No samples found"))
        } else {
            println!("{report}");
            Ok(report)
        }
    })
}

/// Run all `*.json` catalogs in the `dir` directory, in file name order.
///
/// # Errors
/// - If a file cannot be read or does not hold a valid catalog.
pub fn run(dir: &str, solver: &mut dyn Scheduler) -> anyhow::Result<Report> {
    let mut report = Report::new(solver.name().into());

    let mut files = Vec::new();
    for file in std::fs::read_dir(dir)? {
        let path = file?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort_unstable();

    for path in files {
        let name = catalog_name(&path)?;
        let catalog: Catalog = deserialize(&mut BufReader::new(File::open(&path)?))?;

        let time = std::time::Instant::now();
        let outcome = solver.schedule(&catalog);
        let time = time.elapsed().as_secs_f64();

        debug!(catalog = %name, fitness = outcome.fitness, time, "catalog scheduled");

        report.entries.push(ReportEntry {
            name,
            fitness: outcome.fitness,
            lessons: outcome.schedule.len(),
            required: catalog.required_sessions(),
            dropped: outcome.dropped,
            time,
        });
    }

    Ok(report)
}

fn catalog_name(path: &std::path::Path) -> anyhow::Result<String> {
    static NAME_ERR: &str = "Cannot read filename";

    let name = path.file_name().ok_or_else(|| anyhow!(NAME_ERR))?;
    let name = name.to_str().ok_or_else(|| anyhow!(NAME_ERR))?;
    Ok(name.into())
}
