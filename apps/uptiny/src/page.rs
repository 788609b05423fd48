use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Instant, SystemTime};
use std::{fs, io};

use anyhow::{Context, Result, bail};
use probes::{Check, Registry, Runner};

use crate::render;

/// All data required to generate the status page.
///
/// The check list and the incidents file are cached between renderings and
/// only re-read when their modification time advances.
pub struct StatusPage {
    checks_path: PathBuf,
    checks: Vec<Check>,
    last_checks_update: Option<SystemTime>,

    incidents_path: PathBuf,
    incidents: Vec<String>,
    last_incidents_update: Option<SystemTime>,

    title: String,
    registry: Arc<Registry>,
    runner: Runner,
}

impl StatusPage {
    pub fn new(
        checks_path: PathBuf,
        incidents_path: PathBuf,
        title: String,
        registry: Arc<Registry>,
        runner: Runner,
    ) -> Self {
        Self {
            checks_path,
            checks: Vec::new(),
            last_checks_update: None,
            incidents_path,
            incidents: Vec::new(),
            last_incidents_update: None,
            title,
            registry,
            runner,
        }
    }

    /// Run all configured checks in parallel, fetch the last incidents and
    /// generate the HTML page.
    pub async fn render(&mut self) -> Result<String> {
        let started = Instant::now();
        let last_check = chrono::Local::now();

        let checks = self.status_checks()?.to_vec();
        let statuses = self.runner.run_all(checks).await;
        let incidents = self.incidents()?.to_vec();

        Ok(render::page(&self.title, &statuses, &incidents, last_check, started.elapsed()))
    }

    /// Read and parse the check list, reusing the cached one when the file
    /// has not changed.
    ///
    /// Unparsable lines are logged and skipped so one bad entry doesn't
    /// take the whole page down.
    fn status_checks(&mut self) -> Result<&[Check]> {
        let modified = fs::metadata(&self.checks_path)
            .and_then(|metadata| metadata.modified())
            .with_context(|| format!("failed to stat '{}'", self.checks_path.display()))?;

        if self.last_checks_update.is_some_and(|last| modified <= last) {
            tracing::debug!(path = %self.checks_path.display(), "check list not modified since last read");
            return Ok(&self.checks);
        }

        let raw = fs::read_to_string(&self.checks_path)
            .with_context(|| format!("failed to read '{}'", self.checks_path.display()))?;

        let mut checks = Vec::new();
        for (nline, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match parse_check(line, &self.registry) {
                Ok(check) => checks.push(check),
                Err(err) => {
                    tracing::error!(line = nline + 1, error = %format!("{err:#}"), "failed to parse check");
                }
            }
        }

        self.last_checks_update = Some(modified);
        self.checks = checks;
        Ok(&self.checks)
    }

    /// Read the incidents file; a missing file simply means no incidents.
    fn incidents(&mut self) -> Result<&[String]> {
        let metadata = match fs::metadata(&self.incidents_path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                self.incidents.clear();
                return Ok(&self.incidents);
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to stat '{}'", self.incidents_path.display()));
            }
        };

        let modified = metadata
            .modified()
            .with_context(|| format!("failed to stat '{}'", self.incidents_path.display()))?;
        if self.last_incidents_update.is_some_and(|last| modified <= last) {
            return Ok(&self.incidents);
        }

        let raw = fs::read_to_string(&self.incidents_path)
            .with_context(|| format!("failed to read '{}'", self.incidents_path.display()))?;

        self.last_incidents_update = Some(modified);
        self.incidents =
            raw.lines().map(str::trim).filter(|line| !line.is_empty()).map(String::from).collect();
        Ok(&self.incidents)
    }
}

/// Parse one CSV line into a validated check.
///
/// Format: `kind, expectation, name, target[, category]`.
fn parse_check(line: &str, registry: &Registry) -> Result<Check> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 4 {
        bail!("wrong number of fields");
    }

    let kind = fields[0].to_ascii_lowercase();
    let Some(probe) = registry.get(&kind) else {
        bail!("probe '{kind}' is not supported");
    };

    let mut check = Check::new(kind, fields[2], fields[3], fields[1]);
    if let Some(category) = fields.get(4).filter(|category| !category.is_empty()) {
        check = check.with_category(*category);
    }

    Ok(probe.sanitize(check)?)
}
