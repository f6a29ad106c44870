// Scan orchestration: upload once, then run the static branch and/or the
// dynamic branch against the returned hash. Within a branch each step gates
// the next; the branches do not gate each other.

use crate::api::{is_truthy, FileHash, ScanService};
use crate::config::ScanConfig;
use crate::report::{save_json_report, save_pdf_report};
use crate::ui::Console;
use tracing::{info, warn};

/// One observable step of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Upload,
    StaticScan,
    FetchReport,
    SaveJsonReport,
    SavePdfReport,
    ListApps,
    StartDynamicAnalysis,
    StopDynamicAnalysis,
}

/// What happened during a run, in execution order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub hash: Option<FileHash>,
    pub completed: Vec<Step>,
    pub failed: Vec<Step>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.hash.is_some() && self.failed.is_empty()
    }

    fn ok(&mut self, step: Step) {
        info!(?step, "step completed");
        self.completed.push(step);
    }

    fn fail(&mut self, step: Step) {
        warn!(?step, "step failed");
        self.failed.push(step);
    }
}

/// Run the whole pipeline for `config.file`. Failures are reported on the
/// console and recorded in the summary; they are never returned as errors.
pub fn run<S: ScanService + ?Sized>(
    service: &S,
    config: &ScanConfig,
    console: &mut Console,
) -> RunSummary {
    let mut summary = RunSummary::default();

    let hash = match console.spin("Uploading...", || service.upload(&config.file)) {
        Ok(hash) => hash,
        Err(e) => {
            console.failure(&format!("Error uploading file: {}", e));
            console.failure("Failed to upload file.");
            summary.fail(Step::Upload);
            return summary;
        }
    };
    console.success(&format!("File uploaded successfully. Hash: {}", hash));
    summary.ok(Step::Upload);

    if config.analysis_type.includes_static() {
        run_static(service, config, &hash, console, &mut summary);
    }
    if config.analysis_type.includes_dynamic() {
        run_dynamic(service, &hash, console, &mut summary);
    }

    summary.hash = Some(hash);
    summary
}

fn run_static<S: ScanService + ?Sized>(
    service: &S,
    config: &ScanConfig,
    hash: &FileHash,
    console: &mut Console,
    summary: &mut RunSummary,
) {
    if let Err(e) = console.spin("Running static scan...", || service.trigger_scan(hash)) {
        console.failure(&format!("Error triggering scan: {}", e));
        console.failure("Failed to trigger static scan.");
        summary.fail(Step::StaticScan);
        return;
    }
    console.success("Static scan triggered successfully.");
    summary.ok(Step::StaticScan);

    let report = match console.spin("Fetching JSON report...", || service.fetch_report(hash)) {
        Ok(report) if is_truthy(&report) => report,
        Ok(_) => {
            console.failure("Failed to fetch JSON report.");
            summary.fail(Step::FetchReport);
            return;
        }
        Err(e) => {
            console.failure(&format!("Error fetching report: {}", e));
            console.failure("Failed to fetch JSON report.");
            summary.fail(Step::FetchReport);
            return;
        }
    };
    summary.ok(Step::FetchReport);

    match save_json_report(&report, &config.output_dir) {
        Ok(path) => {
            console.success(&format!("JSON report saved to {}.", path.display()));
            summary.ok(Step::SaveJsonReport);
        }
        Err(e) => {
            console.failure(&format!("Error saving JSON report: {}", e));
            summary.fail(Step::SaveJsonReport);
        }
    }

    match console.spin("Downloading PDF report...", || service.download_pdf(hash)) {
        Ok(pdf) => match save_pdf_report(&pdf, &config.output_dir) {
            Ok(path) => {
                console.success(&format!("PDF report saved to {}.", path.display()));
                summary.ok(Step::SavePdfReport);
            }
            Err(e) => {
                console.failure(&format!("Error saving PDF report: {}", e));
                summary.fail(Step::SavePdfReport);
            }
        },
        Err(e) => {
            console.failure(&format!("Error downloading PDF report: {}", e));
            summary.fail(Step::SavePdfReport);
        }
    }
}

fn run_dynamic<S: ScanService + ?Sized>(
    service: &S,
    hash: &FileHash,
    console: &mut Console,
    summary: &mut RunSummary,
) {
    match console.spin("Listing dynamic analysis apps...", || service.list_apps()) {
        Ok(apps) if is_truthy(&apps) => {
            console.success("Apps retrieved successfully.");
            summary.ok(Step::ListApps);
        }
        Ok(_) => {
            console.failure("Failed to retrieve apps.");
            summary.fail(Step::ListApps);
            return;
        }
        Err(e) => {
            console.failure(&format!("Error getting apps: {}", e));
            console.failure("Failed to retrieve apps.");
            summary.fail(Step::ListApps);
            return;
        }
    }

    match console.spin("Starting dynamic analysis...", || {
        service.start_dynamic_analysis(hash)
    }) {
        Ok(started) if is_truthy(&started) => {
            console.success("Dynamic analysis started successfully.");
            summary.ok(Step::StartDynamicAnalysis);
        }
        Ok(_) => {
            console.failure("Failed to start dynamic analysis.");
            summary.fail(Step::StartDynamicAnalysis);
            return;
        }
        Err(e) => {
            console.failure(&format!("Error starting dynamic analysis: {}", e));
            console.failure("Failed to start dynamic analysis.");
            summary.fail(Step::StartDynamicAnalysis);
            return;
        }
    }

    match console.spin("Stopping dynamic analysis...", || {
        service.stop_dynamic_analysis(hash)
    }) {
        Ok(stopped) if is_truthy(&stopped) => {
            console.success("Dynamic analysis stopped successfully.");
            summary.ok(Step::StopDynamicAnalysis);
        }
        Ok(_) => {
            console.failure("Failed to stop dynamic analysis.");
            summary.fail(Step::StopDynamicAnalysis);
        }
        Err(e) => {
            console.failure(&format!("Error stopping dynamic analysis: {}", e));
            console.failure("Failed to stop dynamic analysis.");
            summary.fail(Step::StopDynamicAnalysis);
        }
    }
}
