//! Top-level run driver behind the binary.

use crate::cancel::CancellationToken;
use crate::cli::Cli;
use crate::config::RetentionConfig;
use crate::error::Result;
use crate::logging::Logger;
use crate::pipeline::{self, RunReport};
use crate::size::format_size;

/// Execute a run based on the parsed CLI arguments.
pub fn execute(cli: &Cli) -> Result<RunReport> {
    execute_with_cancel(cli, &CancellationToken::new())
}

/// Execute a run that stops early when `cancel` fires.
///
/// Configuration and log-sink errors are returned before the first file is
/// touched. Per-file problems are only logged and counted.
pub fn execute_with_cancel(cli: &Cli, cancel: &CancellationToken) -> Result<RunReport> {
    let opts = cli.global_opts();
    let config = cli.policy().to_config()?;
    let log = match opts.log_file() {
        Some(path) => Logger::to_file(path, opts.verbose(), opts.quiet())?,
        None => Logger::new(opts.verbose(), opts.quiet()),
    };

    log.start("---------- Starting jettison ----------");
    log_config(&config, &log);

    let result = pipeline::run_with_cancel(&config, &log, cancel);
    if let Ok(report) = &result {
        report.log_summary(&log);
    }

    log.end("---------- End jettison ----------");
    result
}

fn log_config(config: &RetentionConfig, log: &Logger) {
    log.debug(format!("--folder={}", config.folder().display()));
    log.debug(format!(
        "--max-size={}",
        config.max_size().map(format_size).unwrap_or_default()
    ));
    log.debug(format!("--same-file={}", config.same_file()));
    log.debug(format!("--delete-action={}", config.action()));
    if let crate::config::DeleteAction::Move(dest) = config.action() {
        log.debug(format!("--deleted-folder={}", dest.display()));
    }
    log.debug(format!(
        "--ignore={}",
        config.ignore().map(|re| re.as_str()).unwrap_or_default()
    ));
    log.debug(format!("--tie-break={:?}", config.tie_break()));
    log.debug(format!("--queue-capacity={:?}", config.queue_bound()));
    if config.dry_run() {
        log.info("Dry run: no files will be removed");
    }
}
