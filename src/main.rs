//! # jettison CLI
//!
//! Deletes old files one by one when a trigger fires, so a data folder never
//! needs cleaning by hand.
//!
//! ## Quick Start
//!
//! ```bash
//! # Keep captures under 5 GiB, oldest first
//! jettison --folder /data/captures --max-size 5G
//!
//! # Drop older copies of identical files, then enforce the budget
//! jettison --folder /data/captures --same-file --max-size 5G
//! ```
//!
//! ## Environment Variables
//!
//! Every option can also be given as `JETTISON_<OPTION>`, for example
//! `JETTISON_FOLDER` or `JETTISON_MAX_SIZE`.

use std::io::IsTerminal;

use jettison::cancel::CancellationToken;
use jettison::cli::Cli;

fn main() -> miette::Result<()> {
    miette::set_panic_hook();

    // Plain output when stderr is not a terminal (cron, CI, log files)
    if std::io::stderr().is_terminal() {
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::unicode_nocolor())
                    .with_context_lines(3),
            )
        }))?;
    } else {
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::none())
                    .with_context_lines(0),
            )
        }))?;
    }

    let cli = Cli::parse_args();

    // Ctrl-C lets the in-flight deletion finish and still prints the report
    let cancel = CancellationToken::new();
    jettison::interrupt::cancel_on_interrupt(&cancel)?;

    jettison::commands::execute_with_cancel(&cli, &cancel)?;
    Ok(())
}
