use crate::DeckContext;
use crate::output;
use crate::scanner::{self, ScanReport};
use anyhow::Result;

/// Print a report under the `New`, `Missing`, `Modified` and `Picked` headings.
pub fn print_report(report: &ScanReport) {
    output::file_list("New files", &report.new);
    output::file_list("Missing files", &report.missing);
    output::file_list("Modified files", &report.modified);
    output::file_list("Picked files", &report.picked);
}

/// Execute scan command - classify the working tree, optionally picking
/// everything new or modified.
///
/// # Errors
///
/// Returns an error if the scan or the pick transaction fails.
pub fn execute(ctx: &DeckContext, compute_hash: bool, pick: bool) -> Result<()> {
    let report = if pick {
        scanner::scan_and_pick(ctx, compute_hash)?
    } else {
        scanner::scan(ctx, compute_hash)?
    };

    if report.is_clean() {
        output::info("Nothing to report");
        return Ok(());
    }

    print_report(&report);
    Ok(())
}
