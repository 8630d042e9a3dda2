//! Check the corpus and print diagnostics

use anyhow::Result;
use std::io::Write;

use crate::report::{Report, Status};
use crate::Site;

/// Check every document; returns the report so the caller can pick an exit code
pub fn run(site: &Site, strict: bool) -> Result<Report> {
    let start = std::time::Instant::now();
    let report = site.check()?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, &report, strict)?;

    tracing::info!(
        "Checked {} documents in {:.2}s",
        report.items.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(report)
}

/// Print items that need attention, then the summary line
pub fn write_report<W: Write>(out: &mut W, report: &Report, strict: bool) -> Result<()> {
    for item in &report.items {
        if item.status == Status::Ready {
            continue;
        }
        writeln!(out, "{} [{}]", item.source, item.status)?;
        for message in &item.messages {
            writeln!(out, "  {}", message)?;
        }
    }

    let verdict = if report.has_errors(strict) {
        "FAILED"
    } else {
        "OK"
    };
    writeln!(out, "{}: {}", verdict, report.summary())?;

    Ok(())
}
