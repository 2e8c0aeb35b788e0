//! Report writing: the one in-tree "external collaborator" that turns a
//! [`fontdiff::diff_fonts::DiffReport`] into an HTML bundle on disk.

use std::path::Path;

use fontdiff::{Font, diff_fonts::DiffReport};

pub mod html;

/// Writes `<out_dir>/index.html` for a finished diff report.
pub fn write_report(
    report: &DiffReport,
    before: &Font,
    after: &Font,
    out_dir: &Path,
) -> anyhow::Result<()> {
    let page = html::render(report, before, after)?;
    std::fs::write(out_dir.join("index.html"), page)?;
    Ok(())
}
