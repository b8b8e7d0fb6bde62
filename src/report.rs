use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::types::{AnalysisResult, FinalReport};
use crate::Result;

/// Writes `report` as four-space indented JSON, replacing any existing file.
pub fn write_report(path: &Path, report: &FinalReport) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_json(&mut writer, report)?;
    writer.flush()?;
    tracing::info!("Results saved to {}", path.display());
    Ok(())
}

fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)?;
    Ok(())
}

/// The analysis as plain paragraphs, in schema order.
pub fn render_analysis(analysis: &AnalysisResult) -> String {
    let mut out = String::from("Analysis Summary:\n");
    for paragraph in analysis.paragraphs() {
        out.push('\n');
        out.push_str(paragraph);
        out.push('\n');
    }
    out
}
