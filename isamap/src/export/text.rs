// Report rendering builds strings piecewise with format!
#![allow(clippy::format_push_string)]

use std::io::Write;
use std::path::Path;

use super::{
    DiffReport, LocationReport, MappingReport, MatchListReport, MatchReport, PresentationSink,
    ReverseReport,
};
use crate::domain::ExportError;

/// Widest left column of a side-by-side diff
const MAX_DIFF_COLUMN: usize = 60;

/// Human-readable terminal output
pub struct TextSink<W: Write> {
    writer: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PresentationSink for TextSink<W> {
    fn matches(&mut self, report: &MatchListReport) -> Result<(), ExportError> {
        let query = match report.line {
            Some(line) => format!("{}:{line}", report.query.display()),
            None => report.query.display().to_string(),
        };

        if report.matches.is_empty() {
            writeln!(self.writer, "no kernels reference {query}")?;
            return Ok(());
        }

        writeln!(self.writer, "{query}: {} kernel(s)", report.matches.len())?;
        for (idx, m) in report.matches.iter().enumerate() {
            writeln!(self.writer, "{}", format_match(idx, m))?;
        }
        Ok(())
    }

    fn mapping(&mut self, report: &MappingReport) -> Result<(), ExportError> {
        let k = &report.kernel;
        writeln!(
            self.writer,
            "{} [{}] {}:{}-{}",
            k.display_name,
            k.build_tag,
            k.asm_file.display(),
            k.start_line,
            k.end_line
        )?;
        if k.outdated {
            writeln!(self.writer, "  outdated: a newer build exists in {}", k.latest_build_tag)?;
        }

        for line in &report.lines {
            let marker = if line.highlighted { '>' } else { ' ' };
            let source = line.source.as_ref().map(format_location).unwrap_or_default();
            writeln!(
                self.writer,
                "{:>6} {marker} {:<56} {source}",
                line.asm_line,
                line.text.trim_end()
            )?;
        }
        Ok(())
    }

    fn location(&mut self, report: &ReverseReport) -> Result<(), ExportError> {
        let symbol = report.symbol.as_deref().unwrap_or("<no kernel>");
        match &report.source {
            Some(loc) => writeln!(
                self.writer,
                "{}:{} ({symbol}) -> {}:{}",
                report.asm_file.display(),
                report.asm_line,
                loc.file.display(),
                loc.line
            )?,
            None => writeln!(
                self.writer,
                "{}:{} ({symbol}) has no source location",
                report.asm_file.display(),
                report.asm_line
            )?,
        }
        Ok(())
    }

    fn diff(&mut self, report: &DiffReport) -> Result<(), ExportError> {
        writeln!(
            self.writer,
            "{}: {} vs {} ({} of {} lines differ)",
            report.display_name,
            report.left.build_tag,
            report.right.build_tag,
            report.changed_lines,
            report.rows.len()
        )?;
        for side in [&report.left, &report.right] {
            if side.outdated {
                writeln!(self.writer, "  {} is outdated", side.build_tag)?;
            }
        }

        let width = report
            .rows
            .iter()
            .map(|r| r.left.trim_end().len())
            .max()
            .unwrap_or(0)
            .min(MAX_DIFF_COLUMN);

        for row in &report.rows {
            let marker = if row.changed { '*' } else { ' ' };
            let left = truncate(row.left.trim_end(), width);
            writeln!(self.writer, "{marker} {left:<width$} | {}", row.right.trim_end())?;
        }
        Ok(())
    }
}

fn format_match(idx: usize, m: &MatchReport) -> String {
    let mut output = format!(
        "  [{idx}] {} [{}] {}:{}-{}",
        m.display_name,
        m.build_tag,
        m.asm_file.display(),
        m.start_line,
        m.end_line
    );
    if !m.asm_lines.is_empty() {
        let lines: Vec<String> = m.asm_lines.iter().map(ToString::to_string).collect();
        output.push_str(&format!("\n      asm lines: {}", lines.join(", ")));
    }
    if m.outdated {
        output.push_str(&format!("\n      outdated (latest: {})", m.latest_build_tag));
    }
    output
}

fn format_location(loc: &LocationReport) -> String {
    let name = loc.file.file_name().unwrap_or(loc.file.as_os_str());
    format!("{}:{}", Path::new(name).display(), loc.line)
}

fn truncate(text: &str, width: usize) -> &str {
    match text.char_indices().nth(width) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
