use serde::Serialize;
use std::io::Write;

use super::{DiffReport, MappingReport, MatchListReport, PresentationSink, ReverseReport};
use crate::domain::ExportError;

/// Writes each report as one pretty-printed JSON document
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write<T: Serialize>(&mut self, value: &T) -> Result<(), ExportError> {
        serde_json::to_writer_pretty(&mut self.writer, value)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> PresentationSink for JsonSink<W> {
    fn matches(&mut self, report: &MatchListReport) -> Result<(), ExportError> {
        self.write(report)
    }

    fn mapping(&mut self, report: &MappingReport) -> Result<(), ExportError> {
        self.write(report)
    }

    fn location(&mut self, report: &ReverseReport) -> Result<(), ExportError> {
        self.write(report)
    }

    fn diff(&mut self, report: &DiffReport) -> Result<(), ExportError> {
        self.write(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::LocationReport;
    use std::path::PathBuf;

    #[test]
    fn test_location_is_valid_json() {
        let mut sink = JsonSink::new(Vec::new());
        sink.location(&ReverseReport {
            asm_file: PathBuf::from("build/k.s"),
            asm_line: 12,
            symbol: Some("_Z6kernelPi".to_string()),
            source: Some(LocationReport { file: PathBuf::from("/p/a.hip"), line: 5 }),
        })
        .unwrap();

        let json: serde_json::Value = serde_json::from_slice(&sink.into_inner()).unwrap();
        assert_eq!(json["asmLine"], 12);
        assert_eq!(json["source"]["file"], "/p/a.hip");
        assert_eq!(json["source"]["line"], 5);
    }

    #[test]
    fn test_unlocated_line_omits_source() {
        let mut sink = JsonSink::new(Vec::new());
        sink.location(&ReverseReport {
            asm_file: PathBuf::from("build/k.s"),
            asm_line: 1,
            symbol: None,
            source: None,
        })
        .unwrap();

        let json: serde_json::Value = serde_json::from_slice(&sink.into_inner()).unwrap();
        assert!(json.get("source").is_none());
        assert!(json.get("symbol").is_none());
    }
}
