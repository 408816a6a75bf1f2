use crate::model::HomeworkRecord;
use crate::roster;
use anyhow::Context;
use csv::{QuoteStyle, Terminator, WriterBuilder};

const HEADER: [&str; 5] = ["日期", "作業名稱", "座號", "姓名", "狀態"];
const UTF8_BOM: &str = "\u{feff}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub file_name_prefix: String,
    /// RFC 4180 quoting of fields that need it. Off writes fields raw, the
    /// old comma join, which breaks on names containing commas.
    pub quote_fields: bool,
    pub include_bom: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            file_name_prefix: "作業紀錄".to_string(),
            quote_fields: true,
            include_bom: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CsvExport {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub row_count: usize,
}

/// Renders every record in store order. Returns `None` for an empty store.
pub fn export_records(
    records: &[HomeworkRecord],
    today: &str,
    opts: &ExportOptions,
) -> anyhow::Result<Option<CsvExport>> {
    if records.is_empty() {
        return Ok(None);
    }

    let mut buf = Vec::new();
    if opts.include_bom {
        buf.extend_from_slice(UTF8_BOM.as_bytes());
    }
    let quote_style = if opts.quote_fields {
        QuoteStyle::Necessary
    } else {
        QuoteStyle::Never
    };
    let mut wtr = WriterBuilder::new()
        .quote_style(quote_style)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buf);

    wtr.write_record(HEADER).context("failed to write CSV header")?;
    for r in records {
        let student = roster::find(r.student_id);
        wtr.write_record([
            r.date.clone(),
            r.homework_name.clone(),
            student.map(|s| s.id.to_string()).unwrap_or_default(),
            student.map(|s| s.name.to_string()).unwrap_or_default(),
            r.status.label().to_string(),
        ])
        .with_context(|| format!("failed to write CSV row for record {}", r.id))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to finalize CSV: {}", e.error()))?;

    Ok(Some(CsvExport {
        file_name: format!("{}_{}.csv", opts.file_name_prefix, today),
        bytes,
        row_count: records.len(),
    }))
}
