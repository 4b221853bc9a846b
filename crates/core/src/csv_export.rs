//! CSV export of symbol counts
//!
//! Two layouts:
//! - totals: `Symbol,Color,Size,Count`, one row per symbol
//! - by page: `Symbol,Color,Size,Page,Count`, one row per page on which the
//!   symbol appears, or a single `"All",0` row for a symbol that was never
//!   placed
//!
//! The header line is plain. Every data field is quoted except the bare `0`
//! count of a never-placed symbol.

use crate::store::TakeoffSession;
use chrono::NaiveDate;
use std::io::Write;
use std::path::{Path, PathBuf};

const TOTALS_HEADER: &str = "Symbol,Color,Size,Count";
const BY_PAGE_HEADER: &str = "Symbol,Color,Size,Page,Count";

/// Error types for CSV export
#[derive(Debug, thiserror::Error)]
pub enum CsvExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),
}

pub type CsvExportResult<T> = Result<T, CsvExportError>;

/// Which table to export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvExportMode {
    #[default]
    Totals,
    ByPage,
}

impl CsvExportMode {
    fn header(&self) -> &'static str {
        match self {
            CsvExportMode::Totals => TOTALS_HEADER,
            CsvExportMode::ByPage => BY_PAGE_HEADER,
        }
    }

    fn file_prefix(&self) -> &'static str {
        match self {
            CsvExportMode::Totals => "takeoff-data",
            CsvExportMode::ByPage => "takeoff-data-by-page",
        }
    }
}

/// Download name for an export made on `date`, e.g. `takeoff-data-2024-03-09.csv`
pub fn export_file_name(mode: CsvExportMode, date: NaiveDate) -> String {
    format!("{}-{}.csv", mode.file_prefix(), date.format("%Y-%m-%d"))
}

/// Write the table for `mode`
pub fn export_csv<W: Write>(writer: W, session: &TakeoffSession, mode: CsvExportMode) -> CsvExportResult<()> {
    match mode {
        CsvExportMode::Totals => export_totals_csv(writer, session),
        CsvExportMode::ByPage => export_page_counts_csv(writer, session),
    }
}

/// Export one row per symbol with its total count
pub fn export_totals_csv<W: Write>(writer: W, session: &TakeoffSession) -> CsvExportResult<()> {
    let mut csv_writer = quoted_writer(writer, CsvExportMode::Totals)?;

    for symbol in session.symbols() {
        csv_writer.write_record(&[
            symbol.name().to_string(),
            symbol.color().to_string(),
            symbol.size().to_string(),
            session.symbol_count(symbol.id()).to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Export one row per (symbol, page with markers)
pub fn export_page_counts_csv<W: Write>(writer: W, session: &TakeoffSession) -> CsvExportResult<()> {
    let mut csv_writer = quoted_writer(writer, CsvExportMode::ByPage)?;

    for symbol in session.symbols() {
        let name = symbol.name().to_string();
        let color = symbol.color().to_string();
        let size = symbol.size().to_string();

        let page_counts = session.symbol_page_counts(symbol.id());
        if page_counts.is_empty() {
            write_unplaced_row(&mut csv_writer, [name.as_str(), color.as_str(), size.as_str()])?;
            continue;
        }

        for page_count in page_counts {
            csv_writer.write_record(&[
                name.clone(),
                color.clone(),
                size.clone(),
                page_count.page.to_string(),
                page_count.count.to_string(),
            ])?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write an export into `dir` under its dated file name
///
/// The table is written to a temporary file in the same directory and renamed
/// into place, so a failed export leaves no partial file behind.
pub fn write_csv_export(
    dir: &Path,
    session: &TakeoffSession,
    mode: CsvExportMode,
    date: NaiveDate,
) -> CsvExportResult<PathBuf> {
    let path = dir.join(export_file_name(mode, date));
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;

    export_csv(&mut temp, session, mode)?;
    temp.persist(&path).map_err(|e| e.error)?;

    log::debug!("wrote {:?} export to {}", mode, path.display());
    Ok(path)
}

/// Row for a symbol with no markers: quoted fields, then `"All",0` with a bare count
fn write_unplaced_row<W: Write>(csv_writer: &mut csv::Writer<W>, fields: [&str; 3]) -> CsvExportResult<()> {
    csv_writer.flush()?;
    {
        // Terminating the record with a comma leaves the line open for the count
        let mut prefix = csv::WriterBuilder::new()
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Always)
            .terminator(csv::Terminator::Any(b','))
            .from_writer(csv_writer.get_mut());
        prefix.write_record([fields[0], fields[1], fields[2], "All"])?;
        prefix.flush()?;
    }
    writeln!(csv_writer.get_mut(), "0")?;
    Ok(())
}

/// Plain header line followed by a writer that quotes every field
fn quoted_writer<W: Write>(mut writer: W, mode: CsvExportMode) -> CsvExportResult<csv::Writer<W>> {
    writeln!(writer, "{}", mode.header())?;

    Ok(csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::PageCoordinate;
    use crate::loader::DocumentUpload;
    use crate::symbol::{SymbolDraft, SymbolShape};

    fn session_with_pages(pages: u32) -> TakeoffSession {
        let mut session = TakeoffSession::default();
        let token = session
            .load_document(DocumentUpload::new("plan.pdf", "application/pdf", Vec::new()))
            .unwrap();
        session.on_document_loaded(token, pages).unwrap();
        session
    }

    fn render(session: &TakeoffSession, mode: CsvExportMode) -> String {
        let mut output = Vec::new();
        export_csv(&mut output, session, mode).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_file_names() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_file_name(CsvExportMode::Totals, date), "takeoff-data-2024-03-09.csv");
        assert_eq!(
            export_file_name(CsvExportMode::ByPage, date),
            "takeoff-data-by-page-2024-03-09.csv"
        );
    }

    #[test]
    fn test_empty_exports_are_header_only() {
        let session = TakeoffSession::default();
        assert_eq!(render(&session, CsvExportMode::Totals), "Symbol,Color,Size,Count\n");
        assert_eq!(
            render(&session, CsvExportMode::ByPage),
            "Symbol,Color,Size,Page,Count\n"
        );
    }

    #[test]
    fn test_totals() {
        let mut session = session_with_pages(2);
        let door = session
            .add_symbol(SymbolDraft::new("Door", "#FF0000", SymbolShape::Circle))
            .unwrap();
        session
            .add_symbol(SymbolDraft::new("Window", "#0000FF", SymbolShape::Square).with_size(16.0))
            .unwrap();
        session.add_annotation(door, 1, PageCoordinate::new(1.0, 1.0)).unwrap();
        session.add_annotation(door, 2, PageCoordinate::new(1.0, 1.0)).unwrap();

        assert_eq!(
            render(&session, CsvExportMode::Totals),
            "Symbol,Color,Size,Count\n\
             \"Door\",\"#FF0000\",\"24\",\"2\"\n\
             \"Window\",\"#0000FF\",\"16\",\"0\"\n"
        );
    }

    #[test]
    fn test_by_page() {
        let mut session = session_with_pages(3);
        let door = session
            .add_symbol(SymbolDraft::new("Door", "#FF0000", SymbolShape::Circle))
            .unwrap();
        session
            .add_symbol(SymbolDraft::new("Window", "#0000FF", SymbolShape::Square))
            .unwrap();
        for page in [3, 1, 3] {
            session.add_annotation(door, page, PageCoordinate::new(1.0, 1.0)).unwrap();
        }

        assert_eq!(
            render(&session, CsvExportMode::ByPage),
            "Symbol,Color,Size,Page,Count\n\
             \"Door\",\"#FF0000\",\"24\",\"1\",\"1\"\n\
             \"Door\",\"#FF0000\",\"24\",\"3\",\"2\"\n\
             \"Window\",\"#0000FF\",\"24\",\"All\",0\n"
        );
    }

    #[test]
    fn test_names_with_quotes_are_escaped() {
        let mut session = session_with_pages(1);
        session
            .add_symbol(SymbolDraft::new("36\" door, double", "#000000", SymbolShape::Custom))
            .unwrap();

        let csv = render(&session, CsvExportMode::Totals);
        assert!(csv.contains("\"36\"\" door, double\""));
    }

    #[test]
    fn test_write_csv_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_with_pages(1);
        session
            .add_symbol(SymbolDraft::new("Door", "#FF0000", SymbolShape::Circle))
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();

        let path = write_csv_export(dir.path(), &session, CsvExportMode::Totals, date).unwrap();
        assert_eq!(path.file_name().unwrap(), "takeoff-data-2025-12-31.csv");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Symbol,Color,Size,Count\n"));

        // Only the final file remains
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let result = write_csv_export(&missing, &TakeoffSession::default(), CsvExportMode::Totals, date);
        assert!(matches!(result, Err(CsvExportError::Io(_))));
    }

    #[test]
    fn test_unplaced_symbol_row_has_bare_count() {
        let mut session = session_with_pages(2);
        session
            .add_symbol(SymbolDraft::new("Door, \"main\"", "#FF0000", SymbolShape::Circle))
            .unwrap();
        let window = session
            .add_symbol(SymbolDraft::new("Window", "#0000FF", SymbolShape::Square))
            .unwrap();
        session.add_annotation(window, 2, PageCoordinate::new(1.0, 1.0)).unwrap();

        assert_eq!(
            render(&session, CsvExportMode::ByPage),
            "Symbol,Color,Size,Page,Count\n\
             \"Door, \"\"main\"\"\",\"#FF0000\",\"24\",\"All\",0\n\
             \"Window\",\"#0000FF\",\"24\",\"2\",\"1\"\n"
        );
    }
}
