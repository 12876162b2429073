//! `.xlsx` persistence for the report artifact.
//!
//! The data sheet holds one row per record with a band-coloured fill. The
//! metadata sheet is rebuilt from the whole artifact on every save. Writes go
//! to a temp file beside the target and are renamed into place.

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::NaiveDateTime;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet, XlsxError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::{Artifact, ArtifactSummary, ReportRow};
use crate::app::ports::ArtifactStorePort;
use crate::constants::{METADATA_SHEET_NAME, REPORT_COLUMNS, RUN_TIMESTAMP_FORMAT};
use crate::error::{Result, ScraperError};
use crate::pipeline::processing::quality_gate::QualityBand;

const HEADER_FILL: u32 = 0x4472C4;
const BORDER_COLOR: u32 = 0xBFBFBF;
const COLUMN_WIDTHS: [f64; 8] = [30.0, 20.0, 22.0, 22.0, 18.0, 14.0, 70.0, 20.0];

/// Artifact store backed by one workbook on disk
#[derive(Debug, Clone)]
pub struct XlsxArtifactStore {
    path: PathBuf,
    sheet_name: String,
}

impl XlsxArtifactStore {
    pub fn new(path: impl Into<PathBuf>, sheet_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet_name: sheet_name.into(),
        }
    }

    fn persistence_error(&self, message: impl ToString) -> ScraperError {
        ScraperError::persistence(&self.path, message)
    }

    fn read_rows(&self) -> Result<Vec<ReportRow>> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path)
            .map_err(|e| self.persistence_error(format!("cannot open workbook: {e}")))?;
        let range = workbook
            .worksheet_range(&self.sheet_name)
            .map_err(|e| self.persistence_error(format!("cannot read sheet '{}': {e}", self.sheet_name)))?;

        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Ok(Vec::new());
        };
        let header: Vec<String> = header.iter().map(cell_text).collect();
        if header.len() < REPORT_COLUMNS.len()
            || header.iter().zip(REPORT_COLUMNS).any(|(found, expected)| found.trim() != expected)
        {
            return Err(self.persistence_error(format!(
                "sheet '{}' has unexpected columns: {}",
                self.sheet_name,
                header.join(", ")
            )));
        }

        rows.enumerate()
            .filter(|(_, cells)| cells.iter().any(|c| !matches!(c, Data::Empty)))
            .map(|(index, cells)| self.parse_row(index + 2, cells))
            .collect()
    }

    fn parse_row(&self, row_number: usize, cells: &[Data]) -> Result<ReportRow> {
        let text = |i: usize| cells.get(i).map(cell_text).unwrap_or_default();
        let quality_score = match cells.get(5) {
            Some(Data::Float(f)) => *f,
            Some(Data::Int(i)) => *i as f64,
            Some(Data::String(s)) => s.trim().parse().map_err(|_| {
                self.persistence_error(format!("row {row_number}: quality_score '{s}' is not a number"))
            })?,
            _ => {
                return Err(self.persistence_error(format!(
                    "row {row_number}: quality_score is missing"
                )))
            }
        };

        Ok(ReportRow {
            name: text(0),
            location: text(1),
            project_type: text(2),
            contact_name: text(3),
            mobile_number: text(4),
            quality_score,
            source_tags: text(6),
            run_timestamp: text(7),
        })
    }

    fn write_atomically(&self, bytes: &[u8]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .map_err(|e| self.persistence_error(format!("cannot create {}: {e}", dir.display())))?;

        let mut tmp = NamedTempFile::new_in(&dir)
            .map_err(|e| self.persistence_error(format!("cannot create temp file: {e}")))?;
        tmp.write_all(bytes)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| self.persistence_error(format!("cannot write temp file: {e}")))?;
        tmp.persist(&self.path)
            .map_err(|e| self.persistence_error(format!("cannot replace artifact: {}", e.error)))?;
        Ok(())
    }
}

impl ArtifactStorePort for XlsxArtifactStore {
    fn location(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Option<Artifact>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no existing artifact; starting fresh");
            return Ok(None);
        }
        let rows = self.read_rows()?;
        info!(path = %self.path.display(), rows = rows.len(), "loaded existing artifact");
        Ok(Some(Artifact::new(rows)))
    }

    fn save(&self, artifact: &Artifact, generated_at: NaiveDateTime) -> Result<()> {
        let bytes = build_workbook(artifact, &self.sheet_name, generated_at)
            .map_err(|e| self.persistence_error(format!("cannot build workbook: {e}")))?;
        self.write_atomically(&bytes)?;
        info!(path = %self.path.display(), rows = artifact.len(), "artifact written");
        Ok(())
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Serialize the artifact into workbook bytes
pub fn build_workbook(
    artifact: &Artifact,
    sheet_name: &str,
    generated_at: NaiveDateTime,
) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    workbook.push_worksheet(data_sheet(artifact, sheet_name)?);
    workbook.push_worksheet(metadata_sheet(&artifact.summary(), generated_at)?);
    workbook.save_to_buffer()
}

fn bordered() -> Format {
    Format::new()
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(BORDER_COLOR))
}

fn header_format() -> Format {
    bordered()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL))
}

fn data_sheet(artifact: &Artifact, sheet_name: &str) -> std::result::Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name(sheet_name)?;

    let header = header_format();
    for (col, title) in REPORT_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
        sheet.set_column_width(col as u16, COLUMN_WIDTHS[col])?;
    }

    let band_formats: Vec<(QualityBand, Format, Format)> = QualityBand::ALL
        .iter()
        .map(|band| {
            let text = bordered().set_background_color(Color::RGB(band.fill_color()));
            let score = text.clone().set_num_format("0.00");
            (*band, text, score)
        })
        .collect();

    for (index, row) in artifact.rows.iter().enumerate() {
        let r = (index + 1) as u32;
        let band = row.band();
        let Some((_, text, score)) = band_formats.iter().find(|(b, _, _)| *b == band) else {
            continue;
        };
        sheet.write_string_with_format(r, 0, &row.name, text)?;
        sheet.write_string_with_format(r, 1, &row.location, text)?;
        sheet.write_string_with_format(r, 2, &row.project_type, text)?;
        sheet.write_string_with_format(r, 3, &row.contact_name, text)?;
        sheet.write_string_with_format(r, 4, &row.mobile_number, text)?;
        sheet.write_number_with_format(r, 5, row.quality_score, score)?;
        sheet.write_string_with_format(r, 6, &row.source_tags, text)?;
        sheet.write_string_with_format(r, 7, &row.run_timestamp, text)?;
    }

    sheet.set_freeze_panes(1, 0)?;
    if !artifact.is_empty() {
        sheet.autofilter(0, 0, artifact.len() as u32, (REPORT_COLUMNS.len() - 1) as u16)?;
    }
    Ok(sheet)
}

fn metadata_sheet(
    summary: &ArtifactSummary,
    generated_at: NaiveDateTime,
) -> std::result::Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name(METADATA_SHEET_NAME)?;
    sheet.set_column_width(0, 28.0)?;
    sheet.set_column_width(1, 24.0)?;

    let header = header_format();
    let label = Format::new().set_bold();
    let score = Format::new().set_num_format("0.00");
    let assessment = &summary.assessment;

    sheet.write_string_with_format(0, 0, "Property", &header)?;
    sheet.write_string_with_format(0, 1, "Value", &header)?;

    let mut row: u32 = 1;
    sheet.write_string_with_format(row, 0, "Generated At", &label)?;
    sheet.write_string(row, 1, generated_at.format(RUN_TIMESTAMP_FORMAT).to_string())?;
    row += 1;
    sheet.write_string_with_format(row, 0, "Total Records", &label)?;
    sheet.write_number(row, 1, summary.total_records as f64)?;
    row += 1;
    sheet.write_string_with_format(row, 0, "Runs Recorded", &label)?;
    sheet.write_number(row, 1, summary.runs_recorded as f64)?;
    row += 1;
    for (title, value) in [
        ("Average Quality Score", assessment.average),
        ("Minimum Quality Score", assessment.min),
        ("Maximum Quality Score", assessment.max),
    ] {
        sheet.write_string_with_format(row, 0, title, &label)?;
        sheet.write_number_with_format(row, 1, value, &score)?;
        row += 1;
    }

    row += 1;
    sheet.write_string_with_format(row, 0, "Quality Bands", &header)?;
    sheet.write_string_with_format(row, 1, "Records", &header)?;
    row += 1;
    for band in QualityBand::ALL {
        let fill = Format::new().set_background_color(Color::RGB(band.fill_color()));
        sheet.write_string_with_format(row, 0, band.label(), &fill)?;
        sheet.write_number(row, 1, assessment.bands.get(band) as f64)?;
        row += 1;
    }

    for (title, counts) in [
        ("Project Types", &summary.project_types),
        ("Locations", &summary.locations),
    ] {
        row += 1;
        sheet.write_string_with_format(row, 0, title, &header)?;
        sheet.write_string_with_format(row, 1, "Records", &header)?;
        row += 1;
        for (value, count) in counts {
            sheet.write_string(row, 0, value)?;
            sheet.write_number(row, 1, *count as f64)?;
            row += 1;
        }
    }

    Ok(sheet)
}
