use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use log::info;
use rust_xlsxwriter::{Image, Workbook};
use serde::Serialize;

use crate::utils::config::TableFormat;
use crate::utils::file_ops::{ensure_parent_directory, has_content};
use crate::{FileRecord, MediaError, Result};

const MAX_ROWS: u32 = 1_048_576;
const MAX_COLS: u32 = 16_384;

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(b) => b.to_string(),
        }
    }
}

/// Cell values of one worksheet, indexed from A1.
#[derive(Debug, Clone)]
struct Sheet {
    name: String,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rows: Vec::new(),
        }
    }

    fn push_row(&mut self, values: impl IntoIterator<Item = String>) {
        self.rows.push(
            values
                .into_iter()
                .map(|v| if v.is_empty() { Cell::Empty } else { Cell::Text(v) })
                .collect(),
        );
    }

    fn is_blank(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(|c| *c == Cell::Empty))
    }
}

/// Image placed on a named sheet when the workbook is written.
struct Placement<'a> {
    sheet: &'a str,
    image: &'a Path,
    row: u32,
    col: u16,
}

pub struct Reporter;

impl Reporter {
    pub fn new() -> Self {
        Self
    }

    /// Write `records` as a four-space indented JSON array. Non-ASCII text is
    /// written as-is.
    pub fn write_json(&self, records: &[FileRecord], output_path: impl AsRef<Path>) -> Result<()> {
        let output_path = output_path.as_ref();
        ensure_parent_directory(output_path)?;

        let mut writer = BufWriter::new(File::create(output_path)?);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
        records.serialize(&mut serializer)?;
        writer.flush()?;

        info!("JSON written: {} ({} records)", output_path.display(), records.len());
        Ok(())
    }

    /// Append `records` to the table at `output_path` in the given format.
    pub fn append_table(
        &self,
        records: &[FileRecord],
        output_path: impl AsRef<Path>,
        sheet_name: &str,
        format: TableFormat,
    ) -> Result<()> {
        match format {
            TableFormat::Xlsx => self.append_xlsx(records, output_path, sheet_name),
            TableFormat::Csv => self.append_csv(records, output_path),
        }
    }

    /// Append rows to a CSV file, writing the header only when the file is new.
    pub fn append_csv(&self, records: &[FileRecord], output_path: impl AsRef<Path>) -> Result<()> {
        let output_path = output_path.as_ref();
        ensure_parent_directory(output_path)?;
        let existed = has_content(output_path);

        let file = OpenOptions::new().create(true).append(true).open(output_path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        if !existed {
            writer.write_record(FileRecord::COLUMNS)?;
        }
        for record in records {
            writer.write_record(&record.to_row())?;
        }

        writer.flush()?;
        info!("CSV written: {} (+{} rows)", output_path.display(), records.len());
        Ok(())
    }

    /// Append rows below the last used row of `sheet_name`.
    ///
    /// An existing workbook is loaded and written back with every sheet's
    /// values; the target sheet is created when missing and receives a header
    /// row when it is blank.
    pub fn append_xlsx(
        &self,
        records: &[FileRecord],
        output_path: impl AsRef<Path>,
        sheet_name: &str,
    ) -> Result<()> {
        let output_path = output_path.as_ref();
        ensure_parent_directory(output_path)?;

        let mut sheets = if output_path.exists() {
            load_sheets(output_path)?
        } else {
            Vec::new()
        };

        let index = match sheets.iter().position(|s| s.name == sheet_name) {
            Some(index) => index,
            None => {
                sheets.push(Sheet::new(sheet_name));
                sheets.len() - 1
            }
        };
        let sheet = &mut sheets[index];

        if sheet.is_blank() {
            sheet.rows.clear();
            sheet.push_row(FileRecord::COLUMNS.iter().map(|c| c.to_string()));
        }
        for record in records {
            sheet.push_row(record.to_row());
        }

        save_sheets(&sheets, output_path, None)?;
        info!(
            "Spreadsheet written: {} sheet '{}' (+{} rows)",
            output_path.display(),
            sheet_name,
            records.len()
        );
        Ok(())
    }

    /// Every value of the `extension` column, header excluded.
    pub fn read_extensions(
        &self,
        table_path: impl AsRef<Path>,
        sheet_name: &str,
        format: TableFormat,
    ) -> Result<Vec<String>> {
        let table_path = table_path.as_ref();
        match format {
            TableFormat::Csv => {
                let mut reader = csv::Reader::from_path(table_path)?;
                let column = reader
                    .headers()?
                    .iter()
                    .position(|h| h == "extension")
                    .ok_or_else(|| missing_column(table_path))?;

                let mut values = Vec::new();
                for row in reader.records() {
                    values.push(row?.get(column).unwrap_or_default().to_string());
                }
                Ok(values)
            }
            TableFormat::Xlsx => {
                let sheets = load_sheets(table_path)?;
                let sheet = sheets
                    .iter()
                    .find(|s| s.name == sheet_name)
                    .ok_or_else(|| {
                        MediaError::Spreadsheet(format!(
                            "{} has no sheet named '{}'",
                            table_path.display(),
                            sheet_name
                        ))
                    })?;

                let header = sheet.rows.first().ok_or_else(|| missing_column(table_path))?;
                let column = header
                    .iter()
                    .position(|c| *c == Cell::Text("extension".to_string()))
                    .ok_or_else(|| missing_column(table_path))?;

                Ok(sheet.rows[1..]
                    .iter()
                    .map(|row| row.get(column).map(Cell::as_text).unwrap_or_default())
                    .collect())
            }
        }
    }

    /// Place `image_path` on `sheet_name` with its top-left corner at `anchor`.
    pub fn embed_image(
        &self,
        workbook_path: impl AsRef<Path>,
        sheet_name: &str,
        image_path: impl AsRef<Path>,
        anchor: &str,
    ) -> Result<()> {
        let workbook_path = workbook_path.as_ref();
        let image_path = image_path.as_ref();
        let (row, col) = parse_cell_anchor(anchor)?;

        let sheets = load_sheets(workbook_path)?;
        if !sheets.iter().any(|s| s.name == sheet_name) {
            return Err(MediaError::Spreadsheet(format!(
                "{} has no sheet named '{}'",
                workbook_path.display(),
                sheet_name
            )));
        }

        let placement = Placement {
            sheet: sheet_name,
            image: image_path,
            row,
            col,
        };
        save_sheets(&sheets, workbook_path, Some(&placement))?;
        info!(
            "Embedded {} into {} at {}",
            image_path.display(),
            workbook_path.display(),
            anchor
        );
        Ok(())
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

fn missing_column(path: &Path) -> MediaError {
    MediaError::Spreadsheet(format!("{} has no 'extension' column", path.display()))
}

fn load_sheets(path: &Path) -> Result<Vec<Sheet>> {
    let mut workbook = open_workbook_auto(path)?;
    let mut sheets = Vec::new();

    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        let mut sheet = Sheet::new(&name);

        // Ranges start at the first used cell, not at A1
        let (first_row, first_col) = range.start().unwrap_or((0, 0));
        sheet.rows.resize(first_row as usize, Vec::new());

        for row in range.rows() {
            let mut cells = vec![Cell::Empty; first_col as usize];
            cells.extend(row.iter().map(convert_cell));
            sheet.rows.push(cells);
        }
        sheets.push(sheet);
    }

    Ok(sheets)
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        other => Cell::Text(other.to_string()),
    }
}

fn save_sheets(sheets: &[Sheet], path: &Path, placement: Option<&Placement<'_>>) -> Result<()> {
    let mut workbook = Workbook::new();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        for (r, row) in sheet.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    Cell::Empty => {}
                    Cell::Text(s) => {
                        worksheet.write_string(r, c, s)?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(r, c, *n)?;
                    }
                    Cell::Bool(b) => {
                        worksheet.write_boolean(r, c, *b)?;
                    }
                }
            }
        }

        if let Some(placement) = placement.filter(|p| p.sheet == sheet.name) {
            let image = Image::new(placement.image)?;
            worksheet.insert_image(placement.row, placement.col, &image)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// Zero-based (row, column) of an A1-style cell reference such as `H1`.
pub fn parse_cell_anchor(anchor: &str) -> Result<(u32, u16)> {
    let invalid = || MediaError::Config(format!("invalid cell reference '{}'", anchor));

    let anchor = anchor.trim();
    let split = anchor
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (letters, digits) = anchor.split_at(split);

    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid());
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        let value = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        col = col.checked_mul(26).and_then(|v| v.checked_add(value)).ok_or_else(invalid)?;
    }
    let row: u32 = digits.parse().map_err(|_| invalid())?;

    if row == 0 || row > MAX_ROWS || col > MAX_COLS {
        return Err(invalid());
    }
    Ok((row - 1, (col - 1) as u16))
}
