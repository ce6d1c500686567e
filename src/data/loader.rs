use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{CompositionRow, CompositionTable};
use crate::error::TernaryError;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Text-based layouts that can be parsed straight from a byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    Json,
}

/// Load a composition table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` – header row, then `label, A, B, C` per row
/// * `.json`         – pandas `orient="split"`: `{"columns": [...], "data": [[...], ...]}`
/// * `.parquet`      – first column label, next three numeric
/// * `.xlsx` / `.xls` / `.ods` – first worksheet, same layout as CSV
///
/// Columns beyond the fourth are ignored.
pub fn load_file(path: &Path) -> Result<CompositionTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let format = match ext.as_str() {
        "parquet" | "pq" => return load_parquet(path),
        "xlsx" | "xlsm" | "xls" | "ods" => return load_workbook(path),
        "csv" => TableFormat::Csv,
        "tsv" | "tab" => TableFormat::Tsv,
        "json" => TableFormat::Json,
        other => {
            return Err(TernaryError::input_format(format!(
                "unsupported file extension: .{other}"
            ))
            .into())
        }
    };

    let bytes =
        std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    parse_table(&bytes, format)
}

/// Parse an in-memory CSV/TSV/JSON table.
pub fn parse_table(bytes: &[u8], format: TableFormat) -> Result<CompositionTable> {
    match format {
        TableFormat::Csv => parse_delimited(bytes, b','),
        TableFormat::Tsv => parse_delimited(bytes, b'\t'),
        TableFormat::Json => parse_json(bytes),
    }
}

// ---------------------------------------------------------------------------
// Row validation shared by every format
// ---------------------------------------------------------------------------

/// `row` is `None` for the header.
fn check_width(n_columns: usize, row: Option<usize>) -> Result<(), TernaryError> {
    if n_columns < 4 {
        let place = match row {
            Some(row) => format!("row {row}"),
            None => "header".to_string(),
        };
        return Err(TernaryError::input_format(format!(
            "{place}: expected at least 4 columns (label, A, B, C), found {n_columns}"
        )));
    }
    Ok(())
}

fn header_names(headers: &[String]) -> [String; 3] {
    [headers[1].clone(), headers[2].clone(), headers[3].clone()]
}

/// Check that a composition amount is finite and non-negative.
fn checked_amount(value: f64, row: usize, column: &str) -> Result<f64, TernaryError> {
    if !value.is_finite() {
        return Err(TernaryError::input_format(format!(
            "row {row}, column '{column}': value is not finite"
        )));
    }
    if value < 0.0 {
        return Err(TernaryError::input_format(format!(
            "row {row}, column '{column}': negative amount {value}"
        )));
    }
    Ok(value)
}

fn parse_amount(cell: &str, row: usize, column: &str) -> Result<f64, TernaryError> {
    let value = cell.trim().parse::<f64>().map_err(|_| {
        TernaryError::input_format(format!(
            "row {row}, column '{column}': '{cell}' is not a number"
        ))
    })?;
    checked_amount(value, row, column)
}

// ---------------------------------------------------------------------------
// CSV / TSV loader
// ---------------------------------------------------------------------------

/// Layout: header row with column names, then one row per compound.
fn parse_delimited(bytes: &[u8], delimiter: u8) -> Result<CompositionTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| TernaryError::input_format(format!("reading header row: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    check_width(headers.len(), None)?;
    let names = header_names(&headers);

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| TernaryError::input_format(format!("row {row_no}: {e}")))?;

        // Blank trailing lines from spreadsheet exports.
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        check_width(record.len(), Some(row_no))?;

        let label = record.get(0).unwrap_or_default().to_string();
        let a = parse_amount(&record[1], row_no, &names[0])?;
        let b = parse_amount(&record[2], row_no, &names[1])?;
        let c = parse_amount(&record[3], row_no, &names[2])?;
        rows.push(CompositionRow::new(label, a, b, c));
    }

    Ok(CompositionTable::new(names, rows)?)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// `df.to_json(orient="split")` layout; `index` is accepted and ignored.
///
/// ```json
/// {
///   "columns": ["Compound", "Sr", "Mo", "O"],
///   "data": [["SrO", 1, 0, 1], ["MoO3", 0, 1, 3]]
/// }
/// ```
#[derive(Debug, Deserialize)]
struct SplitTable {
    columns: Vec<String>,
    data: Vec<Vec<JsonValue>>,
}

fn parse_json(bytes: &[u8]) -> Result<CompositionTable> {
    let split: SplitTable = serde_json::from_slice(bytes).map_err(|e| {
        TernaryError::input_format(format!("expected a split-oriented JSON table: {e}"))
    })?;
    check_width(split.columns.len(), None)?;
    let names = header_names(&split.columns);

    let mut rows = Vec::with_capacity(split.data.len());
    for (row_no, cells) in split.data.iter().enumerate() {
        check_width(cells.len(), Some(row_no))?;

        let label = match &cells[0] {
            JsonValue::String(s) => s.clone(),
            JsonValue::Null => String::new(),
            other => other.to_string(),
        };
        let a = json_amount(&cells[1], row_no, &names[0])?;
        let b = json_amount(&cells[2], row_no, &names[1])?;
        let c = json_amount(&cells[3], row_no, &names[2])?;
        rows.push(CompositionRow::new(label, a, b, c));
    }

    Ok(CompositionTable::new(names, rows)?)
}

fn json_amount(val: &JsonValue, row: usize, column: &str) -> Result<f64, TernaryError> {
    match val {
        JsonValue::Number(n) => {
            let value = n.as_f64().ok_or_else(|| {
                TernaryError::input_format(format!("row {row}, column '{column}': {n} is out of range"))
            })?;
            checked_amount(value, row, column)
        }
        JsonValue::String(s) => parse_amount(s, row, column),
        other => Err(TernaryError::input_format(format!(
            "row {row}, column '{column}': {other} is not a number"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Read the first worksheet: header row, then `label, A, B, C` per row.
///
/// Numeric cells are taken as-is, text cells must parse as numbers.
fn load_workbook(path: &Path) -> Result<CompositionTable> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TernaryError::input_format("the workbook has no worksheets"))?
        .context("reading first worksheet")?;

    let mut sheet_rows = range.rows();
    let header = sheet_rows
        .next()
        .ok_or_else(|| TernaryError::input_format("the worksheet is empty"))?;
    let headers: Vec<String> = header[..used_width(header)]
        .iter()
        .map(|cell| cell.to_string())
        .collect();
    check_width(headers.len(), None)?;
    let names = header_names(&headers);

    let mut rows = Vec::new();
    for (row_no, cells) in sheet_rows.enumerate() {
        // A worksheet range is rectangular; blank rows come through as Empty cells.
        let width = used_width(cells);
        if width == 0 {
            continue;
        }
        check_width(cells.len(), Some(row_no))?;

        let label = cells[0].to_string();
        let a = sheet_amount(&cells[1], row_no, &names[0])?;
        let b = sheet_amount(&cells[2], row_no, &names[1])?;
        let c = sheet_amount(&cells[3], row_no, &names[2])?;
        rows.push(CompositionRow::new(label, a, b, c));
    }

    Ok(CompositionTable::new(names, rows)?)
}

/// Number of cells up to and including the last non-empty one.
fn used_width(cells: &[Data]) -> usize {
    cells
        .iter()
        .rposition(|cell| !matches!(cell, Data::Empty))
        .map_or(0, |last| last + 1)
}

fn sheet_amount(cell: &Data, row: usize, column: &str) -> Result<f64, TernaryError> {
    match cell {
        Data::Float(v) => checked_amount(*v, row, column),
        Data::Int(v) => checked_amount(*v as f64, row, column),
        Data::String(s) => parse_amount(s, row, column),
        Data::Empty => Err(TernaryError::input_format(format!(
            "row {row}, column '{column}': missing value"
        ))),
        other => Err(TernaryError::input_format(format!(
            "row {row}, column '{column}': '{other}' is not a number"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by Pandas (`df.to_parquet()`) or Polars.
///
/// Columns are taken by position: the first is cast to Utf8 for the label,
/// the next three are cast to Float64. Nulls and cells that fail the cast are
/// rejected.
fn load_parquet(path: &Path) -> Result<CompositionTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    check_width(headers.len(), None)?;
    let names = header_names(&headers);

    let reader = builder.build().context("building parquet reader")?;
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let labels = cast(batch.column(0), &DataType::Utf8)
            .map_err(|e| TernaryError::input_format(format!("label column: {e}")))?;
        let labels = labels.as_string::<i32>();

        let mut amounts = Vec::with_capacity(3);
        for (offset, name) in names.iter().enumerate() {
            let col = cast(batch.column(offset + 1), &DataType::Float64)
                .map_err(|e| TernaryError::input_format(format!("column '{name}': {e}")))?;
            amounts.push(col);
        }

        for i in 0..batch.num_rows() {
            let row_no = rows.len();
            let mut abc = [0.0; 3];
            for (slot, col) in amounts.iter().enumerate() {
                if col.is_null(i) {
                    return Err(TernaryError::input_format(format!(
                        "row {row_no}, column '{}': missing or non-numeric value",
                        names[slot]
                    ))
                    .into());
                }
                let value = col.as_primitive::<Float64Type>().value(i);
                abc[slot] = checked_amount(value, row_no, &names[slot])?;
            }
            let label = if labels.is_null(i) {
                String::new()
            } else {
                labels.value(i).to_string()
            };
            rows.push(CompositionRow::new(label, abc[0], abc[1], abc[2]));
        }
    }

    Ok(CompositionTable::new(names, rows)?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn input_error(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<TernaryError>(),
            Some(TernaryError::InputFormat(_))
        )
    }

    #[test]
    fn csv_rows_load_in_order_with_header_names() {
        let csv = "Compound,Sr,Mo,O\nSrO,1,0,1\nMoO3,0,1,3\nSrMoO4,1,1,4\n";
        let table = parse_table(csv.as_bytes(), TableFormat::Csv).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.component_names, ["Sr", "Mo", "O"]);
        assert_eq!(table.rows()[2], CompositionRow::new("SrMoO4", 1.0, 1.0, 4.0));
    }

    #[test]
    fn extra_columns_and_blank_lines_are_ignored() {
        let csv = "Label,A,B,C,Note\nX, 1.5 ,2,3,first\n,,,,\n";
        let table = parse_table(csv.as_bytes(), TableFormat::Csv).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].composition(), [1.5, 2.0, 3.0]);
    }

    #[test]
    fn tsv_uses_tab_delimiter() {
        let tsv = "Label\tA\tB\tC\nX\t1\t2\t3\n";
        let table = parse_table(tsv.as_bytes(), TableFormat::Tsv).unwrap();
        assert_eq!(table.rows()[0].label, "X");
    }

    #[test]
    fn too_few_columns_is_an_input_error() {
        let err = parse_table(b"Label,A,B\nX,1,2\n", TableFormat::Csv).unwrap_err();
        assert!(input_error(&err));
    }

    #[test]
    fn short_data_row_is_an_input_error() {
        let err = parse_table(b"Label,A,B,C\nX,1,2\n", TableFormat::Csv).unwrap_err();
        assert!(input_error(&err));
    }

    #[test]
    fn non_numeric_cell_is_an_input_error() {
        let err = parse_table(b"Label,A,B,C\nX,1,two,3\n", TableFormat::Csv).unwrap_err();
        assert!(input_error(&err));
        assert!(err.to_string().contains("'two' is not a number"));
    }

    #[test]
    fn negative_amount_is_an_input_error() {
        let err = parse_table(b"Label,A,B,C\nX,1,-2,3\n", TableFormat::Csv).unwrap_err();
        assert!(input_error(&err));
    }

    #[test]
    fn header_only_file_is_an_input_error() {
        let err = parse_table(b"Label,A,B,C\n", TableFormat::Csv).unwrap_err();
        assert!(input_error(&err));
    }

    #[test]
    fn json_split_layout_accepts_numbers_and_numeric_strings() {
        let json = r#"{
            "columns": ["Compound", "Sr", "Mo", "O"],
            "index": [0, 1],
            "data": [["SrO", 1, 0, 1], ["MoO3", "0", "1", "3.0"]]
        }"#;
        let table = parse_table(json.as_bytes(), TableFormat::Json).unwrap();
        assert_eq!(table.unique_labels(), vec!["SrO", "MoO3"]);
        assert_eq!(table.rows()[1].composition(), [0.0, 1.0, 3.0]);
    }

    #[test]
    fn json_records_layout_is_rejected() {
        let err = parse_table(br#"[{"label": "X"}]"#, TableFormat::Json).unwrap_err();
        assert!(input_error(&err));
    }

    #[test]
    fn json_null_amount_is_rejected() {
        let json = r#"{"columns": ["L", "A", "B", "C"], "data": [["X", 1, null, 1]]}"#;
        let err = parse_table(json.as_bytes(), TableFormat::Json).unwrap_err();
        assert!(input_error(&err));
    }

    #[test]
    fn unsupported_extension_is_an_input_error() {
        let err = load_file(Path::new("compositions.docx")).unwrap_err();
        assert!(input_error(&err));
    }

    #[test]
    fn non_finite_cells_are_input_errors() {
        for cell in ["inf", "NaN", "-inf"] {
            let csv = format!("Label,A,B,C\nX,1,{cell},3\n");
            let err = parse_table(csv.as_bytes(), TableFormat::Csv).unwrap_err();
            assert!(input_error(&err), "{cell} was accepted");
            assert!(err.to_string().contains("not finite"), "{err}");
        }
    }

    fn temp_path(name: &str, ext: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "rusty-ternary-{name}-{}.{ext}",
            std::process::id()
        ))
    }

    fn write_parquet(path: &Path, batch: &RecordBatch) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn xlsx_first_sheet_loads_like_csv() {
        let path = temp_path("sheet", "xlsx");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, name) in ["Compound", "Sr", "Mo", "O", "Note"].iter().enumerate() {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        let rows = [("SrO", [1.0, 0.0, 1.0]), ("SrMoO4", [1.0, 1.0, 4.0])];
        for (i, (label, amounts)) in rows.iter().enumerate() {
            let r = i as u32 + 1;
            sheet.write_string(r, 0, *label).unwrap();
            for (k, value) in amounts.iter().enumerate() {
                sheet.write_number(r, k as u16 + 1, *value).unwrap();
            }
        }
        // Amount stored as text, as some exports do.
        sheet.write_string(3, 0, "MoO3").unwrap();
        sheet.write_number(3, 1, 0.0).unwrap();
        sheet.write_string(3, 2, "1").unwrap();
        sheet.write_number(3, 3, 3.0).unwrap();
        workbook.save(&path).unwrap();

        let table = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.component_names, ["Sr", "Mo", "O"]);
        assert_eq!(table.unique_labels(), vec!["SrO", "SrMoO4", "MoO3"]);
        assert_eq!(table.rows()[1], CompositionRow::new("SrMoO4", 1.0, 1.0, 4.0));
        assert_eq!(table.rows()[2].composition(), [0.0, 1.0, 3.0]);
    }

    #[test]
    fn xlsx_text_amount_is_an_input_error() {
        let path = temp_path("sheet-bad", "xlsx");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, name) in ["Compound", "Sr", "Mo", "O"].iter().enumerate() {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        sheet.write_string(1, 0, "SrO").unwrap();
        sheet.write_number(1, 1, 1.0).unwrap();
        sheet.write_string(1, 2, "abc").unwrap();
        sheet.write_number(1, 3, 1.0).unwrap();
        workbook.save(&path).unwrap();

        let err = load_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(input_error(&err));
        assert!(err.to_string().contains("'abc' is not a number"), "{err}");
    }

    #[test]
    fn parquet_text_amount_that_fails_cast_is_an_input_error() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Compound", DataType::Utf8, false),
            Field::new("Sr", DataType::Float64, false),
            Field::new("Mo", DataType::Utf8, false),
            Field::new("O", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["SrO", "MoO3"])),
                Arc::new(Float64Array::from(vec![1.0, 0.0])),
                Arc::new(StringArray::from(vec!["0", "abc"])),
                Arc::new(Float64Array::from(vec![1.0, 3.0])),
            ],
        )
        .unwrap();

        let path = temp_path("parquet-text", "parquet");
        write_parquet(&path, &batch);
        let err = load_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(input_error(&err));
        assert!(err.to_string().contains("row 1, column 'Mo'"), "{err}");
    }

    #[test]
    fn parquet_null_amount_is_an_input_error() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Compound", DataType::Utf8, false),
            Field::new("Sr", DataType::Float64, true),
            Field::new("Mo", DataType::Float64, false),
            Field::new("O", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["SrO", "Mo"])),
                Arc::new(Float64Array::from(vec![Some(1.0), None])),
                Arc::new(Float64Array::from(vec![0.0, 1.0])),
                Arc::new(Float64Array::from(vec![1.0, 0.0])),
            ],
        )
        .unwrap();

        let path = temp_path("parquet-null", "parquet");
        write_parquet(&path, &batch);
        let err = load_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(input_error(&err));
        assert!(err.to_string().contains("missing or non-numeric"), "{err}");
    }

    #[test]
    fn parquet_columns_are_taken_by_position() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Compound", DataType::Utf8, false),
            Field::new("Sr", DataType::Int64, false),
            Field::new("Mo", DataType::Float64, false),
            Field::new("O", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["SrO", "SrMoO4"])),
                Arc::new(Int64Array::from(vec![1, 1])),
                Arc::new(Float64Array::from(vec![0.0, 1.0])),
                Arc::new(Float64Array::from(vec![1.0, 4.0])),
            ],
        )
        .unwrap();

        let path = temp_path("loader", "parquet");
        write_parquet(&path, &batch);

        let table = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.component_names, ["Sr", "Mo", "O"]);
        assert_eq!(table.rows()[1], CompositionRow::new("SrMoO4", 1.0, 1.0, 4.0));
    }
}
