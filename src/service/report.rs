use crate::error::{ReceivingError, Result};
use crate::models::{ReceiptEntry, Report, ReportFormat, SummaryRow};
use chrono::NaiveDateTime;
use rust_xlsxwriter::{Color, Format, Workbook};

pub const DETAIL_SHEET: &str = "InboundLog";
pub const SUMMARY_SHEET: &str = "ShipmentSummary";

pub const DETAIL_HEADERS: [&str; 10] = [
    "Timestamp",
    "Shipment Ref",
    "Waybill",
    "Item Code",
    "Item Description",
    "Bin Location (Original)",
    "Relocated Bin (New)",
    "Qty Received",
    "Qty Expected",
    "Difference",
];

pub const SUMMARY_HEADERS: [&str; 6] = [
    "Shipment Ref",
    "Item Code",
    "Item Description",
    "Total Received",
    "Total Expected",
    "Difference",
];

const SUMMARY_DIFFERENCE_COLUMN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cell {
    Text(String),
    Number(i64),
}

impl Cell {
    fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

/// 差异标记: 多收 / 少收
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Over,
    Short,
}

pub fn difference_highlight(difference: i64) -> Option<Highlight> {
    match difference {
        d if d > 0 => Some(Highlight::Over),
        d if d < 0 => Some(Highlight::Short),
        _ => None,
    }
}

/// 明细报表, 行顺序与传入一致
pub fn detail_report(
    entries: &[ReceiptEntry],
    format: ReportFormat,
    generated_at: NaiveDateTime,
) -> Result<Report> {
    let rows: Vec<Vec<Cell>> = entries
        .iter()
        .map(|e| {
            vec![
                Cell::Text(e.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()),
                Cell::Text(e.shipment_ref.clone()),
                Cell::Text(e.waybill.clone()),
                Cell::Text(e.item_code.clone()),
                Cell::Text(e.item_description.clone()),
                Cell::Text(e.bin_location.clone()),
                Cell::Text(e.relocated_bin.clone()),
                Cell::Number(e.qty_received),
                Cell::Number(e.qty_grn),
                Cell::Number(e.difference),
            ]
        })
        .collect();

    let bytes = match format {
        ReportFormat::Xlsx => render_xlsx(DETAIL_SHEET, &DETAIL_HEADERS, &rows, None)?,
        ReportFormat::Csv => render_csv(&DETAIL_HEADERS, &rows)?,
    };

    Ok(Report {
        filename: report_filename("inbound_log", format, generated_at),
        format,
        bytes,
    })
}

/// 汇总报表, 差异列正数蓝色、负数红色
pub fn summary_report(
    rows: &[SummaryRow],
    format: ReportFormat,
    generated_at: NaiveDateTime,
) -> Result<Report> {
    let cells: Vec<Vec<Cell>> = rows
        .iter()
        .map(|r| {
            vec![
                Cell::Text(r.shipment_ref.clone()),
                Cell::Text(r.item_code.clone()),
                Cell::Text(r.item_description.clone()),
                Cell::Number(r.total_received),
                Cell::Number(r.total_expected),
                Cell::Number(r.difference),
            ]
        })
        .collect();

    let bytes = match format {
        ReportFormat::Xlsx => render_xlsx(
            SUMMARY_SHEET,
            &SUMMARY_HEADERS,
            &cells,
            Some(SUMMARY_DIFFERENCE_COLUMN),
        )?,
        ReportFormat::Csv => render_csv(&SUMMARY_HEADERS, &cells)?,
    };

    Ok(Report {
        filename: report_filename("shipment_summary", format, generated_at),
        format,
        bytes,
    })
}

fn report_filename(prefix: &str, format: ReportFormat, generated_at: NaiveDateTime) -> String {
    format!(
        "{}_{}.{}",
        prefix,
        generated_at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

fn render_xlsx(
    sheet_name: &str,
    headers: &[&str],
    rows: &[Vec<Cell>],
    highlight_column: Option<usize>,
) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let over_format = Format::new().set_bold().set_font_color(Color::RGB(0x0000FF));
    let short_format = Format::new().set_bold().set_font_color(Color::RGB(0xFF0000));

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (idx, row) in rows.iter().enumerate() {
        let row_num = (idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col_num = col as u16;
            match cell {
                Cell::Text(s) => {
                    worksheet.write_string(row_num, col_num, s)?;
                }
                Cell::Number(n) => {
                    let highlight = if highlight_column == Some(col) {
                        difference_highlight(*n)
                    } else {
                        None
                    };
                    match highlight {
                        Some(Highlight::Over) => {
                            worksheet.write_number_with_format(row_num, col_num, *n as f64, &over_format)?;
                        }
                        Some(Highlight::Short) => {
                            worksheet.write_number_with_format(row_num, col_num, *n as f64, &short_format)?;
                        }
                        None => {
                            worksheet.write_number(row_num, col_num, *n as f64)?;
                        }
                    }
                }
            }
        }
    }

    // 列宽 = 最长内容 + 2
    for (col, width) in column_widths(headers, rows).into_iter().enumerate() {
        worksheet.set_column_width(col as u16, width as f64)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn column_widths(headers: &[&str], rows: &[Vec<Cell>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let longest = rows
                .iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.display().chars().count())
                .max()
                .unwrap_or(0);
            longest.max(header.chars().count()) + 2
        })
        .collect()
}

fn render_csv(headers: &[&str], rows: &[Vec<Cell>]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers).map_err(csv_error)?;
    for row in rows {
        writer
            .write_record(row.iter().map(Cell::display))
            .map_err(csv_error)?;
    }
    writer
        .into_inner()
        .map_err(|e| ReceivingError::Report(e.to_string()))
}

fn csv_error(e: csv::Error) -> ReceivingError {
    ReceivingError::Report(e.to_string())
}
