//! Excel report
//!
//! Sheet "Selection" holds the selected rows with a clickable maps link,
//! sheet "Map" holds the snapshot image.

use super::{ReportContent, ReportOptions};
use crate::error::{DistMapError, Result};
use distmap_common::layout::MAPS_LINK_TEXT;
use rust_xlsxwriter::{Color, Format, FormatBorder, Image, Workbook, XlsxError};

const HEADER_ROW: u32 = 2;

/// (label, column width)
const COLUMNS: &[(&str, f64)] = &[
    ("Index", 7.0),
    ("Zone", 8.0),
    ("Zone Name", 14.0),
    ("Client Code", 12.0),
    ("Client Name", 28.0),
    ("Pharmacy", 26.0),
    ("References", 36.0),
    ("Address", 30.0),
    ("Lat", 12.0),
    ("Lng", 12.0),
    ("Maps Link", 14.0),
];

fn xlsx_error(e: XlsxError) -> DistMapError {
    DistMapError::ExcelGeneration(e.to_string())
}

pub fn build_excel(content: &ReportContent, options: &ReportOptions) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let title_format = Format::new().set_bold().set_font_size(14);
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xDDE4EE))
        .set_border(FormatBorder::Thin);
    let coordinate_format = Format::new().set_num_format("0.000000");

    let sheet = workbook.add_worksheet();
    sheet.set_name("Selection").map_err(xlsx_error)?;
    sheet
        .write_string_with_format(0, 0, &options.title, &title_format)
        .map_err(xlsx_error)?;
    sheet
        .write_string(
            1,
            0,
            format!(
                "Generated {} - {} client(s)",
                options.generated_at.format("%Y-%m-%d %H:%M"),
                content.rows.len()
            ),
        )
        .map_err(xlsx_error)?;

    for (col, (label, width)) in COLUMNS.iter().enumerate() {
        let col = col as u16;
        sheet
            .write_string_with_format(HEADER_ROW, col, *label, &header_format)
            .map_err(xlsx_error)?;
        sheet.set_column_width(col, *width).map_err(xlsx_error)?;
    }

    for (i, row) in content.rows.iter().enumerate() {
        let r = HEADER_ROW + 1 + i as u32;
        sheet.write_number(r, 0, row.index as f64).map_err(xlsx_error)?;
        sheet.write_string(r, 1, &row.zone_code).map_err(xlsx_error)?;
        sheet.write_string(r, 2, &row.zone_name).map_err(xlsx_error)?;
        sheet.write_string(r, 3, &row.client_code).map_err(xlsx_error)?;
        sheet.write_string(r, 4, &row.client_name).map_err(xlsx_error)?;
        sheet.write_string(r, 5, &row.pharmacy).map_err(xlsx_error)?;
        sheet.write_string(r, 6, &row.references).map_err(xlsx_error)?;
        sheet.write_string(r, 7, &row.address).map_err(xlsx_error)?;
        sheet
            .write_number_with_format(r, 8, row.position.lat, &coordinate_format)
            .map_err(xlsx_error)?;
        sheet
            .write_number_with_format(r, 9, row.position.lng, &coordinate_format)
            .map_err(xlsx_error)?;
        sheet
            .write_url_with_text(r, 10, row.maps_link.as_str(), MAPS_LINK_TEXT)
            .map_err(xlsx_error)?;
    }

    let map_sheet = workbook.add_worksheet();
    map_sheet.set_name("Map").map_err(xlsx_error)?;
    map_sheet
        .write_string_with_format(0, 0, &options.map_title, &title_format)
        .map_err(xlsx_error)?;
    let image = Image::new_from_buffer(&content.map_png).map_err(xlsx_error)?;
    map_sheet.insert_image(2, 0, &image).map_err(xlsx_error)?;

    workbook.save_to_buffer().map_err(xlsx_error)
}
