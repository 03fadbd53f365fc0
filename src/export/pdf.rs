use super::{ReportContent, ReportOptions};
use crate::error::{DistMapError, Result};
use distmap_common::layout::{
    max_chars_for_width, ReportColumn, BODY_FONT_PT, CELL_PADDING_MM, HEADER_FONT_PT,
    MAP_IMAGE_HEIGHT_MM, MAP_IMAGE_WIDTH_MM, REPORT_COLUMNS, SUBTITLE_FONT_PT, TITLE_FONT_PT,
};
use distmap_common::report::fit_text;
use distmap_common::{ReportLayout, ReportRow};
use ::image::RgbImage;
use printpdf::*;
use std::io::BufWriter;

/// Baseline offset from the bottom of a row
const TEXT_BASELINE_MM: f32 = 2.3;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn link_blue() -> Color {
    Color::Rgb(Rgb::new(0.05, 0.27, 0.75, None))
}

fn grey() -> Color {
    Color::Rgb(Rgb::new(0.8, 0.8, 0.8, None))
}

/// Table pages followed by a page with the map snapshot
pub fn build_pdf(content: &ReportContent, options: &ReportOptions) -> Result<Vec<u8>> {
    let layout = ReportLayout::default();
    let (doc, page1, layer1) = PdfDocument::new(
        &options.title,
        Mm(layout.page_width_mm),
        Mm(layout.page_height_mm),
        "Layer 1",
    );

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| DistMapError::PdfGeneration(format!("font: {:?}", e)))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| DistMapError::PdfGeneration(format!("font: {:?}", e)))?,
    };

    let mut layer = doc.get_page(page1).get_layer(layer1);
    let mut y = layout.content_top_mm();

    draw_title(&layer, &fonts, &layout, y, options, content.rows.len());
    y -= layout.title_block_mm;
    draw_header_row(&layer, &fonts, &layout, y);
    y -= layout.row_height_mm;

    let mut rows_left = layout.rows_per_page(true);
    for row in &content.rows {
        if rows_left == 0 {
            let (page, page_layer) =
                doc.add_page(Mm(layout.page_width_mm), Mm(layout.page_height_mm), "Layer 1");
            layer = doc.get_page(page).get_layer(page_layer);
            y = layout.content_top_mm();
            draw_header_row(&layer, &fonts, &layout, y);
            y -= layout.row_height_mm;
            rows_left = layout.rows_per_page(false);
        }

        draw_data_row(&layer, &fonts, &layout, y, row);
        y -= layout.row_height_mm;
        rows_left -= 1;
    }

    // map always starts on its own page
    let (map_page, map_layer) =
        doc.add_page(Mm(layout.page_width_mm), Mm(layout.page_height_mm), "Map");
    let layer = doc.get_page(map_page).get_layer(map_layer);
    let top = layout.content_top_mm();
    layer.use_text(
        &options.map_title,
        TITLE_FONT_PT,
        Mm(layout.margin_mm),
        Mm(top - 7.0),
        &fonts.bold,
    );
    embed_map(
        &layer,
        &content.snapshot.image,
        layout.margin_mm,
        top - layout.title_block_mm - MAP_IMAGE_HEIGHT_MM,
    );

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer)
        .map_err(|e| DistMapError::PdfGeneration(format!("save: {:?}", e)))?;
    writer
        .into_inner()
        .map_err(|e| DistMapError::PdfGeneration(format!("save: {}", e)))
}

fn draw_title(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    layout: &ReportLayout,
    top: f32,
    options: &ReportOptions,
    row_count: usize,
) {
    layer.use_text(&options.title, TITLE_FONT_PT, Mm(layout.margin_mm), Mm(top - 7.0), &fonts.bold);
    layer.use_text(
        format!(
            "Generated {} - {} client(s)",
            options.generated_at.format("%Y-%m-%d %H:%M"),
            row_count
        ),
        SUBTITLE_FONT_PT,
        Mm(layout.margin_mm),
        Mm(top - 13.0),
        &fonts.regular,
    );
}

fn draw_header_row(layer: &PdfLayerReference, fonts: &Fonts, layout: &ReportLayout, y: f32) {
    let text_y = y - layout.row_height_mm + TEXT_BASELINE_MM;
    for (definition, (x, _)) in REPORT_COLUMNS.iter().zip(layout.column_spans_mm()) {
        layer.use_text(
            definition.label,
            HEADER_FONT_PT,
            Mm(x + CELL_PADDING_MM),
            Mm(text_y),
            &fonts.bold,
        );
    }

    layer.set_outline_color(black());
    layer.set_outline_thickness(0.5);
    let right = layout.margin_mm + layout.usable_width_mm();
    draw_line(layer, layout.margin_mm, y, right, y);
    draw_line(layer, layout.margin_mm, y - layout.row_height_mm, right, y - layout.row_height_mm);
}

fn draw_data_row(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    layout: &ReportLayout,
    y: f32,
    row: &ReportRow,
) {
    let bottom = y - layout.row_height_mm;
    let text_y = bottom + TEXT_BASELINE_MM;

    for (definition, (x, width)) in REPORT_COLUMNS.iter().zip(layout.column_spans_mm()) {
        let text = fit_text(
            &row.cell_text(definition.column),
            max_chars_for_width(width, BODY_FONT_PT),
        );

        if definition.column == ReportColumn::MapsLink {
            layer.set_fill_color(link_blue());
            layer.use_text(text, BODY_FONT_PT, Mm(x + CELL_PADDING_MM), Mm(text_y), &fonts.regular);
            layer.set_fill_color(black());
            layer.add_link_annotation(LinkAnnotation::new(
                Rect::new(Mm(x), Mm(bottom), Mm(x + width), Mm(y)),
                None,
                None,
                Actions::uri(row.maps_link.clone()),
                None,
            ));
        } else {
            layer.use_text(text, BODY_FONT_PT, Mm(x + CELL_PADDING_MM), Mm(text_y), &fonts.regular);
        }
    }

    layer.set_outline_color(grey());
    layer.set_outline_thickness(0.3);
    draw_line(layer, layout.margin_mm, bottom, layout.margin_mm + layout.usable_width_mm(), bottom);
}

/// Place the snapshot at (x, y) (bottom-left, mm), scaled to the map box width
fn embed_map(layer: &PdfLayerReference, snapshot: &RgbImage, x: f32, y: f32) {
    let (width, height) = snapshot.dimensions();

    let image = Image::from(ImageXObject {
        width: Px(width as usize),
        height: Px(height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: snapshot.as_raw().clone(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    });

    // DPI = pixels / (mm / 25.4); keep the aspect ratio inside the map box
    let dpi_for_width = width as f32 / (MAP_IMAGE_WIDTH_MM / 25.4);
    let dpi_for_height = height as f32 / (MAP_IMAGE_HEIGHT_MM / 25.4);
    let dpi = dpi_for_width.max(dpi_for_height);

    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(Mm(y)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
}

fn draw_line(layer: &PdfLayerReference, x1: f32, y1: f32, x2: f32, y2: f32) {
    let line = Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y1)), false),
            (Point::new(Mm(x2), Mm(y2)), false),
        ],
        is_closed: false,
    };
    layer.add_line(line);
}
