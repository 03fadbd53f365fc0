//! Report layout
//!
//! All physical measurements are in mm; pt values are derived from them.

// ============================================
// Page (A4 landscape)
// ============================================

pub const PAGE_WIDTH_MM: f32 = 297.0;
pub const PAGE_HEIGHT_MM: f32 = 210.0;
pub const MARGIN_MM: f32 = 12.0;

pub const USABLE_WIDTH_MM: f32 = PAGE_WIDTH_MM - MARGIN_MM * 2.0; // 273mm

/// Font sizes (pt)
pub const TITLE_FONT_PT: f32 = 18.0;
pub const SUBTITLE_FONT_PT: f32 = 9.0;
pub const HEADER_FONT_PT: f32 = 9.0;
pub const BODY_FONT_PT: f32 = 8.0;

/// Vertical rhythm (mm)
pub const TITLE_BLOCK_MM: f32 = 18.0;
pub const ROW_HEIGHT_MM: f32 = 7.0;
pub const CELL_PADDING_MM: f32 = 1.5;

// ============================================
// Map snapshot
// ============================================

/// Raster size of the map snapshot (px)
pub const MAP_IMAGE_WIDTH_PX: u32 = 1400;
pub const MAP_IMAGE_HEIGHT_PX: u32 = 600;

/// Printed size of the snapshot (mm), same aspect ratio as the raster
pub const MAP_IMAGE_WIDTH_MM: f32 = USABLE_WIDTH_MM;
pub const MAP_IMAGE_HEIGHT_MM: f32 =
    MAP_IMAGE_WIDTH_MM * MAP_IMAGE_HEIGHT_PX as f32 / MAP_IMAGE_WIDTH_PX as f32; // 117mm

// ============================================
// Conversion factors
// ============================================

/// mm → pt (1mm = 72/25.4 pt ≈ 2.835pt)
pub const MM_TO_PT: f32 = 72.0 / 25.4;

/// Average Helvetica glyph width relative to the font size
pub const AVG_GLYPH_WIDTH_EM: f32 = 0.5;

// ============================================
// Table columns
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportColumn {
    Index,
    Zone,
    ClientName,
    Pharmacy,
    References,
    MapsLink,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnDefinition {
    pub column: ReportColumn,
    pub label: &'static str,
    /// Share of the usable width
    pub width_ratio: f32,
}

pub const REPORT_COLUMNS: &[ColumnDefinition] = &[
    ColumnDefinition { column: ReportColumn::Index, label: "Index", width_ratio: 0.06 },
    ColumnDefinition { column: ReportColumn::Zone, label: "Zone", width_ratio: 0.08 },
    ColumnDefinition { column: ReportColumn::ClientName, label: "Client Name", width_ratio: 0.22 },
    ColumnDefinition { column: ReportColumn::Pharmacy, label: "Pharmacy", width_ratio: 0.20 },
    ColumnDefinition { column: ReportColumn::References, label: "References", width_ratio: 0.32 },
    ColumnDefinition { column: ReportColumn::MapsLink, label: "Maps Link", width_ratio: 0.12 },
];

/// Text shown in the Maps Link cell; the cell itself carries the URL
pub const MAPS_LINK_TEXT: &str = "Open in Maps";

// ============================================
// Layout struct
// ============================================

#[derive(Debug, Clone)]
pub struct ReportLayout {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    pub row_height_mm: f32,
    pub title_block_mm: f32,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            page_width_mm: PAGE_WIDTH_MM,
            page_height_mm: PAGE_HEIGHT_MM,
            margin_mm: MARGIN_MM,
            row_height_mm: ROW_HEIGHT_MM,
            title_block_mm: TITLE_BLOCK_MM,
        }
    }
}

impl ReportLayout {
    pub fn usable_width_mm(&self) -> f32 {
        self.page_width_mm - self.margin_mm * 2.0
    }

    /// Top of the content area (mm from the bottom edge)
    pub fn content_top_mm(&self) -> f32 {
        self.page_height_mm - self.margin_mm
    }

    /// Left edge and width of every column (mm)
    pub fn column_spans_mm(&self) -> Vec<(f32, f32)> {
        let usable = self.usable_width_mm();
        let mut x = self.margin_mm;
        REPORT_COLUMNS
            .iter()
            .map(|col| {
                let width = usable * col.width_ratio;
                let span = (x, width);
                x += width;
                span
            })
            .collect()
    }

    /// Data rows that fit below the header row on a page
    pub fn rows_per_page(&self, with_title: bool) -> usize {
        let mut available = self.page_height_mm - self.margin_mm * 2.0 - self.row_height_mm;
        if with_title {
            available -= self.title_block_mm;
        }
        (available / self.row_height_mm).floor().max(1.0) as usize
    }
}

// ============================================
// Helpers
// ============================================

/// pt → mm
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / MM_TO_PT
}

/// Approximate number of characters that fit in a cell
pub fn max_chars_for_width(width_mm: f32, font_pt: f32) -> usize {
    let glyph_mm = pt_to_mm(font_pt * AVG_GLYPH_WIDTH_EM);
    let usable = (width_mm - CELL_PADDING_MM * 2.0).max(0.0);
    (usable / glyph_mm).floor() as usize
}
