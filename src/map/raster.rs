//! Static map snapshot
//!
//! Markers are projected with Web Mercator onto a plain canvas with a
//! graticule. No tiles are fetched. Each marker is a filled badge in its zone
//! colour with the display index drawn in a small bitmap font.

use crate::error::{DistMapError, Result};
use distmap_common::{GeoPoint, MapView};
use image::{ImageFormat, Rgb, RgbImage};
use std::f64::consts::PI;
use std::io::Cursor;
use std::path::Path;

const TILE_SIZE: f64 = 256.0;
const MIN_ZOOM: u8 = 1;
const MAX_LATITUDE: f64 = 85.051_128_78;
/// Largest accepted edge, in pixels
pub const MAX_DIMENSION_PX: u32 = 8192;

const EDGE_PADDING_PX: f64 = 24.0;
const BADGE_MIN_RADIUS_PX: i64 = 11;
const BADGE_RING_PX: i64 = 2;
const DIGIT_SCALE: i64 = 2;

const BACKGROUND: [u8; 3] = [238, 241, 236];
const GRID: [u8; 3] = [214, 219, 210];
const FRAME: [u8; 3] = [150, 150, 150];
const WHITE: [u8; 3] = [255, 255, 255];

/// Grid steps in degrees, smallest first
const GRID_STEPS: &[f64] = &[
    0.001, 0.002, 0.005, 0.01, 0.02, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 45.0,
];
const MAX_GRID_LINES: f64 = 8.0;

/// 3x5 glyphs for 0-9, one row per entry, bit 2 = left column
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

#[derive(Debug, Clone)]
pub struct MapSnapshot {
    pub image: RgbImage,
    /// Zoom actually used, possibly lower than requested so every marker fits
    pub zoom: u8,
}

/// Projected canvas: world pixel of the top-left corner plus size
#[derive(Debug, Clone, Copy)]
struct Viewport {
    zoom: u8,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Viewport {
    fn new(center: GeoPoint, zoom: u8, width: u32, height: u32) -> Self {
        let (cx, cy) = project(center, zoom);
        Self {
            zoom,
            left: cx - width as f64 / 2.0,
            top: cy - height as f64 / 2.0,
            width: width as f64,
            height: height as f64,
        }
    }

    fn to_canvas(&self, point: GeoPoint) -> (f64, f64) {
        let (x, y) = project(point, self.zoom);
        (x - self.left, y - self.top)
    }

    fn fits(&self, point: GeoPoint) -> bool {
        let (x, y) = self.to_canvas(point);
        x >= EDGE_PADDING_PX
            && x <= self.width - EDGE_PADDING_PX
            && y >= EDGE_PADDING_PX
            && y <= self.height - EDGE_PADDING_PX
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powi(self.zoom as i32)
    }
}

/// Web Mercator world pixel of a point
fn project(point: GeoPoint, zoom: u8) -> (f64, f64) {
    let scale = TILE_SIZE * 2f64.powi(zoom as i32);
    let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (point.lng + 180.0) / 360.0 * scale;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * scale;
    (x, y)
}

fn unproject(x: f64, y: f64, zoom: u8) -> GeoPoint {
    let scale = TILE_SIZE * 2f64.powi(zoom as i32);
    let lng = x / scale * 360.0 - 180.0;
    let n = PI - 2.0 * PI * y / scale;
    let lat = n.sinh().atan().to_degrees();
    GeoPoint::new(lat, lng)
}

/// Highest zoom ≤ the view's zoom at which every marker lies inside the padded canvas
pub fn fit_zoom(view: &MapView, width: u32, height: u32) -> u8 {
    let mut zoom = view.zoom.max(MIN_ZOOM);
    // projection is monotonic, so the bounding box corners decide
    let Some((south_west, north_east)) = view.bounds() else {
        return zoom;
    };
    while zoom > MIN_ZOOM {
        let viewport = Viewport::new(view.center, zoom, width, height);
        if viewport.fits(south_west) && viewport.fits(north_east) {
            break;
        }
        zoom -= 1;
    }
    zoom
}

pub fn rasterize(view: &MapView, width: u32, height: u32) -> Result<MapSnapshot> {
    if width == 0 || height == 0 || width > MAX_DIMENSION_PX || height > MAX_DIMENSION_PX {
        return Err(DistMapError::MapRender(format!(
            "tamaño de imagen inválido {}x{} (1..={} px por lado)",
            width, height, MAX_DIMENSION_PX
        )));
    }
    if view.markers.is_empty() {
        return Err(DistMapError::MapRender("el mapa no tiene marcadores".into()));
    }

    let zoom = fit_zoom(view, width, height);
    if zoom < view.zoom {
        tracing::debug!(requested = view.zoom, used = zoom, "Zoom reducido para que entren los marcadores");
    }
    let viewport = Viewport::new(view.center, zoom, width, height);

    let mut image = RgbImage::from_pixel(width, height, Rgb(BACKGROUND));
    draw_graticule(&mut image, &viewport);
    draw_frame(&mut image);

    for marker in &view.markers {
        let (x, y) = viewport.to_canvas(marker.position);
        draw_badge(&mut image, x.round() as i64, y.round() as i64, marker.color.rgb(), marker.index);
    }

    Ok(MapSnapshot { image, zoom })
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| DistMapError::MapRender(e.to_string()))?;
    Ok(bytes)
}

pub fn write_png(snapshot: &MapSnapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, encode_png(&snapshot.image)?)?;
    Ok(())
}

// ============================================
// Drawing
// ============================================

fn put(image: &mut RgbImage, x: i64, y: i64, color: [u8; 3]) {
    if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
        image.put_pixel(x as u32, y as u32, Rgb(color));
    }
}

fn fill_rect(image: &mut RgbImage, x: i64, y: i64, w: i64, h: i64, color: [u8; 3]) {
    for py in y..y + h {
        for px in x..x + w {
            put(image, px, py, color);
        }
    }
}

fn fill_circle(image: &mut RgbImage, cx: i64, cy: i64, radius: i64, color: [u8; 3]) {
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                put(image, cx + dx, cy + dy, color);
            }
        }
    }
}

fn grid_step(span_degrees: f64) -> f64 {
    GRID_STEPS
        .iter()
        .copied()
        .find(|step| span_degrees / step <= MAX_GRID_LINES)
        .unwrap_or(90.0)
}

fn draw_graticule(image: &mut RgbImage, viewport: &Viewport) {
    let north_west = unproject(viewport.left, viewport.top, viewport.zoom);
    let south_east = unproject(
        viewport.left + viewport.width,
        viewport.top + viewport.height,
        viewport.zoom,
    );

    let lng_span = viewport.width / viewport.world_size() * 360.0;
    let step = grid_step(lng_span.max(north_west.lat - south_east.lat));
    let height = viewport.height as i64;
    let width = viewport.width as i64;

    let mut lng = (north_west.lng / step).ceil() * step;
    while lng <= south_east.lng {
        let (x, _) = viewport.to_canvas(GeoPoint::new(north_west.lat, lng));
        fill_rect(image, x.round() as i64, 0, 1, height, GRID);
        lng += step;
    }

    let mut lat = (south_east.lat / step).ceil() * step;
    while lat <= north_west.lat {
        let (_, y) = viewport.to_canvas(GeoPoint::new(lat, north_west.lng));
        fill_rect(image, 0, y.round() as i64, width, 1, GRID);
        lat += step;
    }
}

fn draw_frame(image: &mut RgbImage) {
    let (w, h) = (image.width() as i64, image.height() as i64);
    fill_rect(image, 0, 0, w, 1, FRAME);
    fill_rect(image, 0, h - 1, w, 1, FRAME);
    fill_rect(image, 0, 0, 1, h, FRAME);
    fill_rect(image, w - 1, 0, 1, h, FRAME);
}

/// Width in pixels of `text` drawn with `draw_number`
fn number_width(digits: usize) -> i64 {
    let glyph = 3 * DIGIT_SCALE;
    digits as i64 * (glyph + DIGIT_SCALE) - DIGIT_SCALE
}

fn badge_radius(index: usize) -> i64 {
    let digits = index.to_string().len();
    BADGE_MIN_RADIUS_PX.max(number_width(digits) / 2 + 4)
}

fn draw_badge(image: &mut RgbImage, cx: i64, cy: i64, color: [u8; 3], index: usize) {
    let radius = badge_radius(index);
    fill_circle(image, cx, cy, radius + BADGE_RING_PX, WHITE);
    fill_circle(image, cx, cy, radius, color);
    draw_number(image, cx, cy, index, WHITE);
}

fn draw_number(image: &mut RgbImage, cx: i64, cy: i64, value: usize, color: [u8; 3]) {
    let text = value.to_string();
    let mut x = cx - number_width(text.len()) / 2;
    let y = cy - 5 * DIGIT_SCALE / 2;

    for ch in text.chars() {
        if let Some(d) = ch.to_digit(10) {
            for (row, bits) in DIGITS[d as usize].iter().enumerate() {
                for col in 0..3 {
                    if bits & (0b100 >> col) != 0 {
                        fill_rect(
                            image,
                            x + col as i64 * DIGIT_SCALE,
                            y + row as i64 * DIGIT_SCALE,
                            DIGIT_SCALE,
                            DIGIT_SCALE,
                            color,
                        );
                    }
                }
            }
        }
        x += 3 * DIGIT_SCALE + DIGIT_SCALE;
    }
}
