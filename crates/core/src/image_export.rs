//! PNG export of the count summary
//!
//! A [`SummaryRasterizer`] turns a [`Summary`] into pixels; [`write_summary_image`]
//! encodes the result and places it under its dated file name. Any failure is
//! reported with a single user-facing message and leaves no file behind.

use crate::summary::{Summary, SummaryRow};
use crate::symbol::SymbolShape;
use chrono::NaiveDate;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

const EXPORT_FAILED_MESSAGE: &str = "Error exporting summary. Please try again.";

/// Error types for image export
#[derive(Debug, thiserror::Error)]
pub enum ImageExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Rasterization failed: {0}")]
    Rasterize(String),
}

impl ImageExportError {
    /// Message shown in the error dialog
    pub fn user_message(&self) -> &'static str {
        EXPORT_FAILED_MESSAGE
    }
}

pub type ImageExportResult<T> = Result<T, ImageExportError>;

/// Renders a summary snapshot to an RGBA image
pub trait SummaryRasterizer {
    fn rasterize(&self, summary: &Summary) -> ImageExportResult<RgbaImage>;
}

/// Download name for a summary made on `date`, e.g. `takeoff-summary-2024-03-09.png`
pub fn summary_file_name(date: NaiveDate) -> String {
    format!("takeoff-summary-{}.png", date.format("%Y-%m-%d"))
}

/// Rasterize `summary`, encode it as PNG and write it into `dir`
pub fn write_summary_image<R: SummaryRasterizer + ?Sized>(
    dir: &Path,
    rasterizer: &R,
    summary: &Summary,
) -> ImageExportResult<PathBuf> {
    let result = encode_summary(rasterizer, summary).and_then(|png| {
        let path = dir.join(summary_file_name(summary.generated_on));
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(&png)?;
        temp.persist(&path).map_err(|e| e.error)?;
        Ok(path)
    });

    match &result {
        Ok(path) => log::debug!("wrote summary image to {}", path.display()),
        Err(e) => log::error!("summary export failed: {}", e),
    }
    result
}

/// Rasterize and PNG-encode a summary in memory
pub fn encode_summary<R: SummaryRasterizer + ?Sized>(rasterizer: &R, summary: &Summary) -> ImageExportResult<Vec<u8>> {
    let image = rasterizer.rasterize(summary)?;
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}

/// Built-in rasterizer
///
/// Each row is a swatch of the symbol's shape in its color followed by one
/// tally tick per marker, grouped in fives. Totals come first; every page
/// group follows below a thin separator.
#[derive(Debug, Clone)]
pub struct SwatchRasterizer {
    pub background: Rgba<u8>,
    pub tick_color: Rgba<u8>,
    pub separator_color: Rgba<u8>,
    /// Largest width or height the rasterizer will allocate
    pub max_dimension: u32,
}

impl Default for SwatchRasterizer {
    fn default() -> Self {
        Self {
            background: Rgba([255, 255, 255, 255]),
            tick_color: Rgba([33, 33, 33, 255]),
            separator_color: Rgba([189, 189, 189, 255]),
            max_dimension: 16_384,
        }
    }
}

const PADDING: u32 = 16;
const ROW_GAP: u32 = 8;
const SWATCH_GAP: u32 = 12;
const TICK_WIDTH: u32 = 3;
const TICK_HEIGHT: u32 = 14;
const TICK_ADVANCE: u32 = 5;
const TICK_GROUP_GAP: u32 = 4;
const TICK_LINE_GAP: u32 = 4;
const TICKS_PER_LINE: u32 = 50;
const SEPARATOR_HEIGHT: u32 = 2;
const MIN_WIDTH: u32 = 160;
const FALLBACK_COLOR: Rgba<u8> = Rgba([128, 128, 128, 255]);

fn tick_lines(count: u32) -> u32 {
    count.div_ceil(TICKS_PER_LINE).max(1)
}

fn ticks_width(count: u32) -> u32 {
    if count == 0 {
        return 0;
    }
    count * TICK_ADVANCE + (count - 1) / 5 * TICK_GROUP_GAP
}

fn ticks_block_height(count: u32) -> u32 {
    tick_lines(count) * (TICK_HEIGHT + TICK_LINE_GAP) - TICK_LINE_GAP
}

impl SwatchRasterizer {
    fn cell_size(summary: &Summary) -> u32 {
        summary
            .totals
            .iter()
            .map(|row| row.swatch_size().ceil() as u32)
            .max()
            .unwrap_or(0)
    }

    fn row_height(cell: u32, row: &SummaryRow) -> u32 {
        cell.max(ticks_block_height(row.count as u32))
    }

    fn dimensions(&self, summary: &Summary, cell: u32) -> (u64, u64) {
        let widest = summary
            .totals
            .iter()
            .map(|row| ticks_width((row.count as u32).min(TICKS_PER_LINE)))
            .max()
            .unwrap_or(0);
        let width = u64::from(MIN_WIDTH)
            .max(u64::from(PADDING * 2 + cell + SWATCH_GAP) + u64::from(widest));

        let rows_height = |rows: &[SummaryRow]| -> u64 {
            rows.iter()
                .map(|row| u64::from(Self::row_height(cell, row) + ROW_GAP))
                .sum()
        };
        let mut height = u64::from(PADDING * 2) + rows_height(&summary.totals);
        for group in &summary.pages {
            height += u64::from(SEPARATOR_HEIGHT + ROW_GAP) + rows_height(&group.rows);
        }
        (width, height)
    }

    fn draw_row(&self, image: &mut RgbaImage, cell: u32, top: u32, row: &SummaryRow) -> u32 {
        let height = Self::row_height(cell, row);
        let swatch = row.swatch_size().round() as u32;
        let color = parse_hex_color(&row.color).unwrap_or_else(|| {
            log::warn!("unparseable symbol color {:?}, using gray", row.color);
            FALLBACK_COLOR
        });
        let swatch_left = PADDING + (cell - swatch.min(cell)) / 2;
        let swatch_top = top + (height - swatch.min(height)) / 2;
        fill_shape(image, row.shape, swatch_left, swatch_top, swatch, color);

        let count = row.count as u32;
        let ticks_left = PADDING + cell + SWATCH_GAP;
        let ticks_top = top + (height - ticks_block_height(count)) / 2;
        for i in 0..count {
            let column = i % TICKS_PER_LINE;
            let line = i / TICKS_PER_LINE;
            let x = ticks_left + column * TICK_ADVANCE + column / 5 * TICK_GROUP_GAP;
            let y = ticks_top + line * (TICK_HEIGHT + TICK_LINE_GAP);
            fill_rect(image, x, y, TICK_WIDTH, TICK_HEIGHT, self.tick_color);
        }

        height + ROW_GAP
    }
}

impl SummaryRasterizer for SwatchRasterizer {
    fn rasterize(&self, summary: &Summary) -> ImageExportResult<RgbaImage> {
        let cell = Self::cell_size(summary);
        let (width, height) = self.dimensions(summary, cell);
        let max = u64::from(self.max_dimension);
        if width > max || height > max {
            return Err(ImageExportError::Rasterize(format!(
                "summary needs {}x{} pixels, limit is {}",
                width, height, self.max_dimension
            )));
        }

        let (width, height) = (width as u32, height as u32);
        let mut image = RgbaImage::from_pixel(width, height, self.background);

        let mut y = PADDING;
        for row in &summary.totals {
            y += self.draw_row(&mut image, cell, y, row);
        }
        for group in &summary.pages {
            fill_rect(
                &mut image,
                PADDING,
                y,
                width - PADDING * 2,
                SEPARATOR_HEIGHT,
                self.separator_color,
            );
            y += SEPARATOR_HEIGHT + ROW_GAP;
            for row in &group.rows {
                y += self.draw_row(&mut image, cell, y, row);
            }
        }

        Ok(image)
    }
}

/// Parse `#RRGGBB` or `#RGB`
pub fn parse_hex_color(color: &str) -> Option<Rgba<u8>> {
    let hex = color.trim().strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some(Rgba([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            255,
        ])),
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 17;
            }
            Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
        }
        _ => None,
    }
}

fn fill_rect(image: &mut RgbaImage, left: u32, top: u32, width: u32, height: u32, color: Rgba<u8>) {
    let right = left.saturating_add(width).min(image.width());
    let bottom = top.saturating_add(height).min(image.height());
    for y in top..bottom {
        for x in left..right {
            image.put_pixel(x, y, color);
        }
    }
}

// Custom shapes have no raster glyph for their initial and are drawn as circles
fn fill_shape(image: &mut RgbaImage, shape: SymbolShape, left: u32, top: u32, size: u32, color: Rgba<u8>) {
    if size == 0 {
        return;
    }
    let s = size as f32;
    let inside = |dx: f32, dy: f32| -> bool {
        match shape {
            SymbolShape::Square => true,
            SymbolShape::Circle | SymbolShape::Custom => {
                let r = s / 2.0;
                (dx - r).powi(2) + (dy - r).powi(2) <= r * r
            }
            SymbolShape::Triangle => (dx - s / 2.0).abs() <= dy / 2.0,
        }
    };

    let right = left.saturating_add(size).min(image.width());
    let bottom = top.saturating_add(size).min(image.height());
    for y in top..bottom {
        for x in left..right {
            let dx = (x - left) as f32 + 0.5;
            let dy = (y - top) as f32 + 0.5;
            if inside(dx, dy) {
                image.put_pixel(x, y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::PageGroup;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    fn row(shape: SymbolShape, count: usize) -> SummaryRow {
        SummaryRow {
            symbol_id: uuid::Uuid::new_v4(),
            name: "Door".to_string(),
            color: "#FF0000".to_string(),
            shape,
            size: 24.0,
            count,
        }
    }

    fn summary(totals: Vec<SummaryRow>, pages: Vec<PageGroup>) -> Summary {
        let grand_total = totals.iter().map(|r| r.count).sum();
        Summary {
            generated_on: date(),
            totals,
            pages,
            grand_total,
        }
    }

    struct FailingRasterizer;

    impl SummaryRasterizer for FailingRasterizer {
        fn rasterize(&self, _summary: &Summary) -> ImageExportResult<RgbaImage> {
            Err(ImageExportError::Rasterize("canvas unavailable".to_string()))
        }
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF0000"), Some(RED));
        assert_eq!(parse_hex_color("#fff"), Some(WHITE));
        assert_eq!(parse_hex_color("FF0000"), None);
        assert_eq!(parse_hex_color("#GG0000"), None);
        assert_eq!(parse_hex_color("#FF00"), None);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(summary_file_name(date()), "takeoff-summary-2024-03-09.png");
    }

    #[test]
    fn test_swatch_and_ticks() {
        let image = SwatchRasterizer::default()
            .rasterize(&summary(vec![row(SymbolShape::Square, 3)], vec![]))
            .unwrap();

        // 24px symbol draws an 18px swatch at the padding corner
        assert_eq!(image.get_pixel(0, 0), &WHITE);
        assert_eq!(image.get_pixel(PADDING, PADDING), &RED);
        assert_eq!(image.get_pixel(PADDING + 17, PADDING + 17), &RED);
        assert_eq!(image.get_pixel(PADDING + 18, PADDING + 17), &WHITE);

        let ticks_left = PADDING + 18 + SWATCH_GAP;
        let tick = SwatchRasterizer::default().tick_color;
        for i in 0..3 {
            assert_eq!(image.get_pixel(ticks_left + i * TICK_ADVANCE, PADDING + 9), &tick);
        }
        assert_eq!(image.get_pixel(ticks_left + 3 * TICK_ADVANCE, PADDING + 9), &WHITE);
    }

    #[test]
    fn test_circle_corners_are_empty() {
        let image = SwatchRasterizer::default()
            .rasterize(&summary(vec![row(SymbolShape::Circle, 0)], vec![]))
            .unwrap();
        assert_eq!(image.get_pixel(PADDING, PADDING), &WHITE);
        assert_eq!(image.get_pixel(PADDING + 9, PADDING + 9), &RED);
    }

    #[test]
    fn test_page_groups_extend_height() {
        let totals_only = SwatchRasterizer::default()
            .rasterize(&summary(vec![row(SymbolShape::Circle, 2)], vec![]))
            .unwrap();
        let with_page = SwatchRasterizer::default()
            .rasterize(&summary(
                vec![row(SymbolShape::Circle, 2)],
                vec![PageGroup {
                    page: 1,
                    rows: vec![row(SymbolShape::Circle, 2)],
                }],
            ))
            .unwrap();
        assert!(with_page.height() > totals_only.height());
    }

    #[test]
    fn test_oversized_summary_is_rejected() {
        let rasterizer = SwatchRasterizer {
            max_dimension: 100,
            ..SwatchRasterizer::default()
        };
        let result = rasterizer.rasterize(&summary(vec![row(SymbolShape::Square, 500)], vec![]));
        assert!(matches!(result, Err(ImageExportError::Rasterize(_))));
    }

    #[test]
    fn test_write_summary_image() {
        let dir = tempfile::tempdir().unwrap();
        let summary = summary(vec![row(SymbolShape::Triangle, 4)], vec![]);

        let path = write_summary_image(dir.path(), &SwatchRasterizer::default(), &summary).unwrap();
        assert_eq!(path.file_name().unwrap(), "takeoff-summary-2024-03-09.png");

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_export_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_summary_image(dir.path(), &FailingRasterizer, &summary(vec![], vec![])).unwrap_err();

        assert_eq!(err.user_message(), "Error exporting summary. Please try again.");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
