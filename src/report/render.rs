//! Report pages, drawn as SVG and bound into one PDF.
//!
//! Each page gets a title band, then its items stacked top to bottom.
//! Tables take the height their rows need; figures share what is left.
//! [`render_pdf`] converts every page with svg2pdf and places it as a
//! full-page form XObject, one PDF page per report page.

use super::{Page, PageItem, PageSize, Report};
use crate::data::stats::TextTable;
use crate::error::{Result, render_err};
use crate::viz::draw_figure;
use pdf_writer::{Content, Finish as _, Name, Pdf, Rect, Ref};
use plotters::coord::Shift;
use plotters::prelude::{
    BLACK, Color as _, DrawingArea, DrawingBackend, FontStyle, IntoDrawingArea as _,
    IntoFont as _, Rectangle, SVGBackend, TextStyle, WHITE,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use svg2pdf::usvg;

const FONT: &str = "sans-serif";
const MARGIN: u32 = 24;
const ROW_HEIGHT: i32 = 18;
const CELL_FONT: f64 = 11.0;
const FOOTER_HEIGHT: i32 = 20;
const ITEM_GAP: i32 = 12;

/// PDF points per CSS pixel (72 / 96).
const PT_PER_PX: f32 = 0.75;

/// File name used when the caller only names a directory.
pub const DEFAULT_REPORT_FILE: &str = "data_report.pdf";

/// One SVG document per page, in page order.
pub fn render_pages(report: &Report, size: &PageSize) -> Result<Vec<String>> {
    let total = report.pages.len();
    report
        .pages
        .iter()
        .enumerate()
        .map(|(i, page)| render_page(report, page, i + 1, total, size))
        .collect()
}

/// The whole report as a PDF document with one page per report page.
pub fn render_pdf(report: &Report, size: &PageSize) -> Result<Vec<u8>> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let page_tree_id = alloc.bump();
    let mut pdf = Pdf::new();

    let media = Rect::new(
        0.0,
        0.0,
        size.width as f32 * PT_PER_PX,
        size.height as f32 * PT_PER_PX,
    );

    let mut page_ids = Vec::with_capacity(report.pages.len());
    for (i, svg) in render_pages(report, size)?.iter().enumerate() {
        let tree = usvg::Tree::from_str(svg, &options).map_err(render_err)?;
        let (chunk, svg_id) =
            svg2pdf::to_chunk(&tree, svg2pdf::ConversionOptions::default()).map_err(render_err)?;

        let mut ids = HashMap::new();
        let chunk = chunk.renumber(|old| *ids.entry(old).or_insert_with(|| alloc.bump()));
        let svg_id = ids
            .get(&svg_id)
            .copied()
            .ok_or_else(|| render_err(format!("page {} lost its graphic", i + 1)))?;
        pdf.extend(&chunk);

        let page_id = alloc.bump();
        let content_id = alloc.bump();
        let name = format!("P{}", i + 1);

        let mut page = pdf.page(page_id);
        page.media_box(media);
        page.parent(page_tree_id);
        page.contents(content_id);
        page.resources()
            .x_objects()
            .pair(Name(name.as_bytes()), svg_id);
        page.finish();

        let mut content = Content::new();
        content.save_state();
        content.transform([media.x2, 0.0, 0.0, media.y2, 0.0, 0.0]);
        content.x_object(Name(name.as_bytes()));
        content.restore_state();
        pdf.stream(content_id, &content.finish());

        page_ids.push(page_id);
    }

    pdf.catalog(catalog_id).pages(page_tree_id);
    let count = i32::try_from(page_ids.len()).map_err(render_err)?;
    pdf.pages(page_tree_id).kids(page_ids).count(count);
    Ok(pdf.finish())
}

/// Writes the report as a single PDF.
///
/// `path` may name the file or an existing directory, in which case the
/// report goes to `data_report.pdf` inside it. Parent directories are
/// created as needed. Returns the path written.
pub fn save_report(report: &Report, path: &Path, size: &PageSize) -> Result<PathBuf> {
    let path = if path.is_dir() {
        path.join(DEFAULT_REPORT_FILE)
    } else {
        path.to_path_buf()
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let bytes = render_pdf(report, size)?;
    std::fs::write(&path, bytes)?;
    tracing::info!(
        "Wrote {}-page report to {}",
        report.pages.len(),
        path.display()
    );
    Ok(path)
}

fn render_page(
    report: &Report,
    page: &Page,
    number: usize,
    total: usize,
    size: &PageSize,
) -> Result<String> {
    let mut buf = String::new();
    {
        let root =
            SVGBackend::with_string(&mut buf, (size.width, size.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let inner = root.margin(MARGIN, MARGIN, MARGIN, MARGIN);
        let body = inner
            .titled(&page.title, (FONT, 22).into_font())
            .map_err(render_err)?;

        let (_, height) = body.dim_in_pixel();
        let content_height = i32::try_from(height).map_err(render_err)? - FOOTER_HEIGHT;
        let (content, footer) = body.split_vertically(content_height.max(0));

        draw_items(&page.items, &content)?;

        let footer_style = (FONT, 10).into_font().color(&BLACK.mix(0.6));
        footer
            .draw_text(
                &format!(
                    "{} | generated {} | page {number} of {total}",
                    report.title, report.generated_at
                ),
                &footer_style,
                (0, 4),
            )
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    Ok(buf)
}

fn table_height(table: &TextTable) -> i32 {
    // Title line, header, body rows.
    let rows = i32::try_from(table.n_rows()).unwrap_or(i32::MAX / ROW_HEIGHT - 2);
    (rows + 2) * ROW_HEIGHT
}

fn draw_items<DB: DrawingBackend>(
    items: &[PageItem],
    area: &DrawingArea<DB, Shift>,
) -> Result<()> {
    let (_, height) = area.dim_in_pixel();
    let height = i32::try_from(height).map_err(render_err)?;

    let fixed: i32 = items
        .iter()
        .map(|item| match item {
            PageItem::Table(t) => table_height(t) + ITEM_GAP,
            PageItem::Figure(_) => ITEM_GAP,
        })
        .sum();
    let figures = items
        .iter()
        .filter(|i| matches!(i, PageItem::Figure(_)))
        .count();
    let figure_height = if figures == 0 {
        0
    } else {
        ((height - fixed) / i32::try_from(figures).map_err(render_err)?).max(0)
    };

    let mut rest = area.clone();
    for item in items {
        let wanted = match item {
            PageItem::Table(t) => table_height(t),
            PageItem::Figure(_) => figure_height,
        };
        let (_, remaining) = rest.dim_in_pixel();
        let wanted = wanted.min(i32::try_from(remaining).map_err(render_err)?);
        let (slot, below) = rest.split_vertically(wanted);
        match item {
            PageItem::Table(t) => draw_table(t, &slot)?,
            PageItem::Figure(f) => draw_figure(f, &slot)?,
        }
        let (_, left) = below.dim_in_pixel();
        let gap = ITEM_GAP.min(i32::try_from(left).map_err(render_err)?);
        rest = below.split_vertically(gap).1;
    }
    Ok(())
}

/// Shortens `text` to about `width` pixels of `CELL_FONT` text.
fn fit(text: &str, width: i32) -> String {
    let max_chars = ((f64::from(width) - 8.0) / (CELL_FONT * 0.55)).floor().max(1.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn draw_table<DB: DrawingBackend>(
    table: &TextTable,
    area: &DrawingArea<DB, Shift>,
) -> Result<()> {
    let (width, _) = area.dim_in_pixel();
    let width = i32::try_from(width).map_err(render_err)?;
    let n_cols = i32::try_from(table.n_cols().max(1)).map_err(render_err)?;
    let col_width = width / n_cols;

    let title_style: TextStyle<'_> = (FONT, 14).into_font().into();
    let header_style: TextStyle<'_> = (FONT, CELL_FONT, FontStyle::Bold).into_font().into();
    let cell_style: TextStyle<'_> = (FONT, CELL_FONT).into_font().into();
    let grid = BLACK.mix(0.3);

    area.draw_text(&table.title, &title_style, (0, 0))
        .map_err(render_err)?;

    let rows = std::iter::once((&table.header, true))
        .chain(table.rows.iter().map(|r| (r, false)));
    for (r, (row, is_header)) in (1..).zip(rows) {
        let y = r * ROW_HEIGHT;
        for (c, cell) in (0..n_cols).zip(row) {
            let x = c * col_width;
            let corners = [(x, y), (x + col_width, y + ROW_HEIGHT)];
            if is_header {
                area.draw(&Rectangle::new(corners, BLACK.mix(0.08).filled()))
                    .map_err(render_err)?;
            }
            area.draw(&Rectangle::new(corners, grid.stroke_width(1)))
                .map_err(render_err)?;

            let style = if is_header { &header_style } else { &cell_style };
            area.draw_text(&fit(cell, col_width), style, (x + 4, y + 3))
                .map_err(render_err)?;
        }
    }
    Ok(())
}
