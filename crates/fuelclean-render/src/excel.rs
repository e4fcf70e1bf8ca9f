//! Excel workbook writer
//!
//! Two sheets per output:
//! - the cleaned data table, cell by cell with its styles and the
//!   presentation merges re-established over the totals column
//! - the summary: one row per canonical category in display order, a
//!   percentage column, and a pie chart with category-matched slice colors
//!   and on-slice labels (category name plus percentage, no legend)
//!
//! Styles travel as the pipeline's own `Style` model and are mapped to
//! `Format`s here; the writer adds its own header emphasis and number
//! formats on the summary sheet.

use rust_xlsxwriter::{
    Chart, ChartDataLabel, ChartFormat, ChartPoint, ChartSolidFill, ChartType, Format,
    FormatAlign, FormatBorder, Workbook, Worksheet,
};

use fuelclean_core::{
    BorderKind, HorizontalAlign, RenderError, Style, Table, Value,
};
use fuelclean_pipeline::{CleanOutput, Summary};

/// Excel writer for pipeline output
#[derive(Clone, Debug)]
pub struct ExcelWriter {
    /// Whether to add the summary sheet at all
    pub include_summary: bool,
    /// Whether to embed the pie chart on the summary sheet
    pub include_chart: bool,
    /// Name of the summary sheet
    pub summary_sheet: String,
}

impl Default for ExcelWriter {
    fn default() -> Self {
        Self {
            include_summary: true,
            include_chart: true,
            summary_sheet: "Summary".into(),
        }
    }
}

impl ExcelWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the summary sheet name
    pub fn summary_sheet(mut self, name: impl Into<String>) -> Self {
        self.summary_sheet = name.into();
        self
    }

    /// Skip the summary sheet (and with it the chart)
    pub fn no_summary(mut self) -> Self {
        self.include_summary = false;
        self
    }

    /// Keep the summary sheet but skip the chart
    pub fn no_chart(mut self) -> Self {
        self.include_chart = false;
        self
    }

    /// Generate workbook bytes
    pub fn render_to_bytes(&self, output: &CleanOutput) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();

        self.add_data_sheet(&mut workbook, &output.data)?;
        if self.include_summary {
            self.add_summary_sheet(&mut workbook, &output.summary)?;
        }

        workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))
    }

    /// Write the workbook to a file
    pub fn save(&self, output: &CleanOutput, path: impl AsRef<std::path::Path>) -> Result<(), RenderError> {
        let bytes = self.render_to_bytes(output)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn add_data_sheet(&self, workbook: &mut Workbook, table: &Table) -> Result<(), RenderError> {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&table.name)
            .map_err(|e| RenderError::InvalidData(format!("Bad sheet name: {e}")))?;

        let default_style = Style::default();
        for (row, cells) in table.rows().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                // Unstyled empty cells carry no information
                if matches!(cell.value, Value::Empty) && cell.style == default_style {
                    continue;
                }
                write_cell(worksheet, row as u32, col as u16, &cell.value, &to_format(&cell.style))
                    .map_err(to_render_error)?;
            }
        }

        // Presentation merges last: merge_range blanks the covered cells, so
        // the anchor value is rewritten on top
        for span in &table.merges {
            let format = to_format(&table.style(span.first_row, span.first_col));
            worksheet
                .merge_range(
                    span.first_row as u32,
                    span.first_col as u16,
                    span.last_row as u32,
                    span.last_col as u16,
                    "",
                    &format,
                )
                .map_err(to_render_error)?;
            write_cell(
                worksheet,
                span.first_row as u32,
                span.first_col as u16,
                table.value(span.first_row, span.first_col),
                &format,
            )
            .map_err(to_render_error)?;
        }

        // Readable defaults: wide descriptive columns, medium numeric ones
        for col in 0..3u16 {
            worksheet.set_column_width(col, 22).map_err(to_render_error)?;
        }
        worksheet.set_column_width(4, 34).map_err(to_render_error)?;
        for col in [3u16, 5, 6] {
            worksheet.set_column_width(col, 16).map_err(to_render_error)?;
        }

        Ok(())
    }

    fn add_summary_sheet(&self, workbook: &mut Workbook, summary: &Summary) -> Result<(), RenderError> {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&self.summary_sheet)
            .map_err(|e| RenderError::InvalidData(format!("Bad sheet name: {e}")))?;

        let header = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin);
        let percent = Format::new().set_num_format("0.0%");
        let number = Format::new().set_num_format("#,##0.0");

        worksheet
            .write_string_with_format(0, 0, "Category", &header)
            .map_err(to_render_error)?;
        worksheet
            .write_string_with_format(0, 1, "Unified Fuel", &header)
            .map_err(to_render_error)?;
        worksheet
            .write_string_with_format(0, 2, "% of Total", &header)
            .map_err(to_render_error)?;

        for (i, row) in summary.rows.iter().enumerate() {
            let r = (i + 1) as u32;
            worksheet
                .write_string_with_format(r, 0, &row.label, &to_format(&row.label_style))
                .map_err(to_render_error)?;

            // The representative style wins where it carries a number format,
            // otherwise fall back to the sheet's own
            let value_format = if row.value_style.num_format.is_some() {
                to_format(&row.value_style)
            } else {
                number.clone()
            };
            worksheet
                .write_number_with_format(r, 1, row.total, &value_format)
                .map_err(to_render_error)?;
            worksheet
                .write_number_with_format(r, 2, row.share, &percent)
                .map_err(to_render_error)?;
        }

        worksheet.set_column_width(0, 24).map_err(to_render_error)?;
        worksheet.set_column_width(1, 16).map_err(to_render_error)?;
        worksheet.set_column_width(2, 12).map_err(to_render_error)?;

        if self.include_chart {
            let chart = self.build_pie_chart(summary);
            worksheet
                .insert_chart(1, 4, &chart)
                .map_err(to_render_error)?;
        }

        Ok(())
    }

    /// Pie of category totals: slice colors follow the category fills,
    /// labels sit on the slices, no legend, no raw values
    fn build_pie_chart(&self, summary: &Summary) -> Chart {
        let last_row = summary.rows.len() as u32;
        let mut chart = Chart::new(ChartType::Pie);

        let points: Vec<ChartPoint> = summary
            .rows
            .iter()
            .map(|row| {
                ChartPoint::new().set_format(
                    ChartFormat::new()
                        .set_solid_fill(ChartSolidFill::new().set_color(row.category.fill())),
                )
            })
            .collect();

        chart
            .add_series()
            .set_categories((self.summary_sheet.as_str(), 1, 0, last_row, 0))
            .set_values((self.summary_sheet.as_str(), 1, 1, last_row, 1))
            .set_points(&points)
            .set_data_label(
                ChartDataLabel::new()
                    .show_category_name()
                    .show_percentage(),
            );

        chart.title().set_name("Fuel distribution by category");
        chart.legend().set_hidden();
        chart
    }
}

fn to_render_error(e: rust_xlsxwriter::XlsxError) -> RenderError {
    RenderError::Format(e.to_string())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Value,
    format: &Format,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    match value {
        Value::Empty => {
            worksheet.write_blank(row, col, format)?;
        }
        Value::Number(n) => {
            worksheet.write_number_with_format(row, col, *n, format)?;
        }
        Value::Text(s) => {
            worksheet.write_string_with_format(row, col, s, format)?;
        }
        // Frozen upstream; if one slips through, keep the expression as text
        Value::Formula(expr) => {
            worksheet.write_string_with_format(row, col, expr, format)?;
        }
    }
    Ok(())
}

/// Map the pipeline's style model onto an xlsx format
fn to_format(style: &Style) -> Format {
    let mut format = Format::new();
    if style.font.bold {
        format = format.set_bold();
    }
    if style.font.italic {
        format = format.set_italic();
    }
    if let Some(size) = style.font.size {
        format = format.set_font_size(size);
    }
    if let Some(color) = style.font.color {
        format = format.set_font_color(color);
    }
    if let Some(fill) = style.fill {
        format = format.set_background_color(fill);
    }
    match style.border {
        BorderKind::None => {}
        BorderKind::Thin => format = format.set_border(FormatBorder::Thin),
        BorderKind::Medium => format = format.set_border(FormatBorder::Medium),
    }
    match style.align {
        HorizontalAlign::General => {}
        HorizontalAlign::Left => format = format.set_align(FormatAlign::Left),
        HorizontalAlign::Center => format = format.set_align(FormatAlign::Center),
        HorizontalAlign::Right => format = format.set_align(FormatAlign::Right),
    }
    if let Some(num_format) = &style.num_format {
        format = format.set_num_format(num_format);
    }
    if style.locked {
        format = format.set_locked();
    }
    format
}
