use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use crate::config::Config;
use crate::legend::ColorLegend;
use crate::report::ReportTable;

/// Headings shown above the table
#[derive(Debug, Clone, PartialEq)]
pub struct PageInfo {
    pub title: String,
    pub heading: String,
    pub subheading: String,
    pub caption: String,
}

impl PageInfo {
    pub fn new(config: &Config, report_date: NaiveDate) -> Self {
        let (width_km, height_km) = config.region_size_km();
        Self {
            title: format!("Kachelmann Summary {}", report_date.format("%d.%m.%Y")),
            heading: format!(
                "Maximum Values in {}x{} km {}-centered square",
                format_km(width_km),
                format_km(height_km),
                config.location
            ),
            subheading: format!("Valid: {}", report_date.format("%d %b %Y (UTC)")),
            caption: config.param_name.clone(),
        }
    }
}

/// Kilometres rounded to metres, so `0.4 * 7` prints as `2.8`
fn format_km(km: f64) -> String {
    format!("{}", (km * 1000.0).round() / 1000.0)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Fixed-width text version of the table
pub fn render_text(table: &ReportTable) -> String {
    let display = table.display_grid();
    let labels = table.model_labels();
    let run_date = table.run_date().to_string();

    let widths: Vec<usize> = labels
        .iter()
        .enumerate()
        .map(|(col, label)| {
            display
                .iter()
                .map(|row| row[col].len())
                .chain(std::iter::once(label.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let _ = write!(out, "{:<10}  {:>8}", "Run Date", "Run Hour");
    for (label, width) in labels.iter().zip(&widths) {
        let _ = write!(out, "  {:>width$}", label, width = *width);
    }
    out.push('\n');

    for (hour, row) in table.run_hours().iter().zip(&display) {
        let _ = write!(out, "{:<10}  {:>8}", run_date, hour);
        for (value, width) in row.iter().zip(&widths) {
            let _ = write!(out, "  {:>width$}", value, width = *width);
        }
        out.push('\n');
    }
    out
}

/// HTML table with classified cells highlighted in their legend color
pub fn render_table_html(table: &ReportTable, legend: &ColorLegend, caption: &str) -> String {
    let display = table.display_grid();
    let values = table.value_grid();

    let mut html = String::new();
    html.push_str("<table>\n");
    let _ = writeln!(html, "  <caption>{}<br></caption>", escape(caption));

    html.push_str("  <thead>\n    <tr>\n      <th></th>\n      <th></th>\n");
    for label in table.model_labels() {
        let _ = writeln!(html, "      <th>{}</th>", escape(label));
    }
    html.push_str("    </tr>\n    <tr>\n      <th>Run Date</th>\n      <th>Run Hour</th>\n");
    for _ in table.models() {
        html.push_str("      <th></th>\n");
    }
    html.push_str("    </tr>\n  </thead>\n  <tbody>\n");

    let row_count = table.run_hours().len();
    for (row, hour) in table.run_hours().iter().enumerate() {
        html.push_str("    <tr>\n");
        if row == 0 {
            let _ = writeln!(
                html,
                "      <th rowspan=\"{}\">{}</th>",
                row_count,
                table.run_date()
            );
        }
        let _ = writeln!(html, "      <th>{}</th>", hour);

        for (label, value) in display[row].iter().zip(&values[row]) {
            match value {
                Some(v) => {
                    let _ = writeln!(
                        html,
                        "      <td style=\"background-color: {};\">{}</td>",
                        legend.color_for_value(*v).to_hex(),
                        escape(label)
                    );
                }
                None => {
                    let _ = writeln!(html, "      <td>{}</td>", escape(label));
                }
            }
        }
        html.push_str("    </tr>\n");
    }
    html.push_str("  </tbody>\n</table>\n");
    html
}

/// Complete HTML page
pub fn render_html(table: &ReportTable, legend: &ColorLegend, page: &PageInfo) -> String {
    format!(
        "<html>\n<head>\n<title>{}</title>\n</head>\n<body>\n<h1>{}</h1>\n<h2>{}</h2>\n{}</body>\n</html>\n",
        escape(&page.title),
        escape(&page.heading),
        escape(&page.subheading),
        render_table_html(table, legend, &page.caption)
    )
}

/// Write the current page and its dated archive copy.
/// Returns both file paths.
pub fn write_outputs(html: &str, config: &Config, report_date: NaiveDate) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("failed to create {}", config.output_dir.display()))?;
    fs::create_dir_all(&config.archive_dir)
        .with_context(|| format!("failed to create {}", config.archive_dir.display()))?;

    let current = config.output_dir.join("kachelmann.html");
    let archive = config
        .archive_dir
        .join(format!("kachelmann_{}.html", report_date.format("%Y%m%d")));

    fs::write(&current, html).with_context(|| format!("failed to write {}", current.display()))?;
    info!("Report written to {}", current.display());
    fs::write(&archive, html).with_context(|| format!("failed to write {}", archive.display()))?;
    info!("Archive copy written to {}", archive.display());

    Ok((current, archive))
}
