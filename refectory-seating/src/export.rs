use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::WriterBuilder;

use crate::error::Result;
use crate::seating::{Gender, RefectoryTable, SeatingChart, Serie, Shift};

/// Restricts an export to one shift and/or one series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportFilter {
    pub shift: Option<Shift>,
    pub serie: Option<Serie>,
}

impl ExportFilter {
    pub fn shift(shift: Shift) -> Self {
        Self {
            shift: Some(shift),
            serie: None,
        }
    }

    fn includes(&self, shift: Shift, table: &RefectoryTable) -> bool {
        self.shift.map_or(true, |s| s == shift) && self.serie.map_or(true, |s| s == table.serie)
    }
}

/// Writes the chart as one block of rows per occupied table
///
/// Block layout:
/// shift, "Table N", "Serie S"
/// gender, full name, class   (one row per seated student, boys first)
pub fn export_chart_csv<W: Write>(
    chart: &SeatingChart,
    filter: &ExportFilter,
    writer: W,
) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);

    for shift in Shift::ALL {
        for table in chart.tables(shift) {
            if table.is_empty() || !filter.includes(shift, table) {
                continue;
            }
            wtr.write_record([
                shift.label().to_string(),
                format!("Table {}", table.table_number),
                format!("Serie {}", table.serie),
            ])?;
            for gender in [Gender::Male, Gender::Female] {
                for student in table.seats(gender) {
                    wtr.write_record([
                        gender.label(),
                        student.full_name.as_str(),
                        student.class.as_str(),
                    ])?;
                }
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

/// File name for an export, e.g. `seating_morning_serie1_2026-10-16.csv`
pub fn export_file_name(filter: &ExportFilter, date: NaiveDate) -> String {
    let shift = filter
        .shift
        .map(|s| s.label().to_lowercase())
        .unwrap_or_else(|| "all".to_string());
    match filter.serie {
        Some(serie) => format!("seating_{}_serie{}_{}.csv", shift, serie, date.format("%Y-%m-%d")),
        None => format!("seating_{}_{}.csv", shift, date.format("%Y-%m-%d")),
    }
}

/// Exports the chart into `dir` and returns the written path
pub fn export_chart_to_file(
    chart: &SeatingChart,
    filter: &ExportFilter,
    dir: &Path,
    date: NaiveDate,
) -> Result<PathBuf> {
    let path = dir.join(export_file_name(filter, date));
    let file = File::create(&path)?;
    export_chart_csv(chart, filter, file)?;
    Ok(path)
}
