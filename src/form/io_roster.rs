// Readers for the list of enumerators.

use std::collections::HashMap;

use calamine::{open_workbook, DataType, Reader, Xlsx};
use form_compiler::roster::{RosterEntry, RosterProvider};
use form_compiler::RosterError;
use log::{debug, info};
use snafu::prelude::*;

use crate::form::config_reader::RosterSource;
use crate::form::*;

pub const DEFAULT_WORKSHEET: &str = "lists";
pub const DEFAULT_CODE_COLUMN: &str = "No.";
pub const DEFAULT_LABEL_COLUMN: &str = "Enumerator";

/// The columns holding the code and the name of each enumerator.
#[derive(Eq, PartialEq, Debug, Clone)]
struct RosterColumns {
    code: String,
    label: String,
}

impl RosterColumns {
    fn from_source(source: &RosterSource) -> RosterColumns {
        RosterColumns {
            code: source
                .code_column
                .clone()
                .unwrap_or_else(|| DEFAULT_CODE_COLUMN.to_string()),
            label: source
                .label_column
                .clone()
                .unwrap_or_else(|| DEFAULT_LABEL_COLUMN.to_string()),
        }
    }

    // Returns the indexes of the code and label columns.
    fn find_in(&self, header: &[Option<String>], path: &str) -> FormResult<(usize, usize)> {
        let col_names: HashMap<&str, usize> = header
            .iter()
            .enumerate()
            .filter_map(|(idx, x)| x.as_ref().map(|s| (s.trim(), idx)))
            .collect();
        debug!("find_in: col_names: {:?}", col_names);
        let code_idx = col_names.get(self.code.as_str()).context(MissingColumnSnafu {
            column: self.code.clone(),
            path,
        })?;
        let label_idx = col_names
            .get(self.label.as_str())
            .context(MissingColumnSnafu {
                column: self.label.clone(),
                path,
            })?;
        Ok((*code_idx, *label_idx))
    }
}

/// A roster stored in a worksheet of an Excel workbook.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct XlsxRoster {
    path: String,
    worksheet: String,
    columns: RosterColumns,
}

impl XlsxRoster {
    fn read(&self) -> FormResult<Vec<RosterEntry>> {
        debug!(
            "XlsxRoster::read: path: {:?} worksheet: {:?}",
            self.path, self.worksheet
        );
        let mut workbook: Xlsx<_> = open_workbook(&self.path).context(OpeningExcelSnafu {
            path: self.path.clone(),
        })?;
        let wrange = workbook
            .worksheet_range(&self.worksheet)
            .context(MissingWorksheetSnafu {
                worksheet: self.worksheet.clone(),
                path: self.path.clone(),
            })?
            .context(OpeningExcelSnafu {
                path: self.path.clone(),
            })?;

        let mut rows = wrange.rows();
        let header: Vec<Option<String>> = match rows.next() {
            Some(cells) => cells.iter().map(cell_text).collect(),
            None => Vec::new(),
        };
        let (code_idx, label_idx) = self.columns.find_in(&header, &self.path)?;

        let mut res: Vec<RosterEntry> = Vec::new();
        for (idx, row) in rows.enumerate() {
            let code = row.get(code_idx).and_then(cell_text);
            let label = row.get(label_idx).and_then(cell_text);
            match (code, label) {
                (Some(code), Some(label)) => res.push(RosterEntry::new(code, label)),
                // Blank lines at the end of the sheet
                (None, None) => {}
                (code, label) => {
                    // Rows are numbered from 1 in the spreadsheet, the header is row 1.
                    whatever!(
                        "Incomplete row {} in {}: code {:?}, name {:?}",
                        idx + 2,
                        self.path,
                        code,
                        label
                    );
                }
            }
        }
        ensure!(
            !res.is_empty(),
            EmptyRosterSnafu {
                path: self.path.clone()
            }
        );
        info!("Read {} enumerators from {:?}", res.len(), self.path);
        Ok(res)
    }
}

impl RosterProvider for XlsxRoster {
    fn fetch_enumerators(&self) -> Result<Vec<RosterEntry>, RosterError> {
        self.read().map_err(RosterError::from)
    }
}

// The codes are often typed as numbers in the workbook: 3.0 is read as "3".
fn cell_text(cell: &DataType) -> Option<String> {
    let s = match cell {
        DataType::String(s) => s.trim().to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Bool(b) => b.to_string(),
        _ => String::new(),
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// A roster stored in a CSV file with a header line.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CsvRoster {
    path: String,
    columns: RosterColumns,
}

impl CsvRoster {
    fn read(&self) -> FormResult<Vec<RosterEntry>> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .context(CsvFileSnafu {
                path: self.path.clone(),
            })?;
        let header: Vec<Option<String>> = rdr
            .headers()
            .context(CsvFileSnafu {
                path: self.path.clone(),
            })?
            .iter()
            .map(|s| Some(s.to_string()))
            .collect();
        let (code_idx, label_idx) = self.columns.find_in(&header, &self.path)?;

        let mut res: Vec<RosterEntry> = Vec::new();
        for line_r in rdr.records() {
            let line = line_r.context(CsvFileSnafu {
                path: self.path.clone(),
            })?;
            let code = line.get(code_idx).map(str::trim).unwrap_or_default();
            let label = line.get(label_idx).map(str::trim).unwrap_or_default();
            if code.is_empty() && label.is_empty() {
                continue;
            }
            if code.is_empty() || label.is_empty() {
                whatever!(
                    "Incomplete line {:?} in {}",
                    line.position().map(|p| p.line()),
                    self.path
                );
            }
            res.push(RosterEntry::new(code, label));
        }
        ensure!(
            !res.is_empty(),
            EmptyRosterSnafu {
                path: self.path.clone()
            }
        );
        info!("Read {} enumerators from {:?}", res.len(), self.path);
        Ok(res)
    }
}

impl RosterProvider for CsvRoster {
    fn fetch_enumerators(&self) -> Result<Vec<RosterEntry>, RosterError> {
        self.read().map_err(RosterError::from)
    }
}

/// Builds the roster described by the configuration. The file is only read when the
/// compiler asks for the enumerators.
pub fn roster_from_source(source: &RosterSource) -> FormResult<Box<dyn RosterProvider>> {
    let columns = RosterColumns::from_source(source);
    match source.provider.as_str() {
        "xlsx" => Ok(Box::new(XlsxRoster {
            path: source.file_path.clone(),
            worksheet: source
                .worksheet_name
                .clone()
                .unwrap_or_else(|| DEFAULT_WORKSHEET.to_string()),
            columns,
        })),
        "csv" => Ok(Box::new(CsvRoster {
            path: source.file_path.clone(),
            columns,
        })),
        x => UnsupportedSnafu {
            what: "roster provider",
            value: x,
        }
        .fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(provider: &str) -> RosterSource {
        RosterSource {
            provider: provider.to_string(),
            file_path: format!(
                "{}/tests/data/basic_single/roster.csv",
                env!("CARGO_MANIFEST_DIR")
            ),
            worksheet_name: None,
            code_column: None,
            label_column: None,
        }
    }

    #[test]
    fn reads_csv_roster() {
        let roster = roster_from_source(&source("csv")).unwrap();
        let entries = roster.fetch_enumerators().unwrap();
        assert_eq!(
            entries,
            vec![
                RosterEntry::new("1", "Anna Berisha"),
                RosterEntry::new("2", "Besnik Krasniqi"),
            ]
        );
    }

    #[test]
    fn unknown_column() {
        let mut s = source("csv");
        s.label_column = Some("Name".to_string());
        let roster = roster_from_source(&s).unwrap();
        let err = roster.fetch_enumerators().unwrap_err();
        assert!(err.to_string().contains("Name"));
    }

    #[test]
    fn unknown_provider() {
        let res = roster_from_source(&source("sql"));
        assert!(matches!(res, Err(FormError::Unsupported { .. })));
    }

    #[test]
    fn numeric_cells() {
        assert_eq!(cell_text(&DataType::Float(3.0)), Some("3".to_string()));
        assert_eq!(cell_text(&DataType::Int(12)), Some("12".to_string()));
        assert_eq!(
            cell_text(&DataType::String(" Drita ".to_string())),
            Some("Drita".to_string())
        );
        assert_eq!(cell_text(&DataType::Empty), None);
    }
}
