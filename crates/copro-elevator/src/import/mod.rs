//! CSV import of the reference data: units and vendor quotes.

mod normalizer;
mod parser;

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::quotes::Quote;
use crate::registry::{validate_unit, BuildingCode, RegistryError, Unit, UnitId, UnitRegistry};

use normalizer::{parse_flag, split_owners, strip_invisible};
use parser::{parse_rows, QuoteRow, UnitRow};

pub const UNITS_FILE: &str = "units.csv";
pub const QUOTES_FILE: &str = "quotes.csv";

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { row: usize, message: String },
    Registry(RegistryError),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read reference data: {}", err),
            ImportError::Csv(err) => write!(f, "invalid CSV data: {}", err),
            ImportError::InvalidRow { row, message } => write!(f, "row {}: {}", row, message),
            ImportError::Registry(err) => write!(f, "invalid unit registry: {}", err),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::InvalidRow { .. } => None,
            ImportError::Registry(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<RegistryError> for ImportError {
    fn from(err: RegistryError) -> Self {
        Self::Registry(err)
    }
}

/// Unit registry and quote set loaded together from one data directory.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub registry: UnitRegistry,
    pub quotes: Vec<Quote>,
}

pub struct ReferenceImporter;

impl ReferenceImporter {
    /// Loads `units.csv` and `quotes.csv` from `data_dir`.
    pub fn load_dir<P: AsRef<Path>>(data_dir: P) -> Result<ReferenceData, ImportError> {
        let data_dir = data_dir.as_ref();
        let registry = Self::units_from_path(data_dir.join(UNITS_FILE))?;
        let quotes = Self::quotes_from_path(data_dir.join(QUOTES_FILE))?;
        info!(
            units = registry.len(),
            quotes = quotes.len(),
            data_dir = %data_dir.display(),
            "reference data loaded"
        );
        Ok(ReferenceData { registry, quotes })
    }

    pub fn units_from_path<P: AsRef<Path>>(path: P) -> Result<UnitRegistry, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::units_from_reader(file)
    }

    pub fn units_from_reader<R: Read>(mut reader: R) -> Result<UnitRegistry, ImportError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        let cleaned = strip_invisible(&raw);

        let mut seen: HashMap<UnitId, usize> = HashMap::new();
        let mut units = Vec::new();
        for (row, record) in parse_rows::<UnitRow, _>(cleaned.as_bytes())? {
            let unit = unit_from_row(row, record)?;
            if let Some(first) = seen.insert(unit.id, row) {
                return Err(ImportError::InvalidRow {
                    row,
                    message: format!("unit {} already defined on row {}", unit.id, first),
                });
            }
            validate_unit(&unit).map_err(|err| ImportError::InvalidRow {
                row,
                message: err.to_string(),
            })?;
            units.push(unit);
        }

        Ok(UnitRegistry::new(units)?)
    }

    pub fn quotes_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Quote>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::quotes_from_reader(file)
    }

    pub fn quotes_from_reader<R: Read>(mut reader: R) -> Result<Vec<Quote>, ImportError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        let cleaned = strip_invisible(&raw);

        parse_rows::<QuoteRow, _>(cleaned.as_bytes())?
            .into_iter()
            .map(|(row, record)| quote_from_row(row, record))
            .collect()
    }
}

fn unit_from_row(row: usize, record: UnitRow) -> Result<Unit, ImportError> {
    let board_member = flag(row, "board_member", record.board_member.as_deref())?;
    Ok(Unit {
        id: UnitId(record.id),
        building: BuildingCode::new(record.building),
        floor: record.floor,
        location: record.location,
        general_share: record.general_share,
        elevator_coefficient: record.elevator_coefficient,
        elevator_share: record.elevator_share,
        owners: record.owners.as_deref().map(split_owners).unwrap_or_default(),
        board_member,
    })
}

fn quote_from_row(row: usize, record: QuoteRow) -> Result<Quote, ImportError> {
    if record.vendor.is_empty() {
        return Err(ImportError::InvalidRow {
            row,
            message: "vendor is required".to_string(),
        });
    }

    Ok(Quote {
        accessible: flag(row, "accessible", record.accessible.as_deref())?,
        recommended: flag(row, "recommended", record.recommended.as_deref())?,
        vendor: record.vendor,
        pretax_cost: record.pretax_cost,
        posttax_cost: record.posttax_cost,
        capacity_kg: record.capacity_kg,
        capacity_persons: record.capacity_persons,
        opening_mm: record.opening_mm,
        pit_mm: record.pit_mm,
        floors_served: record.floors_served,
        maintenance_pretax: record.maintenance_pretax,
        duration: record.duration,
        remarks: record.remarks,
    })
}

fn flag(row: usize, column: &str, value: Option<&str>) -> Result<bool, ImportError> {
    parse_flag(value.unwrap_or_default()).ok_or_else(|| ImportError::InvalidRow {
        row,
        message: format!("{column} must be a yes/no flag, got `{}`", value.unwrap_or_default()),
    })
}
