use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug, Deserialize)]
pub(crate) struct UnitRow {
    pub(crate) id: u32,
    pub(crate) building: String,
    pub(crate) floor: u8,
    #[serde(default)]
    pub(crate) location: String,
    pub(crate) general_share: f64,
    pub(crate) elevator_coefficient: f64,
    #[serde(default)]
    pub(crate) elevator_share: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) owners: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) board_member: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuoteRow {
    pub(crate) vendor: String,
    #[serde(default)]
    pub(crate) pretax_cost: Option<f64>,
    #[serde(default)]
    pub(crate) posttax_cost: Option<f64>,
    #[serde(default)]
    pub(crate) capacity_kg: Option<u32>,
    #[serde(default)]
    pub(crate) capacity_persons: Option<u32>,
    #[serde(default)]
    pub(crate) opening_mm: Option<u32>,
    #[serde(default)]
    pub(crate) pit_mm: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) accessible: Option<String>,
    #[serde(default)]
    pub(crate) floors_served: Option<u8>,
    #[serde(default)]
    pub(crate) maintenance_pretax: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) duration: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) remarks: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) recommended: Option<String>,
}

/// Deserializes every row, pairing it with its 1-based line number
/// (the header is line 1).
pub(crate) fn parse_rows<T, R>(reader: R) -> Result<Vec<(usize, T)>, csv::Error>
where
    T: for<'de> Deserialize<'de>,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<T>().enumerate() {
        rows.push((index + 2, record?));
    }

    Ok(rows)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
