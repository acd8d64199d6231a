use std::collections::HashSet;
use std::path::Path;

use crate::error::{PoolError, PoolResult};

/// One roster row: a competitor and the group it was drawn into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Competitor {
    pub group_name: String,
    pub country: String,
}

/// Load the group roster from a CSV file with `group_name` and `country`
/// columns. Row order is preserved; it decides home sides in the round-robin.
pub fn load_roster(path: &Path) -> PoolResult<Vec<Competitor>> {
    let mut reader = open_reader(path)?;
    let group_idx = column_index(&mut reader, path, "group_name")?;
    let country_idx = column_index(&mut reader, path, "country")?;

    let mut roster = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| {
            PoolError::Configuration(format!("read roster {}: {err}", path.display()))
        })?;
        let group_name = record.get(group_idx).unwrap_or("").trim();
        let country = record.get(country_idx).unwrap_or("").trim();
        if group_name.is_empty() || country.is_empty() {
            continue;
        }
        roster.push(Competitor {
            group_name: group_name.to_string(),
            country: country.to_string(),
        });
    }
    Ok(roster)
}

/// The external set of identifiers permitted to submit predictions.
#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    users: HashSet<String>,
}

impl Allowlist {
    /// Load from a CSV file with a `user_id` column. Failure here is a fatal
    /// configuration error: the source never recovers mid-session, so the
    /// caller reports once and refuses to start.
    pub fn load(path: &Path) -> PoolResult<Self> {
        let mut reader = open_reader(path)?;
        let user_idx = column_index(&mut reader, path, "user_id")?;

        let mut users = HashSet::new();
        for record in reader.records() {
            let record = record.map_err(|err| {
                PoolError::Configuration(format!("read allow-list {}: {err}", path.display()))
            })?;
            let user_id = record.get(user_idx).unwrap_or("").trim();
            if !user_id.is_empty() {
                users.insert(user_id.to_string());
            }
        }
        Ok(Self { users })
    }

    /// Case-sensitive exact membership. The empty string is never allowed.
    pub fn is_allowed_user(&self, user_id: &str) -> bool {
        self.users.contains(user_id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

fn open_reader(path: &Path) -> PoolResult<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|err| PoolError::Configuration(format!("open {}: {err}", path.display())))
}

fn column_index(
    reader: &mut csv::Reader<std::fs::File>,
    path: &Path,
    column: &str,
) -> PoolResult<usize> {
    let headers = reader.headers().map_err(|err| {
        PoolError::Configuration(format!("read header of {}: {err}", path.display()))
    })?;
    headers
        .iter()
        .position(|name| name == column)
        .ok_or_else(|| {
            PoolError::Configuration(format!(
                "{} is missing required column {column:?}",
                path.display()
            ))
        })
}
