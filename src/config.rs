use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use crate::error::{RotaError, RotaResult};

/// Environment variable naming a JSON configuration file.
pub const CONFIG_ENV: &str = "ROTA_CONFIG";

/// A team and the minimum headcount it needs every day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRequirement {
    pub name: String,
    pub required: usize,
}

/// A clinician who always works on the same team when available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedPlacement {
    pub clinician: String,
    pub team: String,
}

/// Staffing rules shared by every day of every request.
///
/// Team order matters: it is the tie-break order when filling minimums,
/// distributing surplus and reporting shortfalls.
///
/// When read from JSON, the built-in fixed placements only apply if the
/// built-in teams do too. A config that lists its own `teams` starts with no
/// fixed placements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawStaffingConfig")]
pub struct StaffingConfig {
    pub teams: Vec<TeamRequirement>,
    pub fixed: Vec<FixedPlacement>,
    pub locum_threshold: usize,
}

impl Default for StaffingConfig {
    fn default() -> Self {
        let team = |name: &str, required| TeamRequirement {
            name: name.to_string(),
            required,
        };
        let fixed = |clinician: &str, team: &str| FixedPlacement {
            clinician: clinician.to_string(),
            team: team.to_string(),
        };
        Self {
            teams: vec![
                team("Team A", 2),
                team("Team B", 3),
                team("Team C", 1),
                team("Team D", 1),
            ],
            fixed: vec![
                fixed("George Hudson", "Team A"),
                fixed("Suraj Sennik", "Team B"),
                fixed("Sanchita Bhatia", "Team B"),
                fixed("Feras Fayez", "Team D"),
            ],
            locum_threshold: 7,
        }
    }
}

/// Staffing rules as written in the config file; every key is optional.
#[derive(Debug, Deserialize)]
struct RawStaffingConfig {
    teams: Option<Vec<TeamRequirement>>,
    fixed: Option<Vec<FixedPlacement>>,
    locum_threshold: Option<usize>,
}

impl From<RawStaffingConfig> for StaffingConfig {
    fn from(raw: RawStaffingConfig) -> Self {
        let defaults = StaffingConfig::default();
        let (teams, fixed) = match raw.teams {
            Some(teams) => (teams, raw.fixed.unwrap_or_default()),
            None => (defaults.teams, raw.fixed.unwrap_or(defaults.fixed)),
        };
        Self {
            teams,
            fixed,
            locum_threshold: raw.locum_threshold.unwrap_or(defaults.locum_threshold),
        }
    }
}

impl StaffingConfig {
    /// Builds a config from `(team, minimum)` pairs with no fixed placements.
    pub fn with_teams<S: Into<String>>(
        teams: impl IntoIterator<Item = (S, usize)>,
        locum_threshold: usize,
    ) -> Self {
        Self {
            teams: teams
                .into_iter()
                .map(|(name, required)| TeamRequirement {
                    name: name.into(),
                    required,
                })
                .collect(),
            fixed: Vec::new(),
            locum_threshold,
        }
    }

    /// Adds a fixed placement, keeping declaration order.
    pub fn fix(mut self, clinician: impl Into<String>, team: impl Into<String>) -> Self {
        self.fixed.push(FixedPlacement {
            clinician: clinician.into(),
            team: team.into(),
        });
        self
    }

    /// Position of a team in declaration order.
    pub fn team_index(&self, name: &str) -> Option<usize> {
        self.teams.iter().position(|t| t.name == name)
    }

    pub fn team_names(&self) -> impl Iterator<Item = &str> {
        self.teams.iter().map(|t| t.name.as_str())
    }

    /// Sum of all team minimums.
    pub fn total_required(&self) -> usize {
        self.teams.iter().map(|t| t.required).sum()
    }

    /// Checks the invariants the assignment engine relies on.
    pub fn validate(&self) -> RotaResult<()> {
        if self.teams.is_empty() {
            return Err(RotaError::InvalidConfig(
                "at least one team must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for team in &self.teams {
            if team.name.trim().is_empty() {
                return Err(RotaError::InvalidConfig("team name is blank".to_string()));
            }
            if !seen.insert(team.name.as_str()) {
                return Err(RotaError::InvalidConfig(format!(
                    "team \"{}\" is declared twice",
                    team.name
                )));
            }
        }

        let mut fixed_seen = HashSet::new();
        for placement in &self.fixed {
            if self.team_index(&placement.team).is_none() {
                return Err(RotaError::InvalidConfig(format!(
                    "fixed placement for \"{}\" targets unknown team \"{}\"",
                    placement.clinician, placement.team
                )));
            }
            if !fixed_seen.insert(placement.clinician.as_str()) {
                return Err(RotaError::InvalidConfig(format!(
                    "\"{}\" has more than one fixed placement",
                    placement.clinician
                )));
            }
        }

        Ok(())
    }
}

/// Where the roster lives inside the uploaded workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSheetLayout", into = "RawSheetLayout")]
pub struct SheetLayout {
    pub sheet_name: String,
    /// Column holding "Team X" group headers (zero-based).
    pub team_column: usize,
    /// Column holding clinician names (zero-based).
    pub name_column: usize,
    /// Columns for Monday through Friday (zero-based).
    pub day_columns: [usize; 5],
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            sheet_name: "SHO Rota".to_string(),
            team_column: 0,
            name_column: 1,
            day_columns: [4, 5, 6, 7, 8],
        }
    }
}

/// Layout as written in the config file, with spreadsheet column letters.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawSheetLayout {
    sheet_name: String,
    team_column: String,
    name_column: String,
    day_columns: Vec<String>,
}

impl TryFrom<RawSheetLayout> for SheetLayout {
    type Error = String;

    fn try_from(raw: RawSheetLayout) -> Result<Self, Self::Error> {
        let column = |letters: &str| {
            column_index(letters).ok_or_else(|| format!("invalid column letter \"{}\"", letters))
        };

        if raw.day_columns.len() != 5 {
            return Err(format!(
                "expected 5 weekday columns (Mon..Fri), got {}",
                raw.day_columns.len()
            ));
        }
        let mut day_columns = [0usize; 5];
        for (slot, letters) in day_columns.iter_mut().zip(&raw.day_columns) {
            *slot = column(letters)?;
        }

        Ok(Self {
            sheet_name: raw.sheet_name.trim().to_string(),
            team_column: column(&raw.team_column)?,
            name_column: column(&raw.name_column)?,
            day_columns,
        })
    }
}

impl From<SheetLayout> for RawSheetLayout {
    fn from(layout: SheetLayout) -> Self {
        Self {
            sheet_name: layout.sheet_name,
            team_column: column_letters(layout.team_column),
            name_column: column_letters(layout.name_column),
            day_columns: layout.day_columns.iter().map(|&c| column_letters(c)).collect(),
        }
    }
}

/// Converts spreadsheet column letters ("A", "E", "AA") to a zero-based index.
pub fn column_index(letters: &str) -> Option<usize> {
    let letters = letters.trim();
    if letters.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let value = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index.checked_mul(26)?.checked_add(value)?;
    }
    Some(index - 1)
}

/// Inverse of [`column_index`].
pub fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// Everything loaded at startup: staffing rules plus the sheet layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotaConfig {
    pub staffing: StaffingConfig,
    pub layout: SheetLayout,
}

impl RotaConfig {
    /// Reads and validates a JSON config file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> RotaResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RotaError::FileNotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        info!(path = %path.display(), teams = config.staffing.teams.len(), "loaded staffing config");
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> RotaResult<Self> {
        let config: RotaConfig =
            serde_json::from_str(text).map_err(|e| RotaError::InvalidConfig(e.to_string()))?;
        config.staffing.validate()?;
        Ok(config)
    }

    /// Loads from an explicit path, else from `ROTA_CONFIG`, else defaults.
    pub fn load(explicit: Option<&Path>) -> RotaResult<Self> {
        if let Some(path) = explicit {
            return Self::from_json_file(path);
        }
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_json_file(path.trim()),
            _ => {
                let config = Self::default();
                config.staffing.validate()?;
                Ok(config)
            }
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub bind: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerSettings {
    /// Port from the command line; bind address and upload limit from
    /// `ROTA_BIND` and `ROTA_MAX_UPLOAD_BYTES`.
    pub fn from_env(port: Option<u16>) -> Self {
        let defaults = Self::default();
        Self {
            bind: std::env::var("ROTA_BIND")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.bind),
            port: port.unwrap_or(defaults.port),
            max_upload_bytes: std::env::var("ROTA_MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
        }
    }
}
