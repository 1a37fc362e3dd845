use chrono::Weekday;
use std::path::Path;
use tracing::info;

use super::assign::assign_day;
use super::types::{DayRoster, WeekSchedule};
use crate::config::{RotaConfig, StaffingConfig};
use crate::error::RotaResult;
use crate::parser::{RosterInput, RosterSheet};

/// The working week, in output order.
pub const WEEKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// Runs the daily assignment once per weekday. Days share nothing but the
/// config and the parent map.
pub fn assign_week(config: &StaffingConfig, roster: &RosterInput) -> WeekSchedule {
    let days = WEEKDAYS
        .iter()
        .map(|&day| {
            let available = roster.available_on(day);
            DayRoster {
                day,
                assignment: assign_day(config, &available, &roster.parent_map),
            }
        })
        .collect();
    WeekSchedule { days }
}

/// Decodes an uploaded workbook and schedules the week.
pub fn schedule_from_workbook(config: &RotaConfig, bytes: &[u8]) -> RotaResult<WeekSchedule> {
    let sheet = RosterSheet::from_xlsx_bytes(bytes, &config.layout.sheet_name)?;
    Ok(schedule_from_sheet(config, &sheet))
}

/// Reads a roster file (.xlsx or .csv) and schedules the week.
pub fn schedule_from_path<P: AsRef<Path>>(config: &RotaConfig, path: P) -> RotaResult<WeekSchedule> {
    let sheet = RosterSheet::from_path(path, &config.layout.sheet_name)?;
    Ok(schedule_from_sheet(config, &sheet))
}

pub fn schedule_from_sheet(config: &RotaConfig, sheet: &RosterSheet) -> WeekSchedule {
    let roster = RosterInput::extract(sheet, &config.layout);
    info!(
        clinicians = roster.work_rows.len(),
        with_home_team = roster.parent_map.len(),
        "extracted roster"
    );
    assign_week(&config.staffing, &roster)
}
