pub mod types;
pub mod assign;
pub mod week;

pub use types::{DailyAssignment, DayRoster, ParentTeamMap, Shortfall, TeamRoster, WeekSchedule};
pub use assign::{assign_day, is_locum_placeholder};
pub use week::{assign_week, schedule_from_path, schedule_from_sheet, schedule_from_workbook, WEEKDAYS};
