//! Weekly SHO rota allocation.
//!
//! A roster sheet is read into a grid ([`parser`]), each weekday's available
//! clinicians are assigned to teams ([`schedule`]) under the staffing rules in
//! [`config`], and the week is returned as JSON or HTML ([`web`], [`display`]).

pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod parser;
pub mod schedule;
pub mod web;

pub use config::{RotaConfig, ServerSettings, SheetLayout, StaffingConfig};
pub use error::{RotaError, RotaResult};
pub use parser::{RosterInput, RosterSheet};
pub use schedule::{assign_day, assign_week, DailyAssignment, ParentTeamMap, WeekSchedule};
