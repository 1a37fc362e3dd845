use chrono::Weekday;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::HashMap;

/// Clinician name -> home team, taken from the roster's team grouping.
pub type ParentTeamMap = HashMap<String, String>;

/// Members placed on one team, in placement order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRoster {
    pub team: String,
    pub members: Vec<String>,
}

/// How many locums a team needs on a low-attendance day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub team: String,
    pub missing: usize,
}

/// Result of assigning one day.
///
/// `teams` holds every configured team in declaration order, empty or not.
/// Serializes as `{"Teams": {..}, "Locum Required": {..}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyAssignment {
    pub teams: Vec<TeamRoster>,
    pub locum_required: Vec<Shortfall>,
}

impl DailyAssignment {
    pub fn roster(&self, team: &str) -> Option<&[String]> {
        self.teams
            .iter()
            .find(|t| t.team == team)
            .map(|t| t.members.as_slice())
    }

    pub fn shortfall(&self, team: &str) -> Option<usize> {
        self.locum_required
            .iter()
            .find(|s| s.team == team)
            .map(|s| s.missing)
    }

    /// Total number of clinicians placed across all teams.
    pub fn assigned_count(&self) -> usize {
        self.teams.iter().map(|t| t.members.len()).sum()
    }

    /// Team sizes in declaration order.
    pub fn team_sizes(&self) -> Vec<usize> {
        self.teams.iter().map(|t| t.members.len()).collect()
    }
}

impl Serialize for DailyAssignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("Teams", &TeamsView(&self.teams))?;
        map.serialize_entry("Locum Required", &ShortfallView(&self.locum_required))?;
        map.end()
    }
}

struct TeamsView<'a>(&'a [TeamRoster]);

impl Serialize for TeamsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for roster in self.0 {
            map.serialize_entry(&roster.team, &roster.members)?;
        }
        map.end()
    }
}

struct ShortfallView<'a>(&'a [Shortfall]);

impl Serialize for ShortfallView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for shortfall in self.0 {
            map.serialize_entry(&shortfall.team, &shortfall.missing)?;
        }
        map.end()
    }
}

/// One weekday's assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRoster {
    pub day: Weekday,
    pub assignment: DailyAssignment,
}

/// Assignments for Monday through Friday, keyed by weekday name when
/// serialized (`{"Mon": {..}, "Tue": {..}, ..}`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekSchedule {
    pub days: Vec<DayRoster>,
}

impl WeekSchedule {
    pub fn day(&self, day: Weekday) -> Option<&DailyAssignment> {
        self.days
            .iter()
            .find(|d| d.day == day)
            .map(|d| &d.assignment)
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl Serialize for WeekSchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for day in &self.days {
            map.serialize_entry(&day.day.to_string(), &day.assignment)?;
        }
        map.end()
    }
}
