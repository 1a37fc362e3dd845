use std::collections::VecDeque;
use tracing::{debug, warn};

use super::types::{DailyAssignment, ParentTeamMap, Shortfall, TeamRoster};
use crate::config::StaffingConfig;

/// Entries such as "Locum cover (Team D)" are slots, not people.
pub fn is_locum_placeholder(name: &str) -> bool {
    name.to_lowercase().contains("locum cover")
}

/// Assigns the clinicians available on one day to teams.
///
/// Placement runs in a fixed order: fixed placements first (ignoring
/// capacity), then a single scan placing people on their home team while it
/// is under its minimum, then remaining minimums filled from the front of
/// the pool in team order, then any surplus handed one at a time to the
/// currently smallest team. Locum shortfalls are only reported when the
/// day's headcount is below `config.locum_threshold`.
pub fn assign_day<S: AsRef<str>>(
    config: &StaffingConfig,
    available: &[S],
    parent_map: &ParentTeamMap,
) -> DailyAssignment {
    let mut pool: VecDeque<String> = available
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !is_locum_placeholder(name))
        .map(str::to_string)
        .collect();
    let headcount = pool.len();
    let mut rosters: Vec<Vec<String>> = vec![Vec::new(); config.teams.len()];

    // Fixed placements, in declaration order.
    for placement in &config.fixed {
        let Some(team) = config.team_index(&placement.team) else {
            continue;
        };
        if let Some(pos) = pool.iter().position(|name| *name == placement.clinician) {
            if let Some(name) = pool.remove(pos) {
                rosters[team].push(name);
            }
        }
    }

    // Home team, one pass. Someone skipped here is not reconsidered.
    let mut remaining = VecDeque::with_capacity(pool.len());
    for name in pool.drain(..) {
        let home = parent_map
            .get(&name)
            .and_then(|team| config.team_index(team))
            .filter(|&team| rosters[team].len() < config.teams[team].required);
        match home {
            Some(team) => rosters[team].push(name),
            None => remaining.push_back(name),
        }
    }
    let mut pool = remaining;

    // Remaining minimums, FIFO.
    for (team, requirement) in config.teams.iter().enumerate() {
        while rosters[team].len() < requirement.required {
            match pool.pop_front() {
                Some(name) => rosters[team].push(name),
                None => break,
            }
        }
    }

    // Surplus goes to the smallest team; ties go to the earlier team.
    while let Some(name) = pool.pop_front() {
        let Some(team) = smallest_team(&rosters) else {
            warn!(unplaced = pool.len() + 1, "no teams configured, clinicians left unassigned");
            break;
        };
        rosters[team].push(name);
    }

    let mut locum_required = Vec::new();
    if headcount < config.locum_threshold {
        for (requirement, members) in config.teams.iter().zip(&rosters) {
            if members.len() < requirement.required {
                locum_required.push(Shortfall {
                    team: requirement.name.clone(),
                    missing: requirement.required - members.len(),
                });
            }
        }
    }

    debug!(
        headcount,
        excluded = available.len() - headcount,
        short_teams = locum_required.len(),
        "assigned day"
    );

    DailyAssignment {
        teams: config
            .teams
            .iter()
            .zip(rosters)
            .map(|(requirement, members)| TeamRoster {
                team: requirement.name.clone(),
                members,
            })
            .collect(),
        locum_required,
    }
}

fn smallest_team(rosters: &[Vec<String>]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, members) in rosters.iter().enumerate() {
        match best {
            Some(current) if rosters[current].len() <= members.len() => {}
            _ => best = Some(index),
        }
    }
    best
}
