use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::RotaResult;
use crate::schedule::{DailyAssignment, WeekSchedule};

/// Escapes text for safe inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// "Team D (1) • Team B (2)"
pub fn format_locums(assignment: &DailyAssignment) -> String {
    assignment
        .locum_required
        .iter()
        .map(|s| format!("{} ({})", s.team, s.missing))
        .collect::<Vec<_>>()
        .join(" • ")
}

/// Plain-text rendering of one day, one team per line.
pub fn format_day_text(day_name: &str, assignment: &DailyAssignment) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "** {} **", day_name);
    for roster in &assignment.teams {
        let members = if roster.members.is_empty() {
            "[NONE]".to_string()
        } else {
            roster.members.join(", ")
        };
        let _ = writeln!(out, "{}: {}", roster.team, members);
    }
    if !assignment.locum_required.is_empty() {
        let _ = writeln!(out, "Locum Required: {}", format_locums(assignment));
    }
    out
}

pub fn format_week_text(schedule: &WeekSchedule) -> String {
    schedule
        .days
        .iter()
        .map(|d| format_day_text(&d.day.to_string(), &d.assignment))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes the whole week to a text file.
pub fn write_week_to_file<P: AsRef<Path>>(schedule: &WeekSchedule, path: P) -> RotaResult<()> {
    let mut file = File::create(path)?;
    file.write_all(format_week_text(schedule).as_bytes())?;
    Ok(())
}

/// Prints the week with a summary line per day.
pub fn print_week_schedule(schedule: &WeekSchedule) {
    for day in &schedule.days {
        println!("\n=== {} ===", day.day);
        println!("Clinicians assigned: {}", day.assignment.assigned_count());
        if !day.assignment.locum_required.is_empty() {
            println!("⚠️  Locum required: {}", format_locums(&day.assignment));
        }
        for roster in &day.assignment.teams {
            if roster.members.is_empty() {
                println!("  {} -> [NONE]", roster.team);
            } else {
                println!("  {} -> {}", roster.team, roster.members.join(", "));
            }
        }
    }
}

/// HTML fragment with one card per weekday.
pub fn render_week_html(schedule: &WeekSchedule) -> String {
    if schedule.is_empty() {
        return "<p class=\"text-danger\">No weekday assignments found.</p>\n".to_string();
    }

    let mut html = String::new();
    for day in &schedule.days {
        let _ = writeln!(html, "<div class=\"card mb-3 shadow-sm\">");
        let _ = writeln!(
            html,
            "  <div class=\"card-header bg-primary text-white\"><strong>{}</strong></div>",
            day.day
        );
        let _ = writeln!(html, "  <div class=\"card-body\">");
        html.push_str(&render_teams_html(&day.assignment));
        html.push_str(&render_locums_html(&day.assignment));
        let _ = writeln!(html, "  </div>");
        let _ = writeln!(html, "</div>");
    }
    html
}

fn render_teams_html(assignment: &DailyAssignment) -> String {
    let mut html = String::new();
    for roster in &assignment.teams {
        let members = if roster.members.is_empty() {
            "<em>None</em>".to_string()
        } else {
            roster
                .members
                .iter()
                .map(|m| escape_html(m))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let _ = writeln!(
            html,
            "    <p class=\"mb-1\"><strong>{}</strong>: {}</p>",
            escape_html(&roster.team),
            members
        );
    }
    html
}

fn render_locums_html(assignment: &DailyAssignment) -> String {
    if assignment.locum_required.is_empty() {
        return String::new();
    }
    format!(
        "    <p class=\"mt-2 text-danger\"><strong>⚠️ Locum Required:</strong> {}</p>\n",
        escape_html(&format_locums(assignment))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{DayRoster, Shortfall, TeamRoster};
    use chrono::Weekday;

    fn day() -> DailyAssignment {
        DailyAssignment {
            teams: vec![
                TeamRoster {
                    team: "Team A".to_string(),
                    members: vec!["Ann <Lee>".to_string(), "Bob O'Neil".to_string()],
                },
                TeamRoster {
                    team: "Team D".to_string(),
                    members: vec![],
                },
            ],
            locum_required: vec![Shortfall {
                team: "Team D".to_string(),
                missing: 1,
            }],
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("a & <b> \"c\" 'd'"), "a &amp; &lt;b&gt; &quot;c&quot; &#39;d&#39;");
    }

    #[test]
    fn text_rendering_lists_every_team() {
        let text = format_day_text("Mon", &day());
        assert_eq!(
            text,
            "** Mon **\nTeam A: Ann <Lee>, Bob O'Neil\nTeam D: [NONE]\nLocum Required: Team D (1)\n"
        );
    }

    #[test]
    fn html_escapes_names_and_shows_locums() {
        let week = WeekSchedule {
            days: vec![DayRoster {
                day: Weekday::Thu,
                assignment: day(),
            }],
        };
        let html = render_week_html(&week);
        assert!(html.contains("<strong>Thu</strong>"));
        assert!(html.contains("Ann &lt;Lee&gt;, Bob O&#39;Neil"));
        assert!(html.contains("<strong>Team D</strong>: <em>None</em>"));
        assert!(html.contains("Locum Required:</strong> Team D (1)"));
    }

    #[test]
    fn no_locum_line_when_fully_staffed() {
        let mut assignment = day();
        assignment.locum_required.clear();
        assert!(render_locums_html(&assignment).is_empty());
        assert!(!format_day_text("Fri", &assignment).contains("Locum"));
    }

    #[test]
    fn empty_week_says_so() {
        assert!(render_week_html(&WeekSchedule::default()).contains("No weekday assignments"));
    }

    #[test]
    fn writes_week_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rota.txt");
        let week = WeekSchedule {
            days: vec![DayRoster {
                day: Weekday::Mon,
                assignment: day(),
            }],
        };
        write_week_to_file(&week, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("** Mon **\n"));
    }
}
