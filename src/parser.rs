use calamine::{Data, Range, Reader, Xlsx};
use chrono::Weekday;
use csv::ReaderBuilder;
use regex::Regex;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::config::SheetLayout;
use crate::error::{RotaError, RotaResult};
use crate::schedule::ParentTeamMap;

/// Cell text meaning "not working this day" (night shift, zero day, annual leave).
const UNAVAILABLE_TOKENS: [&str; 3] = ["NIGHT", "ZERO", "AL"];

/// Anything in the name column containing one of these is not a clinician:
/// column headers, bleep numbers, shift times, arrows and status words.
const NON_NAME_TOKENS: [&str; 11] = [
    "FY1", "TEAM", "BLEEP", "0800", "0700", "→", "ZERO", "NIGHT", "AL", "SECOND", "LD",
];

static TEAM_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^team\s+\S").expect("team header pattern is valid")
});

/// A worksheet as a dense, row-major grid of trimmed cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterSheet {
    rows: Vec<Vec<String>>,
}

impl RosterSheet {
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Cell text, or "" when the position is outside the sheet.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Decodes an .xlsx payload and loads the sheet called `sheet_name`.
    pub fn from_xlsx_bytes(bytes: &[u8], sheet_name: &str) -> RotaResult<Self> {
        if bytes.is_empty() {
            return Err(RotaError::EmptyPayload);
        }

        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
        let sheet_names = workbook.sheet_names();
        let Some(name) = sheet_names
            .iter()
            .find(|n| n.trim() == sheet_name.trim())
            .cloned()
        else {
            return Err(RotaError::SheetNotFound {
                sheet: sheet_name.to_string(),
                available: sheet_names,
            });
        };

        let range = workbook.worksheet_range(&name)?;
        let sheet = Self::from_range(&range);
        info!(sheet = %name, rows = sheet.rows.len(), "loaded worksheet");
        Ok(sheet)
    }

    pub fn from_xlsx_path<P: AsRef<Path>>(path: P, sheet_name: &str) -> RotaResult<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_xlsx_bytes(&bytes, sheet_name)
    }

    /// Places every cell at its absolute position, so column indices match
    /// spreadsheet letters even when the used range doesn't start at A1.
    fn from_range(range: &Range<Data>) -> Self {
        let Some((start_row, start_col)) = range.start() else {
            return Self::default();
        };
        let (start_row, start_col) = (start_row as usize, start_col as usize);
        let (height, width) = range.get_size();

        let mut rows = vec![vec![String::new(); start_col + width]; start_row + height];
        for (row, col, cell) in range.used_cells() {
            rows[start_row + row][start_col + col] = cell.to_string().trim().to_string();
        }
        Self { rows }
    }

    /// Reads a CSV export of the roster sheet. There is no header row; every
    /// line is a sheet row and lines may differ in length.
    pub fn from_csv_reader<R: Read>(reader: R) -> RotaResult<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(|v| v.trim().to_string()).collect());
        }
        debug!(rows = rows.len(), "loaded csv roster");
        Ok(Self { rows })
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> RotaResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Picks the reader from the file extension.
    pub fn from_path<P: AsRef<Path>>(path: P, sheet_name: &str) -> RotaResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RotaError::FileNotFound(path.display().to_string()));
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "xlsx" => Self::from_xlsx_path(path, sheet_name),
            "csv" => Self::from_csv_path(path),
            _ => Err(RotaError::UnsupportedFormat(ext)),
        }
    }
}

/// True when the name column holds a clinician rather than a label.
pub fn is_name_like(cell: &str) -> bool {
    if cell.is_empty() {
        return false;
    }
    let upper = cell.to_uppercase();
    !NON_NAME_TOKENS.iter().any(|token| upper.contains(token))
}

/// Blank cells mean available; anything mentioning an unavailable token doesn't.
pub fn cell_available(cell: &str) -> bool {
    if cell.is_empty() {
        return true;
    }
    let upper = cell.to_uppercase();
    !UNAVAILABLE_TOKENS.iter().any(|token| upper.contains(token))
}

/// Returns the team name if the cell is a "Team X" group header.
pub fn team_header(cell: &str) -> Option<&str> {
    let cell = cell.trim();
    TEAM_HEADER.is_match(cell).then_some(cell)
}

/// Walks the sheet top to bottom, attaching each clinician to the most
/// recent team header above them.
pub fn extract_parent_team_map(sheet: &RosterSheet, layout: &SheetLayout) -> ParentTeamMap {
    let mut parents = ParentTeamMap::new();
    let mut current_team: Option<&str> = None;

    for row in 0..sheet.rows().len() {
        if let Some(team) = team_header(sheet.cell(row, layout.team_column)) {
            current_team = Some(team);
        }
        let name = sheet.cell(row, layout.name_column);
        if let Some(team) = current_team {
            if is_name_like(name) {
                parents.insert(name.to_string(), team.to_string());
            }
        }
    }

    parents
}

/// A clinician and their raw Mon..Fri cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRow {
    pub name: String,
    pub days: [String; 5],
}

impl WorkRow {
    /// Raw cell for a weekday; `None` at weekends.
    pub fn cell_for(&self, day: Weekday) -> Option<&str> {
        self.days
            .get(day.num_days_from_monday() as usize)
            .map(String::as_str)
    }

    pub fn available_on(&self, day: Weekday) -> bool {
        self.cell_for(day).is_some_and(cell_available)
    }
}

/// One row per name-like entry in the name column, in sheet order.
pub fn build_work_table(sheet: &RosterSheet, layout: &SheetLayout) -> Vec<WorkRow> {
    (0..sheet.rows().len())
        .filter_map(|row| {
            let name = sheet.cell(row, layout.name_column);
            if !is_name_like(name) {
                return None;
            }
            Some(WorkRow {
                name: name.to_string(),
                days: layout.day_columns.map(|col| sheet.cell(row, col).to_string()),
            })
        })
        .collect()
}

/// Everything the assignment engine needs from one roster sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterInput {
    pub parent_map: ParentTeamMap,
    pub work_rows: Vec<WorkRow>,
}

impl RosterInput {
    pub fn extract(sheet: &RosterSheet, layout: &SheetLayout) -> Self {
        Self {
            parent_map: extract_parent_team_map(sheet, layout),
            work_rows: build_work_table(sheet, layout),
        }
    }

    /// Names available on `day`, in sheet order.
    pub fn available_on(&self, day: Weekday) -> Vec<String> {
        self.work_rows
            .iter()
            .filter(|row| row.available_on(day))
            .map(|row| row.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: &[&[&str]]) -> RosterSheet {
        RosterSheet::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn name_like_rejects_labels_and_times() {
        assert!(is_name_like("George Hudson"));
        assert!(is_name_like("Locum Cover"));
        assert!(!is_name_like(""));
        assert!(!is_name_like("Team A"));
        assert!(!is_name_like("FY1 Jo Smith"));
        assert!(!is_name_like("Bleep"));
        assert!(!is_name_like("0800-1700"));
        assert!(!is_name_like("→ see page 2"));
        assert!(!is_name_like("Second on call"));
        // substring match, so some real names are lost too
        assert!(!is_name_like("Alice Smith"));
        assert!(!is_name_like("Donald Ng"));
    }

    #[test]
    fn availability_tokens_are_case_insensitive_substrings() {
        assert!(cell_available(""));
        assert!(cell_available("Clinic"));
        assert!(!cell_available("night"));
        assert!(!cell_available("ZERO DAY"));
        assert!(!cell_available("AL"));
        assert!(!cell_available("Study leave (al)"));
    }

    #[test]
    fn team_headers() {
        assert_eq!(team_header(" Team A "), Some("Team A"));
        assert_eq!(team_header("TEAM   D"), Some("TEAM   D"));
        assert_eq!(team_header("Team"), None);
        assert_eq!(team_header("Teams"), None);
        assert_eq!(team_header("A Team"), None);
    }

    #[test]
    fn cell_outside_sheet_is_blank() {
        let s = sheet(&[&["a"]]);
        assert_eq!(s.cell(0, 0), "a");
        assert_eq!(s.cell(0, 5), "");
        assert_eq!(s.cell(9, 0), "");
    }

    #[test]
    fn parent_map_follows_most_recent_header() {
        let s = sheet(&[
            &["", "Bleep"],
            &["", "Orphan Name"],
            &["Team A", "Ann Lee"],
            &["", "Bob Stone"],
            &["Team B", "Team B lead"],
            &["", "Cy Young"],
        ]);
        let parents = extract_parent_team_map(&s, &SheetLayout::default());

        assert_eq!(parents.get("Ann Lee").map(String::as_str), Some("Team A"));
        assert_eq!(parents.get("Bob Stone").map(String::as_str), Some("Team A"));
        assert_eq!(parents.get("Cy Young").map(String::as_str), Some("Team B"));
        assert!(!parents.contains_key("Orphan Name"));
        assert_eq!(parents.len(), 3);
    }

    #[test]
    fn work_table_reads_weekday_columns() {
        let s = sheet(&[
            &["Team A", "Bleep", "", "", "Mon", "Tue", "Wed", "Thu", "Fri"],
            &["", "Ann Lee", "1234", "0800", "", "NIGHT", "", "AL"],
        ]);
        let layout = SheetLayout::default();
        let table = build_work_table(&s, &layout);

        assert_eq!(table.len(), 1);
        assert_eq!(table[0].name, "Ann Lee");
        assert_eq!(table[0].days, ["", "NIGHT", "", "AL", ""].map(str::to_string));
        assert!(table[0].available_on(Weekday::Mon));
        assert!(!table[0].available_on(Weekday::Tue));
        assert!(table[0].available_on(Weekday::Fri));
        assert!(!table[0].available_on(Weekday::Sat));
    }

    #[test]
    fn csv_rows_may_be_ragged() {
        let csv = "Team A,Ann Lee,,,,NIGHT\n,Bob Stone\n";
        let s = RosterSheet::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(s.rows().len(), 2);
        assert_eq!(s.cell(0, 5), "NIGHT");
        assert_eq!(s.cell(1, 1), "Bob Stone");

        let input = RosterInput::extract(&s, &SheetLayout::default());
        assert_eq!(input.available_on(Weekday::Tue), vec!["Bob Stone"]);
        assert_eq!(input.available_on(Weekday::Mon), vec!["Ann Lee", "Bob Stone"]);
    }

    #[test]
    fn empty_payload_is_rejected_before_decoding() {
        let err = RosterSheet::from_xlsx_bytes(&[], "SHO Rota").unwrap_err();
        assert!(matches!(err, RotaError::EmptyPayload));
    }

    #[test]
    fn garbage_bytes_are_malformed() {
        let err = RosterSheet::from_xlsx_bytes(b"not a zip file", "SHO Rota").unwrap_err();
        assert!(matches!(err, RotaError::MalformedWorkbook(_)));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rota.ods");
        std::fs::write(&path, b"x").unwrap();
        let err = RosterSheet::from_path(&path, "SHO Rota").unwrap_err();
        assert!(matches!(err, RotaError::UnsupportedFormat(ext) if ext == "ods"));
    }
}
