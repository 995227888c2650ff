//! CSV export and import of schedules.
//!
//! One row per match: `participant,timeslot,resource,match`, all 1-based,
//! where `match` numbers the participant's matches in timeslot order.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::extract::Assignment;
use crate::model::SlotTriple;
use crate::result::Solution;

pub const CSV_HEADER: &str = "participant,timeslot,resource,match";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to read or write schedule: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// Writes the participant view of `solution` as CSV.
pub fn write_csv<W: Write>(solution: &Solution, mut writer: W) -> Result<(), ExportError> {
    writeln!(writer, "{CSV_HEADER}")?;
    for (participant, schedule) in solution.participant_view().iter() {
        for (number, m) in schedule.matches.iter().enumerate() {
            writeln!(
                writer,
                "{},{},{},{}",
                participant + 1,
                m.timeslot + 1,
                m.resource + 1,
                number + 1
            )?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Parses a CSV written by [`write_csv`] back into 0-based triples.
///
/// Blank lines are skipped. The match number column is checked for form but
/// otherwise ignored.
pub fn read_csv<R: BufRead>(reader: R) -> Result<Assignment, ExportError> {
    let mut triples = Vec::new();
    let mut saw_header = false;

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !saw_header {
            if line != CSV_HEADER {
                return Err(malformed(line_number, format!("expected header `{CSV_HEADER}`")));
            }
            saw_header = true;
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let [participant, timeslot, resource, number] = fields.as_slice() else {
            return Err(malformed(
                line_number,
                format!("expected 4 fields, found {}", fields.len()),
            ));
        };
        parse_id(number, "match", line_number)?;
        triples.push(SlotTriple::new(
            parse_id(participant, "participant", line_number)?,
            parse_id(timeslot, "timeslot", line_number)?,
            parse_id(resource, "resource", line_number)?,
        ));
    }

    if !saw_header {
        return Err(malformed(1, "missing header".to_owned()));
    }
    Ok(Assignment::from_triples(triples))
}

/// Parses a 1-based id and returns it 0-based.
fn parse_id(field: &str, column: &str, line: usize) -> Result<usize, ExportError> {
    match field.parse::<usize>() {
        Ok(0) => Err(malformed(line, format!("{column} ids start at 1"))),
        Ok(value) => Ok(value - 1),
        Err(e) => Err(malformed(line, format!("invalid {column} `{field}`: {e}"))),
    }
}

fn malformed(line: usize, reason: String) -> ExportError {
    ExportError::Malformed { line, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Schedule;
    use crate::model::{SlotSpace, VarState};
    use crate::search::SearchStats;

    fn solution() -> Solution {
        let space = SlotSpace::new(2, 4, 2);
        let mut values = vec![VarState::False; space.len()];
        for (p, t, r) in [(0, 0, 1), (0, 2, 1), (1, 1, 0), (1, 3, 1)] {
            values[space.var(p, t, r).index()] = VarState::True;
        }
        Solution {
            schedule: Schedule::from_values(&space, &values).unwrap(),
            objective: 3,
            is_optimal: true,
            elapsed_seconds: 0.0,
            stats: SearchStats::default(),
        }
    }

    #[test]
    fn test_write_csv() {
        let mut out = Vec::new();
        write_csv(&solution(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "participant,timeslot,resource,match\n\
             1,1,2,1\n\
             1,3,2,2\n\
             2,2,1,1\n\
             2,4,2,2\n"
        );
    }

    #[test]
    fn test_read_back_matches_assignment() {
        let solution = solution();
        let mut out = Vec::new();
        write_csv(&solution, &mut out).unwrap();
        let parsed = read_csv(out.as_slice()).unwrap();
        assert_eq!(&parsed, solution.assignment());
    }

    #[test]
    fn test_read_rejects_bad_rows() {
        let missing = read_csv("participant,timeslot,resource,match\n1,2\n".as_bytes());
        assert!(matches!(
            missing,
            Err(ExportError::Malformed { line: 2, .. })
        ));

        let zero = read_csv("participant,timeslot,resource,match\n0,1,1,1\n".as_bytes());
        assert!(matches!(zero, Err(ExportError::Malformed { line: 2, .. })));

        let text = read_csv("participant,timeslot,resource,match\n1,x,1,1\n".as_bytes());
        assert!(matches!(text, Err(ExportError::Malformed { line: 2, .. })));
    }

    #[test]
    fn test_read_requires_header() {
        assert!(matches!(
            read_csv("1,1,1,1\n".as_bytes()),
            Err(ExportError::Malformed { line: 1, .. })
        ));
        assert!(matches!(
            read_csv("".as_bytes()),
            Err(ExportError::Malformed { line: 1, .. })
        ));
    }
}
