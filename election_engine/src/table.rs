use log::debug;

use crate::config::{ElectionMethod, VotingErrors};

/// The header of a ballot file, with typed fields, and the raw ballot rows.
///
/// Layout of the rows:
/// - the method tag (`IR`, `OPL` or `PO`)
/// - the number of candidates
/// - the candidates as flattened `name, party` pairs
/// - (OPL only) the number of seats
/// - the number of ballots
/// - one row per ballot, holding the rank markers in the candidates' columns
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionTable {
    pub method: ElectionMethod,
    /// (name, party) pairs, in column order.
    pub candidates: Vec<(String, String)>,
    pub seats: Option<u32>,
    /// Ballot rows, cut to the candidate columns.
    pub ballots: Vec<Vec<String>>,
}

fn malformed<T>(message: String) -> Result<T, VotingErrors> {
    Err(VotingErrors::MalformedTable { message })
}

fn header_cell(rows: &[Vec<String>], row_idx: usize, what: &str) -> Result<String, VotingErrors> {
    match rows.get(row_idx).and_then(|row| row.first()) {
        Some(cell) => Ok(cell.trim().to_string()),
        None => malformed(format!("missing {} in row {}", what, row_idx + 1)),
    }
}

fn header_count(rows: &[Vec<String>], row_idx: usize, what: &str) -> Result<usize, VotingErrors> {
    let cell = header_cell(rows, row_idx, what)?;
    match cell.parse::<usize>() {
        Ok(x) => Ok(x),
        Err(_) => malformed(format!(
            "expected the {} in row {}, found {:?}",
            what,
            row_idx + 1,
            cell
        )),
    }
}

impl ElectionTable {
    pub fn parse(rows: &[Vec<String>]) -> Result<ElectionTable, VotingErrors> {
        let tag = header_cell(rows, 0, "election type")?;
        let method = match ElectionMethod::from_tag(&tag) {
            Some(m) => m,
            None => return malformed(format!("unknown election type {:?}", tag)),
        };

        let num_candidates = header_count(rows, 1, "number of candidates")?;
        let cand_row = match rows.get(2) {
            Some(row) => row,
            None => return malformed("missing the candidates row".to_string()),
        };
        if cand_row.len() < 2 * num_candidates {
            return malformed(format!(
                "expected {} candidates as name/party pairs, found {} cells",
                num_candidates,
                cand_row.len()
            ));
        }
        let candidates: Vec<(String, String)> = (0..num_candidates)
            .map(|i| {
                (
                    cand_row[2 * i].trim().to_string(),
                    cand_row[2 * i + 1].trim().to_string(),
                )
            })
            .collect();

        let (seats, ballot_count_row) = match method {
            ElectionMethod::OpenPartyList => {
                let seats = header_count(rows, 3, "number of seats")?;
                match u32::try_from(seats) {
                    Ok(s) => (Some(s), 4),
                    Err(_) => return malformed(format!("too many seats: {}", seats)),
                }
            }
            _ => (None, 3),
        };
        let num_ballots = header_count(rows, ballot_count_row, "number of ballots")?;

        let first_ballot = method.header_rows();
        let available = rows.len().saturating_sub(first_ballot);
        if available < num_ballots {
            return malformed(format!(
                "the header announces {} ballots but only {} ballot rows were found",
                num_ballots, available
            ));
        }
        let ballots: Vec<Vec<String>> = rows[first_ballot..first_ballot + num_ballots]
            .iter()
            .map(|row| {
                row.iter()
                    .take(num_candidates)
                    .map(|cell| cell.trim().to_string())
                    .collect()
            })
            .collect();
        debug!(
            "ElectionTable::parse: method: {:?} candidates: {:?} seats: {:?} ballots: {}",
            method,
            candidates,
            seats,
            ballots.len()
        );

        Ok(ElectionTable {
            method,
            candidates,
            seats,
            ballots,
        })
    }
}
