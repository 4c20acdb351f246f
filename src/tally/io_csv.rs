// Primitives for reading CSV ballot files.

use std::fs;

use election_engine::ElectionMethod;

use crate::tally::{io_common::simplify_file_name, *};

/// Trims a cell and drops the brackets around `[name, party]` candidate entries.
fn clean_cell(cell: &str) -> String {
    cell.chars()
        .filter(|c| !matches!(c, '[' | ']' | '(' | ')'))
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn read_csv_table(path: &str) -> TallyResult<Vec<Vec<String>>> {
    info!("Attempting to read ballot file {:?}", path);
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    parse_csv_table(&contents, path)
}

/// Parses each line on its own, so that empty lines stay in the table as empty rows.
pub fn parse_csv_table(contents: &str, path: &str) -> TallyResult<Vec<Vec<String>>> {
    let mut table: Vec<Vec<String>> = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        let lineno = idx + 1;
        if line.trim().is_empty() {
            table.push(Vec::new());
            continue;
        }
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(line.as_bytes());
        let mut record = csv::StringRecord::new();
        rdr.read_record(&mut record)
            .context(CsvLineParseSnafu { path, lineno })?;
        let row: Vec<String> = record.iter().map(clean_cell).collect();
        debug!("parse_csv_table: lineno: {:?} row: {:?}", lineno, row);
        table.push(row);
    }
    Ok(table)
}

fn method_of(path: &str, table: &[Vec<String>]) -> TallyResult<ElectionMethod> {
    let tag = table
        .first()
        .and_then(|row| row.first())
        .context(EmptyBallotFileSnafu { path })?;
    ElectionMethod::from_tag(tag).context(UnknownMethodSnafu { path, tag })
}

fn ballot_count(path: &str, table: &[Vec<String>], method: ElectionMethod) -> TallyResult<usize> {
    let row = method.header_rows() - 1;
    let cell = table
        .get(row)
        .and_then(|r| r.first())
        .context(BallotCountSnafu {
            path,
            message: "missing ballot count",
        })?;
    let count = cell.parse::<usize>().ok().context(BallotCountSnafu {
        path,
        message: format!("{:?} is not a number", cell),
    })?;
    let available = table.len().saturating_sub(method.header_rows());
    ensure!(
        available >= count,
        BallotCountSnafu {
            path,
            message: format!("{} ballots announced, {} ballot rows found", count, available)
        }
    );
    Ok(count)
}

/// Combines the tables of several ballot files for the same election.
///
/// The header comes from the first file. The ballots of every file follow, and the ballot
/// count row is replaced by the sum of the counts.
pub fn aggregate_tables(tables: &[(String, Vec<Vec<String>>)]) -> TallyResult<Vec<Vec<String>>> {
    let (first_path, first) = tables.first().context(NoBallotFilesSnafu {})?;
    let method = method_of(first_path, first)?;
    let header_rows = method.header_rows();

    let mut aggregated: Vec<Vec<String>> = first.iter().take(header_rows).cloned().collect();
    let mut total_ballots: usize = 0;
    for (path, table) in tables.iter() {
        let m = method_of(path, table)?;
        ensure!(
            m == method,
            MixedMethodsSnafu {
                first: method.tag(),
                other: m.tag(),
                path: simplify_file_name(path),
            }
        );
        let count = ballot_count(path, table, method)?;
        debug!(
            "aggregate_tables: {} ballots in {}",
            count,
            simplify_file_name(path)
        );
        aggregated.extend(table.iter().skip(header_rows).take(count).cloned());
        total_ballots += count;
    }

    if let Some(cell) = aggregated
        .get_mut(header_rows - 1)
        .and_then(|row| row.first_mut())
    {
        *cell = total_ballots.to_string();
    }
    info!(
        "Aggregated {} ballots from {} files",
        total_ballots,
        tables.len()
    );
    Ok(aggregated)
}
