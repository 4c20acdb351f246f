/*!
Counting engine for three electoral methods read from tabulated ballot files:

- Instant runoff (`IR`): ranked ballots, the weakest candidate is eliminated and its ballots
  move to their next choice until one candidate holds a majority.
- Open party list (`OPL`): seats go to parties by largest remainder, then to the candidates
  with the most votes inside each party.
- Popularity only (`PO`): the candidate with the most votes wins.

```
use election_engine::{Election, MemoryLogger, ScriptedTieBreaker};
# use election_engine::VotingErrors;

let rows: Vec<Vec<String>> = vec![
    vec!["PO"],
    vec!["2"],
    vec!["Anna", "", "Bob", ""],
    vec!["3"],
    vec!["1", ""],
    vec!["", "1"],
    vec!["1", ""],
]
.into_iter()
.map(|r| r.into_iter().map(String::from).collect())
.collect();

let mut election = Election::new(
    &rows,
    Box::new(MemoryLogger::default()),
    Box::new(ScriptedTieBreaker::default()),
)?;
let result = election.run()?;
assert_eq!(result.winner_names(), vec!["Anna".to_string()]);
# Ok::<(), VotingErrors>(())
```
*/
mod config;
mod election;

pub mod ballot;
pub mod candidate;
pub mod ir;
pub mod logger;
pub mod opl;
pub mod party;
pub mod po;
pub mod report;
pub mod table;
pub mod tiebreak;

use log::info;
use std::path::Path;

pub use crate::config::*;
pub use crate::ir::IrElection;
pub use crate::logger::{ElectionLogger, FileLogger, MemoryLogger};
pub use crate::opl::OplElection;
pub use crate::po::PoElection;
pub use crate::report::{format_percentage, format_results};
pub use crate::table::ElectionTable;
pub use crate::tiebreak::{ClockTieBreaker, ScriptedTieBreaker, SeededTieBreaker, TieBreaker};

/// An election of any of the supported methods, chosen by the tag in the ballot file.
pub enum Election {
    InstantRunoff(IrElection),
    OpenPartyList(OplElection),
    PopularityOnly(PoElection),
}

impl Election {
    /// Builds an election from the loader's table of cells.
    ///
    /// The audit header is written to `logger` right away.
    pub fn new(
        rows: &[Vec<String>],
        logger: Box<dyn ElectionLogger>,
        tiebreaker: Box<dyn TieBreaker>,
    ) -> Result<Election, VotingErrors> {
        let table = ElectionTable::parse(rows)?;
        info!("Creating {} election", table.method);
        let e = match table.method {
            ElectionMethod::InstantRunoff => {
                Election::InstantRunoff(IrElection::new(&table, logger, tiebreaker)?)
            }
            ElectionMethod::OpenPartyList => {
                Election::OpenPartyList(OplElection::new(&table, logger, tiebreaker)?)
            }
            ElectionMethod::PopularityOnly => {
                Election::PopularityOnly(PoElection::new(&table, logger, tiebreaker)?)
            }
        };
        Ok(e)
    }

    /// Builds an election that writes its audit file and media report in `output_dir`.
    pub fn with_output_dir(
        rows: &[Vec<String>],
        output_dir: &Path,
        tiebreaker: Box<dyn TieBreaker>,
    ) -> Result<Election, VotingErrors> {
        let logger = FileLogger::create(output_dir)?;
        Election::new(rows, Box::new(logger), tiebreaker)
    }

    pub fn method(&self) -> ElectionMethod {
        match self {
            Election::InstantRunoff(_) => ElectionMethod::InstantRunoff,
            Election::OpenPartyList(_) => ElectionMethod::OpenPartyList,
            Election::PopularityOnly(_) => ElectionMethod::PopularityOnly,
        }
    }

    /// Counts the ballots. An election can only be counted once.
    pub fn run(&mut self) -> Result<ElectionResult, VotingErrors> {
        match self {
            Election::InstantRunoff(e) => e.run(),
            Election::OpenPartyList(e) => e.run(),
            Election::PopularityOnly(e) => e.run(),
        }
    }

    pub fn distribute_ballots(&mut self) -> Result<(), VotingErrors> {
        match self {
            Election::InstantRunoff(e) => e.distribute_ballots(),
            Election::OpenPartyList(e) => e.distribute_ballots(),
            Election::PopularityOnly(e) => e.distribute_ballots(),
        }
    }

    pub fn announce_results(&mut self) -> Result<ElectionResult, VotingErrors> {
        match self {
            Election::InstantRunoff(e) => e.announce_results(),
            Election::OpenPartyList(e) => e.announce_results(),
            Election::PopularityOnly(e) => e.announce_results(),
        }
    }

    /// Writes the audit header to the sink. `new` already does this once.
    pub fn setup_logger(&mut self) -> Result<(), VotingErrors> {
        match self {
            Election::InstantRunoff(e) => e.setup_logger(),
            Election::OpenPartyList(e) => e.setup_logger(),
            Election::PopularityOnly(e) => e.setup_logger(),
        }
    }

    pub fn is_winner(&self, idx: usize) -> bool {
        match self {
            Election::InstantRunoff(e) => e.is_winner(idx),
            Election::OpenPartyList(e) => e.is_winner(idx),
            Election::PopularityOnly(e) => e.is_winner(idx),
        }
    }

    pub fn total_candidates(&self) -> usize {
        match self {
            Election::InstantRunoff(e) => e.total_candidates(),
            Election::OpenPartyList(e) => e.total_candidates(),
            Election::PopularityOnly(e) => e.total_candidates(),
        }
    }

    pub fn total_ballots(&self) -> usize {
        match self {
            Election::InstantRunoff(e) => e.total_ballots(),
            Election::OpenPartyList(e) => e.total_ballots(),
            Election::PopularityOnly(e) => e.total_ballots(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::rows;
    use std::fs;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn ir_rows() -> Vec<Vec<String>> {
        rows(&[
            &["IR"],
            &["4"],
            &["Rosen", "D", "Kleinberg", "R", "Chou", "I", "Royce", "L"],
            &["6"],
            &["1", "3", "4", "2"],
            &["1", "", "2", ""],
            &["1", "2", "3", ""],
            &["3", "2", "1", "4"],
            &["", "", "1", "2"],
            &["", "", "", "1"],
        ])
    }

    #[test]
    fn dispatches_on_method_tag() {
        let e = Election::new(
            &ir_rows(),
            Box::new(MemoryLogger::default()),
            Box::new(ScriptedTieBreaker::default()),
        )
        .unwrap();
        assert_eq!(e.method(), ElectionMethod::InstantRunoff);
        assert_eq!(e.total_candidates(), 4);
        assert_eq!(e.total_ballots(), 6);

        let opl = rows(&[&["OPL"], &["1"], &["a", "A"], &["1"], &["1"], &["1"]]);
        let e = Election::new(
            &opl,
            Box::new(MemoryLogger::default()),
            Box::new(ScriptedTieBreaker::default()),
        )
        .unwrap();
        assert_eq!(e.method(), ElectionMethod::OpenPartyList);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let bad = rows(&[&["STV"], &["1"], &["a", "A"], &["0"]]);
        let res = Election::new(
            &bad,
            Box::new(MemoryLogger::default()),
            Box::new(ScriptedTieBreaker::default()),
        );
        assert!(matches!(res, Err(VotingErrors::MalformedTable { .. })));
    }

    #[test]
    fn setup_logger_repeats_the_header() {
        let log = MemoryLogger::default();
        let po = rows(&[&["PO"], &["1"], &["a", "A"], &["1"], &["1"]]);
        let mut e = Election::new(
            &po,
            Box::new(log.clone()),
            Box::new(ScriptedTieBreaker::default()),
        )
        .unwrap();
        assert_eq!(log.audit().matches("Election Type: PO").count(), 1);
        e.setup_logger().unwrap();
        assert_eq!(log.audit().matches("Election Type: PO").count(), 2);
    }

    #[test]
    fn ir_run_and_accessors() {
        init();
        // Ballot 5 ranks 1 of 4 candidates and is invalid. Majority is more than 3.
        // Round 1: Rosen 3, Kleinberg 0, Chou 2, Royce 0. The toss eliminates Kleinberg,
        // then Royce and Chou fall. Chou's ballots go to Rosen or exhaust.
        let log = MemoryLogger::default();
        let mut e = Election::new(
            &ir_rows(),
            Box::new(log.clone()),
            Box::new(ScriptedTieBreaker::new(&[0])),
        )
        .unwrap();
        let res = e.run().unwrap();
        assert_eq!(res.winners, vec![0]);
        assert_eq!(res.candidates[0].votes, 4);
        assert_eq!(res.invalid_ballots, 1);
        assert_eq!(res.round_stats.len(), 4);
        assert!(e.is_winner(0));
        assert!(!e.is_winner(2));
        assert!(log.audit().contains("Lowest count tie resolved with coin toss."));
        assert_eq!(log.media(), format_results(&res));
    }

    #[test]
    fn writes_audit_and_media_files() {
        init();
        let dir = tempfile::tempdir().unwrap();
        {
            let mut e = Election::with_output_dir(
                &ir_rows(),
                dir.path(),
                Box::new(SeededTieBreaker::new(5)),
            )
            .unwrap();
            e.run().unwrap();
        }
        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|d| d.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names.len(), 2);
        assert!(names[0].starts_with("VotingSystem_AuditFile_"));
        assert!(names[1].starts_with("VotingSystem_MediaReport_"));
        let audit = fs::read_to_string(dir.path().join(&names[0])).unwrap();
        assert!(audit.contains("Election Type: IR"));
        assert!(audit.contains("-----Winners-----"));
    }
}
