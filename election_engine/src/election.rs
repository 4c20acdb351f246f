use log::{debug, info};

use crate::ballot::{Ballot, CandidateIdx};
use crate::candidate::Candidate;
use crate::config::*;
use crate::logger::ElectionLogger;
use crate::table::ElectionTable;
use crate::tiebreak::TieBreaker;

/// State shared by every counting method: the candidates and ballots, the winner flags,
/// and the two collaborators (audit sink and coin toss).
///
/// Candidates and ballots are addressed by their index, which is also their id.
pub(crate) struct ElectionBase {
    pub(crate) method: ElectionMethod,
    pub(crate) candidates: Vec<Candidate>,
    pub(crate) ballots: Vec<Ballot>,
    pub(crate) winners: Vec<bool>,
    logger: Box<dyn ElectionLogger>,
    tiebreaker: Box<dyn TieBreaker>,
    has_run: bool,
}

impl ElectionBase {
    pub(crate) fn new(
        table: &ElectionTable,
        logger: Box<dyn ElectionLogger>,
        tiebreaker: Box<dyn TieBreaker>,
    ) -> ElectionBase {
        let candidates: Vec<Candidate> = table
            .candidates
            .iter()
            .map(|(name, party)| Candidate::new(name, party))
            .collect();
        let ballots: Vec<Ballot> = table
            .ballots
            .iter()
            .enumerate()
            .map(|(idx, row)| Ballot::new(row, idx))
            .collect();
        info!(
            "{} election: {} candidates, {} ballots",
            table.method,
            candidates.len(),
            ballots.len()
        );
        ElectionBase {
            method: table.method,
            winners: vec![false; candidates.len()],
            candidates,
            ballots,
            logger,
            tiebreaker,
            has_run: false,
        }
    }

    pub(crate) fn total_candidates(&self) -> usize {
        self.candidates.len()
    }

    pub(crate) fn total_ballots(&self) -> usize {
        self.ballots.len()
    }

    pub(crate) fn audit(&mut self, content: &str) -> Result<(), VotingErrors> {
        self.logger.write_to_audit_file(content)?;
        Ok(())
    }

    pub(crate) fn media(&mut self, content: &str) -> Result<(), VotingErrors> {
        self.logger.write_to_media_report(content)?;
        Ok(())
    }

    pub(crate) fn resolve_tie(&mut self, n: usize) -> usize {
        self.tiebreaker.resolve_tie(n)
    }

    /// Checks the preconditions of a count. A count happens at most once.
    pub(crate) fn begin_run(&mut self) -> Result<(), VotingErrors> {
        if self.has_run {
            return Err(VotingErrors::AlreadyRun);
        }
        if self.candidates.is_empty() || self.ballots.is_empty() {
            info!(
                "begin_run: refusing to count {} candidates and {} ballots",
                self.candidates.len(),
                self.ballots.len()
            );
            return Err(VotingErrors::EmptyElection);
        }
        self.has_run = true;
        Ok(())
    }

    pub(crate) fn candidate_label(&self, idx: CandidateIdx) -> String {
        format!("Candidate {} ({})", idx, self.candidates[idx].name)
    }

    /// The header of the audit file.
    pub(crate) fn audit_header(&self, seats: Option<u32>) -> String {
        let mut header = String::new();
        header += "\n========== Voting System Audit Results ==========\n\n";
        header += &format!("Election Type: {}\n", self.method);
        header += &format!("Number of Candidates: {}\n", self.total_candidates());
        let names: Vec<String> = self
            .candidates
            .iter()
            .map(|c| format!("{} ({})", c.name, c.party_label()))
            .collect();
        header += &format!("Candidates: {}\n", names.join(", "));
        if let Some(s) = seats {
            header += &format!("Number of Seats: {}\n", s);
        }
        header += &format!("Number of Ballots: {}\n\n", self.total_ballots());
        header
    }

    pub(crate) fn write_header(&mut self, seats: Option<u32>) -> Result<(), VotingErrors> {
        let header = self.audit_header(seats);
        debug!("write_header: {:?}", header);
        self.audit(&header)
    }

    /// The part of the result common to every method.
    pub(crate) fn result(&self, invalid_ballots: u64) -> ElectionResult {
        ElectionResult {
            method: self.method,
            winners: (0..self.total_candidates())
                .filter(|idx| self.winners[*idx])
                .collect(),
            candidates: self
                .candidates
                .iter()
                .zip(self.winners.iter())
                .map(|(c, w)| CandidateResult {
                    name: c.name.clone(),
                    party: c.party.clone(),
                    votes: c.votes(),
                    winner: *w,
                })
                .collect(),
            total_ballots: self.total_ballots() as u64,
            invalid_ballots,
            seats: None,
            quota: None,
            parties: Vec::new(),
            round_stats: Vec::new(),
        }
    }

    /// Sends the final report to the audit file and the media report.
    pub(crate) fn publish(&mut self, report: &str) -> Result<(), VotingErrors> {
        self.audit(report)?;
        self.media(report)
    }
}
