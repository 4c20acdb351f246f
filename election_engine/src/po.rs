use log::debug;

use crate::ballot::CandidateIdx;
use crate::candidate::Candidate;
use crate::config::*;
use crate::election::ElectionBase;
use crate::logger::ElectionLogger;
use crate::report::format_results;
use crate::table::ElectionTable;
use crate::tiebreak::TieBreaker;

/// A popularity only election: the candidate with the most first choices wins.
pub struct PoElection {
    base: ElectionBase,
}

impl PoElection {
    pub fn new(
        table: &ElectionTable,
        logger: Box<dyn ElectionLogger>,
        tiebreaker: Box<dyn TieBreaker>,
    ) -> Result<PoElection, VotingErrors> {
        let mut e = PoElection {
            base: ElectionBase::new(table, logger, tiebreaker),
        };
        e.setup_logger()?;
        Ok(e)
    }

    pub fn setup_logger(&mut self) -> Result<(), VotingErrors> {
        self.base.write_header(None)
    }

    pub fn candidate(&self, idx: CandidateIdx) -> &Candidate {
        &self.base.candidates[idx]
    }

    pub fn total_candidates(&self) -> usize {
        self.base.total_candidates()
    }

    pub fn total_ballots(&self) -> usize {
        self.base.total_ballots()
    }

    pub fn is_winner(&self, idx: CandidateIdx) -> bool {
        self.base.winners[idx]
    }

    pub fn run(&mut self) -> Result<ElectionResult, VotingErrors> {
        self.base.begin_run()?;
        self.distribute_ballots()?;

        let max = self
            .base
            .candidates
            .iter()
            .map(|c| c.votes())
            .max()
            .unwrap_or(0);
        let leaders: Vec<CandidateIdx> = (0..self.base.total_candidates())
            .filter(|i| self.base.candidates[*i].votes() == max)
            .collect();
        debug!("PoElection::run: leaders {:?} with {} votes", leaders, max);

        let winner = if leaders.len() > 1 {
            let pick = self.base.resolve_tie(leaders.len());
            let names: Vec<&str> = leaders
                .iter()
                .map(|c| self.base.candidates[*c].name.as_str())
                .collect();
            let line = format!(
                "\nTie between {} with {} votes, resolved with coin toss.\n",
                names.join(", "),
                max
            );
            self.base.audit(&line)?;
            leaders[pick]
        } else {
            leaders[0]
        };
        self.base.winners[winner] = true;
        let line = format!(
            "\nWinner: {} with {} votes.\n",
            self.base.candidate_label(winner),
            max
        );
        self.base.audit(&line)?;

        self.announce_results()
    }

    /// Counts the first choice of every ballot.
    pub fn distribute_ballots(&mut self) -> Result<(), VotingErrors> {
        self.base.audit("\nDistributing ballots:\n")?;
        for idx in 0..self.base.ballots.len() {
            let ballot = &self.base.ballots[idx];
            let id = ballot.id();
            let choice = match ballot.choice() {
                Some(c) => c,
                None => return Err(VotingErrors::BlankBallot { ballot: id }),
            };
            self.base.candidates[choice].add_ballot(id);
            let line = format!("Ballot {} to {}\n", id, self.base.candidate_label(choice));
            self.base.audit(&line)?;
        }
        Ok(())
    }

    pub fn announce_results(&mut self) -> Result<ElectionResult, VotingErrors> {
        let result = self.base.result(0);
        let report = format_results(&result);
        self.base.publish(&report)?;
        Ok(result)
    }
}
