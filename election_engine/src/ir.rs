use log::{debug, info};
use std::collections::BTreeMap;

use crate::ballot::CandidateIdx;
use crate::candidate::Candidate;
use crate::config::*;
use crate::election::ElectionBase;
use crate::logger::ElectionLogger;
use crate::report::format_results;
use crate::table::ElectionTable;
use crate::tiebreak::TieBreaker;

/// Ballots ranking fewer than this share of the candidates are set aside.
const MIN_RANKED_FRACTION: f64 = 0.5;

/// An instant runoff election.
///
/// Each round either finds a winner or eliminates the weakest candidate and moves its
/// ballots to their next choice still in the running.
pub struct IrElection {
    base: ElectionBase,
    eliminated: Vec<bool>,
    // A winner needs strictly more votes than this.
    majority: u64,
    invalid_ballots: u64,
    round_stats: Vec<RoundStats>,
}

impl IrElection {
    pub fn new(
        table: &ElectionTable,
        logger: Box<dyn ElectionLogger>,
        tiebreaker: Box<dyn TieBreaker>,
    ) -> Result<IrElection, VotingErrors> {
        let base = ElectionBase::new(table, logger, tiebreaker);
        let mut e = IrElection {
            majority: (base.total_ballots() / 2) as u64,
            eliminated: vec![false; base.total_candidates()],
            base,
            invalid_ballots: 0,
            round_stats: Vec::new(),
        };
        e.setup_logger()?;
        e.validate_ballots()?;
        Ok(e)
    }

    pub fn setup_logger(&mut self) -> Result<(), VotingErrors> {
        self.base.write_header(None)
    }

    fn validate_ballots(&mut self) -> Result<(), VotingErrors> {
        let total_candidates = self.base.total_candidates();
        if total_candidates == 0 {
            return Ok(());
        }
        for idx in 0..self.base.ballots.len() {
            let ranked = self.base.ballots[idx].total_choices() as f64 / total_candidates as f64;
            if ranked < MIN_RANKED_FRACTION {
                self.base.ballots[idx].mark_invalid();
                self.invalid_ballots += 1;
                debug!("validate_ballots: ballot {} invalidated", idx);
                self.base.audit(&format!(
                    "Ballot {} does not have at least half of the candidates ranked and is now invalidated.\n",
                    idx
                ))?;
            }
        }
        Ok(())
    }

    pub fn majority(&self) -> u64 {
        self.majority
    }

    pub fn invalid_ballots(&self) -> u64 {
        self.invalid_ballots
    }

    pub fn is_eliminated(&self, idx: CandidateIdx) -> bool {
        self.eliminated[idx]
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

        let mut candidates_in_running = self.base.total_candidates();
        let mut round: u32 = 0;
        loop {
            round += 1;
            let tally = self.running_tally();
            info!("Round {} (majority: more than {}): {:?}", round, self.majority, tally);

            // Checked before the majority: the last candidate standing wins even without one.
            if candidates_in_running == 1 {
                if let Some(idx) = (0..self.base.total_candidates()).find(|i| !self.eliminated[*i]) {
                    self.base.winners[idx] = true;
                    self.base.audit(&format!(
                        "\nWinner declared as the last candidate remaining:\n{} with {} votes.\n",
                        self.base.candidate_label(idx),
                        self.base.candidates[idx].votes()
                    ))?;
                    self.push_round(round, tally, Some(idx), None);
                }
                break;
            }

            let majority = self.majority;
            let winner = (0..self.base.total_candidates()).find(|i| {
                !self.eliminated[*i] && self.base.candidates[*i].votes() > majority
            });
            if let Some(idx) = winner {
                self.base.winners[idx] = true;
                self.base.audit(&format!(
                    "\nWinner declared with clear majority:\n{} with {} votes.\n",
                    self.base.candidate_label(idx),
                    self.base.candidates[idx].votes()
                ))?;
                self.push_round(round, tally, Some(idx), None);
                break;
            }

            let elimination = self.eliminate_candidate()?;
            self.push_round(round, tally, None, Some(elimination));
            candidates_in_running -= 1;
        }

        self.announce_results()
    }

    fn running_tally(&self) -> Vec<(String, u64)> {
        self.base
            .candidates
            .iter()
            .zip(self.eliminated.iter())
            .filter(|(_, e)| !**e)
            .map(|(c, _)| (c.name.clone(), c.votes()))
            .collect()
    }

    fn push_round(
        &mut self,
        round: u32,
        tally: Vec<(String, u64)>,
        elected: Option<CandidateIdx>,
        eliminated: Option<EliminationStats>,
    ) {
        self.round_stats.push(RoundStats {
            round,
            tally,
            tally_results_elected: elected
                .map(|idx| vec![self.base.candidates[idx].name.clone()])
                .unwrap_or_default(),
            tally_result_eliminated: eliminated.into_iter().collect(),
        });
    }

    /// Gives every valid ballot to its first choice.
    pub fn distribute_ballots(&mut self) -> Result<(), VotingErrors> {
        self.base.audit("\nInitial Ballot Distribution:\n")?;
        for idx in 0..self.base.ballots.len() {
            let ballot = &self.base.ballots[idx];
            if !ballot.is_valid() {
                continue;
            }
            if let Some(choice) = ballot.choice() {
                let id = ballot.id();
                self.base.candidates[choice].add_ballot(id);
                let line = format!("Ballot {} to {}\n", id, self.base.candidate_label(choice));
                self.base.audit(&line)?;
            }
        }
        Ok(())
    }

    /// Eliminates the running candidate with the fewest votes. A tie for last place is
    /// settled by a coin toss that picks the candidate to eliminate.
    fn eliminate_candidate(&mut self) -> Result<EliminationStats, VotingErrors> {
        let running: Vec<CandidateIdx> = (0..self.base.total_candidates())
            .filter(|i| !self.eliminated[*i])
            .collect();
        let min_votes = running
            .iter()
            .map(|i| self.base.candidates[*i].votes())
            .min()
            .unwrap_or(0);
        let lowest: Vec<CandidateIdx> = running
            .iter()
            .cloned()
            .filter(|i| self.base.candidates[*i].votes() == min_votes)
            .collect();
        debug!("eliminate_candidate: lowest: {:?} with {} votes", lowest, min_votes);

        let loser = if lowest.len() > 1 {
            let pick = self.base.resolve_tie(lowest.len());
            let loser = lowest[pick];
            self.base.audit("\nLowest count tie resolved with coin toss.\n")?;
            for cidx in lowest.iter() {
                let line = if *cidx == loser {
                    format!("{} loses coin toss.\n", self.base.candidate_label(*cidx))
                } else {
                    format!(
                        "{} wins coin toss, not eliminated.\n",
                        self.base.candidate_label(*cidx)
                    )
                };
                self.base.audit(&line)?;
            }
            loser
        } else {
            lowest[0]
        };

        let line = format!("\n{} eliminated.\n", self.base.candidate_label(loser));
        self.base.audit(&line)?;
        self.eliminated[loser] = true;
        self.redistribute_ballots(loser)
    }

    /// Moves the ballots of an eliminated candidate to their next choice still running.
    fn redistribute_ballots(&mut self, from: CandidateIdx) -> Result<EliminationStats, VotingErrors> {
        self.base.audit("\nBallot Redistribution:\n")?;
        let mut transfers: BTreeMap<CandidateIdx, u64> = BTreeMap::new();
        let mut exhausted: u64 = 0;

        for id in self.base.candidates[from].take_all_votes() {
            let next = {
                let eliminated = &self.eliminated;
                let ballot = &mut self.base.ballots[id];
                loop {
                    ballot.advance();
                    match ballot.choice() {
                        Some(c) if eliminated[c] => continue,
                        x => break x,
                    }
                }
            };
            match next {
                Some(c) => {
                    self.base.candidates[c].add_ballot(id);
                    *transfers.entry(c).or_insert(0) += 1;
                    let line = format!("Ballot {} to {}\n", id, self.base.candidate_label(c));
                    self.base.audit(&line)?;
                }
                None => {
                    exhausted += 1;
                    self.base.audit(&format!(
                        "Ballot {} has no more valid ranks and is now unassigned.\n",
                        id
                    ))?;
                }
            }
        }

        Ok(EliminationStats {
            name: self.base.candidates[from].name.clone(),
            transfers: transfers
                .iter()
                .map(|(c, n)| (self.base.candidates[*c].name.clone(), *n))
                .collect(),
            exhausted,
        })
    }

    pub fn announce_results(&mut self) -> Result<ElectionResult, VotingErrors> {
        let mut result = self.base.result(self.invalid_ballots);
        result.round_stats = self.round_stats.clone();
        let report = format_results(&result);
        self.base.publish(&report)?;
        Ok(result)
    }
}
