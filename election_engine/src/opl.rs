use log::{debug, info};
use std::cmp::Reverse;

use crate::ballot::CandidateIdx;
use crate::candidate::Candidate;
use crate::config::*;
use crate::election::ElectionBase;
use crate::logger::ElectionLogger;
use crate::party::Party;
use crate::report::format_results;
use crate::table::ElectionTable;
use crate::tiebreak::TieBreaker;

/// An open party list election.
///
/// Ballots carry a single choice. Seats go to parties by the largest remainder method with
/// a simple quota, then to the best placed candidates inside each party.
pub struct OplElection {
    base: ElectionBase,
    parties: Vec<Party>,
    // Party of each candidate, by index.
    candidate_party: Vec<usize>,
    total_seats: u32,
    quota: u64,
}

impl OplElection {
    pub fn new(
        table: &ElectionTable,
        logger: Box<dyn ElectionLogger>,
        tiebreaker: Box<dyn TieBreaker>,
    ) -> Result<OplElection, VotingErrors> {
        let base = ElectionBase::new(table, logger, tiebreaker);

        // Parties are created as their first candidate shows up.
        let mut parties: Vec<Party> = Vec::new();
        let mut candidate_party: Vec<usize> = Vec::new();
        for (idx, c) in base.candidates.iter().enumerate() {
            let label = c.party_label();
            let pidx = match parties.iter().position(|p| p.name == label) {
                Some(pidx) => pidx,
                None => {
                    parties.push(Party::new(label));
                    parties.len() - 1
                }
            };
            parties[pidx].add_candidate(idx);
            candidate_party.push(pidx);
        }
        debug!("OplElection::new: parties: {:?}", parties);

        let mut e = OplElection {
            base,
            parties,
            candidate_party,
            total_seats: table.seats.unwrap_or(0),
            quota: 0,
        };
        e.setup_logger()?;
        Ok(e)
    }

    pub fn setup_logger(&mut self) -> Result<(), VotingErrors> {
        self.base.write_header(Some(self.total_seats))
    }

    pub fn total_seats(&self) -> u32 {
        self.total_seats
    }

    pub fn quota(&self) -> u64 {
        self.quota
    }

    pub fn parties(&self) -> &[Party] {
        &self.parties
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
        self.compute_quota()?;
        self.allocate_seats()?;
        self.select_winners()?;
        self.announce_results()
    }

    /// Counts the first choice of every ballot for the candidate and for its party.
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
            let pidx = self.candidate_party[choice];
            self.parties[pidx].add_vote();
            let line = format!(
                "Ballot {} added to candidate {} and party {}\n",
                id, self.base.candidates[choice].name, self.parties[pidx].name
            );
            self.base.audit(&line)?;
        }
        Ok(())
    }

    /// Votes per seat: the number of ballots divided by the number of seats, rounded down.
    pub fn compute_quota(&mut self) -> Result<u64, VotingErrors> {
        self.base.audit("\nComputing quota\n")?;
        if self.total_seats == 0 {
            return Err(VotingErrors::NoSeats);
        }
        let ballots = self.base.total_ballots() as u64;
        let quota = ballots / self.total_seats as u64;
        if quota == 0 {
            return Err(VotingErrors::TooFewBallots {
                ballots,
                seats: self.total_seats,
            });
        }
        self.quota = quota;
        self.base.audit(&format!("Quota: {}\n", quota))?;
        Ok(quota)
    }

    /// Largest remainder apportionment.
    ///
    /// The first pass gives each party one seat per full quota, capped at its number of
    /// candidates. The remaining seats go one at a time to the party with the largest
    /// positive remainder, which then loses one quota of remainder. A party never receives
    /// more seats than it has candidates. Seats that no party can take stay vacant.
    pub fn allocate_seats(&mut self) -> Result<(), VotingErrors> {
        self.base.audit("\nAllocating seats\n")?;
        let quota = self.quota;
        let mut allocated: u32 = 0;
        let mut remainders: Vec<i64> = Vec::with_capacity(self.parties.len());

        for pidx in 0..self.parties.len() {
            let party = &self.parties[pidx];
            let votes = party.votes();
            let max_seats = party.total_candidates() as u64;
            let raw_seats = votes / quota;
            let (seats, remainder) = if raw_seats > max_seats {
                (max_seats, 0)
            } else {
                (raw_seats, (votes % quota) as i64)
            };
            let line = format!(
                "{}: {} divided by {} gives {} seats, remainder {}\n",
                party.name, votes, quota, seats, remainder
            );
            self.parties[pidx].set_seats(seats as u32);
            allocated += seats as u32;
            remainders.push(remainder);
            self.base.audit(&line)?;
        }
        debug!(
            "allocate_seats: first pass allocated {} of {}, remainders: {:?}",
            allocated, self.total_seats, remainders
        );

        while allocated < self.total_seats {
            // Only parties with room and a positive remainder compete for the leftover seats.
            let pool: Vec<usize> = (0..self.parties.len())
                .filter(|p| {
                    (self.parties[*p].seats() as usize) < self.parties[*p].total_candidates()
                        && remainders[*p] > 0
                })
                .collect();
            if pool.is_empty() {
                let line = format!(
                    "{} seats left unfilled: no party with a remaining candidate has a positive remainder\n",
                    self.total_seats - allocated
                );
                info!("allocate_seats: {}", line.trim_end());
                self.base.audit(&line)?;
                break;
            }
            let max = pool.iter().map(|p| remainders[*p]).max().unwrap_or(0);
            let tied: Vec<usize> = pool.into_iter().filter(|p| remainders[*p] == max).collect();

            let winner = if tied.len() > 1 {
                let pick = self.base.resolve_tie(tied.len());
                let names: Vec<&str> = tied.iter().map(|p| self.parties[*p].name.as_str()).collect();
                let line = format!(
                    "Tie on remainder {} between {}, resolved with coin toss for {}\n",
                    max,
                    names.join(", "),
                    self.parties[tied[pick]].name
                );
                self.base.audit(&line)?;
                tied[pick]
            } else {
                tied[0]
            };

            let seats = self.parties[winner].seats() + 1;
            self.parties[winner].set_seats(seats);
            remainders[winner] -= quota as i64;
            allocated += 1;
            let line = format!(
                "{} gets a seat for its remainder of {}, now {} seats\n",
                self.parties[winner].name, max, seats
            );
            self.base.audit(&line)?;
        }
        Ok(())
    }

    /// Picks the winners inside each party that holds seats.
    ///
    /// Candidates are ranked by votes. When candidates share the vote count at the last
    /// winning position, the remaining seats are drawn among all of them.
    pub fn select_winners(&mut self) -> Result<(), VotingErrors> {
        self.base.audit("\nChoosing winners\n")?;
        for pidx in 0..self.parties.len() {
            let seats = self.parties[pidx].seats() as usize;
            if seats == 0 {
                continue;
            }
            let members: Vec<CandidateIdx> = self.parties[pidx].candidates().to_vec();
            if seats >= members.len() {
                for cidx in members {
                    self.declare_winner(cidx)?;
                }
                continue;
            }

            let mut ranked = members;
            ranked.sort_by_key(|c| Reverse(self.base.candidates[*c].votes()));
            let cut_votes = self.base.candidates[ranked[seats - 1]].votes();
            let (sure, mut tied): (Vec<CandidateIdx>, Vec<CandidateIdx>) = ranked
                .iter()
                .cloned()
                .filter(|c| self.base.candidates[*c].votes() >= cut_votes)
                .partition(|c| self.base.candidates[*c].votes() > cut_votes);
            debug!(
                "select_winners: party {}: ranked {:?}, sure {:?}, tied {:?}",
                self.parties[pidx].name, ranked, sure, tied
            );

            for cidx in sure.iter() {
                self.declare_winner(*cidx)?;
            }
            let mut remaining = seats - sure.len();
            if tied.len() > remaining {
                let names: Vec<&str> = tied
                    .iter()
                    .map(|c| self.base.candidates[*c].name.as_str())
                    .collect();
                let line = format!(
                    "There is a tie between: {} for {} seats\n",
                    names.join(", "),
                    remaining
                );
                self.base.audit(&line)?;
            }
            while remaining > 0 {
                let pick = if tied.len() > remaining {
                    self.base.resolve_tie(tied.len())
                } else {
                    0
                };
                let cidx = tied.remove(pick);
                self.declare_winner(cidx)?;
                remaining -= 1;
            }
        }
        Ok(())
    }

    fn declare_winner(&mut self, cidx: CandidateIdx) -> Result<(), VotingErrors> {
        self.base.winners[cidx] = true;
        let line = format!("{} has won!\n", self.base.candidates[cidx].name);
        self.base.audit(&line)
    }

    pub fn announce_results(&mut self) -> Result<ElectionResult, VotingErrors> {
        let mut result = self.base.result(0);
        result.seats = Some(self.total_seats);
        result.quota = Some(self.quota);
        result.parties = self
            .parties
            .iter()
            .map(|p| PartyResult {
                name: p.name.clone(),
                votes: p.votes(),
                seats: p.seats(),
                candidates: p.candidates().to_vec(),
            })
            .collect();
        let report = format_results(&result);
        self.base.publish(&report)?;
        Ok(result)
    }
}
