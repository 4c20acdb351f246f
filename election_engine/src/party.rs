use crate::ballot::CandidateIdx;

/// A party in an open party list election.
///
/// Members are referenced by their index in the election's candidate list.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Party {
    pub name: String,
    candidates: Vec<CandidateIdx>,
    votes: u64,
    seats: u32,
}

impl Party {
    pub fn new(name: &str) -> Party {
        Party {
            name: name.to_string(),
            candidates: Vec::new(),
            votes: 0,
            seats: 0,
        }
    }

    pub fn add_candidate(&mut self, idx: CandidateIdx) {
        self.candidates.push(idx);
    }

    pub fn candidates(&self) -> &[CandidateIdx] {
        &self.candidates
    }

    pub fn total_candidates(&self) -> usize {
        self.candidates.len()
    }

    pub fn add_vote(&mut self) {
        self.votes += 1;
    }

    pub fn votes(&self) -> u64 {
        self.votes
    }

    pub fn seats(&self) -> u32 {
        self.seats
    }

    pub fn set_seats(&mut self, seats: u32) {
        self.seats = seats;
    }
}
