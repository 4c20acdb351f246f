pub type BallotId = usize;
pub type CandidateIdx = usize;

/// One voter's ranked selection.
///
/// The preferences are fixed at construction. Only the rank cursor moves,
/// and only forward.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Ballot {
    id: BallotId,
    choices: Vec<CandidateIdx>,
    rank: usize,
    valid: bool,
}

impl Ballot {
    /// Builds a ballot from the cells of a ballot row.
    ///
    /// Looks for the marker "1", then "2", and so on. The column holding a marker is the
    /// candidate ranked at that position. The scan stops at the first missing marker, so a
    /// ballot ranked 1, 2, 4 only records two choices.
    pub fn new(cells: &[String], id: BallotId) -> Ballot {
        let mut choices: Vec<CandidateIdx> = Vec::new();
        for marker in 1.. {
            let marker = marker.to_string();
            match cells.iter().position(|cell| *cell == marker) {
                Some(idx) => choices.push(idx),
                None => break,
            }
        }
        Ballot {
            id,
            choices,
            rank: 0,
            valid: true,
        }
    }

    pub fn id(&self) -> BallotId {
        self.id
    }

    pub fn total_choices(&self) -> usize {
        self.choices.len()
    }

    /// The candidate at the current rank, or `None` once the ballot is exhausted.
    pub fn choice(&self) -> Option<CandidateIdx> {
        self.choices.get(self.rank).cloned()
    }

    pub fn advance(&mut self) {
        // Saturate so that a long run of advances cannot overflow.
        if self.rank <= self.choices.len() {
            self.rank += 1;
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn mark_invalid(&mut self) {
        self.valid = false;
    }
}
