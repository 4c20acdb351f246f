use crate::ballot::BallotId;

/// A candidate and the ballots currently counted for it.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Candidate {
    pub name: String,
    pub party: Option<String>,
    votes: u64,
    ballots: Vec<BallotId>,
}

impl Candidate {
    pub fn new(name: &str, party: &str) -> Candidate {
        Candidate {
            name: name.to_string(),
            party: if party.is_empty() {
                None
            } else {
                Some(party.to_string())
            },
            votes: 0,
            ballots: Vec::new(),
        }
    }

    pub fn votes(&self) -> u64 {
        self.votes
    }

    pub fn party_label(&self) -> &str {
        self.party.as_deref().unwrap_or("")
    }

    pub fn ballots(&self) -> &[BallotId] {
        &self.ballots
    }

    pub fn add_ballot(&mut self, id: BallotId) {
        self.ballots.push(id);
        self.votes += 1;
    }

    /// Hands back every assigned ballot and resets the count.
    pub fn take_all_votes(&mut self) -> Vec<BallotId> {
        self.votes = 0;
        std::mem::take(&mut self.ballots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_party_is_none() {
        let c = Candidate::new("Royce", "");
        assert_eq!(c.party, None);
        assert_eq!(c.party_label(), "");
        let d = Candidate::new("Pike", "D");
        assert_eq!(d.party.as_deref(), Some("D"));
    }

    #[test]
    fn add_ballot_counts_votes() {
        let mut c = Candidate::new("Pike", "D");
        c.add_ballot(3);
        c.add_ballot(0);
        c.add_ballot(9);
        assert_eq!(c.votes(), 3);
        assert_eq!(c.ballots(), &[3, 0, 9]);
    }

    #[test]
    fn take_all_votes_resets() {
        let mut c = Candidate::new("Foster", "D");
        c.add_ballot(1);
        c.add_ballot(2);
        assert_eq!(c.take_all_votes(), vec![1, 2]);
        assert_eq!(c.votes(), 0);
        assert!(c.ballots().is_empty());
        assert!(c.take_all_votes().is_empty());
    }
}
