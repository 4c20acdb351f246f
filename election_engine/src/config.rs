// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The counting method of an election, as read from the first row of a ballot file.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ElectionMethod {
    /// Instant runoff: ranked ballots, eliminations until a majority appears.
    InstantRunoff,
    /// Open party list: seats apportioned to parties by largest remainder.
    OpenPartyList,
    /// Popularity only: the candidate with the most first choices wins.
    PopularityOnly,
}

impl ElectionMethod {
    pub fn from_tag(tag: &str) -> Option<ElectionMethod> {
        match tag {
            "IR" => Some(ElectionMethod::InstantRunoff),
            "OPL" => Some(ElectionMethod::OpenPartyList),
            "PO" => Some(ElectionMethod::PopularityOnly),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ElectionMethod::InstantRunoff => "IR",
            ElectionMethod::OpenPartyList => "OPL",
            ElectionMethod::PopularityOnly => "PO",
        }
    }

    /// Number of header rows before the first ballot row.
    pub fn header_rows(&self) -> usize {
        match self {
            ElectionMethod::OpenPartyList => 5,
            _ => 4,
        }
    }
}

impl Display for ElectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CandidateResult {
    pub name: String,
    pub party: Option<String>,
    pub votes: u64,
    pub winner: bool,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PartyResult {
    pub name: String,
    pub votes: u64,
    pub seats: u32,
    /// Indices into `ElectionResult::candidates`.
    pub candidates: Vec<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EliminationStats {
    pub name: String,
    pub transfers: Vec<(String, u64)>,
    pub exhausted: u64,
}

/// Statistics for one round of an instant runoff count.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    pub tally: Vec<(String, u64)>,
    pub tally_results_elected: Vec<String>,
    pub tally_result_eliminated: Vec<EliminationStats>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionResult {
    pub method: ElectionMethod,
    /// Indices of the winning candidates, in candidate order.
    pub winners: Vec<usize>,
    pub candidates: Vec<CandidateResult>,
    pub total_ballots: u64,
    pub invalid_ballots: u64,
    /// OPL only.
    pub seats: Option<u32>,
    /// OPL only.
    pub quota: Option<u64>,
    pub parties: Vec<PartyResult>,
    /// IR only.
    pub round_stats: Vec<RoundStats>,
}

impl ElectionResult {
    pub fn winner_names(&self) -> Vec<String> {
        self.winners
            .iter()
            .map(|idx| self.candidates[*idx].name.clone())
            .collect()
    }
}

/// Errors that prevent the algorithm from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum VotingErrors {
    /// No candidates or no ballots when the count starts.
    EmptyElection,
    MalformedTable { message: String },
    NoSeats,
    /// There are fewer ballots than seats, the quota would be zero.
    TooFewBallots { ballots: u64, seats: u32 },
    BlankBallot { ballot: usize },
    AlreadyRun,
    AuditWrite { message: String },
}

impl Error for VotingErrors {}

impl Display for VotingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingErrors::EmptyElection => {
                write!(f, "Invalid election: at least one candidate and one ballot are required")
            }
            VotingErrors::MalformedTable { message } => {
                write!(f, "Malformed ballot table: {}", message)
            }
            VotingErrors::NoSeats => write!(f, "Invalid election: the number of seats is zero"),
            VotingErrors::TooFewBallots { ballots, seats } => write!(
                f,
                "Invalid election: {} ballots cannot fill {} seats",
                ballots, seats
            ),
            VotingErrors::BlankBallot { ballot } => {
                write!(f, "Ballot {} does not select any candidate", ballot)
            }
            VotingErrors::AlreadyRun => write!(f, "The election has already been counted"),
            VotingErrors::AuditWrite { message } => {
                write!(f, "Failed to write the audit trail: {}", message)
            }
        }
    }
}

impl From<std::io::Error> for VotingErrors {
    fn from(e: std::io::Error) -> Self {
        VotingErrors::AuditWrite {
            message: e.to_string(),
        }
    }
}
