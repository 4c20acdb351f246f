use crate::config::*;

/// Share of the ballots, in percent, with two decimals.
pub fn format_percentage(votes: u64, total_ballots: u64) -> String {
    if total_ballots == 0 {
        return "0.00%".to_string();
    }
    format!("{:.2}%", votes as f64 / total_ballots as f64 * 100.0)
}

fn candidate_block(c: &CandidateResult, total_ballots: Option<u64>) -> String {
    let mut s = String::new();
    s += "***\n";
    s += &format!("Candidate name: {}\n", c.name);
    s += &format!("Candidate party: {}\n", c.party.as_deref().unwrap_or(""));
    match total_ballots {
        Some(total) => {
            s += &format!(
                "Candidate votes: {} ({})\n",
                c.votes,
                format_percentage(c.votes, total)
            );
        }
        None => {
            s += &format!("Candidate votes: {}\n", c.votes);
        }
    }
    s += "***\n";
    s
}

/// The results text shared by the audit file, the media report and the screen.
pub fn format_results(result: &ElectionResult) -> String {
    let mut s = String::new();
    s += &format!("\n========== {} Election Results ==========\n", result.method);
    s += &format!("\nElection type: {}\n", result.method);
    s += &format!("Number of candidates: {}\n", result.candidates.len());
    if let Some(seats) = result.seats {
        s += &format!("Total number of seats distributed: {}\n", seats);
    }

    s += "\n-----Winners-----\n";
    for idx in result.winners.iter() {
        s += &candidate_block(&result.candidates[*idx], Some(result.total_ballots));
    }

    s += &format!("\nTotal number of ballots: {}\n", result.total_ballots);
    if result.method == ElectionMethod::InstantRunoff {
        s += &format!(
            "\nTotal number of invalid ballots: {}\n",
            result.invalid_ballots
        );
    }

    if !result.parties.is_empty() {
        s += "\n-----Parties-----\n";
        for p in result.parties.iter() {
            s += &format!(
                "{}: {} votes ({}), {} seats\n",
                p.name,
                p.votes,
                format_percentage(p.votes, result.total_ballots),
                p.seats
            );
        }
    }

    s += "\n-----All candidates information-----\n";
    for c in result.candidates.iter() {
        s += &candidate_block(c, None);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(name: &str, party: &str, votes: u64, winner: bool) -> CandidateResult {
        CandidateResult {
            name: name.to_string(),
            party: Some(party.to_string()),
            votes,
            winner,
        }
    }

    fn sample() -> ElectionResult {
        ElectionResult {
            method: ElectionMethod::OpenPartyList,
            winners: vec![0, 2],
            candidates: vec![
                cand("Pike", "D", 3, true),
                cand("Foster", "D", 2, false),
                cand("Deutsch", "R", 2, true),
            ],
            total_ballots: 7,
            invalid_ballots: 0,
            seats: Some(2),
            quota: Some(3),
            parties: vec![],
            round_stats: vec![],
        }
    }

    #[test]
    fn percentages() {
        assert_eq!(format_percentage(1, 3), "33.33%");
        assert_eq!(format_percentage(2, 3), "66.67%");
        assert_eq!(format_percentage(4, 4), "100.00%");
        assert_eq!(format_percentage(0, 0), "0.00%");
    }

    #[test]
    fn every_winner_appears_once_in_the_winner_section() {
        let result = sample();
        let text = format_results(&result);
        let (winner_section, rest) = text
            .split_once("\nTotal number of ballots")
            .unwrap();
        for idx in result.winners.iter() {
            let c = &result.candidates[*idx];
            let block = format!(
                "Candidate name: {}\nCandidate party: {}\nCandidate votes: {} ({})\n",
                c.name,
                c.party.as_deref().unwrap(),
                c.votes,
                format_percentage(c.votes, result.total_ballots)
            );
            assert_eq!(winner_section.matches(&block).count(), 1);
            assert_eq!(rest.matches(&block).count(), 0);
        }
        assert!(!winner_section.contains("Foster"));
        assert!(rest.contains("Candidate name: Foster"));
        assert!(text.contains("Total number of seats distributed: 2"));
    }
}
