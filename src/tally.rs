use log::{debug, info, warn};

use election_engine::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::io;
use std::path::PathBuf;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::tally::config_reader::*;
use crate::tally::io_common::{prompt_file_names, validate_file_name};
use crate::tally::io_csv::{aggregate_tables, read_csv_table};

pub mod config_reader;
pub mod io_common;
pub mod io_csv;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TallyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile { source: io::Error, path: String },
    #[snafu(display("Error parsing line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("{path} is empty"))]
    EmptyBallotFile { path: String },
    #[snafu(display("{path}: unknown election type {tag:?}"))]
    UnknownMethod { path: String, tag: String },
    #[snafu(display("{path}: {message}"))]
    BallotCount { path: String, message: String },
    #[snafu(display("Cannot combine {first} ballots with the {other} ballots of {path}"))]
    MixedMethods {
        first: String,
        other: String,
        path: String,
    },
    #[snafu(display("No ballot files were given"))]
    NoBallotFiles {},
    #[snafu(display("{reason}"))]
    InvalidFileName { path: String, reason: String },
    #[snafu(display("Error reading file names from standard input"))]
    Prompt { source: io::Error },
    #[snafu(display("Error opening JSON file {path}"))]
    OpeningJson { source: io::Error, path: String },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a non-negative integer"))]
    ParsingJsonNumber {},
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary { source: io::Error, path: String },
    #[snafu(display("{source}"))]
    Voting { source: VotingErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TallyResult<T> = Result<T, TallyError>;

/// Everything a run needs, once the command line and the configuration file are merged.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RunSettings {
    pub ballot_files: Vec<String>,
    pub output_dir: PathBuf,
    pub seed: Option<u64>,
    pub contest_name: Option<String>,
    pub out: Option<String>,
    pub reference: Option<String>,
}

impl RunSettings {
    /// Command line flags override the values of the configuration file.
    pub fn resolve(args: &Args) -> TallyResult<RunSettings> {
        let config = match &args.config {
            Some(p) => read_config(p)?,
            None => RunConfig::default(),
        };
        let ballot_files = if !args.input.is_empty() {
            args.input.clone()
        } else if let Some(p) = &args.config {
            resolve_ballot_files(p, &config)?
        } else {
            Vec::new()
        };
        let seed = match args.seed {
            Some(s) => Some(s),
            None => config.random_seed()?,
        };
        let output_dir = args
            .output_dir
            .clone()
            .or_else(|| config.output_directory.clone())
            .unwrap_or_else(|| ".".to_string());
        Ok(RunSettings {
            ballot_files,
            output_dir: PathBuf::from(output_dir),
            seed,
            contest_name: config.contest_name.clone(),
            out: args.out.clone().or_else(|| config.summary_output.clone()),
            reference: args.reference.clone(),
        })
    }
}

fn result_stats_to_json(rs: &ElectionResult) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in rs.round_stats.iter() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (name, count) in round_stat.tally.iter() {
            tally.insert(name.clone(), json!(count.to_string()));
        }

        let mut tally_results: Vec<JSValue> = Vec::new();
        for elim_stats in round_stat.tally_result_eliminated.iter() {
            let mut transfers: JSMap<String, JSValue> = JSMap::new();
            for (name, count) in elim_stats.transfers.iter() {
                transfers.insert(name.clone(), json!(count.to_string()));
            }
            if elim_stats.exhausted > 0 {
                transfers.insert(
                    "exhausted".to_string(),
                    json!(elim_stats.exhausted.to_string()),
                );
            }
            tally_results.push(json!({
                "eliminated": elim_stats.name,
                "transfers": transfers
            }));
        }
        for winner_name in round_stat.tally_results_elected.iter() {
            tally_results.push(json!({
                "elected": winner_name,
                "transfers": {}
            }));
        }

        let js = json!({"round": round_stat.round, "tally": tally, "tallyResults": tally_results});
        l.push(js);
    }
    l
}

// Methods without rounds are reported as a single round.
fn single_round_to_json(rs: &ElectionResult) -> Vec<JSValue> {
    let mut tally: JSMap<String, JSValue> = JSMap::new();
    for c in rs.candidates.iter() {
        tally.insert(c.name.clone(), json!(c.votes.to_string()));
    }
    let tally_results: Vec<JSValue> = rs
        .winner_names()
        .iter()
        .map(|name| json!({"elected": name, "transfers": {}}))
        .collect();
    vec![json!({"round": 1, "tally": tally, "tallyResults": tally_results})]
}

fn parties_to_json(rs: &ElectionResult) -> Vec<JSValue> {
    rs.parties
        .iter()
        .map(|p| {
            let elected: Vec<&str> = p
                .candidates
                .iter()
                .filter(|idx| rs.candidates[**idx].winner)
                .map(|idx| rs.candidates[*idx].name.as_str())
                .collect();
            json!({
                "party": p.name,
                "votes": p.votes.to_string(),
                "seats": p.seats.to_string(),
                "elected": elected
            })
        })
        .collect()
}

pub fn build_summary_js(settings: &RunSettings, rv: &ElectionResult) -> JSValue {
    let c = OutputConfig {
        contest: settings.contest_name.clone().unwrap_or_default(),
        method: rv.method.tag().to_string(),
        ballot_files: settings.ballot_files.clone(),
        seats: rv.seats.map(|s| s.to_string()),
        quota: rv.quota.map(|q| q.to_string()),
    };
    let results = if rv.method == ElectionMethod::InstantRunoff {
        result_stats_to_json(rv)
    } else {
        single_round_to_json(rv)
    };
    let mut js = json!({
        "config": c,
        "totalBallots": rv.total_ballots.to_string(),
        "invalidBallots": rv.invalid_ballots.to_string(),
        "winners": rv.winner_names(),
        "results": results
    });
    if !rv.parties.is_empty() {
        js["parties"] = json!(parties_to_json(rv));
    }
    js
}

/// Reads the ballot files, counts the election and returns its result and JSON summary.
///
/// The audit file and the media report are written to the output directory.
pub fn tabulate(settings: &RunSettings) -> TallyResult<(ElectionResult, JSValue)> {
    ensure!(!settings.ballot_files.is_empty(), NoBallotFilesSnafu {});
    let mut tables: Vec<(String, Vec<Vec<String>>)> = Vec::new();
    for f in settings.ballot_files.iter() {
        validate_file_name(f)?;
        tables.push((f.clone(), read_csv_table(f)?));
    }
    let rows = aggregate_tables(&tables)?;

    let tiebreaker: Box<dyn TieBreaker> = match settings.seed {
        Some(seed) => {
            info!("Resolving ties with seed {}", seed);
            Box::new(SeededTieBreaker::new(seed))
        }
        None => Box::new(ClockTieBreaker),
    };
    let mut election = Election::with_output_dir(&rows, settings.output_dir.as_path(), tiebreaker)
        .context(VotingSnafu {})?;
    let result = election.run().context(VotingSnafu {})?;
    info!("Winners: {:?}", result.winner_names());

    let summary = build_summary_js(settings, &result);
    Ok((result, summary))
}

fn check_reference(summary_p: &str, pretty_js_stats: &str) -> TallyResult<()> {
    let summary_ref = read_summary(summary_p)?;
    debug!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

pub fn run_election(args: &Args) -> TallyResult<()> {
    let mut settings = RunSettings::resolve(args)?;
    info!("settings: {:?}", settings);
    if settings.ballot_files.is_empty() {
        let stdin = io::stdin();
        settings.ballot_files = prompt_file_names(&mut stdin.lock(), &mut io::stdout())?;
    }

    let (result, summary) = tabulate(&settings)?;
    print!("{}", format_results(&result));

    let pretty_js_stats = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;
    match settings.out.as_deref() {
        Some("stdout") => println!("{}", pretty_js_stats),
        Some(path) => {
            fs::write(path, &pretty_js_stats).context(WritingSummarySnafu { path })?;
            info!("Summary written to {}", path);
        }
        None => {}
    }

    if let Some(summary_p) = &settings.reference {
        check_reference(summary_p, &pretty_js_stats)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn fixture(name: &str) -> String {
        format!("{}/testdata/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    fn settings(files: &[&str], dir: &tempfile::TempDir) -> RunSettings {
        RunSettings {
            ballot_files: files.iter().map(|f| fixture(f)).collect(),
            output_dir: dir.path().to_path_buf(),
            seed: Some(2022),
            ..RunSettings::default()
        }
    }

    #[test]
    fn instant_runoff_file() {
        let dir = tempfile::tempdir().unwrap();
        let (result, summary) = tabulate(&settings(&["ir_sample.csv"], &dir)).unwrap();
        assert_eq!(result.winner_names(), vec!["Rosen".to_string()]);
        assert_eq!(result.invalid_ballots, 1);
        assert_eq!(summary["winners"], json!(["Rosen"]));
        assert_eq!(summary["config"]["method"], json!("IR"));
        let rounds = summary["results"].as_array().unwrap();
        assert_eq!(rounds.len(), 4);
        assert_eq!(rounds[0]["tally"]["Rosen"], json!("3"));
        assert_eq!(rounds[3]["tallyResults"][0]["elected"], json!("Rosen"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn aggregated_instant_runoff_files() {
        // Rosen leads the first file alone, Chou wins once the second file is added.
        let dir = tempfile::tempdir().unwrap();
        let (result, summary) =
            tabulate(&settings(&["ir_sample.csv", "ir_more.csv"], &dir)).unwrap();
        assert_eq!(result.total_ballots, 9);
        assert_eq!(result.winner_names(), vec!["Chou".to_string()]);
        assert_eq!(result.candidates[2].votes, 7);
        let rounds = summary["results"].as_array().unwrap();
        assert_eq!(rounds[1]["tallyResults"][0]["eliminated"], json!("Kleinberg"));
        assert_eq!(
            rounds[1]["tallyResults"][0]["transfers"]["exhausted"],
            json!("1")
        );
        assert_eq!(rounds[2]["tallyResults"][0]["transfers"]["Chou"], json!("3"));
    }

    #[test]
    fn open_party_list_file() {
        let dir = tempfile::tempdir().unwrap();
        let (result, summary) = tabulate(&settings(&["opl_sample.csv"], &dir)).unwrap();
        assert_eq!(result.seats, Some(3));
        assert_eq!(result.quota, Some(3));
        assert_eq!(
            result.winner_names(),
            vec!["Pike".to_string(), "Foster".to_string(), "Deutsch".to_string()]
        );
        let parties = summary["parties"].as_array().unwrap();
        assert_eq!(parties[0]["party"], json!("D"));
        assert_eq!(parties[0]["seats"], json!("2"));
        assert_eq!(parties[1]["elected"], json!(["Deutsch"]));
        assert_eq!(parties[2]["seats"], json!("0"));
    }

    #[test]
    fn popularity_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let (result, summary) = tabulate(&settings(&["po_sample.csv"], &dir)).unwrap();
        assert_eq!(result.winner_names(), vec!["Pike".to_string()]);
        assert!(format_results(&result).contains("Candidate votes: 3 (60.00%)"));
        assert_eq!(summary["results"][0]["tally"]["Deutsch"], json!("1"));
        assert!(summary.get("parties").is_none());
    }

    #[test]
    fn mixed_files_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let res = tabulate(&settings(&["ir_sample.csv", "po_sample.csv"], &dir));
        assert!(matches!(res, Err(TallyError::MixedMethods { .. })));
        let res = tabulate(&settings(&["missing.csv"], &dir));
        assert!(matches!(res, Err(TallyError::InvalidFileName { .. })));
    }

    #[test]
    fn command_line_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("run.json");
        fs::write(
            &config,
            r#"{"contestName": "Council", "ballotFiles": ["a.csv"], "randomSeed": 3,
                "outputDirectory": "/tmp/elsewhere", "summaryOutput": "stdout"}"#,
        )
        .unwrap();
        let config = config.display().to_string();

        let args = Args::parse_from(["votingsystem", "--config", config.as_str()]);
        let s = RunSettings::resolve(&args).unwrap();
        assert_eq!(
            s.ballot_files,
            vec![dir.path().join("a.csv").display().to_string()]
        );
        assert_eq!(s.seed, Some(3));
        assert_eq!(s.output_dir, PathBuf::from("/tmp/elsewhere"));
        assert_eq!(s.out.as_deref(), Some("stdout"));
        assert_eq!(s.contest_name.as_deref(), Some("Council"));

        let args = Args::parse_from([
            "votingsystem",
            "--config",
            config.as_str(),
            "--input",
            "x.csv",
            "--input",
            "y.csv",
            "--seed",
            "9",
            "--output-dir",
            "here",
        ]);
        let s = RunSettings::resolve(&args).unwrap();
        assert_eq!(s.ballot_files, vec!["x.csv".to_string(), "y.csv".to_string()]);
        assert_eq!(s.seed, Some(9));
        assert_eq!(s.output_dir, PathBuf::from("here"));
    }

    #[test]
    fn summary_is_checked_against_reference() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("summary.json").display().to_string();
        let files = fixture("opl_sample.csv");
        let output_dir = dir.path().display().to_string();
        let base = [
            "votingsystem",
            "--input",
            files.as_str(),
            "--output-dir",
            output_dir.as_str(),
            "--seed",
            "1",
        ];

        let mut first: Vec<&str> = base.to_vec();
        first.extend(["--out", out.as_str()]);
        run_election(&Args::parse_from(first)).unwrap();

        let mut same: Vec<&str> = base.to_vec();
        same.extend(["--reference", out.as_str()]);
        run_election(&Args::parse_from(same)).unwrap();

        let altered = dir.path().join("altered.json");
        let mut js = read_summary(&out).unwrap();
        js["winners"] = json!(["Smith"]);
        fs::write(&altered, serde_json::to_string(&js).unwrap()).unwrap();
        let altered = altered.display().to_string();
        let mut different: Vec<&str> = base.to_vec();
        different.extend(["--reference", altered.as_str()]);
        let res = run_election(&Args::parse_from(different));
        assert!(matches!(res, Err(TallyError::Whatever { .. })));
    }
}
