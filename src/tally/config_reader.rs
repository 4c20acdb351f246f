use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

use crate::tally::*;

/// The JSON run configuration. Every field is optional, command line flags take
/// precedence.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(rename = "contestName")]
    pub contest_name: Option<String>,
    #[serde(rename = "ballotFiles", default)]
    pub ballot_files: Vec<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "summaryOutput")]
    pub summary_output: Option<String>,
    #[serde(rename = "randomSeed")]
    _random_seed: Option<JSValue>,
}

impl RunConfig {
    pub fn random_seed(&self) -> TallyResult<Option<u64>> {
        match &self._random_seed {
            None | Some(JSValue::Null) => Ok(None),
            Some(x) => read_js_int(x).map(Some),
        }
    }
}

/// The `config` section of the JSON summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub method: String,
    #[serde(rename = "ballotFiles")]
    pub ballot_files: Vec<String>,
    pub seats: Option<String>,
    pub quota: Option<String>,
}

pub fn read_config(path: &str) -> TallyResult<RunConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: RunConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

/// Ballot files listed in a configuration are relative to the configuration file.
pub fn resolve_ballot_files(config_path: &str, config: &RunConfig) -> TallyResult<Vec<String>> {
    let root = Path::new(config_path)
        .parent()
        .context(MissingParentDirSnafu {})?;
    Ok(config
        .ballot_files
        .iter()
        .map(|f| {
            let p: PathBuf = [root, Path::new(f)].iter().collect();
            p.display().to_string()
        })
        .collect())
}

pub fn read_summary(path: &str) -> TallyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read content: {:?}", contents);
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

fn read_js_int(x: &JSValue) -> TallyResult<u64> {
    match x {
        JSValue::Number(n) => n.as_u64().context(ParsingJsonNumberSnafu {}),
        JSValue::String(s) => s.parse::<u64>().ok().context(ParsingJsonNumberSnafu {}),
        _ => None.context(ParsingJsonNumberSnafu {}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_camel_case_keys() {
        let c: RunConfig = serde_json::from_str(
            r#"{"contestName": "Mayor", "ballotFiles": ["a.csv", "b.csv"],
                "outputDirectory": "out", "summaryOutput": "stdout", "randomSeed": "42"}"#,
        )
        .unwrap();
        assert_eq!(c.contest_name, Some("Mayor".to_string()));
        assert_eq!(c.ballot_files.len(), 2);
        assert_eq!(c.output_directory, Some("out".to_string()));
        assert_eq!(c.summary_output, Some("stdout".to_string()));
        assert_eq!(c.random_seed().unwrap(), Some(42));
    }

    #[test]
    fn all_fields_are_optional() {
        let c: RunConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(c, RunConfig::default());
        assert_eq!(c.random_seed().unwrap(), None);

        let c: RunConfig = serde_json::from_str(r#"{"randomSeed": 7}"#).unwrap();
        assert_eq!(c.random_seed().unwrap(), Some(7));
        let c: RunConfig = serde_json::from_str(r#"{"randomSeed": "seven"}"#).unwrap();
        assert!(c.random_seed().is_err());
    }

    #[test]
    fn ballot_files_are_relative_to_the_config() {
        let c = RunConfig {
            ballot_files: vec!["ir.csv".to_string()],
            ..RunConfig::default()
        };
        let files = resolve_ballot_files("/data/contest/config.json", &c).unwrap();
        assert_eq!(files, vec!["/data/contest/ir.csv".to_string()]);
        let files = resolve_ballot_files("config.json", &c).unwrap();
        assert_eq!(files, vec!["ir.csv".to_string()]);
    }

    #[test]
    fn missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("none.json").display().to_string();
        assert!(matches!(read_config(&p), Err(TallyError::OpeningJson { .. })));
        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{").unwrap();
        let res = read_config(&bad.display().to_string());
        assert!(matches!(res, Err(TallyError::ParsingJson { .. })));
    }
}
