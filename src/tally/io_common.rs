use std::io::{BufRead, Write};
use std::path::Path;

use crate::tally::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Splits a line of space separated file names. Consecutive spaces yield empty names,
/// which the validation then rejects.
pub fn parse_file_names(user_input: &str) -> Vec<String> {
    user_input
        .trim_end_matches(&['\r', '\n'][..])
        .split(' ')
        .map(|s| s.to_string())
        .collect()
}

pub fn validate_file_name(file_name: &str) -> TallyResult<()> {
    ensure!(
        !file_name.is_empty(),
        InvalidFileNameSnafu {
            path: file_name,
            reason: "Filename cannot be empty!"
        }
    );
    ensure!(
        file_name.len() > 4 && file_name.ends_with(".csv"),
        InvalidFileNameSnafu {
            path: file_name,
            reason: format!("{} is not in csv format!", file_name)
        }
    );
    ensure!(
        Path::new(file_name).is_file(),
        InvalidFileNameSnafu {
            path: file_name,
            reason: format!("{} does not exist!", file_name)
        }
    );
    Ok(())
}

/// Asks for ballot files until every name given on a line is valid.
pub fn prompt_file_names<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> TallyResult<Vec<String>> {
    loop {
        write!(output, "Enter ballot files here (space separated): ").context(PromptSnafu {})?;
        output.flush().context(PromptSnafu {})?;
        let mut line = String::new();
        let read = input.read_line(&mut line).context(PromptSnafu {})?;
        ensure!(read > 0, NoBallotFilesSnafu {});

        let file_names = parse_file_names(&line);
        let mut all_valid = true;
        for name in file_names.iter() {
            if let Err(e) = validate_file_name(name) {
                debug!("prompt_file_names: {:?}", e);
                writeln!(output, "{}", e).context(PromptSnafu {})?;
                all_valid = false;
            }
        }
        writeln!(output).context(PromptSnafu {})?;
        if all_valid {
            info!("Ballot files: {:?}", file_names);
            return Ok(file_names);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;

    #[test]
    fn splits_on_single_spaces() {
        assert_eq!(parse_file_names("a.csv b.csv\n"), vec!["a.csv", "b.csv"]);
        assert_eq!(parse_file_names("a.csv  b.csv"), vec!["a.csv", "", "b.csv"]);
        assert_eq!(parse_file_names(""), vec![""]);
    }

    #[test]
    fn file_name_rules() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("ballots.csv");
        fs::write(&good, "PO\n").unwrap();
        let good = good.display().to_string();
        assert!(validate_file_name(&good).is_ok());

        let err = validate_file_name("").unwrap_err();
        assert_eq!(err.to_string(), "Filename cannot be empty!");
        let err = validate_file_name("ballots.txt").unwrap_err();
        assert_eq!(err.to_string(), "ballots.txt is not in csv format!");
        assert!(validate_file_name(".csv").is_err());
        let missing = dir.path().join("missing.csv").display().to_string();
        let err = validate_file_name(&missing).unwrap_err();
        assert_eq!(err.to_string(), format!("{} does not exist!", missing));
    }

    #[test]
    fn prompt_repeats_until_valid() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("ir.csv");
        fs::write(&good, "IR\n").unwrap();
        let good = good.display().to_string();

        let mut input = Cursor::new(format!("nope.txt {}\n{}\n", good, good));
        let mut output: Vec<u8> = Vec::new();
        let names = prompt_file_names(&mut input, &mut output).unwrap();
        assert_eq!(names, vec![good]);
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("Enter ballot files here").count(), 2);
        assert!(shown.contains("nope.txt is not in csv format!"));
    }

    #[test]
    fn prompt_gives_up_at_end_of_input() {
        let mut input = Cursor::new("bad\n".to_string());
        let mut output: Vec<u8> = Vec::new();
        let res = prompt_file_names(&mut input, &mut output);
        assert!(matches!(res, Err(TallyError::NoBallotFiles {})));
    }

    #[test]
    fn simplified_names() {
        assert_eq!(simplify_file_name("/tmp/x/ballots.csv"), "ballots.csv");
        assert_eq!(simplify_file_name("ballots.csv"), "ballots.csv");
    }
}
