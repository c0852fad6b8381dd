use std::path::PathBuf;

use anyhow::{Result, bail};

pub const SCENARIO_ENV: &str = "ATELIER_SCENARIO";

/// Runtime settings for the scenario runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub scenario_path: PathBuf,
    /// Pretty-print the JSON report.
    pub pretty: bool,
}

impl CliConfig {
    pub fn from_env() -> Result<Self> {
        Self::resolve(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// The first positional argument wins over `ATELIER_SCENARIO`.
    pub fn resolve(args: impl IntoIterator<Item = String>, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut pretty = false;
        let mut path = None;
        for arg in args {
            match arg.as_str() {
                "--pretty" => pretty = true,
                flag if flag.starts_with("--") => bail!("unknown flag `{flag}`"),
                _ if path.is_none() => path = Some(PathBuf::from(&arg)),
                _ => bail!("unexpected extra argument `{arg}`"),
            }
        }

        let scenario_path = match path.or_else(|| lookup(SCENARIO_ENV).map(PathBuf::from)) {
            Some(path) => path,
            None => bail!("usage: atelier [--pretty] <scenario.json> (or set {SCENARIO_ENV})"),
        };
        Ok(Self { scenario_path, pretty })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn positional_argument_beats_environment() {
        let config = CliConfig::resolve(args(&["a.json", "--pretty"]), |_| Some("b.json".to_string())).unwrap();
        assert_eq!(config.scenario_path, PathBuf::from("a.json"));
        assert!(config.pretty);
    }

    #[test]
    fn falls_back_to_environment() {
        let config = CliConfig::resolve(args(&[]), |key| (key == SCENARIO_ENV).then(|| "env.json".to_string())).unwrap();
        assert_eq!(config.scenario_path, PathBuf::from("env.json"));
        assert!(!config.pretty);
    }

    #[test]
    fn missing_path_and_bad_flags_are_errors() {
        assert!(CliConfig::resolve(args(&[]), |_| None).is_err());
        assert!(CliConfig::resolve(args(&["--verbose", "a.json"]), |_| None).is_err());
        assert!(CliConfig::resolve(args(&["a.json", "b.json"]), |_| None).is_err());
    }
}
