use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use mxsweep::CheckOptions;

const DEFAULT_INPUT: &str = "input.txt";
const DEFAULT_OUTPUT: &str = "output.txt";

#[derive(Parser)]
#[command(name = "mxsweep-cli", version, about = "Garde les adresses dont le domaine publie des MX")]
pub struct Cli {
    /// fichier d'adresses, une par ligne (défaut: input.txt à côté de l'exécutable)
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// lit des adresses depuis stdin (une par ligne)
    #[arg(long, conflicts_with = "input")]
    pub stdin: bool,

    /// fichier de sortie, ouvert en ajout (défaut: output.txt à côté de l'exécutable)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// nombre maximum de requêtes MX simultanées
    #[arg(long, default_value_t = 256)]
    pub concurrency: usize,

    /// délai minimum entre deux lancements (ms, 0 = aucun)
    #[arg(long = "interval-ms", default_value_t = 50)]
    pub interval_ms: u64,

    /// pause après épuisement des descripteurs (ms)
    #[arg(long = "cooldown-ms", default_value_t = 3_000)]
    pub cooldown_ms: u64,

    /// timeout d'une requête MX (ms)
    #[arg(long = "timeout-ms", default_value_t = 5_000)]
    pub timeout_ms: u64,

    /// nouvelles tentatives après épuisement des descripteurs
    #[arg(long, default_value_t = 2)]
    pub retries: u32,

    /// masque la ligne de progression
    #[arg(long)]
    pub quiet: bool,

    /// affiche le bilan final en JSON (feature `with-serde`)
    #[arg(long)]
    pub summary_json: bool,
}

impl Cli {
    pub fn check_options(&self) -> CheckOptions {
        CheckOptions {
            concurrency: self.concurrency,
            launch_interval: Duration::from_millis(self.interval_ms),
            cooldown: Duration::from_millis(self.cooldown_ms),
            lookup_timeout: Duration::from_millis(self.timeout_ms),
            max_retries: self.retries,
            ..CheckOptions::default()
        }
    }

    pub fn input_path(&self) -> Result<PathBuf> {
        resolve_path(self.input.as_deref(), DEFAULT_INPUT)
    }

    pub fn output_path(&self) -> Result<PathBuf> {
        resolve_path(self.output.as_deref(), DEFAULT_OUTPUT)
    }
}

fn resolve_path(explicit: Option<&Path>, default_name: &str) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let exe = std::env::current_exe().context("locate executable directory")?;
    let dir = exe
        .parent()
        .context("executable has no parent directory")?;
    Ok(dir.join(default_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuning_flags_map_to_options() {
        let cli = Cli::try_parse_from([
            "mxsweep-cli",
            "--concurrency",
            "8",
            "--interval-ms",
            "0",
            "--retries",
            "0",
        ])
        .unwrap();
        let options = cli.check_options();
        assert_eq!(options.concurrency, 8);
        assert_eq!(options.pacing(), None);
        assert_eq!(options.max_retries, 0);
        assert_eq!(options.cooldown, Duration::from_secs(3));
    }

    #[test]
    fn explicit_paths_are_kept() {
        let cli = Cli::try_parse_from(["mxsweep-cli", "-i", "in.txt", "-o", "out.txt"]).unwrap();
        assert_eq!(cli.input_path().unwrap(), PathBuf::from("in.txt"));
        assert_eq!(cli.output_path().unwrap(), PathBuf::from("out.txt"));
    }

    #[test]
    fn default_paths_sit_next_to_the_executable() {
        let cli = Cli::try_parse_from(["mxsweep-cli"]).unwrap();
        let input = cli.input_path().unwrap();
        assert_eq!(input.file_name().unwrap(), "input.txt");
        assert_eq!(
            input.parent(),
            std::env::current_exe().unwrap().parent()
        );
    }

    #[test]
    fn stdin_conflicts_with_input() {
        assert!(Cli::try_parse_from(["mxsweep-cli", "--stdin", "-i", "x.txt"]).is_err());
    }
}
