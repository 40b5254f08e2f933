use clap::{Parser, Subcommand, error::ErrorKind};
use parkir_base::{Day, Hour};
use parkir_forest::TrainingConfig;
use std::{path::PathBuf, process};

use crate::source::Source;

pub const USAGE: &str = "Usage: parkir [train|predict] [hour] [day]";
pub const INVALID_MODE: &str = "Mode tidak valid. Pilih 'train' atau 'predict'";
pub const DEFAULT_MODEL_PATH: &str = "model_parkir.bin";
pub const DEFAULT_DATASET_PATH: &str = "../data/data_historikal.csv";

#[derive(Parser, Debug)]
#[command(author, version, about = "Parking density classifier")]
pub struct Args {
    #[command(subcommand)]
    pub mode: Mode,

    /// Model file written by `train` and read by `predict`
    #[arg(long, global = true, default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Fit a model on historical reports and store it
    Train(TrainArgs),
    /// Predict the density class for an hour and day of week
    Predict(PredictArgs),
}

#[derive(clap::Args, Debug)]
pub struct TrainArgs {
    /// PostgreSQL connection string; reads the CSV dataset when absent
    pub connection: Option<String>,

    #[arg(long, default_value = DEFAULT_DATASET_PATH)]
    pub dataset: PathBuf,

    #[arg(long, default_value_t = 100)]
    pub trees: usize,

    #[arg(long)]
    pub max_depth: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,
}

impl TrainArgs {
    pub fn source(&self) -> Source {
        Source::select(self.connection.clone(), self.dataset.clone())
    }

    pub fn config(&self) -> TrainingConfig {
        TrainingConfig::default()
            .with_n_trees(self.trees)
            .with_max_depth(self.max_depth)
            .with_seed(self.seed)
    }
}

#[derive(clap::Args, Debug)]
pub struct PredictArgs {
    /// Hour of day, 0 to 23
    pub hour: Hour,

    /// Day of week, 0 (Minggu) to 6 (Sabtu)
    pub day: Day,

    /// Ignored
    pub connection: Option<String>,

    /// Also print the density label and day name
    #[arg(long)]
    pub label: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Usage {
    /// `--help` or `--version`.
    Info,
    InvalidMode,
    Invalid,
}

pub fn classify(err: &clap::Error) -> Usage {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Usage::Info,
        ErrorKind::InvalidSubcommand => Usage::InvalidMode,
        _ => Usage::Invalid,
    }
}

/// Reports a command line that could not be parsed and exits. Help and version requests
/// exit with 0, everything else with 1.
pub fn exit_with_usage(err: clap::Error) -> ! {
    match classify(&err) {
        Usage::Info => err.exit(),
        Usage::InvalidMode => eprintln!("{}", INVALID_MODE),
        Usage::Invalid => {
            let _ = err.print();
            eprintln!("{}", USAGE);
        }
    }
    process::exit(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("parkir").chain(args.iter().copied()))
    }

    #[test]
    fn test_train() {
        let args = parse(&["train"]).unwrap();
        assert_eq!(args.model, PathBuf::from(DEFAULT_MODEL_PATH));
        let Mode::Train(train) = args.mode else {
            panic!("expected train");
        };
        assert_eq!(train.source(), Source::File(DEFAULT_DATASET_PATH.into()));
        assert_eq!(train.config(), TrainingConfig::default());
    }

    #[test]
    fn test_train_database() {
        let args = parse(&[
            "train",
            "postgres://localhost/parkir",
            "--trees",
            "10",
            "--seed",
            "4",
            "--max-depth",
            "5",
            "--model",
            "m.bin",
        ])
        .unwrap();
        assert_eq!(args.model, PathBuf::from("m.bin"));
        let Mode::Train(train) = args.mode else {
            panic!("expected train");
        };
        assert_eq!(
            train.source(),
            Source::Database("postgres://localhost/parkir".into())
        );
        let config = train.config();
        assert_eq!(config.n_trees, 10);
        assert_eq!(config.seed, Some(4));
        assert_eq!(config.max_depth, Some(5));
    }

    #[test]
    fn test_predict() {
        let args = parse(&["predict", "8", "1"]).unwrap();
        let Mode::Predict(predict) = args.mode else {
            panic!("expected predict");
        };
        assert_eq!(predict.hour, Hour::from_index(8));
        assert_eq!(predict.day, Day::from_index(1));
        assert_eq!(predict.connection, None);
        assert!(!predict.label);

        let args = parse(&["predict", "23", "6", "postgres://localhost/parkir", "--label"]).unwrap();
        let Mode::Predict(predict) = args.mode else {
            panic!("expected predict");
        };
        assert_eq!(predict.connection.as_deref(), Some("postgres://localhost/parkir"));
        assert!(predict.label);
    }

    #[test]
    fn test_usage_errors() {
        let kind = |args: &[&str]| classify(&parse(args).unwrap_err());
        assert_eq!(kind(&["latih"]), Usage::InvalidMode);
        assert_eq!(kind(&[]), Usage::Invalid);
        assert_eq!(kind(&["predict"]), Usage::Invalid);
        assert_eq!(kind(&["predict", "8"]), Usage::Invalid);
        assert_eq!(kind(&["predict", "24", "1"]), Usage::Invalid);
        assert_eq!(kind(&["predict", "8", "7"]), Usage::Invalid);
        assert_eq!(kind(&["predict", "pagi", "1"]), Usage::Invalid);
        assert_eq!(kind(&["--help"]), Usage::Info);
        assert_eq!(kind(&["--version"]), Usage::Info);
    }
}
