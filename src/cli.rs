use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Meal Parser - turns free-text meal descriptions into per-food nutrition estimates.
#[derive(Parser, Debug)]
#[command(name = "meal-parser")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Default)]
pub enum Command {
    /// Start the HTTP server.
    #[default]
    Serve,

    /// Parse one meal description and print the food items.
    Parse {
        /// What was eaten, e.g. "half a cheeseburger and 15 french fries".
        #[arg(required = true, num_args = 1..)]
        utterance: Vec<String>,

        /// Print the items as food_log rows stamped with the current time.
        #[arg(long)]
        as_log_entries: bool,
    },

    /// Summarize exported food_log rows against daily goals.
    Progress {
        /// JSON file holding an array of food_log rows.
        file: String,

        /// UTC day to total, as YYYY-MM-DD. Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long, default_value_t = 1800.0)]
        calorie_goal: f64,

        #[arg(long, default_value_t = 75.0)]
        protein_goal: f64,

        /// How many frequent foods to list.
        #[arg(long, default_value_t = crate::models::DEFAULT_TOP_FOODS)]
        top: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_serve() {
        let cli = Cli::try_parse_from(["meal-parser"]).unwrap();
        assert!(matches!(cli.command.unwrap_or_default(), Command::Serve));
    }

    #[test]
    fn test_parse_joins_words() {
        let cli = Cli::try_parse_from(["meal-parser", "parse", "two", "eggs", "--as-log-entries"]).unwrap();
        match cli.command {
            Some(Command::Parse { utterance, as_log_entries }) => {
                assert_eq!(utterance.join(" "), "two eggs");
                assert!(as_log_entries);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_requires_utterance() {
        assert!(Cli::try_parse_from(["meal-parser", "parse"]).is_err());
    }

    #[test]
    fn test_progress_date() {
        let cli = Cli::try_parse_from(["meal-parser", "progress", "log.json", "--date", "2024-05-02"]).unwrap();
        match cli.command {
            Some(Command::Progress { date, .. }) => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 2));
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(Cli::try_parse_from(["meal-parser", "progress", "log.json", "--date", "May 2"]).is_err());
    }

    #[test]
    fn test_progress_defaults() {
        let cli = Cli::try_parse_from(["meal-parser", "progress", "log.json"]).unwrap();
        match cli.command {
            Some(Command::Progress { file, date, calorie_goal, protein_goal, top }) => {
                assert_eq!(file, "log.json");
                assert_eq!(date, None);
                assert_eq!(calorie_goal, 1800.0);
                assert_eq!(protein_goal, 75.0);
                assert_eq!(top, 10);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
