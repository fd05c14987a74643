// Command-line flags for one forecast run.
//
// Every flag has a default, so running without arguments reproduces the standard nightly job.

use crate::application::forecaster::ForecastSettings;
use crate::application::pipeline::PipelineConfig;
use crate::core::occupancy::working_hours::{WindowError, WorkingHours};
use clap::Parser;

pub const MAX_HORIZON_DAYS: i64 = 366;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "room_forecast",
    version,
    about = "Forecast hourly room occupancy from booking history and store it in MySQL"
)]
pub struct Cli {
    /// Days ahead to forecast, at most one year.
    #[arg(long, default_value_t = 7, value_name = "DAYS", value_parser = clap::value_parser!(u32).range(1..=MAX_HORIZON_DAYS))]
    pub horizon: u32,

    /// First hour of the working window. Must be before --end-hour: an empty window is
    /// rejected with exit status 2 rather than skipping every room.
    #[arg(long, default_value_t = 8, value_name = "HOUR", value_parser = clap::value_parser!(u32).range(0..=23))]
    pub start_hour: u32,

    /// Hour the working window ends, exclusive.
    #[arg(long, default_value_t = 18, value_name = "HOUR", value_parser = clap::value_parser!(u32).range(1..=24))]
    pub end_hour: u32,

    /// Days of working-hour history a room needs before it is forecast.
    #[arg(long, default_value_t = 14, value_name = "DAYS")]
    pub min_history: u32,

    /// Months of booking history to read.
    #[arg(long, default_value_t = 6, value_name = "MONTHS")]
    pub lookback_months: u32,
}

impl Cli {
    pub fn pipeline_config(&self) -> Result<PipelineConfig, WindowError> {
        Ok(PipelineConfig {
            forecast: ForecastSettings {
                horizon_days: self.horizon,
                window: WorkingHours::new(self.start_hour, self.end_hour)?,
                min_history_days: self.min_history,
            },
            lookback_months: self.lookback_months,
        })
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("room_forecast").chain(args.iter().copied()))
    }

    #[rstest]
    fn it_should_default_to_the_standard_run() {
        let config = parse(&[]).expect("parse failed").pipeline_config().expect("config failed");
        assert_eq!(config, PipelineConfig::default());
    }

    #[rstest]
    fn it_should_override_every_setting() {
        let cli = parse(&[
            "--horizon",
            "3",
            "--start-hour",
            "9",
            "--end-hour",
            "17",
            "--min-history",
            "10",
            "--lookback-months",
            "2",
        ])
        .expect("parse failed");

        let config = cli.pipeline_config().expect("config failed");

        assert_eq!(config.forecast.horizon_days, 3);
        assert_eq!(config.forecast.window.start_hour(), 9);
        assert_eq!(config.forecast.window.end_hour(), 17);
        assert_eq!(config.forecast.min_history_days, 10);
        assert_eq!(config.lookback_months, 2);
    }

    #[rstest]
    #[case(&["--start-hour", "24"])]
    #[case(&["--end-hour", "0"])]
    #[case(&["--end-hour", "25"])]
    #[case(&["--horizon", "0"])]
    #[case(&["--horizon", "-1"])]
    #[case(&["--horizon", "367"])]
    #[case(&["--unknown"])]
    fn it_should_reject_out_of_range_flags(#[case] args: &[&str]) {
        assert!(parse(args).is_err());
    }

    #[rstest]
    fn it_should_accept_a_horizon_of_one_year() {
        let cli = parse(&["--horizon", "366"]).expect("parse failed");
        assert_eq!(cli.horizon, 366);
    }

    #[rstest]
    fn it_should_document_how_an_empty_window_is_handled() {
        let command = Cli::command();
        let start_hour = command
            .get_arguments()
            .find(|arg| arg.get_id() == "start_hour")
            .expect("missing --start-hour");

        let help = start_hour
            .get_long_help()
            .or_else(|| start_hour.get_help())
            .map(|help| help.to_string())
            .unwrap_or_default();

        assert!(help.contains("--end-hour"), "{help}");
        assert!(help.contains("exit status 2"), "{help}");
    }

    #[rstest]
    fn it_should_reject_an_empty_window_after_parsing() {
        let cli = parse(&["--start-hour", "18", "--end-hour", "8"]).expect("parse failed");
        assert_eq!(cli.pipeline_config(), Err(WindowError::Empty { start: 18, end: 8 }));
    }
}
