use chrono::{Local, NaiveDate};
use clap::Args;
use streakwidget_core::{evaluate, parse_activity_date};

#[derive(Args)]
pub struct EvaluateArgs {
    /// Stored streak count
    #[arg(long, allow_hyphen_values = true)]
    count: i64,
    /// Last activity, as a date or ISO-8601 timestamp
    #[arg(long)]
    last: Option<String>,
    /// Evaluation date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    today: Option<NaiveDate>,
}

pub fn run(args: EvaluateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let last = args.last.as_deref().and_then(parse_activity_date);
    let state = evaluate(args.count, last, today);
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
