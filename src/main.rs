use std::env;
use std::error::Error;
use std::process;

use expense_ledger::{init_tracing, run_async, Category, Config, Report, ReportSpec};

const USAGE: &str = "Usage: expense-ledger <script.csv> [users|expenses|categories|summary] \
[--page N] [--category Meals|Travel|Software|Other]";

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run_app().await {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

async fn run_app() -> Result<(), Box<dyn Error + Send + Sync>> {
    let (input_path, spec) = parse_args(env::args().skip(1))?;
    let config = Config::from_env()?;
    run_async(input_path, std::io::stdout(), &spec, &config).await?;
    Ok(())
}

fn parse_args(
    mut args: impl Iterator<Item = String>,
) -> Result<(String, ReportSpec), Box<dyn Error + Send + Sync>> {
    let input_path = args.next().ok_or(USAGE)?;
    let mut spec = ReportSpec::new(Report::Users);
    let mut report_seen = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--page" => {
                let page = args.next().ok_or(USAGE)?.parse::<usize>()?;
                spec = spec.with_page(page);
            }
            "--category" => {
                let category = args.next().ok_or(USAGE)?.parse::<Category>()?;
                spec = spec.with_category(category);
            }
            other if !report_seen => {
                spec.report = other.parse()?;
                report_seen = true;
            }
            _ => return Err(USAGE.into()),
        }
    }
    Ok((input_path, spec))
}
