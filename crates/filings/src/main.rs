mod cli;
mod prompt;
mod report;
mod search;

// remote imports
use clap::Parser;
use cli::{Cli, TraceLevel};
use tracing::{subscriber, trace, Level};
use tracing_subscriber::FmtSubscriber;

////////////////////////////////////////////////////////////////////////////

// without `--trace` the progress bars own stdout, but warnings and errors still go to stderr
fn tracing_level(trace: Option<TraceLevel>) -> Level {
    match trace {
        None => Level::WARN,
        Some(TraceLevel::DEBUG) => Level::DEBUG,
        Some(TraceLevel::ERROR) => Level::ERROR,
        Some(TraceLevel::INFO) => Level::INFO,
        Some(TraceLevel::TRACE) => Level::TRACE,
        Some(TraceLevel::WARN) => Level::WARN,
    }
}

// install the tracing subscriber at the requested level
fn preprocess(trace_level: Level) -> anyhow::Result<()> {
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .with_writer(std::io::stderr)
        .finish();
    subscriber::set_global_default(my_subscriber)?;
    Ok(())
}

////////////////////////////////////////////////////////////////////////////

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // set the trace level
    preprocess(tracing_level(cli.trace))?;
    trace!("command line input recorded: {cli:?}");

    // if no trace level provided, use tui
    let tui = cli.trace.is_none();

    // read cli inputs
    use cli::Commands::*;
    match cli.command {
        // `filings search ...`: window the date range and collect filings per company
        Search {
            companies,
            file_types,
            start_year,
            end_year,
            criteria,
            dedup,
            output,
            timeout,
            pacing,
        } => {
            let args = search::SearchArgs {
                companies,
                file_types,
                start_year,
                end_year,
                criteria,
                dedup,
                output,
                timeout,
                pacing,
            };
            search::run(args, tui).await?
        }

        // `filings report <CSV>`: aggregate a report export
        Report {
            path,
            year,
            file_types,
        } => report::run(&path, year, file_types)?,

        FileTypes => report::print_file_types(),
    }

    Ok(())
}

// -- TESTS --

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_failures_are_visible_without_trace() {
        assert_eq!(tracing_level(None), Level::WARN);
        assert!(Level::ERROR <= tracing_level(None));
        assert_eq!(tracing_level(Some(TraceLevel::DEBUG)), Level::DEBUG);
        assert_eq!(tracing_level(Some(TraceLevel::ERROR)), Level::ERROR);
    }
}
