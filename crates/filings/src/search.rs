use crate::prompt;
use colored::Colorize;
use filings_spider::auth::provider_from_config;
use filings_spider::search::{collect_filings_detailed, HttpTransport, SearchCriteria};
use filings_spider::{file_types, fs, SpiderConfig};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, trace};

#[derive(Debug)]
pub(crate) struct SearchArgs {
    pub companies: Vec<i64>,
    pub file_types: Vec<String>,
    pub start_year: i32,
    pub end_year: i32,
    pub criteria: Option<PathBuf>,
    pub dedup: bool,
    pub output: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub pacing: Option<u64>,
}

/// Run one search and report its results.
pub(crate) async fn run(args: SearchArgs, tui: bool) -> anyhow::Result<()> {
    let mut config = SpiderConfig::from_env()?;
    if let Some(secs) = args.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(millis) = args.pacing {
        config.pacing = Duration::from_millis(millis);
    }

    let criteria = match &args.criteria {
        Some(path) => {
            let criteria: SearchCriteria = fs::read_json(path).await?;
            criteria.validate()?;
            criteria
        }
        None => build_criteria(&args, tui)?,
    };
    debug!("search criteria: {criteria:?}");

    trace!("building http client, timeout {:?}", config.timeout);
    let http_client = filings_spider::std_client_build(config.timeout)?;
    let tokens = provider_from_config(&config, http_client.clone())?;
    let transport = HttpTransport::new(http_client, config.search_url.as_str());

    let mut collection = collect_filings_detailed(
        &transport,
        tokens.as_ref(),
        &criteria,
        config.pacing,
        tui,
    )
    .await;
    if args.dedup {
        collection.index.dedup();
    }

    let summary = collection.summary();
    info!("{summary}");

    if collection.is_empty() {
        println!(
            "{}",
            format!("Result is empty for {}", criteria.companies_label()).yellow()
        );
    } else {
        println!("{}", "Found result:".green().bold());
        print!("{}", collection.index);
    }
    if summary.is_partial() {
        println!(
            "{}",
            format!(
                "{} of {} windows could not be searched",
                summary.windows - summary.parsed,
                summary.windows
            )
            .red()
        );
        for report in collection.failures() {
            println!("  {} {}", report.window, report.outcome);
        }
    }
    if tui {
        println!("{summary}");
    }

    if let Some(path) = &args.output {
        fs::write_json(path, &collection.index).await?;
        if tui {
            println!("results written to {}", path.display());
        }
    }

    Ok(())
}

// criteria from flags, prompting for whatever is missing when a terminal is attached
fn build_criteria(args: &SearchArgs, tui: bool) -> anyhow::Result<SearchCriteria> {
    let interactive = tui && std::io::stdin().is_terminal();

    let companies = if args.companies.is_empty() && interactive {
        prompt::companies()?
    } else {
        args.companies.clone()
    };
    let file_type_ids = if args.file_types.is_empty() && interactive {
        prompt::file_types()?
    } else {
        file_types::resolve(&args.file_types)?
    };

    let today = chrono::Local::now().date_naive();
    Ok(SearchCriteria::from_years(
        companies,
        file_type_ids,
        args.start_year,
        args.end_year,
        today,
    )?)
}
