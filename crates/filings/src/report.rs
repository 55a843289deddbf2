use colored::Colorize;
use filings_spider::file_types::FILE_TYPES;
use filings_spider::report::Report;
use std::path::Path;
use tracing::debug;

const TOP_COUNTRIES: usize = 10;

fn heading(name: &str) {
    println!(
        "{bar}\n{name:^60}\n{bar}",
        bar = "=".repeat(60),
    );
}

/// Print the country, top 10 and file type breakdowns of one year of a report export.
pub(crate) fn run(path: &Path, year: Option<i32>, file_types: Vec<String>) -> anyhow::Result<()> {
    let report = Report::from_path(path)?;

    let years = report.years();
    let Some(latest) = years.last().copied() else {
        println!("{}", "report has no complete rows".yellow());
        return Ok(());
    };
    let year = year.unwrap_or(latest);
    if !years.contains(&year) {
        anyhow::bail!("year {year} is not in the report, available years: {years:?}");
    }
    let file_types = if file_types.is_empty() {
        report.file_types()
    } else {
        file_types
    };
    debug!("filtering report on {year}, {file_types:?}");

    let view = report.filter(year, &file_types);
    if view.is_empty() {
        println!("{}", format!("no reports for {year} and {file_types:?}").yellow());
        return Ok(());
    }

    heading(&format!("Report distribution, {year}"));
    for total in view.country_summary() {
        println!("{:<40} {:<5} {:>10}", total.country, total.iso3, total.report_count);
    }

    heading(&format!("Top {TOP_COUNTRIES} countries by report count"));
    for (rank, total) in view.top_countries(TOP_COUNTRIES).iter().enumerate() {
        println!(
            "{:>2}. {:<40} {:>10}",
            rank + 1,
            total.country,
            total.report_count.to_string().cyan()
        );
    }

    heading("Report type distribution");
    for share in view.file_type_distribution() {
        println!(
            "{:<40} {:>10} {:>7.2}%",
            share.file_type, share.report_count, share.share
        );
    }

    heading("Underlying data");
    println!(
        "{:<30} {:<5} {:>6} {:<30} {:>10}",
        "country", "iso3", "year", "filetype", "reports"
    );
    for row in view.rows_by_count() {
        println!(
            "{:<30} {:<5} {:>6} {:<30} {:>10}",
            row.country, row.iso3, row.year, row.file_type, row.report_count
        );
    }

    Ok(())
}

/// Print the filing type table.
pub(crate) fn print_file_types() {
    heading("Filing types");
    for (id, label) in FILE_TYPES {
        println!("{:>6}  {}", id.to_string().cyan(), label);
    }
}
