use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, MultiSelect};
use filings_spider::file_types;
use std::collections::BTreeSet;

/// Ask for one or more company ids, separated by commas or spaces.
pub(crate) fn companies() -> anyhow::Result<Vec<i64>> {
    let input: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Company ID(s)")
        .validate_with(|input: &String| parse_ids(input).map(|_| ()))
        .interact_text()?;
    parse_ids(&input).map_err(anyhow::Error::msg)
}

/// Ask for the file types to search, shown by label.
pub(crate) fn file_types() -> anyhow::Result<BTreeSet<i32>> {
    let labels = file_types::labels();
    let selected = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Select Filetype(s)")
        .items(&labels)
        .interact()?;
    Ok(file_types::resolve(selected.into_iter().map(|i| labels[i]))?)
}

fn parse_ids(input: &str) -> Result<Vec<i64>, String> {
    let ids = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| match part.parse::<i64>() {
            Ok(id) if id >= 1 => Ok(id),
            _ => Err(format!("{part:?} is not a company id")),
        })
        .collect::<Result<Vec<_>, _>>()?;
    if ids.is_empty() {
        return Err("at least one company id is required".to_string());
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::parse_ids;

    #[test]
    fn company_ids() {
        assert_eq!(parse_ids("4004205"), Ok(vec![4004205]));
        assert_eq!(parse_ids(" 1, 2 3,,"), Ok(vec![1, 2, 3]));
        assert!(parse_ids("").is_err());
        assert!(parse_ids("0").is_err());
        assert!(parse_ids("12a").is_err());
    }
}
