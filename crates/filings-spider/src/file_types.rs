use crate::error::CriteriaError;
use lazy_static::lazy_static;
use std::collections::{BTreeSet, HashMap};

/// Filing type identifiers and their human readable labels.
///
/// Some labels are shared by more than one identifier (`40-F`, `S-1`).
pub static FILE_TYPES: &[(i32, &str)] = &[
    (142, "10-K"),
    (143, "10-K/A"),
    (144, "10-K405"),
    (145, "10-K405/A"),
    (146, "10-KT"),
    (147, "10-KT/A"),
    (160, "10-Q"),
    (161, "10-Q/A"),
    (162, "10-QT"),
    (163, "10-QT/A"),
    (169, "20-F"),
    (170, "20-F/A"),
    (259, "8-K"),
    (260, "8-K/A"),
    (261, "8-K12B"),
    (262, "8-K12B/A"),
    (263, "8-K12G3"),
    (264, "8-K12G3/A"),
    (265, "8-K15D5"),
    (266, "8-K15D5/A"),
    (25, "40-F"),
    (171, "40-F"),
    (172, "40-F/A"),
    (257, "6-K"),
    (258, "6-K/A"),
    (174, "MEG - AR"),
    (177, "AR"),
    (178, "ARS"),
    (179, "ARS/A"),
    (192, "FIN SUPP"),
    (193, "Intierra SR"),
    (196, "SR"),
    (197, "Tanshin"),
    (199, "QR"),
    (200, "QR/A"),
    (968, "Other Financials"),
    (188, "Yuho"),
    (432, "Sustainability Report"),
    (1010, "Corporate Social Responsibility Report"),
    (1090, "Corporate Governance Report"),
    (1091, "Environmental Report"),
    (1105, "TCFD Report"),
    (127, "S-1"),
    (867, "S-1"),
    (868, "S-1/A"),
];

lazy_static! {
    static ref BY_ID: HashMap<i32, &'static str> = FILE_TYPES.iter().copied().collect();
    static ref BY_LABEL: HashMap<String, Vec<i32>> = {
        let mut map: HashMap<String, Vec<i32>> = HashMap::new();
        for (id, label) in FILE_TYPES {
            map.entry(label.to_lowercase()).or_default().push(*id);
        }
        map
    };
}

/// Label of a filing type identifier.
pub fn label(id: i32) -> Option<&'static str> {
    BY_ID.get(&id).copied()
}

/// Every identifier carrying `label` (case-insensitive), in table order.
pub fn ids_for_label(label: &str) -> &'static [i32] {
    BY_LABEL
        .get(&label.trim().to_lowercase())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Distinct labels, in table order.
pub fn labels() -> Vec<&'static str> {
    let mut seen = BTreeSet::new();
    FILE_TYPES
        .iter()
        .filter(|(_, label)| seen.insert(*label))
        .map(|(_, label)| *label)
        .collect()
}

/// Translate a selection of labels and/or numeric identifiers into API identifiers.
///
/// ```rust
/// use filings_spider::file_types::resolve;
///
/// let ids = resolve(["10-K", "s-1", "432"]).unwrap();
/// assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![127, 142, 432, 867]);
/// ```
pub fn resolve<I, S>(selection: I) -> Result<BTreeSet<i32>, CriteriaError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ids = BTreeSet::new();
    for item in selection {
        let item = item.as_ref();
        let by_label = ids_for_label(item);
        if !by_label.is_empty() {
            ids.extend(by_label);
            continue;
        }
        match item.trim().parse::<i32>() {
            Ok(id) if BY_ID.contains_key(&id) => {
                ids.insert(id);
            }
            _ => return Err(CriteriaError::UnknownFileType(item.to_string())),
        }
    }
    Ok(ids)
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
