//! Field helpers shared by the databag parsers

use crate::error::RelationDataError;
use std::collections::BTreeMap;

/// Raw application databag of one relation instance
pub type Databag = BTreeMap<String, String>;

/// First non-empty value among `keys`, reported under the first key when absent
pub(crate) fn required<'a>(
    data: &'a Databag,
    keys: &[&'static str],
) -> Result<&'a str, RelationDataError> {
    keys.iter()
        .filter_map(|key| data.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .ok_or(RelationDataError::MissingField(
            keys.first().copied().unwrap_or_default(),
        ))
}

/// Parse an integer and check it against an inclusive range
pub(crate) fn parse_bounded(
    field: &'static str,
    value: &str,
    min: i64,
    max: i64,
) -> Result<i64, RelationDataError> {
    let parsed: i64 = value
        .trim()
        .parse()
        .map_err(|_| RelationDataError::invalid(field, format!("{:?} is not an integer", value)))?;
    if parsed < min || parsed > max {
        return Err(RelationDataError::invalid(
            field,
            format!("{} is outside {}..={}", parsed, min, max),
        ));
    }
    Ok(parsed)
}

/// `^[a-zA-Z][a-zA-Z0-9-_]{1,255}$`
pub(crate) fn is_valid_gnb_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphabetic()
        && (2..=256).contains(&name.len())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
