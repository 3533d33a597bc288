//! Typed value extraction from INI sections.

use std::fmt::Display;
use std::str::FromStr;

use ini::Properties;

use crate::error::{GridError, GridResult};

/// Reads `key` from `section`, falling back to `default` when absent.
pub(super) fn get_value<T>(
    section: Option<&Properties>,
    section_name: &str,
    key: &str,
    default: T,
) -> GridResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match section.and_then(|props| props.get(key)) {
        Some(raw) => raw.trim().parse().map_err(|e| {
            GridError::Config(format!(
                "invalid value '{}' for {}.{}: {}",
                raw, section_name, key, e
            ))
        }),
        None => Ok(default),
    }
}

/// Reads a comma-separated list; absent or blank keys give an empty list.
pub(super) fn get_list<T>(
    section: Option<&Properties>,
    section_name: &str,
    key: &str,
) -> GridResult<Vec<T>>
where
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = section.and_then(|props| props.get(key)) else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse().map_err(|e| {
                GridError::Config(format!(
                    "invalid list item '{}' for {}.{}: {}",
                    item, section_name, key, e
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ini::Ini;

    fn section(text: &str) -> Ini {
        Ini::load_from_str(text).unwrap()
    }

    #[test]
    fn test_get_value_default_when_missing() {
        let ini = section("[dataset]\n");
        let value: u32 = get_value(ini.section(Some("dataset")), "dataset", "x", 7).unwrap();
        assert_eq!(value, 7);
        let value: u32 = get_value(None, "dataset", "x", 9).unwrap();
        assert_eq!(value, 9);
    }

    #[test]
    fn test_get_value_parses() {
        let ini = section("[dataset]\nx = 2.5\n");
        let value: f64 = get_value(ini.section(Some("dataset")), "dataset", "x", 0.0).unwrap();
        assert_eq!(value, 2.5);
    }

    #[test]
    fn test_get_list() {
        let ini = section("[dataset]\nlevels = 1, 2,,3\nempty =\n");
        let props = ini.section(Some("dataset"));
        let values: Vec<u32> = get_list(props, "dataset", "levels").unwrap();
        assert_eq!(values, vec![1, 2, 3]);
        let empty: Vec<u32> = get_list(props, "dataset", "empty").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_get_list_rejects_garbage() {
        let ini = section("[dataset]\nlevels = 1,x\n");
        let result: GridResult<Vec<u32>> =
            get_list(ini.section(Some("dataset")), "dataset", "levels");
        assert!(matches!(result, Err(GridError::Config(_))));
    }
}
