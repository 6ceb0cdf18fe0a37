//! Parsing of interactive selections like `1 3 5`, `2-4,7` or `all`.

use std::collections::BTreeSet;

use crate::error::{DiskfaceError, Result};

/// Parse a selection of 1-based indices, each at most `max`.
///
/// Returns the indices sorted and without duplicates.
pub fn parse_selection(input: &str, max: usize) -> Result<Vec<usize>> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DiskfaceError::InvalidSelection("empty selection".to_string()));
    }
    if max == 0 {
        return Err(DiskfaceError::InvalidSelection(
            "nothing to select".to_string(),
        ));
    }
    if input.eq_ignore_ascii_case("all") {
        return Ok((1..=max).collect());
    }

    let mut picked = BTreeSet::new();
    for part in input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
    {
        match part.split_once('-') {
            Some((start, end)) => {
                let start = parse_index(start, max)?;
                let end = parse_index(end, max)?;
                if start > end {
                    return Err(DiskfaceError::InvalidSelection(format!(
                        "range {} is reversed",
                        part
                    )));
                }
                picked.extend(start..=end);
            }
            None => {
                picked.insert(parse_index(part, max)?);
            }
        }
    }

    Ok(picked.into_iter().collect())
}

fn parse_index(raw: &str, max: usize) -> Result<usize> {
    let index: usize = raw
        .trim()
        .parse()
        .map_err(|_| DiskfaceError::InvalidSelection(format!("'{}' is not a number", raw)))?;
    if index == 0 || index > max {
        return Err(DiskfaceError::InvalidSelection(format!(
            "{} is out of range (1-{})",
            index, max
        )));
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_and_list() {
        assert_eq!(parse_selection("2", 5).unwrap(), vec![2]);
        assert_eq!(parse_selection("1 3 5", 5).unwrap(), vec![1, 3, 5]);
        assert_eq!(parse_selection("5,1, 3", 5).unwrap(), vec![1, 3, 5]);
    }

    #[test]
    fn test_ranges_and_duplicates() {
        assert_eq!(parse_selection("1-3 7", 10).unwrap(), vec![1, 2, 3, 7]);
        assert_eq!(parse_selection("2-4 3", 10).unwrap(), vec![2, 3, 4]);
        assert_eq!(parse_selection("4-4", 10).unwrap(), vec![4]);
    }

    #[test]
    fn test_all() {
        assert_eq!(parse_selection("all", 3).unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_selection(" ALL ", 2).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_rejects_bad_input() {
        for input in ["", "   ", "0", "6", "x", "3-1", "1-", "-2", "1-9"] {
            assert!(
                matches!(parse_selection(input, 5), Err(DiskfaceError::InvalidSelection(_))),
                "accepted {:?}",
                input
            );
        }
    }

    #[test]
    fn test_nothing_to_select() {
        assert!(parse_selection("all", 0).is_err());
    }
}
