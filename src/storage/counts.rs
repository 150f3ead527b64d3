//! Ingestion of the backend counters section.
//!
//! Each line reads `<index>:<count>`, one per logged fragment, in order.

use super::fragment::TraceFragment;
use crate::utils::error::FormatError;
use log::debug;

/// Assign execution counts to fragments
///
/// **Public** - called once per log, before bridges are reconnected
///
/// # Arguments
/// * `lines` - Lines of the counts section; blank lines are ignored
/// * `fragments` - Fragments in logged order
///
/// # Returns
/// The counts, in order; empty input leaves every fragment untouched
///
/// # Errors
/// * `FormatError::MalformedCount` - Line is not `<index>:<count>`
/// * `FormatError::IndexMismatch` - Indexes are not 0, 1, 2, ...
/// * `FormatError::UnknownFragment` - More counts than fragments
pub fn parse_log_counts<S: AsRef<str>>(
    lines: &[S],
    fragments: &mut [TraceFragment],
) -> Result<Vec<u64>, FormatError> {
    let mut counts = Vec::new();

    for line in lines.iter().map(|l| l.as_ref().trim()).filter(|l| !l.is_empty()) {
        let (index, count) = parse_count_line(line)?;
        let expected = counts.len();
        if index != expected {
            return Err(FormatError::IndexMismatch {
                expected,
                found: index,
            });
        }
        if index >= fragments.len() {
            return Err(FormatError::UnknownFragment {
                index,
                available: fragments.len(),
            });
        }
        counts.push(count);
    }

    for (fragment, count) in fragments.iter_mut().zip(&counts) {
        fragment.count = Some(*count);
    }

    debug!("Assigned {} fragment counts", counts.len());
    Ok(counts)
}

/// Split `<index>:<count>`
///
/// **Private** - internal helper for parse_log_counts
fn parse_count_line(line: &str) -> Result<(usize, u64), FormatError> {
    let malformed = || FormatError::MalformedCount(line.to_string());

    let (index, count) = line.split_once(':').ok_or_else(malformed)?;
    let index: usize = index.trim().parse().map_err(|_| malformed())?;
    let count: u64 = count.trim().parse().map_err(|_| malformed())?;
    Ok((index, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LINES: &str = "
0:3
1:3
2:604
3:396
4:102
5:2000
6:3147
7:2445
8:2005
9:2000
10:1420
11:40
12:0
";

    fn fragments(n: usize) -> Vec<TraceFragment> {
        vec![TraceFragment::default(); n]
    }

    #[test]
    fn test_parse_log_counts() {
        let lines: Vec<&str> = LINES.split('\n').collect();
        let mut loops = fragments(13);

        let nums = parse_log_counts(&lines, &mut loops).unwrap();

        assert_eq!(nums.len(), 13);
        assert_eq!(nums[5], 2000);
        assert_eq!(loops[9].count, Some(2000));
        assert_eq!(loops[12].count, Some(0));
    }

    #[test]
    fn test_parse_log_counts_empty() {
        let mut loops = fragments(2);
        let nums = parse_log_counts::<&str>(&[], &mut loops).unwrap();
        assert!(nums.is_empty());
        assert_eq!(loops[0].count, None);
    }

    #[test]
    fn test_parse_log_counts_gap() {
        let mut loops = fragments(3);
        let err = parse_log_counts(&["0:1", "2:5"], &mut loops).unwrap_err();
        assert_eq!(err, FormatError::IndexMismatch { expected: 1, found: 2 });
        assert_eq!(loops[0].count, None);
    }

    #[test]
    fn test_parse_log_counts_too_many() {
        let mut loops = fragments(1);
        let err = parse_log_counts(&["0:1", "1:5"], &mut loops).unwrap_err();
        assert_eq!(err, FormatError::UnknownFragment { index: 1, available: 1 });
    }

    #[test]
    fn test_parse_log_counts_malformed() {
        let mut loops = fragments(1);
        let err = parse_log_counts(&["0=1"], &mut loops).unwrap_err();
        assert_eq!(err, FormatError::MalformedCount("0=1".to_string()));
    }
}
