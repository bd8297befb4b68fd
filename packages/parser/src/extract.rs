use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::error::{ParseError, ParseResult};

/// One of the two supported declarative idioms for chart configuration, or
/// neither. `Unknown` documents are still given the benefit of the doubt: an
/// `option = {...}` binding parses without any library signal present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartDialect {
    ECharts,
    ChartJs,
    Unknown,
}

/// Result of locating the configuration-bearing code region.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub dialect: ChartDialect,
    /// Byte range of the selected code region within the source document.
    pub region: Range<usize>,
}

/// Decide the dialect from literal signals over the whole document.
pub fn detect_dialect(source: &str) -> ChartDialect {
    if source.contains("chart.js") || source.contains("Chart(") {
        return ChartDialect::ChartJs;
    }
    if source.contains("echarts") || source.contains("setOption") {
        return ChartDialect::ECharts;
    }
    ChartDialect::Unknown
}

/// Locate the code region holding the configuration.
///
/// Documents usually embed the configuration in a script block after the
/// library bootstrap block, so when several regions exist the last one is
/// selected. A document without script markup is treated as bare code.
pub fn extract(source: &str) -> ParseResult<Extraction> {
    if source.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let dialect = detect_dialect(source);
    let region = script_regions(source)
        .into_iter()
        .last()
        .unwrap_or(0..source.len());

    Ok(Extraction { dialect, region })
}

/// Byte ranges of the contents of every `<script>...</script>` block,
/// in document order. Tag matching is ASCII-case-insensitive.
pub fn script_regions(source: &str) -> Vec<Range<usize>> {
    let mut regions = Vec::new();
    let mut from = 0;

    while let Some(open) = find_ci(source, "<script", from) {
        let Some(tag_end) = source[open..].find('>') else {
            break;
        };
        let content_start = open + tag_end + 1;
        let Some(close) = find_ci(source, "</script", content_start) else {
            break;
        };
        regions.push(content_start..close);
        from = close + "</script".len();
    }

    regions
}

/// ASCII-case-insensitive substring search starting at `from`.
pub(crate) fn find_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let haystack = haystack.as_bytes();
    let needle = needle.as_bytes();
    if from + needle.len() > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
        .map(|offset| from + offset)
}
