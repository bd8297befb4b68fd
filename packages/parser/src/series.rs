use serde::Serialize;

use crate::ast::ConfigValue;

/// Palette constant applied when a series declares no explicit color.
pub const DEFAULT_SERIES_COLOR: &str = "#409eff";

const EMPTY_DATA: &[ConfigValue] = &[];

/// Positional view of one data trace. `data` borrows the configuration tree;
/// nothing is copied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesInfo<'a> {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub color: String,
    pub visible: bool,
    pub data: &'a [ConfigValue],
}

/// Enumerate the series of a configuration, purely positionally.
///
/// Names default to `Series{n}` (1-based); the color defaults to the fixed
/// palette constant; entries that are not mappings are dropped.
pub fn extract_series(config: &ConfigValue) -> Vec<SeriesInfo<'_>> {
    let Some(entries) = config.series_entries() else {
        return Vec::new();
    };
    let top_kind = config.get("type").and_then(ConfigValue::as_str);

    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.as_mapping().is_some())
        .map(|(index, entry)| {
            let name = entry
                .get("name")
                .or_else(|| entry.get("label"))
                .and_then(ConfigValue::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Series{}", index + 1));
            let kind = entry
                .get("type")
                .and_then(ConfigValue::as_str)
                .or(top_kind)
                .unwrap_or("line")
                .to_string();
            let color = entry
                .get_path(&["itemStyle", "color"])
                .or_else(|| entry.get_path(&["lineStyle", "color"]))
                .or_else(|| entry.get("borderColor"))
                .and_then(ConfigValue::as_str)
                .unwrap_or(DEFAULT_SERIES_COLOR)
                .to_string();
            let data = entry
                .get("data")
                .and_then(ConfigValue::as_sequence)
                .map(Vec::as_slice)
                .unwrap_or(EMPTY_DATA);

            SeriesInfo {
                id: format!("series-{index}"),
                name,
                kind,
                color,
                visible: true,
                data,
            }
        })
        .collect()
}
