use std::ops::Range;

use crate::ast::{ConfigValue, Scalar};
use crate::parser::ParsedChart;
use crate::theme::Theme;

/// Serialize a configuration value as a literal: double-quoted keys and
/// strings, two-space indentation, integers without a fraction. The output is
/// valid in both dialects and re-parses to a structurally equal value.
pub fn write_literal(value: &ConfigValue) -> String {
    let mut out = String::new();
    write_value(value, 0, &mut out);
    out
}

/// Patch mode: splice the serialized configuration over the located literal
/// span(s), preserving every other byte of the original document. When a
/// Chart.js companion data literal was located, it is patched in the same
/// pass so the document stays self-consistent.
pub fn generate_patch(source: &str, parsed: &ParsedChart, config: &ConfigValue) -> String {
    let mut patches: Vec<(Range<usize>, String)> =
        vec![(parsed.config_span.clone(), write_literal(config))];

    if let Some(data_span) = &parsed.data_span {
        let disjoint = data_span.end <= parsed.config_span.start
            || data_span.start >= parsed.config_span.end;
        if disjoint {
            if let Some(data) = config.get("data") {
                patches.push((data_span.clone(), write_literal(data)));
            }
        }
    }

    // Apply back-to-front so earlier spans keep their offsets.
    patches.sort_by(|a, b| b.0.start.cmp(&a.0.start));
    let mut output = source.to_string();
    for (span, text) in patches {
        output.replace_range(span, &text);
    }
    output
}

/// Canonical mode: a complete minimal document referencing the rendering
/// library, with a style block synthesized from the theme or carried over
/// from the preserved stylesheet.
pub fn generate_canonical(config: &ConfigValue, theme: &Theme) -> String {
    let literal = write_literal(config);
    let style = theme
        .custom_css
        .clone()
        .unwrap_or_else(|| default_stylesheet(theme));

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Chart</title>
  <script src="https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js"></script>
  <style>
{style}
  </style>
</head>
<body>
  <div id="chart"></div>
  <script>
    const chart = echarts.init(document.getElementById('chart'));
    const option = {literal};
    chart.setOption(option);
  </script>
</body>
</html>"#
    )
}

fn default_stylesheet(theme: &Theme) -> String {
    format!(
        "body {{\n  margin: 0;\n  padding: 20px;\n  background-color: {bg};\n}}\n#chart {{\n  width: 800px;\n  height: 600px;\n  background-color: {bg};\n}}",
        bg = theme.background_color
    )
}

fn write_value(value: &ConfigValue, indent: usize, out: &mut String) {
    match value {
        ConfigValue::Mapping(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{\n");
            for (i, (key, child)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                push_indent(out, indent + 1);
                write_string(key, out);
                out.push_str(": ");
                write_value(child, indent + 1, out);
            }
            out.push('\n');
            push_indent(out, indent);
            out.push('}');
        }
        ConfigValue::Sequence(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                push_indent(out, indent + 1);
                write_value(item, indent + 1, out);
            }
            out.push('\n');
            push_indent(out, indent);
            out.push(']');
        }
        ConfigValue::Scalar(Scalar::Str(s)) => write_string(s, out),
        ConfigValue::Scalar(Scalar::Num(n)) => {
            if n.is_finite() {
                out.push_str(&format_number(*n));
            } else {
                out.push_str("null");
            }
        }
        ConfigValue::Scalar(Scalar::Bool(b)) => out.push_str(if *b { "true" } else { "false" }),
        ConfigValue::Scalar(Scalar::Null) => out.push_str("null"),
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}
