//! Filter-graph intermediate representation.
//!
//! A [`CompiledGraph`] is owned by a single compile call and rendered once
//! into the engine's `-filter_complex` text: nodes are `;`-joined, streams
//! are bracket-labelled.

use std::fmt;

use serde::Serialize;

/// One `[in][in]filter,filter[out]` chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterNode {
    pub inputs: Vec<String>,
    pub filters: String,
    pub output: String,
}

impl FilterNode {
    pub fn new(
        inputs: impl IntoIterator<Item = impl Into<String>>,
        filters: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            filters: filters.into(),
            output: output.into(),
        }
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for input in &self.inputs {
            write!(f, "[{input}]")?;
        }
        write!(f, "{}[{}]", self.filters, self.output)
    }
}

/// Ordered filter nodes plus the labels that leave the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompiledGraph {
    nodes: Vec<FilterNode>,
    outputs: Vec<String>,
}

impl CompiledGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its output label.
    pub fn push(&mut self, node: FilterNode) -> String {
        let label = node.output.clone();
        self.nodes.push(node);
        label
    }

    /// Mark a label as a graph output (mapped to the output file in order).
    pub fn add_output(&mut self, label: impl Into<String>) {
        self.outputs.push(label.into());
    }

    pub fn nodes(&self) -> &[FilterNode] {
        &self.nodes
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Count nodes whose filter chain starts with `filter`.
    pub fn count_filter(&self, filter: &str) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.filters.starts_with(filter))
            .count()
    }

    /// Render as the engine's `-filter_complex` argument.
    pub fn to_filter_complex(&self) -> String {
        self.nodes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Format a float the way the engine command has always been written:
/// integral values keep one decimal place (`2.0`), everything else uses the
/// shortest round-trip form (`0.0015`). Magnitudes below `1e-4` or from
/// `1e16` up switch to exponent form with a signed two-digit exponent
/// (`5e-05`, `1e+16`).
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }
    let magnitude = value.abs();
    if value != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{value:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => formatted,
        };
    }
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Escape a filesystem path for use as a filter option value.
pub fn escape_filter_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for ch in path.chars() {
        match ch {
            '\\' | ':' | '\'' | ',' | ';' | '[' | ']' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_rendering() {
        let node = FilterNode::new(["x0", "v2"], "xfade=transition=fade", "x1");
        assert_eq!(node.to_string(), "[x0][v2]xfade=transition=fade[x1]");
    }

    #[test]
    fn test_graph_joins_with_semicolons() {
        let mut graph = CompiledGraph::new();
        let a = graph.push(FilterNode::new(["0:v"], "null", "a"));
        let b = graph.push(FilterNode::new(["1:v"], "null", "b"));
        graph.push(FilterNode::new([a, b], "hstack", "out"));
        graph.add_output("out");

        assert_eq!(
            graph.to_filter_complex(),
            "[0:v]null[a];[1:v]null[b];[a][b]hstack[out]"
        );
        assert_eq!(graph.outputs(), ["out"]);
        assert_eq!(graph.count_filter("hstack"), 1);
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(2.0), "2.0");
        assert_eq!(format_number(0.0), "0.0");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(0.0015), "0.0015");
        assert_eq!(format_number(540.0), "540.0");
        assert_eq!(format_number(1.15), "1.15");
    }

    #[test]
    fn test_format_number_exponent_range() {
        assert_eq!(format_number(0.00005), "5e-05");
        assert_eq!(format_number(0.000015), "1.5e-05");
        assert_eq!(format_number(0.0001), "0.0001");
        assert_eq!(format_number(1e16), "1e+16");
        assert_eq!(format_number(1e15), "1000000000000000.0");
        assert_eq!(format_number(-2.5e-7), "-2.5e-07");
        assert_eq!(format_number(1e-100), "1e-100");
    }

    #[test]
    fn test_escape_filter_path() {
        assert_eq!(escape_filter_path("/tmp/subs.srt"), "/tmp/subs.srt");
        assert_eq!(
            escape_filter_path("C:\\clips\\it's.srt"),
            "C\\:\\\\clips\\\\it\\'s.srt"
        );
    }
}
