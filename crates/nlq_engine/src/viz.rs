//! Chart auto-selection heuristics (spec.md §6, SPEC_FULL.md §2),
//! grounded on `analysis_engine.py::_generate_apex_chart`'s type
//! normalization table and the keyword-override rule from spec.md's
//! Result-shapes section. Generated code picks its own chart type most
//! of the time; this fills in a default when the LLM's config left
//! `chart.type` unset, and applies a question-keyword override either
//! way.

use nlq_protocol::ChartSpec;

const KEYWORD_OVERRIDES: &[(&str, &str)] = &[
    ("pie", "pie"),
    ("distribution", "pie"),
    ("donut", "donut"),
    ("line", "line"),
    ("trend", "line"),
    ("scatter", "scatter"),
    ("correlation", "scatter"),
    ("heat", "heatmap"),
    ("radar", "radar"),
    ("candlestick", "candlestick"),
];

/// Distinct x-axis category count and row count read out of an apex
/// `config.series`/`config.xaxis.categories` shape, when present.
struct SeriesShape {
    category_count: usize,
    row_count: usize,
}

fn series_shape(config: &serde_json::Value) -> SeriesShape {
    let category_count = config
        .get("xaxis")
        .and_then(|x| x.get("categories"))
        .and_then(|c| c.as_array())
        .map(|a| a.len())
        .unwrap_or(0);
    let row_count = config
        .get("series")
        .and_then(|s| s.as_array())
        .and_then(|series| series.first())
        .and_then(|s| s.get("data"))
        .and_then(|d| d.as_array())
        .map(|a| a.len())
        .unwrap_or(category_count);
    SeriesShape {
        category_count,
        row_count,
    }
}

/// Pick a chart type for `chart`, in priority order: an explicit keyword
/// in the question, the type already present in the config, a
/// low-cardinality categorical axis (bar), else bar as the default.
pub fn select_chart_type(chart: &ChartSpec, question: &str, is_time_series: bool) -> String {
    let lower = question.to_lowercase();
    for (keyword, chart_type) in KEYWORD_OVERRIDES {
        if lower.contains(keyword) {
            return chart_type.to_string();
        }
    }

    if let Some(existing) = &chart.chart_type {
        return existing.clone();
    }

    if is_time_series {
        return "line".to_string();
    }

    let shape = series_shape(&chart.config);
    if shape.category_count > 0 && shape.category_count <= 10 && shape.row_count <= 10 {
        return "bar".to_string();
    }

    "bar".to_string()
}

/// Fill in `chart.chart_type` when the generated config left it unset,
/// applying the heuristic above. A config that already names a type is
/// only overridden by an explicit keyword in the question.
pub fn annotate_chart_type(chart: &mut ChartSpec, question: &str, is_time_series: bool) {
    let selected = select_chart_type(chart, question, is_time_series);
    chart.chart_type = Some(selected);
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlq_protocol::ChartFormat;
    use serde_json::json;

    fn chart(config: serde_json::Value) -> ChartSpec {
        ChartSpec {
            format: ChartFormat::Apex,
            config,
            chart_type: None,
        }
    }

    #[test]
    fn time_series_selects_line() {
        let c = chart(json!({}));
        assert_eq!(select_chart_type(&c, "show sales over time", true), "line");
    }

    #[test]
    fn pie_keyword_overrides_existing_type() {
        let mut c = chart(json!({}));
        c.chart_type = Some("bar".to_string());
        assert_eq!(select_chart_type(&c, "show the distribution of sales", false), "pie");
    }

    #[test]
    fn low_cardinality_categorical_selects_bar() {
        let c = chart(json!({
            "xaxis": {"categories": ["a", "b", "c"]},
            "series": [{"data": [1, 2, 3]}],
        }));
        assert_eq!(select_chart_type(&c, "sales by category", false), "bar");
    }
}
