//! Plotly-compatible chart descriptions. The browser hands `data` and `layout`
//! straight to `Plotly.newPlot`, so field names follow Plotly's schema.

use crate::models::{CrossTab, RegionCount, RegionSummary, SummaryField};
use serde::Serialize;

pub const BACKGROUND: &str = "rgb(26,26,26)";
pub const FONT_COLOR: &str = "white";

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChartKind {
    Pie,
    Bar,
    Scatter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[cfg(test)]
impl Figure {
    pub(crate) fn kind(&self) -> Option<ChartKind> {
        self.data.first().map(Trace::kind)
    }

    pub(crate) fn title(&self) -> Option<&str> {
        self.layout.title.as_ref().map(|title| title.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Pie(PieTrace),
    Bar(SeriesTrace),
    Scatter(SeriesTrace),
}

#[cfg(test)]
impl Trace {
    pub(crate) fn kind(&self) -> ChartKind {
        match self {
            Trace::Pie(_) => ChartKind::Pie,
            Trace::Bar(_) => ChartKind::Bar,
            Trace::Scatter(_) => ChartKind::Scatter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieTrace {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole: Option<f64>,
    pub showlegend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesTrace {
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Title,
    pub gridcolor: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub orientation: &'static str,
    pub x: f64,
    pub y: f64,
    pub xanchor: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Margin {
    pub t: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    pub plot_bgcolor: &'static str,
    pub paper_bgcolor: &'static str,
    pub font: Font,
    pub hovermode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
}

impl Layout {
    /// Dark layout shared by every chart on the dashboard.
    pub fn dark() -> Self {
        Self {
            title: None,
            plot_bgcolor: BACKGROUND,
            paper_bgcolor: BACKGROUND,
            font: Font {
                color: FONT_COLOR,
                size: None,
            },
            hovermode: "closest",
            barmode: None,
            legend: None,
            margin: None,
            xaxis: None,
            yaxis: None,
        }
    }

    fn titled(mut self, text: impl Into<String>) -> Self {
        self.title = Some(Title { text: text.into() });
        self
    }

    fn axes(mut self, x: &str, y: &str) -> Self {
        self.xaxis = Some(axis(x));
        self.yaxis = Some(axis(y));
        self
    }

    /// Horizontal legend over the plot, used by the wide bar and line charts.
    fn compact_legend(mut self) -> Self {
        self.legend = Some(Legend {
            orientation: "h",
            x: 0.4,
            y: 1.0,
            xanchor: "center",
        });
        self.font.size = Some(11);
        self
    }
}

fn axis(title: &str) -> Axis {
    Axis {
        title: Title {
            text: title.to_string(),
        },
        gridcolor: "rgb(60,60,60)",
    }
}

/// One trace per cross-tab column, with the row keys on the x axis.
fn series<'a>(
    table: &'a CrossTab,
    mode: Option<&'static str>,
) -> impl Iterator<Item = SeriesTrace> + 'a {
    table
        .columns
        .iter()
        .enumerate()
        .map(move |(index, column)| SeriesTrace {
            x: table.rows.clone(),
            y: table.column_values(index),
            name: column.clone(),
            mode,
        })
}

fn grouped_bar(table: &CrossTab, layout: Layout) -> Figure {
    let mut layout = layout;
    layout.barmode = Some("group");
    Figure {
        data: series(table, None).map(Trace::Bar).collect(),
        layout,
    }
}

pub fn region_share_figure(counts: &[RegionCount]) -> Figure {
    Figure {
        data: vec![Trace::Pie(PieTrace {
            labels: counts.iter().map(|row| row.region.clone()).collect(),
            values: counts.iter().map(|row| row.users as f64).collect(),
            name: "user_id".to_string(),
            hole: None,
            showlegend: false,
        })],
        layout: Layout::dark().titled("% of Users by Region"),
    }
}

pub fn age_figure(table: &CrossTab) -> Figure {
    grouped_bar(
        table,
        Layout::dark()
            .titled("Age Demographic by Region")
            .axes("age range", "number of users"),
    )
}

pub fn gender_figure(table: &CrossTab) -> Figure {
    grouped_bar(
        table,
        Layout::dark()
            .titled("Gender Demographic by Region")
            .axes("gender", "number of users")
            .compact_legend(),
    )
}

pub fn genre_figure(table: &CrossTab) -> Figure {
    grouped_bar(
        table,
        Layout::dark()
            .titled("Genres by Region")
            .axes("Genre", "number of sessions")
            .compact_legend(),
    )
}

pub fn daily_sessions_figure(table: &CrossTab) -> Figure {
    Figure {
        data: series(table, Some("lines")).map(Trace::Scatter).collect(),
        layout: Layout::dark()
            .titled("Sessions by Day")
            .axes("date", "number of sessions")
            .compact_legend(),
    }
}

/// Donut of one region summary column, rebuilt whenever the dropdown changes.
pub fn summary_figure(summary: &[RegionSummary], field: SummaryField) -> Figure {
    Figure {
        data: vec![Trace::Pie(PieTrace {
            labels: summary.iter().map(|row| row.region.clone()).collect(),
            values: summary.iter().map(|row| field.value_of(row)).collect(),
            name: field.column().to_string(),
            hole: Some(0.3),
            showlegend: true,
        })],
        layout: Layout::dark().titled(format!("{} by region", field.column())),
    }
}
