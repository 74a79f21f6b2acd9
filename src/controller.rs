use crate::dashboard::Dashboard;
use crate::errors::ControllerError;
use crate::figures::Figure;
use crate::models::{PopularityTable, Row, SummaryField};
use crate::ui::{
    tab_content, TabId, UiNode, POPULAR_TABLE_ID, POPULAR_TABLE_OUTPUT_ID, SUMMARY_FIELD_ID,
    SUMMARY_GRAPH_ID, TABS_CONTENT_ID, TABS_ID,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Raw event as posted by the page: the id of the control that changed and its new value.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackRequest {
    pub input: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    TabSelected(TabId),
    SummaryFieldSelected(SummaryField),
    TableEdited(Option<Vec<Row>>),
}

impl Event {
    pub fn from_input(input: &str, value: Value) -> Result<Self, ControllerError> {
        match input {
            TABS_ID => {
                let tab = expect_str(input, &value)?;
                TabId::parse(tab)
                    .map(Event::TabSelected)
                    .ok_or_else(|| ControllerError::UnknownTab(tab.to_string()))
            }
            SUMMARY_FIELD_ID => {
                let field = expect_str(input, &value)?;
                SummaryField::parse(field)
                    .map(Event::SummaryFieldSelected)
                    .ok_or_else(|| ControllerError::UnknownSummaryField(field.to_string()))
            }
            POPULAR_TABLE_ID => {
                if value.is_null() {
                    return Ok(Event::TableEdited(None));
                }
                serde_json::from_value(value)
                    .map(|rows| Event::TableEdited(Some(rows)))
                    .map_err(|err| ControllerError::InvalidPayload {
                        control: input.to_string(),
                        reason: err.to_string(),
                    })
            }
            other => Err(ControllerError::UnknownControl(other.to_string())),
        }
    }
}

impl TryFrom<CallbackRequest> for Event {
    type Error = ControllerError;

    fn try_from(request: CallbackRequest) -> Result<Self, Self::Error> {
        Event::from_input(&request.input, request.value)
    }
}

fn expect_str<'a>(input: &str, value: &'a Value) -> Result<&'a str, ControllerError> {
    value.as_str().ok_or_else(|| ControllerError::InvalidPayload {
        control: input.to_string(),
        reason: format!("expected a string, got {value}"),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    Children(UiNode),
    Figure(Figure),
}

/// Replacement for one property of one element on the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Update {
    pub output: &'static str,
    #[serde(flatten)]
    pub payload: Payload,
}

pub fn dispatch(dashboard: &Dashboard, event: Event) -> Update {
    match event {
        Event::TabSelected(tab) => select_tab(dashboard, tab),
        Event::SummaryFieldSelected(field) => select_summary_field(dashboard, field),
        Event::TableEdited(rows) => edit_table(dashboard, rows),
    }
}

pub fn select_tab(dashboard: &Dashboard, tab: TabId) -> Update {
    Update {
        output: TABS_CONTENT_ID,
        payload: Payload::Children(tab_content(dashboard, tab)),
    }
}

pub fn select_summary_field(dashboard: &Dashboard, field: SummaryField) -> Update {
    Update {
        output: SUMMARY_GRAPH_ID,
        payload: Payload::Figure(dashboard.summary_figure(field)),
    }
}

/// The edited rows are resolved against the loaded table but nothing is
/// rendered from them yet; the output slot is always cleared.
pub fn edit_table(dashboard: &Dashboard, rows: Option<Vec<Row>>) -> Update {
    let table = resolve_edited_table(&dashboard.datasets.most_popular, rows);
    debug!(
        "popular table edited: {} rows, {} columns",
        table.rows.len(),
        table.columns.len()
    );
    Update {
        output: POPULAR_TABLE_OUTPUT_ID,
        payload: Payload::Children(UiNode::Empty),
    }
}

/// Absent or empty edits fall back to the table as loaded.
pub fn resolve_edited_table(original: &PopularityTable, rows: Option<Vec<Row>>) -> PopularityTable {
    match rows {
        Some(rows) if !rows.is_empty() => PopularityTable::from_rows(rows),
        _ => original.clone(),
    }
}
