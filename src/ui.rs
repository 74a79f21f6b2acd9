use crate::dashboard::Dashboard;
use crate::figures::Figure;
use crate::models::{PopularityTable, Row, SummaryField};
use serde::Serialize;

pub const TABS_ID: &str = "tabs";
pub const TABS_CONTENT_ID: &str = "tabs-content";
pub const SUMMARY_FIELD_ID: &str = "summary-field";
pub const SUMMARY_GRAPH_ID: &str = "summary-graph";
pub const POPULAR_TABLE_ID: &str = "popular-table";
pub const POPULAR_TABLE_OUTPUT_ID: &str = "popular-table-output";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabId {
    #[default]
    UserBreakdown,
    ViewingTrends,
}

impl TabId {
    pub const ALL: [TabId; 2] = [TabId::UserBreakdown, TabId::ViewingTrends];

    pub fn value(self) -> &'static str {
        match self {
            TabId::UserBreakdown => "tab-1",
            TabId::ViewingTrends => "tab-2",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TabId::UserBreakdown => "Regional User Breakdown",
            TabId::ViewingTrends => "Regional Viewing Trends",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.value() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableColumn {
    pub name: String,
    pub id: String,
    pub deletable: bool,
}

/// Serializable layout tree rendered by the page script.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum UiNode {
    Row {
        children: Vec<UiNode>,
    },
    Column {
        /// Width in twelfths of the row.
        width: u8,
        children: Vec<UiNode>,
    },
    Graph {
        id: String,
        figure: Figure,
    },
    Dropdown {
        id: String,
        options: Vec<DropdownOption>,
        value: String,
    },
    DataTable {
        id: String,
        columns: Vec<TableColumn>,
        rows: Vec<Row>,
        filterable: bool,
    },
    Placeholder {
        id: String,
    },
    Empty,
}

impl UiNode {
    fn row(children: Vec<UiNode>) -> Self {
        UiNode::Row { children }
    }

    fn column(width: u8, child: UiNode) -> Self {
        UiNode::Column {
            width,
            children: vec![child],
        }
    }

    fn graph(id: &str, figure: &Figure) -> Self {
        UiNode::Graph {
            id: id.to_string(),
            figure: figure.clone(),
        }
    }

    /// Ids of every identified node, depth first.
    #[cfg(test)]
    pub(crate) fn ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        ids
    }

    #[cfg(test)]
    fn collect_ids<'a>(&'a self, ids: &mut Vec<&'a str>) {
        match self {
            UiNode::Row { children } | UiNode::Column { children, .. } => {
                for child in children {
                    child.collect_ids(ids);
                }
            }
            UiNode::Graph { id, .. }
            | UiNode::Dropdown { id, .. }
            | UiNode::DataTable { id, .. }
            | UiNode::Placeholder { id } => ids.push(id),
            UiNode::Empty => {}
        }
    }

    #[cfg(test)]
    pub(crate) fn find(&self, wanted: &str) -> Option<&UiNode> {
        match self {
            UiNode::Row { children } | UiNode::Column { children, .. } => {
                children.iter().find_map(|child| child.find(wanted))
            }
            UiNode::Graph { id, .. }
            | UiNode::Dropdown { id, .. }
            | UiNode::DataTable { id, .. }
            | UiNode::Placeholder { id } => (id == wanted).then_some(self),
            UiNode::Empty => None,
        }
    }
}

pub fn tab_content(dashboard: &Dashboard, tab: TabId) -> UiNode {
    match tab {
        TabId::UserBreakdown => user_breakdown(dashboard),
        TabId::ViewingTrends => viewing_trends(dashboard),
    }
}

fn user_breakdown(dashboard: &Dashboard) -> UiNode {
    let figures = &dashboard.figures;
    UiNode::Column {
        width: 12,
        children: vec![
            UiNode::row(vec![
                UiNode::column(5, UiNode::graph("regions-graph", &figures.region_share)),
                UiNode::column(7, UiNode::graph("gender-graph", &figures.gender)),
            ]),
            UiNode::row(vec![UiNode::column(12, UiNode::graph("age-graph", &figures.age))]),
        ],
    }
}

fn viewing_trends(dashboard: &Dashboard) -> UiNode {
    let figures = &dashboard.figures;
    UiNode::Column {
        width: 12,
        children: vec![
            UiNode::row(vec![summary_dropdown()]),
            UiNode::row(vec![
                UiNode::column(6, UiNode::graph(SUMMARY_GRAPH_ID, &figures.summary)),
                UiNode::Column {
                    width: 6,
                    children: vec![
                        popular_table(&dashboard.datasets.most_popular),
                        UiNode::Placeholder {
                            id: POPULAR_TABLE_OUTPUT_ID.to_string(),
                        },
                    ],
                },
            ]),
            UiNode::row(vec![UiNode::column(12, UiNode::graph("genre-graph", &figures.genre))]),
            UiNode::row(vec![UiNode::column(
                12,
                UiNode::graph("daily-graph", &figures.daily_sessions),
            )]),
        ],
    }
}

fn summary_dropdown() -> UiNode {
    UiNode::Dropdown {
        id: SUMMARY_FIELD_ID.to_string(),
        options: SummaryField::ALL
            .into_iter()
            .map(|field| DropdownOption {
                label: field.column().to_string(),
                value: field.column().to_string(),
            })
            .collect(),
        value: SummaryField::default().column().to_string(),
    }
}

fn popular_table(table: &PopularityTable) -> UiNode {
    UiNode::DataTable {
        id: POPULAR_TABLE_ID.to_string(),
        columns: table
            .columns
            .iter()
            .map(|column| TableColumn {
                name: column.clone(),
                id: column.clone(),
                deletable: true,
            })
            .collect(),
        rows: table.rows.clone(),
        filterable: true,
    }
}

pub fn render_index(dashboard: &Dashboard) -> String {
    let tabs: String = TabId::ALL
        .into_iter()
        .map(|tab| {
            let selected = tab == TabId::default();
            format!(
                r#"<button class="tab{}" type="button" data-tab="{}" role="tab" aria-selected="{}">{}</button>"#,
                if selected { " active" } else { "" },
                tab.value(),
                selected,
                tab.label()
            )
        })
        .collect::<Vec<_>>()
        .join("\n          ");

    INDEX_HTML
        .replace("{{TITLE}}", &escape_html(&dashboard.title))
        .replace("{{DATE_RANGE}}", &escape_html(&dashboard.date_range_label()))
        .replace("{{TABS}}", &tabs)
        .replace("{{INITIAL_TAB}}", TabId::default().value())
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <script src="https://cdn.plot.ly/plotly-2.35.2.min.js" charset="utf-8"></script>
  <style>
    :root {
      --bg: rgb(26, 26, 26);
      --panel: rgb(34, 34, 34);
      --ink: #ffffff;
      --muted: #a7a7a7;
      --accent: #f54997;
      --filter: #808080;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Helvetica Neue", Arial, sans-serif;
    }

    header {
      display: flex;
      align-items: baseline;
      justify-content: space-between;
      padding: 10px 20px;
    }

    h1 {
      margin: 0;
      font-size: 1.4rem;
      font-weight: 600;
    }

    .subtitle {
      margin: 0;
      color: var(--muted);
      font-size: 0.9rem;
    }

    .tabs {
      display: flex;
      border-bottom: 1px solid #333;
      padding: 0 20px;
    }

    .tab {
      background: transparent;
      color: var(--muted);
      border: none;
      border-bottom: 3px solid transparent;
      padding: 12px 18px;
      font-size: 0.95rem;
      cursor: pointer;
    }

    .tab.active {
      color: var(--ink);
      border-bottom-color: var(--accent);
    }

    #tabs-content {
      padding: 0 10px 10px;
    }

    .row {
      display: flex;
      flex-wrap: wrap;
      padding: 0 10px 10px;
    }

    .col {
      padding: 5px;
    }

    select {
      margin: 10px 0 0 90px;
      width: 400px;
      font-size: 1.1rem;
      padding: 6px 10px;
      background: var(--panel);
      color: var(--ink);
      border: 1px solid #444;
    }

    .table-wrap {
      max-height: 300px;
      overflow-y: scroll;
    }

    table {
      width: 100%;
      border-collapse: collapse;
      font-weight: bold;
      font-size: 0.85rem;
    }

    th,
    td {
      padding: 6px 8px;
      border-bottom: 1px solid #333;
      text-align: left;
      white-space: nowrap;
      overflow: hidden;
      text-overflow: ellipsis;
      max-width: 220px;
    }

    th button,
    td button {
      background: none;
      border: none;
      color: var(--muted);
      cursor: pointer;
      padding: 0 4px;
    }

    .filter-row input {
      width: 100%;
      background: var(--filter);
      border: none;
      color: var(--ink);
      padding: 3px 5px;
    }

    .status {
      color: #e2584b;
      padding: 0 20px;
      min-height: 1.2em;
    }
  </style>
</head>
<body>
  <header>
    <h1>{{TITLE}}</h1>
    <p class="subtitle">Sessions from {{DATE_RANGE}}</p>
  </header>

  <nav class="tabs" id="tabs" role="tablist">
          {{TABS}}
  </nav>
  <div class="status" id="status"></div>
  <div id="tabs-content"></div>

  <script>
    const statusEl = document.getElementById('status');
    const tabs = Array.from(document.querySelectorAll('.tab'));

    const setStatus = (message) => {
      statusEl.textContent = message || '';
    };

    const callback = async (input, value) => {
      const res = await fetch('/api/callback', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ input, value })
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      applyUpdate(await res.json());
    };

    const fire = (input, value) => {
      callback(input, value).then(() => setStatus('')).catch((err) => setStatus(err.message));
    };

    const plot = (id, figure) => {
      Plotly.react(id, figure.data, figure.layout, { responsive: true });
    };

    const renderTable = (node) => {
      let columns = node.columns.slice();
      let rows = node.rows.slice();
      const filters = {};
      const wrap = document.createElement('div');
      wrap.className = 'table-wrap';
      wrap.id = node.id;

      const matches = (row) => columns.every((column) => {
        const needle = (filters[column.id] || '').trim().toLowerCase();
        if (!needle) {
          return true;
        }
        const cell = row[column.id];
        return cell !== undefined && String(cell).toLowerCase().includes(needle);
      });

      const draw = () => {
        const table = document.createElement('table');
        const head = document.createElement('tr');
        columns.forEach((column) => {
          const th = document.createElement('th');
          th.textContent = column.name;
          if (column.deletable) {
            const del = document.createElement('button');
            del.textContent = '\u00d7';
            del.title = 'Delete column';
            del.addEventListener('click', () => {
              columns = columns.filter((c) => c.id !== column.id);
              rows = rows.map((r) => {
                const kept = Object.assign({}, r);
                delete kept[column.id];
                return kept;
              });
              draw();
              fire(node.id, rows);
            });
            th.prepend(del);
          }
          head.appendChild(th);
        });
        head.appendChild(document.createElement('th'));
        table.appendChild(head);

        if (node.filterable) {
          const filterRow = document.createElement('tr');
          filterRow.className = 'filter-row';
          columns.forEach((column) => {
            const td = document.createElement('td');
            const input = document.createElement('input');
            input.placeholder = 'filter data...';
            input.value = filters[column.id] || '';
            input.addEventListener('change', () => {
              filters[column.id] = input.value;
              draw();
            });
            td.appendChild(input);
            filterRow.appendChild(td);
          });
          filterRow.appendChild(document.createElement('td'));
          table.appendChild(filterRow);
        }

        rows.filter(matches).forEach((row) => {
          const tr = document.createElement('tr');
          columns.forEach((column) => {
            const td = document.createElement('td');
            const cell = row[column.id];
            td.textContent = cell === undefined || cell === null ? '' : cell;
            tr.appendChild(td);
          });
          const td = document.createElement('td');
          const del = document.createElement('button');
          del.textContent = '\u00d7';
          del.title = 'Delete row';
          del.addEventListener('click', () => {
            rows = rows.filter((r) => r !== row);
            draw();
            fire(node.id, rows);
          });
          td.appendChild(del);
          tr.appendChild(td);
          table.appendChild(tr);
        });

        wrap.replaceChildren(table);
      };

      draw();
      return wrap;
    };

    const render = (node, plots) => {
      switch (node.node) {
        case 'row':
        case 'column': {
          const el = document.createElement('div');
          el.className = node.node;
          if (node.node === 'column') {
            el.classList.add('col');
            el.style.width = `${(node.width / 12) * 100}%`;
          }
          node.children.forEach((child) => el.appendChild(render(child, plots)));
          return el;
        }
        case 'graph': {
          const el = document.createElement('div');
          el.id = node.id;
          plots.push(node);
          return el;
        }
        case 'dropdown': {
          const select = document.createElement('select');
          select.id = node.id;
          node.options.forEach((option) => {
            const el = document.createElement('option');
            el.value = option.value;
            el.textContent = option.label;
            el.selected = option.value === node.value;
            select.appendChild(el);
          });
          select.addEventListener('change', () => fire(node.id, select.value));
          return select;
        }
        case 'data_table':
          return renderTable(node);
        case 'placeholder': {
          const el = document.createElement('div');
          el.id = node.id;
          return el;
        }
        default:
          return document.createElement('div');
      }
    };

    const applyUpdate = (update) => {
      const target = document.getElementById(update.output);
      if (!target) {
        return;
      }
      if (update.figure) {
        plot(update.output, update.figure);
        return;
      }
      const plots = [];
      target.replaceChildren(render(update.children, plots));
      plots.forEach((graph) => plot(graph.id, graph.figure));
    };

    const setActiveTab = (value) => {
      tabs.forEach((button) => {
        const isActive = button.dataset.tab === value;
        button.classList.toggle('active', isActive);
        button.setAttribute('aria-selected', String(isActive));
      });
      fire('tabs', value);
    };

    tabs.forEach((button) => {
      button.addEventListener('click', () => setActiveTab(button.dataset.tab));
    });

    setActiveTab('{{INITIAL_TAB}}');
  </script>
</body>
</html>
"#;
