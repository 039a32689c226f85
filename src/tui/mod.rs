use crate::catalog::InformationSchemaCatalog;
use crate::db::SqlExecutor;
use crate::record::{Fields, Record, RowLike};
use crate::registry::TableRegistry;
use crate::store::GenericStore;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Row, Table, TableState},
};
use std::collections::BTreeSet;
use std::io;

#[derive(Debug, PartialEq)]
pub enum AppState {
    TableList,
    TableRows,
}

pub struct App<E: SqlExecutor> {
    pub state: AppState,
    pub executor: E,
    pub namespace: String,
    pub registry: TableRegistry,
    pub tables: Vec<String>,
    pub tables_list_state: ListState,
    /// Indexes into `tables` marked with space
    pub selected: BTreeSet<usize>,
    pub current_table: Option<String>,
    pub rows: Vec<Record>,
    pub rows_state: TableState,
    pub error_message: Option<String>,
    pub status: Option<String>,
}

impl<E: SqlExecutor> App<E> {
    /// Builds the app around an already loaded registry.
    pub fn new(executor: E, registry: TableRegistry, namespace: impl Into<String>) -> App<E> {
        let mut app = App {
            state: AppState::TableList,
            executor,
            namespace: namespace.into(),
            registry,
            tables: Vec::new(),
            tables_list_state: ListState::default(),
            selected: BTreeSet::new(),
            current_table: None,
            rows: Vec::new(),
            rows_state: TableState::default(),
            error_message: None,
            status: None,
        };
        app.refresh_tables();
        app
    }

    fn refresh_tables(&mut self) {
        self.tables = self.registry.table_names();
        self.selected.clear();
        self.tables_list_state
            .select(if self.tables.is_empty() { None } else { Some(0) });
        self.status = Some(format!("{} tables in {}", self.tables.len(), self.namespace));
    }

    /// Re-reads the catalog. On failure the previous tables stay listed.
    pub async fn reload_catalog(&mut self) {
        let catalog = InformationSchemaCatalog::new(&self.executor, self.namespace.clone());
        match self.registry.reload(&catalog).await {
            Ok(()) => {
                self.error_message = None;
                self.refresh_tables();
            }
            Err(e) => self.report(e),
        }
    }

    pub async fn open_selected_table(&mut self) {
        let Some(table) = self
            .tables_list_state
            .selected()
            .and_then(|i| self.tables.get(i))
            .cloned()
        else {
            return;
        };

        let store = GenericStore::new(&self.executor, &self.registry, self.namespace.clone());
        match store.read_all(&table, &Fields::new()).await {
            Ok(rows) => {
                self.rows_state
                    .select(if rows.is_empty() { None } else { Some(0) });
                self.status = Some(format!("{}: {} rows", table, rows.len()));
                self.rows = rows;
                self.current_table = Some(table);
                self.error_message = None;
                self.state = AppState::TableRows;
            }
            Err(e) => self.report(e),
        }
    }

    /// Deletes the highlighted row by identity.
    pub async fn delete_selected_row(&mut self) {
        let (Some(table), Some(index)) = (self.current_table.clone(), self.rows_state.selected())
        else {
            return;
        };
        let Some(id) = self.rows.get(index).and_then(|r| r.identity()).cloned() else {
            self.error_message = Some(format!("Rows of {} have no id to delete by", table));
            return;
        };

        let store = GenericStore::new(&self.executor, &self.registry, self.namespace.clone());
        match store.delete(&table, &id).await {
            Ok(()) => {
                self.rows.remove(index);
                if self.rows.is_empty() {
                    self.rows_state.select(None);
                } else if index >= self.rows.len() {
                    self.rows_state.select(Some(self.rows.len() - 1));
                }
                self.status = Some(format!("Deleted row {} from {}", id, table));
                self.error_message = None;
            }
            Err(e) => self.report(e),
        }
    }

    // Failures during browsing are shown, never fatal
    fn report(&mut self, e: crate::error::Error) {
        tracing::warn!(error = %e, "operation failed");
        self.error_message = Some(e.to_string());
    }

    pub fn back_to_tables(&mut self) {
        self.state = AppState::TableList;
        self.current_table = None;
        self.rows.clear();
        self.rows_state.select(None);
    }

    pub fn toggle_selected(&mut self) {
        if let Some(i) = self.tables_list_state.selected()
            && !self.selected.remove(&i)
        {
            self.selected.insert(i);
        }
    }

    pub fn next_table(&mut self) {
        self.tables_list_state
            .select(step(self.tables_list_state.selected(), self.tables.len(), true));
    }

    pub fn previous_table(&mut self) {
        self.tables_list_state
            .select(step(self.tables_list_state.selected(), self.tables.len(), false));
    }

    pub fn next_row(&mut self) {
        self.rows_state
            .select(step(self.rows_state.selected(), self.rows.len(), true));
    }

    pub fn previous_row(&mut self) {
        self.rows_state
            .select(step(self.rows_state.selected(), self.rows.len(), false));
    }

    /// Handles one key press. Returns false when the app should exit.
    pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('q')
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            return false;
        }

        match self.state {
            AppState::TableList => match key.code {
                KeyCode::Down | KeyCode::Char('j') => self.next_table(),
                KeyCode::Up | KeyCode::Char('k') => self.previous_table(),
                KeyCode::Char(' ') => self.toggle_selected(),
                KeyCode::Enter => self.open_selected_table().await,
                KeyCode::Char('r') => self.reload_catalog().await,
                KeyCode::Esc => return false,
                _ => {}
            },
            AppState::TableRows => match key.code {
                KeyCode::Down | KeyCode::Char('j') => self.next_row(),
                KeyCode::Up | KeyCode::Char('k') => self.previous_row(),
                KeyCode::Char('d') => self.delete_selected_row().await,
                KeyCode::Esc | KeyCode::Char('t') => self.back_to_tables(),
                _ => {}
            },
        }
        true
    }
}

/// Moves a list cursor one step, wrapping at both ends.
fn step(current: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match (current, forward) {
        (None, _) => 0,
        (Some(i), true) if i + 1 >= len => 0,
        (Some(i), true) => i + 1,
        (Some(0), false) => len - 1,
        (Some(i), false) => i - 1,
    })
}

pub async fn run_app<B: Backend, E: SqlExecutor>(
    terminal: &mut Terminal<B>,
    mut app: App<E>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, &mut app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && !app.handle_key(key).await
        {
            return Ok(());
        }
    }
}

fn ui<E: SqlExecutor>(f: &mut Frame, app: &mut App<E>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());

    // Errors take the status line over
    let status = match (&app.error_message, &app.status) {
        (Some(error), _) => Text::styled(error.as_str(), Style::default().fg(Color::Red)),
        (None, Some(status)) => Text::styled(status.as_str(), Style::default().fg(Color::Green)),
        (None, None) => Text::raw(""),
    };
    f.render_widget(Paragraph::new(status), chunks[0]);

    let help = match app.state {
        AppState::TableList => {
            "↑↓/jk navigate, space mark, Enter open, 'r' reload schema, 'q' quit"
        }
        AppState::TableRows => "↑↓/jk navigate, 'd' delete row, ESC/'t' back to tables, 'q' quit",
    };
    f.render_widget(
        Paragraph::new(Span::raw(help)).style(Style::default().add_modifier(Modifier::ITALIC)),
        chunks[2],
    );

    match app.state {
        AppState::TableList => render_table_list(f, app, chunks[1]),
        AppState::TableRows => render_table_rows(f, app, chunks[1]),
    }
}

fn render_table_list<E: SqlExecutor>(f: &mut Frame, app: &mut App<E>, area: Rect) {
    let items: Vec<ListItem> = app
        .tables
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mark = if app.selected.contains(&i) { "y" } else { " " };
            let columns = app.registry.get(name).map_or(0, |t| t.schema().len());
            ListItem::new(format!("[{}] {} ({} columns)", mark, name, columns))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("What table are you working on?"),
        )
        .highlight_style(
            Style::default()
                .bg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, &mut app.tables_list_state);
}

fn render_table_rows<E: SqlExecutor>(f: &mut Frame, app: &mut App<E>, area: Rect) {
    let Some(template) = app
        .current_table
        .as_deref()
        .and_then(|t| app.registry.get(t))
    else {
        return;
    };
    let columns = template.columns();

    let header_names = Row::new(columns.iter().map(|c| Span::raw(c.to_string())))
        .style(Style::default().add_modifier(Modifier::BOLD));
    let header_types = Row::new(
        columns
            .iter()
            .map(|c| Span::raw(template.column_type(c).unwrap_or("").to_string())),
    )
    .style(Style::default().add_modifier(Modifier::ITALIC));

    let rows: Vec<Row> = app
        .rows
        .iter()
        .map(|record| {
            Row::new(columns.iter().map(|c| {
                record
                    .get(c)
                    .map(|v| v.to_string())
                    .unwrap_or_default()
            }))
        })
        .collect();

    let widths: Vec<Constraint> = columns
        .iter()
        .map(|_| Constraint::Percentage(100 / columns.len().max(1) as u16))
        .collect();

    let table = Table::new(rows, widths)
        .header(header_names)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Table: {}", template.table_of())),
        )
        .row_highlight_style(Style::default().bg(Color::LightBlue));

    // The type row sits above the data as a one-line table of its own
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    let type_widths: Vec<Constraint> = columns
        .iter()
        .map(|_| Constraint::Percentage(100 / columns.len().max(1) as u16))
        .collect();
    f.render_widget(
        Table::new(vec![header_types], type_widths).block(Block::default().borders(Borders::NONE)),
        parts[0],
    );
    f.render_stateful_widget(table, parts[1], &mut app.rows_state);
}
