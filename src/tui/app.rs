//! Main application logic for the terminal user interface.
//!
//! `App` owns the [`TaskStore`] and redraws from a view cache that an
//! observer on the store rebuilds after every change. The screen holds the
//! task tree, the agenda for the selected range mode, and the burndown chart.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Clear, Dataset, GraphType, List, ListItem, ListState,
        Paragraph, Row, Table, TableState, Wrap,
    },
    Frame, Terminal,
};
use tracing::debug;

use crate::burndown::{summarize, BurndownPoint, DateAxis};
use crate::dates::{format_due_relative, short_day};
use crate::fields::RangeMode;
use crate::store::TaskStore;
use crate::task::TaskId;
use crate::tree::Forest;
use crate::tui::{
    colors::{DARK_GREEN, DARK_PURPLE, DARK_RED, GOLD, IDEAL_GRAY},
    enums::{AppState, Focus},
    utils::centered_rect,
};

/// One line of the task tree.
#[derive(Debug, Clone, PartialEq)]
struct TreeRow {
    id: TaskId,
    depth: usize,
    name: String,
    estimate: f64,
    due: Option<NaiveDate>,
    completed: Option<NaiveDate>,
    leaf: bool,
}

/// Everything the screen derives from the store.
#[derive(Debug, Clone, Default)]
struct ViewCache {
    version: u64,
    rows: Vec<TreeRow>,
    points: Vec<BurndownPoint>,
}

impl ViewCache {
    fn build(version: u64, forest: &Forest, axis: &DateAxis) -> Self {
        let rows = forest
            .walk()
            .into_iter()
            .map(|(depth, t)| {
                let leaf = forest.is_leaf(t.id);
                TreeRow {
                    id: t.id,
                    depth,
                    name: t.name.clone(),
                    estimate: if leaf { t.estimate } else { forest.subtree_estimate(t.id) },
                    due: t.due_on_day,
                    completed: t.completed_on_day,
                    leaf,
                }
            })
            .collect();
        ViewCache {
            version,
            rows,
            points: forest.burndown(axis),
        }
    }
}

fn clamp(len: usize, selected: Option<usize>) -> Option<usize> {
    match (len, selected) {
        (0, _) => None,
        (n, Some(i)) => Some(i.min(n - 1)),
        (_, None) => Some(0),
    }
}

fn step(len: usize, selected: Option<usize>, down: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = selected.unwrap_or(0);
    Some(if down {
        (current + 1).min(len - 1)
    } else {
        current.saturating_sub(1)
    })
}

/// Main application state for the terminal user interface.
pub struct App {
    state: AppState,
    store: TaskStore,
    cache: Rc<RefCell<ViewCache>>,
    today: NaiveDate,
    focus: Focus,
    task_list_state: TableState,
    agenda_state: ListState,
    agenda_mode: RangeMode,
    status_message: String,
    confirm_action: Option<(TaskId, String)>,
}

impl App {
    /// Take ownership of `store` and start following its changes.
    pub fn new(mut store: TaskStore, today: NaiveDate) -> Self {
        let cache = Rc::new(RefCell::new(ViewCache::build(
            store.version(),
            store.forest(),
            store.axis(),
        )));
        let sink = Rc::clone(&cache);
        store.subscribe(move |change| {
            *sink.borrow_mut() = ViewCache::build(change.version, change.forest, change.axis);
        });

        let mut app = App {
            state: AppState::TaskList,
            store,
            cache,
            today,
            focus: Focus::Tree,
            task_list_state: TableState::default(),
            agenda_state: ListState::default(),
            agenda_mode: RangeMode::UntilToday,
            status_message: String::new(),
            confirm_action: None,
        };
        app.clamp_selection();
        app
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn agenda_mode(&self) -> RangeMode {
        self.agenda_mode
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    fn agenda_ids(&self) -> Vec<TaskId> {
        self.store
            .tasks_in_range(self.agenda_mode, self.today)
            .iter()
            .map(|t| t.id)
            .collect()
    }

    fn clamp_selection(&mut self) {
        let rows = self.cache.borrow().rows.len();
        let tree = clamp(rows, self.task_list_state.selected());
        self.task_list_state.select(tree);
        let agenda = clamp(self.agenda_ids().len(), self.agenda_state.selected());
        self.agenda_state.select(agenda);
    }

    /// Id of the task under the cursor in the focused pane.
    pub fn selected_task(&self) -> Option<TaskId> {
        match self.focus {
            Focus::Tree => {
                let i = self.task_list_state.selected()?;
                self.cache.borrow().rows.get(i).map(|r| r.id)
            }
            Focus::Agenda => {
                let i = self.agenda_state.selected()?;
                self.agenda_ids().get(i).copied()
            }
        }
    }

    fn move_selection(&mut self, down: bool) {
        let len = match self.focus {
            Focus::Tree => self.cache.borrow().rows.len(),
            Focus::Agenda => self.agenda_ids().len(),
        };
        let current = match self.focus {
            Focus::Tree => self.task_list_state.selected(),
            Focus::Agenda => self.agenda_state.selected(),
        };
        let next = step(len, current, down);
        match self.focus {
            Focus::Tree => self.task_list_state.select(next),
            Focus::Agenda => self.agenda_state.select(next),
        }
    }

    fn toggle_completion(&mut self) {
        let Some(id) = self.selected_task() else {
            return;
        };
        if !self.store.forest().is_leaf(id) {
            self.set_status_message("Only leaf tasks can be completed");
            return;
        }
        let done = self
            .store
            .forest()
            .find_by_id(id)
            .is_some_and(|t| t.is_complete());
        let completed = if done { None } else { Some(self.today) };
        self.store.update_completed_on_day(id, completed);
        self.set_status_message(if done { "Task reopened" } else { "Task completed" });
    }

    fn request_delete(&mut self) {
        let Some(id) = self.selected_task() else {
            return;
        };
        let Some(task) = self.store.forest().find_by_id(id) else {
            return;
        };
        let below = self.store.forest().descendant_count(id);
        let action = if below == 0 {
            format!("Delete '{}'", task.name)
        } else {
            format!("Delete '{}' and {} subtask(s)", task.name, below)
        };
        self.confirm_action = Some((id, action));
        self.state = AppState::Confirm;
    }

    fn change_days(&mut self, delta: i64) {
        let days = self.store.axis().days as i64 + delta;
        match self.store.set_axis_days(days) {
            Ok(()) => self.set_status_message(format!("Range: {} days", self.store.axis().days)),
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    fn shift_start(&mut self, offset: i64) {
        match self.store.axis().shifted(offset) {
            Ok(axis) => self.store.set_axis(axis),
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    fn start_today(&mut self) {
        if let Err(e) = self.store.set_axis_start(self.today) {
            self.set_status_message(e.to_string());
        }
    }

    fn handle_task_list_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Tab => self.focus = self.focus.toggle(),
            KeyCode::Char('c') | KeyCode::Char(' ') => self.toggle_completion(),
            KeyCode::Char('d') => self.request_delete(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.change_days(1),
            KeyCode::Char('-') => self.change_days(-1),
            KeyCode::Char('[') => self.shift_start(-1),
            KeyCode::Char(']') => self.shift_start(1),
            KeyCode::Char('t') => self.start_today(),
            KeyCode::Char('m') => {
                self.agenda_mode = self.agenda_mode.next();
                self.agenda_state.select(None);
            }
            KeyCode::Char('h') | KeyCode::Char('?') | KeyCode::F(1) => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    fn handle_confirm_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Some((id, _)) = self.confirm_action.take() {
                    let removed = self.store.delete_task(id);
                    debug!(task_id = id, removed, "deleted from ui");
                    self.set_status_message(format!("Deleted {removed} task(s)"));
                }
                self.state = AppState::TaskList;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_action = None;
                self.state = AppState::TaskList;
            }
            _ => {}
        }
    }

    /// Apply one key press. Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        self.status_message.clear();
        let quit = match self.state {
            AppState::TaskList => self.handle_task_list_input(key, modifiers),
            AppState::Help => {
                self.state = AppState::TaskList;
                false
            }
            AppState::Confirm => {
                self.handle_confirm_input(key);
                false
            }
        };
        self.clamp_selection();
        quit
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key.code, key.modifiers));
                }
            }
        }
        Ok(false)
    }

    fn render_tree(&mut self, f: &mut Frame, area: Rect) {
        let cache = Rc::clone(&self.cache);
        let cache = cache.borrow();
        let today = self.today;

        let header = Row::new(["ID", "Est", "Due", "Task"].map(|h| {
            Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))
        }))
        .style(Style::default().bg(GOLD).fg(Color::Rgb(20, 20, 20)))
        .height(1);

        let rows: Vec<Row> = cache
            .rows
            .iter()
            .map(|r| {
                let style = if !r.leaf {
                    Style::default().add_modifier(Modifier::BOLD)
                } else if r.completed.is_some() {
                    Style::default().fg(DARK_GREEN)
                } else if r.due.is_some_and(|d| d < today) {
                    Style::default().fg(Color::LightRed)
                } else {
                    Style::default().fg(Color::White)
                };
                let mark = match (r.leaf, r.completed.is_some()) {
                    (false, _) => "",
                    (true, true) => "[x] ",
                    (true, false) => "[ ] ",
                };
                let estimate = if r.leaf {
                    format!("{}", r.estimate)
                } else {
                    format!("({})", r.estimate)
                };
                let due = if r.leaf { format_due_relative(r.due, today) } else { String::new() };
                Row::new(vec![
                    Cell::from(r.id.to_string()),
                    Cell::from(estimate),
                    Cell::from(due),
                    Cell::from(format!("{}{}{}", "  ".repeat(r.depth), mark, r.name)),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(4),
            Constraint::Length(7),
            Constraint::Length(10),
            Constraint::Min(20),
        ];

        let border = if self.focus == Focus::Tree { GOLD } else { Color::DarkGray };
        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border))
                    .title(format!("Tasks ({}) - Press 'h' for help", cache.rows.len())),
            )
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.task_list_state);
    }

    fn render_agenda(&mut self, f: &mut Frame, area: Rect) {
        let today = self.today;
        let forest = self.store.forest();
        let items: Vec<ListItem> = self
            .store
            .tasks_in_range(self.agenda_mode, today)
            .into_iter()
            .map(|t| {
                let path = forest.ancestor_chain(t.id);
                let style = if t.is_complete() {
                    Style::default().fg(DARK_GREEN)
                } else if t.due_on_day.is_some_and(|d| d < today) {
                    Style::default().fg(Color::LightRed)
                } else {
                    Style::default()
                };
                let mut spans = vec![Span::styled(
                    format!("{:<10} ", format_due_relative(t.due_on_day, today)),
                    Style::default().fg(Color::Cyan),
                )];
                if !path.is_empty() {
                    spans.push(Span::styled(
                        format!("{} > ", path.join(" > ")),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                spans.push(Span::styled(t.name.clone(), style));
                ListItem::new(Line::from(spans))
            })
            .collect();

        let border = if self.focus == Focus::Agenda { GOLD } else { Color::DarkGray };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border))
                    .title(format!("{} - 'm' to switch", self.agenda_mode.label())),
            )
            .highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(list, area, &mut self.agenda_state);
    }

    fn render_chart(&self, f: &mut Frame, area: Rect) {
        let cache = self.cache.borrow();
        let axis = self.store.axis();
        let points = &cache.points;

        let series = |pick: fn(&BurndownPoint) -> f64| -> Vec<(f64, f64)> {
            points
                .iter()
                .enumerate()
                .map(|(i, p)| (i as f64, pick(p)))
                .collect()
        };
        let ideal = series(|p| p.ideal_remaining);
        let actual = series(|p| p.actual_remaining);
        let due = series(|p| p.due_remaining);

        let datasets = vec![
            Dataset::default()
                .name("ideal")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(IDEAL_GRAY))
                .data(&ideal),
            Dataset::default()
                .name("due")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(DARK_PURPLE))
                .data(&due),
            Dataset::default()
                .name("actual")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(GOLD))
                .data(&actual),
        ];

        let total = points.first().map_or(0.0, |p| p.ideal_remaining);
        let last = points.len().saturating_sub(1);
        let mid = axis.start + chrono::Days::new(last as u64 / 2);
        let x_labels = vec![
            Span::raw(short_day(axis.start)),
            Span::raw(short_day(mid)),
            Span::raw(short_day(axis.end())),
        ];
        let y_top = if total > 0.0 { total } else { 1.0 };
        let y_labels = vec![
            Span::raw("0"),
            Span::raw(format!("{:.1}", y_top / 2.0)),
            Span::raw(format!("{y_top:.1}")),
        ];

        let title = match summarize(points, self.today) {
            Some(s) => format!(
                "Burndown {} .. {} - {:.2} of {:.2} left",
                axis.start,
                axis.end(),
                s.remaining,
                s.total
            ),
            None => "Burndown".to_string(),
        };

        let chart = Chart::new(datasets)
            .block(Block::default().borders(Borders::ALL).title(title))
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(Color::Gray))
                    .bounds([0.0, last.max(1) as f64])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(Color::Gray))
                    .bounds([0.0, y_top])
                    .labels(y_labels),
            );

        f.render_widget(chart, area);
    }

    fn render_help(&mut self, f: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(vec![Span::styled("Sprint Help", bold)]),
            Line::from(""),
            Line::from(vec![Span::styled("Tasks:", bold)]),
            Line::from("  ↑/k, ↓/j     Move selection"),
            Line::from("  Tab          Switch between tree and agenda"),
            Line::from("  c/Space      Toggle completion (today)"),
            Line::from("  d            Delete selected task and its subtasks"),
            Line::from("  m            Cycle agenda: today, until today, from today"),
            Line::from(""),
            Line::from(vec![Span::styled("Burndown range:", bold)]),
            Line::from("  +/-          One day longer/shorter"),
            Line::from("  [/]          Move start one day back/forward"),
            Line::from("  t            Start today"),
            Line::from(""),
            Line::from("  h/?/F1       Show this help"),
            Line::from("  q/Ctrl+C/Esc Quit"),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Help - Press any key to return"),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, area);
    }

    fn render_confirm(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "Are you sure you want to:",
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(self.confirm_action.as_ref().map_or("", |(_, a)| a.as_str()).to_string()),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            let axis = self.store.axis();
            format!(
                "Today {} | Range {} days from {} | Press 'h' for help",
                self.today, axis.days, axis.start
            )
        };
        let status = Paragraph::new(status_text)
            .style(Style::default().bg(GOLD).fg(Color::Rgb(20, 20, 20)))
            .alignment(Alignment::Left);

        f.render_widget(status, area);
    }

    /// Draw the whole screen.
    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        if self.state == AppState::Help {
            self.render_help(f, chunks[0]);
        } else {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[0]);
            let right = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(columns[1]);

            self.render_tree(f, columns[0]);
            self.render_chart(f, right[0]);
            self.render_agenda(f, right[1]);
            if self.state == AppState::Confirm {
                self.render_confirm(f, chunks[0]);
            }
        }

        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop for the TUI application.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }

    #[cfg(test)]
    fn cached_version(&self) -> u64 {
        self.cache.borrow().version
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    fn app() -> App {
        let mut store = TaskStore::new(Forest::new(), DateAxis::new(day(1), 5).unwrap());
        let sprint = store.add_leaf("Sprint", 1.0, None, Some(day(5))).unwrap().unwrap();
        store.add_leaf("Login", 3.0, Some(sprint), Some(day(2))).unwrap();
        store.add_leaf("Logout", 2.0, Some(sprint), Some(day(4))).unwrap();
        App::new(store, day(3))
    }

    fn press(app: &mut App, keys: &str) {
        for c in keys.chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 32)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn completion_toggles_on_leaves_only() {
        let mut app = app();
        assert_eq!(app.selected_task(), Some(1));
        press(&mut app, "c");
        assert_eq!(app.status_message(), "Only leaf tasks can be completed");

        press(&mut app, "jc");
        let login = app.store().forest().find_by_id(2).unwrap();
        assert_eq!(login.completed_on_day, Some(day(3)));
        assert_eq!(app.cached_version(), app.store().version());

        press(&mut app, "c");
        assert!(!app.store().forest().find_by_id(2).unwrap().is_complete());
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut app = app();
        press(&mut app, "d");
        assert_eq!(app.state(), AppState::Confirm);
        press(&mut app, "n");
        assert_eq!(app.store().forest().len(), 3);

        press(&mut app, "dy");
        assert_eq!(app.state(), AppState::TaskList);
        assert!(app.store().forest().is_empty());
        assert_eq!(app.selected_task(), None);
    }

    #[test]
    fn range_keys_move_the_axis() {
        let mut app = app();
        press(&mut app, "++");
        assert_eq!(app.store().axis().days, 7);
        press(&mut app, "]");
        assert_eq!(app.store().axis().start, day(2));
        press(&mut app, "t");
        assert_eq!(app.store().axis().start, day(3));
        for _ in 0..10 {
            press(&mut app, "-");
        }
        assert_eq!(app.store().axis().days, 1);
        assert!(!app.status_message().is_empty());
        assert_eq!(app.cached_version(), app.store().version());
    }

    #[test]
    fn agenda_mode_cycles_and_focus_switches() {
        let mut app = app();
        assert_eq!(app.agenda_mode(), RangeMode::UntilToday);
        // Login is overdue on the 3rd; Logout is not due yet.
        app.handle_key(KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(app.selected_task(), Some(2));
        press(&mut app, "m");
        assert_eq!(app.agenda_mode(), RangeMode::FromToday);
        assert_eq!(app.selected_task(), Some(3));
    }

    #[test]
    fn selection_moves_within_each_pane() {
        let mut app = app();
        press(&mut app, "jjjj");
        assert_eq!(app.selected_task(), Some(3));
        press(&mut app, "kkkk");
        assert_eq!(app.selected_task(), Some(1));

        app.handle_key(KeyCode::Tab, KeyModifiers::NONE);
        press(&mut app, "m");
        app.store.add_leaf("Later", 1.0, None, Some(day(9))).unwrap();
        press(&mut app, "j");
        assert_eq!(app.selected_task(), Some(4));
        app.handle_key(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(app.selected_task(), Some(3));
        assert_eq!(step(0, Some(2), true), None);
    }

    #[test]
    fn quit_keys() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        press(&mut app, "h");
        assert_eq!(app.state(), AppState::Help);
        assert!(!app.handle_key(KeyCode::Char('q'), KeyModifiers::NONE));
        assert_eq!(app.state(), AppState::TaskList);
    }

    #[test]
    fn screen_shows_tree_chart_and_agenda() {
        let mut app = app();
        let text = screen(&mut app);
        assert!(text.contains("Tasks (3)"));
        assert!(text.contains("Sprint"));
        assert!(text.contains("[ ] Login"));
        assert!(text.contains("Burndown 2024-04-01 .. 2024-04-05"));
        assert!(text.contains("Until today"));
        assert!(text.contains("Sprint > Login"));

        press(&mut app, "d");
        assert!(screen(&mut app).contains("Delete 'Sprint' and 2 subtask(s)"));
    }
}
