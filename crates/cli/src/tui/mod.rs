use std::io::{self, stdout, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use rowdeck_config::Settings;
use rowdeck_engine::row::RowId;
use rowdeck_engine::session::Session;
use rowdeck_engine::trigger::{sentinel_fraction, RevealTrigger, TriggerTuning};
use rowdeck_io::{sample, xlsx};

use crate::util;

/// Input mode: browsing, editing one cell, or editing one column filter.
enum Mode {
    Browse,
    EditCell { buffer: String },
    EditFilter { col: usize, buffer: String },
}

pub struct TuiApp {
    session: Session,
    trigger: RevealTrigger,
    /// (window, derived length) the trigger was last attached for. The
    /// sentinel moves whenever either changes, which re-arms the watch.
    sentinel_key: Option<(usize, usize)>,
    /// Cursor into the visible slice
    cursor_row: usize,
    cursor_col: usize,
    scroll_row: usize,
    scroll_col: usize,
    file_name: String,
    export_path: PathBuf,
    sample_rows: usize,
    initial_window: usize,
    should_quit: bool,
    show_help: bool,
    mode: Mode,
    col_widths: Vec<usize>,
    row_num_width: usize,
}

impl TuiApp {
    pub fn new(session: Session, file_name: String, settings: &Settings) -> Self {
        let export_path = default_export_path(&file_name);
        let mut app = Self {
            session,
            trigger: RevealTrigger::new(TriggerTuning {
                margin_rows: settings.trigger_margin_rows,
                threshold: settings.trigger_threshold,
            }),
            sentinel_key: None,
            cursor_row: 0,
            cursor_col: 0,
            scroll_row: 0,
            scroll_col: 0,
            file_name,
            export_path,
            sample_rows: settings.sample_rows,
            initial_window: settings.initial_window,
            should_quit: false,
            show_help: false,
            mode: Mode::Browse,
            col_widths: Vec::new(),
            row_num_width: 4,
        };
        app.refresh_layout();
        app
    }

    /// Recompute widths/gutter after the dataset changes.
    fn refresh_layout(&mut self) {
        let store = self.session.store();
        self.col_widths = util::column_widths(store.schema(), store.rows(), 200);
        let max_id = store.rows().iter().map(|r| r.id().0).max().unwrap_or(0);
        self.row_num_width = util::gutter_width(max_id);
    }

    fn clamp_cursor(&mut self) {
        let shown = self.session.visible().len();
        if shown == 0 {
            self.cursor_row = 0;
            self.scroll_row = 0;
        } else if self.cursor_row >= shown {
            self.cursor_row = shown - 1;
        }
        let cols = self.session.schema().len();
        if cols == 0 {
            self.cursor_col = 0;
        } else if self.cursor_col >= cols {
            self.cursor_col = cols - 1;
        }
    }

    fn cursor_target(&self) -> Option<(RowId, String)> {
        let idx = *self.session.visible().get(self.cursor_row)?;
        let row = self.session.store().row(idx)?;
        let column = self.session.schema().get(self.cursor_col)?;
        Some((row.id(), column.name.clone()))
    }

    fn cursor_value(&self) -> String {
        match self.cursor_target() {
            Some((id, column)) => self
                .session
                .store()
                .find(id)
                .map(|r| r.get(&column).to_string())
                .unwrap_or_default(),
            None => String::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Progressive reveal binding
    // -------------------------------------------------------------------------

    /// Apply a due advance, then feed the trigger the sentinel's visibility
    /// for this frame and schedule the next advance when it fires.
    fn drive_reveal(&mut self, viewport_rows: usize, now: Instant) {
        if self.session.tick(now) {
            log::debug!("reveal window advanced to {}", self.session.window_len());
        }

        let shown = self.session.visible().len();
        let derived = self.session.derived().len();
        let has_more = self.session.has_more();

        let key = (self.session.window_len(), derived);
        if self.sentinel_key != Some(key) {
            // Sentinel inserted, removed, or moved: re-establish the watch
            self.trigger.attach(has_more);
            self.sentinel_key = Some(key);
        }

        if !has_more {
            return;
        }

        // The sentinel sits one row past the revealed slice
        let fraction = sentinel_fraction(
            shown,
            self.scroll_row,
            viewport_rows,
            self.trigger.tuning().margin_rows,
        );
        if self
            .trigger
            .observe(fraction, has_more, self.session.is_loading())
            && self.session.request_advance(now)
        {
            log::debug!("reveal advance scheduled at {} of {} rows", shown, derived);
        }
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    fn handle_key(&mut self, key: KeyEvent) {
        if self.show_help {
            self.show_help = false;
            return;
        }
        let _ = self.session.take_notice();

        match &mut self.mode {
            Mode::Browse => self.handle_browse_key(key),
            Mode::EditCell { buffer } => match key.code {
                // Enter, Escape, and focus loss all commit
                KeyCode::Enter | KeyCode::Esc => {
                    let value = std::mem::take(buffer);
                    self.mode = Mode::Browse;
                    self.session.commit_edit(value);
                    self.clamp_cursor();
                }
                KeyCode::Backspace => {
                    buffer.pop();
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    buffer.push(c);
                }
                _ => {}
            },
            Mode::EditFilter { col, buffer } => {
                let col = *col;
                match key.code {
                    KeyCode::Enter | KeyCode::Esc => {
                        self.mode = Mode::Browse;
                    }
                    KeyCode::Backspace => {
                        buffer.pop();
                        let pattern = buffer.clone();
                        self.apply_filter(col, pattern);
                    }
                    KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                        buffer.push(c);
                        let pattern = buffer.clone();
                        self.apply_filter(col, pattern);
                    }
                    _ => {}
                }
            }
        }
    }

    /// Filter keystrokes re-derive immediately; the window reset puts the
    /// view back at the top.
    fn apply_filter(&mut self, col: usize, pattern: String) {
        let Some(column) = self.session.schema().get(col).map(|c| c.name.clone()) else {
            return;
        };
        self.session.set_filter(&column, pattern);
        self.cursor_row = 0;
        self.scroll_row = 0;
        self.clamp_cursor();
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1, 0),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1, 0),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(0, -1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(0, 1),
            KeyCode::PageUp => self.move_cursor(-20, 0),
            KeyCode::PageDown => self.move_cursor(20, 0),
            KeyCode::Home => self.cursor_row = 0,
            KeyCode::End => {
                let shown = self.session.visible().len();
                if shown > 0 {
                    self.cursor_row = shown - 1;
                }
            }
            KeyCode::Char('0') => self.cursor_col = 0,
            KeyCode::Char('$') => {
                let cols = self.session.schema().len();
                if cols > 0 {
                    self.cursor_col = cols - 1;
                }
            }
            KeyCode::Enter => self.begin_cell_edit(),
            KeyCode::Char('f') => self.begin_filter_edit(),
            KeyCode::Char('s') => {
                if let Some(column) = self.session.schema().get(self.cursor_col) {
                    let column = column.name.clone();
                    self.session.toggle_sort(&column);
                    self.cursor_row = 0;
                    self.scroll_row = 0;
                }
            }
            KeyCode::Char('n') => self.generate_sample(),
            KeyCode::Char('R') => {
                self.session.reset();
                self.clamp_cursor();
                self.session.set_notice("All edits reset");
            }
            KeyCode::Char('x') => self.export(),
            _ => {}
        }
    }

    fn move_cursor(&mut self, drow: i32, dcol: i32) {
        let shown = self.session.visible().len();
        let cols = self.session.schema().len();
        if shown == 0 || cols == 0 {
            return;
        }
        self.cursor_row = (self.cursor_row as i32 + drow).max(0).min(shown as i32 - 1) as usize;
        self.cursor_col = (self.cursor_col as i32 + dcol).max(0).min(cols as i32 - 1) as usize;
    }

    fn begin_cell_edit(&mut self) {
        let Some((id, column)) = self.cursor_target() else {
            return;
        };
        if self.session.begin_edit(id, &column) {
            let buffer = self.cursor_value();
            self.mode = Mode::EditCell { buffer };
        }
    }

    fn begin_filter_edit(&mut self) {
        let Some(column) = self.session.schema().get(self.cursor_col) else {
            return;
        };
        let buffer = self.session.filters().get(&column.name).to_string();
        self.mode = Mode::EditFilter {
            col: self.cursor_col,
            buffer,
        };
    }

    fn generate_sample(&mut self) {
        let rows = sample::generate(self.sample_rows);
        self.session.load(sample::schema(), rows);
        self.cursor_row = 0;
        self.cursor_col = 0;
        self.scroll_row = 0;
        self.scroll_col = 0;
        self.sentinel_key = None;
        self.refresh_layout();
        self.session
            .set_notice(format!("Generated {} sample rows", self.sample_rows));
        log::debug!("generated {} sample rows", self.sample_rows);
    }

    /// Export always serializes the full unfiltered, unsorted store.
    fn export(&mut self) {
        if self.session.store().is_empty() {
            self.session.set_notice("Nothing to export");
            return;
        }
        let store = self.session.store();
        let result = xlsx::export(store.schema(), store.rows(), &self.export_path);
        let row_count = store.len();
        match result {
            Ok(()) => {
                self.session.set_notice(format!(
                    "Exported {} rows to {}",
                    row_count,
                    self.export_path.display()
                ));
            }
            Err(e) => {
                log::warn!("export failed: {}", e);
                self.session.set_notice(format!("Export failed: {}", e));
            }
        }
    }

    // -------------------------------------------------------------------------
    // Scrolling
    // -------------------------------------------------------------------------

    fn ensure_visible(&mut self, viewport_rows: usize, area_width: u16) {
        if self.cursor_row < self.scroll_row {
            self.scroll_row = self.cursor_row;
        }
        if viewport_rows > 0 && self.cursor_row >= self.scroll_row + viewport_rows {
            self.scroll_row = self.cursor_row - viewport_rows + 1;
        }

        let available = (area_width as usize).saturating_sub(self.row_num_width + 1);
        if self.cursor_col < self.scroll_col {
            self.scroll_col = self.cursor_col;
        }
        while self.scroll_col < self.cursor_col {
            let vis = self.visible_columns(self.scroll_col, available);
            if vis.last().is_some_and(|&c| c >= self.cursor_col) {
                break;
            }
            self.scroll_col += 1;
        }
    }

    fn visible_columns(&self, start_col: usize, available: usize) -> Vec<usize> {
        let mut cols = Vec::new();
        let mut used = 0usize;
        for c in start_col..self.session.schema().len() {
            let w = self.col_widths.get(c).copied().unwrap_or(3) + 1;
            if used + w > available && !cols.is_empty() {
                break;
            }
            used += w;
            cols.push(c);
        }
        cols
    }

    // -------------------------------------------------------------------------
    // Drawing
    // -------------------------------------------------------------------------

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

        self.draw_title(frame, chunks[0]);
        self.draw_filter_bar(frame, chunks[1]);
        self.draw_grid(frame, chunks[2]);
        self.draw_status(frame, chunks[3]);

        if self.show_help {
            self.draw_help(frame, area);
        }
    }

    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let stats = self.session.stats();
        let title = format!(
            " rowdeck: {} | {} rows x {} cols ",
            self.file_name,
            stats.total,
            self.session.schema().len()
        );
        let para = Paragraph::new(Line::from(vec![Span::styled(
            title,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]))
        .style(Style::default().bg(Color::Cyan));
        frame.render_widget(para, area);
    }

    fn draw_filter_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(" ", Style::default())];

        if let Mode::EditFilter { col, buffer } = &self.mode {
            let name = self
                .session
                .schema()
                .get(*col)
                .map(|c| c.name.as_str())
                .unwrap_or("?");
            spans.push(Span::styled(
                format!("Filter {}: {}_", name, buffer),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            let mut any = false;
            for column in self.session.schema().columns() {
                let pattern = self.session.filters().get(&column.name);
                if !pattern.is_empty() {
                    spans.push(Span::styled(
                        format!("{}~{} ", column.name, pattern),
                        Style::default().fg(Color::Yellow),
                    ));
                    any = true;
                }
            }
            if !any {
                spans.push(Span::styled(
                    "no filters (f to filter current column)",
                    Style::default().fg(Color::DarkGray),
                ));
            }
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_grid(&self, frame: &mut Frame, area: Rect) {
        if self.session.store().is_empty() {
            let msg = Paragraph::new(
                "No data. Open a delimited file (rowdeck FILE) or press n to generate sample data.",
            )
            .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(msg, area);
            return;
        }

        let available = (area.width as usize).saturating_sub(self.row_num_width + 1);
        let vis_cols = self.visible_columns(self.scroll_col, available);

        let visible = self.session.visible();
        let shown = visible.len();
        let data_height = area.height.saturating_sub(1) as usize;
        let end_row = (self.scroll_row + data_height).min(shown);

        let mut lines: Vec<Line> = Vec::with_capacity(data_height + 1);
        lines.push(self.header_line(&vis_cols));

        for vr in self.scroll_row..end_row {
            lines.push(self.data_line(visible[vr], vr, &vis_cols));
        }

        // Sentinel/tail line when it falls inside the viewport
        let sentinel_row = shown;
        if sentinel_row >= self.scroll_row && sentinel_row < self.scroll_row + data_height {
            if self.session.has_more() {
                let text = if self.session.is_loading() {
                    "  . . .  Loading more records..."
                } else {
                    "  Scroll down to load more..."
                };
                lines.push(Line::from(Span::styled(
                    text,
                    Style::default().fg(Color::DarkGray),
                )));
            } else if self.session.stats().filtered > self.initial_window {
                lines.push(Line::from(Span::styled(
                    format!("  All {} records loaded", self.session.stats().filtered),
                    Style::default().fg(Color::Green),
                )));
            }
        }

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn header_line(&self, vis_cols: &[usize]) -> Line<'static> {
        let gutter_blank = " ".repeat(self.row_num_width);
        let mut spans = vec![Span::styled(
            format!("{} ", gutter_blank),
            Style::default().fg(Color::DarkGray),
        )];
        for &c in vis_cols {
            let column = self.session.schema().get(c);
            let name = column.map(|col| col.name.as_str()).unwrap_or("?");
            let arrow = column
                .and_then(|col| self.session.sort_indicator(&col.name))
                .map(|dir| match dir {
                    rowdeck_engine::view::SortDirection::Ascending => " ^",
                    rowdeck_engine::view::SortDirection::Descending => " v",
                })
                .unwrap_or("");
            let w = self.col_widths.get(c).copied().unwrap_or(3);
            let display = util::pad_right(&format!("{}{}", name, arrow), w);
            let style = if c == self.cursor_col {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            };
            spans.push(Span::styled(format!("{} ", display), style));
        }
        Line::from(spans)
    }

    fn data_line(&self, store_idx: usize, view_row: usize, vis_cols: &[usize]) -> Line<'static> {
        let row = &self.session.store().rows()[store_idx];
        let is_cursor_row = view_row == self.cursor_row;
        let is_modified = self.session.is_modified(row.id());

        let row_num_style = if is_cursor_row {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut spans = vec![Span::styled(
            format!("{:>width$} ", row.id(), width = self.row_num_width),
            row_num_style,
        )];

        let editing_here = |c: usize| {
            is_cursor_row
                && c == self.cursor_col
                && matches!(self.mode, Mode::EditCell { .. })
        };

        for &c in vis_cols {
            let w = self.col_widths.get(c).copied().unwrap_or(3);
            let name = self
                .session
                .schema()
                .get(c)
                .map(|col| col.name.as_str())
                .unwrap_or("");

            let (text, style) = if editing_here(c) {
                let Mode::EditCell { buffer } = &self.mode else {
                    unreachable!()
                };
                (
                    format!("{}_", buffer),
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                let style = if is_cursor_row && c == self.cursor_col {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else if is_modified {
                    Style::default().fg(Color::Yellow)
                } else if is_cursor_row {
                    Style::default().fg(Color::White)
                } else {
                    Style::default().fg(Color::Gray)
                };
                (row.get(name).to_string(), style)
            };

            spans.push(Span::styled(
                format!("{} ", util::pad_right(&text, w)),
                style,
            ));
        }
        Line::from(spans)
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let stats = self.session.stats();

        let left = if let Some(notice) = self.session.notice() {
            format!(" {}", notice)
        } else {
            let col_name = self
                .session
                .schema()
                .get(self.cursor_col)
                .map(|c| c.name.as_str())
                .unwrap_or("?");
            format!(" {} = {:?}", col_name, self.cursor_value())
        };

        let loading = if self.session.is_loading() {
            "  loading..."
        } else {
            ""
        };
        let right = format!(
            "Total {}  Filtered {}  Modified {}  Showing {}/{}{}  ?: help ",
            stats.total, stats.filtered, stats.modified, stats.shown, stats.filtered, loading
        );

        let padding = (area.width as usize)
            .saturating_sub(left.chars().count() + right.chars().count());
        let status = format!("{}{:pad$}{}", left, "", right, pad = padding);

        let para = Paragraph::new(Line::from(vec![Span::styled(
            status,
            Style::default().fg(Color::Black).bg(Color::DarkGray),
        )]))
        .style(Style::default().bg(Color::DarkGray));
        frame.render_widget(para, area);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let help_lines = [
            "",
            "  Navigation",
            "  ----------",
            "  arrows / hjkl    Move cursor",
            "  PgUp / PgDn      Page up/down",
            "  Home / End       First/last shown row",
            "  0 / $            First/last column",
            "",
            "  Data",
            "  ----",
            "  Enter            Edit cell (Enter/Esc commits)",
            "  f                Filter current column (live)",
            "  s                Sort current column (toggles)",
            "  n                Generate sample data",
            "  R                Reset all edits",
            "  x                Export .xlsx (all rows)",
            "",
            "  General",
            "  -------",
            "  q / Esc          Quit",
            "  ?                Toggle this help",
            "",
        ];
        let help_width: u16 = 46;
        let help_height: u16 = help_lines.len() as u16;

        let x = area.width.saturating_sub(help_width) / 2;
        let y = area.height.saturating_sub(help_height) / 2;
        let popup = Rect::new(
            area.x + x,
            area.y + y,
            help_width.min(area.width),
            help_height.min(area.height),
        );

        let lines: Vec<Line> = help_lines
            .iter()
            .map(|s| Line::from(Span::styled(*s, Style::default().fg(Color::White))))
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Keybindings ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .style(Style::default().bg(Color::Black));

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

fn default_export_path(file_name: &str) -> PathBuf {
    let stem = std::path::Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("data");
    PathBuf::from(format!("{}_edited.xlsx", stem))
}

/// Run the interactive editor until the user quits.
pub fn run(session: Session, file_name: String, settings: &Settings) -> Result<(), String> {
    let mut app = TuiApp::new(session, file_name, settings);

    terminal::enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {}", e))?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| format!("failed to enter alternate screen: {}", e))?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("failed to create terminal: {}", e))?;

    loop {
        let term_size = terminal
            .size()
            .map(|s| Rect::new(0, 0, s.width, s.height))
            .unwrap_or_default();
        // Chrome: title + filter bar + status + grid header
        let viewport_rows = term_size.height.saturating_sub(4) as usize;

        app.drive_reveal(viewport_rows, Instant::now());
        app.ensure_visible(viewport_rows, term_size.width);

        terminal
            .draw(|frame| app.draw(frame))
            .map_err(|e| format!("draw error: {}", e))?;

        if event::poll(Duration::from_millis(100)).map_err(|e| format!("event poll error: {}", e))?
        {
            if let Event::Key(key) =
                event::read().map_err(|e| format!("event read error: {}", e))?
            {
                app.handle_key(key);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Print the first `max_rows` store rows as a plain text table (no TUI).
/// 0 means all rows.
pub fn print_plain(session: &Session, max_rows: usize) -> Result<(), String> {
    let store = session.store();
    let schema = store.schema();
    let widths = util::column_widths(schema, store.rows(), 200);
    let gutter = util::gutter_width(store.rows().iter().map(|r| r.id().0).max().unwrap_or(0));
    let limit = if max_rows == 0 {
        store.len()
    } else {
        max_rows.min(store.len())
    };

    let out = io::stdout();
    let mut w = out.lock();

    write!(w, "{:>width$} ", "", width = gutter).map_err(|e| e.to_string())?;
    for (c, name) in schema.names().enumerate() {
        let cw = widths.get(c).copied().unwrap_or(3);
        write!(w, "{} ", util::pad_right(name, cw)).map_err(|e| e.to_string())?;
    }
    writeln!(w).map_err(|e| e.to_string())?;

    write!(w, "{:->width$}-", "", width = gutter).map_err(|e| e.to_string())?;
    for (c, _) in schema.names().enumerate() {
        let cw = widths.get(c).copied().unwrap_or(3);
        write!(w, "{}-", "-".repeat(cw)).map_err(|e| e.to_string())?;
    }
    writeln!(w).map_err(|e| e.to_string())?;

    for row in store.rows().iter().take(limit) {
        write!(w, "{:>width$} ", row.id(), width = gutter).map_err(|e| e.to_string())?;
        for (c, name) in schema.names().enumerate() {
            let cw = widths.get(c).copied().unwrap_or(3);
            write!(w, "{} ", util::pad_right(row.get(name), cw)).map_err(|e| e.to_string())?;
        }
        writeln!(w).map_err(|e| e.to_string())?;
    }

    if limit < store.len() {
        writeln!(w, "... ({} more rows)", store.len() - limit).map_err(|e| e.to_string())?;
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
