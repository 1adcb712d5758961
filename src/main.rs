use std::io;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Sparkline, Tabs};

use injury_terminal::artifacts::{self, Resources};
use injury_terminal::inputs::{WidgetSpec, format_label};
use injury_terminal::pipeline::RiskLabel;
use injury_terminal::recommend::Severity;
use injury_terminal::state::{
    AppState, FIXED_ROWS, ROW_INJURIES, ROW_NAME, ROW_POSITION, ReportTab, TAB_ORDER,
};
use injury_terminal::{news, report};

struct App {
    state: AppState,
    resources: &'static Resources,
    should_quit: bool,
}

impl App {
    fn new(resources: &'static Resources) -> Self {
        Self {
            state: AppState::new(resources.expected_features()),
            resources,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.editing_name {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => {
                    self.state.editing_name = false;
                    self.refresh_news();
                }
                KeyCode::Backspace => self.state.name_backspace(),
                KeyCode::Char(c) => self.state.name_input_char(c),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => self.state.select_prev(),
            KeyCode::Char('h') | KeyCode::Left => self.state.adjust_focused(-1),
            KeyCode::Char('l') | KeyCode::Right => self.state.adjust_focused(1),
            KeyCode::Enter => {
                if self.state.focus == ROW_NAME {
                    self.state.editing_name = true;
                } else {
                    self.predict();
                }
            }
            KeyCode::Char('p') => self.predict(),
            KeyCode::Char('s') => {
                let _ = self.state.save_to_history(Local::now());
            }
            KeyCode::Char('n') => self.refresh_news(),
            KeyCode::Char(c @ '1'..='5') => {
                let idx = (c as usize) - ('1' as usize);
                self.state.tab = TAB_ORDER[idx];
            }
            _ => {}
        }
    }

    fn predict(&mut self) {
        self.state
            .run_prediction_cycle(self.resources, self.resources);
        self.refresh_news();
    }

    fn refresh_news(&mut self) {
        self.state.news = news::latest_news(&self.state.player_name, &mut rand::thread_rng());
    }
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    // Artifact loading is the one fatal path; fail before touching the
    // terminal so the message stays readable.
    let resources = artifacts::resources()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(resources);
    app.refresh_news();
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(44), Constraint::Min(1)])
        .split(chunks[1]);

    render_form(frame, body[0], &app.state);
    render_report(frame, body[1], &app.state);
    render_console(frame, chunks[2], &app.state);

    let footer =
        Paragraph::new(footer_text(&app.state)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let title = format!(
        "INJURY RISK TERMINAL | {} features | Tab: {}",
        state.schema.len(),
        state.tab.label()
    );
    let line1 = format!("  .-.  {title}");
    let line2 = " /___\\".to_string();
    let line3 = "  |_|".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    if state.editing_name {
        "Type name | Backspace Delete | Enter/Esc Done".to_string()
    } else {
        "j/k Move | h/l Adjust | Enter Edit/Predict | p Predict | s Save | n News | 1-5 Tabs | ? Help | q Quit"
            .to_string()
    }
}

fn render_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Player Inputs").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let mut lines: Vec<Line> = Vec::with_capacity(state.form_rows());
    lines.push(form_line(
        state,
        ROW_NAME,
        "Player Name",
        if state.editing_name {
            format!("{}_", state.player_name)
        } else if state.player_name.is_empty() {
            "<unnamed>".to_string()
        } else {
            state.player_name.clone()
        },
    ));
    lines.push(form_line(
        state,
        ROW_POSITION,
        "Position",
        format!("< {} >", state.position.label()),
    ));
    lines.push(form_line(
        state,
        ROW_INJURIES,
        "Previous Injuries",
        state.previous_injuries.to_string(),
    ));

    for (idx, field) in state.fields.iter().enumerate() {
        let value = match field.widget {
            WidgetSpec::Slider { min, max, .. } => {
                format!(
                    "{:>8.1} {}",
                    field.value,
                    meter(field.value, min, max, 10)
                )
            }
            WidgetSpec::Number { .. } => format!("{:>10.2}", field.value),
        };
        lines.push(form_line(
            state,
            FIXED_ROWS + idx,
            &format_label(&field.name),
            value,
        ));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Latest News",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for item in &state.news {
        lines.push(Line::from(Span::styled(
            format!("- {item}"),
            Style::default().fg(Color::DarkGray),
        )));
    }

    frame.render_widget(Paragraph::new(lines).wrap(ratatui::widgets::Wrap { trim: true }), inner);
}

fn form_line(state: &AppState, row: usize, label: &str, value: String) -> Line<'static> {
    let selected = state.focus == row;
    let marker = if selected { "> " } else { "  " };
    let style = if selected {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(Span::styled(format!("{marker}{label:<20} {value}"), style))
}

fn meter(value: f64, min: f64, max: f64, width: usize) -> String {
    let span = (max - min).max(1e-9);
    let frac = ((value - min) / span).clamp(0.0, 1.0);
    let filled = (frac * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

fn render_report(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let titles: Vec<Line> = TAB_ORDER
        .iter()
        .enumerate()
        .map(|(idx, tab)| Line::from(format!("{} {}", idx + 1, tab.label())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(state.tab.index())
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, sections[0]);

    let content = sections[1];
    if let Some(err) = &state.last_error {
        let msg = Paragraph::new(err.as_str())
            .style(Style::default().fg(Color::Red))
            .block(Block::default().title("Error").borders(Borders::ALL))
            .wrap(ratatui::widgets::Wrap { trim: true });
        frame.render_widget(msg, content);
        return;
    }

    match state.tab {
        ReportTab::Summary => render_summary(frame, content, state),
        ReportTab::Insights => render_insights(frame, content, state),
        ReportTab::History => render_history(frame, content, state),
        ReportTab::Advice => render_advice(frame, content, state),
        ReportTab::Raw => render_raw(frame, content, state),
    }
}

fn render_placeholder(frame: &mut Frame, area: Rect, title: &str) {
    let msg = Paragraph::new("Fill in the player's data and press p to run the analysis.")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(msg, area);
}

fn render_summary(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(report) = &state.report else {
        render_placeholder(frame, area, "Summary");
        return;
    };

    let block = Block::default()
        .title(format!("Risk Analysis for: {}", state.report_player))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height < 5 {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(inner);

    let risk_color = match report.risk {
        RiskLabel::High => Color::Red,
        RiskLabel::Low => Color::Green,
    };
    let metrics = Line::from(vec![
        Span::raw("Predicted Risk Level: "),
        Span::styled(
            report.risk.label(),
            Style::default().fg(risk_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   Injury Probability: "),
        Span::styled(
            report::format_percent(report.probability),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(Paragraph::new(metrics), rows[0]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(risk_color))
        .ratio(report.probability.clamp(0.0, 1.0))
        .label(report::format_percent(report.probability));
    frame.render_widget(gauge, rows[1]);

    let hint = Paragraph::new("s  Save prediction to history")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hint, rows[2]);
}

fn render_insights(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(report) = &state.report else {
        render_placeholder(frame, area, "Insights");
        return;
    };

    let block = Block::default()
        .title("Prediction Breakdown")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        "Feature attribution (red pushes risk up, blue down):",
        Style::default().fg(Color::DarkGray),
    )));
    for row in report::attribution_rows(&report.attributions, 18) {
        let color = if row.pushes_up { Color::Red } else { Color::Blue };
        lines.push(Line::from(vec![
            Span::raw(format!("{:<22} {:>+7.3} ", row.label, row.value)),
            Span::styled(row.bar, Style::default().fg(color)),
        ]));
    }
    lines.push(Line::from(format!("{:<22} {:>+7.3}", "Baseline", report.baseline)));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Player attribute profile:",
        Style::default().fg(Color::DarkGray),
    )));
    for meter_row in report::profile_meters(&report.features) {
        lines.push(Line::from(format!(
            "{:<22} {:>3}% {}",
            meter_row.label,
            meter_row.pct,
            meter(meter_row.pct as f64, 0.0, 100.0, 20)
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_history(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title("Historical Risk Tracking")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    if state.history.is_empty() {
        let empty = Paragraph::new("No historical data yet.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(1)])
        .split(inner);

    let series = report::history_series(state.history.all());
    let spark = Sparkline::default()
        .block(Block::default().title("Probability %").borders(Borders::BOTTOM))
        .data(&series)
        .max(100)
        .style(Style::default().fg(Color::Cyan));
    frame.render_widget(spark, rows[0]);

    let visible = rows[1].height as usize;
    let entries = state.history.all();
    let start = entries.len().saturating_sub(visible);
    let lines: Vec<Line> = entries[start..]
        .iter()
        .map(|entry| {
            Line::from(format!(
                "{}  {:<24} {}",
                entry.timestamp.format("%H:%M:%S"),
                if entry.player_name.is_empty() {
                    "Unnamed Player"
                } else {
                    entry.player_name.as_str()
                },
                report::format_percent(entry.probability)
            ))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), rows[1]);
}

fn render_advice(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(report) = &state.report else {
        render_placeholder(frame, area, "Advice");
        return;
    };

    let block = Block::default()
        .title("Tailored Recommendations")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = report
        .recommendations
        .iter()
        .map(|rec| {
            let color = match rec.severity {
                Severity::Critical => Color::Red,
                Severity::Warning => Color::Yellow,
                Severity::Advisory => Color::Cyan,
                Severity::Good => Color::Green,
            };
            Line::from(Span::styled(
                format!("- {}", rec.text),
                Style::default().fg(color),
            ))
        })
        .collect();
    frame.render_widget(
        Paragraph::new(lines).wrap(ratatui::widgets::Wrap { trim: true }),
        inner,
    );
}

fn render_raw(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(report) = &state.report else {
        render_placeholder(frame, area, "Raw Data");
        return;
    };

    let block = Block::default().title("Raw Input Data").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        format!("{:<24} {:>12} {:>12}", "Feature", "Raw", "Scaled"),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for (idx, name) in report.features.names.iter().enumerate() {
        lines.push(Line::from(format!(
            "{:<24} {:>12.2} {:>12.4}",
            name, report.features.values[idx], report.scaled[idx]
        )));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Console").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let take = inner.height as usize;
    let text = if state.logs.is_empty() {
        "No alerts yet".to_string()
    } else {
        state
            .logs
            .iter()
            .rev()
            .take(take)
            .cloned()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect::<Vec<_>>()
            .join("\n")
    };
    frame.render_widget(Paragraph::new(text), inner);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Injury Risk Terminal - Help",
        "",
        "Form:",
        "  j/k or ↑/↓   Move focus",
        "  h/l or ←/→   Adjust value / cycle position",
        "  Enter        Edit name (on name row), else predict",
        "",
        "Actions:",
        "  p            Predict injury risk",
        "  s            Save prediction to history",
        "  n            Refresh news",
        "  1-5          Switch report tab",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
