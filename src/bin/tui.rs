mod tui_app;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tui_app::{
    blowout_band, format_age, format_label, format_signed, truncate, AppState, ConnectionStatus,
    GameResponse,
};

/// Matches the scanner's poll period.
const REFRESH_SECS: u64 = 8;
const CARD_COLUMNS: usize = 3;
const CARD_HEIGHT: u16 = 13;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> io::Result<()> {
    let base_url = std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .map_err(io::Error::other)?;

    let mut app = AppState::new(base_url);

    // Initial fetch before rendering
    app.refresh(&client).await;

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut selected: usize = 0;
    let result = run_loop(&mut terminal, &mut app, &client, &mut selected).await;

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    client: &reqwest::Client,
    selected: &mut usize,
) -> io::Result<()> {
    let refresh_interval = Duration::from_secs(REFRESH_SECS);
    let mut last_tick = std::time::Instant::now();

    loop {
        let max = app.board.games.len().saturating_sub(1);
        *selected = (*selected).min(max);
        terminal.draw(|f| render(f, app, *selected))?;

        let timeout = refresh_interval
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Char('r') | KeyCode::Char('R') => {
                            app.force_refresh(client).await;
                            last_tick = std::time::Instant::now();
                        }
                        KeyCode::Down | KeyCode::Char('j') => {
                            *selected = (*selected + 1).min(max);
                        }
                        KeyCode::Up | KeyCode::Char('k') => {
                            *selected = selected.saturating_sub(1);
                        }
                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= refresh_interval {
            app.refresh(client).await;
            last_tick = std::time::Instant::now();
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &AppState, selected: usize) {
    let area = f.area();

    // Outer vertical split: header | body | footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // body
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_body(f, app, selected, chunks[1]);
    render_footer(f, chunks[2]);
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let (status_text, status_color) = match &app.status {
        ConnectionStatus::Connected => ("● connected".to_string(), Color::Green),
        ConnectionStatus::Connecting => ("◌ connecting".to_string(), Color::Yellow),
        ConnectionStatus::Error(e) => (format!("✗ {}", truncate(e, 40)), Color::Red),
    };

    let source_color = match app.board.source.as_str() {
        "live" => Color::Green,
        "stale" => Color::Yellow,
        "demo" => Color::Magenta,
        _ => Color::DarkGray,
    };

    let (poller_text, poller_color) = if !app.health.poller_running {
        ("poller down".to_string(), Color::Red)
    } else if app.health.consecutive_failures > 0 {
        (
            format!("{} failed polls", app.health.consecutive_failures),
            Color::Yellow,
        )
    } else {
        ("poller ok".to_string(), Color::Green)
    };

    let title_spans = vec![
        Span::styled(
            " 🏀 Live NCAA Betting Analytics  ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw("  │  "),
        Span::styled(
            format!("{} live", app.board.games.len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  │  "),
        Span::styled(
            format!("source: {}", app.board.source),
            Style::default().fg(source_color),
        ),
        Span::raw("  │  "),
        Span::styled(poller_text, Style::default().fg(poller_color)),
        Span::raw("  │  "),
        Span::styled(
            format!("updated {}", format_age(app.last_refresh)),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    let paragraph = Paragraph::new(Line::from(title_spans))
        .block(Block::default().borders(Borders::ALL).border_style(
            Style::default().fg(Color::DarkGray),
        ));

    f.render_widget(paragraph, area);
}

fn render_body(f: &mut Frame, app: &AppState, selected: usize, area: Rect) {
    if !app.loaded {
        let p = Paragraph::new("Loading live games...").alignment(Alignment::Center);
        f.render_widget(p, centered_row(area, 1));
        return;
    }
    if app.board.games.is_empty() {
        let lines = vec![
            Line::from(Span::styled(
                "Go build Legos.",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "No live games right now. Check back during basketball season!",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let p = Paragraph::new(lines).alignment(Alignment::Center);
        f.render_widget(p, centered_row(area, 2));
        return;
    }

    // Scroll whole rows so the selected card stays visible.
    let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;
    let selected_row = selected / CARD_COLUMNS;
    let first_row = selected_row.saturating_sub(visible_rows - 1);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
        .split(area);

    for (row_idx, row_area) in rows.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, CARD_COLUMNS as u32); CARD_COLUMNS])
            .split(*row_area);
        for (col_idx, card_area) in cols.iter().enumerate() {
            let idx = (first_row + row_idx) * CARD_COLUMNS + col_idx;
            if let Some(game) = app.board.games.get(idx) {
                render_card(f, game, idx == selected, *card_area);
            }
        }
    }
}

fn render_card(f: &mut Frame, game: &GameResponse, is_selected: bool, area: Rect) {
    let m = &game.metrics;
    let width = area.width.saturating_sub(12) as usize;

    let pva_color = if m.pace_vs_average > 0 { Color::Red } else { Color::Blue };
    let edge_color = match m.over_under_edge.as_str() {
        "OVER_LEAN" => Color::LightRed,
        "UNDER_LEAN" => Color::LightBlue,
        _ => Color::Gray,
    };
    let tempo_color = match m.game_tempo.as_str() {
        "HOT" => Color::LightRed,
        "COLD" => Color::Cyan,
        _ => Color::Gray,
    };
    let blowout_color = match blowout_band(m.blowout_risk) {
        2 => Color::Red,
        1 => Color::Yellow,
        _ => Color::Green,
    };

    let label = Style::default().fg(Color::Gray);
    let bold = |c: Color| Style::default().fg(c).add_modifier(Modifier::BOLD);

    let lines = vec![
        Line::from(Span::styled(game.clock.clone(), Style::default().fg(Color::DarkGray)))
            .alignment(Alignment::Center),
        team_line(&game.away_team, game.away_score, width),
        team_line(&game.home_team, game.home_score, width),
        Line::from(""),
        Line::from(vec![
            Span::styled("Current Pace:  ", label),
            Span::styled(format!("{} pts/40 min", m.pace), bold(Color::Yellow)),
        ]),
        Line::from(vec![
            Span::styled("Projected Total:  ", label),
            Span::styled(m.projected_total.to_string(), bold(Color::Green)),
        ]),
        Line::from(Span::styled("🎯 BETTING INSIGHTS", bold(Color::White))),
        Line::from(vec![
            Span::styled("Pace vs Average:  ", label),
            Span::styled(format_signed(m.pace_vs_average), bold(pva_color)),
        ]),
        Line::from(vec![
            Span::styled("O/U Edge:  ", label),
            Span::styled(format_label(&m.over_under_edge), bold(edge_color)),
        ]),
        Line::from(vec![
            Span::styled("Game Tempo:  ", label),
            Span::styled(format_label(&m.game_tempo), bold(tempo_color)),
        ]),
        Line::from(vec![
            Span::styled("Blowout Risk:  ", label),
            Span::styled(format!("{}%", m.blowout_risk), bold(blowout_color)),
        ]),
    ];

    let border = if is_selected { Color::Cyan } else { Color::DarkGray };
    let card = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(card, area);
}

fn team_line(team: &str, score: u32, width: usize) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{:<width$}", truncate(team, width)),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{score:>4}"),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
    ])
}

fn render_footer(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  "),
        Span::styled("[r] ", Style::default().fg(Color::Yellow)),
        Span::raw("poll now  "),
        Span::styled("[↑↓ / j k] ", Style::default().fg(Color::Yellow)),
        Span::raw("select game  "),
        Span::styled(
            format!("auto-refresh: {REFRESH_SECS}s"),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A `height`-line strip in the vertical middle of `area`.
fn centered_row(area: Rect, height: u16) -> Rect {
    let top = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x: area.x,
        y: top,
        width: area.width,
        height: height.min(area.height),
    }
}
