mod export;
mod help;

use crate::cli::{build_config, Cli};
use crate::client::MentionClient;
use crate::model::{AppEvent, Outcome, ResultRecord, RunConfig, SubmitError, UiCommand};
use crate::session::Session;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Terminal,
};
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Which part of the screen receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Brand,
    Prompt,
    Results,
}

struct UiState {
    session: Session,
    focus: Focus,
    show_help: bool,
    /// Transient status notices (export paths, no-op notes). Distinct from the
    /// session banner, which has its own lifecycle.
    info: String,
    table_offset: usize,
    last_exported_path: Option<String>,
}

impl UiState {
    fn new(session: Session) -> Self {
        let focus = if session.draft.brand.is_empty() {
            Focus::Brand
        } else {
            Focus::Prompt
        };
        Self {
            session,
            focus,
            show_help: false,
            info: String::new(),
            table_offset: 0,
            last_exported_path: None,
        }
    }
}

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let client = MentionClient::new(&cfg)?;

    // Unbounded channels avoid backpressure in the input/render hot path.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<AppEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio
    // runtime; the controller owns the network side.
    let ui_cfg = cfg.clone();
    let ui_handle = std::thread::spawn(move || run_threaded(ui_cfg, event_rx, cmd_tx));

    let res = crate::controller::run_controller(client, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread. The session state machine is owned
/// here only; the controller sees nothing but commands and hands back events.
fn run_threaded(
    cfg: RunConfig,
    mut event_rx: UnboundedReceiver<AppEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut state = UiState::new(Session::new(cfg.initial_brand.clone()));

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    let res = loop {
        // Drain events without blocking to keep the UI responsive.
        while let Ok(AppEvent::Resolved(outcome)) = event_rx.try_recv() {
            apply_outcome(&mut state, outcome);
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key(&mut state, &cfg, &cmd_tx, k.modifiers, k.code) {
                    break Ok(());
                }
            }
        }
    };

    let _ = cmd_tx.send(UiCommand::Quit);
    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

/// Fold one resolved outcome into the session and derive the status notice.
fn apply_outcome(state: &mut UiState, outcome: Outcome) {
    state.info = match &outcome {
        Outcome::Success { record } => {
            if record.mentioned {
                format!("\"{}\" mentioned at position {}", record.brand, record.position)
            } else {
                format!("\"{}\" not mentioned", record.brand)
            }
        }
        Outcome::MentionError { .. } => "Recorded with an upstream error".to_string(),
        Outcome::BackendError { .. } | Outcome::TransportFailure { .. } => String::new(),
    };
    state.session.resolve(outcome);
    // Follow the tail so a fresh record is visible immediately.
    state.table_offset = state.session.results().len().saturating_sub(1);
}

/// Handle one key press. Returns true when the app should quit.
fn handle_key(
    state: &mut UiState,
    cfg: &RunConfig,
    cmd_tx: &UnboundedSender<UiCommand>,
    modifiers: KeyModifiers,
    code: KeyCode,
) -> bool {
    if state.show_help {
        match code {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') => state.show_help = false,
            _ => {}
        }
        return false;
    }

    match (modifiers, code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => return true,
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => submit(state, cmd_tx),
        (KeyModifiers::CONTROL, KeyCode::Char('e')) => export::export_log(state, cfg),
        (_, KeyCode::F(1)) => state.show_help = true,
        (_, KeyCode::Esc) => return true,
        (_, KeyCode::Tab) => {
            state.focus = match state.focus {
                Focus::Brand => Focus::Prompt,
                Focus::Prompt => Focus::Results,
                Focus::Results => Focus::Brand,
            };
        }
        (_, KeyCode::BackTab) => {
            state.focus = match state.focus {
                Focus::Brand => Focus::Results,
                Focus::Prompt => Focus::Brand,
                Focus::Results => Focus::Prompt,
            };
        }
        (_, KeyCode::Enter) => match state.focus {
            // Enter submits from the single-line field, inserts a newline in
            // the multi-line one.
            Focus::Brand => submit(state, cmd_tx),
            Focus::Prompt => state.session.draft.prompt.push('\n'),
            Focus::Results => {}
        },
        (_, KeyCode::Backspace) => match state.focus {
            Focus::Brand => {
                state.session.draft.brand.pop();
            }
            Focus::Prompt => {
                state.session.draft.prompt.pop();
            }
            Focus::Results => {}
        },
        (_, KeyCode::Up) => {
            if state.focus == Focus::Results {
                state.table_offset = state.table_offset.saturating_sub(1);
            }
        }
        (_, KeyCode::Down) => {
            if state.focus == Focus::Results {
                let max = state.session.results().len().saturating_sub(1);
                state.table_offset = (state.table_offset + 1).min(max);
            }
        }
        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) => match state.focus {
            Focus::Brand => state.session.draft.brand.push(c),
            Focus::Prompt => state.session.draft.prompt.push(c),
            Focus::Results => match c {
                'q' => return true,
                'e' => export::export_log(state, cfg),
                'y' => export::copy_exported_path(state),
                'k' => state.table_offset = state.table_offset.saturating_sub(1),
                'j' => {
                    let max = state.session.results().len().saturating_sub(1);
                    state.table_offset = (state.table_offset + 1).min(max);
                }
                _ => {}
            },
        },
        _ => {}
    }
    false
}

fn submit(state: &mut UiState, cmd_tx: &UnboundedSender<UiCommand>) {
    match state.session.submit() {
        Ok(req) => {
            state.info = "Checking…".to_string();
            let _ = cmd_tx.send(UiCommand::Submit(req));
        }
        // Validation already set the banner; an in-flight submit is dropped.
        Err(SubmitError::EmptyFields) | Err(SubmitError::InFlight) => {}
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    if state.show_help {
        help::draw_help(area, f);
        return;
    }

    let banner_height = if state.session.banner().is_some() { 1 } else { 0 };
    let chunks = Layout::vertical([
        Constraint::Length(3),             // brand input
        Constraint::Length(6),             // prompt input
        Constraint::Length(banner_height), // error banner
        Constraint::Min(4),                // results table
        Constraint::Length(1),             // status footer
    ])
    .split(area);

    draw_input(
        f,
        chunks[0],
        "Brand",
        &state.session.draft.brand,
        state.focus == Focus::Brand,
    );
    draw_input(
        f,
        chunks[1],
        "Prompt",
        &state.session.draft.prompt,
        state.focus == Focus::Prompt,
    );

    if let Some(banner) = state.session.banner() {
        let p = Paragraph::new(Line::from(Span::styled(
            banner.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        f.render_widget(p, chunks[2]);
    }

    draw_results(f, chunks[3], state);
    draw_footer(f, chunks[4], state);
}

fn draw_input(f: &mut ratatui::Frame, area: Rect, title: &str, value: &str, focused: bool) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let text = if focused {
        format!("{value}_")
    } else {
        value.to_string()
    };
    let p = Paragraph::new(text).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title.to_string()),
    );
    f.render_widget(p, area);
}

fn draw_results(f: &mut ratatui::Frame, area: Rect, state: &UiState) {
    let records = state.session.results();
    let border_style = if state.focus == Focus::Results {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!("Results ({})", records.len()));

    if records.is_empty() {
        let p = Paragraph::new("No checks yet. Fill in a prompt and a brand, then Ctrl-S.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Prompt").style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from("Mentioned").style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from("Position").style(Style::default().add_modifier(Modifier::BOLD)),
    ]);

    // Keep the tail visible within the drawable window.
    let visible = (area.height as usize).saturating_sub(3).max(1);
    let offset = state
        .table_offset
        .min(records.len().saturating_sub(1))
        .saturating_sub(visible.saturating_sub(1));

    let rows: Vec<Row> = records
        .iter()
        .skip(offset)
        .take(visible)
        .map(row_for_record)
        .collect();

    let widths = [
        Constraint::Min(20),
        Constraint::Length(9),
        Constraint::Length(8),
    ];
    let table = Table::new(rows, widths).header(header);
    f.render_widget(table.block(block), area);
}

fn row_for_record(r: &ResultRecord) -> Row<'static> {
    let mentioned = if r.mentioned {
        Cell::from("Yes").style(Style::default().fg(Color::Green))
    } else {
        Cell::from("No").style(Style::default().fg(Color::Red))
    };
    let position = if r.position > 0 {
        r.position.to_string()
    } else {
        "-".to_string()
    };
    let style = if r.error.is_some() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Row::new(vec![
        Cell::from(r.prompt.replace('\n', " ")),
        mentioned,
        Cell::from(position),
    ])
    .style(style)
}

fn draw_footer(f: &mut ratatui::Frame, area: Rect, state: &UiState) {
    let status = if state.session.in_flight() {
        "Checking…".to_string()
    } else {
        state.info.clone()
    };
    let line = Line::from(vec![
        Span::styled(status, Style::default().fg(Color::Gray)),
        Span::raw("  "),
        Span::styled(
            "Tab focus · Ctrl-S submit · Ctrl-E export CSV · F1 help · Esc quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}
