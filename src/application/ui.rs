use std::io;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Padding;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Scrollbar;
use ratatui::widgets::ScrollbarOrientation;
use ratatui::widgets::Wrap;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::Loading;
use crate::domain::models::NotificationLevel;
use crate::domain::models::SessionId;
use crate::domain::models::TextArea;
use crate::domain::models::Theme;
use crate::domain::models::SUGGESTIONS;
use crate::domain::services::events::EventsService;
use crate::domain::services::help_text;
use crate::domain::services::AppState;
use crate::domain::services::Preferences;

/// Ticks between two API health checks.
const HEALTH_CHECK_TICKS: u32 = 20;

fn render_header(frame: &mut Frame, rect: Rect, app_state: &AppState) {
    let palette = app_state.theme.palette();
    let (api_text, api_colour) = match app_state.api_healthy {
        Some(true) => ("API online", palette.success),
        Some(false) => ("API offline", palette.error),
        None => ("API checking", palette.muted),
    };

    let line = Line::from(vec![
        Span::styled(
            " FlipAssist ",
            Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("· session {} · ", app_state.session_id),
            Style::default().fg(palette.muted),
        ),
        Span::styled(format!("● {api_text}"), Style::default().fg(api_colour)),
        Span::styled(
            format!(" · {} theme", app_state.theme),
            Style::default().fg(palette.muted),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), rect);
}

fn render_help(frame: &mut Frame, rect: Rect, app_state: &AppState) {
    let palette = app_state.theme.palette();
    frame.render_widget(
        Paragraph::new(help_text())
            .style(Style::default().fg(palette.text))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(palette.primary))
                    .title("Help (press Enter to close)")
                    .padding(Padding::new(1, 1, 0, 0)),
            ),
        rect,
    );
}

fn render_suggestions(frame: &mut Frame, rect: Rect, app_state: &AppState) {
    let palette = app_state.theme.palette();
    let lines = SUGGESTIONS
        .iter()
        .enumerate()
        .map(|(idx, suggestion)| {
            return Line::from(vec![
                Span::styled(
                    format!("{}. ", idx + 1),
                    Style::default().fg(palette.primary),
                ),
                Span::styled(suggestion.to_string(), Style::default().fg(palette.text)),
            ]);
        })
        .collect::<Vec<Line>>();

    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(palette.muted))
                .title("Try asking (/suggest NUMBER)")
                .padding(Padding::new(1, 1, 0, 0)),
        ),
        rect,
    );
}

fn render_toast(frame: &mut Frame, rect: Rect, app_state: &AppState) {
    let Some(toast) = &app_state.toast else {
        return;
    };

    let palette = app_state.theme.palette();
    let colour = match toast.notification.level {
        NotificationLevel::Info => palette.primary,
        NotificationLevel::Success => palette.success,
        NotificationLevel::Error => palette.error,
    };

    frame.render_widget(
        Paragraph::new(format!(" {}", toast.notification.text))
            .style(Style::default().fg(colour).add_modifier(Modifier::BOLD)),
        rect,
    );
}

fn draw(
    frame: &mut Frame,
    app_state: &mut AppState,
    textarea: &tui_textarea::TextArea,
    loading: &Loading,
) {
    let palette = app_state.theme.palette();
    frame.render_widget(
        Block::default().style(Style::default().bg(palette.background)),
        frame.size(),
    );

    let suggestions_height = if app_state.show_suggestions() && !app_state.help_visible {
        u16::try_from(SUGGESTIONS.len() + 2).unwrap_or(u16::MAX)
    } else {
        0
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(suggestions_height),
            Constraint::Length(1),
            Constraint::Max(4),
        ])
        .split(frame.size());

    render_header(frame, layout[0], app_state);

    if layout[1].width != app_state.last_known_width
        || layout[1].height != app_state.last_known_height
    {
        app_state.set_rect(layout[1]);
    }

    if app_state.help_visible {
        render_help(frame, layout[1], app_state);
    } else {
        app_state
            .bubble_list
            .render(frame, layout[1], app_state.scroll.position);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            layout[1].inner(&Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut app_state.scroll.scrollbar_state,
        );
    }

    if suggestions_height > 0 {
        render_suggestions(frame, layout[2], app_state);
    }

    render_toast(frame, layout[3], app_state);

    if app_state.is_waiting() {
        loading.render(frame, layout[4], app_state.session_state, &palette);
    } else {
        frame.render_widget(textarea.widget(), layout[4]);
    }
}

fn rebuild_textarea<'a>(
    textarea: &tui_textarea::TextArea,
    theme: Theme,
) -> tui_textarea::TextArea<'a> {
    let mut rebuilt = TextArea::new(&theme.palette());
    rebuilt.insert_str(textarea.lines().join("\n"));

    return rebuilt;
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut textarea = TextArea::new(&app_state.theme.palette());
    let mut loading = Loading::default();
    let mut events = EventsService::new(rx);
    let mut ticks: u32 = 0;

    #[cfg(feature = "dev")]
    {
        textarea.insert_str(SUGGESTIONS[0]);
    }

    tx.send(Action::HealthCheck())?;

    loop {
        terminal.draw(|frame| draw(frame, app_state, &textarea, &loading))?;

        match events.next().await? {
            Event::HealthChecked(healthy) => {
                app_state.api_healthy = Some(healthy);
            }
            Event::Notify(notification) => {
                app_state.notify(notification);
            }
            Event::SessionStateChanged(session_state) => {
                app_state.set_session_state(session_state);
            }
            Event::TranscriptUpdated(transcript) => {
                app_state.set_transcript(transcript);
            }
            Event::KeyboardCharInput(input) => {
                if !app_state.is_waiting() {
                    textarea.input(input);
                }
            }
            Event::KeyboardPaste(text) => {
                if !app_state.is_waiting() {
                    textarea.insert_str(text);
                }
            }
            Event::KeyboardCTRLC() => {
                if !app_state.is_waiting() {
                    break;
                }
                tx.send(Action::Abort())?;
            }
            Event::KeyboardCTRLT() => {
                app_state.toggle_theme().await;
                textarea = rebuild_textarea(&textarea, app_state.theme);
            }
            Event::KeyboardEnter() => {
                app_state.help_visible = false;
                if app_state.is_waiting() {
                    continue;
                }

                let input_str = textarea.lines().join("\n");
                if input_str.trim().is_empty() {
                    continue;
                }

                let (should_break, should_continue) =
                    app_state.handle_slash_commands(&input_str, &tx).await?;
                textarea = TextArea::new(&app_state.theme.palette());
                if should_break {
                    break;
                }
                if should_continue {
                    continue;
                }

                tx.send(Action::Submit(input_str))?;
            }
            Event::UIScrollDown() => {
                app_state.scroll.down();
            }
            Event::UIScrollUp() => {
                app_state.scroll.up();
            }
            Event::UIScrollPageDown() => {
                app_state.scroll.down_page();
            }
            Event::UIScrollPageUp() => {
                app_state.scroll.up_page();
            }
            Event::UITick() => {
                app_state.tick();
                loading.tick();
                ticks = ticks.wrapping_add(1);
                if ticks % HEALTH_CHECK_TICKS == 0 {
                    tx.send(Action::HealthCheck())?;
                }
            }
        }
    }

    return Ok(());
}

/// Best effort terminal restore. Runs from the panic hook, so failures are
/// only logged.
pub fn destruct_terminal_for_panic() {
    if let Err(err) = disable_raw_mode() {
        tracing::error!(error = ?err, "Failed to disable raw mode");
    }
    if let Err(err) = crossterm::execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste,
        cursor::Show
    ) {
        tracing::error!(error = ?err, "Failed to restore terminal");
    }
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
    session_id: SessionId,
    theme: Theme,
) -> Result<()> {
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;
    let mut app_state = AppState::new(session_id, theme, Preferences::default());

    start_loop(&mut terminal, &mut app_state, tx, rx).await?;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    return Ok(());
}
