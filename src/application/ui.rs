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
use ratatui::widgets::Tabs;
use ratatui::widgets::Wrap;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::Loading;
use crate::domain::models::Session;
use crate::domain::services::events::EventsService;
use crate::domain::services::capitalize;
use crate::domain::services::AppState;
use crate::domain::services::PersonaBinder;
use crate::domain::services::View;

fn render_tabs<B: Backend>(frame: &mut Frame<B>, app_state: &AppState, rect: Rect) {
    let titles = app_state
        .sessions
        .iter()
        .map(|session| {
            let mut title = session.year().to_string();
            if session.is_awaiting_response() {
                title = format!("{title} •");
            }
            return Line::from(title);
        })
        .collect::<Vec<Line>>();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::BOTTOM))
        .select(app_state.sessions.active_index().unwrap_or(0))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, rect);
}

fn header_text(session: &Session) -> String {
    if session.is_bound() {
        return format!("Chatting with {}", session.persona_label());
    }

    return format!("Who were you in {}?", session.year());
}

fn render_picker<B: Backend>(frame: &mut Frame<B>, binder: &PersonaBinder, rect: Rect) {
    let mut lines = vec![
        Line::from("Pick your own name in every source, then press Enter."),
        Line::from(""),
    ];

    for (idx, (source, names)) in binder.sources().into_iter().enumerate() {
        let selected = idx == binder.cursor();
        let marker = if selected { "> " } else { "  " };

        let choice = if names.is_empty() {
            Span::styled("no participants", Style::default().fg(Color::DarkGray))
        } else {
            match binder.selection(source) {
                Some(name) => Span::styled(
                    format!("< {name} >"),
                    Style::default().fg(Color::Green),
                ),
                None => Span::styled("< pick >", Style::default().fg(Color::Yellow)),
            }
        };

        let mut label_style = Style::default();
        if selected {
            label_style = label_style.add_modifier(Modifier::BOLD);
        }

        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{}: ", capitalize(source)), label_style),
            choice,
        ]));
    }

    if binder.sources().is_empty() {
        lines.push(Line::from(Span::styled(
            "No participants found for this year. Press Ctrl+p to process your uploads.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .padding(Padding::new(1, 1, 0, 0)),
        ),
        rect,
    );
}

fn render_default<B: Backend>(frame: &mut Frame<B>, app_state: &AppState, rect: Rect) {
    if app_state.loading_years {
        Loading::new("Loading").render(frame, centered(rect, 3), app_state.tick);
        return;
    }

    let mut lines = vec![
        Line::from(Span::styled(
            "MindBack",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if app_state.available_years.is_empty() {
        lines.push(Line::from(
            "No processed years yet. Press Ctrl+p to process your uploaded message exports.",
        ));
    } else {
        lines.push(Line::from("Pick a year to talk to yourself from back then:"));
        for (idx, year) in app_state.available_years.iter().enumerate() {
            if idx == app_state.year_cursor {
                lines.push(Line::from(Span::styled(
                    format!("> {year}"),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )));
            } else {
                lines.push(Line::from(format!("  {year}")));
            }
        }
    }

    if !app_state.unprocessed_files.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Unprocessed files:",
            Style::default().fg(Color::Yellow),
        )));
        for file in app_state.unprocessed_files.iter() {
            lines.push(Line::from(format!("  - {file}")));
        }
    }

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .padding(Padding::new(1, 1, 0, 0)),
            ),
        rect,
    );
}

fn render_conversation<B: Backend>(frame: &mut Frame<B>, app_state: &mut AppState, rect: Rect) {
    let session = match app_state.sessions.active() {
        Some(session) => session.clone(),
        None => return,
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(rect);

    render_tabs(frame, app_state, layout[0]);
    frame.render_widget(
        Paragraph::new(header_text(&session))
            .style(Style::default().add_modifier(Modifier::BOLD)),
        layout[1],
    );

    if !session.is_bound() {
        match app_state.active_binder() {
            Some(binder) => render_picker(frame, binder, layout[2]),
            None => Loading::new("Loading participants").render(
                frame,
                centered(layout[2], 3),
                app_state.tick,
            ),
        }
        return;
    }

    if layout[2].width != app_state.last_known_width
        || layout[2].height != app_state.last_known_height
    {
        app_state.set_rect(layout[2]);
    }

    frame.render_widget(
        Paragraph::new(app_state.transcript.to_vec())
            .block(Block::default().padding(Padding::new(1, 2, 0, 0)))
            .scroll((app_state.scroll.position, 0)),
        layout[2],
    );
    frame.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight),
        layout[2].inner(&Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut app_state.scroll.scrollbar_state,
    );

    if session.is_awaiting_response() {
        Loading::new("typing").render(frame, layout[3], app_state.tick);
    } else {
        frame.render_widget(app_state.textarea.widget(), layout[3]);
    }
}

fn centered(rect: Rect, height: u16) -> Rect {
    let height = height.min(rect.height);
    return Rect {
        x: rect.x,
        y: rect.y + (rect.height - height) / 2,
        width: rect.width,
        height,
    };
}

fn render<B: Backend>(frame: &mut Frame<B>, app_state: &mut AppState) {
    let mut constraints = vec![Constraint::Min(1)];
    if app_state.notice.is_some() {
        constraints.push(Constraint::Length(1));
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.size());

    if app_state.processing {
        Loading::new("Processing Data").render(frame, centered(layout[0], 3), app_state.tick);
    } else {
        match app_state.sessions.view() {
            View::Default => render_default(frame, app_state, layout[0]),
            View::Conversation => render_conversation(frame, app_state, layout[0]),
        }
    }

    if let Some(notice) = &app_state.notice {
        frame.render_widget(
            Paragraph::new(format!("{notice} (Esc to dismiss)"))
                .style(Style::default().fg(Color::White).bg(Color::Red)),
            layout[1],
        );
    }
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState<'_>,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut events = EventsService::new(rx);
    for action in app_state.init() {
        tx.send(action)?;
    }

    loop {
        terminal.draw(|frame| render(frame, app_state))?;

        let event = events.next().await?;
        for action in app_state.handle_event(event) {
            tx.send(action)?;
        }

        if app_state.exit {
            break;
        }
    }

    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    );
    let _ = crossterm::execute!(io::stdout(), cursor::Show);
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let max_sessions = Config::get_u64(ConfigKey::MaxSessions)? as usize;

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;
    let mut app_state = AppState::new(max_sessions);

    let res = start_loop(&mut terminal, &mut app_state, tx, rx).await;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    return res;
}
