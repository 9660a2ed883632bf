#[cfg(test)]
#[path = "transcript_test.rs"]
mod tests;

use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;

use super::markup;
use crate::domain::models::Author;
use crate::domain::models::Message;
use crate::domain::models::Session;

fn author_style(author: Author) -> Style {
    let colour = match author {
        Author::User => Color::Cyan,
        Author::Ai => Color::Green,
        Author::System => Color::Red,
    };

    return Style::default().fg(colour).add_modifier(Modifier::BOLD);
}

fn header(session: &Session, message: &Message) -> Line<'static> {
    let name = match message.author {
        Author::Ai => session.persona_label(),
        _ => message.author.to_string(),
    };

    return Line::from(vec![
        Span::styled(name, author_style(message.author)),
        Span::styled(
            format!(" {}", message.timestamp),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
}

fn body(message: &Message, max_width: usize) -> Vec<Line<'static>> {
    let text = message.text.replace('\t', "  ");
    if message.author == Author::Ai {
        return markup::styled_lines(&text, max_width);
    }

    let style = match message.author {
        Author::System => Style::default().fg(Color::Red),
        _ => Style::default(),
    };

    let display = Message {
        text,
        ..message.clone()
    };
    return display
        .as_string_lines(max_width)
        .into_iter()
        .map(|line| return Line::from(Span::styled(line, style)))
        .collect();
}

/// Lays a session's messages out as display lines: a name and time header,
/// the wrapped body, then a blank spacer.
pub fn lines(session: &Session, max_width: usize) -> Vec<Line<'static>> {
    let max_width = max_width.max(1);
    let mut lines = vec![];

    for message in session.messages() {
        lines.push(header(session, message));
        lines.extend(body(message, max_width));
        lines.push(Line::from(""));
    }

    return lines;
}
