#[cfg(test)]
#[path = "markup_test.rs"]
mod tests;

use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
    Plain,
    Bold,
    Italic,
}

impl Emphasis {
    pub fn style(&self) -> Style {
        return match self {
            Emphasis::Plain => Style::default(),
            Emphasis::Bold => Style::default().add_modifier(Modifier::BOLD),
            Emphasis::Italic => Style::default().add_modifier(Modifier::ITALIC),
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub emphasis: Emphasis,
    pub text: String,
}

fn push_segment(segments: &mut Vec<Segment>, emphasis: Emphasis, text: &str) {
    if text.is_empty() {
        return;
    }

    if let Some(last) = segments.last_mut() {
        if last.emphasis == emphasis {
            last.text.push_str(text);
            return;
        }
    }

    segments.push(Segment {
        emphasis,
        text: text.to_string(),
    });
}

fn is_marked(content: &str) -> bool {
    return !content.is_empty() && content.trim() == content;
}

/// Splits a single line into `**bold**`, `*italic*` and plain runs. Markers
/// without a closing partner on the same line, or wrapping blank padded text,
/// are kept as literal text.
pub fn parse_line(line: &str) -> Vec<Segment> {
    let mut segments = vec![];
    let mut rest = line;

    while !rest.is_empty() {
        let star = match rest.find('*') {
            Some(idx) => idx,
            None => {
                push_segment(&mut segments, Emphasis::Plain, rest);
                break;
            }
        };

        push_segment(&mut segments, Emphasis::Plain, &rest[..star]);
        let marked = &rest[star..];

        if let Some(inner) = marked.strip_prefix("**") {
            if let Some(end) = inner.find("**").filter(|end| return is_marked(&inner[..*end])) {
                push_segment(&mut segments, Emphasis::Bold, &inner[..end]);
                rest = &inner[end + 2..];
                continue;
            }
        }

        let inner = &marked[1..];
        if !inner.starts_with('*') {
            if let Some(end) = inner.find('*').filter(|end| return is_marked(&inner[..*end])) {
                push_segment(&mut segments, Emphasis::Italic, &inner[..end]);
                rest = &inner[end + 1..];
                continue;
            }
        }

        push_segment(&mut segments, Emphasis::Plain, "*");
        rest = inner;
    }

    return segments;
}

/// Renders reply text as styled lines no wider than `max_width`, wrapping on
/// spaces. A single word longer than the width gets a line to itself.
pub fn styled_lines(text: &str, max_width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![];

    for line in text.lines() {
        let mut spans: Vec<Span<'static>> = vec![];
        let mut line_len = 0;

        for segment in parse_line(line) {
            let style = segment.emphasis.style();

            for (idx, word) in segment.text.split(' ').enumerate() {
                // Each split point after the first stands for one space.
                let mut piece = word.to_string();
                if idx > 0 {
                    piece = format!(" {word}");
                }

                let width = piece.chars().count();
                if line_len > 0 && line_len + width > max_width {
                    lines.push(Line::from(spans));
                    spans = vec![];
                    piece = piece.trim_start().to_string();
                    line_len = 0;
                }

                if piece.is_empty() {
                    continue;
                }

                line_len += piece.chars().count();
                spans.push(Span::styled(piece, style));
            }
        }

        lines.push(Line::from(spans));
    }

    return lines;
}

/// Drops the markers, for plain text surfaces like the CLI.
pub fn strip(text: &str) -> String {
    return text
        .lines()
        .map(|line| {
            return parse_line(line)
                .into_iter()
                .map(|segment| return segment.text)
                .collect::<String>();
        })
        .collect::<Vec<String>>()
        .join("\n");
}
