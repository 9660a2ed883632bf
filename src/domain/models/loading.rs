use ratatui::prelude::Alignment;
use ratatui::prelude::Backend;
use ratatui::prelude::Rect;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Padding;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// Animated label cycling through one to three trailing dots, e.g.
/// `typing.`, `typing..`, `typing...`.
pub struct Loading {
    label: &'static str,
}

impl Loading {
    pub fn new(label: &'static str) -> Loading {
        return Loading { label };
    }

    pub fn text(&self, tick: usize) -> String {
        return format!("{}{}", self.label, ".".repeat(tick % 3 + 1));
    }

    pub fn render<B: Backend>(&self, frame: &mut Frame<B>, rect: Rect, tick: usize) {
        frame.render_widget(
            Paragraph::new(self.text(tick))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Double)
                        .padding(Padding::new(1, 1, 0, 0)),
                )
                .alignment(Alignment::Center),
            rect,
        );
    }
}
