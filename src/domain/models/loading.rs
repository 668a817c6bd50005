use ratatui::prelude::Alignment;
use ratatui::prelude::Rect;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Padding;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::Palette;
use super::SessionState;

const FRAMES: [&str; 3] = ["●  ", "●● ", "●●●"];

#[derive(Default)]
pub struct Loading {
    frame: usize,
}

impl Loading {
    pub fn tick(&mut self) {
        self.frame = (self.frame + 1) % FRAMES.len();
    }

    pub fn render(&self, frame: &mut Frame, rect: Rect, state: SessionState, palette: &Palette) {
        let text = match state {
            SessionState::Sending => "Connecting to FlipAssist",
            _ => "FlipAssist is typing",
        };

        frame.render_widget(
            Paragraph::new(format!(
                "{text} {}  (Ctrl+C to stop)",
                FRAMES[self.frame]
            ))
            .style(Style::default().fg(palette.muted))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(palette.muted))
                    .padding(Padding::new(1, 1, 0, 0)),
            )
            .alignment(Alignment::Center),
            rect,
        );
    }
}
