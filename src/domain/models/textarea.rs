use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Padding;

use super::Palette;

pub struct TextArea {}

impl<'a> TextArea {
    pub fn new(palette: &Palette) -> tui_textarea::TextArea<'a> {
        let mut textarea = tui_textarea::TextArea::default();
        textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(palette.primary))
                .title("Ask about shoes, orders, returns... (Enter to send, /help for commands)")
                .padding(Padding::new(1, 1, 0, 0)),
        );
        textarea.set_style(Style::default().fg(palette.text));
        textarea.set_cursor_line_style(Style::default());

        return textarea;
    }
}
