#[cfg(test)]
#[path = "bubble_test.rs"]
mod tests;

use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;

use crate::domain::models::Message;
use crate::domain::models::Palette;
use crate::domain::models::Role;

pub const TYPING_INDICATOR: &str = "● ● ●";
pub const CURSOR: &str = "▌";

#[derive(PartialEq, Eq)]
pub enum BubbleAlignment {
    Left,
    Right,
}

pub struct Bubble<'a> {
    alignment: BubbleAlignment,
    message: &'a Message,
    palette: &'a Palette,
    window_max_width: usize,
}

pub struct BubbleConfig {
    pub bubble_padding: usize,
    pub border_elements_length: usize,
    pub outer_padding_percentage: f32,
}

fn width(text: &str) -> usize {
    return text.chars().count();
}

fn repeat(text: &str, count: usize) -> String {
    return [text].repeat(count).join("");
}

/// Word wraps `line` to rows of at most `max` characters. Words longer than a
/// row are hard split.
pub fn wrap_line(line: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    let mut rows = vec![];
    let mut words: Vec<String> = vec![];
    let mut row_len = 0;

    for word in line.split(' ') {
        let mut word = word.to_string();
        while width(&word) > max {
            if !words.is_empty() {
                rows.push(words.join(" "));
                words = vec![];
                row_len = 0;
            }
            rows.push(word.chars().take(max).collect());
            word = word.chars().skip(max).collect();
        }

        let word_len = width(&word);
        if !words.is_empty() && row_len + word_len > max {
            rows.push(words.join(" "));
            words = vec![];
            row_len = 0;
        }

        words.push(word);
        row_len += word_len + 1;
    }

    rows.push(words.join(" "));
    return rows;
}

impl<'a> Bubble<'a> {
    pub fn new(
        message: &'a Message,
        alignment: BubbleAlignment,
        palette: &'a Palette,
        window_max_width: usize,
    ) -> Bubble<'a> {
        return Bubble {
            alignment,
            message,
            palette,
            window_max_width,
        };
    }

    pub fn style_config() -> BubbleConfig {
        return BubbleConfig {
            // Unicode character border + padding.
            bubble_padding: 8,
            // left border + left padding + (text, not counted) + right padding + right border +
            // scrollbar.
            border_elements_length: 5,
            outer_padding_percentage: 0.04,
        };
    }

    fn display_text(&self) -> String {
        if self.message.streaming {
            if self.message.content.is_empty() {
                return TYPING_INDICATOR.to_string();
            }
            return format!("{}{CURSOR}", self.message.content);
        }

        return self.message.content.to_string();
    }

    pub fn as_lines(&self) -> Vec<Line<'static>> {
        let text = self.display_text();
        let max_line_length = self.get_max_line_length(&text);

        let mut lines = vec![];
        for line in text.lines() {
            for row in wrap_line(line, max_line_length) {
                lines.push(self.text_to_line(row, max_line_length));
            }
        }

        if lines.is_empty() {
            lines.push(self.text_to_line("".to_string(), max_line_length));
        }

        return self.wrap_lines_in_bubble(lines, max_line_length);
    }

    fn text_to_line(&self, text: String, max_line_length: usize) -> Line<'static> {
        let fill = repeat(" ", max_line_length.saturating_sub(width(&text)));
        let outer_bubble_padding = repeat(
            " ",
            self.window_max_width
                .saturating_sub(max_line_length + Bubble::style_config().bubble_padding),
        );

        let mut text_style = Style::default().fg(self.palette.text);
        if self.message.streaming && self.message.content.is_empty() {
            text_style = Style::default().fg(self.palette.muted);
        }

        let wrapped_spans = vec![
            self.border_span("│ ".to_string()),
            Span::styled(text, text_style),
            self.border_span(format!("{fill} │")),
        ];

        if self.alignment == BubbleAlignment::Left {
            let mut spans = wrapped_spans;
            spans.push(Span::from(outer_bubble_padding));
            return Line::from(spans);
        }

        let mut spans = vec![Span::from(outer_bubble_padding)];
        spans.extend(wrapped_spans);
        return Line::from(spans);
    }

    fn get_max_line_length(&self, text: &str) -> usize {
        let style_config = Bubble::style_config();
        // Add a minimum 4% of padding on the side.
        let min_bubble_padding_length = ((self.window_max_width as f32
            * style_config.outer_padding_percentage)
            .ceil()) as usize;

        // Border elements + minimum bubble padding.
        let line_border_width = style_config.border_elements_length + min_bubble_padding_length;

        let mut max_line_length = text.lines().map(width).max().unwrap_or(0);
        max_line_length =
            max_line_length.min(self.window_max_width.saturating_sub(line_border_width));

        // The border labels always fit.
        let author_len = width(&self.message.author());
        let time_len = self
            .message
            .display_time()
            .map(|time| return width(&time))
            .unwrap_or(0);

        return max_line_length.max(author_len).max(time_len);
    }

    fn wrap_lines_in_bubble(
        &self,
        lines: Vec<Line<'static>>,
        max_line_length: usize,
    ) -> Vec<Line<'static>> {
        // Add 2 for the vertical bars.
        let bar_length = max_line_length + 2;
        let author = self.message.author();
        let time = self.message.display_time().unwrap_or_default();

        let top_bar = format!(
            "╭{author}{}╮",
            repeat("─", bar_length.saturating_sub(width(&author)))
        );
        let bottom_bar = format!(
            "╰{}{time}╯",
            repeat("─", bar_length.saturating_sub(width(&time)))
        );
        let bar_bubble_padding = repeat(
            " ",
            self.window_max_width
                .saturating_sub(max_line_length + Bubble::style_config().bubble_padding),
        );

        let mut res = vec![];
        if self.alignment == BubbleAlignment::Left {
            res.push(self.border_line(format!("{top_bar}{bar_bubble_padding}")));
            res.extend(lines);
            res.push(self.border_line(format!("{bottom_bar}{bar_bubble_padding}")));
        } else {
            res.push(self.border_line(format!("{bar_bubble_padding}{top_bar}")));
            res.extend(lines);
            res.push(self.border_line(format!("{bar_bubble_padding}{bottom_bar}")));
        }

        return res;
    }

    fn border_colour(&self) -> Color {
        if self.message.role == Role::User {
            return self.palette.user_bubble;
        }

        if self.message.is_error() {
            return self.palette.error;
        }

        if let Some(route_tag) = self.message.route_tag {
            if !self.message.streaming {
                return route_tag.colour();
            }
        }

        return self.palette.assistant_bubble;
    }

    fn border_span(&self, text: String) -> Span<'static> {
        return Span::styled(text, Style::default().fg(self.border_colour()));
    }

    fn border_line(&self, text: String) -> Line<'static> {
        return Line::from(self.border_span(text));
    }
}
