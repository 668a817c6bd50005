#[cfg(test)]
#[path = "bubble_list_test.rs"]
mod tests;

use std::collections::HashMap;

use ratatui::prelude::Rect;
use ratatui::text::Line;
use ratatui::widgets::Block;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::Bubble;
use super::BubbleAlignment;
use crate::domain::models::Message;
use crate::domain::models::MessageId;
use crate::domain::models::Role;
use crate::domain::models::Theme;

struct BubbleCacheEntry {
    content_len: usize,
    streaming: bool,
    lines: Vec<Line<'static>>,
}

/// Rendered transcript. Bubbles are cached per message and only rebuilt when
/// their message changed.
pub struct BubbleList {
    cache: HashMap<MessageId, BubbleCacheEntry>,
    order: Vec<MessageId>,
    line_width: usize,
    lines_len: usize,
    theme: Theme,
}

impl BubbleList {
    pub fn new(theme: Theme) -> BubbleList {
        return BubbleList {
            cache: HashMap::new(),
            order: vec![],
            line_width: 0,
            lines_len: 0,
            theme,
        };
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.cache.clear();
    }

    pub fn set_messages(&mut self, messages: &[Message], line_width: usize) {
        if self.line_width != line_width {
            self.cache.clear();
            self.line_width = line_width;
        }

        self.order = messages
            .iter()
            .map(|message| return message.id)
            .collect();
        let order = &self.order;
        self.cache.retain(|id, _| return order.contains(id));

        let palette = self.theme.palette();
        self.lines_len = messages
            .iter()
            .map(|message| {
                if let Some(cache_entry) = self.cache.get(&message.id) {
                    if cache_entry.content_len == message.content.len()
                        && cache_entry.streaming == message.streaming
                    {
                        return cache_entry.lines.len();
                    }
                }

                let mut align = BubbleAlignment::Left;
                if message.role == Role::User {
                    align = BubbleAlignment::Right;
                }

                let bubble_lines = Bubble::new(message, align, &palette, line_width).as_lines();
                let bubble_line_len = bubble_lines.len();

                self.cache.insert(
                    message.id,
                    BubbleCacheEntry {
                        content_len: message.content.len(),
                        streaming: message.streaming,
                        lines: bubble_lines,
                    },
                );

                return bubble_line_len;
            })
            .sum();
    }

    pub fn len(&self) -> usize {
        return self.lines_len;
    }

    pub fn is_empty(&self) -> bool {
        return self.lines_len == 0;
    }

    fn lines(&self) -> Vec<Line<'static>> {
        return self
            .order
            .iter()
            .filter_map(|id| return self.cache.get(id))
            .flat_map(|entry| return entry.lines.to_owned())
            .collect();
    }

    pub fn render(&self, frame: &mut Frame, rect: Rect, scroll: u16) {
        frame.render_widget(
            Paragraph::new(self.lines())
                .block(Block::default())
                .scroll((scroll, 0)),
            rect,
        );
    }
}
