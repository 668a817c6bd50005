use ratatui::widgets::ScrollbarState;

#[derive(Default)]
pub struct Scroll {
    list_length: u16,
    viewport_length: u16,
    pub position: u16,
    pub scrollbar_state: ScrollbarState,
}

impl Scroll {
    pub fn up(&mut self) {
        self.position = self.position.saturating_sub(1);
        self.scrollbar_state = self.scrollbar_state.position(self.position.into());
    }

    pub fn up_page(&mut self) {
        for _ in 0..10 {
            self.up();
        }
    }

    pub fn down(&mut self) {
        let max = self.list_length.saturating_sub(self.viewport_length);
        self.position = self.position.saturating_add(1).min(max);
        self.scrollbar_state = self.scrollbar_state.position(self.position.into());
    }

    pub fn down_page(&mut self) {
        for _ in 0..10 {
            self.down();
        }
    }

    pub fn last(&mut self) {
        self.position = self.list_length.saturating_sub(self.viewport_length);
        self.scrollbar_state = self.scrollbar_state.position(self.position.into());
    }

    pub fn set_state(&mut self, list_length: u16, viewport_length: u16) {
        self.list_length = list_length;
        self.viewport_length = viewport_length;
        self.position = self
            .position
            .min(list_length.saturating_sub(viewport_length));
        self.scrollbar_state = self
            .scrollbar_state
            .content_length(list_length.saturating_sub(viewport_length).into())
            .viewport_content_length(viewport_length.into())
            .position(self.position.into());
    }
}
