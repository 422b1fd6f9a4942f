use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear, Paragraph, Widget};

use cardorbit::deck::{CardId, LanguagePair};
use cardorbit::session::queue::{QueuedCard, SessionQueue};

use crate::ui::layout::card_rect;
use crate::ui::theme::Theme;

/// Floating cards for Blitz and Challenge. Later cards paint over earlier ones,
/// so hit-testing walks the active set in reverse.
pub struct OrbitBoard<'a> {
    queue: &'a SessionQueue,
    langs: &'a LanguagePair,
    reversed: bool,
    focused: Option<CardId>,
    theme: &'a Theme,
}

impl<'a> OrbitBoard<'a> {
    pub fn new(
        queue: &'a SessionQueue,
        langs: &'a LanguagePair,
        reversed: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            queue,
            langs,
            reversed,
            focused: None,
            theme,
        }
    }

    pub fn focused(mut self, focused: Option<CardId>) -> Self {
        self.focused = focused;
        self
    }

    fn render_card(&self, qc: &QueuedCard, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let rect = card_rect(area, &qc.physics, &self.queue.bounds());
        if rect.width < 3 || rect.height < 3 {
            return;
        }

        let id = qc.id();
        let revealed = self.queue.is_revealed(id);
        let color = if self.queue.is_fading(id) {
            colors.card_fading()
        } else if revealed {
            colors.card_revealed()
        } else {
            colors.card_front()
        };
        let is_focused = self.focused == Some(id);
        let border_type = if is_focused {
            BorderType::Thick
        } else {
            BorderType::Rounded
        };

        Clear.render(rect, buf);
        let block = Block::bordered()
            .border_type(border_type)
            .border_style(Style::default().fg(if is_focused {
                colors.border_focused()
            } else {
                color
            }))
            .style(Style::default().bg(colors.panel()));
        let inner = block.inner(rect);
        block.render(rect, buf);

        let front = qc.card.face_text(cardorbit::deck::Face::Front, self.langs, self.reversed);
        let mut lines = vec![Line::styled(
            front.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )];
        if revealed {
            let back = qc.card.recall_target(self.langs, self.reversed);
            lines.push(Line::styled(back.to_string(), Style::default().fg(colors.card_back())));
        }
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(inner, buf);
    }
}

impl Widget for OrbitBoard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for qc in self.queue.active() {
            self.render_card(qc, area, buf);
        }
    }
}

/// The topmost card under a terminal cell.
pub fn card_at(queue: &SessionQueue, area: Rect, column: u16, row: u16) -> Option<CardId> {
    let bounds = queue.bounds();
    queue
        .active()
        .iter()
        .rev()
        .find(|qc| crate::ui::layout::contains(card_rect(area, &qc.physics, &bounds), column, row))
        .map(QueuedCard::id)
}
