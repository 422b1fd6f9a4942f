use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use cardorbit::deck::{Card, LanguagePair};

use crate::ui::theme::Theme;

pub struct DeckTable<'a> {
    cards: &'a [Card],
    langs: &'a LanguagePair,
    selected: usize,
    theme: &'a Theme,
}

impl<'a> DeckTable<'a> {
    pub fn new(cards: &'a [Card], langs: &'a LanguagePair, selected: usize, theme: &'a Theme) -> Self {
        Self {
            cards,
            langs,
            selected,
            theme,
        }
    }
}

/// First visible row so that `selected` stays on screen.
fn scroll_offset(selected: usize, visible: usize, total: usize) -> usize {
    if visible == 0 || total <= visible {
        return 0;
    }
    selected
        .saturating_sub(visible / 2)
        .min(total - visible)
}

impl Widget for DeckTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" Deck ({} cards) ", self.cards.len()))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.cards.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "  No cards yet. Import some from the menu.",
                Style::default().fg(colors.muted()),
            )))
            .render(inner, buf);
            return;
        }

        let visible = inner.height as usize;
        let offset = scroll_offset(self.selected, visible, self.cards.len());
        let front_width = (inner.width as usize / 3).max(8);

        let lines: Vec<Line> = self
            .cards
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(i, card)| {
                let is_selected = i == self.selected;
                let indicator = if is_selected { ">" } else { " " };
                let front: String = card.front(self.langs).chars().take(front_width).collect();
                let categories = card.categories.iter().cloned().collect::<Vec<_>>().join(", ");
                let row_style = if is_selected {
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg())
                };
                Line::from(vec![
                    Span::styled(format!(" {indicator} {front:<front_width$} "), row_style),
                    Span::styled(
                        format!("{}  ", card.back(self.langs)),
                        Style::default().fg(colors.card_back()),
                    ),
                    Span::styled(
                        format!("[{categories}] ×{}", card.study_count),
                        Style::default().fg(colors.muted()),
                    ),
                ])
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}
