use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use cardorbit::deck::{Card, Face, LanguagePair};

use crate::ui::layout::centered_rect;
use crate::ui::theme::Theme;

/// The single card shown in Learn mode.
pub struct LearnCard<'a> {
    card: &'a Card,
    face: Face,
    langs: &'a LanguagePair,
    reversed: bool,
    transitioning: bool,
    theme: &'a Theme,
}

impl<'a> LearnCard<'a> {
    pub fn new(
        card: &'a Card,
        face: Face,
        langs: &'a LanguagePair,
        reversed: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            card,
            face,
            langs,
            reversed,
            transitioning: false,
            theme,
        }
    }

    pub fn transitioning(mut self, transitioning: bool) -> Self {
        self.transitioning = transitioning;
        self
    }

    fn lang_code(&self) -> &str {
        let show_back = (self.face == Face::Back) != self.reversed;
        if show_back {
            &self.langs.back
        } else {
            &self.langs.front
        }
    }
}

impl Widget for LearnCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let rect = centered_rect(50, 50, area);

        let (accent, title) = match self.face {
            Face::Front => (colors.card_front(), " front "),
            Face::Back => (colors.card_back(), " back "),
        };
        let border = if self.transitioning {
            colors.card_fading()
        } else {
            accent
        };

        Clear.render(rect, buf);
        let block = Block::bordered()
            .title(title)
            .title_bottom(format!(" {} ", self.lang_code()))
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.panel()));
        let inner = block.inner(rect);
        block.render(rect, buf);

        let text = self.card.face_text(self.face, self.langs, self.reversed);
        let categories = self
            .card
            .categories
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");

        let pad = inner.height.saturating_sub(4) / 2;
        let mut lines: Vec<Line> = (0..pad).map(|_| Line::from("")).collect();
        lines.push(Line::from(Span::styled(
            text.to_string(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("{categories}  ·  studied {}×", self.card.study_count),
            Style::default().fg(colors.muted()),
        )));

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
