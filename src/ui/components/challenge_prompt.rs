use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use cardorbit::deck::{Card, LanguagePair};
use cardorbit::session::challenge::{ChallengeState, Feedback, MAX_ATTEMPTS};

use crate::ui::layout::centered_rect;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

pub struct ChallengePrompt<'a> {
    card: &'a Card,
    state: ChallengeState,
    input: &'a LineInput,
    langs: &'a LanguagePair,
    reversed: bool,
    theme: &'a Theme,
}

impl<'a> ChallengePrompt<'a> {
    pub fn new(
        card: &'a Card,
        state: ChallengeState,
        input: &'a LineInput,
        langs: &'a LanguagePair,
        reversed: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            card,
            state,
            input,
            langs,
            reversed,
            theme,
        }
    }
}

impl Widget for ChallengePrompt<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let (attempts, feedback) = match self.state {
            ChallengeState::Active {
                attempts, feedback, ..
            } => (attempts, feedback),
            ChallengeState::Idle => (0, Feedback::None),
        };

        let border = match feedback {
            Feedback::None => colors.border_focused(),
            Feedback::Correct => colors.success(),
            Feedback::Wrong => colors.error(),
            Feedback::Revealing => colors.warning(),
        };

        let rect = centered_rect(50, 40, area);
        Clear.render(rect, buf);
        let block = Block::bordered()
            .title(" Challenge ")
            .title_bottom(format!(" attempt {}/{MAX_ATTEMPTS} ", (attempts + 1).min(MAX_ATTEMPTS)))
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.panel()));
        let inner = block.inner(rect);
        block.render(rect, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(inner);

        let prompt = self
            .card
            .face_text(cardorbit::deck::Face::Front, self.langs, self.reversed);
        Paragraph::new(Line::from(Span::styled(
            prompt.to_string(),
            Style::default()
                .fg(colors.card_front())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        let message = match feedback {
            Feedback::None => Span::styled("Type the answer", Style::default().fg(colors.muted())),
            Feedback::Correct => Span::styled("Correct!", Style::default().fg(colors.success())),
            Feedback::Wrong => Span::styled("Not quite, try again", Style::default().fg(colors.error())),
            Feedback::Revealing => Span::styled(
                "Out of attempts, the answer was:",
                Style::default().fg(colors.warning()),
            ),
        };
        Paragraph::new(Line::from(message))
            .alignment(Alignment::Center)
            .render(layout[1], buf);

        let input_block = Block::bordered().border_style(Style::default().fg(colors.border()));
        let input_inner = input_block.inner(layout[2]);
        input_block.render(layout[2], buf);

        let (before, cursor, after) = self.input.render_parts();
        let text_style = Style::default().fg(colors.fg());
        let mut spans = vec![Span::styled(before.to_string(), text_style)];
        if feedback.is_terminal() {
            if let Some(ch) = cursor {
                spans.push(Span::styled(ch.to_string(), text_style));
            }
        } else {
            let cursor_style = Style::default().fg(colors.on_accent()).bg(colors.accent());
            spans.push(Span::styled(cursor.map_or(" ".to_string(), String::from), cursor_style));
        }
        spans.push(Span::styled(after.to_string(), text_style));
        Paragraph::new(Line::from(spans)).render(input_inner, buf);

        Paragraph::new(Line::from(Span::styled(
            "[Enter] Check  [Tab] Skip  [Esc] Close",
            Style::default().fg(colors.muted()),
        )))
        .alignment(Alignment::Center)
        .render(layout[3], buf);
    }
}
