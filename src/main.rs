mod app;
mod event;
mod ui;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use cardorbit::config::{BackendKind, Config};
use cardorbit::deck::Face;
use cardorbit::session::StudyMode;
use cardorbit::session::learn::LearnPhase;
use cardorbit::store::json_store::JsonStore;

use app::{App, AppScreen, FRAME_INTERVAL, ImportField, MenuFocus, SETTINGS_COUNT};
use event::{AppEvent, EventHandler};
use ui::components::challenge_prompt::ChallengePrompt;
use ui::components::deck_table::DeckTable;
use ui::components::learn_card::LearnCard;
use ui::components::orbit_board::OrbitBoard;
use ui::layout::{AppLayout, pack_hint_lines};
use ui::line_input::LineInput;
use ui::theme::ThemeColors;

#[derive(Parser)]
#[command(name = "cardorbit", version, about = "Terminal flashcard trainer")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Maximum number of cards in orbit at once")]
    orbit: Option<usize>,

    #[arg(short, long, help = "Show the back language first")]
    reversed: bool,

    #[arg(long, value_enum, help = "Where the deck is stored")]
    backend: Option<BackendKind>,

    #[arg(long, help = "Base URL of the deck API (http backend)")]
    api_base: Option<String>,

    #[arg(long, num_args = 1.., value_name = "FILE", help = "Import cards from files before starting")]
    import: Vec<PathBuf>,
}

/// The terminal belongs to the UI, so logs go to a file next to the deck.
fn init_logging() {
    let dir = JsonStore::default_dir();
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("cardorbit.log"))
    else {
        return;
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut config = Config::load().unwrap_or_else(|e| {
        log::warn!("config unreadable, using defaults: {e:#}");
        Config::default()
    });
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(api_base) = cli.api_base {
        config.api_base = api_base;
    }

    let mut app = App::new(config);

    if let Some(orbit) = cli.orbit {
        app.config.max_orbit_size = orbit;
        app.config.validate();
    }
    if cli.reversed {
        app.config.is_reversed = true;
    }
    if let Some(theme_name) = cli.theme {
        if !app.set_theme(&theme_name) {
            log::warn!("unknown theme {theme_name}");
        }
    }
    if !cli.import.is_empty() {
        let report = app.import_paths(&cli.import)?;
        println!("{report}");
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(FRAME_INTERVAL);

    let result = run_app(&mut terminal, &mut app, &events);

    app.flush();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        log::error!("{err:?}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        // Ticks only arrive when input is idle, so time is measured on
        // every event rather than counted in ticks.
        app.update(Instant::now());
        terminal.draw(|frame| {
            app.set_viewport(frame.area());
            render(frame, app);
        })?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
            AppEvent::Tick | AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Study => handle_study_key(app, key),
        AppScreen::Deck => handle_deck_key(app, key),
        AppScreen::Import => handle_import_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Tab | KeyCode::BackTab => app.toggle_menu_focus(),
        KeyCode::Char('a') => app.filter.clear(),
        KeyCode::Char('e') => app.export(),
        KeyCode::Up | KeyCode::Char('k') => match app.menu_focus {
            MenuFocus::Modes => app.menu.prev(),
            MenuFocus::Categories => app.category_prev(),
        },
        KeyCode::Down | KeyCode::Char('j') => match app.menu_focus {
            MenuFocus::Modes => app.menu.next(),
            MenuFocus::Categories => app.category_next(),
        },
        KeyCode::Char(' ') if app.menu_focus == MenuFocus::Categories => {
            app.toggle_selected_category()
        }
        KeyCode::Enter => match app.menu_focus {
            MenuFocus::Modes => {
                if let Some(action) = app.menu.selected_action() {
                    app.run_menu_action(action);
                }
            }
            MenuFocus::Categories => app.toggle_selected_category(),
        },
        KeyCode::Char(ch) => {
            if let Some(action) = app.menu.action_for_key(ch) {
                app.run_menu_action(action);
            }
        }
        _ => {}
    }
}

fn handle_study_key(app: &mut App, key: KeyEvent) {
    let Some(session) = app.session.as_ref() else {
        app.go_to_menu();
        return;
    };
    let mode = session.mode();

    if session.is_finished() {
        match key.code {
            KeyCode::Char('r') => app.restart_session(),
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => app.go_to_menu(),
            _ => {}
        }
        return;
    }

    if app.prompt_open() {
        app.handle_answer_key(key);
        return;
    }

    match (mode, key.code) {
        (_, KeyCode::Char('q') | KeyCode::Esc) => app.go_to_menu(),
        (StudyMode::Learn, KeyCode::Char(' ') | KeyCode::Enter) => app.study_primary(None),
        (StudyMode::Learn, KeyCode::Char('f') | KeyCode::Up | KeyCode::Down) => {
            app.with_session(|s| s.flip())
        }
        (StudyMode::Learn, KeyCode::Char('n') | KeyCode::Right) => app.with_session(|s| s.next()),
        (StudyMode::Learn, KeyCode::Char('r') | KeyCode::Left) => {
            app.with_session(|s| s.requeue())
        }
        (StudyMode::Learn, KeyCode::Char('a')) => app.with_session(|s| s.toggle_autoplay()),
        (StudyMode::Learn, KeyCode::Char('t')) => app.toggle_narration(),
        (_, KeyCode::Tab | KeyCode::Right | KeyCode::Char('l')) => app.cycle_focus(true),
        (_, KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h')) => app.cycle_focus(false),
        (_, KeyCode::Char(' ') | KeyCode::Enter) => app.study_primary(app.focused),
        (_, KeyCode::Char('r')) => app.study_secondary(app.focused),
        (StudyMode::Challenge, KeyCode::Char('n')) => {
            app.with_session(|s| s.toggle_auto_random_next())
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.screen != AppScreen::Study {
        return;
    }
    let Some(mode) = app.session.as_ref().map(|s| s.mode()) else {
        return;
    };
    let (col, row) = (mouse.column, mouse.row);
    let in_study_area = ui::layout::contains(app.study_area(), col, row);

    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) if mode.is_orbit() => app.hover(col, row),
        MouseEventKind::Down(MouseButton::Left) if in_study_area => match mode {
            StudyMode::Learn => app.study_primary(None),
            _ if !app.prompt_open() => app.study_primary(app.card_at(col, row)),
            _ => {}
        },
        MouseEventKind::Down(MouseButton::Right) if in_study_area => match mode {
            StudyMode::Learn => app.study_secondary(None),
            _ if !app.prompt_open() => app.study_secondary(app.card_at(col, row)),
            _ => {}
        },
        _ => {}
    }
}

fn handle_deck_key(app: &mut App, key: KeyEvent) {
    if app.confirm_reset {
        match key.code {
            KeyCode::Char('y') => app.reset_progress(),
            KeyCode::Char('n') | KeyCode::Esc => app.confirm_reset = false,
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Down | KeyCode::Char('j') => app.deck_next(),
        KeyCode::Up | KeyCode::Char('k') => app.deck_prev(),
        KeyCode::Char('x') | KeyCode::Delete => app.delete_selected(),
        KeyCode::Char('u') => app.undo_delete(),
        KeyCode::Char('R') => app.confirm_reset = true,
        KeyCode::Char('e') => app.export(),
        _ => {}
    }
}

fn handle_import_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Down => app.import_field_toggle(),
        _ => app.handle_import_key(key),
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.leave_settings(),
        KeyCode::Up | KeyCode::Char('k') => {
            app.settings_selected = app.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.settings_selected + 1 < SETTINGS_COUNT {
                app.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_cycle_forward(),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle_backward(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Study => render_study(frame, app),
        AppScreen::Deck => render_deck(frame, app),
        AppScreen::Import => render_import(frame, app),
        AppScreen::Settings => render_settings(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, area: Rect, colors: &ThemeColors, title: &str, info: &str) {
    let header = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!(" {title} "),
                Style::default()
                    .fg(colors.header_fg())
                    .bg(colors.header_bg())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                info.to_string(),
                Style::default().fg(colors.muted()).bg(colors.header_bg()),
            ),
        ]),
    ])
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, area: Rect, colors: &ThemeColors, hints: &[&str], status: Option<&str>) {
    let mut lines: Vec<Line> = Vec::new();
    if let Some(status) = status {
        lines.push(Line::from(Span::styled(
            format!("  {status}"),
            Style::default().fg(colors.warning()),
        )));
    }
    for hint in pack_hint_lines(hints, area.width as usize) {
        lines.push(Line::from(Span::styled(hint, Style::default().fg(colors.muted()))));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let layout = AppLayout::new(frame.area());

    let info = format!(
        "| {} cards | {} selected | filter: {} ",
        app.store.len(),
        app.filtered_count(),
        app.filter.label(),
    );
    render_header(frame, layout.header, colors, "cardorbit", &info);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(layout.main);

    frame.render_widget(&app.menu, columns[0]);

    let focused = app.menu_focus == MenuFocus::Categories;
    let block = Block::bordered()
        .title(" Categories ")
        .border_style(Style::default().fg(if focused {
            colors.border_focused()
        } else {
            colors.border()
        }));
    let inner = block.inner(columns[1]);
    frame.render_widget(block, columns[1]);

    let categories = app.categories();
    let lines: Vec<Line> = categories
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let mark = if app.filter.is_selected(category) { "[x]" } else { "[ ]" };
            let is_cursor = focused && i == app.category_selected;
            let style = if is_cursor {
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            Line::from(Span::styled(format!(" {mark} {category}"), style))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);

    let hints = [
        "[1-3] Study",
        "[d] Deck",
        "[i] Import",
        "[c] Settings",
        "[Tab] Categories",
        "[Space] Toggle",
        "[a] All",
        "[e] Export",
        "[q] Quit",
    ];
    render_footer(frame, layout.footer, colors, &hints, app.status.as_deref());
}

fn render_study(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let layout = AppLayout::new(frame.area());
    let Some(session) = app.session.as_ref() else {
        return;
    };
    let mode = session.mode();
    let settings = session.settings();

    let mut info = format!(
        "| {} left | {} ",
        session.remaining(),
        app.filter.label()
    );
    if let Some(learn) = session.learn() {
        if learn.autoplay() {
            info.push_str("| autoplay ");
        }
        if settings.tts_enabled {
            info.push_str("| narration ");
        }
    }
    if let Some(challenge) = session.challenge() {
        if challenge.auto_random_next() {
            info.push_str("| auto next ");
        }
    }
    render_header(frame, layout.header, colors, mode.label(), &info);

    if session.is_finished() {
        let rect = ui::layout::centered_rect(40, 30, layout.main);
        frame.render_widget(Clear, rect);
        let block = Block::bordered()
            .border_style(Style::default().fg(colors.success()))
            .style(Style::default().bg(colors.panel()));
        let inner = block.inner(rect);
        frame.render_widget(block, rect);
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "All done!",
                Style::default().fg(colors.success()).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "[r] Again  [Esc] Menu",
                Style::default().fg(colors.muted()),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
        render_footer(frame, layout.footer, colors, &[], None);
        return;
    }

    let langs = &settings.langs;
    let reversed = settings.is_reversed;
    let hints: &[&str] = match mode {
        StudyMode::Learn => {
            if let (Some(learn), Some(head)) = (session.learn(), session.queue().head()) {
                let face = match learn.phase() {
                    LearnPhase::Showing(face) => face,
                    // Exits always start from the back face.
                    LearnPhase::Transitioning(_) => Face::Back,
                };
                let card = LearnCard::new(&head.card, face, langs, reversed, app.theme)
                    .transitioning(learn.is_transitioning());
                frame.render_widget(card, layout.main);
            }
            &[
                "[Space] Flip / next",
                "[n] Next",
                "[r] Again later",
                "[a] Autoplay",
                "[t] Narration",
                "[Esc] Menu",
            ]
        }
        StudyMode::Blitz | StudyMode::Challenge => {
            let board = OrbitBoard::new(session.queue(), langs, reversed, app.theme)
                .focused(app.focused.or(app.hovered));
            frame.render_widget(board, layout.main);

            let prompt = session
                .challenge()
                .and_then(|c| c.active_card().map(|id| (c.state(), id)))
                .and_then(|(state, id)| session.queue().get_active(id).map(|qc| (state, qc)));
            if let Some((state, qc)) = prompt {
                let prompt =
                    ChallengePrompt::new(&qc.card, state, &app.answer_input, langs, reversed, app.theme);
                frame.render_widget(prompt, layout.main);
            }

            if mode == StudyMode::Blitz {
                &[
                    "[click/Enter] Reveal",
                    "[right click/r] Later",
                    "[Tab] Next card",
                    "[Esc] Menu",
                ]
            } else {
                &[
                    "[click/Enter] Answer",
                    "[right click/r] Later",
                    "[Tab] Next card",
                    "[n] Auto next",
                    "[Esc] Menu",
                ]
            }
        }
    };
    render_footer(frame, layout.footer, colors, hints, None);
}

fn render_deck(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let layout = AppLayout::new(frame.area());

    let categories = app.categories().len();
    let info = format!("| {} cards in {categories} categories ", app.store.len());
    render_header(frame, layout.header, colors, "Deck", &info);

    let table = DeckTable::new(app.store.cards(), app.store.langs(), app.deck_selected, app.theme);
    frame.render_widget(table, layout.main);

    if app.confirm_reset {
        let rect = ui::layout::centered_rect(40, 20, layout.main);
        frame.render_widget(Clear, rect);
        let block = Block::bordered()
            .title(" Reset progress ")
            .border_style(Style::default().fg(colors.error()))
            .style(Style::default().bg(colors.panel()));
        let inner = block.inner(rect);
        frame.render_widget(block, rect);
        let text = Paragraph::new(vec![
            Line::from(""),
            Line::from("Set every study count back to zero?"),
            Line::from(""),
            Line::from(Span::styled("[y] Yes  [n] No", Style::default().fg(colors.muted()))),
        ])
        .alignment(Alignment::Center)
        .style(Style::default().fg(colors.fg()));
        frame.render_widget(text, inner);
    }

    let undo = app
        .store
        .pending_undo(Instant::now())
        .map(|card| format!("Deleted \"{}\". [u] Undo", card.front(app.store.langs())));
    let status = app.status.as_deref().or(undo.as_deref());
    let hints = [
        "[j/k] Move",
        "[x] Delete",
        "[u] Undo",
        "[R] Reset progress",
        "[e] Export",
        "[Esc] Back",
    ];
    render_footer(frame, layout.footer, colors, &hints, status);
}

fn input_line<'a>(input: &'a LineInput, focused: bool, colors: &ThemeColors) -> Line<'a> {
    let (before, cursor, after) = input.render_parts();
    let text_style = Style::default().fg(colors.fg());
    let mut spans = vec![Span::styled(before, text_style)];
    if focused {
        let cursor_style = Style::default().fg(colors.on_accent()).bg(colors.accent());
        spans.push(Span::styled(cursor.map_or(" ".to_string(), String::from), cursor_style));
    } else if let Some(ch) = cursor {
        spans.push(Span::styled(ch.to_string(), text_style));
    }
    spans.push(Span::styled(after, text_style));
    Line::from(spans)
}

fn render_import(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let layout = AppLayout::new(frame.area());
    render_header(frame, layout.header, colors, "Import", "| text, JSON or files ");

    let centered = ui::layout::centered_rect(80, 80, layout.main);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(centered);

    let fields = [
        (ImportField::Text, " Cards (Category > Front : Back, or JSON) ", &app.import_text),
        (ImportField::Files, " Files (separate with ;, Tab completes) ", &app.import_files),
    ];
    for (i, (field, title, input)) in fields.into_iter().enumerate() {
        let focused = app.import_field == field;
        let mut block = Block::bordered().title(title).border_style(Style::default().fg(if focused {
            colors.border_focused()
        } else {
            colors.border()
        }));
        if focused && field == ImportField::Files && input.completion_failed() {
            block = block.title_bottom(Span::styled(" no such directory ", Style::default().fg(colors.error())));
        }
        let inner = block.inner(rows[i]);
        frame.render_widget(block, rows[i]);
        frame.render_widget(Paragraph::new(input_line(input, focused, colors)), inner);
    }

    if let Some(message) = &app.import_message {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {message}"),
                Style::default().fg(colors.accent()),
            ))),
            rows[2],
        );
    }

    let help = vec![
        Line::from(Span::styled(" Examples:", Style::default().fg(colors.muted()))),
        Line::from(" Food > apple : manzana"),
        Line::from(" [{\"front\": \"dog\", \"back\": \"perro\", \"category\": \"Animals\"}]"),
        Line::from(" {\"cat\": \"gato\", \"bird\": \"pájaro\"}"),
        Line::from(Span::styled(
            " Files: one card per line, front and back split at the first ',' or ':'.",
            Style::default().fg(colors.muted()),
        )),
    ];
    frame.render_widget(
        Paragraph::new(help)
            .style(Style::default().fg(colors.fg()))
            .wrap(Wrap { trim: false }),
        rows[3],
    );

    let hints = ["[Enter] Import", "[Up/Down] Switch field", "[Esc] Back"];
    render_footer(frame, layout.footer, colors, &hints, None);
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let centered = ui::layout::centered_rect(60, 90, area);

    let block = Block::bordered()
        .title(" Settings ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let fields = app.settings_rows();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(fields.len() as u16 * 2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    Paragraph::new(Line::from(Span::styled(
        "  Use arrows to navigate, Enter/Right to change, ESC to save & exit",
        Style::default().fg(colors.muted()),
    )))
    .render(layout[0], frame.buffer_mut());

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(fields.iter().map(|_| Constraint::Length(2)).collect::<Vec<_>>())
        .split(layout[1]);

    for (i, (label, value)) in fields.iter().enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = Style::default()
            .fg(if is_selected { colors.accent() } else { colors.fg() })
            .add_modifier(if is_selected { Modifier::BOLD } else { Modifier::empty() });
        let value_style = Style::default().fg(if is_selected {
            colors.card_back()
        } else {
            colors.muted()
        });

        let line = Line::from(vec![
            Span::styled(format!("{indicator}{label}: "), label_style),
            Span::styled(format!("< {value} >"), value_style),
        ]);
        if let Some(slot) = field_layout.get(i) {
            Paragraph::new(line).render(*slot, frame.buffer_mut());
        }
    }

    Paragraph::new(Line::from(Span::styled(
        "  [ESC] Save & back  [Enter/arrows] Change value",
        Style::default().fg(colors.accent()),
    )))
    .render(layout[3], frame.buffer_mut());
}
