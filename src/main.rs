use std::io;
use std::sync::Arc;
use std::time::Duration;

use attribute_extractor::config::AppConfig;
use attribute_extractor::core::extractor::{
    AttributeGenerator, CandidateSheet, DrawOutcome, ExtractorPhase, ExtractorSession,
    HttpCharacterClient, Selection, SpiritMode,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use tokio::runtime::Runtime;

struct App {
    session: ExtractorSession,
    runtime: Runtime,
    input: String,
    status: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Some(character_name) = std::env::args().nth(1) else {
        eprintln!("Usage: attribute-extractor <character-name>");
        std::process::exit(2);
    };

    let config = AppConfig::load();
    let _log_guard = attribute_extractor::core::logging::init_tui(&config.log_dir());
    log::info!("Attribute Extractor v{} starting", attribute_extractor::VERSION);

    let sink = Arc::new(HttpCharacterClient::new(&config.api)?);
    let generator = AttributeGenerator::from_seed_option(config.extractor.seed);
    let session = ExtractorSession::with_generator(&character_name, generator, sink)?;

    let mut app = App {
        session,
        runtime: Runtime::new()?,
        input: String::new(),
        status: "Press d to draw.".to_string(),
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(
        &mut terminal,
        &mut app,
        Duration::from_millis(config.tui.tick_rate_ms),
    );

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    if let Some(sheet) = app.session.final_sheet() {
        println!(
            "{} submitted as {} with spirit {}. Pending review.",
            sheet.name,
            sheet.role(),
            sheet.spirit().name
        );
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> io::Result<()> {
    loop {
        terminal.draw(|frame| {
            let chunks = Layout::vertical([
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(4),
                Constraint::Length(3),
            ])
            .split(frame.area());

            let header = Paragraph::new(Line::from(vec![
                Span::styled(
                    " Attribute Extractor ",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(
                    "- {} ({}/{} draws)",
                    app.session.character_name(),
                    app.session.draw_count(),
                    attribute_extractor::core::extractor::MAX_DRAWS
                )),
            ]))
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(header, chunks[0]);

            let history: Vec<Line> = app
                .session
                .history()
                .iter()
                .enumerate()
                .map(|(i, sheet)| history_line(i, sheet))
                .collect();
            let history = Paragraph::new(history)
                .block(Block::default().title(" Draws ").borders(Borders::ALL));
            frame.render_widget(history, chunks[1]);

            let status = Paragraph::new(vec![Line::raw(app.status.clone()), prompt_line(app)])
                .block(Block::default().title(" Status ").borders(Borders::ALL));
            frame.render_widget(status, chunks[2]);

            let footer = Paragraph::new(Line::from(key_hints(app)))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(footer, chunks[3]);
        })?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.code == KeyCode::Esc {
                    return Ok(());
                }
                if handle_key(app, key.code) {
                    return Ok(());
                }
            }
        }
    }
}

/// Apply one key press. Returns true when the app should exit.
fn handle_key(app: &mut App, code: KeyCode) -> bool {
    let entering_name = app.session.spirit_mode() == Some(SpiritMode::EnteringName);

    if entering_name {
        match code {
            KeyCode::Char(c) => app.input.push(c),
            KeyCode::Backspace => {
                app.input.pop();
            }
            KeyCode::Enter => {
                let name = app.input.clone();
                let result = app
                    .runtime
                    .block_on(app.session.confirm_custom_spirit(&name));
                app.input.clear();
                app.status = match result {
                    Ok(_) => "Submitted. Pending review. Press q to exit.".to_string(),
                    Err(e) => e.to_string(),
                };
            }
            _ => {}
        }
        return false;
    }

    match (app.session.phase(), code) {
        (_, KeyCode::Char('q')) => return true,
        (ExtractorPhase::Drawing | ExtractorPhase::AwaitingChoice, KeyCode::Char('d')) => {
            app.status = match app.session.draw() {
                Ok(DrawOutcome::Drawn { sheet, remaining }) if sheet.is_rare() => {
                    format!("Rare {} draw! {} left.", sheet.best_rank(), remaining)
                }
                Ok(DrawOutcome::Drawn { remaining, .. }) => format!("{} draws left.", remaining),
                Ok(DrawOutcome::ChoiceOpened) => "All draws used. Pick one with 0-9.".to_string(),
                Err(e) => e.to_string(),
            };
        }
        (ExtractorPhase::AwaitingChoice, KeyCode::Char(c)) if c.is_ascii_digit() => {
            let index = c.to_digit(10).map(|d| d as usize).unwrap_or_default();
            let result = app.runtime.block_on(app.session.select(index));
            app.status = match result {
                Ok(Selection::SpiritPending(spirit)) => {
                    format!("Spirit: {} ({}). Accept with a, reject with r.", spirit.name, spirit.kind.as_str())
                }
                Ok(Selection::Finalized(_)) => {
                    "Submitted. Pending review. Press q to exit.".to_string()
                }
                Err(e) => e.to_string(),
            };
        }
        (ExtractorPhase::AwaitingSpiritConfirmation, KeyCode::Char('a')) => {
            let result = app.runtime.block_on(app.session.accept_spirit());
            app.status = match result {
                Ok(_) => "Submitted. Pending review. Press q to exit.".to_string(),
                Err(e) => e.to_string(),
            };
        }
        (ExtractorPhase::AwaitingSpiritConfirmation, KeyCode::Char('r')) => {
            app.status = match app.session.reject_spirit() {
                Ok(()) => "Type a spirit name and press Enter.".to_string(),
                Err(e) => e.to_string(),
            };
        }
        _ => {}
    }

    false
}

fn history_line(index: usize, sheet: &CandidateSheet) -> Line<'static> {
    let style = if sheet.is_rare() {
        Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(Span::styled(
        format!(
            " [{}] {:<8} mental {:<4} physical {:<4} gold {:>5}  {:<11} {} ({})",
            index,
            sheet.role.as_str(),
            sheet.mental_rank.as_str(),
            sheet.physical_rank.as_str(),
            sheet.gold,
            sheet.ability.as_str(),
            sheet.spirit.name,
            sheet.spirit.kind.as_str(),
        ),
        style,
    ))
}

fn prompt_line(app: &App) -> Line<'static> {
    match app.session.spirit_mode() {
        Some(SpiritMode::EnteringName) => Line::from(vec![
            Span::styled("Spirit name: ", Style::default().fg(Color::Cyan)),
            Span::raw(app.input.clone()),
        ]),
        _ => Line::raw(""),
    }
}

fn key_hints(app: &App) -> Vec<Span<'static>> {
    let key = |k: &'static str| {
        Span::styled(k, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    };
    let mut hints = match (app.session.phase(), app.session.spirit_mode()) {
        (ExtractorPhase::Drawing, _) => vec![key(" d "), Span::raw("Draw  ")],
        (ExtractorPhase::AwaitingChoice, _) => vec![key(" 0-9 "), Span::raw("Select  ")],
        (_, Some(SpiritMode::Reviewing)) => vec![
            key(" a "),
            Span::raw("Accept spirit  "),
            key(" r "),
            Span::raw("Reject spirit  "),
        ],
        (_, Some(SpiritMode::EnteringName)) => vec![key(" Enter "), Span::raw("Confirm  ")],
        _ => vec![],
    };
    // Letters are typed into the name while entering one, so only Esc quits.
    let quit = if app.session.spirit_mode() == Some(SpiritMode::EnteringName) {
        " Esc "
    } else {
        " q/Esc "
    };
    hints.push(Span::styled(
        quit,
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    ));
    hints.push(Span::raw("Quit"));
    hints
}
