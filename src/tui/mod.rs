//! Interactive terminal UI: live search-as-you-type over the same
//! pipeline the console mode uses, with superseded searches cancelled
//! cooperatively rather than queued.

mod app;
mod ui;

use std::io;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use app::App;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::config::SearchOptions;

pub fn run(options: Arc<SearchOptions>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(options);
    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend + io::Write>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.poll_search();
        terminal.draw(|f| ui::draw(f, app))?;

        // Poll with a timeout so background search results surface even
        // while the user is idle
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            match (key.modifiers, key.code) {
                (KeyModifiers::CONTROL, KeyCode::Char('c'))
                | (KeyModifiers::CONTROL, KeyCode::Char('q')) => return Ok(()),
                _ => {}
            }

            match key.code {
                KeyCode::Esc => {
                    if app.query.is_empty() {
                        return Ok(());
                    }
                    app.clear_query();
                }
                KeyCode::Enter => {
                    if let Some((location, line)) = app.selected_target() {
                        open_in_editor(terminal, &location, line)?;
                    }
                }
                KeyCode::Down | KeyCode::Tab => app.select_next(),
                KeyCode::Up | KeyCode::BackTab => app.select_prev(),
                KeyCode::PageDown => app.select_page_down(),
                KeyCode::PageUp => app.select_page_up(),
                KeyCode::Char(c) => {
                    app.query.push(c);
                    app.execute_search();
                }
                KeyCode::Backspace => {
                    app.query.pop();
                    app.execute_search();
                }
                _ => {}
            }
        }
    }
}

/// Suspend the TUI, hand the terminal to $EDITOR at the given line, and
/// restore the interface afterwards.
fn open_in_editor<B: ratatui::backend::Backend + io::Write>(
    terminal: &mut Terminal<B>,
    location: &str,
    line: usize,
) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let _ = Command::new(&editor)
        .arg(format!("+{line}"))
        .arg(location)
        .status();

    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()?;

    Ok(())
}
