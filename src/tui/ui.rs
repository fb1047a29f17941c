//! TUI rendering.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::tui::app::{App, ResultRow};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // query input
            Constraint::Min(5),    // results
            Constraint::Length(1), // status bar
        ])
        .split(f.area());

    draw_query_input(f, app, chunks[0]);
    draw_results(f, app, chunks[1]);
    draw_status_bar(f, app, chunks[2]);
}

fn draw_query_input(f: &mut Frame, app: &App, area: Rect) {
    let input = Paragraph::new(app.query.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(" Search "));

    f.render_widget(input, area);
    f.set_cursor_position((area.x + app.query.len() as u16 + 1, area.y + 1));
}

fn draw_results(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .results
        .iter()
        .enumerate()
        .map(|(idx, row)| result_item(row, idx == app.selected, area.width as usize))
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Results "));

    let mut state = ListState::default();
    state.select((!app.results.is_empty()).then_some(app.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn result_item(row: &ResultRow, selected: bool, width: usize) -> ListItem<'static> {
    let header_style = if selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    };

    let header = Line::from(vec![
        Span::styled(row.location.clone(), header_style),
        Span::styled(
            format!(" ({:.3})", row.score),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    ListItem::new(vec![header, snippet_line(row, width)])
}

/// Render the snippet with match intervals emphasised, truncated to the
/// visible width on a char boundary.
fn snippet_line(row: &ResultRow, width: usize) -> Line<'static> {
    let max = width.saturating_sub(4).max(8);
    let text = &row.snippet;

    let mut spans: Vec<Span> = Vec::new();
    let mut cursor = 0;

    let plain = Style::default().fg(Color::Gray);
    let matched = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);

    for interval in &row.highlights {
        // Offsets come from byte intervals over the original content;
        // anything that no longer lands on a char boundary after the
        // lossy conversion is skipped rather than risking a bad slice
        if interval[0] < cursor
            || interval[1] > text.len()
            || !text.is_char_boundary(interval[0])
            || !text.is_char_boundary(interval[1])
        {
            continue;
        }
        if interval[0] > cursor {
            spans.push(Span::styled(text[cursor..interval[0]].to_string(), plain));
        }
        spans.push(Span::styled(
            text[interval[0]..interval[1]].to_string(),
            matched,
        ));
        cursor = interval[1];
    }
    if cursor < text.len() {
        spans.push(Span::styled(text[cursor..].to_string(), plain));
    }

    // Truncate accumulated spans to the display width
    let mut budget = max;
    let mut clipped: Vec<Span> = Vec::new();
    for span in spans {
        if budget == 0 {
            break;
        }
        let content: String = span.content.chars().take(budget).collect();
        budget -= content.chars().count().min(budget);
        clipped.push(Span::styled(content, span.style));
    }

    Line::from(clipped)
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(
            app.status_message.clone(),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            "  enter: open  esc: clear/quit  ctrl-c: quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    f.render_widget(status, area);
}
