//! Terminal UI rendering.

pub mod board_panel;
pub mod header;
pub mod status_bar;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::App;

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    header::render(frame, main_chunks[0], app);
    board_panel::render(frame, main_chunks[1], app);
    status_bar::render(frame, main_chunks[2], app);

    if app.sign_out_dialog {
        draw_sign_out_dialog(frame);
    }
}

/// Confirmation dialog shown before signing out.
fn draw_sign_out_dialog(frame: &mut Frame) {
    let area = centered_rect(44, 5, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(
            "Are you sure you want to logout?",
            theme::normal(),
        )),
        Line::raw(""),
        Line::from(vec![
            Span::styled("[Enter] Logout", theme::brand()),
            Span::raw("   "),
            Span::styled("[Esc] Stay", theme::dimmed()),
        ]),
    ];
    let dialog = Paragraph::new(lines).block(
        Block::default()
            .title("Sign out")
            .borders(Borders::ALL)
            .border_style(theme::brand()),
    );
    frame.render_widget(dialog, area);
}

/// A rect of the given size centered in `area`, clamped to fit.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
