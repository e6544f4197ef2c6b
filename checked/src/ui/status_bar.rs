//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, Connection};

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = if app.sign_out_dialog {
        "Enter/y: sign out | Esc/n: stay"
    } else if app.is_editing() {
        "Enter: save | Esc: cancel | ←→: move cursor"
    } else {
        "↑↓/jk: move | a: add | e: edit | d: due date | Space: toggle | x: delete | f: fold | q: sign out"
    };

    let (dot_color, status_text) = match app.connection {
        Connection::Online => (theme::SUCCESS, app.connection.label()),
        Connection::Offline => (theme::OFFLINE, app.connection.label()),
    };

    let status_line = Line::from(vec![
        Span::styled("Checked", theme::bold()),
        Span::raw(" | "),
        Span::styled("●", theme::normal().fg(dot_color)),
        Span::raw(format!(" {status_text}")),
        Span::raw(" | "),
        Span::styled(help_text, theme::dimmed()),
    ]);

    let paragraph = Paragraph::new(status_line).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
