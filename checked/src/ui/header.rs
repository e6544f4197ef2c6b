//! App header rendering: title, signed-in user, sign-out hint.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::theme;
use crate::app::App;

/// Render the header bar at the top of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let title = Line::from(vec![
        Span::styled("✓ ", theme::brand()),
        Span::styled("Checked", theme::brand()),
        Span::raw("  "),
        Span::styled(app.user.as_str(), theme::dimmed()),
        Span::styled("  [q] sign out", theme::dimmed()),
    ]);

    let paragraph = Paragraph::new(title)
        .block(Block::default().borders(Borders::BOTTOM).border_style(theme::dimmed()));
    frame.render_widget(paragraph, area);
}
