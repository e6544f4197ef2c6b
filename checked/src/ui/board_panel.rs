//! Task board rendering: the pending and done sections, inline edit
//! fields, and the add-task row.

use chrono::{Datelike, Local, NaiveDate};
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, List, ListItem},
};

use checked_proto::task::Task;

use super::theme;
use crate::app::{App, RowTarget};
use crate::board::TextInput;

/// Terminal width below which rows collapse to the narrow two-line
/// layout.
const NARROW_WIDTH: u16 = 80;

/// Shown in the pending section when there is nothing left to do.
const EMPTY_MESSAGE: &str = "Nothing to do! Add a task below.";

/// Render the task board.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default();

    if app.board.is_loading() {
        let items = vec![ListItem::new(Line::from(Span::styled(
            "Loading tasks...",
            theme::dimmed(),
        )))];
        frame.render_widget(List::new(items).block(block), area);
        return;
    }

    let narrow = area.width < NARROW_WIDTH;
    let today = Local::now().date_naive();
    let (pending, done) = app.board.partition();
    let selected = app.selected_row();

    let mut items: Vec<ListItem> = Vec::new();

    items.push(section_header(
        "Tasks to do",
        pending.len(),
        app.board.pending_folded(),
    ));
    if !app.board.pending_folded() {
        if pending.is_empty() {
            items.push(ListItem::new(Line::from(Span::styled(
                format!("  {EMPTY_MESSAGE}"),
                theme::dimmed(),
            ))));
        }
        for (i, task) in pending.iter().enumerate() {
            let is_selected = selected == RowTarget::Pending(i);
            items.extend(task_row(app, task, today, narrow, is_selected));
        }
        items.push(add_row(app, selected == RowTarget::AddRow));
    }

    // The done section is hidden entirely while it is empty.
    if !done.is_empty() {
        items.push(ListItem::new(Line::raw("")));
        items.push(section_header(
            "Tasks done",
            done.len(),
            app.board.done_folded(),
        ));
        if !app.board.done_folded() {
            for (i, task) in done.iter().enumerate() {
                let is_selected = selected == RowTarget::Done(i);
                items.extend(task_row(app, task, today, narrow, is_selected));
            }
        }
    }

    frame.render_widget(List::new(items).block(block), area);
}

fn section_header(title: &str, count: usize, folded: bool) -> ListItem<'static> {
    let marker = if folded { "▸" } else { "▾" };
    ListItem::new(Line::from(vec![
        Span::styled(format!("{marker} {title}"), theme::section_header()),
        Span::styled(format!(" ({count})"), theme::dimmed()),
    ]))
}

/// Renders one task row: a single line when wide, name plus detail line
/// when narrow.
fn task_row<'a>(
    app: &'a App,
    task: &'a Task,
    today: NaiveDate,
    narrow: bool,
    is_selected: bool,
) -> Vec<ListItem<'a>> {
    let checkbox = if task.is_done {
        Span::styled("[✓]", theme::brand())
    } else {
        Span::styled("[ ]", theme::normal())
    };
    let row_style = if is_selected {
        theme::selected()
    } else {
        theme::normal()
    };

    let name_spans: Vec<Span<'a>> = match app.board.name_edit(&task.id) {
        Some(input) => edit_spans(input),
        None => {
            let style = if is_selected {
                row_style
            } else if task.is_done {
                theme::done_task()
            } else {
                theme::normal()
            };
            vec![Span::styled(task.name.as_str(), style)]
        }
    };

    let due_spans: Vec<Span<'a>> = match app.board.date_edit(&task.id) {
        Some(input) => edit_spans(input),
        None => match task.due_date {
            Some(date) => {
                let style = if !task.is_done && date < today {
                    theme::normal().fg(theme::OVERDUE)
                } else {
                    theme::dimmed()
                };
                vec![Span::styled(format_due_date(date, today), style)]
            }
            None => vec![],
        },
    };

    if narrow {
        // Card layout: checkbox and name, due date on its own line.
        let mut lines = vec![ListItem::new(Line::from(
            [vec![Span::raw("  "), checkbox, Span::raw(" ")], name_spans].concat(),
        ))];
        if !due_spans.is_empty() {
            lines.push(ListItem::new(Line::from(
                [vec![Span::raw("      due ")], due_spans].concat(),
            )));
        }
        lines
    } else {
        let mut spans = vec![Span::raw("  "), checkbox, Span::raw(" ")];
        spans.extend(name_spans);
        if !due_spans.is_empty() {
            spans.push(Span::raw("  ·  "));
            spans.extend(due_spans);
        }
        // Done rows carry no edit or delete affordances.
        if is_selected && !task.is_done {
            spans.push(Span::styled("   [e]dit [d]ue [x]delete", theme::dimmed()));
        }
        vec![ListItem::new(Line::from(spans))]
    }
}

/// Renders the add-task row: a prompt when idle, the input buffer while
/// typing.
fn add_row<'a>(app: &'a App, is_selected: bool) -> ListItem<'a> {
    if app.board.is_adding() {
        let mut spans = vec![Span::raw("  [+] ")];
        spans.extend(edit_spans(app.board.new_task_input()));
        ListItem::new(Line::from(spans))
    } else {
        let style = if is_selected {
            theme::selected()
        } else {
            theme::dimmed()
        };
        ListItem::new(Line::from(vec![
            Span::raw("  "),
            Span::styled("[+] Add a task", style),
        ]))
    }
}

/// Renders an edit buffer with a block cursor.
fn edit_spans(input: &TextInput) -> Vec<Span<'_>> {
    let value = input.value();
    let byte = value
        .char_indices()
        .nth(input.cursor())
        .map_or(value.len(), |(i, _)| i);
    let (before, rest) = value.split_at(byte);
    let mut chars = rest.chars();
    let under_cursor = chars.next();
    let after = chars.as_str();

    let mut spans = vec![Span::styled(before, theme::edit_field())];
    match under_cursor {
        Some(c) => {
            spans.push(Span::styled(c.to_string(), theme::selected()));
            spans.push(Span::styled(after, theme::edit_field()));
        }
        None => spans.push(Span::styled(" ", theme::selected())),
    }
    spans
}

/// Formats a due date for display: "Today - 29 Aug" when the date is
/// today, otherwise "29 Aug".
#[must_use]
pub fn format_due_date(date: NaiveDate, today: NaiveDate) -> String {
    let day_month = format!("{} {}", date.day(), date.format("%b"));
    if date == today {
        format!("Today - {day_month}")
    } else {
        day_month
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_today_gets_the_prefix() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        assert_eq!(format_due_date(today, today), "Today - 29 Aug");
    }

    #[test]
    fn other_dates_are_day_and_short_month() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        let due = NaiveDate::from_ymd_opt(2026, 12, 1).unwrap();
        assert_eq!(format_due_date(due, today), "1 Dec");
    }
}
