use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::form::{FormField, TaskForm};
use super::state::{ClientState, NotificationKind};
use crate::task::Task;

/// Colors for one theme.
struct Palette {
    background: Color,
    text: Color,
    muted: Color,
    surface: Color,
    accent: Color,
    error: Color,
    success: Color,
}

impl Palette {
    fn for_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Self {
                background: Color::Rgb(17, 24, 39),
                text: Color::White,
                muted: Color::Rgb(156, 163, 175),
                surface: Color::Rgb(31, 41, 55),
                accent: Color::Rgb(37, 99, 235),
                error: Color::Rgb(248, 113, 113),
                success: Color::Rgb(74, 222, 128),
            }
        } else {
            Self {
                background: Color::White,
                text: Color::Rgb(31, 41, 55),
                muted: Color::Rgb(107, 114, 128),
                surface: Color::Rgb(243, 244, 246),
                accent: Color::Rgb(37, 99, 235),
                error: Color::Rgb(220, 38, 38),
                success: Color::Rgb(22, 163, 74),
            }
        }
    }

    fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }
}

pub fn render(f: &mut Frame, state: &ClientState) {
    let palette = Palette::for_mode(state.dark_mode);
    let area = f.area();
    f.render_widget(Block::default().style(palette.base()), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    render_navbar(f, chunks[0], state, &palette);
    render_tasks(f, chunks[1], state, &palette);
    render_pager(f, chunks[2], state, &palette);
    render_footer(f, chunks[3], &palette);

    if let Some(form) = &state.modal {
        render_form(f, area, form, &palette);
    }
    if state.confirm_delete.is_some() {
        render_confirm(f, area, &palette);
    }
    render_notification(f, area, state, &palette);
}

fn render_navbar(f: &mut Frame, area: Rect, state: &ClientState, palette: &Palette) {
    let theme_hint = if state.dark_mode { "light" } else { "dark" };
    let line = Line::from(vec![
        Span::styled(
            " Task Manager ",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("   [n] Create task   "),
        Span::raw(format!("[t] {theme_hint} mode")),
    ]);
    let navbar = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::White).bg(palette.accent)),
    );
    f.render_widget(navbar, area);
}

fn render_tasks(f: &mut Frame, area: Rect, state: &ClientState, palette: &Palette) {
    let block = Block::default()
        .title(" Task List ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .style(palette.base());

    if state.tasks.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No tasks available",
            Style::default().fg(palette.muted),
        )))
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let inner = block.inner(area);
    f.render_widget(block, area);

    // Two columns by two rows, one card per slot.
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);
    let slots: Vec<Rect> = rows
        .iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(*row)
                .to_vec()
        })
        .collect();

    for (i, (task, slot)) in state.page_tasks().iter().zip(slots).enumerate() {
        render_card(f, slot, task, i == state.selected, palette);
    }
}

fn render_card(f: &mut Frame, area: Rect, task: &Task, selected: bool, palette: &Palette) {
    let description = if task.description.is_empty() {
        Span::styled("No description", Style::default().fg(palette.muted))
    } else {
        Span::raw(task.description.as_str())
    };
    let lines = vec![
        Line::from(description),
        Line::from(format!("Status: {}", task.status)),
        Line::from(format!("Due: {}", task.due_date.format("%Y-%m-%d"))),
    ];

    let border = if selected {
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.muted)
    };
    let card = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(Span::styled(
                format!(" {} ", task.title),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(border)
            .style(Style::default().fg(palette.text).bg(palette.surface)),
    );
    f.render_widget(card, area);
}

fn render_pager(f: &mut Frame, area: Rect, state: &ClientState, palette: &Palette) {
    let spans: Vec<Span> = (1..=state.page_count())
        .map(|page| {
            let style = if page == state.current_page {
                Style::default().fg(Color::White).bg(palette.accent)
            } else {
                Style::default().fg(palette.text).bg(palette.surface)
            };
            Span::styled(format!(" {page} "), style)
        })
        .flat_map(|span| [span, Span::raw(" ")])
        .collect();
    let pager = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP).style(palette.base()));
    f.render_widget(pager, area);
}

fn render_footer(f: &mut Frame, area: Rect, palette: &Palette) {
    let footer = Paragraph::new(
        "[←/→] page  [↑/↓] select  [d] delete  [r] reload  [q] quit",
    )
    .alignment(Alignment::Center)
    .style(Style::default().fg(palette.muted).bg(palette.background));
    f.render_widget(footer, area);
}

fn render_form(f: &mut Frame, area: Rect, form: &TaskForm, palette: &Palette) {
    let popup = centered_rect(60, 16, area);
    f.render_widget(Clear, popup);

    let field = |label: &str, value: String, which: FormField| -> Line<'static> {
        let focused = form.focus == which;
        let marker = if focused { "> " } else { "  " };
        let value_style = if focused {
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.text)
        };
        Line::from(vec![
            Span::raw(format!("{marker}{label:<12}")),
            Span::styled(value, value_style),
        ])
    };
    let error = |message: Option<String>| -> Line<'static> {
        Line::from(Span::styled(
            message.map(|m| format!("  {m}")).unwrap_or_default(),
            Style::default().fg(palette.error),
        ))
    };

    let lines = vec![
        field("Title", form.title.clone(), FormField::Title),
        error(form.errors.title.map(|e| e.to_string())),
        field("Description", form.description.clone(), FormField::Description),
        Line::default(),
        field("Status", format!("< {} >", form.status), FormField::Status),
        Line::default(),
        field("Due date", form.due_date.clone(), FormField::DueDate),
        Line::from(Span::styled(
            "              YYYY-MM-DD",
            Style::default().fg(palette.muted),
        )),
        error(form.errors.due_date.map(|e| e.to_string())),
        Line::default(),
        Line::from(Span::styled(
            "[Tab] next field  [Enter] save task  [Esc] cancel",
            Style::default().fg(palette.muted),
        )),
    ];

    let modal = Paragraph::new(lines).block(
        Block::default()
            .title(" Create Task ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent))
            .style(Style::default().fg(palette.text).bg(palette.surface)),
    );
    f.render_widget(modal, popup);
}

fn render_confirm(f: &mut Frame, area: Rect, palette: &Palette) {
    let popup = centered_rect(50, 5, area);
    f.render_widget(Clear, popup);
    let dialog = Paragraph::new(vec![
        Line::from("Are you sure you want to delete this task?"),
        Line::default(),
        Line::from(vec![
            Span::styled("[y] Delete", Style::default().fg(palette.error)),
            Span::raw("   [n] Cancel"),
        ]),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.error))
            .style(Style::default().fg(palette.text).bg(palette.surface)),
    );
    f.render_widget(dialog, popup);
}

fn render_notification(f: &mut Frame, area: Rect, state: &ClientState, palette: &Palette) {
    let Some(notification) = &state.notification else {
        return;
    };
    let color = match notification.kind {
        NotificationKind::Success => palette.success,
        NotificationKind::Error => palette.error,
    };
    let width = toast_width(&notification.message, area.width);
    let toast_area = Rect {
        x: area.x + area.width.saturating_sub(width.saturating_add(1)),
        y: area.y + 3,
        width,
        height: 3.min(area.height.saturating_sub(3)),
    };
    f.render_widget(Clear, toast_area);
    let toast = Paragraph::new(notification.message.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .style(Style::default().fg(color).bg(palette.surface)),
    );
    f.render_widget(toast, toast_area);
}

/// Display width of the message plus borders and padding, capped at `max`.
fn toast_width(message: &str, max: u16) -> u16 {
    u16::try_from(Line::from(message).width())
        .unwrap_or(u16::MAX)
        .saturating_add(4)
        .min(max)
}

/// A rect of `percent_x` width and `height` rows centered in `r`.
fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height.min(r.height)),
            Constraint::Fill(1),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;
    use chrono::NaiveDate;
    use ratatui::{backend::TestBackend, Terminal};
    use uuid::Uuid;

    fn screen(state: &ClientState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn task(title: &str) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            status: TaskStatus::InProgress,
            due_date: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
        }
    }

    #[test]
    fn empty_board_says_so() {
        let text = screen(&ClientState::new(false));
        assert!(text.contains("No tasks available"));
    }

    #[test]
    fn cards_show_only_the_current_page() {
        let mut state = ClientState::new(true);
        state.set_tasks((1..=5).map(|n| task(&format!("Chore{n}"))).collect());
        let text = screen(&state);
        assert!(text.contains("Chore1"));
        assert!(text.contains("Chore4"));
        assert!(!text.contains("Chore5"));
        assert!(text.contains("No description"));
        assert!(text.contains("Status: In Progress"));
        assert!(text.contains("Due: 2099-01-01"));
    }

    #[test]
    fn toast_width_uses_display_cells() {
        assert_eq!(toast_width("Saved", 80), 9);
        assert_eq!(toast_width("任务", 80), 8);
        assert_eq!(toast_width(&"x".repeat(70_000), 80), 80);
    }

    #[test]
    fn oversized_message_renders() {
        let mut state = ClientState::new(false);
        state.notify_error("x".repeat(70_000));
        assert!(screen(&state).contains("xxxxxxxx"));
    }

    #[test]
    fn dialogs_render_on_top() {
        let mut state = ClientState::new(false);
        state.set_tasks(vec![task("Chore")]);
        state.request_delete();
        assert!(screen(&state).contains("Are you sure you want to delete this task?"));

        state.cancel_delete();
        state.open_modal();
        assert!(screen(&state).contains("Create Task"));
    }
}
