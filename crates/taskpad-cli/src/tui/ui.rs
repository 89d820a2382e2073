//! UI rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use taskpad_core::{SyncStatus, Task};

use super::app::{App, InputMode};

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    let error = app.state.error_message();
    let show_stats = !app.state.tasks().is_empty();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(if error.is_some() { 3 } else { 0 }),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(if show_stats { 3 } else { 0 }),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    if let Some(message) = error {
        draw_error_banner(frame, message, chunks[1]);
    }
    draw_input(frame, app, chunks[2]);
    draw_tasks(frame, app, chunks[3]);
    if show_stats {
        draw_stats(frame, app, chunks[4]);
    }
    draw_status_bar(frame, app, chunks[5]);

    if app.show_help {
        draw_help_overlay(frame);
    }
}

/// Title line with the sync indicator on the right
fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let (icon, style) = match app.state.status() {
        SyncStatus::Idle => ("✓", Style::default().fg(Color::Green)),
        SyncStatus::Loading => ("↻ loading", Style::default().fg(Color::Yellow)),
        SyncStatus::Submitting => ("↻ saving", Style::default().fg(Color::Yellow)),
        SyncStatus::Error(_) => ("✗", Style::default().fg(Color::Red)),
    };

    let title = Paragraph::new(Span::styled(
        " Task Manager",
        Style::default().add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(title, area);

    let indicator = Paragraph::new(Span::styled(icon, style)).alignment(Alignment::Right);
    frame.render_widget(indicator, area);
}

fn draw_error_banner(frame: &mut Frame, message: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(Line::from(vec![
        Span::styled("✗ ", Style::default().fg(Color::Red)),
        Span::styled(message, Style::default().fg(Color::Red)),
    ]))
    .block(block)
    .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

/// New task input
fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let submitting = app.state.is_submitting();

    let title = if submitting {
        " Adding task... "
    } else if editing {
        " New task (Enter to add, Esc to cancel) "
    } else {
        " New task (a) "
    };

    let border_style = if editing && !submitting {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let draft = app.state.draft();
    let content = if draft.is_empty() && !editing {
        Span::styled(
            "What needs to be done?",
            Style::default().add_modifier(Modifier::DIM),
        )
    } else {
        Span::raw(draft)
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    frame.render_widget(Paragraph::new(content).block(block), area);

    if editing && !submitting {
        frame.set_cursor_position((input_cursor_x(area, draft), area.y + 1));
    }
}

/// Column just past the draft, clamped inside the input box
fn input_cursor_x(area: Rect, draft: &str) -> u16 {
    let len = u16::try_from(draft.chars().count()).unwrap_or(u16::MAX);
    area.x
        .saturating_add(1)
        .saturating_add(len)
        .min(area.right().saturating_sub(2))
}

/// Task list
fn draw_tasks(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" Tasks ").borders(Borders::ALL);
    let tasks = app.state.tasks();

    if tasks.is_empty() {
        let lines = if app.state.is_loading() {
            vec![Line::from("Loading tasks...")]
        } else {
            vec![
                Line::from(Span::styled(
                    "No tasks yet",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from("Press 'a' to add your first task!"),
            ]
        };

        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(paragraph, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = tasks.iter().map(|task| task_item(task, width)).collect();

    let highlight_style = if app.input_mode == InputMode::Normal {
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    };

    let list = List::new(items).block(block).highlight_style(highlight_style);

    let mut state = ListState::default();
    state.select(Some(app.selected));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Two-line entry: check, title and badge; then the dates
fn task_item(task: &Task, width: usize) -> ListItem<'static> {
    let (check, check_style) = if task.is_done {
        ("✓ ", Style::default().fg(Color::Green))
    } else {
        ("○ ", Style::default())
    };

    let (badge, badge_style) = if task.is_done {
        (" Done ", Style::default().fg(Color::Green))
    } else {
        (" Pending ", Style::default().fg(Color::Yellow))
    };

    let title_style = if task.is_done {
        Style::default()
            .add_modifier(Modifier::CROSSED_OUT)
            .add_modifier(Modifier::DIM)
    } else {
        Style::default()
    };

    let title_width = width.saturating_sub(check.chars().count() + badge.chars().count());
    let title = crate::output::truncate(&task.title, title_width);

    let mut dates = format!("  Created: {}", task.created_at.format("%Y-%m-%d"));
    if task.was_modified() {
        dates.push_str(&format!(" • Updated: {}", task.updated_at.format("%Y-%m-%d")));
    }

    ListItem::new(vec![
        Line::from(vec![
            Span::styled(check, check_style),
            Span::styled(title, title_style),
            Span::styled(badge, badge_style),
        ]),
        Line::from(Span::styled(dates, Style::default().add_modifier(Modifier::DIM))),
    ])
}

fn draw_stats(frame: &mut Frame, app: &App, area: Rect) {
    let stats = app.state.stats();

    let line = Line::from(vec![
        Span::styled(
            format!("Total: {}", stats.total),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled(
            format!("Completed: {}", stats.completed),
            Style::default().fg(Color::Green),
        ),
        Span::raw("   "),
        Span::styled(
            format!("Pending: {}", stats.pending),
            Style::default().fg(Color::Yellow),
        ),
    ]);

    let paragraph = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let content = if let Some(msg) = &app.status_message {
        msg.clone()
    } else if app.input_mode == InputMode::Editing {
        "Enter:add  Esc:back  Ctrl-u:clear".to_string()
    } else {
        "a:add  space:toggle  r:reload  ?:help  q:quit".to_string()
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    // Calculate centered popup area
    let popup_width = 44.min(area.width.saturating_sub(4));
    let popup_height = 17.min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  j/k, ↑/↓       Move up/down"),
        Line::from("  g/G            First/last task"),
        Line::from(""),
        Line::from("Tasks:"),
        Line::from("  a, i           Add task"),
        Line::from("  space, x, ⏎    Toggle done"),
        Line::from("  r              Reload from server"),
        Line::from(""),
        Line::from("  ?              Help"),
        Line::from("  q              Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, popup_area);
}
