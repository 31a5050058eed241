//! Terminal UI rendering with ratatui

use chrono::{DateTime, Local, Utc};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, TableState, Wrap},
};

use sharebox_core::{
    Route,
    models::{Record, size_kb},
    views::{
        Feedback, FileViewer, ListView, LoginField, RegisterField, StatusLevel,
        viewer::NO_PREVIEW,
    },
};

use crate::app::{App, ConfirmAction, InputMode, Section};

/// Main draw function
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(1),    // Screen
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Input line
        ])
        .split(f.area());

    draw_title_bar(f, app, chunks[0]);

    match app.route() {
        Route::Login => draw_login(f, app, chunks[1]),
        Route::Register => draw_register(f, app, chunks[1]),
        Route::Dashboard => draw_dashboard(f, app, chunks[1]),
        Route::Share => draw_share_list(f, app, chunks[1]),
        Route::FileShare(_) => draw_file_share(f, app, chunks[1]),
        Route::View { .. } => draw_viewer(f, app, chunks[1]),
    }

    draw_status_bar(f, app, chunks[2]);
    draw_input_line(f, app, chunks[3]);
}

fn draw_title_bar(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            " sharebox ",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.route().path(), Style::default().fg(Color::Gray)),
    ];

    if let Some(identity) = app.session.identity() {
        spans.push(Span::styled(
            format!("  [{}]", identity.email),
            Style::default().fg(Color::Green),
        ));
    }

    let title_bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    f.render_widget(title_bar, area);
}

/// Centered box for the auth forms
fn form_area(area: Rect, height: u16) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .split(area);
    Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(56),
        Constraint::Fill(1),
    ])
    .split(vertical[1])[1]
}

fn field_line<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    let marker = if focused { "> " } else { "  " };
    let style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(format!("{}{:<10}", marker, label), style),
        Span::raw(value),
    ])
}

fn masked(password: &str, show: bool) -> String {
    if show {
        password.to_string()
    } else {
        "*".repeat(password.chars().count())
    }
}

/// Error or success line under a form
fn feedback_line(feedback: &Feedback) -> Line<'static> {
    if feedback.loading {
        return Line::styled("Please wait...", Style::default().fg(Color::Blue));
    }
    match &feedback.status {
        Some((msg, level)) => Line::styled(msg.clone(), level_style(*level)),
        None => Line::raw(""),
    }
}

fn draw_login(f: &mut Frame, app: &App, area: Rect) {
    let form = &app.login;
    let lines = vec![
        Line::raw(""),
        field_line("Email", form.email.clone(), form.focus == LoginField::Email),
        field_line(
            "Password",
            masked(&form.password, form.show_password),
            form.focus == LoginField::Password,
        ),
        Line::raw(""),
        feedback_line(&form.feedback),
        Line::raw(""),
        Line::styled(
            "Don't have an account? Ctrl-R to register",
            Style::default().fg(Color::DarkGray),
        ),
    ];

    let block = Block::default().borders(Borders::ALL).title(" Sign in ");
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        form_area(area, 10),
    );
}

fn draw_register(f: &mut Frame, app: &App, area: Rect) {
    let form = &app.register;
    let lines = vec![
        Line::raw(""),
        field_line("Name", form.name.clone(), form.focus == RegisterField::Name),
        field_line("Email", form.email.clone(), form.focus == RegisterField::Email),
        field_line(
            "Password",
            masked(&form.password, form.show_password),
            form.focus == RegisterField::Password,
        ),
        Line::raw(""),
        feedback_line(&form.feedback),
        Line::raw(""),
        Line::styled(
            "Already have an account? Ctrl-L to sign in",
            Style::default().fg(Color::DarkGray),
        ),
    ];

    let block = Block::default().borders(Borders::ALL).title(" Create account ");
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        form_area(area, 12),
    );
}

fn draw_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::horizontal([Constraint::Length(22), Constraint::Min(1)]).split(area);

    let name = app
        .session
        .identity()
        .map(|i| i.name)
        .unwrap_or_default();

    let mut items = vec![
        ListItem::new(Line::styled(
            format!("Hello, {}", name),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        ListItem::new(""),
    ];
    for (i, section) in Section::ALL.iter().enumerate() {
        let style = if *section == app.section {
            Style::default().bg(Color::Blue).fg(Color::White)
        } else {
            Style::default()
        };
        items.push(ListItem::new(Line::styled(
            format!(" {} {}", i + 1, section.label()),
            style,
        )));
    }
    items.push(ListItem::new(" l Share links"));
    items.push(ListItem::new(""));
    items.push(ListItem::new(Line::styled(
        " L Sign Out",
        Style::default().fg(Color::Red),
    )));

    f.render_widget(
        List::new(items).block(Block::default().borders(Borders::RIGHT)),
        chunks[0],
    );

    match app.section {
        Section::Upload => draw_upload(f, app, chunks[1]),
        Section::MyFiles => draw_files(f, app, chunks[1]),
    }
}

fn draw_upload(f: &mut Frame, app: &App, area: Rect) {
    let view = &app.upload;
    let block = Block::default().borders(Borders::ALL).title(" Upload ");

    if view.files.is_empty() {
        f.render_widget(
            Paragraph::new("No files selected. Press a to add a file.").block(block),
            area,
        );
        return;
    }

    let rows = view.files.iter().map(|file| {
        Row::new(vec![
            Cell::from(file.name.clone()),
            Cell::from(format!("{} KB", size_kb(file.size()))),
            Cell::from(file.content_type.clone()),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(12),
            Constraint::Length(28),
        ],
    )
    .header(header_row(&["Name", "Size", "Type"]))
    .row_highlight_style(cursor_style())
    .block(block);

    let mut state = TableState::default().with_selected(Some(view.cursor));
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_files(f: &mut Frame, app: &App, area: Rect) {
    let list = &app.files;
    let block = Block::default().borders(Borders::ALL).title(" My Files ");

    if let Some(text) = list_placeholder(list) {
        f.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let rows = list.items.iter().map(|file| {
        Row::new(vec![
            Cell::from(checkbox(list.is_selected(&file.id))),
            Cell::from(file.filename.clone()),
            Cell::from(format!("{} KB", size_kb(file.size))),
            Cell::from(local_time(&file.created_at)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(20),
            Constraint::Length(12),
            Constraint::Length(17),
        ],
    )
    .header(header_row(&[checkbox(list.all_selected()), "Name", "Size", "Created"]))
    .row_highlight_style(cursor_style())
    .block(block);

    let mut state = TableState::default().with_selected(Some(list.cursor));
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_share_list(f: &mut Frame, app: &App, area: Rect) {
    let list = &app.shares;
    let block = Block::default().borders(Borders::ALL).title(" Share links ");

    if let Some(text) = list_placeholder(list) {
        f.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let rows = list.items.iter().map(|share| {
        Row::new(vec![
            Cell::from(checkbox(list.is_selected(&share.id))),
            Cell::from(share.filename.clone()),
            Cell::from(format!("{} KB", size_kb(share.size))),
            Cell::from(local_time(&share.expiry_at)),
            Cell::from(app.api.share_link_url(&share.id)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(16),
            Constraint::Length(12),
            Constraint::Length(17),
            Constraint::Min(30),
        ],
    )
    .header(header_row(&[
        checkbox(list.all_selected()),
        "Name",
        "Size",
        "Expires",
        "Link",
    ]))
    .row_highlight_style(cursor_style())
    .block(block);

    let mut state = TableState::default().with_selected(Some(list.cursor));
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_file_share(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Share file ");
    let Some(view) = app.file_share.as_ref() else {
        f.render_widget(block, area);
        return;
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("File     ", Style::default().fg(Color::Gray)),
            Span::raw(view.file.filename.clone()),
        ]),
        Line::from(vec![
            Span::styled("Size     ", Style::default().fg(Color::Gray)),
            Span::raw(format!("{} KB", size_kb(view.file.size))),
        ]),
        Line::from(vec![
            Span::styled("Expires  ", Style::default().fg(Color::Gray)),
            Span::styled(
                view.duration.label(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::raw(""),
    ];

    if let Some(link) = &view.link {
        lines.push(Line::from(vec![
            Span::styled("Link     ", Style::default().fg(Color::Gray)),
            Span::styled(link.clone(), Style::default().fg(Color::Cyan)),
        ]));
    }
    if view.feedback.loading {
        lines.push(Line::styled(
            sharebox_core::views::share::GENERATING,
            Style::default().fg(Color::Blue),
        ));
    } else if let Some(err) = view.feedback.error() {
        lines.push(Line::styled(err.to_string(), level_style(StatusLevel::Error)));
    }

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_viewer(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" File viewer ");
    let Some(viewer) = app.viewer.as_ref() else {
        f.render_widget(block, area);
        return;
    };

    f.render_widget(
        Paragraph::new(viewer_lines(viewer))
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn viewer_lines(viewer: &FileViewer) -> Vec<Line<'static>> {
    if viewer.feedback.loading && viewer.access_url.is_none() {
        return vec![Line::styled("Loading...", Style::default().fg(Color::Blue))];
    }

    let Some(url) = viewer.access_url.clone() else {
        return vec![feedback_line(&viewer.feedback)];
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("File     ", Style::default().fg(Color::Gray)),
            Span::raw(viewer.download_file_name()),
        ]),
        Line::from(vec![
            Span::styled("Type     ", Style::default().fg(Color::Gray)),
            Span::raw(viewer.kind.label()),
        ]),
        Line::from(vec![
            Span::styled("URL      ", Style::default().fg(Color::Gray)),
            Span::styled(url, Style::default().fg(Color::Cyan)),
        ]),
        Line::raw(""),
    ];

    if viewer.can_preview() {
        lines.push(Line::raw(
            "Open the URL in a browser to preview, or press w to download.",
        ));
    } else {
        lines.push(Line::styled(NO_PREVIEW, Style::default().fg(Color::Yellow)));
    }

    lines.push(feedback_line(&viewer.feedback));
    lines
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    if let InputMode::Confirm(action) = &app.input_mode {
        let prompt = match action {
            ConfirmAction::DeleteFiles(n) => format!("Delete {} file(s)? y/n", n),
            ConfirmAction::RevokeShares(n) => format!("Revoke {} link(s)? y/n", n),
        };
        f.render_widget(
            Paragraph::new(prompt).style(Style::default().fg(Color::Yellow)),
            area,
        );
        return;
    }

    let status = app.notice.clone().or_else(|| screen_status(app));

    let (text, style) = match status {
        Some((msg, level)) => (msg, level_style(level)),
        None => (hints(app).to_string(), Style::default().fg(Color::DarkGray)),
    };

    f.render_widget(Paragraph::new(text).style(style), area);
}

/// Status of the list or upload view shown on the current screen
fn screen_status(app: &App) -> Option<(String, StatusLevel)> {
    let feedback = match app.route() {
        Route::Dashboard => match app.section {
            Section::Upload => {
                if app.upload.feedback.loading {
                    return Some((
                        sharebox_core::views::upload::UPLOADING.to_string(),
                        StatusLevel::Info,
                    ));
                }
                &app.upload.feedback
            }
            Section::MyFiles => &app.files.feedback,
        },
        Route::Share => &app.shares.feedback,
        _ => return None,
    };
    // Loading placeholders render in the list body
    if feedback.loading {
        return None;
    }
    feedback.status.clone()
}

fn hints(app: &App) -> &'static str {
    match (&app.input_mode, app.route()) {
        (InputMode::AddPath(_), _) => "Type a file path │ Enter:add │ Esc:cancel",
        (_, Route::Login) => "Tab:next field │ Enter:sign in │ Ctrl-S:show password │ Ctrl-R:register │ Esc:quit",
        (_, Route::Register) => "Tab:next field │ Enter:register │ Ctrl-S:show password │ Esc:back",
        (_, Route::Dashboard) => match app.section {
            Section::Upload => "1/2:section │ a:add file x:remove u:upload │ l:share links L:sign out q:quit",
            Section::MyFiles => "1/2:section │ Space:select a:all d:delete │ o:open s:share r:reload │ L:sign out q:quit",
        },
        (_, Route::Share) => "Space:select a:all d:revoke │ o:open y:copy link r:reload │ b:back q:quit",
        (_, Route::FileShare(_)) => "e:expiry │ Enter:generate y:copy link │ b:back",
        (_, Route::View { .. }) => "w:download y:copy URL │ b:back q:quit",
    }
}

fn draw_input_line(f: &mut Frame, app: &App, area: Rect) {
    let InputMode::AddPath(buffer) = &app.input_mode else {
        return;
    };

    let prefix = "Add file: ";
    f.render_widget(
        Paragraph::new(format!("{}{}", prefix, buffer)).style(Style::default().fg(Color::White)),
        area,
    );

    let x = area.x + prefix.len() as u16 + buffer.chars().count() as u16;
    f.set_cursor_position((x, area.y));
}

/// Loading or empty text in place of an empty table
fn list_placeholder<T: Record>(list: &ListView<T>) -> Option<&'static str> {
    if list.feedback.loading && list.is_empty() {
        Some(list.texts.loading)
    } else if list.is_empty() {
        Some(list.feedback.error().map_or(list.texts.empty, |_| list.texts.load_error))
    } else {
        None
    }
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    Row::new(titles.iter().map(|t| Cell::from(*t)))
        .style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Gray))
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

fn cursor_style() -> Style {
    Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

fn level_style(level: StatusLevel) -> Style {
    let color = match level {
        StatusLevel::Info => Color::Blue,
        StatusLevel::Success => Color::Green,
        StatusLevel::Error => Color::Red,
    };
    Style::default().fg(color)
}

fn local_time(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
