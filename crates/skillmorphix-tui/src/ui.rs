use chrono::{Datelike, NaiveTime};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Tabs, Wrap},
};
use skillmorphix_core::catalog::{Difficulty, EventKind};
use skillmorphix_core::conversation::ChatRole;

use crate::app::{App, FormField, InputLine, InputMode, ProgressTab, Screen, SettingsItem};

/// Wrap text to fit within a given width, returning multiple lines
/// Uses word boundaries for wrapping (doesn't break mid-word)
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len == 0 {
            current_line = word.to_string();
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(current_line);
            current_line = word.to_string();
            current_len = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Text progress bar, e.g. "█████░░░░░"
fn progress_bar(percent: u8, width: usize) -> String {
    let filled = (usize::from(percent.min(100)) * width + 50) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Parse "#RRGGBB"
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

fn format_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

fn difficulty_color(difficulty: Difficulty) -> Color {
    match difficulty {
        Difficulty::Beginner => Color::Green,
        Difficulty::Intermediate => Color::Yellow,
        Difficulty::Advanced => Color::Red,
    }
}

fn event_kind_color(kind: EventKind) -> Color {
    match kind {
        EventKind::Class => Color::Blue,
        EventKind::Lab => Color::Green,
        EventKind::Assignment => Color::Yellow,
        EventKind::Exam => Color::Red,
        EventKind::Meeting => Color::Magenta,
    }
}

fn panel(title: &str, focused: bool) -> Block<'static> {
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {} ", title))
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Welcome => render_welcome(app, frame, body_area),
        Screen::Dashboard => render_dashboard(app, frame, body_area),
        Screen::Videos => render_videos(app, frame, body_area),
        Screen::VideoPlayer => render_video_player(app, frame, body_area),
        Screen::Schedule => render_schedule(app, frame, body_area),
        Screen::Progress => render_progress(app, frame, body_area),
        Screen::Chat => render_chat(app, frame, body_area),
        Screen::Settings => render_settings(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    if app.notice.is_some() {
        render_notice(app, frame, body_area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let student = app
        .profile()
        .map(|p| format!(" {} ", p.name))
        .unwrap_or_default();

    let title = Line::from(vec![
        Span::styled(" Skillmorphix ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!("│ {} ", app.screen.title()), Style::default().fg(Color::White)),
        Span::styled(student, Style::default().fg(Color::Gray)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Black),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.screen {
        Screen::Welcome => " START ",
        Screen::Dashboard => " HOME ",
        Screen::Videos => " VIDEOS ",
        Screen::VideoPlayer => " WATCH ",
        Screen::Schedule => " SCHEDULE ",
        Screen::Progress => " PROGRESS ",
        Screen::Chat => " AI ",
        Screen::Settings => " SETTINGS ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints: &[(&str, &str)] = match (app.screen, app.input_mode) {
        (Screen::Welcome, _) => &[("Tab", "next field"), ("←/→", "change"), ("Enter", "start"), ("^C", "quit")],
        (Screen::Dashboard, _) => &[("j/k", "move"), ("Enter", "open"), ("a", "ask AI"), ("1-6", "screens"), ("q", "quit")],
        (Screen::Videos, _) => &[("j/k", "move"), ("Enter", "watch"), ("f", "filter"), ("a", "ask AI"), ("Esc", "back")],
        (Screen::VideoPlayer, _) => &[("a", "ask AI about this video"), ("Esc", "back"), ("q", "quit")],
        (Screen::Schedule, _) => &[("h/l", "day"), ("H/L", "week"), ("t", "today"), ("Esc", "back")],
        (Screen::Progress, _) => &[("Tab", "next tab"), ("Esc", "back"), ("q", "quit")],
        (Screen::Chat, InputMode::Editing) => &[("Enter", "send"), ("PgUp/PgDn", "scroll"), ("Esc", "stop typing"), ("^C", "quit")],
        (Screen::Chat, InputMode::Normal) => &[("i", "type"), ("j/k", "scroll"), ("G", "latest"), ("Esc", "leave chat")],
        (Screen::Settings, InputMode::Editing) => &[("Tab", "next field"), ("←/→", "change"), ("Enter", "save"), ("Esc", "cancel")],
        (Screen::Settings, InputMode::Normal) => &[("j/k", "move"), ("Enter", "select"), ("e", "edit profile"), ("Esc", "back")],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_notice(app: &App, frame: &mut Frame, area: Rect) {
    let Some(notice) = app.notice.as_ref() else {
        return;
    };

    let width = 48.min(area.width.saturating_sub(2));
    let body = wrap_text_to_width(&notice.body, usize::from(width.saturating_sub(2)));
    let height = (body.len() as u16 + 2).min(area.height);
    let popup_area = Rect::new(
        area.x + area.width.saturating_sub(width + 1),
        area.y,
        width,
        height,
    );

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(Span::styled(
            format!(" {} ", notice.title),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));
    let lines: Vec<Line> = body.into_iter().map(Line::from).collect();
    frame.render_widget(Paragraph::new(lines).block(block), popup_area);
}

fn render_welcome(app: &App, frame: &mut Frame, area: Rect) {
    let width = 60.min(area.width);
    let x = area.x + (area.width - width) / 2;
    let centered = Rect::new(x, area.y, width, area.height);

    let [intro_area, form_area] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(0),
    ])
    .areas(centered);

    let intro = Text::from(vec![
        Line::default(),
        Line::from(Span::styled(
            "Welcome to Skillmorphix",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Personalized learning for every student.",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    frame.render_widget(Paragraph::new(intro).alignment(Alignment::Center), intro_area);

    render_profile_form(app, frame, form_area, " Tell us about yourself ");
}

/// Name, grade and language fields. Highlights the active field while editing.
fn render_profile_form(app: &App, frame: &mut Frame, area: Rect, title: &str) {
    let editing = app.input_mode == InputMode::Editing;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(title.to_string());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [name_area, grade_area, language_area, _] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(inner);

    let form = &app.form;
    let field_block = |label: &str, field: FormField| {
        let active = editing && form.field == field;
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if active { Color::Yellow } else { Color::DarkGray }))
            .title(format!(" {} ", label))
    };

    let name_block = field_block("Name", FormField::Name);
    let name_inner = name_block.inner(name_area);
    let (visible_name, cursor_x) = visible_input(&form.name, name_inner.width as usize);
    frame.render_widget(
        Paragraph::new(visible_name)
            .style(Style::default().fg(Color::Cyan))
            .block(name_block),
        name_area,
    );

    let selector = |value: String, active: bool| {
        let arrow_style = if active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Line::from(vec![
            Span::styled("◀ ", arrow_style),
            Span::styled(value, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            Span::styled(" ▶", arrow_style),
        ])
    };

    frame.render_widget(
        Paragraph::new(selector(form.grade.to_string(), editing && form.field == FormField::Grade))
            .block(field_block("Grade", FormField::Grade)),
        grade_area,
    );
    frame.render_widget(
        Paragraph::new(selector(
            form.language.display_name().to_string(),
            editing && form.field == FormField::Language,
        ))
        .block(field_block("Preferred Language", FormField::Language)),
        language_area,
    );

    if editing && form.field == FormField::Name {
        frame.set_cursor_position((name_inner.x + cursor_x, name_inner.y));
    }
}

/// Slice of an input line that keeps the cursor in view, plus the cursor column
fn visible_input(line: &InputLine, inner_width: usize) -> (String, u16) {
    let scroll_offset = if inner_width == 0 {
        0
    } else if line.cursor >= inner_width {
        line.cursor - inner_width + 1
    } else {
        0
    };

    let visible: String = line.value.chars().skip(scroll_offset).take(inner_width).collect();
    (visible, (line.cursor - scroll_offset) as u16)
}

fn render_dashboard(app: &mut App, frame: &mut Frame, area: Rect) {
    let [greeting_area, body_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let (name, summary) = app
        .profile()
        .map(|p| (p.name.clone(), p.summary()))
        .unwrap_or_default();
    let greeting = Text::from(vec![
        Line::from(Span::styled(
            format!("Welcome, {}!", name),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(summary, Style::default().fg(Color::DarkGray))),
    ]);
    frame.render_widget(
        Paragraph::new(greeting).block(Block::default().borders(Borders::BOTTOM)),
        greeting_area,
    );

    let [subjects_area, side_area] = Layout::horizontal([
        Constraint::Percentage(55),
        Constraint::Percentage(45),
    ])
    .areas(body_area);

    let bar_width = usize::from(subjects_area.width.saturating_sub(16)).min(20);
    let items: Vec<ListItem> = app
        .subjects()
        .iter()
        .map(|subject| {
            ListItem::new(Text::from(vec![
                Line::from(vec![
                    Span::raw(format!("{} ", subject.icon)),
                    Span::styled(subject.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                ]),
                Line::from(vec![
                    Span::styled(progress_bar(subject.progress, bar_width), Style::default().fg(Color::Cyan)),
                    Span::styled(format!(" {}%", subject.progress), Style::default().fg(Color::DarkGray)),
                ]),
                Line::from(Span::styled(subject.description.clone(), Style::default().fg(Color::DarkGray))),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(panel("Your Subjects", true))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, subjects_area, &mut app.subject_state);

    let [recommended_area, lessons_area] = Layout::vertical([
        Constraint::Length(5),
        Constraint::Min(0),
    ])
    .areas(side_area);

    let recommended = app.catalog.recommended_subject().cloned();
    let recommendation = match &recommended {
        Some(subject) => Text::from(vec![
            Line::from(Span::styled(
                format!("{} {}", subject.icon, subject.name),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            Line::from("Video lessons and an AI tutor are ready."),
            Line::from(Span::styled("Select it and press Enter to start", Style::default().fg(Color::DarkGray))),
        ]),
        None => Text::from("Nothing to recommend yet"),
    };
    frame.render_widget(
        Paragraph::new(recommendation)
            .block(panel("Recommended", false))
            .wrap(Wrap { trim: true }),
        recommended_area,
    );

    let lessons: Vec<ListItem> = recommended
        .map(|subject| app.catalog.lessons_for_subject(subject.id))
        .unwrap_or_default()
        .into_iter()
        .map(|lesson| {
            let mark = if lesson.completed {
                Span::styled("✓ ", Style::default().fg(Color::Green))
            } else {
                Span::styled("○ ", Style::default().fg(Color::DarkGray))
            };
            ListItem::new(Text::from(vec![
                Line::from(vec![mark, Span::raw(lesson.title.clone())]),
                Line::from(vec![
                    Span::styled(format!("  {} min ", lesson.duration_minutes), Style::default().fg(Color::DarkGray)),
                    Span::styled(lesson.difficulty.to_string(), Style::default().fg(difficulty_color(lesson.difficulty))),
                ]),
            ]))
        })
        .collect();
    frame.render_widget(List::new(lessons).block(panel("Lessons", false)), lessons_area);
}

fn render_videos(app: &mut App, frame: &mut Frame, area: Rect) {
    let [filter_area, list_area, detail_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(6),
    ])
    .areas(area);

    let selected_filter = match app.video_filter {
        None => 0,
        Some(Difficulty::Beginner) => 1,
        Some(Difficulty::Intermediate) => 2,
        Some(Difficulty::Advanced) => 3,
    };
    let tabs = Tabs::new(vec!["All", "Beginner", "Intermediate", "Advanced"])
        .select(selected_filter)
        .block(panel("Difficulty (f)", false))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, filter_area);

    let videos = app.visible_videos();
    let title_width = usize::from(list_area.width.saturating_sub(30));
    let items: Vec<ListItem> = videos
        .iter()
        .map(|video| {
            let title: String = video.title.chars().take(title_width).collect();
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<width$}", title, width = title_width)),
                Span::styled(format!(" {} ", video.duration), Style::default().fg(Color::DarkGray)),
                Span::styled(video.difficulty.to_string(), Style::default().fg(difficulty_color(video.difficulty))),
            ]))
        })
        .collect();
    let empty = items.is_empty();
    let detail = app.selected_video().map(|video| {
        Text::from(vec![
            Line::from(Span::styled(video.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(
                format!("{} • {}", video.category, video.difficulty),
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(video.description.clone()),
        ])
    });

    let list = List::new(items)
        .block(panel("Mathematics Videos", true))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, list_area, &mut app.video_state);

    let detail = detail.unwrap_or_else(|| {
        if empty {
            Text::from("No videos at this difficulty")
        } else {
            Text::default()
        }
    });
    frame.render_widget(
        Paragraph::new(detail)
            .block(panel("About", false))
            .wrap(Wrap { trim: true }),
        detail_area,
    );
}

fn render_video_player(app: &App, frame: &mut Frame, area: Rect) {
    let Some(details) = app.current_video_details() else {
        frame.render_widget(
            Paragraph::new("Video not found").block(panel("Video", false)),
            area,
        );
        return;
    };

    let [player_area, info_area, related_area] = Layout::vertical([
        Constraint::Length(5),
        Constraint::Min(0),
        Constraint::Length(6),
    ])
    .areas(area);

    let player = Text::from(vec![
        Line::default(),
        Line::from(Span::styled(
            format!("▶  {}", details.title),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(details.video_url.clone(), Style::default().fg(Color::DarkGray))),
    ]);
    frame.render_widget(
        Paragraph::new(player)
            .alignment(Alignment::Center)
            .block(panel("Now Playing", true)),
        player_area,
    );

    let info = Text::from(vec![
        Line::from(vec![
            Span::styled(details.category.clone(), Style::default().fg(Color::Cyan)),
            Span::raw(" • "),
            Span::styled(details.difficulty.to_string(), Style::default().fg(difficulty_color(details.difficulty))),
        ]),
        Line::default(),
        Line::from(details.description.clone()),
        Line::default(),
        Line::from(Span::styled(
            "Press a to ask the AI assistant about this video",
            Style::default().fg(Color::Yellow),
        )),
    ]);
    frame.render_widget(
        Paragraph::new(info)
            .block(panel("About this video", false))
            .wrap(Wrap { trim: true }),
        info_area,
    );

    let related: Vec<ListItem> = details
        .related_topics
        .iter()
        .map(|topic| ListItem::new(format!("• {}", topic)))
        .collect();
    frame.render_widget(List::new(related).block(panel("Related Topics", false)), related_area);
}

fn render_schedule(app: &App, frame: &mut Frame, area: Rect) {
    let [week_area, events_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let mut week_spans = Vec::new();
    for date in app.schedule_week() {
        let marker = if app.catalog.has_events(app.today, date) { "•" } else { " " };
        let mut style = Style::default();
        if date == app.today {
            style = style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
        }
        if date == app.schedule_date {
            style = style.bg(Color::Blue).fg(Color::White);
        }
        week_spans.push(Span::styled(
            format!(" {} {:>2}{} ", date.format("%a"), date.day(), marker),
            style,
        ));
        week_spans.push(Span::raw(" "));
    }
    frame.render_widget(
        Paragraph::new(Line::from(week_spans)).block(panel("This Week", false)),
        week_area,
    );

    let events = app.catalog.events_on(app.today, app.schedule_date);
    let width = usize::from(events_area.width.saturating_sub(4));
    let mut lines: Vec<Line> = Vec::new();

    if events.is_empty() {
        lines.push(Line::from(Span::styled(
            "No events scheduled for this day",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for event in events {
        let time = if event.start_time == event.end_time {
            format_time(event.start_time)
        } else {
            format!("{} - {}", format_time(event.start_time), format_time(event.end_time))
        };
        lines.push(Line::from(vec![
            Span::styled(time, Style::default().fg(Color::Cyan)),
            Span::raw("  "),
            Span::styled(
                format!("[{}]", event.kind.label()),
                Style::default().fg(event_kind_color(event.kind)),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            event.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for wrapped in wrap_text_to_width(&event.description, width) {
            lines.push(Line::from(Span::styled(wrapped, Style::default().fg(Color::Gray))));
        }
        lines.push(Line::from(Span::styled(
            format!("{} • {}", event.teacher, event.location),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::default());
    }

    let title = app.schedule_date.format("%A, %B %-d, %Y").to_string();
    frame.render_widget(Paragraph::new(lines).block(panel(&title, true)), events_area);
}

fn render_progress(app: &App, frame: &mut Frame, area: Rect) {
    let report = app.catalog.progress();

    let [summary_area, tabs_area, content_area] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let [gauge_area, stats_area] = Layout::horizontal([
        Constraint::Percentage(40),
        Constraint::Percentage(60),
    ])
    .areas(summary_area);

    let overall = report.summary.overall_progress.min(100);
    let gauge = Gauge::default()
        .block(panel("Overall Progress", false))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .percent(u16::from(overall))
        .label(format!("{}%", overall));
    frame.render_widget(gauge, gauge_area);

    let stats = Text::from(vec![
        Line::from(format!(
            "{} lessons completed • {} hours spent",
            report.summary.completed_lessons, report.summary.hours_spent
        )),
        Line::from(format!(
            "{} subjects in progress • {} skills mastered",
            report.summary.subjects_in_progress, report.summary.skills_mastered
        )),
    ]);
    frame.render_widget(Paragraph::new(stats).block(panel("Summary", false)), stats_area);

    let tabs = Tabs::new(ProgressTab::ALL.iter().map(|t| t.title()).collect::<Vec<_>>())
        .select(app.progress_tab.index())
        .block(panel("Details (Tab)", false))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, tabs_area);

    let bar_width = usize::from(content_area.width.saturating_sub(12)).min(30);
    let mut lines: Vec<Line> = Vec::new();
    match app.progress_tab {
        ProgressTab::Subjects => {
            for subject in &report.subjects {
                let color = parse_hex_color(&subject.color).unwrap_or(Color::Cyan);
                lines.push(Line::from(vec![
                    Span::styled(subject.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw("  "),
                    Span::styled(subject.status.clone(), Style::default().fg(color)),
                ]));
                lines.push(Line::from(vec![
                    Span::styled(progress_bar(subject.progress, bar_width), Style::default().fg(color)),
                    Span::raw(format!(" {}%", subject.progress)),
                ]));
                lines.push(Line::from(Span::styled(subject.description.clone(), Style::default().fg(Color::DarkGray))));
                lines.push(Line::default());
            }
        }
        ProgressTab::Skills => {
            for skill in &report.skills {
                lines.push(Line::from(vec![
                    Span::styled(skill.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(format!("  ({})", skill.level), Style::default().fg(Color::Yellow)),
                ]));
                lines.push(Line::from(vec![
                    Span::styled(progress_bar(skill.progress, bar_width), Style::default().fg(Color::Green)),
                    Span::raw(format!(" {}%", skill.progress)),
                ]));
                lines.push(Line::from(Span::styled(skill.description.clone(), Style::default().fg(Color::DarkGray))));
                lines.push(Line::default());
            }
        }
        ProgressTab::Achievements => {
            for achievement in &report.achievements {
                lines.push(Line::from(vec![
                    Span::raw(format!("{} ", achievement.icon)),
                    Span::styled(achievement.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
                ]));
                lines.push(Line::from(Span::styled(achievement.description.clone(), Style::default().fg(Color::DarkGray))));
                lines.push(Line::default());
            }
        }
    }

    frame.render_widget(
        Paragraph::new(lines).block(panel(app.progress_tab.title(), true)),
        content_area,
    );
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [title_area, transcript_area, input_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    let Some(conversation) = app.conversation.as_ref() else {
        frame.render_widget(Paragraph::new("No conversation open"), area);
        return;
    };

    let heading = Text::from(vec![
        Line::from(Span::styled(
            conversation.title(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(conversation.subtitle(), Style::default().fg(Color::DarkGray))),
    ]);
    frame.render_widget(Paragraph::new(heading), title_area);

    // Pre-wrap so the scroll offset counts real rows
    let width = usize::from(transcript_area.width.saturating_sub(2));
    let mut lines: Vec<Line> = Vec::new();
    for msg in conversation.messages() {
        let (name, color) = match msg.role {
            ChatRole::User => ("You", Color::Cyan),
            ChatRole::Assistant => ("AI", Color::Yellow),
        };
        lines.push(Line::from(vec![
            Span::styled(name, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("  {}", msg.timestamp.format("%-I:%M %p")),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        for text_line in msg.content.lines() {
            for wrapped in wrap_text_to_width(text_line, width) {
                lines.push(Line::from(wrapped));
            }
        }
        lines.push(Line::default());
    }

    if conversation.is_awaiting_reply() {
        lines.push(Line::from(Span::styled(
            "AI",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat(usize::from(app.animation_frame) + 1);
        lines.push(Line::from(Span::styled(
            format!("Typing{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }
    let placeholder = conversation.placeholder();

    let visible_height = transcript_area.height.saturating_sub(2);
    let total_lines = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let max_scroll = total_lines.saturating_sub(visible_height);
    if app.chat_follow || app.chat_scroll >= max_scroll {
        app.chat_scroll = max_scroll;
        app.chat_follow = true;
    }
    app.chat_height = visible_height;

    let transcript = Paragraph::new(lines)
        .block(panel("Conversation", app.input_mode == InputMode::Normal))
        .scroll((app.chat_scroll, 0));
    frame.render_widget(transcript, transcript_area);

    let editing = app.input_mode == InputMode::Editing;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(" Message ");

    let inner_width = usize::from(input_area.width.saturating_sub(2));
    let (visible_text, cursor_x) = visible_input(&app.chat_input, inner_width);
    let input = if app.chat_input.is_empty() {
        Paragraph::new(Span::styled(placeholder, Style::default().fg(Color::DarkGray)))
    } else {
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };
    frame.render_widget(input.block(input_block), input_area);

    if editing {
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

fn render_settings(app: &mut App, frame: &mut Frame, area: Rect) {
    let [items_area, profile_area] = Layout::horizontal([
        Constraint::Percentage(40),
        Constraint::Percentage(60),
    ])
    .areas(area);

    let items: Vec<ListItem> = SettingsItem::all()
        .into_iter()
        .map(|item| match item {
            SettingsItem::EditProfile => ListItem::new("Edit Profile"),
            SettingsItem::Toggle(pref) => {
                let enabled = app.config.preferences.get(pref);
                let (mark, color) = if enabled { ("ON ", Color::Green) } else { ("OFF", Color::DarkGray) };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("[{}] ", mark), Style::default().fg(color)),
                    Span::raw(pref.label()),
                ]))
            }
            SettingsItem::SignOut => {
                ListItem::new(Span::styled("Sign Out", Style::default().fg(Color::Red)))
            }
        })
        .collect();

    let list = List::new(items)
        .block(panel("Preferences", app.input_mode == InputMode::Normal))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, items_area, &mut app.settings_state);

    render_profile_form(app, frame, profile_area, " Profile ");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Duration;

    fn render_to_string(app: &mut App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(app, f)).unwrap();

        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_wrap_text_to_width() {
        assert_eq!(wrap_text_to_width("a bb ccc dddd", 6), vec!["a bb", "ccc", "dddd"]);
        assert_eq!(wrap_text_to_width("", 10), vec![String::new()]);
        assert_eq!(wrap_text_to_width("unbroken", 3), vec!["unbroken"]);
    }

    #[test]
    fn test_progress_bar_and_colors() {
        assert_eq!(progress_bar(50, 10), "█████░░░░░");
        assert_eq!(progress_bar(100, 4), "████");
        assert_eq!(progress_bar(0, 4), "░░░░");
        assert_eq!(parse_hex_color("#4CAF50"), Some(Color::Rgb(0x4C, 0xAF, 0x50)));
        assert_eq!(parse_hex_color("4CAF50"), None);
        assert_eq!(parse_hex_color("#4CAF5"), None);
    }

    #[test]
    fn test_render_welcome() {
        let (mut app, _, _dir) = test_app(false);
        let screen = render_to_string(&mut app, 100, 30);
        assert!(screen.contains("Welcome to Skillmorphix"));
        assert!(screen.contains("Preferred Language"));
        assert!(screen.contains("Grade 1"));
    }

    #[test]
    fn test_render_dashboard() {
        let (mut app, _, _dir) = test_app(true);
        let screen = render_to_string(&mut app, 100, 30);
        assert!(screen.contains("Welcome, Ada!"));
        assert!(screen.contains("Grade 7 • Spanish"));
        assert!(screen.contains("Social Studies"));
        assert!(screen.contains("Multiplication Tables"));
    }

    #[test]
    fn test_render_notice() {
        let (mut app, _, _dir) = test_app(true);
        app.nav_down();
        app.activate_selected_subject();
        let screen = render_to_string(&mut app, 100, 30);
        assert!(screen.contains("Science Coming Soon"));
    }

    #[test]
    fn test_render_videos_and_player() {
        let (mut app, _, _dir) = test_app(true);
        app.switch_screen(Screen::Videos);
        let screen = render_to_string(&mut app, 100, 30);
        assert!(screen.contains("Introduction to Fractions"));
        assert!(screen.contains("Intermediate"));

        app.open_selected_video();
        let screen = render_to_string(&mut app, 100, 30);
        assert!(screen.contains("Related Topics"));
        assert!(screen.contains("Percentages"));
    }

    #[test]
    fn test_render_schedule_today() {
        let (mut app, _, _dir) = test_app(true);
        app.switch_screen(Screen::Schedule);
        let screen = render_to_string(&mut app, 100, 30);
        assert!(screen.contains("Chemistry Quiz"));
        assert!(screen.contains("9:00 AM - 10:00 AM"));

        app.shift_schedule_day(4);
        let screen = render_to_string(&mut app, 100, 30);
        assert!(screen.contains("No events scheduled for this day"));
    }

    #[test]
    fn test_render_progress_tabs() {
        let (mut app, _, _dir) = test_app(true);
        app.switch_screen(Screen::Progress);
        let screen = render_to_string(&mut app, 100, 30);
        assert!(screen.contains("70%"));
        assert!(screen.contains("Excellent"));

        app.progress_tab = ProgressTab::Achievements;
        let screen = render_to_string(&mut app, 100, 30);
        assert!(screen.contains("Science Explorer"));
    }

    #[test]
    fn test_render_chat_typing_and_title() {
        let (mut app, clock, _dir) = test_app(true);
        app.switch_screen(Screen::Chat);
        let screen = render_to_string(&mut app, 100, 30);
        assert!(screen.contains("Learning Assistant"));
        assert!(screen.contains("Type your question here..."));

        app.chat_input = crate::app::InputLine::with_value("geometry");
        app.send_chat();
        let screen = render_to_string(&mut app, 100, 30);
        assert!(screen.contains("Typing."));

        clock.advance(Duration::from_secs(1));
        app.on_tick();
        let screen = render_to_string(&mut app, 100, 30);
        assert!(screen.contains("Mathematics Tutor"));
        assert!(!screen.contains("Typing"));
    }

    #[test]
    fn test_render_settings() {
        let (mut app, _, _dir) = test_app(true);
        app.switch_screen(Screen::Settings);
        let screen = render_to_string(&mut app, 100, 30);
        assert!(screen.contains("[ON ] Notifications"));
        assert!(screen.contains("[OFF] Dark Mode"));
        assert!(screen.contains("Sign Out"));
        assert!(screen.contains("Spanish"));
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let (mut app, _, _dir) = test_app(true);
        for screen in [
            Screen::Dashboard,
            Screen::Videos,
            Screen::Schedule,
            Screen::Progress,
            Screen::Chat,
            Screen::Settings,
        ] {
            app.switch_screen(screen);
            render_to_string(&mut app, 12, 4);
        }
        app.switch_screen(Screen::Videos);
        app.open_selected_video();
        render_to_string(&mut app, 12, 4);
    }
}
