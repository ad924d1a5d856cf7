use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use crate::app::{App, FocusPane, InputMode};
use crate::article::ArticleContent;
use crate::format::truncate;
use crate::view::{HistoryView, Panel, ResultView};

const SIDEBAR_WIDTH: u16 = 34;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    Line::from(spans)
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

    render_header(frame, header_area);

    let [sidebar_area, main_area] = Layout::horizontal([
        Constraint::Length(SIDEBAR_WIDTH),
        Constraint::Min(0),
    ])
    .areas(body_area);

    let view = app.session.view();

    // Error banner sits above the input and only takes space when present
    let banner_height = if view.error.is_some() { 1 } else { 0 };
    let [banner_area, input_area, panel_area] = Layout::vertical([
        Constraint::Length(banner_height),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(main_area);

    // Store areas for mouse hit-testing
    app.history_area = Some(sidebar_area);
    app.content_area = Some(panel_area);

    render_history(
        frame,
        sidebar_area,
        &view.history,
        &mut app.history_state,
        app.focus == FocusPane::History,
    );

    if let Some(message) = view.error {
        let banner = Paragraph::new(Line::from(vec![
            Span::styled(" ! ", Style::default().bg(Color::Red).fg(Color::White).bold()),
            Span::styled(format!(" {}", message), Style::default().fg(Color::Red)),
        ]));
        frame.render_widget(banner, banner_area);
    }

    // Search input - highlight when focused or editing
    let editing = app.input_mode == InputMode::Editing;
    let input_border_color = if view.loading {
        Color::DarkGray
    } else if app.focus == FocusPane::Input || editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let input_title = if view.loading {
        // Animated ellipsis: cycles through ".", "..", "..."
        format!(" Searching{} ", ".".repeat((app.animation_frame as usize) + 1))
    } else {
        " Ask the knowledge base (Enter to search) ".to_string()
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_border_color))
        .title(input_title);

    // Horizontal scrolling keeps the cursor visible
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app.session.input()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, input_area);

    if editing && !view.loading {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }

    match &view.panel {
        Panel::ArticleDetail(article) => {
            render_article(frame, panel_area, article, app.content_scroll);
        }
        Panel::Result(result) => {
            render_result(
                frame,
                panel_area,
                result,
                app.content_scroll,
                &mut app.articles_state,
                app.focus == FocusPane::Articles,
            );
        }
        Panel::Welcome => render_welcome(frame, panel_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Knowledge Base Search ", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_history(
    frame: &mut Frame,
    area: Rect,
    history: &HistoryView,
    state: &mut ListState,
    focused: bool,
) {
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" Recent Searches ({}) ", history.total));

    if history.items.is_empty() {
        let placeholder = Paragraph::new("No searches yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let toggle_height = if history.toggle.is_some() { 1 } else { 0 };
    let [list_area, toggle_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(toggle_height),
    ])
    .areas(area);

    let text_width = area.width.saturating_sub(5) as usize;
    let items: Vec<ListItem> = history
        .items
        .iter()
        .map(|item| {
            ListItem::new(vec![
                Line::from(truncate(&item.question, text_width)),
                Line::from(Span::styled(
                    item.created.clone(),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    if focused {
        frame.render_stateful_widget(list, list_area, state);
    } else {
        frame.render_widget(list, list_area);
    }

    if let Some(toggle) = history.toggle {
        let label = Line::from(vec![
            Span::styled(" v ", Style::default().bg(Color::DarkGray).fg(Color::White)),
            Span::styled(
                format!(" {} ({}) ", toggle.label(), history.total),
                Style::default().fg(Color::Cyan),
            ),
        ]);
        frame.render_widget(Paragraph::new(label), toggle_area);
    }
}

fn render_welcome(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Welcome ");

    let lines = vec![
        Line::from(Span::styled(
            "Search the knowledge base",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::default(),
        Line::from("Type a question and press Enter. You get an AI summary of the"),
        Line::from("answer and a list of related articles."),
        Line::default(),
        Line::from(Span::styled("Try:", Style::default().fg(Color::DarkGray))),
        Line::from(Span::styled(
            "  How do I restart a systemd service in Linux?",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
        Line::from(Span::styled(
            "  Why does the SSL handshake fail?",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    let welcome = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(welcome, area);
}

fn render_result(
    frame: &mut Frame,
    area: Rect,
    result: &ResultView<'_>,
    scroll: u16,
    articles_state: &mut ListState,
    articles_focused: bool,
) {
    let articles_height = if result.articles.is_empty() {
        0
    } else {
        (result.articles.len().min(8) + 2) as u16 // +2 for borders
    };

    let [answer_area, articles_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(articles_height),
    ])
    .areas(area);

    let mut lines = vec![
        Line::from(Span::styled("Question", Style::default().fg(Color::DarkGray))),
        Line::from(Span::styled(
            result.question.clone(),
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::default(),
        Line::from(Span::styled(
            "AI Summary",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
    ];
    lines.extend(result.summary.lines().map(parse_markdown_line));

    let answer = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" Result #{} ", result.record.id)),
        )
        .wrap(Wrap { trim: true })
        .scroll((scroll, 0));
    frame.render_widget(answer, answer_area);

    if result.articles.is_empty() {
        return;
    }

    let border_color = if articles_focused { Color::Cyan } else { Color::Magenta };
    let items: Vec<ListItem> = result
        .articles
        .iter()
        .enumerate()
        .map(|(i, link)| ListItem::new(format!(" {}. {} ", i + 1, link.title)))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .title(" Related Articles (Tab to focus, Enter to open) "),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Magenta)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, articles_area, articles_state);
}

fn render_article(frame: &mut Frame, area: Rect, article: &ArticleContent, scroll: u16) {
    let mut lines = vec![
        Line::from(Span::styled(
            article.title.clone(),
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(Span::styled(
            format!("{} · {} min read · {}", article.category, article.read_minutes, article.id),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Placeholder content: the article service is not available yet.",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )),
        Line::default(),
        Line::from(article.summary.clone()),
    ];

    for section in &article.sections {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            section.heading.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(section.body.clone()));
    }

    let body = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Article (Esc to go back) "),
        )
        .wrap(Wrap { trim: true })
        .scroll((scroll, 0));
    frame.render_widget(body, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " SEARCH ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    let mut hints: Vec<Span> = Vec::new();
    match app.input_mode {
        InputMode::Editing => {
            hints.extend(hint("Enter", "search"));
            hints.extend(hint("Tab", "focus"));
            hints.extend(hint("Esc", "stop typing"));
        }
        InputMode::Normal => {
            match app.focus {
                FocusPane::Articles => {
                    hints.extend(hint("j/k", "nav"));
                    hints.extend(hint("Enter", "open"));
                }
                FocusPane::History => {
                    hints.extend(hint("j/k", "nav"));
                    hints.extend(hint("Enter", "reuse question"));
                }
                FocusPane::Input => {
                    hints.extend(hint("j/k", "scroll"));
                    hints.extend(hint("i", "edit"));
                }
            }
            if app.showing_article() {
                hints.extend(hint("Esc", "back"));
            }
            if app.session.history_toggle_offered() {
                let label = if app.session.history_expanded() { "show less" } else { "view all" };
                hints.extend(hint("v", label));
            }
            hints.extend(hint("Tab", "focus"));
            hints.extend(hint("q", "quit"));
        }
    }

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
