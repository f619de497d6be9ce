//! TUI rendering.

use portpatrol_core::{PortClass, PortProcess, ViewMode};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use super::app::{App, MessageKind};

const MUTED: Color = Color::DarkGray;
const ACCENT: Color = Color::LightBlue;
const WARN: Color = Color::Yellow;
const DANGER: Color = Color::LightRed;
const OK: Color = Color::Green;

/// Column widths: marker, port, protocol, pid, name, user. Command fills the
/// rest of the line.
const COLUMNS: [usize; 6] = [2, 7, 5, 8, 20, 9];

const KEYBINDINGS: &[(&str, &str)] = &[
    ("j / ↓", "Move down"),
    ("k / ↑", "Move up"),
    ("g", "Jump to top"),
    ("G", "Jump to bottom"),
    ("/ or f", "Search/filter"),
    ("Enter", "Kill selected process"),
    ("i", "Show process details"),
    ("K", "Force kill (SIGKILL), no confirmation!"),
    ("r", "Refresh list"),
    ("s", "Toggle sort (port/pid/name)"),
    ("o", "Toggle sort order"),
    ("Esc", "Clear search / Close modal"),
    ("?", "Show this help"),
    ("q", "Quit"),
];

const STATUS_HELP: &str =
    "j/k: nav | /: search | Enter: kill | i: details | r: refresh | s: sort | ?: help | q: quit";

pub fn draw(f: &mut Frame, app: &App) {
    if app.is_loading() && app.visible().is_empty() {
        let loading = Paragraph::new(Span::styled("Scanning ports...", Style::default().fg(ACCENT)))
            .block(Block::default().padding(ratatui::widgets::Padding::uniform(1)));
        f.render_widget(loading, f.area());
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(app.header_height()),
            Constraint::Length(app.search_height()),
            Constraint::Min(0),
            Constraint::Length(app.status_height()),
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    if app.view().view_mode == ViewMode::Search {
        draw_search(f, app, chunks[1]);
    }

    match app.view().view_mode {
        ViewMode::List | ViewMode::Search => draw_list(f, app, chunks[2]),
        ViewMode::KillConfirm => draw_kill_confirm(f, app, chunks[2]),
        ViewMode::Help => draw_help(f, chunks[2]),
        ViewMode::Details => draw_details(f, app, chunks[2]),
    }

    draw_status(f, app, chunks[3]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(MUTED));
    let inner = block.inner(area).inner(Margin::new(1, 0));
    f.render_widget(block, area);

    let count = app.visible().len();
    let title = Line::from(vec![
        Span::styled("Port Patrol", Style::default().fg(DANGER).bold()),
        Span::styled(" - Who's using my ports?", Style::default().fg(MUTED)),
    ]);
    let total = Line::from(Span::styled(
        format!("{} listening {}", count, if count == 1 { "port" } else { "ports" }),
        Style::default().fg(MUTED),
    ))
    .alignment(Alignment::Right);

    let mut lines = vec![title];
    let query = &app.view().search_query;
    if !query.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Filter: ", Style::default().fg(MUTED)),
            Span::styled(format!("\"{}\"", query), Style::default().fg(WARN)),
        ]));
    }

    f.render_widget(Paragraph::new(lines), inner);
    f.render_widget(Paragraph::new(total), Rect { height: 1.min(inner.height), ..inner });
}

fn draw_search(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(MUTED));
    let inner = block.inner(area).inner(Margin::new(1, 0));
    f.render_widget(block, area);

    let query = &app.view().search_query;
    let text = if query.is_empty() {
        Span::styled("Search by port or process name...", Style::default().fg(MUTED).dim())
    } else {
        Span::styled(query.clone(), Style::default().fg(Color::White))
    };
    let line = Line::from(vec![
        Span::styled("/", Style::default().fg(ACCENT)),
        Span::raw(" "),
        text,
        Span::styled("▋", Style::default().fg(ACCENT)),
    ]);
    f.render_widget(Paragraph::new(line), inner);
}

fn draw_list(f: &mut Frame, app: &App, area: Rect) {
    let area = area.inner(Margin::new(1, 0));
    let visible = app.visible();
    let view = app.view();
    let max_visible = app.max_visible();

    let header: Vec<Span> = ["", "PORT", "PROTO", "PID", "NAME", "USER"]
        .iter()
        .zip(COLUMNS)
        .map(|(title, width)| Span::styled(pad(title, width), Style::default().fg(MUTED).bold()))
        .chain(std::iter::once(Span::styled("COMMAND", Style::default().fg(MUTED).bold())))
        .collect();

    let mut lines = vec![Line::from(header), Line::default()];

    if visible.is_empty() {
        lines.push(Line::from(Span::styled(
            "No listening ports found",
            Style::default().fg(MUTED),
        )));
        f.render_widget(Paragraph::new(lines), area);
        return;
    }

    let indicators = app.show_scroll_indicators();
    let end = (view.scroll_offset + max_visible).min(visible.len());

    if indicators {
        let above = if view.scroll_offset > 0 {
            format!("↑ {} more above", view.scroll_offset)
        } else {
            String::new()
        };
        lines.push(Line::from(Span::styled(above, Style::default().fg(MUTED))));
    }

    for (i, proc) in visible[view.scroll_offset..end].iter().enumerate() {
        let selected = view.scroll_offset + i == view.selected_index;
        lines.push(process_row(proc, selected, app.home()));
    }

    if indicators {
        let below = if end < visible.len() {
            format!("↓ {} more below", visible.len() - end)
        } else {
            String::new()
        };
        lines.push(Line::from(Span::styled(below, Style::default().fg(MUTED))));
    }

    f.render_widget(Paragraph::new(lines), area);
}

fn port_color(class: PortClass) -> Color {
    match class {
        PortClass::System => DANGER,
        PortClass::Registered => WARN,
        PortClass::Dynamic => OK,
    }
}

fn process_row<'a>(proc: &PortProcess, selected: bool, home: Option<&str>) -> Line<'a> {
    let emphasis = |style: Style| if selected { style.bold() } else { style };

    let command = proc.display_command(home);
    let command_max = if proc.cwd.is_some() { 60 } else { 50 };
    let command_style = if selected {
        Style::default().fg(OK)
    } else {
        Style::default().fg(MUTED).dim()
    };

    Line::from(vec![
        Span::styled(
            pad(if selected { "▸" } else { "" }, COLUMNS[0]),
            Style::default().fg(if selected { WARN } else { MUTED }),
        ),
        Span::styled(
            pad(&proc.port.to_string(), COLUMNS[1]),
            emphasis(Style::default().fg(port_color(proc.port_class()))),
        ),
        Span::styled(pad(proc.protocol.as_str(), COLUMNS[2]), Style::default().fg(MUTED)),
        Span::styled(
            pad(&proc.pid.to_string(), COLUMNS[3]),
            Style::default().fg(if selected { Color::Gray } else { MUTED }),
        ),
        Span::styled(
            pad(&truncate(&proc.process_name, COLUMNS[4] - 1), COLUMNS[4]),
            emphasis(Style::default().fg(ACCENT)),
        ),
        Span::styled(
            pad(&truncate(proc.user.as_deref().unwrap_or("-"), COLUMNS[5] - 1), COLUMNS[5]),
            Style::default().fg(MUTED),
        ),
        Span::styled(truncate(&command, command_max), command_style),
    ])
}

fn modal_block(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .title(Span::styled(format!(" {} ", title), Style::default().fg(color).bold()))
        .padding(ratatui::widgets::Padding::new(2, 2, 1, 1))
}

fn field<'a>(label: &'a str, value: Span<'a>) -> Line<'a> {
    Line::from(vec![Span::styled(label, Style::default().fg(MUTED)), value])
}

fn draw_kill_confirm(f: &mut Frame, app: &App, area: Rect) {
    let Some(proc) = app.kill_target() else {
        return;
    };
    let force = app.kill_force();

    let mut lines = vec![
        field("Port: ", Span::styled(proc.port.to_string(), Style::default().fg(WARN))),
        field("PID: ", Span::styled(proc.pid.to_string(), Style::default().fg(ACCENT))),
        field("Process: ", Span::raw(proc.process_name.clone())),
    ];
    if !proc.command.is_empty() {
        lines.push(field(
            "Command: ",
            Span::styled(proc.command.chars().take(60).collect::<String>(), Style::default().dim()),
        ));
    }
    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled("Force kill (SIGKILL): ", Style::default().fg(MUTED)),
        Span::styled(
            if force { "YES" } else { "no" },
            Style::default().fg(if force { DANGER } else { OK }),
        ),
        Span::styled(" (press f to toggle)", Style::default().fg(MUTED)),
    ]));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "y/Enter confirm | n/Esc cancel | f toggle force",
        Style::default().fg(MUTED).dim(),
    )));

    let modal = Paragraph::new(lines).block(modal_block("Kill Process", DANGER));
    f.render_widget(modal, area.inner(Margin::new(1, 0)));
}

fn draw_help(f: &mut Frame, area: Rect) {
    let mut lines: Vec<Line> = KEYBINDINGS
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(pad(key, 14), Style::default().fg(WARN)),
                Span::styled(*action, Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    lines.push(Line::default());
    lines.push(port_legend());
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Press ? or Esc to close",
        Style::default().fg(MUTED).dim(),
    )));

    let modal = Paragraph::new(lines).block(modal_block("Keyboard Shortcuts", ACCENT));
    f.render_widget(modal, area.inner(Margin::new(1, 0)));
}

fn port_legend<'a>() -> Line<'a> {
    let classes = [
        (PortClass::System, "<1024"),
        (PortClass::Registered, "<10000"),
        (PortClass::Dynamic, "10000+"),
    ];
    let mut spans = vec![Span::styled("Port colors:", Style::default().fg(MUTED))];
    for (class, range) in classes {
        spans.push(Span::styled(
            format!(" {} ({})", class.display_name(), range),
            Style::default().fg(port_color(class)),
        ));
    }
    Line::from(spans)
}

fn draw_details(f: &mut Frame, app: &App, area: Rect) {
    let Some(proc) = app.inspected() else {
        return;
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Port: ", Style::default().fg(MUTED)),
            Span::styled(proc.port.to_string(), Style::default().fg(WARN)),
            Span::styled(format!(" ({})", proc.protocol), Style::default().fg(MUTED)),
        ]),
        field("PID: ", Span::styled(proc.pid.to_string(), Style::default().fg(ACCENT))),
        field("Process: ", Span::raw(proc.process_name.clone())),
    ];
    if let Some(user) = &proc.user {
        lines.push(field("User: ", Span::raw(user.clone())));
    }
    lines.push(field("Address: ", Span::raw(proc.address.clone())));
    if !proc.command.is_empty() {
        lines.push(field("Command: ", Span::styled(proc.command.clone(), Style::default().dim())));
    }
    if let Some(cwd) = &proc.cwd {
        lines.push(field("CWD: ", Span::styled(cwd.clone(), Style::default().dim())));
    }

    if !app.details().is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("System info:", Style::default().fg(MUTED))));
        lines.push(Line::default());
        lines.extend(
            app.details()
                .lines()
                .map(|line| Line::from(Span::styled(format!(" {}", line), Style::default().dim()))),
        );
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Press i or Esc to close",
        Style::default().fg(MUTED).dim(),
    )));

    let modal = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(modal_block("Process Details", OK));
    f.render_widget(modal, area.inner(Margin::new(1, 0)));
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(MUTED));
    let inner = block.inner(area).inner(Margin::new(1, 0));
    f.render_widget(block, area);

    f.render_widget(
        Paragraph::new(Span::styled(STATUS_HELP, Style::default().fg(MUTED))),
        inner,
    );

    let right = match app.message() {
        Some(message) => {
            let color = match message.kind {
                MessageKind::Success => OK,
                MessageKind::Error => DANGER,
                MessageKind::Info => ACCENT,
            };
            Span::styled(message.text.clone(), Style::default().fg(color))
        }
        None => {
            let view = app.view();
            Span::styled(
                format!("sort: {} {}", view.sort_field.display_name(), view.sort_order.arrow()),
                Style::default().fg(MUTED),
            )
        }
    };
    f.render_widget(Paragraph::new(Line::from(right).alignment(Alignment::Right)), inner);
}

/// Left-align `s` in a column of `width` characters.
fn pad(s: &str, width: usize) -> String {
    format!("{:<width$}", s, width = width)
}

/// Shorten to at most `max` characters, marking the cut with an ellipsis.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("nginx", 19), "nginx");
        assert_eq!(truncate("a-very-long-process-name", 10), "a-very-lo…");
        assert_eq!(truncate("héllo wörld", 5), "héll…");
    }

    #[test]
    fn test_pad() {
        assert_eq!(pad("80", 7), "80     ");
        assert_eq!(pad("", 2), "  ");
    }

    #[test]
    fn test_port_colors() {
        assert_eq!(port_color(PortClass::of(80)), DANGER);
        assert_eq!(port_color(PortClass::of(8080)), WARN);
        assert_eq!(port_color(PortClass::of(49152)), OK);
    }

    #[test]
    fn test_port_legend_names_each_class() {
        let legend = port_legend();
        let text: String = legend.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(
            text,
            "Port colors: system (<1024) registered (<10000) dynamic (10000+)"
        );
        assert_eq!(legend.spans[1].style.fg, Some(DANGER));
        assert_eq!(legend.spans[3].style.fg, Some(OK));
    }

    #[test]
    fn test_process_row_shows_project_dir() {
        let proc = PortProcess::new(7, 3000, portpatrol_core::Protocol::Tcp, "LISTEN", "0.0.0.0", "node")
            .with_cwd(Some("/home/dev/app".to_string()));
        let line = process_row(&proc, true, Some("/home/dev"));
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.starts_with("▸ 3000"));
        assert!(text.ends_with("~/app"));
    }
}
