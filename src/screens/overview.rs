/// Cluster overview screen - banner, title bar, summary and the host table

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::core::{Accent, ColorClass, DashboardFrame, HostRow, StatusSummary};
use crate::core::snapshot::MetricCell;
use crate::utils::{format_clock, format_time_of_day, render_bar, truncate_string, HEADER, PLACEHOLDER};

const STARTUP_MESSAGE: &str = "SYSTEM INITIALIZED. CONNECTING TO NEURAL NET...";

pub fn accent_color(accent: Accent) -> Color {
    match accent {
        Accent::Cyan => Color::Cyan,
        Accent::Magenta => Color::Magenta,
        Accent::Green => Color::Green,
    }
}

pub fn class_color(class: ColorClass) -> Color {
    match class {
        ColorClass::Green => Color::Green,
        ColorClass::Yellow => Color::Yellow,
        ColorClass::Red => Color::Red,
        ColorClass::Dim => Color::DarkGray,
    }
}

/// ` OVERSEER v<version> | <clock> | MODE: WATCHER `
pub fn title_text(version: &str, frame: &DashboardFrame) -> String {
    format!(
        " OVERSEER v{} | {} | MODE: WATCHER ",
        version,
        format_clock(&frame.taken_at)
    )
}

fn banner_style() -> Style {
    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
}

fn banner_height() -> u16 {
    // Banner lines plus the bordered startup panel
    HEADER.trim_matches('\n').lines().count() as u16 + 3
}

pub fn draw(f: &mut Frame, dash: &DashboardFrame, version: &str) {
    let area = f.size();
    // Two lines per host plus header, borders and summary
    let table_height = dash.rows.len() as u16 * 2 + 4;
    let show_banner = area.height >= banner_height() + table_height + 1;

    let constraints = if show_banner {
        vec![
            Constraint::Length(banner_height()),
            Constraint::Length(1), // Summary
            Constraint::Min(0),    // Host table
        ]
    } else {
        vec![Constraint::Length(0), Constraint::Length(1), Constraint::Min(0)]
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    if show_banner {
        render_banner(f, chunks[0], dash.accent);
    }
    render_summary(f, chunks[1], &dash.summary);
    render_hosts(f, chunks[2], dash, version);
}

fn render_banner(f: &mut Frame, area: Rect, accent: Accent) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let banner = Paragraph::new(HEADER.trim_matches('\n'))
        .style(banner_style())
        .alignment(Alignment::Center);
    f.render_widget(banner, chunks[0]);

    let panel = Paragraph::new(STARTUP_MESSAGE)
        .style(Style::default().fg(Color::Green))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent_color(accent))),
        );
    f.render_widget(panel, chunks[1]);
}

fn render_summary(f: &mut Frame, area: Rect, summary: &StatusSummary) {
    let line = Line::from(vec![
        Span::styled(" Online: ", Style::default().fg(Color::Gray)),
        Span::styled(
            summary.online.to_string(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  │  "),
        Span::styled("Offline: ", Style::default().fg(Color::Gray)),
        Span::styled(summary.offline.to_string(), Style::default().fg(Color::Red)),
        Span::raw("  │  "),
        Span::styled("Error: ", Style::default().fg(Color::Gray)),
        Span::styled(summary.error.to_string(), Style::default().fg(Color::Yellow)),
        Span::raw("  │  "),
        Span::styled("Scanning: ", Style::default().fg(Color::Gray)),
        Span::styled(summary.scanning.to_string(), Style::default().fg(Color::Blue)),
        Span::raw("  │  "),
        Span::styled("[q] Quit", Style::default().fg(Color::DarkGray)),
    ]);

    f.render_widget(Paragraph::new(line), area);
}

fn metric_cell(cell: &MetricCell, with_bar: bool) -> Cell<'static> {
    let style = Style::default().fg(class_color(cell.color));
    if with_bar {
        Cell::from(Line::from(vec![
            Span::styled(render_bar(cell.fill), style),
            Span::raw(" "),
            Span::styled(cell.text.clone(), style),
        ]))
    } else {
        Cell::from(Span::styled(cell.text.clone(), style))
    }
}

fn host_row(row: &HostRow) -> Row<'static> {
    let node = Text::from(vec![
        Line::from(Span::styled(
            truncate_string(&row.display_name, 20),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(row.address.clone(), Style::default().fg(Color::DarkGray))),
    ]);

    let status_color = class_color(row.status_class.color());
    let seen = row
        .last_update
        .as_ref()
        .map(format_time_of_day)
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    Row::new(vec![
        Cell::from(node),
        Cell::from(Span::styled(
            row.status_class.glyph(),
            Style::default().fg(status_color).add_modifier(Modifier::BOLD),
        )),
        metric_cell(&row.cpu, true),
        metric_cell(&row.ram, true),
        metric_cell(&row.temp, false),
        metric_cell(&row.disk, false),
        Cell::from(row.guests.clone()),
        Cell::from(row.uptime.clone()),
        Cell::from(Span::styled(seen, Style::default().fg(Color::Gray))),
    ])
    .height(2)
}

fn render_hosts(f: &mut Frame, area: Rect, dash: &DashboardFrame, version: &str) {
    let header = Row::new(vec!["NODE", "STATUS", "CPU", "RAM", "TMP", "DISK", "GUESTS", "UPTIME", "SEEN"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let rows: Vec<Row> = dash.rows.iter().map(host_row).collect();
    let accent = accent_color(dash.accent);

    let table = Table::new(
        rows,
        [
            Constraint::Length(20), // Node
            Constraint::Length(6),  // Status
            Constraint::Length(17), // CPU
            Constraint::Length(15), // RAM
            Constraint::Length(6),  // Temp
            Constraint::Length(5),  // Disk
            Constraint::Length(14), // Guests
            Constraint::Min(10),    // Uptime
            Constraint::Length(8),  // Seen
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Thick)
            .border_style(Style::default().fg(accent))
            .title(Span::styled(
                title_text(version, dash),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            )),
    );

    f.render_widget(table, area);
}
