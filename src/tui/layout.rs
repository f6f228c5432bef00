//! TUI layout and widget rendering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap};

use super::runtime::App;
use super::style;

/// Renders the full TUI frame.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(10),   // chart
            Constraint::Length(8), // stats + warnings
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_chart(frame, app, chunks[1]);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(44), Constraint::Min(20)])
        .split(chunks[2]);
    render_stats(frame, app, panels[0]);
    render_warnings(frame, app, panels[1]);
    render_footer(frame, chunks[3]);
}

/// Header bar: settings, granularity, selected period.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let period = app
        .selected_period()
        .map_or_else(|| "whole profile".to_string(), |p| p.label.clone());

    let header = Line::from(vec![
        Span::styled(
            " DRIVECYCLE ",
            Style::default()
                .fg(style::HEADER_FG)
                .bg(style::HEADER_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            &app.settings_name,
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " │ {} {}/{} │ {} │ {} pts ",
            app.granularity,
            app.selected + 1,
            app.periods.len().max(1),
            period,
            app.report.profile.len(),
        )),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

/// Current-vs-time chart of the selected period.
fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let data = app.chart_data();
    let y_bounds = style::auto_bounds_y(&data);

    let span = app
        .selected_period()
        .map_or_else(|| app.report.profile.end_time(), |p| p.duration())
        .max(1.0);
    let zero = [(0.0, 0.0), (span, 0.0)];

    let datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(style::ZERO_COLOR))
            .data(&zero),
        Dataset::default()
            .name("Current")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(style::CURRENT_COLOR))
            .data(&data),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(" Current Profile ")
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title("time")
                .bounds([0.0, span])
                .labels(vec![
                    style::time_label(0.0, span),
                    style::time_label(span / 2.0, span),
                    style::time_label(span, span),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("A")
                .bounds(y_bounds)
                .labels(vec![
                    format!("{:.1}", y_bounds[0]),
                    format!("{:.1}", y_bounds[1]),
                ]),
        );

    frame.render_widget(chart, area);
}

/// Statistics of the selected period.
fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let s = &app.slice_stats;
    let lines = vec![
        Line::from(format!("  points      {:>10}", s.point_count)),
        Line::from(format!("  peak charge {:>10.3} A", s.peak_charge_a)),
        Line::from(format!("  peak disch. {:>10.3} A", s.peak_discharge_a)),
        Line::from(format!("  net charge  {:>10.3} Ah", s.net_charge_ah)),
        Line::from(format!("  throughput  {:>10.3} Ah", s.throughput_ah)),
        Line::from(format!("  days        {:>10}", app.report.total_days)),
    ];
    let block = Block::default().title(" Period ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Run warnings, in the order they were raised.
fn render_warnings(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = if app.report.warnings.is_empty() {
        vec![Line::from("  No warnings.")]
    } else {
        app.report
            .warnings
            .iter()
            .map(|w| {
                Line::from(Span::styled(
                    format!("  {w}"),
                    Style::default().fg(style::WARNING_FG),
                ))
            })
            .collect()
    };
    let title = format!(" Warnings ({}) ", app.report.warnings.len());
    let block = Block::default().title(title).borders(Borders::ALL);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Footer with keybinding hints.
fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(Span::styled(
        " q:Quit  d/m/y:Granularity  ←/→:Period  1/2/3:Preset",
        Style::default().fg(style::FOOTER_FG),
    )));
    frame.render_widget(footer, area);
}
