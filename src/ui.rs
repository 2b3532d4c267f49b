pub mod charting;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{App, AppState},
    metrics::consistency,
    surface::{Cell, CellStatus},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

struct Palette {
    bold: Style,
    correct: Style,
    incorrect: Style,
    pending: Style,
    current: Style,
    italic: Style,
    magenta: Style,
}

impl Palette {
    fn new() -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let pending = Style::default().patch(bold).add_modifier(Modifier::DIM);

        Self {
            bold,
            correct: Style::default().patch(bold).fg(Color::Green),
            incorrect: Style::default().patch(bold).fg(Color::Red),
            pending,
            current: Style::default().patch(pending).add_modifier(Modifier::UNDERLINED),
            italic: Style::default().add_modifier(Modifier::ITALIC),
            magenta: Style::default().fg(Color::Magenta),
        }
    }

    fn for_status(&self, status: CellStatus) -> Style {
        match status {
            CellStatus::Pending => self.pending,
            CellStatus::Current => self.current,
            CellStatus::Correct => self.correct,
            CellStatus::Incorrect => self.incorrect,
        }
    }
}

fn cell_span(cell: &Cell, palette: &Palette) -> Span<'static> {
    let text = match (cell.status, cell.char) {
        // a missed space would be invisible otherwise
        (CellStatus::Incorrect, ' ') => "·".to_owned(),
        (_, c) => c.to_string(),
    };
    Span::styled(text, palette.for_status(cell.status))
}

impl<C, T> Widget for &App<C, T> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = Palette::new();
        match self.state {
            AppState::Typing => render_typing(self, area, buf, &palette),
            AppState::Results => render_results(self, area, buf, &palette),
        }
    }
}

fn render_typing<C, T>(app: &App<C, T>, area: Rect, buf: &mut Buffer, palette: &Palette) {
    let session = &app.session;
    let prompt = session.target_text();

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_occupied_lines = if prompt.width() <= max_chars_per_line as usize {
        1
    } else {
        ((prompt.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    };
    let padding = area.height.saturating_sub(prompt_occupied_lines + 2) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(padding),
            Constraint::Length(prompt_occupied_lines),
            Constraint::Length(1), // live metrics
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let spans = session
        .display()
        .cells()
        .iter()
        .map(|cell| cell_span(cell, palette))
        .collect::<Vec<Span>>();

    Paragraph::new(Line::from(spans))
        .alignment(if prompt_occupied_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);

    let metrics = session.metrics();
    Paragraph::new(Span::styled(
        format!("{} wpm   {}% acc", metrics.wpm, metrics.accuracy),
        palette.pending,
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(Span::styled("(←) retry / (→) new / (esc)ape", palette.italic))
        .render(chunks[4], buf);
}

fn render_results<C, T>(app: &App<C, T>, area: Rect, buf: &mut Buffer, palette: &Palette) {
    let session = &app.session;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1), // padding
            Constraint::Length(1),
        ])
        .split(area);

    let samples = session.wpm_samples();
    let (duration, peak) = charting::compute_chart_params(samples);
    let points: Vec<(f64, f64)> = samples.iter().map(|s| (*s).into()).collect();

    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(palette.magenta)
        .graph_type(GraphType::Line)
        .data(&points)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, duration])
                .labels(vec![
                    Span::styled("0", palette.bold),
                    Span::styled(charting::format_label(duration), palette.bold),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, peak])
                .labels(vec![
                    Span::styled("0", palette.bold),
                    Span::styled(charting::format_label(peak), palette.bold),
                ]),
        )
        .render(chunks[0], buf);

    let metrics = session.metrics();
    let sd = consistency(samples).unwrap_or(0.0);
    Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {:.2} sd",
            metrics.wpm, metrics.accuracy, sd
        ),
        palette.bold,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled("(r)etry / (n)ew / (esc)ape", palette.italic))
        .render(chunks[3], buf);
}
