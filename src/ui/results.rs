use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;
use webbrowser::Browser;

use crate::app::ExerciseResult;
use crate::metrics::TypingMetrics;
use crate::scoring::{FrustrationLevel, ScoreLevel, ScoreReport, SpeedLevel, STARTING_SCORE};
use crate::ui::{bold, italic, HORIZONTAL_MARGIN, VERTICAL_MARGIN};

const LABEL_WIDTH: usize = 40;

pub fn render(result: &ExerciseResult, area: Rect, buf: &mut Buffer) {
    let score = &result.score;
    let metrics = &result.payload.metrics;
    let breakdown = breakdown_lines(score);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),                              // score
            Constraint::Length(breakdown.len() as u16 + 2),     // breakdown
            Constraint::Min(3),                                 // metrics
            Constraint::Length(1),                              // legend
        ])
        .split(area);

    Paragraph::new(vec![
        Line::from(Span::styled("Overall Typing Score", bold())),
        Line::from(vec![
            Span::styled(
                format!("{}/100  ", score.final_score),
                bold().fg(level_color(score.level())),
            ),
            Span::styled(score.level().to_string(), italic()),
        ]),
    ])
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    Paragraph::new(breakdown)
        .block(Block::default().borders(Borders::ALL).title("Score Breakdown"))
        .render(chunks[1], buf);

    Paragraph::new(metric_lines(metrics))
        .block(Block::default().borders(Borders::ALL).title("Metrics"))
        .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        if Browser::is_available() {
            "(r)etake / (t)share / (esc)ape"
        } else {
            "(r)etake / (esc)ape"
        },
        italic(),
    ))
    .render(chunks[3], buf);
}

fn level_color(level: ScoreLevel) -> Color {
    match level {
        ScoreLevel::Excellent => Color::Green,
        ScoreLevel::Good => Color::Cyan,
        ScoreLevel::Average => Color::Yellow,
        ScoreLevel::NeedsImprovement => Color::LightRed,
        ScoreLevel::Poor => Color::Red,
    }
}

/// `label` padded to `width` display columns.
fn pad(label: &str, width: usize) -> String {
    let fill = width.saturating_sub(label.width());
    format!("{}{}", label, " ".repeat(fill))
}

pub(crate) fn breakdown_lines(score: &ScoreReport) -> Vec<Line<'static>> {
    let red = Style::default().fg(Color::Red);
    let mut lines = vec![Line::from(format!(
        "{}{:>4}",
        pad("Starting score", LABEL_WIDTH),
        STARTING_SCORE
    ))];

    for d in &score.breakdown {
        lines.push(Line::from(vec![
            Span::raw(pad(&format!("{}: {}", d.category, d.reason), LABEL_WIDTH)),
            Span::styled(format!("{:>4}", format!("-{}", d.penalty)), red),
        ]));
    }

    if score.breakdown.is_empty() {
        lines.push(Line::from(Span::styled(
            "No deductions",
            Style::default().add_modifier(Modifier::DIM),
        )));
    }

    lines.push(Line::from(vec![
        Span::raw(pad("Total deductions", LABEL_WIDTH)),
        Span::styled(format!("{:>4}", format!("-{}", score.total_penalty)), red),
    ]));
    lines.push(Line::from(Span::styled(
        format!("{}{:>4}", pad("Final score", LABEL_WIDTH), score.final_score),
        bold(),
    )));
    lines
}

fn metric_lines(m: &TypingMetrics) -> Vec<Line<'static>> {
    vec![
        Line::from(format!(
            "{} wpm ({})   {}% accuracy",
            m.wpm(),
            SpeedLevel::from_wpm(m.wpm()),
            m.accuracy()
        )),
        Line::from(format!(
            "errors {} (language {}, punctuation {})   mistakes made {}",
            m.total_errors(),
            m.language_errors(),
            m.punctuation_errors(),
            m.total_mistakes_made()
        )),
        Line::from(format!(
            "deletions {}   corrections {}   language switches {}",
            m.deletions(),
            m.corrections(),
            m.language_switches()
        )),
        Line::from(format!(
            "average delay {} ms   frustration {}/10 ({})",
            m.average_delay_ms(),
            m.frustration_score(),
            FrustrationLevel::from_score(m.frustration_score())
        )),
    ]
}
