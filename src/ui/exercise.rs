use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use crate::app::App;
use crate::classify::normalize;
use crate::clipboard::ClipboardSurface;
use crate::clock::Clock;
use crate::ui::{bold, italic, HORIZONTAL_MARGIN, VERTICAL_MARGIN};

const NEWLINE_MARK: &str = "⏎";

pub fn render<C: Clock, S: ClipboardSurface + Clone>(app: &App<C, S>, area: Rect, buf: &mut Buffer) {
    let session = app.session();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Min(3),    // reference
            Constraint::Length(6), // input
            Constraint::Length(1), // progress
            Constraint::Length(1), // counter
            Constraint::Length(2), // status
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Line::from(vec![
        Span::styled(app.exercise().title.clone(), bold()),
        Span::styled(format!("  ({})", app.pair()), italic()),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let typed = normalize(session.input());
    Paragraph::new(reference_lines(session.reference(), &typed))
        .block(Block::default().borders(Borders::ALL).title("Text"))
        .wrap(Wrap { trim: false })
        .render(chunks[1], buf);

    let visible = chunks[2].height.saturating_sub(2) as usize;
    Paragraph::new(input_tail(session.input(), visible))
        .block(Block::default().borders(Borders::ALL).title("Your text"))
        .wrap(Wrap { trim: false })
        .render(chunks[2], buf);

    let progress = session.progress();
    Gauge::default()
        .gauge_style(Style::default().fg(if session.can_complete() {
            Color::Green
        } else {
            Color::Blue
        }))
        .ratio(progress / 100.0)
        .label(format!("{:.0}%", progress))
        .render(chunks[3], buf);

    let mut counter = vec![Span::styled(
        format!(
            "Characters: {} / {}",
            session.typed_len(),
            session.reference().len()
        ),
        bold(),
    )];
    if app.clipboard_blocked() {
        counter.push(Span::styled(
            "   clipboard blocked",
            Style::default().add_modifier(Modifier::DIM),
        ));
    }
    Paragraph::new(Line::from(counter))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

    Paragraph::new(status_lines(app))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[5], buf);

    Paragraph::new(Span::styled(
        "(enter) new line / (tab) complete / (esc)ape",
        italic(),
    ))
    .render(chunks[6], buf);
}

/// The reference text coloured against what has been typed so far.
pub(crate) fn reference_lines(reference: &[char], typed: &[char]) -> Vec<Line<'static>> {
    let correct = bold().fg(Color::Green);
    let wrong = bold().fg(Color::Red);
    let cursor = bold()
        .add_modifier(Modifier::DIM)
        .add_modifier(Modifier::UNDERLINED);
    let pending = bold().add_modifier(Modifier::DIM);

    let mut lines = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    for (idx, &expected) in reference.iter().enumerate() {
        let style = match typed.get(idx) {
            Some(&actual) if actual == expected => correct,
            Some(_) => wrong,
            None if idx == typed.len() => cursor,
            None => pending,
        };
        if expected == '\n' {
            if style == wrong || style == cursor {
                spans.push(Span::styled(NEWLINE_MARK, style));
            }
            lines.push(Line::from(std::mem::take(&mut spans)));
        } else {
            spans.push(Span::styled(expected.to_string(), style));
        }
    }
    lines.push(Line::from(spans));
    lines
}

/// The last `rows` lines of the input, with a cursor mark.
fn input_tail(input: &str, rows: usize) -> Vec<Line<'static>> {
    let all: Vec<&str> = input.split('\n').collect();
    let start = all.len().saturating_sub(rows.max(1));
    let last = all.len() - 1;
    all[start..]
        .iter()
        .enumerate()
        .map(|(i, l)| {
            let mut line = l.to_string();
            if start + i == last {
                line.push('▏');
            }
            Line::from(line)
        })
        .collect()
}

fn status_lines<C: Clock, S: ClipboardSurface + Clone>(app: &App<C, S>) -> Vec<Line<'static>> {
    let session = app.session();
    let mut lines = Vec::new();

    if let Some(warning) = app.warning() {
        lines.push(Line::from(Span::styled(
            format!("⚠ {} (press any key)", warning.message()),
            bold().fg(Color::Red),
        )));
    } else if let Some(notice) = app.notice() {
        lines.push(Line::from(Span::styled(notice, bold().fg(Color::Yellow))));
    } else if !session.can_complete() {
        lines.push(Line::from(Span::styled(
            "Please type at least 50% of the text to continue.",
            Style::default().add_modifier(Modifier::DIM),
        )));
    }

    if session.cheat_flagged() {
        lines.push(Line::from(Span::styled(
            "Suspicious activity detected",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::ITALIC),
        )));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::testing::RecordingSurface;
    use crate::clock::ManualClock;
    use crate::config::AnalyzerSettings;
    use crate::exercise::{Exercise, LanguagePair};
    use crate::scoring::ScoringRules;
    use crate::ui::buffer_lines;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn app(clock: &ManualClock) -> App<&ManualClock, RecordingSurface> {
        App::new(
            LanguagePair::FrenchEnglish,
            1,
            Exercise {
                title: "Exercise 1 - Purchasing Email".into(),
                text: "Bonjour,\nle RFQ est prêt.".into(),
            },
            AnalyzerSettings::default(),
            ScoringRules::default(),
            clock,
            RecordingSurface::default(),
        )
    }

    #[test]
    fn test_reference_colouring() {
        let reference: Vec<char> = "ab\ncd".chars().collect();
        let typed: Vec<char> = "ax".chars().collect();
        let lines = reference_lines(&reference, &typed);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Green));
        assert_eq!(lines[0].spans[1].style.fg, Some(Color::Red));
        // the cursor sits on the line break
        assert_eq!(lines[0].spans.len(), 3);
        assert_eq!(lines[0].spans[2].content, NEWLINE_MARK);
        assert!(lines[1].spans[0]
            .style
            .add_modifier
            .contains(Modifier::DIM));
    }

    #[test]
    fn test_wrong_newline_is_marked() {
        let reference: Vec<char> = "a\nb".chars().collect();
        let typed: Vec<char> = "ax".chars().collect();
        let lines = reference_lines(&reference, &typed);
        assert_eq!(lines[0].spans.last().unwrap().content, NEWLINE_MARK);
    }

    #[test]
    fn test_input_tail() {
        let lines = input_tail("one\ntwo\nthree", 2);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].to_string(), "two");
        assert_eq!(lines[1].to_string(), "three▏");
        assert_eq!(input_tail("", 3)[0].to_string(), "▏");
    }

    #[test]
    fn test_renders_exercise_screen() {
        let clock = ManualClock::new(0);
        let mut app = app(&clock);
        for c in "Bon".chars() {
            clock.advance(200);
            app.on_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| f.render_widget(&app, f.area())).unwrap();
        let screen = buffer_lines(terminal.backend().buffer()).join("\n");

        assert!(screen.contains("Exercise 1 - Purchasing Email"));
        assert!(screen.contains("French-English"));
        assert!(screen.contains("Bonjour,"));
        assert!(screen.contains("Characters: 3 / 25"));
        assert!(screen.contains("Please type at least 50% of the text to continue."));
        assert!(screen.contains("clipboard blocked"));
    }

    #[test]
    fn test_renders_cheat_warning() {
        let clock = ManualClock::new(0);
        let mut app = app(&clock);
        app.on_paste("Bonjour");

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| f.render_widget(&app, f.area())).unwrap();
        let screen = buffer_lines(terminal.backend().buffer()).join("\n");

        assert!(screen.contains("Copy/Paste is not allowed!"));
        assert!(screen.contains("Suspicious activity detected"));
    }

    #[test]
    fn test_renders_in_tiny_area() {
        let clock = ManualClock::new(0);
        let app = app(&clock);
        let area = Rect::new(0, 0, 12, 4);
        let mut buffer = Buffer::empty(area);
        (&app).render(area, &mut buffer);
    }
}
