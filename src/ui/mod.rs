use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use regex::Regex;
use time::OffsetDateTime;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::state::{DashboardState, FocusPane, View};
use crate::config::Palette;
use crate::feed::{Category, Record, Sentiment};
use crate::highlight::{build_highlight_regex, segments, SegmentKind};
use crate::session::{ConnectionState, FeedSession};

/// Borrowed snapshot of everything one frame needs.
pub struct DashboardView<'a> {
    pub session: &'a FeedSession,
    pub state: &'a DashboardState,
    pub palette: &'a Palette,
    pub handle: &'a str,
    pub now: OffsetDateTime,
}

pub fn draw_dashboard(frame: &mut Frame, view: &DashboardView<'_>, list_state: &mut ListState) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(4),
        ])
        .split(frame.size());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(vertical[1]);

    let palette = view.palette;
    let state = view.state;
    let records = view.session.records();

    let header = Paragraph::new(Text::from(header_lines(view))).block(
        Block::default()
            .title(format!("Mentions of {}", view.handle))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent)),
    );
    frame.render_widget(header, vertical[0]);

    let query_regex = match state.view {
        View::Search => build_highlight_regex(&[state.search.query.clone()]),
        View::Live => None,
    };
    let item_width = columns[0].width.saturating_sub(4) as usize;
    let visible = state.visible(records);
    let mut items: Vec<ListItem> = visible
        .iter()
        .map(|record| record_item(record, palette, query_regex.as_ref(), item_width))
        .collect();
    if items.is_empty() {
        let empty = if view.session.is_loading() && records.is_empty() {
            "Loading mentions..."
        } else {
            "No mentions match the current filter."
        };
        items.push(ListItem::new(Span::styled(
            empty,
            Style::default().fg(palette.muted),
        )));
    }

    let list_title = match state.view {
        View::Live => format!("Live feed [{}] {}", state.filter_label(), visible.len()),
        View::Search => format!(
            "Search \"{}\" via {} [{}] {}{}",
            state.search.query,
            state.search.source,
            state.filter_label(),
            visible.len(),
            if state.search.has_more { "+" } else { "" }
        ),
    };
    let list = List::new(items)
        .block(
            Block::default()
                .title(list_title)
                .borders(Borders::ALL)
                .border_style(focus_style(state.focus == FocusPane::List, palette)),
        )
        .highlight_style(
            Style::default()
                .bg(palette.selection_bg)
                .fg(palette.selection_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");
    frame.render_stateful_widget(list, columns[0], list_state);

    let detail_text = state
        .selected_record(records)
        .map(|record| detail_lines(record, palette, query_regex.as_ref()))
        .map(Text::from)
        .unwrap_or_else(|| Text::from("Select a mention to see its details."));
    let detail = Paragraph::new(detail_text)
        .block(
            Block::default()
                .title("Detail")
                .borders(Borders::ALL)
                .border_style(focus_style(state.focus == FocusPane::Detail, palette)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(Clear, columns[1]);
    frame.render_widget(detail, columns[1]);

    let footer = Paragraph::new(Text::from(footer_lines(state, palette)))
        .style(Style::default().fg(palette.muted));
    frame.render_widget(footer, vertical[2]);
}

fn focus_style(focused: bool, palette: &Palette) -> Style {
    if focused {
        Style::default().fg(palette.accent)
    } else {
        Style::default()
    }
}

fn header_lines(view: &DashboardView<'_>) -> Vec<Line<'static>> {
    let palette = view.palette;
    let session = view.session;
    let (state_label, state_color) = match session.connection_state() {
        ConnectionState::Connecting => ("● connecting", palette.highlight),
        ConnectionState::Connected => ("● live", palette.positive),
        ConnectionState::Errored => ("● offline", palette.negative),
    };

    let mut status = vec![
        Span::styled(
            state_label,
            Style::default().fg(state_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  {} mentions", session.records().len())),
    ];
    let unseen = session.unseen_count();
    if unseen > 0 {
        status.push(Span::raw("  "));
        status.push(Span::styled(
            format!("{unseen} unseen"),
            Style::default().fg(palette.alert).add_modifier(Modifier::BOLD),
        ));
    }
    if let Some(at) = session.last_refresh_at() {
        status.push(Span::styled(
            format!("  updated {}", relative_time(view.now, at)),
            Style::default().fg(palette.muted),
        ));
    }
    if session.is_loading() {
        status.push(Span::styled(
            "  loading...",
            Style::default()
                .fg(palette.highlight)
                .add_modifier(Modifier::ITALIC),
        ));
    }

    let second = if let Some(message) = session.error_message() {
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(palette.negative),
        ))
    } else if session.notification_visible() {
        Line::from(Span::styled(
            format!("▲ {unseen} new mention{}", if unseen == 1 { "" } else { "s" }),
            Style::default().fg(palette.alert).add_modifier(Modifier::BOLD),
        ))
    } else {
        let breakdown = session.breakdown();
        let mut spans = Vec::new();
        for (sentiment, pct) in breakdown.percentages() {
            if !spans.is_empty() {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(
                format!("{sentiment} {pct}%"),
                Style::default().fg(sentiment_color(sentiment, palette)),
            ));
        }
        Line::from(spans)
    };

    vec![Line::from(status), second]
}

fn record_item(
    record: &Record,
    palette: &Palette,
    query: Option<&Regex>,
    width: usize,
) -> ListItem<'static> {
    let mut title = Vec::new();
    if record.is_unseen {
        title.push(Span::styled(
            "● ",
            Style::default().fg(palette.alert).add_modifier(Modifier::BOLD),
        ));
    }
    title.push(Span::styled(
        record.author.display_name.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    if record.author.verified {
        title.push(Span::styled(" ✓", Style::default().fg(palette.accent)));
    }
    title.push(Span::styled(
        format!(" {} · {}", record.author.handle, record.age_label),
        Style::default().fg(palette.muted),
    ));
    match record.category {
        Category::Reply => title.push(Span::styled(" ↩", Style::default().fg(palette.muted))),
        Category::Retweet => title.push(Span::styled(" ⟳", Style::default().fg(palette.muted))),
        Category::Mention => {}
    }

    let preview = truncate_to_width(&record.body, width);
    let body = Line::from(body_spans(&preview, palette, query));
    let metrics = Line::from(vec![
        Span::styled(
            format!(
                "♥ {}  ⟳ {}  ↩ {}",
                format_count(record.engagement.like_count),
                format_count(record.engagement.retweet_count),
                format_count(record.engagement.reply_count)
            ),
            Style::default().fg(palette.muted),
        ),
        Span::raw("  "),
        Span::styled(
            record.sentiment.to_string(),
            Style::default().fg(sentiment_color(record.sentiment, palette)),
        ),
    ]);
    ListItem::new(vec![Line::from(title), body, metrics])
}

fn detail_lines(record: &Record, palette: &Palette, query: Option<&Regex>) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                record.author.display_name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" {}", record.author.handle),
                Style::default().fg(palette.muted),
            ),
        ]),
        Line::from(Span::styled(
            format!(
                "{} followers{}",
                format_count(record.author.follower_count),
                if record.author.verified { " · verified" } else { "" }
            ),
            Style::default().fg(palette.muted),
        )),
        Line::from(""),
    ];
    for line in record.body.lines() {
        lines.push(Line::from(body_spans(line, palette, query)));
    }
    lines.push(Line::from(""));
    let e = &record.engagement;
    lines.push(Line::from(format!(
        "{} likes · {} reposts · {} replies · {} views",
        format_count(e.like_count),
        format_count(e.retweet_count),
        format_count(e.reply_count),
        format_count(e.view_count)
    )));
    lines.push(Line::from(vec![
        Span::raw(format!("{} · {} · ", record.category, record.age_label)),
        Span::styled(
            record.sentiment.to_string(),
            Style::default().fg(sentiment_color(record.sentiment, palette)),
        ),
    ]));
    lines.push(Line::from(Span::styled(
        record.url.clone(),
        Style::default().fg(palette.accent),
    )));
    lines
}

fn footer_lines(state: &DashboardState, palette: &Palette) -> Vec<Line<'static>> {
    let help = match state.view {
        View::Live => "q quit · j/k move · r refresh · m mark read · f filter · s search · o outage · c compose",
        View::Search => "q quit · j/k move · Esc live feed · s search again · f filter · c compose",
    };
    let mut lines = vec![Line::from(help)];
    if let Some(message) = state.status_message() {
        lines.push(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(palette.highlight),
        )));
    }
    lines.push(Line::from(vec![
        Span::raw("Share: "),
        Span::styled(
            state.compose_link.clone(),
            Style::default().fg(palette.accent),
        ),
    ]));
    lines
}

fn body_spans(text: &str, palette: &Palette, query: Option<&Regex>) -> Vec<Span<'static>> {
    segments(text, query)
        .into_iter()
        .map(|segment| {
            let style = match segment.kind {
                SegmentKind::Plain => Style::default(),
                SegmentKind::Mention | SegmentKind::Hashtag => Style::default().fg(palette.accent),
                SegmentKind::Match => Style::default()
                    .fg(palette.highlight)
                    .add_modifier(Modifier::BOLD),
            };
            Span::styled(segment.text.to_string(), style)
        })
        .collect()
}

fn sentiment_color(sentiment: Sentiment, palette: &Palette) -> ratatui::style::Color {
    match sentiment {
        Sentiment::Positive => palette.positive,
        Sentiment::Neutral => palette.neutral,
        Sentiment::Negative => palette.negative,
    }
}

/// Compact counts: 950, 1.2K, 3.4M.
pub fn format_count(value: u64) -> String {
    if value >= 1_000_000 {
        format!("{:.1}M", value as f64 / 1_000_000.0)
    } else if value >= 1_000 {
        format!("{:.1}K", value as f64 / 1_000.0)
    } else {
        value.to_string()
    }
}

pub fn relative_time(now: OffsetDateTime, then: OffsetDateTime) -> String {
    let seconds = (now - then).whole_seconds().max(0);
    match seconds {
        0..=4 => "just now".to_string(),
        5..=59 => format!("{seconds}s ago"),
        60..=3_599 => format!("{}m ago", seconds / 60),
        _ => format!("{}h ago", seconds / 3_600),
    }
}

/// Single-line preview that fits `max` terminal columns.
pub fn truncate_to_width(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.width() <= max {
        return flat;
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in flat.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionOptions;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::time::Duration;

    fn span_texts(spans: &[Span<'static>]) -> Vec<String> {
        spans
            .iter()
            .map(|span| span.content.clone().into_owned())
            .collect()
    }

    fn render(session: &FeedSession, state: &DashboardState) -> String {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        let palette = Palette::default();
        let view = DashboardView {
            session,
            state,
            palette: &palette,
            handle: "@monad_xyz",
            now: OffsetDateTime::UNIX_EPOCH + Duration::from_secs(30),
        };
        let mut list_state = ListState::default();
        list_state.select(Some(state.selected));
        terminal
            .draw(|frame| draw_dashboard(frame, &view, &mut list_state))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn loaded_session() -> FeedSession {
        let mut session = FeedSession::new(
            SessionOptions::default(),
            StdRng::seed_from_u64(4),
            OffsetDateTime::UNIX_EPOCH,
        );
        session.initialize();
        session.advance_to(Duration::from_secs(2));
        session
    }

    #[test]
    fn dashboard_renders_header_list_and_footer() {
        let session = loaded_session();
        let state = DashboardState::new("https://x.com/intent/tweet?text=hi".into());
        let screen = render(&session, &state);
        assert!(screen.contains("Mentions of @monad_xyz"));
        assert!(screen.contains("● live"));
        assert!(screen.contains("35 mentions"));
        assert!(screen.contains("updated 28s ago"));
        assert!(screen.contains("positive 43%"));
        assert!(screen.contains("Live feed [all] 35"));
        assert!(screen.contains("Share: https://x.com/intent/tweet?text=hi"));
    }

    #[test]
    fn outage_replaces_the_breakdown_with_the_error() {
        let mut session = loaded_session();
        assert!(session.trigger_outage());
        let screen = render(&session, &DashboardState::new(String::new()));
        assert!(screen.contains("● offline"));
        assert!(screen.contains("Connection temporarily lost"));
    }

    #[test]
    fn loading_feed_shows_placeholder() {
        let mut session = FeedSession::new(
            SessionOptions::default(),
            StdRng::seed_from_u64(4),
            OffsetDateTime::UNIX_EPOCH,
        );
        session.initialize();
        let screen = render(&session, &DashboardState::new(String::new()));
        assert!(screen.contains("● connecting"));
        assert!(screen.contains("Loading mentions..."));
    }

    #[test]
    fn body_spans_style_entities() {
        let palette = Palette::default();
        let spans = body_spans("gm @monad_xyz #MonadLabs", &palette, None);
        assert_eq!(span_texts(&spans), vec!["gm ", "@monad_xyz", " ", "#MonadLabs"]);
        assert_eq!(spans[1].style.fg, Some(palette.accent));
    }

    #[test]
    fn counts_are_compact() {
        assert_eq!(format_count(950), "950");
        assert_eq!(format_count(1_247), "1.2K");
        assert_eq!(format_count(15_600), "15.6K");
        assert_eq!(format_count(2_100_000), "2.1M");
    }

    #[test]
    fn relative_times_bucket() {
        let base = OffsetDateTime::UNIX_EPOCH;
        assert_eq!(relative_time(base, base), "just now");
        assert_eq!(relative_time(base + Duration::from_secs(42), base), "42s ago");
        assert_eq!(relative_time(base + Duration::from_secs(600), base), "10m ago");
        assert_eq!(relative_time(base + Duration::from_secs(7_300), base), "2h ago");
    }

    #[test]
    fn previews_fit_their_column() {
        assert_eq!(truncate_to_width("short", 10), "short");
        let cut = truncate_to_width("a long line of text", 8);
        assert_eq!(cut, "a long …");
        assert!(cut.width() <= 8);
        assert_eq!(truncate_to_width("line\nbreak", 20), "line break");
    }
}
