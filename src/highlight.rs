use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[@#][A-Za-z0-9_]+").expect("entity pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Plain,
    Mention,
    Hashtag,
    Match,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
}

/// Case-insensitive alternation of the query terms, longest first.
pub fn build_highlight_regex(tokens: &[String]) -> Option<Regex> {
    let mut unique = Vec::new();
    let mut seen = HashSet::new();
    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if seen.insert(token.to_lowercase()) {
            unique.push(token.to_string());
        }
    }
    if unique.is_empty() {
        return None;
    }
    unique.sort_by(|a, b| b.len().cmp(&a.len()));
    let pattern = unique
        .iter()
        .map(|token| regex::escape(token))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()
}

/// Split a post body into plain runs, `@mentions` and `#hashtags`. Query
/// matches take precedence over entity styling where they overlap.
pub fn segments<'a>(text: &'a str, query: Option<&Regex>) -> Vec<Segment<'a>> {
    let mut marks: Vec<(usize, usize, SegmentKind)> = Vec::new();
    if let Some(query) = query {
        marks.extend(
            query
                .find_iter(text)
                .filter(|m| !m.as_str().is_empty())
                .map(|m| (m.start(), m.end(), SegmentKind::Match)),
        );
    }
    for m in ENTITY.find_iter(text) {
        let overlaps = marks
            .iter()
            .any(|(start, end, _)| m.start() < *end && *start < m.end());
        if overlaps {
            continue;
        }
        let kind = if m.as_str().starts_with('@') {
            SegmentKind::Mention
        } else {
            SegmentKind::Hashtag
        };
        marks.push((m.start(), m.end(), kind));
    }
    marks.sort_by_key(|(start, _, _)| *start);

    let mut out = Vec::new();
    let mut last = 0;
    for (start, end, kind) in marks {
        if start > last {
            out.push(Segment {
                kind: SegmentKind::Plain,
                text: &text[last..start],
            });
        }
        out.push(Segment {
            kind,
            text: &text[start..end],
        });
        last = end;
    }
    if last < text.len() || out.is_empty() {
        out.push(Segment {
            kind: SegmentKind::Plain,
            text: &text[last..],
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(segments: &[Segment<'_>]) -> Vec<(SegmentKind, String)> {
        segments
            .iter()
            .map(|s| (s.kind, s.text.to_string()))
            .collect()
    }

    #[test]
    fn prefers_longer_tokens_first() {
        let regex = build_highlight_regex(&["not".into(), "note".into()]).expect("regex");
        let matches: Vec<_> = regex.find_iter("notebook").map(|m| m.as_str()).collect();
        assert_eq!(matches, vec!["note"]);
    }

    #[test]
    fn blank_tokens_build_nothing() {
        assert!(build_highlight_regex(&[]).is_none());
        assert!(build_highlight_regex(&["  ".into()]).is_none());
    }

    #[test]
    fn entities_are_split_out() {
        let parts = segments("Bullish on @monad_xyz! #MonadLabs", None);
        assert_eq!(
            kinds(&parts),
            vec![
                (SegmentKind::Plain, "Bullish on ".into()),
                (SegmentKind::Mention, "@monad_xyz".into()),
                (SegmentKind::Plain, "! ".into()),
                (SegmentKind::Hashtag, "#MonadLabs".into()),
            ]
        );
    }

    #[test]
    fn query_matches_win_over_entities() {
        let regex = build_highlight_regex(&["monad".into()]).expect("regex");
        let parts = segments("@monad_xyz and Monad", Some(&regex));
        assert_eq!(
            kinds(&parts),
            vec![
                (SegmentKind::Plain, "@".into()),
                (SegmentKind::Match, "monad".into()),
                (SegmentKind::Plain, "_xyz and ".into()),
                (SegmentKind::Match, "Monad".into()),
            ]
        );
    }

    #[test]
    fn plain_text_is_one_segment() {
        assert_eq!(kinds(&segments("", None)), vec![(SegmentKind::Plain, String::new())]);
        assert_eq!(kinds(&segments("quiet", None)), vec![(SegmentKind::Plain, "quiet".into())]);
    }
}
