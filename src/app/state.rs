use strum::IntoEnumIterator;

use crate::feed::{Record, Sentiment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    List,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Live,
    Search,
}

/// Search results fetched through the configured source.
#[derive(Debug, Clone, Default)]
pub struct SearchPanel {
    pub query: String,
    pub source: &'static str,
    pub results: Vec<Record>,
    pub has_more: bool,
}

/// Everything the dashboard tracks that the feed session does not.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub selected: usize,
    selected_id: Option<String>,
    pub focus: FocusPane,
    pub view: View,
    pub filter: Option<Sentiment>,
    status_message: Option<String>,
    pub compose_link: String,
    pub search: SearchPanel,
}

impl DashboardState {
    pub fn new(compose_link: String) -> Self {
        Self {
            selected: 0,
            selected_id: None,
            focus: FocusPane::List,
            view: View::Live,
            filter: None,
            status_message: None,
            compose_link,
            search: SearchPanel::default(),
        }
    }

    /// Records shown for the current view and sentiment filter.
    pub fn visible<'a>(&'a self, live: &'a [Record]) -> Vec<&'a Record> {
        let source = match self.view {
            View::Live => live,
            View::Search => self.search.results.as_slice(),
        };
        source
            .iter()
            .filter(|record| self.filter.map_or(true, |want| record.sentiment == want))
            .collect()
    }

    pub fn selected_record<'a>(&'a self, live: &'a [Record]) -> Option<&'a Record> {
        self.visible(live).get(self.selected).copied()
    }

    pub fn move_selection(&mut self, delta: isize, live: &[Record]) {
        let target = {
            let visible = self.visible(live);
            if visible.is_empty() {
                None
            } else {
                let last = visible.len() as isize - 1;
                let next = (self.selected as isize + delta).clamp(0, last) as usize;
                Some((next, visible[next].id.clone()))
            }
        };
        match target {
            Some((next, id)) => {
                self.selected = next;
                self.selected_id = Some(id);
            }
            None => {
                self.selected = 0;
                self.selected_id = None;
            }
        }
    }

    /// Keep the cursor on the same record while newer ones are prepended.
    pub fn reanchor(&mut self, live: &[Record]) {
        let (len, anchored, fallback_id) = {
            let visible = self.visible(live);
            let anchored = self
                .selected_id
                .as_ref()
                .and_then(|id| visible.iter().position(|record| &record.id == id));
            let clamped = self.selected.min(visible.len().saturating_sub(1));
            let fallback_id = visible.get(clamped).map(|record| record.id.clone());
            (visible.len(), anchored, fallback_id)
        };
        if len == 0 {
            self.selected = 0;
            return;
        }
        match anchored {
            Some(position) => self.selected = position,
            None => {
                self.selected = self.selected.min(len - 1);
                self.selected_id = fallback_id;
            }
        }
    }

    pub fn jump_to_top(&mut self, live: &[Record]) {
        self.selected = 0;
        self.selected_id = None;
        self.reanchor(live);
    }

    /// All, then each sentiment in turn.
    pub fn cycle_filter(&mut self) {
        let order: Vec<Option<Sentiment>> = std::iter::once(None)
            .chain(Sentiment::iter().map(Some))
            .collect();
        let current = order
            .iter()
            .position(|entry| *entry == self.filter)
            .unwrap_or(0);
        self.filter = order[(current + 1) % order.len()];
        self.selected = 0;
        self.selected_id = None;
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FocusPane::List => FocusPane::Detail,
            FocusPane::Detail => FocusPane::List,
        };
    }

    pub fn show_view(&mut self, view: View) {
        if self.view != view {
            self.view = view;
            self.selected = 0;
            self.selected_id = None;
        }
    }

    pub fn set_status_message<S: Into<String>>(&mut self, message: Option<S>) {
        self.status_message = message.map(Into::into);
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn filter_label(&self) -> String {
        self.filter
            .map(|sentiment| sentiment.to_string())
            .unwrap_or_else(|| "all".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::synthesize;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn records(sentiments: &[Sentiment]) -> Vec<Record> {
        let mut rng = StdRng::seed_from_u64(30);
        sentiments
            .iter()
            .enumerate()
            .map(|(index, sentiment)| {
                let mut record = synthesize(&mut rng, Some(*sentiment), Some(index as f64));
                record.id = format!("r{index}");
                record
            })
            .collect()
    }

    #[test]
    fn selection_is_clamped_to_the_visible_list() {
        let live = records(&[Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative]);
        let mut state = DashboardState::new(String::new());
        state.move_selection(10, &live);
        assert_eq!(state.selected, 2);
        state.move_selection(-10, &live);
        assert_eq!(state.selected, 0);
        state.move_selection(1, &[]);
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn selection_follows_its_record_when_newer_ones_arrive() {
        let mut live = records(&[Sentiment::Positive, Sentiment::Neutral]);
        let mut state = DashboardState::new(String::new());
        state.move_selection(1, &live);
        assert_eq!(state.selected_record(&live).map(|r| r.id.as_str()), Some("r1"));

        let mut fresh = records(&[Sentiment::Negative]);
        fresh[0].id = "fresh".into();
        live.insert(0, fresh.remove(0));
        state.reanchor(&live);
        assert_eq!(state.selected, 2);
        assert_eq!(state.selected_record(&live).map(|r| r.id.as_str()), Some("r1"));
    }

    #[test]
    fn filter_cycles_through_every_sentiment() {
        let live = records(&[
            Sentiment::Positive,
            Sentiment::Neutral,
            Sentiment::Positive,
            Sentiment::Negative,
        ]);
        let mut state = DashboardState::new(String::new());
        assert_eq!(state.visible(&live).len(), 4);

        state.cycle_filter();
        assert_eq!(state.filter, Some(Sentiment::Positive));
        assert_eq!(state.visible(&live).len(), 2);
        state.cycle_filter();
        assert_eq!(state.filter_label(), "neutral");
        state.cycle_filter();
        assert_eq!(state.visible(&live).len(), 1);
        state.cycle_filter();
        assert_eq!(state.filter, None);
    }

    #[test]
    fn search_view_lists_search_results() {
        let live = records(&[Sentiment::Positive]);
        let mut state = DashboardState::new(String::new());
        state.search.results = records(&[Sentiment::Neutral, Sentiment::Negative]);
        state.show_view(View::Search);
        assert_eq!(state.visible(&live).len(), 2);
        state.show_view(View::Live);
        assert_eq!(state.visible(&live).len(), 1);
    }

    #[test]
    fn focus_and_status_toggle() {
        let mut state = DashboardState::new("link".into());
        state.toggle_focus();
        assert_eq!(state.focus, FocusPane::Detail);
        state.toggle_focus();
        assert_eq!(state.focus, FocusPane::List);
        state.set_status_message(Some("hello"));
        assert_eq!(state.status_message(), Some("hello"));
        state.set_status_message(None::<String>);
        assert_eq!(state.status_message(), None);
    }
}
