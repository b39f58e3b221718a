use std::time::Duration;

use mentionfeed::feed::Category;
use mentionfeed::source::SyntheticSource;
use mentionfeed::{ConnectionState, FeedSession, SearchSource, SessionOptions};
use rand::rngs::StdRng;
use rand::SeedableRng;
use time::macros::datetime;

fn session(seed: u64, options: SessionOptions) -> FeedSession {
    FeedSession::new(options, StdRng::seed_from_u64(seed), datetime!(2024-01-10 12:00 UTC))
}

#[test]
fn long_run_keeps_the_feed_bounded_and_consistent() {
    let options = SessionOptions {
        burst_probability: 1.0,
        outage_probability: 0.5,
        ..SessionOptions::default()
    };
    let mut feed = session(42, options);
    feed.initialize();
    assert_eq!(feed.connection_state(), ConnectionState::Connecting);

    let mut saw_outage = false;
    let mut minute = Duration::ZERO;
    while minute < Duration::from_secs(4 * 60 * 60) {
        minute += Duration::from_secs(60);
        feed.advance_to(minute);

        assert!(feed.records().len() <= 100);
        let unseen = feed.records().iter().filter(|r| r.is_unseen).count();
        assert_eq!(feed.unseen_count(), unseen);
        assert_ne!(feed.connection_state(), ConnectionState::Connecting);
        if feed.connection_state() == ConnectionState::Errored {
            saw_outage = true;
            assert!(feed.error_message().is_some());
        }
    }

    assert_eq!(feed.records().len(), 100);
    assert!(saw_outage);
    assert!(feed.records().iter().all(|r| r.category != Category::Retweet));
}

#[test]
fn refresh_then_read_then_dispose() {
    let mut feed = session(7, SessionOptions::default());
    feed.initialize();
    feed.advance_to(Duration::from_secs(2));
    assert_eq!(feed.records().len(), 35);
    assert_eq!(feed.unseen_count(), 0);

    feed.refresh();
    assert!(feed.is_loading());
    feed.advance_by(Duration::from_millis(1200));
    assert!(!feed.is_loading());
    assert_eq!(feed.records().len(), 38);
    assert_eq!(feed.unseen_count(), 3);
    assert!(feed.notification_visible());

    feed.mark_all_read();
    assert_eq!(feed.unseen_count(), 0);
    assert!(!feed.notification_visible());

    feed.dispose();
    assert!(feed.is_disposed());
    assert_eq!(feed.pending_timers(), 0);
    let snapshot: Vec<String> = feed.records().iter().map(|r| r.id.clone()).collect();
    feed.advance_by(Duration::from_secs(3600));
    feed.refresh();
    let after: Vec<String> = feed.records().iter().map(|r| r.id.clone()).collect();
    assert_eq!(snapshot, after);
    assert!(!feed.trigger_outage());
}

#[test]
fn synthetic_search_converts_to_feed_records() {
    let now = datetime!(2024-01-10 15:00 UTC);
    let mut source = SyntheticSource::new(Some(3)).with_clock(now);
    assert_eq!(source.name(), "synthetic");

    let response = source.search("monad", 10).expect("synthetic search");
    assert!(!response.data.is_empty());
    assert!(response.data.len() <= 10);

    let records = response.into_records(now);
    for record in &records {
        assert!(record.body.to_lowercase().contains("monad"));
        assert!(record.url.contains("/status/"));
        assert_ne!(record.author.display_name, "Unknown");
    }
    let ages: Vec<u32> = records.iter().map(|r| r.age_minutes()).collect();
    let mut sorted = ages.clone();
    sorted.sort_unstable();
    assert_eq!(ages, sorted);
}
