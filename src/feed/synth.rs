use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use strum::IntoEnumIterator;

use super::roster::{self, RosterEntry};
use super::{Author, Category, Engagement, Record, Sentiment};

const MINUTES_PER_HOUR: f64 = 60.0;
const MINUTES_PER_DAY: f64 = 1440.0;
/// Default age window for a record with no requested age: two days.
const MAX_AGE_MINUTES: f64 = 2880.0;
const REPLY_PROBABILITY: f64 = 0.3;

const INITIAL_POSITIVE: usize = 15;
const INITIAL_NEUTRAL: usize = 12;
const INITIAL_NEGATIVE: usize = 8;

const TRICKLE_WEIGHTS: [(Sentiment, u32); 3] = [
    (Sentiment::Positive, 50),
    (Sentiment::Neutral, 30),
    (Sentiment::Negative, 20),
];

const BURST_WEIGHTS: [(Sentiment, u32); 3] = [
    (Sentiment::Positive, 2),
    (Sentiment::Neutral, 1),
    (Sentiment::Negative, 1),
];

/// Explicit sentiment distribution used for injected records.
#[derive(Debug, Clone)]
pub struct WeightedSentiment {
    classes: Vec<Sentiment>,
    index: WeightedIndex<u32>,
}

impl WeightedSentiment {
    pub fn new(table: &[(Sentiment, u32)]) -> Result<Self, rand::distributions::WeightedError> {
        let index = WeightedIndex::new(table.iter().map(|(_, weight)| *weight))?;
        let classes = table.iter().map(|(sentiment, _)| *sentiment).collect();
        Ok(Self { classes, index })
    }

    /// 50% positive, 30% neutral, 20% negative.
    pub fn trickle() -> Self {
        Self::new(&TRICKLE_WEIGHTS).expect("trickle weights are non-zero")
    }

    /// Two parts positive to one part each of neutral and negative.
    pub fn burst() -> Self {
        Self::new(&BURST_WEIGHTS).expect("burst weights are non-zero")
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Sentiment {
        self.classes[self.index.sample(rng)]
    }
}

pub fn synthesize<R: Rng + ?Sized>(
    rng: &mut R,
    sentiment: Option<Sentiment>,
    minutes_ago: Option<f64>,
) -> Record {
    let sentiment = sentiment.unwrap_or_else(|| random_sentiment(rng));
    let entry = pick_author(rng);
    let body = pick_body(rng, sentiment);
    let minutes_ago = minutes_ago.unwrap_or_else(|| rng.gen_range(0.0..MAX_AGE_MINUTES));
    let engagement = compute_engagement(rng, entry.follower_count, sentiment);
    let id = uuid::Builder::from_random_bytes(rng.gen())
        .into_uuid()
        .simple()
        .to_string();
    let category = if rng.gen_bool(REPLY_PROBABILITY) {
        Category::Reply
    } else {
        Category::Mention
    };

    Record {
        url: format!("https://twitter.com/{}/status/{}", entry.handle, id),
        id,
        author: Author {
            display_name: entry.display_name.to_string(),
            handle: format!("@{}", entry.handle),
            avatar_ref: entry.avatar_ref.to_string(),
            verified: entry.verified,
            follower_count: entry.follower_count,
        },
        body: body.to_string(),
        age_label: age_label(minutes_ago),
        engagement,
        category,
        sentiment,
        is_unseen: false,
    }
}

pub fn compute_engagement<R: Rng + ?Sized>(
    rng: &mut R,
    follower_count: u64,
    sentiment: Sentiment,
) -> Engagement {
    let base_rate = if follower_count > 100_000 {
        0.02
    } else if follower_count > 50_000 {
        0.015
    } else {
        0.01
    };
    let ceiling = follower_count as f64 * base_rate * sentiment.engagement_multiplier();
    let likes = (rng.gen::<f64>() * ceiling).floor();
    Engagement {
        like_count: likes as u64,
        retweet_count: (likes * rng.gen_range(0.1..0.4)).floor() as u64,
        reply_count: (likes * rng.gen_range(0.05..0.2)).floor() as u64,
        view_count: (likes * rng.gen_range(8.0..20.0)).floor() as u64,
    }
}

pub fn age_label(minutes_ago: f64) -> String {
    if minutes_ago < 1.0 {
        "now".to_string()
    } else if minutes_ago < MINUTES_PER_HOUR {
        format!("{}m", minutes_ago.floor() as u64)
    } else if minutes_ago < MINUTES_PER_DAY {
        format!("{}h", (minutes_ago / MINUTES_PER_HOUR).floor() as u64)
    } else {
        format!("{}d", (minutes_ago / MINUTES_PER_DAY).floor() as u64)
    }
}

/// Minutes represented by an age label; unknown labels read as fresh.
pub fn parse_age_minutes(label: &str) -> u32 {
    if label == "now" {
        return 0;
    }
    let digits_end = label
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(label.len());
    let Ok(value) = label[..digits_end].parse::<u32>() else {
        return 0;
    };
    match &label[digits_end..] {
        "m" => value,
        "h" => value.saturating_mul(60),
        "d" => value.saturating_mul(1440),
        _ => 0,
    }
}

/// The seed composition of a fresh feed, newest first.
pub fn generate_initial_set<R: Rng + ?Sized>(rng: &mut R) -> Vec<Record> {
    let plan = [
        (Sentiment::Positive, INITIAL_POSITIVE),
        (Sentiment::Neutral, INITIAL_NEUTRAL),
        (Sentiment::Negative, INITIAL_NEGATIVE),
    ];
    let mut records = Vec::with_capacity(INITIAL_POSITIVE + INITIAL_NEUTRAL + INITIAL_NEGATIVE);
    for (sentiment, count) in plan {
        for _ in 0..count {
            let minutes = rng.gen_range(0.0..MINUTES_PER_DAY);
            records.push(synthesize(rng, Some(sentiment), Some(minutes)));
        }
    }
    records.sort_by_key(Record::age_minutes);
    records
}

fn random_sentiment<R: Rng + ?Sized>(rng: &mut R) -> Sentiment {
    let all: Vec<Sentiment> = Sentiment::iter().collect();
    all[rng.gen_range(0..all.len())]
}

fn pick_author<R: Rng + ?Sized>(rng: &mut R) -> &'static RosterEntry {
    let index = rng.gen_range(0..roster::roster_len());
    roster::roster_entry(index).unwrap_or(&roster::INFLUENTIAL[0])
}

fn pick_body<R: Rng + ?Sized>(rng: &mut R, sentiment: Sentiment) -> &'static str {
    let pool = body_pool(sentiment);
    pool.choose(rng).copied().unwrap_or(pool[0])
}

pub(crate) fn body_pool(sentiment: Sentiment) -> &'static [&'static str] {
    match sentiment {
        Sentiment::Positive => roster::POSITIVE_BODIES,
        Sentiment::Neutral => roster::NEUTRAL_BODIES,
        Sentiment::Negative => roster::NEGATIVE_BODIES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{SentimentBreakdown, MENTION_TOKEN};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn engagement_ratios_stay_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let record = synthesize(&mut rng, None, None);
            let e = record.engagement;
            if e.like_count == 0 {
                continue;
            }
            let likes = e.like_count as f64;
            assert!(e.retweet_count as f64 <= likes * 0.4);
            assert!(e.reply_count as f64 <= likes * 0.2);
            assert!(e.view_count as f64 >= likes * 8.0);
        }
    }

    #[test]
    fn likes_never_exceed_the_tier_ceiling() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let e = compute_engagement(&mut rng, 10_000, Sentiment::Positive);
            assert!(e.like_count < 150);
            let e = compute_engagement(&mut rng, 80_000, Sentiment::Neutral);
            assert!(e.like_count < 1_200);
            let e = compute_engagement(&mut rng, 1_000_000, Sentiment::Negative);
            assert!(e.like_count < 24_000);
        }
        assert_eq!(compute_engagement(&mut rng, 0, Sentiment::Positive), Engagement::default());
    }

    #[test]
    fn body_is_drawn_from_the_requested_pool() {
        let mut rng = StdRng::seed_from_u64(3);
        for sentiment in Sentiment::iter() {
            for _ in 0..50 {
                let record = synthesize(&mut rng, Some(sentiment), Some(5.0));
                assert_eq!(record.sentiment, sentiment);
                assert!(body_pool(sentiment).contains(&record.body.as_str()));
                assert!(record.body.contains(MENTION_TOKEN));
                assert_eq!(record.age_label, "5m");
                assert!(!record.is_unseen);
            }
        }
    }

    #[test]
    fn synthesizer_never_emits_retweets() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut replies = 0;
        for _ in 0..1_000 {
            let record = synthesize(&mut rng, None, None);
            assert_ne!(record.category, Category::Retweet);
            if record.category == Category::Reply {
                replies += 1;
            }
        }
        assert!((200..400).contains(&replies), "replies = {replies}");
    }

    #[test]
    fn author_handles_are_prefixed_and_urls_embed_ids() {
        let mut rng = StdRng::seed_from_u64(9);
        let record = synthesize(&mut rng, None, Some(0.0));
        assert!(record.author.handle.starts_with('@'));
        assert!(record.url.ends_with(&record.id));
        assert!(roster::find_by_handle(&record.author.handle).is_some());
        assert_eq!(record.age_label, "now");
    }

    #[test]
    fn same_seed_gives_same_record() {
        let a = synthesize(&mut StdRng::seed_from_u64(42), None, None);
        let b = synthesize(&mut StdRng::seed_from_u64(42), None, None);
        assert_eq!(a, b);
    }

    #[test]
    fn age_labels_follow_thresholds() {
        assert_eq!(age_label(0.0), "now");
        assert_eq!(age_label(0.99), "now");
        assert_eq!(age_label(1.0), "1m");
        assert_eq!(age_label(59.9), "59m");
        assert_eq!(age_label(60.0), "1h");
        assert_eq!(age_label(1439.0), "23h");
        assert_eq!(age_label(1440.0), "1d");
        assert_eq!(age_label(2879.0), "1d");
    }

    #[test]
    fn age_labels_parse_back_to_minutes() {
        assert_eq!(parse_age_minutes("now"), 0);
        assert_eq!(parse_age_minutes("42m"), 42);
        assert_eq!(parse_age_minutes("3h"), 180);
        assert_eq!(parse_age_minutes("2d"), 2880);
        assert_eq!(parse_age_minutes("soon"), 0);
        assert_eq!(parse_age_minutes("7y"), 0);
    }

    #[test]
    fn initial_set_has_fixed_composition_sorted_newest_first() {
        let mut rng = StdRng::seed_from_u64(1);
        let records = generate_initial_set(&mut rng);
        assert_eq!(records.len(), 35);
        let breakdown = SentimentBreakdown::of(&records);
        assert_eq!(
            breakdown,
            SentimentBreakdown {
                positive: 15,
                neutral: 12,
                negative: 8
            }
        );
        let ages: Vec<u32> = records.iter().map(Record::age_minutes).collect();
        assert!(ages.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(ages.iter().all(|age| *age < 1440));
    }

    #[test]
    fn weighted_tables_track_their_split() {
        let mut rng = StdRng::seed_from_u64(99);
        let trickle = WeightedSentiment::trickle();
        let mut counts = [0usize; 3];
        for _ in 0..10_000 {
            match trickle.sample(&mut rng) {
                Sentiment::Positive => counts[0] += 1,
                Sentiment::Neutral => counts[1] += 1,
                Sentiment::Negative => counts[2] += 1,
            }
        }
        assert!((4_700..5_300).contains(&counts[0]), "{counts:?}");
        assert!((2_700..3_300).contains(&counts[1]), "{counts:?}");
        assert!((1_700..2_300).contains(&counts[2]), "{counts:?}");

        assert!(WeightedSentiment::new(&[(Sentiment::Positive, 0)]).is_err());
    }
}
