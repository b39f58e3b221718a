use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

pub mod roster;
pub mod synth;

pub use synth::{
    age_label, compute_engagement, generate_initial_set, parse_age_minutes, synthesize,
    WeightedSentiment,
};

/// Token every synthesized body mentions exactly once.
pub const MENTION_TOKEN: &str = "@monad_xyz";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn engagement_multiplier(self) -> f64 {
        match self {
            Sentiment::Positive => 1.5,
            Sentiment::Negative => 1.2,
            Sentiment::Neutral => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Category {
    Mention,
    Reply,
    // Declared for API parity; the synthesizer never emits it.
    Retweet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub display_name: String,
    pub handle: String,
    pub avatar_ref: String,
    pub verified: bool,
    pub follower_count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub like_count: u64,
    pub retweet_count: u64,
    pub reply_count: u64,
    pub view_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub author: Author,
    pub body: String,
    pub age_label: String,
    pub url: String,
    pub engagement: Engagement,
    pub category: Category,
    pub sentiment: Sentiment,
    pub is_unseen: bool,
}

impl Record {
    pub fn age_minutes(&self) -> u32 {
        parse_age_minutes(&self.age_label)
    }

    pub fn mark_unseen(mut self) -> Self {
        self.is_unseen = true;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentBreakdown {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentBreakdown {
    pub fn of(records: &[Record]) -> Self {
        let mut breakdown = Self::default();
        for record in records {
            match record.sentiment {
                Sentiment::Positive => breakdown.positive += 1,
                Sentiment::Neutral => breakdown.neutral += 1,
                Sentiment::Negative => breakdown.negative += 1,
            }
        }
        breakdown
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }

    pub fn count(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    /// Share of each class in percent, in declaration order.
    pub fn percentages(&self) -> Vec<(Sentiment, u32)> {
        let total = self.total();
        Sentiment::iter()
            .map(|sentiment| {
                let pct = if total == 0 {
                    0
                } else {
                    ((self.count(sentiment) * 100) as f64 / total as f64).round() as u32
                };
                (sentiment, pct)
            })
            .collect()
    }
}
