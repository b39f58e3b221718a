use std::collections::HashSet;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::{
    clamp_limit, roster_user_id, ApiError, Includes, PostMetrics, RawPost, RawUser, ResultMeta,
    SearchResponse, SearchSource, UserMetrics,
};
use crate::feed::synthesize;

const MAX_AGE_MINUTES: f64 = 2880.0;

/// Offline search backed by the record synthesizer.
///
/// Responses use the remote wire shape, so everything downstream of
/// [`SearchSource`] treats it exactly like the live client.
pub struct SyntheticSource {
    rng: StdRng,
    clock: Option<OffsetDateTime>,
    page: u64,
}

impl SyntheticSource {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            clock: None,
            page: 0,
        }
    }

    /// Pin the instant `created_at` timestamps are measured from.
    pub fn with_clock(mut self, now: OffsetDateTime) -> Self {
        self.clock = Some(now);
        self
    }

    fn now(&self) -> OffsetDateTime {
        self.clock.unwrap_or_else(OffsetDateTime::now_utc)
    }
}

impl SearchSource for SyntheticSource {
    fn search(&mut self, query: &str, limit: usize) -> Result<SearchResponse, ApiError> {
        let limit = clamp_limit(limit);
        let now = self.now();
        let needle = query.trim().to_lowercase();

        let mut posts = Vec::with_capacity(limit);
        let mut users = Vec::new();
        let mut known = HashSet::new();

        // The pools all mention the same account, so most queries match on the
        // first draw; give up after a bounded number of misses.
        let mut attempts = 0;
        while posts.len() < limit && attempts < limit * 20 {
            attempts += 1;
            let minutes = self.rng.gen_range(0.0..MAX_AGE_MINUTES);
            let record = synthesize(&mut self.rng, None, Some(minutes));
            if !needle.is_empty() && !record.body.to_lowercase().contains(&needle) {
                continue;
            }

            let author_id = roster_user_id(&record.author.handle);
            if known.insert(author_id.clone()) {
                users.push(RawUser {
                    id: author_id.clone(),
                    name: record.author.display_name.clone(),
                    username: record.author.handle.trim_start_matches('@').to_string(),
                    profile_image_url: Some(record.author.avatar_ref.clone()),
                    verified: record.author.verified,
                    public_metrics: UserMetrics {
                        followers_count: record.author.follower_count,
                    },
                });
            }

            let created = now - Duration::from_secs_f64(minutes * 60.0);
            posts.push((minutes, RawPost {
                id: record.id,
                text: record.body,
                created_at: created.format(&Rfc3339).ok(),
                author_id,
                public_metrics: PostMetrics {
                    retweet_count: record.engagement.retweet_count,
                    like_count: record.engagement.like_count,
                    reply_count: record.engagement.reply_count,
                    impression_count: Some(record.engagement.view_count),
                },
            }));
        }

        posts.sort_by(|a, b| a.0.total_cmp(&b.0));
        let posts: Vec<RawPost> = posts.into_iter().map(|(_, post)| post).collect();
        self.page += 1;
        let next_token = (posts.len() == limit).then(|| format!("synthetic-page-{}", self.page));
        tracing::debug!(query, returned = posts.len(), "synthetic search");

        Ok(SearchResponse {
            meta: ResultMeta {
                result_count: posts.len() as u64,
                next_token,
            },
            data: posts,
            includes: Some(Includes { users }),
        })
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::MENTION_TOKEN;
    use time::macros::datetime;

    fn source(seed: u64) -> SyntheticSource {
        SyntheticSource::new(Some(seed)).with_clock(datetime!(2024-06-01 12:00 UTC))
    }

    #[test]
    fn pages_are_full_and_carry_a_continuation_token() {
        let response = source(4).search(MENTION_TOKEN, 20).unwrap();
        assert_eq!(response.data.len(), 20);
        assert_eq!(response.meta.result_count, 20);
        assert_eq!(response.meta.next_token.as_deref(), Some("synthetic-page-1"));
        assert!(response.data.iter().all(|post| post.text.contains(MENTION_TOKEN)));
    }

    #[test]
    fn limits_are_clamped() {
        assert_eq!(source(1).search("", 3).unwrap().data.len(), 10);
        assert_eq!(source(1).search("", 1_000).unwrap().data.len(), 100);
    }

    #[test]
    fn authors_are_expanded_once_each() {
        let response = source(8).search("", 100).unwrap();
        let users = response.includes.as_ref().map(|i| i.users.clone()).unwrap_or_default();
        let ids: HashSet<_> = users.iter().map(|user| user.id.clone()).collect();
        assert_eq!(ids.len(), users.len());
        assert!(response.data.iter().all(|post| ids.contains(&post.author_id)));
    }

    #[test]
    fn converted_records_are_newest_first_and_attributed() {
        let now = datetime!(2024-06-01 12:00 UTC);
        let records = source(21).search("", 30).unwrap().into_records(now);
        assert_eq!(records.len(), 30);
        let ages: Vec<u32> = records.iter().map(|record| record.age_minutes()).collect();
        assert!(ages.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(records.iter().all(|record| record.author.display_name != "Unknown"));
    }

    #[test]
    fn unmatched_queries_return_a_short_page() {
        let response = source(2).search("no such phrase anywhere", 10).unwrap();
        assert!(response.data.is_empty());
        assert_eq!(response.meta.next_token, None);
    }

    #[test]
    fn same_seed_same_page() {
        let a = source(99).search("", 15).unwrap();
        let b = source(99).search("", 15).unwrap();
        assert_eq!(a, b);
    }
}
