use std::ops::RangeInclusive;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use strum::Display;
use time::OffsetDateTime;

use crate::feed::{
    generate_initial_set, synthesize, Record, Sentiment, SentimentBreakdown, WeightedSentiment,
};

pub mod scheduler;

pub use scheduler::{Scheduler, TimerId};

pub const OUTAGE_MESSAGE: &str = "Connection temporarily lost. Reconnecting...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConnectionState {
    Connecting,
    Connected,
    Errored,
}

/// Cadence and probabilities driving a feed session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub max_records: usize,
    pub initial_load_delay: Duration,
    pub first_trickle_delay: Duration,
    pub trickle_intervals: Vec<Duration>,
    pub notification_ttl: Duration,
    pub burst_interval: (Duration, Duration),
    pub burst_probability: f64,
    pub burst_size: RangeInclusive<usize>,
    pub burst_spacing: Duration,
    pub outage_check_interval: Duration,
    pub outage_probability: f64,
    pub outage_recovery: (Duration, Duration),
    pub refresh_delay: Duration,
    pub breaking_count: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_records: 100,
            initial_load_delay: Duration::from_secs(2),
            first_trickle_delay: Duration::from_secs(5),
            trickle_intervals: [15, 30, 45, 60, 90, 120]
                .into_iter()
                .map(Duration::from_secs)
                .collect(),
            notification_ttl: Duration::from_secs(8),
            burst_interval: (Duration::from_secs(5 * 60), Duration::from_secs(15 * 60)),
            burst_probability: 0.3,
            burst_size: 2..=5,
            burst_spacing: Duration::from_secs(3),
            outage_check_interval: Duration::from_secs(120),
            outage_probability: 0.05,
            outage_recovery: (Duration::from_secs(3), Duration::from_secs(8)),
            refresh_delay: Duration::from_millis(1200),
            breaking_count: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    InitialLoad,
    TrickleStart,
    Trickle,
    BurstCheck,
    BurstInsert,
    NotificationClear,
    OutageCheck,
    OutageRecover,
    RefreshComplete,
}

/// One mounted feed: the record list plus every process that mutates it.
///
/// All mutation is serialized through the session's own [`Scheduler`]. The
/// caller drives time with [`FeedSession::advance_to`]; nothing here sleeps
/// or spawns.
#[derive(Debug)]
pub struct FeedSession {
    options: SessionOptions,
    rng: StdRng,
    scheduler: Scheduler<Task>,
    started_at: OffsetDateTime,
    records: Vec<Record>,
    connection: ConnectionState,
    unseen_count: usize,
    last_refresh_at: Option<OffsetDateTime>,
    notification: bool,
    notification_timer: Option<TimerId>,
    refresh_timer: Option<TimerId>,
    error: Option<String>,
    loading: bool,
    initialized: bool,
    burst_interval: Option<Duration>,
    trickle_weights: WeightedSentiment,
    burst_weights: WeightedSentiment,
}

impl FeedSession {
    pub fn new(options: SessionOptions, rng: StdRng, started_at: OffsetDateTime) -> Self {
        Self {
            options,
            rng,
            scheduler: Scheduler::new(),
            started_at,
            records: Vec::new(),
            connection: ConnectionState::Connecting,
            unseen_count: 0,
            last_refresh_at: None,
            notification: false,
            notification_timer: None,
            refresh_timer: None,
            error: None,
            loading: false,
            initialized: false,
            burst_interval: None,
            trickle_weights: WeightedSentiment::trickle(),
            burst_weights: WeightedSentiment::burst(),
        }
    }

    /// Session seeded for reproducible runs, or from OS entropy.
    pub fn with_seed(options: SessionOptions, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(options, rng, OffsetDateTime::now_utc())
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    pub fn unseen_count(&self) -> usize {
        self.unseen_count
    }

    pub fn notification_visible(&self) -> bool {
        self.notification
    }

    pub fn last_refresh_at(&self) -> Option<OffsetDateTime> {
        self.last_refresh_at
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_disposed(&self) -> bool {
        self.scheduler.is_closed()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// Virtual time elapsed since the session was created.
    pub fn elapsed(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn breakdown(&self) -> SentimentBreakdown {
        SentimentBreakdown::of(&self.records)
    }

    /// Begin the initial load. Safe to call more than once.
    pub fn initialize(&mut self) {
        if self.initialized || self.is_disposed() {
            return;
        }
        self.initialized = true;
        self.loading = true;
        self.connection = ConnectionState::Connecting;
        tracing::info!(
            delay_ms = self.options.initial_load_delay.as_millis() as u64,
            "connecting to feed"
        );
        self.scheduler
            .schedule(self.options.initial_load_delay, Task::InitialLoad);
        self.simulate_outages();
    }

    /// Arm the next single-record insertion.
    pub fn schedule_trickle(&mut self) {
        let Some(interval) = self.options.trickle_intervals.choose(&mut self.rng).copied() else {
            tracing::warn!("no trickle intervals configured, live stream disabled");
            return;
        };
        tracing::debug!(next_in_secs = interval.as_secs(), "scheduled next record");
        self.scheduler.schedule(interval, Task::Trickle);
    }

    /// Arm the periodic burst check; the period is drawn once per session.
    pub fn schedule_bursts(&mut self) {
        let interval = match self.burst_interval {
            Some(interval) => interval,
            None => {
                let (low, high) = self.options.burst_interval;
                let interval = random_between(&mut self.rng, low, high);
                self.burst_interval = Some(interval);
                interval
            }
        };
        self.scheduler.schedule(interval, Task::BurstCheck);
    }

    /// Arm the periodic outage roll.
    pub fn simulate_outages(&mut self) {
        self.scheduler
            .schedule(self.options.outage_check_interval, Task::OutageCheck);
    }

    /// Drop to `errored` now and schedule the automatic recovery. Only a
    /// connected session can fail.
    pub fn trigger_outage(&mut self) -> bool {
        if self.connection != ConnectionState::Connected || self.is_disposed() {
            return false;
        }
        let (low, high) = self.options.outage_recovery;
        let recovery = random_between(&mut self.rng, low, high);
        tracing::warn!(
            recovery_ms = recovery.as_millis() as u64,
            "simulating temporary network issue"
        );
        self.connection = ConnectionState::Errored;
        self.error = Some(OUTAGE_MESSAGE.to_string());
        self.scheduler.schedule(recovery, Task::OutageRecover);
        true
    }

    /// Prepend `record`, dropping the oldest entries beyond the retention
    /// bound.
    pub fn insert(&mut self, record: Record) {
        if self.is_disposed() {
            return;
        }
        if record.is_unseen {
            self.unseen_count += 1;
        }
        self.records.insert(0, record);
        if self.records.len() > self.options.max_records {
            let dropped = self.records.split_off(self.options.max_records);
            let dropped_unseen = dropped.iter().filter(|record| record.is_unseen).count();
            self.unseen_count -= dropped_unseen;
        }
        self.touch();
    }

    pub fn mark_all_read(&mut self) {
        if self.is_disposed() {
            return;
        }
        for record in &mut self.records {
            record.is_unseen = false;
        }
        self.unseen_count = 0;
        self.clear_notification();
        tracing::info!("marked all records as read");
    }

    /// Replace the feed with a fresh load after a short delay.
    pub fn refresh(&mut self) {
        if self.is_disposed() || self.refresh_timer.is_some() {
            return;
        }
        tracing::info!("manual refresh triggered");
        self.loading = true;
        self.error = None;
        self.refresh_timer = self
            .scheduler
            .schedule(self.options.refresh_delay, Task::RefreshComplete);
    }

    /// Cancel every pending timer. The session is inert afterwards.
    pub fn dispose(&mut self) {
        if self.is_disposed() {
            return;
        }
        let cancelled = self.scheduler.close();
        self.notification_timer = None;
        self.refresh_timer = None;
        tracing::debug!(cancelled, "feed session disposed");
    }

    /// Run every timer due up to `now` (measured from session start), in
    /// deadline order.
    pub fn advance_to(&mut self, now: Duration) {
        while let Some((id, task)) = self.scheduler.pop_due(now) {
            self.run(id, task);
        }
        self.scheduler.settle(now);
    }

    pub fn advance_by(&mut self, delta: Duration) {
        let target = self.scheduler.now().saturating_add(delta);
        self.advance_to(target);
    }

    fn run(&mut self, id: TimerId, task: Task) {
        match task {
            Task::InitialLoad => self.complete_initial_load(),
            Task::TrickleStart => self.schedule_trickle(),
            Task::Trickle => {
                if self.connection == ConnectionState::Connected {
                    let sentiment = self.trickle_weights.sample(&mut self.rng);
                    self.inject(sentiment);
                }
                self.schedule_trickle();
            }
            Task::BurstCheck => {
                if self.connection == ConnectionState::Connected
                    && self.rng.gen_bool(self.options.burst_probability)
                {
                    self.start_burst();
                }
                self.schedule_bursts();
            }
            Task::BurstInsert => {
                if self.connection == ConnectionState::Connected {
                    let sentiment = self.burst_weights.sample(&mut self.rng);
                    self.inject(sentiment);
                }
            }
            Task::NotificationClear => {
                if self.notification_timer == Some(id) {
                    self.notification = false;
                    self.notification_timer = None;
                }
            }
            Task::OutageCheck => {
                if self.connection == ConnectionState::Connected
                    && self.rng.gen_bool(self.options.outage_probability)
                {
                    self.trigger_outage();
                }
                self.simulate_outages();
            }
            Task::OutageRecover => {
                if self.connection == ConnectionState::Errored {
                    self.connection = ConnectionState::Connected;
                    self.error = None;
                    tracing::info!("connection restored");
                }
            }
            Task::RefreshComplete => self.complete_refresh(),
        }
    }

    fn complete_initial_load(&mut self) {
        self.records = generate_initial_set(&mut self.rng);
        self.records.truncate(self.options.max_records);
        self.unseen_count = 0;
        self.connection = ConnectionState::Connected;
        self.loading = false;
        self.touch();
        let breakdown = self.breakdown();
        tracing::info!(
            total = self.records.len(),
            positive = breakdown.positive,
            neutral = breakdown.neutral,
            negative = breakdown.negative,
            "loaded initial records"
        );
        self.scheduler
            .schedule(self.options.first_trickle_delay, Task::TrickleStart);
        self.schedule_bursts();
    }

    fn complete_refresh(&mut self) {
        self.refresh_timer = None;
        let mut records = Vec::with_capacity(self.options.breaking_count + 35);
        for _ in 0..self.options.breaking_count {
            records.push(synthesize(&mut self.rng, Some(Sentiment::Positive), Some(0.0)).mark_unseen());
        }
        records.extend(generate_initial_set(&mut self.rng));
        records.truncate(self.options.max_records);
        self.unseen_count = records.iter().filter(|record| record.is_unseen).count();
        self.records = records;
        self.loading = false;
        self.touch();
        self.raise_notification();
        tracing::info!(total = self.records.len(), "refresh complete");
    }

    fn start_burst(&mut self) {
        let size = self.rng.gen_range(self.options.burst_size.clone());
        tracing::info!(size, "creating burst of records");
        for step in 0..size {
            let delay = self.options.burst_spacing.saturating_mul(step as u32);
            self.scheduler.schedule(delay, Task::BurstInsert);
        }
    }

    fn inject(&mut self, sentiment: Sentiment) {
        let record = synthesize(&mut self.rng, Some(sentiment), Some(0.0)).mark_unseen();
        tracing::info!(
            sentiment = %record.sentiment,
            author = %record.author.display_name,
            preview = %preview(&record.body, 50),
            "new record added"
        );
        self.insert(record);
        self.raise_notification();
    }

    fn raise_notification(&mut self) {
        if let Some(previous) = self.notification_timer.take() {
            self.scheduler.cancel(previous);
        }
        self.notification = true;
        self.notification_timer = self
            .scheduler
            .schedule(self.options.notification_ttl, Task::NotificationClear);
    }

    fn clear_notification(&mut self) {
        if let Some(timer) = self.notification_timer.take() {
            self.scheduler.cancel(timer);
        }
        self.notification = false;
    }

    fn touch(&mut self) {
        self.last_refresh_at = Some(self.started_at + self.scheduler.now());
    }
}

impl Drop for FeedSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn random_between<R: Rng + ?Sized>(rng: &mut R, low: Duration, high: Duration) -> Duration {
    if high <= low {
        return low;
    }
    let millis = rng.gen_range(low.as_millis() as u64..high.as_millis() as u64);
    Duration::from_millis(millis)
}

fn preview(body: &str, max_chars: usize) -> String {
    let mut out: String = body.chars().take(max_chars).collect();
    if body.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}
