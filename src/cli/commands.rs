use std::fmt::Write as _;

use anyhow::Result;
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::app::App;
use crate::compose::compose_intent_url;
use crate::config::{AppConfig, SourceKind};
use crate::feed::{Category, Record, SentimentBreakdown};
use crate::session::{FeedSession, SessionOptions};
use crate::source::{self, ApiError, Credentials, HttpSearchClient};

#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    /// Number of records to print
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
    /// Seed for a reproducible feed (overrides feed.seed)
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Search query (defaults to source.query)
    #[arg()]
    pub query: Option<String>,
    /// Results to request, clamped to 10..=100 (defaults to source.max_results)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Source to search (defaults to source.kind)
    #[arg(long)]
    pub source: Option<SourceKind>,
}

#[derive(Args, Debug, Clone)]
pub struct ComposeArgs {
    /// Seed for a reproducible template pick
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run_tui(app: &mut App) -> Result<()> {
    app.run()
}

pub fn snapshot(config: &AppConfig, args: SnapshotArgs) -> Result<()> {
    let options = SessionOptions::default();
    let load_delay = options.initial_load_delay;
    let mut session = FeedSession::with_seed(options, args.seed.or(config.feed.seed));
    session.initialize();
    session.advance_to(load_delay);
    let output = format_snapshot(&session, args.limit);
    session.dispose();
    print!("{output}");
    Ok(())
}

pub fn search(config: &AppConfig, args: SearchArgs) -> Result<()> {
    let mut options = config.source.clone();
    if let Some(kind) = args.source {
        options.kind = kind;
    }
    let query = args.query.unwrap_or_else(|| options.query.clone());
    let limit = args.limit.unwrap_or(options.max_results);

    let mut backend = source::build(&options, config.feed.seed).map_err(surface)?;
    tracing::info!(source = backend.name(), %query, limit, "running search");
    let response = backend.search(&query, limit).map_err(surface)?;
    let more = response.meta.next_token.is_some();
    let records = response.into_records(OffsetDateTime::now_utc());
    print!("{}", format_records(&records));
    if more {
        println!("(more results available)");
    }
    Ok(())
}

pub fn token(config: &AppConfig) -> Result<()> {
    let credentials = Credentials::from_env().map_err(surface)?;
    let mut client = HttpSearchClient::new(&config.source, credentials).map_err(surface)?;
    let token = client.bearer_token().map_err(surface)?;
    println!("token_type:   {}", token.token_type);
    println!("access_token: {}", token.masked());
    Ok(())
}

pub fn compose(args: ComposeArgs) -> Result<()> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    println!("{}", compose_intent_url(&mut rng));
    Ok(())
}

/// Attach the user-facing message to an API failure.
fn surface(err: ApiError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

fn format_snapshot(session: &FeedSession, limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        &mut out,
        "{} | {} records | {} unseen",
        session.connection_state(),
        session.records().len(),
        session.unseen_count()
    );
    let _ = writeln!(&mut out, "{}", format_breakdown(&session.breakdown()));
    if let Some(at) = session.last_refresh_at() {
        let stamp = at
            .format(&Rfc3339)
            .unwrap_or_else(|_| at.unix_timestamp().to_string());
        let _ = writeln!(&mut out, "refreshed {stamp}");
    }
    out.push('\n');
    let records = session.records();
    out.push_str(&format_records(&records[..limit.min(records.len())]));
    out
}

fn format_breakdown(breakdown: &SentimentBreakdown) -> String {
    breakdown
        .percentages()
        .into_iter()
        .map(|(sentiment, pct)| format!("{sentiment} {}% ({})", pct, breakdown.count(sentiment)))
        .collect::<Vec<_>>()
        .join("  ")
}

fn format_records(records: &[Record]) -> String {
    if records.is_empty() {
        return "No mentions found.\n".to_string();
    }
    let mut out = String::new();
    for record in records {
        let mut headline = format!(
            "{} {}  {}",
            record.author.display_name, record.author.handle, record.age_label
        );
        if record.author.verified {
            headline.push_str("  [VERIFIED]");
        }
        if record.category != Category::Mention {
            let _ = write!(&mut headline, "  [{}]", record.category.to_string().to_uppercase());
        }
        if record.is_unseen {
            headline.push_str("  [NEW]");
        }
        let _ = writeln!(&mut out, "{headline}");
        let _ = writeln!(&mut out, "    {}", record.body.replace('\n', " "));
        let e = &record.engagement;
        let _ = writeln!(
            &mut out,
            "    {} likes  {} reposts  {} replies  {} views  ({})",
            e.like_count, e.retweet_count, e.reply_count, e.view_count, record.sentiment
        );
        out.push('\n');
    }
    out
}
