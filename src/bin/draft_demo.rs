//! Demo that drives the whole pipeline in-process with mock providers:
//! fetch a trend batch, select the two hottest items, stream a draft and
//! print the scrubbed (markdown-free) text.

use futures::StreamExt;

use trend_radar::api::AppState;
use trend_radar::article::{self, SelectedTrend};
use trend_radar::{collector, DraftAccumulator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    std::env::set_var("AI_TEST_MODE", "mock");

    let state = AppState::from_env();
    let batch = collector::fetch_trends(&state).await;

    let mut trends = batch.trends;
    trends.sort_by_key(|t| std::cmp::Reverse(t.score));
    trends.truncate(2);
    println!("selected trends:");
    for t in &trends {
        println!("  [{}] {}", t.score, t.title);
    }

    let selection: Vec<SelectedTrend> = trends
        .into_iter()
        .map(|t| SelectedTrend {
            id: t.id,
            title: t.title,
            summary: t.summary,
            score: t.score,
            tags: t.tags,
            source_url: t.source_url,
        })
        .collect();
    let prompt = article::build_draft_prompt(&selection);

    let mut stream = state.writer.stream_article(&prompt.system, &prompt.user).await?;
    let mut acc = DraftAccumulator::new();
    while let Some(tok) = stream.next().await {
        acc.push(&tok);
    }

    println!("\n--- draft ({} chars raw) ---\n", acc.raw().len());
    println!("{}", acc.clean());
    Ok(())
}
