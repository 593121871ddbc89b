//! Scores one response with a named evaluator, then lists recent judges.
//! Run with: SCORABLE_API_KEY=... cargo run -p scorable --example evaluate
//! With tracing: RUST_LOG=debug cargo run -p scorable --example evaluate --features tracing

use scorable::{
    ClientConfig, ExecutionPayload, Jitter, ListParams, RateLimitPolicy, RateLimiter,
    RetryManager, RetryPolicy, Scorable, ScorableError, Strategy,
};
use scorable::resources::JudgeListParams;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = ClientConfig::from_env()?;
    let transport = scorable::ReqwestTransport::new(&config.api_key, config.base_url())?;

    // Report every backoff so slow runs are explainable.
    let retry = RetryManager::builder()
        .name("evaluate-example")
        .policy(
            RetryPolicy::builder()
                .max_retries(3)
                .base_delay(Duration::from_millis(1000))
                .max_delay(Duration::from_millis(10_000))
                .jitter(Jitter::Full)
                .build(),
        )
        .on_retry(|attempt, delay| println!("retry #{} in {:?}", attempt, delay))
        .build();

    let limiter = RateLimiter::builder()
        .name("evaluate-example")
        .policy(
            RateLimitPolicy::builder()
                .max_requests(50)
                .window(Duration::from_secs(60))
                .strategy(Strategy::Queue)
                .max_queue_size(100)
                .build(),
        )
        .on_queued(|queue_size| println!("waiting for a slot ({} queued)", queue_size))
        .build();

    let client = Scorable::builder(transport)
        .retry_manager(retry)
        .rate_limiter(limiter)
        .timeout(Duration::from_secs(30))
        .build();

    let payload = ExecutionPayload::new(
        "How do I reset my password?",
        "Open Settings, choose Security and click 'Reset password'.",
    );

    match client
        .evaluators()
        .execute_by_name("Clarity", &payload)
        .await
    {
        Ok(result) => println!(
            "score: {:?}, justification: {}",
            result.score,
            result.justification.unwrap_or_default()
        ),
        Err(err) if err.is_not_found_error() => println!("no evaluator named 'Clarity'"),
        Err(err) => return Err(describe(err).into()),
    }

    let params = JudgeListParams::from(ListParams {
        page_size: Some(5),
        ..ListParams::default()
    });
    let page = client.judges().list(&params).await?;
    for judge in &page.results {
        println!("judge {} ({})", judge.name, judge.id);
    }

    let status = client.rate_limit_status();
    println!(
        "{} requests left, window resets in {:?}",
        status.requests_remaining, status.reset_after
    );

    Ok(())
}

fn describe(err: ScorableError) -> String {
    format!("[{} {}] {} ({})", err.status(), err.code(), err.message(), err.kind())
}
