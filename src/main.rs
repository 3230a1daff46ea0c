use bookskew::config::{self, Config, RunMode};
use bookskew::feed::{DatabentoSource, TickSource};
use bookskew::report;
use bookskew::strategy::Strategy;
use std::collections::HashMap;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let env_map: HashMap<String, String> = std::env::vars().collect();
    let config = match Config::from_env_map(env_map.clone()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Credential material goes to the feed source only; the strategy core
    // never sees it.
    let api_key = match config::load_api_key(&env_map) {
        Ok(key) => key,
        Err(e) => {
            eprintln!("Credential error: {}", e);
            std::process::exit(1);
        }
    };

    let source = DatabentoSource::new(
        config.feed.base_url.clone(),
        api_key,
        config.feed.dataset.clone(),
        config.feed.stype_in.clone(),
    );
    let mut strategy = Strategy::new(config.strategy.clone());

    let summary = match config.run_mode {
        RunMode::Historical => {
            match strategy
                .run_historical(
                    &source,
                    config.feed.symbol.as_str(),
                    config.feed.start,
                    config.feed.end,
                )
                .await
            {
                Ok(summary) => summary,
                Err(e) => {
                    eprintln!("Feed error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        RunMode::Live => {
            // Interruption is handled here at the loop boundary: dropping
            // the run future can only land between ticks, so the last
            // fully-processed tick's state stays intact.
            let outcome = {
                let stream = source.subscribe(config.feed.symbol.as_str());
                let run = strategy.run_live(stream);
                tokio::pin!(run);
                tokio::select! {
                    res = &mut run => Some(res),
                    _ = tokio::signal::ctrl_c() => None,
                }
            };
            match outcome {
                Some(Ok(summary)) => summary,
                Some(Err(e)) => {
                    eprintln!("Feed error: {}", e);
                    std::process::exit(1);
                }
                None => {
                    tracing::info!("interrupted");
                    strategy.summary()
                }
            }
        }
    };

    println!("{}", summary);

    if let Some(path) = env_map.get("RESULTS_CSV") {
        if let Err(e) = report::write_csv_file(strategy.ledger().results(), path) {
            eprintln!("Failed to write results: {}", e);
            std::process::exit(1);
        }
        tracing::info!(path = %path, "result log written");
    }
}
