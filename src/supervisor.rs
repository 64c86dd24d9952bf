//! Process supervisor
//!
//! Bootstraps the components from configuration, owns their lifetimes, and
//! forwards shutdown. Startup order: store → schema → optional wipe →
//! spider (seeded with the start URL) → frontend. On SIGINT/SIGTERM the
//! spider is stopped first, then the frontend drains and exits. Crawl
//! quiescence only logs; the frontend keeps serving until a signal arrives.

use crate::config::Config;
use crate::crawler::{Fetcher, Spider};
use crate::storage::{PgStore, Store};
use crate::{search, SpindexError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// How often crawl and store statistics are logged
const STATS_INTERVAL: Duration = Duration::from_secs(5);

/// Sampling interval of the quiescence watcher
const QUIESCENCE_INTERVAL: Duration = Duration::from_millis(500);

/// Runs the whole service until a shutdown signal arrives
pub async fn run(config: Config) -> Result<(), SpindexError> {
    let store = Arc::new(PgStore::connect(&config.database).await?);
    store.ensure_schema().await?;

    if config.spider.wipe_on_start {
        tracing::info!("Wiping previously indexed data");
        store.wipe_all().await?;
    }

    let store: Arc<dyn Store> = store;

    let fetcher = Fetcher::new(&config.spider)?;
    let mut spider = Spider::new(Arc::clone(&store), fetcher, config.spider.max_depth);
    spider.enqueue(config.spider.start_url.clone(), 0);

    let run_spider = config.spider.run_spider;
    if run_spider {
        spider.start(Spider::default_worker_count());
    } else {
        tracing::info!("Spider disabled by configuration; serving queries only");
    }

    // Frontend, with its own shutdown channel
    let listener = search::bind(config.searcher.port).await?;
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = tokio::spawn(search::serve(listener, Arc::clone(&store), async move {
        let _ = shutdown_rx.changed().await;
    }));

    let stats_loop = async {
        let mut interval = tokio::time::interval(STATS_INTERVAL);
        interval.tick().await;
        loop {
            interval.tick().await;
            let crawl = spider.stats();
            tracing::info!(
                "Crawl: queue={} active={} downloaded={} indexed={}",
                crawl.queue_size,
                crawl.active_workers,
                crawl.downloaded,
                crawl.indexed
            );
            match store.stats().await {
                Ok(db) => tracing::info!(
                    "Store: documents={} terms={} postings={}",
                    db.documents,
                    db.terms,
                    db.postings
                ),
                Err(e) => tracing::warn!("Failed to read store statistics: {}", e),
            }
        }
    };

    let quiescence = async {
        if run_spider {
            spider.wait_for_quiescence(QUIESCENCE_INTERVAL).await;
            let stats = spider.stats();
            tracing::info!(
                "Crawl finished: {} downloaded, {} indexed",
                stats.downloaded,
                stats.indexed
            );
        }
        // Keep the frontend serving until a signal arrives
        std::future::pending::<()>().await
    };

    tokio::select! {
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
        }
        _ = stats_loop => {}
        _ = quiescence => {}
    }

    spider.stop().await;
    let _ = shutdown_tx.send(true);

    match server.await {
        Ok(result) => result?,
        Err(e) => tracing::error!("Frontend task failed: {}", e),
    }

    if let Ok(db) = store.stats().await {
        tracing::info!(
            "Final store statistics: documents={} terms={} postings={}",
            db.documents,
            db.terms,
            db.postings
        );
    }

    Ok(())
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
