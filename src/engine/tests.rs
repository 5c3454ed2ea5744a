use std::time::Duration;

use scraper::Selector;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::initialization::init_client;
use crate::monitor::ViewportEvent;
use crate::pagination::TotalPages;

const BOTTOM: ScrollMetrics = ScrollMetrics {
    scroll_top: 4000.0,
    scroll_height: 5000.0,
    viewport_height: 1000.0,
};

const TOP: ScrollMetrics = ScrollMetrics {
    scroll_top: 0.0,
    scroll_height: 5000.0,
    viewport_height: 1000.0,
};

/// A gallery post page: three lazy images and the numbered navigation.
fn gallery_page(current: u32, total: u32) -> String {
    let images: String = (1..=3)
        .map(|i| {
            format!(
                r#"<p><img class="aligncenter lazy" data-src="https://cdn.test/{current}-{i}.jpg"></p>"#
            )
        })
        .collect();
    let navigation: String = (1..=total)
        .map(|n| {
            if n == current {
                format!(r#"<span class="post-page-numbers current">{n}</span>"#)
            } else {
                format!(r#"<a class="post-page-numbers" href="/gallery/post/{n}/">{n}</a>"#)
            }
        })
        .collect();
    format!(
        r#"<!DOCTYPE html><html><head><title>Post</title></head><body>
           <header><h1>Post</h1></header>
           <div class="entry">{images}<div class="page-link">{navigation}</div></div>
           </body></html>"#
    )
}

fn loader_at(base: &str, config: Config, markup: &str) -> AutoLoader {
    let url = Url::parse(&format!("{base}/gallery/post/")).expect("valid url");
    let client = init_client(&config).expect("client builds");
    let fetcher = PageFetcher::new(client, config.fetch_timeout()).with_referer(&url);
    AutoLoader::new(config, LiveDocument::parse(markup, url), fetcher)
}

async fn mount_page(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/gallery/post/{page}/")))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

fn count(loader: &AutoLoader, selector: &str) -> usize {
    loader
        .document()
        .html()
        .select(&Selector::parse(selector).expect("valid selector"))
        .count()
}

#[tokio::test]
async fn test_loads_every_page_then_stops() {
    let server = MockServer::start().await;
    for page in 2..=5 {
        mount_page(&server, page, gallery_page(page, 5)).await;
    }
    let mut loader = loader_at(&server.uri(), Config::default(), &gallery_page(1, 5));

    let detection = loader.start();
    assert_eq!(
        detection,
        Detection::Detected {
            current: 1,
            total: 5,
            links: 4
        }
    );
    assert!(loader.notices().contains("Loaded 3 images"));

    let mut merged = Vec::new();
    while let Some(outcome) = loader.load_next(&BOTTOM).await {
        match outcome {
            LoadOutcome::Merged(report) => merged.push(report.page),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    assert_eq!(merged, vec![2, 3, 4, 5]);
    assert!(loader.is_done());
    assert!(loader.state().all_pages_loaded());
    assert_eq!(loader.state().current_page(), 5);
    assert_eq!(
        loader.notices().latest().map(|n| n.message.as_str()),
        Some("All 5 pages loaded")
    );
    assert_eq!(count(&loader, ".entry img.loaded"), 15);
    assert_eq!(count(&loader, ".autopager-separator"), 4);
    assert_eq!(loader.stats().pages_merged(), 4);

    // Done is terminal: further triggers issue no request.
    assert!(loader.load_next(&BOTTOM).await.is_none());
    assert_eq!(loader.check(&BOTTOM), Check::Finished);
}

#[tokio::test]
async fn test_http_error_rolls_back_and_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gallery/post/2/"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, 2, gallery_page(2, 5)).await;
    let mut loader = loader_at(&server.uri(), Config::default(), &gallery_page(1, 5));
    loader.start();

    let outcome = loader.load_next(&BOTTOM).await.expect("page 2 claimed");
    assert!(matches!(
        outcome,
        LoadOutcome::FetchFailed(FetchError::Status(404))
    ));
    assert_eq!(loader.state().current_page(), 1);
    assert!(!loader.state().is_loading());
    assert_eq!(loader.phase(), Phase::Idle);
    assert!(loader.notices().contains("Failed to load: HTTP 404"));
    assert_eq!(loader.stats().failure_count(FailureKind::HttpStatus), 1);

    let retry = loader.load_next(&BOTTOM).await.expect("page 2 claimed again");
    assert!(matches!(retry, LoadOutcome::Merged(report) if report.page == 2));
    assert_eq!(loader.state().current_page(), 2);
}

#[tokio::test]
async fn test_missing_container_keeps_page_counter() {
    let server = MockServer::start().await;
    mount_page(&server, 2, "<html><body><p>removed</p></body></html>".into()).await;
    let mut loader = loader_at(&server.uri(), Config::default(), &gallery_page(1, 5));
    loader.start();

    let outcome = loader.load_next(&BOTTOM).await.expect("page 2 claimed");
    assert!(matches!(
        outcome,
        LoadOutcome::MergeFailed(MergeError::FetchedContainerMissing)
    ));
    assert_eq!(loader.state().current_page(), 2);
    assert!(!loader.state().is_loading());
    assert!(loader.notices().contains("Could not find the content container"));
    // Page 3 is still reachable, so a chained check is scheduled.
    assert_eq!(loader.phase(), Phase::Checking);
}

#[tokio::test]
async fn test_missing_container_rolls_back_when_configured() {
    let server = MockServer::start().await;
    mount_page(&server, 2, "<html><body><p>removed</p></body></html>".into()).await;
    let config = Config {
        rollback_on_merge_failure: true,
        ..Default::default()
    };
    let mut loader = loader_at(&server.uri(), config, &gallery_page(1, 5));
    loader.start();

    loader.load_next(&BOTTOM).await.expect("page 2 claimed");
    assert_eq!(loader.state().current_page(), 1);
}

#[tokio::test]
async fn test_without_navigation_follows_next_link() {
    let server = MockServer::start().await;
    mount_page(&server, 2, gallery_page(2, 5)).await;
    let host = r#"<html><body>
        <div class="entry"><p><img class="lazy" data-src="1.jpg"></p></div>
        <a class="next" href="/gallery/post/2/">Next</a>
    </body></html>"#;
    let mut loader = loader_at(&server.uri(), Config::default(), host);

    assert_eq!(
        loader.start(),
        Detection::NoNavigation { fallback: 50 }
    );
    assert_eq!(loader.state().total_pages(), TotalPages::Fallback(50));
    assert!(loader
        .notices()
        .contains("No navigation found, using default max pages: 50"));

    let outcome = loader.load_next(&BOTTOM).await.expect("page 2 claimed");
    assert!(matches!(outcome, LoadOutcome::Merged(report) if report.images_appended == 3));
}

#[test]
fn test_single_fetch_in_flight() {
    let mut loader = loader_at("https://gallery.test", Config::default(), &gallery_page(1, 5));
    loader.start();

    let Check::Load { page, url } = loader.check(&BOTTOM) else {
        panic!("page 2 should be claimed");
    };
    assert_eq!(page, 2);
    assert_eq!(url.as_str(), "https://gallery.test/gallery/post/2/");
    assert_eq!(loader.phase(), Phase::Fetching);
    assert!(loader.notices().contains("Loading page 2..."));

    for _ in 0..3 {
        assert_eq!(loader.check(&BOTTOM), Check::Wait);
        assert_eq!(loader.begin_load(), Check::Wait);
    }

    loader.complete_load(Err(FetchError::Timeout(Duration::from_secs(30))));
    assert_eq!(loader.state().current_page(), 1);
    assert!(loader.notices().contains("Load timed out, check your network"));
}

#[test]
fn test_no_load_above_threshold() {
    let mut loader = loader_at("https://gallery.test", Config::default(), &gallery_page(1, 5));
    loader.start();

    assert_eq!(loader.check(&TOP), Check::Wait);
    assert_eq!(loader.phase(), Phase::Idle);
    assert_eq!(loader.state().current_page(), 1);
}

#[test]
fn test_single_page_post_finishes_at_threshold() {
    let mut loader = loader_at("https://gallery.test", Config::default(), &gallery_page(1, 1));
    loader.start();

    assert_eq!(loader.check(&BOTTOM), Check::Finished);
    assert!(loader.is_done());
    assert!(loader.notices().contains("All pages loaded"));
}

#[test]
fn test_page_counter_at_u32_max_finishes() {
    let host = r#"<html><body>
        <div class="entry"><p><img class="lazy" data-src="1.jpg"></p></div>
        <div class="page-link"><span class="post-page-numbers current">4294967295</span></div>
    </body></html>"#;
    let mut loader = loader_at("https://gallery.test", Config::default(), host);
    loader.start();

    assert_eq!(loader.check(&BOTTOM), Check::Finished);
    assert!(loader.is_done());
    assert_eq!(loader.state().current_page(), u32::MAX);
}

#[test]
fn test_chaining_follows_continuous_setting() {
    let config = Config {
        continuous_loading: false,
        ..Default::default()
    };
    let mut loader = loader_at("https://gallery.test", config, &gallery_page(1, 5));
    loader.start();

    assert!(matches!(loader.check(&BOTTOM), Check::Load { .. }));
    let outcome = loader.complete_load(Ok(gallery_page(2, 5)));
    assert!(matches!(outcome, LoadOutcome::Merged(_)));
    assert_eq!(loader.phase(), Phase::Idle);
}

#[tokio::test]
async fn test_run_loop_completes() {
    let server = MockServer::start().await;
    for page in 2..=5 {
        mount_page(&server, page, gallery_page(page, 5)).await;
    }
    let config = Config {
        check_interval_ms: 20,
        load_delay_ms: 5,
        ..Default::default()
    };
    let mut loader = loader_at(&server.uri(), config, &gallery_page(1, 5));

    let (tx, rx) = mpsc::channel(4);
    tx.send(ViewportEvent::Scrolled(BOTTOM))
        .await
        .expect("receiver alive");
    // The last scroll position is kept once the channel closes.
    drop(tx);

    let exit = tokio::time::timeout(
        Duration::from_secs(10),
        run_loop(&mut loader, rx, CancellationToken::new()),
    )
    .await
    .expect("loop should finish");

    assert_eq!(exit, RunExit::Completed);
    assert_eq!(loader.stats().pages_merged(), 4);
    assert!(loader.notices().contains("All 5 pages loaded"));
}

#[tokio::test(start_paused = true)]
async fn test_hidden_page_suspends_checks_until_visible() {
    let config = Config {
        check_interval_ms: 100,
        ..Default::default()
    };
    let mut loader = loader_at("https://gallery.test", config, &gallery_page(1, 5));

    // Hidden: ten intervals pass with the reader at the bottom, nothing is claimed.
    let (tx, rx) = mpsc::channel(4);
    tx.send(ViewportEvent::Hidden).await.expect("receiver alive");
    tx.send(ViewportEvent::Scrolled(BOTTOM))
        .await
        .expect("receiver alive");
    let hidden = tokio::time::timeout(
        Duration::from_millis(1000),
        run_loop(&mut loader, rx, CancellationToken::new()),
    )
    .await;
    assert!(hidden.is_err(), "loop keeps waiting while hidden");
    assert_eq!(loader.state().current_page(), 1);
    assert!(!loader.state().is_loading());
    assert_eq!(loader.phase(), Phase::Idle);
    assert!(!loader
        .notices()
        .history()
        .iter()
        .any(|notice| notice.severity == Severity::Loading));
    drop(tx);

    // Visible again: the next tick claims the page after the preserved counter.
    let (tx, rx) = mpsc::channel(4);
    for event in [
        ViewportEvent::Hidden,
        ViewportEvent::Scrolled(BOTTOM),
        ViewportEvent::Visible,
    ] {
        tx.send(event).await.expect("receiver alive");
    }
    let resumed = tokio::time::timeout(
        Duration::from_millis(250),
        run_loop(&mut loader, rx, CancellationToken::new()),
    )
    .await;
    assert!(resumed.is_err());
    let claims: Vec<&str> = loader
        .notices()
        .history()
        .iter()
        .filter(|notice| notice.severity == Severity::Loading)
        .map(|notice| notice.message.as_str())
        .collect();
    assert_eq!(claims.first(), Some(&"Loading page 2..."));
    drop(tx);
}

#[tokio::test]
async fn test_run_loop_cancelled() {
    let mut loader = loader_at("https://gallery.test", Config::default(), &gallery_page(1, 5));
    let (tx, rx) = mpsc::channel(4);
    tx.send(ViewportEvent::Scrolled(BOTTOM))
        .await
        .expect("receiver alive");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let exit = run_loop(&mut loader, rx, cancel).await;
    assert_eq!(exit, RunExit::Cancelled);
    assert_eq!(loader.state().current_page(), 1);
    assert!(!loader.state().is_loading());
}
