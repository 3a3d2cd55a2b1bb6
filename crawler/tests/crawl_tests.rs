use wikirank_crawler::{CrawlConfig, Crawler};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate { ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html") }

fn config(server: &MockServer, topics: &[&str]) -> CrawlConfig {
    CrawlConfig {
        topics: topics.iter().map(|t| t.to_string()).collect(),
        base_url: server.uri(),
        timeout_secs: 5,
        retry_backoff_ms: 10,
        deadline_secs: 30,
        concurrency: 2,
        ..Default::default()
    }
}

fn results_page(paths: &[String], next: Option<&str>) -> String {
    let mut out = String::from("<html><body>");
    for p in paths {
        out.push_str(&format!(r#"<div class="mw-search-result-heading"><a href="{p}">{p}</a></div>"#));
    }
    if let Some(next) = next {
        out.push_str(&format!(r#"<div class="mw-pager-navigation-bar"><a class="mw-nextlink" href="{next}">next 20</a></div>"#));
    }
    out.push_str("</body></html>");
    out
}

const ALPHA: &str = r##"<html><head><title>Alpha - Wikipedia</title></head><body>
<h1 id="firstHeading">Alpha</h1>
<ul class="vector-toc-contents">
  <li><a class="vector-toc-link" href="#">(Top)</a></li>
  <li><a class="vector-toc-link" href="#History">History</a></li>
  <li><a class="vector-toc-link" href="#Teams">Teams</a></li>
</ul>
<div class="mw-body-content"><div class="mw-content-ltr mw-parser-output" lang="en">
  <p>The Alpha League is a professional football league.</p>
  <p>It has 32 teams.</p>
  <a class="external text" href="https://example.com/source">source</a>
</div></div>
<ul>
  <li id="t-cite"><a href="/cite/Alpha">Cite this page</a></li>
  <li id="ca-history"><a href="/history/Alpha">View history</a></li>
</ul>
</body></html>"##;

const ALPHA_CITE: &str = r#"<html><body><div class="plainlinks"><ul>
<li>Page name: Alpha League</li>
<li>Author: Wikipedia contributors</li>
<li>Publisher: Wikipedia, The Free Encyclopedia.</li>
<li>Date of last revision: 1 October 2026 10:00 UTC</li>
<li>Date retrieved: 17 October 2026 12:00 UTC</li>
<li>Page Version ID: 123456</li>
</ul></div></body></html>"#;

const ALPHA_HISTORY: &str = r#"<html><body><ul>
<li><a class="mw-changeslist-date" href="/r/2">10:00, 1 October 2026</a></li>
<li><a class="mw-changeslist-date" href="/r/1">09:00, 2 September 2026</a></li>
</ul></body></html>"#;

// No content container, and its citation page is not served.
const BARE: &str = r#"<html><body><h1 id="firstHeading">Bare Page</h1>
<ul><li id="t-cite"><a href="/cite/Bare">Cite this page</a></li></ul></body></html>"#;

#[tokio::test]
async fn crawls_documents_and_degrades_missing_parts() {
    let server = MockServer::start().await;
    let listing = ["/wiki/Alpha", "/wiki/Bare", "/wiki/Missing", "/wiki/Untitled"].map(String::from);
    Mock::given(method("GET"))
        .and(path("/w/index.php"))
        .and(query_param("search", "NFL information"))
        .respond_with(html(&results_page(&listing, Some("/w/index.php?search=NFL+information&offset=20"))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/w/index.php"))
        .and(query_param("offset", "20"))
        .respond_with(html(&results_page(&[], None)))
        .with_priority(1)
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(path("/wiki/Alpha")).respond_with(html(ALPHA)).mount(&server).await;
    Mock::given(path("/cite/Alpha")).respond_with(html(ALPHA_CITE)).mount(&server).await;
    Mock::given(path("/history/Alpha")).respond_with(html(ALPHA_HISTORY)).mount(&server).await;
    Mock::given(path("/wiki/Bare")).respond_with(html(BARE)).mount(&server).await;
    Mock::given(path("/wiki/Untitled")).respond_with(html("<html><body><p>orphan text</p></body></html>")).mount(&server).await;

    // MLB has no listing mock: its search answers 404 and the topic is skipped.
    let crawler = Crawler::new(config(&server, &["NFL", "MLB"])).unwrap();
    let corpus = crawler.crawl(&crawler.config().topics, 20).await;

    assert_eq!(corpus.len(), 2);
    let alpha = &corpus[0];
    assert_eq!(alpha.url, format!("{}/wiki/Alpha", server.uri()));
    assert_eq!(alpha.title, "Alpha League");
    assert_eq!(alpha.text, "The Alpha League is a professional football league. It has 32 teams.");
    assert_eq!(alpha.word_count, 12);
    assert_eq!(alpha.categories, vec!["History", "Teams"]);
    assert_eq!(alpha.links.len(), 6);
    assert_eq!(alpha.references, vec!["https://example.com/source"]);
    assert_eq!(alpha.author_editor.as_deref(), Some("Wikipedia contributors"));
    assert_eq!(alpha.date_retrieved.as_deref(), Some("17 October 2026 12:00 UTC"));
    assert_eq!(alpha.last_modification_date.as_deref(), Some("1 October 2026 10:00 UTC"));
    assert_eq!(alpha.article_id.as_deref(), Some("123456"));
    assert_eq!(alpha.revision_history, vec!["10:00, 1 October 2026", "09:00, 2 September 2026"]);

    let bare = &corpus[1];
    assert_eq!(bare.title, "Bare Page");
    assert_eq!(bare.text, "");
    assert_eq!(bare.word_count, 0);
    assert_eq!(bare.author_editor, None);
    assert_eq!(bare.date_retrieved, None);
    assert_eq!(bare.last_modification_date, None);
    assert_eq!(bare.article_id, None);
    assert!(bare.revision_history.is_empty());
}

#[tokio::test]
async fn follows_next_page_up_to_cap() {
    let server = MockServer::start().await;
    let first: Vec<String> = (0..20).map(|i| format!("/wiki/Article{i}")).collect();
    let second: Vec<String> = (20..30).map(|i| format!("/wiki/Article{i}")).collect();
    Mock::given(path("/w/index.php"))
        .and(query_param("search", "NBA information"))
        .respond_with(html(&results_page(&first, Some("/w/index.php?search=NBA+information&offset=20"))))
        .mount(&server)
        .await;
    Mock::given(path("/w/index.php"))
        .and(query_param("offset", "20"))
        .respond_with(html(&results_page(&second, None)))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path_regex(r"^/wiki/Article\d+$"))
        .respond_with(html(r#"<html><body><h1 id="firstHeading">Generic</h1><div class="mw-content-ltr mw-parser-output"><p>basketball</p></div></body></html>"#))
        .mount(&server)
        .await;

    let crawler = Crawler::new(config(&server, &["NBA"])).unwrap();
    let corpus = crawler.crawl(&crawler.config().topics, 25).await;

    assert_eq!(corpus.len(), 25);
    assert!(corpus[24].url.ends_with("/wiki/Article24"));
    assert!(corpus.iter().all(|d| d.title == "Generic" && d.word_count == 1));
}

#[tokio::test]
async fn retries_transient_failures() {
    let server = MockServer::start().await;
    Mock::given(path("/w/index.php"))
        .respond_with(ResponseTemplate::new(503))
        .with_priority(1)
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/w/index.php"))
        .respond_with(html(&results_page(&["/wiki/Puck".to_string()], None)))
        .mount(&server)
        .await;
    Mock::given(path("/wiki/Puck"))
        .respond_with(html(r#"<html><head><title>Puck</title></head><body></body></html>"#))
        .mount(&server)
        .await;

    let crawler = Crawler::new(config(&server, &["NHL"])).unwrap();
    let corpus = crawler.crawl_configured().await;
    assert_eq!(corpus.len(), 1);
    assert_eq!(corpus[0].title, "Puck");
}

#[tokio::test]
async fn permanent_failures_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(path("/w/index.php")).respond_with(html(&results_page(&["/wiki/Gone".to_string()], None))).mount(&server).await;
    Mock::given(path("/wiki/Gone")).respond_with(ResponseTemplate::new(404)).expect(1).mount(&server).await;

    let crawler = Crawler::new(config(&server, &["MLB"])).unwrap();
    assert!(crawler.crawl_configured().await.is_empty());
}

#[tokio::test]
async fn duplicate_results_are_fetched_once() {
    let server = MockServer::start().await;
    let listing = vec!["/wiki/Shared".to_string()];
    Mock::given(path("/w/index.php")).respond_with(html(&results_page(&listing, None))).mount(&server).await;
    Mock::given(path("/wiki/Shared"))
        .respond_with(html(r#"<html><body><h1 id="firstHeading">Shared</h1></body></html>"#))
        .expect(1)
        .mount(&server)
        .await;

    let crawler = Crawler::new(config(&server, &["NFL", "NBA"])).unwrap();
    let corpus = crawler.crawl_configured().await;
    assert_eq!(corpus.len(), 1);
}

#[tokio::test]
async fn expired_deadline_yields_empty_corpus() {
    let server = MockServer::start().await;
    Mock::given(path("/w/index.php"))
        .respond_with(html(&results_page(&["/wiki/Late".to_string()], None)).set_delay(std::time::Duration::from_millis(500)))
        .mount(&server)
        .await;

    let crawler = Crawler::new(CrawlConfig { deadline_secs: 0, ..config(&server, &["NFL"]) }).unwrap();
    assert!(crawler.crawl_configured().await.is_empty());
}

#[tokio::test]
async fn retries_stop_at_the_configured_bound() {
    let server = MockServer::start().await;
    Mock::given(path("/w/index.php")).respond_with(ResponseTemplate::new(503)).expect(3).mount(&server).await;

    let crawler = Crawler::new(config(&server, &["NHL"])).unwrap();
    assert_eq!(crawler.config().max_retries, 2);
    assert!(crawler.crawl_configured().await.is_empty());
}

#[tokio::test]
async fn shared_results_belong_to_the_earlier_topic() {
    let server = MockServer::start().await;
    Mock::given(path("/w/index.php"))
        .and(query_param("search", "NFL information"))
        .respond_with(
            html(&results_page(&["/wiki/Shared".to_string()], None)).set_delay(std::time::Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(path("/w/index.php"))
        .and(query_param("search", "NBA information"))
        .respond_with(html(&results_page(&["/wiki/Solo".to_string(), "/wiki/Shared".to_string()], None)))
        .mount(&server)
        .await;
    for name in ["Shared", "Solo"] {
        Mock::given(path(format!("/wiki/{name}")))
            .respond_with(html(&format!(r#"<html><body><h1 id="firstHeading">{name}</h1></body></html>"#)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let crawler = Crawler::new(config(&server, &["NFL", "NBA"])).unwrap();
    let corpus = crawler.crawl_configured().await;
    let titles: Vec<&str> = corpus.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["Shared", "Solo"]);
}

#[tokio::test]
async fn politeness_delay_does_not_hold_a_fetch_slot() {
    let server = MockServer::start().await;
    for (topic, doc) in [("NFL", "Gridiron"), ("NBA", "Hoops")] {
        Mock::given(path("/w/index.php"))
            .and(query_param("search", format!("{topic} information")))
            .respond_with(html(&results_page(&[format!("/wiki/{doc}")], None)))
            .mount(&server)
            .await;
        Mock::given(path(format!("/wiki/{doc}")))
            .respond_with(html(&format!(r#"<html><body><h1 id="firstHeading">{doc}</h1></body></html>"#)))
            .mount(&server)
            .await;
    }

    // One slot and a long pause: the pauses overlap only if the slot is free while pausing.
    let crawler = Crawler::new(CrawlConfig { concurrency: 1, delay_ms: 1500, ..config(&server, &["NFL", "NBA"]) }).unwrap();
    let started = std::time::Instant::now();
    let corpus = crawler.crawl_configured().await;
    assert_eq!(corpus.len(), 2);
    assert!(started.elapsed() < std::time::Duration::from_millis(2800), "took {:?}", started.elapsed());
}
