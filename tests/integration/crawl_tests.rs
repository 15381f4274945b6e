//! Integration tests for the crawler
//!
//! These tests use wiremock to serve catalogue pages and exercise full
//! search, listing and deep crawls end-to-end.

use flibusta_scraper::config::{Config, DelayConfig, HttpConfig, SiteConfig};
use flibusta_scraper::model::ListingKind;
use flibusta_scraper::output::{search_filename, write_json_into};
use flibusta_scraper::{Crawler, ScraperError};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Creates a test configuration pointing at the mock server, without delays
fn create_test_config(base_url: &str) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
        },
        delay: DelayConfig::none(),
        ..Config::default()
    }
}

/// Values of a received header, as wiremock splits them on commas
fn header_parts(request: &Request, name: &str) -> Vec<String> {
    request
        .headers
        .iter()
        .find(|(key, _)| key.as_str().eq_ignore_ascii_case(name))
        .map(|(_, values)| values.iter().map(|v| v.as_str().to_string()).collect())
        .unwrap_or_default()
}

fn expected_parts(value: &str) -> Vec<String> {
    value.split(',').map(|part| part.trim().to_string()).collect()
}

/// Matches requests that carry no `page` query parameter
fn without_page_param(request: &Request) -> bool {
    !request.url.query_pairs().any(|(key, _)| key == "page")
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

/// A search results page with links to the given page indices
fn search_page(
    series: &[(&str, &str)],
    authors: &[(&str, &str)],
    books: &[(&str, &str)],
    pages: &[u32],
) -> String {
    let items = |entries: &[(&str, &str)]| {
        entries
            .iter()
            .map(|(href, name)| format!(r#"<li><a href="{}">{}</a></li>"#, href, name))
            .collect::<String>()
    };

    let mut body = String::from("<html><body><div id=\"main\">");
    if !series.is_empty() {
        body.push_str(&format!("<h3>Найденные серии:</h3><ul>{}</ul>", items(series)));
    }
    if !authors.is_empty() {
        body.push_str(&format!("<h3>Найденные писатели:</h3><ul>{}</ul>", items(authors)));
    }
    if !books.is_empty() {
        body.push_str(&format!("<h3>Найденные книги:</h3><ul>{}</ul>", items(books)));
    }
    for page in pages {
        body.push_str(&format!(
            r#"<a href="/booksearch?page={}&amp;ask=foundation">{}</a> "#,
            page,
            page + 1
        ));
    }
    body.push_str("</div></body></html>");
    body
}

/// A series or author listing page with icon-led book lines
fn listing_page(title: &str, books: &[(&str, &str)], pager: &str) -> String {
    let lines = books
        .iter()
        .map(|(href, name)| {
            format!(
                r#"<img src="/img/b.gif"> <a href="{href}">{name}</a> - <a href="/a/55">Isaac Asimov</a> скачать <a href="{href}/fb2">(fb2)</a><br>"#
            )
        })
        .collect::<String>();

    format!(
        r#"<html><body>
        <h1 class="title">{title}</h1>
        <p class="genre"><a class="genre" href="/g/sf">Научная фантастика</a></p>
        <form>{lines}</form>
        {pager}
        </body></html>"#
    )
}

#[tokio::test]
async fn test_search_accumulates_pages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/booksearch"))
        .and(query_param("page", "0"))
        .and(query_param("ask", "foundation"))
        .respond_with(html(search_page(
            &[("/s/1", "Foundation")],
            &[("/a/55", "Isaac Asimov")],
            &[("/b/1", "Foundation"), ("/b/2", "Foundation and Empire")],
            &[0, 1],
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/booksearch"))
        .and(query_param("page", "1"))
        .respond_with(html(search_page(
            &[],
            &[],
            &[("/b/3", "Second Foundation"), ("/b/1", "Foundation")],
            &[0, 1],
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let crawler = Crawler::new(&create_test_config(&mock_server.uri())).unwrap();
    let result = crawler.crawl_search("foundation", None).await.unwrap();

    assert_eq!(result.query, "foundation");
    assert_eq!(result.total_pages, 2);
    assert_eq!(result.series.len(), 1);
    assert_eq!(result.authors.len(), 1);
    // Duplicates across pages are kept
    assert_eq!(result.books.len(), 4);
    assert_eq!(result.stats.books_count, 4);
    assert_eq!(result.stats.series_count, 1);
    assert!(result.books[0].url.ends_with("/b/1"));
    assert!(result.books[2].url.ends_with("/b/3"));
}

#[tokio::test]
async fn test_first_page_failure_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/booksearch"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let crawler = Crawler::new(&create_test_config(&mock_server.uri())).unwrap();
    let err = crawler.crawl_search("foundation", None).await.unwrap_err();

    match err {
        ScraperError::FatalFetch { url, reason } => {
            assert!(url.contains("booksearch?page=0"));
            assert_eq!(reason, "HTTP 500");
        }
        other => panic!("expected FatalFetch, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_sub_page_is_skipped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/booksearch"))
        .and(query_param("page", "0"))
        .respond_with(html(search_page(&[], &[], &[("/b/1", "One")], &[1, 2])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/booksearch"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/booksearch"))
        .and(query_param("page", "2"))
        .respond_with(html(search_page(&[], &[], &[("/b/3", "Three")], &[1, 2])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let crawler = Crawler::new(&create_test_config(&mock_server.uri())).unwrap();
    let result = crawler.crawl_search("foundation", None).await.unwrap();

    assert_eq!(result.total_pages, 3);
    let titles: Vec<&str> = result.books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["One", "Three"]);
}

#[tokio::test]
async fn test_max_pages_caps_the_walk() {
    let mock_server = MockServer::start().await;

    for page in ["0", "1"] {
        Mock::given(method("GET"))
            .and(path("/booksearch"))
            .and(query_param("page", page))
            .respond_with(html(search_page(&[], &[], &[("/b/1", "One")], &[0, 1, 2, 3, 4])))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    for page in ["2", "3", "4"] {
        Mock::given(method("GET"))
            .and(path("/booksearch"))
            .and(query_param("page", page))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;
    }

    let crawler = Crawler::new(&create_test_config(&mock_server.uri())).unwrap();
    let result = crawler.crawl_search("foundation", Some(2)).await.unwrap();

    assert_eq!(result.total_pages, 2);
    assert_eq!(result.books.len(), 2);
}

#[tokio::test]
async fn test_empty_query_fetches_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let crawler = Crawler::new(&create_test_config(&mock_server.uri())).unwrap();
    let err = crawler.crawl_search("   ", None).await.unwrap_err();
    assert!(matches!(err, ScraperError::UrlError(_)));
}

#[tokio::test]
async fn test_series_pager_drives_page_count() {
    let mock_server = MockServer::start().await;

    let pager = r#"<div class="item-list"><ul class="pager">
        <li class="pager-current">1</li>
        <li class="pager-item"><a href="/s/1?page=1">2</a></li>
        <li class="pager-item"><a href="/s/1?page=2">3</a></li>
        <li class="pager-last"><a href="/s/1?page=2">последняя »</a></li>
    </ul></div>"#;

    Mock::given(method("GET"))
        .and(path("/s/1"))
        .and(without_page_param)
        .respond_with(html(listing_page("Основание", &[("/b/100", "Основание")], pager)))
        .expect(1)
        .mount(&mock_server)
        .await;

    for (page, book) in [("1", "/b/101"), ("2", "/b/102"), ("3", "/b/103")] {
        Mock::given(method("GET"))
            .and(path("/s/1"))
            .and(query_param("page", page))
            .respond_with(html(listing_page("Основание", &[(book, "Книга")], "")))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let crawler = Crawler::new(&create_test_config(&mock_server.uri())).unwrap();
    let details = crawler
        .crawl_series(&format!("{}/s/1", mock_server.uri()), None)
        .await
        .unwrap();

    assert_eq!(details.series_info.total_pages, 4);
    assert_eq!(details.series_info.series.name, "Основание");
    assert_eq!(details.books.len(), 4);

    let book = &details.books[0];
    assert_eq!(book.authors.len(), 1);
    assert_eq!(book.download_links[0].format, "fb2");

    let context = book.discovered_under.as_ref().unwrap();
    assert_eq!(context.kind, ListingKind::Series);
    assert_eq!(context.name, "Основание");
}

#[tokio::test]
async fn test_author_crawl_collects_genres() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a/55"))
        .respond_with(html(listing_page(
            "Айзек Азимов",
            &[("/b/100", "Основание"), ("/b/102", "Я, робот")],
            "",
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let crawler = Crawler::new(&create_test_config(&mock_server.uri())).unwrap();
    let details = crawler.crawl_author("/a/55", None).await.unwrap();

    let author = &details.author_info.author;
    assert_eq!(author.name, "Айзек Азимов");
    assert_eq!(author.genres.as_ref().unwrap()[0].name, "Научная фантастика");
    assert_eq!(details.author_info.total_pages, 1);

    assert_eq!(details.books.len(), 2);
    // Author listings carry no per-book co-authors
    assert!(details.books.iter().all(|b| b.authors.is_empty()));
    assert!(details
        .books
        .iter()
        .all(|b| b.discovered_under.as_ref().unwrap().kind == ListingKind::Author));
}

#[tokio::test]
async fn test_deep_crawl_survives_failed_item() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/booksearch"))
        .respond_with(html(search_page(
            &[("/s/1", "Foundation"), ("/s/2", "Gone")],
            &[("/a/55", "Isaac Asimov")],
            &[],
            &[],
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/s/1"))
        .respond_with(html(listing_page("Foundation", &[("/b/100", "Foundation")], "")))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/s/2"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a/55"))
        .respond_with(html(listing_page("Isaac Asimov", &[("/b/100", "Foundation")], "")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let crawler = Crawler::new(&create_test_config(&mock_server.uri())).unwrap();
    let result = crawler.crawl_search("foundation", None).await.unwrap();
    assert_eq!(result.series.len(), 2);

    let details = crawler.crawl_details(&result, None).await;

    assert_eq!(details.query, "foundation");
    assert_eq!(details.series_details.len(), 1);
    assert_eq!(details.series_details[0].series_info.series.name, "Foundation");
    assert_eq!(details.authors_details.len(), 1);
    assert_eq!(details.authors_details[0].books.len(), 1);
}

#[tokio::test]
async fn test_search_results_written_to_disk() {
    let mock_server = MockServer::start().await;
    let output_dir = tempfile::TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/booksearch"))
        .respond_with(html(search_page(&[], &[], &[("/b/1", "Основание")], &[])))
        .mount(&mock_server)
        .await;

    let crawler = Crawler::new(&create_test_config(&mock_server.uri())).unwrap();
    let result = crawler.crawl_search("foundation", None).await.unwrap();

    let path = write_json_into(output_dir.path(), &search_filename("foundation"), &result).unwrap();
    let content = std::fs::read_to_string(path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();

    assert_eq!(value["total_pages"], 1);
    assert_eq!(value["books"][0]["title"], "Основание");
    assert_eq!(value["stats"]["books_count"], 1);
}

#[tokio::test]
async fn test_requests_carry_browser_header_profile() {
    let mock_server = MockServer::start().await;
    let referer = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/booksearch"))
        .and(header("referer", referer.as_str()))
        .and(header("connection", "keep-alive"))
        .respond_with(html(search_page(&[], &[], &[("/b/1", "One")], &[])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let crawler = Crawler::new(&config).unwrap();
    let result = crawler.crawl_search("foundation", None).await.unwrap();
    assert_eq!(result.books.len(), 1);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    let defaults = HttpConfig::default();
    assert!(defaults.user_agent.contains("Chrome/91"));
    assert_eq!(
        header_parts(request, "user-agent"),
        expected_parts(&defaults.user_agent)
    );
    assert_eq!(
        header_parts(request, "accept-language"),
        expected_parts(&defaults.accept_language)
    );
    assert_eq!(header_parts(request, "accept"), expected_parts(&defaults.accept));
}

#[tokio::test]
async fn test_timed_out_sub_page_is_skipped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/booksearch"))
        .and(query_param("page", "0"))
        .respond_with(html(search_page(&[], &[], &[("/b/1", "One")], &[0, 1])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/booksearch"))
        .and(query_param("page", "1"))
        .respond_with(
            html(search_page(&[], &[], &[("/b/2", "Two")], &[0, 1]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri());
    config.http = HttpConfig {
        timeout_secs: 1,
        connect_timeout_secs: 1,
        ..HttpConfig::default()
    };

    let crawler = Crawler::new(&config).unwrap();
    let result = crawler.crawl_search("foundation", None).await.unwrap();

    assert_eq!(result.total_pages, 2);
    let titles: Vec<&str> = result.books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["One"]);
}
