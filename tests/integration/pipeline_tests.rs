//! Integration tests for the extraction and resolution pipeline
//!
//! These tests use wiremock to stand in for a source website and its
//! embed hosts and exercise listings, details, units and media end-to-end.

use futures::{StreamExt, TryStreamExt};
use kagami::config::parse_config;
use kagami::fetch::Fetcher;
use kagami::model::{CatalogEntry, EntryStatus, MirrorLocator, SearchQuery};
use kagami::resolve::{Embed, HostRegistry};
use kagami::{KagamiError, Source};
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SOURCE_TEMPLATE: &str = r#"
[source]
name = "Mock Stream"
base-url = "BASE"
max-concurrency = 2
timeout-secs = 5
tolerated-statuses = [404]

[headers]
user-agent = "KagamiTest/1.0"

[[listing]]
name = "popular"
url = "/popular/{page}/"
item-selector = "article.bs a.tip"
next-page-selector = "a.next"
max-pages = 3
fields.url = { read = { attr = "href" } }
fields.title = { selectors = ["h2"], required = true }
fields.thumbnail = { selectors = ["img"], read = { attr = "src" }, parse = "url" }

[[listing]]
name = "latest"
url = "/latest/{page}"
item-selector = "article.bs a.tip"
next-page-selector = "a.next"
dedupe = true
fields.url = { read = { attr = "href" } }
fields.title = { selectors = ["h2"] }

[[listing]]
name = "search"
url = "/search/{page}?q={query}"
item-selector = "article.bs a.tip"
fields.url = { read = { attr = "href" } }
fields.title = { selectors = ["h2"] }

[details]
fields.title = { selectors = [".title-v2", ".title-old"], required = true }
fields.status = { selectors = [".status"], parse = "status" }
fields.synopsis = { selectors = [".synopsis"] }
fields.tags = { selectors = [".genres a"], multiple = true }

[units]
layout = "LAYOUT"
item-selector = "ul.episodes li"
group-selector = "div.seasons a"
page-order = "oldest-first"
order = "oldest-first"
fields.url = { selectors = ["a"], read = { attr = "href" } }
fields.name = { selectors = ["a"] }

[media]
mirror-selector = "select.mirror option"
"#;

/// Creates a source pointed at the mock server
fn create_test_source(base_url: &str, layout: &str) -> Source {
    let toml = SOURCE_TEMPLATE
        .replace("BASE", base_url)
        .replace("LAYOUT", layout);
    let config = parse_config(&toml).expect("Failed to parse test config");
    Source::new(config).expect("Failed to create source")
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.into())
        .insert_header("content-type", "text/html")
}

fn listing_page(entries: &[(&str, &str)], has_next: bool) -> String {
    let mut body = String::from("<html><body><div class=\"listupd\">");
    for (href, title) in entries {
        body.push_str(&format!(
            r#"<article class="bs"><a class="tip" href="{}"><img src="/img{}cover.jpg"><h2>{}</h2></a></article>"#,
            href, href, title
        ));
    }
    body.push_str("</div>");
    if has_next {
        body.push_str(r##"<a class="next" href="#">Next</a>"##);
    }
    body.push_str("</body></html>");
    body
}

async fn collect_listing(source: &Source, name: &str) -> Result<Vec<CatalogEntry>, KagamiError> {
    source.listing(name)?.try_concat().await
}

#[tokio::test]
async fn test_listing_respects_page_cap_when_next_is_always_present() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/popular/\d+/$"))
        .respond_with(html(listing_page(&[("/anime/frieren/", "Frieren")], true)))
        .expect(3)
        .mount(&mock_server)
        .await;

    let source = create_test_source(&mock_server.uri(), "flat");
    let entries = collect_listing(&source, "popular").await.unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].identifier, "/anime/frieren/");
    assert_eq!(
        entries[0].thumbnail_url,
        Some(format!("{}/img/anime/frieren/cover.jpg", mock_server.uri()))
    );
}

#[tokio::test]
async fn test_listing_dedupes_across_pages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/latest/1"))
        .respond_with(html(listing_page(
            &[("/anime/x/", "X"), ("/anime/a/", "A")],
            true,
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/latest/2"))
        .respond_with(html(listing_page(
            &[("/anime/x/", "X"), ("/anime/b/", "B")],
            false,
        )))
        .mount(&mock_server)
        .await;

    let source = create_test_source(&mock_server.uri(), "flat");
    let entries = collect_listing(&source, "latest").await.unwrap();

    let ids: Vec<&str> = entries.iter().map(|e| e.identifier.as_str()).collect();
    assert_eq!(ids, vec!["/anime/x/", "/anime/a/", "/anime/b/"]);
}

#[tokio::test]
async fn test_listing_is_lazy() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/popular/\d+/$"))
        .respond_with(html(listing_page(&[("/anime/frieren/", "Frieren")], true)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = create_test_source(&mock_server.uri(), "flat");
    let first: Vec<CatalogEntry> = source
        .listing("popular")
        .unwrap()
        .take(1)
        .try_concat()
        .await
        .unwrap();

    assert_eq!(first.len(), 1);
}

#[tokio::test]
async fn test_details_fallback_chain() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/anime/frieren/"))
        .respond_with(html(
            r#"<html><body>
            <h1 class="title-old">Sousou no Frieren</h1>
            <span class="status">Status: Completed</span>
            <div class="synopsis"> An elf mage   looks back. </div>
            <div class="genres"><a>Fantasy</a><a>Adventure</a></div>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let source = create_test_source(&mock_server.uri(), "flat");
    let entry = source.details("/anime/frieren/").await.unwrap();

    assert_eq!(entry.title, "Sousou no Frieren");
    assert_eq!(entry.identifier, "/anime/frieren/");
    assert_eq!(entry.status, EntryStatus::Completed);
    assert_eq!(entry.synopsis.as_deref(), Some("An elf mage looks back."));
    assert!(entry.tags.contains("Fantasy"));
    assert_eq!(entry.tags.len(), 2);
}

#[tokio::test]
async fn test_details_missing_title_is_layout_change() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/anime/broken/"))
        .respond_with(html("<html><body><h1 class=\"title-v3\">New layout</h1></body></html>"))
        .mount(&mock_server)
        .await;

    let source = create_test_source(&mock_server.uri(), "flat");
    let result = source.details("/anime/broken/").await;

    assert!(matches!(
        result,
        Err(KagamiError::RequiredFieldMissing { ref field, .. }) if field == "title"
    ));
}

#[tokio::test]
async fn test_listing_layout_change_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/latest/1"))
        .respond_with(html(
            r#"<article class="bs"><a class="tip" href="/anime/x/"><h3>X</h3></a></article>"#,
        ))
        .mount(&mock_server)
        .await;

    let source = create_test_source(&mock_server.uri(), "flat");
    let result = collect_listing(&source, "latest").await;

    assert!(matches!(
        result,
        Err(KagamiError::RequiredFieldMissing { ref field, .. }) if field == "title"
    ));
}

#[tokio::test]
async fn test_listing_identifiers_round_trip_to_details() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/popular/\d+/$"))
        .respond_with(html(listing_page(
            &[("/anime/frieren/", "Frieren"), ("/anime/dandadan/", "Dandadan")],
            false,
        )))
        .mount(&mock_server)
        .await;

    for (slug, title) in [("frieren", "Sousou no Frieren"), ("dandadan", "Dandadan")] {
        Mock::given(method("GET"))
            .and(path(format!("/anime/{}/", slug)))
            .respond_with(html(format!(
                r#"<html><body><h1 class="title-v2">{}</h1></body></html>"#,
                title
            )))
            .mount(&mock_server)
            .await;
    }

    let source = create_test_source(&mock_server.uri(), "flat");
    let entries = collect_listing(&source, "popular").await.unwrap();
    assert_eq!(entries.len(), 2);

    for entry in entries {
        let details = source.details(&entry.identifier).await.unwrap();
        assert!(!details.title.is_empty());
        assert_eq!(details.identifier, entry.identifier);
    }
}

#[tokio::test]
async fn test_search_tolerated_status_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let source = create_test_source(&mock_server.uri(), "flat");
    let page = source
        .search(&SearchQuery::Text("nothing here".to_string()), 1)
        .await
        .unwrap();

    assert!(page.items.is_empty());
    assert!(!page.has_next);
}

#[tokio::test]
async fn test_search_deep_link_fetches_details() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/anime/frieren"))
        .respond_with(html(r#"<h1 class="title-v2">Frieren</h1>"#))
        .mount(&mock_server)
        .await;

    let source = create_test_source(&mock_server.uri(), "flat");
    let link = format!("{}/anime/frieren", mock_server.uri());
    let query = source.deep_link_query(&link).unwrap();
    let page = source.search(&query, 1).await.unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].title, "Frieren");
    assert_eq!(page.items[0].identifier, "/anime/frieren");
}

#[tokio::test]
async fn test_deep_link_under_base_path_round_trips() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/es/anime/x/"))
        .respond_with(html(r#"<h1 class="title-v2">X</h1>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let base_url = format!("{}/es/", mock_server.uri());
    let source = create_test_source(&base_url, "flat");
    let query = source
        .deep_link_query(&format!("{}anime/x/", base_url))
        .unwrap();
    let page = source.search(&query, 1).await.unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].identifier, "/es/anime/x/");
}

#[tokio::test]
async fn test_default_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/anime/frieren/"))
        .and(header("user-agent", "KagamiTest/1.0"))
        .respond_with(html(r#"<h1 class="title-v2">Frieren</h1>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = create_test_source(&mock_server.uri(), "flat");
    source.details("/anime/frieren/").await.unwrap();
}

#[tokio::test]
async fn test_grouped_units_absorb_failing_group() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/anime/show/"))
        .respond_with(html(
            r#"<div class="seasons">
                <a href="/anime/show/season-a">Season A</a>
                <a href="/anime/show/season-b">Season B</a>
            </div>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/anime/show/season-a"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/anime/show/season-b"))
        .respond_with(html(
            r#"<ul class="episodes">
                <li><a href="/show-episode-1/">Episode 1</a></li>
                <li><a href="/show-episode-2/">Episode 2</a></li>
                <li><a href="/show-episode-3/">Episode 3</a></li>
                <li><a href="/show-special/">Special</a></li>
                <li><a href="/show-episode-4/">Episode 4</a></li>
            </ul>"#,
        ))
        .mount(&mock_server)
        .await;

    let source = create_test_source(&mock_server.uri(), "grouped");
    let units = source.units("/anime/show/").await.unwrap();

    assert_eq!(units.len(), 5);
    assert!(units.iter().all(|u| u.group.as_deref() == Some("Season B")));

    let ordinals: Vec<f64> = units.iter().map(|u| u.ordinal).collect();
    assert_eq!(ordinals, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    assert_eq!(units[0].name, "Special");
    assert!(!units[0].has_known_ordinal());
}

#[tokio::test]
async fn test_grouped_units_keep_seasons_contiguous() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/show/"))
        .respond_with(html(
            r#"<div class="seasons">
                <a href="/show/season-1">Season 1</a>
                <a href="/show/season-2">Season 2</a>
            </div>"#,
        ))
        .mount(&mock_server)
        .await;

    for season in 1..=2 {
        Mock::given(method("GET"))
            .and(path(format!("/show/season-{}", season)))
            .respond_with(html(format!(
                r#"<ul class="episodes">
                    <li><a href="/s{s}e1">Episode 1</a></li>
                    <li><a href="/s{s}e2">Episode 2</a></li>
                </ul>"#,
                s = season
            )))
            .mount(&mock_server)
            .await;
    }

    let source = create_test_source(&mock_server.uri(), "grouped");
    let units = source.units("/show/").await.unwrap();

    let locators: Vec<&str> = units.iter().map(|u| u.locator.as_str()).collect();
    assert_eq!(locators, vec!["/s1e1", "/s1e2", "/s2e1", "/s2e2"]);
    assert_eq!(units[2].group.as_deref(), Some("Season 2"));
}

#[tokio::test]
async fn test_flat_units_propagate_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/anime/show/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let source = create_test_source(&mock_server.uri(), "flat");
    let result = source.units("/anime/show/").await;

    match result {
        Err(e) => {
            assert!(e.is_network());
            assert!(matches!(e, KagamiError::Status { status: 503, .. }));
        }
        Ok(units) => panic!("expected a network error, got {} units", units.len()),
    }
}

#[tokio::test]
async fn test_media_concatenates_recognized_mirrors() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/show-episode-1/"))
        .respond_with(html(format!(
            r#"<select class="mirror">
                <option value="">Select Server</option>
                <option value="{base}/streamtape/e/abc">Streamtape</option>
                <option value="{base}/mixdrop/e/xyz">MixDrop</option>
                <option value="{base}/unknownhost/e/1">Mystery</option>
            </select>"#,
            base = base_url
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/streamtape/e/abc"))
        .respond_with(html(
            r#"<script>document.getElementById('robotlink').innerHTML = '//tapecontent.example/get_video?id=abc&token=' + ('xcdt0k').substring(3);</script>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/mixdrop/e/xyz"))
        .respond_with(html(
            r#"<script>eval(function(p,a,c,k,e,d){while(c--)if(k[c])p=p.replace(new RegExp('\\b'+c.toString(a)+'\\b','g'),k[c]);return p}('0.1="//2.3/4/5.6";',10,7,'MDCore|wurl|delivery|example|v|abc|mp4'.split('|'),0,{}))</script>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/unknownhost/e/1"))
        .respond_with(html("<p>never requested</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let source = create_test_source(&base_url, "flat");
    let media = source.media("/show-episode-1/").await.unwrap();

    let urls: Vec<&str> = media.iter().map(|m| m.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://tapecontent.example/get_video?id=abc&token=t0k",
            "https://delivery.example/v/abc.mp4",
        ]
    );
    assert_eq!(media[1].headers.get("Origin"), Some(&base_url));
}

#[tokio::test]
async fn test_media_from_packed_locator_sorted_by_quality() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/filemoon/e/fm1"))
        .respond_with(html(
            r#"<script>jwplayer("vplayer").setup({sources:[{file:"https://cdn.example/fm/master.m3u8",label:"1080p"}],tracks:[{file:"https://cdn.example/fm/en.vtt",label:"English",kind:"captions"}]});</script>"#,
        ))
        .mount(&mock_server)
        .await;

    let mut locator = MirrorLocator::default();
    locator.push(format!("{}/files/ep1.mp4", base_url), "SUB");
    locator.push(format!("{}/filemoon/e/fm1", base_url), "SUB");

    let source = create_test_source(&base_url, "flat");
    let media = source.media(&locator.encode().unwrap()).await.unwrap();

    assert_eq!(media.len(), 2);
    assert_eq!(media[0].server, "Filemoon");
    assert_eq!(media[0].numeric_quality(), 1080);
    assert_eq!(media[0].subtitles.len(), 1);
    assert_eq!(media[0].language, "SUB");
    assert_eq!(media[1].server, "Direct");
}

#[tokio::test]
async fn test_dood_pass_md5_flow() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let embed_url = format!("{}/dood/e/abc123", base_url);

    Mock::given(method("GET"))
        .and(path("/dood/e/abc123"))
        .respond_with(html(
            r#"<script>$.get('/pass_md5/9876-54-321/tok987', function(data) { });</script>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pass_md5/9876-54-321/tok987"))
        .and(header("referer", embed_url.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string("https://cdn.example/dl/prefix-"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let toml = SOURCE_TEMPLATE
        .replace("BASE", &base_url)
        .replace("LAYOUT", "flat");
    let config = parse_config(&toml).unwrap();
    let fetcher = Fetcher::new(&config.source, &config.headers).unwrap();
    let registry = HostRegistry::with_builtin_hosts();

    let media = registry
        .resolve_one(&fetcher, &Embed::new(embed_url.clone()))
        .await
        .unwrap();

    assert_eq!(media.len(), 1);
    let url = &media[0].url;
    assert!(url.starts_with("https://cdn.example/dl/prefix-"));
    assert!(url.contains("?token=tok987&expiry="));
    assert_eq!(
        media[0].headers.get("Referer"),
        Some(&format!("{}/", base_url))
    );
}

#[tokio::test]
async fn test_source_from_config_file() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    let toml = SOURCE_TEMPLATE
        .replace("BASE", "https://site.example")
        .replace("LAYOUT", "grouped");
    file.write_all(toml.as_bytes()).unwrap();

    let source = Source::from_path(file.path()).unwrap();
    assert_eq!(source.name(), "Mock Stream");

    let caps = source.capabilities();
    assert!(caps.search);
    assert!(caps.media);
    assert_eq!(caps.listings, vec!["popular".to_string(), "latest".to_string()]);
}
