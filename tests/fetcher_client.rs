use std::io::{self, Read};

use harvest::config::Config;
use harvest::extractor::{ExtractionError, ExtractorRegistry, Phase, SingleDocumentExtraction};
use harvest::fetcher::{FetchError, HttpSource};
use harvest::locator::DocumentLocator;
use harvest::mime::{self, SniffingDetector};
use harvest::stream::ByteSource;
use harvest::writer::CollectingHandler;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

/// The blocking client must not run on the async test runtime.
async fn blocking<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    tokio::task::spawn_blocking(f).await.unwrap()
}

fn fetch(url: String) -> Result<Vec<u8>, FetchError> {
    let source = HttpSource::new(&Config::default())?;
    let locator = DocumentLocator::parse(&url).unwrap();
    source.fetch(&locator).map(|bytes| bytes.to_vec())
}

#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(
                    "<html><head><title>Test</title></head><body>Hello World</body></html>"
                        .as_bytes(),
                )
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/test", mock_server.uri());
    let body = blocking(move || fetch(url)).await.unwrap();

    assert!(String::from_utf8(body).unwrap().contains("Hello World"));
}

#[tokio::test]
async fn test_fetch_404_maps_to_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/notfound"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let url = format!("{}/notfound", mock_server.uri());
    let result = blocking(move || {
        let source = HttpSource::new(&Config::default()).unwrap();
        let locator = DocumentLocator::parse(&url).unwrap();
        source.open(&locator).map(|_| ())
    })
    .await;

    match result {
        Err(err) => {
            assert_eq!(err.kind(), io::ErrorKind::NotFound);
            let inner = err.into_inner().unwrap();
            match inner.downcast_ref::<FetchError>() {
                Some(FetchError::Http { status }) => assert_eq!(status.as_u16(), 404),
                other => panic!("Expected HTTP 404 error, got {other:?}"),
            }
        }
        Ok(()) => panic!("Expected HTTP 404 error"),
    }
}

#[tokio::test]
async fn test_fetch_redirect() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/redirect"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/final"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/final"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes("<html><body>Final page</body></html>".as_bytes())
                .insert_header("Content-Type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/redirect", mock_server.uri());
    let body = blocking(move || fetch(url)).await.unwrap();

    assert!(String::from_utf8(body).unwrap().contains("Final page"));
}

#[tokio::test]
async fn test_fetch_gzip_compression() {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    let original_content =
        "<html><head><title>Compressed</title></head><body>This content is gzipped!</body></html>";

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(original_content.as_bytes()).unwrap();
    let compressed_data = encoder.finish().unwrap();

    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gzipped"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(compressed_data)
                .insert_header("Content-Type", "text/html; charset=utf-8")
                .insert_header("Content-Encoding", "gzip"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/gzipped", mock_server.uri());
    let body = blocking(move || fetch(url)).await.unwrap();

    assert_eq!(body, original_content.as_bytes());
}

#[tokio::test]
async fn test_fetch_body_too_large() {
    let mock_server = MockServer::start().await;

    // 6MB > 5MB default limit
    let large_body = "x".repeat(6 * 1024 * 1024);

    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(large_body.as_bytes())
                .insert_header("Content-Type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/large", mock_server.uri());
    let result = blocking(move || fetch(url)).await;

    match result {
        Err(FetchError::BodyTooLarge(size)) => assert_eq!(size, 6 * 1024 * 1024),
        other => panic!("Expected BodyTooLarge error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_extraction_requests_document_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/article.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(
                    r#"<html lang="en"><head><title>Remote</title>
                       <link rel="license" href="/license"></head><body></body></html>"#
                        .as_bytes(),
                )
                .insert_header("Content-Type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/article.html", mock_server.uri());
    let (report, statements) = blocking(move || {
        let source = HttpSource::new(&Config::default()).unwrap();
        let mut extraction = SingleDocumentExtraction::new(
            source,
            &url,
            ExtractorRegistry::with_defaults().group(),
            CollectingHandler::new(),
        )
        .unwrap()
        .with_detector(SniffingDetector::new());
        let report = extraction.run().unwrap();
        (report, extraction.into_output().len())
    })
    .await;

    assert_eq!(report.detected_content_type, Some(mime::TEXT_HTML));
    assert_eq!(
        report.extractor_names(),
        ["document-origin", "html-head-meta", "html-license"]
    );
    // type + source, title, license
    assert_eq!(statements, 4);
}

#[tokio::test]
async fn test_extraction_reports_fetch_failure_phase() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing.html"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let url = format!("{}/missing.html", mock_server.uri());
    let err = blocking(move || {
        let source = HttpSource::new(&Config::default()).unwrap();
        let mut extraction = SingleDocumentExtraction::new(
            source,
            &url,
            ExtractorRegistry::with_defaults().group(),
            CollectingHandler::new(),
        )
        .unwrap()
        .with_detector(SniffingDetector::new());
        extraction.run().unwrap_err()
    })
    .await;

    assert_eq!(err.phase(), Phase::Caching);
    match err {
        ExtractionError::Io { source, .. } => assert_eq!(source.kind(), io::ErrorKind::NotFound),
        other => panic!("Expected io error, got {other}"),
    }
}

#[test]
fn test_non_http_locator_is_rejected_before_any_request() {
    let source = HttpSource::new(&Config::default()).unwrap();
    let locator = DocumentLocator::parse("file:///etc/hosts").unwrap();
    let mut buf = Vec::new();
    let err = source
        .open(&locator)
        .and_then(|mut stream| stream.read_to_end(&mut buf))
        .unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_cloned_source_serves_many_documents() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes("<html><head><title>Shared</title></head></html>".as_bytes())
                .insert_header("Content-Type", "text/html"),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    let url = format!("{}/page.html", mock_server.uri());
    let titles = blocking(move || {
        let http = HttpSource::new(&Config::default()).unwrap();
        (0..3)
            .map(|_| {
                let mut extraction = SingleDocumentExtraction::new(
                    http.clone(),
                    &url,
                    ExtractorRegistry::with_defaults().group_for(["html-head-meta"]).unwrap(),
                    CollectingHandler::new(),
                )
                .unwrap();
                extraction.run().unwrap();
                extraction.into_output().len()
            })
            .collect::<Vec<_>>()
    })
    .await;

    assert_eq!(titles, [1, 1, 1]);
}
