use pncview::config::Config;
use pncview::core::TOTAL_KEY;
use pncview::{App, FetchError, HttpTaskSource, LayoutDirection, StyleClass, TaskSource};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const TWO_TASKS: &str = r#"[
    {"name":"A","dependants":["B"],"dependencies":[],"state":"SUCCESSFUL"},
    {"name":"B","dependants":[],"dependencies":["A"],"state":"WAITING"}
]"#;

/// Serve exactly one HTTP response, after `delay`. Returns the base URL and
/// a receiver for the request line the client sent.
async fn serve_once(
    status: &'static str,
    body: &'static str,
    delay: Duration,
) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (line_tx, line_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let request = String::from_utf8_lossy(&request).to_string();
        let _ = line_tx.send(request.lines().next().unwrap_or_default().to_string());

        tokio::time::sleep(delay).await;

        let response = format!(
            concat!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\n",
                "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
            ),
            status,
            body.len(),
            body
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });

    (format!("http://{}", addr), line_rx)
}

fn config_for(base: &str) -> Config {
    Config::default().with_overrides(
        Some(base.to_string()),
        Some("https://pnc.example.com".to_string()),
    )
}

#[tokio::test]
async fn test_load_graph_from_endpoint() {
    let (base, request_line) = serve_once("200 OK", TWO_TASKS, Duration::ZERO).await;
    let config = config_for(&base);
    let source = HttpTaskSource::new(&config).unwrap();

    let mut app = App::new(config);
    app.load_graph(&source).await;

    assert_eq!(request_line.await.unwrap(), "GET /rest/tasks HTTP/1.1");

    assert_eq!(app.nodes().len(), 2);
    assert_eq!(app.nodes()[0].payload.style_class, StyleClass::Success);
    assert_eq!(app.nodes()[1].payload.style_class, StyleClass::WaitingNeutral);
    assert_eq!(
        app.nodes()[0].payload.detail_url,
        "https://pnc.example.com/pnc-web/#/builds/A"
    );
    assert_eq!(app.edges().len(), 1);
    assert_eq!(app.edges()[0].id, "A-B");

    let histogram: Vec<_> = app.histogram().iter().collect();
    assert_eq!(histogram, vec![("SUCCESSFUL", 1), ("WAITING", 1), (TOTAL_KEY, 2)]);
    assert!(app.loaded_at.is_some());
}

#[tokio::test]
async fn test_server_error_leaves_state_empty() {
    let (base, _) = serve_once("500 Internal Server Error", "oops", Duration::ZERO).await;
    let config = config_for(&base);
    let source = HttpTaskSource::new(&config).unwrap();

    let err = source.fetch_tasks().await.unwrap_err();
    assert!(matches!(err, FetchError::Status { .. }));
}

#[tokio::test]
async fn test_failed_load_keeps_prior_state() {
    let (base, _) = serve_once("200 OK", "<html>not json</html>", Duration::ZERO).await;
    let config = config_for(&base);
    let source = HttpTaskSource::new(&config).unwrap();

    let mut app = App::new(config);
    app.load_graph(&source).await;

    assert!(app.nodes().is_empty());
    assert!(app.edges().is_empty());
    assert!(app.histogram().is_empty());
    assert!(app.loaded_at.is_none());
}

#[tokio::test]
async fn test_decode_error_is_reported() {
    let (base, _) = serve_once("200 OK", r#"{"name":"A"}"#, Duration::ZERO).await;
    let source = HttpTaskSource::new(&config_for(&base)).unwrap();

    let err = source.fetch_tasks().await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn test_background_load_delivers_events() {
    let (base, _) = serve_once("200 OK", TWO_TASKS, Duration::ZERO).await;
    let config = config_for(&base);
    let source = HttpTaskSource::new(&config).unwrap();

    let mut app = App::new(config).with_direction(LayoutDirection::LeftToRight);
    app.spawn_load(source);

    let mut waited = Duration::ZERO;
    while app.nodes().is_empty() && waited < Duration::from_secs(5) {
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += Duration::from_millis(20);
        app.process_events();
    }

    assert_eq!(app.nodes().len(), 2);
    assert_eq!(app.direction(), LayoutDirection::LeftToRight);
    assert!(app.nodes()[0].position.x < app.nodes()[1].position.x);
    assert!(app.fit_pending());
}

#[tokio::test]
async fn test_late_result_ignored_after_quit() {
    let (base, _) = serve_once("200 OK", TWO_TASKS, Duration::from_millis(200)).await;
    let config = config_for(&base);
    let source = HttpTaskSource::new(&config).unwrap();

    let mut app = App::new(config);
    app.spawn_load(source);
    app.quit();

    tokio::time::sleep(Duration::from_millis(500)).await;
    app.process_events();

    assert!(app.nodes().is_empty());
    assert!(app.histogram().is_empty());
}

#[tokio::test]
async fn test_load_runs_once() {
    let (base, _) = serve_once("200 OK", TWO_TASKS, Duration::ZERO).await;
    let config = config_for(&base);
    let source = HttpTaskSource::new(&config).unwrap();

    let mut app = App::new(config);
    app.load_graph(&source).await;
    assert_eq!(app.nodes().len(), 2);

    // The one-shot server is gone; a second load must not even try
    app.load_graph(&source).await;
    assert_eq!(app.nodes().len(), 2);
}
