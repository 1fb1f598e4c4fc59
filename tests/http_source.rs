//! Exercises the HTTP odds source against a throwaway local server.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use fantasy_odds::odds::{CustomQuery, HttpOddsSource, OddsApi};
use fantasy_odds::OddsError;

/// Serve one canned HTTP response and report the request line received.
async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = sock.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let request = String::from_utf8_lossy(&buf);
        let request_line = request.lines().next().unwrap_or_default().to_string();
        let _ = tx.send(request_line);

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        sock.write_all(response.as_bytes()).await.unwrap();
        sock.shutdown().await.ok();
    });

    (base, rx)
}

#[tokio::test]
async fn test_today_snapshot_is_decoded() {
    let body = r#"{"date":"Week 9","is_live":true,
        "matchups":[{"home_team":"A","away_team":"B","home_avg":99.5,"away_avg":88.0,
                     "home_win_prob":0.62,"away_win_prob":0.37,"tie_prob":0.01,"trials":20000,
                     "home_team_url":"","away_team_url":""}],
        "proj_scores":{"A":101.0},"current_scores":{"A":44.0}}"#;
    let (base, rx) = serve_once("200 OK", body).await;
    let source = HttpOddsSource::new(&base, None).unwrap();

    let snap = source.fetch_today_snapshot().await.unwrap();
    assert_eq!(rx.await.unwrap(), "GET /odds/today HTTP/1.1");
    assert_eq!(snap.date, "Week 9");
    assert!(snap.is_live);
    assert_eq!(snap.matchups[0].home_win_prob, Some(0.62));
    assert_eq!(snap.current_scores.get("A"), Some(&44.0));
}

#[tokio::test]
async fn test_custom_matchup_sends_query() {
    let body = r#"{"home_team":"Alpha Team","away_team":"Beta","home_win_prob":0.4,"away_win_prob":0.6,"trials":500}"#;
    let (base, rx) = serve_once("200 OK", body).await;
    let source = HttpOddsSource::new(&base, None).unwrap();

    let query = CustomQuery::new(" Alpha Team ", "Beta", Some("500")).unwrap();
    let m = query.run(&source).await.unwrap();
    assert_eq!(
        rx.await.unwrap(),
        "GET /odds/custom?team1=Alpha+Team&team2=Beta&trials=500 HTTP/1.1"
    );
    assert_eq!(m.away_win_prob, Some(0.6));
    assert_eq!(m.trials, 500);
}

#[tokio::test]
async fn test_custom_matchup_defaults_to_20000_trials() {
    let body = r#"{"home_team":"Alpha","away_team":"Beta","home_win_prob":0.5,"away_win_prob":0.5,"trials":20000}"#;
    let (base, rx) = serve_once("200 OK", body).await;
    let source = HttpOddsSource::new(&base, None).unwrap();

    let m = source.fetch_custom_matchup_default("Alpha", "Beta").await.unwrap();
    assert_eq!(
        rx.await.unwrap(),
        "GET /odds/custom?team1=Alpha&team2=Beta&trials=20000 HTTP/1.1"
    );
    assert_eq!(m.trials, 20000);
}

#[tokio::test]
async fn test_error_status_carries_body_text() {
    let (base, _rx) = serve_once("404 Not Found", "Unknown team: Gamma").await;
    let source = HttpOddsSource::new(&base, None).unwrap();

    let err = source
        .fetch_custom_matchup("Gamma", "Beta", 20_000)
        .await
        .unwrap_err();
    assert_eq!(err, OddsError::Network("Unknown team: Gamma".into()));
    assert_eq!(err.to_string(), "Unknown team: Gamma");
}

#[tokio::test]
async fn test_non_json_body_is_a_decode_error() {
    let (base, _rx) = serve_once("200 OK", "<html>maintenance</html>").await;
    let source = HttpOddsSource::new(&base, None).unwrap();

    let err = source.fetch_today_snapshot().await.unwrap_err();
    assert!(matches!(err, OddsError::Decode(_)));
}

#[tokio::test]
async fn test_connection_refused_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let source = HttpOddsSource::new(&base, None).unwrap();
    let err = source.fetch_today_snapshot().await.unwrap_err();
    assert!(matches!(err, OddsError::Network(_)));
}
