use reqwest::Client;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::tunnel::{render, request_tunnel, TunnelOutcome};

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["postboard-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_tunnel_with_defaults() {
    let cli = Cli::try_parse_from(["postboard-cli", "tunnel"]).expect("expected valid cli args");
    match cli.command {
        Some(Commands::Tunnel { port, service_url }) => {
            assert_eq!(port, 8000);
            if std::env::var("LOCALTUNNEL_URL").is_err() {
                assert_eq!(service_url, "https://api.localtunnel.me");
            }
        }
        other => panic!("expected tunnel command, got {other:?}"),
    }
}

#[test]
fn parses_tunnel_port_override() {
    let cli = Cli::try_parse_from(["postboard-cli", "tunnel", "--port", "3000"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Tunnel { port: 3000, .. })
    ));
}

#[test]
fn rejects_invalid_port() {
    assert!(Cli::try_parse_from(["postboard-cli", "tunnel", "--port", "70000"]).is_err());
}

#[test]
fn parses_weekly_posts_command() {
    let cli =
        Cli::try_parse_from(["postboard-cli", "weekly-posts"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::WeeklyPosts)));
}

#[tokio::test]
async fn tunnel_success_prints_url_and_redirect_uri() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tunnels"))
        .and(body_json(serde_json::json!({ "port": 8000 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "quiet-owl-12",
            "url": "https://quiet-owl-12.loca.lt",
            "port": 41234,
            "max_conn_count": 10
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = request_tunnel(&Client::new(), &server.uri(), 8000).await;
    assert_eq!(
        render(&outcome),
        vec![
            "HTTPS URL: https://quiet-owl-12.loca.lt".to_string(),
            "Facebook redirect URI should be: https://quiet-owl-12.loca.lt/facebook/callback"
                .to_string(),
        ]
    );
}

#[tokio::test]
async fn tunnel_without_url_reports_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "url": "" })))
        .mount(&server)
        .await;

    let outcome = request_tunnel(&Client::new(), &server.uri(), 8000).await;
    assert!(matches!(outcome, Ok(TunnelOutcome::MissingUrl)));
    assert_eq!(
        render(&outcome),
        vec!["Failed to get HTTPS URL from localtunnel".to_string()]
    );
}

#[tokio::test]
async fn tunnel_non_200_reports_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let outcome = request_tunnel(&Client::new(), &server.uri(), 8000).await;
    assert!(matches!(
        outcome,
        Ok(TunnelOutcome::Rejected(status)) if status.as_u16() == 503
    ));
    assert_eq!(render(&outcome), vec!["Failed to create tunnel".to_string()]);
}

#[tokio::test]
async fn tunnel_undecodable_body_suggests_manual_approach() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let outcome = request_tunnel(&Client::new(), &server.uri(), 8000).await;
    let lines = render(&outcome);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Error: "));
    assert_eq!(
        lines[1],
        "Manual approach: Use https://ngrok.com or https://serveo.net"
    );
}

#[tokio::test]
async fn tunnel_connection_refused_suggests_manual_approach() {
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        format!("http://{}", listener.local_addr().expect("local addr"))
    };

    let outcome = request_tunnel(&Client::new(), &uri, 8000).await;
    assert!(matches!(&outcome, Err(e) if e.is_connect()));
    let lines = render(&outcome);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Error: "));
    assert_eq!(
        lines[1],
        "Manual approach: Use https://ngrok.com or https://serveo.net"
    );
}
