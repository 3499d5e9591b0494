//! Integration tests for the audit pipeline
//!
//! A wiremock server plays the text-generation endpoint, another the caller's
//! webhook, and a third the site being audited.

use serde_json::{json, Value};
use seo_auditor::audit::Auditor;
use seo_auditor::config::{ModelConfig, UserAgentConfig};
use seo_auditor::crawler::build_http_client;
use seo_auditor::delivery::{DeliveryOutcome, DeliveryReporter};
use seo_auditor::model::UNAVAILABLE_RESPONSE;
use seo_auditor::pipeline::{execute, run_audit, AuditRequest, AuditScope};
use seo_auditor::AuditError;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const CREDENTIAL: &str = "secret";

fn model_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": {"choices": [{"message": {"role": "assistant", "content": content}}]}
    }))
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
}

/// Answers every prompt deterministically so reports can be traced
///
/// - deduplication keeps the first URL per leading path segment
/// - chunk audits answer `AUDIT[<url> part <n> of <m>]`
/// - syntheses return their input reports joined in order
struct ScriptedModel;

impl Respond for ScriptedModel {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();

        if prompt.contains("Reply with the representative URLs only") {
            let list = prompt.split("URLs: ").nth(1).unwrap_or_default();
            let mut seen = HashSet::new();
            let kept: Vec<&str> = list
                .split(", ")
                .filter(|entry| {
                    let key = Url::parse(entry)
                        .ok()
                        .and_then(|u| u.path_segments().and_then(|mut s| s.next()).map(str::to_string))
                        .unwrap_or_default();
                    seen.insert(key)
                })
                .collect();
            return model_reply(&kept.join(", "));
        }

        if prompt.contains("Combine them into one clear report") {
            let reports: Vec<&str> = prompt
                .lines()
                .filter(|line| line.starts_with("AUDIT["))
                .collect();
            return model_reply(&reports.join("\n"));
        }

        let part = prompt
            .split("(part ")
            .nth(1)
            .and_then(|rest| rest.split(')').next())
            .unwrap_or("?");
        let url = prompt
            .split("HTML from ")
            .nth(1)
            .and_then(|rest| rest.split_whitespace().next())
            .unwrap_or("?");
        model_reply(&format!("AUDIT[{} part {}]", url, part))
    }
}

/// Like [`ScriptedModel`], but answers chunk audits of one page with a body
/// that is not JSON
struct BrokenPageModel {
    page: Url,
}

impl Respond for BrokenPageModel {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();

        if prompt.contains(&format!("HTML from {} (part", self.page)) {
            return ResponseTemplate::new(200).set_body_string("<<not json>>");
        }
        ScriptedModel.respond(request)
    }
}

fn auditor(model: &MockServer, chunk_lines: usize) -> Auditor {
    let user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
    };
    let crawl_client = build_http_client(&user_agent, Duration::from_secs(5)).unwrap();
    let model_client = seo_auditor::model::ModelClient::new(&ModelConfig {
        endpoint: format!("{}/chat", model.uri()),
        model: "test-model".to_string(),
        connect_timeout_secs: 2,
        request_timeout_secs: 5,
        default_credential: None,
    })
    .unwrap();

    Auditor::from_parts(crawl_client, model_client, chunk_lines, 10, "TestBot".to_string())
}

fn audit_request(webhook: &MockServer, targets: Vec<Url>, scope: AuditScope) -> AuditRequest {
    AuditRequest {
        request_id: json!("req-1"),
        task_id: "task-1".to_string(),
        context_id: "ctx-1".to_string(),
        user_id: Some("user-1".to_string()),
        targets,
        scope,
        webhook_url: format!("{}/hook", webhook.uri()),
        credential: CREDENTIAL.to_string(),
    }
}

async fn mount_webhook(webhook: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(header("X-TELEX-API-KEY", CREDENTIAL))
        .respond_with(ResponseTemplate::new(status))
        .expect(1)
        .mount(webhook)
        .await;
}

async fn delivered_payload(webhook: &MockServer) -> Value {
    let requests = webhook.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "exactly one delivery expected");
    serde_json::from_slice(&requests[0].body).unwrap()
}

fn page_url(site: &MockServer, page: &str) -> Url {
    Url::parse(&format!("{}{}", site.uri(), page)).unwrap()
}

#[tokio::test]
async fn test_single_page_success_is_delivered_once() {
    let site = MockServer::start().await;
    let model = MockServer::start().await;
    let webhook = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html><title>Home</title></html>"))
        .mount(&site)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("X-TELEX-API-KEY", CREDENTIAL))
        .and(header("X-Model-ID", "test-model"))
        .respond_with(model_reply("Missing meta description."))
        .expect(1)
        .mount(&model)
        .await;
    mount_webhook(&webhook, 200).await;

    let request = audit_request(&webhook, vec![page_url(&site, "/")], AuditScope::Page);
    let outcome = run_audit(&auditor(&model, 500), &DeliveryReporter::new().unwrap(), request).await;

    assert_eq!(
        outcome,
        DeliveryOutcome::Completed {
            report: "Missing meta description.".to_string()
        }
    );

    let payload = delivered_payload(&webhook).await;
    assert_eq!(payload["jsonrpc"], "2.0");
    assert_eq!(payload["id"], "req-1");
    assert_eq!(payload["result"]["id"], "task-1");
    assert_eq!(payload["result"]["contextId"], "ctx-1");
    assert_eq!(payload["result"]["status"]["state"], "completed");
    assert_eq!(
        payload["result"]["artifacts"][0]["parts"][0]["text"],
        "Missing meta description."
    );
}

#[tokio::test]
async fn test_model_request_body_shape() {
    let site = MockServer::start().await;
    let model = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html></html>"))
        .mount(&site)
        .await;
    Mock::given(method("POST"))
        .respond_with(model_reply("ok"))
        .mount(&model)
        .await;

    auditor(&model, 500)
        .audit_page(&page_url(&site, "/"), CREDENTIAL)
        .await
        .unwrap();

    let requests = model.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["stream"], false);
    assert_eq!(body["messages"][0]["role"], "system");
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("<html></html>"));
    assert!(prompt.contains("H1 tags: 0 [] (Should have exactly 1)"));
    assert!(prompt.contains("Canonical: Missing"));
}

#[tokio::test]
async fn test_malformed_model_body_fails_once_without_further_calls() {
    let site = MockServer::start().await;
    let model = MockServer::start().await;
    let webhook = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html>\n<body>\n</html>"))
        .mount(&site)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<<not json>>"))
        .expect(1)
        .mount(&model)
        .await;
    mount_webhook(&webhook, 200).await;

    let request = audit_request(&webhook, vec![page_url(&site, "/")], AuditScope::Page);
    let outcome = run_audit(&auditor(&model, 1), &DeliveryReporter::new().unwrap(), request).await;

    assert!(matches!(outcome, DeliveryOutcome::Failed { .. }));

    let payload = delivered_payload(&webhook).await;
    assert_eq!(payload["id"], "req-1");
    assert!(payload.get("result").is_none());
    assert_eq!(payload["error"]["code"], -32603);
    assert_eq!(payload["error"]["data"]["taskId"], "task-1");
    assert_eq!(payload["error"]["data"]["task"]["status"]["state"], "failed");
}

#[tokio::test]
async fn test_model_error_status_aborts_audit() {
    let site = MockServer::start().await;
    let model = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html>\n</html>"))
        .mount(&site)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&model)
        .await;

    let result = execute(
        &auditor(&model, 1),
        AuditScope::Page,
        &[page_url(&site, "/")],
        CREDENTIAL,
    )
    .await;

    assert!(matches!(result, Err(AuditError::Model(_))));
}

#[tokio::test]
async fn test_null_content_becomes_sentinel() {
    let site = MockServer::start().await;
    let model = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html></html>"))
        .mount(&site)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"choices": [{"message": {"role": "assistant", "content": null}}]}
        })))
        .mount(&model)
        .await;

    let report = auditor(&model, 500)
        .audit_page(&page_url(&site, "/"), CREDENTIAL)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.text, UNAVAILABLE_RESPONSE);
}

#[tokio::test]
async fn test_multi_chunk_page_synthesizes_in_order() {
    let site = MockServer::start().await;
    let model = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html>\n<body>\n<h1>Hi</h1>\n</body>\n</html>"))
        .mount(&site)
        .await;
    Mock::given(method("POST"))
        .respond_with(ScriptedModel)
        .expect(4)
        .mount(&model)
        .await;

    let url = page_url(&site, "/");
    let report = auditor(&model, 2)
        .audit_page(&url, CREDENTIAL)
        .await
        .unwrap()
        .unwrap();

    let expected = (1..=3)
        .map(|n| format!("AUDIT[{} part {} of 3]", url, n))
        .collect::<Vec<_>>()
        .join("\n");
    assert_eq!(report.text, expected);
}

#[tokio::test]
async fn test_deduplication_is_idempotent() {
    let model = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ScriptedModel)
        .mount(&model)
        .await;

    let links: Vec<Url> = [
        "https://example.com/",
        "https://example.com/hotels/paris",
        "https://example.com/hotels/rome",
        "https://example.com/about",
    ]
    .iter()
    .map(|s| Url::parse(s).unwrap())
    .collect();

    let auditor = auditor(&model, 500);
    let once = auditor.dedupe_links(&links, CREDENTIAL).await.unwrap();
    let twice = auditor.dedupe_links(&once, CREDENTIAL).await.unwrap();

    assert_eq!(once.len(), 3);
    assert!(!once.iter().any(|u| u.path() == "/hotels/rome"));
    assert_eq!(once, twice);
}

#[tokio::test]
async fn test_unusable_deduplication_reply_keeps_all_links() {
    let model = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(model_reply("I could not find any patterns."))
        .mount(&model)
        .await;

    let links: Vec<Url> = ["https://example.com/a", "https://example.com/b"]
        .iter()
        .map(|s| Url::parse(s).unwrap())
        .collect();

    let kept = auditor(&model, 500)
        .dedupe_links(&links, CREDENTIAL)
        .await
        .unwrap();
    assert_eq!(kept, links);
}

#[tokio::test]
async fn test_site_audit_crawls_dedupes_and_merges() {
    let site = MockServer::start().await;
    let model = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><a href="/hotels/paris">Paris</a> <a href="/hotels/rome">Rome</a></html>"#,
        ))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/hotels/paris"))
        .respond_with(html("<html><h1>Paris</h1></html>"))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/hotels/rome"))
        .respond_with(html("<html><h1>Rome</h1></html>"))
        .mount(&site)
        .await;
    // deduplication, two single-chunk pages, final synthesis
    Mock::given(method("POST"))
        .respond_with(ScriptedModel)
        .expect(4)
        .mount(&model)
        .await;

    let report = execute(
        &auditor(&model, 500),
        AuditScope::Site,
        &[page_url(&site, "/")],
        CREDENTIAL,
    )
    .await
    .unwrap();

    let expected = format!(
        "AUDIT[{} part 1 of 1]\nAUDIT[{} part 1 of 1]",
        page_url(&site, "/"),
        page_url(&site, "/hotels/paris")
    );
    assert_eq!(report.text, expected);
}

#[tokio::test]
async fn test_site_audit_stops_at_first_malformed_model_body() {
    let site = MockServer::start().await;
    let model = MockServer::start().await;
    let webhook = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<html><a href="/about">About</a></html>"#))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html("<html>\n<h1>About</h1>\n</html>"))
        .mount(&site)
        .await;
    // deduplication, the home page chunk, then the first about chunk fails;
    // no later chunk and no final synthesis
    Mock::given(method("POST"))
        .respond_with(BrokenPageModel {
            page: page_url(&site, "/about"),
        })
        .expect(3)
        .mount(&model)
        .await;
    mount_webhook(&webhook, 200).await;

    let request = audit_request(&webhook, vec![page_url(&site, "/")], AuditScope::Site);
    let outcome = run_audit(&auditor(&model, 1), &DeliveryReporter::new().unwrap(), request).await;

    assert!(matches!(outcome, DeliveryOutcome::Failed { .. }));

    let prompts: Vec<String> = model
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| {
            let body: Value = serde_json::from_slice(&r.body).unwrap();
            body["messages"][0]["content"].as_str().unwrap_or_default().to_string()
        })
        .collect();
    assert!(prompts[0].contains("Reply with the representative URLs only"));
    assert!(prompts[1].contains(&format!("HTML from {} (part 1 of 1)", page_url(&site, "/"))));
    assert!(prompts[2].contains(&format!("HTML from {} (part 1 of 3)", page_url(&site, "/about"))));
    assert!(!prompts.iter().any(|p| p.contains("Combine them into one clear report")));

    let payload = delivered_payload(&webhook).await;
    assert!(payload.get("result").is_none());
    assert_eq!(payload["error"]["data"]["taskId"], "task-1");
    assert_eq!(payload["error"]["data"]["task"]["status"]["state"], "failed");
}

#[tokio::test]
async fn test_unreachable_page_delivers_one_failure() {
    let model = MockServer::start().await;
    let webhook = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(model_reply("unused"))
        .expect(0)
        .mount(&model)
        .await;
    mount_webhook(&webhook, 200).await;

    let target = Url::parse("http://127.0.0.1:9/").unwrap();
    let request = audit_request(&webhook, vec![target], AuditScope::Page);
    let outcome = run_audit(&auditor(&model, 500), &DeliveryReporter::new().unwrap(), request).await;

    match outcome {
        DeliveryOutcome::Failed { message } => assert!(message.contains("127.0.0.1:9")),
        other => panic!("expected failure, got {:?}", other),
    }

    let payload = delivered_payload(&webhook).await;
    assert_eq!(payload["error"]["data"]["taskId"], "task-1");
}

#[tokio::test]
async fn test_rejected_webhook_is_not_retried() {
    let site = MockServer::start().await;
    let model = MockServer::start().await;
    let webhook = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html></html>"))
        .mount(&site)
        .await;
    Mock::given(method("POST"))
        .respond_with(model_reply("fine"))
        .mount(&model)
        .await;
    mount_webhook(&webhook, 500).await;

    let request = audit_request(&webhook, vec![page_url(&site, "/")], AuditScope::Page);
    let outcome = run_audit(&auditor(&model, 500), &DeliveryReporter::new().unwrap(), request).await;

    assert_eq!(
        outcome,
        DeliveryOutcome::Completed {
            report: "fine".to_string()
        }
    );
    assert_eq!(webhook.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unreachable_webhook_still_returns_outcome() {
    let site = MockServer::start().await;
    let model = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html></html>"))
        .mount(&site)
        .await;
    Mock::given(method("POST"))
        .respond_with(model_reply("fine"))
        .expect(1)
        .mount(&model)
        .await;

    let mut request = audit_request(&model, vec![page_url(&site, "/")], AuditScope::Page);
    request.webhook_url = "http://127.0.0.1:9/hook".to_string();
    let outcome = run_audit(&auditor(&model, 500), &DeliveryReporter::new().unwrap(), request).await;

    assert_eq!(
        outcome,
        DeliveryOutcome::Completed {
            report: "fine".to_string()
        }
    );
}
