//! Webhook server tests against a real listener.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mastermind::bot::{Composer, Messenger, Outgoing, Router, RouterConfig, SessionStore};
use mastermind::providers::{Provider, ProviderError, ProviderSelector};
use mastermind::webhook::{self, LIVENESS_TEXT, WorkerPool};

#[derive(Default)]
struct RecordingMessenger {
    sent: Mutex<Vec<(i64, String)>>,
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, chat_id: i64, message: Outgoing) -> Result<i64, String> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((chat_id, message.text));
        Ok(sent.len() as i64)
    }

    async fn send_document(
        &self,
        _chat_id: i64,
        _data: Vec<u8>,
        _file_name: &str,
        _caption: Option<&str>,
    ) -> Result<i64, String> {
        Ok(0)
    }

    async fn send_typing(&self, _: i64) -> Result<(), String> {
        Ok(())
    }

    async fn delete_message(&self, _: i64, _: i64) -> Result<(), String> {
        Ok(())
    }

    async fn download_file(&self, _: &str) -> Result<Vec<u8>, String> {
        Err("no files here".to_string())
    }
}

struct Echo;

#[async_trait]
impl Provider for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn label(&self) -> &'static str {
        "Echo"
    }

    async fn answer(&self, query: &str) -> Result<String, ProviderError> {
        Ok(query.to_string())
    }
}

#[async_trait]
impl Composer for Echo {
    async fn compose(&self, prompt: &str) -> Result<String, ProviderError> {
        Ok(prompt.to_string())
    }
}

async fn start_server() -> (String, Arc<RecordingMessenger>) {
    let messenger = Arc::new(RecordingMessenger::default());
    let router = Router::new(
        RouterConfig::default(),
        messenger.clone(),
        SessionStore::new(100, None),
        ProviderSelector::new(vec![Arc::new(Echo) as Arc<dyn Provider>]).unwrap(),
        Arc::new(Echo),
    );
    let pool = Arc::new(WorkerPool::new(Arc::new(router), 2));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(webhook::serve(listener, pool));
    (format!("http://{addr}"), messenger)
}

fn start_update(chat_id: i64) -> serde_json::Value {
    serde_json::json!({
        "update_id": 10001,
        "message": {
            "message_id": 1,
            "date": 1700000000,
            "chat": { "id": chat_id, "type": "private", "first_name": "Test" },
            "from": { "id": chat_id, "is_bot": false, "first_name": "Test" },
            "text": "/start"
        }
    })
}

#[tokio::test]
async fn test_liveness() {
    let (base, _) = start_server().await;
    let response = reqwest::get(format!("{base}/")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), LIVENESS_TEXT);
}

#[tokio::test]
async fn test_json_update_is_accepted_and_handled() {
    let (base, messenger) = start_server().await;
    let response = reqwest::Client::new()
        .post(format!("{base}/webhook"))
        .json(&start_update(4242))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "");

    // Handling happens in the background
    for _ in 0..100 {
        if !messenger.sent.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let sent = messenger.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, 4242);
    assert!(sent[0].1.contains("Ultimate AI Mastermind"));
}

#[tokio::test]
async fn test_json_with_charset_is_accepted() {
    let (base, _) = start_server().await;
    let response = reqwest::Client::new()
        .post(format!("{base}/webhook"))
        .header("content-type", "application/json; charset=utf-8")
        .body(start_update(1).to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_wrong_content_type_is_forbidden() {
    let (base, messenger) = start_server().await;
    let response = reqwest::Client::new()
        .post(format!("{base}/webhook"))
        .header("content-type", "text/plain")
        .body(start_update(1).to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(messenger.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_update_is_forbidden() {
    let (base, _) = start_server().await;
    let response = reqwest::Client::new()
        .post(format!("{base}/webhook"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}
