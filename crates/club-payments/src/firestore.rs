//! Firestore Recorder
//!
//! Writes the payment fields to `users/{uid}` through the Firestore REST API,
//! touching only those fields (`updateMask`).

use std::cell::RefCell;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::{PaymentError, Result};
use crate::provider::TxHash;
use crate::recorder::{PaymentRecord, PaymentRecorder, SignedInUser};

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

const USERS_COLLECTION: &str = "users";

const PAYMENT_FIELDS: [&str; 3] = [
    "registrationPaid",
    "registrationTxHash",
    "registrationPaidAt",
];

/// Firestore connection settings
#[derive(Clone, Debug)]
pub struct FirestoreConfig {
    pub project_id: String,

    /// Web API key, appended as `key=` when set
    pub api_key: Option<String>,

    /// REST root; point at the emulator for local runs
    pub base_url: String,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.into(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let project_id = std::env::var("FIREBASE_PROJECT_ID")
            .map_err(|_| PaymentError::Config("FIREBASE_PROJECT_ID not set".into()))?;
        let api_key = std::env::var("FIREBASE_API_KEY").ok();
        let base_url =
            std::env::var("FIRESTORE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        Ok(Self {
            project_id,
            api_key,
            base_url,
        })
    }

    /// REST URL of a user's document, with the payment-field update mask and
    /// an existence precondition
    pub fn user_document_url(&self, uid: &str) -> String {
        let mut url = format!(
            "{}/projects/{}/databases/(default)/documents/{USERS_COLLECTION}/{uid}",
            self.base_url.trim_end_matches('/'),
            self.project_id,
        );
        let mask = PAYMENT_FIELDS
            .iter()
            .map(|field| format!("updateMask.fieldPaths={field}"))
            .collect::<Vec<_>>()
            .join("&");
        url.push('?');
        url.push_str(&mask);
        // update only; a missing user document is an error, not created
        url.push_str("&currentDocument.exists=true");
        if let Some(key) = &self.api_key {
            url.push_str("&key=");
            url.push_str(key);
        }
        url
    }
}

/// Firestore document body for a payment record
pub fn document_fields(record: &PaymentRecord) -> Value {
    json!({
        "fields": {
            "registrationPaid": { "booleanValue": record.registration_paid },
            "registrationTxHash": { "stringValue": record.registration_tx_hash.as_str() },
            "registrationPaidAt": {
                "timestampValue": record
                    .registration_paid_at
                    .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
            },
        }
    })
}

pub struct FirestoreRecorder {
    client: reqwest::Client,
    config: FirestoreConfig,
    user: RefCell<Option<SignedInUser>>,
}

impl FirestoreRecorder {
    pub fn new(config: FirestoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            user: RefCell::new(None),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(FirestoreConfig::from_env()?))
    }

    pub fn sign_in(&self, user: SignedInUser) {
        tracing::debug!(uid = %user.uid, "Recorder user signed in");
        *self.user.borrow_mut() = Some(user);
    }

    pub fn sign_out(&self) {
        self.user.borrow_mut().take();
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }
}

#[async_trait(?Send)]
impl PaymentRecorder for FirestoreRecorder {
    async fn record(&self, plan_id: &str, tx_hash: &TxHash) -> Result<PaymentRecord> {
        let user = self.user.borrow().clone().ok_or_else(|| {
            tracing::error!(plan_id, "User not authenticated, payment not recorded");
            PaymentError::NotAuthenticated
        })?;

        let record = PaymentRecord::paid(&user.uid, tx_hash.clone());
        let mut request = self
            .client
            .patch(self.config.user_document_url(&user.uid))
            .json(&document_fields(&record));
        if let Some(token) = &user.id_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PaymentError::RecordWriteFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::RecordWriteFailed(format!("{status}: {body}")));
        }

        tracing::info!(plan_id, uid = %user.uid, tx_hash = %tx_hash, "Payment status updated in Firestore");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    #[test]
    fn test_user_document_url() {
        let mut config = FirestoreConfig::new("clubconnect");
        let url = config.user_document_url("u1");
        assert_eq!(
            url,
            "https://firestore.googleapis.com/v1/projects/clubconnect/databases/(default)/documents/users/u1\
             ?updateMask.fieldPaths=registrationPaid\
             &updateMask.fieldPaths=registrationTxHash\
             &updateMask.fieldPaths=registrationPaidAt\
             &currentDocument.exists=true"
        );

        config.api_key = Some("k".into());
        config.base_url = "http://localhost:8080/v1/".into();
        assert!(config.user_document_url("u1").starts_with("http://localhost:8080/v1/projects/"));
        assert!(config.user_document_url("u1").ends_with("&key=k"));
    }

    #[test]
    fn test_document_fields() {
        let record = PaymentRecord::paid("u1", TxHash::new("0xfeed"));
        let body = document_fields(&record);
        assert_eq!(body["fields"]["registrationPaid"]["booleanValue"], true);
        assert_eq!(body["fields"]["registrationTxHash"]["stringValue"], "0xfeed");
        assert!(
            body["fields"]["registrationPaidAt"]["timestampValue"]
                .as_str()
                .unwrap()
                .ends_with('Z')
        );
    }

    /// Serve one HTTP response and hand back the raw request
    async fn serve_once(status_line: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/v1", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];
            while !request_complete(&request) {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }

            let body = r#"{"error":{"code":404,"status":"NOT_FOUND"}}"#;
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (base_url, server)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        request.len() >= header_end + 4 + content_length
    }

    fn recorder_at(base_url: String) -> FirestoreRecorder {
        let mut config = FirestoreConfig::new("clubconnect");
        config.base_url = base_url;
        let recorder = FirestoreRecorder::new(config);
        recorder.sign_in(SignedInUser::new("u1").with_id_token("tok"));
        recorder
    }

    #[tokio::test]
    async fn test_record_patches_user_document() {
        let (base_url, server) = serve_once("200 OK").await;
        let recorder = recorder_at(base_url);

        let record = recorder.record("clubPayment", &TxHash::new("0xfeed")).await.unwrap();
        let request = server.await.unwrap();

        assert_eq!(record.user_id, "u1");
        assert!(request.starts_with("PATCH /v1/projects/clubconnect/"));
        assert!(request.contains("/documents/users/u1?"));
        assert!(request.contains("currentDocument.exists=true"));
        assert!(request.to_lowercase().contains("authorization: bearer tok"));
        assert!(request.contains(r#""stringValue":"0xfeed""#));
    }

    #[tokio::test]
    async fn test_rejected_write_is_record_failure() {
        let (base_url, server) = serve_once("404 Not Found").await;
        let recorder = recorder_at(base_url);

        let err = recorder
            .record("clubPayment", &TxHash::new("0xfeed"))
            .await
            .unwrap_err();
        server.await.unwrap();

        match err {
            PaymentError::RecordWriteFailed(detail) => {
                assert!(detail.starts_with("404"), "{detail}");
                assert!(detail.contains("NOT_FOUND"), "{detail}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_store_is_record_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/v1", listener.local_addr().unwrap());
        drop(listener);
        let recorder = recorder_at(base_url);

        let err = recorder
            .record("clubPayment", &TxHash::new("0xfeed"))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::RecordWriteFailed(_)), "{err:?}");
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_record_requires_user() {
        let recorder = FirestoreRecorder::new(FirestoreConfig::new("clubconnect"));
        let result = recorder.record("clubPayment", &TxHash::new("0x1")).await;
        assert_eq!(result.unwrap_err(), PaymentError::NotAuthenticated);
    }
}
