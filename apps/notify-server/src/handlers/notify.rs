//! Notification endpoint.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use actix_multipart::Multipart;
use actix_web::http::{Method, header};
use actix_web::{HttpMessage, HttpRequest, HttpResponse, web};
use futures::{FutureExt, StreamExt};

use notif_core::domain::{EmailAddress, OutgoingEmail};
use notif_shared::ApiResponse;
use notif_shared::dto::{NotifyForm, SentNotification};

use crate::middleware::error::JSON_UTF8;
use crate::middleware::{NotifyError, NotifyResult};
use crate::state::AppState;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 16 * 1024;

/// Send the notification email to the submitted address.
///
/// Any method on the notify path lands here; only POST proceeds. A panic
/// anywhere below is turned into the generic failure envelope.
pub async fn send_notification(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> HttpResponse {
    let messages = state.messages;

    match AssertUnwindSafe(process(&req, payload, &state))
        .catch_unwind()
        .await
    {
        Ok(Ok(sent)) => HttpResponse::Ok()
            .insert_header((header::CONTENT_TYPE, JSON_UTF8))
            .json(ApiResponse::ok(messages.sent(), sent)),
        Ok(Err(e)) => e.to_response(&messages),
        Err(panic) => NotifyError::Internal(panic_message(panic.as_ref())).to_response(&messages),
    }
}

async fn process(
    req: &HttpRequest,
    payload: web::Payload,
    state: &AppState,
) -> NotifyResult<SentNotification> {
    if req.method() != Method::POST {
        return Err(NotifyError::MethodNotAllowed);
    }

    let raw = read_email_field(req, payload)
        .await?
        .filter(|value| !value.trim().is_empty())
        .ok_or(NotifyError::MissingEmail)?;

    let recipient = EmailAddress::parse(&raw).map_err(|e| {
        tracing::debug!(error = %e, "Rejected email address");
        NotifyError::InvalidEmail
    })?;

    let mailer = state
        .mailer
        .as_ref()
        .map_err(|reason| NotifyError::Configuration(reason.clone()))?;

    let key = recipient.rate_limit_key();
    let decision = state.limiter.check(&key).await;
    if !decision.allowed {
        let wait = state
            .limiter
            .format_time_remaining(decision.reset_time, &state.messages.time_labels());
        tracing::info!(
            key = %key,
            attempt_count = decision.attempt_count,
            wait = %wait,
            "Send limit reached"
        );
        return Err(NotifyError::RateLimited {
            wait,
            retry_after_secs: state.limiter.seconds_until(decision.reset_time).max(0) as u64,
        });
    }

    let email = OutgoingEmail::from_template(recipient.clone(), &state.template);
    mailer.send(&email).await.map_err(|e| {
        tracing::warn!(key = %key, error = %e, "Mail dispatch failed");
        NotifyError::Dispatch(e.to_string())
    })?;

    if let Err(e) = state.limiter.record(&key).await {
        // The mail is already out; the client still gets a success.
        tracing::error!(key = %key, error = %e, "Failed to record send");
    }

    tracing::info!(key = %key, "Notification sent");

    Ok(SentNotification {
        email: recipient.to_string(),
        remaining: decision.remaining.saturating_sub(1),
    })
}

/// Extract the `email` field from a urlencoded or multipart body.
///
/// Other content types carry no field.
async fn read_email_field(
    req: &HttpRequest,
    mut payload: web::Payload,
) -> NotifyResult<Option<String>> {
    match req.content_type() {
        "application/x-www-form-urlencoded" => {
            let mut body = web::BytesMut::new();
            while let Some(chunk) = payload.next().await {
                let chunk = chunk.map_err(|e| NotifyError::MalformedBody(e.to_string()))?;
                push_limited(&mut body, &chunk)?;
            }
            let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(&body)
                .map_err(|e| NotifyError::MalformedBody(e.to_string()))?;
            Ok(NotifyForm::from_pairs(pairs).email)
        }
        "multipart/form-data" => {
            let mut multipart = Multipart::new(req.headers(), payload);
            let mut total = web::BytesMut::new();
            let mut email = None;

            while let Some(field) = multipart.next().await {
                let mut field = field.map_err(|e| NotifyError::MalformedBody(e.to_string()))?;
                let is_email = field.name() == Some("email");

                let mut value = web::BytesMut::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(|e| NotifyError::MalformedBody(e.to_string()))?;
                    push_limited(&mut total, &chunk)?;
                    if is_email {
                        value.extend_from_slice(&chunk);
                    }
                }

                // As with urlencoded forms, the last `email` field wins.
                if is_email {
                    let text = String::from_utf8(value.to_vec())
                        .map_err(|e| NotifyError::MalformedBody(e.to_string()))?;
                    email = Some(text);
                }
            }
            Ok(email)
        }
        _ => Ok(None),
    }
}

fn push_limited(buf: &mut web::BytesMut, chunk: &[u8]) -> NotifyResult<()> {
    if buf.len() + chunk.len() > MAX_BODY_BYTES {
        return Err(NotifyError::MalformedBody(format!(
            "body exceeds {MAX_BODY_BYTES} bytes"
        )));
    }
    buf.extend_from_slice(chunk);
    Ok(())
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::handlers::{configure_routes, not_found};
    use crate::middleware::cors;
    use actix_web::body::MessageBody;
    use actix_web::dev::ServiceResponse;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use async_trait::async_trait;
    use notif_core::domain::SendLog;
    use notif_core::ports::{
        DispatchError, Mailer, ManualClock, SendLogMutation, SendLogStore, StoreError,
    };
    use notif_infra::{InMemorySendLog, JsonFileSendLog};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    const NOW: i64 = 1_700_000_000;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
        fail_with: Option<DispatchError>,
    }

    impl RecordingMailer {
        fn failing(err: DispatchError) -> Self {
            Self {
                fail_with: Some(err),
                ..Self::default()
            }
        }

        fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &OutgoingEmail) -> Result<(), DispatchError> {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    struct PanickingMailer;

    #[async_trait]
    impl Mailer for PanickingMailer {
        async fn send(&self, _email: &OutgoingEmail) -> Result<(), DispatchError> {
            panic!("relay client exploded");
        }
    }

    /// Counts every access so tests can prove the store was never touched.
    #[derive(Default)]
    struct TrackingStore {
        inner: InMemorySendLog,
        accesses: AtomicUsize,
    }

    #[async_trait]
    impl SendLogStore for TrackingStore {
        async fn load(&self) -> Result<SendLog, StoreError> {
            self.accesses.fetch_add(1, Ordering::SeqCst);
            self.inner.load().await
        }

        async fn save(&self, log: &SendLog) -> Result<(), StoreError> {
            self.accesses.fetch_add(1, Ordering::SeqCst);
            self.inner.save(log).await
        }

        async fn update(&self, mutation: SendLogMutation) -> Result<(), StoreError> {
            self.accesses.fetch_add(1, Ordering::SeqCst);
            self.inner.update(mutation).await
        }
    }

    fn config(pairs: &[(&str, &str)]) -> AppConfig {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(move |key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
    }

    fn state_with(
        config: &AppConfig,
        store: Arc<dyn SendLogStore>,
        mailer: Result<Arc<dyn Mailer>, String>,
    ) -> AppState {
        AppState::with_parts(config, store, Arc::new(ManualClock::new(NOW)), mailer)
    }

    macro_rules! init_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .wrap(cors())
                    .app_data(web::Data::new($state))
                    .configure(|cfg| configure_routes(cfg, "/api/notify"))
                    .default_service(web::to(not_found)),
            )
            .await
        };
    }

    fn form_post(body: &str) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/notify")
            .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
            .set_payload(body.to_string())
    }

    async fn json_of<B: MessageBody>(res: ServiceResponse<B>) -> (StatusCode, serde_json::Value) {
        let status = res.status();
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).unwrap(),
            JSON_UTF8,
            "every answer is a JSON envelope"
        );
        let body: serde_json::Value = test::read_body_json(res).await;
        (status, body)
    }

    macro_rules! call_json {
        ($app:expr, $req:expr) => {
            json_of(test::call_service(&$app, $req.to_request()).await).await
        };
    }

    #[actix_web::test]
    async fn test_sends_and_reports_remaining() {
        let mailer = Arc::new(RecordingMailer::default());
        let store = Arc::new(InMemorySendLog::new());
        let state = state_with(&config(&[]), store.clone(), Ok(mailer.clone()));
        let app = init_app!(state);

        let (status, body) = call_json!(app, form_post("email=Test%40Example.com"));

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Notification sent successfully!");
        assert_eq!(body["data"]["email"], "Test@Example.com");
        assert_eq!(body["data"]["remaining"], 2);

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Automatic Email Notification Delivered");
        assert_eq!(
            store.load().await.unwrap().timestamps("test@example.com"),
            &[NOW]
        );
    }

    #[actix_web::test]
    async fn test_file_log_is_shared_across_case_variants() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("email_log.json");
        let mailer = Arc::new(RecordingMailer::default());
        let store = Arc::new(JsonFileSendLog::new(&path));
        let state = state_with(&config(&[]), store, Ok(mailer.clone()));
        let app = init_app!(state);

        for email in ["foo%40bar.com", "FOO%40Bar.com", "%20Foo%40BAR.com%20"] {
            let (status, _) = call_json!(app, form_post(&format!("email={email}")));
            assert_eq!(status, StatusCode::OK);
        }
        let (status, _) = call_json!(app, form_post("email=foo%40bar.com"));
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

        let raw = std::fs::read_to_string(&path).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc, serde_json::json!({ "foo@bar.com": [NOW, NOW, NOW] }));
        assert_eq!(mailer.sent_count(), 3);
    }

    #[actix_web::test]
    async fn test_invalid_email_touches_nothing() {
        let mailer = Arc::new(RecordingMailer::default());
        let store = Arc::new(TrackingStore::default());
        let state = state_with(&config(&[]), store.clone(), Ok(mailer.clone()));
        let app = init_app!(state);

        for email in ["not-an-email", "a@b", "foo@@bar.com", "foo%20bar%40example.com"] {
            let (status, body) = call_json!(app, form_post(&format!("email={email}")));
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{email}");
            assert_eq!(body["success"], false);
            assert_eq!(body["message"], "Invalid email format.");
        }

        assert_eq!(store.accesses.load(Ordering::SeqCst), 0);
        assert_eq!(mailer.sent_count(), 0);
    }

    #[actix_web::test]
    async fn test_missing_or_blank_email() {
        let state = state_with(
            &config(&[]),
            Arc::new(InMemorySendLog::new()),
            Ok(Arc::new(RecordingMailer::default())),
        );
        let app = init_app!(state);

        for body in ["", "email=", "email=%20%20", "name=someone"] {
            let (status, json) = call_json!(app, form_post(body));
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body:?}");
            assert_eq!(json["message"], "Email must not be empty.");
        }

        let req = test::TestRequest::post()
            .uri("/api/notify")
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .set_payload("email=test@example.com");
        let (status, _) = call_json!(app, req);
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_repeated_email_field_uses_last_value() {
        let mailer = Arc::new(RecordingMailer::default());
        let state = state_with(
            &config(&[]),
            Arc::new(InMemorySendLog::new()),
            Ok(mailer.clone()),
        );
        let app = init_app!(state);

        let (status, body) = call_json!(app, form_post("email=a%40x.com&email=b%40x.com"));

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "b@x.com");
        assert_eq!(mailer.sent.lock().unwrap()[0].recipient.as_str(), "b@x.com");
    }

    #[actix_web::test]
    async fn test_missing_smtp_config_is_reported() {
        let cfg = config(&[]);
        let reason = cfg.smtp.as_ref().unwrap_err().to_string();
        let store = Arc::new(TrackingStore::default());
        let state = state_with(&cfg, store.clone(), Err(reason));
        let app = init_app!(state);

        let (status, body) = call_json!(app, form_post("email=test%40example.com"));

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], false);
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .starts_with("SMTP configuration is incomplete.")
        );
        assert_eq!(store.accesses.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn test_fourth_send_in_window_is_denied() {
        let mailer = Arc::new(RecordingMailer::default());
        let state = state_with(
            &config(&[]),
            Arc::new(InMemorySendLog::new()),
            Ok(mailer.clone()),
        );
        let app = init_app!(state);

        for expected_remaining in [2, 1, 0] {
            let (status, body) = call_json!(app, form_post("email=test%40example.com"));
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["data"]["remaining"], expected_remaining);
        }

        let res = test::call_service(&app, form_post("email=test%40example.com").to_request()).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(res.headers().get(header::RETRY_AFTER).unwrap(), "3600");
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(
            body["message"],
            "You have reached the email sending limit. Please try again in 1 hour 0 minutes."
        );

        assert_eq!(mailer.sent_count(), 3);
    }

    #[actix_web::test]
    async fn test_indonesian_locale() {
        let mailer = Arc::new(RecordingMailer::default());
        let cfg = config(&[("MESSAGE_LOCALE", "id"), ("RATE_LIMIT_MAX_ATTEMPTS", "1")]);
        let state = state_with(&cfg, Arc::new(InMemorySendLog::new()), Ok(mailer.clone()));
        let app = init_app!(state);

        let (_, body) = call_json!(app, form_post("email=test%40example.com"));
        assert_eq!(body["message"], "Notifikasi berhasil dikirim!");
        assert_eq!(body["data"]["remaining"], 0);

        let (status, body) = call_json!(app, form_post("email=test%40example.com"));
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(body["message"].as_str().unwrap().contains("1 jam"));
        assert_eq!(
            mailer.sent.lock().unwrap()[0].subject,
            "Notifikasi Email Otomatis Berhasil Terkirim"
        );
    }

    #[actix_web::test]
    async fn test_dispatch_failure_is_not_recorded() {
        let mailer = Arc::new(RecordingMailer::failing(DispatchError::Transport(
            "535 Authentication failed".to_string(),
        )));
        let store = Arc::new(InMemorySendLog::new());
        let state = state_with(&config(&[]), store.clone(), Ok(mailer));
        let app = init_app!(state);

        let (status, body) = call_json!(app, form_post("email=test%40example.com"));

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            body["message"],
            "Failed to send email. Error: 535 Authentication failed"
        );
        assert!(store.load().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_dispatch_detail_can_be_hidden() {
        let mailer = Arc::new(RecordingMailer::failing(DispatchError::Transport(
            "connection refused by smtp.internal:465".to_string(),
        )));
        let cfg = config(&[("EXPOSE_TRANSPORT_ERRORS", "false")]);
        let state = state_with(&cfg, Arc::new(InMemorySendLog::new()), Ok(mailer));
        let app = init_app!(state);

        let (_, body) = call_json!(app, form_post("email=test%40example.com"));
        assert_eq!(body["message"], "Failed to send email.");
    }

    #[actix_web::test]
    async fn test_multipart_form() {
        let mailer = Arc::new(RecordingMailer::default());
        let state = state_with(
            &config(&[]),
            Arc::new(InMemorySendLog::new()),
            Ok(mailer.clone()),
        );
        let app = init_app!(state);

        let body = "--XyZ\r\n\
            Content-Disposition: form-data; name=\"email\"\r\n\r\n\
            multi@example.com\r\n\
            --XyZ--\r\n";
        let req = test::TestRequest::post()
            .uri("/api/notify")
            .insert_header((header::CONTENT_TYPE, "multipart/form-data; boundary=XyZ"))
            .set_payload(body);

        let (status, json) = call_json!(app, req);

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["email"], "multi@example.com");
        assert_eq!(mailer.sent_count(), 1);
    }

    #[actix_web::test]
    async fn test_oversized_body_is_rejected() {
        let state = state_with(
            &config(&[]),
            Arc::new(InMemorySendLog::new()),
            Ok(Arc::new(RecordingMailer::default())),
        );
        let app = init_app!(state);

        let padding = "a".repeat(MAX_BODY_BYTES);
        let (status, body) =
            call_json!(app, form_post(&format!("email=test%40example.com&pad={padding}")));

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Malformed request body.");
    }

    #[actix_web::test]
    async fn test_non_post_methods() {
        let state = state_with(
            &config(&[]),
            Arc::new(InMemorySendLog::new()),
            Ok(Arc::new(RecordingMailer::default())),
        );
        let app = init_app!(state);

        let req = test::TestRequest::get()
            .uri("/api/notify")
            .insert_header((header::ORIGIN, "https://site.example"));
        let res = test::call_service(&app, req.to_request()).await;
        assert_eq!(
            res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
        let (status, body) = json_of(res).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["message"], "Method not allowed. Use POST.");

        let preflight = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/notify")
            .insert_header((header::ORIGIN, "https://site.example"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .to_request();
        let res = test::call_service(&app, preflight).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[actix_web::test]
    async fn test_cross_origin_success_carries_cors_headers() {
        let state = state_with(
            &config(&[]),
            Arc::new(InMemorySendLog::new()),
            Ok(Arc::new(RecordingMailer::default())),
        );
        let app = init_app!(state);

        let req = form_post("email=test%40example.com")
            .insert_header((header::ORIGIN, "https://site.example"));
        let res = test::call_service(&app, req.to_request()).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[actix_web::test]
    async fn test_panic_becomes_json_failure() {
        let state = state_with(
            &config(&[]),
            Arc::new(InMemorySendLog::new()),
            Ok(Arc::new(PanickingMailer)),
        );
        let app = init_app!(state);

        let (status, body) = call_json!(app, form_post("email=test%40example.com"));

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(
            body["message"],
            "An unexpected error occurred. Please try again."
        );
    }

    #[actix_web::test]
    async fn test_unknown_route_is_json_404() {
        let state = state_with(
            &config(&[]),
            Arc::new(InMemorySendLog::new()),
            Ok(Arc::new(RecordingMailer::default())),
        );
        let app = init_app!(state);

        let (status, body) = call_json!(app, test::TestRequest::get().uri("/nope"));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }
}
