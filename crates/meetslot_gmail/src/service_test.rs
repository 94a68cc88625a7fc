#[cfg(test)]
mod tests {
    use crate::service::{GmailError, GmailNotificationService, GMAIL_SEND_SCOPE};
    use meetslot_common::services::{
        BoxFuture, BoxedError, CredentialProvider, EmailMessage, NotificationService,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, thiserror::Error)]
    #[error("token endpoint unreachable")]
    struct TokenFailure;

    #[derive(Default)]
    struct FailingCredentials {
        calls: AtomicUsize,
        scopes: Mutex<Vec<String>>,
    }

    impl CredentialProvider for FailingCredentials {
        fn access_token<'a>(&'a self, scopes: &'a [&'a str]) -> BoxFuture<'a, String, BoxedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut seen) = self.scopes.lock() {
                seen.extend(scopes.iter().map(|s| s.to_string()));
            }
            Box::pin(async { Err(BoxedError::new(TokenFailure)) })
        }

        fn principal(&self) -> Option<String> {
            Some("bookings@example.com".to_string())
        }
    }

    fn message(to: &str) -> EmailMessage {
        EmailMessage {
            from: "bookings@example.com".to_string(),
            to: to.to_string(),
            subject: "Meeting confirmed".to_string(),
            body: "See you then.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_token_failure_is_reported() {
        let credentials = Arc::new(FailingCredentials::default());
        let service = GmailNotificationService::new(credentials.clone())
            .with_endpoint("http://127.0.0.1:9/unused");

        let err = service.send_email(message("ada@example.com")).await.unwrap_err();

        assert!(matches!(err, GmailError::TokenError(_)));
        assert_eq!(credentials.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            *credentials.scopes.lock().unwrap(),
            vec![GMAIL_SEND_SCOPE.to_string()]
        );
    }

    #[tokio::test]
    async fn test_invalid_message_skips_token_fetch() {
        let credentials = Arc::new(FailingCredentials::default());
        let service = GmailNotificationService::new(credentials.clone());

        let err = service
            .send_email(message("ada@example.com\nBcc: eve@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, GmailError::InvalidMessage(_)));
        assert_eq!(credentials.calls.load(Ordering::SeqCst), 0);
    }
}
