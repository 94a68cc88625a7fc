// --- File: crates/services/meetslot_backend/src/service_factory.rs ---
//! Service factory implementation.
//!
//! Builds the Google-backed services once at startup. Calendar and Gmail share
//! one service account, so a failing key disables both integrations.
use chrono::{DateTime, Utc};
use meetslot_common::services::{
    BoxFuture, BoxedError, CalendarEvent, CalendarEventResult, CalendarService, CredentialProvider,
    EmailMessage, NotificationResult, NotificationService, ServiceFactory,
};
use meetslot_common::logging::log_result;
use meetslot_common::{is_gcal_enabled, is_gmail_enabled};
use meetslot_config::AppConfig;
use meetslot_gcal::{create_google_clients, GoogleCalendarService};
use meetslot_gmail::GmailNotificationService;
use std::sync::Arc;
use tracing::{info, warn};

/// Erases a calendar service's error type so it fits behind the factory.
struct BoxedCalendarService<S>(S);

impl<S> CalendarService for BoxedCalendarService<S>
where
    S: CalendarService,
{
    type Error = BoxedError;

    fn get_busy_times(
        &self,
        calendar_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<(DateTime<Utc>, DateTime<Utc>)>, Self::Error> {
        let fut = self.0.get_busy_times(calendar_id, start_time, end_time);
        Box::pin(async move { fut.await.map_err(BoxedError::new) })
    }

    fn create_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
        let fut = self.0.create_event(calendar_id, event);
        Box::pin(async move { fut.await.map_err(BoxedError::new) })
    }

    fn is_conflict(&self, err: &Self::Error) -> bool {
        err.downcast_ref::<S::Error>()
            .is_some_and(|inner| self.0.is_conflict(inner))
    }
}

struct BoxedNotificationService<S>(S);

impl<S> NotificationService for BoxedNotificationService<S>
where
    S: NotificationService,
{
    type Error = BoxedError;

    fn send_email(&self, message: EmailMessage) -> BoxFuture<'_, NotificationResult, Self::Error> {
        let fut = self.0.send_email(message);
        Box::pin(async move { fut.await.map_err(BoxedError::new) })
    }
}

pub struct MeetslotServiceFactory {
    calendar_service: Option<Arc<dyn CalendarService<Error = BoxedError>>>,
    notification_service: Option<Arc<dyn NotificationService<Error = BoxedError>>>,
    sender_address: Option<String>,
}

impl MeetslotServiceFactory {
    /// Create a new service factory.
    pub async fn new(config: &AppConfig) -> Self {
        let mut factory = Self {
            calendar_service: None,
            notification_service: None,
            sender_address: None,
        };

        let use_calendar = is_gcal_enabled(config);
        let use_mail = is_gmail_enabled(config);
        if !use_calendar && !use_mail {
            info!("Google integrations disabled by configuration");
            return factory;
        }
        let Some(google) = config.google.as_ref() else {
            return factory;
        };

        info!("Initializing Google services...");
        let clients = match log_result(
            create_google_clients(google).await,
            "Google service account loaded",
            "Failed to initialize Google services; calendar and mail disabled",
        ) {
            Ok(clients) => clients,
            Err(_) => return factory,
        };

        if use_calendar {
            let service = GoogleCalendarService::new(Arc::new(clients.hub));
            factory.calendar_service = Some(Arc::new(BoxedCalendarService(service)));
            info!("Google Calendar service initialized.");
        } else {
            warn!("Google Calendar disabled; booking endpoints will answer 503");
        }

        if use_mail {
            factory.sender_address = clients.credentials.principal();
            let service = GmailNotificationService::new(Arc::new(clients.credentials));
            factory.notification_service = Some(Arc::new(BoxedNotificationService(service)));
            info!("Gmail notification service initialized.");
        }

        factory
    }
}

impl ServiceFactory for MeetslotServiceFactory {
    fn calendar_service(&self) -> Option<Arc<dyn CalendarService<Error = BoxedError>>> {
        self.calendar_service.clone()
    }

    fn notification_service(&self) -> Option<Arc<dyn NotificationService<Error = BoxedError>>> {
        self.notification_service.clone()
    }

    fn sender_address(&self) -> Option<String> {
        self.sender_address.clone()
    }
}
