//! In-memory calendar and mail services shared by the booking tests.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::{Asia::Tokyo, Tz};
use meetslot_common::services::{
    BoxFuture, BoxedError, CalendarEvent, CalendarEventResult, CalendarService, EmailMessage,
    NotificationResult, NotificationService,
};
use std::sync::Mutex;

use crate::logic::BookingSettings;

#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("slot taken")]
    Conflict,
    #[error("backend down")]
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CreateOutcome {
    Created,
    CreatedWithoutLink,
    Conflict,
    Down,
}

pub struct MockCalendar {
    pub busy: Vec<(DateTime<Utc>, DateTime<Utc>)>,
    pub busy_fails: bool,
    pub outcome: CreateOutcome,
    pub busy_queries: Mutex<Vec<(String, DateTime<Utc>, DateTime<Utc>)>>,
    pub created: Mutex<Vec<(String, CalendarEvent)>>,
}

impl MockCalendar {
    pub fn new(outcome: CreateOutcome) -> Self {
        Self {
            busy: Vec::new(),
            busy_fails: false,
            outcome,
            busy_queries: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn with_busy(mut self, busy: Vec<(DateTime<Utc>, DateTime<Utc>)>) -> Self {
        self.busy = busy;
        self
    }

    pub fn failing_busy(mut self) -> Self {
        self.busy_fails = true;
        self
    }
}

impl CalendarService for MockCalendar {
    type Error = BoxedError;

    fn get_busy_times(
        &self,
        calendar_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<(DateTime<Utc>, DateTime<Utc>)>, Self::Error> {
        self.busy_queries
            .lock()
            .unwrap()
            .push((calendar_id.to_string(), start_time, end_time));
        let result = if self.busy_fails {
            Err(BoxedError::new(MockError::Down))
        } else {
            Ok(self.busy.clone())
        };
        Box::pin(async move { result })
    }

    fn create_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
        self.created
            .lock()
            .unwrap()
            .push((calendar_id.to_string(), event));
        let result = match self.outcome {
            CreateOutcome::Created => Ok(CalendarEventResult {
                event_id: Some("evt-1".to_string()),
                status: "confirmed".to_string(),
                join_link: Some("https://meet.google.com/abc-defg-hij".to_string()),
            }),
            CreateOutcome::CreatedWithoutLink => Ok(CalendarEventResult {
                event_id: Some("evt-2".to_string()),
                status: "confirmed".to_string(),
                join_link: None,
            }),
            CreateOutcome::Conflict => Err(BoxedError::new(MockError::Conflict)),
            CreateOutcome::Down => Err(BoxedError::new(MockError::Down)),
        };
        Box::pin(async move { result })
    }

    fn is_conflict(&self, err: &Self::Error) -> bool {
        matches!(err.downcast_ref::<MockError>(), Some(MockError::Conflict))
    }
}

#[derive(Default)]
pub struct MockMailer {
    pub fail_for: Option<String>,
    pub sent: Mutex<Vec<EmailMessage>>,
}

impl MockMailer {
    pub fn failing_for(address: &str) -> Self {
        Self {
            fail_for: Some(address.to_string()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl NotificationService for MockMailer {
    type Error = BoxedError;

    fn send_email(&self, message: EmailMessage) -> BoxFuture<'_, NotificationResult, Self::Error> {
        let result = if self.fail_for.as_deref() == Some(message.to.as_str()) {
            Err(BoxedError::new(MockError::Down))
        } else {
            let mut sent = self.sent.lock().unwrap();
            sent.push(message);
            Ok(NotificationResult {
                id: format!("msg-{}", sent.len()),
                status: "sent".to_string(),
            })
        };
        Box::pin(async move { result })
    }
}

pub fn settings() -> BookingSettings {
    BookingSettings {
        default_calendar_id: "host@example.com".to_string(),
        event_calendar_id: "primary".to_string(),
        sender_address: Some("bookings@example.com".to_string()),
        host_notice_email: Some("team@example.com".to_string()),
        fixed_attendee_email: Some("notes@example.com".to_string()),
    }
}

/// 2025-05-05 is a Monday.
pub fn tokyo(day: u32, hour: u32, minute: u32) -> DateTime<Tz> {
    Tokyo.with_ymd_and_hms(2025, 5, day, hour, minute, 0).unwrap()
}

/// Monday 2025-05-05 08:00 in Tokyo.
pub fn fixed_now() -> DateTime<Utc> {
    tokyo(5, 8, 0).with_timezone(&Utc)
}
