//! One-shot local reminders.
//!
//! Each reminder is a spawned task racing a sleep against its
//! `CancellationToken`. Handles stay in the scheduler's pending set until the
//! reminder fires or is cancelled, so reminders for a deleted or edited note
//! can be withdrawn before they reference stale content.

use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{NotesError, Result};

/// Title of every reminder notification.
pub const REMINDER_TITLE: &str = "¡Recordatorio de Nota!";

/// A local notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    /// The reminder raised for a note.
    pub fn reminder(note_title: &str) -> Self {
        Self {
            title: REMINDER_TITLE.to_string(),
            body: format!("Es hora de revisar tu nota: {}", note_title),
        }
    }
}

/// Sink for fired reminders.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that only writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        info!(title = %notification.title, body = %notification.body, "Reminder fired");
    }
}

/// An armed reminder.
#[derive(Debug, Clone)]
pub struct ReminderHandle {
    id: u64,
    note_id: Option<String>,
    note_title: String,
    fire_at: DateTime<Utc>,
    token: CancellationToken,
}

impl ReminderHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Note the reminder belongs to, when the server reported its id.
    pub fn note_id(&self) -> Option<&str> {
        self.note_id.as_deref()
    }

    /// Title captured when the reminder was scheduled.
    pub fn note_title(&self) -> &str {
        &self.note_title
    }

    pub fn fire_at(&self) -> DateTime<Utc> {
        self.fire_at
    }

    /// Cancel without going through the scheduler. The pending entry is
    /// dropped when the task observes the cancellation.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Arms and tracks reminders.
#[derive(Clone)]
pub struct ReminderScheduler {
    notifier: Arc<dyn Notifier>,
    pending: Arc<Mutex<HashMap<u64, ReminderHandle>>>,
    next_id: Arc<AtomicU64>,
}

impl ReminderScheduler {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Arm a reminder for `target`.
    ///
    /// Returns `None` without arming anything when `target` is not in the
    /// future.
    pub async fn schedule_at(
        &self,
        target: DateTime<Utc>,
        note_id: Option<String>,
        note_title: impl Into<String>,
    ) -> Option<ReminderHandle> {
        let note_title = note_title.into();
        let delta = target - Utc::now();
        if delta <= TimeDelta::zero() {
            debug!(%target, title = %note_title, "Reminder time already passed, not scheduling");
            return None;
        }
        let delay = delta.to_std().ok()?;
        Some(self.arm(delay, target, note_id, note_title).await)
    }

    async fn arm(
        &self,
        delay: Duration,
        fire_at: DateTime<Utc>,
        note_id: Option<String>,
        note_title: String,
    ) -> ReminderHandle {
        let handle = ReminderHandle {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            note_id,
            note_title,
            fire_at,
            token: CancellationToken::new(),
        };

        self.pending.lock().await.insert(handle.id, handle.clone());

        let deadline = tokio::time::Instant::now() + delay;
        let task_handle = handle.clone();
        let notifier = Arc::clone(&self.notifier);
        let pending = Arc::clone(&self.pending);
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = task_handle.token.cancelled() => {
                    debug!(reminder_id = task_handle.id, "Reminder cancelled");
                }
                _ = tokio::time::sleep_until(deadline) => {
                    notifier.notify(Notification::reminder(&task_handle.note_title));
                    info!(
                        reminder_id = task_handle.id,
                        note_id = ?task_handle.note_id,
                        "Reminder delivered"
                    );
                }
            }
            pending.lock().await.remove(&task_handle.id);
        });

        info!(
            reminder_id = handle.id,
            note_id = ?handle.note_id,
            fire_at = %handle.fire_at,
            delay_ms = delay.as_millis() as u64,
            "Reminder scheduled"
        );
        handle
    }

    /// Cancel one reminder. Returns whether it was still pending.
    pub async fn cancel(&self, reminder_id: u64) -> bool {
        match self.pending.lock().await.remove(&reminder_id) {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every pending reminder for `note_id`. Returns how many were cancelled.
    pub async fn cancel_for_note(&self, note_id: &str) -> usize {
        let mut pending = self.pending.lock().await;
        let ids: Vec<u64> = pending
            .values()
            .filter(|h| h.note_id() == Some(note_id))
            .map(|h| h.id)
            .collect();
        for id in &ids {
            if let Some(handle) = pending.remove(id) {
                handle.cancel();
            }
        }
        if !ids.is_empty() {
            debug!(note_id, count = ids.len(), "Cancelled reminders for note");
        }
        ids.len()
    }

    pub async fn cancel_all(&self) {
        let mut pending = self.pending.lock().await;
        for (_, handle) in pending.drain() {
            handle.cancel();
        }
    }

    /// Pending reminders, soonest first.
    pub async fn pending(&self) -> Vec<ReminderHandle> {
        let mut handles: Vec<ReminderHandle> =
            self.pending.lock().await.values().cloned().collect();
        handles.sort_by_key(|h| (h.fire_at, h.id));
        handles
    }
}

/// Parse a `datetime-local` form value (`YYYY-MM-DDTHH:MM[:SS]`) in the local
/// time zone. RFC 3339 timestamps with an explicit offset are accepted too.
///
/// An empty value means no reminder was requested.
pub fn parse_local_datetime(value: &str) -> Result<Option<DateTime<Utc>>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"))
        .map_err(|_| {
            NotesError::Validation(format!(
                "invalid reminder time '{}', expected YYYY-MM-DDTHH:MM",
                value
            ))
        })?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|ts| Some(ts.with_timezone(&Utc)))
        .ok_or_else(|| {
            NotesError::Validation(format!("reminder time '{}' does not exist locally", value))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingNotifier;

    fn scheduler() -> (ReminderScheduler, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        (ReminderScheduler::new(notifier.clone()), notifier)
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_past_time_arms_nothing() {
        let (scheduler, notifier) = scheduler();

        let handle = scheduler
            .schedule_at(Utc::now() - TimeDelta::milliseconds(1000), None, "X")
            .await;

        assert!(handle.is_none());
        assert!(scheduler.pending().await.is_empty());
        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_future_time_fires_once_after_delay() {
        let (scheduler, notifier) = scheduler();
        let start = tokio::time::Instant::now();

        let handle = scheduler
            .schedule_at(Utc::now() + TimeDelta::milliseconds(5000), None, "X")
            .await
            .expect("future reminder should be armed");
        assert_eq!(handle.note_title(), "X");
        assert_eq!(scheduler.pending().await.len(), 1);

        tokio::time::advance(Duration::from_millis(4900)).await;
        settle().await;
        assert!(notifier.sent().is_empty(), "fired before its time");

        tokio::time::timeout(Duration::from_secs(1), notifier.wait_for(1))
            .await
            .expect("reminder never fired");
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(4990), "fired after {:?}", elapsed);

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, REMINDER_TITLE);
        assert!(sent[0].body.contains("X"));

        settle().await;
        assert!(scheduler.pending().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_for_note_prevents_delivery() {
        let (scheduler, notifier) = scheduler();
        let target = Utc::now() + TimeDelta::seconds(30);

        scheduler
            .schedule_at(target, Some("n1".into()), "first")
            .await
            .unwrap();
        scheduler
            .schedule_at(target, Some("n2".into()), "second")
            .await
            .unwrap();

        assert_eq!(scheduler.cancel_for_note("n1").await, 1);
        assert_eq!(scheduler.cancel_for_note("n1").await, 0);

        tokio::time::timeout(Duration::from_secs(60), notifier.wait_for(1))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_by_id_and_cancel_all() {
        let (scheduler, notifier) = scheduler();
        let a = scheduler
            .schedule_at(Utc::now() + TimeDelta::seconds(10), None, "a")
            .await
            .unwrap();
        scheduler
            .schedule_at(Utc::now() + TimeDelta::seconds(20), None, "b")
            .await
            .unwrap();

        assert!(scheduler.cancel(a.id()).await);
        assert!(!scheduler.cancel(a.id()).await);
        assert!(a.is_cancelled());
        assert_eq!(scheduler.pending().await.len(), 1);

        scheduler.cancel_all().await;
        assert!(scheduler.pending().await.is_empty());

        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_is_ordered_by_fire_time() {
        let (scheduler, _notifier) = scheduler();
        scheduler
            .schedule_at(Utc::now() + TimeDelta::seconds(90), None, "later")
            .await
            .unwrap();
        scheduler
            .schedule_at(Utc::now() + TimeDelta::seconds(10), None, "sooner")
            .await
            .unwrap();

        let titles: Vec<String> = scheduler
            .pending()
            .await
            .iter()
            .map(|h| h.note_title().to_string())
            .collect();
        assert_eq!(titles, vec!["sooner", "later"]);
    }

    #[test]
    fn test_notification_body_references_title() {
        let n = Notification::reminder("Comprar pan");
        assert_eq!(n.title, "¡Recordatorio de Nota!");
        assert_eq!(n.body, "Es hora de revisar tu nota: Comprar pan");
    }

    #[test]
    fn test_parse_local_datetime() {
        assert_eq!(parse_local_datetime("").unwrap(), None);
        assert_eq!(parse_local_datetime("   ").unwrap(), None);

        let parsed = parse_local_datetime("2030-06-15T09:45").unwrap().unwrap();
        let naive = NaiveDateTime::parse_from_str("2030-06-15T09:45", "%Y-%m-%dT%H:%M").unwrap();
        let expected = Local
            .from_local_datetime(&naive)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parsed, expected);

        let with_offset = parse_local_datetime("2030-06-15T09:45:00+00:00").unwrap().unwrap();
        assert_eq!(with_offset, Utc.with_ymd_and_hms(2030, 6, 15, 9, 45, 0).unwrap());

        assert!(matches!(
            parse_local_datetime("tomorrow"),
            Err(NotesError::Validation(_))
        ));
    }
}
