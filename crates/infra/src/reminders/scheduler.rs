use super::{
    registry::JobRegistry,
    runner::{CancelOutcome, JobCallback, JobHandle, JobRunner},
};
use crate::{services::INotifier, system::ISys};
use chrono::Duration;
use futures::FutureExt;
use reminders_domain::{
    fire_time, CalendarEvent, DeliveryFailure, DeliveryOutcome, JobStatus, NotificationKind,
    ScheduledJob, ID,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info, warn};

/// Keeps exactly one pending reminder per `CalendarEvent`.
///
/// The event store calls `schedule_for_event` after creating an event,
/// `reschedule_for_event` after changing its start time or participants and
/// `cancel_for_event` after deleting it. None of these ever fail, delivery
/// problems only show up in the logs.
///
/// Cloning is cheap, every clone drives the same registry.
#[derive(Clone)]
pub struct ReminderScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    /// Guards the check-cancel-install sequence of every operation
    registry: Mutex<JobRegistry>,
    runner: JobRunner,
    notifier: Arc<dyn INotifier>,
    sys: Arc<dyn ISys>,
    lead_interval: Duration,
}

fn snapshot(event_id: ID, handle: &JobHandle) -> ScheduledJob {
    ScheduledJob {
        job_id: handle.job_id(),
        event_id,
        fire_ts: handle.fire_ts(),
        status: handle.status(),
    }
}

/// Participants in invitation order without duplicates. Malformed ones are kept
/// so that the notifier reports them as failed.
fn notification_recipients(event: &CalendarEvent) -> Vec<String> {
    let mut recipients: Vec<String> = Vec::with_capacity(event.participants.len());
    for participant in &event.participants {
        let participant = participant.trim();
        if !participant.is_empty() && !recipients.iter().any(|r| r == participant) {
            recipients.push(participant.to_string());
        }
    }
    recipients
}

impl ReminderScheduler {
    pub fn new(
        notifier: Arc<dyn INotifier>,
        sys: Arc<dyn ISys>,
        lead_interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                registry: Mutex::new(JobRegistry::new()),
                runner: JobRunner::new(sys.clone()),
                notifier,
                sys,
                lead_interval,
            }),
        }
    }

    /// Schedules the reminder of `event`, replacing the job it had before.
    ///
    /// A fire time that already passed fires immediately. An event without a
    /// single valid participant ends up without a job.
    #[tracing::instrument(name = "Scheduling reminder", skip(self, event), fields(event_id = %event.id))]
    pub fn schedule_for_event(&self, event: &CalendarEvent) -> Option<ScheduledJob> {
        let mut registry = self.inner.registry();

        if let Some(previous) = registry.remove(&event.id) {
            self.inner.cancel(&event.id, &previous);
        }

        if event.recipients().is_empty() {
            info!("Event has no valid participants, no reminder scheduled");
            return None;
        }

        let fire_ts = fire_time(event.start_ts, self.inner.lead_interval);
        let now = self.inner.sys.get_timestamp_millis();
        if fire_ts <= now {
            info!(
                "Reminder time {} already passed at {}, firing immediately",
                fire_ts, now
            );
        }

        let handle = self
            .inner
            .runner
            .schedule(fire_ts, self.reminder_callback(event.clone()));
        let job = snapshot(event.id, &handle);
        info!("Reminder job {} scheduled at {}", job.job_id, job.fire_ts);

        // Removed above and still holding the lock, so nothing can be replaced here
        if let Some(unexpected) = registry.put(event.id, handle) {
            self.inner.cancel(&event.id, &unexpected);
        }

        Some(job)
    }

    /// Replaces the reminder of an event whose start time or participants changed.
    /// `event` has to be the fully updated event, nothing is diffed.
    pub fn reschedule_for_event(&self, event: &CalendarEvent) -> Option<ScheduledJob> {
        self.schedule_for_event(event)
    }

    /// Cancels the pending reminder of the event, if there is one.
    /// Returns whether a pending job was cancelled.
    #[tracing::instrument(name = "Cancelling reminder", skip(self))]
    pub fn cancel_for_event(&self, event_id: &ID) -> bool {
        let mut registry = self.inner.registry();
        match registry.remove(event_id) {
            Some(handle) => self.inner.cancel(event_id, &handle),
            None => false,
        }
    }

    /// Notifies the participants of `event` right away, regardless of any scheduled job
    pub async fn notify_now(&self, event: &CalendarEvent, kind: NotificationKind) -> DeliveryOutcome {
        self.inner.notify(event, kind).await
    }

    /// The live job of the event, if it has not fired or been cancelled yet
    pub fn pending_job(&self, event_id: &ID) -> Option<ScheduledJob> {
        self.inner
            .registry()
            .get(event_id)
            .map(|handle| snapshot(*event_id, handle))
            .filter(|job| job.status == JobStatus::Pending)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.registry().pending_count()
    }

    fn reminder_callback(&self, event: CalendarEvent) -> JobCallback {
        let inner = self.inner.clone();
        Box::new(move |job_id| {
            async move {
                inner.registry().remove_job(&event.id, job_id);
                inner.notify(&event, NotificationKind::Reminder).await;
            }
            .boxed()
        })
    }
}

impl SchedulerInner {
    fn registry(&self) -> MutexGuard<'_, JobRegistry> {
        // Every critical section is a single map operation plus non-panicking
        // runner calls, so a poisoned registry is still consistent
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cancel(&self, event_id: &ID, handle: &JobHandle) -> bool {
        match self.runner.cancel(handle) {
            CancelOutcome::Cancelled => {
                info!("Reminder job {} of event {} cancelled", handle.job_id(), event_id);
                true
            }
            CancelOutcome::TooLate => {
                info!(
                    "Reminder job {} of event {} is already firing, letting it finish",
                    handle.job_id(),
                    event_id
                );
                false
            }
            CancelOutcome::AlreadyCancelled => false,
        }
    }

    async fn notify(&self, event: &CalendarEvent, kind: NotificationKind) -> DeliveryOutcome {
        if event.recipients().is_empty() {
            info!("Event {} has no valid participants, nothing to notify", event.id);
            return DeliveryOutcome::Failed(DeliveryFailure::NoValidRecipients);
        }

        let recipients = notification_recipients(event);
        let outcome = self.notifier.deliver(event, &recipients, kind).await;

        match &outcome {
            DeliveryOutcome::Delivered => info!(
                "{:?} of event {} delivered to {} recipients",
                kind,
                event.id,
                recipients.len()
            ),
            DeliveryOutcome::PartiallyDelivered(failed) => warn!(
                "{:?} of event {} could not be delivered to: {:?}",
                kind, event.id, failed
            ),
            DeliveryOutcome::Failed(reason) => error!(
                "{:?} of event {} was not delivered: {}",
                kind, event.id, reason
            ),
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::{RealSys, TokioTimeSys};
    use std::time::Duration as StdDuration;

    const NOW: i64 = 1_700_000_000_000;
    const MINUTE: i64 = 60 * 1000;
    const HOUR: i64 = 60 * MINUTE;

    #[derive(Debug, Clone, PartialEq)]
    struct Delivery {
        event_id: ID,
        start_ts: i64,
        recipients: Vec<String>,
        kind: NotificationKind,
    }

    #[derive(Default)]
    struct RecordingNotifier {
        deliveries: Mutex<Vec<Delivery>>,
        latency: Option<StdDuration>,
    }

    impl RecordingNotifier {
        fn deliveries(&self) -> Vec<Delivery> {
            self.deliveries.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl INotifier for RecordingNotifier {
        async fn deliver(
            &self,
            event: &CalendarEvent,
            recipients: &[String],
            kind: NotificationKind,
        ) -> DeliveryOutcome {
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            self.deliveries.lock().unwrap().push(Delivery {
                event_id: event.id,
                start_ts: event.start_ts,
                recipients: recipients.to_vec(),
                kind,
            });
            DeliveryOutcome::Delivered
        }
    }

    fn setup_with(notifier: RecordingNotifier) -> (ReminderScheduler, Arc<RecordingNotifier>) {
        let notifier = Arc::new(notifier);
        let scheduler = ReminderScheduler::new(
            notifier.clone(),
            Arc::new(TokioTimeSys::new(NOW)),
            Duration::minutes(30),
        );
        (scheduler, notifier)
    }

    fn setup() -> (ReminderScheduler, Arc<RecordingNotifier>) {
        setup_with(Default::default())
    }

    fn event(start_ts: i64, participants: &[&str]) -> CalendarEvent {
        CalendarEvent {
            id: ID::new(),
            title: "Review".into(),
            description: "Design review".into(),
            location: "Room 4".into(),
            start_ts,
            participants: participants.iter().map(|p| p.to_string()).collect(),
            created: NOW,
            updated: NOW,
        }
    }

    async fn sleep_millis(millis: i64) {
        tokio::time::sleep(StdDuration::from_millis(millis as u64)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn schedules_one_pending_job_at_start_minus_lead() {
        let (scheduler, _) = setup();
        let e = event(NOW + 2 * HOUR, &["p@example.com"]);

        let job = scheduler.schedule_for_event(&e).expect("job scheduled");
        assert_eq!(job.fire_ts, e.start_ts - 30 * MINUTE);
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(scheduler.pending_job(&e.id), Some(job));
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fires_and_delivers_at_fire_time() {
        let (scheduler, notifier) = setup();
        let e = event(NOW + 2 * HOUR, &["p@example.com"]);
        scheduler.schedule_for_event(&e);

        sleep_millis(90 * MINUTE - 1000).await;
        assert!(notifier.deliveries().is_empty());

        sleep_millis(2000).await;
        assert_eq!(
            notifier.deliveries(),
            vec![Delivery {
                event_id: e.id,
                start_ts: e.start_ts,
                recipients: vec!["p@example.com".into()],
                kind: NotificationKind::Reminder,
            }]
        );
        assert!(scheduler.pending_job(&e.id).is_none());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn past_fire_time_fires_immediately() {
        let (scheduler, notifier) = setup();
        // Starts in 10 minutes, so the reminder should have gone out 20 minutes ago
        let e = event(NOW + 10 * MINUTE, &["p@example.com"]);

        let job = scheduler.schedule_for_event(&e).expect("job scheduled");
        assert_eq!(job.fire_ts, NOW - 20 * MINUTE);

        sleep_millis(1).await;
        assert_eq!(notifier.deliveries().len(), 1);
        assert!(scheduler.pending_job(&e.id).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn scheduling_twice_keeps_one_job() {
        let (scheduler, notifier) = setup();
        let e = event(NOW + 2 * HOUR, &["p@example.com"]);

        let first = scheduler.schedule_for_event(&e).unwrap();
        let second = scheduler.schedule_for_event(&e).unwrap();
        assert_ne!(first.job_id, second.job_id);
        assert_eq!(scheduler.pending_job(&e.id), Some(second));
        assert_eq!(scheduler.pending_count(), 1);

        sleep_millis(3 * HOUR).await;
        assert_eq!(notifier.deliveries().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_without_job_is_noop() {
        let (scheduler, _) = setup();
        assert!(!scheduler.cancel_for_event(&ID::new()));
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_reminder_fired_is_noop() {
        let (scheduler, notifier) = setup();
        let e = event(NOW + MINUTE, &["p@example.com"]);
        scheduler.schedule_for_event(&e);
        sleep_millis(1).await;
        assert_eq!(notifier.deliveries().len(), 1);

        assert!(!scheduler.cancel_for_event(&e.id));
    }

    #[tokio::test(start_paused = true)]
    async fn reschedule_moves_fire_time() {
        let (scheduler, notifier) = setup();
        let t = NOW + 2 * HOUR;
        let mut e = event(t, &["p@example.com"]);
        let original = scheduler.schedule_for_event(&e).unwrap();

        e.start_ts = t + HOUR;
        let rescheduled = scheduler.reschedule_for_event(&e).unwrap();
        assert_eq!(rescheduled.fire_ts, t + 30 * MINUTE);
        assert_ne!(
            scheduler.pending_job(&e.id).map(|j| j.job_id),
            Some(original.job_id)
        );

        // The original fire time passes without a reminder
        sleep_millis(original.fire_ts - NOW + MINUTE).await;
        assert!(notifier.deliveries().is_empty());

        sleep_millis(HOUR).await;
        let deliveries = notifier.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].start_ts, t + HOUR);
    }

    #[tokio::test(start_paused = true)]
    async fn reschedule_uses_updated_participants() {
        let (scheduler, notifier) = setup();
        let mut e = event(NOW + 2 * HOUR, &["a@x.com"]);
        scheduler.schedule_for_event(&e);

        e.participants.push("b@y.org".into());
        scheduler.reschedule_for_event(&e);

        sleep_millis(2 * HOUR).await;
        let deliveries = notifier.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].recipients, vec!["a@x.com", "b@y.org"]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_reminder_is_never_delivered() {
        let (scheduler, notifier) = setup();
        let e = event(NOW + 2 * HOUR, &["p@example.com"]);
        scheduler.schedule_for_event(&e);

        assert!(scheduler.cancel_for_event(&e.id));
        assert!(scheduler.pending_job(&e.id).is_none());

        sleep_millis(3 * HOUR).await;
        assert!(notifier.deliveries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn event_without_valid_participants_gets_no_job() {
        let (scheduler, notifier) = setup();
        let mut e = event(NOW + 2 * HOUR, &["p@example.com"]);
        scheduler.schedule_for_event(&e);

        e.participants = vec!["bad-address".into()];
        assert!(scheduler.reschedule_for_event(&e).is_none());
        assert!(scheduler.pending_job(&e.id).is_none());

        assert!(scheduler
            .schedule_for_event(&event(NOW + HOUR, &[]))
            .is_none());
        assert_eq!(scheduler.pending_count(), 0);

        sleep_millis(3 * HOUR).await;
        assert!(notifier.deliveries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_while_firing_lets_delivery_finish() {
        let (scheduler, notifier) = setup_with(RecordingNotifier {
            latency: Some(StdDuration::from_secs(10)),
            ..Default::default()
        });
        let e = event(NOW, &["p@example.com"]);
        scheduler.schedule_for_event(&e);

        // The job fired and is now waiting on the slow notifier
        sleep_millis(1000).await;
        assert!(!scheduler.cancel_for_event(&e.id));

        sleep_millis(10_000).await;
        assert_eq!(notifier.deliveries().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn notify_now_ignores_schedule_state() {
        let (scheduler, notifier) = setup();
        let e = event(NOW + 2 * HOUR, &["a@x.com", "a@x.com", " b@y.org", "bad-address"]);

        let outcome = scheduler.notify_now(&e, NotificationKind::Invitation).await;
        assert_eq!(outcome, DeliveryOutcome::Delivered);
        assert_eq!(
            notifier.deliveries(),
            vec![Delivery {
                event_id: e.id,
                start_ts: e.start_ts,
                recipients: vec!["a@x.com".into(), "b@y.org".into(), "bad-address".into()],
                kind: NotificationKind::Invitation,
            }]
        );
        assert!(scheduler.pending_job(&e.id).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn notify_now_without_recipients() {
        let (scheduler, notifier) = setup();
        let outcome = scheduler
            .notify_now(&event(NOW, &["nope"]), NotificationKind::Reminder)
            .await;
        assert_eq!(
            outcome,
            DeliveryOutcome::Failed(DeliveryFailure::NoValidRecipients)
        );
        assert!(notifier.deliveries().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reschedule_and_cancel_leave_at_most_one_job() {
        let notifier = Arc::new(RecordingNotifier::default());
        let scheduler = ReminderScheduler::new(
            notifier.clone(),
            Arc::new(RealSys {}),
            Duration::zero(),
        );
        let e = event(RealSys {}.get_timestamp_millis() + 2000, &["p@example.com"]);

        let mut tasks = Vec::new();
        for i in 0..64 {
            let scheduler = scheduler.clone();
            let e = e.clone();
            tasks.push(tokio::spawn(async move {
                if i % 3 == 0 {
                    scheduler.cancel_for_event(&e.id);
                } else {
                    scheduler.reschedule_for_event(&e);
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        // Leave the registry in a known final state
        scheduler.reschedule_for_event(&e);
        assert_eq!(scheduler.pending_count(), 1);

        tokio::time::sleep(StdDuration::from_millis(3000)).await;
        assert_eq!(notifier.deliveries().len(), 1);
        assert_eq!(scheduler.pending_count(), 0);
    }
}
