use super::{
    create_event::CreateEventUseCase,
    delete_event::DeleteEventUseCase,
    update_event::{UpdateEventUseCase, UpdatedEvent},
};
use crate::shared::usecase::Subscriber;
use reminders_domain::{CalendarEvent, NotificationKind};
use reminders_infra::ReminderContext;
use tracing_futures::Instrument;

pub struct ScheduleReminderOnEventCreated;

#[async_trait::async_trait(?Send)]
impl Subscriber<CreateEventUseCase> for ScheduleReminderOnEventCreated {
    async fn notify(&self, e: &CalendarEvent, ctx: &ReminderContext) {
        ctx.reminders.schedule_for_event(e);
    }
}

/// Invites the participants of a new event right away, when enabled
pub struct SendInvitationOnEventCreated;

#[async_trait::async_trait(?Send)]
impl Subscriber<CreateEventUseCase> for SendInvitationOnEventCreated {
    async fn notify(&self, e: &CalendarEvent, ctx: &ReminderContext) {
        if !ctx.config.send_invitations {
            return;
        }
        let reminders = ctx.reminders.clone();
        let span = tracing::info_span!("Sending invitation", event_id = %e.id);
        let e = e.clone();
        // Sideeffect, the caller does not wait for the mail relay
        tokio::spawn(
            async move {
                reminders.notify_now(&e, NotificationKind::Invitation).await;
            }
            .instrument(span),
        );
    }
}

pub struct RescheduleReminderOnEventUpdated;

#[async_trait::async_trait(?Send)]
impl Subscriber<UpdateEventUseCase> for RescheduleReminderOnEventUpdated {
    async fn notify(&self, res: &UpdatedEvent, ctx: &ReminderContext) {
        if !res.reminder_affected {
            return;
        }
        // A delete may commit between the save of this update and now. Its own
        // cancel runs after its commit, so checking the store again after the
        // reschedule guarantees that no job outlives a deleted event.
        let event_id = res.event.id;
        let e = match ctx.repos.events.find(&event_id).await {
            Some(e) => e,
            None => return,
        };
        ctx.reminders.reschedule_for_event(&e);
        if ctx.repos.events.find(&event_id).await.is_none() {
            ctx.reminders.cancel_for_event(&event_id);
        }
    }
}

pub struct CancelReminderOnEventDeleted;

#[async_trait::async_trait(?Send)]
impl Subscriber<DeleteEventUseCase> for CancelReminderOnEventDeleted {
    async fn notify(&self, e: &CalendarEvent, ctx: &ReminderContext) {
        ctx.reminders.cancel_for_event(&e.id);
    }
}
