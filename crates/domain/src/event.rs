use crate::{
    email::EmailAddress,
    shared::entity::{Entity, ID},
};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A calendar item with a start time and a set of invited participants.
///
/// Owned by the event store; the reminder subsystem only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: ID,
    pub title: String,
    pub description: String,
    pub location: String,
    /// Start of the event in unix millis
    pub start_ts: i64,
    /// Email addresses of the invited participants
    pub participants: Vec<String>,
    pub created: i64,
    pub updated: i64,
}

impl Entity for CalendarEvent {
    fn id(&self) -> &ID {
        &self.id
    }
}

impl CalendarEvent {
    /// The participants that can actually be reached by email.
    /// Malformed entries are skipped and duplicates are only returned once.
    pub fn recipients(&self) -> Vec<EmailAddress> {
        let mut recipients: Vec<EmailAddress> = Vec::with_capacity(self.participants.len());
        for address in self
            .participants
            .iter()
            .filter_map(|p| EmailAddress::parse(p).ok())
        {
            if !recipients.contains(&address) {
                recipients.push(address);
            }
        }
        recipients
    }

    /// Adds the given participants unless they are already invited
    pub fn add_participants(&mut self, participants: &[String]) -> bool {
        let mut changed = false;
        for participant in participants {
            let participant = participant.trim();
            if !self.participants.iter().any(|p| p.trim() == participant) {
                self.participants.push(participant.to_string());
                changed = true;
            }
        }
        changed
    }

    pub fn message_body(&self) -> String {
        let date = match Utc.timestamp_millis_opt(self.start_ts).single() {
            Some(date) => date.format("%Y-%m-%d %H:%M").to_string(),
            None => self.start_ts.to_string(),
        };
        format!(
            "You are invited to the event {}\n Description: {}\n location {}\n invited: {}\n on the date {}",
            self.title,
            self.description,
            self.location,
            self.participants.join(", "),
            date
        )
    }
}
