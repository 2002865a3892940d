use chrono::Utc;

use crate::db::DataAccess;
use crate::error::Result;
use crate::reports::{self, ContactLookup};
use crate::table::Table;

/// The report surface over the Chatwoot schema.
///
/// Contact-scoped reports fail with
/// [`ReportError::InvalidArgument`](crate::error::ReportError::InvalidArgument)
/// when neither identifier is given. How infrastructure failures surface is up
/// to the implementation; [`DataAccess`] follows its
/// [`FailurePolicy`](crate::db::FailurePolicy).
pub trait ConversationRepository {
    /// Customer-authored messages, newest first
    fn customer_messages(&mut self, limit: Option<u32>, days_back: Option<u32>) -> Result<Table>;

    /// Customer messages for one contact, oldest first
    fn customer_messages_by_contact(&mut self, external_id: Option<&str>, phone_number: Option<&str>) -> Result<Table>;

    /// Per-agent message count, latency, conversations and message length
    fn agent_performance(&mut self) -> Result<Table>;

    /// Agent reply latencies; `None` window uses the configured default
    fn response_times(&mut self, agent_name: Option<&str>, days_back: Option<u32>) -> Result<Table>;

    /// Conversations with counters, contact and assigned agent
    fn conversation_summary(&mut self, status: Option<&str>, days_back: Option<u32>) -> Result<Table>;

    /// Every message of one conversation, oldest first
    fn conversation_messages(&mut self, conversation_id: i64) -> Result<Table>;

    /// Contacts, optionally only those with (or without) an external identifier
    fn contacts(&mut self, has_external_id: Option<bool>) -> Result<Table>;

    /// One contact's conversations, newest first
    fn contact_conversation_history(&mut self, external_id: Option<&str>, phone_number: Option<&str>) -> Result<Table>;

    /// Messages per day; `None` window uses the configured default
    fn daily_message_volume(&mut self, days_back: Option<u32>) -> Result<Table>;

    /// Count and percentage per conversation status
    fn conversation_status_distribution(&mut self) -> Result<Table>;

    /// Whole-dataset totals
    fn stats_overview(&mut self) -> Result<Table>;

    /// Message counts per author class
    fn message_type_breakdown(&mut self) -> Result<Table>;
}

impl ConversationRepository for DataAccess {
    fn customer_messages(&mut self, limit: Option<u32>, days_back: Option<u32>) -> Result<Table> {
        let statement = reports::customer_messages(limit, days_back, Utc::now())?;
        self.run_report("customer_messages", &statement)
    }

    fn customer_messages_by_contact(&mut self, external_id: Option<&str>, phone_number: Option<&str>) -> Result<Table> {
        let lookup = ContactLookup::from_parts(external_id, phone_number)?;
        self.run_report("customer_messages_by_contact", &reports::customer_messages_by_contact(&lookup))
    }

    fn agent_performance(&mut self) -> Result<Table> {
        self.run_report("agent_performance", &reports::agent_performance())
    }

    fn response_times(&mut self, agent_name: Option<&str>, days_back: Option<u32>) -> Result<Table> {
        let days_back = days_back.unwrap_or(self.defaults.response_window_days);
        let statement = reports::response_times(agent_name, days_back, Utc::now())?;
        self.run_report("response_times", &statement)
    }

    fn conversation_summary(&mut self, status: Option<&str>, days_back: Option<u32>) -> Result<Table> {
        let statement = reports::conversation_summary(status, days_back, Utc::now())?;
        self.run_report("conversation_summary", &statement)
    }

    fn conversation_messages(&mut self, conversation_id: i64) -> Result<Table> {
        self.run_report("conversation_messages", &reports::conversation_messages(conversation_id))
    }

    fn contacts(&mut self, has_external_id: Option<bool>) -> Result<Table> {
        self.run_report("contacts", &reports::contacts(has_external_id))
    }

    fn contact_conversation_history(&mut self, external_id: Option<&str>, phone_number: Option<&str>) -> Result<Table> {
        let lookup = ContactLookup::from_parts(external_id, phone_number)?;
        self.run_report("contact_conversation_history", &reports::contact_conversation_history(&lookup))
    }

    fn daily_message_volume(&mut self, days_back: Option<u32>) -> Result<Table> {
        let days_back = days_back.unwrap_or(self.defaults.volume_window_days);
        let statement = reports::daily_message_volume(days_back, Utc::now())?;
        self.run_report("daily_message_volume", &statement)
    }

    fn conversation_status_distribution(&mut self) -> Result<Table> {
        self.run_report("conversation_status_distribution", &reports::conversation_status_distribution())
    }

    fn stats_overview(&mut self) -> Result<Table> {
        self.run_report("stats_overview", &reports::stats_overview())
    }

    fn message_type_breakdown(&mut self) -> Result<Table> {
        self.run_report("message_type_breakdown", &reports::message_type_breakdown())
    }
}
