use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{ConversationStats, MessageTypeCount, StatsOverview, StatusShare};
use crate::repository::ConversationRepository;
use crate::table::Table;

/// A report and its filters, as plain data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum ReportRequest {
    /// Recent customer messages, newest first
    CustomerMessages {
        #[serde(default)]
        limit: Option<u32>,
        #[serde(default)]
        days_back: Option<u32>,
    },
    /// Customer messages for one contact
    CustomerMessagesByContact {
        #[serde(default)]
        external_id: Option<String>,
        #[serde(default)]
        phone_number: Option<String>,
    },
    /// Per-agent message counts and latency
    AgentPerformance,
    /// Agent replies with a measured response time
    ResponseTimes {
        #[serde(default)]
        agent_name: Option<String>,
        #[serde(default)]
        days_back: Option<u32>,
    },
    /// One row per conversation with counts and agents
    ConversationSummary {
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        days_back: Option<u32>,
    },
    /// Full transcript of one conversation
    ConversationMessages {
        conversation_id: i64,
    },
    /// Contact directory
    Contacts {
        #[serde(default)]
        has_external_id: Option<bool>,
    },
    /// Conversations of one contact
    ContactConversationHistory {
        #[serde(default)]
        external_id: Option<String>,
        #[serde(default)]
        phone_number: Option<String>,
    },
    /// Message counts per day and author
    DailyMessageVolume {
        #[serde(default)]
        days_back: Option<u32>,
    },
    /// Conversation count and share per status
    ConversationStatusDistribution,
    /// Totals and first/last message times
    StatsOverview,
    /// Message counts per author class
    MessageTypeBreakdown,
}

impl ReportRequest {
    /// Stable report name, as used in logs and metrics
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CustomerMessages { .. } => "customer_messages",
            Self::CustomerMessagesByContact { .. } => "customer_messages_by_contact",
            Self::AgentPerformance => "agent_performance",
            Self::ResponseTimes { .. } => "response_times",
            Self::ConversationSummary { .. } => "conversation_summary",
            Self::ConversationMessages { .. } => "conversation_messages",
            Self::Contacts { .. } => "contacts",
            Self::ContactConversationHistory { .. } => "contact_conversation_history",
            Self::DailyMessageVolume { .. } => "daily_message_volume",
            Self::ConversationStatusDistribution => "conversation_status_distribution",
            Self::StatsOverview => "stats_overview",
            Self::MessageTypeBreakdown => "message_type_breakdown",
        }
    }
}

/// Runs report requests against a repository
pub struct ReportService<R> {
    repository: R,
}

impl<R: ConversationRepository> ReportService<R> {
    /// Wrap a repository
    pub const fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Borrow the wrapped repository
    pub const fn repository(&self) -> &R {
        &self.repository
    }

    /// Mutably borrow the wrapped repository
    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repository
    }

    /// Unwrap the repository
    pub fn into_inner(self) -> R {
        self.repository
    }

    /// Dispatch one request
    pub fn run(&mut self, request: &ReportRequest) -> Result<Table> {
        tracing::debug!(report = request.name(), "Running report");
        let repo = &mut self.repository;
        match request {
            ReportRequest::CustomerMessages { limit, days_back } => repo.customer_messages(*limit, *days_back),
            ReportRequest::CustomerMessagesByContact {
                external_id,
                phone_number,
            } => repo.customer_messages_by_contact(external_id.as_deref(), phone_number.as_deref()),
            ReportRequest::AgentPerformance => repo.agent_performance(),
            ReportRequest::ResponseTimes { agent_name, days_back } => {
                repo.response_times(agent_name.as_deref(), *days_back)
            },
            ReportRequest::ConversationSummary { status, days_back } => {
                repo.conversation_summary(status.as_deref(), *days_back)
            },
            ReportRequest::ConversationMessages { conversation_id } => repo.conversation_messages(*conversation_id),
            ReportRequest::Contacts { has_external_id } => repo.contacts(*has_external_id),
            ReportRequest::ContactConversationHistory {
                external_id,
                phone_number,
            } => repo.contact_conversation_history(external_id.as_deref(), phone_number.as_deref()),
            ReportRequest::DailyMessageVolume { days_back } => repo.daily_message_volume(*days_back),
            ReportRequest::ConversationStatusDistribution => repo.conversation_status_distribution(),
            ReportRequest::StatsOverview => repo.stats_overview(),
            ReportRequest::MessageTypeBreakdown => repo.message_type_breakdown(),
        }
    }

    /// Dispatch one request and deserialize its rows
    pub fn run_typed<T: DeserializeOwned>(&mut self, request: &ReportRequest) -> Result<Vec<T>> {
        self.run(request)?.deserialize()
    }

    /// Overview, author breakdown and status distribution in one call.
    ///
    /// An empty overview (no conversations, or a fail-soft failure) reads as
    /// all-zero totals.
    pub fn conversation_stats(&mut self) -> Result<ConversationStats> {
        let overview = self
            .run_typed::<StatsOverview>(&ReportRequest::StatsOverview)?
            .into_iter()
            .next()
            .unwrap_or(StatsOverview {
                total_conversations: 0,
                total_messages: 0,
                earliest_message: None,
                latest_message: None,
            });
        let message_types = self.run_typed::<MessageTypeCount>(&ReportRequest::MessageTypeBreakdown)?;
        let status_distribution = self.run_typed::<StatusShare>(&ReportRequest::ConversationStatusDistribution)?;

        Ok(ConversationStats {
            overview,
            message_types,
            status_distribution,
        })
    }
}
