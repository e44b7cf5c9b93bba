// Structured event log (NEP-297). Every state change is written as
// `EVENT_JSON:{"standard":"voting","version":"1.0.0","event":..,"data":{..}}`
// so indexers can follow a session without reading contract state.

use near_sdk::serde::Serialize;
use near_sdk::{env, AccountId};

use crate::types::WorkflowStatus;

pub const EVENT_STANDARD: &str = "voting";
pub const EVENT_VERSION: &str = "1.0.0";
const EVENT_JSON_PREFIX: &str = "EVENT_JSON:";

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(crate = "near_sdk::serde")]
#[serde(tag = "event", content = "data")]
pub enum VotingEvent {
    VoterRegistered {
        voter_address: AccountId,
    },
    ProposalRegistered {
        proposal_id: u64,
    },
    Voted {
        voter: AccountId,
        proposal_id: u64,
    },
    WorkflowStatusChange {
        previous_status: WorkflowStatus,
        new_status: WorkflowStatus,
    },
}

#[derive(Serialize)]
#[serde(crate = "near_sdk::serde")]
struct EventLog<'a> {
    standard: &'static str,
    version: &'static str,
    #[serde(flatten)]
    event: &'a VotingEvent,
}

impl VotingEvent {
    fn to_json_string(&self) -> String {
        let log = EventLog { standard: EVENT_STANDARD, version: EVENT_VERSION, event: self };
        serde_json::to_string(&log)
            .unwrap_or_else(|err| env::panic_str(&format!("Failed to serialize event: {}", err)))
    }

    pub fn emit(&self) {
        env::log_str(&format!("{}{}", EVENT_JSON_PREFIX, self.to_json_string()));
    }
}

/// Events found in a batch of log lines, in emission order. Lines that are
/// not NEP-297 events are skipped.
#[cfg(test)]
pub(crate) fn parse_event_logs(logs: &[String]) -> Vec<serde_json::Value> {
    logs.iter()
        .filter_map(|line| line.strip_prefix(EVENT_JSON_PREFIX))
        .filter_map(|payload| serde_json::from_str(payload).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_envelope() {
        let event = VotingEvent::Voted { voter: "alice.near".parse().unwrap(), proposal_id: 2 };
        let value: serde_json::Value = serde_json::from_str(&event.to_json_string()).unwrap();
        assert_eq!(
            value,
            json!({
                "standard": "voting",
                "version": "1.0.0",
                "event": "Voted",
                "data": { "voter": "alice.near", "proposal_id": 2 }
            })
        );
    }

    #[test]
    fn test_status_change_payload() {
        let event = VotingEvent::WorkflowStatusChange {
            previous_status: WorkflowStatus::VotingSessionEnded,
            new_status: WorkflowStatus::VotesTallied,
        };
        let value: serde_json::Value = serde_json::from_str(&event.to_json_string()).unwrap();
        assert_eq!(value["event"], "WorkflowStatusChange");
        assert_eq!(
            value["data"],
            json!({ "previous_status": "VotingSessionEnded", "new_status": "VotesTallied" })
        );
    }

    #[test]
    fn test_parse_event_logs_skips_plain_lines() {
        let logs = vec![
            "plain log line".to_string(),
            format!("{}{}", EVENT_JSON_PREFIX, VotingEvent::ProposalRegistered { proposal_id: 1 }.to_json_string()),
        ];
        let events = parse_event_logs(&logs);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["data"]["proposal_id"], 1);
    }
}
