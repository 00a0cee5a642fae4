//! Action types for network provisioning

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Represents a planned control-plane call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Unique identifier for the action
    pub id: String,

    /// Type of action to perform
    pub action_type: ActionType,

    /// Resource type (e.g., "vpc", "subnet", "route-table")
    pub resource_type: String,

    /// Name of the resource the action applies to
    pub resource_name: String,

    /// Description of the action
    pub description: String,

    /// Additional details about the action
    pub details: HashMap<String, serde_json::Value>,
}

impl Action {
    pub fn new(
        id: impl Into<String>,
        action_type: ActionType,
        resource_type: impl Into<String>,
        resource_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            action_type,
            resource_type: resource_type.into(),
            resource_name: resource_name.into(),
            description: description.into(),
            details: HashMap::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new resource
    Create,
    /// Tag a resource
    Tag,
    /// Modify an attribute of a resource
    Modify,
    /// Attach one resource to another
    Attach,
    /// Associate a subnet with a route table
    Associate,
    /// Wait for a resource to become available
    Wait,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Tag => write!(f, "tag"),
            ActionType::Modify => write!(f, "modify"),
            ActionType::Attach => write!(f, "attach"),
            ActionType::Associate => write!(f, "associate"),
            ActionType::Wait => write!(f, "wait"),
        }
    }
}

/// Result of applying actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    /// Successfully applied actions
    pub succeeded: Vec<ActionResult>,

    /// Failed actions
    pub failed: Vec<ActionResult>,

    /// Actions not attempted because an input was never produced
    pub skipped: Vec<ActionResult>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    pub fn add_success(&mut self, action_id: String, message: String) {
        self.succeeded.push(ActionResult {
            action_id,
            status: ActionStatus::Succeeded,
            message,
            error: None,
        });
    }

    pub fn add_failure(&mut self, action_id: String, error: String) {
        self.failed.push(ActionResult {
            action_id,
            status: ActionStatus::Failed,
            message: String::new(),
            error: Some(error),
        });
    }

    pub fn add_skipped(&mut self, action_id: String, reason: String) {
        self.skipped.push(ActionResult {
            action_id,
            status: ActionStatus::Skipped,
            message: reason,
            error: None,
        });
    }

    /// Whether an outcome has already been recorded for the action
    pub fn contains(&self, action_id: &str) -> bool {
        self.succeeded
            .iter()
            .chain(&self.failed)
            .chain(&self.skipped)
            .any(|r| r.action_id == action_id)
    }

    /// Look up the outcome of one action
    pub fn status_of(&self, action_id: &str) -> Option<ActionStatus> {
        self.succeeded
            .iter()
            .chain(&self.failed)
            .chain(&self.skipped)
            .find(|r| r.action_id == action_id)
            .map(|r| r.status)
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped.len()
    }
}

impl Default for ApplyResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a single action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Succeeded,
    Failed,
    Skipped,
}

/// Result of a single action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// ID of the action
    pub action_id: String,

    pub status: ActionStatus,

    /// Success message, or the reason the action was skipped
    pub message: String,

    /// Error message if failed
    pub error: Option<String>,
}

/// Plan containing all actions to be applied, in order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// List of actions to perform
    pub actions: Vec<Action>,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, action_id: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.id == action_id)
    }

    /// Get actions by type
    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    /// Summary of the plan
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            tag: self.actions_by_type(ActionType::Tag).len(),
            modify: self.actions_by_type(ActionType::Modify).len(),
            attach: self.actions_by_type(ActionType::Attach).len(),
            associate: self.actions_by_type(ActionType::Associate).len(),
            wait: self.actions_by_type(ActionType::Wait).len(),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub tag: usize,
    pub modify: usize,
    pub attach: usize,
    pub associate: usize,
    pub wait: usize,
}

impl PlanSummary {
    pub fn total(&self) -> usize {
        self.create + self.tag + self.modify + self.attach + self.associate + self.wait
    }
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to tag, {} to modify, {} to attach, {} to associate, {} to wait for",
            self.create, self.tag, self.modify, self.attach, self.associate, self.wait
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(id: &str, action_type: ActionType) -> Action {
        Action::new(id, action_type, "vpc", "skills-vpc", "test")
    }

    #[test]
    fn test_plan_summary() {
        let plan = Plan::new(vec![
            action("create:vpc:skills-vpc", ActionType::Create),
            action("tag:vpc:skills-vpc", ActionType::Tag),
            action("modify:vpc:skills-vpc/dns-support", ActionType::Modify),
        ]);

        let summary = plan.summary();
        assert_eq!(summary.create, 1);
        assert_eq!(summary.tag, 1);
        assert_eq!(summary.modify, 1);
        assert_eq!(summary.total(), 3);
        assert_eq!(
            summary.to_string(),
            "1 to create, 1 to tag, 1 to modify, 0 to attach, 0 to associate, 0 to wait for"
        );
    }

    #[test]
    fn test_apply_result_outcomes() {
        let mut result = ApplyResult::new();
        assert!(result.is_success());

        result.add_success("a".to_string(), "ok".to_string());
        assert!(result.is_success());

        result.add_skipped("b".to_string(), "vpc missing".to_string());
        assert!(!result.is_success());
        assert_eq!(result.status_of("b"), Some(ActionStatus::Skipped));

        result.add_failure("c".to_string(), "boom".to_string());
        assert!(result.contains("c"));
        assert!(!result.contains("d"));
        assert_eq!(result.total(), 3);
    }
}
