//! The external stdin/stdout JSON contract (SPEC_FULL §6), modeled on
//! the teacher's `HookInput`/`HookOutput` shapes.

use serde::{Deserialize, Serialize};

use codingbuddy_guard_core::GuardConfig;
use codingbuddy_guard_observe::{AuditLog, DecisionCache};
use codingbuddy_guard_policy::decide;

#[derive(Debug, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub tool_input: ToolInput,
}

#[derive(Debug, Default, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub command: String,
}

#[derive(Debug, Serialize)]
pub struct HookOutput {
    #[serde(rename = "hookSpecificOutput")]
    pub hook_specific_output: HookSpecificOutput,
}

#[derive(Debug, Serialize)]
pub struct HookSpecificOutput {
    #[serde(rename = "hookEventName")]
    pub hook_event_name: String,
    #[serde(rename = "permissionDecision")]
    pub permission_decision: String,
    #[serde(rename = "permissionDecisionReason")]
    pub permission_decision_reason: String,
}

impl HookOutput {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self::new("allow", reason)
    }

    pub fn ask(reason: impl Into<String>) -> Self {
        Self::new("ask", reason)
    }

    fn new(decision: &str, reason: impl Into<String>) -> Self {
        Self {
            hook_specific_output: HookSpecificOutput {
                hook_event_name: "PreToolUse".to_string(),
                permission_decision: decision.to_string(),
                permission_decision_reason: reason.into(),
            },
        }
    }
}

/// Parses the stdin JSON envelope. On malformed JSON or a missing
/// `tool_input.command`, returns an empty command string — `decide` then
/// resolves that to the "Empty command" / "Bad input" `ask` reason
/// itself (SPEC_FULL §7).
pub fn parse_input(stdin: &str) -> String {
    serde_json::from_str::<HookInput>(stdin)
        .map(|i| i.tool_input.command)
        .unwrap_or_default()
}

/// Runs one full hook invocation: parse stdin, classify, emit the JSON
/// decision, and record it to the audit log / decision cache. Returns
/// the JSON string to print to stdout; the caller is responsible for
/// the process's always-zero exit code (SPEC_FULL §6).
pub fn run(stdin: &str, config: &GuardConfig) -> String {
    let command = parse_input(stdin);
    let verdict = decide(&command);
    let decision_str = if verdict.decision.is_safe() { "allow" } else { "ask" };

    let cache = DecisionCache::new(
        codingbuddy_guard_observe::default_cache_dir(),
        config.cache_ttl_secs,
    );

    // The decision itself is always freshly derived above — only the
    // audit-log reason is reused on a cache hit (SPEC_FULL §10.4).
    let reason_for_log = match cache.get(&command) {
        Some(cached) => cached.reason,
        None => verdict.reason.clone(),
    };

    let audit = AuditLog::new(config.audit_log_path());
    audit.record(&command, decision_str, &reason_for_log);
    cache.set(&command, decision_str, &reason_for_log);

    let output = if verdict.decision.is_safe() {
        HookOutput::allow(verdict.reason)
    } else {
        HookOutput::ask(verdict.reason)
    };
    serde_json::to_string(&output).unwrap_or_else(|_| {
        r#"{"hookSpecificOutput":{"hookEventName":"PreToolUse","permissionDecision":"ask","permissionDecisionReason":"internal serialization fault"}}"#.to_string()
    })
}
