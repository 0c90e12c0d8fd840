//! Command-safety decision engine.
//!
//! `decide` is the single public entry point: given a raw shell command
//! string, parse it into simple commands, classify each one, and
//! aggregate into one verdict. The engine never blocks outright — it
//! either allows or defers to the user.

pub mod classify;
pub mod rules;
pub mod shell_parse;

use codingbuddy_guard_core::Decision;
use codingbuddy_guard_errors::GuardError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardVerdict {
    pub decision: Decision,
    pub reason: String,
}

impl GuardVerdict {
    fn safe() -> Self {
        Self {
            decision: Decision::Safe,
            reason: "all commands safe".to_string(),
        }
    }

    fn unknown(reason: String) -> Self {
        Self {
            decision: Decision::Unknown,
            reason,
        }
    }
}

/// Classifies a full command string (SPEC_FULL §2, §4.3, §5 aggregator).
pub fn decide(raw_command: &str) -> GuardVerdict {
    let trimmed = raw_command.trim();
    if trimmed.is_empty() {
        return GuardVerdict::unknown(GuardError::EmptyCommand.reason());
    }

    let commands = match shell_parse::extract_commands(raw_command) {
        Some(c) => c,
        None => return GuardVerdict::unknown(GuardError::ParseOrRedirectFault.reason()),
    };

    if commands.is_empty() {
        return GuardVerdict::unknown(GuardError::NoCommands.reason());
    }

    for cmd in &commands {
        if !classify::classify_command(cmd).is_safe() {
            let token = cmd.first().cloned().unwrap_or_default();
            return GuardVerdict::unknown(GuardError::UnknownCommand { token }.reason());
        }
    }

    GuardVerdict::safe()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_allow(cmd: &str) -> bool {
        decide(cmd).decision.is_safe()
    }

    // ── §8 end-to-end scenarios ──

    #[test]
    fn scenario_aws_global_flags() {
        assert!(is_allow(
            "aws --profile prod --region us-west-2 lambda list-functions"
        ));
    }

    #[test]
    fn scenario_chained_command_with_unsafe_tail() {
        assert!(!is_allow("git status && git push"));
    }

    #[test]
    fn scenario_find_delete() {
        assert!(!is_allow("find . -name '*.py' -delete"));
    }

    #[test]
    fn scenario_curl_post_vs_safe_get() {
        assert!(!is_allow("curl -X POST https://example.com"));
        assert!(is_allow(
            "curl -s -o /dev/null -w '%{http_code}' https://example.com"
        ));
    }

    #[test]
    fn scenario_bash_lc_recursion() {
        assert!(is_allow("bash -lc 'git status && ls -la'"));
        assert!(!is_allow("bash -lc 'rm foo'"));
    }

    #[test]
    fn scenario_output_redirects() {
        assert!(!is_allow("ls > file.txt"));
        assert!(is_allow("ls 2>/dev/null"));
        assert!(is_allow("ls 2>&1"));
    }

    #[test]
    fn scenario_gh_api_method() {
        assert!(!is_allow("gh api -X POST repos/o/r/issues"));
        assert!(is_allow("gh api -X GET search/issues -f q=repo:o/r"));
    }

    #[test]
    fn scenario_az_depth_override() {
        assert!(is_allow(
            "az cognitiveservices account deployment show --name a --resource-group r --deployment-name d"
        ));
        assert!(!is_allow(
            "az cognitiveservices account deployment create --name a --resource-group r --deployment-name d"
        ));
    }

    #[test]
    fn scenario_xargs() {
        assert!(!is_allow("xargs -I {} rm {}"));
        assert!(is_allow("find . -name '*.py' | xargs grep TODO"));
    }

    // ── supplemented regression fixtures from the original hook (§11) ──

    #[test]
    fn regression_git_config_and_stash() {
        assert!(is_allow("git config --get user.name"));
        assert!(!is_allow("git config user.name foo"));
        assert!(is_allow("git stash list"));
        assert!(!is_allow("git stash pop"));
    }

    #[test]
    fn regression_git_dash_c_flags() {
        assert!(is_allow("git -C /some/path status"));
        assert!(!is_allow("git -C /tmp push --force"));
        assert!(is_allow("git --git-dir=/some/.git status"));
        assert!(is_allow("git -c core.editor=vim log"));
    }

    #[test]
    fn regression_uv_run_vs_uv_sync() {
        assert!(is_allow("uv run cdk synth --quiet"));
        assert!(!is_allow("uv run cdk deploy"));
        assert!(!is_allow("uv sync"));
    }

    #[test]
    fn regression_variable_assignment_prefix() {
        assert!(is_allow("FOO=BAR ls -l"));
        assert!(!is_allow("FOO=BAR rm file"));
    }

    #[test]
    fn regression_nested_wrappers() {
        assert!(is_allow("time nice git status"));
    }

    #[test]
    fn empty_command_defers() {
        let v = decide("");
        assert_eq!(v.decision, Decision::Unknown);
    }

    #[test]
    fn whitespace_only_command_defers() {
        let v = decide("   ");
        assert_eq!(v.decision, Decision::Unknown);
    }

    #[test]
    fn unknown_command_reason_mentions_first_token() {
        let v = decide("rm -rf /tmp/x");
        assert!(v.reason.contains("rm"));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // Conservatism invariant (§8): any output redirect whose target is
    // not /dev/null must defer, regardless of the left-hand command.
    proptest! {
        #[test]
        fn conservatism_on_arbitrary_redirect_targets(target in "[a-z]{1,8}\\.txt") {
            let cmd = format!("ls > {target}");
            prop_assert!(!decide(&cmd).decision.is_safe());
        }

        #[test]
        fn help_monotonicity(cmd in "[a-z]{1,10}") {
            let full = format!("{cmd} --help");
            prop_assert!(decide(&full).decision.is_safe());
        }

        #[test]
        fn determinism(cmd in "(ls|pwd|whoami|date)( -[a-z])?") {
            let a = decide(&cmd);
            let b = decide(&cmd);
            prop_assert_eq!(a, b);
        }
    }
}
