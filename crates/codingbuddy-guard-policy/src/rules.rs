//! Static rule tables consulted by the classifier (SPEC_FULL §3-4).
//!
//! Everything here is process-wide immutable data: no table is ever
//! mutated after the first lookup, and classification never reads from
//! anything but these tables plus the command under test.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Bare command names unconditionally safe regardless of arguments.
pub static SAFE_COMMANDS: LazyLock<std::collections::HashSet<&'static str>> = LazyLock::new(|| {
    [
        "ls", "pwd", "whoami", "date", "cat", "head", "tail", "wc", "diff", "file", "which",
        "grep", "printenv", "uname", "id", "hostname",
    ]
    .into_iter()
    .collect()
});

/// Basenames of local utility scripts safe regardless of invocation path.
pub static SAFE_SCRIPTS: LazyLock<std::collections::HashSet<&'static str>> =
    LazyLock::new(|| ["shellcheck", "rustfmt"].into_iter().collect());

/// Basenames evaluated as if the command were `curl …` (§4.7 `check_curl`).
pub static CURL_WRAPPERS: LazyLock<std::collections::HashSet<&'static str>> =
    LazyLock::new(|| ["curl"].into_iter().collect());

/// Multi-token literal prefixes. Matching requires exact token-by-token
/// string equality, not substring containment — `pre-commit-hook` must
/// never match the `pre-commit` entry.
pub static PREFIX_COMMANDS: LazyLock<Vec<Vec<&'static str>>> = LazyLock::new(|| {
    vec![
        vec!["git", "config", "--get"],
        vec!["git", "config", "--list"],
        vec!["git", "stash", "list"],
        vec!["node", "--version"],
        vec!["python", "--version"],
        vec!["pre-commit"],
    ]
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapperPolicy {
    DropN(usize),
    DropFlagsAndAssignments,
    DropNiceFlags,
}

/// Wrapper key token sequences and their stripping policy, tried in
/// order. A wrapper's prefix must match the leading tokens exactly.
pub static WRAPPERS: LazyLock<Vec<(&'static [&'static str], WrapperPolicy)>> = LazyLock::new(|| {
    vec![
        (&["time"], WrapperPolicy::DropN(0)),
        (&["nice"], WrapperPolicy::DropNiceFlags),
        (&["timeout"], WrapperPolicy::DropN(1)),
        (&["env"], WrapperPolicy::DropFlagsAndAssignments),
        (&["uv", "run"], WrapperPolicy::DropFlagsAndAssignments),
    ]
});

#[derive(Debug, Clone, Copy)]
pub enum CliParser {
    /// `aws <service> <action>`, with a literal `help` positional treated
    /// as the action itself (SPEC_FULL §9, open question 1).
    Aws,
    FirstToken,
    SecondToken,
    VariableDepth {
        action_depth: usize,
        service_depths: &'static [(&'static str, usize)],
        subservice_depths: &'static [(&'static [&'static str], usize)],
    },
}

pub struct CliConfig {
    pub safe_actions: &'static [&'static str],
    pub safe_prefixes: &'static [&'static str],
    pub parser: CliParser,
    pub flags_with_arg: &'static [&'static str],
}

pub static CLI_CONFIGS: LazyLock<HashMap<&'static str, CliConfig>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert(
        "aws",
        CliConfig {
            safe_actions: &["ls", "help"],
            safe_prefixes: &["describe-", "get-", "head-", "list-"],
            parser: CliParser::Aws,
            flags_with_arg: &["--profile", "--region", "--output", "--endpoint-url"],
        },
    );
    m.insert(
        "az",
        CliConfig {
            safe_actions: &["list", "show"],
            safe_prefixes: &["get-", "list-"],
            parser: CliParser::VariableDepth {
                action_depth: 1,
                service_depths: &[],
                subservice_depths: &[(&["cognitiveservices", "account", "deployment"], 3)],
            },
            flags_with_arg: &[],
        },
    );
    m.insert(
        "gcloud",
        CliConfig {
            safe_actions: &["list", "describe"],
            safe_prefixes: &["get-", "list-"],
            parser: CliParser::VariableDepth {
                action_depth: 1,
                service_depths: &[],
                subservice_depths: &[],
            },
            flags_with_arg: &[],
        },
    );
    m.insert(
        "gh",
        CliConfig {
            safe_actions: &["checks", "diff", "list", "search", "status", "view"],
            safe_prefixes: &[],
            parser: CliParser::SecondToken,
            flags_with_arg: &[],
        },
    );
    m.insert(
        "docker",
        CliConfig {
            safe_actions: &[
                "diff", "events", "history", "images", "inspect", "logs", "port", "ps", "stats",
                "top",
            ],
            safe_prefixes: &[],
            parser: CliParser::FirstToken,
            flags_with_arg: &[],
        },
    );
    m.insert(
        "brew",
        CliConfig {
            safe_actions: &[
                "config", "deps", "desc", "doctor", "info", "leaves", "list", "options",
                "outdated", "search", "uses",
            ],
            safe_prefixes: &[],
            parser: CliParser::FirstToken,
            flags_with_arg: &[],
        },
    );
    m.insert(
        "git",
        CliConfig {
            safe_actions: &[
                "blame", "branch", "cat-file", "check-ignore", "cherry", "describe", "diff",
                "fetch", "for-each-ref", "grep", "log", "ls-files", "ls-tree", "merge-base",
                "name-rev", "reflog", "rev-list", "rev-parse", "shortlog", "show", "status", "tag",
            ],
            safe_prefixes: &[],
            parser: CliParser::FirstToken,
            flags_with_arg: &["-C", "-c"],
        },
    );
    m.insert(
        "cdk",
        CliConfig {
            safe_actions: &["synth", "diff", "list", "ls"],
            safe_prefixes: &[],
            parser: CliParser::FirstToken,
            flags_with_arg: &[],
        },
    );
    m.insert(
        "kubectl",
        CliConfig {
            safe_actions: &[
                "api-resources", "api-versions", "cluster-info", "describe", "explain", "get",
                "logs", "top", "version",
            ],
            safe_prefixes: &[],
            parser: CliParser::FirstToken,
            flags_with_arg: &[],
        },
    );
    m
});

pub static CLI_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("kubeat", "kubectl"),
        ("kubeci", "kubectl"),
        ("kubeci2", "kubectl"),
        ("kubelab", "kubectl"),
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomCheck {
    Find,
    Sort,
    Sed,
    Awk,
    Dmesg,
    Ifconfig,
    Ip,
    Journalctl,
    Openssl,
    ShellRecurse,
    Xargs,
}

pub static CUSTOM_CHECKS: LazyLock<HashMap<&'static str, CustomCheck>> = LazyLock::new(|| {
    [
        ("find", CustomCheck::Find),
        ("sort", CustomCheck::Sort),
        ("sed", CustomCheck::Sed),
        ("awk", CustomCheck::Awk),
        ("dmesg", CustomCheck::Dmesg),
        ("ifconfig", CustomCheck::Ifconfig),
        ("ip", CustomCheck::Ip),
        ("journalctl", CustomCheck::Journalctl),
        ("openssl", CustomCheck::Openssl),
        ("bash", CustomCheck::ShellRecurse),
        ("sh", CustomCheck::ShellRecurse),
        ("zsh", CustomCheck::ShellRecurse),
        ("xargs", CustomCheck::Xargs),
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundCheck {
    GhApi,
    Auth0Api,
}

pub static COMPOUND_CHECKS: LazyLock<Vec<(&'static [&'static str], CompoundCheck)>> =
    LazyLock::new(|| {
        vec![
            (&["gh", "api"], CompoundCheck::GhApi),
            (&["auth0", "api"], CompoundCheck::Auth0Api),
        ]
    });

pub const CURL_DATA_FLAGS: &[&str] = &[
    "-d", "--data", "--data-raw", "--data-binary", "--data-urlencode", "-F", "--form", "-T",
    "--upload-file",
];

pub const XARGS_FLAGS_WITH_ARG: &[&str] = &["-I", "-n", "-P", "-L", "-s", "-E"];
