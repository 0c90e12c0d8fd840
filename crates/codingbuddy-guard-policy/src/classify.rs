//! The ordered rule cascade (SPEC_FULL §4.3) and its supporting per-tool
//! validators (§4.6, §4.7).

use codingbuddy_guard_core::{Decision, SimpleCommand};

use crate::rules::{self, CliParser, CompoundCheck, CustomCheck, WrapperPolicy};
use crate::shell_parse;

/// Classifies one already-extracted simple command.
pub fn classify_command(tokens: &[String]) -> Decision {
    if tokens.is_empty() {
        return Decision::Unknown;
    }
    let stripped = strip_wrappers(tokens);
    if stripped.is_empty() {
        return Decision::Unknown;
    }
    let head = stripped[0].as_str();

    if stripped.iter().any(|t| t == "--help") {
        return Decision::Safe;
    }
    if rules::SAFE_COMMANDS.contains(head) {
        return Decision::Safe;
    }
    if rules::SAFE_SCRIPTS.contains(basename(head)) {
        return Decision::Safe;
    }
    if rules::CURL_WRAPPERS.contains(basename(head)) {
        return check_curl(&stripped);
    }
    if rules::PREFIX_COMMANDS.iter().any(|p| token_prefix_matches(&stripped, p)) {
        return Decision::Safe;
    }
    if let Some(check) = rules::CUSTOM_CHECKS.get(head) {
        return dispatch_custom_check(*check, &stripped);
    }
    for (prefix, check) in rules::COMPOUND_CHECKS.iter() {
        if token_prefix_matches(&stripped, prefix) {
            return dispatch_compound_check(*check, &stripped);
        }
    }
    let canonical = rules::CLI_ALIASES.get(head).copied().unwrap_or(head);
    if let Some(config) = rules::CLI_CONFIGS.get(canonical) {
        return cli_config_decision(config, &stripped[1..]);
    }
    Decision::Unknown
}

fn basename(s: &str) -> &str {
    s.rsplit('/').next().unwrap_or(s)
}

fn token_prefix_matches(tokens: &[String], prefix: &[&str]) -> bool {
    tokens.len() >= prefix.len() && tokens.iter().zip(prefix.iter()).all(|(a, b)| a == b)
}

fn strip_outer_quotes(s: &str) -> String {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'\'' && last == b'\'') || (first == b'"' && last == b'"') {
            return s[1..s.len() - 1].to_string();
        }
    }
    s.to_string()
}

// ---------------------------------------------------------------------
// Wrapper stripping (§4.4)
// ---------------------------------------------------------------------

fn strip_wrappers(tokens: &[String]) -> SimpleCommand {
    let mut current: SimpleCommand = tokens.to_vec();
    loop {
        let mut matched = false;
        for (prefix, policy) in rules::WRAPPERS.iter() {
            if token_prefix_matches(&current, prefix) {
                current.drain(0..prefix.len());
                apply_wrapper_policy(&mut current, *policy);
                matched = true;
                break;
            }
        }
        if !matched {
            break;
        }
    }
    current
}

fn apply_wrapper_policy(tokens: &mut SimpleCommand, policy: WrapperPolicy) {
    match policy {
        WrapperPolicy::DropN(n) => {
            let n = n.min(tokens.len());
            tokens.drain(0..n);
        }
        WrapperPolicy::DropFlagsAndAssignments => {
            while let Some(t) = tokens.first() {
                if t.starts_with('-') || t.contains('=') {
                    tokens.remove(0);
                } else {
                    break;
                }
            }
        }
        WrapperPolicy::DropNiceFlags => {
            while let Some(t) = tokens.first() {
                if t.starts_with('-') {
                    tokens.remove(0);
                    if !tokens.is_empty() {
                        tokens.remove(0);
                    }
                } else {
                    break;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------
// curl (§4.7)
// ---------------------------------------------------------------------

fn check_curl(tokens: &[String]) -> Decision {
    const ALLOWED_SPACE_FORM: &[&str] = &["GET", "HEAD", "OPTIONS", "TRACE"];
    const ALLOWED_JOINED_FORM: &[&str] = &["GET", "HEAD"];

    for (i, t) in tokens.iter().enumerate() {
        if rules::CURL_DATA_FLAGS.contains(&t.as_str()) {
            return Decision::Unknown;
        }
        if rules::CURL_DATA_FLAGS
            .iter()
            .any(|f| t.starts_with(&format!("{f}=")))
        {
            return Decision::Unknown;
        }
        if t == "-X" || t == "--request" {
            match tokens.get(i + 1).map(|n| n.to_uppercase()) {
                Some(m) if ALLOWED_SPACE_FORM.contains(&m.as_str()) => {}
                _ => return Decision::Unknown,
            }
        }
        if let Some(val) = t.strip_prefix("-X=").or_else(|| t.strip_prefix("--request=")) {
            if !ALLOWED_JOINED_FORM.contains(&val.to_uppercase().as_str()) {
                return Decision::Unknown;
            }
        }
    }
    Decision::Safe
}

// ---------------------------------------------------------------------
// Custom checks (§4.7)
// ---------------------------------------------------------------------

fn dispatch_custom_check(check: CustomCheck, tokens: &[String]) -> Decision {
    match check {
        CustomCheck::Find => bool_decision(
            !tokens
                .iter()
                .any(|t| ["-exec", "-execdir", "-ok", "-okdir", "-delete"].contains(&t.as_str())),
        ),
        CustomCheck::Sort => {
            bool_decision(!tokens.iter().any(|t| t == "-o" || t.starts_with("-o")))
        }
        CustomCheck::Sed => bool_decision(!tokens.iter().any(|t| {
            t == "-i" || t.starts_with("-i") || t.starts_with("--in-place")
        })),
        CustomCheck::Awk => check_awk(tokens),
        CustomCheck::Dmesg => bool_decision(
            !tokens.iter().any(|t| ["-c", "-C", "--clear"].contains(&t.as_str())),
        ),
        CustomCheck::Ifconfig => check_ifconfig(tokens),
        CustomCheck::Ip => check_ip(tokens),
        CustomCheck::Journalctl => bool_decision(!tokens.iter().any(|t| {
            ["--rotate", "--flush", "--sync", "--relinquish-var"].contains(&t.as_str())
                || t.starts_with("--vacuum")
        })),
        CustomCheck::Openssl => check_openssl(tokens),
        CustomCheck::ShellRecurse => check_shell_recurse(tokens),
        CustomCheck::Xargs => check_xargs(tokens),
    }
}

fn bool_decision(b: bool) -> Decision {
    if b {
        Decision::Safe
    } else {
        Decision::Unknown
    }
}

fn check_awk(tokens: &[String]) -> Decision {
    for t in tokens {
        if t == "-f" || t.starts_with("-f") || t == "--file" {
            return Decision::Unknown;
        }
    }
    for t in tokens {
        if t.starts_with('-') {
            continue;
        }
        if t.contains('>') || t.contains('|') || t.contains("system") {
            return Decision::Unknown;
        }
    }
    Decision::Safe
}

fn check_ifconfig(tokens: &[String]) -> Decision {
    const DANGEROUS: &[&str] = &["up", "down", "add", "del", "delete", "tunnel", "promisc"];
    if tokens.iter().any(|t| DANGEROUS.contains(&t.as_str())) {
        return Decision::Unknown;
    }
    if tokens
        .iter()
        .any(|t| t.starts_with("netmask") || t.starts_with("broadcast"))
    {
        return Decision::Unknown;
    }
    Decision::Safe
}

fn check_ip(tokens: &[String]) -> Decision {
    const SAFE_OBJECTS: &[&str] = &[
        "addr", "address", "link", "route", "neigh", "neighbor", "rule", "maddr", "mroute",
        "tunnel",
    ];
    const DANGEROUS_VERBS: &[&str] = &["add", "del", "delete", "change", "replace", "set", "flush", "exec"];
    if tokens.iter().any(|t| DANGEROUS_VERBS.contains(&t.as_str())) {
        return Decision::Unknown;
    }
    let positionals = locate_positionals(&tokens[1..], &[]);
    match positionals.first() {
        Some(o) if SAFE_OBJECTS.contains(&o.as_str()) => Decision::Safe,
        _ => Decision::Unknown,
    }
}

fn check_openssl(tokens: &[String]) -> Decision {
    if tokens.get(1).map(|s| s.as_str()) == Some("x509") && tokens.iter().any(|t| t == "-noout") {
        Decision::Safe
    } else {
        Decision::Unknown
    }
}

fn check_shell_recurse(tokens: &[String]) -> Decision {
    for (i, t) in tokens.iter().enumerate() {
        if t.starts_with('-') && !t.starts_with("--") && t.contains('c') {
            return match tokens.get(i + 1) {
                Some(inner) => classify_inner(&strip_outer_quotes(inner)),
                None => Decision::Unknown,
            };
        }
    }
    Decision::Unknown
}

fn classify_inner(command: &str) -> Decision {
    match shell_parse::extract_commands(command) {
        Some(cmds) if !cmds.is_empty() && cmds.iter().all(|c| classify_command(c).is_safe()) => {
            Decision::Safe
        }
        _ => Decision::Unknown,
    }
}

fn check_xargs(tokens: &[String]) -> Decision {
    let mut i = 1;
    while i < tokens.len() {
        let t = &tokens[i];
        if t == "--" {
            i += 1;
            break;
        }
        if t.starts_with("--") && t.contains('=') {
            i += 1;
            continue;
        }
        if rules::XARGS_FLAGS_WITH_ARG.contains(&t.as_str()) {
            i += 2;
            continue;
        }
        if t.starts_with('-') {
            i += 1;
            continue;
        }
        break;
    }
    let inner = &tokens[i..];
    if inner.is_empty() {
        return Decision::Unknown;
    }
    classify_command(inner)
}

// ---------------------------------------------------------------------
// Compound checks (§4.7)
// ---------------------------------------------------------------------

fn dispatch_compound_check(check: CompoundCheck, tokens: &[String]) -> Decision {
    match check {
        CompoundCheck::GhApi => check_gh_api(tokens),
        CompoundCheck::Auth0Api => check_auth0_api(tokens),
    }
}

fn check_gh_api(tokens: &[String]) -> Decision {
    let args = &tokens[2..];
    let mut method: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        let t = &args[i];
        if t == "-X" || t == "--method" {
            if let Some(v) = args.get(i + 1) {
                method = Some(v.to_uppercase());
            }
            i += 1;
        } else if let Some(v) = t.strip_prefix("--method=") {
            method = Some(v.to_uppercase());
        } else if let Some(v) = t.strip_prefix("-X") {
            if !v.is_empty() {
                method = Some(v.to_uppercase());
            }
        }
        i += 1;
    }
    if let Some(m) = &method {
        if m != "GET" {
            return Decision::Unknown;
        }
    }
    let mutation_hint = args.iter().any(|t| {
        matches!(
            t.as_str(),
            "-f" | "--raw-field" | "-F" | "--field" | "--input"
        ) || t.starts_with("-f=")
            || t.starts_with("--raw-field=")
            || t.starts_with("-F=")
            || t.starts_with("--field=")
            || t.starts_with("--input=")
    });
    if mutation_hint && method.as_deref() != Some("GET") {
        return Decision::Unknown;
    }
    Decision::Safe
}

fn check_auth0_api(tokens: &[String]) -> Decision {
    let args = &tokens[2..];
    if args
        .iter()
        .any(|t| matches!(t.as_str(), "post" | "put" | "patch" | "delete" | "-d" | "--data"))
    {
        return Decision::Unknown;
    }
    Decision::Safe
}

// ---------------------------------------------------------------------
// CLI configs (§4.6)
// ---------------------------------------------------------------------

fn locate_positionals(tail: &[String], flags_with_arg: &[&str]) -> Vec<String> {
    let mut i = 0;
    while i < tail.len() && tail[i].starts_with('-') {
        if flags_with_arg.contains(&tail[i].as_str()) {
            i += 2;
        } else {
            i += 1;
        }
    }
    let mut positionals = Vec::new();
    while i < tail.len() && !tail[i].starts_with('-') {
        positionals.push(tail[i].clone());
        i += 1;
    }
    positionals
}

fn aws_action(tail: &[String], flags_with_arg: &[&str]) -> Option<String> {
    let positionals = locate_positionals(tail, flags_with_arg);
    if positionals.first().map(|s| s.as_str()) == Some("help") {
        return Some("help".to_string());
    }
    positionals.get(1).cloned()
}

fn variable_depth_action(
    tail: &[String],
    flags_with_arg: &[&str],
    action_depth: usize,
    service_depths: &[(&str, usize)],
    subservice_depths: &[(&[&str], usize)],
) -> Option<String> {
    let positionals = locate_positionals(tail, flags_with_arg);
    if positionals.is_empty() {
        return None;
    }
    let service = positionals[0].as_str();
    for (prefix, depth) in subservice_depths {
        if positionals.len() >= prefix.len()
            && positionals.iter().zip(prefix.iter()).all(|(a, b)| a == b)
        {
            return positionals.get(*depth).cloned();
        }
    }
    for (svc, depth) in service_depths {
        if *svc == service {
            return positionals.get(*depth).cloned();
        }
    }
    positionals.get(action_depth).cloned()
}

fn cli_config_decision(config: &rules::CliConfig, tail: &[String]) -> Decision {
    let action = match config.parser {
        CliParser::Aws => aws_action(tail, config.flags_with_arg),
        CliParser::FirstToken => locate_positionals(tail, config.flags_with_arg).first().cloned(),
        CliParser::SecondToken => locate_positionals(tail, config.flags_with_arg).get(1).cloned(),
        CliParser::VariableDepth {
            action_depth,
            service_depths,
            subservice_depths,
        } => variable_depth_action(
            tail,
            config.flags_with_arg,
            action_depth,
            service_depths,
            subservice_depths,
        ),
    };
    match action {
        Some(a) if config.safe_actions.contains(&a.as_str()) => Decision::Safe,
        Some(a) if config.safe_prefixes.iter().any(|p| a.starts_with(p)) => Decision::Safe,
        _ => Decision::Unknown,
    }
}
