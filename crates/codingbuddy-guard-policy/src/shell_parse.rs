//! Tree-sitter based bash command extraction.
//!
//! Converts a command string into a flat list of simple commands (ordered
//! word-token sequences), failing closed (returning `None`) whenever the
//! parse is incomplete or an output redirect targets anything other than
//! `/dev/null` or a file descriptor duplication.

use std::cell::RefCell;

use tree_sitter::{Node, Parser, Tree};

use codingbuddy_guard_core::SimpleCommand;

thread_local! {
    /// Reuse a single tree-sitter parser per thread to avoid repeated
    /// allocation and language-table initialization on every call.
    static BASH_PARSER: RefCell<Parser> = RefCell::new({
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_bash::LANGUAGE.into())
            .expect("tree-sitter-bash language should load");
        parser
    });
}

/// Targets of an output redirect that do not indicate a write with
/// externally visible effect.
const SAFE_REDIRECT_TARGETS: &[&str] = &["/dev/null"];

const WRITE_REDIRECT_KINDS: &[&str] = &["file_redirect", "heredoc_redirect", "herestring_redirect"];

/// Strips the `time` reserved word (optionally followed by `-p`) since
/// tree-sitter-bash does not model it. Removed wherever it occurs as a
/// whole token, not just at the start of the string, so wrappers like
/// `nice time git status` normalize the same as a leading `time`.
pub fn preprocess(cmd: &str) -> String {
    let tokens: Vec<&str> = cmd.split_whitespace().collect();
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i] == "time" {
            i += 1;
            if tokens.get(i) == Some(&"-p") {
                i += 1;
            }
            continue;
        }
        out.push(tokens[i]);
        i += 1;
    }
    out.join(" ")
}

fn parse_bash(cmd: &str) -> Option<Tree> {
    BASH_PARSER.with(|p| p.borrow_mut().parse(cmd, None))
}

/// Extracts all simple commands from a bash command string.
///
/// Returns `None` if the string fails to parse, if the parser reports an
/// error node (fail-closed — an incompletely understood command is never
/// treated as safe), or if any simple command contains an unsafe output
/// redirect.
pub fn extract_commands(cmd: &str) -> Option<Vec<SimpleCommand>> {
    let preprocessed = preprocess(cmd);
    if preprocessed.trim().is_empty() {
        return Some(Vec::new());
    }
    let tree = parse_bash(&preprocessed)?;
    let root = tree.root_node();
    if root.has_error() {
        return None;
    }
    let source = preprocessed.as_bytes();
    let mut commands = Vec::new();
    walk(root, source, &mut commands)?;
    Some(commands)
}

fn walk(node: Node, source: &[u8], out: &mut Vec<SimpleCommand>) -> Option<()> {
    let kind = node.kind();
    match kind {
        "command" => {
            let simple = extract_simple_command(node, source, &[])?;
            if !simple.is_empty() {
                out.push(simple);
            }
            Some(())
        }
        "redirected_statement" => {
            let redirects: Vec<Node> = node
                .children(&mut node.walk())
                .filter(|c| WRITE_REDIRECT_KINDS.contains(&c.kind()))
                .collect();
            for redirect in &redirects {
                if !redirect_is_safe(*redirect, source) {
                    return None;
                }
            }
            let mut handled = false;
            for child in node.children(&mut node.walk()) {
                if child.kind() == "command" {
                    let simple = extract_simple_command(child, source, &[])?;
                    if !simple.is_empty() {
                        out.push(simple);
                    }
                    handled = true;
                } else if !WRITE_REDIRECT_KINDS.contains(&child.kind()) {
                    walk(child, source, out)?;
                }
            }
            if !handled {
                // A redirected_statement whose body is not a plain command
                // (e.g. a redirected subshell) is outside the modeled
                // grammar; fail closed.
                return None;
            }
            Some(())
        }
        _ => {
            for child in node.children(&mut node.walk()) {
                walk(child, source, out)?;
            }
            Some(())
        }
    }
}

fn redirect_is_safe(redirect: Node, source: &[u8]) -> bool {
    match redirect.kind() {
        "heredoc_redirect" | "herestring_redirect" => false,
        "file_redirect" => {
            let operator = redirect
                .children(&mut redirect.walk())
                .find(|c| matches!(c.kind(), ">" | ">>" | "&>" | ">&" | "<" | "<&"))
                .map(|c| c.kind());
            // Input redirects never write.
            if matches!(operator, Some("<") | Some("<&")) {
                return true;
            }
            // The destination is the last non-operator child.
            let destination = redirect
                .children(&mut redirect.walk())
                .filter(|c| !matches!(c.kind(), ">" | ">>" | "&>" | ">&" | "<" | "<&"))
                .next_back();
            match destination {
                Some(dest) if dest.kind() == "file_descriptor" => true,
                Some(dest) => {
                    let text = dest.utf8_text(source).unwrap_or("").trim();
                    SAFE_REDIRECT_TARGETS.contains(&text)
                }
                None => false,
            }
        }
        _ => false,
    }
}

/// Collects the word-like children of a `command` node into a flat token
/// list, skipping `variable_assignment` (env-style `VAR=value` prefixes)
/// and any redirect children (handled separately by the caller).
fn extract_simple_command(node: Node, source: &[u8], _skip: &[&str]) -> Option<SimpleCommand> {
    let mut tokens = Vec::new();
    for child in node.children(&mut node.walk()) {
        match child.kind() {
            "variable_assignment" => continue,
            "command_name" | "word" | "string" | "raw_string" | "number" | "concatenation"
            | "simple_expansion" | "expansion" | "ansi_c_string" => {
                let text = child.utf8_text(source).ok()?.to_string();
                tokens.push(text);
            }
            "file_redirect" | "heredoc_redirect" | "herestring_redirect" => {
                if !redirect_is_safe(child, source) {
                    return None;
                }
            }
            "comment" => {}
            _ => {}
        }
    }
    Some(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(cmd: &str) -> Option<Vec<Vec<String>>> {
        extract_commands(cmd)
    }

    #[test]
    fn simple_command() {
        let cmds = extract("ls -la").unwrap();
        assert_eq!(cmds, vec![vec!["ls".to_string(), "-la".to_string()]]);
    }

    #[test]
    fn pipeline_extracts_both_sides() {
        let cmds = extract("ls | grep foo").unwrap();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0][0], "ls");
        assert_eq!(cmds[1][0], "grep");
    }

    #[test]
    fn chain_extracts_both_sides() {
        let cmds = extract("git status && git push").unwrap();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0], vec!["git", "status"]);
        assert_eq!(cmds[1], vec!["git", "push"]);
    }

    #[test]
    fn unsafe_redirect_rejects_everything() {
        assert!(extract("ls > file.txt").is_none());
        assert!(extract("cat foo >> bar.txt").is_none());
    }

    #[test]
    fn dev_null_redirect_is_safe() {
        let cmds = extract("ls 2>/dev/null").unwrap();
        assert_eq!(cmds[0], vec!["ls"]);
    }

    #[test]
    fn fd_duplication_is_safe() {
        let cmds = extract("ls 2>&1").unwrap();
        assert_eq!(cmds[0], vec!["ls"]);
    }

    #[test]
    fn input_redirect_is_safe() {
        let cmds = extract("cat < input.txt").unwrap();
        assert_eq!(cmds[0], vec!["cat"]);
    }

    #[test]
    fn here_string_rejected() {
        assert!(extract("cat <<< 'hello'").is_none());
    }

    #[test]
    fn variable_assignment_prefix_is_stripped() {
        let cmds = extract("FOO=BAR ls -l").unwrap();
        assert_eq!(cmds[0], vec!["ls".to_string(), "-l".to_string()]);
    }

    #[test]
    fn time_prefix_is_stripped() {
        let cmds = extract("time git status").unwrap();
        assert_eq!(cmds[0], vec!["git", "status"]);
    }

    #[test]
    fn time_is_stripped_when_not_leading() {
        let cmds = extract("nice time git status").unwrap();
        assert_eq!(cmds[0], vec!["nice", "git", "status"]);
    }

    #[test]
    fn repeated_time_is_fully_stripped() {
        let cmds = extract("time time ls").unwrap();
        assert_eq!(cmds[0], vec!["ls"]);
    }

    #[test]
    fn time_dash_p_is_stripped() {
        let cmds = extract("time -p git status").unwrap();
        assert_eq!(cmds[0], vec!["git", "status"]);
    }

    #[test]
    fn command_substitution_fails_closed() {
        assert!(extract("echo $(whoami)").is_none());
    }
}
