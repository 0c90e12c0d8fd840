use std::io::Read;

use clap::{Parser, Subcommand};

use codingbuddy_guard_core::GuardConfig;
use codingbuddy_guard_observe::GuardObserver;

#[derive(Parser)]
#[command(name = "codingbuddy-guard")]
#[command(about = "Pre-execution command-safety guard for the codingbuddy coding agent")]
struct Cli {
    #[arg(long, global = true)]
    json: bool,

    /// Trace classification steps to stderr. Overrides `config.toml`'s
    /// `verbose` key when set.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a single command without reading stdin (debug/dry-run path).
    Check { command: Vec<String> },
    /// Print the terminal color palette used by the status line.
    Colors,
    /// Print the resolved ambient configuration and paths.
    Doctor,
}

fn main() {
    let cli = Cli::parse();
    let config = GuardConfig::load();
    let observer = GuardObserver::new(cli.verbose || config.verbose);

    match cli.command {
        None => run_hook(&config, &observer),
        Some(Command::Check { command }) => run_check(&command.join(" "), cli.json, &observer),
        Some(Command::Colors) => run_colors(),
        Some(Command::Doctor) => run_doctor(&config, cli.json),
    }
}

/// The primary entry point: read the hook JSON envelope from stdin,
/// classify, print the decision JSON, and always exit 0 (SPEC_FULL §6).
fn run_hook(config: &GuardConfig, observer: &GuardObserver) {
    let mut stdin = String::new();
    let _ = std::io::stdin().read_to_string(&mut stdin);
    observer.verbose_log(&format!("read {} bytes from stdin", stdin.len()));
    let output = codingbuddy_guard_hooks::run(&stdin, config);
    observer.verbose_log(&format!("emitting decision: {output}"));
    println!("{output}");
}

fn run_check(command: &str, json: bool, observer: &GuardObserver) {
    observer.verbose_log(&format!("classifying: {command}"));
    let verdict = codingbuddy_guard_policy::decide(command);
    if json {
        let payload = serde_json::json!({
            "command": command,
            "decision": if verdict.decision.is_safe() { "allow" } else { "ask" },
            "reason": verdict.reason,
        });
        println!("{}", serde_json::to_string_pretty(&payload).unwrap());
    } else {
        println!(
            "{}",
            codingbuddy_guard_ui::format_status_line(command, verdict.decision, &verdict.reason)
        );
    }
}

fn run_colors() {
    println!("{}", codingbuddy_guard_ui::colors::render_palette());
}

fn run_doctor(config: &GuardConfig, json: bool) {
    let payload = serde_json::json!({
        "runtime_dir": codingbuddy_guard_core::runtime_dir(),
        "config_path": codingbuddy_guard_core::config_path(),
        "audit_log_path": config.audit_log_path(),
        "cache_ttl_secs": config.cache_ttl_secs,
        "verbose": config.verbose,
    });
    if json {
        println!("{}", serde_json::to_string_pretty(&payload).unwrap());
    } else {
        println!("runtime dir:   {}", codingbuddy_guard_core::runtime_dir().display());
        println!("config path:   {}", codingbuddy_guard_core::config_path().display());
        println!("audit log:     {}", config.audit_log_path().display());
        println!("cache TTL (s): {}", config.cache_ttl_secs);
    }
}

#[cfg(test)]
mod tests {
    use assert_cmd::Command;

    fn stdout_of(cmd: &mut Command) -> String {
        let output = cmd.assert().success().get_output().stdout.clone();
        String::from_utf8_lossy(&output).to_string()
    }

    #[test]
    fn hook_mode_allows_safe_command() {
        let mut cmd = Command::cargo_bin("codingbuddy-guard").unwrap();
        cmd.write_stdin(r#"{"tool_input": {"command": "git status"}}"#);
        assert!(stdout_of(&mut cmd).contains("\"permissionDecision\":\"allow\""));
    }

    #[test]
    fn hook_mode_asks_for_unsafe_command() {
        let mut cmd = Command::cargo_bin("codingbuddy-guard").unwrap();
        cmd.write_stdin(r#"{"tool_input": {"command": "git push"}}"#);
        assert!(stdout_of(&mut cmd).contains("\"permissionDecision\":\"ask\""));
    }

    #[test]
    fn hook_mode_always_exits_zero_on_bad_input() {
        let mut cmd = Command::cargo_bin("codingbuddy-guard").unwrap();
        cmd.write_stdin("not json");
        cmd.assert().success();
    }

    #[test]
    fn check_subcommand_prints_decision() {
        let mut cmd = Command::cargo_bin("codingbuddy-guard").unwrap();
        cmd.arg("check").arg("ls").arg("-la");
        assert!(stdout_of(&mut cmd).contains("ls -la"));
    }

    #[test]
    fn colors_subcommand_prints_palette() {
        let mut cmd = Command::cargo_bin("codingbuddy-guard").unwrap();
        cmd.arg("colors");
        assert!(stdout_of(&mut cmd).contains("Molokai"));
    }

    #[test]
    fn verbose_flag_traces_to_stderr() {
        let mut cmd = Command::cargo_bin("codingbuddy-guard").unwrap();
        cmd.arg("-v").arg("check").arg("ls");
        let output = cmd.assert().success().get_output().stderr.clone();
        assert!(String::from_utf8_lossy(&output).contains("classifying: ls"));
    }

    #[test]
    fn without_verbose_flag_stderr_is_quiet() {
        let mut cmd = Command::cargo_bin("codingbuddy-guard").unwrap();
        cmd.arg("check").arg("ls");
        let output = cmd.assert().success().get_output().stderr.clone();
        assert!(String::from_utf8_lossy(&output).is_empty());
    }
}
