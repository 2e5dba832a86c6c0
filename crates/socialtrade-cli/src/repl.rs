//! Interactive REPL over a user loader.
//!
//! Launch with `socialtrade repl` to enter interactive mode.
//! Type `/help` for available commands, Tab for completion.

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};

use socialtrade::UserLoader;

use crate::config::Settings;
use crate::report::{connections_report, record_summary, users_report, AuditReport};

/// Available REPL commands.
const COMMANDS: &[(&str, &str)] = &[
    ("/users", "List registered users"),
    ("/show", "Show a user's parsed record"),
    ("/connections", "Load a user's connections (--mentioned to filter)"),
    ("/audit", "Count dropped fragments for every user"),
    ("/dirs", "Show export directories and pool size"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

/// Commands whose first argument is a user id.
const ID_COMMANDS: &[&str] = &["/show", "/connections"];

/// REPL helper for tab completion.
struct ExportHelper {
    ids: Vec<String>,
}

impl Completer for ExportHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        if !input.contains(' ') {
            let matches: Vec<Pair> = COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(input))
                .map(|(cmd, desc)| Pair {
                    display: format!("{cmd:<16} {desc}"),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, matches));
        }

        let (cmd, args) = input.split_once(' ').unwrap_or((input, ""));
        if ID_COMMANDS.contains(&cmd) && !args.contains(' ') {
            let prefix_start = input.len() - args.len();
            let matches: Vec<Pair> = completion_candidates(&self.ids, args)
                .into_iter()
                .map(|id| Pair {
                    display: id.to_string(),
                    replacement: format!("{id} "),
                })
                .collect();
            return Ok((prefix_start, matches));
        }

        Ok((pos, Vec::new()))
    }
}

impl Hinter for ExportHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        if line.starts_with('/') && !line.contains(' ') {
            for (cmd, _) in COMMANDS {
                if cmd.starts_with(line) && *cmd != line {
                    return Some(cmd[line.len()..].to_string());
                }
            }
        }
        None
    }
}

impl Highlighter for ExportHelper {}
impl Validator for ExportHelper {}
impl Helper for ExportHelper {}

struct TabCompleteOrAcceptHint;

impl ConditionalEventHandler for TabCompleteOrAcceptHint {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        if ctx.has_hint() {
            Some(Cmd::CompleteHint)
        } else {
            Some(Cmd::Complete)
        }
    }
}

/// Registered ids starting with `prefix`.
pub fn completion_candidates<'a>(ids: &'a [String], prefix: &str) -> Vec<&'a str> {
    ids.iter()
        .map(String::as_str)
        .filter(|id| id.starts_with(prefix.trim()))
        .collect()
}

/// Run the interactive REPL.
pub fn run(settings: &Settings) -> anyhow::Result<()> {
    let loader = settings.open_loader()?;

    eprintln!();
    eprintln!(
        "  \x1b[32m\u{25c9}\x1b[0m \x1b[1msocialtrade v{}\x1b[0m \x1b[90m\u{2014} {} users registered\x1b[0m",
        env!("CARGO_PKG_VERSION"),
        loader.registry().len()
    );
    eprintln!();
    eprintln!(
        "    Press \x1b[36m/\x1b[0m to browse commands, \x1b[90mTab\x1b[0m to complete, \x1b[90m/exit\x1b[0m to quit."
    );
    eprintln!();

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let mut rl: Editor<ExportHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(ExportHelper {
        ids: loader.registry().iter().map(str::to_string).collect(),
    }));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabCompleteOrAcceptHint)),
    );

    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    let hist_path = std::path::PathBuf::from(&home).join(".socialtrade_history");
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let prompt = " \x1b[36msocialtrade>\x1b[0m ";

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let input = line.strip_prefix('/').unwrap_or(line);
                if input.is_empty() {
                    cmd_help();
                    continue;
                }

                let (cmd, args) = input.split_once(' ').unwrap_or((input, ""));
                let args = args.trim();

                match cmd {
                    "exit" | "quit" => {
                        eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                        break;
                    }
                    "help" | "h" | "?" => cmd_help(),
                    "clear" | "cls" => eprint!("\x1b[2J\x1b[H"),
                    "users" => print_json(&users_report(&loader)),
                    "show" => cmd_show(args, &loader),
                    "connections" => cmd_connections(args, &loader),
                    "audit" => cmd_audit(&loader),
                    "dirs" => cmd_dirs(&loader),
                    _ => {
                        eprintln!("  Unknown command '/{cmd}'. Type /help for commands.");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => {
                eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(&hist_path);

    Ok(())
}

fn print_json(value: &impl serde::Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("  Cannot render output: {e}"),
    }
}

fn cmd_help() {
    eprintln!();
    eprintln!("  Commands:");
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {cmd:<18} {desc}");
    }
    eprintln!();
    eprintln!("  Tip: Tab completion works for commands and user ids.");
    eprintln!();
}

fn cmd_show(args: &str, loader: &UserLoader) {
    let Some(id) = args.split_whitespace().next() else {
        eprintln!("  Usage: /show <user>");
        return;
    };
    match loader.load(id) {
        Ok(record) => {
            print_json(&record_summary(&record));
            for d in &record.diagnostics {
                eprintln!("    dropped {d}");
            }
        }
        Err(e) => eprintln!("  Failed to load: {e}"),
    }
}

fn cmd_connections(args: &str, loader: &UserLoader) {
    let mut id = None;
    let mut mentioned = false;
    for arg in args.split_whitespace() {
        match arg {
            "--mentioned" | "-m" => mentioned = true,
            other => id = id.or(Some(other)),
        }
    }
    let Some(id) = id else {
        eprintln!("  Usage: /connections <user> [--mentioned]");
        return;
    };

    match loader.load(id) {
        Ok(record) => {
            let connections = if mentioned {
                loader.load_mentioned_connections(&record)
            } else {
                loader.load_connections(&record)
            };
            print_json(&connections_report(id, &connections, mentioned));
        }
        Err(e) => eprintln!("  Failed to load: {e}"),
    }
}

fn cmd_audit(loader: &UserLoader) {
    let report = AuditReport::collect(loader);
    print_json(&report);
    eprintln!(
        "  {} users, {} dropped fragments, {} failed loads",
        report.users.len(),
        report.total_dropped(),
        report.failures.len()
    );
}

fn cmd_dirs(loader: &UserLoader) {
    let layout = loader.layout();
    eprintln!();
    eprintln!("  Social exports:    {}", layout.social_dir.display());
    eprintln!("  Portfolio exports: {}", layout.portfolio_dir.display());
    eprintln!("  Worker threads:    {}", loader.max_parallel());
    eprintln!();
}
