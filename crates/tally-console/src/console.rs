//! Command registry, line tokenizer, and dispatch.
//!
//! The console owns an alias -> command mapping (many aliases to one shared
//! instance), splits input lines into tokens, and hands the token tail to
//! the command's execute algorithm. Built-in `help`/`stop` commands are
//! registered at construction; `stop` terminates the loop through the
//! [`CommandOutput::Stop`] sentinel rather than by mutating session state,
//! and `help` emits a signal the console materializes into tables here,
//! where the registry is in scope.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tally_types::error::{Result, TallyError};

use crate::command::{Command, CommandOutput};
use crate::param::Param;
use crate::value::{ArgType, Value};

const HELP_ALIASES: [&str; 2] = ["h", "help"];
const HELP_USAGE: &str = "help [param] [command] [command param]";

type CommandMap = HashMap<String, Rc<Command>>;

/// Registry of commands with dispatch.
///
/// The alias map sits behind a `RefCell` shared (weakly) with the help
/// command's `-p` param, whose action renders a param table and therefore
/// has to see the registry at invocation time.
pub struct Console {
    name: String,
    commands: Rc<RefCell<CommandMap>>,
    help_aliases: String,
}

impl Console {
    /// Create a console with the built-in help and stop commands.
    pub fn new(name: &str) -> Self {
        let mut console = Self {
            name: name.to_string(),
            commands: Rc::new(RefCell::new(HashMap::new())),
            help_aliases: HELP_ALIASES.join(", "),
        };

        let registry = Rc::downgrade(&console.commands);
        let help_aliases = console.help_aliases.clone();
        let show_params = Param::new(
            "Show a table of all params of the chosen command",
            move |args| {
                let name = args.first().map(ToString::to_string).unwrap_or_default();
                let Some(commands) = registry.upgrade() else {
                    return Err(TallyError::Domain("console registry dropped".to_string()));
                };
                let commands = commands.borrow();
                let command = commands.get(&name).ok_or_else(|| TallyError::UnknownCommand {
                    name: name.clone(),
                    help: help_aliases.clone(),
                })?;
                Ok(params_table(&name, command))
            },
        )
        .with_usage("-p <command>")
        .with_args(&[ArgType::Str])
        .observe()
        .veto_action()
        .emit_result()
        .own_args_only();

        console.register(
            Command::new(&HELP_ALIASES, "Show help", |args| {
                Ok(CommandOutput::Help(
                    args.iter().map(ToString::to_string).collect(),
                ))
            })
            .with_usage(HELP_USAGE)
            .with_args(&[ArgType::Str, ArgType::Str])
            .optional_args()
            .with_param("-p", show_params),
        );
        console.register(Command::new(&["s", "stop"], "Stop this console", |_| {
            Ok(CommandOutput::Stop)
        }));
        console
    }

    /// The console's display name, used for the prompt.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a command under every one of its aliases.
    ///
    /// A colliding alias is silently remapped to the new command
    /// (last-write-wins); other aliases of the displaced command keep
    /// resolving to it.
    pub fn register(&mut self, command: Command) {
        let command = Rc::new(command);
        let mut commands = self.commands.borrow_mut();
        for alias in command.aliases() {
            if commands
                .insert(alias.clone(), Rc::clone(&command))
                .is_some()
            {
                log::warn!("alias {alias} re-registered, replacing previous mapping");
            }
        }
    }

    /// Look up a command by alias.
    pub fn resolve(&self, alias: &str) -> Option<Rc<Command>> {
        self.commands.borrow().get(alias).map(Rc::clone)
    }

    /// Tokenize and execute one input line.
    ///
    /// A blank line produces [`CommandOutput::None`]. A `Help` signal coming
    /// back from the command is materialized into renderable help output
    /// before returning.
    pub fn dispatch(&self, line: &str) -> Result<CommandOutput> {
        let tokens = tokenize(line)?;
        let Some((name, rest)) = tokens.split_first() else {
            return Ok(CommandOutput::None);
        };

        let command = self
            .resolve(name)
            .ok_or_else(|| TallyError::UnknownCommand {
                name: name.clone(),
                help: self.help_aliases.clone(),
            })?;
        log::debug!("dispatching {name} with {} token(s)", rest.len());

        let rest: Vec<&str> = rest.iter().map(String::as_str).collect();
        match command.execute(&rest)? {
            CommandOutput::Help(topics) => self.render_help(&topics),
            other => Ok(other),
        }
    }

    // -- Help rendering --

    fn render_help(&self, topics: &[String]) -> Result<CommandOutput> {
        match topics {
            [] => Ok(CommandOutput::One(self.command_index())),
            [command] => self.command_detail(command),
            [command, param] => self.param_detail(command, param),
            more => Err(TallyError::ArityMismatch {
                usage: HELP_USAGE.to_string(),
                expected: 2,
                got: more.len(),
            }),
        }
    }

    /// Table of every registered command, one row per instance regardless of
    /// how many aliases point at it.
    fn command_index(&self) -> Value {
        let registry = self.commands.borrow();
        let mut seen = HashSet::new();
        let mut commands: Vec<&Rc<Command>> = registry
            .values()
            .filter(|c| seen.insert(Rc::as_ptr(c)))
            .collect();
        commands.sort_by(|a, b| a.aliases().first().cmp(&b.aliases().first()));

        let rows = commands
            .iter()
            .map(|c| {
                vec![
                    c.aliases().join(", "),
                    c.description().to_string(),
                    or_na(c.usage()),
                    param_list(c),
                ]
            })
            .collect();
        Value::Table {
            headers: vec![
                "Aliases".to_string(),
                "Description".to_string(),
                "Usage".to_string(),
                "Params".to_string(),
            ],
            rows,
        }
    }

    fn command_detail(&self, name: &str) -> Result<CommandOutput> {
        let command = self.resolve(name).ok_or_else(|| TallyError::UnknownCommand {
            name: name.to_string(),
            help: self.help_aliases.clone(),
        })?;

        let mut lines = vec![format!("Command: {}", command.aliases().join(", "))];
        if !command.description().is_empty() {
            lines.push(format!("Description: {}", command.description()));
        }
        if !command.usage().is_empty() {
            lines.push(format!("Usage: {}", command.usage()));
        }
        if !command.params().is_empty() {
            lines.push(format!("Params: {}", param_list(&command)));
        }
        Ok(CommandOutput::One(Value::Str(lines.join("\n"))))
    }

    fn param_detail(&self, name: &str, param_alias: &str) -> Result<CommandOutput> {
        let command = self.resolve(name).ok_or_else(|| TallyError::UnknownCommand {
            name: name.to_string(),
            help: self.help_aliases.clone(),
        })?;
        let param =
            command
                .params()
                .get(param_alias)
                .ok_or_else(|| TallyError::UnknownParam {
                    command: name.to_string(),
                    param: param_alias.to_string(),
                })?;

        let mut lines = vec![
            format!("Command: {}", command.aliases().join(", ")),
            format!("Param: {param_alias}"),
            format!("Description: {}", param.description()),
        ];
        if !param.usage().is_empty() {
            lines.push(format!("Usage: {}", param.usage()));
        }
        Ok(CommandOutput::One(Value::Str(lines.join("\n"))))
    }
}

fn or_na(s: &str) -> String {
    if s.is_empty() { "N/A".to_string() } else { s.to_string() }
}

fn param_list(command: &Command) -> String {
    if command.params().is_empty() {
        return "N/A".to_string();
    }
    let mut aliases: Vec<&str> = command.params().keys().map(String::as_str).collect();
    aliases.sort_unstable();
    aliases.join(", ")
}

/// Table of one command's params: alias, description, usage.
fn params_table(name: &str, command: &Command) -> Value {
    if command.params().is_empty() {
        return Value::Str(format!("command {name} has no params"));
    }
    let mut entries: Vec<(&String, &Rc<Param>)> = command.params().iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    Value::Table {
        headers: vec![
            "Alias".to_string(),
            "Description".to_string(),
            "Usage".to_string(),
        ],
        rows: entries
            .iter()
            .map(|(alias, p)| {
                vec![
                    (*alias).clone(),
                    p.description().to_string(),
                    or_na(p.usage()),
                ]
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Tokenizer: whitespace splitting with quote and backslash handling.
// ---------------------------------------------------------------------------

/// Tokenize a command line respecting quotes and backslash escapes.
///
/// Single- and double-quoted substrings become part of one token; a
/// backslash outside quotes escapes the next character. Unterminated quotes
/// are an error.
pub fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();
    let mut in_single = false;
    let mut in_double = false;
    // Distinguishes `""` (an empty token) from plain whitespace.
    let mut quoted = false;

    while let Some(ch) = chars.next() {
        if in_single {
            if ch == '\'' {
                in_single = false;
            } else {
                current.push(ch);
            }
        } else if in_double {
            if ch == '"' {
                in_double = false;
            } else if ch == '\\' && matches!(chars.peek(), Some('"' | '\\')) {
                current.push(chars.next().unwrap());
            } else {
                current.push(ch);
            }
        } else {
            match ch {
                '\'' => {
                    in_single = true;
                    quoted = true;
                },
                '"' => {
                    in_double = true;
                    quoted = true;
                },
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                },
                c if c.is_whitespace() => {
                    if !current.is_empty() || quoted {
                        tokens.push(std::mem::take(&mut current));
                    }
                    quoted = false;
                },
                _ => current.push(ch),
            }
        }
    }

    if in_single {
        return Err(TallyError::Parse("unterminated single quote".to_string()));
    }
    if in_double {
        return Err(TallyError::Parse("unterminated double quote".to_string()));
    }
    if !current.is_empty() || quoted {
        tokens.push(current);
    }

    Ok(tokens)
}
