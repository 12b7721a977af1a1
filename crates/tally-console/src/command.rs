//! Command descriptor and the execution algorithm: param scan, argument
//! coercion, and the aggregation of chained param results.

use std::collections::HashMap;
use std::rc::Rc;

use tally_types::error::{Result, TallyError};

use crate::param::Param;
use crate::value::{ArgType, Value, type_names};

/// Output produced by one command invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    /// Nothing to render.
    None,
    /// A single result, rendered as one unit.
    One(Value),
    /// An ordered multi-result; each element is rendered individually.
    Many(Vec<Value>),
    /// Signal to the console to render help for zero to two topics.
    Help(Vec<String>),
    /// Signal to the dispatch loop to terminate after the current line.
    Stop,
}

/// Behavior of a command: receives typed positional arguments, produces an
/// output.
pub type ActionFn = Box<dyn Fn(&[Value]) -> Result<CommandOutput>>;

/// Descriptor of one invocable command.
pub struct Command {
    aliases: Vec<String>,
    description: String,
    usage: String,
    action: ActionFn,
    arg_types: Vec<ArgType>,
    varargs: bool,
    optional_args: bool,
    params: HashMap<String, Rc<Param>>,
}

impl Command {
    pub fn new<F>(aliases: &[&str], description: &str, action: F) -> Self
    where
        F: Fn(&[Value]) -> Result<CommandOutput> + 'static,
    {
        Self {
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            description: description.to_string(),
            usage: String::new(),
            action: Box::new(action),
            arg_types: Vec::new(),
            varargs: false,
            optional_args: false,
            params: HashMap::new(),
        }
    }

    /// Set the user-facing usage string.
    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    /// Declare the positional-argument contract of the action.
    pub fn with_args(mut self, types: &[ArgType]) -> Self {
        self.arg_types = types.to_vec();
        self
    }

    /// The last declared argument type repeats: tokens beyond the fixed
    /// prefix each coerce to it and form a variable-length tail.
    pub fn varargs(mut self) -> Self {
        self.varargs = true;
        self
    }

    /// The action accepts fewer arguments than declared (any count from zero
    /// up to the declared arity).
    pub fn optional_args(mut self) -> Self {
        self.optional_args = true;
        self
    }

    /// Attach a param under the given alias.
    pub fn with_param(mut self, alias: &str, param: Param) -> Self {
        self.params.insert(alias.to_string(), Rc::new(param));
        self
    }

    /// Attach an existing (possibly shared) param instance under the given
    /// alias.
    pub fn with_shared_param(mut self, alias: &str, param: &Rc<Param>) -> Self {
        self.params.insert(alias.to_string(), Rc::clone(param));
        self
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn params(&self) -> &HashMap<String, Rc<Param>> {
        &self.params
    }

    /// Execute the command against raw tokens.
    ///
    /// Recognized params must form a contiguous prefix; the first token that
    /// is not a param alias ends the scan and starts the positional
    /// arguments. Without params the action's output is returned unmodified;
    /// with params the results aggregate into a [`CommandOutput::Many`].
    pub fn execute(&self, tokens: &[&str]) -> Result<CommandOutput> {
        if tokens.is_empty() {
            if !self.arg_types.is_empty() && !self.optional_args {
                return Err(TallyError::ArityMismatch {
                    usage: self.usage.clone(),
                    expected: self.arg_types.len(),
                    got: 0,
                });
            }
            return (self.action)(&[]);
        }

        let (consumed, used) = self.scan_params(tokens)?;
        let positional = &tokens[consumed..];
        self.check_arity(positional.len())?;
        let coerced = self.coerce_positional(positional)?;

        if used.is_empty() {
            return (self.action)(&coerced);
        }

        let mut current = coerced;
        let mut output = Vec::new();
        let mut run_action = true;
        for (param, own) in &used {
            run_action = run_action && param.runs_command_action();
            let result = param.invoke(own, &current)?;
            if param.returns_result() {
                output.push(result.clone());
            }
            if param.modifies() {
                current = result.into_args();
            }
        }

        if run_action {
            match (self.action)(&current)? {
                CommandOutput::One(value) => output.push(value),
                CommandOutput::Many(values) => output.extend(values),
                CommandOutput::None => {},
                // Signals carry no renderable value and bypass aggregation.
                signal @ (CommandOutput::Help(_) | CommandOutput::Stop) => return Ok(signal),
            }
        }
        Ok(CommandOutput::Many(output))
    }

    /// Left-to-right param scan over the token prefix.
    ///
    /// Returns the number of tokens consumed and the matched params with
    /// their coerced own arguments, in encounter order.
    fn scan_params(&self, tokens: &[&str]) -> Result<(usize, Vec<(Rc<Param>, Vec<Value>)>)> {
        let mut used = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let Some(param) = self.params.get(tokens[i]) else {
                break;
            };
            let need = param.arg_types().len();
            if tokens.len() - i - 1 < need {
                return Err(TallyError::InsufficientParamArgs {
                    alias: tokens[i].to_string(),
                    usage: param.usage().to_string(),
                    expected: type_names(param.arg_types()),
                });
            }
            let own = tokens[i + 1..i + 1 + need]
                .iter()
                .zip(param.arg_types())
                .map(|(raw, ty)| ty.coerce(raw, param.usage()))
                .collect::<Result<Vec<_>>>()?;
            used.push((Rc::clone(param), own));
            i += 1 + need;
        }
        Ok((i, used))
    }

    /// Authoritative arity check over true positional tokens (params already
    /// consumed).
    fn check_arity(&self, got: usize) -> Result<()> {
        let expected = self.arg_types.len();
        let ok = if self.varargs {
            // The fixed prefix must be complete; the tail may be empty.
            got + 1 >= expected
        } else if self.optional_args {
            got <= expected
        } else {
            got == expected
        };
        if ok {
            Ok(())
        } else {
            Err(TallyError::ArityMismatch {
                usage: self.usage.clone(),
                expected,
                got,
            })
        }
    }

    fn coerce_positional(&self, tokens: &[&str]) -> Result<Vec<Value>> {
        if self.varargs {
            let Some(&tail_type) = self.arg_types.last() else {
                // Malformed definition: varargs with no declared types.
                // Definitions are not validated at registration, so this
                // surfaces here.
                return Err(TallyError::Domain(
                    "varargs command declares no argument types".to_string(),
                ));
            };
            let fixed = self.arg_types.len() - 1;
            let mut values = Vec::with_capacity(tokens.len());
            for (raw, ty) in tokens[..fixed].iter().zip(&self.arg_types) {
                values.push(ty.coerce(raw, &self.usage)?);
            }
            for raw in &tokens[fixed..] {
                values.push(tail_type.coerce(raw, &self.usage)?);
            }
            Ok(values)
        } else {
            tokens
                .iter()
                .zip(&self.arg_types)
                .map(|(raw, ty)| ty.coerce(raw, &self.usage))
                .collect()
        }
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("aliases", &self.aliases)
            .field("description", &self.description)
            .field("usage", &self.usage)
            .field("arg_types", &self.arg_types)
            .field("varargs", &self.varargs)
            .field("optional_args", &self.optional_args)
            .field("params", &self.params.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::as_ints;

    /// A varargs integer-sum command with the filter/observe param set used
    /// throughout the engine tests.
    fn sum_cmd() -> Command {
        Command::new(&["sum"], "Sum integers", |args| {
            Ok(CommandOutput::One(Value::Int(as_ints(args)?.iter().sum())))
        })
        .with_usage("sum [param..] <int..>")
        .with_args(&[ArgType::Int])
        .varargs()
        .with_param(
            "-s",
            Param::new("Show the summands", |args| Ok(Value::List(args.to_vec())))
                .observe()
                .emit_result(),
        )
        .with_param(
            "-n",
            Param::new("Keep only negatives", |args| {
                Ok(as_ints(args)?
                    .into_iter()
                    .filter(|n| *n < 0)
                    .collect::<Vec<_>>()
                    .into())
            }),
        )
        .with_param(
            "-sort",
            Param::new("Sort ascending", |args| {
                let mut numbers = as_ints(args)?;
                numbers.sort_unstable();
                Ok(numbers.into())
            }),
        )
        .with_param(
            "-lb",
            Param::new("Keep values at or above a lower bound", |args| {
                let (bound, rest) = args.split_first().expect("own arg present");
                let bound = bound.as_int()?;
                Ok(as_ints(rest)?
                    .into_iter()
                    .filter(|n| *n >= bound)
                    .collect::<Vec<_>>()
                    .into())
            })
            .with_usage("-lb <lower bound>")
            .with_args(&[ArgType::Int]),
        )
        .with_param(
            "-b",
            Param::new("Keep values within bounds", |args| {
                let lb = args[0].as_int()?;
                let ub = args[1].as_int()?;
                Ok(as_ints(&args[2..])?
                    .into_iter()
                    .filter(|n| (lb..=ub).contains(n))
                    .collect::<Vec<_>>()
                    .into())
            })
            .with_usage("-b <lower bound> <upper bound>")
            .with_args(&[ArgType::Int, ArgType::Int]),
        )
    }

    fn exec(cmd: &Command, tokens: &[&str]) -> Result<CommandOutput> {
        cmd.execute(tokens)
    }

    #[test]
    fn fixed_arity_invokes_action_once() {
        let out = exec(&sum_cmd(), &["1", "2", "3"]).unwrap();
        assert_eq!(out, CommandOutput::One(Value::Int(6)));
    }

    #[test]
    fn no_tokens_on_required_args_is_arity_error() {
        let err = exec(&sum_cmd(), &[]).unwrap_err();
        assert!(matches!(err, TallyError::ArityMismatch { got: 0, .. }));
    }

    #[test]
    fn zero_arg_command_runs_directly() {
        let cmd = Command::new(&["ping"], "Ping", |_| {
            Ok(CommandOutput::One(Value::from("pong")))
        });
        assert_eq!(
            exec(&cmd, &[]).unwrap(),
            CommandOutput::One(Value::from("pong"))
        );
    }

    #[test]
    fn zero_arg_command_rejects_excess_tokens() {
        let cmd = Command::new(&["ping"], "Ping", |_| Ok(CommandOutput::None));
        let err = exec(&cmd, &["extra"]).unwrap_err();
        assert!(matches!(
            err,
            TallyError::ArityMismatch {
                expected: 0,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn param_prefix_consumption_is_exact() {
        // -lb claims "0"; the rest are positional.
        let out = exec(&sum_cmd(), &["-lb", "0", "1", "-2", "3", "-4"]).unwrap();
        assert_eq!(out, CommandOutput::Many(vec![Value::Int(4)]));
    }

    #[test]
    fn observing_param_emits_without_altering_args() {
        let out = exec(&sum_cmd(), &["-s", "1", "2", "3"]).unwrap();
        assert_eq!(
            out,
            CommandOutput::Many(vec![
                Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
                Value::Int(6),
            ])
        );
    }

    #[test]
    fn chained_modifying_params_compose_left_to_right() {
        let out = exec(&sum_cmd(), &["-n", "-sort", "1", "-2", "3", "-4"]).unwrap();
        assert_eq!(out, CommandOutput::Many(vec![Value::Int(-6)]));
    }

    #[test]
    fn insufficient_param_args_never_runs_action() {
        let err = exec(&sum_cmd(), &["-b", "5"]).unwrap_err();
        match err {
            TallyError::InsufficientParamArgs {
                alias, expected, ..
            } => {
                assert_eq!(alias, "-b");
                assert_eq!(expected, "int, int");
            },
            other => panic!("expected InsufficientParamArgs, got {other}"),
        }
    }

    #[test]
    fn param_own_arg_coercion_failure_carries_usage() {
        let err = exec(&sum_cmd(), &["-lb", "low", "1", "2"]).unwrap_err();
        match err {
            TallyError::Coercion { raw, usage, .. } => {
                assert_eq!(raw, "low");
                assert_eq!(usage, "-lb <lower bound>");
            },
            other => panic!("expected Coercion, got {other}"),
        }
    }

    #[test]
    fn positional_coercion_failure_carries_command_usage() {
        let err = exec(&sum_cmd(), &["1", "two", "3"]).unwrap_err();
        match err {
            TallyError::Coercion { raw, usage, .. } => {
                assert_eq!(raw, "two");
                assert_eq!(usage, "sum [param..] <int..>");
            },
            other => panic!("expected Coercion, got {other}"),
        }
    }

    #[test]
    fn non_param_token_ends_scan_permanently() {
        // "-sort" after a positional token is an ordinary token, and fails
        // int coercion instead of being treated as a param.
        let err = exec(&sum_cmd(), &["1", "-sort", "2"]).unwrap_err();
        assert!(matches!(err, TallyError::Coercion { .. }));
    }

    #[test]
    fn param_only_vararg_invocation_is_valid() {
        // All tokens consumed by params; the action runs on an empty list.
        let out = exec(&sum_cmd(), &["-s"]).unwrap();
        assert_eq!(
            out,
            CommandOutput::Many(vec![Value::List(vec![]), Value::Int(0)])
        );
    }

    #[test]
    fn veto_param_suppresses_action_for_whole_chain() {
        let cmd = Command::new(&["go"], "Go", |_| {
            Ok(CommandOutput::One(Value::from("ran")))
        })
        .with_param(
            "-dry",
            Param::new("Veto", |_| Ok(Value::from("dry run")))
                .observe()
                .veto_action()
                .emit_result()
                .own_args_only(),
        )
        .with_param("-id", Param::new("Identity", |args| Ok(Value::List(args.to_vec()))));
        let out = exec(&cmd, &["-dry", "-id"]).unwrap();
        assert_eq!(out, CommandOutput::Many(vec![Value::from("dry run")]));
    }

    #[test]
    fn modify_and_emit_both_apply() {
        let cmd = Command::new(&["count"], "Count args", |args| {
            Ok(CommandOutput::One(Value::Int(args.len() as i64)))
        })
        .with_args(&[ArgType::Int])
        .varargs()
        .with_param(
            "-dup",
            Param::new("Duplicate args", |args| {
                let mut doubled = args.to_vec();
                doubled.extend_from_slice(args);
                Ok(Value::List(doubled))
            })
            .emit_result(),
        );
        let out = exec(&cmd, &["-dup", "7"]).unwrap();
        assert_eq!(
            out,
            CommandOutput::Many(vec![
                Value::List(vec![Value::Int(7), Value::Int(7)]),
                Value::Int(2),
            ])
        );
    }

    #[test]
    fn scalar_modify_result_becomes_single_arg() {
        let cmd = Command::new(&["first"], "First arg", |args| {
            Ok(CommandOutput::One(args[0].clone()))
        })
        .with_args(&[ArgType::Int])
        .varargs()
        .with_param("-pick", Param::new("Collapse to 99", |_| Ok(Value::Int(99))));
        let out = exec(&cmd, &["-pick", "1", "2"]).unwrap();
        assert_eq!(out, CommandOutput::Many(vec![Value::Int(99)]));
    }

    #[test]
    fn optional_args_accepts_zero_up_to_declared() {
        let cmd = Command::new(&["opt"], "Optional", |args| {
            Ok(CommandOutput::One(Value::Int(args.len() as i64)))
        })
        .with_usage("opt [a] [b]")
        .with_args(&[ArgType::Str, ArgType::Str])
        .optional_args();
        assert_eq!(exec(&cmd, &[]).unwrap(), CommandOutput::One(Value::Int(0)));
        assert_eq!(
            exec(&cmd, &["x"]).unwrap(),
            CommandOutput::One(Value::Int(1))
        );
        assert_eq!(
            exec(&cmd, &["x", "y"]).unwrap(),
            CommandOutput::One(Value::Int(2))
        );
        let err = exec(&cmd, &["x", "y", "z"]).unwrap_err();
        assert!(matches!(
            err,
            TallyError::ArityMismatch {
                expected: 2,
                got: 3,
                ..
            }
        ));
    }

    #[test]
    fn varargs_fixed_prefix_must_be_complete() {
        let cmd = Command::new(&["mix"], "Fixed prefix plus tail", |args| {
            Ok(CommandOutput::One(Value::Int(args.len() as i64)))
        })
        .with_usage("mix <name> <int..>")
        .with_args(&[ArgType::Str, ArgType::Int])
        .varargs();
        // One positional token covers the fixed prefix; tail may be empty.
        assert!(exec(&cmd, &["label"]).is_ok());
        assert!(exec(&cmd, &["label", "1", "2"]).is_ok());
    }

    #[test]
    fn varargs_tail_coerces_to_last_type() {
        let cmd = Command::new(&["mix"], "Fixed prefix plus tail", |args| {
            Ok(CommandOutput::Many(args.to_vec()))
        })
        .with_args(&[ArgType::Str, ArgType::Int])
        .varargs();
        let out = exec(&cmd, &["label", "1", "2"]).unwrap();
        assert_eq!(
            out,
            CommandOutput::Many(vec![Value::from("label"), Value::Int(1), Value::Int(2)])
        );
        assert!(exec(&cmd, &["label", "1", "oops"]).is_err());
    }

    #[test]
    fn shared_param_instance_acts_identically_on_two_commands() {
        let shared = Rc::new(
            Param::new("Tag output", |_| Ok(Value::from("tag")))
                .observe()
                .emit_result()
                .own_args_only(),
        );
        let a = Command::new(&["a"], "A", |_| Ok(CommandOutput::One(Value::from("A"))))
            .with_shared_param("-t", &shared);
        let b = Command::new(&["b"], "B", |_| Ok(CommandOutput::One(Value::from("B"))))
            .with_shared_param("-t", &shared);
        assert_eq!(
            exec(&a, &["-t"]).unwrap(),
            CommandOutput::Many(vec![Value::from("tag"), Value::from("A")])
        );
        assert_eq!(
            exec(&b, &["-t"]).unwrap(),
            CommandOutput::Many(vec![Value::from("tag"), Value::from("B")])
        );
        assert_eq!(Rc::strong_count(&shared), 3);
    }

    #[test]
    fn stop_signal_passes_through_param_chain() {
        let cmd = Command::new(&["halt"], "Halt", |_| Ok(CommandOutput::Stop))
            .with_param("-id", Param::new("Identity", |args| Ok(Value::List(args.to_vec()))));
        assert_eq!(exec(&cmd, &["-id"]).unwrap(), CommandOutput::Stop);
    }
}
