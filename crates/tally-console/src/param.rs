//! Command parameters: named modifiers that observe or transform a command's
//! positional arguments, emit side output, or veto the main action.
//!
//! A param carries no command-specific state, so one `Rc<Param>` instance can
//! be attached to any number of commands.

use tally_types::error::Result;

use crate::value::{ArgType, Value};

/// Behavior of a param: receives typed arguments, produces one value.
pub type ParamFn = Box<dyn Fn(&[Value]) -> Result<Value>>;

/// Descriptor of one command modifier.
///
/// Defaults match the common case of an argument filter: the result replaces
/// the positional-argument list (`modify`), the main action still runs, the
/// result is not emitted, and the current positional arguments are passed to
/// the action after the param's own arguments.
pub struct Param {
    description: String,
    usage: String,
    action: ParamFn,
    modify: bool,
    run_command_action: bool,
    return_result: bool,
    use_command_args: bool,
    arg_types: Vec<ArgType>,
}

impl Param {
    pub fn new<F>(description: &str, action: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        Self {
            description: description.to_string(),
            usage: String::new(),
            action: Box::new(action),
            modify: true,
            run_command_action: true,
            return_result: false,
            use_command_args: true,
            arg_types: Vec::new(),
        }
    }

    /// Set the user-facing usage string.
    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    /// Declare the tokens this param claims after its alias. The length is
    /// the param's fixed arity.
    pub fn with_args(mut self, types: &[ArgType]) -> Self {
        self.arg_types = types.to_vec();
        self
    }

    /// The param only observes: its result does not replace the
    /// positional-argument list.
    pub fn observe(mut self) -> Self {
        self.modify = false;
        self
    }

    /// Suppress the main command action after this param runs.
    pub fn veto_action(mut self) -> Self {
        self.run_command_action = false;
        self
    }

    /// Append this param's result to the rendered output sequence.
    pub fn emit_result(mut self) -> Self {
        self.return_result = true;
        self
    }

    /// Invoke the action with the param's own arguments only, without the
    /// command's current positional arguments.
    pub fn own_args_only(mut self) -> Self {
        self.use_command_args = false;
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn arg_types(&self) -> &[ArgType] {
        &self.arg_types
    }

    pub(crate) fn modifies(&self) -> bool {
        self.modify
    }

    pub(crate) fn runs_command_action(&self) -> bool {
        self.run_command_action
    }

    pub(crate) fn returns_result(&self) -> bool {
        self.return_result
    }

    /// Run the param's action.
    ///
    /// `own` are the param's coerced arguments, `current` the command's
    /// current positional arguments. Coercion happened before this call; the
    /// action sees typed values only.
    pub fn invoke(&self, own: &[Value], current: &[Value]) -> Result<Value> {
        if self.use_command_args {
            let mut all = Vec::with_capacity(own.len() + current.len());
            all.extend_from_slice(own);
            all.extend_from_slice(current);
            (self.action)(&all)
        } else {
            (self.action)(own)
        }
    }
}

impl std::fmt::Debug for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Param")
            .field("description", &self.description)
            .field("usage", &self.usage)
            .field("modify", &self.modify)
            .field("run_command_action", &self.run_command_action)
            .field("return_result", &self.return_result)
            .field("use_command_args", &self.use_command_args)
            .field("arg_types", &self.arg_types)
            .finish_non_exhaustive()
    }
}
