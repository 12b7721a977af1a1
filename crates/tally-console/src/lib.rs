//! Command interpreter for tally.
//!
//! The console is a registry-based dispatch system over a tagged value
//! model. Commands are descriptors (aliases, argument contract, action)
//! that can each carry named params: modifiers recognized as a contiguous
//! token prefix which may observe or transform the positional arguments,
//! emit side output, or veto the main action. One invocation with params
//! produces an ordered multi-result rendered element by element.

mod command;
mod console;
pub mod math_commands;
mod param;
mod value;

/// A command descriptor with its execution algorithm.
pub use command::Command;
/// Output of one command invocation, including the stop/help signals.
pub use command::CommandOutput;
/// Behavior type of a command action.
pub use command::ActionFn;
/// Registry of commands with tokenization and dispatch.
pub use console::Console;
/// Shell-style line tokenizer.
pub use console::tokenize;
/// Register the math command family (sum and the random generators).
pub use math_commands::register_math_commands;
/// A command modifier descriptor.
pub use param::Param;
/// Behavior type of a param action.
pub use param::ParamFn;
/// Declared argument type with coercion.
pub use value::ArgType;
/// Tagged value: typed argument and renderable result currency.
pub use value::Value;
