//! Math command set: summation with its filter params, and random sequence
//! generation under three distributions.

use std::rc::Rc;

use tally_types::error::Result;

use crate::command::{Command, CommandOutput};
use crate::console::Console;
use crate::param::Param;
use crate::value::{ArgType, Value, as_ints};

/// Register the math command family.
pub fn register_math_commands(console: &mut Console) {
    // One shared instance across all commands below.
    let text = Rc::new(
        Param::new("Add literal text to the output", |args| {
            let text = args.first().map(ToString::to_string).unwrap_or_default();
            Ok(Value::Str(text.replace("\\n", "\n")))
        })
        .with_usage("-text <text>")
        .with_args(&[ArgType::Str])
        .observe()
        .emit_result()
        .own_args_only(),
    );

    console.register(sum_command(&text));
    console.register(randu_command(&text));
    console.register(randn_command(&text));
    console.register(randx_command(&text));
}

fn sum_command(text: &Rc<Param>) -> Command {
    Command::new(&["sum"], "Sum an arbitrary number of integers", |args| {
        let total = tally_math::sum(&as_ints(args)?)?;
        Ok(CommandOutput::One(Value::Int(total)))
    })
    .with_usage("sum [param_1] ... [param_N] <int_1> ... <int_N>")
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
        Param::new("Filter: keep only negative numbers", |args| {
            filter_ints(args, |n| n < 0)
        }),
    )
    .with_param(
        "-p",
        Param::new("Filter: keep only positive numbers", |args| {
            filter_ints(args, |n| n > 0)
        }),
    )
    .with_param(
        "-lb",
        Param::new("Filter: drop numbers below a lower bound", |args| {
            let bound = args[0].as_int()?;
            filter_ints(&args[1..], |n| n >= bound)
        })
        .with_usage("-lb <lower bound>")
        .with_args(&[ArgType::Int]),
    )
    .with_param(
        "-ub",
        Param::new("Filter: drop numbers above an upper bound", |args| {
            let bound = args[0].as_int()?;
            filter_ints(&args[1..], |n| n <= bound)
        })
        .with_usage("-ub <upper bound>")
        .with_args(&[ArgType::Int]),
    )
    .with_param(
        "-b",
        Param::new("Filter: keep numbers within both bounds", |args| {
            let lb = args[0].as_int()?;
            let ub = args[1].as_int()?;
            filter_ints(&args[2..], |n| lb <= n && n <= ub)
        })
        .with_usage("-b <lower bound> <upper bound>")
        .with_args(&[ArgType::Int, ArgType::Int]),
    )
    .with_param(
        "-sort",
        Param::new("Sort the numbers ascending", |args| {
            let mut numbers = as_ints(args)?;
            numbers.sort_unstable();
            Ok(numbers.into())
        }),
    )
    .with_shared_param("-text", text)
}

fn filter_ints<F>(args: &[Value], keep: F) -> Result<Value>
where
    F: Fn(i64) -> bool,
{
    Ok(as_ints(args)?
        .into_iter()
        .filter(|n| keep(*n))
        .collect::<Vec<_>>()
        .into())
}

fn randu_command(text: &Rc<Param>) -> Command {
    Command::new(
        &["ru", "randu"],
        "Generate uniformly distributed random integers",
        |args| {
            let values = tally_math::uniform(
                &mut rand::rng(),
                args[0].as_int()?,
                args[1].as_int()?,
                args[2].as_int()?,
            )?;
            Ok(CommandOutput::One(values.into()))
        },
    )
    .with_usage("randu <count> <min> <max>")
    .with_args(&[ArgType::Int, ArgType::Int, ArgType::Int])
    .with_shared_param("-text", text)
}

fn randn_command(text: &Rc<Param>) -> Command {
    Command::new(
        &["rn", "randn"],
        "Generate normally distributed random integers",
        |args| {
            let values = tally_math::normal(
                &mut rand::rng(),
                args[0].as_int()?,
                args[1].as_float()?,
                args[2].as_float()?,
            )?;
            Ok(CommandOutput::One(values.into()))
        },
    )
    .with_usage("randn <count> <mean> <std dev>")
    .with_args(&[ArgType::Int, ArgType::Float, ArgType::Float])
    .with_shared_param("-text", text)
}

fn randx_command(text: &Rc<Param>) -> Command {
    Command::new(
        &["rx", "randx"],
        "Generate exponentially distributed random integers",
        |args| {
            let values =
                tally_math::exponential(&mut rand::rng(), args[0].as_int()?, args[1].as_float()?)?;
            Ok(CommandOutput::One(values.into()))
        },
    )
    .with_usage("randx <count> <scale>")
    .with_args(&[ArgType::Int, ArgType::Float])
    .with_shared_param("-text", text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_types::error::TallyError;

    fn console() -> Console {
        let mut console = Console::new("test");
        register_math_commands(&mut console);
        console
    }

    fn values(output: CommandOutput) -> Vec<Value> {
        match output {
            CommandOutput::One(v) => vec![v],
            CommandOutput::Many(vs) => vs,
            other => panic!("expected renderable output, got {other:?}"),
        }
    }

    #[test]
    fn plain_sum() {
        assert_eq!(
            values(console().dispatch("sum 1 2 3").unwrap()),
            vec![Value::Int(6)]
        );
    }

    #[test]
    fn sum_lower_bound_param_claims_its_own_token() {
        assert_eq!(
            values(console().dispatch("sum -lb 0 1 -2 3 -4").unwrap()),
            vec![Value::Int(4)]
        );
    }

    #[test]
    fn sum_show_param_emits_summands_then_total() {
        assert_eq!(
            values(console().dispatch("sum -s 1 2 3").unwrap()),
            vec![
                Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
                Value::Int(6),
            ]
        );
    }

    #[test]
    fn sum_negatives_then_sort_compose() {
        assert_eq!(
            values(console().dispatch("sum -n -sort 1 -2 3 -4").unwrap()),
            vec![Value::Int(-6)]
        );
    }

    #[test]
    fn sum_positive_filter() {
        assert_eq!(
            values(console().dispatch("sum -p 1 -2 3 -4 -5").unwrap()),
            vec![Value::Int(4)]
        );
    }

    #[test]
    fn sum_both_bounds() {
        assert_eq!(
            values(console().dispatch("sum -b 2 4 1 2 3 4 5").unwrap()),
            vec![Value::Int(9)]
        );
    }

    #[test]
    fn sum_overflow_is_a_renderable_error() {
        let console = console();
        let err = console.dispatch("sum 9223372036854775807 1").unwrap_err();
        assert!(matches!(err, TallyError::Domain(_)));
        // The error is terminal for that line only.
        assert_eq!(
            values(console.dispatch("sum 1 2").unwrap()),
            vec![Value::Int(3)]
        );
    }

    #[test]
    fn sum_bounds_param_short_of_args_fails_before_the_action() {
        let err = console().dispatch("sum -b 5").unwrap_err();
        assert!(matches!(err, TallyError::InsufficientParamArgs { .. }));
    }

    #[test]
    fn sum_text_param_keeps_newline_escapes() {
        let out = values(console().dispatch(r"sum -text 'total:\nbelow' 1 2").unwrap());
        assert_eq!(
            out,
            vec![Value::Str("total:\nbelow".into()), Value::Int(3)]
        );
    }

    #[test]
    fn text_param_is_one_shared_instance() {
        let console = console();
        let sum = console.resolve("sum").unwrap();
        let randu = console.resolve("randu").unwrap();
        let a = sum.params().get("-text").unwrap();
        let b = randu.params().get("-text").unwrap();
        assert!(Rc::ptr_eq(a, b));
    }

    #[test]
    fn randu_produces_count_values_in_range() {
        let out = values(console().dispatch("randu 5 1 10").unwrap());
        let Value::List(list) = &out[0] else {
            panic!("expected a list");
        };
        assert_eq!(list.len(), 5);
        for v in list {
            assert!((1..=10).contains(&v.as_int().unwrap()));
        }
    }

    #[test]
    fn randu_zero_count_is_a_domain_error() {
        let err = console().dispatch("randu 0 1 10").unwrap_err();
        assert!(matches!(err, TallyError::Domain(_)));
    }

    #[test]
    fn randn_accepts_float_parameters() {
        let out = values(console().dispatch("randn 3 0.0 1.5").unwrap());
        let Value::List(list) = &out[0] else {
            panic!("expected a list");
        };
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn randx_short_alias_and_scale_validation() {
        assert!(console().dispatch("rx 4 2.5").is_ok());
        assert!(matches!(
            console().dispatch("rx 4 0").unwrap_err(),
            TallyError::Domain(_)
        ));
    }

    #[test]
    fn rand_commands_reject_missing_arguments() {
        let err = console().dispatch("randu 5 1").unwrap_err();
        assert!(matches!(
            err,
            TallyError::ArityMismatch {
                expected: 3,
                got: 2,
                ..
            }
        ));
    }

    #[test]
    fn text_param_alone_still_generates() {
        // Params never shadow the positional arity of the rand commands.
        let out = values(console().dispatch("randu -text note 2 1 3").unwrap());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Value::Str("note".into()));
        assert!(matches!(out[1], Value::List(_)));
    }

    #[test]
    fn session_continues_after_domain_error() {
        let console = console();
        assert!(console.dispatch("randu 0 1 10").is_err());
        assert_eq!(
            values(console.dispatch("sum 1 1").unwrap()),
            vec![Value::Int(2)]
        );
        assert_eq!(console.dispatch("stop").unwrap(), CommandOutput::Stop);
    }
}
