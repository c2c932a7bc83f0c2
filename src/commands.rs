use crate::output::Printer;
use std::io::Write;
use tabletop_dice_roll::{
    dice_roll::{RandomSource, Roller},
    parser, roll_expression, EvaluationError, ParseError,
};

pub const USAGE: &str = "roll - a tabletop dice roller

Usage:
  roll [--json] <expression> [expressions...]
  roll [--json] sum <terms...>
  roll [--json] advantage [modifier]
  roll [--json] disadvantage [modifier]
  roll [--json] stats
  roll [--json] age [modifier]

Dice Notation:
  NdM       Roll N dice with M sides (e.g., 2d6, 1d20)
  NdM+X     Add X to the total (e.g., 1d20+5)
  NdM-X     Subtract X from the total (e.g., 1d20-2)
  NdMdl[N]  Drop lowest N dice (e.g., 4d6dl1)
  NdMdh[N]  Drop highest N dice (e.g., 4d6dh1)
  NdMkh[N]  Keep highest N dice (e.g., 2d20kh1 for advantage)
  NdMkl[N]  Keep lowest N dice (e.g., 2d20kl1 for disadvantage)
  A+B-C     Chain dice groups and numbers (e.g., 3d6+2d8-5)

Shortcuts:
  sum <terms...>      Join the arguments into one chain and report every term
  advantage [mod]     Roll 2d20 keep highest + modifier
  disadvantage [mod]  Roll 2d20 keep lowest + modifier
  stats               Roll 4d6dl1 six times for ability scores
  age [mod]           Roll 3d6 + modifier, reporting stunt points and the drama die

Environment:
  ROLL_CONFIG         Config file (default roll.toml)
  ROLL_SEED           Seed for reproducible rolls
  RUST_LOG            Log verbosity";

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Command {
    Help,
    Advantage(i64),
    Disadvantage(i64),
    Stats,
    Age(i64),
    Sum(Vec<String>),
    Roll(Vec<String>),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Invocation {
    pub command: Command,
    pub json: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("missing dice expression")]
    NoArguments,

    #[error("invalid modifier: {0}")]
    InvalidModifier(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("unable to write output: {0}")]
    Io(#[from] std::io::Error),
}

fn modifier_arg(args: &[&str]) -> Result<i64, CliError> {
    match args.first() {
        Some(arg) => {
            parser::parse_modifier(arg).map_err(|_| CliError::InvalidModifier(arg.to_string()))
        }
        None => Ok(0),
    }
}

pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Result<Invocation, CliError> {
    let mut json = false;
    let mut rest: Vec<&str> = Vec::with_capacity(args.len());
    for arg in args.iter() {
        match arg.as_ref() {
            "--json" => json = true,
            other => rest.push(other),
        }
    }
    let (first, tail) = rest.split_first().ok_or(CliError::NoArguments)?;
    let command = match first.to_lowercase().as_str() {
        "help" | "-h" | "--help" => Command::Help,
        "advantage" | "adv" => Command::Advantage(modifier_arg(tail)?),
        "disadvantage" | "dis" | "disadv" => Command::Disadvantage(modifier_arg(tail)?),
        "stats" | "abilities" => Command::Stats,
        "age" => Command::Age(modifier_arg(tail)?),
        "sum" => {
            if tail.is_empty() {
                return Err(CliError::NoArguments);
            }
            Command::Sum(tail.iter().map(|arg| arg.to_string()).collect())
        }
        _ => Command::Roll(rest.iter().map(|arg| arg.to_string()).collect()),
    };
    Ok(Invocation { command, json })
}

/// Runs `command`. `Ok(false)` means at least one of several independent
/// expressions failed and was reported.
pub fn run<S, O, E>(
    command: &Command,
    roller: &mut Roller<S>,
    printer: &mut Printer<O, E>,
) -> Result<bool, CliError>
where
    S: RandomSource,
    O: Write,
    E: Write,
{
    match command {
        Command::Help => printer.usage(USAGE)?,
        Command::Advantage(modifier) => {
            let result = roller.advantage(*modifier)?;
            printer.labeled("Advantage", &result)?;
        }
        Command::Disadvantage(modifier) => {
            let result = roller.disadvantage(*modifier)?;
            printer.labeled("Disadvantage", &result)?;
        }
        Command::Stats => {
            let scores = roller.ability_scores()?;
            printer.abilities(&scores)?;
        }
        Command::Age(modifier) => {
            let age = roller.age(*modifier)?;
            printer.age(&age)?;
        }
        Command::Sum(args) => {
            let terms = parser::parse_terms(args.as_slice())?;
            let chain = roller.roll(terms.as_slice())?;
            printer.sum(&args.concat(), &chain)?;
        }
        Command::Roll(expressions) => {
            let mut all_rolled = true;
            for expression in expressions.iter() {
                match roll_expression(expression, roller) {
                    Ok(roll) => printer.expression(expression, &roll)?,
                    Err(e) => {
                        log::debug!("failed to roll {:?}: {:?}", expression, &e);
                        all_rolled = false;
                        printer.expression_error(expression, &e)?;
                    }
                }
            }
            return Ok(all_rolled);
        }
    }
    Ok(true)
}
