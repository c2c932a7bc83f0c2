use serde::Serialize;
use std::{fmt::Display, io::Write, str::FromStr};
use tabletop_dice_roll::dice_roll::{AgeRoll, ChainRoll, ExpressionRoll, RollResult};

pub const ABILITIES: [&str; 6] = ["STR", "DEX", "CON", "INT", "WIS", "CHA"];

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format {:?}", other)),
        }
    }
}

#[derive(Serialize)]
struct ExpressionRecord<'a> {
    expression: &'a str,
    result: &'a ExpressionRoll,
}

#[derive(Serialize)]
struct LabeledRecord<'a> {
    label: &'a str,
    result: &'a RollResult,
}

#[derive(Serialize)]
struct AbilityRecord<'a> {
    ability: &'a str,
    result: &'a RollResult,
}

#[derive(Serialize)]
struct AbilitiesRecord<'a> {
    scores: Vec<AbilityRecord<'a>>,
    total: i64,
}

#[derive(Serialize)]
struct SumRecord<'a> {
    expression: &'a str,
    result: &'a ChainRoll,
}

pub fn format_expression(expression: &str, roll: &ExpressionRoll) -> String {
    match roll {
        ExpressionRoll::Single(result) => format!("{}: {}", expression, result),
        ExpressionRoll::Chain(chain) => format!("{}: {}", expression, chain.total),
    }
}

pub fn format_abilities(scores: &[RollResult]) -> String {
    let mut lines = vec![
        "Rolling ability scores (4d6 drop lowest):".to_string(),
        String::new(),
    ];
    let mut total = 0;
    for (ability, score) in ABILITIES.iter().zip(scores.iter()) {
        total += score.total;
        lines.push(format!("  {}: {:2}  {}", ability, score.total, score));
    }
    lines.push(String::new());
    let average = if scores.is_empty() {
        0.0
    } else {
        total as f64 / scores.len() as f64
    };
    lines.push(format!("  Total: {} (average: {:.1})", total, average));
    lines.join("\n")
}

pub fn format_sum(chain: &ChainRoll) -> String {
    let mut lines: Vec<String> = chain.terms.iter().map(|term| term.to_string()).collect();
    lines.push(format!("total: {}", chain.total));
    lines.join("\n")
}

pub fn format_age(age: &AgeRoll) -> String {
    let mut lines = vec![
        format!("Dice: {} {} *{}*", age.dice[0], age.dice[1], age.dice[2]),
        format!("Modifier: {:+}", age.modifier),
        format!("Total: {}", age.total),
    ];
    if let Some(points) = age.stunt_points {
        lines.push(format!("Generated {} stunt points", points));
    }
    if age.drama {
        lines.push("Rolled a 6 on your drama die".to_string());
    }
    lines.join("\n")
}

/// Writes results to `out` and diagnostics to `err`.
pub struct Printer<O: Write, E: Write> {
    format: OutputFormat,
    out: O,
    err: E,
}

impl<O: Write, E: Write> Printer<O, E> {
    pub fn new(format: OutputFormat, out: O, err: E) -> Printer<O, E> {
        Printer { format, out, err }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    fn emit<T: Serialize, F: FnOnce() -> String>(&mut self, record: &T, text: F) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{}", text()),
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, record)?;
                writeln!(self.out)
            }
        }
    }

    pub fn usage(&mut self, usage: &str) -> std::io::Result<()> {
        writeln!(self.out, "{}", usage)
    }

    pub fn error<D: Display>(&mut self, message: D) -> std::io::Result<()> {
        writeln!(self.err, "Error: {}", message)
    }

    pub fn expression(&mut self, expression: &str, roll: &ExpressionRoll) -> std::io::Result<()> {
        self.emit(
            &ExpressionRecord {
                expression,
                result: roll,
            },
            || format_expression(expression, roll),
        )
    }

    pub fn expression_error<D: Display>(&mut self, expression: &str, error: D) -> std::io::Result<()> {
        writeln!(self.err, "Error rolling '{}': {}", expression, error)
    }

    pub fn labeled(&mut self, label: &str, result: &RollResult) -> std::io::Result<()> {
        self.emit(&LabeledRecord { label, result }, || {
            format!("{}: {}", label, result)
        })
    }

    pub fn abilities(&mut self, scores: &[RollResult]) -> std::io::Result<()> {
        let record = AbilitiesRecord {
            scores: ABILITIES
                .iter()
                .zip(scores.iter())
                .map(|(ability, result)| AbilityRecord {
                    ability: *ability,
                    result,
                })
                .collect(),
            total: scores.iter().map(|score| score.total).sum(),
        };
        self.emit(&record, || format_abilities(scores))
    }

    pub fn sum(&mut self, expression: &str, chain: &ChainRoll) -> std::io::Result<()> {
        self.emit(
            &SumRecord {
                expression,
                result: chain,
            },
            || format_sum(chain),
        )
    }

    pub fn age(&mut self, age: &AgeRoll) -> std::io::Result<()> {
        self.emit(age, || format_age(age))
    }
}
