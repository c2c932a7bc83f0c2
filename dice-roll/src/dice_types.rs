/*
Copyright 2021 Robin Marchart

   Licensed under the Apache License, Version 2.0 (the "License");
   you may not use this file except in compliance with the License.
   You may obtain a copy of the License at

       http://www.apache.org/licenses/LICENSE-2.0

   Unless required by applicable law or agreed to in writing, software
   distributed under the License is distributed on an "AS IS" BASIS,
   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
   See the License for the specific language governing permissions and
   limitations under the License.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// A group of identical dice, `throws` dice with `sides` faces each.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dice {
    pub throws: u32,
    pub sides: u32,
}

impl Dice {
    pub fn new(throws: u32, sides: u32) -> Dice {
        Dice { throws, sides }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Operation {
    Add,
    Sub,
}

impl Operation {
    /// Signed contribution of `value` to a running total.
    pub fn apply(self, value: i64) -> i64 {
        match self {
            Operation::Add => value,
            Operation::Sub => -value,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operation::Add => '+',
            Operation::Sub => '-',
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TermValue {
    Dice(Dice),
    Flat(u32),
}

/// One signed element of a chained expression like `3d6+2d8-5`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Term {
    pub operation: Operation,
    pub value: TermValue,
}

impl Term {
    pub fn dice(operation: Operation, throws: u32, sides: u32) -> Term {
        Term {
            operation,
            value: TermValue::Dice(Dice::new(throws, sides)),
        }
    }

    pub fn flat(operation: Operation, value: u32) -> Term {
        Term {
            operation,
            value: TermValue::Flat(value),
        }
    }
}

/// Selection applied to the rolled dice of a [`DiceSpec`] before summing.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RollModifier {
    None,
    DropLowest,
    DropHighest,
    KeepHighest,
    KeepLowest,
}

impl RollModifier {
    pub fn suffix(self) -> &'static str {
        match self {
            RollModifier::None => "",
            RollModifier::DropLowest => "dl",
            RollModifier::DropHighest => "dh",
            RollModifier::KeepHighest => "kh",
            RollModifier::KeepLowest => "kl",
        }
    }
}

impl Default for RollModifier {
    fn default() -> Self {
        RollModifier::None
    }
}

/// A single die group with an optional drop/keep rule and a flat modifier,
/// written as `[count]d<sides>[dl|dh|kh|kl[n]][+/-modifier]`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiceSpec {
    pub dice: Dice,
    pub modifier: i64,
    pub roll_modifier: RollModifier,
    pub drop_keep: u32,
}

impl DiceSpec {
    pub fn new(throws: u32, sides: u32) -> DiceSpec {
        DiceSpec {
            dice: Dice::new(throws, sides),
            modifier: 0,
            roll_modifier: RollModifier::None,
            drop_keep: 0,
        }
    }

    pub fn with_modifier(mut self, modifier: i64) -> DiceSpec {
        self.modifier = modifier;
        self
    }

    pub fn with_roll_modifier(mut self, roll_modifier: RollModifier, count: u32) -> DiceSpec {
        self.roll_modifier = roll_modifier;
        self.drop_keep = count;
        self
    }

    /// 2d20, keep the highest.
    pub fn advantage(modifier: i64) -> DiceSpec {
        DiceSpec::new(2, 20)
            .with_roll_modifier(RollModifier::KeepHighest, 1)
            .with_modifier(modifier)
    }

    /// 2d20, keep the lowest.
    pub fn disadvantage(modifier: i64) -> DiceSpec {
        DiceSpec::new(2, 20)
            .with_roll_modifier(RollModifier::KeepLowest, 1)
            .with_modifier(modifier)
    }

    /// 4d6, drop the lowest.
    pub fn ability_score() -> DiceSpec {
        DiceSpec::new(4, 6).with_roll_modifier(RollModifier::DropLowest, 1)
    }

    /// Number of dice that count toward the total once the drop/keep rule is applied.
    pub fn kept_count(&self) -> u32 {
        let throws = self.dice.throws;
        let count = self.drop_keep;
        if self.roll_modifier == RollModifier::None || count == 0 || count >= throws {
            return throws;
        }
        match self.roll_modifier {
            RollModifier::DropLowest | RollModifier::DropHighest => throws - count,
            RollModifier::KeepHighest | RollModifier::KeepLowest => count,
            RollModifier::None => throws,
        }
    }
}

/// Anything the command line accepts as a single expression.
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Expression {
    Single(DiceSpec),
    Chain(Vec<Term>),
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.throws, self.sides)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            TermValue::Dice(dice) => write!(f, "{}{}", self.operation, dice),
            TermValue::Flat(value) => write!(f, "{}{}", self.operation, value),
        }
    }
}

impl fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dice)?;
        if self.roll_modifier != RollModifier::None {
            write!(f, "{}{}", self.roll_modifier.suffix(), self.drop_keep)?;
        }
        if self.modifier != 0 {
            write!(f, "{:+}", self.modifier)?;
        }
        Ok(())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Single(spec) => write!(f, "{}", spec),
            Expression::Chain(terms) => {
                let mut iter = terms.iter();
                if let Some(first) = iter.next() {
                    match (first.operation, first.value) {
                        (Operation::Add, TermValue::Dice(dice)) => write!(f, "{}", dice)?,
                        (Operation::Add, TermValue::Flat(value)) => write!(f, "{}", value)?,
                        _ => write!(f, "{}", first)?,
                    }
                }
                for term in iter {
                    write!(f, "{}", term)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_spec() {
        assert_eq!(DiceSpec::new(1, 20).to_string(), "1d20");
        assert_eq!(DiceSpec::advantage(5).to_string(), "2d20kh1+5");
        assert_eq!(DiceSpec::disadvantage(-2).to_string(), "2d20kl1-2");
        assert_eq!(DiceSpec::ability_score().to_string(), "4d6dl1");
    }

    #[test]
    fn test_display_terms() {
        assert_eq!(Term::dice(Operation::Add, 3, 6).to_string(), "+3d6");
        assert_eq!(Term::flat(Operation::Sub, 5).to_string(), "-5");
        assert_eq!(
            Expression::Chain(vec![
                Term::dice(Operation::Add, 3, 6),
                Term::dice(Operation::Add, 2, 8),
                Term::flat(Operation::Sub, 5),
            ])
            .to_string(),
            "3d6+2d8-5"
        );
        assert_eq!(
            Expression::Chain(vec![Term::dice(Operation::Sub, 2, 4)]).to_string(),
            "-2d4"
        );
    }

    #[test]
    fn test_kept_count() {
        assert_eq!(DiceSpec::ability_score().kept_count(), 3);
        assert_eq!(DiceSpec::advantage(0).kept_count(), 1);
        assert_eq!(DiceSpec::new(5, 10).kept_count(), 5);
        assert_eq!(
            DiceSpec::new(5, 10)
                .with_roll_modifier(RollModifier::DropHighest, 2)
                .kept_count(),
            3
        );
        assert_eq!(
            DiceSpec::new(3, 6)
                .with_roll_modifier(RollModifier::KeepLowest, 0)
                .kept_count(),
            3
        );
        assert_eq!(
            DiceSpec::new(3, 6)
                .with_roll_modifier(RollModifier::DropLowest, 3)
                .kept_count(),
            3
        );
    }

    #[test]
    fn test_operation_apply() {
        assert_eq!(Operation::Add.apply(7), 7);
        assert_eq!(Operation::Sub.apply(7), -7);
    }
}
