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

use crate::dice_types::*;
use crate::error::EvaluationError;
use rand::Rng;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "logging")]
use log::debug;

pub const DEFAULT_MAX_DICE: u32 = 1000;
pub const AGE_DICE_COUNT: usize = 3;
pub const AGE_DICE_SIDES: u32 = 6;
pub const ABILITY_SCORE_COUNT: usize = 6;

/// Source of die faces.
pub trait RandomSource {
    /// Uniform value in `1..=sides`. `sides` is at least 1.
    fn next(&mut self, sides: u32) -> u32;
}

impl<R: Rng> RandomSource for R {
    fn next(&mut self, sides: u32) -> u32 {
        self.gen_range(1..=sides)
    }
}

/// Replays a fixed sequence of faces, starting over once exhausted.
/// Values outside `1..=sides` are clamped.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<u32>,
    position: usize,
}

impl ScriptedSource {
    pub fn new<V: Into<Vec<u32>>>(values: V) -> ScriptedSource {
        ScriptedSource {
            values: values.into(),
            position: 0,
        }
    }
}

impl RandomSource for ScriptedSource {
    fn next(&mut self, sides: u32) -> u32 {
        if self.values.is_empty() {
            return 1;
        }
        let value = self.values[self.position % self.values.len()];
        self.position = self.position.wrapping_add(1);
        value.max(1).min(sides)
    }
}

/// Owns the random source and the dice limit for a sequence of rolls.
pub struct Roller<S: RandomSource> {
    source: S,
    max_dice: u32,
}

impl<S: RandomSource> Roller<S> {
    pub fn new(source: S) -> Roller<S> {
        Roller {
            source,
            max_dice: DEFAULT_MAX_DICE,
        }
    }

    pub fn with_max_dice(mut self, max_dice: u32) -> Roller<S> {
        self.max_dice = max_dice;
        self
    }

    pub fn roll<E: DiceEvaluate + ?Sized>(&mut self, dice: &E) -> Result<E::Output, EvaluationError> {
        dice.evaluate(self)
    }

    pub fn advantage(&mut self, modifier: i64) -> Result<RollResult, EvaluationError> {
        self.roll(&DiceSpec::advantage(modifier))
    }

    pub fn disadvantage(&mut self, modifier: i64) -> Result<RollResult, EvaluationError> {
        self.roll(&DiceSpec::disadvantage(modifier))
    }

    pub fn ability_score(&mut self) -> Result<RollResult, EvaluationError> {
        self.roll(&DiceSpec::ability_score())
    }

    /// A full set of six ability scores.
    pub fn ability_scores(&mut self) -> Result<Vec<RollResult>, EvaluationError> {
        (0..ABILITY_SCORE_COUNT)
            .map(|_| self.ability_score())
            .collect()
    }

    /// Three d6 in order; the third one is the drama die.
    pub fn age(&mut self, modifier: i64) -> Result<AgeRoll, EvaluationError> {
        let mut dice = [0u32; AGE_DICE_COUNT];
        for die in dice.iter_mut() {
            *die = self.source.next(AGE_DICE_SIDES);
        }
        let sum: i64 = dice.iter().map(|die| i64::from(*die)).sum();
        let total = sum
            .checked_add(modifier)
            .ok_or(EvaluationError::Overflow)?;
        let stunt = dice[0] == dice[1] || dice[0] == dice[2] || dice[1] == dice[2];
        let result = AgeRoll {
            dice,
            modifier,
            total,
            stunt_points: if stunt { Some(dice[2]) } else { None },
            drama: dice[2] == AGE_DICE_SIDES,
        };

        #[cfg(feature = "logging")]
        {
            debug!("age roll {:?}", &result);
        }

        Ok(result)
    }

    fn check(&self, dice: &Dice) -> Result<(), EvaluationError> {
        if dice.throws == 0 {
            Err(EvaluationError::NoDice)
        } else if dice.sides == 0 {
            Err(EvaluationError::NoSides)
        } else if dice.throws > self.max_dice {
            Err(EvaluationError::TooManyDice {
                requested: dice.throws,
                limit: self.max_dice,
            })
        } else {
            Ok(())
        }
    }
}

/// Splits `rolls` into `(kept, dropped)`.
///
/// Selection works on an ascending copy of the rolls, so both halves come back
/// sorted. Without a rule, or with a count of 0 or at least `rolls.len()`,
/// every roll is kept in its original order.
pub fn apply_roll_modifier(rolls: &[u32], modifier: RollModifier, count: u32) -> (Vec<u32>, Vec<u32>) {
    let count = count as usize;
    if modifier == RollModifier::None || count == 0 || count >= rolls.len() {
        return (rolls.to_vec(), Vec::new());
    }
    let mut sorted = rolls.to_vec();
    sorted.sort_unstable();
    let len = sorted.len();
    match modifier {
        RollModifier::DropLowest => {
            let high = sorted.split_off(count);
            (high, sorted)
        }
        RollModifier::KeepLowest => {
            let high = sorted.split_off(count);
            (sorted, high)
        }
        RollModifier::DropHighest => {
            let high = sorted.split_off(len - count);
            (sorted, high)
        }
        RollModifier::KeepHighest => {
            let high = sorted.split_off(len - count);
            (high, sorted)
        }
        RollModifier::None => (rolls.to_vec(), Vec::new()),
    }
}

fn sum_rolls(start: i64, rolls: &[u32]) -> Result<i64, EvaluationError> {
    rolls
        .iter()
        .try_fold(start, |acc, roll| acc.checked_add(i64::from(*roll)))
        .ok_or(EvaluationError::Overflow)
}

#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RollResult {
    pub expression: String,
    pub num_dice: u32,
    pub sides: u32,
    /// In the order they were drawn.
    pub rolls: Vec<u32>,
    pub kept: Vec<u32>,
    pub dropped: Vec<u32>,
    pub modifier: i64,
    pub total: i64,
}

fn write_list(f: &mut fmt::Formatter<'_>, values: &[u32]) -> fmt::Result {
    write!(f, "[")?;
    let mut iter = values.iter();
    if let Some(first) = iter.next() {
        write!(f, "{}", first)?;
        for value in iter {
            write!(f, " {}", value)?;
        }
    }
    write!(f, "]")
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rolled: ")?;
        write_list(f, &self.rolls)?;
        if !self.dropped.is_empty() {
            write!(f, " (dropped: ")?;
            write_list(f, &self.dropped)?;
            write!(f, ")")?;
        }
        if self.modifier != 0 {
            write!(f, " {:+}", self.modifier)?;
        }
        write!(f, " = {}", self.total)
    }
}

/// Outcome of one term of a chain. `value` is the signed contribution.
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TermRoll {
    pub term: Term,
    pub rolls: Vec<u32>,
    pub value: i64,
}

impl fmt::Display for TermRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.term)?;
        match self.term.value {
            TermValue::Flat(value) => write!(f, " {}", value),
            TermValue::Dice(_) => {
                for roll in self.rolls.iter() {
                    write!(f, " {}", roll)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChainRoll {
    pub terms: Vec<TermRoll>,
    pub total: i64,
}

#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExpressionRoll {
    Single(RollResult),
    Chain(ChainRoll),
}

impl ExpressionRoll {
    pub fn total(&self) -> i64 {
        match self {
            ExpressionRoll::Single(result) => result.total,
            ExpressionRoll::Chain(chain) => chain.total,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgeRoll {
    pub dice: [u32; AGE_DICE_COUNT],
    pub modifier: i64,
    pub total: i64,
    /// Set when two of the dice match; holds the drama die's face.
    pub stunt_points: Option<u32>,
    pub drama: bool,
}

pub trait DiceEvaluate {
    type Output;

    fn evaluate<S: RandomSource>(&self, roller: &mut Roller<S>) -> Result<Self::Output, EvaluationError>;
}

impl DiceEvaluate for Dice {
    type Output = Vec<u32>;

    fn evaluate<S: RandomSource>(&self, roller: &mut Roller<S>) -> Result<Vec<u32>, EvaluationError> {
        roller.check(self)?;
        let sides = self.sides;
        let source = &mut roller.source;
        let rolls: Vec<u32> = (0..self.throws).map(|_| source.next(sides)).collect();

        #[cfg(feature = "logging")]
        {
            debug!("Dice roll result for {} is {:?}", &self, &rolls);
        }

        Ok(rolls)
    }
}

impl DiceEvaluate for DiceSpec {
    type Output = RollResult;

    fn evaluate<S: RandomSource>(&self, roller: &mut Roller<S>) -> Result<RollResult, EvaluationError> {
        let rolls = self.dice.evaluate(roller)?;
        let (kept, dropped) = apply_roll_modifier(&rolls, self.roll_modifier, self.drop_keep);
        let total = sum_rolls(self.modifier, &kept)?;
        let result = RollResult {
            expression: self.to_string(),
            num_dice: self.dice.throws,
            sides: self.dice.sides,
            rolls,
            kept,
            dropped,
            modifier: self.modifier,
            total,
        };

        #[cfg(feature = "logging")]
        {
            debug!("rolled {:?} for dice spec {}", &result, &self)
        }

        Ok(result)
    }
}

impl DiceEvaluate for Term {
    type Output = TermRoll;

    fn evaluate<S: RandomSource>(&self, roller: &mut Roller<S>) -> Result<TermRoll, EvaluationError> {
        let (rolls, magnitude) = match self.value {
            TermValue::Flat(value) => (Vec::new(), i64::from(value)),
            TermValue::Dice(dice) => {
                let rolls = dice.evaluate(roller)?;
                let sum = sum_rolls(0, &rolls)?;
                (rolls, sum)
            }
        };
        Ok(TermRoll {
            term: *self,
            rolls,
            value: self.operation.apply(magnitude),
        })
    }
}

impl DiceEvaluate for [Term] {
    type Output = ChainRoll;

    fn evaluate<S: RandomSource>(&self, roller: &mut Roller<S>) -> Result<ChainRoll, EvaluationError> {
        // nothing is drawn unless every group is rollable
        for term in self.iter() {
            if let TermValue::Dice(dice) = &term.value {
                roller.check(dice)?;
            }
        }
        let mut terms = Vec::with_capacity(self.len());
        let mut total: i64 = 0;
        for term in self.iter() {
            let rolled = term.evaluate(roller)?;
            total = total
                .checked_add(rolled.value)
                .ok_or(EvaluationError::Overflow)?;
            terms.push(rolled);
        }

        #[cfg(feature = "logging")]
        {
            debug!("got total {} for {} terms", total, self.len())
        }

        Ok(ChainRoll { terms, total })
    }
}

impl DiceEvaluate for Expression {
    type Output = ExpressionRoll;

    fn evaluate<S: RandomSource>(&self, roller: &mut Roller<S>) -> Result<ExpressionRoll, EvaluationError> {
        match self {
            Expression::Single(spec) => spec.evaluate(roller).map(ExpressionRoll::Single),
            Expression::Chain(terms) => terms.as_slice().evaluate(roller).map(ExpressionRoll::Chain),
        }
    }
}

/// Rolls a chain and returns only its total.
pub fn evaluate_terms<S: RandomSource>(terms: &[Term], roller: &mut Roller<S>) -> Result<i64, EvaluationError> {
    terms.evaluate(roller).map(|chain| chain.total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn scripted(values: &[u32]) -> Roller<ScriptedSource> {
        Roller::new(ScriptedSource::new(values.to_vec()))
    }

    fn sorted(values: &[u32]) -> Vec<u32> {
        let mut values = values.to_vec();
        values.sort_unstable();
        values
    }

    #[test]
    fn test_rolls_stay_in_bounds() {
        let mut roller = Roller::new(Xoshiro256PlusPlus::seed_from_u64(42));
        for sides in 1..=20 {
            let rolls = roller.roll(&Dice::new(100, sides)).unwrap();
            assert_eq!(rolls.len(), 100);
            assert!(rolls.iter().all(|roll| *roll >= 1 && *roll <= sides));
        }
    }

    #[test]
    fn test_same_seed_same_rolls() {
        let mut first = Roller::new(Xoshiro256PlusPlus::seed_from_u64(7));
        let mut second = Roller::new(Xoshiro256PlusPlus::seed_from_u64(7));
        let spec = DiceSpec::new(10, 20);
        assert_eq!(first.roll(&spec), second.roll(&spec));
    }

    #[test]
    fn test_apply_roll_modifier() {
        let rolls = [3, 5, 2, 6];
        let (kept, dropped) = apply_roll_modifier(&rolls, RollModifier::DropLowest, 1);
        assert_eq!(sorted(&kept), vec![3, 5, 6]);
        assert_eq!(dropped, vec![2]);

        let (kept, dropped) = apply_roll_modifier(&rolls, RollModifier::DropHighest, 1);
        assert_eq!(sorted(&kept), vec![2, 3, 5]);
        assert_eq!(dropped, vec![6]);

        let (kept, dropped) = apply_roll_modifier(&rolls, RollModifier::KeepHighest, 1);
        assert_eq!(kept, vec![6]);
        assert_eq!(sorted(&dropped), vec![2, 3, 5]);

        let (kept, dropped) = apply_roll_modifier(&rolls, RollModifier::KeepLowest, 1);
        assert_eq!(kept, vec![2]);
        assert_eq!(sorted(&dropped), vec![3, 5, 6]);

        let (kept, dropped) = apply_roll_modifier(&rolls, RollModifier::None, 0);
        assert_eq!(kept, vec![3, 5, 2, 6]);
        assert!(dropped.is_empty());
    }

    #[test]
    fn test_apply_roll_modifier_keeps_everything_when_count_out_of_range() {
        let rolls = [4, 1, 3];
        for modifier in [
            RollModifier::DropLowest,
            RollModifier::DropHighest,
            RollModifier::KeepHighest,
            RollModifier::KeepLowest,
        ]
        .iter()
        {
            for count in [0, 3, 4].iter() {
                let (kept, dropped) = apply_roll_modifier(&rolls, *modifier, *count);
                assert_eq!(kept, vec![4, 1, 3]);
                assert!(dropped.is_empty());
            }
        }
    }

    #[test]
    fn test_apply_roll_modifier_ties() {
        let (kept, dropped) = apply_roll_modifier(&[2, 5, 2, 4], RollModifier::DropLowest, 1);
        assert_eq!(kept, vec![2, 4, 5]);
        assert_eq!(dropped, vec![2]);
    }

    #[test]
    fn test_roll_spec() {
        let mut roller = scripted(&[3, 5, 2, 6]);
        let result = roller
            .roll(&DiceSpec::ability_score().with_modifier(2))
            .unwrap();
        assert_eq!(result.rolls, vec![3, 5, 2, 6]);
        assert_eq!(result.dropped, vec![2]);
        assert_eq!(result.total, 16);
        assert_eq!(result.expression, "4d6dl1+2");
        assert_eq!(result.to_string(), "Rolled: [3 5 2 6] (dropped: [2]) +2 = 16");
    }

    #[test]
    fn test_roll_spec_without_rule() {
        let mut roller = scripted(&[17]);
        let result = roller.roll(&DiceSpec::new(1, 20).with_modifier(-3)).unwrap();
        assert_eq!(result.kept, vec![17]);
        assert!(result.dropped.is_empty());
        assert_eq!(result.total, 14);
        assert_eq!(result.to_string(), "Rolled: [17] -3 = 14");
    }

    #[test]
    fn test_invalid_dice() {
        let mut roller = scripted(&[1]);
        assert_eq!(
            roller.roll(&DiceSpec::new(0, 20)),
            Err(EvaluationError::NoDice)
        );
        assert_eq!(
            roller.roll(&DiceSpec::new(1, 0)),
            Err(EvaluationError::NoSides)
        );
        let mut limited = scripted(&[1]).with_max_dice(10);
        assert_eq!(
            limited.roll(&DiceSpec::new(11, 6)),
            Err(EvaluationError::TooManyDice {
                requested: 11,
                limit: 10
            })
        );
    }

    #[test]
    fn test_chain_checks_before_drawing() {
        let mut roller = scripted(&[6, 5, 4]).with_max_dice(5);
        let terms = vec![
            Term::dice(Operation::Add, 1, 6),
            Term::dice(Operation::Add, 6, 6),
        ];
        assert!(roller.roll(terms.as_slice()).is_err());
        // the first face is still unused
        assert_eq!(roller.roll(&Dice::new(1, 6)), Ok(vec![6]));
    }

    #[test]
    fn test_roll_chain() {
        let mut roller = scripted(&[1, 2, 3, 4, 5]);
        let terms = vec![
            Term::dice(Operation::Add, 3, 6),
            Term::dice(Operation::Add, 2, 8),
            Term::flat(Operation::Sub, 5),
        ];
        let chain = roller.roll(terms.as_slice()).unwrap();
        assert_eq!(chain.total, 1 + 2 + 3 + 4 + 5 - 5);
        assert_eq!(chain.terms[0].rolls, vec![1, 2, 3]);
        assert_eq!(chain.terms[1].value, 9);
        assert_eq!(chain.terms[2].value, -5);
        assert_eq!(chain.terms[0].to_string(), "+3d6: 1 2 3");
        assert_eq!(chain.terms[2].to_string(), "-5: 5");
    }

    #[test]
    fn test_evaluate_terms_subtracts_dice() {
        let mut roller = scripted(&[3, 4]);
        let terms = vec![Term::dice(Operation::Sub, 2, 4), Term::flat(Operation::Add, 10)];
        assert_eq!(evaluate_terms(&terms, &mut roller), Ok(3));
    }

    #[test]
    fn test_roll_expression() {
        let mut roller = scripted(&[4, 2]);
        let single = roller
            .roll(&Expression::Single(DiceSpec::advantage(1)))
            .unwrap();
        assert_eq!(single.total(), 5);
        let chain = roller
            .roll(&Expression::Chain(vec![Term::flat(Operation::Add, 7)]))
            .unwrap();
        assert_eq!(chain.total(), 7);
    }

    #[test]
    fn test_advantage() {
        let mut roller = Roller::new(Xoshiro256PlusPlus::seed_from_u64(1));
        for _ in 0..50 {
            let result = roller.advantage(5).unwrap();
            assert_eq!(result.rolls.len(), 2);
            assert_eq!(result.kept.len(), 1);
            assert_eq!(result.dropped.len(), 1);
            assert!(result.kept[0] >= result.dropped[0]);
            assert_eq!(result.total, i64::from(result.kept[0]) + 5);
        }
    }

    #[test]
    fn test_disadvantage() {
        let mut roller = Roller::new(Xoshiro256PlusPlus::seed_from_u64(2));
        for _ in 0..50 {
            let result = roller.disadvantage(5).unwrap();
            assert_eq!(result.rolls.len(), 2);
            assert_eq!(result.kept.len(), 1);
            assert_eq!(result.dropped.len(), 1);
            assert!(result.kept[0] <= result.dropped[0]);
        }
    }

    #[test]
    fn test_ability_scores() {
        let mut roller = Roller::new(Xoshiro256PlusPlus::seed_from_u64(3));
        let scores = roller.ability_scores().unwrap();
        assert_eq!(scores.len(), ABILITY_SCORE_COUNT);
        for score in scores.iter() {
            assert_eq!(score.rolls.len(), 4);
            assert_eq!(score.kept.len(), 3);
            assert_eq!(score.dropped.len(), 1);
            assert!(score.total >= 3 && score.total <= 18);
            assert_eq!(score.total, score.kept.iter().map(|v| i64::from(*v)).sum::<i64>());
        }
    }

    #[test]
    fn test_age() {
        let mut roller = scripted(&[4, 4, 6]);
        let age = roller.age(2).unwrap();
        assert_eq!(age.dice, [4, 4, 6]);
        assert_eq!(age.stunt_points, Some(6));
        assert!(age.drama);
        assert_eq!(age.total, 16);

        let mut roller = scripted(&[1, 2, 3]);
        let age = roller.age(-1).unwrap();
        assert_eq!(age.stunt_points, None);
        assert!(!age.drama);
        assert_eq!(age.total, 5);
    }

    #[test]
    fn test_scripted_source_clamps_and_cycles() {
        let mut source = ScriptedSource::new(vec![9, 0]);
        assert_eq!(source.next(6), 6);
        assert_eq!(source.next(6), 1);
        assert_eq!(source.next(20), 9);
        assert_eq!(ScriptedSource::new(Vec::new()).next(6), 1);
    }

    fn any_rule() -> impl Strategy<Value = RollModifier> {
        prop_oneof![
            Just(RollModifier::None),
            Just(RollModifier::DropLowest),
            Just(RollModifier::DropHighest),
            Just(RollModifier::KeepHighest),
            Just(RollModifier::KeepLowest),
        ]
    }

    proptest! {
        #[test]
        fn kept_and_dropped_partition_the_rolls(
            rolls in prop::collection::vec(1u32..=20, 1..12),
            rule in any_rule(),
            count in 0u32..14,
        ) {
            let (kept, dropped) = apply_roll_modifier(&rolls, rule, count);
            let mut union = [kept.clone(), dropped.clone()].concat();
            union.sort_unstable();
            prop_assert_eq!(union, sorted(&rolls));
            if rule == RollModifier::None || count == 0 || count as usize >= rolls.len() {
                prop_assert!(dropped.is_empty());
                prop_assert_eq!(kept, rolls);
            }
        }

        #[test]
        fn total_is_kept_plus_modifier(
            seed in any::<u64>(),
            throws in 1u32..10,
            sides in 1u32..30,
            rule in any_rule(),
            count in 0u32..10,
            modifier in -50i64..50,
        ) {
            let count = count.min(throws);
            let spec = DiceSpec::new(throws, sides)
                .with_roll_modifier(rule, count)
                .with_modifier(modifier);
            let mut roller = Roller::new(Xoshiro256PlusPlus::seed_from_u64(seed));
            let result = roller.roll(&spec).unwrap();
            let kept: i64 = result.kept.iter().map(|v| i64::from(*v)).sum();
            prop_assert_eq!(kept + modifier, result.total);
            prop_assert_eq!(result.kept.len() as u32, spec.kept_count());
            prop_assert_eq!(result.rolls.len() as u32, throws);
        }
    }
}
