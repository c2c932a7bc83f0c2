use crate::dice_types::*;

/// Smallest and largest total an expression can produce.
pub trait DiceLimits {
    fn min(&self) -> i64;
    fn max(&self) -> i64;
}

impl DiceLimits for Dice {
    fn min(&self) -> i64 {
        i64::from(self.throws)
    }

    fn max(&self) -> i64 {
        i64::from(self.throws) * i64::from(self.sides)
    }
}

impl DiceLimits for DiceSpec {
    fn min(&self) -> i64 {
        i64::from(self.kept_count()).saturating_add(self.modifier)
    }

    fn max(&self) -> i64 {
        (i64::from(self.kept_count()) * i64::from(self.dice.sides)).saturating_add(self.modifier)
    }
}

impl DiceLimits for Term {
    fn min(&self) -> i64 {
        match (self.operation, self.value) {
            (Operation::Add, TermValue::Dice(dice)) => dice.min(),
            (Operation::Sub, TermValue::Dice(dice)) => -dice.max(),
            (operation, TermValue::Flat(value)) => operation.apply(i64::from(value)),
        }
    }

    fn max(&self) -> i64 {
        match (self.operation, self.value) {
            (Operation::Add, TermValue::Dice(dice)) => dice.max(),
            (Operation::Sub, TermValue::Dice(dice)) => -dice.min(),
            (operation, TermValue::Flat(value)) => operation.apply(i64::from(value)),
        }
    }
}

impl DiceLimits for [Term] {
    fn min(&self) -> i64 {
        self.iter().fold(0, |acc, term| acc.saturating_add(term.min()))
    }

    fn max(&self) -> i64 {
        self.iter().fold(0, |acc, term| acc.saturating_add(term.max()))
    }
}

impl DiceLimits for Expression {
    fn min(&self) -> i64 {
        match self {
            Expression::Single(spec) => spec.min(),
            Expression::Chain(terms) => terms.as_slice().min(),
        }
    }

    fn max(&self) -> i64 {
        match self {
            Expression::Single(spec) => spec.max(),
            Expression::Chain(terms) => terms.as_slice().max(),
        }
    }
}
