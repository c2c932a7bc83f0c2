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

use std::fmt;

/// Why a die or side count was rejected.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CountProblem {
    Missing,
    NotANumber,
    Zero,
    Negative,
    TooLarge,
}

impl fmt::Display for CountProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CountProblem::Missing => "is missing",
            CountProblem::NotANumber => "is not a number",
            CountProblem::Zero => "must be at least 1",
            CountProblem::Negative => "cannot be negative",
            CountProblem::TooLarge => "is too large",
        })
    }
}

#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("empty dice expression")]
    EmptyExpression,

    #[error("invalid number of dice in {term:?}: dice count {problem}")]
    InvalidDiceCount { term: String, problem: CountProblem },

    #[error("invalid number of sides in {term:?}: side count {problem}")]
    InvalidSideCount { term: String, problem: CountProblem },

    #[error("invalid flat modifier: {0:?}")]
    InvalidFlatModifier(String),

    #[error("invalid dice expression: {0:?}")]
    MalformedExpression(String),
}

#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum EvaluationError {
    #[error("must roll at least 1 die")]
    NoDice,

    #[error("dice must have at least 1 side")]
    NoSides,

    #[error("refusing to roll {requested} dice, the limit is {limit}")]
    TooManyDice { requested: u32, limit: u32 },

    #[error("total does not fit into a 64 bit integer")]
    Overflow,
}

#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}
