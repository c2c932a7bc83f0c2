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

//! Dice notation for tabletop games: parsing `3d6+2d8-5` and `4d6dl1+2`,
//! rolling them against an injected random source and applying
//! drop/keep rules.

pub mod dice_types;
pub mod error;
pub mod limits;

#[cfg(feature = "parser")]
pub mod parser;

#[cfg(feature = "roll")]
pub mod dice_roll;

#[cfg(feature = "roll")]
pub mod rng;

pub use dice_types::*;
pub use error::{CountProblem, Error, EvaluationError, ParseError};

/// Parses `expression` and rolls it in one go.
#[cfg(all(feature = "parser", feature = "roll"))]
pub fn roll_expression<S: dice_roll::RandomSource>(
    expression: &str,
    roller: &mut dice_roll::Roller<S>,
) -> Result<dice_roll::ExpressionRoll, Error> {
    let parsed = parser::parse_expression(expression)?;
    Ok(roller.roll(&parsed)?)
}
