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

//! Two grammars share this module.
//!
//! The chained grammar (`3d6+2d8-5`) splits its input at every sign that does
//! not start the remaining string and resolves each signed segment to a
//! [`Term`]. The single-group grammar (`4d6dl1+2`) accepts exactly one die
//! group with an optional drop/keep suffix and a trailing flat modifier.

use crate::{
    dice_types::{Dice, DiceSpec, Expression, Operation, RollModifier, Term, TermValue},
    error::{CountProblem, ParseError},
};

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_till},
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, map, opt, recognize, verify},
    multi::many0,
    sequence::{pair, preceded, tuple},
    IResult,
};

#[cfg(feature = "logging")]
use log::debug;

fn is_sign(c: char) -> bool {
    c == '+' || c == '-'
}

fn is_bare_sign(input: &str) -> bool {
    input.is_empty() || input == "+" || input == "-"
}

pub fn parse_sign(input: &str) -> IResult<&str, Operation> {
    map(opt(one_of("+-")), |sign| match sign {
        Some('-') => Operation::Sub,
        _ => Operation::Add,
    })(input)
}

/// An optional leading sign followed by everything up to the next sign.
pub fn parse_segment(input: &str) -> IResult<&str, &str> {
    verify(
        recognize(pair(opt(one_of("+-")), take_till(is_sign))),
        |segment: &str| !segment.is_empty(),
    )(input)
}

/// Splits a chained expression into its signed segments. The segments
/// concatenate back to `input`.
pub fn split_terms(input: &str) -> Vec<&str> {
    many0(parse_segment)(input)
        .map(|(_, segments)| segments)
        .unwrap_or_default()
}

fn parse_count(input: &str) -> Result<u32, CountProblem> {
    if input.is_empty() {
        return Err(CountProblem::Missing);
    }
    let parsed: IResult<&str, (Option<char>, &str)> =
        all_consuming(pair(opt(char('-')), digit1))(input);
    match parsed {
        Ok((_, (Some(_), _))) => Err(CountProblem::Negative),
        Ok((_, (None, digits))) => digits.parse::<u32>().map_err(|_| CountProblem::TooLarge),
        Err(_) => Err(CountProblem::NotANumber),
    }
}

fn at_least_one(count: u32) -> Result<u32, CountProblem> {
    if count == 0 {
        Err(CountProblem::Zero)
    } else {
        Ok(count)
    }
}

/// Resolves one signed segment, such as `-2d4` or `+5`, into a [`Term`].
pub fn resolve_term(segment: &str) -> Result<Term, ParseError> {
    let (rest, operation) =
        parse_sign(segment).map_err(|_| ParseError::MalformedExpression(segment.to_string()))?;
    if rest.is_empty() {
        return Err(ParseError::MalformedExpression(segment.to_string()));
    }
    let parts: Vec<&str> = rest.split('d').collect();
    let value = match parts.as_slice() {
        [flat] => TermValue::Flat(
            parse_count(flat).map_err(|_| ParseError::InvalidFlatModifier(segment.to_string()))?,
        ),
        [throws, sides] => {
            let throws = parse_count(throws)
                .and_then(at_least_one)
                .map_err(|problem| ParseError::InvalidDiceCount {
                    term: segment.to_string(),
                    problem,
                })?;
            let sides = parse_count(sides)
                .and_then(at_least_one)
                .map_err(|problem| ParseError::InvalidSideCount {
                    term: segment.to_string(),
                    problem,
                })?;
            TermValue::Dice(Dice::new(throws, sides))
        }
        _ => return Err(ParseError::MalformedExpression(segment.to_string())),
    };
    Ok(Term { operation, value })
}

/// Parses a chained expression like `3d6+2d8-5`.
pub fn parse_term_chain(input: &str) -> Result<Vec<Term>, ParseError> {
    let normalized = input.trim().to_lowercase();
    if is_bare_sign(&normalized) {
        return Err(ParseError::EmptyExpression);
    }
    let segments = split_terms(&normalized);
    let mut terms = Vec::with_capacity(segments.len());
    for (index, segment) in segments.iter().enumerate() {
        match resolve_term(segment) {
            // "2d-6" splits into "2d" and "-6"
            Err(ParseError::InvalidSideCount {
                problem: CountProblem::Missing,
                ..
            }) if segments
                .get(index + 1)
                .map_or(false, |next| next.starts_with('-') && next.len() > 1) =>
            {
                return Err(ParseError::InvalidSideCount {
                    term: format!("{}{}", segment, segments[index + 1]),
                    problem: CountProblem::Negative,
                });
            }
            result => terms.push(result?),
        }
    }

    #[cfg(feature = "logging")]
    {
        debug!("parsed {:?} into terms {:?}", input, &terms);
    }

    Ok(terms)
}

/// Joins command line arguments, so `["3d6", "+2"]` and `["3d6+2"]` are the
/// same expression, and parses the result as a chain.
pub fn parse_terms<S: AsRef<str>>(args: &[S]) -> Result<Vec<Term>, ParseError> {
    let joined: String = args.iter().map(|arg| arg.as_ref()).collect();
    parse_term_chain(&joined)
}

pub fn parse_roll_modifier(input: &str) -> IResult<&str, RollModifier> {
    alt((
        map(tag("dl"), |_| RollModifier::DropLowest),
        map(tag("dh"), |_| RollModifier::DropHighest),
        map(tag("kh"), |_| RollModifier::KeepHighest),
        map(tag("kl"), |_| RollModifier::KeepLowest),
    ))(input)
}

pub fn parse_signed_number(input: &str) -> IResult<&str, &str> {
    recognize(pair(one_of("+-"), digit1))(input)
}

pub type DiceShape<'a> = (
    Option<&'a str>,
    &'a str,
    Option<(RollModifier, Option<&'a str>)>,
    Option<&'a str>,
);

/// `[count] d sides [dl|dh|kh|kl [count]] [+/-modifier]`, nothing else.
pub fn parse_dice_shape(input: &str) -> IResult<&str, DiceShape<'_>> {
    all_consuming(tuple((
        opt(digit1),
        preceded(tag_no_case("d"), digit1),
        opt(pair(parse_roll_modifier, opt(digit1))),
        opt(parse_signed_number),
    )))(input)
}

/// Parses single-group notation such as `d20`, `4d6dl1` or `2d20kh1+5`.
pub fn parse_dice_spec(expression: &str) -> Result<DiceSpec, ParseError> {
    let normalized = expression.trim().to_lowercase();
    if is_bare_sign(&normalized) {
        return Err(ParseError::EmptyExpression);
    }
    let (_, (throws, sides, selection, modifier)) = parse_dice_shape(&normalized)
        .map_err(|_| ParseError::MalformedExpression(normalized.clone()))?;

    let throws = match throws {
        Some(digits) => parse_count(digits).and_then(at_least_one).map_err(|problem| {
            ParseError::InvalidDiceCount {
                term: normalized.clone(),
                problem,
            }
        })?,
        None => 1,
    };
    let sides = parse_count(sides)
        .and_then(at_least_one)
        .map_err(|problem| ParseError::InvalidSideCount {
            term: normalized.clone(),
            problem,
        })?;
    let (roll_modifier, drop_keep) = match selection {
        Some((roll_modifier, Some(count))) => (
            roll_modifier,
            count
                .parse::<u32>()
                .map_err(|_| ParseError::MalformedExpression(normalized.clone()))?,
        ),
        Some((roll_modifier, None)) => (roll_modifier, 1),
        None => (RollModifier::None, 0),
    };
    let modifier = match modifier {
        Some(number) => number
            .parse::<i64>()
            .map_err(|_| ParseError::InvalidFlatModifier(number.to_string()))?,
        None => 0,
    };

    let spec = DiceSpec {
        dice: Dice::new(throws, sides),
        modifier,
        roll_modifier,
        drop_keep,
    };

    #[cfg(feature = "logging")]
    {
        debug!("parsed {:?} into dice spec {}", expression, &spec);
    }

    Ok(spec)
}

/// Tries single-group notation first and falls back to a chain, so both
/// `4d6dl1` and `3d6+2d8-5` are accepted.
pub fn parse_expression(input: &str) -> Result<Expression, ParseError> {
    match parse_dice_spec(input) {
        Ok(spec) => Ok(Expression::Single(spec)),
        Err(ParseError::MalformedExpression(_)) => {
            parse_term_chain(input).map(Expression::Chain)
        }
        Err(e) => Err(e),
    }
}

/// A signed flat modifier given as its own argument: `+2`, `-3`, `7`.
/// An empty string is no modifier at all.
pub fn parse_modifier(input: &str) -> Result<i64, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    let parsed: IResult<&str, (Operation, &str)> = all_consuming(pair(parse_sign, digit1))(trimmed);
    match parsed {
        Ok((_, (operation, digits))) => digits
            .parse::<i64>()
            .map(|value| operation.apply(value))
            .map_err(|_| ParseError::InvalidFlatModifier(trimmed.to_string())),
        Err(_) => Err(ParseError::InvalidFlatModifier(trimmed.to_string())),
    }
}
