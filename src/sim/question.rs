//! Arithmetic question generation
//!
//! Each round asks one question per tier flavor and offers the correct
//! answer plus two nearby distractors.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::tier::Tier;

/// Maximum distance of an integer distractor from the answer
pub const DISTRACTOR_SPREAD: i32 = 4;

/// A simplified fraction (denominator is never zero)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fraction {
    pub numerator: u8,
    pub denominator: u8,
}

impl Fraction {
    /// Build a fraction reduced to lowest terms
    pub fn new(numerator: u8, denominator: u8) -> Self {
        let denominator = denominator.max(1);
        let g = gcd(numerator, denominator).max(1);
        Self {
            numerator: numerator / g,
            denominator: denominator / g,
        }
    }

    /// Value in quarters, rounded down. Exact for the halves and quarters
    /// this game produces.
    pub fn quarters(self) -> u32 {
        u32::from(self.numerator) * 4 / u32::from(self.denominator)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

fn gcd(mut a: u8, mut b: u8) -> u8 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// An answer option: plain integer or fraction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Answer {
    Numeric(i32),
    Fraction(Fraction),
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Numeric(n) => write!(f, "{n}"),
            Answer::Fraction(frac) => fmt::Display::fmt(frac, f),
        }
    }
}

/// One round's question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Prompt such as `"7 + 4 = ?"`
    pub text: String,
    pub answer: Answer,
    pub distractors: [Answer; 2],
}

/// Generate a question for the given tier
pub fn generate_question<R: Rng + ?Sized>(tier: Tier, rng: &mut R) -> Question {
    let question = match tier {
        Tier::Bronze => bronze(rng),
        Tier::Silver => silver(rng),
        Tier::Gold => gold(rng),
        Tier::Diamond => diamond(rng),
    };
    log::trace!("{:?} question: {}", tier, question.text);
    question
}

/// Two distinct integers near `answer`, neither equal to it.
///
/// Offsets are drawn from `1..=spread` with a random sign and redrawn until
/// both values are unique. A spread below 1 is raised to 1 so there is
/// always a non-zero offset to draw.
pub fn integer_distractors<R: Rng + ?Sized>(answer: i32, spread: i32, rng: &mut R) -> [i32; 2] {
    let spread = spread.max(1);
    let mut picked = [answer; 2];
    let mut count = 0;
    while count < 2 {
        let offset = rng.random_range(1..=spread);
        let candidate = if rng.random_bool(0.5) {
            answer - offset
        } else {
            answer + offset
        };
        if candidate != answer && !picked[..count].contains(&candidate) {
            picked[count] = candidate;
            count += 1;
        }
    }
    picked
}

fn integer_question<R: Rng + ?Sized>(text: String, answer: i32, rng: &mut R) -> Question {
    let [a, b] = integer_distractors(answer, DISTRACTOR_SPREAD, rng);
    Question {
        text,
        answer: Answer::Numeric(answer),
        distractors: [Answer::Numeric(a), Answer::Numeric(b)],
    }
}

fn bronze<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let a = rng.random_range(1..=9);
    let b = rng.random_range(1..=9);

    // 70% addition, otherwise a subtraction that can't go negative
    if rng.random_bool(0.7) {
        integer_question(format!("{a} + {b} = ?"), a + b, rng)
    } else {
        let (hi, lo) = (a.max(b), a.min(b));
        integer_question(format!("{hi} - {lo} = ?"), hi - lo, rng)
    }
}

fn silver<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let op1 = rng.random_range(0..3);
    let a = rng.random_range(2..=9);
    let b = rng.random_range(2..=9);

    if op1 == 2 {
        return integer_question(format!("{a} × {b} = ?"), a * b, rng);
    }

    let c = rng.random_range(1..=9);
    let (first, op1_sym) = if op1 == 0 { (a + b, '+') } else { (a - b, '-') };
    // Strictly left to right: (a op1 b) op2 c
    let (answer, op2_sym) = if rng.random_bool(0.5) {
        (first + c, '+')
    } else {
        (first - c, '-')
    };
    integer_question(format!("{a} {op1_sym} {b} {op2_sym} {c} = ?"), answer, rng)
}

fn gold<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let a = rng.random_range(1..=10);
    let b = rng.random_range(11..=20);
    integer_question(format!("{a} - {b} = ?"), a - b, rng)
}

fn diamond<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let den: u8 = if rng.random_bool(0.5) { 2 } else { 4 };

    let (num1, num2) = if den == 2 {
        (1, 1)
    } else {
        let n1: u8 = rng.random_range(1..=3);
        let n2: u8 = rng.random_range(1..=3);
        // Keep the sum within one whole
        if n1 + n2 > 4 { (n1, 1) } else { (n1, n2) }
    };

    let answer = Fraction::new(num1 + num2, den);
    Question {
        text: format!("{num1}/{den} + {num2}/{den} = ?"),
        answer: Answer::Fraction(answer),
        distractors: fraction_distractors(answer),
    }
}

/// Fixed distractor table for fraction answers
fn fraction_distractors(answer: Fraction) -> [Answer; 2] {
    let half = Answer::Fraction(Fraction::new(1, 2));
    let quarter = Answer::Fraction(Fraction::new(1, 4));
    let three_quarters = Answer::Fraction(Fraction::new(3, 4));
    let one = Answer::Fraction(Fraction::new(1, 1));

    match answer.quarters() {
        4 => [half, three_quarters],
        2 => [quarter, three_quarters],
        1 => [half, three_quarters],
        _ => [half, one],
    }
}
