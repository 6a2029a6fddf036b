//! Offline quiz content used when live generation is unavailable.

use crate::model::{OptionLabel, QuizQuestion};

/// Topic whose pool serves any topic without one of its own.
pub const DEFAULT_TOPIC: &str = "linear_equations";

struct CannedQuestion {
    question: &'static str,
    options: [&'static str; 4],
    correct: OptionLabel,
    explanation: &'static str,
}

impl CannedQuestion {
    fn to_question(&self, topic: &str) -> QuizQuestion {
        QuizQuestion::new(
            self.question,
            self.options.map(str::to_string),
            self.correct,
            self.explanation,
            topic,
        )
    }
}

const LINEAR_EQUATIONS: &[CannedQuestion] = &[
    CannedQuestion {
        question: "Solve for x: 2x + 5 = 13",
        options: ["x = 3", "x = 4", "x = 5", "x = 6"],
        correct: OptionLabel::B,
        explanation: "Subtract 5 from both sides: 2x = 8. Then divide by 2: x = 4.",
    },
    CannedQuestion {
        question: "What is the solution to: 3x - 7 = 14?",
        options: ["x = 5", "x = 6", "x = 7", "x = 8"],
        correct: OptionLabel::C,
        explanation: "Add 7 to both sides: 3x = 21. Then divide by 3: x = 7.",
    },
];

const QUADRATIC_EQUATIONS: &[CannedQuestion] = &[CannedQuestion {
    question: "What are the solutions to x² - 5x + 6 = 0?",
    options: ["x = 1, 6", "x = 2, 3", "x = -2, -3", "x = 1, 5"],
    correct: OptionLabel::B,
    explanation: "Factor to (x - 2)(x - 3) = 0. Solutions are x = 2 and x = 3.",
}];

const POLYNOMIALS: &[CannedQuestion] = &[CannedQuestion {
    question: "Simplify: (2x + 3)(x - 4)",
    options: ["2x² - 5x - 12", "2x² - 8x - 12", "2x² + 5x + 12", "2x² + 11x - 12"],
    correct: OptionLabel::A,
    explanation: "Use FOIL: 2x² - 8x + 3x - 12 = 2x² - 5x - 12.",
}];

const FACTORING: &[CannedQuestion] = &[CannedQuestion {
    question: "Factor: x² + 7x + 12",
    options: ["(x + 3)(x + 4)", "(x + 2)(x + 6)", "(x + 1)(x + 12)", "(x - 3)(x - 4)"],
    correct: OptionLabel::A,
    explanation: "Find two numbers that multiply to 12 and add to 7: 3 and 4. So (x + 3)(x + 4).",
}];

const RADICALS: &[CannedQuestion] = &[
    CannedQuestion {
        question: "Simplify: √50",
        options: ["5√2", "2√5", "25√2", "10√5"],
        correct: OptionLabel::A,
        explanation: "50 = 25 · 2, and √25 = 5, so √50 = 5√2.",
    },
    CannedQuestion {
        question: "Solve for x: √(x + 3) = 4",
        options: ["x = 1", "x = 7", "x = 13", "x = 19"],
        correct: OptionLabel::C,
        explanation: "Square both sides: x + 3 = 16, so x = 13.",
    },
];

const EXPONENTS: &[CannedQuestion] = &[CannedQuestion {
    question: "Simplify: (x³)² · x⁴",
    options: ["x⁹", "x¹⁰", "x²⁴", "x¹⁴"],
    correct: OptionLabel::B,
    explanation: "Power of a power multiplies exponents: (x³)² = x⁶. Then x⁶ · x⁴ = x¹⁰.",
}];

const SYSTEMS_OF_EQUATIONS: &[CannedQuestion] = &[CannedQuestion {
    question: "Solve the system: x + y = 10 and x - y = 4",
    options: ["x = 6, y = 4", "x = 7, y = 3", "x = 5, y = 5", "x = 8, y = 2"],
    correct: OptionLabel::B,
    explanation: "Add the equations: 2x = 14, so x = 7. Then y = 10 - 7 = 3.",
}];

const INEQUALITIES: &[CannedQuestion] = &[CannedQuestion {
    question: "Solve: -2x + 3 > 9",
    options: ["x > -3", "x < -3", "x > 3", "x < 3"],
    correct: OptionLabel::B,
    explanation: "Subtract 3: -2x > 6. Dividing by a negative flips the inequality: x < -3.",
}];

const POOLS: &[(&str, &[CannedQuestion])] = &[
    ("linear_equations", LINEAR_EQUATIONS),
    ("quadratic_equations", QUADRATIC_EQUATIONS),
    ("polynomials", POLYNOMIALS),
    ("factoring", FACTORING),
    ("radicals", RADICALS),
    ("exponents", EXPONENTS),
    ("systems_of_equations", SYSTEMS_OF_EQUATIONS),
    ("inequalities", INEQUALITIES),
];

/// Deterministic quiz generator backed by a hand-authored question pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackGenerator;

impl FallbackGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Exactly `count` questions for `topic`, cycling through its pool.
    pub fn generate(&self, topic: &str, count: usize) -> Vec<QuizQuestion> {
        tracing::info!(topic, count, "using fallback quiz generator");
        let pool = pool_for(topic);
        (0..count)
            .map(|i| pool[i % pool.len()].to_question(topic))
            .collect()
    }

    /// Number of distinct questions available for `topic`.
    pub fn pool_size(&self, topic: &str) -> usize {
        pool_for(topic).len()
    }

    /// Topics with a dedicated pool.
    pub fn known_topics(&self) -> impl Iterator<Item = &'static str> {
        POOLS.iter().map(|(topic, _)| *topic)
    }
}

fn pool_for(topic: &str) -> &'static [CannedQuestion] {
    POOLS
        .iter()
        .find(|(name, _)| *name == topic)
        .or_else(|| POOLS.iter().find(|(name, _)| *name == DEFAULT_TOPIC))
        .map(|(_, pool)| *pool)
        .unwrap_or(LINEAR_EQUATIONS)
}
