//! Synthesized demo roster.
//!
//! Four archetypes (declining, struggling, moderate, thriving) produce a
//! realistic spread of risk levels. All randomness comes from a seedable RNG,
//! so a given seed and "now" always yield the same roster.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::model::{Assignment, Student};

/// Topics of the demo algebra course.
pub const MATH_TOPICS: [&str; 8] = [
    "linear_equations",
    "quadratic_equations",
    "radicals",
    "exponents",
    "polynomials",
    "factoring",
    "systems_of_equations",
    "inequalities",
];

pub const DEFAULT_ROSTER_SIZE: usize = 30;

const FIRST_NAMES: [&str; 30] = [
    "Alice", "Bob", "Carlos", "Diana", "Emma", "Frank", "Grace", "Henry", "Iris", "James", "Kate",
    "Leo", "Maria", "Noah", "Olivia", "Peter", "Quinn", "Rosa", "Sam", "Tina", "Uma", "Victor",
    "Wendy", "Xavier", "Yuki", "Zara", "Amir", "Bella", "Chen", "Dev",
];

const LAST_NAMES: [&str; 30] = [
    "Anderson", "Brown", "Chen", "Davis", "Evans", "Foster", "Garcia", "Harris", "Ibrahim",
    "Johnson", "Kumar", "Lee", "Martinez", "Nguyen", "O'Brien", "Patel", "Quinn", "Rodriguez",
    "Smith", "Thompson", "Underwood", "Vargas", "Williams", "Xu", "Yang", "Zhang", "Ahmed",
    "Bennett", "Cohen", "Diaz",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Archetype {
    Declining,
    Struggling,
    Moderate,
    Thriving,
}

impl Archetype {
    /// Share of a 30-student roster (6/6/12/6).
    const MIX: [(Archetype, usize); 4] = [
        (Archetype::Declining, 6),
        (Archetype::Struggling, 6),
        (Archetype::Moderate, 12),
        (Archetype::Thriving, 6),
    ];

    fn inactive_days(self, rng: &mut StdRng) -> i64 {
        match self {
            Archetype::Declining => rng.gen_range(3..=7),
            Archetype::Struggling => rng.gen_range(0..=4),
            Archetype::Moderate => rng.gen_range(0..=3),
            Archetype::Thriving => rng.gen_range(0..=2),
        }
    }
}

/// Generate `count` demo students scored as of `now`.
pub fn generate_demo_roster(count: usize, seed: u64, now: DateTime<Utc>) -> Vec<Student> {
    let mut rng = StdRng::seed_from_u64(seed);
    let total_weight: usize = Archetype::MIX.iter().map(|(_, w)| w).sum();

    let mut plan = Vec::with_capacity(count);
    for (archetype, weight) in Archetype::MIX {
        let n = count * weight / total_weight;
        plan.extend(std::iter::repeat(archetype).take(n));
    }
    // Rounding leftovers become moderate students.
    while plan.len() < count {
        plan.push(Archetype::Moderate);
    }

    let mut students: Vec<Student> = plan
        .into_iter()
        .enumerate()
        .map(|(i, archetype)| {
            let number = i + 1;
            let name = student_name(number);
            let email = format!("{}@university.edu", name.to_lowercase().replace(' ', "."));
            let assignments = assignments_for(archetype, &mut rng, now);
            let last_active = now - Duration::days(archetype.inactive_days(&mut rng));
            Student::new(format!("student-{number:03}"), name, email, last_active, assignments, now)
        })
        .collect();

    students.shuffle(&mut rng);
    tracing::debug!(count = students.len(), seed, "generated demo roster");
    students
}

/// Deterministic "First Last" name for a 1-based student number.
pub fn student_name(number: usize) -> String {
    let idx = number.saturating_sub(1);
    format!(
        "{} {}",
        FIRST_NAMES[idx % FIRST_NAMES.len()],
        LAST_NAMES[idx % LAST_NAMES.len()]
    )
}

fn assignments_for(archetype: Archetype, rng: &mut StdRng, now: DateTime<Utc>) -> Vec<Assignment> {
    let base_date = now - Duration::days(60);
    let scores: [f64; 5] = match archetype {
        Archetype::Declining => [85.0, 78.0, 72.0, 65.0, 58.0],
        Archetype::Struggling => [65.0, 58.0, 52.0, 55.0, 48.0],
        Archetype::Moderate => [75.0, 72.0, 68.0, 70.0, 73.0],
        Archetype::Thriving => [88.0, 90.0, 92.0, 89.0, 94.0],
    };

    scores
        .iter()
        .enumerate()
        .map(|(i, &score)| {
            let (attempts, minutes, topics) = match archetype {
                Archetype::Declining => {
                    let topics: &[&str] = match i {
                        0 => &["linear_equations"],
                        1 => &["quadratic_equations"],
                        2 => &["radicals", "exponents"],
                        3 => &["radicals", "polynomials"],
                        _ => &["radicals", "factoring"],
                    };
                    (
                        (i as u32 + 1).min(4),
                        rng.gen_range(45..=90),
                        topics.iter().map(|t| t.to_string()).collect(),
                    )
                }
                Archetype::Struggling => (
                    [3, 4, 5, 4, 5][i],
                    rng.gen_range(90..=150),
                    random_topics(rng),
                ),
                Archetype::Moderate => (rng.gen_range(1..=3), rng.gen_range(50..=80), random_topics(rng)),
                Archetype::Thriving => (1, rng.gen_range(30..=60), random_topics(rng)),
            };
            Assignment {
                id: format!("assignment-{}", i + 1),
                name: format!("Assignment {}", i + 1),
                score,
                attempts,
                time_spent_minutes: minutes,
                topics,
                submitted_at: base_date + Duration::days(i as i64 * 12),
            }
        })
        .collect()
}

fn random_topics(rng: &mut StdRng) -> Vec<String> {
    let k = rng.gen_range(1..=2);
    MATH_TOPICS
        .choose_multiple(rng, k)
        .map(|t| t.to_string())
        .collect()
}
