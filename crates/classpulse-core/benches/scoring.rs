use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use classpulse_core::analytics::compute_course_analytics;
use classpulse_core::demo::generate_demo_roster;
use classpulse_core::model::Assignment;
use classpulse_core::risk::{calculate_risk_score, struggling_topics};

fn make_history(len: usize) -> Vec<Assignment> {
    let now = Utc::now();
    (0..len)
        .map(|i| Assignment {
            id: format!("assignment-{i}"),
            name: format!("Assignment {i}"),
            score: 95.0 - (i % 40) as f64,
            attempts: (i % 6) as u32 + 1,
            time_spent_minutes: 45 + (i % 100) as u32,
            topics: vec![format!("topic-{}", i % 8), format!("topic-{}", (i + 3) % 8)],
            submitted_at: now - Duration::days((len - i) as i64),
        })
        .collect()
}

fn bench_risk_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("risk_score");
    let now = Utc::now();
    let last_active = now - Duration::days(6);

    for len in [5, 50, 500] {
        let history = make_history(len);
        group.bench_function(format!("assignments={len}"), |b| {
            b.iter(|| calculate_risk_score(black_box(&history), last_active, now))
        });
    }

    group.finish();
}

fn bench_struggling_topics(c: &mut Criterion) {
    let history = make_history(500);
    c.bench_function("struggling_topics/500", |b| {
        b.iter(|| struggling_topics(black_box(&history)))
    });
}

fn bench_course_analytics(c: &mut Criterion) {
    let roster = generate_demo_roster(300, 11, Utc::now());
    c.bench_function("course_analytics/300", |b| {
        b.iter(|| compute_course_analytics(black_box(&roster)))
    });
}

criterion_group!(
    benches,
    bench_risk_score,
    bench_struggling_topics,
    bench_course_analytics
);
criterion_main!(benches);
