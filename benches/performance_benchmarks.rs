use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use moveability::feedback::SilentFeedback;
use moveability::{
    AngleEstimator, Catalog, ExerciseSession, MotionSample, RepDetector, SimulatedSensor,
    StreakState, StreakTracker,
};

/// Performance benchmarks for the rep detection pipeline and streak rules
///
/// Sample counts correspond to sessions from ~10 seconds to ~3 hours at
/// the 100 ms sensor interval.

fn create_session_samples(reps: u32) -> Vec<MotionSample> {
    SimulatedSensor::new(reps).generate(std::time::Duration::from_millis(100))
}

fn bench_angle_estimation(c: &mut Criterion) {
    let samples = create_session_samples(100);

    let mut group = c.benchmark_group("Angle Estimation");
    group.throughput(Throughput::Elements(samples.len() as u64));
    group.bench_function("estimate", |b| {
        b.iter(|| {
            for sample in &samples {
                black_box(AngleEstimator::estimate(sample));
            }
        });
    });
    group.finish();
}

fn bench_rep_detection(c: &mut Criterion) {
    let detector = RepDetector::new();

    let mut group = c.benchmark_group("Rep Detection");

    for &reps in &[4, 40, 400, 4000] {
        let angles: Vec<f64> = create_session_samples(reps)
            .iter()
            .map(AngleEstimator::estimate)
            .collect();

        group.throughput(Throughput::Elements(angles.len() as u64));
        group.bench_with_input(BenchmarkId::new("count_reps", reps), &angles, |b, angles| {
            b.iter(|| detector.count_reps(angles.iter().copied()));
        });
    }

    group.finish();
}

fn bench_session_pipeline(c: &mut Criterion) {
    let exercise = Catalog::builtin().exercises()[0].clone();

    let mut group = c.benchmark_group("Session Pipeline");

    for &reps in &[40, 400] {
        let samples = create_session_samples(reps);

        group.throughput(Throughput::Elements(samples.len() as u64));
        group.bench_with_input(BenchmarkId::new("handle_sample", reps), &samples, |b, samples| {
            b.iter(|| {
                let mut session =
                    ExerciseSession::new(exercise.clone(), RepDetector::new(), SilentFeedback);
                for sample in samples {
                    session.handle_sample(*sample);
                }
                black_box(session.summary())
            });
        });
    }

    group.finish();
}

fn bench_streak_year(c: &mut Criterion) {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let days: Vec<NaiveDate> = (0..365)
        .filter(|d| d % 9 != 0)
        .map(|d| start + Duration::days(d))
        .collect();

    c.bench_function("record_activity_year", |b| {
        b.iter(|| {
            days.iter().fold(StreakState::default(), |state, day| {
                StreakTracker::record_activity(state, *day)
            })
        });
    });
}

criterion_group!(
    benches,
    bench_angle_estimation,
    bench_rep_detection,
    bench_session_pipeline,
    bench_streak_year
);
criterion_main!(benches);
