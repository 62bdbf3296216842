use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use drusdenx_core::automaton::{Automaton, FuzzyAutomaton};

fn word_list(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("term{i:06}")).collect()
}

fn bench_union_determinize_minimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("automaton_union_determinize_minimize");

    for &count in &[10usize, 100, 1000] {
        let words = word_list(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &words, |b, words| {
            b.iter(|| {
                let parts: Vec<Automaton> = words.iter().map(|w| Automaton::singleton(w.clone())).collect();
                let mut unioned = Automaton::union(black_box(&parts));
                unioned.determinize();
                unioned.minimize();
                black_box(unioned.num_states());
            });
        });
    }

    group.finish();
}

fn bench_intersection(c: &mut Criterion) {
    let mut group = c.benchmark_group("automaton_intersection");

    let mut a = Automaton::char_range('a', 'z');
    a.determinize();
    let mut b = Automaton::char_range('m', 'q');
    b.determinize();

    group.bench_function("char_range_intersection", |bencher| {
        bencher.iter(|| {
            let result = Automaton::intersection(black_box(&a), black_box(&b));
            black_box(result.num_states());
        });
    });

    group.finish();
}

fn bench_fuzzy_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("automaton_fuzzy_matching");

    let candidates = word_list(1000);

    for &max_edit_distance in &[1u8, 2] {
        group.bench_with_input(
            BenchmarkId::from_parameter(max_edit_distance),
            &max_edit_distance,
            |b, &max_edit_distance| {
                b.iter(|| {
                    let mut fuzzy = FuzzyAutomaton::new("term000500", max_edit_distance);
                    fuzzy.build().unwrap();
                    for candidate in &candidates {
                        black_box(fuzzy.matches(black_box(candidate)).unwrap());
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_union_determinize_minimize, bench_intersection, bench_fuzzy_matching);
criterion_main!(benches);
