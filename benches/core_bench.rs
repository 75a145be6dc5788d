//! Benchmarks for receptes core operations.
//!
//! Run with: cargo bench
//!
//! Results include 95% confidence intervals via Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use receptes::chart::render::SvgRenderer;
use receptes::chart::summary::IngredientSummary;
use receptes::core::persist;
use receptes::core::store::RecipeStore;
use receptes::core::types::Recipe;

const PANTRY: [&str; 12] = [
    "Milti", "Piens", "Olas", "Cukurs", "Sāls", "Sviests", "Kartupeļi", "Burkāni", "Sīpoli",
    "Gaļa", "Krējums", "Dilles",
];

fn synthetic_table(n: usize) -> Vec<Recipe> {
    (0..n)
        .map(|i| {
            let ingredients: Vec<&str> = (0..4).map(|k| PANTRY[(i * 3 + k * 5) % PANTRY.len()]).collect();
            Recipe::new(
                format!("Recepte {i:04}"),
                ingredients.join(", "),
                "Samaisa sastāvdaļas un cep uz pannas.",
            )
        })
        .collect()
}

fn bench_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingredient_summary");
    for n in [10, 100, 1000] {
        let table = synthetic_table(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &table, |b, table| {
            b.iter(|| {
                let ranked = IngredientSummary::from_recipes(black_box(table)).ranked();
                black_box(ranked);
            });
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    for n in [10, 100, 1000] {
        let store = RecipeStore::from_table("bench.csv", synthetic_table(n));
        group.bench_with_input(BenchmarkId::from_parameter(n), &store, |b, store| {
            b.iter(|| {
                black_box(store.search(black_box("piens")));
            });
        });
    }
    group.finish();
}

fn bench_csv_roundtrip(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipes.csv");
    let table = synthetic_table(500);

    c.bench_function("csv_save_load_500", |b| {
        b.iter(|| {
            persist::save_table(&path, black_box(&table)).unwrap();
            black_box(persist::load_table(&path).unwrap());
        });
    });
}

fn bench_svg_render(c: &mut Criterion) {
    let ranked = IngredientSummary::from_recipes(&synthetic_table(100)).ranked();
    c.bench_function("svg_render", |b| {
        b.iter(|| {
            black_box(SvgRenderer.to_svg(black_box(&ranked)).unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_summary,
    bench_search,
    bench_csv_roundtrip,
    bench_svg_render
);
criterion_main!(benches);
