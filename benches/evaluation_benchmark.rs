use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use octofhir_expr::parser::Tokenizer;
use octofhir_expr::registry;
use octofhir_expr::{Context, Value, path};
use serde_json::json;

const EXPRESSIONS: &[&str] = &[
    "10 > 0",
    "foo.bar > 0",
    "(requests_made * requests_succeeded / 100) >= 90",
    r#"http_response_body == "service is ok""#,
    r#"strlen(http_response_body) > 3 && foo.bar != nil ? "long" : "short""#,
];

fn parameter() -> Value {
    Value::from(json!({
        "foo": {"bar": -1.0},
        "requests_made": 100,
        "requests_succeeded": 80,
        "http_response_body": "service is ok"
    }))
}

fn benchmark_tokenizer(c: &mut Criterion) {
    let language = registry::full();
    let symbols = language.operator_symbols();

    for (i, expression) in EXPRESSIONS.iter().enumerate() {
        c.bench_function(&format!("expr_{i}_tokenizer"), |b| {
            b.iter(|| {
                let mut tokenizer = Tokenizer::new(black_box(expression), symbols);
                black_box(tokenizer.tokenize_all())
            })
        });
    }
}

fn benchmark_compile(c: &mut Criterion) {
    let language = registry::full();

    for (i, expression) in EXPRESSIONS.iter().enumerate() {
        c.bench_function(&format!("expr_{i}_compile"), |b| {
            b.iter(|| black_box(language.compile(black_box(expression))))
        });
    }
}

fn benchmark_evaluate(c: &mut Criterion) {
    let language = registry::full();
    let context = Context::background();
    let parameter = parameter();

    for (i, expression) in EXPRESSIONS.iter().enumerate() {
        let Ok(evaluable) = language.compile(expression) else {
            continue;
        };
        c.bench_function(&format!("expr_{i}_evaluate"), |b| {
            b.iter(|| black_box(evaluable.evaluate(&context, black_box(&parameter))))
        });
    }
}

fn benchmark_path(c: &mut Criterion) {
    let language = path::language();
    let context = Context::background();
    let parameter = Value::from(json!({
        "items": (0..100).map(|i| json!({"id": i, "price": i % 17})).collect::<Vec<_>>()
    }));
    let Ok(evaluable) = language.compile("$.items[?(@.price < 5)].id") else {
        return;
    };

    c.bench_function("path_filter_100", |b| {
        b.iter(|| black_box(evaluable.evaluate(&context, black_box(&parameter))))
    });
}

criterion_group!(
    benches,
    benchmark_tokenizer,
    benchmark_compile,
    benchmark_evaluate,
    benchmark_path
);
criterion_main!(benches);
