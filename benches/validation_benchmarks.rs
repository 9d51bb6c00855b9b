use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use gallery_validation::dom::fixture::{ButtonFixture, DocumentFixture, FieldFixture, FormFixture};
use gallery_validation::dom::{Element, MemoryElement};
use gallery_validation::{RuleSet, Settings, ValidationEngine};

/// Generate `forms` gallery-style forms with `fields` fields each
fn generate_fixture(forms: usize, fields: usize) -> DocumentFixture {
    let forms = (0..forms)
        .map(|f| FormFixture {
            name: format!("form-{}", f),
            classes: vec!["popup__form".to_string()],
            fields: (0..fields)
                .map(|i| FieldFixture {
                    id: format!("field-{}-{}", f, i),
                    name: None,
                    input_type: if i % 3 == 2 { "url" } else { "text" }.to_string(),
                    classes: vec!["popup__input".to_string()],
                    required: true,
                    minlength: Some(2),
                    maxlength: Some(40),
                    pattern: None,
                    placeholder: None,
                    value: String::new(),
                    error_message: (i % 3 == 0).then(String::new),
                    error_element: true,
                })
                .collect(),
            button: Some(ButtonFixture {
                classes: vec!["popup__button".to_string()],
                text: "Сохранить".to_string(),
                disabled: false,
            }),
        })
        .collect();
    DocumentFixture { forms }
}

/// Benchmark wiring documents of increasing size
fn bench_enable_validation(c: &mut Criterion) {
    let settings = Settings::gallery();
    let mut group = c.benchmark_group("enable_validation");

    for &forms in &[1, 10, 100] {
        let fixture = generate_fixture(forms, 5);
        group.throughput(Throughput::Elements(forms as u64));
        group.bench_with_input(BenchmarkId::new("forms", forms), &fixture, |b, fixture| {
            b.iter(|| {
                let document = fixture.build();
                let mut engine = ValidationEngine::new(document);
                let summary = engine.enable_validation(black_box(&settings)).unwrap();
                engine.disable_all();
                black_box(summary)
            })
        });
    }

    group.finish();
}

/// Benchmark one input event, which revalidates the whole form for the button
fn bench_input_event(c: &mut Criterion) {
    let settings = Settings::gallery();
    let mut group = c.benchmark_group("input_event");

    for &fields in &[2, 10, 50] {
        let document = generate_fixture(1, fields).build();
        let mut engine = ValidationEngine::new(document.clone());
        engine.enable_validation(&settings).unwrap();
        let field = document.get_element_by_id("field-0-0").unwrap();

        group.bench_with_input(BenchmarkId::new("fields", fields), &field, |b, field| {
            let mut flip = false;
            b.iter(|| {
                flip = !flip;
                let value = if flip { "Анна-Мария" } else { "R2-D2" };
                field.type_text(black_box(value)).unwrap();
            })
        });
    }

    group.finish();
}

/// Benchmark rule evaluation on its own
fn bench_rule_evaluation(c: &mut Criterion) {
    let document = generate_fixture(1, 3).build();
    let rules = RuleSet::standard();
    let fields: Vec<MemoryElement> = (0..3)
        .filter_map(|i| document.get_element_by_id(&format!("field-0-{}", i)))
        .collect();
    fields[0].set_value("Jacques Cousteau");
    fields[1].set_value("x");
    fields[2].set_value("https://example.com/picture.jpg");

    let mut group = c.benchmark_group("rules");
    for field in &fields {
        group.bench_with_input(BenchmarkId::new("evaluate", field.id()), field, |b, field| {
            b.iter(|| black_box(rules.evaluate(black_box(field))))
        });
    }
    group.finish();
}

criterion_group!(
    validation_benches,
    bench_enable_validation,
    bench_input_event,
    bench_rule_evaluation
);

criterion_main!(validation_benches);
