use cfgkit::{CodecRegistry, Config, Field};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::BTreeSet;

#[derive(Clone)]
struct Wide {
    numbers: Vec<i64>,
    names:   Vec<String>,
    set:     BTreeSet<i32>,
    ratio:   f64,
    label:   Option<String>,
}

impl Default for Wide {
    fn default() -> Self {
        Self {
            numbers: (0..64).collect(),
            names:   (0..32).map(|i| format!("name_{i}")).collect(),
            set:     (0..64).collect(),
            ratio:   0.75,
            label:   Some("bench".into()),
        }
    }
}

impl Config for Wide {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::new("numbers", |c: &Self| &c.numbers, |c: &mut Self| &mut c.numbers)
                .comment("A long list of numbers"),
            Field::new("names", |c: &Self| &c.names, |c: &mut Self| &mut c.names)
                .section("Names")
                .example("a, b, c"),
            Field::new("set", |c: &Self| &c.set, |c: &mut Self| &mut c.set),
            Field::new("ratio", |c: &Self| &c.ratio, |c: &mut Self| &mut c.ratio)
                .at_least(0.0)
                .at_most(1.0),
            Field::new("label", |c: &Self| &c.label, |c: &mut Self| &mut c.label),
        ]
    }

    fn new_default() -> Option<Self> { Some(Self::default()) }
}

fn bench_stringify(c: &mut Criterion) {
    let registry = CodecRegistry::new();
    let reader = registry.reader();
    let config = Wide::default();

    c.bench_function("stringify_wide", |b| b.iter(|| reader.stringify(black_box(&config)).unwrap()));
}

fn bench_parse(c: &mut Criterion) {
    let registry = CodecRegistry::new();
    let reader = registry.reader();
    let text = reader.stringify(&Wide::default()).unwrap().join("\n");

    c.bench_function("parse_wide", |b| {
        b.iter(|| reader.parse_str::<Wide>(black_box(&text), "bench.cfg").unwrap())
    });
}

criterion_group!(benches, bench_stringify, bench_parse);
criterion_main!(benches);
