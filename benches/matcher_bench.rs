use criterion::{black_box, criterion_group, criterion_main, Criterion};
use itertools::Itertools;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use wikilinks::config::OverlapPolicy;
use wikilinks::matching::Matcher;

const NB_FORMS: usize = 10_000;
const NB_WORDS: usize = 20_000;

// bench protocol:
//
// A vocabulary of NB_FORMS one to three word surface forms is built from
// synthetic words, and matched over a text of NB_WORDS words where roughly one
// word out of ten starts a surface form.

fn word(idx: usize) -> String {
    format!("W{idx:x}")
}

fn forms() -> Vec<String> {
    (0..NB_FORMS)
        .map(|idx| (0..=(idx % 3)).map(|offset| word(idx + offset)).join(" "))
        .collect()
}

fn text(forms: &[String]) -> String {
    let mut rng = StdRng::seed_from_u64(42);
    (0..NB_WORDS)
        .map(|idx| {
            if idx % 10 == 0 {
                forms.choose(&mut rng).cloned().unwrap_or_default()
            } else {
                format!("filler{}", idx % 97)
            }
        })
        .join(" ")
}

pub fn matcher_build(c: &mut Criterion) {
    let forms = forms();
    c.bench_function("matcher build", |b| {
        b.iter(|| black_box(Matcher::new(&forms).unwrap()))
    });
}

pub fn matcher_find(c: &mut Criterion) {
    let forms = forms();
    let text = text(&forms);
    let matcher = Matcher::new(&forms).unwrap();

    c.bench_function("matcher find", |b| b.iter(|| black_box(matcher.find(&text))));
    c.bench_function("matcher find+resolve (keep partial)", |b| {
        b.iter(|| black_box(matcher.find_resolved(&text, OverlapPolicy::KeepPartial)))
    });
    c.bench_function("matcher find+resolve (leftmost longest)", |b| {
        b.iter(|| black_box(matcher.find_resolved(&text, OverlapPolicy::LeftmostLongest)))
    });
}

criterion_group!(benches, matcher_build, matcher_find);
criterion_main!(benches);
