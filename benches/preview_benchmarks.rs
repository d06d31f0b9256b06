//! Benchmarks for the preview pipeline.
//!
//! Run with: cargo bench
//!
//! The normalizer and transpiler benchmarks are pure and always run. The
//! execution benchmarks require the QuickJS build at assets/quickjs.wasm
//! and are skipped when it is absent.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;
use tokio::runtime::Runtime;

use snippet_preview_rs::normalize::normalize;
use snippet_preview_rs::prelude::*;
use snippet_preview_rs::sandbox::document;
use snippet_preview_rs::transpile;

/// Get the path to the engine, checking if it exists.
fn get_engine_path() -> Option<std::path::PathBuf> {
    let path = std::path::PathBuf::from("assets/quickjs.wasm");
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

const SMALL_COMPONENT: &str = r#"
function Card() {
    const [count, setCount] = useState(0);
    return (
        <div className="card">
            <h2>Counter</h2>
            <button onClick={() => setCount(count + 1)}>{count}</button>
        </div>
    );
}
"#;

const TYPED_COMPONENT: &str = r#"
interface Props {
    title: string;
    items: string[];
}

const List = ({ title, items }: Props) => {
    const [open, setOpen] = useState<boolean>(true);
    return (
        <section>
            <h3>{title}</h3>
            {open && <ul>{items.map((item) => <li key={item}>{item}</li>)}</ul>}
        </section>
    );
};
"#;

/// Benchmark the normalizer heuristics.
fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    let inputs = [
        ("bare_markup", "<div><h1>Hello</h1><p>World</p></div>"),
        ("declaration", SMALL_COMPONENT),
        ("default_export", "export default function App() { return <div /> }"),
    ];

    for (name, input) in inputs {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, input| {
            b.iter(|| normalize(black_box(input), &Language::Tsx));
        });
    }

    group.finish();
}

/// Benchmark the JSX/TypeScript transpiler.
fn bench_transpile(c: &mut Criterion) {
    let mut group = c.benchmark_group("transpile");

    let inputs = [
        ("small_jsx", SMALL_COMPONENT),
        ("typed_tsx", TYPED_COMPONENT),
        ("plain_js", "const xs = [1, 2, 3].map((x) => x * 2); console.log(xs);"),
    ];

    for (name, input) in inputs {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, input| {
            b.iter(|| transpile::transpile(black_box(input)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark the full normalize + transpile write path.
fn bench_write_path(c: &mut Criterion) {
    let store = MemoryStore::new();

    c.bench_function("store_create_jsx", |b| {
        b.iter(|| store.create(black_box(SMALL_COMPONENT), Language::Jsx));
    });
}

/// Benchmark host document construction.
fn bench_documents(c: &mut Criterion) {
    let transpiled = transpile::transpile(&normalize(SMALL_COMPONENT, &Language::Jsx)).unwrap();

    let mut group = c.benchmark_group("documents");
    group.bench_function("react_document", |b| {
        b.iter(|| document::react_document(black_box(&transpiled)));
    });
    group.bench_function("html_document", |b| {
        b.iter(|| document::html_document(black_box("<h1>Hello</h1>")));
    });
    group.finish();
}

/// Benchmark warm sandbox creation (cached engine module).
fn bench_warm_sandbox(c: &mut Criterion) {
    let Some(engine_path) = get_engine_path() else {
        eprintln!("Skipping warm_sandbox benchmark: quickjs.wasm not found");
        return;
    };

    let config = PreviewConfig::builder()
        .engine_path(&engine_path)
        .timeout(Duration::from_secs(30))
        .build();

    // Pre-warm the cache
    let _ = JsSandbox::new(config.clone()).unwrap();

    c.bench_function("sandbox_creation_with_cache", |b| {
        b.iter(|| {
            let sandbox = JsSandbox::new(config.clone()).unwrap();
            black_box(sandbox)
        });
    });
}

/// Benchmark a full headless preview run.
fn bench_headless_run(c: &mut Criterion) {
    let Some(engine_path) = get_engine_path() else {
        eprintln!("Skipping headless_run benchmark: quickjs.wasm not found");
        return;
    };

    let rt = Runtime::new().unwrap();
    let config = PreviewConfig::builder()
        .engine_path(&engine_path)
        .timeout(Duration::from_secs(30))
        .build();
    let sandbox = JsSandbox::new(config).unwrap();
    let transpiled = transpile::transpile(&normalize(SMALL_COMPONENT, &Language::Jsx)).unwrap();

    let mut group = c.benchmark_group("headless_run");
    group.sample_size(10);

    group.bench_function("small_component", |b| {
        b.iter(|| {
            let run = rt.block_on(sandbox.run_preview(black_box(&transpiled))).unwrap();
            black_box(run)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_normalize,
    bench_transpile,
    bench_write_path,
    bench_documents,
    bench_warm_sandbox,
    bench_headless_run
);
criterion_main!(benches);
