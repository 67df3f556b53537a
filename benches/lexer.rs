//! Lexer benchmarks
//!
//! Run with: cargo bench --bench lexer
//! Profile with: cargo flamegraph --bench lexer -- --bench

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use esfront::lexer::{Lexer, TokenKind};
use esfront::string_dict::StringDict;

/// Simple expression
const SIMPLE_EXPR: &str = "1 + 2 * 3 - 4 / 5";

/// Variable declarations
const VARIABLES: &str = r#"
let x = 1;
const y = 2;
var z = 3;
let a = x + y + z;
const b = a * 2;
"#;

/// String literals with escapes
const STRINGS: &str = r#"
const hello = "Hello, World!";
const escaped = "Line1\nLine2\tTabbed";
const unicode = "\u{1F600} emoji A";
const quoted = 'single \'quoted\' text';
"#;

/// Operators stress test
const OPERATORS: &str = r#"
a + b - c * d / e % f ** g
x === y !== z == w != v
a && b || c ?? d
a & b | c ^ d ~ e
a << 2 >> 3 >>> 4
a += b -= c *= d /= e %= f **= g
a &&= b ||= c ??= d
a < b <= c > d >= e
++x --y x++ y--
a?.b a?.() a ?? b
...rest
"#;

/// Class definition
const CLASS_DEF: &str = r#"
class Counter extends Base {
    #count = 0;
    static instances = 0;

    constructor(name, initialValue = 0) {
        super();
        this.name = name;
        this.#count = initialValue;
        Counter.instances++;
    }

    get value() {
        return this.#count;
    }

    set value(n) {
        if (n >= 0) {
            this.#count = n;
        }
    }

    static create(name) {
        return new Counter(name);
    }
}
"#;

/// Control flow
const CONTROL_FLOW: &str = r#"
if (condition) {
    doSomething();
} else {
    doDefault();
}

for (let i = 0; i < 10; i++) {
    console.log(i);
}

for (const key in object) {
    if (object.hasOwnProperty(key)) {
        console.log(key, object[key]);
    }
}

switch (value) {
    case 1:
        handleOne();
        break;
    default:
        handleDefault();
}

try {
    riskyOperation();
} catch (error) {
    handleError(error);
} finally {
    cleanup();
}
"#;

/// Numbers in various formats
const NUMBERS: &str = r#"
const decimal = 42;
const float = 3.14159;
const scientific = 6.022e23;
const hex = 0xFF;
const octal = 0o755;
const legacy = 0755;
const binary = 0b1010;
const bigint = 9007199254740991n;
const underscore = 1_000_000;
"#;

/// Comments stress test
const COMMENTS: &str = r#"
// Single line comment
const a = 1; // inline comment
/* Multi-line
   comment
   spanning
   multiple lines */
const b = 2;
/**
 * Doc comment
 * @param x The first parameter
 * @param y The second parameter
 */
function add(x, y) {
    return x + y;
}
"#;

/// Large realistic file
fn generate_large_source(size: usize) -> String {
    let mut source = String::with_capacity(size);
    let patterns = [CLASS_DEF, CONTROL_FLOW, VARIABLES, OPERATORS, NUMBERS, COMMENTS];

    let mut i = 0;
    while source.len() < size {
        if let Some(pattern) = patterns.get(i % patterns.len()) {
            source.push_str(pattern);
            source.push_str("\n\n");
        }
        i += 1;
    }
    source
}

/// Pull tokens until end of input or the first lexical error.
fn drain(source: &str, dict: &mut StringDict) {
    let mut lexer = Lexer::new(source, dict);
    while let Ok(token) = lexer.next_token() {
        if token.kind == TokenKind::Eof {
            break;
        }
        black_box(&token);
    }
}

fn bench_lexer_individual(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer/individual");

    let cases = [
        ("simple_expr", SIMPLE_EXPR),
        ("variables", VARIABLES),
        ("strings", STRINGS),
        ("operators", OPERATORS),
        ("class_def", CLASS_DEF),
        ("control_flow", CONTROL_FLOW),
        ("numbers", NUMBERS),
        ("comments", COMMENTS),
    ];

    for (name, source) in cases {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("bytes", name), source, |b, s| {
            let mut dict = StringDict::new();
            b.iter(|| drain(black_box(s), &mut dict));
        });
    }

    group.finish();
}

fn bench_lexer_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer/throughput");

    for size in [1_000, 10_000, 100_000, 500_000] {
        let source = generate_large_source(size);
        let actual_size = source.len();

        group.throughput(Throughput::Bytes(actual_size as u64));
        group.bench_with_input(
            BenchmarkId::new("large_source", format!("{}KB", actual_size / 1024)),
            &source,
            |b, s| {
                let mut dict = StringDict::new();
                b.iter(|| drain(black_box(s), &mut dict));
            },
        );
    }

    group.finish();
}

fn bench_lexer_token_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer/token_types");

    let identifiers = "foo bar baz qux let const var function class async await yield café \\u0061b";
    group.bench_function("identifiers_keywords", |b| {
        let mut dict = StringDict::new();
        b.iter(|| drain(black_box(identifiers), &mut dict));
    });

    let numbers = "1 2 3 42 3.14 1e10 0xFF 0o755 0b1010 123n 1_000_000 .5";
    group.bench_function("numbers", |b| {
        let mut dict = StringDict::new();
        b.iter(|| drain(black_box(numbers), &mut dict));
    });

    let punctuators = "{ } ( ) [ ] ; , < > <= >= == != === !== + - * / % ** ++ -- << >> >>> & | ^ ! ~ && || ?? ? ?. : = => ...";
    group.bench_function("punctuators", |b| {
        let mut dict = StringDict::new();
        b.iter(|| drain(black_box(punctuators), &mut dict));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_lexer_individual,
    bench_lexer_throughput,
    bench_lexer_token_types,
);
criterion_main!(benches);
