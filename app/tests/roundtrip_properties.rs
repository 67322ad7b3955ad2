//! Property-based round-trip tests.
//!
//! For every well-formed argv, the kwargs a registered function receives
//! equal the values the tokens denote, and omitted flags keep their
//! declared defaults.

use argslot::App;
use argslot_core::{Annotation, Function, Kwargs, Param, Value};
use proptest::prelude::*;

const TRUE_TOKENS: [&str; 5] = ["1", "t", "true", "y", "yes"];
const FALSE_TOKENS: [&str; 5] = ["0", "f", "false", "n", "no"];
const NONE_TOKENS: [&str; 3] = ["nil", "none", "null"];

/// A command-line token paired with the value it must parse to.
type Token = (String, Value);

fn echo(name: &str, params: Vec<Param>) -> Function {
    params
        .into_iter()
        .fold(Function::builder(name), |b, p| b.param(p))
        .build(|args| Ok(Value::Map(args.into_kwargs())))
}

fn resolve(function: Function, argv: Vec<String>) -> Kwargs {
    let mut app = App::new();
    app.register(function).unwrap();
    app.resolve(argv).unwrap().kwargs
}

fn flag(argv: &mut Vec<String>, name: &str, token: &str) {
    argv.push(format!("--{name}"));
    argv.push(token.to_string());
}

fn integers() -> impl Strategy<Value = Token> {
    any::<i64>().prop_map(|a| (format!("{a}"), Value::Int(a)))
}

fn non_negative_floats() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), 0.0f64..1.0, 1.0f64..f64::MAX]
}

/// Floats rendered with `{x}`, which prints integral values without a
/// fractional part.
fn floats() -> impl Strategy<Value = Token> {
    non_negative_floats().prop_map(|x| (format!("{x}"), Value::Float(x)))
}

/// Floats rendered with `{x:?}`, which always carries a `.` or exponent and
/// so never reads as an integer.
fn float_literals() -> impl Strategy<Value = Token> {
    non_negative_floats().prop_map(|x| (format!("{x:?}"), Value::Float(x)))
}

fn booleans() -> impl Strategy<Value = Token> {
    any::<bool>().prop_flat_map(|b| {
        let tokens = if b { TRUE_TOKENS } else { FALSE_TOKENS };
        prop::sample::select(tokens.to_vec()).prop_map(move |t| (t.to_string(), Value::Bool(b)))
    })
}

fn strings() -> impl Strategy<Value = Token> {
    "[A-Za-z]{1,16}"
        .prop_filter("not a none token", |s| {
            !NONE_TOKENS.contains(&s.to_ascii_lowercase().as_str())
        })
        .prop_map(|s| (s.clone(), Value::Str(s)))
}

fn optional(strategy: impl Strategy<Value = Token>) -> impl Strategy<Value = Token> {
    prop_oneof![
        strategy,
        prop::sample::select(NONE_TOKENS.to_vec()).prop_map(|t| (t.to_string(), Value::None)),
    ]
}

fn scalars() -> Function {
    echo(
        "scalars",
        vec![
            Param::new("a").with_type(Annotation::int()).with_default(1),
            Param::new("b").with_type(Annotation::float()).with_default(2.0),
            Param::new("d").with_type(Annotation::bool()).with_default(true),
            Param::new("e").with_type(Annotation::str()).with_default("e :: string"),
        ],
    )
}

fn optionals() -> Function {
    echo(
        "optionals",
        vec![
            Param::new("a").with_type(Annotation::int()).with_default(Value::None),
            Param::new("b").with_type(Annotation::float()).with_default(Value::None),
            Param::new("d").with_type(Annotation::bool()).with_default(Value::None),
            Param::new("e").with_type(Annotation::str()).with_default(Value::None),
        ],
    )
}

fn unions() -> Function {
    echo(
        "unions",
        vec![
            Param::new("a")
                .with_type(Annotation::union([Annotation::int(), Annotation::str()]))
                .with_default(2),
            Param::new("b")
                .with_type(Annotation::union([Annotation::float(), Annotation::float()]))
                .with_default(3.0),
            Param::new("c")
                .with_type(Annotation::union([Annotation::int(), Annotation::float()]))
                .with_default(Value::None),
        ],
    )
}

fn sequences() -> Function {
    echo(
        "sequences",
        vec![
            Param::new("a")
                .with_type(Annotation::list(Annotation::int()))
                .with_default(vec![6, 7]),
            Param::new("b")
                .with_type(Annotation::homo_tuple(Annotation::float()))
                .with_default(Value::Tuple(vec![Value::Float(8.0), Value::Float(9.0)])),
        ],
    )
}

proptest! {
    #[test]
    fn prop_scalars_round_trip(
        a in integers(),
        b in floats(),
        d in booleans(),
        e in strings(),
    ) {
        let mut argv = Vec::new();
        flag(&mut argv, "a", &a.0);
        flag(&mut argv, "b", &b.0);
        flag(&mut argv, "d", &d.0);
        flag(&mut argv, "e", &e.0);

        let out = resolve(scalars(), argv);
        prop_assert_eq!(&out["a"], &a.1);
        prop_assert_eq!(&out["b"], &b.1);
        prop_assert_eq!(&out["d"], &d.1);
        prop_assert_eq!(&out["e"], &e.1);
    }

    #[test]
    fn prop_optionals_round_trip(
        a in optional(integers()),
        b in optional(floats()),
        d in optional(booleans()),
        e in strings(),
    ) {
        let mut argv = Vec::new();
        flag(&mut argv, "a", &a.0);
        flag(&mut argv, "b", &b.0);
        flag(&mut argv, "d", &d.0);
        flag(&mut argv, "e", &e.0);

        let out = resolve(optionals(), argv);
        prop_assert_eq!(&out["a"], &a.1);
        prop_assert_eq!(&out["b"], &b.1);
        prop_assert_eq!(&out["d"], &d.1);
        prop_assert_eq!(&out["e"], &e.1);
    }

    #[test]
    fn prop_unions_round_trip(
        a in prop_oneof![integers(), strings()],
        b in floats(),
        c in optional(prop_oneof![integers(), float_literals()]),
    ) {
        let mut argv = Vec::new();
        flag(&mut argv, "a", &a.0);
        flag(&mut argv, "b", &b.0);
        flag(&mut argv, "c", &c.0);

        let out = resolve(unions(), argv);
        prop_assert_eq!(&out["a"], &a.1);
        prop_assert_eq!(&out["b"], &b.1);
        prop_assert_eq!(&out["c"], &c.1);
    }

    #[test]
    fn prop_sequences_collect_every_occurrence(
        a in prop::collection::vec(integers(), 0..6),
        b in prop::collection::vec(floats(), 0..6),
    ) {
        let mut argv = Vec::new();
        for (token, _) in &a {
            flag(&mut argv, "a", token);
        }
        for (token, _) in &b {
            flag(&mut argv, "b", token);
        }

        let expected_a = if a.is_empty() {
            Value::List(vec![Value::Int(6), Value::Int(7)])
        } else {
            Value::List(a.into_iter().map(|(_, v)| v).collect())
        };
        let expected_b = if b.is_empty() {
            Value::Tuple(vec![Value::Float(8.0), Value::Float(9.0)])
        } else {
            Value::Tuple(b.into_iter().map(|(_, v)| v).collect())
        };

        let out = resolve(sequences(), argv);
        prop_assert_eq!(&out["a"], &expected_a);
        prop_assert_eq!(&out["b"], &expected_b);
    }
}
