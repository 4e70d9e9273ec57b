use serde_json::{Value, json};

use super::{builtin, canonical, scoped};

fn run(name: &str, value: Value, args: Vec<Value>) -> bool {
    let f = builtin(name).unwrap_or_else(|| panic!("no builtin checker named {name}"));
    f(&value, &args)
}

#[test]
fn type_checkers() {
    // (expected, checker, value, args)
    let cases: Vec<(bool, &str, Value, Vec<Value>)> = vec![
        (true, "integer", json!(23), vec![]),
        (true, "integer", json!("23"), vec![]),
        (false, "integer", json!("abc"), vec![]),
        (false, "integer", json!(1.5), vec![]),
        (true, "integer", json!(5), vec![json!(1), json!(10)]),
        (false, "integer", json!(50), vec![json!(1), json!(10)]),
        (true, "number", json!(0), vec![]),
        (false, "number", json!(-4), vec![]),
        (false, "number", json!("abc"), vec![]),
        (true, "float", json!(1.25), vec![]),
        (true, "float", json!("1.25"), vec![]),
        (false, "float", json!(true), vec![]),
        (true, "string", json!("hi"), vec![]),
        (true, "string", json!("hello"), vec![json!(1), json!(10)]),
        (false, "string", json!("hello"), vec![json!(1), json!(3)]),
        (false, "string", json!(5), vec![]),
        (true, "boolean", json!(true), vec![]),
        (true, "boolean", json!("0"), vec![]),
        (false, "boolean", json!("maybe"), vec![]),
        (true, "array", json!([1, 2]), vec![]),
        (false, "array", json!({"a": 1}), vec![]),
        (true, "map", json!({"a": 1}), vec![]),
        (true, "json", json!("{\"a\":1}"), vec![]),
        (false, "json", json!("{nope"), vec![]),
    ];

    for (expected, name, value, args) in cases {
        assert_eq!(run(name, value.clone(), args.clone()), expected, "{name}({value:?}, {args:?})");
    }
}

#[test]
fn comparison_and_size_checkers() {
    let cases: Vec<(bool, &str, Value, Vec<Value>)> = vec![
        (true, "enum", json!("b"), vec![json!(["a", "b"])]),
        (true, "enum", json!(3), vec![json!(1), json!(3)]),
        (false, "enum", json!("c"), vec![json!(["a", "b"])]),
        (true, "notIn", json!("c"), vec![json!(["a", "b"])]),
        (true, "eq", json!(3), vec![json!(3.0)]),
        (true, "eq", json!("3"), vec![json!(3)]),
        (false, "notEq", json!(3), vec![json!(3)]),
        (true, "gt", json!(5), vec![json!(4)]),
        (false, "gt", json!(4), vec![json!(4)]),
        (true, "gte", json!(4), vec![json!(4)]),
        (true, "lt", json!("3"), vec![json!(4)]),
        (true, "lte", json!(4), vec![json!(4)]),
        (true, "min", json!(23), vec![json!(18)]),
        (false, "min", json!(17), vec![json!(18)]),
        (true, "max", json!(17), vec![json!(18)]),
        (true, "size", json!("abc"), vec![json!(1), json!(5)]),
        (true, "size", json!(42), vec![json!(1), json!(50)]),
        (false, "size", json!([1]), vec![json!(2), json!(5)]),
        (false, "size", json!("abc"), vec![]),
        (true, "length", json!("abcd"), vec![json!(4)]),
        (false, "length", json!(42), vec![json!(1)]),
        (true, "distinct", json!([1, 2, 3]), vec![]),
        (false, "distinct", json!([1, 2, 1]), vec![]),
        (true, "contains", json!("hello"), vec![json!("ell")]),
        (true, "contains", json!([1, 2]), vec![json!(2)]),
        (false, "contains", json!("hello"), vec![json!("xyz")]),
        (true, "startWith", json!("hello"), vec![json!("he")]),
        (false, "startWith", json!("hello"), vec![json!("")]),
        (true, "endWith", json!("hello"), vec![json!("lo")]),
        (true, "accepted", json!("yes"), vec![]),
        (true, "accepted", json!(1), vec![]),
        (false, "accepted", json!("nope"), vec![]),
    ];

    for (expected, name, value, args) in cases {
        assert_eq!(run(name, value.clone(), args.clone()), expected, "{name}({value:?}, {args:?})");
    }
}

#[test]
fn format_checkers() {
    let cases: Vec<(bool, &str, Value, Vec<Value>)> = vec![
        (true, "email", json!("dave@example.com"), vec![]),
        (false, "email", json!("not-an-email"), vec![]),
        (true, "url", json!("https://example.com/x?y=1"), vec![]),
        (false, "url", json!("example.com"), vec![]),
        (true, "ip", json!("127.0.0.1"), vec![]),
        (true, "ip", json!("::1"), vec![]),
        (true, "ipv4", json!("10.0.0.1"), vec![]),
        (false, "ipv4", json!("::1"), vec![]),
        (true, "ipv6", json!("::1"), vec![]),
        (true, "alpha", json!("abc"), vec![]),
        (false, "alpha", json!("abc1"), vec![]),
        (true, "alphaNum", json!("abc1"), vec![]),
        (true, "alphaDash", json!("a-b_c1"), vec![]),
        (false, "alphaDash", json!("a b"), vec![]),
        (true, "regexp", json!("x42"), vec![json!("^x\\d+$")]),
        (false, "regexp", json!("x42"), vec![json!("^y")]),
        (true, "date", json!("2026-08-29"), vec![]),
        (true, "date", json!("2026-08-29 10:30:00"), vec![]),
        (false, "date", json!("yesterday"), vec![]),
        (true, "dateFormat", json!("29/08/2026"), vec![json!("%d/%m/%Y")]),
        (false, "dateFormat", json!("2026-08-29"), vec![json!("%d/%m/%Y")]),
        (true, "afterDate", json!("2026-08-29"), vec![json!("2026-01-01")]),
        (false, "beforeDate", json!("2026-08-29"), vec![json!("2026-01-01")]),
    ];

    for (expected, name, value, args) in cases {
        assert_eq!(run(name, value.clone(), args.clone()), expected, "{name}({value:?}, {args:?})");
    }
}

#[test]
fn aliases_resolve_to_canonical_names() {
    assert_eq!(canonical("int"), "integer");
    assert_eq!(canonical("range"), "size");
    assert_eq!(canonical("between"), "size");
    assert_eq!(canonical("in"), "enum");
    assert_eq!(canonical("integer"), "integer");
    assert_eq!(canonical("somethingElse"), "somethingElse");

    assert!(builtin("int").is_some());
    assert!(builtin("no-such-checker").is_none());
}

#[test]
fn required_family() {
    let record = json!({
        "name": "dave",
        "blank": "  ",
        "mode": "ship",
        "addr": null,
        "xs": [{"id": 1}],
    });

    let required = scoped("required").unwrap();
    assert!(required(&record, "name", &[]));
    assert!(!required(&record, "blank", &[]));
    assert!(!required(&record, "addr", &[]));
    assert!(!required(&record, "missing", &[]));
    assert!(required(&record, "xs.*.id", &[]));
    assert!(!required(&record, "xs.*.missing", &[]));

    let required_if = scoped("requiredIf").unwrap();
    assert!(!required_if(&record, "tracking", &[json!("mode"), json!("ship")]));
    assert!(required_if(&record, "tracking", &[json!("mode"), json!("pickup")]));

    let required_unless = scoped("requiredUnless").unwrap();
    assert!(required_unless(&record, "tracking", &[json!("mode"), json!("ship")]));
    assert!(!required_unless(&record, "tracking", &[json!("mode"), json!("pickup")]));

    let required_with = scoped("requiredWith").unwrap();
    assert!(!required_with(&record, "tracking", &[json!("name")]));
    assert!(required_with(&record, "tracking", &[json!("missing")]));

    let required_without = scoped("requiredWithout").unwrap();
    assert!(!required_without(&record, "tracking", &[json!("missing")]));
    assert!(required_without(&record, "tracking", &[json!("name")]));
}

#[test]
fn upload_metadata_shape() {
    let upload = scoped("upload").unwrap();

    let ok = json!({"avatar": {"name": "me.png", "tmp_path": "/tmp/u1", "error": 0}});
    assert!(upload(&ok, "avatar", &[]));

    let no_error_code = json!({"avatar": {"name": "me.png", "tmp_path": "/tmp/u1"}});
    assert!(upload(&no_error_code, "avatar", &[]));

    let failed = json!({"avatar": {"name": "me.png", "tmp_path": "/tmp/u1", "error": 4}});
    assert!(!upload(&failed, "avatar", &[]));

    let not_meta = json!({"avatar": "me.png"});
    assert!(!upload(&not_meta, "avatar", &[]));
}
