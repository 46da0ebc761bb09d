//! Resolution behaviour of `Param` against call-site overrides.

use optparam::{
    AnyParam, Arg, Error, FlagSet, IntParam, UintParam, Value, flag, flag_in, with_default,
};

fn resolve_both<T>(a: &optparam::Param<T>, b: &optparam::Param<T>, args: &[Arg]) -> [T; 2]
where
    T: Clone + Default + Send + Sync + 'static,
{
    [a.get(args), b.get(args)]
}

#[test]
fn test_any_instances_are_independent() {
    let first = AnyParam::new();
    let second = AnyParam::new();

    let got = resolve_both(&first, &second, &[first.arg("test"), second.arg("test")]);
    for v in got {
        assert_eq!(v, "test");
    }
}

#[test]
fn test_each_instance_takes_its_own_token() {
    let first = AnyParam::new();
    let second = AnyParam::new();

    let args = [second.arg(2), first.arg(1)];
    assert_eq!(first.get(&args), Value::Int(1));
    assert_eq!(second.get(&args), Value::Int(2));
}

#[test]
fn test_defaults_without_overrides() {
    let flags = FlagSet::new("test");
    let nil = AnyParam::new();
    let one = AnyParam::with([with_default(1)]);
    let from_flag = IntParam::with([flag_in(&flags, "testnewflag", 1, "usage").unwrap()]);

    let args: [Arg; 0] = [];
    assert_eq!(nil.get(&args), Value::Nil);
    assert!(nil.get(&args).is_nil());
    assert_eq!(one.get(&args), Value::Int(1));
    assert_eq!(from_flag.get(&args), 1);
}

#[test]
fn test_typed_zero_values() {
    assert_eq!(IntParam::new().get(&[]), 0);
    assert_eq!(UintParam::new().get(&[]), 0);
}

#[test]
fn test_int_instances() {
    let first = IntParam::new();
    let second = IntParam::new();

    let got = resolve_both(&first, &second, &[first.arg(1), second.arg(1)]);
    assert_eq!(got, [1, 1]);
}

#[test]
fn test_uint_instances() {
    let first = UintParam::new();
    let second = UintParam::new();

    let got = resolve_both(&first, &second, &[first.arg(1u64), second.arg(1u64)]);
    assert_eq!(got, [1, 1]);
}

#[test]
fn test_override_beats_every_source() {
    let flags = FlagSet::new("test");
    let params = [
        IntParam::new(),
        IntParam::with([with_default(10)]),
        IntParam::with([flag_in(&flags, "n", 20, "").unwrap()]),
    ];
    for p in &params {
        assert_eq!(p.get(&[p.arg(-5)]), -5);
    }
}

#[test]
fn test_foreign_token_is_ignored() {
    let d1 = IntParam::with([with_default(7)]);
    let d2 = IntParam::with([with_default(7)]);
    assert_eq!(d1.get(&[d2.arg(99)]), 7);

    let nil = AnyParam::new();
    assert!(nil.get(&[d2.arg(99)]).is_nil());
}

#[test]
fn test_first_match_wins() {
    let d = UintParam::with([with_default(1u64)]);
    assert_eq!(d.get(&[d.arg(2u64), d.arg(3u64)]), 2);

    let other = UintParam::new();
    assert_eq!(d.get(&[other.arg(9u64), d.arg(4u64), d.arg(5u64)]), 4);
}

#[test]
fn test_clone_is_same_param() {
    let d = IntParam::with([with_default(1)]);
    let alias = d.clone();
    assert_eq!(d.get(&[alias.arg(8)]), 8);
}

#[test]
fn test_mixed_types_in_one_slice() {
    let name = AnyParam::with([with_default("anon")]);
    let port = IntParam::with([with_default(80)]);
    let workers = UintParam::new();
    let verbose = optparam::Param::<bool>::new();

    let args = [workers.arg(4u64), name.arg("svc"), verbose.arg(true)];
    assert_eq!(name.get(&args), "svc");
    assert_eq!(port.get(&args), 80);
    assert_eq!(workers.get(&args), 4);
    assert!(verbose.get(&args));
}

#[test]
fn test_port_end_to_end() {
    let flags = FlagSet::new("server");
    let port = IntParam::with([flag_in(&flags, "port", 8080, "listen port").unwrap()]);
    assert_eq!(port.get(&[]), 8080);
    assert_eq!(port.get(&[port.arg(9090)]), 9090);
}

#[test]
fn test_flag_default_is_read_through() {
    let flags = FlagSet::new("server");
    let port = IntParam::with([flag_in(&flags, "port", 8080, "listen port").unwrap()]);

    flags.set("port", "7070").unwrap();
    assert_eq!(port.get(&[]), 7070);

    flags.parse_from(["server", "--port=6060"]).unwrap();
    assert_eq!(port.get(&[]), 6060);
    assert_eq!(port.default_value(), 6060);
}

#[test]
fn test_duplicate_flag_is_propagated() {
    let flags = FlagSet::new("test");
    let _first = IntParam::with([flag_in(&flags, "dup", 1, "").unwrap()]);
    let err = flag_in::<i64>(&flags, "dup", 2, "").unwrap_err();
    assert!(matches!(err, Error::DuplicateFlag(ref n) if n == "dup"));
}

#[test]
fn test_global_flag_set() {
    let p = UintParam::with([flag("optparam-test-global", 3u64, "global usage").unwrap()]);
    assert_eq!(p.get(&[]), 3);
    assert!(FlagSet::global().contains("optparam-test-global"));

    FlagSet::global().set("optparam-test-global", "4").unwrap();
    assert_eq!(p.get(&[]), 4);

    assert!(flag::<u64>("optparam-test-global", 5u64, "").is_err());
}

#[test]
fn test_any_flag_infers_parsed_value() {
    let flags = FlagSet::new("test");
    let mode = AnyParam::with([flag_in(&flags, "mode", "fast", "").unwrap()]);
    assert_eq!(mode.get(&[]), "fast");

    flags.parse_from(["test", "--mode", "12"]).unwrap();
    assert_eq!(mode.get(&[]), Value::Int(12));
}
