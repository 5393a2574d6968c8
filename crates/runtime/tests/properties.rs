//! Behavioural properties of the engine, exercised through the public API

use tokflow_runtime::{
    ArithOp, Bundle, Engine, EngineConfig, ErrorKind, ErrorToken, Kind, Op, OverloadSet, Pattern,
    Signature, Token, fork, pipe, run,
};

fn ints(values: &[i64]) -> Vec<Token> {
    values.iter().copied().map(Token::int).collect()
}

fn syms(names: &[&str]) -> Vec<Token> {
    names.iter().map(|n| Token::sym(*n)).collect()
}

fn pair(a: Token, b: Token) -> Token {
    Token::list([a, b])
}

fn sample_ops() -> Vec<Op> {
    vec![
        Op::reverse(),
        Op::transform(ArithOp::Add.with(Token::int(1))),
        Op::push_back(ints(&[9])),
        Op::rotate(1),
        Op::length(),
    ]
}

#[test]
fn test_singleton_transparency() {
    for token in [
        Token::int(3),
        Token::sym("a"),
        Token::list(ints(&[1, 2])),
        Token::compound("pair", ints(&[1, 2])),
    ] {
        let bare = run(&Op::identity(), [token.clone()]).unwrap();
        let bundled = run(&Op::identity(), Bundle::from(token.clone())).unwrap();
        assert_eq!(bare, bundled);
        assert_eq!(bare, token);
    }
}

#[test]
fn test_group_of_one_is_the_token() {
    let group = Token::group(ints(&[5]));
    assert_eq!(group, Token::int(5));
    let out = run(&Op::identity(), [Token::group(ints(&[1, 2]))]).unwrap();
    assert_eq!(out, Bundle::new(ints(&[1, 2])));
}

#[test]
fn test_pipe_associativity() {
    let ops = sample_ops();
    let input = ints(&[1, 2, 3]);
    for a in &ops {
        for b in &ops {
            for c in &ops {
                let left = pipe![pipe![a.clone(), b.clone()], c.clone()];
                let right = pipe![a.clone(), pipe![b.clone(), c.clone()]];
                let flat = pipe![a.clone(), b.clone(), c.clone()];
                let expected = run(&flat, input.clone()).unwrap();
                assert_eq!(run(&left, input.clone()).unwrap(), expected);
                assert_eq!(run(&right, input.clone()).unwrap(), expected);
            }
        }
    }
}

#[test]
fn test_empty_pipe_identity() {
    for input in [vec![], ints(&[1]), ints(&[1, 2, 3])] {
        assert_eq!(run(&pipe![], input.clone()).unwrap(), Bundle::new(input));
    }
}

#[test]
fn test_error_absorption() {
    let failing = Op::mkseq();
    let later = [Op::reverse(), Op::push_back(ints(&[1])), Op::listify()];
    let first_error = run(&failing, [Token::sym("x")]).unwrap();
    assert!(first_error.is_error());

    let op = Op::pipe(std::iter::once(failing).chain(later));
    let out = run(&op, [Token::sym("x")]).unwrap();
    assert_eq!(out, first_error);
}

#[test]
fn test_error_inside_fork_collapses_in_pipe() {
    let op = pipe![fork![Op::identity(), Op::mkseq()], Op::length()];
    let out = run(&op, [Token::sym("x")]).unwrap();
    let err = out.single().and_then(Token::as_error).unwrap();
    assert_eq!(&*err.op, "mkseq");
    assert_eq!(err.kind, ErrorKind::NotANonNegativeInteger);
}

fn upstream_error() -> Token {
    Token::error(ErrorToken::new("div", ErrorKind::DivisionByZero).with_inputs([Token::int(0)]))
}

#[test]
fn test_error_inside_mapped_element_collapses_in_pipe() {
    let op = pipe![
        Op::transform(fork![Op::identity(), ArithOp::Div.with(Token::int(0))]),
        Op::transform(Op::first())
    ];
    let out = run(&op, ints(&[1, 2])).unwrap();
    assert!(out.is_error());
    let err = out.single().and_then(Token::as_error).unwrap();
    assert_eq!(err.kind, ErrorKind::DivisionByZero);
}

#[test]
fn test_error_inside_mapped_element_skips_fold() {
    let op = pipe![
        Op::transform(fork![Op::identity(), ArithOp::Div.with(Token::int(0))]),
        Op::fold_left(ArithOp::Add.op())
    ];
    let out = run(&op, ints(&[1, 2, 3])).unwrap();
    assert!(out.is_error());
}

#[test]
fn test_error_input_passes_through_control_flow() {
    let err = upstream_error();
    let branch = Op::cond(Op::is_zero(), Op::input([Token::sym("zero")]), Op::nothing());
    assert_eq!(run(&branch, [err.clone()]).unwrap(), err);
    assert_eq!(run(&Op::not([Op::is_zero()]), [err.clone()]).unwrap(), err);
    assert_eq!(run(&Op::not([]), [err.clone()]).unwrap(), err);
}

#[test]
fn test_error_element_passes_through_quantifiers() {
    let err = upstream_error();
    let input = vec![Token::int(0), err.clone(), Token::int(0)];
    assert_eq!(run(&Op::all_of(Op::is_zero()), input.clone()).unwrap(), err);
    assert_eq!(run(&Op::filter(Op::is_zero()), input).unwrap(), err);

    let input = vec![Token::int(1), err.clone()];
    assert_eq!(run(&Op::any_of(Op::is_zero()), input).unwrap(), err);
}

#[test]
fn test_fork_independence() {
    let a = Op::reverse();
    let b = Op::transform(ArithOp::Mul.with(Token::int(10)));
    let input = ints(&[1, 2, 3]);
    let forked = run(&fork![a.clone(), b.clone()], input.clone()).unwrap();
    let mut expected = run(&a, input.clone()).unwrap().into_vec();
    expected.extend(run(&b, input).unwrap());
    assert_eq!(forked, Bundle::new(expected));
}

#[test]
fn test_flatten_idempotence() {
    let nested = vec![
        Token::int(1),
        Token::group(vec![Token::int(2), Token::group(ints(&[3, 4]))]),
        Token::list(ints(&[5, 6])),
    ];
    let once = run(&Op::flatten(), nested.clone()).unwrap();
    let twice = run(&pipe![Op::flatten(), Op::flatten()], nested).unwrap();
    assert_eq!(once, twice);
    assert_eq!(once.len(), 5);
}

#[test]
fn test_sort_stability() {
    let input = vec![
        pair(Token::int(1), Token::sym("a")),
        pair(Token::int(1), Token::sym("b")),
        pair(Token::int(0), Token::sym("c")),
    ];
    let by_first = Op::sort(pipe![Op::transform(pipe![Op::unwrap(), Op::first()]), Op::less()]);
    let out = run(&by_first, input).unwrap();
    assert_eq!(
        out,
        Bundle::new(vec![
            pair(Token::int(0), Token::sym("c")),
            pair(Token::int(1), Token::sym("a")),
            pair(Token::int(1), Token::sym("b")),
        ])
    );
}

#[test]
fn test_product_ordering() {
    let out = run(
        &Op::product(),
        [Token::list(syms(&["A", "B"])), Token::list(syms(&["X", "Y"]))],
    )
    .unwrap();
    let expected: Vec<Token> = [("A", "X"), ("A", "Y"), ("B", "X"), ("B", "Y")]
        .into_iter()
        .map(|(a, b)| pair(Token::sym(a), Token::sym(b)))
        .collect();
    assert_eq!(out, Bundle::new(expected));
}

#[test]
fn test_mkseq_boundary() {
    assert_eq!(run(&Op::mkseq(), ints(&[0])).unwrap(), Bundle::nothing());
    assert_eq!(run(&Op::mkseq(), ints(&[1])).unwrap(), Token::int(0));
    assert_eq!(run(&Op::mkseq(), ints(&[2])).unwrap(), Bundle::new(ints(&[0, 1])));
}

#[test]
fn test_get_boundary() {
    let abc = syms(&["a", "b", "c"]);
    assert_eq!(run(&Op::get(-1), abc.clone()).unwrap(), Bundle::nothing());
    assert_eq!(run(&Op::get(3), abc.clone()).unwrap(), Bundle::nothing());
    assert_eq!(run(&Op::get(1), abc.clone()).unwrap(), Token::sym("b"));
    assert_eq!(run(&Op::last(), abc.clone()).unwrap(), Token::sym("c"));
    assert_eq!(run(&Op::third(), abc).unwrap(), Token::sym("c"));
}

#[test]
fn test_partition_completeness() {
    let input = ints(&[5, 2, 8, 1, 9, 4]);
    let big = ArithOp::Gt.with(Token::int(4));
    let out = run(&Op::partition(big), input.clone()).unwrap();
    assert_eq!(
        out,
        Bundle::new(vec![
            Token::list(ints(&[5, 8, 9])),
            Token::list(ints(&[2, 1, 4])),
        ])
    );

    let mut all: Vec<i64> = out
        .iter()
        .flat_map(|part| part.decompose().unwrap_or_default().to_vec())
        .filter_map(|t| t.as_int())
        .collect();
    all.sort();
    assert_eq!(all, vec![1, 2, 4, 5, 8, 9]);
}

#[test]
fn test_gcd_lcm() {
    assert_eq!(run(&Op::gcd(), ints(&[21, 49])).unwrap(), Token::int(7));
    assert_eq!(run(&Op::lcm(), ints(&[21, 49])).unwrap(), Token::int(147));
}

#[test]
fn test_rational_sum() {
    let out = run(&ArithOp::Add.op(), [Token::ratio(1, 4), Token::ratio(2, 5)]).unwrap();
    assert_eq!(out, Token::ratio(26, 40));
}

#[test]
fn test_filter_and_remove_if_are_stable() {
    let odd = pipe![ArithOp::Mod.with(Token::int(2)), Op::is([Token::int(1)])];
    let input = ints(&[1, 2, 3, 4, 5]);
    assert_eq!(
        run(&Op::filter(odd.clone()), input.clone()).unwrap(),
        Bundle::new(ints(&[1, 3, 5]))
    );
    assert_eq!(
        run(&Op::remove_if(odd), input).unwrap(),
        Bundle::new(ints(&[2, 4]))
    );
}

#[test]
fn test_filter_with_bad_predicate_is_error() {
    let out = run(&Op::filter(Op::identity()), ints(&[1, 2])).unwrap();
    let err = out.single().and_then(Token::as_error).unwrap();
    assert_eq!(err.kind, ErrorKind::NotAPredicate);
}

#[test]
fn test_replace_if() {
    let op = Op::replace_if(Op::is([Token::int(0)]), Op::input([Token::sym("zero")]));
    let out = run(&op, ints(&[1, 0, 2, 0])).unwrap();
    assert_eq!(
        out,
        Bundle::new(vec![Token::int(1), Token::sym("zero"), Token::int(2), Token::sym("zero")])
    );
}

#[test]
fn test_find_if_returns_index_and_element() {
    let input = syms(&["float", "int", "float", "int"]);
    let out = run(&Op::find_if(Op::is([Token::sym("int")])), input.clone()).unwrap();
    assert_eq!(out, Bundle::new(vec![Token::int(1), Token::sym("int")]));

    let none = run(&Op::find_if(Op::is([Token::sym("char")])), input.clone()).unwrap();
    assert_eq!(none, Bundle::nothing());

    // strict access changes get/last only, not searching
    let strict = Engine::with_config(EngineConfig::new().with_strict_access(true));
    let none = strict
        .run(&Op::find_if(Op::is([Token::sym("char")])), input.clone())
        .unwrap();
    assert_eq!(none, Bundle::nothing());
    let found = strict
        .run(&Op::find_if(Op::is([Token::sym("float")])), input)
        .unwrap();
    assert_eq!(found, Bundle::new(vec![Token::int(0), Token::sym("float")]));
}

#[test]
fn test_swizzle() {
    let input = syms(&["a", "b", "c", "d"]);
    let out = run(&Op::swizzle([2, 1, 0, 3, 1]), input.clone()).unwrap();
    assert_eq!(out, Bundle::new(syms(&["c", "b", "a", "d", "b"])));

    let dropped = run(&Op::swizzle([0, 7]), input).unwrap();
    assert_eq!(dropped, Token::sym("a"));
}

#[test]
fn test_rotate_wraps_both_ways() {
    let input = syms(&["a", "b", "c", "d"]);
    assert_eq!(
        run(&Op::rotate(5), input.clone()).unwrap(),
        Bundle::new(syms(&["b", "c", "d", "a"]))
    );
    assert_eq!(
        run(&Op::rotate(-1), input).unwrap(),
        Bundle::new(syms(&["d", "a", "b", "c"]))
    );
}

#[test]
fn test_unique_and_group_by() {
    let input = syms(&["void", "int", "void", "float", "float", "int"]);
    assert_eq!(
        run(&Op::unique(), input).unwrap(),
        Bundle::new(syms(&["void", "int", "float"]))
    );

    let by_parity = Op::group_by(ArithOp::Mod.with(Token::int(2)));
    assert_eq!(
        run(&by_parity, ints(&[1, 2, 3, 4])).unwrap(),
        Bundle::new(ints(&[2, 4, 1, 3]))
    );
}

#[test]
fn test_group_by_keeps_groups_contiguous() {
    let by_mod3 = Op::group_by(ArithOp::Mod.with(Token::int(3)));
    let out = run(&by_mod3, ints(&[0, 1, 2, 3, 4, 5, 6, 7, 8])).unwrap();
    let keys: Vec<i64> = out.iter().filter_map(Token::as_int).map(|n| n % 3).collect();
    let mut runs = keys.clone();
    runs.dedup();
    assert_eq!(runs.len(), 3, "keys not contiguous: {:?}", keys);
}

#[test]
fn test_zip_and_unzip() {
    let a = Token::list(syms(&["a", "b"]));
    let b = Token::list(ints(&[1, 2]));
    let zipped = run(&Op::zip(), [a.clone(), b.clone()]).unwrap();
    let back = run(&Op::unzip(), zipped).unwrap();
    assert_eq!(back, Bundle::new(vec![a, b]));
}

#[test]
fn test_zip_index_pairs_positions() {
    let out = run(&Op::zip_index(), syms(&["x", "y", "z"])).unwrap();
    assert_eq!(out.as_slice()[2], pair(Token::int(2), Token::sym("z")));
    let back = run(&pipe![Op::zip_index(), Op::unzip_index()], syms(&["x", "y"])).unwrap();
    assert_eq!(back, Bundle::new(syms(&["x", "y"])));
}

#[test]
fn test_push_front_and_back() {
    let op = pipe![Op::push_front(ints(&[0])), Op::push_back(ints(&[8, 9]))];
    assert_eq!(
        run(&op, ints(&[1, 2])).unwrap(),
        Bundle::new(ints(&[0, 1, 2, 8, 9]))
    );
}

#[test]
fn test_copy_and_repeat() {
    assert_eq!(
        run(&Op::copy(3), ints(&[7])).unwrap(),
        Bundle::new(ints(&[7, 7, 7]))
    );
    assert_eq!(run(&Op::copy(0), ints(&[7])).unwrap(), Bundle::nothing());
    let add_two_thrice = Op::repeat(3, ArithOp::Add.with(Token::int(2)));
    assert_eq!(run(&add_two_thrice, ints(&[1])).unwrap(), Token::int(7));
}

#[test]
fn test_on_args_sorts_by_size() {
    let size = OverloadSet::builder("size")
        .case(Signature::new([Pattern::Any]), |_| Bundle::from(Token::int(1)))
        .case(Signature::new([Pattern::Kind(Kind::Compound)]), |args| {
            let n = args[0].decompose().map_or(0, |fields| fields.len());
            Bundle::from(Token::int(n as i64))
        })
        .build()
        .unwrap();

    let int3 = Token::compound("array", ints(&[1, 2, 3]));
    let int2 = Token::compound("array", ints(&[1, 2]));
    let scalar = Token::sym("int");
    let types = Token::list([int2.clone(), int3.clone(), scalar.clone()]);

    let by_size_desc = Op::sort(pipe![Op::transform(size), ArithOp::Gt.op()]);
    let out = run(&Op::on_args(by_size_desc), [types]).unwrap();
    assert_eq!(out, Token::list([int3, int2, scalar]));
}

#[test]
fn test_dispatch_no_match_propagates() {
    let only_ints = OverloadSet::builder("double")
        .case(Signature::new([Pattern::Kind(Kind::Int)]), |args| {
            Bundle::from(Token::int(args[0].as_int().unwrap_or(0) * 2))
        })
        .build()
        .unwrap();
    let op = pipe![Op::transform(only_ints), Op::reverse()];
    let out = run(&op, [Token::int(1), Token::sym("x")]).unwrap();
    let err = out.single().and_then(Token::as_error).unwrap();
    assert_eq!(err.kind, ErrorKind::NoMatchingPattern);
    assert_eq!(&*err.op, "double");
}

#[test]
fn test_listify_then_unwrap() {
    let op = pipe![Op::listify(), Op::unwrap()];
    assert_eq!(run(&op, ints(&[1, 2, 3])).unwrap(), Bundle::new(ints(&[1, 2, 3])));
    assert_eq!(run(&Op::listify(), []).unwrap(), Token::list([]));
}

#[test]
fn test_unwrap_rejects_atoms() {
    let out = run(&Op::unwrap(), [Token::int(4)]).unwrap();
    let err = out.single().and_then(Token::as_error).unwrap();
    assert_eq!(err.kind, ErrorKind::NotDecomposable);
    assert_eq!(err.inputs.to_vec(), vec![Token::int(4)]);
}
