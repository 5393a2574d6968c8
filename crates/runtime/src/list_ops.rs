//! Sequence algorithms
//!
//! Every operation here works on the elements of the current bundle.
//! Higher-order ones (`transform`, `all_of`, `any_of`, `on_args`) apply a
//! sub-pipeline per element; an element that is a group is handed to the
//! sub-pipeline as its contents, like any other bundle boundary.
//!
//! Positional access is tolerant: `get(-1)` or an index past the end yields
//! nothing rather than an error, unless `EngineConfig::strict_access` is set.

use crate::config::EngineConfig;
use crate::error::EvalError;
use crate::eval::{Evaluator, fail};
use crate::op::Op;
use tokflow_core::{Arity, Bundle, ErrorKind, Token};

/// Map: apply `f` to each element independently
///
/// Stack effect: ( e1 .. en -- f(e1) .. f(en) )
///
/// An element whose result is several tokens stays one group element until
/// the next bundle boundary or an explicit `flatten`.
pub(crate) fn transform(
    ev: &mut Evaluator<'_>,
    f: &Op,
    input: Bundle,
) -> Result<Bundle, EvalError> {
    let mut out = Vec::with_capacity(input.len());
    for element in input {
        out.push(ev.apply(f, Bundle::from(element))?.into_token());
    }
    Ok(Bundle::new(out))
}

/// Splice nested groups into one flat sequence
pub(crate) fn flatten(args: &[Token]) -> Bundle {
    fn splice(tokens: &[Token], out: &mut Vec<Token>) {
        for token in tokens {
            match token {
                Token::Group(inner) => splice(inner, out),
                other => out.push(other.clone()),
            }
        }
    }

    let mut out = Vec::with_capacity(args.len());
    splice(args, &mut out);
    Bundle::new(out)
}

/// The constituents of a single compound or list token
pub(crate) fn unwrap(args: &[Token]) -> Bundle {
    match args {
        [token] => match token.decompose() {
            Some(fields) => Bundle::new(fields.to_vec()),
            None => fail("unwrap", ErrorKind::NotDecomposable, args),
        },
        _ => fail("unwrap", ErrorKind::NotDecomposable, args),
    }
}

/// Constructor family: the compound tag, `ls` for lists, else the token itself
pub(crate) fn container(args: &[Token]) -> Bundle {
    match args {
        [Token::Compound(c)] => Bundle::from(Token::Sym(c.tag.clone())),
        [Token::List(_)] => Bundle::from(Token::sym("ls")),
        [token] => Bundle::from(token.clone()),
        _ => fail(
            "container",
            ErrorKind::wrong_arity(Arity::Exactly(1), args.len()),
            args,
        ),
    }
}

/// Run `ops` on the constituents of a single token, then rebuild it
///
/// Stack effect: ( C(a..) -- C(ops(a..)) )
pub(crate) fn on_args(
    ev: &mut Evaluator<'_>,
    ops: &Op,
    args: &[Token],
) -> Result<Bundle, EvalError> {
    let [token] = args else {
        return Ok(fail("on_args", ErrorKind::NotDecomposable, args));
    };
    let Some(fields) = token.decompose() else {
        return Ok(fail("on_args", ErrorKind::NotDecomposable, args));
    };

    let result = ev.apply(ops, Bundle::new(fields.to_vec()))?;
    if let Some(error) = result.first_error() {
        return Ok(Bundle::from(error.clone()));
    }
    Ok(token
        .rebuild(result.into_vec())
        .map(Bundle::from)
        .unwrap_or_else(|| fail("on_args", ErrorKind::NotDecomposable, args)))
}

/// `[0, 1, .., n-1]`
fn seq(n: usize) -> Vec<Token> {
    (0..n as i64).map(Token::Int).collect()
}

pub(crate) fn mkseq(args: &[Token]) -> Bundle {
    match args {
        [Token::Int(n)] if *n >= 0 => Bundle::new(seq(*n as usize)),
        _ => fail("mkseq", ErrorKind::NotANonNegativeInteger, args),
    }
}

/// Pair two same-family sequences index by index
pub(crate) fn zip(args: &[Token]) -> Bundle {
    let [a, b] = args else {
        return fail(
            "zip",
            ErrorKind::wrong_arity(Arity::Exactly(2), args.len()),
            args,
        );
    };
    let (Some(left), Some(right)) = (a.decompose(), b.decompose()) else {
        return fail("zip", ErrorKind::NotDecomposable, args);
    };
    if !a.same_family(b) || left.len() != right.len() {
        return fail("zip", ErrorKind::LengthMismatch, args);
    }
    left.iter()
        .zip(right)
        .map(|(x, y)| Token::list([x.clone(), y.clone()]))
        .collect()
}

/// Pair each element with its position: `[i, e]`
pub(crate) fn zip_index(input: Bundle) -> Bundle {
    seq(input.len())
        .into_iter()
        .zip(input)
        .map(|(i, e)| Token::list([i, e]))
        .collect()
}

fn as_pair(token: &Token) -> Option<(&Token, &Token)> {
    match token.decompose()? {
        [a, b] => Some((a, b)),
        _ => None,
    }
}

/// Pairs to two lists: firsts, then seconds
pub(crate) fn unzip(args: &[Token]) -> Bundle {
    let pairs: Option<Vec<_>> = args.iter().map(as_pair).collect();
    let consistent = args.windows(2).all(|w| w[0].same_family(&w[1]));
    match pairs {
        Some(pairs) if consistent => {
            let firsts = pairs.iter().map(|(a, _)| (*a).clone());
            let seconds = pairs.iter().map(|(_, b)| (*b).clone());
            Bundle::new(vec![Token::list(firsts), Token::list(seconds)])
        }
        _ => fail("unzip", ErrorKind::InvalidOperands, args),
    }
}

/// Drop the positions added by `zip_index`
pub(crate) fn unzip_index(args: &[Token]) -> Bundle {
    let elements: Option<Vec<Token>> = args
        .iter()
        .map(|token| match as_pair(token)? {
            (Token::Int(_), element) => Some(element.clone()),
            _ => None,
        })
        .collect();
    match elements {
        Some(elements) => Bundle::new(elements),
        None => fail("unzip_index", ErrorKind::InvalidOperands, args),
    }
}

fn out_of_range(config: &EngineConfig, op: &str, args: &[Token]) -> Bundle {
    if config.strict_access {
        fail(op, ErrorKind::IndexOutOfRange, args)
    } else {
        Bundle::nothing()
    }
}

/// Element at `index`, or nothing when out of range
pub(crate) fn get(config: &EngineConfig, index: i64, args: &[Token]) -> Bundle {
    match usize::try_from(index).ok().and_then(|i| args.get(i)) {
        Some(token) => Bundle::from(token.clone()),
        None => out_of_range(config, "get", args),
    }
}

pub(crate) fn last(config: &EngineConfig, args: &[Token]) -> Bundle {
    match args.last() {
        Some(token) => Bundle::from(token.clone()),
        None => out_of_range(config, "last", args),
    }
}

/// Cartesian product of two groups, second group varying fastest
///
/// Stack effect: ( [a1 .. am] [b1 .. bn] -- [a1 b1] [a1 b2] .. [am bn] )
///
/// A token that is not a list or group counts as a group of one.
pub(crate) fn product(args: &[Token]) -> Bundle {
    fn elements(token: &Token) -> &[Token] {
        match token {
            Token::List(items) | Token::Group(items) => items,
            other => std::slice::from_ref(other),
        }
    }

    let [a, b] = args else {
        return fail(
            "product",
            ErrorKind::wrong_arity(Arity::Exactly(2), args.len()),
            args,
        );
    };
    let (left, right) = (elements(a), elements(b));
    let mut out = Vec::with_capacity(left.len() * right.len());
    for x in left {
        for y in right {
            out.push(Token::list([x.clone(), y.clone()]));
        }
    }
    Bundle::new(out)
}

/// Cyclic shift left by `k mod n`; negative `k` shifts right
pub(crate) fn rotate(k: i64, input: Bundle) -> Bundle {
    let mut tokens = input.into_vec();
    if tokens.is_empty() {
        return Bundle::nothing();
    }
    let shift = k.rem_euclid(tokens.len() as i64) as usize;
    tokens.rotate_left(shift);
    Bundle::new(tokens)
}

pub(crate) fn all_of(
    ev: &mut Evaluator<'_>,
    pred: &Op,
    args: &[Token],
) -> Result<Bundle, EvalError> {
    quantify(ev, "all_of", pred, args, true)
}

pub(crate) fn any_of(
    ev: &mut Evaluator<'_>,
    pred: &Op,
    args: &[Token],
) -> Result<Bundle, EvalError> {
    quantify(ev, "any_of", pred, args, false)
}

// Stops at the first element whose verdict differs from `all`, which
// decides the answer. Predicate errors propagate.
fn quantify(
    ev: &mut Evaluator<'_>,
    name: &str,
    pred: &Op,
    args: &[Token],
    all: bool,
) -> Result<Bundle, EvalError> {
    for element in args {
        match ev.predicate(name, pred, Bundle::from(element.clone()))? {
            Ok(verdict) if verdict != all => return Ok(Bundle::from(Token::Bool(!all))),
            Ok(_) => {}
            Err(error) => return Ok(Bundle::from(error)),
        }
    }
    Ok(Bundle::from(Token::Bool(all)))
}
