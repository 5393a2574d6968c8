//! Evaluation engine
//!
//! Evaluation is eager and single-threaded: applying an operation to a
//! bundle is a plain function call, nested operations are nested calls.
//! The only state is the current nesting depth, which is bounded by
//! `EngineConfig::max_depth`; running past it aborts the evaluation with
//! `EvalError::DepthExceeded` instead of overflowing the native stack.
//!
//! # Pipe
//!
//! A pipe is a left fold over its stages with "apply the next stage to the
//! current bundle" as the step. After every stage the bundle is checked
//! for error tokens: the first one found becomes the whole result and the
//! remaining stages are skipped.
//!
//! # Fork
//!
//! Every branch sees its own copy of the input (bundles are cheap to clone,
//! tokens are `Arc`-shared) and the outputs are concatenated in branch
//! order. A fork does not collapse errors itself; the surrounding pipe does.

use crate::arithmetic;
use crate::config::EngineConfig;
use crate::cond;
use crate::error::EvalError;
use crate::list_ops;
use crate::op::Op;
use crate::sort;
use std::ops::ControlFlow;
use tokflow_core::{Arity, Bundle, ErrorKind, ErrorToken, Token};
use tracing::{debug, trace, warn};

/// Bundle holding a single error token
pub(crate) fn fail(op: &str, kind: ErrorKind, inputs: &[Token]) -> Bundle {
    Bundle::from(Token::from(ErrorToken::new(op, kind).with_inputs(inputs)))
}

/// Generic left fold with early exit.
///
/// `acc₀ = seed; accᵢ = step(accᵢ₋₁, itemᵢ)`. A step may stop the fold by
/// returning `ControlFlow::Break` with the final value.
pub fn fold_left<A, T, E, I, F>(seed: A, items: I, mut step: F) -> Result<A, E>
where
    I: IntoIterator<Item = T>,
    F: FnMut(A, T) -> Result<ControlFlow<A, A>, E>,
{
    let mut acc = seed;
    for item in items {
        match step(acc, item)? {
            ControlFlow::Continue(next) => acc = next,
            ControlFlow::Break(done) => return Ok(done),
        }
    }
    Ok(acc)
}

/// Runs operations against a configuration
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply `op` to the initial tokens
    pub fn run<I>(&self, op: &Op, tokens: I) -> Result<Bundle, EvalError>
    where
        I: IntoIterator<Item = Token>,
    {
        self.run_bundle(op, tokens.into_iter().collect())
    }

    pub fn run_bundle(&self, op: &Op, input: Bundle) -> Result<Bundle, EvalError> {
        Evaluator::new(&self.config).apply(op, input)
    }
}

/// Apply `op` to the initial tokens with the default configuration
pub fn run<I>(op: &Op, tokens: I) -> Result<Bundle, EvalError>
where
    I: IntoIterator<Item = Token>,
{
    Engine::new().run(op, tokens)
}

/// Per-evaluation state
pub(crate) struct Evaluator<'a> {
    config: &'a EngineConfig,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(config: &'a EngineConfig) -> Self {
        Self { config, depth: 0 }
    }

    pub(crate) fn config(&self) -> &EngineConfig {
        self.config
    }

    pub(crate) fn apply(&mut self, op: &Op, input: Bundle) -> Result<Bundle, EvalError> {
        if self.depth >= self.config.max_depth {
            warn!(
                "{}: evaluation depth limit of {} reached",
                op.name(),
                self.config.max_depth
            );
            return Err(EvalError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }

        self.depth += 1;
        trace!(op = op.name(), depth = self.depth, inputs = input.len(), "apply");
        let result = self.dispatch(op, input);
        self.depth -= 1;
        result
    }

    /// Evaluate a predicate and read back its boolean.
    ///
    /// The inner `Err` is the error token to report instead: an error
    /// already present in the input, the predicate's own error if it
    /// produced one, otherwise a "not a predicate" error on behalf of
    /// `caller`.
    pub(crate) fn predicate(
        &mut self,
        caller: &str,
        pred: &Op,
        input: Bundle,
    ) -> Result<Result<bool, Token>, EvalError> {
        if let Some(error) = input.first_error() {
            return Ok(Err(error.clone()));
        }
        let out = self.apply(pred, input)?;
        if let Some(error) = out.first_error() {
            return Ok(Err(error.clone()));
        }
        match out.single() {
            Some(Token::Bool(b)) => Ok(Ok(*b)),
            _ => Ok(Err(ErrorToken::new(caller, ErrorKind::NotAPredicate)
                .with_inputs(out.into_vec())
                .into())),
        }
    }

    fn dispatch(&mut self, op: &Op, input: Bundle) -> Result<Bundle, EvalError> {
        let args = input.as_slice();
        let out = match op {
            Op::Identity => input,
            Op::Input(tokens) => Bundle::new(tokens.to_vec()),
            Op::Pipe(stages) => return self.pipe(stages, input),
            Op::Fork(branches) => return self.fork(branches, input),
            Op::FoldLeft(step) => return self.fold(step, input),
            Op::Cond {
                pred,
                then,
                otherwise,
            } => return cond::cond(self, pred, then, otherwise, input),
            Op::Not(pred) => return cond::not(self, pred.as_deref(), input),
            Op::Is(expected) => cond::is(expected, &input),
            Op::Isnt(expected) => cond::isnt(expected, &input),
            Op::Same => cond::same(args),
            Op::Call => return cond::call(self, args),
            Op::Transform(f) => return list_ops::transform(self, f, input),
            Op::Listify => Bundle::from(Token::list(input)),
            Op::Unwrap => list_ops::unwrap(args),
            Op::Construct(tag) => Bundle::from(Token::compound(tag.clone(), input.into_vec())),
            Op::Container => list_ops::container(args),
            Op::OnArgs(ops) => return list_ops::on_args(self, ops, args),
            Op::Reverse => input.into_iter().rev().collect(),
            Op::Flatten => list_ops::flatten(args),
            Op::Length => Bundle::from(Token::int(args.len() as i64)),
            Op::MkSeq => list_ops::mkseq(args),
            Op::Zip => list_ops::zip(args),
            Op::ZipIndex => list_ops::zip_index(input),
            Op::Unzip => list_ops::unzip(args),
            Op::UnzipIndex => list_ops::unzip_index(args),
            Op::PushFront(tokens) => tokens.iter().cloned().chain(input).collect(),
            Op::PushBack(tokens) => input.into_iter().chain(tokens.iter().cloned()).collect(),
            Op::Get(index) => list_ops::get(self.config(), *index, args),
            Op::Last => list_ops::last(self.config(), args),
            Op::Product => list_ops::product(args),
            Op::Rotate(k) => list_ops::rotate(*k, input),
            Op::AllOf(pred) => return list_ops::all_of(self, pred, args),
            Op::AnyOf(pred) => return list_ops::any_of(self, pred, args),
            Op::IsZero => arithmetic::is_zero(args),
            Op::Sort(less) => return sort::sort(self, less, input),
            Op::PushOut(pred) => return sort::push_out(self, pred, input),
            Op::Arith { op, operand } => arithmetic::arith(*op, operand.as_ref(), args),
            Op::Gcd => arithmetic::gcd(args),
            Op::Lcm => arithmetic::lcm(args),
            Op::Custom(set) => set.dispatch(args),
        };
        Ok(out)
    }

    fn pipe(&mut self, stages: &[Op], input: Bundle) -> Result<Bundle, EvalError> {
        fold_left(input, stages.iter().enumerate(), |bundle, (i, stage)| -> Result<_, EvalError> {
            let next = self.apply(stage, bundle)?;
            match next.first_error() {
                Some(error) => {
                    let skipped = stages.len() - i - 1;
                    if skipped > 0 {
                        debug!(
                            "pipe: error at stage {} ({}), skipping {} stage(s)",
                            i,
                            stage.name(),
                            skipped
                        );
                    }
                    Ok(ControlFlow::Break(Bundle::from(error.clone())))
                }
                None => Ok(ControlFlow::Continue(next)),
            }
        })
    }

    fn fork(&mut self, branches: &[Op], input: Bundle) -> Result<Bundle, EvalError> {
        let mut out = Vec::new();
        for branch in branches {
            out.extend(self.apply(branch, input.clone())?);
        }
        Ok(Bundle::new(out))
    }

    /// Fold a binary step over the elements, seeded with the first one
    fn fold(&mut self, step: &Op, input: Bundle) -> Result<Bundle, EvalError> {
        let mut elements = input.into_iter();
        let Some(seed) = elements.next() else {
            return Ok(fail(
                "fold_left",
                ErrorKind::wrong_arity(Arity::AtLeast(1), 0),
                &[],
            ));
        };

        let acc = fold_left(seed, elements, |acc, element| -> Result<_, EvalError> {
            let next = self.apply(step, Bundle::new(vec![acc, element]))?;
            Ok(match next.first_error() {
                Some(error) => ControlFlow::Break(error.clone()),
                None => ControlFlow::Continue(next.into_token()),
            })
        })?;
        Ok(Bundle::from(acc))
    }
}
