//! Pivot-based sorting and de-duplication
//!
//! `sort` is a quicksort with the first element as pivot:
//!
//! ```text
//! sort(p, [pivot, rest..]) = sort(p, [x | p(x, pivot)]) ++ [pivot] ++ sort(p, [x | !p(x, pivot)])
//! ```
//!
//! Both partitions keep input order and elements equal to the pivot land
//! after it, so the sort is stable. The recursion is driven by an explicit
//! worklist, so long inputs do not deepen the native stack.
//!
//! `push_out` keeps the first element, drops everything after it that is
//! related to it, and repeats on what is left. With `same` as the relation
//! that is `unique`.

use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::op::Op;
use tokflow_core::{Bundle, Token};

enum Task {
    Sort(Vec<Token>),
    Emit(Token),
}

/// Stable sort by a binary "less than" predicate applied as `less(x, pivot)`
pub(crate) fn sort(ev: &mut Evaluator<'_>, less: &Op, input: Bundle) -> Result<Bundle, EvalError> {
    let mut out = Vec::with_capacity(input.len());
    let mut tasks = vec![Task::Sort(input.into_vec())];

    while let Some(task) = tasks.pop() {
        let items = match task {
            Task::Emit(token) => {
                out.push(token);
                continue;
            }
            Task::Sort(items) if items.len() <= 1 => {
                out.extend(items);
                continue;
            }
            Task::Sort(items) => items,
        };

        let mut items = items.into_iter();
        let Some(pivot) = items.next() else {
            continue;
        };
        let mut before = Vec::new();
        let mut after = Vec::new();
        for item in items {
            let args = Bundle::new(vec![item.clone(), pivot.clone()]);
            match ev.predicate("sort", less, args)? {
                Ok(true) => before.push(item),
                Ok(false) => after.push(item),
                Err(error) => return Ok(Bundle::from(error)),
            }
        }

        // Worklist is LIFO: push in reverse output order
        tasks.push(Task::Sort(after));
        tasks.push(Task::Emit(pivot));
        tasks.push(Task::Sort(before));
    }

    Ok(Bundle::new(out))
}

/// Keep each surviving element, dropping later ones related to it by `pred`
pub(crate) fn push_out(ev: &mut Evaluator<'_>, pred: &Op, input: Bundle) -> Result<Bundle, EvalError> {
    let mut out = Vec::new();
    let mut rest = input.into_vec();

    loop {
        let mut items = std::mem::take(&mut rest).into_iter();
        let Some(pivot) = items.next() else {
            break;
        };
        for item in items {
            let args = Bundle::new(vec![item.clone(), pivot.clone()]);
            match ev.predicate("push_out", pred, args)? {
                Ok(true) => {}
                Ok(false) => rest.push(item),
                Err(error) => return Ok(Bundle::from(error)),
            }
        }
        out.push(pivot);
    }

    Ok(Bundle::new(out))
}
