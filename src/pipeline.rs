//! Lazy pipeline executor.
//!
//! Execution seeds a single placeholder item and folds the plan into it. A
//! stream-transform step replaces the current sequence with its own; a
//! factory step is flat-mapped so each upstream item's results are spliced
//! in place, in order. Nothing runs until the returned stream is pulled.

use std::{iter, sync::Arc};

use serde_json::Value;

use crate::{
    diagnostics::invariant,
    errors::{ErrorCode, Result},
    grammar::StepShape,
    graph::RecordStore,
    optimizer::Plan,
    steps::{Step, Traverser, Traversers, failed},
};

#[derive(Clone)]
pub struct ExecutionContext {
    records: RecordStore,
}

impl ExecutionContext {
    pub fn new(records: RecordStore) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }
}

pub fn execute(ctx: &ExecutionContext, plan: Plan) -> Result<Traversers> {
    let steps = plan.into_steps();
    invariant(
        matches!(steps.first().map(|planned| &planned.step), Some(Step::Root)),
        ErrorCode::InvariantPlanMissingRoot,
        "plan does not start with the root step",
    )?;

    let mut current: Traversers = Box::new(iter::once(Ok(Traverser::Graph)));
    for planned in steps {
        let step = Arc::new(planned.step);
        current = match step.shape() {
            StepShape::StreamTransform => step.transform(&ctx.records, current),
            StepShape::Factory => {
                let records = ctx.records.clone();
                Box::new(current.flat_map(move |item| match item {
                    Ok(parent) => step.expand(&records, parent),
                    Err(err) => failed(err),
                }))
            }
        };
    }
    Ok(current)
}

pub struct TraversalStream {
    inner: Traversers,
}

impl TraversalStream {
    pub fn new(inner: Traversers) -> Self {
        Self { inner }
    }
}

impl Iterator for TraversalStream {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|item| item.map(Traverser::into_value))
    }
}
