//! Chain resolution and windowed rewrites.
//!
//! [`Optimizer::plan`] prepends the implicit root, resolves every call
//! against the grammar (all argument and chain errors surface here, before
//! any I/O), then runs each [`RewriteRule`] over the resolved list. Rules
//! only swap planned steps for equivalent ones; the executor never needs to
//! know a rule exists.

use std::fmt;

use serde_json::Value;

use crate::{
    diagnostics::{require, warn},
    errors::{ErrorCode, Result},
    grammar::{self, ResultType},
    graph::keys::LABEL_KEY,
    pattern::is_valid_token,
    steps::{IdSelector, Step},
    traversal::{OpCall, render_call},
};

#[derive(Clone, Debug, PartialEq)]
pub struct PlannedStep {
    pub name: &'static str,
    pub args: Vec<Value>,
    pub input: ResultType,
    pub output: ResultType,
    pub step: Step,
}

impl PlannedStep {
    fn root() -> Self {
        Self {
            name: "Graph",
            args: Vec::new(),
            input: ResultType::Graph,
            output: ResultType::Graph,
            step: Step::Root,
        }
    }
}

impl fmt::Display for PlannedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_call(self.name, &self.args))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    steps: Vec<PlannedStep>,
}

impl Plan {
    pub fn steps(&self) -> &[PlannedStep] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<PlannedStep> {
        self.steps
    }

    pub fn output(&self) -> ResultType {
        self.steps
            .last()
            .map(|step| step.output)
            .unwrap_or(ResultType::Graph)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, step) in self.steps.iter().enumerate() {
            if idx > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

pub trait RewriteRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn window(&self) -> usize;

    /// Replacement for `window` (exactly [`RewriteRule::window`] steps long),
    /// or `None` to leave it alone. The replacement must end in the same
    /// result type as the window.
    fn rewrite(&self, window: &[PlannedStep]) -> Option<Vec<PlannedStep>>;
}

/// `V().has('label', X)` becomes one scan of the reverse label index
/// instead of a full vertex scan with a label read per vertex.
pub struct VertexLabelScan;

impl RewriteRule for VertexLabelScan {
    fn name(&self) -> &'static str {
        "vertex-label-scan"
    }

    fn window(&self) -> usize {
        2
    }

    fn rewrite(&self, window: &[PlannedStep]) -> Option<Vec<PlannedStep>> {
        let [first, second] = window else {
            return None;
        };
        if first.step != Step::Vertices(IdSelector::All) {
            return None;
        }
        let Step::Has {
            key,
            value: Value::String(label),
        } = &second.step
        else {
            return None;
        };
        if key != LABEL_KEY || !is_valid_token(label) {
            return None;
        }
        Some(vec![PlannedStep {
            name: "labelScan",
            args: vec![Value::String(label.clone())],
            input: first.input,
            output: second.output,
            step: Step::VerticesWithLabel {
                label: label.clone(),
            },
        }])
    }
}

pub struct Optimizer {
    rules: Vec<Box<dyn RewriteRule>>,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self {
            rules: vec![Box::new(VertexLabelScan)],
        }
    }
}

impl Optimizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_rewrites() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule<R: RewriteRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn plan(&self, calls: &[OpCall]) -> Result<Plan> {
        let resolved = resolve(calls)?;
        Ok(Plan {
            steps: self.apply_rules(resolved),
        })
    }

    fn apply_rules(&self, mut steps: Vec<PlannedStep>) -> Vec<PlannedStep> {
        for rule in &self.rules {
            let width = rule.window();
            if width == 0 {
                continue;
            }
            let mut idx = 0;
            while idx + width <= steps.len() {
                if let Some(replacement) = rule.rewrite(&steps[idx..idx + width]) {
                    let keeps_type = replacement.last().map(|step| step.output)
                        == steps.get(idx + width - 1).map(|step| step.output);
                    if keeps_type {
                        tracing::debug!(rule = rule.name(), position = idx, "rewrite applied");
                        steps.splice(idx..idx + width, replacement);
                    } else {
                        warn(
                            ErrorCode::WarnRewriteSkipped,
                            format!("rewrite rule '{}' changed the result type, skipped", rule.name()),
                        );
                    }
                }
                idx += 1;
            }
        }
        steps
    }
}

pub fn resolve(calls: &[OpCall]) -> Result<Vec<PlannedStep>> {
    require(
        !calls.is_empty(),
        ErrorCode::ChainEmpty,
        "traversal has no operations",
    )?;
    let mut steps = Vec::with_capacity(calls.len() + 1);
    steps.push(PlannedStep::root());
    let mut state = ResultType::Graph;
    for call in calls {
        let descriptor = grammar::resolve(state, call.name)?;
        let step = Step::from_call(call.name, state, &call.args)?;
        steps.push(PlannedStep {
            name: call.name.as_str(),
            args: call.args.clone(),
            input: state,
            output: descriptor.output,
            step,
        });
        state = descriptor.output;
    }
    tracing::debug!(steps = steps.len(), output = %state, "chain resolved");
    Ok(steps)
}
