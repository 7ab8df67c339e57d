//! Nested execution: one action invoking others as sub-steps.
//!
//! Nested calls bypass pause/editor/permission gating and the funds check
//! (the parent already passed them) but never the child's own validation.
//! They run against the parent's state directly; the top-level working copy
//! is what makes a failed batch leave no trace.

use crate::action::{
    ActionContext, ActionResult, ActionTransition, NestedSummary, ResultPayload,
};
use crate::env::StringId;
use crate::finance::Money;
use crate::state::WorldState;

use super::transition::{drive_execute, drive_query};

/// Validates a child body under the parent's context.
pub fn query_nested<T: ActionTransition>(
    cx: &ActionContext<'_>,
    world: &WorldState,
    child: &T,
) -> ActionResult {
    drive_query(child, cx, world, false)
}

/// Validates and applies a child body under the parent's context.
///
/// The child's mutations are visible to the parent's later steps.
pub fn execute_nested<T: ActionTransition>(
    cx: &ActionContext<'_>,
    world: &mut WorldState,
    child: &T,
) -> ActionResult {
    drive_execute(child, cx, world, false)
}

/// Aggregates the results of a sequence of nested calls.
#[derive(Clone, Debug)]
pub struct NestedBatch {
    title: StringId,
    summary: NestedSummary,
    cost: Money,
}

impl NestedBatch {
    /// Starts a batch whose failures are reported under the parent's `title`.
    pub fn new(title: StringId) -> Self {
        Self {
            title,
            summary: NestedSummary::default(),
            cost: 0,
        }
    }

    /// Records a child result.
    ///
    /// # Errors
    ///
    /// Returns the parent's failure when the child failed: the child's status
    /// and detail under the parent's title, with the failing step recorded.
    pub fn record<T: ActionTransition>(&mut self, child: ActionResult) -> Result<(), ActionResult> {
        if child.is_ok() {
            self.summary.steps = self.summary.steps.saturating_add(1);
            self.cost = self.cost.saturating_add(child.cost);
            return Ok(());
        }

        let summary = NestedSummary {
            failed_step: Some(self.summary.steps),
            failed_kind: Some(T::KIND),
            ..self.summary
        };
        let detail = child.error_detail.unwrap_or(StringId::InternalError);
        Err(ActionResult::error(child.status, self.title, detail)
            .with_payload(ResultPayload::Nested(summary)))
    }

    /// Queries every child in order against the same state.
    ///
    /// # Errors
    ///
    /// Stops at the first refusal and returns it as the parent's failure.
    pub fn query_all<T: ActionTransition>(
        mut self,
        cx: &ActionContext<'_>,
        world: &WorldState,
        children: &[T],
    ) -> Result<Self, ActionResult> {
        for child in children {
            self.record::<T>(query_nested(cx, world, child))?;
        }
        Ok(self)
    }

    /// Executes every child in order; later children see earlier mutations.
    ///
    /// # Errors
    ///
    /// Stops at the first refusal. Steps already applied stay applied in
    /// `world`, which the top-level working copy then discards.
    pub fn execute_all<T: ActionTransition>(
        mut self,
        cx: &ActionContext<'_>,
        world: &mut WorldState,
        children: &[T],
    ) -> Result<Self, ActionResult> {
        for child in children {
            self.record::<T>(execute_nested(cx, world, child))?;
        }
        Ok(self)
    }

    /// Sum of the recorded child costs.
    pub fn cost(&self) -> Money {
        self.cost
    }

    pub fn steps(&self) -> u16 {
        self.summary.steps
    }

    /// Successful parent result carrying the summed cost.
    pub fn finish(self) -> ActionResult {
        ActionResult::ok()
            .with_cost(self.cost)
            .with_payload(ResultPayload::Nested(self.summary))
    }
}
