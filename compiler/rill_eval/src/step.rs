//! Executable steps.
//!
//! Every expression compiles to a flat list of [`Step`]s run by a program
//! counter in an [`Frame`](crate::frame::Frame). After a step executes the
//! cursor advances by one; jumps add their distance before that advance, so
//! `Jump(0)` is a no-op and `Jump(n)` skips the next `n` steps.
//!
//! Steps are plain data. They describe what to do and are interpreted by the
//! evaluator against its current frame.

use crate::natives::NativeId;
use rill_ir::NodeId;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Step {
    /// Complete `node` from the values its children left on the stack.
    Finish(NodeId),
    /// Open a nested scope for the declarations of a block.
    Enter(NodeId),
    /// Bind the value on top of the stack to the bind's name, leaving it
    /// there as the bind's own value.
    Bind(NodeId),
    Jump(i32),
    /// Pop a boolean and jump when it is false.
    JumpUnless { node: NodeId, distance: i32 },
    /// Short-circuit a logical operator: when the boolean on top of the stack
    /// equals `when`, keep it as the result and jump; otherwise drop it.
    Branch {
        node: NodeId,
        when: bool,
        distance: i32,
    },
    /// Skip an input's default when the caller supplied the argument.
    SkipIfBound { input: NodeId, distance: i32 },
    /// Pop `arity` arguments and a callee, and start the callee's frame.
    Call { node: NodeId, arity: u32 },
    /// Build a structure instance from the inputs bound in the frame.
    Instantiate(NodeId),
    /// A child is missing from a partial tree; evaluation cannot proceed.
    Expected(NodeId),
    Native(NativeStep),
}

/// Steps that run a native operation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NativeStep {
    /// Compute the result in one step.
    Apply(NativeId),
    /// One phase of a higher-order loop.
    Loop(HigherOrder, LoopPhase),
}

/// Higher-order natives, implemented as step loops so each callee
/// invocation is its own observable frame.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum HigherOrder {
    Map,
    Filter,
    Fold,
}

/// The four steps of a higher-order loop, in sequence order.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LoopPhase {
    /// Validate inputs, bind the index and the identity result.
    Init,
    /// Exit when exhausted, otherwise call the callee on the next element.
    Next,
    /// Fold the callee's result in, advance the index, loop back.
    Collect,
    /// Push the accumulated result.
    Done,
}

impl HigherOrder {
    pub fn steps(self) -> [Step; 4] {
        [
            Step::Native(NativeStep::Loop(self, LoopPhase::Init)),
            Step::Native(NativeStep::Loop(self, LoopPhase::Next)),
            Step::Native(NativeStep::Loop(self, LoopPhase::Collect)),
            Step::Native(NativeStep::Loop(self, LoopPhase::Done)),
        ]
    }
}

impl Step {
    /// The node this step works on, if it names one.
    pub fn node(self) -> Option<NodeId> {
        match self {
            Step::Finish(node)
            | Step::Enter(node)
            | Step::Bind(node)
            | Step::JumpUnless { node, .. }
            | Step::Branch { node, .. }
            | Step::SkipIfBound { input: node, .. }
            | Step::Call { node, .. }
            | Step::Instantiate(node)
            | Step::Expected(node) => Some(node),
            Step::Jump(_) | Step::Native(_) => None,
        }
    }
}
