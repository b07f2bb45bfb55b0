//! Evaluation limits.

/// Steps a single `run` may execute before failing with a step-limit
/// exception.
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;

/// Frames that may be active at once before a call fails with a
/// recursion-limit exception.
pub const DEFAULT_MAX_DEPTH: usize = 1_000;

/// Values each stream remembers.
pub const DEFAULT_HISTORY: usize = 256;

/// Limits applied to one evaluator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    pub step_limit: usize,
    pub max_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            step_limit: DEFAULT_STEP_LIMIT,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Per-run step counter.
#[derive(Debug)]
pub struct StepBudget {
    limit: usize,
    used: usize,
}

/// Returned when a run asks for more steps than its budget allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetExceeded {
    pub limit: usize,
}

impl StepBudget {
    pub fn new(limit: usize) -> Self {
        StepBudget { limit, used: 0 }
    }

    /// Account for one more step.
    #[inline]
    pub fn charge(&mut self) -> Result<(), BudgetExceeded> {
        if self.used >= self.limit {
            return Err(BudgetExceeded { limit: self.limit });
        }
        self.used += 1;
        Ok(())
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn remaining(&self) -> usize {
        self.limit - self.used
    }
}

#[cfg(test)]
mod tests;
