use super::*;

#[test]
fn budget_allows_exactly_its_limit() {
    let mut budget = StepBudget::new(3);
    assert!(budget.charge().is_ok());
    assert!(budget.charge().is_ok());
    assert!(budget.charge().is_ok());
    assert_eq!(budget.charge(), Err(BudgetExceeded { limit: 3 }));
    assert_eq!(budget.used(), 3);
    assert_eq!(budget.remaining(), 0);
}

#[test]
fn zero_budget_refuses_immediately() {
    let mut budget = StepBudget::new(0);
    assert!(budget.charge().is_err());
    assert_eq!(budget.used(), 0);
}

#[test]
fn defaults_are_generous() {
    let config = EvalConfig::default();
    assert_eq!(config.step_limit, DEFAULT_STEP_LIMIT);
    assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
}
