use super::tables::{Execution, OnFail, Operator, Returns, returns_options};
use crate::error::ConnectorViolation;

/// The four jointly-constrained settings describing how an activity runs its children.
///
/// `execution` constrains `returns` and `onfail`; `returns` constrains `operator`.
/// The setters keep that chain legal: `set_execution` coerces the dependent fields,
/// while `set_returns`, `set_operator` and `set_onfail` refuse values the upstream
/// field does not permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Connector {
    pub execution: Execution,
    pub returns: Returns,
    pub operator: Operator,
    pub onfail: OnFail,
}

impl Connector {
    pub fn new(execution: Execution, returns: Returns, operator: Operator, onfail: OnFail) -> Self {
        Self {
            execution,
            returns,
            operator,
            onfail,
        }
    }

    /// Changes the execution mode, coercing `returns`, `operator` and `onfail` to values
    /// still permitted under it. Values that remain legal are kept.
    ///
    /// Returns `true` if any dependent field had to change.
    pub fn set_execution(&mut self, execution: Execution) -> bool {
        let before = *self;
        self.execution = execution;

        if !self.returns.is_permitted_under(execution) {
            self.returns = returns_options(execution)
                .into_iter()
                .find(|r| self.operator.is_permitted_under(*r))
                .unwrap_or(Returns::None);
        }
        if !self.operator.is_permitted_under(self.returns) {
            self.operator = Operator::None;
        }
        if !self.onfail.is_permitted_under(execution) {
            self.onfail = OnFail::None;
        }

        (self.returns, self.operator, self.onfail) != (before.returns, before.operator, before.onfail)
    }

    /// Sets the returns mode if the current execution permits it. Clears an operator the
    /// new mode does not permit.
    pub fn set_returns(&mut self, returns: Returns) -> bool {
        if !returns.is_permitted_under(self.execution) {
            return false;
        }
        self.returns = returns;
        if !self.operator.is_permitted_under(returns) {
            self.operator = Operator::None;
        }
        true
    }

    pub fn set_operator(&mut self, operator: Operator) -> bool {
        if !operator.is_permitted_under(self.returns) {
            return false;
        }
        self.operator = operator;
        true
    }

    pub fn set_onfail(&mut self, onfail: OnFail) -> bool {
        if !onfail.is_permitted_under(self.execution) {
            return false;
        }
        self.onfail = onfail;
        true
    }

    /// Promotes a `NONE` operator to `AND`. If the returns mode cannot carry `AND`,
    /// it is lifted to `ALL` (or the first mode that permits `AND` under this execution).
    ///
    /// Returns `true` if anything changed.
    pub fn ensure_aggregating(&mut self) -> bool {
        if self.operator != Operator::None {
            return false;
        }
        if !Operator::And.is_permitted_under(self.returns) {
            let lifted = if Returns::All.is_permitted_under(self.execution) {
                Some(Returns::All)
            } else {
                returns_options(self.execution)
                    .into_iter()
                    .find(|r| Operator::And.is_permitted_under(*r))
            };
            if let Some(returns) = lifted {
                self.returns = returns;
            }
        }
        self.operator = Operator::And;
        true
    }

    /// Lists every broken link in the execution -> returns -> operator chain and the
    /// execution -> onfail link. Empty for a consistent connector.
    pub fn violations(&self) -> Vec<ConnectorViolation> {
        let mut violations = Vec::new();
        if !self.returns.is_permitted_under(self.execution) {
            violations.push(ConnectorViolation::Returns {
                returns: self.returns.name().to_string(),
                execution: self.execution.name().to_string(),
            });
        }
        if !self.operator.is_permitted_under(self.returns) {
            violations.push(ConnectorViolation::Operator {
                operator: self.operator.name().to_string(),
                returns: self.returns.name().to_string(),
            });
        }
        if !self.onfail.is_permitted_under(self.execution) {
            violations.push(ConnectorViolation::OnFail {
                onfail: self.onfail.name().to_string(),
                execution: self.execution.name().to_string(),
            });
        }
        violations
    }

    pub fn is_consistent(&self) -> bool {
        self.violations().is_empty()
    }
}
