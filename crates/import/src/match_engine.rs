use remesa_core::{MatchResult, Money, ReconcileError, Record, RecordId};
use serde::Serialize;
use std::collections::HashSet;

/// Deposit ids already allocated during one reconciliation run.
#[derive(Debug, Default)]
pub(crate) struct UsageSet {
    used: HashSet<RecordId>,
}

impl UsageSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn contains(&self, id: &RecordId) -> bool {
        self.used.contains(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.used.len()
    }

    /// Marks every deposit as spent. Fails without modifying the set if any
    /// of them is already spent or repeats within `deposits`.
    fn commit(&mut self, deposits: &[&Record]) -> Result<(), ReconcileError> {
        let mut fresh = HashSet::with_capacity(deposits.len());
        for d in deposits {
            if self.used.contains(&d.id) || !fresh.insert(&d.id) {
                return Err(ReconcileError::DepositReused(d.id.clone()));
            }
        }
        self.used.extend(deposits.iter().map(|d| d.id.clone()));
        Ok(())
    }
}

/// Pairs each payment with deposits that add up to it exactly.
///
/// Payments are settled in input order. For each one the engine takes the
/// deposits not yet spent and dated on or after the payment, sorts them by
/// date text then amount, and returns the first subset found by a depth-first
/// search in that order. A deposit funds at most one payment per run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Produces one result per payment, in payment order. A payment with no
    /// exact subset is reported as unmatched, not as an error.
    pub fn reconcile(
        &self,
        deposits: &[Record],
        payments: &[Record],
    ) -> Result<Vec<MatchResult>, ReconcileError> {
        ensure_non_negative(deposits)?;
        ensure_non_negative(payments)?;

        let mut usage = UsageSet::new();
        let mut results = Vec::with_capacity(payments.len());

        for payment in payments {
            results.push(self.settle(payment, deposits, &mut usage)?);
        }

        let matched = results.iter().filter(|r| r.is_matched()).count();
        tracing::info!(
            payments = payments.len(),
            matched,
            unmatched = payments.len() - matched,
            deposits_used = usage.len(),
            "reconciliation finished"
        );

        Ok(results)
    }

    fn settle(
        &self,
        payment: &Record,
        deposits: &[Record],
        usage: &mut UsageSet,
    ) -> Result<MatchResult, ReconcileError> {
        let mut eligible: Vec<&Record> = deposits
            .iter()
            .filter(|d| d.date_value >= payment.date_value && !usage.contains(&d.id))
            .collect();

        eligible.sort_by(|a, b| a.date.cmp(&b.date).then(a.amount.cmp(&b.amount)));

        let Some(found) = find_deposits(&eligible, payment.amount) else {
            tracing::debug!(payment = %payment.id, amount = %payment.amount, eligible = eligible.len(), "no exact subset");
            return Ok(MatchResult::unmatched(payment.clone()));
        };

        usage.commit(&found)?;
        tracing::debug!(
            payment = %payment.id,
            amount = %payment.amount,
            deposits = found.len(),
            "payment matched"
        );

        Ok(MatchResult::matched(
            payment.clone(),
            found.into_iter().cloned().collect(),
        ))
    }
}

fn ensure_non_negative(records: &[Record]) -> Result<(), ReconcileError> {
    match records.iter().find(|r| r.amount.is_negative()) {
        Some(r) => Err(ReconcileError::NegativeAmount {
            id: r.id.clone(),
            amount: r.amount,
        }),
        None => Ok(()),
    }
}

/// First subset of `candidates`, in depth-first order with lower indices
/// tried first, whose amounts sum exactly to `target`. A zero target is met by
/// the empty subset. Amounts must be non-negative.
pub fn find_deposits<'a>(candidates: &[&'a Record], target: Money) -> Option<Vec<&'a Record>> {
    let mut current = Vec::new();
    backtrack(candidates, target, 0, Money::zero(), &mut current).then_some(current)
}

fn backtrack<'a>(
    candidates: &[&'a Record],
    target: Money,
    start: usize,
    sum: Money,
    current: &mut Vec<&'a Record>,
) -> bool {
    if sum == target {
        return true;
    }
    if sum > target {
        return false;
    }

    for i in start..candidates.len() {
        let d = candidates[i];
        // Overflow means the sum is past any representable target.
        let Some(next) = sum.checked_add(d.amount) else {
            continue;
        };

        current.push(d);
        if backtrack(candidates, target, i + 1, next, current) {
            return true;
        }
        current.pop();
    }

    false
}

/// Counts describing one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub payments: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub deposits_used: usize,
    pub deposits_left: usize,
}

pub fn summarize(results: &[MatchResult], deposit_count: usize) -> ReconcileSummary {
    let matched = results.iter().filter(|r| r.is_matched()).count();
    let deposits_used = results.iter().map(|r| r.deposits().len()).sum();
    ReconcileSummary {
        payments: results.len(),
        matched,
        unmatched: results.len() - matched,
        deposits_used,
        deposits_left: deposit_count.saturating_sub(deposits_used),
    }
}
