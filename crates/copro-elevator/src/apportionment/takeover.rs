use crate::registry::UnitId;
use serde::{Deserialize, Serialize};

/// One owner voluntarily paying part of another unit's quote-part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeOver {
    pub payer: UnitId,
    pub beneficiary: UnitId,
    /// Share of the beneficiary's base quote-part, 1 to 100.
    pub percent: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TakeOverRejection {
    #[error("unit {0} cannot take over its own quote-part")]
    SelfTransfer(UnitId),
    #[error("take-over percentage must be between 1 and 100, got {0}")]
    PercentOutOfRange(u8),
    #[error("take-overs on unit {beneficiary} would reach {total}%")]
    OverAllocated { beneficiary: UnitId, total: u16 },
    #[error("unit {0} is not part of the apportionment")]
    UnknownUnit(UnitId),
}

/// Session-scoped working set of take-overs; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TakeOverPlan {
    take_overs: Vec<TakeOver>,
}

impl TakeOverPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a plan, skipping every take-over `add` would reject.
    pub fn from_requests(
        requests: impl IntoIterator<Item = TakeOver>,
    ) -> (Self, Vec<(TakeOver, TakeOverRejection)>) {
        let mut plan = Self::new();
        let mut rejected = Vec::new();
        for request in requests {
            if let Err(reason) = plan.add(request) {
                rejected.push((request, reason));
            }
        }
        (plan, rejected)
    }

    /// Adds a take-over; a rejected one leaves the plan untouched.
    pub fn add(&mut self, take_over: TakeOver) -> Result<(), TakeOverRejection> {
        if take_over.payer == take_over.beneficiary {
            return Err(TakeOverRejection::SelfTransfer(take_over.payer));
        }
        if !(1..=100).contains(&take_over.percent) {
            return Err(TakeOverRejection::PercentOutOfRange(take_over.percent));
        }

        let total = self.percent_taken_over(take_over.beneficiary) + u16::from(take_over.percent);
        if total > 100 {
            return Err(TakeOverRejection::OverAllocated {
                beneficiary: take_over.beneficiary,
                total,
            });
        }

        self.take_overs.push(take_over);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<TakeOver> {
        if index < self.take_overs.len() {
            Some(self.take_overs.remove(index))
        } else {
            None
        }
    }

    pub fn take_overs(&self) -> &[TakeOver] {
        &self.take_overs
    }

    pub fn is_empty(&self) -> bool {
        self.take_overs.is_empty()
    }

    pub fn percent_taken_over(&self, beneficiary: UnitId) -> u16 {
        self.take_overs
            .iter()
            .filter(|existing| existing.beneficiary == beneficiary)
            .map(|existing| u16::from(existing.percent))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn take_over(payer: u32, beneficiary: u32, percent: u8) -> TakeOver {
        TakeOver {
            payer: UnitId(payer),
            beneficiary: UnitId(beneficiary),
            percent,
        }
    }

    #[test]
    fn cumulative_percentage_is_capped_per_beneficiary() {
        let mut plan = TakeOverPlan::new();
        plan.add(take_over(27, 3, 60)).expect("first take-over fits");
        plan.add(take_over(14, 3, 40)).expect("second take-over fills up");

        let error = plan.add(take_over(11, 3, 1)).expect_err("over 100% rejected");
        assert_eq!(
            error,
            TakeOverRejection::OverAllocated {
                beneficiary: UnitId(3),
                total: 101
            }
        );
        assert_eq!(plan.take_overs().len(), 2);
        assert_eq!(plan.percent_taken_over(UnitId(3)), 100);
    }

    #[test]
    fn self_transfers_and_bad_percentages_are_rejected() {
        let mut plan = TakeOverPlan::new();
        assert_eq!(
            plan.add(take_over(5, 5, 10)),
            Err(TakeOverRejection::SelfTransfer(UnitId(5)))
        );
        assert_eq!(
            plan.add(take_over(5, 6, 0)),
            Err(TakeOverRejection::PercentOutOfRange(0))
        );
        assert_eq!(
            plan.add(take_over(5, 6, 101)),
            Err(TakeOverRejection::PercentOutOfRange(101))
        );
        assert!(plan.is_empty());
    }

    #[test]
    fn from_requests_reports_rejections_and_remove_frees_capacity() {
        let (mut plan, rejected) = TakeOverPlan::from_requests([
            take_over(1, 2, 80),
            take_over(3, 2, 30),
            take_over(4, 4, 10),
        ]);
        assert_eq!(plan.take_overs().len(), 1);
        assert_eq!(rejected.len(), 2);

        assert_eq!(plan.remove(0), Some(take_over(1, 2, 80)));
        assert_eq!(plan.remove(0), None);
        plan.add(take_over(3, 2, 30)).expect("capacity freed");
    }
}
