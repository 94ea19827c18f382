use chrono::NaiveDate;

/// Every calendar day from `.0` through `.1`, inclusive.
///
/// Used to lay a series onto a gap-free daily grid; an end before the start
/// yields nothing.
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct DateRange(pub NaiveDate, pub NaiveDate);

impl DateRange {
    pub fn num_days(&self) -> usize {
        usize::try_from((self.1 - self.0).num_days() + 1).unwrap_or(0)
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.0 > self.1 {
            return None;
        }
        let current = self.0;
        match current.succ_opt() {
            Some(next) => self.0 = next,
            // last representable date: make the range empty
            None => self.1 = current.pred_opt().unwrap_or(current),
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.num_days();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DateRange {}
