// External Crate Imports
use derive_more::{Display, From, Into};
use tracing::debug;

// Local Crate Imports
use crate::{ChargeState, Correlation};

// Public API ==========================================================================================================

/// Groups selections that belong to the same analyte, so every charge state of it shares one number
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, From, Into)]
pub struct PeakNumber(u32);

impl PeakNumber {
    pub const FIRST: Self = Self(1);
    pub const UNMATCHED: Self = Self(0);

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Default for PeakNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct PeakSelection {
    pub peak_number: PeakNumber,
    pub mass: f64,
    pub charge: ChargeState,
}

/// The peaks selected so far in the current session. Starts empty at peak 1 and is only ever cleared explicitly.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Session {
    current_peak: PeakNumber,
    selections: Vec<PeakSelection>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes a session from previously stored selections, continuing from the highest peak number among them
    #[must_use]
    pub fn resume(selections: Vec<PeakSelection>) -> Self {
        let current_peak = selections
            .iter()
            .map(|s| s.peak_number)
            .max()
            .unwrap_or_default();
        Self {
            current_peak,
            selections,
        }
    }

    #[must_use]
    pub const fn current_peak(&self) -> PeakNumber {
        self.current_peak
    }

    pub fn next_peak(&mut self) -> PeakNumber {
        self.current_peak = self.current_peak.next();
        debug!("moved on to peak {}", self.current_peak);
        self.current_peak
    }

    /// Records a correlated peak under the current peak number
    pub fn select(&mut self, correlation: Correlation) -> PeakSelection {
        let Correlation { mz, charge } = correlation;
        self.push(mz, charge)
    }

    pub fn push(&mut self, mass: f64, charge: ChargeState) -> PeakSelection {
        let selection = PeakSelection {
            peak_number: self.current_peak,
            mass,
            charge,
        };
        debug!(
            "added m/z {mass} (charge {charge}) to peak {}",
            self.current_peak
        );
        self.selections.push(selection);
        selection
    }

    #[must_use]
    pub fn selections(&self) -> &[PeakSelection] {
        &self.selections
    }

    pub fn clear(&mut self) {
        self.selections.clear();
    }
}

// Unit Tests ==========================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_lifecycle() {
        let two = ChargeState::new(2).unwrap();
        let mut session = Session::new();
        assert!(session.selections().is_empty());
        assert_eq!(session.current_peak(), PeakNumber::FIRST);

        session.push(911.3, ChargeState::new(1).unwrap());
        session.select(Correlation {
            mz: 456.1712,
            charge: two,
        });
        assert_eq!(session.next_peak().get(), 2);
        let last = session.push(529.6834, two);

        assert_eq!(last.peak_number, PeakNumber::from(2));
        let peaks: Vec<_> = session
            .selections()
            .iter()
            .map(|s| (s.peak_number.get(), s.mass))
            .collect();
        assert_eq!(peaks, [(1, 911.3), (1, 456.1712), (2, 529.6834)]);

        // Clearing forgets selections, but not which peak we're on
        session.clear();
        assert!(session.selections().is_empty());
        assert_eq!(session.current_peak().get(), 2);
    }

    #[test]
    fn resume_a_session() {
        let one = ChargeState::new(1).unwrap();
        let stored = vec![
            PeakSelection {
                peak_number: PeakNumber::from(3),
                mass: 911.3,
                charge: one,
            },
            PeakSelection {
                peak_number: PeakNumber::from(1),
                mass: 1057.33,
                charge: one,
            },
        ];
        let mut session = Session::resume(stored.clone());
        assert_eq!(session.current_peak().get(), 3);
        assert_eq!(session.selections(), stored);
        assert_eq!(session.next_peak().to_string(), "4");

        assert_eq!(Session::resume(Vec::new()), Session::new());
    }
}
