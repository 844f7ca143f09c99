// Standard Library Imports
use std::fmt::{self, Display, Formatter};

// Local Crate Imports
use crate::{Error, Result};

// Public API ==========================================================================================================

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum ScanType {
    #[default]
    Centroid,
    Continuous,
}

impl Display for ScanType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Centroid => write!(f, "CENTROID"),
            Self::Continuous => write!(f, "CONTINUOUS"),
        }
    }
}

/// A single scan, as handed over by whatever decoded the raw file
#[derive(Clone, PartialEq, Debug)]
pub struct Spectrum {
    mz: Vec<f64>,
    intensity: Vec<f64>,
    scan_type: ScanType,
    retention_time: f64,
}

impl Spectrum {
    pub fn new(
        mz: Vec<f64>,
        intensity: Vec<f64>,
        scan_type: ScanType,
        retention_time: f64,
    ) -> Result<Self> {
        if mz.len() != intensity.len() {
            return Err(Error::LengthMismatch {
                mz: mz.len(),
                intensity: intensity.len(),
            });
        }

        // NOTE: Binary searches over `mz` are only correct if this holds
        if let Some(index) = mz.windows(2).position(|w| w[0] >= w[1]) {
            let index = index + 1;
            let value = mz[index];
            return Err(Error::Unsorted { index, value });
        }

        Ok(Self {
            mz,
            intensity,
            scan_type,
            retention_time,
        })
    }

    /// Reads a two-column (m/z, intensity) peak list. Blank lines and lines starting with `#` are skipped.
    pub fn from_peak_list(text: &str, scan_type: ScanType, retention_time: f64) -> Result<Self> {
        let mut mz = Vec::new();
        let mut intensity = Vec::new();
        for (line, text) in text.lines().enumerate() {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let peak_list_error = || Error::PeakList {
                line: line + 1,
                text: text.to_owned(),
            };
            let mut columns = trimmed.split_whitespace().map(str::parse::<f64>);
            let (Some(Ok(x)), Some(Ok(y)), None) = (columns.next(), columns.next(), columns.next())
            else {
                return Err(peak_list_error());
            };
            mz.push(x);
            intensity.push(y);
        }
        Self::new(mz, intensity, scan_type, retention_time)
    }

    #[must_use]
    pub fn mz(&self) -> &[f64] {
        &self.mz
    }

    #[must_use]
    pub fn intensity(&self) -> &[f64] {
        &self.intensity
    }

    #[must_use]
    pub const fn scan_type(&self) -> ScanType {
        self.scan_type
    }

    #[must_use]
    pub const fn retention_time(&self) -> f64 {
        self.retention_time
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mz.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.mz.iter().copied().zip(self.intensity.iter().copied())
    }

    /// The most intense point; the lowest m/z wins a tie
    #[must_use]
    pub fn base_peak(&self) -> Option<(f64, f64)> {
        self.points()
            .reduce(|best, point| if point.1 > best.1 { point } else { best })
    }
}

// Unit Tests ==========================================================================================================

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn new_spectrum() {
        let spectrum = Spectrum::new(
            vec![100.0, 100.5, 101.0],
            vec![5.0, 10.0, 2.0],
            ScanType::Centroid,
            12.5,
        )
        .unwrap();
        assert_eq!(spectrum.len(), 3);
        assert_eq!(spectrum.base_peak(), Some((100.5, 10.0)));
        assert_eq!(spectrum.retention_time(), 12.5);

        assert_eq!(
            Spectrum::new(vec![1.0, 2.0], vec![1.0], ScanType::Centroid, 0.0),
            Err(Error::LengthMismatch {
                mz: 2,
                intensity: 1
            })
        );
        assert_eq!(
            Spectrum::new(
                vec![1.0, 3.0, 3.0],
                vec![1.0; 3],
                ScanType::Continuous,
                0.0
            ),
            Err(Error::Unsorted {
                index: 2,
                value: 3.0
            })
        );
    }

    #[test]
    fn base_peak_ties() {
        let spectrum =
            Spectrum::new(vec![1.0, 2.0, 3.0], vec![7.0, 7.0, 1.0], ScanType::Centroid, 0.0).unwrap();
        assert_eq!(spectrum.base_peak(), Some((1.0, 7.0)));

        let empty = Spectrum::new(Vec::new(), Vec::new(), ScanType::Centroid, 0.0).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.base_peak(), None);
    }

    #[test]
    fn peak_list() {
        let text = indoc! {"
            # m/z   intensity
            911.30  1500
            911.80  700.5

            912.30  120
        "};
        let spectrum = Spectrum::from_peak_list(text, ScanType::Centroid, 3.0).unwrap();
        assert_eq!(spectrum.mz(), [911.30, 911.80, 912.30]);
        assert_eq!(spectrum.intensity(), [1500.0, 700.5, 120.0]);
        assert_eq!(spectrum.scan_type().to_string(), "CENTROID");

        assert_eq!(
            Spectrum::from_peak_list("1.0 2.0\n1.5\n", ScanType::Centroid, 0.0),
            Err(Error::PeakList {
                line: 2,
                text: "1.5".to_owned()
            })
        );
        assert!(Spectrum::from_peak_list("1.0 2.0 3.0", ScanType::Centroid, 0.0).is_err());
        assert!(Spectrum::from_peak_list("2.0 1.0\n1.0 1.0", ScanType::Centroid, 0.0).is_err());
    }
}
