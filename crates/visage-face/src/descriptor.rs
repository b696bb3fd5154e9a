use std::fmt;
use std::str::FromStr;

use crate::error::DescriptorError;

/// Number of values in a face descriptor.
pub const DESCRIPTOR_LEN: usize = 128;

/// Fixed-length face embedding.
///
/// Always holds exactly [`DESCRIPTOR_LEN`] finite values. Serialized as a
/// comma-separated list of decimals, which is the form stored on the user
/// record and returned to clients.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceDescriptor(Vec<f32>);

impl FaceDescriptor {
    pub fn from_vec(values: Vec<f32>) -> Result<Self, DescriptorError> {
        if values.len() != DESCRIPTOR_LEN {
            return Err(DescriptorError::Length {
                expected: DESCRIPTOR_LEN,
                actual: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(DescriptorError::NotFinite { index });
        }
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &FaceDescriptor) -> f32 {
        distance(self, other)
    }
}

/// Euclidean distance between two descriptors.
pub fn distance(a: &FaceDescriptor, b: &FaceDescriptor) -> f32 {
    a.0.iter()
        .zip(&b.0)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

impl fmt::Display for FaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl FromStr for FaceDescriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .enumerate()
            .map(|(index, item)| {
                let item = item.trim();
                item.parse::<f32>()
                    .map_err(|_| DescriptorError::NotANumber {
                        index,
                        value: item.to_owned(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_vec(values)
    }
}

impl TryFrom<Vec<f32>> for FaceDescriptor {
    type Error = DescriptorError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        Self::from_vec(values)
    }
}

impl AsRef<[f32]> for FaceDescriptor {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}
