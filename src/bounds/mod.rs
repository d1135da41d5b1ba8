use serde::{Deserialize, Serialize};

/// Generic bounding box for N-dimensional space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox<const D: usize> {
    #[serde(with = "serde_arrays")]
    pub min: [f64; D],
    #[serde(with = "serde_arrays")]
    pub max: [f64; D],
}

impl<const D: usize> BoundingBox<D> {
    pub fn new(min: [f64; D], max: [f64; D]) -> Self {
        Self { min, max }
    }

    /// Returns true if the box has a positive extent along every axis.
    pub fn is_valid(&self) -> bool {
        (0..D).all(|i| self.min[i].is_finite() && self.max[i].is_finite() && self.max[i] > self.min[i])
    }

    /// Extent along each axis.
    pub fn size(&self) -> [f64; D] {
        let mut s = [0.0; D];
        for i in 0..D {
            s[i] = self.max[i] - self.min[i];
        }
        s
    }

    /// The D-dimensional volume (area in 2D) of the box.
    pub fn volume(&self) -> f64 {
        self.size().iter().product()
    }

    pub fn centre(&self) -> [f64; D] {
        let mut c = [0.0; D];
        for i in 0..D {
            c[i] = 0.5 * (self.min[i] + self.max[i]);
        }
        c
    }

    /// Length of the main diagonal, used as the length scale of a diagram.
    pub fn diagonal(&self) -> f64 {
        self.size().iter().map(|s| s * s).sum::<f64>().sqrt()
    }

    /// Checks if a point lies inside the box grown by `slack` on every side.
    pub fn contains(&self, point: &[f64; D], slack: f64) -> bool {
        (0..D).all(|i| point[i] >= self.min[i] - slack && point[i] <= self.max[i] + slack)
    }

    /// The 2^D corners of the box, bit `i` of the corner index selecting max along axis `i`.
    pub fn corners(&self) -> Vec<[f64; D]> {
        (0..(1usize << D))
            .map(|mask| {
                let mut p = [0.0; D];
                for i in 0..D {
                    p[i] = if mask & (1 << i) != 0 { self.max[i] } else { self.min[i] };
                }
                p
            })
            .collect()
    }
}

// serde only derives arrays up to length 32 for concrete sizes, not for const generics.
mod serde_arrays {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer, const D: usize>(value: &[f64; D], serializer: S) -> Result<S::Ok, S::Error> {
        value.as_slice().serialize(serializer)
    }

    pub fn deserialize<'de, De: Deserializer<'de>, const D: usize>(deserializer: De) -> Result<[f64; D], De::Error> {
        let values = Vec::<f64>::deserialize(deserializer)?;
        values
            .try_into()
            .map_err(|v: Vec<f64>| De::Error::invalid_length(v.len(), &"an array matching the box dimension"))
    }
}
