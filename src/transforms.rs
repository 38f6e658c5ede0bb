use candle_core::{Error, Tensor};

/// A tensor-to-tensor preprocessing step.
pub trait Transform {
    fn forward(&self, input: &Tensor) -> Result<Tensor, Error>;
}

impl<F> Transform for F
where
    F: Fn(&Tensor) -> Result<Tensor, Error>,
{
    fn forward(&self, input: &Tensor) -> Result<Tensor, Error> {
        self(input)
    }
}

/// Applies a list of transforms in order.
pub struct Compose {
    transforms: Vec<Box<dyn Transform>>,
}

impl Compose {
    pub fn new(transforms: Vec<Box<dyn Transform>>) -> Self {
        Self { transforms }
    }
}

impl Transform for Compose {
    fn forward(&self, input: &Tensor) -> Result<Tensor, Error> {
        let mut x = input.clone();
        for transform in &self.transforms {
            x = transform.forward(&x)?;
        }
        Ok(x)
    }
}

/// Scales values down by a constant factor, e.g. `Normalize::new(255.0)` to
/// bring pixel values into [0, 1].
pub struct Normalize {
    scale: f64,
}

impl Normalize {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }
}

impl Transform for Normalize {
    fn forward(&self, input: &Tensor) -> Result<Tensor, Error> {
        input / self.scale
    }
}

/// Shifts and scales values to zero mean and unit variance under the given
/// statistics.
pub struct Standardize {
    mean: f64,
    std: f64,
}

impl Standardize {
    pub fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }
}

impl Transform for Standardize {
    fn forward(&self, input: &Tensor) -> Result<Tensor, Error> {
        (input - self.mean)? / self.std
    }
}
