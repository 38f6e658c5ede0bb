use bon::bon;
use candle_core::{D, Error, Tensor};

/// Batchwise p-norm distance `||x1 - x2 + eps||_p` along the last dimension.
///
/// `eps` keeps the norm differentiable when both inputs coincide.
pub struct PairwiseDistance {
    p: f64,
    eps: f64,
    keepdim: bool,
}

#[bon]
impl PairwiseDistance {
    #[builder]
    pub fn new(
        #[builder(default = 2.0)] p: f64,
        #[builder(default = 1e-6)] eps: f64,
        #[builder(default = false)] keepdim: bool,
    ) -> Self {
        Self { p, eps, keepdim }
    }
}

impl PairwiseDistance {
    pub fn forward(&self, x1: &Tensor, x2: &Tensor) -> Result<Tensor, Error> {
        let diff = ((x1 - x2)? + self.eps)?;
        let powered = diff.abs()?.powf(self.p)?;
        let summed = if self.keepdim {
            powered.sum_keepdim(D::Minus1)?
        } else {
            powered.sum(D::Minus1)?
        };
        summed.powf(1.0 / self.p)
    }
}

/// One-shot [`PairwiseDistance`] with the default settings (p = 2).
pub fn pairwise_distance(x1: &Tensor, x2: &Tensor) -> Result<Tensor, Error> {
    PairwiseDistance::builder().build().forward(x1, x2)
}

#[cfg(test)]
mod tests {
    use candle_core::Device;

    use super::*;

    #[test]
    fn euclidean_distance_on_rows() {
        let device = Device::Cpu;
        let x1 = Tensor::from_vec(vec![3.0f32, 4.0, 1.0, 0.0], &[2, 2], &device).unwrap();
        let x2 = Tensor::from_vec(vec![0.0f32, 0.0, 1.0, 0.0], &[2, 2], &device).unwrap();

        let distance = pairwise_distance(&x1, &x2).unwrap();
        let distance = distance.to_vec1::<f32>().unwrap();
        assert!((distance[0] - 5.0).abs() < 1e-4);
        assert!(distance[1] < 1e-4);
    }

    #[test]
    fn manhattan_distance_sums_absolute_differences() {
        let device = Device::Cpu;
        let x1 = Tensor::from_vec(vec![1.0f32, -2.0, 3.0], &[1, 3], &device).unwrap();
        let x2 = Tensor::from_vec(vec![0.0f32, 0.0, 0.0], &[1, 3], &device).unwrap();

        let distance = PairwiseDistance::builder()
            .p(1.0)
            .build()
            .forward(&x1, &x2)
            .unwrap();
        let distance = distance.to_vec1::<f32>().unwrap();
        assert!((distance[0] - 6.0).abs() < 1e-4);
    }

    #[test]
    fn keepdim_preserves_the_reduced_axis() {
        let device = Device::Cpu;
        let x1 = Tensor::rand(0.0f32, 1.0, &[4, 8], &device).unwrap();
        let x2 = Tensor::rand(0.0f32, 1.0, &[4, 8], &device).unwrap();

        let distance = PairwiseDistance::builder()
            .keepdim(true)
            .build()
            .forward(&x1, &x2)
            .unwrap();
        assert_eq!(distance.dims(), &[4, 1]);
    }
}
