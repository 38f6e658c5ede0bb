use bon::bon;
use candle_core::{DType, Error, Tensor};
use candle_nn::VarBuilder;
use candle_nn::init::Init;

/// How the looked-up rows of a bag are reduced to a single vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBagMode {
    Sum,
    Mean,
    Max,
}

/// A lookup table that maps bags of indices straight to reduced embedding
/// vectors, without materializing the per-index embeddings for the caller.
///
/// Bags are described either by a 1-d index tensor plus `offsets` marking
/// where each bag starts, or by a 2-d index tensor where every row is one
/// bag.
pub struct EmbeddingBag {
    weight: Tensor,
    mode: EmbeddingBagMode,
}

#[bon]
impl EmbeddingBag {
    #[builder]
    pub fn new(
        num_embeddings: usize,
        embedding_dim: usize,
        vb: VarBuilder<'_>,
        #[builder(default = EmbeddingBagMode::Mean)] mode: EmbeddingBagMode,
    ) -> Result<Self, Error> {
        let weight = vb.get_with_hints(
            (num_embeddings, embedding_dim),
            "weight",
            Init::Randn {
                mean: 0.0,
                stdev: 1.0,
            },
        )?;
        Ok(Self { weight, mode })
    }
}

impl EmbeddingBag {
    /// Wraps an existing `[num_embeddings, embedding_dim]` matrix instead of
    /// a freshly initialized one.
    pub fn from_pretrained(weight: Tensor, mode: EmbeddingBagMode) -> Result<Self, Error> {
        weight.dims2()?;
        Ok(Self { weight, mode })
    }

    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    /// Looks up and reduces each bag, returning `[num_bags, embedding_dim]`.
    ///
    /// `input` must be integral. A 1-d `input` needs `offsets`; a 2-d
    /// `input` must come without them. `per_sample_weights` scales each
    /// looked-up row before the reduction and only applies to
    /// [`EmbeddingBagMode::Sum`].
    pub fn forward(
        &self,
        input: &Tensor,
        offsets: Option<&Tensor>,
        per_sample_weights: Option<&Tensor>,
    ) -> Result<Tensor, Error> {
        if !matches!(input.dtype(), DType::U8 | DType::U32 | DType::I64) {
            candle_core::bail!(
                "embedding bag input must be an integral tensor, got {:?}",
                input.dtype()
            );
        }
        if per_sample_weights.is_some() && self.mode != EmbeddingBagMode::Sum {
            candle_core::bail!("per-sample weights only apply to the sum reduction");
        }

        match (input.rank(), offsets) {
            (1, Some(offsets)) => self.forward_ragged(input, offsets, per_sample_weights),
            (1, None) => candle_core::bail!("offsets are required for a 1-d input"),
            (2, None) => self.forward_rows(input, per_sample_weights),
            (2, Some(_)) => candle_core::bail!("offsets must be absent for a 2-d input"),
            (rank, _) => candle_core::bail!("embedding bag input must be 1-d or 2-d, got rank {rank}"),
        }
    }

    // Bag i spans offsets[i]..offsets[i+1]; the last bag runs to the end.
    fn forward_ragged(
        &self,
        input: &Tensor,
        offsets: &Tensor,
        per_sample_weights: Option<&Tensor>,
    ) -> Result<Tensor, Error> {
        if offsets.rank() != 1 {
            candle_core::bail!("offsets must be a 1-d tensor, got rank {}", offsets.rank());
        }
        let rows = self.lookup(input, per_sample_weights)?;
        let num_rows = rows.dim(0)?;
        let offsets = offsets.to_dtype(DType::U32)?.to_vec1::<u32>()?;

        let mut bags = Vec::with_capacity(offsets.len());
        for (i, &start) in offsets.iter().enumerate() {
            let start = start as usize;
            let end = offsets.get(i + 1).map_or(num_rows, |&end| end as usize);
            if start > end || end > num_rows {
                candle_core::bail!("offsets must increase monotonically and stay within the input");
            }
            bags.push(self.reduce(&rows.narrow(0, start, end - start)?)?);
        }
        Tensor::stack(&bags, 0)
    }

    // Every row of a 2-d input is one bag of equal length.
    fn forward_rows(
        &self,
        input: &Tensor,
        per_sample_weights: Option<&Tensor>,
    ) -> Result<Tensor, Error> {
        let (num_bags, bag_len) = input.dims2()?;
        let flat_weights = match per_sample_weights {
            Some(weights) => Some(weights.flatten_all()?),
            None => None,
        };
        let rows = self.lookup(&input.flatten_all()?, flat_weights.as_ref())?;
        let rows = rows.reshape((num_bags, bag_len, ()))?;
        match self.mode {
            EmbeddingBagMode::Sum => rows.sum(1),
            EmbeddingBagMode::Mean => rows.mean(1),
            EmbeddingBagMode::Max => rows.max(1),
        }
    }

    fn lookup(&self, indices: &Tensor, weights: Option<&Tensor>) -> Result<Tensor, Error> {
        let rows = self.weight.index_select(&indices.to_dtype(DType::U32)?, 0)?;
        match weights {
            Some(weights) => rows.broadcast_mul(&weights.unsqueeze(1)?),
            None => Ok(rows),
        }
    }

    fn reduce(&self, bag: &Tensor) -> Result<Tensor, Error> {
        match self.mode {
            EmbeddingBagMode::Sum => bag.sum(0),
            EmbeddingBagMode::Mean => bag.mean(0),
            EmbeddingBagMode::Max => bag.max(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use candle_core::Device;

    use super::*;

    fn counting_weight(device: &Device) -> Tensor {
        // Row i is [i*3, i*3+1, i*3+2], so reductions are easy to read off.
        let values = (0..12).map(|v| v as f32).collect::<Vec<_>>();
        Tensor::from_vec(values, &[4, 3], device).unwrap()
    }

    #[test]
    fn ragged_bags_reduce_by_mean() {
        let device = Device::Cpu;
        let bag =
            EmbeddingBag::from_pretrained(counting_weight(&device), EmbeddingBagMode::Mean).unwrap();

        let input = Tensor::from_vec(vec![0u32, 1, 2, 3], &[4], &device).unwrap();
        let offsets = Tensor::from_vec(vec![0u32, 2], &[2], &device).unwrap();
        let output = bag.forward(&input, Some(&offsets), None).unwrap();

        // Bag 0 = rows {0, 1}, bag 1 = rows {2, 3}.
        let output = output.to_vec2::<f32>().unwrap();
        assert_eq!(output, vec![vec![1.5, 2.5, 3.5], vec![7.5, 8.5, 9.5]]);
    }

    #[test]
    fn row_bags_reduce_by_sum() {
        let device = Device::Cpu;
        let bag =
            EmbeddingBag::from_pretrained(counting_weight(&device), EmbeddingBagMode::Sum).unwrap();

        let input = Tensor::from_vec(vec![0u32, 1, 2, 3], &[2, 2], &device).unwrap();
        let output = bag.forward(&input, None, None).unwrap();

        let output = output.to_vec2::<f32>().unwrap();
        assert_eq!(output, vec![vec![3.0, 5.0, 7.0], vec![15.0, 17.0, 19.0]]);
    }

    #[test]
    fn max_takes_the_largest_row_elementwise() {
        let device = Device::Cpu;
        let bag =
            EmbeddingBag::from_pretrained(counting_weight(&device), EmbeddingBagMode::Max).unwrap();

        let input = Tensor::from_vec(vec![3u32, 0, 1, 2], &[4], &device).unwrap();
        let offsets = Tensor::from_vec(vec![0u32, 2], &[2], &device).unwrap();
        let output = bag.forward(&input, Some(&offsets), None).unwrap();

        let output = output.to_vec2::<f32>().unwrap();
        assert_eq!(output, vec![vec![9.0, 10.0, 11.0], vec![6.0, 7.0, 8.0]]);
    }

    #[test]
    fn per_sample_weights_scale_a_sum() {
        let device = Device::Cpu;
        let bag =
            EmbeddingBag::from_pretrained(counting_weight(&device), EmbeddingBagMode::Sum).unwrap();

        let input = Tensor::from_vec(vec![0u32, 1], &[2], &device).unwrap();
        let offsets = Tensor::from_vec(vec![0u32], &[1], &device).unwrap();
        let weights = Tensor::from_vec(vec![1.0f32, 2.0], &[2], &device).unwrap();
        let output = bag.forward(&input, Some(&offsets), Some(&weights)).unwrap();

        // 1 * [0, 1, 2] + 2 * [3, 4, 5]
        let output = output.to_vec2::<f32>().unwrap();
        assert_eq!(output, vec![vec![6.0, 9.0, 12.0]]);
    }

    #[test]
    fn argument_shapes_are_validated() {
        let device = Device::Cpu;
        let bag =
            EmbeddingBag::from_pretrained(counting_weight(&device), EmbeddingBagMode::Mean).unwrap();

        let flat = Tensor::from_vec(vec![0u32, 1], &[2], &device).unwrap();
        let square = Tensor::from_vec(vec![0u32, 1, 2, 3], &[2, 2], &device).unwrap();
        let offsets = Tensor::from_vec(vec![0u32], &[1], &device).unwrap();
        let floats = Tensor::from_vec(vec![0.0f32, 1.0], &[2], &device).unwrap();

        assert!(bag.forward(&flat, None, None).is_err());
        assert!(bag.forward(&square, Some(&offsets), None).is_err());
        assert!(bag.forward(&floats, Some(&offsets), None).is_err());

        let weights = Tensor::from_vec(vec![1.0f32, 1.0], &[2], &device).unwrap();
        assert!(bag.forward(&flat, Some(&offsets), Some(&weights)).is_err());
    }
}
