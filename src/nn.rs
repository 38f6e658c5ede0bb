use bon::bon;
use candle_core::{Error, Tensor};
use candle_nn::{self, Module, VarBuilder, linear};

mod embedding_bag;
mod pairwise_distance;
mod rnn_cell;

pub use embedding_bag::{EmbeddingBag, EmbeddingBagMode};
pub use pairwise_distance::{PairwiseDistance, pairwise_distance};
pub use rnn_cell::{NonLinearity, RNNCell};

/// A plain feed-forward stack of linear layers with a shared activation.
pub struct MLP {
    input_layer: candle_nn::Linear,
    hidden_layers: Vec<candle_nn::Linear>,
    output_layer: candle_nn::Linear,
    activation: Box<dyn Module>,
}

#[bon]
impl MLP {
    #[builder]
    pub fn new(
        input_size: usize,
        output_size: usize,
        vb: VarBuilder<'_>,
        #[builder(default = vec![64, 64])] hidden_layer_sizes: Vec<usize>,
        #[builder(default = Box::new(candle_nn::Activation::Relu))] activation: Box<dyn Module>,
        #[builder(default = "mlp".to_string())] name: String,
    ) -> Result<Self, Error> {
        let input_layer = linear(
            input_size,
            hidden_layer_sizes[0],
            vb.pp(format!("{name}_input_layer")),
        )?;
        let mut hidden_layers = Vec::new();
        for i in 0..hidden_layer_sizes.len() - 1 {
            hidden_layers.push(linear(
                hidden_layer_sizes[i],
                hidden_layer_sizes[i + 1],
                vb.pp(format!("{name}_hidden_layer_{i}")),
            )?);
        }
        let output_layer = linear(
            hidden_layer_sizes[hidden_layer_sizes.len() - 1],
            output_size,
            vb.pp(format!("{name}_output_layer")),
        )?;
        Ok(Self {
            input_layer,
            hidden_layers,
            output_layer,
            activation,
        })
    }
}

impl Module for MLP {
    fn forward(&self, xs: &Tensor) -> Result<Tensor, Error> {
        let mut x = self.input_layer.forward(xs)?;
        x = self.activation.forward(&x)?;
        for layer in &self.hidden_layers {
            x = layer.forward(&x)?;
            x = self.activation.forward(&x)?;
        }
        self.output_layer.forward(&x)
    }
}

#[cfg(test)]
mod tests {
    use candle_core::{DType, Device, Tensor};
    use candle_nn::{VarBuilder, VarMap};

    use super::*;

    #[test]
    fn forward_maps_batch_to_output_size() {
        let device = Device::Cpu;
        let vm = VarMap::new();
        let vb = VarBuilder::from_varmap(&vm, DType::F32, &device);
        let mlp = MLP::builder()
            .input_size(4)
            .output_size(2)
            .vb(vb)
            .hidden_layer_sizes(vec![8, 8])
            .build()
            .unwrap();

        let input = Tensor::rand(0.0f32, 1.0, &[5, 4], &device).unwrap();
        let output = mlp.forward(&input).unwrap();
        assert_eq!(output.dims(), &[5, 2]);
    }

    #[test]
    fn layers_register_their_vars() {
        let device = Device::Cpu;
        let vm = VarMap::new();
        let vb = VarBuilder::from_varmap(&vm, DType::F32, &device);
        let _mlp = MLP::builder()
            .input_size(4)
            .output_size(2)
            .vb(vb)
            .hidden_layer_sizes(vec![8])
            .build()
            .unwrap();

        // input + output layer, weight and bias each.
        assert_eq!(vm.all_vars().len(), 4);
    }
}
