use bon::bon;
use candle_core::{Error, Tensor};
use candle_nn::VarBuilder;
use candle_nn::init::Init;

use crate::tensor_operations::tanh;

/// The nonlinearity squashing an [`RNNCell`]'s pre-activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonLinearity {
    Tanh,
    Relu,
}

/// An Elman RNN cell: `h' = act(x W_ih^T + b_ih + h W_hh^T + b_hh)`.
///
/// Weights are initialized uniformly in ±1/sqrt(hidden_size).
pub struct RNNCell {
    weight_ih: Tensor,
    weight_hh: Tensor,
    bias_ih: Option<Tensor>,
    bias_hh: Option<Tensor>,
    nonlinearity: NonLinearity,
    hidden_size: usize,
}

#[bon]
impl RNNCell {
    #[builder]
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        vb: VarBuilder<'_>,
        #[builder(default = NonLinearity::Tanh)] nonlinearity: NonLinearity,
        #[builder(default = true)] bias: bool,
    ) -> Result<Self, Error> {
        let bound = 1.0 / (hidden_size as f64).sqrt();
        let init = Init::Uniform {
            lo: -bound,
            up: bound,
        };
        let weight_ih = vb.get_with_hints((hidden_size, input_size), "weight_ih", init)?;
        let weight_hh = vb.get_with_hints((hidden_size, hidden_size), "weight_hh", init)?;
        let (bias_ih, bias_hh) = if bias {
            (
                Some(vb.get_with_hints(hidden_size, "bias_ih", init)?),
                Some(vb.get_with_hints(hidden_size, "bias_hh", init)?),
            )
        } else {
            (None, None)
        };
        Ok(Self {
            weight_ih,
            weight_hh,
            bias_ih,
            bias_hh,
            nonlinearity,
            hidden_size,
        })
    }
}

impl RNNCell {
    /// Advances the hidden state by one timestep.
    ///
    /// `input` is `[batch, input_size]`, `h0` is `[batch, hidden_size]` and
    /// defaults to zeros when absent. Returns the next hidden state.
    pub fn forward(&self, input: &Tensor, h0: Option<&Tensor>) -> Result<Tensor, Error> {
        let (batch_size, _) = input.dims2()?;
        let hidden = match h0 {
            Some(h0) => h0.clone(),
            None => Tensor::zeros(
                (batch_size, self.hidden_size),
                input.dtype(),
                input.device(),
            )?,
        };

        let mut pre_activation =
            (input.matmul(&self.weight_ih.t()?)? + hidden.matmul(&self.weight_hh.t()?)?)?;
        if let Some(bias) = &self.bias_ih {
            pre_activation = pre_activation.broadcast_add(bias)?;
        }
        if let Some(bias) = &self.bias_hh {
            pre_activation = pre_activation.broadcast_add(bias)?;
        }

        match self.nonlinearity {
            NonLinearity::Tanh => tanh(&pre_activation),
            NonLinearity::Relu => pre_activation.relu(),
        }
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }
}
