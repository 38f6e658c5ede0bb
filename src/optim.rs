use candle_nn::Optimizer;

/// Anything that exposes a mutable scalar learning rate.
///
/// Schedulers only ever talk to this capability, never to a concrete
/// optimizer, so a schedule can drive anything that keeps a learning rate.
/// Every [`candle_nn::Optimizer`] qualifies through the blanket impl below;
/// custom controllers should come in the same way, by implementing
/// `candle_nn::Optimizer`.
pub trait LearningRateController {
    /// The current learning rate.
    fn learning_rate(&self) -> f64;
    /// Overwrites the current learning rate.
    fn set_learning_rate(&mut self, lr: f64);
}

impl<O: Optimizer> LearningRateController for O {
    fn learning_rate(&self) -> f64 {
        Optimizer::learning_rate(self)
    }

    fn set_learning_rate(&mut self, lr: f64) {
        Optimizer::set_learning_rate(self, lr);
    }
}
