use bon::bon;

use super::LrScheduler;
use crate::optim::LearningRateController;

/// Decays the optimizer's learning rate by `gamma` on every epoch, until
/// `last_epoch` is reached.
///
/// Like [`super::StepLR`], an unbounded schedule (`last_epoch` = -1) writes
/// the learning rate captured at construction back to the optimizer on every
/// `step()`.
pub struct ExponentialLR<'a, C: LearningRateController> {
    optimizer: &'a mut C,
    initial_lr: f64,
    gamma: f64,
    last_epoch: i64,
    verbose: bool,
    epoch: usize,
}

#[bon]
impl<'a, C: LearningRateController> ExponentialLR<'a, C> {
    /// Binds an exponential decay schedule to `optimizer`, capturing its
    /// current learning rate as the initial value.
    #[builder]
    pub fn new(
        optimizer: &'a mut C,
        #[builder(default = 0.1)] gamma: f64,
        #[builder(default = -1)] last_epoch: i64,
        #[builder(default = false)] verbose: bool,
    ) -> Self {
        let initial_lr = optimizer.learning_rate();
        Self {
            optimizer,
            initial_lr,
            gamma,
            last_epoch,
            verbose,
            epoch: 0,
        }
    }
}

impl<'a, C: LearningRateController> ExponentialLR<'a, C> {
    pub fn optimizer(&self) -> &C {
        self.optimizer
    }

    pub fn optimizer_mut(&mut self) -> &mut C {
        self.optimizer
    }
}

impl<'a, C: LearningRateController> LrScheduler for ExponentialLR<'a, C> {
    fn step(&mut self) {
        self.epoch += 1;

        if self.last_epoch == -1 {
            self.optimizer.set_learning_rate(self.initial_lr);
            if self.verbose {
                log::info!("learning rate updated to: {}", self.initial_lr);
            }
        } else if self.epoch as i64 <= self.last_epoch {
            let lr = self.optimizer.learning_rate() * self.gamma;
            self.optimizer.set_learning_rate(lr);
            if self.verbose {
                log::info!("learning rate updated to: {lr}");
            }
        }
    }

    fn learning_rate(&self) -> f64 {
        self.optimizer.learning_rate()
    }
}
