use bon::bon;

use super::{LrScheduler, SchedulerError};
use crate::optim::LearningRateController;

/// Decays the optimizer's learning rate by `gamma` once every `step_size`
/// epochs, until `last_epoch` is reached.
///
/// `last_epoch` left at its -1 default means the schedule is unbounded; in
/// that mode every `step()` writes the learning rate captured at construction
/// back to the optimizer, so the rate stays pinned at its initial value.
pub struct StepLR<'a, C: LearningRateController> {
    optimizer: &'a mut C,
    initial_lr: f64,
    step_size: usize,
    gamma: f64,
    last_epoch: i64,
    verbose: bool,
    epoch: usize,
}

#[bon]
impl<'a, C: LearningRateController> StepLR<'a, C> {
    /// Binds a step decay schedule to `optimizer`, capturing its current
    /// learning rate as the initial value.
    #[builder]
    pub fn new(
        optimizer: &'a mut C,
        step_size: usize,
        #[builder(default = 0.1)] gamma: f64,
        #[builder(default = -1)] last_epoch: i64,
        #[builder(default = false)] verbose: bool,
    ) -> Result<Self, SchedulerError> {
        if step_size == 0 {
            return Err(SchedulerError::ZeroStepSize);
        }
        let initial_lr = optimizer.learning_rate();
        Ok(Self {
            optimizer,
            initial_lr,
            step_size,
            gamma,
            last_epoch,
            verbose,
            epoch: 0,
        })
    }
}

impl<'a, C: LearningRateController> StepLR<'a, C> {
    pub fn optimizer(&self) -> &C {
        self.optimizer
    }

    pub fn optimizer_mut(&mut self) -> &mut C {
        self.optimizer
    }
}

impl<'a, C: LearningRateController> LrScheduler for StepLR<'a, C> {
    fn step(&mut self) {
        self.epoch += 1;

        if self.last_epoch == -1 {
            self.optimizer.set_learning_rate(self.initial_lr);
            if self.verbose {
                log::info!("learning rate updated to: {}", self.initial_lr);
            }
        } else if self.epoch % self.step_size == 0 && self.epoch as i64 <= self.last_epoch {
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
