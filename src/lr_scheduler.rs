mod exponential_lr;
mod step_lr;
pub use exponential_lr::ExponentialLR;
pub use step_lr::StepLR;

#[derive(Debug)]
pub enum SchedulerError {
    /// The decay period must span at least one epoch.
    ZeroStepSize,
}

/// A learning rate schedule bound to a single optimizer.
///
/// `step()` is meant to be called once per training epoch. Decay multiplies
/// the optimizer's current rate, so changes made to the rate from outside the
/// scheduler compose with the schedule.
pub trait LrScheduler {
    /// Advances the schedule by one epoch, updating the optimizer's rate.
    fn step(&mut self);
    /// The bound optimizer's current learning rate.
    fn learning_rate(&self) -> f64;
}
