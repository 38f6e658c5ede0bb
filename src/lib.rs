//! PyTorch-style learning rate schedulers and nn utilities on top of
//! [candle](https://github.com/huggingface/candle).
//!
//! The schedulers bind to anything implementing [`LearningRateController`],
//! which every `candle_nn::Optimizer` does out of the box.

pub mod lr_scheduler;
pub mod nn;
pub mod optim;
pub mod tensor_operations;
pub mod transforms;

pub use lr_scheduler::{ExponentialLR, LrScheduler, SchedulerError, StepLR};
pub use optim::LearningRateController;
pub use transforms::Transform;
