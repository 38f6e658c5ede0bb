use candle_core::{Error, Tensor, backprop::GradStore};

/// Rescales every gradient in the store so the global norm stays at or below
/// `max_norm`. Returns the norm measured before clipping.
pub fn clip_gradients(grad_store: &mut GradStore, max_norm: f32) -> Result<f32, Error> {
    let mut total_norm_sq: f32 = 0.0;
    let mut grads = vec![];

    for id in grad_store.get_ids() {
        if let Some(grad) = grad_store.get_id(*id) {
            let norm_sq = grad.sqr()?.sum_all()?.to_scalar::<f32>()?;
            total_norm_sq += norm_sq;
            grads.push((*id, grad.clone()));
        }
    }

    let total_norm = total_norm_sq.sqrt();
    if total_norm > max_norm {
        let scale = max_norm / total_norm;
        for (id, grad) in grads {
            let scale_t = Tensor::new(scale, &grad.device())?;
            let clipped = grad.broadcast_mul(&scale_t)?;
            grad_store.insert_id(id, clipped);
        }
    }

    Ok(total_norm)
}

// implement the tanh activation function
pub fn tanh(x: &Tensor) -> Result<Tensor, Error> {
    let e_pos = x.exp()?;
    let e_neg = (-1.0 * x)?.exp()?;
    let numerator = (&e_pos - &e_neg)?;
    let denominator = (&e_pos + &e_neg)?;
    numerator.broadcast_div(&denominator)
}
