//! Utilities.
use anyhow::{anyhow, Context, Result};
use candle_nn::VarMap;
use log::trace;

/// Apply soft update on variables.
///
/// Variables are identified by their names.
///
/// dest = tau * src + (1.0 - tau) * dest
pub fn track(dest: &VarMap, src: &VarMap, tau: f64) -> Result<()> {
    trace!("dest");
    let dest = dest
        .data()
        .lock()
        .map_err(|_| anyhow!("Variables of the destination are poisoned"))?;
    trace!("src");
    let src = src
        .data()
        .lock()
        .map_err(|_| anyhow!("Variables of the source are poisoned"))?;

    for (k_dest, v_dest) in dest.iter() {
        let v_src = src
            .get(k_dest)
            .with_context(|| format!("Variable {} is not in the source", k_dest))?;
        let t_src = v_src.as_tensor().affine(tau, 0.0)?;
        let t_dest = v_dest.as_tensor().affine(1.0 - tau, 0.0)?;
        v_dest.set(&(t_src + t_dest)?)?;
    }

    Ok(())
}

/// Interface for handling output dimensions.
pub trait OutDim {
    /// Returns the output dimension.
    fn get_out_dim(&self) -> usize;
}
