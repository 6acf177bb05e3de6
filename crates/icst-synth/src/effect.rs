//! Block effect interface.
//!
//! Effects are mono, block based and never allocate while processing.
//! Control parameters are set between blocks and glided across the next
//! block where the effect supports it.

/// Common interface of the block effects.
///
/// # Example
///
/// ```rust
/// use icst_synth::{Amp, Effect};
///
/// let mut amp = Amp::new();
/// amp.prepare(48000.0, 64);
/// amp.set_amp(0.5);
///
/// let input = [1.0f32; 64];
/// let mut output = [0.0f32; 64];
/// amp.process_block(&input, &mut output);
/// assert!((output[63] - 0.5).abs() < 1e-6);
/// ```
pub trait Effect {
    /// Adapt to the sample rate and the largest block size.
    fn prepare(&mut self, _sample_rate: f32, _block_size: usize) {}

    /// Process `data` in place.
    fn process_in_place(&mut self, data: &mut [f32]);

    /// Process `input` into `output`.
    ///
    /// The default copies and processes in place.
    ///
    /// # Panics
    ///
    /// Panics if the buffers differ in length.
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        output.copy_from_slice(input);
        self.process_in_place(output);
    }
}
