//! The `Signal` trait: elapsed time in, one sample out.

/// A time-domain sample generator.
///
/// `t` is the elapsed time in seconds since the owning source started and
/// must increase monotonically between calls. Implementations may be pure
/// functions of `t` or carry private state (filter memory, active grains,
/// last trigger time) that evolves with successive calls. Signals run on the
/// render thread: no locking, no allocation in steady state.
pub trait Signal: Send {
    fn sample(&mut self, t: f64) -> f32;

    /// Restore the initial state, as if freshly built.
    fn reset(&mut self) {}

    /// Clear effect tails (reverb, filter memory) without touching the
    /// generator state.
    fn reset_effects(&mut self) {}
}

impl<S: Signal + ?Sized> Signal for Box<S> {
    #[inline]
    fn sample(&mut self, t: f64) -> f32 {
        (**self).sample(t)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn reset_effects(&mut self) {
        (**self).reset_effects()
    }
}

/// Owned, type-erased signal.
pub type BoxedSignal = Box<dyn Signal>;

/// Signal built from a closure over time. Handy for tests and tiny tones.
pub struct FnSignal<F>(pub F);

impl<F> Signal for FnSignal<F>
where
    F: FnMut(f64) -> f32 + Send,
{
    #[inline]
    fn sample(&mut self, t: f64) -> f32 {
        (self.0)(t)
    }
}

/// Silence.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silence;

impl Signal for Silence {
    #[inline]
    fn sample(&mut self, _t: f64) -> f32 {
        0.0
    }
}
