//! Biquad filters built on the `biquad` crate, and a signal wrapper that runs
//! a cascade of them.

use crate::{Error, Result};
use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type, Q_BUTTERWORTH_F32};
use nocturne_core::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    LowPass,
    HighPass,
    BandPass,
}

impl FilterKind {
    fn biquad_type(self) -> Type<f32> {
        match self {
            FilterKind::LowPass => Type::LowPass,
            FilterKind::HighPass => Type::HighPass,
            FilterKind::BandPass => Type::BandPass,
        }
    }
}

/// One second-order section.
#[derive(Clone, Copy)]
pub struct BiquadFilter {
    kind: FilterKind,
    cutoff: f32,
    coeffs: Coefficients<f32>,
    filter: DirectForm2Transposed<f32>,
}

impl BiquadFilter {
    pub fn new(kind: FilterKind, cutoff_hz: f32, q: f32, sample_rate: f64) -> Result<Self> {
        let nyquist = (sample_rate / 2.0) as f32;
        if !(cutoff_hz > 0.0 && cutoff_hz < nyquist) {
            return Err(Error::InvalidParameter(format!(
                "cutoff {cutoff_hz} Hz outside (0, {nyquist}) Hz"
            )));
        }

        let coeffs = Coefficients::<f32>::from_params(
            kind.biquad_type(),
            (sample_rate as f32).hz(),
            cutoff_hz.hz(),
            q,
        )
        .map_err(|e| Error::Filter(format!("{e:?}")))?;

        Ok(Self {
            kind,
            cutoff: cutoff_hz,
            coeffs,
            filter: DirectForm2Transposed::<f32>::new(coeffs),
        })
    }

    pub fn lowpass(cutoff_hz: f32, sample_rate: f64) -> Result<Self> {
        Self::new(FilterKind::LowPass, cutoff_hz, Q_BUTTERWORTH_F32, sample_rate)
    }

    pub fn highpass(cutoff_hz: f32, sample_rate: f64) -> Result<Self> {
        Self::new(FilterKind::HighPass, cutoff_hz, Q_BUTTERWORTH_F32, sample_rate)
    }

    /// Band-pass between `low_hz` and `high_hz`, centred on their geometric mean.
    pub fn bandpass(low_hz: f32, high_hz: f32, sample_rate: f64) -> Result<Self> {
        if !(low_hz > 0.0 && high_hz > low_hz) {
            return Err(Error::InvalidParameter(format!(
                "band {low_hz}-{high_hz} Hz is empty"
            )));
        }
        let center = (low_hz * high_hz).sqrt();
        let q = center / (high_hz - low_hz);
        Self::new(FilterKind::BandPass, center, q, sample_rate)
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        self.filter.run(x)
    }

    pub fn reset(&mut self) {
        self.filter = DirectForm2Transposed::<f32>::new(self.coeffs);
    }
}

/// `n` identical low-pass sections, giving `12·n` dB/octave.
pub fn lowpass_cascade(cutoff_hz: f32, order: usize, sample_rate: f64) -> Result<Vec<BiquadFilter>> {
    (0..order.max(1))
        .map(|_| BiquadFilter::lowpass(cutoff_hz, sample_rate))
        .collect()
}

/// Any signal run through a filter cascade.
pub struct Filtered<S> {
    inner: S,
    filters: Vec<BiquadFilter>,
}

impl<S: Signal> Filtered<S> {
    pub fn new(inner: S, filters: Vec<BiquadFilter>) -> Self {
        Self { inner, filters }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: Signal> Signal for Filtered<S> {
    #[inline]
    fn sample(&mut self, t: f64) -> f32 {
        let mut x = self.inner.sample(t);
        for filter in self.filters.iter_mut() {
            x = filter.process(x);
        }
        x
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.reset_effects();
    }

    fn reset_effects(&mut self) {
        for filter in self.filters.iter_mut() {
            filter.reset();
        }
    }
}
