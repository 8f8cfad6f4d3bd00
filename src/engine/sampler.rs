//! Sampling without replacement over the serial space.
//!
//! A draw selects `k` distinct serials uniformly from `{1, .., N}`: every
//! one of the C(N, k) subsets is equally likely. The implementation is a
//! partial Fisher–Yates shuffle over a serial pool: each of the `k` steps
//! picks a uniform index from the untouched suffix, so no rejection loop is
//! needed and uniformity is exact.
//!
//! For bulk Monte Carlo work, [`SerialPool`] keeps one pool allocation alive
//! across trials and undoes the touched prefix after every draw in O(k),
//! which is what lets 10 000 trials at N = 10 000 stay within the latency
//! budget.

use crate::engine::rng::TrialRng;
use crate::error::{EstimarError, EstimarResult};

/// Validate a draw request.
///
/// # Errors
///
/// Returns `InvalidParameter` if `sample_size < 1`, `population < 1`, or
/// `sample_size >= population` (sampling without replacement must leave the
/// population strictly larger than the sample).
pub fn validate_draw(population: u32, sample_size: u32) -> EstimarResult<()> {
    if population < 1 {
        return Err(EstimarError::invalid_parameter(format!(
            "population must be at least 1, got {population}"
        )));
    }
    if sample_size < 1 {
        return Err(EstimarError::invalid_parameter(format!(
            "sample size must be at least 1, got {sample_size}"
        )));
    }
    if sample_size >= population {
        return Err(EstimarError::invalid_parameter(format!(
            "sample size {sample_size} must be less than population {population}"
        )));
    }
    Ok(())
}

/// Reusable pool of serials `1..=N` for repeated draws.
///
/// One allocation serves an entire Monte Carlo run: a draw performs `k`
/// Fisher–Yates swaps against the pool, records them, and unwinds them in
/// reverse order afterwards, restoring the pool without a refill.
#[derive(Debug, Clone)]
pub struct SerialPool {
    serials: Vec<u32>,
    swaps: Vec<usize>,
}

impl SerialPool {
    /// Create a pool over `{1, .., population}`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `population < 1`.
    pub fn new(population: u32) -> EstimarResult<Self> {
        if population < 1 {
            return Err(EstimarError::invalid_parameter(format!(
                "population must be at least 1, got {population}"
            )));
        }
        Ok(Self {
            serials: (1..=population).collect(),
            swaps: Vec::new(),
        })
    }

    /// Population size this pool covers.
    #[must_use]
    pub fn population(&self) -> u32 {
        self.serials.len() as u32
    }

    /// Draw `sample_size` distinct serials, appending them to `out`.
    ///
    /// Caller must have validated `sample_size` via [`validate_draw`];
    /// debug builds assert it.
    pub fn draw_into(&mut self, sample_size: u32, rng: &mut TrialRng, out: &mut Vec<u32>) {
        debug_assert!((sample_size as usize) < self.serials.len());

        let k = sample_size as usize;
        self.swaps.clear();

        for i in 0..k {
            let remaining = (self.serials.len() - i) as u32;
            let j = i + rng.gen_index(remaining) as usize;
            self.serials.swap(i, j);
            self.swaps.push(j);
            out.push(self.serials[i]);
        }

        self.unwind(k);
    }

    /// Draw `sample_size` distinct serials and return only their maximum.
    ///
    /// Same sampling distribution as [`SerialPool::draw_into`] without
    /// materializing the sample.
    pub fn draw_max(&mut self, sample_size: u32, rng: &mut TrialRng) -> u32 {
        debug_assert!((sample_size as usize) < self.serials.len());

        let k = sample_size as usize;
        self.swaps.clear();
        let mut max = 0u32;

        for i in 0..k {
            let remaining = (self.serials.len() - i) as u32;
            let j = i + rng.gen_index(remaining) as usize;
            self.serials.swap(i, j);
            self.swaps.push(j);
            max = max.max(self.serials[i]);
        }

        self.unwind(k);
        max
    }

    /// Undo the recorded swaps in reverse order, restoring `1..=N` order
    /// in the touched prefix.
    fn unwind(&mut self, k: usize) {
        for i in (0..k).rev() {
            let j = self.swaps[i];
            self.serials.swap(i, j);
        }
    }
}

/// Draw one sample of `sample_size` distinct serials from `{1, .., population}`.
///
/// The distribution is exactly uniform over all C(N, k) subsets.
///
/// # Errors
///
/// Returns `InvalidParameter` if the draw request is out of domain
/// (see [`validate_draw`]).
pub fn draw_sample(
    population: u32,
    sample_size: u32,
    rng: &mut TrialRng,
) -> EstimarResult<Vec<u32>> {
    validate_draw(population, sample_size)?;

    let mut pool = SerialPool::new(population)?;
    let mut sample = Vec::with_capacity(sample_size as usize);
    pool.draw_into(sample_size, rng, &mut sample);
    Ok(sample)
}

/// Draw `trials` independent samples and return each sample's maximum.
///
/// This is the bulk operation behind the Monte Carlo engine: one pool
/// allocation, `trials` draw-and-reduce passes, one output array.
///
/// # Errors
///
/// Returns `InvalidParameter` if the draw request is out of domain
/// (see [`validate_draw`]).
pub fn draw_maxima(
    population: u32,
    sample_size: u32,
    trials: usize,
    rng: &mut TrialRng,
) -> EstimarResult<Vec<u32>> {
    validate_draw(population, sample_size)?;

    let mut pool = SerialPool::new(population)?;
    let mut maxima = Vec::with_capacity(trials);
    for _ in 0..trials {
        maxima.push(pool.draw_max(sample_size, rng));
    }
    Ok(maxima)
}
