//! Parameter-change-gated simulation cache.
//!
//! Reactive UIs re-fire handlers when an unrelated sibling control changes, so
//! the same parameter set tends to arrive many times in a row. The cache keeps
//! exactly one `(params, output)` pair and only calls the simulator when the
//! incoming parameters differ structurally from the stored ones.

use std::fmt;
use std::marker::PhantomData;

use tracing::{debug, warn};

use crate::bundle::OutputBundle;
use crate::error::DemoResult;

/// The simulation engine seen from the core: parameters in, bundle out.
///
/// Any randomness is the simulator's own business.
pub trait Simulator {
    type Params: Clone + PartialEq + fmt::Debug;

    fn simulate(&mut self, params: &Self::Params) -> DemoResult<OutputBundle>;
}

/// Adapts a closure into a [`Simulator`].
pub struct FnSimulator<P, F> {
    f: F,
    _params: PhantomData<fn(&P)>,
}

impl<P, F> FnSimulator<P, F>
where
    F: FnMut(&P) -> DemoResult<OutputBundle>,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _params: PhantomData,
        }
    }
}

impl<P, F> Simulator for FnSimulator<P, F>
where
    P: Clone + PartialEq + fmt::Debug,
    F: FnMut(&P) -> DemoResult<OutputBundle>,
{
    type Params = P;

    fn simulate(&mut self, params: &P) -> DemoResult<OutputBundle> {
        (self.f)(params)
    }
}

pub struct SimulationCache<S: Simulator> {
    simulator: S,
    params: S::Params,
    output: OutputBundle,
    simulations: u64,
}

impl<S: Simulator> SimulationCache<S> {
    /// Run the first simulation so that [`read`](Self::read) is always valid.
    pub fn new(mut simulator: S, initial: S::Params) -> DemoResult<Self> {
        let output = simulator.simulate(&initial)?;
        Ok(Self {
            simulator,
            params: initial,
            output,
            simulations: 1,
        })
    }

    /// Return the bundle for `params`, simulating only if they changed.
    ///
    /// On simulator failure the stored params and bundle are left untouched
    /// and the error is returned.
    pub fn update(&mut self, params: S::Params) -> DemoResult<&OutputBundle> {
        if params == self.params {
            debug!(?params, "parameters unchanged; reusing cached output");
            return Ok(&self.output);
        }

        debug!(?params, "parameters changed; simulating");
        match self.simulator.simulate(&params) {
            Ok(output) => {
                self.params = params;
                self.output = output;
                self.simulations += 1;
                Ok(&self.output)
            }
            Err(e) => {
                warn!(?params, error = %e, "simulation failed; keeping previous output");
                Err(e)
            }
        }
    }

    pub fn read(&self) -> &OutputBundle {
        &self.output
    }

    pub fn params(&self) -> &S::Params {
        &self.params
    }

    /// Number of successful simulator calls so far, including the first.
    pub fn simulation_count(&self) -> u64 {
        self.simulations
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }
}

impl<S: Simulator> fmt::Debug for SimulationCache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationCache")
            .field("params", &self.params)
            .field("title", &self.output.title)
            .field("simulations", &self.simulations)
            .finish()
    }
}
