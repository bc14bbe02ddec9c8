// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered fallback strategies
//!
//! A chain is a list of named attempts tried in order. An attempt either
//! produces a value it is satisfied with (`Ok(Some(_))`), declines
//! (`Ok(None)`) so the next one runs, or fails (`Err`), which stops the
//! chain. The terminal strategy always produces a value.
//!
//! ```
//! use rebuild_geometry::fallback::FallbackChain;
//! use std::convert::Infallible;
//!
//! let chain = FallbackChain::<i32, i32, Infallible>::new()
//!     .attempt("positive", |x| Ok((*x > 0).then_some(*x)))
//!     .finally("zero", |_| Ok(0));
//!
//! assert_eq!(chain.run(&-3).unwrap().strategy, "zero");
//! assert_eq!(chain.run(&7).unwrap().value, 7);
//! ```

use std::convert::Infallible;
use tracing::debug;

type Attempt<'a, I, O, E> = Box<dyn Fn(&I) -> Result<Option<O>, E> + 'a>;
type Terminal<'a, I, O, E> = Box<dyn Fn(&I) -> Result<O, E> + 'a>;

/// Value produced by a chain, tagged with the strategy that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<O> {
    pub value: O,
    pub strategy: &'static str,
}

/// Builder for a fallback chain; finish it with [`FallbackChain::finally`]
pub struct FallbackChain<'a, I: ?Sized, O, E = Infallible> {
    attempts: Vec<(&'static str, Attempt<'a, I, O, E>)>,
}

impl<'a, I: ?Sized, O, E> FallbackChain<'a, I, O, E> {
    pub fn new() -> Self {
        Self {
            attempts: Vec::new(),
        }
    }

    /// Append a strategy that may decline by returning `Ok(None)`
    pub fn attempt(
        mut self,
        name: &'static str,
        f: impl Fn(&I) -> Result<Option<O>, E> + 'a,
    ) -> Self {
        self.attempts.push((name, Box::new(f)));
        self
    }

    /// Close the chain with a strategy that always produces a value
    pub fn finally(
        self,
        name: &'static str,
        f: impl Fn(&I) -> Result<O, E> + 'a,
    ) -> ResolvingChain<'a, I, O, E> {
        ResolvingChain {
            attempts: self.attempts,
            terminal: (name, Box::new(f)),
        }
    }
}

impl<'a, I: ?Sized, O, E> Default for FallbackChain<'a, I, O, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// A complete chain that always resolves to a value (or an error)
pub struct ResolvingChain<'a, I: ?Sized, O, E = Infallible> {
    attempts: Vec<(&'static str, Attempt<'a, I, O, E>)>,
    terminal: (&'static str, Terminal<'a, I, O, E>),
}

impl<'a, I: ?Sized, O, E> ResolvingChain<'a, I, O, E> {
    /// Strategy names in the order they are tried
    pub fn strategies(&self) -> Vec<&'static str> {
        self.attempts
            .iter()
            .map(|(name, _)| *name)
            .chain(std::iter::once(self.terminal.0))
            .collect()
    }

    /// Run strategies in order until one produces a value
    pub fn run(&self, input: &I) -> Result<Resolved<O>, E> {
        for (name, attempt) in &self.attempts {
            if let Some(value) = attempt(input)? {
                return Ok(Resolved {
                    value,
                    strategy: *name,
                });
            }
            debug!(strategy = *name, "Fallback strategy declined");
        }

        let (name, terminal) = &self.terminal;
        Ok(Resolved {
            value: terminal(input)?,
            strategy: *name,
        })
    }
}

impl<'a, I: ?Sized, O> ResolvingChain<'a, I, O, Infallible> {
    /// Run a chain whose strategies cannot fail
    pub fn resolve(&self, input: &I) -> Resolved<O> {
        match self.run(input) {
            Ok(resolved) => resolved,
            Err(never) => match never {},
        }
    }
}
