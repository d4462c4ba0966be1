// Copyright (c) 2018-2022  Ministerio de Fomento
//                          Instituto de Ciencias de la Construcción Eduardo Torroja (IETcc-CSIC)

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

// Author(s): Rafael Villar Burke <pachi@ietcc.csic.es>,
//            Daniel Jiménez González <dani@ietcc.csic.es>,
//            Marta Sorribes Gil <msorribes@ietcc.csic.es>

/*!
Cost cases
==========

Best / Base / Worst case triples used for renovation costs and economic outcomes.
*/

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::numops::round_dp;

/// Kostenfall (Unsicherheitsband)
///
/// Cost uncertainty band
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum CostCase {
    /// Lowest cost estimate
    #[strum(to_string = "Best Case")]
    Best,
    /// Reference cost estimate
    #[strum(to_string = "Base Case")]
    Base,
    /// Highest cost estimate
    #[strum(to_string = "Worst Case")]
    Worst,
}

/// Werte für Best / Base / Worst Case
///
/// One value per cost case
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ByCase<T> {
    /// Best case value
    pub best: T,
    /// Base case value
    pub base: T,
    /// Worst case value
    pub worst: T,
}

impl<T: Copy> ByCase<T> {
    /// Constructor
    pub fn new(best: T, base: T, worst: T) -> Self {
        Self { best, base, worst }
    }

    /// Same value for every case
    pub fn splat(value: T) -> Self {
        Self::new(value, value, value)
    }

    /// Value for a cost case
    pub fn get(&self, case: CostCase) -> T {
        match case {
            CostCase::Best => self.best,
            CostCase::Base => self.base,
            CostCase::Worst => self.worst,
        }
    }

    /// Apply a function to every case
    pub fn map<U: Copy, F: Fn(T) -> U>(self, f: F) -> ByCase<U> {
        ByCase::new(f(self.best), f(self.base), f(self.worst))
    }
}

impl ByCase<f64> {
    /// Round every case to the given decimal places
    pub fn round(self, decimals: i32) -> Self {
        self.map(|v| round_dp(v, decimals))
    }
}

impl<T: Add<Output = T>> Add for ByCase<T> {
    type Output = ByCase<T>;

    fn add(self, other: ByCase<T>) -> ByCase<T> {
        ByCase {
            best: self.best + other.best,
            base: self.base + other.base,
            worst: self.worst + other.worst,
        }
    }
}

impl<T: Add<Output = T> + Copy> AddAssign for ByCase<T> {
    fn add_assign(&mut self, other: ByCase<T>) {
        *self = *self + other;
    }
}

impl<T: Neg<Output = T>> Neg for ByCase<T> {
    type Output = ByCase<T>;

    fn neg(self) -> ByCase<T> {
        ByCase {
            best: -self.best,
            base: -self.base,
            worst: -self.worst,
        }
    }
}

// Scaling by a quantity (area, number of windows or buildings)
impl<T: Mul<Output = T> + Copy> Mul<T> for ByCase<T> {
    type Output = ByCase<T>;

    fn mul(self, k: T) -> ByCase<T> {
        ByCase {
            best: self.best * k,
            base: self.base * k,
            worst: self.worst * k,
        }
    }
}

impl<T> std::iter::Sum for ByCase<T>
where
    T: Add<Output = T> + num::Zero + Copy,
{
    fn sum<I: Iterator<Item = ByCase<T>>>(iter: I) -> Self {
        iter.fold(ByCase::splat(T::zero()), |acc, v| acc + v)
    }
}

impl<T: fmt::Display> fmt::Display for ByCase<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ best: {}, base: {}, worst: {} }}",
            self.best, self.base, self.worst
        )
    }
}
