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
LCArefurb
=========

This crate provides a library and binary that **assess building renovation scenarios of a
neighbourhood** from the life cycle assessment (LCA) results of a set of building archetypes.

For every archetype, four renovation scenarios are compared with the existing building
(*Bestand*): exterior wall insulation (*Außenwandsanierung*), roof insulation
(*Dachsanierung*), window replacement (*Fenstersanierung*) and all of them together
(*Komplettsanierung*).

The assessment:

- merges the material mass tables of the scenarios and synthesizes the complete renovation
- derives the heating demand of each scenario from savings factors and computes the net
  present value (NPV) of the energy costs over 20 years
- estimates the Best / Base / Worst case renovation costs from the detected renovation materials
- compares the economic outcome with the change of the global warming potential (GWP) and ranks
  the single measures by GWP savings per euro

Retrieving the results from the LCA service is not part of this crate: project data are
provided through the `ProjectSource` trait.

# Beispiel

```rust
use lcarefurb::*;

let config = DiscountConfig::from_json(
    r#"{"discount_rate": 0.015, "annual_price_increase": 0.05}"#
).unwrap();

// Energiekosten im Basisjahr: 100 m² x 100 kWh/m²a x 0,06 €/kWh = 600 €
let value = numops::round_dp(npv(600.0, &config), 3);
assert_eq!(value, 17459.911);

let priority = classify(Scenario::WallRenovation, -5.0, 200.0);
assert_eq!(priority, PriorityClass::FirstPriority);
```

*/

#![deny(missing_docs)]

mod asplain;
mod comparison;
mod costs;
mod differencer;
mod energy;
mod pipeline;

pub mod error;
pub mod numops;
pub mod types;

pub use asplain::*;
pub use comparison::*;
pub use costs::*;
pub use differencer::*;
pub use energy::*;
pub use error::LcaError;
pub use pipeline::*;
pub use types::*;

/// Versionsnummer der Bibliothek
///
/// Version number
pub static VERSION: &str = env!("CARGO_PKG_VERSION");
