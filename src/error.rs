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
Fehler
======

Error type for the renovation assessment pipeline.

Data integrity errors abort the processing of the affected archetype only;
configuration errors are fatal for the whole run.
*/

use std::fmt;

use crate::types::{BuildingComponent, Scenario};

/// Fehler der Bewertung
///
/// Assessment errors
#[derive(Debug)]
pub enum LcaError {
    /// Input text could not be parsed
    Parse(String),
    /// Missing or invalid configuration value (discounting constants, reference tables)
    Config(String),
    /// Wrong input value
    WrongInput(String),
    /// A delta against the baseline was requested but the `Existing` record is missing
    MissingBaseline {
        /// Archetype name
        archetype: String,
        /// Data set missing the baseline (mass table, GWP record, energy demand...)
        what: &'static str,
    },
    /// A record needed to join tables is missing
    MissingRecord {
        /// Archetype name
        archetype: String,
        /// Scenario without record
        scenario: Scenario,
        /// Data set missing the record
        what: &'static str,
    },
    /// A renovation table has no rows for the cost groups it renovates
    MissingRenovationRows {
        /// Renovation scenario
        scenario: Scenario,
        /// Renovated building component
        component: BuildingComponent,
    },
    /// An existing row of an untouched cost group is missing from a renovation table
    MissingCarryOver {
        /// Renovation scenario
        scenario: Scenario,
        /// Cost group of the missing row
        cost_group: String,
        /// Process name of the missing row
        process: String,
    },
    /// A renovation table has a row, not found in the existing table, in a cost group
    /// the renovation does not touch
    UnexpectedRenovationRow {
        /// Renovation scenario
        scenario: Scenario,
        /// Cost group of the unexpected row
        cost_group: String,
        /// Process name of the unexpected row
        process: String,
    },
    /// A cost group is assigned to more than one building component
    OverlappingCostGroup(u16),
    /// The renovation material has no cost row and there is no sentinel row
    UnknownMaterial {
        /// Building component
        component: BuildingComponent,
        /// Detected material
        material: String,
    },
    /// No price or savings factor could be resolved for an energy carrier
    UnknownCarrier(String),
    /// Two archetypes share the same name
    DuplicateArchetype(String),
    /// Archetype not found in the registry
    UnknownArchetype(String),
}

impl fmt::Display for LcaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use LcaError::*;
        match self {
            Parse(input) => write!(f, "Could not parse input: \"{}\"", input),
            Config(desc) => write!(f, "Configuration error: {}", desc),
            WrongInput(desc) => write!(f, "Wrong input: {}", desc),
            MissingBaseline { archetype, what } => write!(
                f,
                "Missing baseline (Bestand) {} for archetype \"{}\"",
                what, archetype
            ),
            MissingRecord {
                archetype,
                scenario,
                what,
            } => write!(
                f,
                "Missing {} for archetype \"{}\" and scenario {}",
                what, archetype, scenario
            ),
            MissingRenovationRows {
                scenario,
                component,
            } => write!(
                f,
                "Scenario {} has no rows for the renovated component {}",
                scenario, component
            ),
            MissingCarryOver {
                scenario,
                cost_group,
                process,
            } => write!(
                f,
                "Scenario {} lacks the existing row \"{}\" of the untouched cost group \"{}\"",
                scenario, process, cost_group
            ),
            UnexpectedRenovationRow {
                scenario,
                cost_group,
                process,
            } => write!(
                f,
                "Scenario {} changes the row \"{}\" of the untouched cost group \"{}\"",
                scenario, process, cost_group
            ),
            OverlappingCostGroup(code) => write!(
                f,
                "Cost group {} is assigned to more than one building component",
                code
            ),
            UnknownMaterial {
                component,
                material,
            } => write!(
                f,
                "No renovation cost for material \"{}\" ({}) and no sentinel row",
                material, component
            ),
            UnknownCarrier(carrier) => {
                write!(f, "Unknown energy carrier \"{}\"", carrier)
            }
            DuplicateArchetype(name) => write!(f, "Duplicate archetype name \"{}\"", name),
            UnknownArchetype(name) => write!(f, "Unknown archetype \"{}\"", name),
        }
    }
}

impl std::error::Error for LcaError {}

/// Ergebnis mit Bewertungsfehler
pub type Result<T> = std::result::Result<T, LcaError>;

impl From<std::num::ParseFloatError> for LcaError {
    fn from(err: std::num::ParseFloatError) -> Self {
        LcaError::Parse(format!("wrong number format ({})", err))
    }
}

impl From<serde_json::Error> for LcaError {
    fn from(err: serde_json::Error) -> Self {
        LcaError::Parse(format!("wrong JSON format ({})", err))
    }
}

impl From<std::io::Error> for LcaError {
    fn from(err: std::io::Error) -> Self {
        LcaError::WrongInput(format!("I/O error ({})", err))
    }
}
