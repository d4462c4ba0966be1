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
Treibhauspotenzial
==================

Global warming potential (GWP) results of the building projects, as retrieved from
the LCA service. Values are given in kg CO2-eq. per m² net floor area and year.
*/

use std::str;

use serde::{Deserialize, Serialize};

use crate::error::{LcaError, Result};
use crate::numops::round_dp;
use crate::types::{BuildingComponent, Scenario};

/// GWP nach Lebenszyklusmodul (EN 15804)
///
/// Modules missing in the retrieved data are zero.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleGwp {
    /// Product stage
    #[serde(rename = "A1-A3")]
    pub a1_a3: f64,
    /// Replacement
    #[serde(rename = "B4")]
    pub b4: f64,
    /// Operational energy use
    #[serde(rename = "B6")]
    pub b6: f64,
    /// Waste processing
    #[serde(rename = "C3")]
    pub c3: f64,
    /// Disposal
    #[serde(rename = "C4")]
    pub c4: f64,
    /// Benefits and loads beyond the system boundary
    #[serde(rename = "D")]
    pub d: f64,
}

impl ModuleGwp {
    /// Sum of the modules inside the system boundary (D excluded)
    pub fn total(&self) -> f64 {
        self.a1_a3 + self.b4 + self.b6 + self.c3 + self.c4
    }

    /// Module distribution for reports: D and the total are left out, one decimal
    pub fn distribution(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("A1-A3", round_dp(self.a1_a3, 1)),
            ("B4", round_dp(self.b4, 1)),
            ("B6", round_dp(self.b6, 1)),
            ("C3", round_dp(self.c3, 1)),
            ("C4", round_dp(self.c4, 1)),
        ]
    }
}

/// GWP nach Bauteil
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentGwp {
    /// Exterior walls
    #[serde(rename = "Außenwand", default)]
    pub wall: f64,
    /// Roof
    #[serde(rename = "Dach", default)]
    pub roof: f64,
    /// Windows
    #[serde(rename = "Fenster", default)]
    pub window: f64,
}

impl ComponentGwp {
    /// Value of a building component
    pub fn get(&self, component: BuildingComponent) -> f64 {
        match component {
            BuildingComponent::Wall => self.wall,
            BuildingComponent::Roof => self.roof,
            BuildingComponent::Window => self.window,
        }
    }
}

/// GWP eines Baustoffs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialGwp {
    /// Process name
    #[serde(rename = "Prozess")]
    pub process: String,
    /// GWP value
    #[serde(rename = "GWP")]
    pub gwp: f64,
}

/// GWP-Ergebnisse eines Projekts (Archetyp und Szenario)
///
/// GWP impact record of an archetype and scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GwpRecord {
    /// Archetype name
    #[serde(rename = "Archetyp")]
    pub archetype: String,
    /// Scenario
    #[serde(rename = "Variante")]
    pub scenario: Scenario,
    /// Project total GWP
    #[serde(rename = "Gesamt")]
    pub total: f64,
    /// GWP by life cycle module
    #[serde(rename = "Module", default)]
    pub modules: ModuleGwp,
    /// GWP by building component
    #[serde(rename = "Bauteile", default)]
    pub components: ComponentGwp,
    /// GWP by material
    #[serde(rename = "Baustoffe", default)]
    pub materials: Vec<MaterialGwp>,
}

/// Liste der GWP-Ergebnisse
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GwpRecords(pub Vec<GwpRecord>);

impl GwpRecords {
    /// Record of an archetype and scenario
    pub fn find(&self, archetype: &str, scenario: Scenario) -> Option<&GwpRecord> {
        self.0
            .iter()
            .find(|r| r.archetype == archetype && r.scenario == scenario)
    }

    /// Records of an archetype
    pub fn for_archetype<'a>(&'a self, archetype: &'a str) -> impl Iterator<Item = &'a GwpRecord> {
        self.0.iter().filter(move |r| r.archetype == archetype)
    }

    /// Check that there is at most one record by archetype and scenario
    pub fn validate(&self) -> Result<()> {
        for (i, record) in self.0.iter().enumerate() {
            if self.0[..i]
                .iter()
                .any(|r| r.archetype == record.archetype && r.scenario == record.scenario)
            {
                return Err(LcaError::WrongInput(format!(
                    "duplicate GWP record for archetype \"{}\" and scenario {}",
                    record.archetype, record.scenario
                )));
            }
        }
        Ok(())
    }
}

impl str::FromStr for GwpRecords {
    type Err = LcaError;

    fn from_str(s: &str) -> Result<GwpRecords> {
        let records: GwpRecords = serde_json::from_str(s)?;
        records.validate()?;
        Ok(records)
    }
}
