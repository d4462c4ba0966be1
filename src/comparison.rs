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
Vergleich und Priorisierung
===========================

Joins the NPV of the energy cost savings, the renovation costs and the GWP results of
the scenarios of an archetype:

- `Vergleich <Case> = NPV savings + renovation cost (case)`
- `ΔGWP% = (GWP scenario / GWP existing - 1) × 100`, `ΔGWP = GWP scenario - GWP existing`
- `kg CO2-eq./a per euro = ΔGWP × NGF / Vergleich Base Case`

Single measures that reduce the GWP are classified as first priority when the base case
outcome is a gain and as second priority when it is an expenditure.
*/

use std::cmp::Ordering;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::costs::RenovationCost;
use crate::energy::NpvRecord;
use crate::error::{LcaError, Result};
use crate::numops::{is_near_zero, round_serialize_3, round_serialize_opt_3};
use crate::types::{Archetype, ByCase, GwpRecords, Scenario};

// -------------------- Costs

/// Vergleich der Energiekosteneinsparung mit den Sanierungskosten
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostComparison {
    /// Archetype name
    pub archetype: String,
    /// Renovation scenario
    pub scenario: Scenario,
    /// NPV of the energy cost savings, €
    #[serde(serialize_with = "round_serialize_3")]
    pub npv_savings: f64,
    /// Renovation cost, € (negative)
    pub renovation_cost: ByCase<f64>,
    /// Economic outcome (Vergleich), €
    pub outcome: ByCase<f64>,
}

/// Economic outcome of every renovation scenario
pub fn compare_costs(
    archetype: &str,
    npv: &[NpvRecord],
    costs: &[RenovationCost],
) -> Result<Vec<CostComparison>> {
    Scenario::RENOVATIONS
        .iter()
        .map(|&scenario| {
            let missing = |what| LcaError::MissingRecord {
                archetype: archetype.into(),
                scenario,
                what,
            };
            let npv_savings = npv
                .iter()
                .find(|r| r.scenario == scenario)
                .ok_or_else(|| missing("energy cost NPV"))?
                .savings;
            let renovation_cost = costs
                .iter()
                .find(|r| r.scenario == scenario)
                .ok_or_else(|| missing("renovation cost"))?
                .cost;
            Ok(CostComparison {
                archetype: archetype.into(),
                scenario,
                npv_savings,
                renovation_cost,
                outcome: (ByCase::splat(npv_savings) + renovation_cost).round(3),
            })
        })
        .collect()
}

// -------------------- GWP

/// Veränderung des Treibhauspotenzials gegenüber dem Bestand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GwpDelta {
    /// Archetype name
    pub archetype: String,
    /// Scenario
    pub scenario: Scenario,
    /// GWP of the scenario, kg CO2-eq./m²NGF·a
    pub gwp: f64,
    /// Change in %. Undefined when the existing building GWP is zero
    #[serde(serialize_with = "round_serialize_opt_3")]
    pub percent: Option<f64>,
    /// Absolute change, kg CO2-eq./m²NGF·a
    #[serde(serialize_with = "round_serialize_3")]
    pub absolute: f64,
}

/// GWP change of a scenario against the existing building
///
/// Fails when any of both records is missing.
pub fn gwp_delta(archetype: &str, records: &GwpRecords, scenario: Scenario) -> Result<GwpDelta> {
    let existing = records
        .find(archetype, Scenario::Existing)
        .ok_or_else(|| LcaError::MissingBaseline {
            archetype: archetype.into(),
            what: "GWP record",
        })?;
    let record = records
        .find(archetype, scenario)
        .ok_or_else(|| LcaError::MissingRecord {
            archetype: archetype.into(),
            scenario,
            what: "GWP record",
        })?;
    let percent = if is_near_zero(existing.total) {
        None
    } else {
        Some((record.total / existing.total - 1.0) * 100.0)
    };
    Ok(GwpDelta {
        archetype: archetype.into(),
        scenario,
        gwp: record.total,
        percent,
        absolute: record.total - existing.total,
    })
}

// -------------------- Priorities

/// Prioritätsklasse einer Maßnahme
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum PriorityClass {
    /// Reduces GWP and the energy savings pay back the renovation
    #[strum(to_string = "1. Priorität")]
    FirstPriority,
    /// Reduces GWP at a net cost
    #[strum(to_string = "2. Priorität")]
    SecondPriority,
    /// Not ranked
    #[strum(to_string = "-")]
    Excluded,
}

/// Priority class of a scenario from its GWP change and base case outcome
///
/// The existing building and the complete renovation are never ranked, neither are
/// outcomes too close to zero to divide by.
pub fn classify(scenario: Scenario, gwp_change: f64, base_outcome: f64) -> PriorityClass {
    if !scenario.is_single_measure() || is_near_zero(base_outcome) || !(gwp_change < 0.0) {
        PriorityClass::Excluded
    } else if base_outcome > 0.0 {
        PriorityClass::FirstPriority
    } else {
        PriorityClass::SecondPriority
    }
}

/// GWP change per euro of base case outcome, kg CO2-eq./a per €
///
/// Undefined for base case outcomes close to zero.
pub fn gwp_per_euro(gwp_change: f64, net_floor_area: f64, base_outcome: f64) -> Option<f64> {
    if is_near_zero(base_outcome) {
        None
    } else {
        Some(gwp_change * net_floor_area / base_outcome)
    }
}

// -------------------- Comparison table

/// Werte im Quartier (alle Gebäude des Archetyps)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterValues {
    /// Number of buildings
    pub buildings: u32,
    /// Economic outcome of all the buildings, €
    pub outcome: ByCase<f64>,
    /// GWP change of all the buildings, kg CO2-eq./a
    #[serde(serialize_with = "round_serialize_3")]
    pub gwp_change: f64,
}

/// Zeile der Vergleichstabelle
///
/// Comparison of a renovation scenario of an archetype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// Archetype name
    pub archetype: String,
    /// Renovation scenario
    pub scenario: Scenario,
    /// Net floor area, m²
    pub net_floor_area: f64,
    /// NPV of the energy cost savings, €
    #[serde(serialize_with = "round_serialize_3")]
    pub npv_savings: f64,
    /// Renovation cost, €
    pub renovation_cost: ByCase<f64>,
    /// Economic outcome (Vergleich), €
    pub outcome: ByCase<f64>,
    /// GWP change, %
    #[serde(serialize_with = "round_serialize_opt_3")]
    pub gwp_change_percent: Option<f64>,
    /// GWP change, kg CO2-eq./m²NGF·a
    #[serde(serialize_with = "round_serialize_3")]
    pub gwp_change: f64,
    /// GWP change per euro, kg CO2-eq./a per €
    #[serde(serialize_with = "round_serialize_opt_3")]
    pub gwp_per_euro: Option<f64>,
    /// Priority class
    pub priority: PriorityClass,
    /// Values for the whole neighbourhood
    pub quarter: QuarterValues,
}

/// Comparison rows of the renovation scenarios of an archetype
pub fn compare(
    archetype: &Archetype,
    costs: &[CostComparison],
    gwp: &GwpRecords,
) -> Result<Vec<ComparisonRow>> {
    let name = archetype.name.as_str();
    let nfa = archetype.net_floor_area;
    costs
        .iter()
        .filter(|c| c.archetype == name && c.scenario != Scenario::Existing)
        .map(|cost| {
            let delta = gwp_delta(name, gwp, cost.scenario)?;
            let buildings = archetype.buildings;
            Ok(ComparisonRow {
                archetype: name.into(),
                scenario: cost.scenario,
                net_floor_area: nfa,
                npv_savings: cost.npv_savings,
                renovation_cost: cost.renovation_cost,
                outcome: cost.outcome,
                gwp_change_percent: delta.percent,
                gwp_change: delta.absolute,
                gwp_per_euro: gwp_per_euro(delta.absolute, nfa, cost.outcome.base),
                priority: classify(cost.scenario, delta.absolute, cost.outcome.base),
                quarter: QuarterValues {
                    buildings,
                    outcome: (cost.outcome * f64::from(buildings)).round(3),
                    gwp_change: delta.absolute * nfa * f64::from(buildings),
                },
            })
        })
        .collect()
}

// -------------------- Rankings

/// Eintrag einer Rangfolge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    /// Archetype name
    pub archetype: String,
    /// Scenario
    pub scenario: Scenario,
    /// kg CO2-eq./a per €
    #[serde(serialize_with = "round_serialize_3")]
    pub value: f64,
}

impl RankEntry {
    /// Measure label (`"<archetype>, <scenario>"`)
    pub fn label(&self) -> String {
        format!("{}, {}", self.archetype, self.scenario)
    }
}

/// Rangfolgen der Maßnahmen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rankings {
    /// GWP savings per euro gained (sign flipped to positive), best first
    pub first: Vec<RankEntry>,
    /// GWP savings per euro spent, best first
    pub second: Vec<RankEntry>,
    /// Every single measure with a defined ratio, ascending
    pub order: Vec<RankEntry>,
}

fn desc(a: &RankEntry, b: &RankEntry) -> Ordering {
    b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal)
}

/// Rank the single measures of the comparison rows
pub fn rank<'a, I>(rows: I) -> Rankings
where
    I: IntoIterator<Item = &'a ComparisonRow>,
{
    let measures: Vec<(&ComparisonRow, f64)> = rows
        .into_iter()
        .filter(|r| r.scenario.is_single_measure())
        .filter_map(|r| r.gwp_per_euro.map(|v| (r, v)))
        .collect();
    let entry = |row: &ComparisonRow, value: f64| RankEntry {
        archetype: row.archetype.clone(),
        scenario: row.scenario,
        value,
    };

    let first = measures
        .iter()
        .filter(|(r, _)| r.priority == PriorityClass::FirstPriority)
        .map(|&(r, v)| entry(r, -v))
        .sorted_by(desc)
        .collect();
    let second = measures
        .iter()
        .filter(|(r, _)| r.priority == PriorityClass::SecondPriority)
        .map(|&(r, v)| entry(r, v))
        .sorted_by(desc)
        .collect();
    let order = measures
        .iter()
        .map(|&(r, v)| entry(r, v))
        .sorted_by(|a, b| desc(b, a))
        .collect();
    Rankings {
        first,
        second,
        order,
    }
}
