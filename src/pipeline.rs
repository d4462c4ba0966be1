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
Bewertungsablauf
================

Runs the assessment of every archetype of the registry:

1. mass tables of the scenarios are merged (differencer),
2. energy demand and NPV of the energy costs are computed,
3. renovation costs are estimated from the merged mass table,
4. costs and GWP results are compared and the single measures are ranked.

Stages of one archetype run in order. Archetypes are independent: a data error in
one of them skips that archetype and is reported, the others are still assessed.
*/

use std::collections::HashMap;

use serde::Serialize;

use crate::comparison::{compare, compare_costs, rank, ComparisonRow, CostComparison, Rankings};
use crate::costs::{renovation_costs, CostTables, RenovationCost};
use crate::differencer::{merge_scenarios, MergedMassTable};
use crate::energy::{
    energy_demands, npv_records, DiscountConfig, EnergyDemandRecord, EnergyPrices, NpvRecord,
    SavingsFactors,
};
use crate::error::{LcaError, Result};
use crate::types::{Archetype, ArchetypeRegistry, CostGroupSets, GwpRecord, GwpRecords, ScenarioMassTables};

/// Referenzdaten einer Bewertung
///
/// Read only reference tables shared by all the archetypes of a run
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceData {
    /// Discounting configuration
    pub discount: DiscountConfig,
    /// Energy prices, €/kWh
    pub prices: EnergyPrices,
    /// Heating savings factors
    pub savings: SavingsFactors,
    /// Renovation unit costs
    pub costs: CostTables,
    /// Cost groups of the renovated components
    pub cost_groups: CostGroupSets,
}

/// Quelle der Projektdaten der Archetypen
///
/// Results of the building projects computed by the LCA service, already retrieved and
/// normalized.
pub trait ProjectSource {
    /// Mass tables of the scenarios of an archetype
    fn mass_tables(&self, archetype: &Archetype) -> Result<ScenarioMassTables>;
    /// GWP results of the scenarios of an archetype
    fn gwp_records(&self, archetype: &Archetype) -> Result<GwpRecords>;
}

/// Project data held in memory, by archetype name
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    /// Mass tables by archetype name
    pub masses: HashMap<String, ScenarioMassTables>,
    /// GWP records of all archetypes
    pub gwp: GwpRecords,
}

impl ProjectSource for MemorySource {
    fn mass_tables(&self, archetype: &Archetype) -> Result<ScenarioMassTables> {
        self.masses
            .get(&archetype.name)
            .cloned()
            .ok_or_else(|| LcaError::MissingBaseline {
                archetype: archetype.name.clone(),
                what: "mass table",
            })
    }

    fn gwp_records(&self, archetype: &Archetype) -> Result<GwpRecords> {
        Ok(GwpRecords(
            self.gwp.for_archetype(&archetype.name).cloned().collect(),
        ))
    }
}

/// Ergebnisse eines Archetyps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchetypeResult {
    /// Archetype
    pub archetype: Archetype,
    /// Merged mass table
    pub masses: MergedMassTable,
    /// Operational energy by scenario
    pub demands: Vec<EnergyDemandRecord>,
    /// NPV of the energy costs by scenario
    pub npv: Vec<NpvRecord>,
    /// Renovation costs by scenario
    pub costs: Vec<RenovationCost>,
    /// Economic outcome by scenario
    pub cost_comparison: Vec<CostComparison>,
    /// GWP results by scenario
    pub gwp: Vec<GwpRecord>,
    /// Comparison table
    pub comparison: Vec<ComparisonRow>,
}

/// Nicht bewerteter Archetyp und Grund
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedArchetype {
    /// Archetype name
    pub name: String,
    /// Error description
    pub reason: String,
}

/// Bewertung aller Archetypen
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssessmentReport {
    /// Assessed archetypes, in registry order
    pub results: Vec<ArchetypeResult>,
    /// Archetypes that could not be assessed
    pub skipped: Vec<SkippedArchetype>,
    /// Rankings of the single measures of all the assessed archetypes
    pub rankings: Rankings,
}

impl AssessmentReport {
    /// Comparison rows of all the assessed archetypes
    pub fn comparison_rows(&self) -> impl Iterator<Item = &ComparisonRow> {
        self.results.iter().flat_map(|r| r.comparison.iter())
    }
}

/// Assess one archetype
pub fn assess_archetype(
    archetype: &Archetype,
    source: &dyn ProjectSource,
    refdata: &ReferenceData,
) -> Result<ArchetypeResult> {
    let name = archetype.name.as_str();

    let tables = source.mass_tables(archetype)?;
    if let Some(other) = tables.archetype.as_ref().filter(|a| a.as_str() != name) {
        return Err(LcaError::WrongInput(format!(
            "mass tables of \"{}\" given for archetype \"{}\"",
            other, name
        )));
    }
    let masses = merge_scenarios(name, &tables, &refdata.cost_groups)?;
    log::debug!("{}: merged mass table with {} rows", name, masses.rows.len());

    let demands = energy_demands(archetype, &refdata.savings, &refdata.prices)?;
    let npv = npv_records(archetype, &demands, &refdata.discount)?;

    let costs = renovation_costs(archetype, &masses, &refdata.costs, &refdata.cost_groups)?;
    let cost_comparison = compare_costs(name, &npv, &costs)?;

    let gwp = source.gwp_records(archetype)?;
    let comparison = compare(archetype, &cost_comparison, &gwp)?;

    Ok(ArchetypeResult {
        archetype: archetype.clone(),
        masses,
        demands,
        npv,
        costs,
        cost_comparison,
        gwp: gwp.0,
        comparison,
    })
}

/// Assess every archetype of the registry
///
/// Archetypes with data errors are skipped and reported with the reason.
pub fn assess(
    registry: &ArchetypeRegistry,
    source: &dyn ProjectSource,
    refdata: &ReferenceData,
) -> AssessmentReport {
    let mut report = AssessmentReport::default();
    for archetype in registry {
        match assess_archetype(archetype, source, refdata) {
            Ok(result) => {
                log::info!("{}: assessed", archetype.name);
                report.results.push(result);
            }
            Err(err) => {
                log::warn!("{}: skipped ({})", archetype.name, err);
                report.skipped.push(SkippedArchetype {
                    name: archetype.name.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }
    report.rankings = rank(report.comparison_rows());
    report
}
