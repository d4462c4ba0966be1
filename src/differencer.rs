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
Differenzbildung der Szenarien
==============================

Merges the mass tables of the scenarios of one archetype into a single table
with one mass column per scenario, and synthesizes the complete renovation.

- Wall and roof renovations keep the existing materials and layer the new ones on
  top: rows of the renovated table that have no identical row in the existing table
  are appended as new materials.
- Window renovations replace the windows: existing rows of the window cost groups are
  removed before comparing.
- Existing rows of cost groups untouched by a measure must be carried over unchanged.
- The complete renovation takes the window renovation values, overwritten by the roof
  renovation values for roof cost groups and by the wall renovation values for wall
  cost groups.
*/

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{LcaError, Result};
use crate::types::{BuildingComponent, CostGroupSets, MassRow, MassTable, Scenario, ScenarioMassTables};

/// Match identical rows of two tables, each row used once at most
///
/// Returns the flags of matched rows of `base` and `other`.
fn match_rows(base: &[MassRow], other: &[MassRow]) -> (Vec<bool>, Vec<bool>) {
    let mut base_matched = vec![false; base.len()];
    let other_matched = other
        .iter()
        .map(|row| {
            let pos = base
                .iter()
                .zip(base_matched.iter())
                .position(|(b, used)| !*used && b == row);
            match pos {
                Some(pos) => {
                    base_matched[pos] = true;
                    true
                }
                None => false,
            }
        })
        .collect();
    (base_matched, other_matched)
}

/// Rows of `renovated` without an identical row in `base`
///
/// Rows are compared field by field, so an existing material with a changed mass is
/// a new row. Duplicated rows are matched one to one.
pub fn new_rows<'a>(base: &[MassRow], renovated: &'a [MassRow]) -> Vec<&'a MassRow> {
    let (_, matched) = match_rows(base, renovated);
    renovated
        .iter()
        .zip(matched)
        .filter(|(_, matched)| !matched)
        .map(|(row, _)| row)
        .collect()
}

/// Zeile der zusammengeführten Massentabelle
///
/// Row of the merged table. A missing scenario mass means the material is not part
/// of that scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    /// DIN 276 cost group
    pub cost_group: String,
    /// Building component name
    pub element: String,
    /// Process (material) name
    pub process: String,
    /// Mass by scenario, kg
    pub masses: BTreeMap<Scenario, f64>,
}

impl MergedRow {
    fn from_row(row: &MassRow) -> Self {
        Self {
            cost_group: row.cost_group.clone(),
            element: row.element.clone(),
            process: row.process.clone(),
            masses: BTreeMap::new(),
        }
    }

    /// Mass of a scenario, if the material is part of it
    pub fn mass(&self, scenario: Scenario) -> Option<f64> {
        self.masses.get(&scenario).copied()
    }
}

/// Zusammengeführte Massentabelle eines Archetyps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedMassTable {
    /// Archetype name
    pub archetype: String,
    /// Existing rows followed by the new rows of the wall, roof and window renovations
    pub rows: Vec<MergedRow>,
}

impl MergedMassTable {
    /// Rows added by a renovation scenario (not present in the existing building)
    pub fn added_rows(&self, scenario: Scenario) -> impl Iterator<Item = &MergedRow> {
        self.rows
            .iter()
            .filter(move |r| r.mass(Scenario::Existing).is_none() && r.mass(scenario).is_some())
    }

    /// Total mass of a cost group in a scenario, kg
    pub fn cost_group_mass(&self, cost_group: &str, scenario: Scenario) -> f64 {
        self.rows
            .iter()
            .filter(|r| r.cost_group == cost_group)
            .filter_map(|r| r.mass(scenario))
            .sum()
    }

    /// Total mass of a scenario, kg
    pub fn total_mass(&self, scenario: Scenario) -> f64 {
        self.rows.iter().filter_map(|r| r.mass(scenario)).sum()
    }

    /// Distinct cost groups, in order of appearance
    pub fn cost_groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !groups.contains(&row.cost_group.as_str()) {
                groups.push(&row.cost_group);
            }
        }
        groups
    }
}

/// Führt die Massentabellen der Szenarien eines Archetyps zusammen
///
/// Fails when the existing table is missing, a renovation table is missing, a renovation
/// table has no rows for the component it renovates, or the rows of an untouched cost
/// group differ from the existing ones.
pub fn merge_scenarios(
    archetype: &str,
    tables: &ScenarioMassTables,
    cost_groups: &CostGroupSets,
) -> Result<MergedMassTable> {
    cost_groups.validate()?;

    let existing = tables
        .get(Scenario::Existing)
        .ok_or_else(|| LcaError::MissingBaseline {
            archetype: archetype.into(),
            what: "mass table",
        })?;

    let mut rows: Vec<MergedRow> = existing
        .rows
        .iter()
        .map(|row| {
            let mut merged = MergedRow::from_row(row);
            merged.masses.insert(Scenario::Existing, row.mass);
            merged
        })
        .collect();

    for &scenario in Scenario::SINGLE_MEASURES.iter() {
        let component = match scenario.component() {
            Some(component) => component,
            None => continue,
        };
        let renovated = tables
            .get(scenario)
            .ok_or_else(|| LcaError::MissingRecord {
                archetype: archetype.into(),
                scenario,
                what: "mass table",
            })?;
        let added = merge_renovation(
            &mut rows[..existing.rows.len()],
            existing,
            renovated,
            scenario,
            component,
            cost_groups,
        )?;
        log::debug!(
            "{}: {} new rows in scenario {}",
            archetype,
            added.len(),
            scenario
        );
        rows.extend(added);
    }

    for row in rows.iter_mut() {
        if let Some(mass) = complete_renovation_mass(row, cost_groups) {
            row.masses.insert(Scenario::CompleteRenovation, mass);
        }
    }

    Ok(MergedMassTable {
        archetype: archetype.into(),
        rows,
    })
}

/// Fill the scenario column of the existing rows and return the new rows
fn merge_renovation(
    existing_rows: &mut [MergedRow],
    existing: &MassTable,
    renovated: &MassTable,
    scenario: Scenario,
    component: BuildingComponent,
    cost_groups: &CostGroupSets,
) -> Result<Vec<MergedRow>> {
    let touched = |row: &MassRow| cost_groups.belongs_to(&row.cost_group, component);

    if !renovated.rows.iter().any(|r| touched(r)) {
        return Err(LcaError::MissingRenovationRows {
            scenario,
            component,
        });
    }

    // Untouched existing rows must be found unchanged in the renovated table
    let untouched: Vec<MassRow> = existing
        .rows
        .iter()
        .filter(|&r| !touched(r))
        .cloned()
        .collect();
    if let Some(missing) = new_rows(&renovated.rows, &untouched).first() {
        return Err(LcaError::MissingCarryOver {
            scenario,
            cost_group: missing.cost_group.clone(),
            process: missing.process.clone(),
        });
    }
    // and no other rows may appear in those cost groups
    let renovated_untouched: Vec<MassRow> = renovated
        .rows
        .iter()
        .filter(|&r| !touched(r))
        .cloned()
        .collect();
    if let Some(unexpected) = new_rows(&untouched, &renovated_untouched).first() {
        return Err(LcaError::UnexpectedRenovationRow {
            scenario,
            cost_group: unexpected.cost_group.clone(),
            process: unexpected.process.clone(),
        });
    }

    // Replaced components are compared against a base without them
    let replaces = component == BuildingComponent::Window;
    let base: Vec<MassRow> = existing
        .rows
        .iter()
        .filter(|&r| !(replaces && touched(r)))
        .cloned()
        .collect();
    let (base_matched, renovated_matched) = match_rows(&base, &renovated.rows);

    let mut base_idx = 0;
    for (merged, row) in existing_rows.iter_mut().zip(existing.rows.iter()) {
        if replaces && touched(row) {
            continue;
        }
        if base_matched[base_idx] || !touched(row) {
            merged.masses.insert(scenario, row.mass);
        }
        base_idx += 1;
    }

    Ok(renovated
        .rows
        .iter()
        .zip(renovated_matched)
        .filter(|(_, matched)| !matched)
        .map(|(row, _)| {
            let mut merged = MergedRow::from_row(row);
            merged.masses.insert(scenario, row.mass);
            merged
        })
        .collect())
}

/// Mass of the complete renovation: window values, then roof values for roof cost
/// groups and wall values for wall cost groups
fn complete_renovation_mass(row: &MergedRow, cost_groups: &CostGroupSets) -> Option<f64> {
    if cost_groups.belongs_to(&row.cost_group, BuildingComponent::Wall) {
        row.mass(Scenario::WallRenovation)
    } else if cost_groups.belongs_to(&row.cost_group, BuildingComponent::Roof) {
        row.mass(Scenario::RoofRenovation)
    } else {
        row.mass(Scenario::WindowRenovation)
    }
}
