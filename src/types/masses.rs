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
Massentabellen
==============

Material mass tables of the building projects, one per scenario.

Retrieved tables use a semicolon separated text format with German decimal commas:

```text
#META Archetyp: Atelierhaus Plus
Variante; Kostengruppe; Bauteil; Prozess; Masse in kg
Bestand; 331 Tragende Außenwände; Außenwand Mauerwerk [1021]; Vollziegel; 42.500,0
Außenwandsanierung; 335 Außenwandbekleidungen, außen; Außenwand Mauerwerk Sanierung [1021]; Mineralwolle (Fassaden-Dämmung); 812,4
```

The `Variante` field takes either a scenario name or a full project name.
*/

use std::collections::BTreeMap;
use std::fmt;
use std::str;

use serde::{Deserialize, Serialize};

use crate::error::{LcaError, Result};
use crate::numops::parse_de_number_req;
use crate::types::{split_project_name, Scenario};

/// Zeile der Massentabelle
///
/// Material mass row. Two rows are the same only if every field matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassRow {
    /// DIN 276 cost group (e.g. "334 Außentüren und -fenster")
    pub cost_group: String,
    /// Building component (Bauteil) name
    pub element: String,
    /// Process (material) name
    pub process: String,
    /// Mass, kg
    pub mass: f64,
}

impl MassRow {
    /// Constructor, cleaning up the component name
    pub fn new(cost_group: &str, element: &str, process: &str, mass: f64) -> Self {
        Self {
            cost_group: cost_group.trim().to_string(),
            element: clean_element_name(element),
            process: process.trim().to_string(),
            mass,
        }
    }
}

/// Normalize a component name so existing and renovated components match
///
/// Removes the trailing template reference (`" [1021]"`) and the `" Sanierung"` marker.
pub fn clean_element_name(element: &str) -> String {
    let element = element.trim();
    let element = match (element.rfind(" ["), element.ends_with(']')) {
        (Some(pos), true) => &element[..pos],
        _ => element,
    };
    element.replace(" Sanierung", "").trim().to_string()
}

/// Massentabelle eines Projekts (Archetyp und Szenario)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MassTable {
    /// Mass rows in retrieval order
    pub rows: Vec<MassRow>,
}

impl MassTable {
    /// Constructor
    pub fn new(rows: Vec<MassRow>) -> Self {
        Self { rows }
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total mass, kg
    pub fn total_mass(&self) -> f64 {
        self.rows.iter().map(|r| r.mass).sum()
    }
}

/// Massentabellen eines Archetyps, nach Szenario
///
/// Mass tables of one archetype. `CompleteRenovation` is never part of the input:
/// it is synthesized when scenarios are merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMassTables {
    /// Archetype name, if given in the metadata
    pub archetype: Option<String>,
    /// Tables by scenario
    pub tables: BTreeMap<Scenario, MassTable>,
}

impl ScenarioMassTables {
    /// Add a table for a scenario
    pub fn insert(&mut self, scenario: Scenario, table: MassTable) -> Result<()> {
        if scenario == Scenario::CompleteRenovation {
            return Err(LcaError::WrongInput(format!(
                "{} mass tables are derived and cannot be given as input",
                scenario
            )));
        }
        self.tables.insert(scenario, table);
        Ok(())
    }

    /// Table of a scenario
    pub fn get(&self, scenario: Scenario) -> Option<&MassTable> {
        self.tables.get(&scenario)
    }
}

fn parse_scenario_field(field: &str) -> Result<Scenario> {
    field
        .parse::<Scenario>()
        .or_else(|_| split_project_name(field).map(|(_, scenario)| scenario))
}

impl str::FromStr for ScenarioMassTables {
    type Err = LcaError;

    fn from_str(s: &str) -> Result<ScenarioMassTables> {
        let mut archetype = None;
        let mut rows_by_scenario: BTreeMap<Scenario, Vec<MassRow>> = BTreeMap::new();

        for line in s.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if line.starts_with("#META") {
                let meta = line.trim_start_matches("#META").trim();
                if let [key, value] = *meta.splitn(2, ':').map(str::trim).collect::<Vec<_>>().as_slice() {
                    if key == "Archetyp" {
                        archetype = Some(value.to_string());
                    }
                }
                continue;
            }
            if line.starts_with('#') || line.starts_with("Variante") {
                continue;
            }
            let fields: Vec<&str> = line.split(';').map(str::trim).collect();
            let (scenario, cost_group, element, process, mass) = match fields.as_slice() {
                [scenario, cost_group, element, process, mass] => {
                    (*scenario, *cost_group, *element, *process, *mass)
                }
                _ => return Err(LcaError::Parse(line.into())),
            };
            let scenario = parse_scenario_field(scenario)?;
            let mass = parse_de_number_req(mass)?;
            rows_by_scenario
                .entry(scenario)
                .or_default()
                .push(MassRow::new(cost_group, element, process, mass));
        }

        let mut tables = ScenarioMassTables {
            archetype,
            tables: BTreeMap::new(),
        };
        for (scenario, rows) in rows_by_scenario {
            tables.insert(scenario, MassTable::new(rows))?;
        }
        Ok(tables)
    }
}

impl fmt::Display for ScenarioMassTables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(archetype) = &self.archetype {
            writeln!(f, "#META Archetyp: {}", archetype)?;
        }
        writeln!(f, "Variante; Kostengruppe; Bauteil; Prozess; Masse in kg")?;
        for (scenario, table) in &self.tables {
            for row in &table.rows {
                writeln!(
                    f,
                    "{}; {}; {}; {}; {}",
                    scenario,
                    row.cost_group,
                    row.element,
                    row.process,
                    crate::numops::fmt_de(row.mass, 3)
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MASSES: &str = "#META Archetyp: Atelierhaus Plus
# Masses retrieved from the LCA service
Variante; Kostengruppe; Bauteil; Prozess; Masse in kg
Bestand; 331 Tragende Außenwände; Außenwand Mauerwerk [1021]; Vollziegel; 42.500,0
Atelierhaus Plus Außenwandsanierung; 331 Tragende Außenwände; Außenwand Mauerwerk Sanierung [1021]; Vollziegel; 42.500,0
Außenwandsanierung; 335 Außenwandbekleidungen, außen; Außenwand Mauerwerk Sanierung [1021]; Mineralwolle (Fassaden-Dämmung); 812,4
";

    #[test]
    fn mass_element_cleanup() {
        assert_eq!(
            "Außenwand Mauerwerk",
            clean_element_name("Außenwand Mauerwerk Sanierung [1021]")
        );
        assert_eq!("Fenster [Holz", clean_element_name("Fenster [Holz"));
        assert_eq!("Satteldach", clean_element_name(" Satteldach "));
    }

    #[test]
    fn mass_tables_parse() {
        let tables: ScenarioMassTables = MASSES.parse().unwrap();
        assert_eq!(Some("Atelierhaus Plus".to_string()), tables.archetype);
        assert_eq!(2, tables.tables.len());
        let existing = tables.get(Scenario::Existing).unwrap();
        assert_eq!(
            vec![MassRow::new(
                "331 Tragende Außenwände",
                "Außenwand Mauerwerk",
                "Vollziegel",
                42500.0
            )],
            existing.rows
        );
        let wall = tables.get(Scenario::WallRenovation).unwrap();
        assert_eq!(2, wall.rows.len());
        assert_eq!(existing.rows[0], wall.rows[0]);
        assert_eq!(812.4, wall.rows[1].mass);
        assert!((wall.total_mass() - 43312.4).abs() < 1e-9);
    }

    #[test]
    fn mass_tables_reject_derived_and_broken_rows() {
        assert!("Komplettsanierung; 334 Außentüren und -fenster; Fenster; Holzrahmen; 1,0"
            .parse::<ScenarioMassTables>()
            .is_err());
        assert!("Bestand; 334 Außentüren und -fenster; Holzrahmen; 1,0"
            .parse::<ScenarioMassTables>()
            .is_err());
        assert!("Bestand; 334 Außentüren und -fenster; Fenster; Holzrahmen; -"
            .parse::<ScenarioMassTables>()
            .is_err());
    }
}
