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
Sanierungskosten
================

Renovation costs of the single measures and of the complete renovation.

The renovation material of each measure is detected from the materials added by the
renovation (insulation for walls and roofs, frame material for windows) and looked up
in the unit cost table of the component, that gives Best / Base / Worst case costs per
m² (walls and roofs) or per window:

```text
# Kosten der Außenwanddämmung in €/m²
Material; Best; Base; Worst
Mineralwolle; 95,0; 120,0; 160,0
EPS; 80,0; 105,0; 140,0
unbekannt; 100,0; 130,0; 170,0
```

Costs are expenditures and are reported as negative values.
*/

use std::str;

use serde::{Deserialize, Serialize};

use crate::differencer::{MergedMassTable, MergedRow};
use crate::error::{LcaError, Result};
use crate::numops::parse_de_number_req;
use crate::types::{Archetype, BuildingComponent, ByCase, CostGroupSets, Scenario};

/// Material name used when no known material is detected
pub const UNKNOWN_MATERIAL: &str = "unbekannt";

/// Text marking window frame processes (Rahmen, Holzrahmen, ...)
const FRAME_MARKER: &str = "ahmen";

/// Sanierungskosten je Einheit eines Bauteils
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostTable {
    /// (material, unit costs) in file order
    pub rows: Vec<(String, ByCase<f64>)>,
}

impl CostTable {
    /// Known materials, in file order, without the sentinel row
    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(|(material, _)| material.as_str())
            .filter(|m| *m != UNKNOWN_MATERIAL)
    }

    /// First known material contained in a process name
    pub fn match_material(&self, process: &str) -> Option<&str> {
        self.vocabulary().find(|m| process.contains(m))
    }

    /// Unit costs of a material
    pub fn unit_cost(&self, material: &str) -> Option<ByCase<f64>> {
        self.rows
            .iter()
            .find(|(m, _)| m == material)
            .map(|(_, cost)| *cost)
    }
}

impl str::FromStr for CostTable {
    type Err = LcaError;

    fn from_str(s: &str) -> Result<CostTable> {
        let rows = s
            .lines()
            .map(str::trim)
            .filter(|l| !(l.is_empty() || l.starts_with('#') || l.starts_with("Material")))
            .map(|line| {
                let fields: Vec<&str> = line.split(';').map(str::trim).collect();
                match fields.as_slice() {
                    [material, best, base, worst] => {
                        let costs = ByCase::new(
                            parse_de_number_req(best)?,
                            parse_de_number_req(base)?,
                            parse_de_number_req(worst)?,
                        );
                        if costs.best < 0.0 || costs.base < 0.0 || costs.worst < 0.0 {
                            return Err(LcaError::WrongInput(format!(
                                "negative unit cost for {}",
                                material
                            )));
                        }
                        Ok((material.to_string(), costs))
                    }
                    _ => Err(LcaError::Parse(line.into())),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(CostTable { rows })
    }
}

/// Einheitskostentabellen für Außenwand, Dach und Fenster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostTables {
    /// Exterior wall insulation, €/m²
    pub wall: CostTable,
    /// Roof insulation, €/m²
    pub roof: CostTable,
    /// Windows by frame material, €/window
    pub window: CostTable,
}

impl CostTables {
    /// Cost table of a component
    pub fn get(&self, component: BuildingComponent) -> &CostTable {
        match component {
            BuildingComponent::Wall => &self.wall,
            BuildingComponent::Roof => &self.roof,
            BuildingComponent::Window => &self.window,
        }
    }
}

/// Rows added by the renovations that are part of the complete renovation
fn renovation_rows<'a>(
    merged: &'a MergedMassTable,
    component: BuildingComponent,
    cost_groups: &'a CostGroupSets,
) -> impl Iterator<Item = &'a MergedRow> {
    merged
        .added_rows(Scenario::CompleteRenovation)
        .filter(move |r| cost_groups.belongs_to(&r.cost_group, component))
}

/// Sanierungsbaustoff eines Bauteils
///
/// Walls and roofs: first added process containing a known insulation material.
/// Windows: first added frame process, matched against the known frame materials.
/// Returns `unbekannt` when nothing matches.
pub fn detect_material(
    merged: &MergedMassTable,
    component: BuildingComponent,
    table: &CostTable,
    cost_groups: &CostGroupSets,
) -> String {
    let mut rows = renovation_rows(merged, component, cost_groups);
    let found = match component {
        BuildingComponent::Window => rows
            .find(|r| r.process.contains(FRAME_MARKER))
            .and_then(|r| table.match_material(&r.process)),
        _ => rows.find_map(|r| table.match_material(&r.process)),
    };
    found.unwrap_or(UNKNOWN_MATERIAL).to_string()
}

/// Sanierungskosten eines Szenarios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenovationCost {
    /// Archetype name
    pub archetype: String,
    /// Renovation scenario
    pub scenario: Scenario,
    /// Renovation material (single measures only)
    pub material: Option<String>,
    /// Renovated quantity, m² or number of windows (single measures only)
    pub quantity: Option<f64>,
    /// Unit costs (single measures only)
    pub unit_cost: Option<ByCase<f64>>,
    /// Total cost, €. Negative values are expenditures
    pub cost: ByCase<f64>,
}

/// Renovated quantity of a component
pub fn quantity(archetype: &Archetype, component: BuildingComponent) -> f64 {
    match component {
        BuildingComponent::Wall => archetype.wall_area,
        BuildingComponent::Roof => archetype.roof_area,
        BuildingComponent::Window => f64::from(archetype.windows),
    }
}

/// Sanierungskosten der Einzelmaßnahmen und der Komplettsanierung
///
/// Fails when a detected material has no cost row and the table has no `unbekannt` row.
pub fn renovation_costs(
    archetype: &Archetype,
    merged: &MergedMassTable,
    tables: &CostTables,
    cost_groups: &CostGroupSets,
) -> Result<Vec<RenovationCost>> {
    let mut costs = Vec::with_capacity(4);
    for &scenario in Scenario::SINGLE_MEASURES.iter() {
        let component = match scenario.component() {
            Some(component) => component,
            None => continue,
        };
        let table = tables.get(component);
        let material = detect_material(merged, component, table, cost_groups);
        let unit_cost = table
            .unit_cost(&material)
            .or_else(|| table.unit_cost(UNKNOWN_MATERIAL))
            .ok_or_else(|| LcaError::UnknownMaterial {
                component,
                material: material.clone(),
            })?;
        if material == UNKNOWN_MATERIAL {
            log::warn!(
                "{}: no known renovation material for {}, using \"{}\" costs",
                archetype.name,
                component,
                UNKNOWN_MATERIAL
            );
        }
        let quantity = quantity(archetype, component);
        costs.push(RenovationCost {
            archetype: archetype.name.clone(),
            scenario,
            material: Some(material),
            quantity: Some(quantity),
            unit_cost: Some(unit_cost),
            cost: (-(unit_cost * quantity)).round(3),
        });
    }
    let total = costs.iter().map(|c| c.cost).sum::<ByCase<f64>>();
    costs.push(RenovationCost {
        archetype: archetype.name.clone(),
        scenario: Scenario::CompleteRenovation,
        material: None,
        quantity: None,
        unit_cost: None,
        cost: total.round(3),
    });
    Ok(costs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differencer::merge_scenarios;
    use crate::types::{MassRow, MassTable, ScenarioMassTables, WINDOW_COST_GROUP};
    use pretty_assertions::assert_eq;

    const WALL_COSTS: &str = "# €/m²
Material; Best; Base; Worst
Mineralwolle; 95,0; 120,0; 160,0
EPS; 80; 105; 140
unbekannt; 100; 130; 170
";
    const ROOF_COSTS: &str = "Material; Best; Base; Worst
Holzfaser; 60; 75; 90
Mineralwolle; 50; 65; 80
";
    const WINDOW_COSTS: &str = "Material; Best; Base; Worst
Holz; 600; 800; 1000
Kunststoff; 400; 550; 700
";

    fn tables() -> CostTables {
        CostTables {
            wall: WALL_COSTS.parse().unwrap(),
            roof: ROOF_COSTS.parse().unwrap(),
            window: WINDOW_COSTS.parse().unwrap(),
        }
    }

    fn archetype() -> Archetype {
        serde_json::from_str(
            r#"{"archetype name": "Atelierhaus Plus", "GFA in m²": 125.0, "NFA in m²": 100.0,
                "final energy heating in kWh/m²a": 90.0, "final energy hot water in kWh/m²a": 10.0,
                "exterior walls area in m²": 200.0, "roof area in m²": 100.0, "number of windows": 10,
                "energy carrier template": "Gas", "building age class": "1958-1968"}"#,
        )
        .unwrap()
    }

    fn merged_table(wall_process: &str, roof_process: &str) -> MergedMassTable {
        let existing = vec![
            MassRow::new("331 Tragende Außenwände", "Außenwand", "Vollziegel", 42500.0),
            MassRow::new("361 Dachkonstruktionen", "Dach", "Konstruktionsholz", 3100.0),
            MassRow::new(WINDOW_COST_GROUP, "Fenster", "Holzrahmen", 410.0),
        ];
        let with = |row: MassRow| {
            let mut rows = existing.clone();
            rows.push(row);
            MassTable::new(rows)
        };
        let mut tables = ScenarioMassTables::default();
        tables.insert(Scenario::Existing, MassTable::new(existing.clone())).unwrap();
        tables
            .insert(
                Scenario::WallRenovation,
                with(MassRow::new("335 Außenwandbekleidungen, außen", "Außenwand", wall_process, 810.0)),
            )
            .unwrap();
        tables
            .insert(
                Scenario::RoofRenovation,
                with(MassRow::new("363 Dachbeläge", "Dach", roof_process, 950.0)),
            )
            .unwrap();
        let mut window = existing[..2].to_vec();
        window.push(MassRow::new(WINDOW_COST_GROUP, "Fenster", "Dreifachverglasung", 760.0));
        window.push(MassRow::new(WINDOW_COST_GROUP, "Fenster", "Kunststoffrahmen", 380.0));
        tables
            .insert(Scenario::WindowRenovation, MassTable::new(window))
            .unwrap();
        merge_scenarios("Atelierhaus Plus", &tables, &CostGroupSets::default()).unwrap()
    }

    #[test]
    fn costs_table_parse() {
        let table: CostTable = WALL_COSTS.parse().unwrap();
        assert_eq!(vec!["Mineralwolle", "EPS"], table.vocabulary().collect::<Vec<_>>());
        assert_eq!(Some(ByCase::new(80.0, 105.0, 140.0)), table.unit_cost("EPS"));
        assert_eq!(None, table.unit_cost("Holzfaser"));
        assert!("Material; Best; Base; Worst\nEPS; 80; 105".parse::<CostTable>().is_err());
        assert!("EPS; -80; 105; 140".parse::<CostTable>().is_err());
    }

    #[test]
    fn costs_material_detection() {
        let cost_groups = CostGroupSets::default();
        let tables = tables();
        let merged = merged_table("Mineralwolle (Fassaden-Dämmung)", "Holzfaserdämmplatte");
        assert_eq!(
            "Mineralwolle",
            detect_material(&merged, BuildingComponent::Wall, &tables.wall, &cost_groups)
        );
        assert_eq!(
            "Holzfaser",
            detect_material(&merged, BuildingComponent::Roof, &tables.roof, &cost_groups)
        );
        assert_eq!(
            "Kunststoff",
            detect_material(&merged, BuildingComponent::Window, &tables.window, &cost_groups)
        );
        let unknown = merged_table("Zellulose", "Zellulose");
        assert_eq!(
            UNKNOWN_MATERIAL,
            detect_material(&unknown, BuildingComponent::Roof, &tables.roof, &cost_groups)
        );
    }

    #[test]
    fn costs_renovation_costs() {
        let cost_groups = CostGroupSets::default();
        let merged = merged_table("EPS-Dämmplatte", "Mineralwolle");
        let costs = renovation_costs(&archetype(), &merged, &tables(), &cost_groups).unwrap();
        assert_eq!(4, costs.len());
        assert_eq!(Some("EPS".to_string()), costs[0].material);
        assert_eq!(ByCase::new(-16000.0, -21000.0, -28000.0), costs[0].cost);
        assert_eq!(ByCase::new(-5000.0, -6500.0, -8000.0), costs[1].cost);
        assert_eq!(ByCase::new(-4000.0, -5500.0, -7000.0), costs[2].cost);
        let complete = &costs[3];
        assert_eq!(Scenario::CompleteRenovation, complete.scenario);
        assert_eq!(None, complete.material);
        assert_eq!(ByCase::new(-25000.0, -33000.0, -43000.0), complete.cost);
    }

    #[test]
    fn costs_unknown_material() {
        let cost_groups = CostGroupSets::default();
        // Wall table has a sentinel row, roof table has not
        let merged = merged_table("Zellulose", "Mineralwolle");
        let costs = renovation_costs(&archetype(), &merged, &tables(), &cost_groups).unwrap();
        assert_eq!(Some(UNKNOWN_MATERIAL.to_string()), costs[0].material);
        assert_eq!(ByCase::new(-20000.0, -26000.0, -34000.0), costs[0].cost);

        let merged = merged_table("EPS", "Zellulose");
        match renovation_costs(&archetype(), &merged, &tables(), &cost_groups) {
            Err(LcaError::UnknownMaterial { component, material }) => {
                assert_eq!(BuildingComponent::Roof, component);
                assert_eq!(UNKNOWN_MATERIAL, material);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}
