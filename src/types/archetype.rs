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
Arquetipos
==========

Building archetypes and the registry that holds them for a whole assessment run.

Archetypes are read from a JSON list with the same keys used by the data entry
forms, e.g.:

```json
[{ "archetype name": "Atelierhaus Plus", "GFA in m²": 250.0, "NFA in m²": 200.0,
   "final energy heating in kWh/m²a": 120.0, "final energy hot water in kWh/m²a": 12.5,
   "exterior walls area in m²": 180.0, "roof area in m²": 95.0, "number of windows": 14,
   "energy carrier template": "Erdgas Brennwert", "building age class": "1958-1968" }]
```
*/

use std::collections::HashSet;
use std::fmt;
use std::str;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{LcaError, Result};

fn one_building() -> u32 {
    1
}

// Form data stores template IDs either as numbers or as strings
fn de_opt_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Gebäudearchetyp
///
/// Representative building type of the neighbourhood
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    /// Unique name. Project names are built as `"<name> <scenario>"`
    #[serde(rename = "archetype name")]
    pub name: String,
    /// Gross floor area (BGF), m²
    #[serde(rename = "GFA in m²")]
    pub gross_floor_area: f64,
    /// Net floor area (NGF), m²
    #[serde(rename = "NFA in m²")]
    pub net_floor_area: f64,
    /// Baseline final energy for heating, kWh/m²a
    #[serde(rename = "final energy heating in kWh/m²a")]
    pub heating_demand: f64,
    /// Final energy for hot water, kWh/m²a. Not affected by renovations
    #[serde(rename = "final energy hot water in kWh/m²a")]
    pub hot_water_demand: f64,
    /// Exterior wall area, m²
    #[serde(rename = "exterior walls area in m²")]
    pub wall_area: f64,
    /// Roof area, m²
    #[serde(rename = "roof area in m²")]
    pub roof_area: f64,
    /// Number of windows
    #[serde(rename = "number of windows")]
    pub windows: u32,
    /// Energy carrier name (e.g. "Erdgas Brennwert")
    #[serde(rename = "energy carrier template")]
    pub energy_carrier: String,
    /// Energy carrier ID in the LCA service
    #[serde(
        rename = "energy carrier ID",
        default,
        deserialize_with = "de_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub energy_carrier_id: Option<String>,
    /// Construction age class (Baualtersklasse)
    #[serde(rename = "building age class")]
    pub age_class: String,
    /// Exterior wall component template
    #[serde(rename = "exterior walls template", default)]
    pub wall_template: String,
    /// Roof component template
    #[serde(rename = "roof template", default)]
    pub roof_template: String,
    /// Window component template
    #[serde(rename = "window template", default)]
    pub window_template: String,
    /// Exterior wall template ID
    #[serde(
        rename = "exterior walls ID",
        default,
        deserialize_with = "de_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub wall_id: Option<String>,
    /// Roof template ID
    #[serde(
        rename = "roof ID",
        default,
        deserialize_with = "de_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub roof_id: Option<String>,
    /// Window template ID
    #[serde(
        rename = "window ID",
        default,
        deserialize_with = "de_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub window_id: Option<String>,
    /// Number of buildings of this archetype in the neighbourhood
    #[serde(
        rename = "number of buildings",
        alias = "Anzahl im Quartier",
        default = "one_building"
    )]
    pub buildings: u32,
}

impl Archetype {
    /// Name without whitespace, as used for file names of retrieved project data
    pub fn no_spaces_name(&self) -> String {
        self.name.split_whitespace().collect()
    }

    /// Total net floor area of all the buildings of this archetype
    pub fn quarter_net_floor_area(&self) -> f64 {
        self.net_floor_area * f64::from(self.buildings)
    }

    /// Check the attribute values
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LcaError::WrongInput("archetype without name".into()));
        }
        let positive = [
            ("GFA in m²", self.gross_floor_area),
            ("NFA in m²", self.net_floor_area),
        ];
        for (label, value) in positive.iter() {
            if !(*value > 0.0) {
                return Err(LcaError::WrongInput(format!(
                    "{} of archetype \"{}\" must be positive ({})",
                    label, self.name, value
                )));
            }
        }
        let non_negative = [
            ("final energy heating in kWh/m²a", self.heating_demand),
            ("final energy hot water in kWh/m²a", self.hot_water_demand),
            ("exterior walls area in m²", self.wall_area),
            ("roof area in m²", self.roof_area),
        ];
        for (label, value) in non_negative.iter() {
            if !(*value >= 0.0) {
                return Err(LcaError::WrongInput(format!(
                    "{} of archetype \"{}\" must not be negative ({})",
                    label, self.name, value
                )));
            }
        }
        if self.buildings == 0 {
            return Err(LcaError::WrongInput(format!(
                "archetype \"{}\" has no buildings in the quarter",
                self.name
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (BGF {:.1} m², NGF {:.1} m², {}, {}, {}x)",
            self.name,
            self.gross_floor_area,
            self.net_floor_area,
            self.energy_carrier,
            self.age_class,
            self.buildings
        )
    }
}

/// Archetypenregister
///
/// Validated list of archetypes. Names are unique and the order of entry is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArchetypeRegistry {
    archetypes: Vec<Archetype>,
}

impl ArchetypeRegistry {
    /// Build a registry from a list of archetypes
    pub fn new(archetypes: Vec<Archetype>) -> Result<Self> {
        let mut names = HashSet::new();
        for archetype in &archetypes {
            archetype.validate()?;
            if !names.insert(archetype.name.as_str()) {
                return Err(LcaError::DuplicateArchetype(archetype.name.clone()));
            }
        }
        Ok(Self { archetypes })
    }

    /// Find an archetype by name
    pub fn get(&self, name: &str) -> Result<&Archetype> {
        self.archetypes
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| LcaError::UnknownArchetype(name.into()))
    }

    /// Iterate over the archetypes in entry order
    pub fn iter(&self) -> std::slice::Iter<'_, Archetype> {
        self.archetypes.iter()
    }

    /// Number of archetypes
    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    /// Is the registry empty?
    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    /// Total number of buildings in the neighbourhood
    pub fn total_buildings(&self) -> u32 {
        self.archetypes.iter().map(|a| a.buildings).sum()
    }
}

impl<'a> IntoIterator for &'a ArchetypeRegistry {
    type Item = &'a Archetype;
    type IntoIter = std::slice::Iter<'a, Archetype>;

    fn into_iter(self) -> Self::IntoIter {
        self.archetypes.iter()
    }
}

impl str::FromStr for ArchetypeRegistry {
    type Err = LcaError;

    fn from_str(s: &str) -> Result<ArchetypeRegistry> {
        let archetypes: Vec<Archetype> = serde_json::from_str(s)?;
        ArchetypeRegistry::new(archetypes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ARCHETYPES: &str = r#"[
        {
            "archetype name": "Atelierhaus Plus",
            "GFA in m²": 250.0,
            "NFA in m²": 200.0,
            "final energy heating in kWh/m²a": 120.0,
            "final energy hot water in kWh/m²a": 12.5,
            "exterior walls area in m²": 180.0,
            "roof area in m²": 95.0,
            "number of windows": 14,
            "number of heating supply systems": 1,
            "energy carrier template": "Erdgas Brennwert",
            "energy carrier ID": 412,
            "exterior walls template": "AW Mauerwerk",
            "window template": "Fenster Holz",
            "roof template": "Satteldach",
            "exterior walls ID": "1021",
            "window ID": 1022,
            "roof ID": null,
            "building age class": "1958-1968"
        },
        {
            "archetype name": "Reihenhaus",
            "GFA in m²": 140.0,
            "NFA in m²": 110.0,
            "final energy heating in kWh/m²a": 150.0,
            "final energy hot water in kWh/m²a": 12.5,
            "exterior walls area in m²": 90.0,
            "roof area in m²": 60.0,
            "number of windows": 8,
            "energy carrier template": "Heizöl",
            "building age class": "1969-1978",
            "Anzahl im Quartier": 12
        }
    ]"#;

    #[test]
    fn archetype_registry_from_json() {
        let registry: ArchetypeRegistry = ARCHETYPES.parse().unwrap();
        assert_eq!(2, registry.len());
        let atelier = registry.get("Atelierhaus Plus").unwrap();
        assert_eq!("AtelierhausPlus", atelier.no_spaces_name());
        assert_eq!(Some("412".to_string()), atelier.energy_carrier_id);
        assert_eq!(Some("1021".to_string()), atelier.wall_id);
        assert_eq!(None, atelier.roof_id);
        assert_eq!(1, atelier.buildings);
        let reihenhaus = registry.get("Reihenhaus").unwrap();
        assert_eq!(12, reihenhaus.buildings);
        assert_eq!(1320.0, reihenhaus.quarter_net_floor_area());
        assert_eq!(13, registry.total_buildings());
        assert!(registry.get("Villa").is_err());
    }

    #[test]
    fn archetype_registry_invariants() {
        let registry: ArchetypeRegistry = ARCHETYPES.parse().unwrap();
        let mut archetypes: Vec<Archetype> = registry.iter().cloned().collect();
        archetypes.push(archetypes[0].clone());
        match ArchetypeRegistry::new(archetypes.clone()) {
            Err(LcaError::DuplicateArchetype(name)) => assert_eq!("Atelierhaus Plus", name),
            other => panic!("unexpected result {:?}", other),
        }
        archetypes.truncate(1);
        archetypes[0].net_floor_area = 0.0;
        assert!(ArchetypeRegistry::new(archetypes).is_err());
    }
}
