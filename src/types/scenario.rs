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

//! Sanierungsszenarien und Bauteile

use std::fmt;
use std::str;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::error::{LcaError, Result};

// -------------------- Scenario

/// Sanierungsszenario (Variante) eines Archetyps
///
/// Renovation scenario (variant). The textual representation is the suffix used
/// in project names (`"<archetype> <suffix>"`).
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
pub enum Scenario {
    /// Existing building, baseline of every comparison
    #[strum(to_string = "Bestand")]
    #[serde(rename = "Bestand")]
    Existing,
    /// Exterior wall insulation
    #[strum(to_string = "Außenwandsanierung")]
    #[serde(rename = "Außenwandsanierung")]
    WallRenovation,
    /// Roof insulation
    #[strum(to_string = "Dachsanierung")]
    #[serde(rename = "Dachsanierung")]
    RoofRenovation,
    /// Window replacement
    #[strum(to_string = "Fenstersanierung")]
    #[serde(rename = "Fenstersanierung")]
    WindowRenovation,
    /// Wall, roof and window measures together (derived, never retrieved on its own)
    #[strum(to_string = "Komplettsanierung")]
    #[serde(rename = "Komplettsanierung")]
    CompleteRenovation,
}

impl Scenario {
    /// Single measure renovation scenarios
    pub const SINGLE_MEASURES: [Scenario; 3] = [
        Scenario::WallRenovation,
        Scenario::RoofRenovation,
        Scenario::WindowRenovation,
    ];

    /// All scenarios other than the baseline
    pub const RENOVATIONS: [Scenario; 4] = [
        Scenario::WallRenovation,
        Scenario::RoofRenovation,
        Scenario::WindowRenovation,
        Scenario::CompleteRenovation,
    ];

    /// Is this a single component renovation?
    pub fn is_single_measure(self) -> bool {
        Scenario::SINGLE_MEASURES.contains(&self)
    }

    /// Building component renovated by a single measure scenario
    pub fn component(self) -> Option<BuildingComponent> {
        match self {
            Scenario::WallRenovation => Some(BuildingComponent::Wall),
            Scenario::RoofRenovation => Some(BuildingComponent::Roof),
            Scenario::WindowRenovation => Some(BuildingComponent::Window),
            _ => None,
        }
    }

    /// Project name for an archetype and this scenario
    pub fn project_name(self, archetype: &str) -> String {
        format!("{} {}", archetype, self)
    }
}

impl str::FromStr for Scenario {
    type Err = LcaError;

    fn from_str(s: &str) -> Result<Scenario> {
        let s = s.trim();
        if let Some(scenario) = Scenario::iter().find(|v| v.to_string() == s) {
            return Ok(scenario);
        }
        match s {
            "Existing" => Ok(Scenario::Existing),
            "WallRenovation" => Ok(Scenario::WallRenovation),
            "RoofRenovation" => Ok(Scenario::RoofRenovation),
            "WindowRenovation" => Ok(Scenario::WindowRenovation),
            "CompleteRenovation" => Ok(Scenario::CompleteRenovation),
            _ => Err(LcaError::Parse(s.into())),
        }
    }
}

/// Zerlegt einen Projektnamen in Archetyp und Szenario
///
/// Split a project name (`"Atelierhaus Plus Dachsanierung"`) into archetype name and
/// scenario. The scenario is the text after the last space.
pub fn split_project_name(project: &str) -> Result<(String, Scenario)> {
    let project = project.trim();
    match project.rsplitn(2, ' ').collect::<Vec<_>>().as_slice() {
        [suffix, archetype] => Ok((archetype.trim().to_string(), suffix.parse()?)),
        _ => Err(LcaError::Parse(project.into())),
    }
}

// -------------------- BuildingComponent

/// Von der Sanierung betroffenes Bauteil
///
/// Building component targeted by a single measure renovation
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
pub enum BuildingComponent {
    /// Exterior walls (DIN 276 KG 330)
    #[strum(to_string = "Außenwand")]
    #[serde(rename = "Außenwand")]
    Wall,
    /// Roofs (DIN 276 KG 360)
    #[strum(to_string = "Dach")]
    #[serde(rename = "Dach")]
    Roof,
    /// Exterior doors and windows (DIN 276 KG 334)
    #[strum(to_string = "Fenster")]
    #[serde(rename = "Fenster")]
    Window,
}

impl BuildingComponent {
    /// Renovation scenario that replaces or upgrades this component
    pub fn scenario(self) -> Scenario {
        match self {
            BuildingComponent::Wall => Scenario::WallRenovation,
            BuildingComponent::Roof => Scenario::RoofRenovation,
            BuildingComponent::Window => Scenario::WindowRenovation,
        }
    }
}

// -------------------- Cost groups

/// Kostengruppe der Fenster
pub const WINDOW_COST_GROUP: &str = "334 Außentüren und -fenster";

/// Numerischer DIN-276-Code am Anfang einer Kostengruppe (`"361 Dachkonstruktionen"` -> 361)
pub fn cost_group_code(cost_group: &str) -> Option<u16> {
    let digits: String = cost_group
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Zuordnung der DIN-276-Kostengruppen zu den Bauteilen
///
/// Cost group codes of each renovated building component. The sets must be
/// disjoint: the composite renovation overwrites masses group by group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostGroupSets {
    /// Exterior wall cost groups
    pub wall: Vec<u16>,
    /// Roof cost groups
    pub roof: Vec<u16>,
    /// Window cost groups
    pub window: Vec<u16>,
}

impl Default for CostGroupSets {
    fn default() -> Self {
        CostGroupSets {
            wall: vec![330, 331, 332, 333, 335, 336, 337, 338, 339],
            roof: vec![360, 361, 362, 363, 364, 369],
            window: vec![334],
        }
    }
}

impl CostGroupSets {
    /// Build the sets checking that no code belongs to two components
    pub fn new(wall: Vec<u16>, roof: Vec<u16>, window: Vec<u16>) -> Result<Self> {
        let sets = CostGroupSets { wall, roof, window };
        sets.validate()?;
        Ok(sets)
    }

    /// Check that the sets are disjoint
    pub fn validate(&self) -> Result<()> {
        for component in BuildingComponent::iter() {
            for &code in self.codes(component) {
                let owners = BuildingComponent::iter()
                    .filter(|&c| self.codes(c).contains(&code))
                    .count();
                if owners > 1 {
                    return Err(LcaError::OverlappingCostGroup(code));
                }
            }
        }
        Ok(())
    }

    /// Cost group codes of a component
    pub fn codes(&self, component: BuildingComponent) -> &[u16] {
        match component {
            BuildingComponent::Wall => &self.wall,
            BuildingComponent::Roof => &self.roof,
            BuildingComponent::Window => &self.window,
        }
    }

    /// Building component of a cost group, if any
    ///
    /// Fails when the code is claimed by more than one component.
    pub fn component_of(&self, cost_group: &str) -> Result<Option<BuildingComponent>> {
        let code = match cost_group_code(cost_group) {
            Some(code) => code,
            None => return Ok(None),
        };
        let mut owners = BuildingComponent::iter().filter(|&c| self.codes(c).contains(&code));
        match (owners.next(), owners.next()) {
            (Some(_), Some(_)) => Err(LcaError::OverlappingCostGroup(code)),
            (owner, None) => Ok(owner),
            (None, Some(_)) => Ok(None),
        }
    }

    /// Does the cost group belong to the component?
    pub fn belongs_to(&self, cost_group: &str, component: BuildingComponent) -> bool {
        cost_group_code(cost_group)
            .map(|code| self.codes(component).contains(&code))
            .unwrap_or(false)
    }
}

impl fmt::Display for CostGroupSets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt_codes = |codes: &[u16]| {
            codes
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        };
        write!(
            f,
            "Außenwand: {}; Dach: {}; Fenster: {}",
            fmt_codes(&self.wall),
            fmt_codes(&self.roof),
            fmt_codes(&self.window)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scenario_names() {
        assert_eq!("Bestand", Scenario::Existing.to_string());
        assert_eq!(
            Scenario::WallRenovation,
            "Außenwandsanierung".parse::<Scenario>().unwrap()
        );
        assert_eq!(
            Scenario::CompleteRenovation,
            "CompleteRenovation".parse::<Scenario>().unwrap()
        );
        assert!("Kellersanierung".parse::<Scenario>().is_err());
        assert_eq!(
            "Atelierhaus Plus Dachsanierung",
            Scenario::RoofRenovation.project_name("Atelierhaus Plus")
        );
    }

    #[test]
    fn scenario_split_project_name() {
        assert_eq!(
            ("Atelierhaus Plus".to_string(), Scenario::RoofRenovation),
            split_project_name("Atelierhaus Plus Dachsanierung").unwrap()
        );
        assert!(split_project_name("Atelierhaus").is_err());
    }

    #[test]
    fn cost_groups_classification() {
        let sets = CostGroupSets::default();
        assert_eq!(Some(361), cost_group_code("361 Dachkonstruktionen"));
        assert_eq!(None, cost_group_code("Dachkonstruktionen"));
        assert_eq!(
            Some(BuildingComponent::Window),
            sets.component_of(WINDOW_COST_GROUP).unwrap()
        );
        assert_eq!(
            Some(BuildingComponent::Wall),
            sets.component_of("335 Außenwandbekleidungen, außen").unwrap()
        );
        assert_eq!(
            Some(BuildingComponent::Roof),
            sets.component_of("363 Dachbeläge").unwrap()
        );
        assert_eq!(None, sets.component_of("352 Deckenbeläge").unwrap());
        assert!(sets.belongs_to("331 Tragende Außenwände", BuildingComponent::Wall));
    }

    #[test]
    fn cost_groups_overlap() {
        assert!(CostGroupSets::new(vec![331, 334], vec![361], vec![334]).is_err());
        let sets = CostGroupSets {
            wall: vec![331, 334],
            roof: vec![361],
            window: vec![334],
        };
        match sets.component_of(WINDOW_COST_GROUP) {
            Err(LcaError::OverlappingCostGroup(334)) => (),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
