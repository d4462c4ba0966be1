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
Gebäudebetrieb und Kapitalwert
==============================

Operational energy of the archetypes and net present value (NPV) of the energy
costs over the evaluation period.

The heating demand of each renovation scenario is the baseline heating demand
reduced by a savings factor that depends on the construction age class, the energy
carrier and the renovation measure. Hot water demand is not affected by renovations.

The NPV of a scenario is:

NPV = Σ_{i=1}^{20} (NGF × demand × price) × (1 + g)^i / (1 + r)^i

where `r` is the discount rate and `g` the annual price increase.
*/

use std::collections::BTreeMap;
use std::str;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::error::{LcaError, Result};
use crate::numops::{discounted_sum, parse_de_number_req, round_dp, round_serialize_3};
use crate::types::{Archetype, Scenario};

/// Evaluation period, years
pub const NPV_YEARS: u32 = 20;

/// Energy carrier used when none of the savings table carriers matches
pub const FALLBACK_CARRIER: &str = "Gas";

// -------------------- Discounting configuration

/// Abzinsungsparameter (Teilwerte)
///
/// Discounting settings as given by one source (configuration file, command line).
/// Both values are needed to run an assessment; there are no defaults.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiscountSettings {
    /// Discount rate, fraction (0.015 = 1.5%)
    pub discount_rate: Option<f64>,
    /// Annual energy price increase, fraction
    pub annual_price_increase: Option<f64>,
}

impl DiscountSettings {
    /// Values of `other` take precedence over the values of `self`
    pub fn override_with(self, other: DiscountSettings) -> DiscountSettings {
        DiscountSettings {
            discount_rate: other.discount_rate.or(self.discount_rate),
            annual_price_increase: other.annual_price_increase.or(self.annual_price_increase),
        }
    }

    /// Build a complete configuration or fail if any value is missing or invalid
    pub fn resolve(self) -> Result<DiscountConfig> {
        let discount_rate = self
            .discount_rate
            .ok_or_else(|| LcaError::Config("missing discount_rate".into()))?;
        let annual_price_increase = self
            .annual_price_increase
            .ok_or_else(|| LcaError::Config("missing annual_price_increase".into()))?;
        let config = DiscountConfig {
            discount_rate,
            annual_price_increase,
        };
        config.validate()?;
        Ok(config)
    }
}

impl str::FromStr for DiscountSettings {
    type Err = LcaError;

    fn from_str(s: &str) -> Result<DiscountSettings> {
        serde_json::from_str(s).map_err(|e| LcaError::Config(format!("discounting settings ({})", e)))
    }
}

/// Abzinsungsparameter
///
/// Discounting configuration, read once and shared by all archetypes
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountConfig {
    /// Discount rate, fraction
    pub discount_rate: f64,
    /// Annual energy price increase, fraction
    pub annual_price_increase: f64,
}

impl DiscountConfig {
    /// Read a complete configuration from JSON (`{"discount_rate": 0.015, "annual_price_increase": 0.05}`)
    pub fn from_json(s: &str) -> Result<DiscountConfig> {
        s.parse::<DiscountSettings>()?.resolve()
    }

    /// Rates must be fractions in (-1, 1)
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("discount_rate", self.discount_rate),
            ("annual_price_increase", self.annual_price_increase),
        ]
        .iter()
        {
            if !(value.abs() < 1.0) {
                return Err(LcaError::Config(format!(
                    "{} must be a fraction between -1 and 1 ({})",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Kapitalwert der Energiekosten
///
/// Net present value of a yearly energy cost over the evaluation period, not rounded
pub fn npv(base_year_cost: f64, config: &DiscountConfig) -> f64 {
    discounted_sum(
        base_year_cost,
        config.annual_price_increase,
        config.discount_rate,
        NPV_YEARS,
    )
}

// -------------------- Savings factors

/// Einsparfaktoren des Heizenergiebedarfs nach Maßnahme
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsFactor {
    /// Wall renovation (Wand)
    pub wall: f64,
    /// Roof renovation (Dach)
    pub roof: f64,
    /// Window renovation (Fenster)
    pub window: f64,
    /// Complete renovation (Alles)
    pub all: f64,
}

impl SavingsFactor {
    /// Factor of a scenario. The existing building keeps its demand
    pub fn get(&self, scenario: Scenario) -> f64 {
        match scenario {
            Scenario::Existing => 1.0,
            Scenario::WallRenovation => self.wall,
            Scenario::RoofRenovation => self.roof,
            Scenario::WindowRenovation => self.window,
            Scenario::CompleteRenovation => self.all,
        }
    }
}

/// Tabelle der Einsparfaktoren
///
/// Savings factors by construction age class and energy carrier, as text:
///
/// ```text
/// Baualtersklasse; Energieträger; Wand; Dach; Fenster; Alles
/// 1958-1968; Gas; 0,78; 0,91; 0,93; 0,62
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavingsFactors {
    /// (age class, energy carrier, factors) in file order
    pub entries: Vec<(String, String, SavingsFactor)>,
}

impl SavingsFactors {
    /// Savings table carrier matching an energy carrier name
    ///
    /// The table carriers are searched as case sensitive substrings of the name and the last
    /// match wins.
    /// Without matches the fallback carrier (`Gas`) is used.
    pub fn resolve_carrier<'a>(&'a self, age_class: &str, carrier: &str) -> Result<&'a str> {
        let mut candidates = self
            .entries
            .iter()
            .filter(|(class, _, _)| class == age_class)
            .peekable();
        if candidates.peek().is_none() {
            return Err(LcaError::WrongInput(format!(
                "no savings factors for building age class \"{}\"",
                age_class
            )));
        }
        let mut fallback = None;
        let mut found = None;
        for (_, name, _) in candidates {
            if carrier.contains(name.as_str()) {
                found = Some(name.as_str());
            }
            if name == FALLBACK_CARRIER {
                fallback = Some(name.as_str());
            }
        }
        match (found, fallback) {
            (Some(name), _) => Ok(name),
            (None, Some(name)) => {
                log::warn!(
                    "No savings factors for \"{}\" ({}), using {}",
                    carrier,
                    age_class,
                    FALLBACK_CARRIER
                );
                Ok(name)
            }
            (None, None) => Err(LcaError::UnknownCarrier(carrier.into())),
        }
    }

    /// Savings factors of a construction age class and energy carrier name
    pub fn factors(&self, age_class: &str, carrier: &str) -> Result<SavingsFactor> {
        let key = self.resolve_carrier(age_class, carrier)?;
        self.entries
            .iter()
            .find(|(class, name, _)| class == age_class && name == key)
            .map(|(_, _, factor)| *factor)
            .ok_or_else(|| LcaError::UnknownCarrier(carrier.into()))
    }
}

impl str::FromStr for SavingsFactors {
    type Err = LcaError;

    fn from_str(s: &str) -> Result<SavingsFactors> {
        let entries = s
            .lines()
            .map(str::trim)
            .filter(|l| !(l.is_empty() || l.starts_with('#') || l.starts_with("Baualtersklasse")))
            .map(|line| {
                let fields: Vec<&str> = line.split(';').map(str::trim).collect();
                match fields.as_slice() {
                    [class, carrier, wall, roof, window, all] => Ok((
                        class.to_string(),
                        carrier.to_string(),
                        SavingsFactor {
                            wall: parse_de_number_req(wall)?,
                            roof: parse_de_number_req(roof)?,
                            window: parse_de_number_req(window)?,
                            all: parse_de_number_req(all)?,
                        },
                    )),
                    _ => Err(LcaError::Parse(line.into())),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        if entries.is_empty() {
            return Err(LcaError::Config("empty savings factors table".into()));
        }
        Ok(SavingsFactors { entries })
    }
}

// -------------------- Energy prices

/// Energiepreise, €/kWh, nach (Teil-)Name des Energieträgers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyPrices(pub BTreeMap<String, f64>);

impl EnergyPrices {
    /// Price for an energy carrier name
    ///
    /// Keys are searched as case sensitive substrings of the name; the longest matching key
    /// wins.
    pub fn price_for(&self, carrier: &str) -> Result<f64> {
        self.0
            .iter()
            .filter(|(key, _)| carrier.contains(key.as_str()))
            .max_by_key(|(key, _)| key.chars().count())
            .map(|(_, price)| *price)
            .ok_or_else(|| LcaError::UnknownCarrier(carrier.into()))
    }
}

impl str::FromStr for EnergyPrices {
    type Err = LcaError;

    fn from_str(s: &str) -> Result<EnergyPrices> {
        let prices: EnergyPrices = serde_json::from_str(s)?;
        if let Some((carrier, price)) = prices.0.iter().find(|(_, p)| !(**p >= 0.0)) {
            return Err(LcaError::Config(format!(
                "wrong energy price for {} ({})",
                carrier, price
            )));
        }
        Ok(prices)
    }
}

// -------------------- Energy demand and NPV

/// Endenergiebedarf eines Szenarios
///
/// Final energy demand of an archetype and scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyDemandRecord {
    /// Archetype name
    pub archetype: String,
    /// Scenario
    pub scenario: Scenario,
    /// Heating final energy, kWh/m²a
    pub heating: f64,
    /// Hot water final energy, kWh/m²a
    pub hot_water: f64,
    /// Energy price, €/kWh
    pub price: f64,
}

impl EnergyDemandRecord {
    /// Total final energy, kWh/m²a
    pub fn final_energy(&self) -> f64 {
        self.heating + self.hot_water
    }
}

/// Energy demand of every scenario of an archetype
pub fn energy_demands(
    archetype: &Archetype,
    savings: &SavingsFactors,
    prices: &EnergyPrices,
) -> Result<Vec<EnergyDemandRecord>> {
    let factors = savings.factors(&archetype.age_class, &archetype.energy_carrier)?;
    let price = prices.price_for(&archetype.energy_carrier)?;
    Ok(Scenario::iter()
        .map(|scenario| {
            let decimals = if scenario == Scenario::CompleteRenovation {
                3
            } else {
                2
            };
            EnergyDemandRecord {
                archetype: archetype.name.clone(),
                scenario,
                heating: round_dp(archetype.heating_demand * factors.get(scenario), decimals),
                hot_water: archetype.hot_water_demand,
                price,
            }
        })
        .collect())
}

/// Kapitalwert eines Szenarios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpvRecord {
    /// Archetype name
    pub archetype: String,
    /// Scenario
    pub scenario: Scenario,
    /// Energy cost of the base year, €
    #[serde(serialize_with = "round_serialize_3")]
    pub base_year_cost: f64,
    /// NPV of the energy costs, €
    #[serde(serialize_with = "round_serialize_3")]
    pub npv: f64,
    /// NPV(Existing) - NPV(scenario), €. Positive values are savings
    #[serde(serialize_with = "round_serialize_3")]
    pub savings: f64,
}

/// NPV of the energy costs of every scenario with demand data
///
/// Values are rounded to 3 decimals. Fails if there is no demand for the existing building.
pub fn npv_records(
    archetype: &Archetype,
    demands: &[EnergyDemandRecord],
    config: &DiscountConfig,
) -> Result<Vec<NpvRecord>> {
    let base_year_cost = |d: &EnergyDemandRecord| archetype.net_floor_area * d.final_energy() * d.price;
    let existing = demands
        .iter()
        .find(|d| d.scenario == Scenario::Existing)
        .ok_or_else(|| LcaError::MissingBaseline {
            archetype: archetype.name.clone(),
            what: "energy demand",
        })?;
    let existing_npv = npv(base_year_cost(existing), config);

    Ok(demands
        .iter()
        .map(|d| {
            let cost = base_year_cost(d);
            let value = npv(cost, config);
            NpvRecord {
                archetype: archetype.name.clone(),
                scenario: d.scenario,
                base_year_cost: round_dp(cost, 3),
                npv: round_dp(value, 3),
                savings: round_dp(existing_npv - value, 3),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAVINGS: &str = "# TABULA savings potentials
Baualtersklasse; Energieträger; Wand; Dach; Fenster; Alles
1958-1968; Gas; 0,78; 0,91; 0,93; 0,621
1958-1968; Öl; 0,8; 0,9; 0,95; 0,65
1958-1968; Fernwärme; 0,82; 0,92; 0,96; 0,7
1969-1978; Öl; 0,85; 0,93; 0,96; 0,72
";

    fn config() -> DiscountConfig {
        DiscountConfig {
            discount_rate: 0.015,
            annual_price_increase: 0.05,
        }
    }

    fn archetype() -> Archetype {
        serde_json::from_str(
            r#"{"archetype name": "Atelierhaus Plus", "GFA in m²": 125.0, "NFA in m²": 100.0,
                "final energy heating in kWh/m²a": 90.0, "final energy hot water in kWh/m²a": 10.0,
                "exterior walls area in m²": 180.0, "roof area in m²": 95.0, "number of windows": 14,
                "energy carrier template": "Erdgas Brennwert Gas", "building age class": "1958-1968"}"#,
        )
        .unwrap()
    }

    #[test]
    fn energy_discount_settings() {
        let file: DiscountSettings = r#"{"discount_rate": 0.015}"#.parse().unwrap();
        assert!(file.resolve().is_err());
        let cli = DiscountSettings {
            discount_rate: Some(0.02),
            annual_price_increase: Some(0.05),
        };
        assert_eq!(
            DiscountConfig {
                discount_rate: 0.02,
                annual_price_increase: 0.05
            },
            file.override_with(cli).resolve().unwrap()
        );
        assert_eq!(
            config(),
            DiscountConfig::from_json(r#"{"discount_rate": 0.015, "annual_price_increase": 0.05}"#)
                .unwrap()
        );
        match DiscountConfig::from_json(r#"{"discount_rate": 1.5, "annual_price_increase": 0.05}"#) {
            Err(LcaError::Config(_)) => (),
            other => panic!("unexpected result {:?}", other),
        }
        assert!("{".parse::<DiscountSettings>().is_err());
    }

    #[test]
    fn energy_npv_reference_value() {
        // NGF 100 m², 100 kWh/m²a, 0.06 €/kWh -> 600 € in the base year
        assert_eq!(17459.911, round_dp(npv(100.0 * 100.0 * 0.06, &config()), 3));
        assert_eq!(13967.929, round_dp(npv(480.0, &config()), 3));
        assert_eq!(0.0, npv(0.0, &config()));
    }

    #[test]
    fn energy_savings_factors() {
        let savings: SavingsFactors = SAVINGS.parse().unwrap();
        assert_eq!("Gas", savings.resolve_carrier("1958-1968", "Gas Brennwert").unwrap());
        assert_eq!("Öl", savings.resolve_carrier("1958-1968", "Öl Brennwert").unwrap());
        // Last match wins
        assert_eq!(
            "Fernwärme",
            savings
                .resolve_carrier("1958-1968", "Öl und Fernwärme")
                .unwrap()
        );
        // Fallback, matching is case sensitive: "Erdgas" does not contain "Gas"
        assert_eq!("Gas", savings.resolve_carrier("1958-1968", "Pellets").unwrap());
        assert_eq!("Gas", savings.resolve_carrier("1958-1968", "Erdgas").unwrap());
        assert_eq!("Gas", savings.resolve_carrier("1958-1968", "gas").unwrap());
        match savings.resolve_carrier("1969-1978", "Pellets") {
            Err(LcaError::UnknownCarrier(_)) => (),
            other => panic!("unexpected result {:?}", other),
        }
        assert!(savings.resolve_carrier("1800-1850", "Gas").is_err());
        assert_eq!(0.8, savings.factors("1958-1968", "Öl Brennwert").unwrap().wall);
        assert!("1958-1968; Gas; 0,78".parse::<SavingsFactors>().is_err());
        assert!("# nothing".parse::<SavingsFactors>().is_err());
    }

    #[test]
    fn energy_prices() {
        let prices: EnergyPrices = r#"{"Gas": 0.06, "Heizöl": 0.08, "Heizöl EL": 0.09}"#.parse().unwrap();
        assert_eq!(0.06, prices.price_for("Gas Brennwert").unwrap());
        match prices.price_for("Erdgas Brennwert") {
            Err(LcaError::UnknownCarrier(_)) => (),
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(0.09, prices.price_for("Heizöl EL Niedertemperatur").unwrap());
        assert_eq!(0.08, prices.price_for("Heizöl").unwrap());
        assert!(prices.price_for("Pellets").is_err());
        assert!(r#"{"Gas": -0.06}"#.parse::<EnergyPrices>().is_err());
    }

    #[test]
    fn energy_demands_and_npv() {
        let savings: SavingsFactors = SAVINGS.parse().unwrap();
        let prices: EnergyPrices = r#"{"Gas": 0.06}"#.parse().unwrap();
        let demands = energy_demands(&archetype(), &savings, &prices).unwrap();
        assert_eq!(5, demands.len());
        let heating: Vec<f64> = demands.iter().map(|d| d.heating).collect();
        assert_eq!(vec![90.0, 70.2, 81.9, 83.7, 55.89], heating);
        assert!(demands.iter().all(|d| d.hot_water == 10.0));
        assert_eq!(100.0, demands[0].final_energy());

        let records = npv_records(&archetype(), &demands, &config()).unwrap();
        let existing = &records[0];
        assert_eq!(Scenario::Existing, existing.scenario);
        assert_eq!(600.0, existing.base_year_cost);
        assert_eq!(17459.911, existing.npv);
        assert_eq!(0.0, existing.savings);
        for record in &records[1..] {
            assert!(record.savings > 0.0);
            assert!((existing.npv - record.npv - record.savings).abs() < 0.002);
        }

        match npv_records(&archetype(), &demands[1..], &config()) {
            Err(LcaError::MissingBaseline { what, .. }) => assert_eq!("energy demand", what),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
