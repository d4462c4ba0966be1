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

use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::comparison::{ComparisonRow, RankEntry, Rankings};
use crate::differencer::MergedMassTable;
use crate::numops::{fmt_de, fmt_de_or_dash};
use crate::pipeline::{ArchetypeResult, AssessmentReport};
use crate::types::{ByCase, Scenario};

// ==================== Umwandlung in Textformat

/// Darstellung im einfachen Textformat
///
/// Compact plain text representation of the assessment tables, with German labels
/// and decimal commas
pub trait AsPlain {
    /// Get in plain format
    fn to_plain(&self) -> String;
}

// ================= Implementierungen ====================

/// Best / Base / Worst mit 2 Nachkommastellen
fn bycase2string(v: &ByCase<f64>) -> String {
    format!(
        "Best {}, Base {}, Worst {}",
        fmt_de(v.best, 2),
        fmt_de(v.base, 2),
        fmt_de(v.worst, 2)
    )
}

impl AsPlain for MergedMassTable {
    fn to_plain(&self) -> String {
        let scenarios: Vec<Scenario> = Scenario::iter().collect();
        let header = format!(
            "Kostengruppe; Bauteil; Prozess; {}",
            scenarios
                .iter()
                .map(|s| format!("Masse in kg {}", s))
                .join("; ")
        );
        let rows = self
            .rows
            .iter()
            .map(|r| {
                format!(
                    "{}; {}; {}; {}",
                    r.cost_group,
                    r.element,
                    r.process,
                    scenarios
                        .iter()
                        .map(|s| fmt_de_or_dash(r.mass(*s), 3))
                        .join("; ")
                )
            })
            .join("\n");
        format!("** Baustoffe {}\n\n{}\n{}", self.archetype, header, rows)
    }
}

impl AsPlain for ComparisonRow {
    fn to_plain(&self) -> String {
        let scenario = self.scenario;
        let outcome = bycase2string(&self.outcome);
        let cost = bycase2string(&self.renovation_cost);
        let npv = fmt_de(self.npv_savings, 2);
        let pct = fmt_de_or_dash(self.gwp_change_percent, 1);
        let gwp = fmt_de(self.gwp_change, 2);
        let ratio = fmt_de_or_dash(self.gwp_per_euro, 3);
        let priority = self.priority;
        let quarter = bycase2string(&self.quarter.outcome);
        let quarter_gwp = fmt_de(self.quarter.gwp_change, 1);
        format!(
            "- {scenario}: Vergleich [€]: {outcome}
    Sanierungskosten [€]: {cost}; Kapitalwert Einsparungen [€]: {npv}
    Veränderung zu Bestand: {pct} [%], {gwp} [kg CO2-Äqv./m²NGF·a]; {ratio} [kg CO2-Äqv./a pro Euro]; {priority}
    Quartier: {quarter}; {quarter_gwp} [kg CO2-Äqv./a]"
        )
    }
}

impl AsPlain for ArchetypeResult {
    fn to_plain(&self) -> String {
        let name = &self.archetype.name;
        let nfa = fmt_de(self.archetype.net_floor_area, 2);
        let buildings = self.archetype.buildings;

        let operation = self
            .demands
            .iter()
            .map(|d| {
                format!(
                    "- {}: Heizung {}, Warmwasser {}, Endenergie {} [kWh/m²a]; Preis {} [€/kWh]",
                    d.scenario,
                    fmt_de(d.heating, 2),
                    fmt_de(d.hot_water, 2),
                    fmt_de(d.final_energy(), 2),
                    fmt_de(d.price, 3)
                )
            })
            .join("\n");
        let npv = self
            .npv
            .iter()
            .map(|r| {
                format!(
                    "- {}: Kapitalwert {} [€], Einsparungen {} [€]",
                    r.scenario,
                    fmt_de(r.npv, 3),
                    fmt_de(r.savings, 3)
                )
            })
            .join("\n");
        let costs = self
            .costs
            .iter()
            .map(|c| {
                let material = c.material.as_deref().unwrap_or("-");
                format!("- {} ({}): {}", c.scenario, material, bycase2string(&c.cost))
            })
            .join("\n");
        let modules = self
            .gwp
            .iter()
            .map(|r| {
                let values = r
                    .modules
                    .distribution()
                    .iter()
                    .map(|(module, v)| format!("{} {}", module, fmt_de(*v, 1)))
                    .join(", ");
                format!("- {}: {} (Gesamt {})", r.scenario, values, fmt_de(r.total, 2))
            })
            .join("\n");
        let comparison = self.comparison.iter().map(AsPlain::to_plain).join("\n");
        let masses = self.masses.to_plain();

        format!(
            "*** Archetyp {name} (NGF = {nfa} [m²], Anzahl im Quartier = {buildings})

** Gebäudebetrieb

{operation}

** Kapitalwert der Energiekosten über 20 Jahre

{npv}

** Sanierungskosten

{costs}

** Treibhauspotenzial nach Modulen [kg CO2-Äqv./m²NGF·a]

{modules}

** Vergleich

{comparison}

{masses}"
        )
    }
}

fn ranking2string(entries: &[RankEntry]) -> String {
    if entries.is_empty() {
        return "-".to_string();
    }
    entries
        .iter()
        .map(|e| format!("- {}: {}", e.label(), fmt_de(e.value, 3)))
        .join("\n")
}

impl AsPlain for Rankings {
    fn to_plain(&self) -> String {
        let first = ranking2string(&self.first);
        let second = ranking2string(&self.second);
        let order = ranking2string(&self.order);
        format!(
            "** kg CO2-Äqv./a-Einsparung pro eingenommenem Euro (1. Priorität)

{first}

** kg CO2-Äqv./a-Einsparung pro ausgegebenem Euro (2. Priorität)

{second}

** Priorisierungsabfolge [kg CO2-Äqv./a pro Euro]

{order}"
        )
    }
}

impl AsPlain for AssessmentReport {
    fn to_plain(&self) -> String {
        let composition = self
            .results
            .iter()
            .map(|r| {
                format!(
                    "- {}: {} Gebäude, NGF {} [m²]",
                    r.archetype.name,
                    r.archetype.buildings,
                    fmt_de(r.archetype.quarter_net_floor_area(), 2)
                )
            })
            .join("\n");
        let results = self.results.iter().map(AsPlain::to_plain).join("\n\n");
        let rankings = self.rankings.to_plain();
        let skipped = if self.skipped.is_empty() {
            String::new()
        } else {
            let list = self
                .skipped
                .iter()
                .map(|s| format!("- {}: {}", s.name, s.reason))
                .join("\n");
            format!("\n\n** Nicht bewertete Archetypen\n\n{list}")
        };
        format!(
            "**** Quartierszusammensetzung

{composition}

{results}

{rankings}{skipped}
"
        )
    }
}
