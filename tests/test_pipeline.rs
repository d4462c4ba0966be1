use std::collections::HashMap;
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

use pretty_assertions::assert_eq;
use strum::IntoEnumIterator;

use lcarefurb::*;

const DATADIR: &str = "test_data/quartier";
const ATELIERHAUS: &str = "Atelierhaus Plus";

fn read_data(name: &str) -> String {
    let path = Path::new(DATADIR).join(name);
    let mut f = File::open(path).unwrap();
    let mut contents = String::new();
    f.read_to_string(&mut contents).unwrap();
    contents
}

fn refdata() -> ReferenceData {
    ReferenceData {
        discount: DiscountConfig::from_json(&read_data("discounting.json")).unwrap(),
        prices: read_data("energy_prices.json").parse().unwrap(),
        savings: read_data("savings.csv").parse().unwrap(),
        costs: CostTables {
            wall: read_data("wall_costs.csv").parse().unwrap(),
            roof: read_data("roof_costs.csv").parse().unwrap(),
            window: read_data("window_costs.csv").parse().unwrap(),
        },
        cost_groups: CostGroupSets::default(),
    }
}

fn registry() -> ArchetypeRegistry {
    read_data("archetypes.json").parse().unwrap()
}

fn source_with_masses(masses: &str) -> MemorySource {
    let mut tables = HashMap::new();
    tables.insert(
        ATELIERHAUS.to_string(),
        masses.parse::<ScenarioMassTables>().unwrap(),
    );
    MemorySource {
        masses: tables,
        gwp: read_data("projects/AtelierhausPlusWirkungsanalyse.json")
            .parse()
            .unwrap(),
    }
}

fn source() -> MemorySource {
    source_with_masses(&read_data("projects/AtelierhausPlusBaustoffe.csv"))
}

fn approx_equal(expected: f64, got: f64) -> bool {
    (expected - got).abs() < 1e-3
}

fn row<'a>(rows: &'a [ComparisonRow], scenario: Scenario) -> &'a ComparisonRow {
    rows.iter().find(|r| r.scenario == scenario).unwrap()
}

#[test]
fn pipeline_registry() {
    let registry = registry();
    assert_eq!(2, registry.len());
    assert_eq!(11, registry.total_buildings());
    let archetype = registry.get(ATELIERHAUS).unwrap();
    assert_eq!("AtelierhausPlus", archetype.no_spaces_name());
    assert_eq!(Some("1187".to_string()), archetype.energy_carrier_id);
    assert_eq!(600.0, archetype.quarter_net_floor_area());
    assert!(registry.get("Einfamilienhaus").is_err());
}

#[test]
fn pipeline_energy_demand_and_npv() {
    let registry = registry();
    let refdata = refdata();
    let archetype = registry.get(ATELIERHAUS).unwrap();

    let demands = energy_demands(archetype, &refdata.savings, &refdata.prices).unwrap();
    let heating: Vec<f64> = demands.iter().map(|d| d.heating).collect();
    assert_eq!(vec![120.0, 96.0, 108.0, 110.4, 72.0], heating);
    assert!(demands.iter().all(|d| d.hot_water == 12.5 && d.price == 0.08));

    let npv = npv_records(archetype, &demands, &refdata.discount).unwrap();
    let expected = [
        (Scenario::Existing, 61691.686, 0.0),
        (Scenario::WallRenovation, 50517.343, 11174.343),
        (Scenario::RoofRenovation, 56104.514, 5587.172),
        (Scenario::WindowRenovation, 57221.948, 4469.737),
        (Scenario::CompleteRenovation, 39343.0, 22348.686),
    ];
    for (scenario, value, savings) in expected.iter() {
        let record = npv.iter().find(|r| r.scenario == *scenario).unwrap();
        assert!(approx_equal(*value, record.npv), "{} {}", scenario, record.npv);
        assert!(
            approx_equal(*savings, record.savings),
            "{} {}",
            scenario,
            record.savings
        );
    }
}

#[test]
fn pipeline_merged_masses() {
    let source = source();
    let registry = registry();
    let archetype = registry.get(ATELIERHAUS).unwrap();
    let tables = source.mass_tables(archetype).unwrap();
    assert_eq!(Some(ATELIERHAUS.to_string()), tables.archetype);

    let merged = merge_scenarios(ATELIERHAUS, &tables, &CostGroupSets::default()).unwrap();
    // 7 existing rows, 2 new wall rows, 1 new roof row, 2 new window rows
    assert_eq!(12, merged.rows.len());

    let added: Vec<&str> = merged
        .added_rows(Scenario::CompleteRenovation)
        .map(|r| r.process.as_str())
        .collect();
    assert_eq!(
        vec![
            "Klebemörtel",
            "Mineralwolle (Fassaden-Dämmung)",
            "Holzfaser-Dämmplatte",
            "Kunststoffrahmen",
            "Dreifachverglasung"
        ],
        added
    );

    let window_group = WINDOW_COST_GROUP;
    assert_eq!(930.0, merged.cost_group_mass(window_group, Scenario::Existing));
    assert_eq!(930.0, merged.cost_group_mass(window_group, Scenario::WallRenovation));
    assert_eq!(1170.0, merged.cost_group_mass(window_group, Scenario::WindowRenovation));
    assert_eq!(
        1170.0,
        merged.cost_group_mass(window_group, Scenario::CompleteRenovation)
    );
    assert!(approx_equal(
        merged.cost_group_mass("335 Außenwandbekleidungen, außen", Scenario::WallRenovation),
        merged.cost_group_mass(
            "335 Außenwandbekleidungen, außen",
            Scenario::CompleteRenovation
        )
    ));
}

#[test]
fn pipeline_assess_quarter() {
    let report = assess(&registry(), &source(), &refdata());

    assert_eq!(1, report.results.len());
    assert_eq!(1, report.skipped.len());
    assert_eq!("Reihenhaus Mitte", report.skipped[0].name);
    assert!(report.skipped[0].reason.contains("mass table"));

    let result = &report.results[0];
    assert_eq!(ATELIERHAUS, result.archetype.name);

    let materials: Vec<Option<&str>> = result
        .costs
        .iter()
        .map(|c| c.material.as_deref())
        .collect();
    assert_eq!(
        vec![Some("Mineralwolle"), Some("Holzfaser"), Some("Kunststoff"), None],
        materials
    );
    let complete = result
        .costs
        .iter()
        .find(|c| c.scenario == Scenario::CompleteRenovation)
        .unwrap();
    assert_eq!(ByCase::new(-24600.0, -31800.0, -42150.0), complete.cost);

    let rows = &result.comparison;
    assert_eq!(4, rows.len());

    let wall = row(rows, Scenario::WallRenovation);
    assert!(approx_equal(-10425.657, wall.outcome.base));
    assert!(approx_equal(-4.0, wall.gwp_change));
    assert!(approx_equal(-8.333, wall.gwp_change_percent.unwrap()));
    assert_eq!(PriorityClass::SecondPriority, wall.priority);

    let roof = row(rows, Scenario::RoofRenovation);
    assert!(approx_equal(2887.172, roof.outcome.best));
    assert!(approx_equal(1987.172, roof.outcome.base));
    assert!(approx_equal(637.172, roof.outcome.worst));
    assert!(approx_equal(-0.151, roof.gwp_per_euro.unwrap()));
    assert_eq!(PriorityClass::FirstPriority, roof.priority);
    assert_eq!(3, roof.quarter.buildings);
    assert!(approx_equal(5961.516, roof.quarter.outcome.base));
    assert!(approx_equal(-900.0, roof.quarter.gwp_change));

    let complete = row(rows, Scenario::CompleteRenovation);
    assert!(approx_equal(-9451.314, complete.outcome.base));
    assert_eq!(PriorityClass::Excluded, complete.priority);
}

#[test]
fn pipeline_outcome_is_npv_savings_plus_renovation_cost() {
    let report = assess(&registry(), &source(), &refdata());
    let result = &report.results[0];
    let existing = result
        .npv
        .iter()
        .find(|r| r.scenario == Scenario::Existing)
        .unwrap();

    for row in &result.comparison {
        let npv = result
            .npv
            .iter()
            .find(|r| r.scenario == row.scenario)
            .unwrap();
        assert_eq!(npv.savings, row.npv_savings, "{}", row.scenario);
        assert!(approx_equal(existing.npv - npv.npv, row.npv_savings));
        for case in CostCase::iter() {
            assert!(
                approx_equal(
                    row.npv_savings + row.renovation_cost.get(case),
                    row.outcome.get(case)
                ),
                "{} {}",
                row.scenario,
                case
            );
        }
    }
}

#[test]
fn pipeline_rankings() {
    let report = assess(&registry(), &source(), &refdata());
    let rankings = &report.rankings;

    fn labels(entries: &[RankEntry]) -> Vec<Scenario> {
        entries.iter().map(|e| e.scenario).collect()
    }
    assert_eq!(vec![Scenario::RoofRenovation], labels(&rankings.first));
    assert!(approx_equal(0.151, rankings.first[0].value));
    assert_eq!(
        vec![Scenario::WallRenovation, Scenario::WindowRenovation],
        labels(&rankings.second)
    );
    assert_eq!(
        vec![
            Scenario::RoofRenovation,
            Scenario::WindowRenovation,
            Scenario::WallRenovation
        ],
        labels(&rankings.order)
    );
}

#[test]
fn pipeline_missing_carry_over_skips_archetype() {
    // Wall renovation without the existing roofing row
    let masses: String = read_data("projects/AtelierhausPlusBaustoffe.csv")
        .lines()
        .filter(|l| !(l.starts_with("Atelierhaus Plus Außenwandsanierung") && l.contains("Dachziegel")))
        .collect::<Vec<_>>()
        .join("\n");
    let report = assess(&registry(), &source_with_masses(&masses), &refdata());

    assert!(report.results.is_empty());
    assert_eq!(2, report.skipped.len());
    assert!(report.skipped[0].reason.contains("Dachziegel"));
    assert_eq!(Rankings::default(), report.rankings);
}

#[test]
fn pipeline_unexpected_row_in_untouched_group_skips_archetype() {
    // Wall renovation with additional roofing
    let masses = format!(
        "{}\nAtelierhaus Plus Außenwandsanierung; 363 Dachbeläge; Satteldach Holz [2210]; Dachziegel; 5.000,0",
        read_data("projects/AtelierhausPlusBaustoffe.csv").trim_end()
    );
    let report = assess(&registry(), &source_with_masses(&masses), &refdata());

    assert!(report.results.is_empty());
    assert!(report.skipped[0].reason.contains("Dachziegel"));
    assert!(report.skipped[0].reason.contains("363 Dachbeläge"));
}

#[test]
fn pipeline_missing_gwp_baseline() {
    let mut source = source();
    source.gwp.0.retain(|r| r.scenario != Scenario::Existing);
    let registry = registry();
    let err = assess_archetype(registry.get(ATELIERHAUS).unwrap(), &source, &refdata()).unwrap_err();
    match err {
        LcaError::MissingBaseline { what, .. } => assert_eq!("GWP record", what),
        _ => panic!("unexpected error {}", err),
    }
}

#[test]
fn pipeline_wrong_archetype_metadata() {
    let masses = read_data("projects/AtelierhausPlusBaustoffe.csv")
        .replace("#META Archetyp: Atelierhaus Plus", "#META Archetyp: Reihenhaus Mitte");
    let source = source_with_masses(&masses);
    let registry = registry();
    assert!(assess_archetype(registry.get(ATELIERHAUS).unwrap(), &source, &refdata()).is_err());
}

#[test]
fn pipeline_discount_config_required() {
    assert!(DiscountConfig::from_json(r#"{"discount_rate": 0.015}"#).is_err());
    let settings: DiscountSettings = r#"{"discount_rate": 0.015}"#.parse().unwrap();
    let config = settings
        .override_with(DiscountSettings {
            discount_rate: None,
            annual_price_increase: Some(0.05),
        })
        .resolve()
        .unwrap();
    assert!(approx_equal(17459.911, npv(600.0, &config)));
}

#[test]
fn pipeline_report_as_plain_and_json() {
    let report = assess(&registry(), &source(), &refdata());

    let plain = report.to_plain();
    assert!(plain.contains("- Atelierhaus Plus: 3 Gebäude, NGF 600,00 [m²]"));
    assert!(plain.contains("- Dachsanierung (Holzfaser): Best -2700,00, Base -3600,00, Worst -4950,00"));
    assert!(plain.contains("- Atelierhaus Plus, Dachsanierung: 0,151"));
    assert!(plain.contains("- Reihenhaus Mitte: "));

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"npv\":61691.686"));
    assert!(json.contains("\"skipped\":[{\"name\":\"Reihenhaus Mitte\""));
}
