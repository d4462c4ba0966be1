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

#[macro_use]
extern crate clap;

use std::fs::File;
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use std::process::exit;
use std::str::FromStr;

use clap::{App, AppSettings, Arg};
use failure::Error;
use failure::ResultExt;
use log::LevelFilter;

use lcarefurb::error::Result as LcaResult;
use lcarefurb::*;

// Dateinamen des Datenverzeichnisses ---------------------------------------------------------

const ARCHETYPES_FILE: &str = "archetypes.json";
const DISCOUNTING_FILE: &str = "discounting.json";
const PRICES_FILE: &str = "energy_prices.json";
const SAVINGS_FILE: &str = "savings.csv";
const WALL_COSTS_FILE: &str = "wall_costs.csv";
const ROOF_COSTS_FILE: &str = "roof_costs.csv";
const WINDOW_COSTS_FILE: &str = "window_costs.csv";
const COST_GROUPS_FILE: &str = "cost_groups.json";
const PROJECTS_DIR: &str = "projects";

// Hilfsfunktionen ----------------------------------------------------------------------------

fn readfile(path: &Path) -> Result<String, Error> {
    let mut f = File::open(path).context(format!("Datei {} nicht gefunden", path.display()))?;
    let mut contents = String::new();
    f.read_to_string(&mut contents)
        .context(format!("Fehler beim Lesen der Datei {}", path.display()))?;
    Ok(contents)
}

fn writefile(path: &Path, content: &[u8]) -> Result<(), Error> {
    let mut file =
        File::create(&path).context(format!("Datei {} kann nicht angelegt werden", path.display()))?;
    file.write_all(content)
        .context(format!("Fehler beim Schreiben der Datei {}", path.display()))?;
    Ok(())
}

/// Liest und interpretiert eine Datei oder beendet das Programm
///
/// Read errors exit with `IOERR`, format errors with `errcode`.
fn load<T>(path: &Path, descr: &str, errcode: i32, verbosity: u64) -> T
where
    T: FromStr<Err = LcaError>,
{
    let data = readfile(path).unwrap_or_else(|err| {
        eprintln!("FEHLER: {} \"{}\" kann nicht gelesen werden", descr, path.display());
        if verbosity > 1 {
            eprintln!("{}", err);
        }
        exit(exitcode::IOERR);
    });
    let value = data.parse::<T>().unwrap_or_else(|err| {
        eprintln!(
            "FEHLER: Falsches Format in {} \"{}\" ({})",
            descr,
            path.display(),
            err
        );
        exit(errcode);
    });
    if verbosity > 0 {
        println!("{}: \"{}\"", descr, path.display());
    }
    value
}

/// Projektdaten aus dem Verzeichnis `projects` des Datenverzeichnisses
///
/// Each archetype has a mass table `<Name>Baustoffe.csv` and GWP results
/// `<Name>Wirkungsanalyse.json`, where `<Name>` is the archetype name without spaces.
struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    fn read(&self, archetype: &Archetype, suffix: &str) -> LcaResult<String> {
        let path = self
            .dir
            .join(format!("{}{}", archetype.no_spaces_name(), suffix));
        std::fs::read_to_string(&path).map_err(|err| {
            LcaError::WrongInput(format!("{} could not be read ({})", path.display(), err))
        })
    }
}

impl ProjectSource for DirSource {
    fn mass_tables(&self, archetype: &Archetype) -> LcaResult<ScenarioMassTables> {
        self.read(archetype, "Baustoffe.csv")?.parse()
    }

    fn gwp_records(&self, archetype: &Archetype) -> LcaResult<GwpRecords> {
        let records: GwpRecords = self.read(archetype, "Wirkungsanalyse.json")?.parse()?;
        Ok(GwpRecords(
            records.for_archetype(&archetype.name).cloned().collect(),
        ))
    }
}

/// Optionaler Zahlenwert der Kommandozeile
fn fraction_from_args(matches: &clap::ArgMatches<'_>, name: &str, descr: &str) -> Option<f64> {
    if !matches.is_present(name) {
        return None;
    }
    let value = value_t!(matches, name, f64).unwrap_or_else(|_| {
        eprintln!("FEHLER: {} ist kein gültiger Zahlenwert", descr);
        exit(exitcode::USAGE);
    });
    Some(value)
}

/// Abzinsungsparameter: Kommandozeile > Konfigurationsdatei
fn get_discount_config(
    matches: &clap::ArgMatches<'_>,
    datadir: &Path,
    verbosity: u64,
) -> DiscountConfig {
    let config_path = matches
        .value_of("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| datadir.join(DISCOUNTING_FILE));
    let from_file = if matches.is_present("config") || config_path.exists() {
        load::<DiscountSettings>(&config_path, "Konfiguration", exitcode::CONFIG, verbosity)
    } else {
        DiscountSettings::default()
    };
    let from_args = DiscountSettings {
        discount_rate: fraction_from_args(matches, "discount_rate", "Der Kalkulationszins"),
        annual_price_increase: fraction_from_args(
            matches,
            "price_increase",
            "Die Energiepreissteigerung",
        ),
    };
    let config = from_file.override_with(from_args).resolve().unwrap_or_else(|err| {
        eprintln!("FEHLER: {}", err);
        exit(exitcode::CONFIG);
    });
    if verbosity > 0 {
        println!(
            "Kalkulationszins: {}, Energiepreissteigerung: {}",
            config.discount_rate, config.annual_price_increase
        );
    }
    config
}

/// Kostengruppen der Bauteile: Datei `cost_groups.json` oder Vorgabewerte
fn get_cost_groups(datadir: &Path, verbosity: u64) -> CostGroupSets {
    let path = datadir.join(COST_GROUPS_FILE);
    if !path.exists() {
        return CostGroupSets::default();
    }
    let groups = readfile(&path)
        .and_then(|data| Ok(serde_json::from_str::<CostGroupSets>(&data)?))
        .unwrap_or_else(|err| {
            eprintln!("FEHLER: Kostengruppen \"{}\" ({})", path.display(), err);
            exit(exitcode::CONFIG);
        });
    groups.validate().unwrap_or_else(|err| {
        eprintln!("FEHLER: {}", err);
        exit(exitcode::CONFIG);
    });
    if verbosity > 0 {
        println!("Kostengruppen: {}", groups);
    }
    groups
}

fn init_logger(verbosity: u64) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

// Hauptfunktion ----------------------------------------------------------------------------------

fn main() {
    let matches = App::new("LCArefurb")
        .bin_name("lcarefurb")
        .version(env!("CARGO_PKG_VERSION"))
        .author("
Copyright (c) 2018-2022 Ministerio de Fomento,
                   Instituto de CC. de la Construcción Eduardo Torroja (IETcc-CSIC)

Autoren: Rafael Villar Burke <pachi@ietcc.csic.es>,
         Daniel Jiménez González <danielj@ietcc.csic.es>
         Marta Sorribes Gil <msorribes@ietcc.csic.es>

Lizenz: Veröffentlicht unter der MIT-Lizenz.

")
        .about("LCArefurb - Ökobilanz und Wirtschaftlichkeit von Sanierungsvarianten für Quartiersarchetypen.")
        .setting(AppSettings::NextLineHelp)
        .arg(Arg::with_name("datadir")
            .short("d")
            .long("datadir")
            .value_name("DATENVERZEICHNIS")
            .required_unless("showlicense")
            .help("Verzeichnis mit Archetypen, Referenztabellen und Projektdaten")
            .takes_value(true)
            .display_order(1))
        .arg(Arg::with_name("config")
            .short("c")
            .long("config")
            .value_name("KONFIGURATION")
            .help("JSON-Datei mit Kalkulationszins und Energiepreissteigerung\n(Vorgabe: DATENVERZEICHNIS/discounting.json)")
            .takes_value(true)
            .display_order(2))
        .arg(Arg::with_name("discount_rate")
            .short("r")
            .long("discount-rate")
            .value_name("ZINS")
            .help("Kalkulationszins als Anteil (0.015 = 1,5 %)")
            .takes_value(true)
            .allow_hyphen_values(true)
            .display_order(3))
        .arg(Arg::with_name("price_increase")
            .short("g")
            .long("price-increase")
            .value_name("STEIGERUNG")
            .help("Jährliche Energiepreissteigerung als Anteil (0.05 = 5 %)")
            .takes_value(true)
            .allow_hyphen_values(true)
            .display_order(4))
        .arg(Arg::with_name("archetype")
            .short("a")
            .long("archetype")
            .value_name("ARCHETYP")
            .help("Nur diesen Archetyp bewerten")
            .takes_value(true)
            .display_order(5))
        .arg(Arg::with_name("json_output")
            .long("json")
            .value_name("JSON_AUSGABE")
            .help("Ausgabedatei der detaillierten Ergebnisse im JSON-Format")
            .takes_value(true))
        .arg(Arg::with_name("showlicense")
            .short("L")
            .long("license")
            .help("Zeigt die Lizenz des Programms (MIT)"))
        .arg(Arg::with_name("v")
            .short("v")
            .multiple(true)
            .help("Ausführlichkeit der Ausgabe"))
        .get_matches();

    if matches.is_present("showlicense") {
        println!(
            "
Copyright (c) 2018-2022 Ministerio de Fomento
                   Instituto de Ciencias de la Construcción Eduardo Torroja (IETcc-CSIC)

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the 'Software'), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in
all copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED 'AS IS', WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.

Author(s): Rafael Villar Burke <pachi@ietcc.csic.es>
            Daniel Jiménez González <danielj@ietcc.csic.es>
            Marta Sorribes Gil <msorribes@ietcc.csic.es>"
        );
        exit(exitcode::OK);
    }

    let verbosity = matches.occurrences_of("v");
    init_logger(verbosity);

    if verbosity > 2 {
        println!("Optionen: ----------");
        println!("{:#?}", matches);
        println!("--------------------");
    }

    println!("** Eingabedaten\n");

    // Datenverzeichnis ------------------------------------------------------------------------
    let datadir = PathBuf::from(matches.value_of("datadir").unwrap_or("."));
    if !datadir.is_dir() {
        eprintln!(
            "FEHLER: Datenverzeichnis \"{}\" nicht gefunden",
            datadir.display()
        );
        exit(exitcode::NOINPUT);
    }
    println!("Datenverzeichnis: \"{}\"", datadir.display());

    // Konfiguration und Referenztabellen --------------------------------------------------------
    let discount = get_discount_config(&matches, &datadir, verbosity);

    let registry: ArchetypeRegistry = load(
        &datadir.join(ARCHETYPES_FILE),
        "Archetypen",
        exitcode::DATAERR,
        verbosity,
    );
    let registry = match matches.value_of("archetype") {
        None => registry,
        Some(name) => registry
            .get(name)
            .and_then(|archetype| ArchetypeRegistry::new(vec![archetype.clone()]))
            .unwrap_or_else(|err| {
                eprintln!("FEHLER: {}", err);
                exit(exitcode::DATAERR);
            }),
    };
    println!(
        "Archetypen: {} ({} Gebäude im Quartier)",
        registry.len(),
        registry.total_buildings()
    );

    let refdata = ReferenceData {
        discount,
        prices: load(
            &datadir.join(PRICES_FILE),
            "Energiepreise",
            exitcode::CONFIG,
            verbosity,
        ),
        savings: load(
            &datadir.join(SAVINGS_FILE),
            "Einsparfaktoren",
            exitcode::CONFIG,
            verbosity,
        ),
        costs: CostTables {
            wall: load(
                &datadir.join(WALL_COSTS_FILE),
                "Kosten Außenwand",
                exitcode::CONFIG,
                verbosity,
            ),
            roof: load(
                &datadir.join(ROOF_COSTS_FILE),
                "Kosten Dach",
                exitcode::CONFIG,
                verbosity,
            ),
            window: load(
                &datadir.join(WINDOW_COSTS_FILE),
                "Kosten Fenster",
                exitcode::CONFIG,
                verbosity,
            ),
        },
        cost_groups: get_cost_groups(&datadir, verbosity),
    };

    // Bewertung --------------------------------------------------------------------------------
    let source = DirSource {
        dir: datadir.join(PROJECTS_DIR),
    };
    let report = assess(&registry, &source, &refdata);

    println!("\n** Ergebnisse\n");
    println!("{}", report.to_plain());

    if let Some(json_output) = matches.value_of("json_output") {
        let path = Path::new(json_output);
        if verbosity > 0 {
            println!("Ergebnisse im JSON-Format: {:?}", path);
        }
        let written = serde_json::to_string_pretty(&report)
            .map_err(Error::from)
            .and_then(|json| writefile(path, json.as_bytes()));
        if let Err(err) = written {
            eprintln!("FEHLER: JSON-Ausgabe \"{}\" ({})", path.display(), err);
            exit(exitcode::CANTCREAT);
        }
    }

    if report.results.is_empty() {
        eprintln!("FEHLER: Kein Archetyp konnte bewertet werden");
        exit(exitcode::DATAERR);
    }
}
