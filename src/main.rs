use std::path::PathBuf;
use std::{fs, io, process};

use boolsat::sat::{brute_force, dimacs, dpll, two_sat};
use boolsat::{util, Formula, Match};

struct MainOptions {
    engine: EngineChoice,
    strict: bool,
    in_path: PathBuf,
    out_path: Option<PathBuf>,
}

enum EngineChoice {
    Dpll,
    TwoSat,
    BruteForce,
}

fn main() {
    let matches = clap::App::new("boolsat")
        .version(clap::crate_version!())
        .about("A small SAT solver: complete DPLL search plus 2-SAT and brute-force engines")
        .arg(
            clap::Arg::with_name("verb")
                .long("verb")
                .takes_value(true)
                .possible_values(&["0", "1", "2"])
                .help("Verbosity level (0=silent, 1=some, 2=more)"),
        )
        .arg(
            clap::Arg::with_name("engine")
                .long("engine")
                .takes_value(true)
                .possible_values(&["dpll", "two-sat", "brute-force"])
                .default_value("dpll")
                .help("Which engine to run the formula through"),
        )
        .arg(clap::Arg::with_name("strict").long("strict").help("Validate the DIMACS header during parsing"))
        .arg(clap::Arg::with_name("input").required(true))
        .arg(clap::Arg::with_name("output").required(false))
        .get_matches();

    {
        let mut builder = env_logger::Builder::new();
        let level = match matches.value_of("verb") {
            Some("2") => log::LevelFilter::Trace,
            Some("0") => log::LevelFilter::Off,
            _ => log::LevelFilter::Info,
        };
        builder.filter(None, level);
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "{}", record.args())
        });
        builder.init();
    }

    let engine = match matches.value_of("engine") {
        Some("two-sat") => EngineChoice::TwoSat,
        Some("brute-force") => EngineChoice::BruteForce,
        _ => EngineChoice::Dpll,
    };

    let options = MainOptions {
        engine,
        strict: matches.is_present("strict"),
        in_path: PathBuf::from(matches.value_of("input").unwrap()),
        out_path: matches.value_of("output").map(PathBuf::from),
    };

    if let Err(err) = run(options) {
        log::error!("{}", err);
        process::exit(1);
    }
}

fn run(options: MainOptions) -> io::Result<()> {
    log::info!("============================[ Problem Statistics ]=============================");

    let initial_time = time::precise_time_s();
    let (formula, backward_subst) = dimacs::parse_file(&options.in_path, options.strict)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    let parse_time = time::precise_time_s() - initial_time;

    log::info!("|  Number of variables:  {:12}", formula.variable_count);
    log::info!("|  Number of clauses:    {:12}", formula.n_clauses());
    log::info!("|  Parse time:           {:12.2} s", parse_time);

    let solve_start = time::precise_time_s();
    let model = first_model(&formula, &options.engine);
    let solve_time = time::precise_time_s() - solve_start;
    log::info!("|  Solve time:           {:12.2} s", solve_time);

    let mem_used = util::mem_used_peak();
    if let Some(mem) = mem_used {
        log::info!("|  Memory used:          {:12.2} MB", mem as f64 / 1024.0);
    }
    log::info!("===============================================================================");

    match &model {
        Some(m) => {
            println!("SATISFIABLE");
            if !dimacs::validate_model_file(&options.in_path, &backward_subst, m)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?
            {
                log::error!("self-check failed: produced model does not satisfy the input formula");
            }
        }
        None => println!("UNSATISFIABLE"),
    }

    if let Some(path) = options.out_path {
        let mut out = fs::File::create(path)?;
        match &model {
            Some(m) => dimacs::write_model(&mut out, &backward_subst, m)?,
            None => {
                use io::Write;
                writeln!(out, "UNSAT")?;
            }
        }
    }

    Ok(())
}

fn first_model(formula: &Formula, engine: &EngineChoice) -> Option<Match> {
    match engine {
        EngineChoice::Dpll => dpll::solve(formula, dpll::Settings::default()).next(),
        EngineChoice::TwoSat => two_sat::solve(formula).unwrap_or(None),
        EngineChoice::BruteForce => brute_force::solve(formula).next(),
    }
}
