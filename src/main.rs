mod cnf;
mod command;
mod config_files;
mod dpll;
mod logger;
mod signals;

use crate::{
    cnf::{Cnf, Lit},
    command::Args,
    dpll::{Answer, Dpll},
};
use clap::Parser;
use hp_engine::Session;
use hp_protocol::Outcome;
use miette::Report;
use std::process::ExitCode;

const EXIT_FAILED: u8 = 1;
const EXIT_SAFE_INTERRUPT: u8 = 3;
const EXIT_UNSAFE_INTERRUPT: u8 = 4;

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = logger::logger(
        |builder| logger::configure(&args.log_level, args.log_target, builder),
        args.log_file.as_deref(),
    ) {
        eprintln!("ERROR: could not set up logging: {err}");
    }

    match run(&args) {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::from(EXIT_FAILED)
        }
    }
}

fn run(args: &Args) -> miette::Result<ExitCode> {
    let mut config = config_files::read_config(args.config.as_deref())?;
    args.apply(&mut config);
    let limits = config.limits()?;
    let poll_interval = config.poll_interval()?;

    let pigeons = args.pigeons as usize;
    let holes = args.holes() as usize;
    let mut session = Session::new(Dpll::new()).with_poll_interval(poll_interval);
    session.configure_limits(limits);
    signals::ctrlc_protection(session.interrupt_handle());

    log::info!("solving PHP({pigeons}, {holes}) with {}", session.limits());
    let cnf = Cnf::pigeonhole(pigeons, holes);
    let outcome = session.run(cnf.clone());
    if let Some(dpll) = session.computation() {
        let stats = dpll.stats();
        log::info!(
            "{} decisions, {} propagations, {} conflicts",
            stats.decisions,
            stats.propagations,
            stats.conflicts
        );
    }

    Ok(report(outcome, &cnf))
}

fn report(outcome: Outcome<Answer>, cnf: &Cnf) -> ExitCode {
    let summary = outcome.summary();
    match outcome {
        Outcome::Completed(Answer::Sat(model)) => {
            debug_assert!(cnf.is_satisfied_by(&model));
            println!("sat");
            let lits = model
                .iter()
                .enumerate()
                .map(|(var, &positive)| Lit { var, positive }.to_string())
                .collect::<Vec<_>>();
            println!("v {} 0", lits.join(" "));
            ExitCode::SUCCESS
        }
        Outcome::Completed(Answer::Unsat) => {
            println!("unsat");
            ExitCode::SUCCESS
        }
        Outcome::SafeInterrupt(interrupted) => {
            println!("unknown");
            eprintln!("{:?}", Report::new(interrupted));
            eprintln!("{summary}");
            ExitCode::from(EXIT_SAFE_INTERRUPT)
        }
        Outcome::UnsafeInterrupt(interrupted) => {
            println!("unknown");
            eprintln!("{:?}", Report::new(interrupted));
            eprintln!("{summary}");
            ExitCode::from(EXIT_UNSAFE_INTERRUPT)
        }
        Outcome::Failed(err) => {
            eprintln!("{:?}", Report::new(err));
            ExitCode::from(EXIT_FAILED)
        }
        Outcome::Internal(err) => {
            eprintln!("{:?}", Report::new(err));
            ExitCode::from(EXIT_FAILED)
        }
    }
}
