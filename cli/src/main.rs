#[macro_use] extern crate clap;

use clap::{App, ArgMatches};
use env_logger::{from_env, Env};
use ocicas::{CasError, Engine};
use std::io::{self, Write};

fn main() {
    let yaml = load_yaml!("cli.yml");
    let matches = App::from_yaml(yaml).get_matches();

    let log_level = matches.value_of("log_level").unwrap_or("warn");
    from_env(Env::default().default_filter_or(log_level)).init();

    let result = match matches.subcommand() {
        ("stat", Some(sub)) => stat(sub),
        ("ls", Some(sub)) => ls(sub),
        _ => unreachable!("clap requires a subcommand"),
    };
    if let Err(err) = result {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn open(matches: &ArgMatches) -> Result<Engine, CasError> {
    // clap has already rejected a missing or empty path
    let path = matches.value_of("image").unwrap_or_default();
    Engine::open(path)
}

fn finish(mut engine: Engine) {
    if let Err(err) = engine.close() {
        log::warn!("{}", err);
    }
}

fn stat(matches: &ArgMatches) -> Result<(), CasError> {
    let engine = open(matches)?;
    let tag = matches.value_of("tag").unwrap_or_default();
    let summary = engine
        .get_reference(tag)
        .and_then(|descriptor| engine.stat(&descriptor));
    finish(engine);
    let summary = summary?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if matches.is_present("json") {
        summary.to_json_writer(&mut out)?;
        writeln!(out)?;
    } else {
        summary.render_human(&mut out)?;
    }
    out.flush()?;
    Ok(())
}

fn ls(matches: &ArgMatches) -> Result<(), CasError> {
    let engine = open(matches)?;
    let names = engine.list_references();
    finish(engine);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for name in names? {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}
