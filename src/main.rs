use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sliderlab::config::AppConfig;
use sliderlab::demos::DemoKind;
use sliderlab::error::{DemoError, DemoResult};
use sliderlab::host::{DemoHost, Request, Response};
use sliderlab::paths::AppPaths;

enum Command {
    Serve,
    Render(String),
    Paths,
    Help,
}

struct Args {
    command: Command,
    config: Option<PathBuf>,
}

fn parse_args(mut argv: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut command = None;
    let mut config = None;

    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--config" => {
                let path = argv.next().ok_or("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "-h" | "--help" | "help" => command = Some(Command::Help),
            "paths" => command = Some(Command::Paths),
            "render" => {
                let demo = argv.next().ok_or("render needs a demo name")?;
                command = Some(Command::Render(demo));
            }
            other => return Err(format!("Unknown command: {other}")),
        }
    }

    Ok(Args {
        command: command.unwrap_or(Command::Serve),
        config,
    })
}

fn print_help() {
    println!("sliderlab: interactive communication-systems demos");
    println!();
    println!("USAGE:");
    println!("  sliderlab [--config <path>]              serve NDJSON requests on stdin");
    println!("  sliderlab [--config <path>] render <demo> print one render and exit");
    println!("  sliderlab paths                          show config locations");
    println!("  sliderlab help");
    println!();
    println!("DEMOS:");
    for kind in DemoKind::all() {
        println!("  {:<10} {}", kind.label(), kind.display_name());
    }
    println!();
    println!("REQUESTS (one JSON object per line):");
    println!("  {{\"type\": \"List\"}}");
    println!("  {{\"type\": \"Render\", \"demo\": \"psk\"}}");
    println!("  {{\"type\": \"Controls\", \"demo\": \"psk\", \"controls\": {{\"noise_db\": -20}}}}");
    println!("  {{\"type\": \"Form\", \"demo\": \"qam\", \"fields\": {{\"order_exp[1]\": \"2\"}}}}");
    println!("  {{\"type\": \"Relayout\", \"demo\": \"psk\", \"chart\": {{...}}}}");
}

fn write_response(out: &mut impl Write, response: &Response) -> DemoResult<()> {
    let line = serde_json::to_string(response).map_err(|e| DemoError::Serialization(e.to_string()))?;
    writeln!(out, "{line}")?;
    out.flush()?;
    Ok(())
}

fn serve(host: &mut DemoHost) -> DemoResult<()> {
    info!("reading requests from stdin");
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = host.handle_line(&line);
        write_response(&mut stdout, &response)?;
    }

    info!("stdin closed; exiting");
    Ok(())
}

fn run(args: Args) -> DemoResult<()> {
    let config_path = match args.config {
        Some(path) => path,
        None => AppPaths::new()?.config_file(),
    };
    let config = AppConfig::load_or_default(&config_path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut host = DemoHost::new(&config)?;
    match args.command {
        Command::Render(name) => {
            let demo: DemoKind = name.parse()?;
            let response = host.handle(Request::Render { demo });
            write_response(&mut io::stdout().lock(), &response)
        }
        _ => serve(&mut host),
    }
}

fn main() {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            print_help();
            std::process::exit(2);
        }
    };

    match args.command {
        Command::Help => print_help(),
        Command::Paths => match AppPaths::new() {
            Ok(paths) => {
                println!("Config directory: {}", paths.config_dir().display());
                println!("Config file:      {}", paths.config_file().display());
            }
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        },
        _ => {
            if let Err(e) = run(args) {
                error!(error = %e, "sliderlab failed");
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }
}
