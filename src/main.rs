// Read whitespace separated words from stdin, index each word against the
// position it was last seen at, and print the symbol table in key order.
//
//     $ echo "S E A R C H E X A M P L E" | llrb-symtab debug

use std::io::{self, BufRead, Write};

use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use llrb_symtab::Llrb;

fn main() {
    let level = match std::env::args().nth(1).as_deref() {
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };
    let config = Config::default();
    if let Err(err) = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("logger: {}", err);
    }

    if let Err(err) = run() {
        error!("llrb-symtab: {}", err);
        std::process::exit(1);
    }
}

fn run() -> io::Result<()> {
    let mut st: Llrb<String, usize> = Llrb::new("stdin");

    let mut n = 0;
    for line in io::stdin().lock().lines() {
        for word in line?.split_whitespace() {
            st.set(word.to_string(), n);
            n += 1;
        }
    }
    info!("indexed {} words, {} distinct", n, st.len());

    match st.validate() {
        Ok(stats) => {
            info!("height {:?} blacks {:?}", stats.height(), stats.blacks());
            if let Some(depths) = stats.depths() {
                depths.pretty_print("  ");
            }
        }
        Err(err) => error!("invalid tree: {:?}", err),
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (key, value) in st.iter() {
        writeln!(out, "{} {}", key, value)?;
    }
    Ok(())
}
