// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Headless replay of an input script through a console. A tiny echo program reads
//! every line with `read_line()` (through [`ConsoleStdin`]) and prints it back. The
//! transcript is printed at the end, and optionally compared with an expected output
//! file.
//!
//! ```text
//! rconsole --script input-1.txt --expected expected-output-1.txt
//! rconsole --script-number 1
//! ```

use clap::Parser;
use miette::IntoDiagnostic;
use r3bl_console::{ConsoleEngine, ConsoleOptions, ConsoleSettings, ConsoleStreams,
                   ConsoleView, MemorySurface, OutputComparison, TextSurface,
                   TracingConfig, default_script_dirs, discover_script_pair, ok};
use std::{io::{BufRead, Write},
          time::Duration};

use crate::clap_config::CLIArg;

/// How often the UI side applies pending surface ops.
const UI_TICK: Duration = Duration::from_millis(10);

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli_arg = CLIArg::parse();

    if let Some(log_file) = &cli_arg.global_options.log_file {
        TracingConfig::new_file(Some(log_file.display().to_string()))
            .with_level_filter(cli_arg.global_options.log_level)
            .install_global()?;
    }

    let settings = match &cli_arg.config {
        Some(path) => ConsoleSettings::load_or_default(path),
        None => ConsoleSettings::default(),
    };
    let (engine, receiver) = ConsoleEngine::new(ConsoleOptions {
        settings,
        ..ConsoleOptions::default()
    });
    engine.set_echo(cli_arg.echo);
    let mut view = ConsoleView::new(engine.clone(), receiver, MemorySurface::new());

    let mut expected_output = cli_arg.expected.clone();
    let mut script = cli_arg.script.clone();
    if let Some(number) = cli_arg.script_number {
        let pair = discover_script_pair(number, &default_script_dirs());
        script = script.or(pair.input);
        expected_output = expected_output.or(pair.expected_output);
    }
    if let Some(script) = &script {
        engine.load_script_file(script)?;
    }

    let program = tokio::task::spawn_blocking({
        let engine = engine.clone();
        move || run_echo_program(engine.streams())
    });

    // Act as the UI context until the program is done. Once every scripted line has
    // been read and the program asks for more, signal end of input.
    let mut interval = tokio::time::interval(UI_TICK);
    while !program.is_finished() {
        interval.tick().await;
        view.apply_pending_ops();
        let is_starved = engine.state().prompt_active
            && engine.pending_script_lines() == 0
            && engine.pending_typed_lines() == 0;
        if is_starved {
            engine.process_eof();
        }
    }
    let line_count = program.await.into_diagnostic()?.into_diagnostic()?;
    tracing::info!(message = "Echo program done", line_count);

    let comparison: Option<OutputComparison> = expected_output
        .as_deref()
        .map(|path| engine.compare_output(path));
    engine.close();
    view.apply_pending_ops();

    print!("{}", view.surface().text());

    match comparison {
        Some(comparison) if !comparison.matches() => {
            miette::bail!(comparison.summary())
        }
        Some(comparison) => eprintln!("{}", comparison.summary()),
        None => {}
    }

    ok!()
}

/// Print every line read from stdin back out, until end of input. Returns how many lines
/// were echoed.
fn run_echo_program(streams: ConsoleStreams) -> std::io::Result<usize> {
    let ConsoleStreams {
        stdin, mut stdout, ..
    } = streams;

    let mut line_count = 0;
    for line in stdin.lines() {
        writeln!(stdout, "{}", line?)?;
        line_count += 1;
    }
    stdout.flush()?;

    Ok(line_count)
}

mod clap_config {
    use clap::{Args, Parser};
    use std::path::PathBuf;
    use tracing_core::LevelFilter;

    /// More info: <https://docs.rs/clap/latest/clap/_derive/_tutorial/chapter_2/index.html>
    #[derive(Debug, Parser)]
    #[command(bin_name = "rconsole")]
    #[command(about = "Replay an input script through a console, and check its output")]
    #[command(version)]
    #[command(next_line_help = true)]
    #[command(arg_required_else_help(false))]
    pub struct CLIArg {
        #[arg(long, short = 's', help = "Input script to replay, one line per read")]
        pub script: Option<PathBuf>,

        #[arg(
            long,
            short = 'n',
            help = "Find `input-<N>.txt` and `expected-output-<N>.txt` in `.`, `./input`, and `./output`"
        )]
        pub script_number: Option<u8>,

        #[arg(long, short = 'x', help = "Compare the transcript with this file")]
        pub expected: Option<PathBuf>,

        #[arg(long, short = 'e', help = "Also echo the transcript to the real stdout")]
        pub echo: bool,

        #[arg(long, short = 'c', help = "Console settings file (font, colors)")]
        pub config: Option<PathBuf>,

        #[command(flatten)]
        pub global_options: GlobalOption,
    }

    #[derive(Debug, Args)]
    pub struct GlobalOption {
        #[arg(global = true, long, short = 'l', help = "Log to this file for debugging")]
        pub log_file: Option<PathBuf>,

        #[arg(
            global = true,
            long,
            default_value = "info",
            help = "Most verbose level that gets logged: off, error, warn, info, debug, trace"
        )]
        pub log_level: LevelFilter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_echo_program_until_eof() {
        let (engine, _receiver) = ConsoleEngine::new(ConsoleOptions::default());
        engine.load_script(["a", "b"]);
        let reader = {
            let engine = engine.clone();
            std::thread::spawn(move || run_echo_program(engine.streams()))
        };
        while engine.pending_script_lines() > 0 || !engine.state().prompt_active {
            std::thread::yield_now();
        }
        engine.process_eof();

        assert_eq!(reader.join().unwrap().unwrap(), 2);
        assert_eq!(engine.all_output(), "a\na\nb\nb\n");
    }

    #[test]
    fn test_transcript_shows_replayed_and_echoed_lines() {
        let (engine, receiver) = ConsoleEngine::new(ConsoleOptions::default());
        let mut view = ConsoleView::new(engine.clone(), receiver, MemorySurface::new());
        engine.load_script(["hi"]);
        let reader = {
            let engine = engine.clone();
            std::thread::spawn(move || run_echo_program(engine.streams()))
        };
        while engine.pending_script_lines() > 0 || !engine.state().prompt_active {
            std::thread::yield_now();
        }
        engine.process_eof();

        assert_eq!(reader.join().unwrap().unwrap(), 1);
        engine.close();
        view.apply_pending_ops();
        assert!(view.surface().is_closed());
        assert_eq!(view.surface().text(), "hi\nhi\n");
    }

    #[test]
    fn test_cli_args() {
        let it = CLIArg::parse_from(["rconsole", "-n", "3", "--echo"]);
        assert_eq!(it.script_number, Some(3));
        assert!(it.echo);
        assert_eq!(it.script, None);
        assert_eq!(it.global_options.log_level, tracing_core::LevelFilter::INFO);
    }
}
