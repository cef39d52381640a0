//! Decode a save container and print the header and record as JSON.
//!
//! Set `RUST_LOG=debug` to trace the decode field by field.

use fbchunks::{ContainerDecoder, FormatProfile, ProfileSelection};
use std::error;
use std::fs::File;
use std::io::{self, BufReader, Write};

fn parse_args(args: &[String]) -> Result<(ProfileSelection, &str), String> {
    match args {
        [_, path] => Ok((ProfileSelection::default(), path.as_str())),
        [_, profile, path] => match profile.as_str() {
            "--wide" => Ok((ProfileSelection::Fixed(FormatProfile::WIDE), path.as_str())),
            "--narrow" => Ok((ProfileSelection::Fixed(FormatProfile::NARROW), path.as_str())),
            x => Err(format!(
                "Error: unknown profile '{}', expected --wide or --narrow",
                x
            )),
        },
        _ => {
            let program = args.first().map(String::as_str).unwrap_or("fbdump");
            Err(format!("Usage: {} [--wide|--narrow] <file>", program))
        }
    }
}

fn main() -> Result<(), Box<dyn error::Error>> {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    let (profile, file_path) = match parse_args(&args) {
        Ok(x) => x,
        Err(msg) => {
            eprintln!("{}", msg);
            std::process::exit(1);
        }
    };

    let file = File::open(file_path)?;
    let decoder = ContainerDecoder::builder().profile(profile).build();
    let mut stdout = io::stdout().lock();
    match decoder.decode(BufReader::new(file)) {
        Ok(save) => {
            serde_json::to_writer_pretty(&mut stdout, &save)?;
            writeln!(stdout)?;
            for failure in save.record().soft_failures() {
                eprintln!("warning: {}", failure);
            }
            Ok(())
        }
        Err(err) => {
            // the header may have decoded even though the record did not
            if let Some(header) = err.header() {
                serde_json::to_writer_pretty(&mut stdout, header)?;
                writeln!(stdout)?;
            }
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let a = args(&["fbdump", "save.bin"]);
        assert_eq!(
            parse_args(&a),
            Ok((ProfileSelection::default(), "save.bin"))
        );

        let a = args(&["fbdump", "--narrow", "save.bin"]);
        assert_eq!(
            parse_args(&a),
            Ok((ProfileSelection::Fixed(FormatProfile::NARROW), "save.bin"))
        );

        let a = args(&["fbdump", "--tall", "save.bin"]);
        assert!(parse_args(&a).unwrap_err().contains("--tall"));
    }

    #[test]
    fn test_usage_without_program_name() {
        assert_eq!(
            parse_args(&[]),
            Err(String::from("Usage: fbdump [--wide|--narrow] <file>"))
        );

        let a = args(&["dump"]);
        assert_eq!(
            parse_args(&a),
            Err(String::from("Usage: dump [--wide|--narrow] <file>"))
        );
    }
}
