use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::debug;
use subjet_filter::{particle, InputParticle};

/// Read events from a plain text file
///
/// Each line holds the momentum `px py pz E` of one particle. Events
/// are separated by empty lines, `#` starts a comment.
pub fn import(
    filename: &Path,
    events: &mut Vec<Vec<InputParticle>>,
) -> Result<()> {
    debug!("Importing events from {:?}", filename);
    let file = File::open(filename)
        .with_context(|| format!("Failed to open {:?}", filename))?;
    import_events(BufReader::new(file), events)
        .with_context(|| format!("Failed to import {:?}", filename))
}

pub fn import_events<R: BufRead>(
    reader: R,
    events: &mut Vec<Vec<InputParticle>>,
) -> Result<()> {
    let mut momenta = Vec::new();
    for (nline, line) in reader.lines().enumerate() {
        let line = line?;
        let line = match line.split_once('#') {
            Some((content, _comment)) => content,
            None => &line,
        };
        let line = line.trim();
        if line.is_empty() {
            if !momenta.is_empty() {
                events.push(particle::from_px_py_pz_e(momenta.drain(..)));
            }
            continue;
        }
        let p = parse_momentum(line)
            .with_context(|| format!("Error in line {}", nline + 1))?;
        momenta.push(p);
    }
    if !momenta.is_empty() {
        events.push(particle::from_px_py_pz_e(momenta));
    }
    Ok(())
}

fn parse_momentum(line: &str) -> Result<(f64, f64, f64, f64)> {
    let entries: Vec<f64> = line
        .split_whitespace()
        .map(|s| s.parse())
        .collect::<Result<_, _>>()?;
    match entries[..] {
        [px, py, pz, e] => Ok((px, py, pz, e)),
        _ => Err(anyhow!(
            "Expected four momentum components, found {}",
            entries.len()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_separated_by_empty_lines() {
        let input = "# px py pz E\n\
                     1 0 0 1\n\
                     0 2 0 2 # second\n\
                     \n\
                     \n\
                     0 4 3 5\n";
        let mut events = Vec::new();
        import_events(input.as_bytes(), &mut events).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].len(), 2);
        assert_eq!(events[0][1].index, 1);
        assert_eq!(events[0][1].momentum.e(), 2.);
        assert_eq!(events[1][0].momentum.pz(), 3.);
    }

    #[test]
    fn malformed_line() {
        let mut events = Vec::new();
        assert!(import_events("1 2 3\n".as_bytes(), &mut events).is_err());
        assert!(import_events("1 2 x 4\n".as_bytes(), &mut events).is_err());
    }
}
