//! Interactive operator reporter
//!
//! Prompts for magnitude, latitude and longitude, in that order, one line
//! each. A line that is not a number is re-prompted; end of input stops
//! the reporter.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use quake_types::record::EarthquakeRecord;
use tracing::warn;

use super::RecordSource;

const PROMPTS: [&str; 3] = [
    "Please enter the magnitude of the earthquake:",
    "Please enter the latitude of the earthquake:",
    "Please enter the longitude value of the earthquake:",
];

/// Read one value, re-prompting until a finite number is entered.
///
/// Returns `Ok(None)` at end of input.
fn prompt_number<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<Option<f64>> {
    let mut line = String::new();
    loop {
        writeln!(output, "{prompt}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        match line.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => return Ok(Some(value)),
            _ => writeln!(output, "'{}' is not a number, try again.", line.trim())?,
        }
    }
}

/// Prompt for a full record.
pub fn prompt_record<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<Option<EarthquakeRecord>> {
    let mut values = [0.0; 3];
    for (slot, prompt) in values.iter_mut().zip(PROMPTS) {
        match prompt_number(input, output, prompt)? {
            Some(value) => *slot = value,
            None => return Ok(None),
        }
    }

    let [magnitude, latitude, longitude] = values;
    Ok(Some(EarthquakeRecord::new(magnitude, latitude, longitude).with_coordinates()))
}

/// Reporter over any line-oriented input, stdin by default.
pub struct ManualReporter<R, W> {
    io: Option<(R, W)>,
}

impl ManualReporter<io::BufReader<io::Stdin>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R, W> ManualReporter<R, W>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            io: Some((input, output)),
        }
    }
}

#[async_trait]
impl<R, W> RecordSource for ManualReporter<R, W>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    async fn next_record(&mut self) -> Option<EarthquakeRecord> {
        let (mut input, mut output) = self.io.take()?;

        // Prompts block on the terminal; keep them off the async workers.
        let joined = tokio::task::spawn_blocking(move || {
            let record = prompt_record(&mut input, &mut output);
            (input, output, record)
        })
        .await;

        let (input, output, record) = match joined {
            Ok(parts) => parts,
            Err(e) => {
                warn!(error = %e, "Operator prompt task failed");
                return None;
            }
        };

        match record {
            Ok(Some(record)) => {
                self.io = Some((input, output));
                Some(record)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read operator input");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_order_is_mag_lat_lon() {
        let mut input = Cursor::new("5.2\n34.1\n-118.2\n");
        let mut output = Vec::new();

        let record = prompt_record(&mut input, &mut output).unwrap().unwrap();
        assert_eq!(record, EarthquakeRecord::new(5.2, 34.1, -118.2).with_coordinates());

        let transcript = String::from_utf8(output).unwrap();
        let magnitude_at = transcript.find("magnitude").unwrap();
        let latitude_at = transcript.find("latitude").unwrap();
        let longitude_at = transcript.find("longitude").unwrap();
        assert!(magnitude_at < latitude_at && latitude_at < longitude_at);
    }

    #[test]
    fn test_invalid_input_reprompts() {
        let mut input = Cursor::new("big\n6.0\n\n10\nNaN\n20\n");
        let mut output = Vec::new();

        let record = prompt_record(&mut input, &mut output).unwrap().unwrap();
        assert_eq!(record.magnitude, 6.0);
        assert_eq!(record.latitude, 10.0);
        assert_eq!(record.longitude, 20.0);
        assert!(String::from_utf8(output).unwrap().contains("'big' is not a number"));
    }

    #[test]
    fn test_end_of_input_stops() {
        let mut input = Cursor::new("4.5\n12.0\n");
        let mut output = Vec::new();
        assert!(prompt_record(&mut input, &mut output).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reporter_yields_until_exhausted() {
        let input = Cursor::new("1\n2\n3\n4\n5\n6\n");
        let mut reporter = ManualReporter::new(input, io::sink());

        assert_eq!(
            reporter.next_record().await,
            Some(EarthquakeRecord::new(1.0, 2.0, 3.0).with_coordinates())
        );
        assert_eq!(
            reporter.next_record().await,
            Some(EarthquakeRecord::new(4.0, 5.0, 6.0).with_coordinates())
        );
        assert_eq!(reporter.next_record().await, None);
        assert_eq!(reporter.next_record().await, None);
    }
}
