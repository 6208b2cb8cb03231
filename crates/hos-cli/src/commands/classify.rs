//! Classify command: show how a note is classified.

use std::io::Write;

use anyhow::Result;
use hos_core::DutyType;

pub fn run<W: Write>(writer: &mut W, note: &str) -> Result<()> {
    writeln!(writer, "{}", DutyType::classify(note))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(note: &str) -> String {
        let mut output = Vec::new();
        run(&mut output, note).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_classify_prints_duty_type() {
        assert_eq!(classify("Pre-trip inspection"), "pti\n");
        assert_eq!(classify("at dock, shipper slow"), "loading\n");
        assert_eq!(classify(""), "unknown\n");
    }
}
