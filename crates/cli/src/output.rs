use doctext_core::models::Analysis;
use std::fmt::Write;

/// Human-readable rendering of an analysis for terminal output.
pub fn render_analysis(analysis: &Analysis, total_symptoms: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "diagnosis: {}", analysis.label);
    let _ = writeln!(
        out,
        "matched {} of {} symptoms (threshold {})",
        analysis.matches.len(),
        total_symptoms,
        analysis.threshold
    );
    for m in &analysis.matches {
        let _ = writeln!(out, "  {:<32} {:.3}", m.symptom, m.score);
    }
    out
}

/// Compact 0/1 rendering of the indicator vector.
pub fn render_bits(bits: &[u8]) -> String {
    bits.iter().map(|b| if *b == 1 { '1' } else { '0' }).collect()
}
