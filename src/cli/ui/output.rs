use console::style;

/// Styled terminal output for human-readable formats
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// `label: value` with a dimmed, padded label
    pub fn field(&self, label: &str, value: &str) {
        println!("  {} {}", style(format!("{:<14}", format!("{}:", label))).dim(), value);
    }

    pub fn bullet(&self, message: &str) {
        println!("  {} {}", style("•").cyan(), message);
    }

    /// Numbered entry with a bold label, e.g. `1. Formal  text`
    pub fn numbered(&self, index: usize, label: &str, text: &str) {
        println!("  {}. {}  {}", index, style(label).bold(), text);
    }

    /// Confidence as a percentage, colored by strength
    pub fn confidence(&self, confidence: f64) -> String {
        let pct = format!("{:.0}%", confidence * 100.0);
        if confidence >= 0.8 {
            style(pct).green().to_string()
        } else if confidence >= 0.5 {
            style(pct).yellow().to_string()
        } else {
            style(pct).red().to_string()
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
