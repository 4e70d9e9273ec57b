use validus::{RunState, Validation};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_run(validation: &Validation, color: bool) {
    let palette = ansi::Palette::new(color);

    let verdict = match validation.state() {
        RunState::Passed => palette.bold(palette.paint("✓ passed", ansi::GREEN)),
        RunState::Aborted => palette.bold(palette.paint("✗ aborted", ansi::RED)),
        _ => palette.bold(palette.paint("✗ failed", ansi::RED)),
    };
    println!("\n{verdict}");

    println!("\n{}", palette.paint("━━━ Errors ━━━", ansi::GRAY));
    if validation.errors().is_empty() {
        println!("{}", palette.dim("  none"));
    } else {
        for (idx, entry) in validation.errors().iter().enumerate() {
            println!(
                "  {} {} {} {}",
                palette.paint(format!("[{idx}]"), ansi::GRAY),
                palette.paint(&entry.field, ansi::BLUE),
                palette.dim("│"),
                palette.paint(&entry.message, ansi::YELLOW),
            );
        }
    }

    println!("\n{}", palette.paint("━━━ Safe data ━━━", ansi::GRAY));
    if validation.safe_data().is_empty() {
        println!("{}", palette.dim("  empty"));
    } else {
        for (field, value) in validation.safe_data() {
            println!(
                "  {} {} {}",
                palette.paint(field, ansi::BLUE),
                palette.dim("="),
                palette.paint(value.to_string(), ansi::GREEN),
            );
        }
    }

    let metrics = validation.metrics();
    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Rules: {}  │  Checked: {}  │  Skipped: {}  │  Filtered: {}",
        palette.paint(format!("{:?}", metrics.total), ansi::GREEN),
        palette.paint(metrics.rules.to_string(), ansi::CYAN),
        palette.paint(metrics.checked.to_string(), ansi::CYAN),
        palette.dim(metrics.skipped.to_string()),
        palette.dim(metrics.filtered.to_string()),
    );
    println!();
}
