use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

pub fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(LocalTime::new(format_description!(
            "[hour]:[minute]:[second].[subsecond digits:3]"
        )))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn format_number(num: u64) -> String {
    let digits = num.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Masks the host part of an address (`10.0.*.*`). Keys that are not
/// dotted quads keep only their first character.
pub fn redact_address(address: &str) -> String {
    let parts: Vec<&str> = address.split('.').collect();
    let dotted_quad = parts.len() == 4
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));

    if dotted_quad {
        return format!("{}.{}.*.*", parts[0], parts[1]);
    }

    let mut chars = address.chars();
    match chars.next() {
        Some(first) => {
            let mut redacted = first.to_string();
            redacted.push_str(&"*".repeat(chars.count()));
            redacted
        }
        None => String::new(),
    }
}

pub fn validate_args(args: &crate::args::Args) -> anyhow::Result<()> {
    let counts = [
        ("--top", args.top),
        ("--bottom", args.bottom),
        ("--workers", args.workers),
    ];
    for (flag, value) in counts {
        if value == Some(0) {
            anyhow::bail!("{flag} must be greater than 0");
        }
    }

    if args.threshold == 0 {
        anyhow::bail!("--threshold must be greater than 0");
    }

    if args.no_csv && args.output.is_some() {
        anyhow::bail!("--output cannot be combined with --no-csv");
    }

    Ok(())
}
