const SUFFIXES: [&str; 9] = ["B", "kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Formats a byte count with SI (base 1000) units, e.g. `1.2 MB`.
///
/// Values under ten units keep one decimal place; larger values are
/// rounded to a whole number.
pub fn format_bytes(n: u128) -> String {
    if n < 10 {
        return format!("{n} B");
    }

    let mut exp = 0u32;
    while (exp as usize) < SUFFIXES.len() - 1 {
        match 1000u128.checked_pow(exp + 1) {
            Some(next) if n >= next => exp += 1,
            _ => break,
        }
    }

    let scaled = n as f64 / 1000f64.powi(exp as i32);
    let rounded = (scaled * 10.0 + 0.5).floor() / 10.0;
    let suffix = SUFFIXES[exp as usize];
    if rounded < 10.0 {
        format!("{rounded:.1} {suffix}")
    } else {
        format!("{rounded:.0} {suffix}")
    }
}
