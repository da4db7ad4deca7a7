/// Bring a column header into its canonical form: trimmed, lowercase, only
/// ASCII letters and digits, words joined by a single `_`.
///
/// Underscores count as word separators so that normalizing twice gives the
/// same identifier.
///
/// `" Torque 1 (Nm)"` becomes `"torque_1_nm"`, `"Time (s)"` becomes `"time_s"`.
pub fn normalize_identifier(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let kept: String = lower
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '_')
        .collect();
    kept.split(|c: char| c.is_whitespace() || c == '_')
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn normalize_headers() {
        assert_eq!(normalize_identifier("time_s"), "time_s");
        assert_eq!(normalize_identifier("__time__s"), "time_s");
        assert_eq!(normalize_identifier("Time (s)"), "time_s");
        assert_eq!(normalize_identifier(" Torque 1 (Nm) "), "torque_1_nm");
        assert_eq!(normalize_identifier("TORQUE"), "torque");
        assert_eq!(normalize_identifier("Motor  Torque\t[Nm]"), "motor_torque_nm");
        assert_eq!(normalize_identifier("Drehmoment-Ä"), "drehmoment");
        assert_eq!(normalize_identifier("  "), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        for name in &["Time (s)", "Torque #2", "a b  c"] {
            let once = normalize_identifier(name);
            assert_eq!(normalize_identifier(&once), once);
        }
    }
}
