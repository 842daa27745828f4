pub(crate) fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        Ok(_) => Err("value must be at least 1".to_string()),
        Err(err) => Err(format!("invalid number {raw:?}: {err}")),
    }
}
