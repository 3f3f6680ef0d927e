use anyhow::{Context, Result};
use scrollfx_core::easing::Timing;
use scrollfx_core::interpolate::interpolate;
use scrollfx_core::Value;

/// Read a CLI argument as a value: JSON first, then a bare string
fn parse_value(input: &str) -> Result<Value> {
    serde_json::from_str(input)
        .or_else(|_| serde_json::from_value(serde_json::Value::String(input.to_string())))
        .with_context(|| format!("Cannot read `{}` as a value", input))
}

pub fn run(from: &str, to: &str, at: f64, easing: Option<&str>) -> Result<()> {
    let start = parse_value(from)?;
    let end = parse_value(to)?;

    let t = match easing {
        Some(name) => Timing::named(name)?.apply(at),
        None => at,
    };

    let value = interpolate(&start, &end, t);
    println!("{}", value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_shapes() {
        assert_eq!(parse_value("0.5").unwrap(), Value::Number(0.5));
        assert!(matches!(parse_value("#ff0000").unwrap(), Value::Color(_)));
        assert_eq!(parse_value("20px").unwrap(), Value::Text("20px".to_string()));
        assert!(matches!(
            parse_value("[0, 50, 100]").unwrap(),
            Value::Keyframes(_)
        ));
    }
}
