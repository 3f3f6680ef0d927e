//! Interpolation between typed endpoints
//!
//! A single dispatch over [`Value`] pairs. Combinations with no blend rule
//! switch discretely at the midpoint.

use crate::value::{parse_float_prefix, Rgb, Value};

/// Linear interpolation between two numbers
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Interpolate between `start` and `end` at progress `t`
pub fn interpolate(start: &Value, end: &Value, t: f64) -> Value {
    match (start, end) {
        (Value::Number(a), Value::Number(b)) => Value::Number(lerp(*a, *b, t)),
        (Value::Color(a), Value::Color(b)) => Value::Color(a.lerp(b, t)),
        (Value::Text(a), Value::Text(b)) => interpolate_text(a, b, t),
        (Value::Color(a), Value::Text(b)) => interpolate_text(&a.to_string(), b, t),
        (Value::Text(a), Value::Color(b)) => interpolate_text(a, &b.to_string(), t),
        (Value::Structured(a), Value::Structured(b)) => {
            let mut out = a.clone();
            for (key, value) in out.iter_mut() {
                if let Some(target) = b.get(key) {
                    *value = interpolate(value, target, t);
                }
            }
            Value::Structured(out)
        }
        (Value::Keyframes(a), Value::Keyframes(b)) => Value::Keyframes(
            a.iter()
                .enumerate()
                .map(|(i, value)| match b.get(i) {
                    Some(target) => interpolate(value, target, t),
                    None => value.clone(),
                })
                .collect(),
        ),
        _ => step(start, end, t),
    }
}

fn interpolate_text(start: &str, end: &str, t: f64) -> Value {
    if start.starts_with('#') && end.starts_with('#') {
        return match (Rgb::parse(start), Rgb::parse(end)) {
            (Ok(a), Ok(b)) => Value::Text(a.lerp(&b, t).to_string()),
            _ => Value::Text(start.to_string()),
        };
    }

    match (parse_float_prefix(start), parse_float_prefix(end)) {
        (Some(a), Some(b)) => Value::Number(lerp(a, b, t)),
        _ => {
            if t < 0.5 {
                Value::Text(start.to_string())
            } else {
                Value::Text(end.to_string())
            }
        }
    }
}

fn step(start: &Value, end: &Value, t: f64) -> Value {
    if t < 0.5 {
        start.clone()
    } else {
        end.clone()
    }
}

/// Piecewise interpolation across N ordered control points.
///
/// `[0, 1]` is split into N−1 equal segments; the segment index is clamped so
/// overshooting progress extrapolates along the first or last segment.
/// Returns `None` for an empty sequence.
pub fn interpolate_keyframes(frames: &[Value], t: f64) -> Option<Value> {
    match frames.len() {
        0 => None,
        1 => Some(frames[0].clone()),
        n => {
            let segments = n - 1;
            let size = 1.0 / segments as f64;
            let raw = (t / size).floor();
            let index = if raw.is_nan() {
                0
            } else {
                raw.clamp(0.0, (segments - 1) as f64) as usize
            };
            let local = (t - index as f64 * size) / size;
            Some(interpolate(&frames[index], &frames[index + 1], local))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn number(v: &Value) -> f64 {
        match v {
            Value::Number(n) => *n,
            other => panic!("expected number, got {:?}", other),
        }
    }

    #[test]
    fn test_numbers() {
        let a = Value::Number(10.0);
        let b = Value::Number(20.0);
        assert_eq!(interpolate(&a, &b, 0.0), a);
        assert_eq!(interpolate(&a, &b, 1.0), b);
        assert_eq!(interpolate(&a, &b, 0.25), Value::Number(12.5));
    }

    #[test]
    fn test_equal_endpoints_are_fixed_points() {
        let cases = [
            Value::Number(3.5),
            Value::Color(Rgb::new(12, 34, 56)),
            Value::transform("rotate", 45.0),
        ];
        for value in cases {
            for t in [0.0, 0.3, 0.5, 0.9, 1.0] {
                assert_eq!(interpolate(&value, &value, t), value);
            }
        }
    }

    #[test]
    fn test_colors() {
        let black = Value::Color(Rgb::new(0, 0, 0));
        let white = Value::Color(Rgb::new(255, 255, 255));
        assert_eq!(interpolate(&black, &white, 0.5), Value::Color(Rgb::new(128, 128, 128)));
        assert_eq!(interpolate(&black, &white, 0.0), black);
        assert_eq!(interpolate(&black, &white, 1.0), white);
    }

    #[test]
    fn test_hex_text() {
        let v = interpolate(&Value::from("#000000"), &Value::from("#FFFFFF"), 0.5);
        assert_eq!(v, Value::from("#808080"));

        let v = interpolate(&Value::from("#000"), &Value::from("#fff"), 1.0);
        assert_eq!(v, Value::from("#ffffff"));
    }

    #[test]
    fn test_malformed_hex_returns_start() {
        let start = Value::from("#nothex");
        let v = interpolate(&start, &Value::from("#ffffff"), 0.7);
        assert_eq!(v, start);
    }

    #[test]
    fn test_numeric_text_becomes_number() {
        let v = interpolate(&Value::from("10px"), &Value::from("30px"), 0.5);
        assert_eq!(v, Value::Number(20.0));
    }

    #[test]
    fn test_plain_text_steps_at_midpoint() {
        let a = Value::from("hidden");
        let b = Value::from("visible");
        assert_eq!(interpolate(&a, &b, 0.49), a);
        assert_eq!(interpolate(&a, &b, 0.5), b);
    }

    #[test]
    fn test_mismatched_shapes_step() {
        let a = Value::Number(1.0);
        let b = Value::from("auto");
        assert_eq!(interpolate(&a, &b, 0.2), a);
        assert_eq!(interpolate(&a, &b, 0.8), b);
    }

    #[test]
    fn test_structured_keys_of_start() {
        let mut start = BTreeMap::new();
        start.insert("x".to_string(), Value::Number(0.0));
        start.insert("y".to_string(), Value::Number(10.0));
        let mut end = BTreeMap::new();
        end.insert("x".to_string(), Value::Number(100.0));
        end.insert("z".to_string(), Value::Number(5.0));

        let out = interpolate(&Value::Structured(start), &Value::Structured(end), 0.5);
        assert_eq!(out.get("x"), Some(&Value::Number(50.0)));
        assert_eq!(out.get("y"), Some(&Value::Number(10.0)));
        assert_eq!(out.get("z"), None);
    }

    #[test]
    fn test_transform_shape() {
        let a = Value::transform("translateY", 0.0);
        let b = Value::transform("translateY", 100.0);
        let out = interpolate(&a, &b, 0.25);
        assert_eq!(out, Value::transform("translateY", 25.0));
    }

    #[test]
    fn test_keyframe_midpoints() {
        let frames: Vec<Value> = vec![0.0.into(), 50.0.into(), 100.0.into()];
        assert_eq!(number(&interpolate_keyframes(&frames, 0.25).unwrap()), 25.0);
        assert_eq!(number(&interpolate_keyframes(&frames, 0.75).unwrap()), 75.0);
        assert_eq!(number(&interpolate_keyframes(&frames, 0.0).unwrap()), 0.0);
        assert_eq!(number(&interpolate_keyframes(&frames, 1.0).unwrap()), 100.0);
        assert_eq!(number(&interpolate_keyframes(&frames, 0.5).unwrap()), 50.0);
    }

    #[test]
    fn test_keyframe_overshoot_uses_edge_segments() {
        let frames: Vec<Value> = vec![0.0.into(), 50.0.into(), 100.0.into()];
        assert_eq!(number(&interpolate_keyframes(&frames, -0.1).unwrap()), -10.0);
        assert_eq!(number(&interpolate_keyframes(&frames, 1.1).unwrap()), 110.0);
    }

    #[test]
    fn test_keyframe_colors() {
        let frames = vec![Value::from("#000000"), Value::from("#ff0000"), Value::from("#ffffff")];
        assert_eq!(interpolate_keyframes(&frames, 0.5), Some(Value::from("#ff0000")));
    }

    #[test]
    fn test_keyframe_degenerate_lengths() {
        assert_eq!(interpolate_keyframes(&[], 0.5), None);
        assert_eq!(interpolate_keyframes(&[Value::Number(7.0)], 0.9), Some(Value::Number(7.0)));
    }

    #[test]
    fn test_nested_keyframes_interpolate_element_wise() {
        let a = Value::from(vec![0.0, 10.0]);
        let b = Value::from(vec![100.0, 20.0]);
        assert_eq!(interpolate(&a, &b, 0.5), Value::from(vec![50.0, 15.0]));
    }
}
