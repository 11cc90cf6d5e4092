use crate::types::ScalarSample;

/// Returns the narrowest sample encoding that decodes to the same value.
///
/// Integers shrink to `IntZero`, `Byte`, `Short` or `Int`; doubles to
/// `DoubleZero`, `ByteForDouble`, `ShortForDouble` or `FloatForDouble`.
/// Text, booleans, nulls and single precision floats are returned unchanged.
pub fn narrow_sample(sample: ScalarSample) -> ScalarSample {
    match sample {
        ScalarSample::Byte(v) => narrow_integer(v.into()),
        ScalarSample::Short(v) => narrow_integer(v.into()),
        ScalarSample::Int(v) => narrow_integer(v.into()),
        ScalarSample::Long(v) => narrow_integer(v),
        ScalarSample::Double(v) => narrow_double(v),
        ScalarSample::FloatForDouble(v) => narrow_double(v.into()),
        ScalarSample::ShortForDouble(v) => narrow_double(v.into()),
        ScalarSample::ByteForDouble(v) => narrow_double(v.into()),
        other => other,
    }
}

fn narrow_integer(value: i64) -> ScalarSample {
    if value == 0 {
        ScalarSample::IntZero
    } else if let Ok(v) = i8::try_from(value) {
        ScalarSample::Byte(v)
    } else if let Ok(v) = i16::try_from(value) {
        ScalarSample::Short(v)
    } else if let Ok(v) = i32::try_from(value) {
        ScalarSample::Int(v)
    } else {
        ScalarSample::Long(value)
    }
}

fn narrow_double(value: f64) -> ScalarSample {
    // -0.0 must keep its sign bit, so only the all-zero pattern is DoubleZero
    if value.to_bits() == 0 {
        return ScalarSample::DoubleZero;
    }
    if value != 0.0 && value.fract() == 0.0 {
        if value >= f64::from(i8::MIN) && value <= f64::from(i8::MAX) {
            return ScalarSample::ByteForDouble(value as i8);
        }
        if value >= f64::from(i16::MIN) && value <= f64::from(i16::MAX) {
            return ScalarSample::ShortForDouble(value as i16);
        }
    }
    let single = value as f32;
    if f64::from(single).to_bits() == value.to_bits() {
        ScalarSample::FloatForDouble(single)
    } else {
        ScalarSample::Double(value)
    }
}
