//! Tests for scalar conversions.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::name::PropertyName;

fn property(value: impl Into<Value>) -> ConfigurationProperty {
    ConfigurationProperty::new(
        PropertyName::parse("test.value").expect("valid name"),
        value,
        None,
        "test",
    )
}

#[rstest]
#[case("true", true)]
#[case("YES", true)]
#[case(" on ", true)]
#[case("1", true)]
#[case("false", false)]
#[case("No", false)]
#[case("off", false)]
#[case("0", false)]
fn converts_booleans(#[case] text: &str, #[case] expected: bool) {
    assert_eq!(bool::from_property(&property(text)), Ok(expected));
}

#[rstest]
fn rejects_unknown_boolean_words() {
    let err = bool::from_property(&property("maybe")).expect_err("not a boolean");
    assert!(err.reason().contains("maybe"));
}

#[rstest]
#[case("42", 42)]
#[case(" +7 ", 7)]
#[case("-12", -12)]
#[case("0x1F", 31)]
#[case("#ff", 255)]
#[case("-0x10", -16)]
fn converts_integers(#[case] text: &str, #[case] expected: i32) {
    assert_eq!(i32::from_property(&property(text)), Ok(expected));
}

#[rstest]
fn converts_the_full_width_of_128_bit_integers() {
    let max = u128::MAX.to_string();
    assert_eq!(u128::from_property(&property(max.as_str())), Ok(u128::MAX));
    assert_eq!(
        u128::from_property(&property("0xffffffffffffffffffffffffffffffff")),
        Ok(u128::MAX)
    );
    let min = i128::MIN.to_string();
    assert_eq!(i128::from_property(&property(min.as_str())), Ok(i128::MIN));
    assert!(i128::from_property(&property(max.as_str())).is_err());
    assert!(u128::from_property(&property("-1")).is_err());
}

#[rstest]
fn converts_json_numbers() {
    assert_eq!(u16::from_property(&property(json!(8080))), Ok(8080));
    assert!(u16::from_property(&property(json!(1.5))).is_err());
}

#[rstest]
#[case("256")]
#[case("-1")]
#[case("")]
#[case("0x")]
#[case("1_000")]
fn rejects_bad_u8(#[case] text: &str) {
    assert!(u8::from_property(&property(text)).is_err());
}

#[rstest]
fn converts_floats() {
    assert_eq!(f64::from_property(&property("2.5")), Ok(2.5));
    assert_eq!(f32::from_property(&property(json!(0.25))), Ok(0.25));
}

#[rstest]
fn keeps_strings_verbatim() {
    assert_eq!(
        String::from_property(&property("  padded ")),
        Ok("  padded ".to_owned())
    );
    assert_eq!(String::from_property(&property(json!(3))), Ok("3".to_owned()));
}

#[rstest]
fn converts_chars() {
    assert_eq!(char::from_property(&property("x")), Ok('x'));
    assert!(char::from_property(&property("xy")).is_err());
}

#[rstest]
fn converts_paths_and_addresses() {
    assert_eq!(
        PathBuf::from_property(&property(" /etc/app ")),
        Ok(PathBuf::from("/etc/app"))
    );
    assert!(PathBuf::from_property(&property("")).is_err());
    assert_eq!(
        IpAddr::from_property(&property("127.0.0.1")),
        Ok(IpAddr::from([127, 0, 0, 1]))
    );
    assert!(IpAddr::from_property(&property("localhost")).is_err());
}

#[rstest]
#[case("250", Duration::from_millis(250))]
#[case("250ms", Duration::from_millis(250))]
#[case("10s", Duration::from_secs(10))]
#[case("5M", Duration::from_secs(300))]
#[case("2h", Duration::from_secs(7200))]
#[case("2d", Duration::from_secs(172_800))]
#[case("+3us", Duration::from_micros(3))]
#[case("7ns", Duration::from_nanos(7))]
#[case("PT1H30M", Duration::from_secs(5400))]
#[case("P1DT1S", Duration::from_secs(86_401))]
#[case("pt0.5s", Duration::from_millis(500))]
#[case("PT1,25S", Duration::from_millis(1250))]
fn parses_durations(#[case] text: &str, #[case] expected: Duration) {
    assert_eq!(parse_duration(text), Ok(expected));
}

#[rstest]
#[case("-5s")]
#[case("5 weeks")]
#[case("s")]
#[case("P")]
#[case("PT")]
#[case("P1H")]
#[case("PTM")]
#[case("PT1.1234567891S")]
fn rejects_malformed_durations(#[case] text: &str) {
    assert!(parse_duration(text).is_err(), "{text} should be rejected");
}

#[rstest]
fn converts_numeric_durations_as_millis() {
    assert_eq!(
        Duration::from_property(&property(json!(1500))),
        Ok(Duration::from_millis(1500))
    );
}

#[derive(Debug, PartialEq)]
struct Percent(u8);

impl std::str::FromStr for Percent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_suffix('%')
            .and_then(|digits| digits.parse().ok())
            .map(Percent)
            .ok_or_else(|| format!("'{s}' is not a percentage"))
    }
}

crate::impl_scalar_from_str!(Percent);

#[rstest]
fn from_str_macro_binds_custom_scalars() {
    assert_eq!(Percent::from_property(&property("40%")), Ok(Percent(40)));
    let err = Percent::from_property(&property("40")).expect_err("missing suffix");
    assert_eq!(err.reason(), "'40' is not a percentage");
}
