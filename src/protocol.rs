use crate::error::ParseError;

/// Separator between fields of a single reply line
pub const FIELD_DELIMITER: char = ',';

/// Enumerations transmitted as an integer ordinal
pub trait Ordinal: Sized + Copy {
    /// Name used in error reports
    const FIELD: &'static str;

    fn from_ordinal(value: i64) -> Option<Self>;

    fn ordinal(self) -> i64;
}

/// Enumerations transmitted as a SCPI mnemonic
pub trait Token: Sized + Copy {
    /// Name used in error reports
    const FIELD: &'static str;

    /// Mnemonic sent to the instrument
    fn token(self) -> &'static str;

    /// Match an upper-cased mnemonic from a reply. Implementations accept both the
    /// short and the long form where the instrument may return either.
    fn from_token(token: &str) -> Option<Self>;
}

/// Positional view over the fields of one reply line.
///
/// Fields are trimmed, the arity was checked on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Fields<'a> {
    fields: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn raw(&self, index: usize) -> Result<&'a str, ParseError> {
        self.fields
            .get(index)
            .copied()
            .ok_or(ParseError::FieldCountMismatch {
                expected: index + 1,
                actual: self.fields.len(),
            })
    }

    pub fn int<T: TryFrom<i64>>(&self, index: usize) -> Result<T, ParseError> {
        let raw = self.raw(index)?;
        let value = Protocol::parse_int(raw, index)?;
        T::try_from(value).map_err(|_| ParseError::FieldParse {
            index,
            raw: raw.to_string(),
            expected: "integer in range",
        })
    }

    pub fn float(&self, index: usize) -> Result<f64, ParseError> {
        Protocol::parse_float(self.raw(index)?, index)
    }

    pub fn bool(&self, index: usize) -> Result<bool, ParseError> {
        Protocol::parse_bool(self.raw(index)?, index)
    }

    pub fn ordinal<E: Ordinal>(&self, index: usize) -> Result<E, ParseError> {
        let raw = self.raw(index)?;
        let value = Protocol::parse_int(raw, index)?;
        E::from_ordinal(value).ok_or_else(|| ParseError::UnknownEnumValue {
            field: E::FIELD,
            raw: raw.to_string(),
        })
    }

    pub fn token<E: Token>(&self, index: usize) -> Result<E, ParseError> {
        Protocol::parse_token(self.raw(index)?)
    }
}

/// Text codec shared by every subsystem
pub struct Protocol;

impl Protocol {
    /// Trim a reply and reject it when nothing is left
    pub fn payload(reply: &str) -> Result<&str, ParseError> {
        let payload = reply.trim();
        if payload.is_empty() {
            return Err(ParseError::EmptyReply);
        }
        Ok(payload)
    }

    /// Split a reply into exactly `expected` comma-separated fields
    pub fn split_fields(reply: &str, expected: usize) -> Result<Fields<'_>, ParseError> {
        let payload = Self::payload(reply)?;
        let fields: Vec<&str> = payload.split(FIELD_DELIMITER).map(str::trim).collect();

        if fields.len() != expected {
            return Err(ParseError::FieldCountMismatch {
                expected,
                actual: fields.len(),
            });
        }

        Ok(Fields { fields })
    }

    /// Integer with optional sign. Integral floats such as `3.0` or `1.2E+03` are
    /// accepted, everything else is rejected.
    pub fn parse_int(raw: &str, index: usize) -> Result<i64, ParseError> {
        let text = raw.trim();
        if let Ok(value) = text.parse::<i64>() {
            return Ok(value);
        }

        match text.parse::<f64>() {
            Ok(value)
                if value.is_finite()
                    && value.fract() == 0.0
                    && value.abs() < i64::MAX as f64 =>
            {
                Ok(value as i64)
            }
            _ => Err(ParseError::FieldParse {
                index,
                raw: raw.to_string(),
                expected: "integer",
            }),
        }
    }

    pub fn parse_float(raw: &str, index: usize) -> Result<f64, ParseError> {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ParseError::FieldParse {
                index,
                raw: raw.to_string(),
                expected: "float",
            }),
        }
    }

    /// `1`, `ON`, `YES` are true; `0`, `OFF`, `NO` are false
    pub fn parse_bool(raw: &str, index: usize) -> Result<bool, ParseError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "1" | "ON" | "YES" => Ok(true),
            "0" | "OFF" | "NO" => Ok(false),
            _ => Err(ParseError::FieldParse {
                index,
                raw: raw.to_string(),
                expected: "boolean",
            }),
        }
    }

    pub fn parse_token<E: Token>(raw: &str) -> Result<E, ParseError> {
        E::from_token(&raw.trim().to_ascii_uppercase()).ok_or_else(|| {
            ParseError::UnknownEnumValue {
                field: E::FIELD,
                raw: raw.to_string(),
            }
        })
    }

    pub fn float_reply(reply: &str) -> Result<f64, ParseError> {
        Self::split_fields(reply, 1)?.float(0)
    }

    pub fn int_reply<T: TryFrom<i64>>(reply: &str) -> Result<T, ParseError> {
        Self::split_fields(reply, 1)?.int(0)
    }

    pub fn bool_reply(reply: &str) -> Result<bool, ParseError> {
        Self::split_fields(reply, 1)?.bool(0)
    }

    pub fn token_reply<E: Token>(reply: &str) -> Result<E, ParseError> {
        Self::split_fields(reply, 1)?.token(0)
    }

    /// Strip an IEEE 488.2 block header (`#<n><length>` or `#0`) from a reply.
    /// Replies without a header are returned unchanged.
    pub fn strip_block_header(reply: &str) -> Result<&str, ParseError> {
        let payload = Self::payload(reply)?;
        let Some(rest) = payload.strip_prefix('#') else {
            return Ok(payload);
        };

        let header_error = || ParseError::FieldParse {
            index: 0,
            raw: payload.chars().take(12).collect(),
            expected: "block header",
        };

        let digits = rest
            .chars()
            .next()
            .and_then(|c| c.to_digit(10))
            .ok_or_else(header_error)? as usize;

        // Indefinite length block
        if digits == 0 {
            return Ok(&rest[1..]);
        }

        let length: usize = rest
            .get(1..1 + digits)
            .and_then(|len| len.parse().ok())
            .ok_or_else(header_error)?;

        let body = rest.get(1 + digits..).ok_or_else(header_error)?;
        let (block, trailer) = body
            .split_at_checked(length)
            .ok_or_else(header_error)?;
        // Anything after the declared block means the length is wrong
        if !trailer.trim().is_empty() {
            return Err(header_error());
        }
        Ok(block)
    }

    /// Fixed point notation with `decimals` places
    pub fn fixed(value: f64, decimals: usize) -> String {
        let text = format!("{value:.decimals$}");
        // Avoid sending "-0.000"
        if Self::is_negative_zero(&text) {
            return text[1..].to_string();
        }
        text
    }

    /// Fixed point notation with an explicit sign
    pub fn signed_fixed(value: f64, decimals: usize) -> String {
        let text = format!("{value:+.decimals$}");
        if Self::is_negative_zero(&text) {
            return format!("+{}", &text[1..]);
        }
        text
    }

    fn is_negative_zero(number: &str) -> bool {
        number
            .strip_prefix('-')
            .is_some_and(|magnitude| magnitude.chars().all(|c| c == '0' || c == '.'))
    }

    pub fn on_off(state: bool) -> &'static str {
        if state { "ON" } else { "OFF" }
    }

    /// Quote a string parameter, doubling embedded quotes
    pub fn quoted(text: &str) -> String {
        format!("\"{}\"", text.replace('"', "\"\""))
    }

    /// Remove surrounding quotes from a string reply
    pub fn unquoted(text: &str) -> String {
        let text = text.trim();
        text.strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .map(|t| t.replace("\"\"", "\""))
            .unwrap_or_else(|| text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Coupling {
        Ac,
        Dc,
    }

    impl Token for Coupling {
        const FIELD: &'static str = "coupling";

        fn token(self) -> &'static str {
            match self {
                Coupling::Ac => "AC",
                Coupling::Dc => "DC",
            }
        }

        fn from_token(token: &str) -> Option<Self> {
            match token {
                "AC" => Some(Coupling::Ac),
                "DC" => Some(Coupling::Dc),
                _ => None,
            }
        }
    }

    #[test]
    fn test_empty_reply_is_rejected_before_splitting() {
        assert_eq!(Protocol::split_fields("", 3), Err(ParseError::EmptyReply));
        assert_eq!(Protocol::split_fields("  \r\n", 1), Err(ParseError::EmptyReply));
    }

    #[test]
    fn test_field_count_must_match() {
        assert_eq!(
            Protocol::split_fields("1,2,3", 2),
            Err(ParseError::FieldCountMismatch {
                expected: 2,
                actual: 3
            })
        );
        assert_eq!(
            Protocol::split_fields("1,2", 3),
            Err(ParseError::FieldCountMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_fields_are_trimmed() {
        let fields = Protocol::split_fields(" 1 , 2.5 ,ON\n", 3).unwrap();
        assert_eq!(fields.int::<u32>(0).unwrap(), 1);
        assert_eq!(fields.float(1).unwrap(), 2.5);
        assert!(fields.bool(2).unwrap());
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(Protocol::parse_int("+42", 0).unwrap(), 42);
        assert_eq!(Protocol::parse_int("-7", 0).unwrap(), -7);
        assert_eq!(Protocol::parse_int("3.0", 0).unwrap(), 3);
        assert_eq!(Protocol::parse_int("1.2E+03", 0).unwrap(), 1200);
        assert!(Protocol::parse_int("3.5", 0).is_err());
        assert!(Protocol::parse_int("3abc", 0).is_err());
        assert!(Protocol::parse_int("", 0).is_err());
    }

    #[test]
    fn test_int_out_of_range_for_target() {
        let fields = Protocol::split_fields("-1", 1).unwrap();
        assert_eq!(
            fields.int::<u16>(0),
            Err(ParseError::FieldParse {
                index: 0,
                raw: "-1".to_string(),
                expected: "integer in range"
            })
        );
    }

    #[test]
    fn test_parse_float_scientific() {
        assert_eq!(Protocol::parse_float("1.234E+02", 0).unwrap(), 123.4);
        assert_eq!(Protocol::parse_float("-4.8E-06", 0).unwrap(), -4.8e-6);
        assert_eq!(Protocol::parse_float("+5", 0).unwrap(), 5.0);
        assert!(Protocol::parse_float("NaN", 0).is_err());
        assert!(Protocol::parse_float("inf", 0).is_err());
        assert!(Protocol::parse_float("5V", 0).is_err());
    }

    #[test]
    fn test_field_parse_error_reports_index_and_text() {
        let fields = Protocol::split_fields("1.0,abc", 2).unwrap();
        assert_eq!(
            fields.float(1),
            Err(ParseError::FieldParse {
                index: 1,
                raw: "abc".to_string(),
                expected: "float"
            })
        );
    }

    #[test]
    fn test_token_case_insensitive() {
        assert_eq!(Protocol::token_reply::<Coupling>("dc\n").unwrap(), Coupling::Dc);
        assert_eq!(
            Protocol::token_reply::<Coupling>("GND"),
            Err(ParseError::UnknownEnumValue {
                field: "coupling",
                raw: "GND".to_string()
            })
        );
        assert_eq!(Coupling::Ac.token(), "AC");
    }

    #[test]
    fn test_block_header() {
        assert_eq!(
            Protocol::strip_block_header("#9000000010-1.0,2.0,3").unwrap(),
            "-1.0,2.0,3"
        );
        assert_eq!(Protocol::strip_block_header("#0abc").unwrap(), "abc");
        assert_eq!(Protocol::strip_block_header("1,2").unwrap(), "1,2");
        assert!(Protocol::strip_block_header("#9000000050-1.0").is_err());
        assert!(Protocol::strip_block_header("#x").is_err());
    }

    #[test]
    fn test_block_header_length_must_cover_body() {
        assert!(matches!(
            Protocol::strip_block_header("#151.0,2.0,3.0"),
            Err(ParseError::FieldParse {
                expected: "block header",
                ..
            })
        ));
        assert_eq!(
            Protocol::strip_block_header("#15-1.00 \n").unwrap(),
            "-1.00"
        );
    }

    #[test]
    fn test_int_rejects_out_of_range_floats() {
        assert!(Protocol::parse_int("9.223372036854775808E+18", 0).is_err());
        assert_eq!(Protocol::parse_int("1.2E+03", 0).unwrap(), 1200);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(Protocol::fixed(5.0, 3), "5.000");
        assert_eq!(Protocol::fixed(-0.0, 3), "0.000");
        assert_eq!(Protocol::signed_fixed(1.5, 3), "+1.500");
        assert_eq!(Protocol::signed_fixed(-2.0, 2), "-2.00");
        assert_eq!(Protocol::fixed(-0.0001, 3), "0.000");
        assert_eq!(Protocol::signed_fixed(-0.0001, 3), "+0.000");
        assert_eq!(Protocol::signed_fixed(-0.0, 3), "+0.000");
        assert_eq!(Protocol::fixed(-0.0006, 3), "-0.001");
        assert_eq!(Protocol::on_off(true), "ON");
        assert_eq!(Protocol::quoted("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(Protocol::unquoted("\"Undefined header\""), "Undefined header");
        assert_eq!(Protocol::unquoted("plain"), "plain");
    }
}
