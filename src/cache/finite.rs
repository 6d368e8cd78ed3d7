//! Finite Float Check
//!
//! serde_json writes NaN and infinities as `null` without complaint, which
//! would make `f(NaN)` and `f(None)` share a key and cache lossy payloads.
//! This serializer walks a value and fails on the first non-finite float.

use std::fmt;

use serde::ser::{self, Serialize, Serializer};

use crate::error::{CacheError, Result};

/// Fails with `CacheError::Serialization` if `value` holds a NaN or infinity.
pub fn ensure_finite<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    value
        .serialize(FiniteCheck)
        .map_err(|e| CacheError::Serialization(e.0))
}

#[derive(Debug)]
struct NonFinite(String);

impl fmt::Display for NonFinite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for NonFinite {}

impl ser::Error for NonFinite {
    fn custom<M: fmt::Display>(msg: M) -> Self {
        NonFinite(msg.to_string())
    }
}

#[derive(Clone, Copy)]
struct FiniteCheck;

impl FiniteCheck {
    fn float(self, v: f64) -> std::result::Result<(), NonFinite> {
        if v.is_finite() {
            Ok(())
        } else {
            Err(NonFinite(format!("non-finite float {} cannot be encoded", v)))
        }
    }
}

type Outcome = std::result::Result<(), NonFinite>;

impl Serializer for FiniteCheck {
    type Ok = ();
    type Error = NonFinite;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_f32(self, v: f32) -> Outcome {
        self.float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Outcome {
        self.float(v)
    }

    fn serialize_bool(self, _v: bool) -> Outcome {
        Ok(())
    }

    fn serialize_i8(self, _v: i8) -> Outcome {
        Ok(())
    }

    fn serialize_i16(self, _v: i16) -> Outcome {
        Ok(())
    }

    fn serialize_i32(self, _v: i32) -> Outcome {
        Ok(())
    }

    fn serialize_i64(self, _v: i64) -> Outcome {
        Ok(())
    }

    fn serialize_i128(self, _v: i128) -> Outcome {
        Ok(())
    }

    fn serialize_u8(self, _v: u8) -> Outcome {
        Ok(())
    }

    fn serialize_u16(self, _v: u16) -> Outcome {
        Ok(())
    }

    fn serialize_u32(self, _v: u32) -> Outcome {
        Ok(())
    }

    fn serialize_u64(self, _v: u64) -> Outcome {
        Ok(())
    }

    fn serialize_u128(self, _v: u128) -> Outcome {
        Ok(())
    }

    fn serialize_char(self, _v: char) -> Outcome {
        Ok(())
    }

    fn serialize_str(self, _v: &str) -> Outcome {
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Outcome {
        Ok(())
    }

    fn serialize_none(self) -> Outcome {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Outcome {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Outcome {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Outcome {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> Outcome {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Outcome {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Outcome {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> std::result::Result<Self, NonFinite> {
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> std::result::Result<Self, NonFinite> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, NonFinite> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, NonFinite> {
        Ok(self)
    }

    fn serialize_map(self, _len: Option<usize>) -> std::result::Result<Self, NonFinite> {
        Ok(self)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, NonFinite> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, NonFinite> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Outcome {
        value.serialize(*self)
    }

    fn end(self) -> Outcome {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Outcome {
        value.serialize(*self)
    }

    fn end(self) -> Outcome {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Outcome {
        value.serialize(*self)
    }

    fn end(self) -> Outcome {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Outcome {
        value.serialize(*self)
    }

    fn end(self) -> Outcome {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Outcome {
        key.serialize(*self)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Outcome {
        value.serialize(*self)
    }

    fn end(self) -> Outcome {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _key: &'static str, value: &T) -> Outcome {
        value.serialize(*self)
    }

    fn end(self) -> Outcome {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _key: &'static str, value: &T) -> Outcome {
        value.serialize(*self)
    }

    fn end(self) -> Outcome {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(serde::Serialize)]
    struct Reading {
        station: String,
        temps: Vec<Option<f64>>,
    }

    #[test]
    fn test_finite_values_pass() {
        let reading = Reading {
            station: "VKO".to_string(),
            temps: vec![Some(-3.5), None, Some(0.0)],
        };
        assert!(ensure_finite(&reading).is_ok());
        assert!(ensure_finite(&(1u8, "x", 'c', 2.5f32)).is_ok());
    }

    #[test]
    fn test_nan_rejected() {
        assert!(matches!(
            ensure_finite(&f64::NAN),
            Err(CacheError::Serialization(_))
        ));
    }

    #[test]
    fn test_nested_infinity_rejected() {
        let reading = Reading {
            station: "SVO".to_string(),
            temps: vec![Some(1.0), Some(f64::INFINITY)],
        };
        assert!(matches!(
            ensure_finite(&reading),
            Err(CacheError::Serialization(_))
        ));

        let mut map = BTreeMap::new();
        map.insert("low", f32::NEG_INFINITY);
        assert!(ensure_finite(&map).is_err());
    }
}
